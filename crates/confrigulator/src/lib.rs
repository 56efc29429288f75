//! # confrigulator - layered configuration
//!
//! ## Introduction for developers
//!
//! Read this to understand how `confrigulator` works internally.
//!
//! ### Documents
//!
//! Every configuration source is normalized into a [value::Value] document: nested objects
//! and arrays ending in scalars. Loading text (yaml/json) happens in [format], everything
//! after that only sees documents.
//!
//! ### Paths
//!
//! Values inside a document are addressed with a path string such as `server.ports.0`.
//! [path::PathResolver] splits the string on its delimiter and walks the document: object
//! segments are keys, array segments are indices.
//!
//! There are exactly two ways for a lookup to fail:
//! - [path::PathError::InvalidKey]: the path itself is broken (empty, `a..b`, a non-numeric
//!   segment addressing an array). This is a bug on the caller side.
//! - [path::PathError::KeyNotFound]: the path is fine but the document has no such entry.
//!   This is expected; other layers or a default usually fill in.
//!
//! Setting a value creates missing intermediate objects on request. Arrays are never grown
//! implicitly.
//!
//! ### Layers
//!
//! A [layer::Layer] binds a document to a name and tracks whether it has unwritten changes.
//! The trait provides lookups and mutations on top of the resolver; implementors only
//! provide the document and how it is written back.
//!
//! | **source**          | **type**                         | **writable** |
//! |---------------------|----------------------------------|--------------|
//! | document in memory  | [layer::MemoryLayer]             | no           |
//! | environment         | [layer::MemoryLayer::from_env]   | no           |
//! | yaml / json file    | [layer::FileLayer]               | on request   |
//!
//! ### Config and queries
//!
//! A [config::Config] holds layers in registration order. Layers registered later win:
//!
//! ```
//! use confrigulator::{document, Config, MemoryLayer, QueryOptions};
//!
//! let mut config = Config::new();
//! config.insert_layer(MemoryLayer::new("defaults", document!({"port": 8080, "host": "localhost"})), None);
//! config.insert_layer(MemoryLayer::new("overrides", document!({"port": 9090})), None);
//!
//! let port = config.query("port", QueryOptions::new());
//! assert_eq!(port.result().unwrap().as_i64(), Some(9090));
//!
//! let host = config.query("host", QueryOptions::new());
//! assert_eq!(host.result().unwrap().as_str(), Some("localhost"));
//! ```
//!
//! A query visits layers from highest to lowest precedence ([config::Config::search_order])
//! and records an attempt per layer in a [query::QueryResult]. Searching never fails; only
//! asking for the result does, when nothing was found and no default was requested, or when
//! the requested [cast::Cast] rejects the value.
//!
//! ### Diagnostics
//!
//! All diagnostics go through [tracing]. The library never installs a subscriber; the
//! `confrigulator` binary does, filtered by the `CONFRIGULATOR_LOG` environment variable.
//!
pub mod cast;
pub mod config;
pub mod format;
pub mod layer;
pub mod path;
pub mod query;
pub mod value;

pub use cast::{Cast, CastError};
pub use config::Config;
pub use layer::{FileLayer, Layer, LayerError, MemoryLayer};
pub use path::{PathError, PathResolver};
pub use query::{QueryAttempt, QueryError, QueryOptions, QueryResult, QueryState, ResultOverrides};
pub use value::Value;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
