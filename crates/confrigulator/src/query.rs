//! query execution across layers
//!
//! A [QueryResult] starts out pending. [QueryResult::execute] walks the layers of a
//! [Config] in [Config::search_order], records one [QueryAttempt] per consulted layer and
//! ends up either succeeded (any attempt found a value) or failed. Execution happens once;
//! executing again returns the recorded outcome, so a query never picks up later changes
//! to the layers.
//!
//! Nothing fails while searching. A malformed path is a failed attempt like a missing key
//! and the search moves on to the next layer. Errors are only returned by
//! [QueryResult::result].
use crate::cast::{Cast, CastError};
use crate::config::Config;
use crate::layer::Layer;
use crate::path::PathError;
use crate::value::Value;

/// How a query is executed and how its result is produced
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct QueryOptions {
    /// Applied to found values, never to the default
    pub cast: Option<Cast>,
    /// Return [QueryOptions::default_value] instead of failing when nothing was found
    pub return_default: bool,
    pub default_value: Value,
    /// Stop at the first layer that has a value
    pub return_first: bool,
    /// Only consult the layer with this name
    pub layer: Option<String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cast(mut self, cast: Cast) -> Self {
        self.cast = Some(cast);
        self
    }

    /// Sets the default and enables returning it
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.return_default = true;
        self.default_value = value.into();
        self
    }

    pub fn return_first(mut self, return_first: bool) -> Self {
        self.return_first = return_first;
        self
    }

    pub fn layer(mut self, name: impl Into<String>) -> Self {
        self.layer = Some(name.into());
        self
    }
}

/// Per-call replacements for [QueryOptions] used by [QueryResult::result_with]
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct ResultOverrides {
    pub cast: Option<Cast>,
    pub return_default: Option<bool>,
    pub default_value: Option<Value>,
}

impl ResultOverrides {
    pub fn cast(mut self, cast: Cast) -> Self {
        self.cast = Some(cast);
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.return_default = Some(true);
        self.default_value = Some(value.into());
        self
    }

    pub fn without_default(mut self) -> Self {
        self.return_default = Some(false);
        self
    }
}

/// The lookup of the query path in one layer
#[derive(derive_new::new, Debug, Clone, PartialEq)]
pub struct QueryAttempt {
    pub layer: String,
    pub outcome: Result<Value, PathError>,
}

impl QueryAttempt {
    fn run(query: &str, layer: &dyn Layer) -> Self {
        let outcome = layer.query(query).cloned();
        tracing::trace!(layer = layer.name(), success = outcome.is_ok(), "attempt");
        Self::new(layer.name().to_string(), outcome)
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Pending,
    Succeeded,
    Failed,
}

impl std::fmt::Display for QueryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryState::Pending => f.write_str("pending"),
            QueryState::Succeeded => f.write_str("succeeded"),
            QueryState::Failed => f.write_str("failed"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryResult {
    query: String,
    options: QueryOptions,
    attempts: Vec<QueryAttempt>,
    state: QueryState,
}

impl QueryResult {
    /// A pending query, see [QueryResult::execute]
    pub fn new(query: impl Into<String>, options: QueryOptions) -> Self {
        Self {
            query: query.into(),
            options,
            attempts: Vec::new(),
            state: QueryState::Pending,
        }
    }

    /// Searches the layers of `config`, returns whether a value was found
    ///
    /// Only the first call searches.
    #[tracing::instrument(level = "debug", skip_all, fields(query = %self.query))]
    pub fn execute(&mut self, config: &Config) -> bool {
        if self.state != QueryState::Pending {
            tracing::trace!(state = %self.state, "already executed");
            return self.is_success();
        }

        for layer in config.search_order() {
            if let Some(name) = &self.options.layer {
                if layer.name() != name {
                    continue;
                }
            }

            let attempt = QueryAttempt::run(&self.query, layer);
            let success = attempt.is_success();
            self.attempts.push(attempt);

            if success && self.options.return_first {
                break;
            }
        }

        if let Some(name) = &self.options.layer {
            if self.attempts.is_empty() {
                tracing::warn!(layer = name.as_str(), "no layer with this name");
            }
        }

        self.state = if self.attempts.iter().any(QueryAttempt::is_success) {
            QueryState::Succeeded
        } else {
            QueryState::Failed
        };
        tracing::debug!(state = %self.state, attempts = self.attempts.len(), "executed");

        self.is_success()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Attempts in search order
    pub fn attempts(&self) -> &[QueryAttempt] {
        &self.attempts
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn is_executed(&self) -> bool {
        self.state != QueryState::Pending
    }

    pub fn is_success(&self) -> bool {
        self.state == QueryState::Succeeded
    }

    /// The value found in the layer with the highest precedence, with its layer name
    ///
    /// With [QueryOptions::return_first] that is the last recorded attempt. Without it the
    /// lower precedence layers were consulted as well but do not change the outcome.
    pub fn matched(&self) -> Option<(&str, &Value)> {
        self.attempts.iter().find_map(|attempt| {
            attempt
                .outcome
                .as_ref()
                .ok()
                .map(|value| (attempt.layer.as_str(), value))
        })
    }

    pub fn result(&self) -> Result<Value, QueryError> {
        self.result_with(ResultOverrides::default())
    }

    /// The found value with cast applied, or the default when nothing was found
    pub fn result_with(&self, overrides: ResultOverrides) -> Result<Value, QueryError> {
        if !self.is_executed() {
            return Err(QueryError::NotExecuted {
                query: self.query.clone(),
            });
        }

        if let Some((_layer, value)) = self.matched() {
            let cast = overrides.cast.as_ref().or(self.options.cast.as_ref());
            return match cast {
                Some(cast) => cast.apply(value).map_err(|source| QueryError::Cast {
                    query: self.query.clone(),
                    source,
                }),
                None => Ok(value.clone()),
            };
        }

        if overrides
            .return_default
            .unwrap_or(self.options.return_default)
        {
            return Ok(overrides
                .default_value
                .unwrap_or_else(|| self.options.default_value.clone()));
        }

        Err(QueryError::NotFound {
            query: self.query.clone(),
            attempts: self.attempts.clone(),
        })
    }

    /// [QueryResult::result] deserialized into `T`
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, QueryError> {
        let value = self.result()?;
        serde_json::to_value(&value)
            .and_then(serde_json::from_value)
            .map_err(|source| QueryError::Deserialize {
                query: self.query.clone(),
                source,
            })
    }
}

impl std::fmt::Display for QueryResult {
    /// Trail of all attempts, one line per layer
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.query, self.state)?;
        for attempt in &self.attempts {
            match &attempt.outcome {
                Ok(value) => write!(f, "\n  {}: {}", attempt.layer, value)?,
                Err(error) => write!(f, "\n  {}: {}", attempt.layer, error)?,
            }
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum QueryError {
    #[error("query {query:?} was not executed")]
    NotExecuted { query: String },
    #[error("{query:?} not found in any layer")]
    NotFound {
        query: String,
        attempts: Vec<QueryAttempt>,
    },
    #[error("result of {query:?} could not be cast")]
    Cast { query: String, source: CastError },
    #[error("result of {query:?} could not be deserialized")]
    Deserialize {
        query: String,
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document;
    use crate::layer::MemoryLayer;
    use pretty_assertions::assert_eq;

    /// Layers `a`, `b`, `c` in that order, `c` has the highest precedence
    fn config() -> Config {
        let mut config = Config::new();
        config.insert_layer(
            MemoryLayer::new("a", document!({"shared": "from a", "only_a": 1, "port": "42"})),
            None,
        );
        config.insert_layer(MemoryLayer::new("b", document!({"list": [1, 2]})), None);
        config.insert_layer(
            MemoryLayer::new("c", document!({"shared": "from c", "nothing": null})),
            None,
        );
        config
    }

    #[test]
    fn pending_result_is_not_executed() {
        let query = QueryResult::new("shared", QueryOptions::new());

        assert_eq!(query.state(), QueryState::Pending);
        assert!(matches!(
            query.result(),
            Err(QueryError::NotExecuted { query }) if query == "shared"
        ));
    }

    #[test]
    fn records_every_layer_in_search_order() {
        let result = config().query("shared", QueryOptions::new());

        assert_eq!(result.state(), QueryState::Succeeded);
        assert_eq!(
            result
                .attempts()
                .iter()
                .map(|attempt| (attempt.layer.as_str(), attempt.is_success()))
                .collect::<Vec<_>>(),
            vec![("c", true), ("b", false), ("a", true)]
        );
    }

    #[test]
    fn highest_precedence_wins() {
        let result = config().query("shared", QueryOptions::new());

        assert_eq!(result.matched(), Some(("c", &Value::from("from c"))));
        assert_eq!(result.result().unwrap(), Value::from("from c"));
    }

    #[test]
    fn return_first_stops_at_highest_precedence() {
        let result = config().query("shared", QueryOptions::new().return_first(true));

        assert_eq!(result.attempts().len(), 1);
        assert_eq!(result.result().unwrap(), Value::from("from c"));
    }

    #[test]
    fn return_first_continues_past_misses() {
        let result = config().query("only_a", QueryOptions::new().return_first(true));

        assert_eq!(result.attempts().len(), 3);
        assert_eq!(result.result().unwrap(), Value::Integer(1));
    }

    #[test]
    fn null_counts_as_found() {
        let result = config().query("nothing", QueryOptions::new().with_default("fallback"));

        assert!(result.is_success());
        assert_eq!(result.result().unwrap(), Value::Null);
    }

    #[test]
    fn default_when_missing() {
        let result = config().query("missing", QueryOptions::new().with_default(7));

        assert_eq!(result.state(), QueryState::Failed);
        assert_eq!(result.result().unwrap(), Value::Integer(7));
    }

    #[test]
    fn not_found_carries_attempts() {
        let result = config().query("missing", QueryOptions::new());

        let Err(QueryError::NotFound { query, attempts }) = result.result() else {
            panic!("must not be found");
        };
        assert_eq!(query, "missing");
        assert_eq!(attempts.len(), 3);
        assert!(attempts
            .iter()
            .all(|attempt| attempt.outcome.as_ref().unwrap_err().is_not_found()));
    }

    #[test]
    fn cast_is_applied_to_found_values() {
        let result = config().query("port", QueryOptions::new().cast(Cast::integer()));
        assert_eq!(result.result().unwrap(), Value::Integer(42));

        let result = config().query("shared", QueryOptions::new().cast(Cast::integer()));
        assert!(matches!(
            result.result(),
            Err(QueryError::Cast { source, .. }) if source.expected == "integer"
        ));
    }

    #[test]
    fn cast_is_not_applied_to_defaults() {
        let result = config().query(
            "missing",
            QueryOptions::new()
                .cast(Cast::integer())
                .with_default("not a number"),
        );

        assert_eq!(result.result().unwrap(), Value::from("not a number"));
    }

    #[test]
    fn overrides() {
        let result = config().query("missing", QueryOptions::new().with_default(1));

        assert_eq!(
            result
                .result_with(ResultOverrides::default().with_default(2))
                .unwrap(),
            Value::Integer(2)
        );
        assert!(matches!(
            result.result_with(ResultOverrides::default().without_default()),
            Err(QueryError::NotFound { .. })
        ));

        let result = config().query("port", QueryOptions::new());
        assert_eq!(
            result
                .result_with(ResultOverrides::default().cast(Cast::integer()))
                .unwrap(),
            Value::Integer(42)
        );
    }

    #[test]
    fn invalid_key_does_not_abort_the_search() {
        // "list.x" is malformed for layer b only
        let mut config = config();
        config
            .layer_mut("a")
            .unwrap()
            .set("list.x", "found".into(), true)
            .unwrap();

        let result = config.query("list.x", QueryOptions::new());

        assert!(matches!(
            result.attempts()[1].outcome,
            Err(PathError::InvalidKey { .. })
        ));
        assert_eq!(result.result().unwrap(), Value::from("found"));
    }

    #[test]
    fn layer_filter() {
        let result = config().query("shared", QueryOptions::new().layer("a"));
        assert_eq!(result.attempts().len(), 1);
        assert_eq!(result.result().unwrap(), Value::from("from a"));

        let result = config().query("shared", QueryOptions::new().layer("b"));
        assert_eq!(result.state(), QueryState::Failed);

        let result = config().query("shared", QueryOptions::new().layer("unknown"));
        assert!(result.attempts().is_empty());
        assert_eq!(result.state(), QueryState::Failed);
    }

    #[test]
    fn execute_is_idempotent() {
        let mut config = config();
        let mut result = QueryResult::new("late", QueryOptions::new());

        assert!(!result.execute(&config));

        config
            .layer_mut("a")
            .unwrap()
            .set("late", true.into(), true)
            .unwrap();

        assert!(!result.execute(&config));
        assert_eq!(result.attempts().len(), 3);
        assert!(config.query("late", QueryOptions::new()).is_success());
    }

    #[test]
    fn deserialize_result() {
        let result = config().query("list", QueryOptions::new());
        assert_eq!(result.deserialize::<Vec<u8>>().unwrap(), vec![1, 2]);

        let result = config().query("shared", QueryOptions::new());
        assert!(matches!(
            result.deserialize::<u8>(),
            Err(QueryError::Deserialize { .. })
        ));
    }

    #[test]
    fn display_trail() {
        let result = config().query("only_a", QueryOptions::new());

        assert_eq!(
            result.to_string(),
            "only_a (succeeded)\n  c: key \"only_a\" of \"only_a\" not found\n  b: key \"only_a\" of \"only_a\" not found\n  a: 1"
        );
    }
}
