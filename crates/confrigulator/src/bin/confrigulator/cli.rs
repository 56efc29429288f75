//! confrigulator cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; confrigulator ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[clap(flatten)]
    pub layers: LayerArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Parser, Debug)]
pub struct LayerArgs {
    /// Add a yaml or json file as layer
    ///
    /// Can be specified multiple times. Files given later take precedence.
    #[clap(short = 'f', long = "layer-file", global(true))]
    pub files: Vec<PathBuf>,

    /// Add environment variables starting with this prefix as the topmost layer
    #[clap(short = 'e', long = "env-prefix", global(true))]
    pub env_prefix: Option<String>,

    /// Separator between prefix and path segments in environment variable names
    #[clap(long = "env-separator", default_value = "__", global(true))]
    pub env_separator: String,

    /// Path delimiter
    #[clap(short = 'D', long = "delimiter", default_value = ".", global(true))]
    pub delimiter: String,

    /// Open file layers for writing
    #[clap(short = 'w', long = "writable", global(true))]
    pub writable: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List layer names, lowest precedence first
    Index,

    /// Print the value at a path
    Get(GetCommand),

    /// Show which layers were consulted for a path
    Explain(ExplainCommand),

    /// Set a value in one layer and write it back
    Set(SetCommand),
}

#[derive(Parser, Debug)]
pub struct QueryArgs {
    /// Path to look up, e.g. server.ports.0
    pub path: String,

    /// Stop at the first layer holding the path
    #[clap(long = "first")]
    pub first: bool,

    /// Only consult the layer with this name
    #[clap(short = 'l', long = "layer")]
    pub layer: Option<String>,
}

#[derive(Parser, Debug)]
pub struct GetCommand {
    #[clap(flatten)]
    pub query: QueryArgs,

    /// Cast the found value
    #[arg(short = 'c', long = "cast")]
    pub cast: Option<CastKind>,

    /// Value returned when no layer holds the path (yaml syntax)
    #[arg(short = 'd', long = "default")]
    pub default: Option<String>,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct ExplainCommand {
    #[clap(flatten)]
    pub query: QueryArgs,
}

#[derive(Parser, Debug)]
pub struct SetCommand {
    /// Name of the layer to change
    pub layer: String,

    /// Path to set
    pub path: String,

    /// New value (yaml syntax)
    pub value: String,

    /// Fail instead of creating missing objects
    #[clap(long = "no-create")]
    pub no_create: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum CastKind {
    Integer,
    Decimal,
    Boolean,
    String,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}
