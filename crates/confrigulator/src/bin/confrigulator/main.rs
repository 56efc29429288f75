mod cli;

use confrigulator::layer::{FileLayer, Layer, MemoryLayer};
use confrigulator::{Cast, Config, PathResolver, QueryOptions, Value};

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("CONFRIGULATOR_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = load(&cli.layers).and_then(|config| match cli.command {
        cli::Command::Index => index(&config),
        cli::Command::Get(get_cli) => get(&config, get_cli),
        cli::Command::Explain(explain_cli) => explain(&config, explain_cli),
        cli::Command::Set(set_cli) => set(config, set_cli),
    });

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

fn load(input: &cli::LayerArgs) -> anyhow::Result<Config> {
    anyhow::ensure!(!input.delimiter.is_empty(), "Delimiter must not be empty");
    let resolver = PathResolver::new(input.delimiter.as_str());

    let mut config = Config::new();
    for file_path in &input.files {
        let layer = FileLayer::open(file_path, input.writable)?.with_resolver(resolver.clone());
        config.insert_layer(layer, None);
    }

    if let Some(prefix) = &input.env_prefix {
        anyhow::ensure!(
            !input.env_separator.is_empty(),
            "Environment separator must not be empty"
        );
        let layer = MemoryLayer::from_env("env", prefix, &input.env_separator)
            .with_resolver(resolver.clone());
        config.insert_layer(layer, None);
    }

    anyhow::ensure!(!config.is_empty(), "No layers loaded");

    Ok(config)
}

fn query_options(query: &cli::QueryArgs) -> QueryOptions {
    let mut options = QueryOptions::new().return_first(query.first);
    if let Some(layer) = &query.layer {
        options = options.layer(layer.as_str());
    }
    options
}

fn index(config: &Config) -> anyhow::Result<()> {
    for name in config.index() {
        println!("{name}");
    }
    Ok(())
}

fn get(config: &Config, cli: cli::GetCommand) -> anyhow::Result<()> {
    let mut options = query_options(&cli.query);

    if let Some(cast) = cli.cast {
        options = options.cast(match cast {
            cli::CastKind::Integer => Cast::integer(),
            cli::CastKind::Decimal => Cast::decimal(),
            cli::CastKind::Boolean => Cast::boolean(),
            cli::CastKind::String => Cast::string(),
        });
    }

    if let Some(default) = &cli.default {
        options = options.with_default(parse_value(default)?);
    }

    let value = config.query(&cli.query.path, options).result()?;
    output(&cli.output, &value)
}

fn explain(config: &Config, cli: cli::ExplainCommand) -> anyhow::Result<()> {
    let result = config.query(&cli.query.path, query_options(&cli.query));
    println!("{result}");
    Ok(())
}

fn set(mut config: Config, cli: cli::SetCommand) -> anyhow::Result<()> {
    let value = parse_value(&cli.value)?;

    let layer: &mut dyn Layer = config
        .layer_mut(&cli.layer)
        .ok_or_else(|| anyhow::anyhow!("No layer named {:?}", cli.layer))?;

    let changed = layer.set(&cli.path, value, !cli.no_create)?;
    anyhow::ensure!(changed, "{:?} does not exist in layer {:?}", cli.path, cli.layer);

    layer.write()?;
    Ok(())
}

/// Reads a command line value the way it would be read from a yaml file
fn parse_value(raw: &str) -> anyhow::Result<Value> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(raw)?;
    Ok(Value::from_yaml(yaml)?)
}

fn output(output: &cli::OutputArgs, value: &Value) -> anyhow::Result<()> {
    match output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), value)?,
        cli::OutputFormat::Json => {
            serde_json::to_writer_pretty(std::io::stdout(), value)?;
            println!();
        }
    };

    Ok(())
}
