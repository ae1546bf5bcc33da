mod cli;

use dyncfg::{dynvar, jsonloader, jsonsaver, locations, visit, yamlloader, yamlsaver, Value};
use std::io::Write;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("DYNCFG_LOG"))
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

    let command_result = match cli.command {
        cli::Command::Merge(merge_cli) => merge(merge_cli),
        cli::Command::Get(get_cli) => get(get_cli),
        cli::Command::Locate(locate_cli) => locate(locate_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn merge(cli: cli::MergeCommand) -> anyhow::Result<()> {
    let mut value = load(&cli.input)?;

    if let Some(path) = &cli.locations {
        let file = std::fs::File::open(path)
            .map_err(|e| anyhow::anyhow!("Failed to open {}: {e}", path.display()))?;
        let tree = locations::LocationTree::parse(std::io::BufReader::new(file), None)?;
        value = locations::apply(&value, &tree, cli.virtual_file.as_deref())?;
    }

    output(&cli.output, &value)
}

pub fn get(cli: cli::GetCommand) -> anyhow::Result<()> {
    let value = load(&cli.input)?;
    let found = visit::get(&value, &cli.path)?;
    output(&cli.output, &found)
}

pub fn locate(cli: cli::LocateCommand) -> anyhow::Result<()> {
    let value = load(&cli.input)?;
    let found = visit::get(&value, &cli.path)?;

    let mut stdout = std::io::stdout().lock();
    for location in found.locations() {
        writeln!(stdout, "{location}")?;
    }
    Ok(())
}

/// Load and merge all inputs in order
fn load(input: &cli::InputArgs) -> anyhow::Result<Value> {
    let mut value = if input.files.is_empty() {
        yamlloader::load_yaml("<stdin>", std::io::stdin())?
    } else {
        let mut value = Value::NIL;
        for file_path in &input.files {
            let loaded = load_file(file_path)?;
            value = dyncfg::merge::merge(&value, &loaded)
                .map_err(|e| anyhow::anyhow!("Failed to merge {}: {e}", file_path.display()))?;
        }
        value
    };

    if input.interpolate {
        value = dynvar::interpolate(&value)?;
    }

    Ok(value)
}

fn load_file(file_path: &std::path::Path) -> anyhow::Result<Value> {
    let file = std::fs::File::open(file_path)
        .map_err(|e| anyhow::anyhow!("Failed to open {}: {e}", file_path.display()))?;
    let reader = std::io::BufReader::new(file);
    let name = file_path.to_string_lossy();

    let value = match file_path.extension().and_then(|e| e.to_str()) {
        Some("json") => jsonloader::load_json(&name, reader)?,
        _ => yamlloader::load_yaml(&name, reader)?,
    };

    tracing::debug!(file = %name, "loaded");
    Ok(value)
}

fn output(output: &cli::OutputArgs, value: &Value) -> anyhow::Result<()> {
    let stdout = std::io::stdout().lock();
    match output.format {
        cli::OutputFormat::Yaml => yamlsaver::write_yaml(stdout, value)?,
        cli::OutputFormat::Json if output.compact => jsonsaver::write_json(stdout, value, None)?,
        cli::OutputFormat::Json => jsonsaver::write_json(stdout, value, Some("  "))?,
    };

    Ok(())
}
