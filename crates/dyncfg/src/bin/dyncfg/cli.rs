//! dyncfg cli interface

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
    /// This is equivalent to running { cd <directory>; dyncfg ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge configuration files and print the result
    ///
    /// Reads YAML from stdin unless files are provided (via -f)
    Merge(MergeCommand),

    /// Print the value at a path of the merged configuration
    Get(GetCommand),

    /// Print where the value at a path was defined, most relevant first
    Locate(LocateCommand),
}

#[derive(Parser, Debug)]
pub struct MergeCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub output: OutputArgs,

    /// Apply locations reported by an external process (newline-delimited JSON)
    #[clap(long = "locations")]
    pub locations: Option<PathBuf>,

    /// Generated file whose locations are replaced by --locations
    #[clap(long = "virtual-file", requires("locations"))]
    pub virtual_file: Option<String>,
}

#[derive(Parser, Debug)]
pub struct GetCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub output: OutputArgs,

    /// Path of the value, e.g. `jobs.my_job.tasks[0]`
    pub path: String,
}

#[derive(Parser, Debug)]
pub struct LocateCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    /// Path of the value, e.g. `jobs.my_job.tasks[0]`
    pub path: String,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Load a file, later files take precedence
    ///
    /// Files ending in `.json` are read as JSON, everything else as YAML.
    #[clap(short = 'f', long = "input-file")]
    pub files: Vec<PathBuf>,

    /// Resolve ${...} references after merging
    #[clap(short = 'i', long = "interpolate")]
    pub interpolate: bool,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,

    /// Write JSON on a single line
    #[clap(long = "compact")]
    pub compact: bool,
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
