use clap::{Args, Subcommand};
use engine_config::settings::profile::{HeaderMode, ImportProfile};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Import a file through the remote batch endpoint
    Import {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, help = "Target dataset or account id (env: SLUICE_TARGET)")]
        target: Option<String>,

        #[arg(long, help = "Batch endpoint URL (env: SLUICE_ENDPOINT)")]
        endpoint: Option<String>,

        #[arg(
            long,
            help = "Per-batch call timeout in seconds, 0 disables (env: SLUICE_CALL_TIMEOUT_SECS)"
        )]
        timeout_secs: Option<u64>,

        #[arg(long, help = "Load additional variables from this .env file")]
        env_file: Option<PathBuf>,

        #[arg(
            long,
            help = "If specified, writes the JSON report to this file instead of stdout"
        )]
        output: Option<PathBuf>,

        #[arg(long, help = "Print the final summary as JSON instead of a table")]
        json: bool,
    },
    /// Show how a file would be split into batches without sending anything
    Plan {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, help = "Print the plan as JSON instead of a table")]
        json: bool,
    },
}

/// Input options shared by `import` and `plan`.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    #[arg(long, help = "Path to the delimited text file")]
    pub file: PathBuf,

    #[arg(long, help = "Data lines per batch (env: SLUICE_BATCH_SIZE)")]
    pub batch_size: Option<usize>,

    #[arg(long, help = "Importer profile: generic or users")]
    pub profile: Option<ImportProfile>,

    #[arg(long, help = "Header handling: auto, always or never")]
    pub header: Option<HeaderMode>,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Comma separated header markers, replacing the profile's"
    )]
    pub markers: Vec<String>,
}
