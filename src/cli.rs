use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "rustami")]
#[command(about = "Find which AMIs are still in use before cleaning up the rest")]
#[command(version)]
pub struct Cli {
    /// AWS region, falls back to the default provider chain
    #[arg(short, long, global = true, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Named profile from the shared AWS config
    #[arg(short, long, global = true, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Attempts per API call before giving up
    #[arg(long, global = true, default_value_t = rustami::aws_config::DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the ids of every AMI that is in use
    Protected,

    /// List owned AMIs that nothing uses
    Candidates {
        /// Image owners to inventory
        #[arg(long = "owner", default_value = "self")]
        owners: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
