mod cli;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use rustami::aws_config::{configure_aws, AwsSettings};
use rustami::{AwsCloud, ImageInventory, Result, UsageCollector};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbose flag when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("warn,rustami=debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = AwsSettings {
        region: cli.region,
        profile: cli.profile,
        max_attempts: cli.max_attempts,
    };
    let config = configure_aws(&settings).await;
    let collector = UsageCollector::new(AwsCloud::new(&config));

    match cli.command {
        Commands::Protected => {
            let protected = collector.collect_all().await?;
            output::print_protected(&mut std::io::stdout().lock(), cli.output, &protected)
        }
        Commands::Candidates { owners } => {
            let (inventory, protected) = futures::try_join!(
                ImageInventory::list_owned_images(collector.client(), &owners),
                collector.collect_all(),
            )?;
            output::print_candidates(
                &mut std::io::stdout().lock(),
                cli.output,
                inventory.unused(&protected),
            )
        }
    }
}
