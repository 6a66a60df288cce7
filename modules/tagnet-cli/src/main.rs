//! `tagnet`: build hashtag and mention co-occurrence graphs from post
//! snapshots, and fetch new snapshots from a streaming endpoint.

use anyhow::Result;
use clap::{Parser, Subcommand};
use dialoguer::Select;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "tagnet")]
#[command(about = "Co-occurrence graphs of hashtags and mentions")]
#[command(version)]
struct Cli {
    /// Never prompt; fail when a required argument is missing
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build graphs from a snapshot or raw text file and export them
    Plot(cmd::plot::PlotArgs),

    /// Fetch posts from the streaming endpoint and save a snapshot
    Fetch(cmd::fetch::FetchArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    let _ = dotenvy::dotenv();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("tagnet=info".parse()?)
                .add_directive("tagnet_graph=info".parse()?)
                .add_directive("tagnet_common=info".parse()?)
                .add_directive("stream_client=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Plot(args)) => cmd::plot::run(args, cli.quiet),
        Some(Commands::Fetch(args)) => cmd::fetch::run(args, cli.quiet).await,
        None if cli.quiet => anyhow::bail!("no command given; try `tagnet plot <FILE>`"),
        None => interactive_menu().await,
    }
}

async fn interactive_menu() -> Result<()> {
    let items = vec!["Plot a snapshot or text file", "Fetch from stream", "Exit"];

    let choice = Select::new()
        .with_prompt("What would you like to do?")
        .items(&items)
        .default(0)
        .interact()?;

    match choice {
        0 => cmd::plot::run(cmd::plot::PlotArgs::default(), false),
        1 => cmd::fetch::run(cmd::fetch::FetchArgs::default(), false).await,
        _ => Ok(()),
    }
}
