mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "distpack", about = "Build a project for production and package it as a zip")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the project for production and create a zip archive
    Release {
        /// Directory to save the zip file (created if missing)
        destination: PathBuf,
        /// Name of the zip file (".zip" is appended if missing)
        filename: String,
        /// Project directory to package (default: current directory)
        #[arg(long, short = 'C')]
        project_dir: Option<PathBuf>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the files the ignore file would remove, without building
    Preview {
        /// Project directory to inspect (default: current directory)
        #[arg(long, short = 'C')]
        project_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Release {
            destination,
            filename,
            project_dir,
            json,
        } => {
            let project_dir = project_dir.unwrap_or_else(|| PathBuf::from("."));
            commands::release(&project_dir, &destination, &filename, json).await?
        }
        Commands::Preview { project_dir } => {
            let project_dir = project_dir.unwrap_or_else(|| PathBuf::from("."));
            commands::preview(&project_dir)?
        }
    }

    Ok(())
}
