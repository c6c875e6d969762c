// Lectern Main Entry Point
// Copyright (c) 2026 The Lectern Authors

use lectern_core::config::Config;
use lectern_core::models::LectureRequest;
use lectern_core::pipeline::content::ContentGenerator;
use lectern_core::pipeline::markdown;
use lectern_core::server::{start_server, AppState};

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "lectern-core")]
#[command(about = "AI lecture video generation backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server
    Serve {
        /// Port to run the server on
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },

    /// Generate a lecture document offline (no media vendors touched)
    Lecture {
        /// Lecture topic
        #[arg(short, long)]
        topic: String,

        /// Duration in minutes
        #[arg(short, long, default_value_t = 10)]
        duration: u32,

        /// Difficulty level (beginner/intermediate/advanced)
        #[arg(long, default_value = "beginner")]
        difficulty: String,

        /// Write the markdown here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // One strict policy everywhere: missing credentials refuse to start.
    let config = Config::from_env()?;

    match cli.command {
        Commands::Serve { port } => {
            let state = Arc::new(AppState::new(config));
            start_server(port, state).await?;
        }
        Commands::Lecture {
            topic,
            duration,
            difficulty,
            output,
        } => {
            let generator = ContentGenerator::new(&config);
            let request = LectureRequest::for_topic(topic.clone(), duration, difficulty);
            let slides = generator.generate_lecture(&request).await;
            let document = markdown::format_lecture(&topic, &slides);

            match output {
                Some(path) => {
                    tokio::fs::write(&path, &document).await?;
                    info!("Lecture written to {}", path.display());
                }
                None => println!("{document}"),
            }
        }
    }

    Ok(())
}
