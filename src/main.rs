use clap::Parser;

use arby::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            if let Err(e) = arby::cli::run_engine().await {
                eprintln!("arby exited with error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Status => arby::cli::show_status(),
    }
}
