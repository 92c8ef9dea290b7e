use car_price_api::cli::{self, Cli, Command};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::CheckModel(args) => cli::check_model::run(args).await,
    }
}
