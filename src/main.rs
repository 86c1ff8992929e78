use clap::Parser;
use energy_prep::cli::{run, Cli};
use energy_prep::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
