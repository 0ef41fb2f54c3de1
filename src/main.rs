use alerts_export::Cli;
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_normalized();
    cli.run().await
}
