use clap::Parser;
use gclog::runtime::{boot, cli::Cli, run};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = boot::boot(&cli)?;
    if !run::run(cli.files, &config).await? {
        std::process::exit(1);
    }
    Ok(())
}
