//! `cfgfold` command-line tool
//!
//! - `merge`: fold config files left to right and print the result
//! - `inspect`: show where a config file came from and what it holds

mod commands;
mod logging;

use clap::Parser;

use crate::commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, cli.json_logs)?;

    let output = commands::run(cli.command).await?;
    println!("{output}");
    Ok(())
}
