use std::process::ExitCode;

use clap::Parser;
use plugin_release::cli::{self, Cli};
use plugin_release::logging;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(cli::run(cli.command))
}
