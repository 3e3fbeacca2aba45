//! dmaudit CLI: audit a directory tree, print the report, persist a JSON snapshot.

use anyhow::Result;
use clap::Parser;
use dmaudit::engine::arg_parser::Cli;
use dmaudit::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
