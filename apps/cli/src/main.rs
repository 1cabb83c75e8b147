//! papercut CLI: split exam papers into questions, search them, recompose.
//!
//! Question files and a CSV index are written under an output directory;
//! queries select question files by fuzzy text match and compose them onto
//! compact A4 sheets.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
