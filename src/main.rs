use anyhow::Result;
use clap::Parser;

mod cli;

use cli::{dispatch, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    annotrack::logging::init(cli.verbose);
    dispatch(cli.command)
}
