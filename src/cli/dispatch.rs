use annotrack::commands::{export, image, init, next, record, status};
use annotrack::completions::{generate_completions, Shell};
use anyhow::Result;
use std::str::FromStr;

use super::types::{Cli, Commands, ImageCommands};

pub fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Init {
            dataset,
            batch_size,
            force,
        } => init::execute(dataset, batch_size, force),
        Commands::Status => status::execute(),
        Commands::Next => next::execute(),
        Commands::Record { payload, work_item } => record::execute(payload, work_item),
        Commands::Skip { work_item } => record::skip(work_item),
        Commands::Export { metadata_only } => export::execute(metadata_only),
        Commands::Image { command } => match command {
            ImageCommands::Save {
                file,
                document,
                page,
                bbox,
            } => image::save(file, document, page, bbox),
            ImageCommands::Cleanup { days } => image::cleanup(days),
        },
        Commands::Completions { shell } => {
            let shell = Shell::from_str(&shell)?;
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate_completions(&mut cmd, shell);
            Ok(())
        }
    }
}
