mod progress;
mod runner;
use crate::config::CONFIG_FILE;
use crate::runner::{Runnable, Runner};
use crate::writer::Writer;
use runner::DeployRunner;
use std::path::PathBuf;

#[derive(clap::Args, Clone)]
pub(crate) struct DeployCommand {
    /// The set of blueprints to deploy, comma separated (all of them by default)
    #[arg(value_delimiter = ',')]
    blueprints: Vec<String>,

    /// Path to the blueprints config
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,
}

impl Runnable for DeployCommand {
    fn runner<'a>(&self, writer: &'a Writer) -> impl Runner + 'a {
        DeployRunner {
            command: self.clone(),
            writer,
        }
    }
}
