mod runner;
use crate::config::CONFIG_FILE;
use crate::runner::{Runnable, Runner};
use crate::writer::Writer;
use runner::CheckRunner;
use std::path::PathBuf;

#[derive(clap::Args, Clone)]
pub(crate) struct CheckCommand {
    /// Path to the blueprints config
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,
}

impl Runnable for CheckCommand {
    fn runner<'a>(&self, writer: &'a Writer) -> impl Runner + 'a {
        CheckRunner {
            command: self.clone(),
            writer,
        }
    }
}
