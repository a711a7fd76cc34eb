mod runner;
use crate::config::CONFIG_FILE;
use crate::runner::{Runnable, Runner};
use crate::writer::Writer;
use clap::ArgAction;
use runner::BuildRunner;
use std::path::PathBuf;

#[derive(clap::Args, Clone)]
pub(crate) struct BuildCommand {
    /// Comma-separated list of blueprints to render (if not specified, all blueprints will be rendered)
    #[arg(value_delimiter = ',')]
    blueprints: Vec<String>,

    /// Path to the blueprints config
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Write every template into <BLUEPRINT>.json (or .yaml) in the directory instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Render YAML instead of JSON
    #[arg(long, action = ArgAction::SetTrue)]
    yaml: bool,
}

impl Runnable for BuildCommand {
    fn runner<'a>(&self, writer: &'a Writer) -> impl Runner + 'a {
        BuildRunner {
            command: self.clone(),
            writer,
        }
    }
}
