use crate::config::Config;
use crate::error::Error;
use crate::writer::Writer;
use std::error::Error as StdError;
use std::path::Path;

pub(crate) trait Runner {
    /// Blueprints configuration, from the path passed to the command
    fn config(&self, path: &Path) -> Result<Config, Error> {
        if !path.exists() {
            return Err(self.error(
                Some("Config not found"),
                Some(&format!(
                    "Create {} or pass the path with --config",
                    path.display()
                )),
                None,
            ));
        }

        Ok(Config::from_path(path)?)
    }

    /// Run the command
    ///
    /// Returns an error shown to the user in case of failure
    async fn run(&mut self) -> Result<(), Error>;

    /// Construct an error shown to the user
    fn error(
        &self,
        title: Option<&str>,
        description: Option<&str>,
        origin: Option<Box<dyn StdError>>,
    ) -> Error {
        if let Some(origin) = origin {
            log::error!("{origin:?}");
        }

        if let Some(title) = title {
            Error::new(title, description)
        } else {
            Error::new(
                "Failed to run the command",
                Some("Run with RUST_LOG=debug to see the details"),
            )
        }
    }
}

/// Return a runner for a command
pub(crate) trait Runnable {
    fn runner<'a>(&self, writer: &'a Writer) -> impl Runner + 'a;
}
