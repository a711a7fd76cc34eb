/// Display global error message in unified format
#[derive(Debug)]
pub struct Error(String, Option<String>);

impl Error {
    pub fn new(message: &str, details: Option<&str>) -> Self {
        Error(message.to_string(), details.map(|d| d.to_string()))
    }
}

/// Display the message and details, as sort of a hint
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.1 {
            Some(details) => write!(f, "{}\n\n{}", self.0, console::style(details).dim()),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Implement std::error::Error trait for Error
impl std::error::Error for Error {}

/// Automatically convert all eyre error reports
///
/// The causes of the report are shown as details, the full report goes to the log.
impl From<eyre::ErrReport> for Error {
    fn from(error: eyre::ErrReport) -> Self {
        log::error!("{error:?}");

        error.downcast::<Error>().unwrap_or_else(|err| {
            let causes = err
                .chain()
                .skip(1)
                .map(|cause| cause.to_string())
                .collect::<Vec<String>>();

            if causes.is_empty() {
                Error::new(&err.to_string(), None)
            } else {
                Error::new(&err.to_string(), Some(&causes.join("\n")))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::WrapErr;

    #[test]
    fn report_causes_become_details() {
        let report = Err::<(), _>(eyre::eyre!("Variable \"ApiName\" is missing"))
            .wrap_err("Failed to create api template")
            .unwrap_err();

        let error = Error::from(report);
        assert_eq!(error.0, "Failed to create api template");
        assert_eq!(error.1.as_deref(), Some("Variable \"ApiName\" is missing"));
    }

    #[test]
    fn wrapped_error_is_kept() {
        let error = Error::from(eyre::Report::new(Error::new("Config not found", Some("hint"))));
        assert_eq!(error.0, "Config not found");
        assert_eq!(error.1.as_deref(), Some("hint"));
    }
}
