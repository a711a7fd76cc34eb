use crate::logger::Logger;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::{stdout, IsTerminal};

/// Overall progress of the deployment, one step per stack
pub(super) struct DeployProgress<'a> {
    multi_progress: &'a MultiProgress,
    total_progress_bar: ProgressBar,
    is_hidden: bool,
}

impl DeployProgress<'_> {
    /// Hidden progress prints nothing, for structured output
    pub(super) fn new(total_stacks: u64, is_hidden: bool) -> Self {
        let multi_progress = Logger::multi_progress();

        if is_hidden {
            return Self {
                multi_progress,
                total_progress_bar: ProgressBar::hidden(),
                is_hidden,
            };
        }

        let total_progress_bar = multi_progress.add(ProgressBar::new(total_stacks));

        let style = ProgressStyle::default_bar()
            .template(&format!(
                "   {} [{{bar:30}}] {{pos}}/{{len}} {{wide_msg:.dim}}",
                console::style("Deploying").cyan().bold()
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");

        total_progress_bar.set_style(style);
        total_progress_bar.set_position(0);

        Self {
            multi_progress,
            total_progress_bar,
            is_hidden,
        }
    }

    pub(super) fn new_progress(&self, stack_name: &str) -> Progress {
        if self.is_hidden {
            return Progress {
                progress_bar: ProgressBar::hidden(),
                stack_name: stack_name.to_string(),
                is_hidden: true,
            };
        }

        let progress_bar = self
            .multi_progress
            .insert_before(&self.total_progress_bar, ProgressBar::new_spinner());

        if let Ok(style) = ProgressStyle::with_template("{msg}") {
            progress_bar.set_style(style);
        }

        Progress {
            progress_bar,
            stack_name: stack_name.to_string(),
            is_hidden: false,
        }
    }

    pub(super) fn inc(&self) {
        self.total_progress_bar.inc(1);
    }

    pub(super) fn finish(&self) {
        self.total_progress_bar.finish_and_clear();
    }
}

pub(super) enum ProgressStatus {
    Success,
    Warn,
    Error,
}

/// Progress of a single stack
pub(super) struct Progress {
    progress_bar: ProgressBar,
    stack_name: String,
    is_hidden: bool,
}

impl Progress {
    pub(super) fn log_stage(&self, stage: &str) {
        if self.is_hidden {
            return;
        }

        let msg = format!(
            "{} {}",
            console::style(with_padding(stage)).green().bold(),
            self.stack_name,
        );

        // Terminal or CI/CD?
        if stdout().is_terminal() {
            self.progress_bar.println(msg);
        } else {
            self.progress_bar.suspend(|| {
                println!("{msg}");
            });
        }
    }

    pub(super) fn finish(&self, stage: &str, status: ProgressStatus, message: Option<&str>) {
        let stage = console::style(with_padding(stage)).bold();
        let stage = match status {
            ProgressStatus::Success => stage.green(),
            ProgressStatus::Warn => stage.yellow(),
            ProgressStatus::Error => stage.red(),
        };
        let message = message.map(|m| format!(": {m}")).unwrap_or_default();

        self.progress_bar
            .finish_with_message(format!("{} {}{}", stage, self.stack_name, message));
    }

    pub(super) fn error(&self, stage: &str) {
        self.finish(stage, ProgressStatus::Error, None);
    }
}

/// Right-align the stage name the way cargo does
fn with_padding(stage: &str) -> String {
    format!("{stage:>12}")
}

#[cfg(test)]
mod tests {
    use super::with_padding;

    #[test]
    fn stages_are_right_aligned() {
        assert_eq!(with_padding("Deploying"), "   Deploying");
        assert_eq!(with_padding("Unchanged").len(), 12);
    }
}
