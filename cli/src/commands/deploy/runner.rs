use super::progress::{DeployProgress, ProgressStatus};
use crate::blueprints;
use crate::commands::deploy::DeployCommand;
use crate::config::Config;
use crate::error::Error;
use crate::linkage;
use crate::runner::Runner;
use crate::stack::{Provision, Stack, Status};
use crate::writer::Writer;
use gateway_template::{Format, Template};
use serde_json::json;

pub(crate) struct DeployRunner<'a> {
    pub(crate) command: DeployCommand,
    pub(crate) writer: &'a Writer,
}

impl Runner for DeployRunner<'_> {
    /// Provision the stacks one by one, in the deployment order
    async fn run(&mut self) -> Result<(), Error> {
        let config = self.config(&self.command.config)?;

        let selected = blueprints::select(&self.command.blueprints)?
            .iter()
            .map(|b| b.name())
            .collect::<Vec<&str>>();

        let templates = linkage::link(&config)?
            .into_iter()
            .filter(|(name, _)| selected.contains(name))
            .collect::<Vec<(&str, Template)>>();

        let progress = DeployProgress::new(templates.len() as u64, self.writer.is_structured());
        let mut deployed = vec![];

        for (name, template) in templates.iter() {
            let (stack_name, provision) = match self.deploy(&config, name, template, &progress).await {
                Ok(deployed) => deployed,
                Err(e) => {
                    progress.finish();
                    return Err(e);
                }
            };

            deployed.push(json!({
                "blueprint": name,
                "stack": stack_name,
                "result": provision.to_string(),
            }));

            progress.inc();
        }

        progress.finish();

        self.writer.text(&format!(
            "{} {} stack(s)\n",
            console::style("    Deployed").green().bold(),
            deployed.len()
        ))?;

        self.writer.json(json!({ "stacks": deployed }))
    }
}

impl DeployRunner<'_> {
    /// Submit the template of one blueprint and wait until the stack settles
    async fn deploy(
        &self,
        config: &Config,
        name: &str,
        template: &Template,
        progress: &DeployProgress<'_>,
    ) -> Result<(String, Provision), Error> {
        let stack_name = config.stack_name(name);
        let stack = Stack::new(&stack_name, config.stack.region.as_deref()).await;
        let stack_progress = progress.new_progress(&stack_name);
        stack_progress.log_stage("Deploying");

        let body = template.render(Format::Json)?;

        let provision = stack.provision(&body).await.inspect_err(|e| {
            log::error!("Failed to provision stack {stack_name}: {e:?}");
            stack_progress.error("Failed");
        })?;

        if provision == Provision::Unchanged {
            stack_progress.finish("Unchanged", ProgressStatus::Warn, Some("no updates"));
            return Ok((stack_name, provision));
        }

        let status = stack.wait().await.inspect_err(|e| {
            log::error!("Failed to get status of stack {stack_name}: {e:?}");
            stack_progress.error("Failed");
        })?;

        match status {
            Status::Failed(reason) => {
                stack_progress.finish("Failed", ProgressStatus::Error, Some(&reason));

                Err(self.error(
                    Some(&format!("Stack {stack_name} failed to deploy")),
                    Some(&reason),
                    None,
                ))
            }

            _ => {
                stack_progress.finish("Deployed", ProgressStatus::Success, None);
                Ok((stack_name, provision))
            }
        }
    }
}
