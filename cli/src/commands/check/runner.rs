use crate::blueprints;
use crate::commands::check::CheckCommand;
use crate::error::Error;
use crate::linkage::Linkage;
use crate::runner::Runner;
use crate::writer::Writer;
use serde_json::json;

pub(crate) struct CheckRunner<'a> {
    pub(crate) command: CheckCommand,
    pub(crate) writer: &'a Writer,
}

impl Runner for CheckRunner<'_> {
    /// Create all templates and report every linkage problem found
    async fn run(&mut self) -> Result<(), Error> {
        let config = self.config(&self.command.config)?;
        let templates = blueprints::create_all(&config)?;
        let mut linkage = Linkage::new(&config.stack.external_parameters);
        let mut summary = vec![];

        for (name, template) in templates.iter() {
            linkage.add(name, template)?;
            let resources = template.resources().count();

            self.writer.text(&format!(
                "{} {name} {}\n",
                console::style("     Checked").green().bold(),
                console::style(format!("({resources} resources)")).dim()
            ))?;

            summary.push(json!({
                "name": name,
                "stack": config.stack_name(name),
                "resources": resources,
            }));
        }

        let problems = linkage.problems();

        for problem in problems.iter() {
            self.writer.text(&format!(
                "{} {problem}\n",
                console::style("     Problem").red().bold()
            ))?;
        }

        self.writer.json(json!({
            "blueprints": summary,
            "problems": problems,
        }))?;

        if !problems.is_empty() {
            return Err(self.error(
                Some("Stacks are not linked correctly"),
                Some(&format!("Found {} problem(s)", problems.len())),
                None,
            ));
        }

        self.writer.text(&format!(
            "{} all parameters are linked\n",
            console::style("        Done").green().bold()
        ))?;

        Ok(())
    }
}
