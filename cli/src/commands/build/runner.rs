use crate::blueprints;
use crate::commands::build::BuildCommand;
use crate::error::Error;
use crate::linkage;
use crate::runner::Runner;
use crate::writer::Writer;
use eyre::WrapErr;
use gateway_template::{Format, Template};
use serde_json::json;
use std::path::{Path, PathBuf};

pub(crate) struct BuildRunner<'a> {
    pub(crate) command: BuildCommand,
    pub(crate) writer: &'a Writer,
}

impl Runner for BuildRunner<'_> {
    /// Render the templates into files or stdout
    async fn run(&mut self) -> Result<(), Error> {
        let config = self.config(&self.command.config)?;
        let format = if self.command.yaml {
            Format::Yaml
        } else {
            Format::Json
        };

        let selected = blueprints::select(&self.command.blueprints)?
            .iter()
            .map(|b| b.name())
            .collect::<Vec<&str>>();

        let templates = linkage::link(&config)?
            .into_iter()
            .filter(|(name, _)| selected.contains(name))
            .collect::<Vec<(&str, Template)>>();

        match &self.command.out {
            Some(dir) => self.write_files(dir, &templates, format),
            None => self.print(&templates, format),
        }
    }
}

impl BuildRunner<'_> {
    /// Save each template into its own file in the directory
    fn write_files(
        &self,
        dir: &Path,
        templates: &[(&str, Template)],
        format: Format,
    ) -> Result<(), Error> {
        std::fs::create_dir_all(dir)
            .wrap_err(format!("Failed to create directory {}", dir.display()))?;

        let mut written: Vec<(&str, PathBuf)> = vec![];

        for (name, template) in templates {
            let path = dir.join(format!("{name}.{}", format.extension()));

            std::fs::write(&path, template.render(format)?)
                .wrap_err(format!("Failed to write {}", path.display()))?;

            log::info!("Template {name} written to {}", path.display());

            self.writer.text(&format!(
                "{} {}\n",
                console::style("    Rendered").green().bold(),
                path.display()
            ))?;

            written.push((name, path));
        }

        self.writer.json(json!({
            "templates": written
                .iter()
                .map(|(name, path)| json!({"blueprint": name, "path": path}))
                .collect::<Vec<_>>(),
        }))
    }

    /// Print templates to stdout
    ///
    /// A single template is printed as is, several of them are keyed by the blueprint name
    /// in JSON or follow each other as YAML documents.
    fn print(&self, templates: &[(&str, Template)], format: Format) -> Result<(), Error> {
        if let [(_, template)] = templates {
            return self.writer.document(&template.render(format)?);
        }

        let output = match format {
            Format::Json => {
                let mut documents = serde_json::Map::new();

                for (name, template) in templates {
                    documents.insert(name.to_string(), template.to_value()?);
                }

                serde_json::to_string_pretty(&documents)
                    .wrap_err("Failed to serialize templates")?
            }

            Format::Yaml => templates
                .iter()
                .map(|(_, template)| template.render(format))
                .collect::<eyre::Result<Vec<String>>>()?
                .iter()
                .map(|document| format!("---\n{}", document.trim_end()))
                .collect::<Vec<String>>()
                .join("\n"),
        };

        self.writer.document(&output)
    }
}
