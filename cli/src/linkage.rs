use crate::blueprints;
use crate::config::Config;
use eyre::eyre;
use gateway_template::Template;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;

/// A stored parameter wired incorrectly between the stacks
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Problem {
    /// More than one stack writes the same parameter
    Duplicate {
        name: String,
        blueprints: Vec<String>,
    },

    /// A stack reads a parameter nobody writes
    Dangling {
        name: String,
        blueprints: Vec<String>,
    },
}

impl Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Problem::Duplicate { name, blueprints } => write!(
                f,
                "Parameter {name} is stored more than once, by: {}",
                blueprints.join(", ")
            ),
            Problem::Dangling { name, blueprints } => write!(
                f,
                "Parameter {name} is never stored, but read by: {}",
                blueprints.join(", ")
            ),
        }
    }
}

/// Cross-stack view of SSM parameters: who writes and who reads each of them
///
/// Parameter names are global for the account and region, so all stacks
/// of the set share one namespace.
#[derive(Debug, Default)]
pub struct Linkage {
    stored: BTreeMap<String, Vec<String>>,
    read: BTreeMap<String, Vec<String>>,
}

impl Linkage {
    /// Parameters written outside of this set of stacks count as stored
    pub fn new(external: &[String]) -> Self {
        let mut linkage = Self::default();

        for name in external {
            linkage
                .stored
                .entry(name.clone())
                .or_default()
                .push("external".to_string());
        }

        linkage
    }

    pub fn add(&mut self, blueprint: &str, template: &Template) -> eyre::Result<()> {
        for name in template.stored_parameters() {
            self.stored
                .entry(name)
                .or_default()
                .push(blueprint.to_string());
        }

        for name in template.references()?.ssm {
            let readers = self.read.entry(name).or_default();

            if !readers.iter().any(|r| r == blueprint) {
                readers.push(blueprint.to_string());
            }
        }

        Ok(())
    }

    pub fn problems(&self) -> Vec<Problem> {
        let duplicates = self
            .stored
            .iter()
            .filter(|(_, writers)| writers.len() > 1)
            .map(|(name, writers)| Problem::Duplicate {
                name: name.clone(),
                blueprints: writers.clone(),
            });

        let dangling = self
            .read
            .iter()
            .filter(|(name, _)| !self.stored.contains_key(*name))
            .map(|(name, readers)| Problem::Dangling {
                name: name.clone(),
                blueprints: readers.clone(),
            });

        duplicates.chain(dangling).collect()
    }

    pub fn verify(&self) -> eyre::Result<()> {
        let problems = self.problems();

        if problems.is_empty() {
            return Ok(());
        }

        for problem in problems.iter() {
            log::error!("{problem}");
        }

        Err(eyre!(
            "Stacks are not linked correctly:\n{}",
            problems
                .iter()
                .map(|p| format!("  {p}"))
                .collect::<Vec<String>>()
                .join("\n")
        ))
    }
}

/// Templates of all blueprints, verified to be linked with each other
///
/// Always covers the full set, even when only some stacks are built or deployed,
/// otherwise a lookup could point at a parameter of a stack left out.
pub fn link(config: &Config) -> eyre::Result<Vec<(&'static str, Template)>> {
    let templates = blueprints::create_all(config)?;
    let mut linkage = Linkage::new(&config.stack.external_parameters);

    for (name, template) in templates.iter() {
        linkage.add(name, template)?;
    }

    linkage.verify()?;
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprints::fixture;
    use gateway_template::resources::ssm;
    use gateway_template::{Expr, Template};

    fn writer(names: &[&str]) -> Template {
        let mut template = Template::new("writer");

        for (i, name) in names.iter().enumerate() {
            template
                .add_resource(
                    &format!("Parameter{i}"),
                    ssm::Parameter::string(name, "value".into()),
                )
                .unwrap();
        }

        template
    }

    fn reader(names: &[&str]) -> Template {
        let mut template = Template::new("reader");

        for (i, name) in names.iter().enumerate() {
            template
                .add_resource(
                    &format!("Copy{i}"),
                    ssm::Parameter::string(&format!("/copy{i}"), Expr::ssm(name)),
                )
                .unwrap();
        }

        template
    }

    #[test]
    fn default_blueprints_are_linked() {
        let config = fixture::config();
        let mut linkage = Linkage::new(&config.stack.external_parameters);

        for (name, template) in blueprints::create_all(&config).unwrap() {
            linkage.add(name, &template).unwrap();
        }

        assert!(linkage.problems().is_empty());
        assert_eq!(link(&config).unwrap().len(), 3);
    }

    #[test]
    fn dangling_lookup() {
        let mut linkage = Linkage::new(&[]);
        linkage.add("reader", &reader(&["/missing"])).unwrap();

        assert_eq!(
            linkage.problems(),
            vec![Problem::Dangling {
                name: "/missing".into(),
                blueprints: vec!["reader".into()],
            }]
        );
        assert!(linkage.verify().is_err());
    }

    #[test]
    fn external_parameters_resolve_lookups() {
        let mut linkage = Linkage::new(&["/shared/vpc/id".to_string()]);
        linkage.add("reader", &reader(&["/shared/vpc/id"])).unwrap();
        assert!(linkage.problems().is_empty());
    }

    #[test]
    fn duplicate_names_across_stacks() {
        let mut linkage = Linkage::new(&[]);
        linkage.add("first", &writer(&["/api/id"])).unwrap();
        linkage.add("second", &writer(&["/api/id", "/other"])).unwrap();

        let problems = linkage.problems();
        assert_eq!(
            problems,
            vec![Problem::Duplicate {
                name: "/api/id".into(),
                blueprints: vec!["first".into(), "second".into()],
            }]
        );
        assert_eq!(
            problems[0].to_string(),
            "Parameter /api/id is stored more than once, by: first, second"
        );
    }
}
