//! Blueprints declaring the resources of one API, each rendered into a separate stack
//!
//! The stacks are linked only through SSM parameters: `api` stores the IDs
//! of the REST API and its resources, `lambda` and `integrations` look them up
//! with `{{resolve:ssm:...}}` at deploy time.
mod api;
mod integrations;
mod lambda;

use crate::config::Config;
use eyre::{eyre, WrapErr};
use gateway_template::Template;

pub use api::ApiBlueprint;
pub use integrations::IntegrationsBlueprint;
pub use lambda::LambdaBlueprint;

pub trait Blueprint {
    /// Short name, used in file and stack names
    fn name(&self) -> &'static str;

    /// Declare all resources of the blueprint in a new template
    fn create_template(&self, config: &Config) -> eyre::Result<Template>;
}

/// All blueprints in the order their stacks must be deployed
///
/// Methods need the API resources, the deployment needs the methods.
pub fn all() -> Vec<Box<dyn Blueprint>> {
    vec![
        Box::new(ApiBlueprint),
        Box::new(LambdaBlueprint),
        Box::new(IntegrationsBlueprint),
    ]
}

/// Blueprints with the given names, keeping the deployment order
///
/// Empty list of names means all blueprints.
pub fn select(names: &[String]) -> eyre::Result<Vec<Box<dyn Blueprint>>> {
    let known = all();

    for name in names {
        if !known.iter().any(|b| b.name() == name) {
            return Err(eyre!(
                "Unknown blueprint {name:?}, expected one of: {}",
                known
                    .iter()
                    .map(|b| b.name())
                    .collect::<Vec<&str>>()
                    .join(", ")
            ));
        }
    }

    Ok(known
        .into_iter()
        .filter(|b| names.is_empty() || names.iter().any(|n| n == b.name()))
        .collect())
}

/// Template of every blueprint, validated
pub fn create_all(config: &Config) -> eyre::Result<Vec<(&'static str, Template)>> {
    all()
        .iter()
        .map(|blueprint| {
            let template = blueprint
                .create_template(config)
                .and_then(|template| template.validate().map(|_| template))
                .wrap_err(format!("Failed to create {} template", blueprint.name()))?;

            log::info!(
                "Created {} template with {} resources",
                blueprint.name(),
                template.resources().count()
            );

            Ok((blueprint.name(), template))
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod fixture {
    use crate::config::Config;

    pub(crate) fn config() -> Config {
        Config::parse(
            r#"
            [variables]
            ApiName = "registration-api"
            ApiUsagePlanName = "registration-usage-plan"
            ApiKeyName = "registration-key"
            BucketName = "registration-builds"
            RegistrationLambdaName = "registration"
            SharedSecretsId = "shared-secrets"
            "#,
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_keeps_deployment_order() {
        let names = select(&["integrations".to_string(), "api".to_string()])
            .unwrap()
            .iter()
            .map(|b| b.name())
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["api", "integrations"]);
        assert_eq!(select(&[]).unwrap().len(), 3);
        assert!(select(&["database".to_string()]).is_err());
    }

    #[test]
    fn every_blueprint_validates() {
        let templates = create_all(&fixture::config()).unwrap();
        let names = templates.iter().map(|(n, _)| *n).collect::<Vec<_>>();
        assert_eq!(names, vec!["api", "lambda", "integrations"]);
    }

    #[test]
    fn missing_variable_names_the_blueprint() {
        let config = Config::parse("").unwrap();
        let error = create_all(&config).unwrap_err();
        assert!(format!("{error:#}").contains("api template"));
    }
}
