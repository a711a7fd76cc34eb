use crate::resources::ssm;
use crate::{Expr, LogicalId, References, ResourceType};
use eyre::{eyre, WrapErr};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

const FORMAT_VERSION: &str = "2010-09-09";

/// Output format of a rendered template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
        }
    }
}

/// Named entries in the order they were declared
#[derive(Debug, Clone)]
struct Entries<T>(Vec<(LogicalId, T)>);

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Entries(vec![])
    }
}

impl<T> Entries<T> {
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(id, _)| id.as_str() == name)
    }
}

impl<T: Serialize> Serialize for Entries<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;

        for (id, value) in self.0.iter() {
            map.serialize_entry(id.as_str(), value)?;
        }

        map.end()
    }
}

/// A resource as it appears under `Resources`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Declaration {
    #[serde(rename = "Type")]
    kind: &'static str,

    properties: Value,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<String>,
}

/// Input value of a template, provided when the stack is created
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    #[serde(rename = "Type")]
    pub kind: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Parameter {
    pub fn string(default: Option<&str>) -> Self {
        Parameter {
            kind: "String".to_string(),
            default: default.map(|d| d.to_string()),
            description: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Export {
    pub name: Expr,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub value: Expr,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<Export>,
}

impl Output {
    pub fn new(value: Expr) -> Self {
        Output {
            value,
            description: None,
            export: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Make the value importable by other stacks with `Fn::ImportValue`
    pub fn exported(mut self, name: impl Into<Expr>) -> Self {
        self.export = Some(Export { name: name.into() });
        self
    }
}

/// Accumulates parameters, resources and outputs of one CloudFormation stack
#[derive(Debug, Clone, Serialize)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    format_version: &'static str,

    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(rename = "Parameters", skip_serializing_if = "Entries::is_empty")]
    parameters: Entries<Parameter>,

    #[serde(rename = "Resources")]
    resources: Entries<Declaration>,

    #[serde(rename = "Outputs", skip_serializing_if = "Entries::is_empty")]
    outputs: Entries<Output>,
}

impl Template {
    pub fn new(description: &str) -> Self {
        Template {
            format_version: FORMAT_VERSION,
            description: Some(description.to_string()),
            parameters: Entries::default(),
            resources: Entries::default(),
            outputs: Entries::default(),
        }
    }

    /// Check the name is valid and not used by another resource or parameter
    fn declare(&self, name: &str) -> eyre::Result<LogicalId> {
        let id = LogicalId::new(name)?;

        if self.resources.contains(name) || self.parameters.contains(name) {
            return Err(eyre!("Logical ID {name:?} is declared more than once"));
        }

        Ok(id)
    }

    pub fn add_parameter(&mut self, name: &str, parameter: Parameter) -> eyre::Result<LogicalId> {
        let id = self.declare(name)?;
        self.parameters.0.push((id.clone(), parameter));
        Ok(id)
    }

    pub fn add_resource<R: ResourceType>(
        &mut self,
        name: &str,
        resource: R,
    ) -> eyre::Result<LogicalId> {
        self.add_resource_after(name, resource, &[])
    }

    /// Add a resource which CloudFormation creates only after `depends_on` ones
    pub fn add_resource_after<R: ResourceType>(
        &mut self,
        name: &str,
        resource: R,
        depends_on: &[&LogicalId],
    ) -> eyre::Result<LogicalId> {
        let id = self.declare(name)?;

        let properties = serde_json::to_value(&resource)
            .wrap_err(format!("Failed to serialize properties of {name}"))?;

        log::debug!("Declared {} {id}", R::TYPE);

        self.resources.0.push((
            id.clone(),
            Declaration {
                kind: R::TYPE,
                properties,
                depends_on: depends_on.iter().map(|d| d.to_string()).collect(),
            },
        ));

        Ok(id)
    }

    pub fn add_output(&mut self, name: &str, output: Output) -> eyre::Result<()> {
        let id = LogicalId::new(name)?;

        if self.outputs.contains(name) {
            return Err(eyre!("Output {name:?} is declared more than once"));
        }

        self.outputs.0.push((id, output));
        Ok(())
    }

    /// Logical IDs and types of all resources, in declaration order
    pub fn resources(&self) -> impl Iterator<Item = (&LogicalId, &'static str)> {
        self.resources.0.iter().map(|(id, d)| (id, d.kind))
    }

    /// Names of SSM parameters this template writes
    pub fn stored_parameters(&self) -> Vec<String> {
        self.resources
            .0
            .iter()
            .filter(|(_, d)| d.kind == ssm::Parameter::TYPE)
            .filter_map(|(_, d)| d.properties.get("Name").and_then(|n| n.as_str()))
            .map(|name| name.to_string())
            .collect()
    }

    /// Everything resources and outputs point at
    pub fn references(&self) -> eyre::Result<References> {
        let resources = serde_json::to_value(&self.resources)
            .wrap_err("Failed to serialize resources")?;

        let outputs =
            serde_json::to_value(&self.outputs).wrap_err("Failed to serialize outputs")?;

        let mut references = References::collect(&resources);
        let from_outputs = References::collect(&outputs);
        references.names.extend(from_outputs.names);
        references.ssm.extend(from_outputs.ssm);
        Ok(references)
    }

    /// Make sure every reference inside the template resolves
    ///
    /// `Ref`/`Fn::GetAtt`/`Fn::Sub` must point at a declared resource or parameter,
    /// `DependsOn` at a declared resource. SSM lookups are resolved outside the template.
    pub fn validate(&self) -> eyre::Result<()> {
        if self.resources.is_empty() {
            return Err(eyre!("Template has no resources"));
        }

        let mut unresolved: BTreeSet<String> = self
            .references()?
            .names
            .into_iter()
            .filter(|name| !self.resources.contains(name) && !self.parameters.contains(name))
            .collect();

        for (_, declaration) in self.resources.0.iter() {
            for dependency in declaration.depends_on.iter() {
                if !self.resources.contains(dependency) {
                    unresolved.insert(dependency.clone());
                }
            }
        }

        if !unresolved.is_empty() {
            return Err(eyre!(
                "Unresolved references: {}",
                unresolved.into_iter().collect::<Vec<String>>().join(", ")
            ));
        }

        Ok(())
    }

    pub fn to_value(&self) -> eyre::Result<Value> {
        serde_json::to_value(self).wrap_err("Failed to serialize template")
    }

    /// Validate and serialize the template
    pub fn render(&self, format: Format) -> eyre::Result<String> {
        self.validate().wrap_err("Template is invalid")?;

        match format {
            Format::Json => {
                serde_json::to_string_pretty(self).wrap_err("Failed to render template as JSON")
            }
            Format::Yaml => serde_saphyr::to_string(self)
                .map_err(|e| eyre!("Failed to render template as YAML: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::apigateway::{Resource, RestApi};
    use crate::resources::ssm;
    use serde_json::json;

    fn api() -> RestApi {
        RestApi {
            name: "test".into(),
            description: None,
            api_key_source_type: None,
            endpoint_configuration: None,
        }
    }

    #[test]
    fn duplicate_logical_ids_are_rejected() {
        let mut template = Template::new("test");
        template.add_resource("Api", api()).unwrap();

        assert!(template.add_resource("Api", api()).is_err());
        assert!(template
            .add_parameter("Api", Parameter::string(None))
            .is_err());
    }

    #[test]
    fn resources_keep_declaration_order() {
        let mut template = Template::new("test");
        let api_id = template.add_resource("Zeta", api()).unwrap();

        template
            .add_resource(
                "Alpha",
                Resource {
                    parent_id: api_id.get_att("RootResourceId"),
                    path_part: "login".into(),
                    rest_api_id: api_id.reference(),
                },
            )
            .unwrap();

        let rendered = template.render(Format::Json).unwrap();
        assert!(rendered.find("Zeta").unwrap() < rendered.find("Alpha").unwrap());
    }

    #[test]
    fn dangling_references_fail_validation() {
        let mut template = Template::new("test");

        template
            .add_resource(
                "LoginResource",
                Resource {
                    parent_id: Expr::GetAtt("Missing".into(), "RootResourceId".into()),
                    path_part: "login".into(),
                    rest_api_id: Expr::Ref("AlsoMissing".into()),
                },
            )
            .unwrap();

        let error = template.validate().unwrap_err().to_string();
        assert_eq!(error, "Unresolved references: AlsoMissing, Missing");
        assert!(template.render(Format::Json).is_err());
    }

    #[test]
    fn foreign_dependency_fails_validation() {
        let mut other = Template::new("other");
        let foreign = other.add_resource("Foreign", api()).unwrap();

        let mut template = Template::new("test");
        template.add_resource_after("Api", api(), &[&foreign]).unwrap();

        assert!(template.validate().is_err());
    }

    #[test]
    fn empty_template_is_invalid() {
        assert!(Template::new("test").validate().is_err());
    }

    #[test]
    fn document_layout() {
        let mut template = Template::new("Registration API");
        let bucket = template
            .add_parameter("Bucket", Parameter::string(Some("builds")))
            .unwrap();

        let api_id = template.add_resource("Api", api()).unwrap();

        template
            .add_resource_after(
                "ApiId",
                ssm::Parameter::string("/registration/api/id", api_id.reference()),
                &[&api_id],
            )
            .unwrap();

        template
            .add_output("ApiId", Output::new(api_id.reference()))
            .unwrap();

        template
            .add_output("Bucket", Output::new(bucket.reference()))
            .unwrap();

        template.validate().unwrap();
        let value = template.to_value().unwrap();

        assert_eq!(value["AWSTemplateFormatVersion"], json!("2010-09-09"));
        assert_eq!(value["Description"], json!("Registration API"));
        assert_eq!(
            value["Parameters"]["Bucket"],
            json!({"Type": "String", "Default": "builds"})
        );
        assert_eq!(
            value["Resources"]["ApiId"],
            json!({
                "Type": "AWS::SSM::Parameter",
                "Properties": {
                    "Name": "/registration/api/id",
                    "Type": "String",
                    "Value": {"Ref": "Api"},
                },
                "DependsOn": ["Api"],
            })
        );
        assert_eq!(value["Outputs"]["ApiId"], json!({"Value": {"Ref": "Api"}}));
        assert_eq!(template.stored_parameters(), vec!["/registration/api/id"]);
    }

    #[test]
    fn yaml_rendering() {
        let mut template = Template::new("test");
        template.add_resource("Api", api()).unwrap();

        let yaml = template.render(Format::Yaml).unwrap();
        assert!(yaml.contains("AWS::ApiGateway::RestApi"));
        assert!(yaml.contains("AWSTemplateFormatVersion"));
    }
}
