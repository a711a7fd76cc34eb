use super::Blueprint;
use crate::config::Config;
use gateway_template::resources::apigateway::{
    ApiKeySourceType, EndpointConfiguration, Resource, RestApi,
};
use gateway_template::resources::ssm;
use gateway_template::{Expr, LogicalId, Output, Template};

/// REST API with a resource per path segment
///
/// Publishes the IDs to SSM, so the stacks deployed later can attach methods
/// and deployments to the API without sharing the template.
pub struct ApiBlueprint;

/// Logical IDs declared by the blueprint
struct Declared {
    api: LogicalId,

    /// (path segment, resource)
    resources: Vec<(String, LogicalId)>,
}

impl ApiBlueprint {
    fn create_api_gateway(&self, config: &Config, template: &mut Template) -> eyre::Result<Declared> {
        let api = template.add_resource(
            &format!("{}Api", config.prefix()),
            RestApi {
                name: config.variables.get("ApiName")?.into(),
                description: None,
                api_key_source_type: Some(ApiKeySourceType::Header),
                endpoint_configuration: Some(EndpointConfiguration {
                    types: vec![config.stack.endpoint_type],
                }),
            },
        )?;

        let mut resources = vec![];

        for segment in config.segments() {
            let resource = template.add_resource(
                LogicalId::prefixed(&[segment, "Resource"])?.as_str(),
                Resource {
                    parent_id: api.get_att("RootResourceId"),
                    rest_api_id: api.reference(),
                    path_part: segment.to_string(),
                },
            )?;

            resources.push((segment.to_string(), resource));
        }

        template.add_output(
            &format!("{}ApiId", config.prefix()),
            Output::new(api.reference())
                .with_description(&format!("ID of the {} REST API", config.prefix()))
                .exported(Expr::sub("${AWS::StackName}-ApiId")),
        )?;

        Ok(Declared { api, resources })
    }

    fn store_ssm_parameters(
        &self,
        config: &Config,
        template: &mut Template,
        declared: &Declared,
    ) -> eyre::Result<()> {
        let prefix = config.prefix();

        template.add_resource(
            &format!("{prefix}ApiId"),
            ssm::Parameter::string(&config.api_id_parameter(), declared.api.reference()),
        )?;

        template.add_resource(
            &format!("{prefix}ApiParentResourceId"),
            ssm::Parameter::string(
                &config.root_resource_parameter(),
                declared.api.get_att("RootResourceId"),
            ),
        )?;

        for (segment, resource) in declared.resources.iter() {
            template.add_resource(
                LogicalId::prefixed(&[segment.as_str(), "ResourceId"])?.as_str(),
                ssm::Parameter::string(&config.resource_parameter(segment), resource.reference()),
            )?;
        }

        Ok(())
    }
}

impl Blueprint for ApiBlueprint {
    fn name(&self) -> &'static str {
        "api"
    }

    fn create_template(&self, config: &Config) -> eyre::Result<Template> {
        let mut template = Template::new(&format!("{} REST API", config.prefix()));
        let declared = self.create_api_gateway(config, &mut template)?;
        self.store_ssm_parameters(config, &mut template, &declared)?;
        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprints::fixture;
    use serde_json::json;

    #[test]
    fn declares_api_and_segments() {
        let template = ApiBlueprint.create_template(&fixture::config()).unwrap();
        template.validate().unwrap();
        let value = template.to_value().unwrap();
        let resources = &value["Resources"];

        assert_eq!(
            resources["RegistrationApi"]["Properties"],
            json!({
                "Name": "registration-api",
                "ApiKeySourceType": "HEADER",
                "EndpointConfiguration": {"Types": ["REGIONAL"]},
            })
        );

        for (id, path) in [
            ("RegistrationResource", "registration"),
            ("SignupResource", "signup"),
            ("LoginResource", "login"),
        ] {
            assert_eq!(resources[id]["Type"], json!("AWS::ApiGateway::Resource"));
            assert_eq!(resources[id]["Properties"]["PathPart"], json!(path));
            assert_eq!(
                resources[id]["Properties"]["ParentId"],
                json!({"Fn::GetAtt": ["RegistrationApi", "RootResourceId"]})
            );
            assert_eq!(
                resources[id]["Properties"]["RestApiId"],
                json!({"Ref": "RegistrationApi"})
            );
        }

        let rest_apis = template
            .resources()
            .filter(|(_, kind)| *kind == "AWS::ApiGateway::RestApi")
            .count();
        assert_eq!(rest_apis, 1);

        assert_eq!(
            value["Outputs"]["RegistrationApiId"],
            json!({
                "Value": {"Ref": "RegistrationApi"},
                "Description": "ID of the Registration REST API",
                "Export": {"Name": {"Fn::Sub": "${AWS::StackName}-ApiId"}},
            })
        );
        assert_eq!(
            value["Resources"]["RegistrationApiId"]["Type"],
            json!("AWS::SSM::Parameter")
        );
    }

    #[test]
    fn stores_ids_in_ssm() {
        let template = ApiBlueprint.create_template(&fixture::config()).unwrap();
        let value = template.to_value().unwrap();

        assert_eq!(
            template.stored_parameters(),
            vec![
                "/registration/api/id",
                "/registration/api/parent/resource/id",
                "/registration/resource/id",
                "/signup/resource/id",
                "/login/resource/id",
            ]
        );

        assert_eq!(
            value["Resources"]["RegistrationApiParentResourceId"]["Properties"]["Value"],
            json!({"Fn::GetAtt": ["RegistrationApi", "RootResourceId"]})
        );

        assert_eq!(
            value["Resources"]["LoginResourceId"]["Properties"],
            json!({
                "Name": "/login/resource/id",
                "Type": "String",
                "Value": {"Ref": "LoginResource"},
            })
        );
    }

    #[test]
    fn endpoint_type_comes_from_config() {
        let mut config = fixture::config();
        config.stack.endpoint_type = gateway_template::resources::apigateway::EndpointType::Edge;

        let value = ApiBlueprint.create_template(&config).unwrap().to_value().unwrap();
        assert_eq!(
            value["Resources"]["RegistrationApi"]["Properties"]["EndpointConfiguration"],
            json!({"Types": ["EDGE"]})
        );
    }
}
