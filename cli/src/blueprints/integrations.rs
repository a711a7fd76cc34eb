use super::Blueprint;
use crate::config::Config;
use gateway_template::resources::apigateway::{
    ApiKey, ApiStage, Deployment, KeyType, QuotaSettings, Stage, ThrottleSettings, UsagePlan,
    UsagePlanKey,
};
use gateway_template::{Expr, Template};

/// Deployment and stage of the API, protected by a usage plan with an API key
pub struct IntegrationsBlueprint;

impl Blueprint for IntegrationsBlueprint {
    fn name(&self) -> &'static str {
        "integrations"
    }

    fn create_template(&self, config: &Config) -> eyre::Result<Template> {
        let prefix = config.prefix();
        let api_id = Expr::ssm(&config.api_id_parameter());
        let mut template = Template::new(&format!("{prefix} API stage and usage plan"));

        let deployment = template.add_resource(
            &format!("{prefix}ApiDeployment"),
            Deployment {
                rest_api_id: api_id.clone(),
                description: None,
            },
        )?;

        let stage = template.add_resource(
            &format!("{prefix}ApiStage"),
            Stage {
                deployment_id: deployment.reference(),
                rest_api_id: api_id.clone(),
                stage_name: config.stack.stage.clone(),
            },
        )?;

        // The plan refers to the stage by name, so the stage has to exist first
        let usage_plan = template.add_resource_after(
            &format!("{prefix}UsagePlan"),
            UsagePlan {
                usage_plan_name: config.variables.get("ApiUsagePlanName")?.into(),
                api_stages: vec![ApiStage {
                    api_id,
                    stage: config.stack.stage.clone(),
                }],
                description: Some(format!("{prefix} Usage Plan")),
                quota: Some(QuotaSettings {
                    limit: config.usage_plan.quota_limit,
                    period: config.usage_plan.quota_period,
                }),
                throttle: Some(ThrottleSettings {
                    burst_limit: config.usage_plan.burst_limit,
                    rate_limit: config.usage_plan.rate_limit,
                }),
            },
            &[&stage],
        )?;

        let api_key = template.add_resource(
            &format!("{prefix}ApiKey"),
            ApiKey {
                name: config.variables.get("ApiKeyName")?.into(),
                enabled: true,
            },
        )?;

        template.add_resource_after(
            &format!("{prefix}UsagePlanKey"),
            UsagePlanKey {
                key_id: api_key.reference(),
                key_type: KeyType::ApiKey,
                usage_plan_id: usage_plan.reference(),
            },
            &[&usage_plan],
        )?;

        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprints::fixture;
    use gateway_template::resources::apigateway::QuotaPeriod;
    use serde_json::{json, Value};

    fn resources(config: &Config) -> Value {
        let template = IntegrationsBlueprint.create_template(config).unwrap();
        template.validate().unwrap();
        template.to_value().unwrap()["Resources"].clone()
    }

    #[test]
    fn stage_of_the_stored_api() {
        let resources = resources(&fixture::config());

        assert_eq!(
            resources["RegistrationApiDeployment"]["Properties"],
            json!({"RestApiId": "{{resolve:ssm:/registration/api/id}}"})
        );
        assert_eq!(
            resources["RegistrationApiStage"]["Properties"],
            json!({
                "DeploymentId": {"Ref": "RegistrationApiDeployment"},
                "RestApiId": "{{resolve:ssm:/registration/api/id}}",
                "StageName": "api",
            })
        );
    }

    #[test]
    fn usage_plan_limits() {
        let resources = resources(&fixture::config());
        let plan = &resources["RegistrationUsagePlan"];

        assert_eq!(plan["DependsOn"], json!(["RegistrationApiStage"]));
        assert_eq!(
            plan["Properties"]["Quota"],
            json!({"Limit": 100000, "Period": "MONTH"})
        );
        assert_eq!(
            plan["Properties"]["Throttle"],
            json!({"BurstLimit": 100, "RateLimit": 50.0})
        );
        assert_eq!(
            plan["Properties"]["ApiStages"],
            json!([{"ApiId": "{{resolve:ssm:/registration/api/id}}", "Stage": "api"}])
        );
        assert_eq!(
            plan["Properties"]["UsagePlanName"],
            json!("registration-usage-plan")
        );
        assert_eq!(
            plan["Properties"]["Description"],
            json!("Registration Usage Plan")
        );
    }

    #[test]
    fn key_is_bound_after_the_plan() {
        let resources = resources(&fixture::config());

        assert_eq!(
            resources["RegistrationApiKey"]["Properties"],
            json!({"Name": "registration-key", "Enabled": true})
        );
        assert_eq!(
            resources["RegistrationUsagePlanKey"],
            json!({
                "Type": "AWS::ApiGateway::UsagePlanKey",
                "Properties": {
                    "KeyId": {"Ref": "RegistrationApiKey"},
                    "KeyType": "API_KEY",
                    "UsagePlanId": {"Ref": "RegistrationUsagePlan"},
                },
                "DependsOn": ["RegistrationUsagePlan"],
            })
        );
    }

    #[test]
    fn limits_and_stage_from_config() {
        let mut config = fixture::config();
        config.stack.stage = "v1".to_string();
        config.usage_plan.quota_limit = 500;
        config.usage_plan.quota_period = QuotaPeriod::Day;

        let resources = resources(&config);
        let plan = &resources["RegistrationUsagePlan"]["Properties"];

        assert_eq!(plan["Quota"], json!({"Limit": 500, "Period": "DAY"}));
        assert_eq!(plan["ApiStages"][0]["Stage"], json!("v1"));
        assert_eq!(
            resources["RegistrationApiStage"]["Properties"]["StageName"],
            json!("v1")
        );
    }
}
