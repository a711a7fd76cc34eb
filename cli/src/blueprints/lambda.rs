use super::Blueprint;
use crate::config::{Config, Route};
use gateway_template::resources::apigateway::{AuthorizationType, Integration, Method};
use gateway_template::resources::iam::{Policy, PolicyDocument, Role, Statement};
use gateway_template::resources::lambda::{Code, Environment, Function, Permission};
use gateway_template::{Expr, LogicalId, Parameter, Template};
use std::collections::BTreeMap;

/// Services allowed to assume the execution role
const TRUSTED_SERVICES: [&str; 2] = ["lambda.amazonaws.com", "apigateway.amazonaws.com"];

/// Secrets Manager appends six random characters to secret ARNs
const DEFAULT_SECRET_SUFFIX: &str = "-??????";

/// The function serving all routes of the API, its role and the API methods invoking it
pub struct LambdaBlueprint;

impl LambdaBlueprint {
    fn get_existing_bucket(&self, config: &Config, template: &mut Template) -> eyre::Result<LogicalId> {
        template.add_parameter(
            &format!("{}S3Bucket", config.prefix()),
            Parameter::string(Some(config.variables.get("BucketName")?)),
        )
    }

    /// Inline policies scoped to the code bucket, the function's log group and the shared secret
    fn policies(&self, config: &Config) -> eyre::Result<Vec<Policy>> {
        let prefix = config.prefix();
        let lambda_name = config.variables.get(&config.lambda_name_key())?;

        let secret_suffix = config
            .variables
            .get_or("SharedSecretsSuffix", DEFAULT_SECRET_SUFFIX);

        Ok(vec![
            Policy {
                policy_name: format!("{prefix}LambdaS3Policy"),
                policy_document: PolicyDocument::new(vec![Statement::allow(&["s3:GetObject"])
                    .on(vec![Expr::sub("arn:aws:s3:::${BucketName}/*")
                        .with("BucketName", config.variables.get("BucketName")?)])]),
            },
            Policy {
                policy_name: format!("{prefix}LambdaLogPolicy"),
                policy_document: PolicyDocument::new(vec![
                    Statement::allow(&["logs:CreateLogGroup"]).on(vec![Expr::sub(
                        "arn:aws:logs:${AWS::Region}:${AWS::AccountId}:*",
                    )]),
                    Statement::allow(&["logs:CreateLogStream", "logs:PutLogEvents"]).on(vec![
                        Expr::sub(
                            "arn:aws:logs:${AWS::Region}:${AWS::AccountId}:log-group:/aws/lambda/${LambdaName}:*",
                        )
                        .with("LambdaName", lambda_name),
                    ]),
                ]),
            },
            Policy {
                policy_name: format!("{prefix}LambdaSecretsManagerPolicy"),
                policy_document: PolicyDocument::new(vec![Statement::allow(&[
                    "secretsmanager:GetSecretValue",
                ])
                .on(vec![Expr::sub(&format!(
                    "arn:aws:secretsmanager:${{AWS::Region}}:${{AWS::AccountId}}:secret:${{SecretId}}{secret_suffix}"
                ))
                .with("SecretId", config.variables.get("SharedSecretsId")?)])]),
            },
        ])
    }

    fn create_lambda(
        &self,
        config: &Config,
        template: &mut Template,
        bucket: &LogicalId,
    ) -> eyre::Result<LogicalId> {
        let prefix = config.prefix();
        let lambda_name = config.variables.get(&config.lambda_name_key())?;

        let role = template.add_resource(
            &format!("{prefix}LambdaExecutionRole"),
            Role {
                assume_role_policy_document: PolicyDocument::assume_role(&TRUSTED_SERVICES),
                path: None,
                policies: self.policies(config)?,
            },
        )?;

        template.add_resource(
            &format!("{prefix}LambdaFunction"),
            Function {
                function_name: lambda_name.into(),
                code: Code {
                    s3_bucket: bucket.reference(),
                    s3_key: Expr::sub("lambdas/${LambdaName}.zip").with("LambdaName", lambda_name),
                },
                environment: Some(Environment {
                    variables: BTreeMap::from([(
                        "SHARED_SECRETS".to_string(),
                        config.variables.get("SharedSecretsId")?.into(),
                    )]),
                }),
                handler: config.variables.get_or("LambdaHandler", "handler").to_string(),
                runtime: config
                    .variables
                    .get_or("LambdaRuntime", "provided.al2023")
                    .to_string(),
                role: role.get_att("Arn"),
            },
        )
    }

    /// API method proxying the route to the function, and the permission to invoke it
    fn create_route(
        &self,
        config: &Config,
        template: &mut Template,
        function: &LogicalId,
        route: &Route,
    ) -> eyre::Result<()> {
        let api_id = Expr::ssm(&config.api_id_parameter());

        template.add_resource_after(
            LogicalId::prefixed(&[route.path.as_str(), "Method"])?.as_str(),
            Method {
                authorization_type: AuthorizationType::None,
                api_key_required: true,
                http_method: route.method,
                rest_api_id: api_id.clone(),
                resource_id: Expr::ssm(&config.resource_parameter(&route.path)),
                integration: Some(Integration::lambda_proxy(function.get_att("Arn"))),
            },
            &[function],
        )?;

        template.add_resource_after(
            LogicalId::prefixed(&[route.path.as_str(), "InvokePermission"])?.as_str(),
            Permission {
                action: "lambda:InvokeFunction".to_string(),
                function_name: config.variables.get(&config.lambda_name_key())?.into(),
                principal: "apigateway.amazonaws.com".to_string(),
                source_arn: Some(
                    Expr::sub(&format!(
                        "arn:aws:execute-api:${{AWS::Region}}:${{AWS::AccountId}}:${{ApiId}}/*/{}/{}",
                        route.method.arn_segment(),
                        route.path,
                    ))
                    .with("ApiId", api_id),
                ),
            },
            &[function],
        )?;

        Ok(())
    }
}

impl Blueprint for LambdaBlueprint {
    fn name(&self) -> &'static str {
        "lambda"
    }

    fn create_template(&self, config: &Config) -> eyre::Result<Template> {
        let mut template = Template::new(&format!("{} Lambda function", config.prefix()));
        let bucket = self.get_existing_bucket(config, &mut template)?;
        let function = self.create_lambda(config, &mut template, &bucket)?;

        for route in config.routes.iter() {
            self.create_route(config, &mut template, &function, route)?;
        }

        Ok(template)
    }
}
