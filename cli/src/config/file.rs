use gateway_template::resources::apigateway::{EndpointType, HttpMethod, QuotaPeriod};
use serde::Deserialize;
use std::collections::BTreeMap;

/// The structure of blueprints.toml
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct ConfigFile {
    /// [stack]
    /// namespace = "registration"
    #[serde(default)]
    pub(super) stack: StackSection,

    /// [usage_plan]
    /// quota_limit = 100000
    #[serde(default)]
    pub(super) usage_plan: UsagePlanSection,

    /// [[routes]]
    /// path = "login"
    /// method = "POST"
    #[serde(default = "default_routes")]
    pub(super) routes: Vec<Route>,

    /// [variables]
    /// ApiName = "registration-api"
    #[serde(default)]
    pub(super) variables: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StackSection {
    /// Prefix of logical IDs, stored parameter paths and stack names
    pub namespace: String,

    pub endpoint_type: EndpointType,

    /// Name of the deployed stage
    pub stage: String,

    /// SSM parameters written by stacks outside of this set
    pub external_parameters: Vec<String>,

    /// Region to deploy to, falls back to the AWS SDK defaults
    pub region: Option<String>,
}

impl Default for StackSection {
    fn default() -> Self {
        StackSection {
            namespace: "registration".to_string(),
            endpoint_type: EndpointType::default(),
            stage: "api".to_string(),
            external_parameters: vec![],
            region: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UsagePlanSection {
    pub quota_limit: u64,
    pub quota_period: QuotaPeriod,
    pub burst_limit: u32,
    pub rate_limit: f64,
}

impl Default for UsagePlanSection {
    fn default() -> Self {
        UsagePlanSection {
            quota_limit: 100_000,
            quota_period: QuotaPeriod::Month,
            burst_limit: 100,
            rate_limit: 50.0,
        }
    }
}

/// A path segment under the API root served by the function
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Route {
    pub path: String,
    pub method: HttpMethod,
}

fn default_routes() -> Vec<Route> {
    ["signup", "login"]
        .into_iter()
        .map(|path| Route {
            path: path.to_string(),
            method: HttpMethod::Post,
        })
        .collect()
}
