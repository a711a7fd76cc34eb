use super::ResourceType;
use crate::Expr;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParameterType {
    String,
    StringList,
}

/// A value stored in Parameter Store, readable by other stacks with `{{resolve:ssm:<name>}}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "Type")]
    pub kind: ParameterType,

    pub value: Expr,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Parameter {
    pub fn string(name: &str, value: Expr) -> Self {
        Parameter {
            name: name.to_string(),
            kind: ParameterType::String,
            value,
            description: None,
        }
    }
}

impl ResourceType for Parameter {
    const TYPE: &'static str = "AWS::SSM::Parameter";
}
