use super::ResourceType;
use crate::Expr;
use serde::Serialize;

pub const POLICY_VERSION: &str = "2012-10-17";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Principal {
    pub service: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub effect: Effect,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,

    pub action: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource: Vec<Expr>,
}

impl Statement {
    pub fn allow(actions: &[&str]) -> Self {
        Statement {
            effect: Effect::Allow,
            principal: None,
            action: actions.iter().map(|a| a.to_string()).collect(),
            resource: vec![],
        }
    }

    pub fn on(mut self, resources: Vec<Expr>) -> Self {
        self.resource = resources;
        self
    }

    /// Restrict a trust policy statement to the given AWS services
    pub fn for_services(mut self, services: &[&str]) -> Self {
        self.principal = Some(Principal {
            service: services.iter().map(|s| s.to_string()).collect(),
        });

        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl PolicyDocument {
    pub fn new(statement: Vec<Statement>) -> Self {
        PolicyDocument {
            version: POLICY_VERSION.to_string(),
            statement,
        }
    }

    /// Trust policy letting the services assume the role
    pub fn assume_role(services: &[&str]) -> Self {
        Self::new(vec![
            Statement::allow(&["sts:AssumeRole"]).for_services(services)
        ])
    }
}

/// Inline policy of a role
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Policy {
    pub policy_name: String,
    pub policy_document: PolicyDocument,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Role {
    pub assume_role_policy_document: PolicyDocument,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<Policy>,
}

impl ResourceType for Role {
    const TYPE: &'static str = "AWS::IAM::Role";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trust_policy() {
        let document = PolicyDocument::assume_role(&["lambda.amazonaws.com"]);

        assert_eq!(
            serde_json::to_value(document).unwrap(),
            json!({
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": {"Service": ["lambda.amazonaws.com"]},
                    "Action": ["sts:AssumeRole"],
                }]
            })
        );
    }

    #[test]
    fn statement_with_resources() {
        let statement = Statement::allow(&["s3:GetObject"])
            .on(vec![Expr::sub("arn:aws:s3:::${Bucket}/*").with("Bucket", "builds")]);

        let value = serde_json::to_value(statement).unwrap();
        assert_eq!(value["Action"], json!(["s3:GetObject"]));
        assert!(value.get("Principal").is_none());
        assert_eq!(value["Resource"][0]["Fn::Sub"][1], json!({"Bucket": "builds"}));
    }
}
