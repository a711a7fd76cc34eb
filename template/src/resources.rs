//! Typed properties of the CloudFormation resources the blueprints declare
//!
//! Every struct serializes into the `Properties` block of its resource,
//! with PascalCase keys and unset optional properties omitted.
pub mod apigateway;
pub mod iam;
pub mod lambda;
pub mod ssm;

use serde::Serialize;

/// Properties of a single CloudFormation resource type
pub trait ResourceType: Serialize {
    /// E.g. "AWS::ApiGateway::RestApi"
    const TYPE: &'static str;
}
