use super::ResourceType;
use crate::Expr;
use serde::Serialize;
use std::collections::BTreeMap;

/// Zip archive of the function in S3
#[derive(Debug, Clone, Serialize)]
pub struct Code {
    #[serde(rename = "S3Bucket")]
    pub s3_bucket: Expr,

    #[serde(rename = "S3Key")]
    pub s3_key: Expr,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Environment {
    pub variables: BTreeMap<String, Expr>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Function {
    pub function_name: Expr,
    pub code: Code,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,

    pub handler: String,
    pub runtime: String,
    pub role: Expr,
}

impl ResourceType for Function {
    const TYPE: &'static str = "AWS::Lambda::Function";
}

/// Resource-based policy statement allowing a principal to invoke the function
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Permission {
    pub action: String,
    pub function_name: Expr,
    pub principal: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_arn: Option<Expr>,
}

impl ResourceType for Permission {
    const TYPE: &'static str = "AWS::Lambda::Permission";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn code_keys_keep_s3_capitalization() {
        let code = Code {
            s3_bucket: Expr::Ref("Bucket".into()),
            s3_key: "lambdas/signup.zip".into(),
        };

        assert_eq!(
            serde_json::to_value(code).unwrap(),
            json!({"S3Bucket": {"Ref": "Bucket"}, "S3Key": "lambdas/signup.zip"})
        );
    }

    #[test]
    fn permission_without_source_arn() {
        let permission = Permission {
            action: "lambda:InvokeFunction".into(),
            function_name: "signup".into(),
            principal: "apigateway.amazonaws.com".into(),
            source_arn: None,
        };

        let value = serde_json::to_value(permission).unwrap();
        assert!(value.get("SourceArn").is_none());
        assert_eq!(value["FunctionName"], json!("signup"));
    }
}
