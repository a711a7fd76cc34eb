use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

/// A property value: either a literal string or a CloudFormation intrinsic
///
/// Intrinsics are rendered in their long JSON form (`{"Ref": ...}`,
/// `{"Fn::GetAtt": [...]}`, `{"Fn::Sub": ...}`), which is valid in YAML too.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(String),
    Ref(String),
    GetAtt(String, String),
    Sub(String, BTreeMap<String, Expr>),
}

impl Expr {
    /// `Fn::Sub` without local variables, only pseudo params and template names
    pub fn sub(template: &str) -> Self {
        Expr::Sub(template.to_string(), BTreeMap::new())
    }

    /// Add a local variable to `Fn::Sub`
    ///
    /// Has no effect on other expressions, they have no variables to bind.
    pub fn with(mut self, name: &str, value: impl Into<Expr>) -> Self {
        if let Expr::Sub(_, variables) = &mut self {
            variables.insert(name.to_string(), value.into());
        }

        self
    }

    /// A dynamic reference resolved by CloudFormation from SSM Parameter Store at deploy time
    pub fn ssm(name: &str) -> Self {
        Expr::Literal(format!("{{{{resolve:ssm:{name}}}}}"))
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Expr::Literal(value) => Some(value),
            _ => None,
        }
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::Literal(value.to_string())
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Expr::Literal(value)
    }
}

impl From<&String> for Expr {
    fn from(value: &String) -> Self {
        Expr::Literal(value.clone())
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Expr::Literal(value) => serializer.serialize_str(value),

            Expr::Ref(name) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Ref", name)?;
                map.end()
            }

            Expr::GetAtt(name, attribute) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::GetAtt", &[name, attribute])?;
                map.end()
            }

            Expr::Sub(template, variables) => {
                let mut map = serializer.serialize_map(Some(1))?;

                if variables.is_empty() {
                    map.serialize_entry("Fn::Sub", template)?;
                } else {
                    map.serialize_entry("Fn::Sub", &(template, variables))?;
                }

                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn intrinsics_use_long_form() {
        assert_eq!(
            serde_json::to_value(Expr::Ref("Api".into())).unwrap(),
            json!({"Ref": "Api"})
        );

        assert_eq!(
            serde_json::to_value(Expr::GetAtt("Api".into(), "RootResourceId".into())).unwrap(),
            json!({"Fn::GetAtt": ["Api", "RootResourceId"]})
        );
    }

    #[test]
    fn sub_without_variables_is_a_plain_string() {
        let value = serde_json::to_value(Expr::sub("arn:aws:logs:${AWS::Region}:*")).unwrap();
        assert_eq!(value, json!({"Fn::Sub": "arn:aws:logs:${AWS::Region}:*"}));
    }

    #[test]
    fn sub_with_variables_is_a_pair() {
        let expr = Expr::sub("lambdas/${LambdaName}.zip").with("LambdaName", "signup");

        assert_eq!(
            serde_json::to_value(expr).unwrap(),
            json!({"Fn::Sub": ["lambdas/${LambdaName}.zip", {"LambdaName": "signup"}]})
        );
    }

    #[test]
    fn ssm_lookup_is_a_dynamic_reference() {
        assert_eq!(
            Expr::ssm("/registration/api/id").as_literal(),
            Some("{{resolve:ssm:/registration/api/id}}")
        );
    }
}
