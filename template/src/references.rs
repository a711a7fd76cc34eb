use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// `${Name}` or `${Name.Attribute}`, but not the escaped `${!Literal}`
static SUB_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}!][^}]*)\}").expect("Invalid Fn::Sub regex"));

/// `{{resolve:ssm:/some/name}}` with an optional `:version` suffix
static SSM_LOOKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{resolve:ssm:([^}:]+)(?::[0-9]+)?\}\}").expect("Invalid SSM lookup regex")
});

/// Everything a rendered piece of template points at
#[derive(Debug, Default, Clone, PartialEq)]
pub struct References {
    /// Logical IDs used in `Ref`, `Fn::GetAtt` and `Fn::Sub`, pseudo parameters excluded
    pub names: BTreeSet<String>,

    /// SSM parameters read with dynamic references
    pub ssm: BTreeSet<String>,
}

impl References {
    pub fn collect(value: &Value) -> Self {
        let mut references = Self::default();
        references.visit(value);
        references
    }

    fn visit(&mut self, value: &Value) {
        match value {
            Value::String(text) => self.lookups(text),
            Value::Array(items) => items.iter().for_each(|item| self.visit(item)),
            Value::Object(map) => {
                if !self.intrinsic(map) {
                    map.values().for_each(|item| self.visit(item));
                }
            }
            _ => {}
        }
    }

    /// Returns false if the object is not an intrinsic function
    fn intrinsic(&mut self, map: &Map<String, Value>) -> bool {
        if map.len() != 1 {
            return false;
        }

        if let Some(Value::String(name)) = map.get("Ref") {
            self.name(name);
            return true;
        }

        if let Some(attribute) = map.get("Fn::GetAtt") {
            match attribute {
                Value::Array(items) => {
                    if let Some(Value::String(name)) = items.first() {
                        self.name(name);
                    }
                }

                // Short form "Name.Attribute"
                Value::String(dotted) => {
                    let name = dotted.split_once('.').map_or(dotted.as_str(), |(name, _)| name);
                    self.name(name);
                }

                _ => {}
            }

            return true;
        }

        if let Some(sub) = map.get("Fn::Sub") {
            match sub {
                Value::String(template) => self.sub(template, None),

                Value::Array(items) => {
                    let variables = items.get(1).and_then(|v| v.as_object());

                    if let Some(Value::String(template)) = items.first() {
                        self.sub(template, variables);
                    }

                    if let Some(variables) = variables {
                        variables.values().for_each(|item| self.visit(item));
                    }
                }

                _ => {}
            }

            return true;
        }

        false
    }

    fn sub(&mut self, template: &str, variables: Option<&Map<String, Value>>) {
        for captures in SUB_VARIABLE.captures_iter(template) {
            let variable = &captures[1];
            let name = variable.split_once('.').map_or(variable, |(name, _)| name);

            if variables.is_some_and(|v| v.contains_key(name)) {
                continue;
            }

            self.name(name);
        }

        self.lookups(template);
    }

    fn lookups(&mut self, text: &str) {
        for captures in SSM_LOOKUP.captures_iter(text) {
            self.ssm.insert(captures[1].to_string());
        }
    }

    fn name(&mut self, name: &str) {
        if !name.starts_with("AWS::") {
            self.names.insert(name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collects_refs_and_attributes() {
        let references = References::collect(&json!({
            "ParentId": {"Fn::GetAtt": ["Api", "RootResourceId"]},
            "RestApiId": {"Ref": "Api"},
            "Role": {"Fn::GetAtt": "Role.Arn"},
            "Region": {"Ref": "AWS::Region"},
        }));

        assert_eq!(
            references.names.into_iter().collect::<Vec<_>>(),
            vec!["Api".to_string(), "Role".to_string()]
        );
    }

    #[test]
    fn sub_local_variables_and_pseudo_params_are_not_references() {
        let references = References::collect(&json!({
            "Fn::Sub": [
                "arn:aws:apigateway:${AWS::Region}:lambda:path/functions/${LambdaArn}/${Stage}/${!Literal}",
                {"LambdaArn": {"Fn::GetAtt": ["Function", "Arn"]}}
            ]
        }));

        assert_eq!(
            references.names.into_iter().collect::<Vec<_>>(),
            vec!["Function".to_string(), "Stage".to_string()]
        );
    }

    #[test]
    fn finds_ssm_lookups_anywhere() {
        let references = References::collect(&json!({
            "RestApiId": "{{resolve:ssm:/registration/api/id}}",
            "SourceArn": {
                "Fn::Sub": [
                    "arn:aws:execute-api:${AWS::Region}:${AWS::AccountId}:${ApiId}/*/POST/login",
                    {"ApiId": "{{resolve:ssm:/registration/api/id:3}}"}
                ]
            },
            "ResourceId": "{{resolve:ssm:/login/resource/id}}",
        }));

        assert!(references.names.is_empty());
        assert_eq!(
            references.ssm.into_iter().collect::<Vec<_>>(),
            vec![
                "/login/resource/id".to_string(),
                "/registration/api/id".to_string()
            ]
        );
    }
}
