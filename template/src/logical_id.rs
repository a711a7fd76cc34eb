use crate::Expr;
use eyre::eyre;
use heck::ToUpperCamelCase;
use std::fmt::Display;

/// CloudFormation limit for logical IDs
const MAX_LENGTH: usize = 255;

/// Name of a resource or parameter inside a template
///
/// Always non-empty ASCII alphanumeric, as CloudFormation requires.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogicalId(String);

impl LogicalId {
    pub fn new(name: &str) -> eyre::Result<Self> {
        if name.is_empty() {
            return Err(eyre!("Logical ID can not be empty"));
        }

        if name.len() > MAX_LENGTH {
            return Err(eyre!(
                "Logical ID {name:?} is longer than {MAX_LENGTH} characters"
            ));
        }

        if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(eyre!(
                "Logical ID {name:?} must contain only ASCII letters and digits"
            ));
        }

        Ok(Self(name.to_string()))
    }

    /// Build an ID out of free-form parts, e.g. ["registration", "api"] -> RegistrationApi
    ///
    /// Every part is converted to UpperCamelCase, dashes, dots and underscores act as word breaks.
    pub fn prefixed(parts: &[&str]) -> eyre::Result<Self> {
        let joined = parts
            .iter()
            .map(|part| part.to_upper_camel_case())
            .collect::<Vec<String>>()
            .join("");

        Self::new(&joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Ref` to the resource or parameter
    pub fn reference(&self) -> Expr {
        Expr::Ref(self.0.clone())
    }

    /// `Fn::GetAtt` of the resource
    pub fn get_att(&self, attribute: &str) -> Expr {
        Expr::GetAtt(self.0.clone(), attribute.to_string())
    }
}

impl Display for LogicalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_alphanumeric() {
        assert!(LogicalId::new("Sign-up").is_err());
        assert!(LogicalId::new("").is_err());
        assert!(LogicalId::new(&"A".repeat(256)).is_err());
        assert!(LogicalId::new("SignupMethod").is_ok());
    }

    #[test]
    fn prefixed_joins_camel_cased_parts() {
        let id = LogicalId::prefixed(&["user-registration", "reset_password", "Method"]).unwrap();
        assert_eq!(id.as_str(), "UserRegistrationResetPasswordMethod");
    }
}
