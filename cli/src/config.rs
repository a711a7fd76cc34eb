mod file;
use eyre::{eyre, ContextCompat, WrapErr};
use file::ConfigFile;
pub use file::{Route, StackSection, UsagePlanSection};
use heck::{ToKebabCase, ToUpperCamelCase};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Default name of the config file, looked up in the current dir
pub const CONFIG_FILE: &str = "blueprints.toml";

/// A namespace or a route path, one URL segment
static SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("Invalid segment regex"));

/// Named values the blueprints are built from, the [variables] table
#[derive(Debug, Clone, Default)]
pub struct Variables(BTreeMap<String, String>);

impl Variables {
    pub fn get(&self, key: &str) -> eyre::Result<&str> {
        self.0
            .get(key)
            .map(|value| value.as_str())
            .wrap_err(format!("Variable {key:?} is missing in [variables]"))
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.0.get(key).map_or(default, |value| value.as_str())
    }
}

impl From<BTreeMap<String, String>> for Variables {
    fn from(map: BTreeMap<String, String>) -> Self {
        Variables(map)
    }
}

/// Everything the blueprints need to know, loaded from blueprints.toml
#[derive(Debug, Clone)]
pub struct Config {
    pub stack: StackSection,
    pub usage_plan: UsagePlanSection,
    pub routes: Vec<Route>,
    pub variables: Variables,

    /// Where the config was read from
    pub path: PathBuf,
}

impl Config {
    pub fn from_path(path: &Path) -> eyre::Result<Self> {
        let toml_string = fs::read_to_string(path)
            .inspect_err(|e| log::error!("Failed to read {path:?}: {e:?}"))
            .wrap_err(format!("Failed to read {path:?}"))?;

        let mut config = Self::parse(&toml_string)
            .wrap_err(format!("Failed to load {}", path.display()))?;

        config.path = path.to_path_buf();
        Ok(config)
    }

    pub fn parse(toml_string: &str) -> eyre::Result<Self> {
        let file: ConfigFile = toml::from_str(toml_string).wrap_err("Failed to parse TOML")?;

        let config = Config {
            stack: file.stack,
            usage_plan: file.usage_plan,
            routes: file.routes,
            variables: file.variables.into(),
            path: PathBuf::from(CONFIG_FILE),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> eyre::Result<()> {
        if !SEGMENT.is_match(&self.stack.namespace) {
            return Err(eyre!(
                "Namespace {:?} must start with a letter or digit and contain only letters, digits, '.', '-' or '_'",
                self.stack.namespace
            ));
        }

        if self.stack.stage.is_empty() {
            return Err(eyre!("Stage name can not be empty"));
        }

        if self.routes.is_empty() {
            return Err(eyre!("At least one route is required"));
        }

        let mut paths = HashSet::new();

        for route in self.routes.iter() {
            if !SEGMENT.is_match(&route.path) {
                return Err(eyre!(
                    "Route path {:?} must be a single segment of letters, digits, '.', '-' or '_'",
                    route.path
                ));
            }

            if !paths.insert(route.path.as_str()) {
                return Err(eyre!("Route {:?} is declared more than once", route.path));
            }
        }

        Ok(())
    }

    /// Namespace as the prefix of logical IDs, e.g. "Registration"
    pub fn prefix(&self) -> String {
        self.stack.namespace.to_upper_camel_case()
    }

    /// Namespace as it appears in parameter paths and stack names
    pub fn slug(&self) -> String {
        self.stack.namespace.to_kebab_case()
    }

    /// Path segments declared under the API root: the namespace itself and every route
    pub fn segments(&self) -> Vec<&str> {
        let mut segments = vec![self.stack.namespace.as_str()];

        for route in self.routes.iter() {
            if !segments.contains(&route.path.as_str()) {
                segments.push(route.path.as_str());
            }
        }

        segments
    }

    /// SSM parameter holding the REST API ID
    pub fn api_id_parameter(&self) -> String {
        format!("/{}/api/id", self.slug())
    }

    /// SSM parameter holding the ID of the API root resource
    pub fn root_resource_parameter(&self) -> String {
        format!("/{}/api/parent/resource/id", self.slug())
    }

    /// SSM parameter holding the ID of a path segment resource
    pub fn resource_parameter(&self, segment: &str) -> String {
        format!("/{}/resource/id", segment.to_kebab_case())
    }

    /// Variable key of the function name, e.g. "RegistrationLambdaName"
    pub fn lambda_name_key(&self) -> String {
        format!("{}LambdaName", self.prefix())
    }

    /// CloudFormation stack of the blueprint
    pub fn stack_name(&self, blueprint: &str) -> String {
        format!("{}-{blueprint}", self.slug())
    }
}
