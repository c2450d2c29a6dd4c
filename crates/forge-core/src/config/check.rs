//! Config file validation against embedded JSON schemas

use colored::Colorize;
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// The config file kinds the checkconfig command understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Create,
    CreateWithTemplate,
    Release,
}

impl ConfigKind {
    pub fn parse(tag: &str) -> Option<ConfigKind> {
        match tag.to_lowercase().as_str() {
            "create" => Some(ConfigKind::Create),
            "createwithtemplate" => Some(ConfigKind::CreateWithTemplate),
            "release" => Some(ConfigKind::Release),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKind::Create => "create",
            ConfigKind::CreateWithTemplate => "createwithtemplate",
            ConfigKind::Release => "release",
        }
    }

    /// All accepted type tags, for usage messages.
    pub fn all_tags() -> &'static [&'static str] {
        &["create", "createwithtemplate", "release"]
    }

    fn schema_source(&self) -> &'static str {
        match self {
            ConfigKind::Create => include_str!("../../schemas/create.schema.json"),
            ConfigKind::CreateWithTemplate => {
                include_str!("../../schemas/createwithtemplate.schema.json")
            }
            ConfigKind::Release => include_str!("../../schemas/release.schema.json"),
        }
    }
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors from loading or validating a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("config file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("schema for '{kind}' failed to compile: {message}")]
    Schema { kind: ConfigKind, message: String },
}

/// Result of validating one config file.
#[derive(Debug)]
pub struct ConfigReport {
    pub kind: ConfigKind,
    /// One entry per schema violation, empty when the file conforms.
    pub errors: Vec<String>,
}

impl ConfigReport {
    pub fn conforms(&self) -> bool {
        self.errors.is_empty()
    }

    /// Print either the conformance message or the list of violations.
    pub fn print(&self, path: &Path) {
        if self.conforms() {
            println!(
                "{} {} conforms to the '{}' schema",
                "OK".green().bold(),
                path.display(),
                self.kind
            );
        } else {
            println!(
                "{} {} does not conform to the '{}' schema:",
                "Error:".red().bold(),
                path.display(),
                self.kind
            );
            for error in &self.errors {
                println!("  - {error}");
            }
        }
    }
}

/// Load a JSON config file and validate it against the schema for `kind`.
pub fn check_config(path: &Path, kind: ConfigKind) -> Result<ConfigReport, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let data: Value = serde_json::from_str(&content)?;
    validate(&data, kind)
}

/// Validate already-parsed config data against the schema for `kind`.
pub fn validate(data: &Value, kind: ConfigKind) -> Result<ConfigReport, ConfigError> {
    let schema: Value =
        serde_json::from_str(kind.schema_source()).map_err(|e| ConfigError::Schema {
            kind,
            message: e.to_string(),
        })?;
    let compiled = JSONSchema::compile(&schema).map_err(|e| ConfigError::Schema {
        kind,
        message: e.to_string(),
    })?;

    let errors = match compiled.validate(data) {
        Ok(()) => Vec::new(),
        Err(violations) => violations
            .map(|err| {
                let location = err.instance_path.to_string();
                if location.is_empty() {
                    err.to_string()
                } else {
                    format!("{location}: {err}")
                }
            })
            .collect(),
    };

    Ok(ConfigReport { kind, errors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn valid_create_config_conforms() {
        let data = json!({
            "appname": "MyApp",
            "packagename": "com.acme.myapp",
            "organization": "Acme, Inc.",
            "apptype": "native"
        });
        let report = validate(&data, ConfigKind::Create).unwrap();
        assert!(report.conforms(), "unexpected errors: {:?}", report.errors);
    }

    #[test]
    fn missing_required_field_is_reported() {
        let data = json!({
            "packagename": "com.acme.myapp",
            "organization": "Acme, Inc.",
            "apptype": "native"
        });
        let report = validate(&data, ConfigKind::Create).unwrap();
        assert!(!report.conforms());
        assert!(report.errors.iter().any(|e| e.contains("appname")));
    }

    #[test]
    fn pattern_violations_are_reported_with_location() {
        let data = json!({
            "appname": "My App",
            "packagename": "com.acme.myapp",
            "organization": "Acme, Inc.",
            "apptype": "native"
        });
        let report = validate(&data, ConfigKind::Create).unwrap();
        assert!(!report.conforms());
        assert!(report.errors.iter().any(|e| e.contains("/appname")));
    }

    #[test]
    fn unknown_apptype_is_rejected() {
        let data = json!({
            "appname": "MyApp",
            "packagename": "com.acme.myapp",
            "organization": "Acme, Inc.",
            "apptype": "webview"
        });
        let report = validate(&data, ConfigKind::Create).unwrap();
        assert!(!report.conforms());
    }

    #[test]
    fn release_manifest_requires_repos() {
        let report = validate(&json!({ "repos": [] }), ConfigKind::Release).unwrap();
        assert!(!report.conforms());

        let report = validate(
            &json!({ "repos": [{ "name": "sdk", "url": "https://example.com/sdk.git" }] }),
            ConfigKind::Release,
        )
        .unwrap();
        assert!(report.conforms(), "unexpected errors: {:?}", report.errors);
    }

    #[test]
    fn reads_config_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"appname":"MyApp","packagename":"com.acme.app","organization":"Acme","apptype":"react_native"}}"#
        )
        .unwrap();

        let report = check_config(file.path(), ConfigKind::Create).unwrap();
        assert!(report.conforms());
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = check_config(file.path(), ConfigKind::Create).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn kind_parsing() {
        assert_eq!(ConfigKind::parse("Create"), Some(ConfigKind::Create));
        assert_eq!(
            ConfigKind::parse("createwithtemplate"),
            Some(ConfigKind::CreateWithTemplate)
        );
        assert_eq!(ConfigKind::parse("release"), Some(ConfigKind::Release));
        assert_eq!(ConfigKind::parse("deploy"), None);
    }
}
