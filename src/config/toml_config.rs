use crate::core::naming::{NamingConvention, DEFAULT_ROLE_NAME_FIELD, DEFAULT_ROLE_PREFIX};
use crate::core::ConfigProvider;
use crate::domain::model::{CollisionPolicy, OutputFormat};
use crate::utils::error::{CompilerError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub mapping: MappingConfig,
    pub templates: TemplatesConfig,
    pub output: OutputConfig,
    pub naming: Option<NamingConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    pub file: String,
    pub role_name_field: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatesConfig {
    pub dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dir: String,
    pub format: Option<OutputFormat>,
    pub on_duplicate: Option<CollisionPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    pub role_prefix: Option<String>,
    pub skip_malformed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// Loads and parses a TOML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CompilerError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CompilerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CompilerError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn verbose(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.verbose)
            .unwrap_or(false)
    }

    pub fn log_json(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn mapping_file(&self) -> &str {
        &self.mapping.file
    }

    fn templates_dir(&self) -> &str {
        &self.templates.dir
    }

    fn output_dir(&self) -> &str {
        &self.output.dir
    }

    fn naming(&self) -> NamingConvention {
        NamingConvention {
            role_name_field: self
                .mapping
                .role_name_field
                .clone()
                .unwrap_or_else(|| DEFAULT_ROLE_NAME_FIELD.to_string()),
            role_prefix: self
                .naming
                .as_ref()
                .and_then(|n| n.role_prefix.clone())
                .unwrap_or_else(|| DEFAULT_ROLE_PREFIX.to_string()),
        }
    }

    fn output_format(&self) -> OutputFormat {
        self.output.format.unwrap_or_default()
    }

    fn collision_policy(&self) -> CollisionPolicy {
        self.output.on_duplicate.unwrap_or_default()
    }

    fn skip_malformed(&self) -> bool {
        self.naming
            .as_ref()
            .and_then(|n| n.skip_malformed)
            .unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        crate::config::validate_settings(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[mapping]
file = "roles.csv"

[templates]
dir = "./yaml_templates"

[output]
dir = "./source-system-templates"
"#;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.mapping_file(), "roles.csv");
        assert_eq!(config.naming(), NamingConvention::default());
        assert_eq!(config.output_format(), OutputFormat::Yaml);
        assert_eq!(config.collision_policy(), CollisionPolicy::Overwrite);
        assert!(!config.skip_malformed());
        assert!(!config.verbose());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[mapping]
file = "mapping/roles.csv"
role_name_field = "Role"

[templates]
dir = "templates"

[output]
dir = "out"
format = "json"
on_duplicate = "reject"

[naming]
role_prefix = "SSO-"
skip_malformed = true

[logging]
verbose = true
json = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(
            config.naming(),
            NamingConvention {
                role_name_field: "Role".to_string(),
                role_prefix: "SSO-".to_string(),
            }
        );
        assert_eq!(config.output_format(), OutputFormat::Json);
        assert_eq!(config.collision_policy(), CollisionPolicy::Reject);
        assert!(config.skip_malformed());
        assert!(config.verbose());
        assert!(config.log_json());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("IAM_TEST_MAPPING_FILE", "from-env.csv");

        let toml_content = r#"
[mapping]
file = "${IAM_TEST_MAPPING_FILE}"

[templates]
dir = "${IAM_TEST_UNSET_VARIABLE}"

[output]
dir = "out"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.mapping_file(), "from-env.csv");
        assert_eq!(config.templates_dir(), "${IAM_TEST_UNSET_VARIABLE}");

        std::env::remove_var("IAM_TEST_MAPPING_FILE");
    }

    #[test]
    fn test_invalid_values() {
        let bad_format = MINIMAL.replace(
            "dir = \"./source-system-templates\"",
            "dir = \"out\"\nformat = \"xml\"",
        );
        assert!(matches!(
            TomlConfig::from_toml_str(&bad_format),
            Err(CompilerError::ConfigValidationError { .. })
        ));

        let overlapping = MINIMAL.replace("./source-system-templates", "./yaml_templates");
        let config = TomlConfig::from_toml_str(&overlapping).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output_dir(), "./source-system-templates");
    }
}
