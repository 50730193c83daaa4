pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation;

#[cfg(feature = "cli")]
use crate::core::naming::{NamingConvention, DEFAULT_ROLE_NAME_FIELD, DEFAULT_ROLE_PREFIX};
#[cfg(feature = "cli")]
use crate::domain::model::{CollisionPolicy, OutputFormat};
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

/// Checks shared by every configuration source.
pub fn validate_settings<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validation::validate_path("mapping_file", config.mapping_file())?;
    validation::validate_file_extension("mapping_file", config.mapping_file(), &["csv"])?;
    validation::validate_path("templates_dir", config.templates_dir())?;
    validation::validate_path("output_dir", config.output_dir())?;

    let naming = config.naming();
    validation::validate_non_empty_string("role_name_field", &naming.role_name_field)?;

    validation::validate_distinct_paths(
        "output_dir",
        config.output_dir(),
        &[config.templates_dir(), config.mapping_file()],
    )
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "data-access-iam")]
#[command(about = "Compile an IAM role mapping into CloudFormation role templates")]
pub struct CliConfig {
    /// CSV mapping of role names to per-service access requirements
    #[arg(short = 'f', long, visible_alias = "configfile")]
    pub mapping_file: String,

    #[arg(long, default_value = "./yaml_templates")]
    pub templates_dir: String,

    /// Deleted and re-created on every run
    #[arg(long, default_value = "./source-system-templates")]
    pub output_dir: String,

    #[arg(long, default_value = DEFAULT_ROLE_NAME_FIELD)]
    pub role_name_field: String,

    #[arg(long, default_value = DEFAULT_ROLE_PREFIX, allow_hyphen_values = true)]
    pub role_prefix: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// What to do when two roles in a group share a resource name
    #[arg(long, value_enum, default_value_t = CollisionPolicy::Overwrite)]
    pub on_duplicate: CollisionPolicy,

    /// Skip rows whose role name does not follow PREFIX-ROLE_SOURCESYSTEM
    #[arg(long)]
    pub skip_malformed: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(long, help = "Compile and report without writing any files")]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn mapping_file(&self) -> &str {
        &self.mapping_file
    }

    fn templates_dir(&self) -> &str {
        &self.templates_dir
    }

    fn output_dir(&self) -> &str {
        &self.output_dir
    }

    fn naming(&self) -> NamingConvention {
        NamingConvention {
            role_name_field: self.role_name_field.clone(),
            role_prefix: self.role_prefix.clone(),
        }
    }

    fn output_format(&self) -> OutputFormat {
        self.format
    }

    fn collision_policy(&self) -> CollisionPolicy {
        self.on_duplicate
    }

    fn skip_malformed(&self) -> bool {
        self.skip_malformed
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_settings(self)
    }
}
