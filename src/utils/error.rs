use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompilerError {
    #[error("Malformed role name '{role_name}': {reason}")]
    MalformedRoleName { role_name: String, reason: String },

    #[error("Malformed access requirement for {service} at byte {position} in '{input}': {reason}")]
    MalformedRequirement {
        service: String,
        input: String,
        position: usize,
        reason: String,
    },

    #[error("Template not found: {name}")]
    TemplateNotFound { name: String },

    #[error("Invalid template {name}: {reason}")]
    InvalidTemplate { name: String, reason: String },

    #[error("Duplicate resource name '{resource_name}' in group {group}")]
    DuplicateResourceName {
        group: String,
        resource_name: String,
    },

    #[error("Missing field '{field}' in mapping row {row}")]
    MissingField { field: String, row: usize },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Template,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CompilerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedRoleName { .. }
            | Self::MalformedRequirement { .. }
            | Self::DuplicateResourceName { .. }
            | Self::MissingField { .. }
            | Self::CsvError(_) => ErrorCategory::Input,
            Self::TemplateNotFound { .. } | Self::InvalidTemplate { .. } | Self::YamlError(_) => {
                ErrorCategory::Template
            }
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    /// None of these errors are transient, so nothing maps to `Medium`.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Template => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::MalformedRoleName { .. } => {
                "Role names must follow PREFIX-ROLE_SOURCESYSTEM; fix the row or pass --skip-malformed"
                    .to_string()
            }
            Self::MalformedRequirement { .. } => {
                "Use the form Level|Effect:Allow;Resource:r1,r2;Source:s1,s2 where Effect is \
                 'Allow' or any value containing 'Deny'"
                    .to_string()
            }
            Self::TemplateNotFound { name } => {
                format!("Make sure '{}' exists in the templates directory", name)
            }
            Self::InvalidTemplate { name, .. } => {
                format!("Check the structure of template '{}'", name)
            }
            Self::DuplicateResourceName { .. } => {
                "Rename one of the roles or run with --on-duplicate overwrite".to_string()
            }
            Self::MissingField { field, .. } => {
                format!("Add a '{}' column to the mapping file", field)
            }
            Self::CsvError(_) => "Make sure the mapping file is valid CSV with a header row".to_string(),
            Self::IoError(_) => "Check that the paths exist and are accessible".to_string(),
            Self::YamlError(_) => "Make sure every template file is valid YAML".to_string(),
            Self::SerializationError(_) => "Try the yaml output format".to_string(),
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Review the configuration values".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("The mapping file could not be compiled: {}", self),
            ErrorCategory::Template => format!("A template is missing or broken: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// Process exit code for the binaries.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompilerError>;
