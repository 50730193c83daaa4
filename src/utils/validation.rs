use crate::utils::error::{CompilerError, Result};
use std::collections::HashSet;
use std::path::{Component, PathBuf};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(CompilerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(CompilerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extension(field_name: &str, file: &str, allowed_extensions: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    match std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(extension) if allowed_set.contains(extension.to_ascii_lowercase().as_str()) => Ok(()),
        Some(extension) => Err(CompilerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(CompilerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CompilerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Resolves `.` and `..` lexically, relative to the working directory.
fn absolute(path: &str) -> PathBuf {
    let joined = match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => PathBuf::from(path),
    };

    let mut resolved = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    resolved
}

/// Rejects output directories that would wipe the working directory or the
/// filesystem root. Checked again right before the directory is recreated.
pub fn validate_output_dir(field_name: &str, output: &str) -> Result<()> {
    validate_path(field_name, output)?;

    let resolved = absolute(output);
    let contains_cwd = std::env::current_dir()
        .map(|cwd| cwd.starts_with(&resolved))
        .unwrap_or(false);

    if resolved.parent().is_none() || contains_cwd {
        return Err(CompilerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: output.to_string(),
            reason: "Output directory would delete the working directory".to_string(),
        });
    }
    Ok(())
}

/// The output directory is wiped on every run, so it must not overlap the inputs.
pub fn validate_distinct_paths(field_name: &str, output: &str, inputs: &[&str]) -> Result<()> {
    validate_output_dir(field_name, output)?;
    let output_path = absolute(output);

    for input in inputs {
        if absolute(input).starts_with(&output_path) {
            return Err(CompilerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: output.to_string(),
                reason: format!("Output directory would delete input '{}'", input),
            });
        }
    }
    Ok(())
}
