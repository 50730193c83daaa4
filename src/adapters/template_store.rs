use crate::domain::ports::TemplateStore;
use crate::utils::error::{CompilerError, Result};
use serde_yaml::Mapping;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const BASE_TEMPLATES_DIR: &str = "base_templates";
pub const STATEMENT_TEMPLATES_DIR: &str = "statement_templates";
pub const HEADER_TEMPLATE: &str = "base_template_header";
pub const ROLE_TEMPLATE: &str = "base_role_template";
pub const POLICY_TEMPLATE: &str = "base_policy_template";

fn not_found(name: &str) -> CompilerError {
    CompilerError::TemplateNotFound {
        name: name.to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateStore {
    header: Option<Mapping>,
    role_stub: Option<Mapping>,
    policy_stub: Option<Mapping>,
    shapes: BTreeMap<String, Mapping>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, header: Mapping) -> Self {
        self.header = Some(header);
        self
    }

    pub fn with_role_stub(mut self, role_stub: Mapping) -> Self {
        self.role_stub = Some(role_stub);
        self
    }

    pub fn with_policy_stub(mut self, policy_stub: Mapping) -> Self {
        self.policy_stub = Some(policy_stub);
        self
    }

    pub fn with_shape(mut self, key: impl Into<String>, shape: Mapping) -> Self {
        self.shapes.insert(key.into(), shape);
        self
    }

    /// Same as the `with_*` builders, taking YAML text.
    pub fn from_yaml(
        header: &str,
        role_stub: &str,
        policy_stub: &str,
        shapes: &[(&str, &str)],
    ) -> Result<Self> {
        let mut store = Self::new()
            .with_header(serde_yaml::from_str(header)?)
            .with_role_stub(serde_yaml::from_str(role_stub)?)
            .with_policy_stub(serde_yaml::from_str(policy_stub)?);
        for (key, shape) in shapes {
            store = store.with_shape(*key, serde_yaml::from_str(shape)?);
        }
        Ok(store)
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn header(&self) -> Result<Mapping> {
        self.header.clone().ok_or_else(|| not_found(HEADER_TEMPLATE))
    }

    fn role_stub(&self) -> Result<Mapping> {
        self.role_stub.clone().ok_or_else(|| not_found(ROLE_TEMPLATE))
    }

    fn policy_stub(&self) -> Result<Mapping> {
        self.policy_stub.clone().ok_or_else(|| not_found(POLICY_TEMPLATE))
    }

    fn statement_shape(&self, key: &str) -> Result<Mapping> {
        self.shapes.get(key).cloned().ok_or_else(|| not_found(key))
    }

    fn available_shapes(&self) -> Vec<String> {
        self.shapes.keys().cloned().collect()
    }
}

/// Template directory layout:
///
/// ```text
/// <root>/base_templates/base_template_header.yaml
/// <root>/base_templates/base_role_template.yaml
/// <root>/base_templates/base_policy_template.yaml
/// <root>/statement_templates/<Service><AccessLevel>.yaml
/// <root>/statement_templates/Deny.yaml
/// ```
///
/// Everything is read once by [`FsTemplateStore::load`]. A missing file is
/// only an error when the compiler asks for it.
#[derive(Debug, Clone)]
pub struct FsTemplateStore {
    root: PathBuf,
    inner: InMemoryTemplateStore,
}

impl FsTemplateStore {
    pub fn load<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let base = root.join(BASE_TEMPLATES_DIR);

        let mut inner = InMemoryTemplateStore::new();
        if let Some(header) = read_template(&base.join(format!("{}.yaml", HEADER_TEMPLATE)))? {
            inner = inner.with_header(header);
        }
        if let Some(role) = read_template(&base.join(format!("{}.yaml", ROLE_TEMPLATE)))? {
            inner = inner.with_role_stub(role);
        }
        if let Some(policy) = read_template(&base.join(format!("{}.yaml", POLICY_TEMPLATE)))? {
            inner = inner.with_policy_stub(policy);
        }

        let statements = root.join(STATEMENT_TEMPLATES_DIR);
        match fs::read_dir(&statements) {
            Ok(entries) => {
                for entry in entries {
                    let path = entry?.path();
                    let is_yaml = matches!(
                        path.extension().and_then(|e| e.to_str()),
                        Some("yaml") | Some("yml")
                    );
                    let key = path.file_stem().and_then(|s| s.to_str()).map(str::to_string);
                    if let (true, Some(key)) = (is_yaml, key) {
                        if let Some(shape) = read_template(&path)? {
                            inner = inner.with_shape(key, shape);
                        }
                    }
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("No statement templates under {}", statements.display());
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            "Loaded templates from {} ({} statement shapes)",
            root.display(),
            inner.shapes.len()
        );
        Ok(Self { root, inner })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn read_template(path: &Path) -> Result<Option<Mapping>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("Template {} not present", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|e| CompilerError::InvalidTemplate {
            name: path.display().to_string(),
            reason: e.to_string(),
        })
}

impl TemplateStore for FsTemplateStore {
    fn header(&self) -> Result<Mapping> {
        self.inner.header()
    }

    fn role_stub(&self) -> Result<Mapping> {
        self.inner.role_stub()
    }

    fn policy_stub(&self) -> Result<Mapping> {
        self.inner.policy_stub()
    }

    fn statement_shape(&self, key: &str) -> Result<Mapping> {
        self.inner.statement_shape(key)
    }

    fn available_shapes(&self) -> Vec<String> {
        self.inner.available_shapes()
    }
}

#[cfg(test)]
pub(crate) const SAMPLE_HEADER: &str = r#"
AWSTemplateFormatVersion: '2010-09-09'
Description: Data access IAM roles
Resources: {}
"#;

#[cfg(test)]
pub(crate) const SAMPLE_ROLE: &str = r#"
RESOURCE_NAME:
  Type: AWS::IAM::Role
  Properties:
    RoleName: ROLE_NAME
    AssumeRolePolicyDocument:
      Version: '2012-10-17'
      Statement:
        - Effect: Allow
          Principal:
            Federated: arn:aws:iam::123456789012:saml-provider/ADFS
          Action: sts:AssumeRoleWithSAML
    Policies:
      - PolicyName: BASE_POLICY
        PolicyDocument:
          Version: '2012-10-17'
          Statement: []
"#;

#[cfg(test)]
pub(crate) const SAMPLE_POLICY: &str = r#"
PolicyName: POLICY_NAME
PolicyDocument:
  Version: '2012-10-17'
  Statement: []
"#;

#[cfg(test)]
pub(crate) fn sample_store() -> InMemoryTemplateStore {
    InMemoryTemplateStore::from_yaml(
        SAMPLE_HEADER,
        SAMPLE_ROLE,
        SAMPLE_POLICY,
        &[
            (
                "S3ReadOnly",
                "Effect: Allow\nAction:\n  - s3:GetObject\n  - s3:ListBucket\nResource: []\n",
            ),
            ("S3Full", "Effect: Allow\nAction:\n  - s3:*\nResource: []\n"),
            (
                "AthenaReadOnly",
                "Effect: Allow\nAction:\n  - athena:GetQueryResults\nResource: []\n",
            ),
            ("Deny", "Effect: Deny\nAction:\n  - '*'\nResource: []\n"),
        ],
    )
    .expect("sample templates are valid YAML")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_in_memory_lookups() {
        let store = sample_store();
        assert!(store.header().is_ok());
        assert!(store.statement_shape("S3ReadOnly").is_ok());
        assert!(matches!(
            store.statement_shape("GlueFull"),
            Err(CompilerError::TemplateNotFound { name }) if name == "GlueFull"
        ));
        assert_eq!(
            store.available_shapes(),
            vec!["AthenaReadOnly", "Deny", "S3Full", "S3ReadOnly"]
        );
    }

    #[test]
    fn test_fs_store_loads_layout() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "base_templates/base_template_header.yaml", SAMPLE_HEADER);
        write(dir.path(), "base_templates/base_role_template.yaml", SAMPLE_ROLE);
        write(dir.path(), "base_templates/base_policy_template.yaml", SAMPLE_POLICY);
        write(
            dir.path(),
            "statement_templates/S3ReadOnly.yaml",
            "Effect: Allow\nAction:\n  - s3:GetObject\nResource: []\n",
        );
        write(dir.path(), "statement_templates/Deny.yml", "Effect: Deny\nResource: []\n");
        write(dir.path(), "statement_templates/README.md", "not a template");

        let store = FsTemplateStore::load(dir.path()).unwrap();

        assert_eq!(store.root(), dir.path());
        assert_eq!(store.header().unwrap(), sample_store().header().unwrap());
        assert!(store.role_stub().unwrap().contains_key("RESOURCE_NAME"));
        assert_eq!(store.available_shapes(), vec!["Deny", "S3ReadOnly"]);
    }

    #[test]
    fn test_fs_store_missing_files_fail_on_lookup() {
        let dir = TempDir::new().unwrap();
        let store = FsTemplateStore::load(dir.path()).unwrap();

        assert!(store.available_shapes().is_empty());
        assert!(matches!(
            store.header(),
            Err(CompilerError::TemplateNotFound { name }) if name == HEADER_TEMPLATE
        ));
    }

    #[test]
    fn test_fs_store_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "statement_templates/S3Full.yaml", "Effect: [unclosed\n");

        let err = FsTemplateStore::load(dir.path()).unwrap_err();
        assert!(matches!(err, CompilerError::InvalidTemplate { .. }));
    }
}
