use crate::core::naming::NamingConvention;
use crate::domain::model::{AccessRequirementRecord, CollisionPolicy, CompileResult, OutputFormat};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_yaml::Mapping;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Deletes `path` with its contents if present, then creates it empty.
    fn recreate_dir(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn mapping_file(&self) -> &str;
    fn templates_dir(&self) -> &str;
    fn output_dir(&self) -> &str;
    fn naming(&self) -> NamingConvention;
    fn output_format(&self) -> OutputFormat;
    fn collision_policy(&self) -> CollisionPolicy;
    fn skip_malformed(&self) -> bool;
}

/// Source of the stubs the compiler fills in. Lookups are synchronous; an
/// implementation backed by files loads them up front.
pub trait TemplateStore: Send + Sync {
    /// Template header; its `Resources` entry is replaced on output.
    fn header(&self) -> Result<Mapping>;
    /// Role stub with a single entry keyed by the `RESOURCE_NAME` placeholder.
    fn role_stub(&self) -> Result<Mapping>;
    /// Inline policy stub with `PolicyName` and `PolicyDocument`.
    fn policy_stub(&self) -> Result<Mapping>;
    /// Statement shape keyed by `<Service><AccessLevel>` or `Deny`.
    fn statement_shape(&self, key: &str) -> Result<Mapping>;
    fn available_shapes(&self) -> Vec<String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<AccessRequirementRecord>>;
    async fn transform(&self, records: Vec<AccessRequirementRecord>) -> Result<CompileResult>;
    async fn load(&self, result: CompileResult) -> Result<Vec<String>>;
}
