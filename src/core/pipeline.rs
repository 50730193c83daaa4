use crate::adapters::mapping::parse_mapping;
use crate::core::compiler::TemplateCompiler;
use crate::core::{ConfigProvider, Pipeline, Storage, TemplateStore};
use crate::domain::model::{AccessRequirementRecord, CompileResult};
use crate::utils::error::Result;
use crate::utils::validation::validate_output_dir;

/// Reads the mapping through `storage`, compiles it with `store` and writes
/// one document per group into the configured output directory.
pub struct TemplatePipeline<S: Storage, C: ConfigProvider, T: TemplateStore> {
    storage: S,
    config: C,
    compiler: TemplateCompiler<T>,
}

impl<S: Storage, C: ConfigProvider, T: TemplateStore> TemplatePipeline<S, C, T> {
    pub fn new(storage: S, config: C, store: T) -> Self {
        let compiler = TemplateCompiler::new(store)
            .with_naming(config.naming())
            .with_collision_policy(config.collision_policy())
            .with_skip_malformed(config.skip_malformed());

        Self {
            storage,
            config,
            compiler,
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn store(&self) -> &T {
        self.compiler.store()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, T: TemplateStore> Pipeline for TemplatePipeline<S, C, T> {
    async fn extract(&self) -> Result<Vec<AccessRequirementRecord>> {
        tracing::debug!("Reading mapping file: {}", self.config.mapping_file());
        let data = self.storage.read_file(self.config.mapping_file()).await?;
        parse_mapping(&data, &self.config.naming().role_name_field)
    }

    async fn transform(&self, records: Vec<AccessRequirementRecord>) -> Result<CompileResult> {
        self.compiler.compile(records)
    }

    async fn load(&self, result: CompileResult) -> Result<Vec<String>> {
        let format = self.config.output_format();
        validate_output_dir("output_dir", self.config.output_dir())?;
        let output_dir = self.config.output_dir().trim_end_matches('/');

        // Render everything before touching the output directory.
        let rendered = result
            .documents
            .iter()
            .map(|document| Ok((document.file_name(format), format.render(document)?)))
            .collect::<Result<Vec<_>>>()?;

        self.storage.recreate_dir(output_dir).await?;

        let mut written = Vec::with_capacity(rendered.len());
        for (file_name, content) in rendered {
            let path = format!("{}/{}", output_dir, file_name);
            self.storage.write_file(&path, content.as_bytes()).await?;
            tracing::info!("Created {}", path);
            written.push(path);
        }

        Ok(written)
    }
}
