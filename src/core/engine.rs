use crate::core::Pipeline;
use crate::domain::model::CompileResult;
use crate::utils::error::Result;

/// Outcome of a full run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub written: Vec<String>,
    pub records_compiled: usize,
    pub records_skipped: usize,
    pub collisions: usize,
}

pub struct CompileEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> CompileEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Extracts and compiles without writing anything.
    pub async fn plan(&self) -> Result<CompileResult> {
        tracing::info!("Reading role mapping...");
        let records = self.pipeline.extract().await?;
        tracing::info!("Read {} records", records.len());

        tracing::info!("Compiling templates...");
        let result = self.pipeline.transform(records).await?;
        tracing::info!(
            "Compiled {} records into {} documents",
            result.records_compiled,
            result.documents.len()
        );
        if result.records_skipped > 0 {
            tracing::warn!("Skipped {} malformed records", result.records_skipped);
        }

        Ok(result)
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let result = self.plan().await?;
        let records_compiled = result.records_compiled;
        let records_skipped = result.records_skipped;
        let collisions = result.collisions;

        tracing::info!("Writing documents...");
        let written = self.pipeline.load(result).await?;
        tracing::info!("Wrote {} documents", written.len());

        Ok(RunSummary {
            written,
            records_compiled,
            records_skipped,
            collisions,
        })
    }
}
