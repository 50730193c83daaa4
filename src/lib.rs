pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{FsTemplateStore, InMemoryTemplateStore};
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::{
    compiler::TemplateCompiler,
    engine::{CompileEngine, RunSummary},
    pipeline::TemplatePipeline,
};
pub use utils::error::{CompilerError, Result};
