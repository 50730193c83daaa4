pub mod arn;
pub mod compiler;
pub mod engine;
pub mod grammar;
pub mod group;
pub mod grouper;
pub mod naming;
pub mod pipeline;
pub mod policy;
pub mod role;
pub mod statement;

pub use crate::domain::model::{AccessRequirementRecord, CompileResult, GroupDocument};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage, TemplateStore};
pub use crate::utils::error::Result;
