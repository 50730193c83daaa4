// Adapters layer: concrete implementations of the mapping source and template store.

pub mod mapping;
pub mod template_store;

pub use mapping::parse_mapping;
pub use template_store::{FsTemplateStore, InMemoryTemplateStore};
