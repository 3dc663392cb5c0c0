// file: src/prompts/mod.rs
// description: prompt templates and prompt store module exports
// reference: internal module structure

pub mod store;
pub mod template;

pub use store::{PromptEntry, PromptStore};
pub use template::{PromptKind, PromptTemplate};
