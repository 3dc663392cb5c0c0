// file: src/llm/mod.rs
// description: language model abstraction and chat completion client
// reference: internal module structure

pub mod chat;
#[cfg(test)]
pub(crate) mod test_support;

pub use chat::ChatClient;

use crate::error::Result;
use std::future::Future;

/// Anything that turns a rendered prompt into a completion.
pub trait LanguageModel: Send + Sync {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}
