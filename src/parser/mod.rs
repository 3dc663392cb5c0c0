// file: src/parser/mod.rs
// description: document loading and text cleanup module exports
// reference: internal module structure

pub mod markdown;
pub mod normalizer;
pub mod pdf;

pub use markdown::{Heading, MarkdownParser, ParsedMarkdown};
pub use normalizer::TextNormalizer;
pub use pdf::PdfLoader;
