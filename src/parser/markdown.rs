// file: src/parser/markdown.rs
// description: markdown notes to plain text with pulldown-cmark
// reference: https://docs.rs/pulldown-cmark

use crate::error::Result;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};

pub struct MarkdownParser;

#[derive(Debug, Clone)]
pub struct ParsedMarkdown {
    pub plain_text: String,
    pub headings: Vec<Heading>,
}

#[derive(Debug, Clone)]
pub struct Heading {
    pub level: u32,
    pub text: String,
}

impl ParsedMarkdown {
    pub fn title(&self) -> Option<&str> {
        self.headings
            .iter()
            .min_by_key(|h| h.level)
            .map(|h| h.text.as_str())
    }
}

impl MarkdownParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, content: &str) -> Result<ParsedMarkdown> {
        let parser = Parser::new(content);

        let mut plain_text = String::new();
        let mut headings = Vec::new();
        let mut current_heading: Option<(u32, String)> = None;
        let mut in_code_block = false;

        for event in parser {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    current_heading = Some((level as u32, String::new()));
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, text)) = current_heading.take() {
                        headings.push(Heading {
                            level,
                            text: text.trim().to_string(),
                        });
                    }
                    plain_text.push('\n');
                }
                Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
                Event::End(TagEnd::CodeBlock) => in_code_block = false,
                Event::End(TagEnd::Paragraph) | Event::End(TagEnd::Item) => {
                    plain_text.push('\n');
                }
                Event::Text(text) | Event::Code(text) => {
                    if in_code_block {
                        continue;
                    }
                    if let Some((_, ref mut heading_text)) = current_heading {
                        heading_text.push_str(&text);
                    }
                    plain_text.push_str(&text);
                }
                Event::SoftBreak | Event::HardBreak => {
                    plain_text.push(' ');
                }
                _ => {}
            }
        }

        Ok(ParsedMarkdown {
            plain_text: plain_text.trim().to_string(),
            headings,
        })
    }

    pub fn to_plain_text(&self, content: &str) -> Result<String> {
        Ok(self.parse(content)?.plain_text)
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_parsing() {
        let parser = MarkdownParser::new();
        let content = "# Title\n\nSome *content* here.\nSame paragraph.";
        let parsed = parser.parse(content).unwrap();

        assert_eq!(parsed.headings.len(), 1);
        assert_eq!(parsed.title(), Some("Title"));
        assert!(parsed.plain_text.contains("Some content here. Same paragraph."));
    }

    #[test]
    fn test_code_blocks_are_dropped() {
        let parser = MarkdownParser::new();
        let content = "Intro text.\n\n```rust\nfn main() {}\n```\n\nAfter.";
        let text = parser.to_plain_text(content).unwrap();

        assert!(!text.contains("fn main"));
        assert!(text.contains("After."));
    }

    #[test]
    fn test_list_items_become_lines() {
        let parser = MarkdownParser::new();
        let text = parser.to_plain_text("- One.\n- Two.").unwrap();
        assert_eq!(text, "One.\nTwo.");
    }
}
