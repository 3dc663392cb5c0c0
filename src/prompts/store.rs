// file: src/prompts/store.rs
// description: YAML-backed prompt store with per-category template lists
// reference: https://docs.rs/yaml-rust

use crate::error::{PipelineError, Result};
use crate::prompts::template::{PromptKind, PromptTemplate};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use yaml_rust::yaml::Hash;
use yaml_rust::{Yaml, YamlEmitter, YamlLoader};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptEntry {
    pub template: String,
}

#[derive(Debug, Clone)]
pub struct PromptStore {
    path: PathBuf,
    prompts: BTreeMap<String, Vec<PromptEntry>>,
}

impl PromptStore {
    /// Opens the store at `path`. A missing file yields an empty
    /// `document_metadata` category.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let prompts = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| {
                PipelineError::FileOperation {
                    path: path.clone(),
                    source,
                }
            })?;
            let prompts = parse_prompts(&content)?;
            debug!(
                "Loaded {} prompt categories from {}",
                prompts.len(),
                path.display()
            );
            prompts
        } else {
            debug!("Prompt file {} not found, starting empty", path.display());
            let mut prompts = BTreeMap::new();
            prompts.insert(PromptKind::DocumentMetadata.category().to_string(), Vec::new());
            prompts
        };

        Ok(Self { path, prompts })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.prompts.keys().map(String::as_str)
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let content = emit_prompts(&self.prompts)?;
        fs::write(&self.path, content).map_err(|source| PipelineError::FileOperation {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }

    pub fn list(&self, category: &str) -> &[PromptEntry] {
        self.prompts
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn add(&mut self, category: &str, template: impl Into<String>) -> Result<usize> {
        let entries = self.prompts.entry(category.to_string()).or_default();
        entries.push(PromptEntry {
            template: template.into(),
        });
        let index = entries.len() - 1;
        self.save()?;
        info!("Prompt added to category '{}' at index {}", category, index);
        Ok(index)
    }

    pub fn edit(&mut self, category: &str, index: usize, template: impl Into<String>) -> Result<()> {
        let entry = self
            .prompts
            .get_mut(category)
            .and_then(|entries| entries.get_mut(index))
            .ok_or_else(|| not_found(category, index))?;
        entry.template = template.into();
        self.save()?;
        info!("Prompt {} in category '{}' edited", index, category);
        Ok(())
    }

    pub fn delete(&mut self, category: &str, index: usize) -> Result<PromptEntry> {
        let entries = self
            .prompts
            .get_mut(category)
            .filter(|entries| index < entries.len())
            .ok_or_else(|| not_found(category, index))?;
        let removed = entries.remove(index);
        self.save()?;
        info!("Prompt {} deleted from category '{}'", index, category);
        Ok(removed)
    }

    pub fn get(&self, category: &str, index: usize) -> Result<&str> {
        self.prompts
            .get(category)
            .and_then(|entries| entries.get(index))
            .map(|entry| entry.template.as_str())
            .ok_or_else(|| not_found(category, index))
    }

    /// First stored template of the kind's category, else the built-in one.
    pub fn resolve(&self, kind: PromptKind) -> Result<PromptTemplate> {
        let template = match self.list(kind.category()).first() {
            Some(entry) => PromptTemplate::new(entry.template.clone()),
            None => PromptTemplate::builtin(kind),
        };
        template.verify(kind)?;
        Ok(template)
    }
}

fn not_found(category: &str, index: usize) -> PipelineError {
    PipelineError::PromptNotFound {
        category: category.to_string(),
        index,
    }
}

fn parse_prompts(content: &str) -> Result<BTreeMap<String, Vec<PromptEntry>>> {
    let docs = YamlLoader::load_from_str(content)
        .map_err(|e| PipelineError::PromptStore(format!("Invalid YAML: {}", e)))?;

    let mut prompts = BTreeMap::new();

    let Some(root) = docs.first() else {
        return Ok(prompts);
    };

    let hash = match root {
        Yaml::Hash(hash) => hash,
        Yaml::Null => return Ok(prompts),
        _ => {
            return Err(PipelineError::PromptStore(
                "Top level must be a mapping of categories".to_string(),
            ));
        }
    };

    for (key, value) in hash {
        let category = key.as_str().ok_or_else(|| {
            PipelineError::PromptStore("Category names must be strings".to_string())
        })?;

        let entries = match value {
            Yaml::Array(items) => items
                .iter()
                .map(|item| {
                    item["template"]
                        .as_str()
                        .map(|template| PromptEntry {
                            template: template.to_string(),
                        })
                        .ok_or_else(|| {
                            PipelineError::PromptStore(format!(
                                "Entry in '{}' has no string 'template' field",
                                category
                            ))
                        })
                })
                .collect::<Result<Vec<_>>>()?,
            Yaml::Null => Vec::new(),
            _ => {
                return Err(PipelineError::PromptStore(format!(
                    "Category '{}' must be a list",
                    category
                )));
            }
        };

        prompts.insert(category.to_string(), entries);
    }

    Ok(prompts)
}

fn emit_prompts(prompts: &BTreeMap<String, Vec<PromptEntry>>) -> Result<String> {
    let mut root = Hash::new();

    for (category, entries) in prompts {
        let items = entries
            .iter()
            .map(|entry| {
                let mut item = Hash::new();
                item.insert(
                    Yaml::String("template".to_string()),
                    Yaml::String(entry.template.clone()),
                );
                Yaml::Hash(item)
            })
            .collect();
        root.insert(Yaml::String(category.clone()), Yaml::Array(items));
    }

    let mut out = String::new();
    {
        let mut emitter = YamlEmitter::new(&mut out);
        emitter
            .dump(&Yaml::Hash(root))
            .map_err(|e| PipelineError::PromptStore(format!("Failed to emit YAML: {:?}", e)))?;
    }
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store_in(temp: &TempDir) -> PromptStore {
        PromptStore::open(temp.path().join("config/prompts.yaml")).unwrap()
    }

    #[test]
    fn test_missing_file_has_empty_metadata_category() {
        let temp = TempDir::new().unwrap();
        let store = store_in(&temp);

        assert_eq!(store.categories().collect::<Vec<_>>(), vec!["document_metadata"]);
        assert!(store.list("document_metadata").is_empty());
        assert!(store.list("unknown").is_empty());
    }

    #[test]
    fn test_add_persists_and_reloads() {
        let temp = TempDir::new().unwrap();
        let mut store = store_in(&temp);

        let index = store
            .add("summary", "Summarize:\n{text}\n- no intro phrases")
            .unwrap();
        assert_eq!(index, 0);

        let reloaded = PromptStore::open(store.path()).unwrap();
        assert_eq!(
            reloaded.get("summary", 0).unwrap(),
            "Summarize:\n{text}\n- no intro phrases"
        );
        assert!(reloaded.list("document_metadata").is_empty());
    }

    #[test]
    fn test_edit_and_delete() {
        let temp = TempDir::new().unwrap();
        let mut store = store_in(&temp);
        store.add("topic_label", "first {keywords}").unwrap();
        store.add("topic_label", "second {keywords}").unwrap();

        store.edit("topic_label", 1, "edited {keywords}").unwrap();
        assert_eq!(store.get("topic_label", 1).unwrap(), "edited {keywords}");

        let removed = store.delete("topic_label", 0).unwrap();
        assert_eq!(removed.template, "first {keywords}");
        assert_eq!(store.list("topic_label").len(), 1);
        assert_eq!(store.get("topic_label", 0).unwrap(), "edited {keywords}");
    }

    #[test]
    fn test_out_of_range_operations_fail() {
        let temp = TempDir::new().unwrap();
        let mut store = store_in(&temp);

        assert!(matches!(
            store.get("document_metadata", 0),
            Err(PipelineError::PromptNotFound { index: 0, .. })
        ));
        assert!(store.edit("missing", 0, "x").is_err());
        assert!(store.delete("document_metadata", 3).is_err());
    }

    #[test]
    fn test_resolve_prefers_stored_template() {
        let temp = TempDir::new().unwrap();
        let mut store = store_in(&temp);

        let builtin = store.resolve(PromptKind::Summary).unwrap();
        assert_eq!(builtin, PromptTemplate::builtin(PromptKind::Summary));

        store.add("summary", "Short version of {text}").unwrap();
        let stored = store.resolve(PromptKind::Summary).unwrap();
        assert_eq!(stored.text(), "Short version of {text}");
    }

    #[test]
    fn test_resolve_rejects_broken_stored_template() {
        let temp = TempDir::new().unwrap();
        let mut store = store_in(&temp);
        store.add("document_metadata", "No placeholder here").unwrap();

        assert!(matches!(
            store.resolve(PromptKind::DocumentMetadata),
            Err(PipelineError::MissingPlaceholders { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_non_mapping() {
        assert!(parse_prompts("- just\n- a list\n").is_err());
        assert!(parse_prompts("").unwrap().is_empty());
    }
}
