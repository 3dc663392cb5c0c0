// file: src/database/client.rs
// description: LanceDB client wrapper with connection management
// reference: https://docs.rs/lancedb

use crate::config::DatabaseConfig;
use crate::error::{PipelineError, Result};
use crate::models::{SearchResult, SentenceMetadata, SentenceRecord};
use arrow_array::{Array, Float32Array, RecordBatch, StringArray, UInt32Array};
use arrow_schema::DataType;
use futures::StreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, Table, connect};
use tracing::{debug, info, warn};

pub(crate) const AUTHOR_SEPARATOR: &str = "; ";

#[derive(Clone)]
pub struct LanceDbClient {
    connection: Connection,
    config: DatabaseConfig,
}

/// One decoded row of the sentences table.
#[derive(Debug, Clone)]
pub struct StoredSentence {
    pub id: String,
    pub record: SentenceRecord,
    pub distance: Option<f32>,
}

impl LanceDbClient {
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        info!("Connecting to LanceDB at {}", config.uri);

        let connection = connect(&config.uri)
            .execute()
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to connect to LanceDB: {}", e)))?;

        Ok(Self { connection, config })
    }

    pub fn get_connection(&self) -> &Connection {
        &self.connection
    }

    pub async fn ping(&self) -> Result<bool> {
        debug!("Checking LanceDB connection");

        match self.connection.table_names().execute().await {
            Ok(_) => Ok(true),
            Err(e) => Err(PipelineError::Database(format!(
                "LanceDB connection failed: {}",
                e
            ))),
        }
    }

    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to list tables: {}", e)))?;

        Ok(table_names.iter().any(|name| name == table_name))
    }

    pub async fn get_table(&self, table_name: &str) -> Result<Table> {
        self.connection
            .open_table(table_name)
            .execute()
            .await
            .map_err(|e| {
                PipelineError::Database(format!("Failed to open table {}: {}", table_name, e))
            })
    }

    pub async fn get_sentence_count(&self) -> Result<u64> {
        if !self.table_exists(&self.config.table_name).await? {
            return Ok(0);
        }

        let table = self.get_table(&self.config.table_name).await?;
        let count = table
            .count_rows(None)
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to count rows: {}", e)))?;

        Ok(count as u64)
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    pub fn table_name(&self) -> &str {
        &self.config.table_name
    }

    pub fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }

    /// Fails when the existing table stores embeddings of another width than
    /// `database.embedding_dim`.
    pub async fn check_embedding_dim(&self) -> Result<()> {
        if !self.table_exists(&self.config.table_name).await? {
            return Ok(());
        }

        let table = self.get_table(&self.config.table_name).await?;
        let schema = table
            .schema()
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to read schema: {}", e)))?;

        let stored_dim = match schema.field_with_name("embedding").map(|f| f.data_type()) {
            Ok(DataType::FixedSizeList(_, dim)) => *dim as usize,
            _ => {
                return Err(PipelineError::Database(format!(
                    "Table {} has no fixed-size embedding column",
                    self.config.table_name
                )));
            }
        };

        if stored_dim != self.config.embedding_dim {
            return Err(PipelineError::Validation(format!(
                "Table {} stores {}-dimensional embeddings but embedding_dim is {}; run reset first",
                self.config.table_name, stored_dim, self.config.embedding_dim
            )));
        }

        Ok(())
    }

    /// Delete every sentence that came from `source`, so a paper can be
    /// re-ingested without duplicates.
    pub async fn delete_by_source(&self, source: &str) -> Result<()> {
        if !self.table_exists(&self.config.table_name).await? {
            return Ok(());
        }

        let table = self.get_table(&self.config.table_name).await?;
        let predicate = format!("source = '{}'", escape_literal(source));
        debug!("Deleting sentences with predicate: {}", predicate);

        table.delete(&predicate).await.map_err(|e| {
            PipelineError::Database(format!(
                "Failed to delete sentences for {}: {}",
                source, e
            ))
        })?;

        Ok(())
    }

    /// Nearest sentences to `query_embedding`, most similar first.
    pub async fn vector_search(
        &self,
        query_embedding: Vec<f32>,
        k: usize,
        source_filter: Option<&str>,
    ) -> Result<Vec<SearchResult>> {
        if !self.table_exists(&self.config.table_name).await? {
            warn!("Table does not exist, returning empty results");
            return Ok(Vec::new());
        }

        let table = self.get_table(&self.config.table_name).await?;

        info!("Performing vector search with k = {}", k);

        let mut query = table
            .vector_search(query_embedding)
            .map_err(|e| PipelineError::Database(format!("Failed to create vector search: {}", e)))?
            .limit(k);

        if let Some(source) = source_filter {
            let filter = format!("source = '{}'", escape_literal(source));
            query = query.only_if(&filter);
            debug!("Applied filter: {}", filter);
        }

        let mut results_stream = query
            .execute()
            .await
            .map_err(|e| PipelineError::Database(format!("Vector search failed: {}", e)))?;

        let mut search_results = Vec::new();

        while let Some(batch_result) = results_stream.next().await {
            let batch = batch_result.map_err(|e| {
                PipelineError::Database(format!("Failed to read result batch: {}", e))
            })?;

            for stored in decode_batch(&batch)? {
                search_results.push(SearchResult::new(
                    stored.id,
                    stored.record.sentence,
                    stored.record.metadata,
                    stored.distance,
                ));
            }
        }

        search_results.sort_by(|a, b| b.score.total_cmp(&a.score));

        info!("Vector search returned {} results", search_results.len());
        Ok(search_results)
    }

    /// Every stored sentence, optionally limited to one source.
    pub async fn scan_sentences(&self, source_filter: Option<&str>) -> Result<Vec<StoredSentence>> {
        if !self.table_exists(&self.config.table_name).await? {
            return Ok(Vec::new());
        }

        let table = self.get_table(&self.config.table_name).await?;
        let mut query = table.query();

        if let Some(source) = source_filter {
            query = query.only_if(format!("source = '{}'", escape_literal(source)));
        }

        let mut stream = query
            .execute()
            .await
            .map_err(|e| PipelineError::Database(format!("Table scan failed: {}", e)))?;

        let mut rows = Vec::new();
        while let Some(batch_result) = stream.next().await {
            let batch = batch_result.map_err(|e| {
                PipelineError::Database(format!("Failed to read result batch: {}", e))
            })?;
            rows.extend(decode_batch(&batch)?);
        }

        Ok(rows)
    }
}

pub(crate) fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

fn string_column<'b>(batch: &'b RecordBatch, name: &str) -> Result<&'b StringArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| PipelineError::Database(format!("Missing '{}' column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| PipelineError::Database(format!("Invalid '{}' column type", name)))
}

fn u32_column<'b>(batch: &'b RecordBatch, name: &str) -> Result<&'b UInt32Array> {
    batch
        .column_by_name(name)
        .ok_or_else(|| PipelineError::Database(format!("Missing '{}' column", name)))?
        .as_any()
        .downcast_ref::<UInt32Array>()
        .ok_or_else(|| PipelineError::Database(format!("Invalid '{}' column type", name)))
}

pub(crate) fn decode_batch(batch: &RecordBatch) -> Result<Vec<StoredSentence>> {
    let ids = string_column(batch, "id")?;
    let sentences = string_column(batch, "sentence")?;
    let titles = string_column(batch, "title")?;
    let authors = string_column(batch, "authors")?;
    let years = string_column(batch, "year")?;
    let citations = string_column(batch, "citation")?;
    let phrase_numbers = u32_column(batch, "phrase_number")?;
    let pages = u32_column(batch, "page")?;
    let sources = string_column(batch, "source")?;

    // LanceDB adds the distance column to vector search results only
    let distances = batch
        .column_by_name("_distance")
        .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

    let rows = (0..batch.num_rows())
        .map(|i| {
            let author_list = authors.value(i);
            let metadata = SentenceMetadata {
                title: titles.value(i).to_string(),
                authors: if author_list.is_empty() {
                    Vec::new()
                } else {
                    author_list
                        .split(AUTHOR_SEPARATOR)
                        .map(str::to_string)
                        .collect()
                },
                year: years.value(i).to_string(),
                citation: citations.value(i).to_string(),
                phrase_number: phrase_numbers.value(i),
                page: pages.value(i),
                source: sources.value(i).to_string(),
            };

            StoredSentence {
                id: ids.value(i).to_string(),
                record: SentenceRecord::new(sentences.value(i), metadata),
                distance: distances.filter(|d| !d.is_null(i)).map(|d| d.value(i)),
            }
        })
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::insert::build_record_batch;
    use crate::database::schema::SchemaManager;

    fn record(sentence: &str, authors: Vec<&str>) -> SentenceRecord {
        SentenceRecord::new(
            sentence,
            SentenceMetadata {
                title: "Ancient Lakes".to_string(),
                authors: authors.into_iter().map(str::to_string).collect(),
                year: "2019".to_string(),
                citation: "Doe (2019)".to_string(),
                phrase_number: 1,
                page: 3,
                source: "lakes.pdf".to_string(),
            },
        )
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal("o'neil.pdf"), "o''neil.pdf");
    }

    #[test]
    fn test_decode_batch_round_trips_metadata() {
        let records = vec![
            record("Lakes existed.", vec!["Doe, J.", "Roe, A."]),
            record("No authors here.", vec![]),
        ];
        let schema = SchemaManager::sentences_schema(4);
        let batch =
            build_record_batch(schema, &records, vec![vec![0.0; 4], vec![1.0; 4]]).unwrap();

        let rows = decode_batch(&batch).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].record, records[0]);
        assert_eq!(rows[0].id, records[0].vector_id());
        assert!(rows[1].record.metadata.authors.is_empty());
        assert!(rows[0].distance.is_none());
    }

    #[tokio::test]
    async fn test_missing_table_is_empty() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = DatabaseConfig {
            uri: temp.path().join("db").display().to_string(),
            table_name: "sentences".to_string(),
            batch_size: 10,
            embedding_dim: 4,
        };

        let client = LanceDbClient::new(config).await.unwrap();
        assert!(client.ping().await.unwrap());
        assert_eq!(client.get_sentence_count().await.unwrap(), 0);
        assert!(client.scan_sentences(None).await.unwrap().is_empty());
        assert!(client.vector_search(vec![0.0; 4], 5, None).await.unwrap().is_empty());
    }
}
