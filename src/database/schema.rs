// file: src/database/schema.rs
// description: LanceDB schema management for the sentence vector table
// reference: https://docs.rs/lancedb

use crate::database::client::LanceDbClient;
use crate::error::{PipelineError, Result};
use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;
use tracing::{info, warn};

pub struct SchemaManager<'a> {
    client: &'a LanceDbClient,
}

impl<'a> SchemaManager<'a> {
    pub fn new(client: &'a LanceDbClient) -> Self {
        Self { client }
    }

    pub async fn initialize(&self) -> Result<()> {
        info!("Initializing LanceDB schema");

        if !self.client.table_exists(self.client.table_name()).await? {
            // Created lazily on first insert so the embedding width is known
            info!("Sentences table will be created on first insert");
        } else {
            info!("Sentences table already exists");
        }

        Ok(())
    }

    pub async fn verify_schema(&self) -> Result<bool> {
        let table_name = self.client.table_name();

        if !self.client.table_exists(table_name).await? {
            warn!("Table '{}' does not exist", table_name);
            return Ok(false);
        }

        let table = self.client.get_table(table_name).await?;
        let schema = table
            .schema()
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to read schema: {}", e)))?;

        let expected = Self::sentences_schema(self.client.embedding_dim());
        let missing: Vec<&str> = expected
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .filter(|name| schema.field_with_name(name).is_err())
            .collect();

        if !missing.is_empty() {
            warn!("Table '{}' is missing columns: {:?}", table_name, missing);
            return Ok(false);
        }

        info!("Table '{}' matches the sentence schema", table_name);
        Ok(true)
    }

    /// Arrow schema of the sentences table.
    pub fn sentences_schema(embedding_dim: usize) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("sentence", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, false),
            // Authors joined with "; "
            Field::new("authors", DataType::Utf8, false),
            Field::new("year", DataType::Utf8, false),
            Field::new("citation", DataType::Utf8, false),
            Field::new("phrase_number", DataType::UInt32, false),
            Field::new("page", DataType::UInt32, false),
            Field::new("source", DataType::Utf8, false),
            Field::new(
                "embedding",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    embedding_dim as i32,
                ),
                false,
            ),
        ]))
    }

    pub async fn drop_all_tables(&self) -> Result<()> {
        warn!("Dropping sentence table in LanceDB");

        let table_name = self.client.table_name();

        if self.client.table_exists(table_name).await? {
            self.client
                .get_connection()
                .drop_table(table_name)
                .await
                .map_err(|e| {
                    PipelineError::Database(format!("Failed to drop table {}: {}", table_name, e))
                })?;
            info!("Dropped table: {}", table_name);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_generation() {
        let schema = SchemaManager::sentences_schema(384);
        assert_eq!(schema.fields().len(), 10);

        let embedding_field = schema.field_with_name("embedding").unwrap();
        assert!(matches!(
            embedding_field.data_type(),
            DataType::FixedSizeList(_, 384)
        ));
        assert!(schema.field_with_name("phrase_number").is_ok());
    }
}
