// file: src/database/insert.rs
// description: LanceDB batch insertion of sentence records with embeddings
// reference: https://docs.rs/lancedb

use crate::database::client::{AUTHOR_SEPARATOR, LanceDbClient, escape_literal};
use crate::database::embeddings::EmbeddingClient;
use crate::database::schema::SchemaManager;
use crate::error::{PipelineError, Result};
use crate::models::SentenceRecord;
use arrow_array::{
    FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray, UInt32Array,
};
use arrow_schema::Schema;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

pub struct BatchInserter<'a> {
    client: &'a LanceDbClient,
    embeddings: &'a EmbeddingClient,
}

#[derive(Debug, Clone, Default)]
pub struct InsertStats {
    pub sentences_inserted: usize,
    pub batches: usize,
}

impl<'a> BatchInserter<'a> {
    pub fn new(client: &'a LanceDbClient, embeddings: &'a EmbeddingClient) -> Self {
        Self { client, embeddings }
    }

    /// Embed and append `records` in `batch_size` chunks, creating the table
    /// on first insert.
    pub async fn insert_records(&self, records: &[SentenceRecord]) -> Result<InsertStats> {
        let mut stats = InsertStats::default();
        if records.is_empty() {
            return Ok(stats);
        }

        self.check_dimensions().await?;

        let schema = SchemaManager::sentences_schema(self.client.embedding_dim());
        let table_name = self.client.table_name();

        for chunk in records.chunks(self.client.batch_size()) {
            let batch = self.embed_chunk(schema.clone(), chunk).await?;

            if !self.client.table_exists(table_name).await? {
                self.client
                    .get_connection()
                    .create_table(
                        table_name,
                        RecordBatchIterator::new(vec![Ok(batch)], schema.clone()),
                    )
                    .execute()
                    .await
                    .map_err(|e| {
                        PipelineError::Database(format!("Failed to create table: {}", e))
                    })?;
                info!("Created new table: {}", table_name);
            } else {
                let table = self.client.get_table(table_name).await?;
                table
                    .add(RecordBatchIterator::new(vec![Ok(batch)], schema.clone()))
                    .execute()
                    .await
                    .map_err(|e| {
                        PipelineError::Database(format!("Failed to insert sentences: {}", e))
                    })?;
            }

            stats.sentences_inserted += chunk.len();
            stats.batches += 1;
            debug!("Inserted batch of {} sentences", chunk.len());
        }

        Ok(stats)
    }

    /// Swap the stored sentences of `sources` (and of every source named in
    /// `records`) for `records` in a single merge. Nothing is deleted unless
    /// the new rows are written.
    pub async fn replace_sources(
        &self,
        sources: &[String],
        records: &[SentenceRecord],
    ) -> Result<InsertStats> {
        self.check_dimensions().await?;

        let table_name = self.client.table_name();
        if !self.client.table_exists(table_name).await? {
            return self.insert_records(records).await;
        }

        let mut replaced: BTreeSet<&str> = sources.iter().map(String::as_str).collect();
        replaced.extend(records.iter().map(|r| r.metadata.source.as_str()));
        if replaced.is_empty() {
            return Ok(InsertStats::default());
        }

        let filter = format!(
            "source IN ({})",
            replaced
                .iter()
                .map(|source| format!("'{}'", escape_literal(source)))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let schema = SchemaManager::sentences_schema(self.client.embedding_dim());
        let mut batches = Vec::new();
        for chunk in records.chunks(self.client.batch_size()) {
            batches.push(self.embed_chunk(schema.clone(), chunk).await?);
        }

        let stats = InsertStats {
            sentences_inserted: records.len(),
            batches: batches.len(),
        };

        let table = self.client.get_table(table_name).await?;

        if batches.is_empty() {
            table.delete(&filter).await.map_err(|e| {
                PipelineError::Database(format!("Failed to delete replaced sentences: {}", e))
            })?;
            return Ok(stats);
        }

        let reader = RecordBatchIterator::new(batches.into_iter().map(Ok), schema);
        let mut merge = table.merge_insert(&["id"]);
        merge
            .when_matched_update_all(None)
            .when_not_matched_insert_all()
            .when_not_matched_by_source_delete(Some(filter));
        merge.execute(Box::new(reader)).await.map_err(|e| {
            PipelineError::Database(format!("Failed to replace sentences: {}", e))
        })?;

        info!(
            "Replaced sentences of {} sources with {} rows",
            replaced.len(),
            stats.sentences_inserted
        );
        Ok(stats)
    }

    async fn check_dimensions(&self) -> Result<()> {
        if self.embeddings.dim() != self.client.embedding_dim() {
            return Err(PipelineError::Validation(format!(
                "Embedding dimension {} does not match table dimension {}",
                self.embeddings.dim(),
                self.client.embedding_dim()
            )));
        }
        self.client.check_embedding_dim().await
    }

    async fn embed_chunk(
        &self,
        schema: Arc<Schema>,
        chunk: &[SentenceRecord],
    ) -> Result<RecordBatch> {
        let texts: Vec<String> = chunk.iter().map(|r| r.sentence.clone()).collect();
        let embeddings = self.embeddings.embed_batch(&texts).await?;
        build_record_batch(schema, chunk, embeddings)
    }
}

/// Arrow batch for `records`; `embeddings` must be parallel to `records`.
pub(crate) fn build_record_batch(
    schema: Arc<Schema>,
    records: &[SentenceRecord],
    embeddings: Vec<Vec<f32>>,
) -> Result<RecordBatch> {
    if records.len() != embeddings.len() {
        return Err(PipelineError::Embedding(format!(
            "{} records but {} embeddings",
            records.len(),
            embeddings.len()
        )));
    }

    let dim = match schema.field_with_name("embedding").map(|f| f.data_type()) {
        Ok(arrow_schema::DataType::FixedSizeList(_, dim)) => *dim,
        _ => {
            return Err(PipelineError::Database(
                "Schema has no fixed-size embedding column".to_string(),
            ));
        }
    };

    let ids: StringArray = records.iter().map(|r| Some(r.vector_id())).collect();
    let sentences: StringArray = records.iter().map(|r| Some(r.sentence.as_str())).collect();
    let titles: StringArray = records
        .iter()
        .map(|r| Some(r.metadata.title.as_str()))
        .collect();
    let authors: StringArray = records
        .iter()
        .map(|r| Some(r.metadata.authors.join(AUTHOR_SEPARATOR)))
        .collect();
    let years: StringArray = records
        .iter()
        .map(|r| Some(r.metadata.year.as_str()))
        .collect();
    let citations: StringArray = records
        .iter()
        .map(|r| Some(r.metadata.citation.as_str()))
        .collect();
    let phrase_numbers: UInt32Array = records
        .iter()
        .map(|r| Some(r.metadata.phrase_number))
        .collect();
    let pages: UInt32Array = records.iter().map(|r| Some(r.metadata.page)).collect();
    let sources: StringArray = records
        .iter()
        .map(|r| Some(r.metadata.source.as_str()))
        .collect();

    let embedding_values: Float32Array = embeddings
        .iter()
        .flat_map(|emb| emb.iter().copied())
        .collect();

    let embedding_list = FixedSizeListArray::try_new_from_values(embedding_values, dim)
        .map_err(|e| PipelineError::Database(format!("Failed to create embedding array: {}", e)))?;

    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(ids),
            Arc::new(sentences),
            Arc::new(titles),
            Arc::new(authors),
            Arc::new(years),
            Arc::new(citations),
            Arc::new(phrase_numbers),
            Arc::new(pages),
            Arc::new(sources),
            Arc::new(embedding_list),
        ],
    )
    .map_err(|e| PipelineError::Database(format!("Failed to create record batch: {}", e)))
}
