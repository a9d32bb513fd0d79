#[cfg(test)]
mod tests;

use super::{create_record_batch, create_schema, parse_search_batch, vector_dimension};
use crate::config::Config;
use crate::database::{QueryMatch, StoreRecord, VectorIndex, dedupe_by_id};
use crate::{LinkragError, Result};
use arrow::array::RecordBatchIterator;
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::{
    Connection, DistanceType, Table,
    query::{ExecutableQuery, QueryBase},
};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Local vector index; one LanceDB table per namespace
pub struct LanceVectorStore {
    connection: Connection,
    table_name: String,
    /// Dimension of the current table, `None` until it is known
    vector_dimension: Mutex<Option<usize>>,
}

impl LanceVectorStore {
    /// Open (or create) a LanceDB database at `path`
    #[inline]
    pub async fn new(path: &Path, namespace: &str) -> Result<Self> {
        debug!("Initializing LanceDB at path: {:?}", path);

        std::fs::create_dir_all(path)?;

        let uri = format!("file://{}", path.display());
        let connection = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| LinkragError::VectorStore(format!("Failed to connect to LanceDB: {}", e)))?;

        let store = Self {
            connection,
            table_name: table_name_for(namespace),
            vector_dimension: Mutex::new(None),
        };

        if let Some(table) = store.open_existing_table().await? {
            let schema = table
                .schema()
                .await
                .map_err(|e| LinkragError::VectorStore(format!("Failed to get table schema: {}", e)))?;
            let dim = vector_dimension(&schema);
            debug!("Existing table {} has vector dimension {:?}", store.table_name, dim);
            *store.vector_dimension.lock().await = dim;
        }

        Ok(store)
    }

    #[inline]
    pub async fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.vector_database_path(),
            &config.vector_store.namespace,
        )
        .await
    }

    #[inline]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Number of records in this namespace
    #[inline]
    pub async fn count_records(&self) -> Result<usize> {
        let Some(table) = self.open_existing_table().await? else {
            return Ok(0);
        };

        table
            .count_rows(None)
            .await
            .map_err(|e| LinkragError::VectorStore(format!("Failed to count rows: {}", e)))
    }

    async fn open_existing_table(&self) -> Result<Option<Table>> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| LinkragError::VectorStore(format!("Failed to list tables: {}", e)))?;

        if !table_names.contains(&self.table_name) {
            return Ok(None);
        }

        let table = self
            .connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| LinkragError::VectorStore(format!("Failed to open table: {}", e)))?;
        Ok(Some(table))
    }

    /// Drop the namespace table if present and create an empty one of `vector_dim`
    async fn recreate_table(&self, vector_dim: usize) -> Result<Table> {
        if self.open_existing_table().await?.is_some() {
            info!("Dropping table {} to change vector dimension", self.table_name);
            self.connection
                .drop_table(&self.table_name)
                .await
                .map_err(|e| LinkragError::VectorStore(format!("Failed to drop table: {}", e)))?;
        }

        self.connection
            .create_empty_table(&self.table_name, create_schema(vector_dim))
            .execute()
            .await
            .map_err(|e| LinkragError::VectorStore(format!("Failed to create table: {}", e)))
    }
}

#[async_trait]
impl VectorIndex for LanceVectorStore {
    #[inline]
    async fn upsert(&self, records: Vec<StoreRecord>) -> Result<usize> {
        let records = dedupe_by_id(records);
        let Some(first) = records.first() else {
            debug!("No records to upsert");
            return Ok(0);
        };
        let vector_dim = first.vector.len();
        let batch = create_record_batch(&records, vector_dim)?;

        let mut current_dim = self.vector_dimension.lock().await;
        let table = match (*current_dim, self.open_existing_table().await?) {
            (Some(dim), Some(table)) if dim == vector_dim => table,
            (previous, _) => {
                info!(
                    "Creating table {} with vector dimension {} (was {:?})",
                    self.table_name, vector_dim, previous
                );
                let table = self.recreate_table(vector_dim).await?;
                *current_dim = Some(vector_dim);
                table
            }
        };

        let schema = batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(batch)), schema);
        let mut merge = table.merge_insert(&["id"]);
        merge
            .when_matched_update_all(None)
            .when_not_matched_insert_all();
        merge
            .execute(Box::new(reader))
            .await
            .map_err(|e| LinkragError::VectorStore(format!("Failed to upsert records: {}", e)))?;

        info!("Upserted {} records into {}", records.len(), self.table_name);
        Ok(records.len())
    }

    #[inline]
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>> {
        let current_dim = *self.vector_dimension.lock().await;
        let Some(table) = self.open_existing_table().await? else {
            debug!("Table {} does not exist yet, no matches", self.table_name);
            return Ok(Vec::new());
        };
        if let Some(dim) = current_dim.filter(|dim| *dim != vector.len()) {
            return Err(LinkragError::VectorStore(format!(
                "Query has {} dimensions but namespace stores {}",
                vector.len(),
                dim
            )));
        }

        let mut results = table
            .vector_search(vector)
            .map_err(|e| LinkragError::VectorStore(format!("Failed to create vector search: {}", e)))?
            .column("vector")
            .distance_type(DistanceType::Cosine)
            .limit(top_k)
            .execute()
            .await
            .map_err(|e| LinkragError::VectorStore(format!("Failed to execute search: {}", e)))?;

        let mut matches = Vec::new();
        while let Some(batch) = results
            .try_next()
            .await
            .map_err(|e| LinkragError::VectorStore(format!("Failed to read result stream: {}", e)))?
        {
            matches.extend(parse_search_batch(&batch)?);
        }

        debug!("Found {} matches in {}", matches.len(), self.table_name);
        Ok(matches)
    }
}

/// LanceDB table names allow alphanumerics, `_`, `-` and `.`
#[inline]
pub fn table_name_for(namespace: &str) -> String {
    let sanitized: String = namespace
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("pages_{}", sanitized)
}
