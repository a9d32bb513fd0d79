// LanceDB vector database module
// Arrow schema and record conversion for locally stored page vectors


pub mod vector_store;

use arrow::array::{Array, FixedSizeListArray, Float32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

use super::{PageMetadata, QueryMatch, StoreRecord};
use crate::LinkragError;

pub use vector_store::LanceVectorStore;

/// Schema of a namespace table for vectors of `vector_dim` dimensions
#[inline]
pub fn create_schema(vector_dim: usize) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, false)),
                vector_dim as i32,
            ),
            false,
        ),
        Field::new("url", DataType::Utf8, false),
        Field::new("title", DataType::Utf8, false),
        Field::new("description", DataType::Utf8, false),
        Field::new("snippet", DataType::Utf8, false),
    ]))
}

/// Read the vector dimension back out of a table schema
#[inline]
pub fn vector_dimension(schema: &Schema) -> Option<usize> {
    schema
        .fields()
        .iter()
        .find(|field| field.name() == "vector")
        .and_then(|field| match field.data_type() {
            DataType::FixedSizeList(_, size) => usize::try_from(*size).ok(),
            _ => None,
        })
}

/// Build a RecordBatch from records that all have `vector_dim` dimensions
#[inline]
pub fn create_record_batch(
    records: &[StoreRecord],
    vector_dim: usize,
) -> Result<RecordBatch, LinkragError> {
    if let Some(bad) = records.iter().find(|r| r.vector.len() != vector_dim) {
        return Err(LinkragError::VectorStore(format!(
            "Record '{}' has {} dimensions, expected {}",
            bad.id,
            bad.vector.len(),
            vector_dim
        )));
    }

    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    let urls: Vec<&str> = records.iter().map(|r| r.metadata.url.as_str()).collect();
    let titles: Vec<&str> = records.iter().map(|r| r.metadata.title.as_str()).collect();
    let descriptions: Vec<&str> = records
        .iter()
        .map(|r| r.metadata.description.as_str())
        .collect();
    let snippets: Vec<&str> = records.iter().map(|r| r.metadata.snippet.as_str()).collect();

    let flat_values: Vec<f32> = records
        .iter()
        .flat_map(|r| r.vector.iter().copied())
        .collect();
    let field = Arc::new(Field::new("item", DataType::Float32, false));
    let vector_array = FixedSizeListArray::try_new(
        field,
        vector_dim as i32,
        Arc::new(Float32Array::from(flat_values)),
        None,
    )
    .map_err(|e| LinkragError::VectorStore(format!("Failed to create vector array: {}", e)))?;

    let arrays: Vec<Arc<dyn Array>> = vec![
        Arc::new(StringArray::from(ids)),
        Arc::new(vector_array),
        Arc::new(StringArray::from(urls)),
        Arc::new(StringArray::from(titles)),
        Arc::new(StringArray::from(descriptions)),
        Arc::new(StringArray::from(snippets)),
    ];

    RecordBatch::try_new(create_schema(vector_dim), arrays)
        .map_err(|e| LinkragError::VectorStore(format!("Failed to create record batch: {}", e)))
}

/// Parse one batch of search results; `_distance` becomes `score = 1 - distance`
#[inline]
pub fn parse_search_batch(batch: &RecordBatch) -> Result<Vec<QueryMatch>, LinkragError> {
    let ids = string_column(batch, "id")?;
    let urls = string_column(batch, "url")?;
    let titles = string_column(batch, "title")?;
    let descriptions = string_column(batch, "description")?;
    let snippets = string_column(batch, "snippet")?;

    let distances = batch
        .column_by_name("_distance")
        .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

    let matches = (0..batch.num_rows())
        .map(|row| {
            let distance = distances.map_or(0.0, |d| if d.is_null(row) { 0.0 } else { d.value(row) });

            QueryMatch {
                id: ids.value(row).to_string(),
                score: 1.0 - distance,
                metadata: PageMetadata {
                    url: urls.value(row).to_string(),
                    title: titles.value(row).to_string(),
                    description: descriptions.value(row).to_string(),
                    snippet: snippets.value(row).to_string(),
                },
            }
        })
        .collect();

    Ok(matches)
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, LinkragError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| LinkragError::VectorStore(format!("Missing {} column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| LinkragError::VectorStore(format!("Invalid {} column type", name)))
}
