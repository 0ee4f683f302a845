//! Qdrant vector store over gRPC
use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::vectors_config::Config as VectorsConfigKind;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    Value as QdrantValue, VectorParamsBuilder, VectorsConfig,
};
use qdrant_client::{Payload, Qdrant, QdrantError};
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use super::{StoredPoint, VectorStore};
use crate::document::{Document, ScoredDocument};
use crate::errors::{Result, SymbiontError};

/// Payload key holding the document text
pub const CONTENT_KEY: &str = "page_content";
/// Payload key holding the document metadata object
pub const METADATA_KEY: &str = "metadata";

/// Points sent per upsert request
const UPSERT_BATCH_SIZE: usize = 64;

/// Qdrant-backed [`VectorStore`]
pub struct QdrantStore {
    client: Qdrant,
}

fn store_err(e: QdrantError) -> SymbiontError {
    SymbiontError::StoreError(e.to_string())
}

impl QdrantStore {
    /// Build a client for `url`. No request is made until first use.
    pub fn connect(url: &str, api_key: Option<&str>) -> Result<Self> {
        let mut config = Qdrant::from_url(url);
        if let Some(key) = api_key {
            config = config.api_key(key.to_string());
        }
        let client = config.build().map_err(store_err)?;

        debug!(url, "qdrant client configured");
        Ok(Self { client })
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        self.client.collection_exists(name).await.map_err(store_err)
    }

    async fn collection_dimensions(&self, name: &str) -> Result<Option<usize>> {
        let info = self.client.collection_info(name).await.map_err(store_err)?;

        Ok(info
            .result
            .and_then(|r| r.config)
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .as_ref()
            .and_then(vector_size))
    }

    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await
            .map_err(store_err)?;

        info!(collection = name, dimensions, "created qdrant collection");
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<StoredPoint>) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let total = points.len();
        let mut points = points.into_iter().peekable();
        while points.peek().is_some() {
            let batch = points
                .by_ref()
                .take(UPSERT_BATCH_SIZE)
                .map(to_point_struct)
                .collect::<Result<Vec<_>>>()?;

            self.client
                .upsert_points(UpsertPointsBuilder::new(collection, batch).wait(true))
                .await
                .map_err(store_err)?;
        }

        debug!(collection, count = total, "upserted points to qdrant");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredDocument>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, vector.to_vec(), limit as u64).with_payload(true),
            )
            .await
            .map_err(store_err)?;

        let results = response
            .result
            .into_iter()
            .map(|scored| {
                let id = scored
                    .id
                    .as_ref()
                    .and_then(|pid| match &pid.point_id_options {
                        Some(PointIdOptions::Uuid(s)) => Some(s.clone()),
                        Some(PointIdOptions::Num(n)) => Some(n.to_string()),
                        None => None,
                    })
                    .unwrap_or_default();
                debug!(point = %id, score = scored.score, "search hit");

                ScoredDocument {
                    document: document_from_payload(&scored.payload),
                    score: scored.score,
                }
            })
            .collect();

        Ok(results)
    }
}

/// Size of the unnamed vector, or of the only named one
fn vector_size(config: &VectorsConfig) -> Option<usize> {
    match &config.config {
        Some(VectorsConfigKind::Params(params)) => Some(params.size as usize),
        Some(VectorsConfigKind::ParamsMap(named)) if named.map.len() == 1 => {
            named.map.values().next().map(|params| params.size as usize)
        }
        _ => None,
    }
}

/// Payload layout: `{ "page_content": ..., "metadata": { ... } }`
fn to_point_struct(point: StoredPoint) -> Result<PointStruct> {
    let metadata: Map<String, JsonValue> = point.document.metadata.into_iter().collect();

    let mut body = Map::new();
    body.insert(CONTENT_KEY.to_string(), JsonValue::String(point.document.page_content));
    body.insert(METADATA_KEY.to_string(), JsonValue::Object(metadata));

    let payload = Payload::try_from(JsonValue::Object(body))
        .map_err(|e| SymbiontError::StoreError(format!("invalid payload: {}", e)))?;

    Ok(PointStruct::new(point.id, point.vector, payload))
}

fn document_from_payload(payload: &HashMap<String, QdrantValue>) -> Document {
    let page_content = payload
        .get(CONTENT_KEY)
        .and_then(|v| match &v.kind {
            Some(Kind::StringValue(s)) => Some(s.clone()),
            _ => None,
        })
        .unwrap_or_default();

    let metadata: BTreeMap<String, JsonValue> = match payload.get(METADATA_KEY).map(qdrant_to_json) {
        Some(JsonValue::Object(map)) => map.into_iter().collect(),
        _ => BTreeMap::new(),
    };

    Document {
        page_content,
        metadata,
    }
}

fn qdrant_to_json(value: &QdrantValue) -> JsonValue {
    match &value.kind {
        Some(Kind::StringValue(s)) => JsonValue::String(s.clone()),
        Some(Kind::IntegerValue(i)) => JsonValue::from(*i),
        Some(Kind::DoubleValue(f)) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Some(Kind::BoolValue(b)) => JsonValue::Bool(*b),
        Some(Kind::StructValue(s)) => JsonValue::Object(
            s.fields
                .iter()
                .map(|(k, v)| (k.clone(), qdrant_to_json(v)))
                .collect(),
        ),
        Some(Kind::ListValue(list)) => {
            JsonValue::Array(list.values.iter().map(qdrant_to_json).collect())
        }
        Some(Kind::NullValue(_)) | None => JsonValue::Null,
    }
}
