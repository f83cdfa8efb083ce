//! Collection lifecycle and point writes
//!
//! The engine is the source of truth for collections; nothing about them is
//! cached here. Every remote call runs under the [`RetryExecutor`] except
//! the existence check, which never fails: any error there means "does not
//! exist".
//!
//! Inputs are validated before the first remote call, so a rejected batch
//! never reaches the engine.

use crate::events::{ClientEvent, EventSink};
use crate::payload::{
    CollectionDescription, CreateCollection, PointStruct, PointVectors, ScrollRequest,
};
use crate::retry::RetryExecutor;
use crate::service::{Connector, IndexService};
use crate::shared::SharedClient;
use context_core::{
    chunk_key, CollectionKind, CollectionOptions, Document, Error, Filter, IdentifierMapper,
    Metadata, Result,
};
use context_lexical::VocabularyRegistry;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Payload fields that get a keyword index on creation
pub const INDEXED_PAYLOAD_FIELDS: [&str; 2] = ["relativePath", "fileExtension"];

/// Default page size for [`CollectionManager::query`]
pub const DEFAULT_QUERY_LIMIT: usize = 16384;

/// Creates, drops and writes to collections
pub struct CollectionManager<C: Connector> {
    client: Arc<SharedClient<C>>,
    retry: RetryExecutor,
    registry: Arc<VocabularyRegistry>,
    sink: Arc<dyn EventSink>,
}

impl<C: Connector> CollectionManager<C> {
    /// Create a manager sharing `client` and `registry` with the search
    /// engine
    pub fn new(
        client: Arc<SharedClient<C>>,
        retry: RetryExecutor,
        registry: Arc<VocabularyRegistry>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        CollectionManager {
            client,
            retry,
            registry,
            sink,
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Create a dense-only collection
    pub async fn create(&self, name: &str, dimension: usize, options: &CollectionOptions) -> Result<()> {
        check_dimension(dimension)?;
        self.create_with(name, CreateCollection::dense(dimension, options), dimension)
            .await
    }

    /// Create a hybrid collection with a named dense space and an
    /// IDF-weighted sparse space
    pub async fn create_hybrid(
        &self,
        name: &str,
        dimension: usize,
        options: &CollectionOptions,
    ) -> Result<()> {
        check_dimension(dimension)?;
        self.create_with(name, CreateCollection::hybrid(dimension, options), dimension)
            .await
    }

    async fn create_with(&self, name: &str, body: CreateCollection, dimension: usize) -> Result<()> {
        let service = self.client.service().await?;
        let body = &body;
        self.retry
            .execute("create_collection", || service.create_collection(name, body))
            .await?;

        self.sink.emit(ClientEvent::CollectionCreated {
            name: name.to_string(),
            kind: body.kind().as_str(),
            dimension,
        });

        for field in INDEXED_PAYLOAD_FIELDS {
            if let Err(e) = service.create_payload_index(name, field).await {
                tracing::warn!(
                    target: "context::collection",
                    collection = name,
                    field,
                    error = %e,
                    "Payload index creation failed"
                );
            }
        }
        Ok(())
    }

    /// Drop a collection and evict its in-memory vocabulary.
    ///
    /// The vocabulary snapshot on disk is left in place.
    pub async fn drop(&self, name: &str) -> Result<()> {
        let service = self.client.service().await?;
        self.retry
            .execute("drop_collection", || service.delete_collection(name))
            .await?;

        self.registry.evict(name);
        self.sink.emit(ClientEvent::CollectionDropped {
            name: name.to_string(),
        });
        Ok(())
    }

    /// Whether the collection exists. Never fails.
    pub async fn exists(&self, name: &str) -> bool {
        self.lookup(name).await.is_some()
    }

    /// Names of all collections
    pub async fn list(&self) -> Result<Vec<String>> {
        let service = self.client.service().await?;
        self.retry
            .execute("list_collections", || service.list_collections())
            .await
    }

    /// Engine-reported metadata of a collection
    pub async fn describe(&self, name: &str) -> Result<CollectionDescription> {
        let service = self.client.service().await?;
        self.retry
            .execute("describe_collection", || service.collection_info(name))
            .await
    }

    /// Whether another collection may be created.
    ///
    /// The engine has no per-account collection limit, so this is always
    /// true once connected.
    pub async fn check_collection_limit(&self) -> Result<bool> {
        self.client.service().await?;
        Ok(true)
    }

    async fn lookup(&self, name: &str) -> Option<CollectionDescription> {
        let service = match self.client.service().await {
            Ok(service) => service,
            Err(e) => {
                tracing::debug!(target: "context::collection", collection = name, error = %e, "Existence check failed");
                return None;
            }
        };
        match service.collection_info(name).await {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::debug!(target: "context::collection", collection = name, error = %e, "Existence check failed");
                None
            }
        }
    }

    // ========================================================================
    // Points
    // ========================================================================

    /// Upsert documents into a dense-only collection.
    ///
    /// Every document needs a non-empty dense vector. Hybrid collections are
    /// rejected before any write. Documents with an
    /// empty id get a stable id derived from path, line range and content.
    pub async fn insert(&self, collection: &str, documents: &[Document]) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }
        let dense = dense_vectors(documents)?;
        let info = self.require(collection).await?;
        if info.kind == CollectionKind::Hybrid {
            return Err(Error::invalid_request(format!(
                "collection '{}' is hybrid; use insert_hybrid",
                collection
            )));
        }
        check_lengths(&info, &dense)?;

        let points: Vec<PointStruct> = documents
            .iter()
            .zip(dense)
            .map(|(doc, vector)| point(doc, PointVectors::Dense(vector.to_vec())))
            .collect();
        self.upsert(collection, &points).await
    }

    /// Upsert documents into a hybrid collection.
    ///
    /// Each document's content is encoded with the collection's sparse
    /// encoder. The vocabulary snapshot is written before the upsert, so
    /// stored points never reference unsaved term indices.
    pub async fn insert_hybrid(&self, collection: &str, documents: &[Document]) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }
        let dense = dense_vectors(documents)?;
        let info = self.require(collection).await?;
        if info.kind != CollectionKind::Hybrid {
            return Err(Error::SparseUnsupported {
                name: collection.to_string(),
            });
        }
        check_lengths(&info, &dense)?;

        let sparse: Vec<_> = {
            let encoder = self.registry.encoder(collection);
            let mut encoder = encoder.lock();
            documents.iter().map(|doc| encoder.encode(&doc.content)).collect()
        };
        if let Some(terms) = self.registry.save(collection)? {
            self.sink.emit(ClientEvent::VocabularySaved {
                collection: collection.to_string(),
                terms,
            });
        }

        let points: Vec<PointStruct> = documents
            .iter()
            .zip(dense)
            .zip(sparse)
            .map(|((doc, vector), sparse)| {
                point(
                    doc,
                    PointVectors::Hybrid {
                        dense: vector.to_vec(),
                        sparse,
                    },
                )
            })
            .collect();
        self.upsert(collection, &points).await
    }

    /// Delete points by id. An empty id list is a no-op.
    pub async fn delete(&self, collection: &str, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let service = self.client.service().await?;
        self.retry
            .execute("delete_points", || service.delete_points(collection, ids))
            .await
    }

    /// Fetch payloads of points matching `filter`.
    ///
    /// Each row holds the point `id` plus the requested `output_fields`
    /// (every payload field when empty). `limit` defaults to 16384.
    pub async fn query(
        &self,
        collection: &str,
        filter: Option<Filter>,
        output_fields: &[&str],
        limit: Option<usize>,
    ) -> Result<Vec<Metadata>> {
        let service = self.client.service().await?;
        let request = ScrollRequest {
            filter: filter.filter(|f| !f.is_empty()),
            limit: limit.unwrap_or(DEFAULT_QUERY_LIMIT),
            with_payload: true,
            with_vector: false,
        };
        let request = &request;
        let records = self
            .retry
            .execute("query", || service.scroll_points(collection, request))
            .await?;

        Ok(records
            .into_iter()
            .map(|record| {
                let mut payload = record.payload.unwrap_or_default();
                if !output_fields.is_empty() {
                    payload.retain(|key, _| output_fields.contains(&key.as_str()));
                }
                payload.insert("id".to_string(), JsonValue::String(record.id));
                payload
            })
            .collect())
    }

    /// Describe `collection` under retry. Only a not-found answer becomes
    /// `CollectionMissing`; every other error passes through unchanged.
    async fn require(&self, collection: &str) -> Result<CollectionDescription> {
        self.describe(collection).await.map_err(|e| {
            if e.is_not_found() {
                Error::CollectionMissing {
                    name: collection.to_string(),
                }
            } else {
                e
            }
        })
    }

    async fn upsert(&self, collection: &str, points: &[PointStruct]) -> Result<()> {
        let service = self.client.service().await?;
        self.retry
            .execute("upsert_points", || service.upsert_points(collection, points))
            .await?;
        tracing::debug!(
            target: "context::collection",
            collection = collection,
            points = points.len(),
            "Points upserted"
        );
        Ok(())
    }
}

fn check_dimension(dimension: usize) -> Result<()> {
    if dimension == 0 {
        return Err(Error::invalid_request("dimension must be greater than zero"));
    }
    Ok(())
}

/// Dense vector of every document, or the first validation failure
fn dense_vectors(documents: &[Document]) -> Result<Vec<&[f32]>> {
    documents
        .iter()
        .map(|doc| match doc.vector.as_deref() {
            None => Err(Error::InvalidVector {
                reason: format!("document '{}' has no dense vector", doc.id),
            }),
            Some([]) => Err(Error::EmptyVector { id: doc.id.clone() }),
            Some(vector) => Ok(vector),
        })
        .collect()
}

fn check_lengths(info: &CollectionDescription, vectors: &[&[f32]]) -> Result<()> {
    let Some(dimension) = info.dimension else {
        return Ok(());
    };
    match vectors.iter().find(|v| v.len() != dimension) {
        Some(v) => Err(Error::InvalidVector {
            reason: format!(
                "collection '{}' expects dimension {}, got {}",
                info.name,
                dimension,
                v.len()
            ),
        }),
        None => Ok(()),
    }
}

fn point(doc: &Document, vector: PointVectors) -> PointStruct {
    let id = if doc.id.is_empty() {
        IdentifierMapper::to_stable_id(&chunk_key(
            &doc.relative_path,
            doc.start_line,
            doc.end_line,
            &doc.content,
        ))
    } else {
        doc.id.clone()
    };
    PointStruct {
        id,
        vector,
        payload: doc.to_payload(),
    }
}
