//! The remote index service contract
//!
//! Everything the client needs from the engine fits in [`IndexService`].
//! Index construction, quantization, storage and fusion scoring all happen
//! behind it. [`Connector`] produces the one shared service handle.

use crate::payload::{
    CollectionDescription, CreateCollection, PointStruct, QueryRequest, Record, ScoredPoint,
    ScrollRequest,
};
use context_core::Result;
use std::future::Future;

/// Narrow RPC surface of the remote index engine
///
/// Implementations report failures as [`context_core::Error`]; the message
/// of an already-exists or not-found failure must say so, because retry
/// classification relies on it.
pub trait IndexService: Send + Sync + 'static {
    /// Create a collection
    fn create_collection(
        &self,
        name: &str,
        body: &CreateCollection,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete a collection
    fn delete_collection(&self, name: &str) -> impl Future<Output = Result<()>> + Send;

    /// Fetch collection metadata; fails when the collection does not exist
    fn collection_info(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<CollectionDescription>> + Send;

    /// Names of all collections
    fn list_collections(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Create a keyword payload index on `field`
    fn create_payload_index(
        &self,
        name: &str,
        field: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Insert or overwrite points
    fn upsert_points(
        &self,
        name: &str,
        points: &[PointStruct],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete points by id
    fn delete_points(&self, name: &str, ids: &[String]) -> impl Future<Output = Result<()>> + Send;

    /// Run a direct or fused query
    fn query_points(
        &self,
        name: &str,
        request: &QueryRequest,
    ) -> impl Future<Output = Result<Vec<ScoredPoint>>> + Send;

    /// Page through points matching a filter
    fn scroll_points(
        &self,
        name: &str,
        request: &ScrollRequest,
    ) -> impl Future<Output = Result<Vec<Record>>> + Send;
}

/// Establishes the service handle
pub trait Connector: Send + Sync + 'static {
    /// Service produced by a successful connection
    type Service: IndexService;

    /// Connect to the engine
    fn connect(&self) -> impl Future<Output = Result<Self::Service>> + Send;
}

/// Connector for a service that is already built
#[derive(Debug, Clone)]
pub struct Preconnected<S>(pub S);

impl<S: IndexService + Clone> Connector for Preconnected<S> {
    type Service = S;

    async fn connect(&self) -> Result<S> {
        Ok(self.0.clone())
    }
}
