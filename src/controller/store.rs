//! # Operation Store
//!
//! Capability interface over the resource store holding Operations. The
//! reconciler only ever reads and deletes, so the trait stays that narrow;
//! tests substitute an in-memory fake for the Kubernetes-backed
//! implementation.

use crate::crd::Operation;
use async_trait::async_trait;
use kube::api::DeleteParams;
use kube::{Api, Client};
use std::fmt;
use thiserror::Error;

/// Namespaced identity of an Operation resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationRef {
    pub namespace: String,
    pub name: String,
}

impl OperationRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl From<&Operation> for OperationRef {
    fn from(operation: &Operation) -> Self {
        Self {
            namespace: operation
                .metadata
                .namespace
                .as_deref()
                .unwrap_or("default")
                .to_string(),
            name: operation
                .metadata
                .name
                .as_deref()
                .unwrap_or("unknown")
                .to_string(),
        }
    }
}

impl fmt::Display for OperationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Errors surfaced by an [`OperationStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The resource does not exist (anymore). Callers treat this as benign.
    #[error("operation not found")]
    NotFound,
    /// Any other store failure; retryable by the scheduler.
    #[error("store request failed: {0}")]
    Request(#[from] anyhow::Error),
}

/// Read/delete access to Operation resources
#[async_trait]
pub trait OperationStore: Send + Sync {
    /// Fetch an Operation by namespace and name.
    async fn get(&self, namespace: &str, name: &str) -> Result<Operation, StoreError>;

    /// Delete an Operation by namespace and name.
    ///
    /// Implementations report [`StoreError::NotFound`] for missing
    /// resources; normalizing that into success is the caller's decision.
    async fn delete(&self, namespace: &str, name: &str) -> Result<(), StoreError>;
}

/// [`OperationStore`] backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeOperationStore {
    client: Client,
}

impl KubeOperationStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<Operation> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

impl fmt::Debug for KubeOperationStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeOperationStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl OperationStore for KubeOperationStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Operation, StoreError> {
        self.api(namespace).get(name).await.map_err(into_store_error)
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        self.api(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(into_store_error)
    }
}

fn into_store_error(err: kube::Error) -> StoreError {
    match err {
        kube::Error::Api(ref response) if response.code == 404 => StoreError::NotFound,
        other => StoreError::Request(other.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ErrorResponse;

    #[test]
    fn test_api_404_maps_to_not_found() {
        let err = kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: "operations.operations.octopilot.io \"gone\" not found".to_string(),
            reason: "NotFound".to_string(),
            code: 404,
        });

        assert!(matches!(into_store_error(err), StoreError::NotFound));
    }

    #[test]
    fn test_other_api_errors_stay_retryable() {
        let err = kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: "etcdserver: request timed out".to_string(),
            reason: "Timeout".to_string(),
            code: 504,
        });

        assert!(matches!(into_store_error(err), StoreError::Request(_)));
    }

    #[test]
    fn test_operation_ref_display() {
        let key = OperationRef::new("kafka", "rebalance-7f2a");
        assert_eq!(key.to_string(), "kafka/rebalance-7f2a");
    }
}
