//! hap-test: in-memory account pool for hap conformance testing
//!
//! Provides [`InMemoryPool`], a label-selector-aware stand-in for the
//! external pool resource store, plus [`FailingStore`] for error-path
//! tests. This is the reference implementation of the store boundary that
//! demonstrates how a real repository plugs into the engine.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use hap::prelude::*;
//! use hap_test::pool_resource;
//! use hap_test::InMemoryPool;
//!
//! let pool = Arc::new(
//!     InMemoryPool::new()
//!         .with_resource(pool_resource("sb-1", &[("hyperscalerType", "aws")])),
//! );
//! let claimer = AccountPool::new(pool.clone(), pool.clone());
//! ```

use std::sync::{Mutex, PoisonError};

use hap::{
    ClusterUsage, LabelSelector, PoolResource, RepositoryError, ResourceRepository, SecretRef,
    UsageLister,
};

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Build a labeled pool resource with a conventional secret reference.
#[must_use]
pub fn pool_resource(name: &str, labels: &[(&str, &str)]) -> PoolResource {
    let mut resource = PoolResource::new(
        name,
        SecretRef {
            namespace: "garden-pool".to_string(),
            name: name.to_string(),
        },
    );
    for (key, value) in labels {
        resource = resource.with_label(*key, *value);
    }
    resource
}

#[derive(Debug, Default)]
struct Inner {
    resources: Vec<PoolResource>,
    clusters: Vec<ClusterUsage>,
}

/// An in-memory pool store: resources in insertion order, cluster usage
/// entries for least-used counting.
///
/// Selector evaluation uses [`LabelSelector::matches`], the same semantics
/// the engine projects, so fixtures behave like the real store.
#[derive(Debug, Default)]
pub struct InMemoryPool {
    inner: Mutex<Inner>,
}

impl InMemoryPool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource (builder pattern).
    #[must_use]
    pub fn with_resource(self, resource: PoolResource) -> Self {
        self.lock().resources.push(resource);
        self
    }

    /// Add one cluster bound to `resource_name` (builder pattern).
    ///
    /// Each call adds one usage count for the resource.
    #[must_use]
    pub fn with_cluster(self, resource_name: &str) -> Self {
        self.lock().clusters.push(ClusterUsage {
            bound_resource_name: resource_name.to_string(),
        });
        self
    }

    /// Snapshot a resource by name, for assertions.
    #[must_use]
    pub fn resource(&self, name: &str) -> Option<PoolResource> {
        self.lock().resources.iter().find(|r| r.name == name).cloned()
    }

    /// Number of stored resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().resources.len()
    }

    /// True when the pool holds no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().resources.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResourceRepository for InMemoryPool {
    fn list(&self, selector: &LabelSelector) -> Result<Vec<PoolResource>, RepositoryError> {
        Ok(self
            .lock()
            .resources
            .iter()
            .filter(|resource| selector.matches(&resource.labels))
            .cloned()
            .collect())
    }

    fn update_labels(&self, resource: PoolResource) -> Result<PoolResource, RepositoryError> {
        let mut inner = self.lock();
        let slot = inner
            .resources
            .iter_mut()
            .find(|stored| stored.name == resource.name)
            .ok_or(RepositoryError::NotFound)?;
        slot.labels = resource.labels;
        Ok(slot.clone())
    }
}

impl UsageLister for InMemoryPool {
    fn list_clusters(&self) -> Result<Vec<ClusterUsage>, RepositoryError> {
        Ok(self.lock().clusters.clone())
    }
}

/// A store that fails every call with a fixed error, for propagation tests.
#[derive(Debug)]
pub struct FailingStore {
    error: RepositoryError,
}

impl FailingStore {
    /// Create a store failing with `error`.
    #[must_use]
    pub fn new(error: RepositoryError) -> Self {
        Self { error }
    }
}

impl ResourceRepository for FailingStore {
    fn list(&self, _selector: &LabelSelector) -> Result<Vec<PoolResource>, RepositoryError> {
        Err(self.error.clone())
    }

    fn update_labels(&self, _resource: PoolResource) -> Result<PoolResource, RepositoryError> {
        Err(self.error.clone())
    }
}

impl UsageLister for FailingStore {
    fn list_clusters(&self) -> Result<Vec<ClusterUsage>, RepositoryError> {
        Err(self.error.clone())
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{pool_resource, FailingStore, InMemoryPool};
    pub use hap::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;
    use hap::{labels, Match, RawData};

    fn shared_match(hyperscaler_type: &str) -> Match {
        Match {
            hyperscaler_type: hyperscaler_type.to_string(),
            eu_access: false,
            shared: true,
            rule: RawData {
                original_text: String::new(),
                ordinal: 0,
            },
        }
    }

    #[test]
    fn list_filters_by_selector_in_insertion_order() {
        let pool = InMemoryPool::new()
            .with_resource(pool_resource(
                "sb-1",
                &[(labels::HYPERSCALER_TYPE, "aws"), (labels::SHARED, "true")],
            ))
            .with_resource(pool_resource(
                "sb-2",
                &[(labels::HYPERSCALER_TYPE, "azure"), (labels::SHARED, "true")],
            ))
            .with_resource(pool_resource(
                "sb-3",
                &[(labels::HYPERSCALER_TYPE, "aws"), (labels::SHARED, "true")],
            ));

        let selector = LabelSelector::for_match(&shared_match("aws"));
        let listed = pool.list(&selector).unwrap();
        let names: Vec<&str> = listed.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["sb-1", "sb-3"]);
    }

    #[test]
    fn update_labels_persists() {
        let pool = InMemoryPool::new()
            .with_resource(pool_resource("sb-1", &[(labels::HYPERSCALER_TYPE, "aws")]));

        let updated = pool
            .resource("sb-1")
            .unwrap()
            .with_label(labels::TENANT_NAME, "tenant-1");
        pool.update_labels(updated).unwrap();

        assert_eq!(pool.resource("sb-1").unwrap().tenant(), Some("tenant-1"));
    }

    #[test]
    fn update_labels_of_unknown_resource_is_not_found() {
        let pool = InMemoryPool::new();
        let err = pool
            .update_labels(pool_resource("missing", &[]))
            .unwrap_err();
        assert_eq!(err, RepositoryError::NotFound);
    }

    #[test]
    fn cluster_usage_counts_accumulate() {
        let pool = InMemoryPool::new()
            .with_cluster("sb-1")
            .with_cluster("sb-1")
            .with_cluster("sb-2");
        assert_eq!(pool.list_clusters().unwrap().len(), 3);
    }

    #[test]
    fn failing_store_fails_everything() {
        let store = FailingStore::new(RepositoryError::Other("boom".into()));
        assert!(store
            .list(&LabelSelector::for_match(&shared_match("aws")))
            .is_err());
        assert!(store.list_clusters().is_err());
    }
}
