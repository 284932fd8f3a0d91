//! The account-pool claim protocol.
//!
//! [`AccountPool`] turns a [`Match`] plus a tenant into the name of a
//! concrete pool resource (a cloud credential binding):
//!
//! - shared matches pick the least-used candidate and mutate nothing;
//! - dedicated matches are sticky per tenant: a previously claimed resource
//!   is returned as-is, otherwise the first unclaimed candidate is labeled
//!   with the tenant and persisted through the repository.
//!
//! The claim section is the only mutable-shared-state operation in the
//! engine. It is serialized by one in-process mutex per `AccountPool`
//! instance, so two threads of the same process never claim the same
//! unclaimed resource for different tenants. The mutex does not protect
//! against concurrent claims from other replicas; that gap is the caller's
//! to close (conditional updates on the store).
//!
//! The pool performs no retries and bounds no latency. Repository errors
//! other than not-found propagate unchanged; retry and backoff policy
//! belongs to the caller.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::selector::labels;
use crate::{LabelSelector, Match, PoolError, RepositoryError};

/// Reference to the secret behind a pool resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRef {
    /// Namespace of the referenced secret.
    pub namespace: String,
    /// Name of the referenced secret.
    pub name: String,
}

/// A credential binding in the external pool store.
///
/// The engine only reads labels and performs label-only updates; resource
/// lifecycle belongs to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolResource {
    /// Resource name, the value this engine ultimately resolves to.
    pub name: String,
    /// Resource labels; the engine's only read/write surface.
    pub labels: BTreeMap<String, String>,
    /// The credential secret this resource binds.
    pub secret_ref: SecretRef,
}

impl PoolResource {
    /// Create an unlabeled resource.
    #[must_use]
    pub fn new(name: impl Into<String>, secret_ref: SecretRef) -> Self {
        Self {
            name: name.into(),
            labels: BTreeMap::new(),
            secret_ref,
        }
    }

    /// Add a label (builder pattern).
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// The claiming tenant, when this is a claimed dedicated resource.
    #[must_use]
    pub fn tenant(&self) -> Option<&str> {
        self.labels.get(labels::TENANT_NAME).map(String::as_str)
    }
}

/// One cluster's view of which resource it is bound to, for usage counting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterUsage {
    /// Name of the pool resource the cluster references.
    pub bound_resource_name: String,
}

/// The pool resource store boundary.
///
/// Implementations are expected to be live views of the external store;
/// the engine deliberately never caches candidate lists, since staleness
/// would bias shared-pool balancing.
pub trait ResourceRepository: Send + Sync {
    /// List resources matching the selector, in stable store order.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] is treated by the claimer as an empty
    /// list; anything else propagates to the caller unchanged.
    fn list(&self, selector: &LabelSelector) -> Result<Vec<PoolResource>, RepositoryError>;

    /// Persist a label-only update, returning the stored resource.
    ///
    /// # Errors
    ///
    /// Any store failure, including [`RepositoryError::NotFound`] when the
    /// resource vanished.
    fn update_labels(&self, resource: PoolResource) -> Result<PoolResource, RepositoryError>;
}

/// Usage counting boundary: every cluster currently bound to a resource.
pub trait UsageLister: Send + Sync {
    /// List all clusters with their bound resource names.
    ///
    /// # Errors
    ///
    /// Any store failure; propagated unchanged.
    fn list_clusters(&self) -> Result<Vec<ClusterUsage>, RepositoryError>;
}

/// The claimer: resolves a match to a pool resource name.
pub struct AccountPool {
    repository: Arc<dyn ResourceRepository>,
    usage: Arc<dyn UsageLister>,
    claim_lock: Mutex<()>,
}

impl AccountPool {
    /// Create a claimer over the given store boundaries.
    #[must_use]
    pub fn new(repository: Arc<dyn ResourceRepository>, usage: Arc<dyn UsageLister>) -> Self {
        Self {
            repository,
            usage,
            claim_lock: Mutex::new(()),
        }
    }

    /// Resolve a match for a tenant to a resource name.
    ///
    /// Idempotent for dedicated matches: once a tenant has claimed a
    /// resource, every later call returns the same name.
    ///
    /// # Errors
    ///
    /// - [`PoolError::NotFound`] when a shared selector has no candidates;
    /// - [`PoolError::NoUnassignedResource`] when the dedicated pool is
    ///   exhausted;
    /// - [`PoolError::Repository`] for any other store failure.
    pub fn resolve(&self, m: &Match, tenant: &str) -> Result<String, PoolError> {
        let base = LabelSelector::for_match(m);
        if m.shared {
            self.resolve_shared(&base)
        } else {
            self.resolve_dedicated(&base, tenant)
        }
    }

    /// Shared pools: pick the candidate with the strictly smallest usage
    /// count, ties broken by store order. No mutation; shared resources are
    /// never exclusively owned.
    fn resolve_shared(&self, selector: &LabelSelector) -> Result<String, PoolError> {
        let candidates = self.list_allowing_absent(selector)?;
        if candidates.is_empty() {
            return Err(PoolError::NotFound {
                selector: selector.to_string(),
            });
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        let clusters = self.usage.list_clusters()?;
        for cluster in &clusters {
            *counts.entry(cluster.bound_resource_name.as_str()).or_default() += 1;
        }

        let mut best: Option<(&PoolResource, usize)> = None;
        for candidate in &candidates {
            let count = counts.get(candidate.name.as_str()).copied().unwrap_or(0);
            let better = match best {
                None => true,
                // Strict comparison: the first-listed candidate wins ties.
                Some((_, best_count)) => count < best_count,
            };
            if better {
                best = Some((candidate, count));
            }
        }

        // Candidates are non-empty, so a best entry always exists.
        let Some((resource, count)) = best else {
            return Err(PoolError::NotFound {
                selector: selector.to_string(),
            });
        };
        debug!(
            resource = %resource.name,
            usage = count,
            "selected least-used shared pool resource"
        );
        Ok(resource.name.clone())
    }

    /// Dedicated pools: sticky lookup first, then the mutex-guarded claim.
    fn resolve_dedicated(&self, base: &LabelSelector, tenant: &str) -> Result<String, PoolError> {
        let owned = self.list_allowing_absent(&base.with_tenant(tenant))?;
        if let Some(existing) = owned.first() {
            return Ok(existing.name.clone());
        }

        // Claim critical section: list-unclaimed, label, persist must not
        // interleave with another in-process claim.
        let _guard = self
            .claim_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let claim_selector = base.unclaimed();
        let candidates = self.list_allowing_absent(&claim_selector)?;
        let Some(candidate) = candidates.into_iter().next() else {
            return Err(PoolError::NoUnassignedResource {
                selector: claim_selector.to_string(),
            });
        };

        let mut claimed = candidate;
        claimed
            .labels
            .insert(labels::TENANT_NAME.to_string(), tenant.to_string());
        let updated = self.repository.update_labels(claimed)?;
        debug!(resource = %updated.name, tenant, "claimed dedicated pool resource");
        Ok(updated.name)
    }

    /// List resources, treating the store's not-found as an empty list.
    fn list_allowing_absent(
        &self,
        selector: &LabelSelector,
    ) -> Result<Vec<PoolResource>, PoolError> {
        match self.repository.list(selector) {
            Ok(resources) => Ok(resources),
            Err(RepositoryError::NotFound) => Ok(Vec::new()),
            Err(err) => Err(PoolError::Repository(err)),
        }
    }
}

impl std::fmt::Debug for AccountPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountPool").finish_non_exhaustive()
    }
}

