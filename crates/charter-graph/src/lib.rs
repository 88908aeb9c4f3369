//! Charter Graph - Graph database abstraction
//!
//! Provides abstraction over graph stores (SurrealDB, in-memory) for
//! persisting CIDOC-CRM graphs built from charter abstracts.

use async_trait::async_trait;
use charter_core::{CrmClass, CrmLink, CrmNode, GraphPlan, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

pub mod memory;
pub mod surrealdb_store;

pub use memory::InMemoryGraph;
pub use surrealdb_store::SurrealDbStore;

/// Counts of what a write actually changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyReport {
    pub nodes_created: usize,
    pub nodes_existing: usize,
    pub links_created: usize,
    pub links_existing: usize,
}

/// Trait for graph database operations
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Store a node unless one with the same class and name exists.
    ///
    /// Returns true if the node was created.
    async fn get_or_create_node(&self, node: &CrmNode) -> Result<bool>;

    /// Create a link unless the same link exists. Returns true if created.
    async fn connect(&self, link: &CrmLink) -> Result<bool>;

    /// Check whether a link exists
    async fn is_connected(&self, link: &CrmLink) -> Result<bool>;

    /// Find a node by class and name
    async fn find_by_name(&self, class: CrmClass, name: &str) -> Result<Option<CrmNode>>;

    async fn node_count(&self) -> Result<usize>;

    async fn link_count(&self) -> Result<usize>;

    /// Delete every node and link
    async fn clear(&self) -> Result<()>;

    /// Write a plan, nodes first so every link has both ends
    async fn apply(&self, plan: &GraphPlan) -> Result<ApplyReport> {
        let mut report = ApplyReport::default();

        for node in plan.nodes() {
            if self.get_or_create_node(node).await? {
                report.nodes_created += 1;
            } else {
                report.nodes_existing += 1;
            }
        }

        for link in plan.links() {
            if self.connect(link).await? {
                report.links_created += 1;
            } else {
                report.links_existing += 1;
            }
        }

        info!(
            nodes_created = report.nodes_created,
            links_created = report.links_created,
            "Applied graph plan"
        );
        Ok(report)
    }
}
