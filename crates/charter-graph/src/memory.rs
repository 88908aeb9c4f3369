//! In-memory graph store
//!
//! Used for dry runs and tests. Nodes are keyed by their deterministic id,
//! links are kept in a set.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use charter_core::{CharterError, CrmClass, CrmLink, CrmNode, NodeKey, Result};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::GraphStore;

#[derive(Debug, Default)]
struct GraphState {
    nodes: HashMap<Uuid, CrmNode>,
    links: HashSet<CrmLink>,
}

/// Graph store backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryGraph {
    state: RwLock<GraphState>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all links
    pub async fn links(&self) -> Vec<CrmLink> {
        self.state.read().await.links.iter().cloned().collect()
    }

    /// Snapshot of all nodes of a class
    pub async fn nodes_of(&self, class: CrmClass) -> Vec<CrmNode> {
        self.state
            .read()
            .await
            .nodes
            .values()
            .filter(|n| n.class == class)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraph {
    async fn get_or_create_node(&self, node: &CrmNode) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.nodes.contains_key(&node.id) {
            return Ok(false);
        }
        state.nodes.insert(node.id, node.clone());
        Ok(true)
    }

    async fn connect(&self, link: &CrmLink) -> Result<bool> {
        let mut state = self.state.write().await;
        for end in [&link.subject, &link.object] {
            if !state.nodes.contains_key(&end.id()) {
                return Err(CharterError::NotFound(end.to_string()));
            }
        }
        Ok(state.links.insert(link.clone()))
    }

    async fn is_connected(&self, link: &CrmLink) -> Result<bool> {
        Ok(self.state.read().await.links.contains(link))
    }

    async fn find_by_name(&self, class: CrmClass, name: &str) -> Result<Option<CrmNode>> {
        let id = NodeKey::new(class, name).id();
        Ok(self.state.read().await.nodes.get(&id).cloned())
    }

    async fn node_count(&self) -> Result<usize> {
        Ok(self.state.read().await.nodes.len())
    }

    async fn link_count(&self) -> Result<usize> {
        Ok(self.state.read().await.links.len())
    }

    async fn clear(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.nodes.clear();
        state.links.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charter_core::{CrmProperty, GraphPlan};

    fn person(name: &str) -> CrmNode {
        CrmNode::new(CrmClass::E21Person, name)
    }

    #[tokio::test]
    async fn test_get_or_create_node() {
        let graph = InMemoryGraph::new();

        assert!(graph.get_or_create_node(&person("Otto Prager")).await.unwrap());
        assert!(!graph.get_or_create_node(&person("Otto Prager")).await.unwrap());
        assert_eq!(graph.node_count().await.unwrap(), 1);

        // same name, different class is a different node
        let place = CrmNode::new(CrmClass::E53Place, "Otto Prager");
        assert!(graph.get_or_create_node(&place).await.unwrap());
        assert_eq!(graph.node_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_first_node_wins() {
        let graph = InMemoryGraph::new();
        let charter = CrmNode::new(CrmClass::E5Event, "c").with_mom_id("1");
        graph.get_or_create_node(&charter).await.unwrap();
        graph
            .get_or_create_node(&CrmNode::new(CrmClass::E5Event, "c"))
            .await
            .unwrap();

        let stored = graph.find_by_name(CrmClass::E5Event, "c").await.unwrap().unwrap();
        assert_eq!(stored.mom_id.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_connect() {
        let graph = InMemoryGraph::new();
        let group = CrmNode::new(CrmClass::E74Group, "merchant class");
        let otto = person("Otto Prager");
        graph.get_or_create_node(&group).await.unwrap();
        graph.get_or_create_node(&otto).await.unwrap();

        let link = CrmLink::new(
            group.key(),
            CrmProperty::P107HasCurrentOrFormerMember,
            otto.key(),
        );
        assert!(!graph.is_connected(&link).await.unwrap());
        assert!(graph.connect(&link).await.unwrap());
        assert!(!graph.connect(&link).await.unwrap());
        assert!(graph.is_connected(&link).await.unwrap());
        assert_eq!(graph.link_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_connect_requires_both_ends() {
        let graph = InMemoryGraph::new();
        let otto = person("Otto Prager");
        graph.get_or_create_node(&otto).await.unwrap();

        let link = CrmLink::new(
            otto.key(),
            CrmProperty::P11HadParticipant,
            NodeKey::new(CrmClass::E21Person, "Albert de Porta"),
        );
        let err = graph.connect(&link).await.unwrap_err();
        assert!(matches!(err, CharterError::NotFound(_)));
        assert_eq!(graph.link_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_apply_is_idempotent() {
        let graph = InMemoryGraph::new();
        let mut plan = GraphPlan::new();
        let charter = plan.node(CrmClass::E5Event, "charter i");
        let otto = plan.node(CrmClass::E21Person, "Otto Prager");
        plan.connect(&charter, CrmProperty::P11HadParticipant, &otto);

        let first = graph.apply(&plan).await.unwrap();
        assert_eq!(first.nodes_created, 2);
        assert_eq!(first.links_created, 1);

        let second = graph.apply(&plan).await.unwrap();
        assert_eq!(second.nodes_created, 0);
        assert_eq!(second.nodes_existing, 2);
        assert_eq!(second.links_existing, 1);
        assert_eq!(graph.node_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_clear() {
        let graph = InMemoryGraph::new();
        let mut plan = GraphPlan::new();
        let a = plan.node(CrmClass::E53Place, "Gut");
        let b = plan.node(CrmClass::E53Place, "Teingen");
        plan.connect(&a, CrmProperty::P89FallsWithin, &b);
        graph.apply(&plan).await.unwrap();

        graph.clear().await.unwrap();
        assert_eq!(graph.node_count().await.unwrap(), 0);
        assert_eq!(graph.link_count().await.unwrap(), 0);
        assert!(graph.nodes_of(CrmClass::E53Place).await.is_empty());
    }
}
