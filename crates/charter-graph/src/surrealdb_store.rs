//! SurrealDB implementation for graph storage
//!
//! Nodes live in the `crm_node` table under their deterministic id; links are
//! `crm_link` relations carrying the CRM property name.

use async_trait::async_trait;
use charter_core::{
    CharterError, CrmClass, CrmLink, CrmNode, DatabaseConfig, NodeKey, Result,
};
use serde::{Deserialize, Serialize};
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::sql::{Datetime, Thing};
use surrealdb::Surreal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::GraphStore;

const NODE_TABLE: &str = "crm_node";

/// SurrealDB graph store implementation
pub struct SurrealDbStore {
    client: Surreal<Any>,
}

impl SurrealDbStore {
    /// Create a new SurrealDB connection
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let client = any::connect(config.surrealdb_url.as_str())
            .await
            .map_err(|e| CharterError::DatabaseError(format!("SurrealDB connection failed: {e}")))?;

        client
            .signin(Root {
                username: &config.surrealdb_user,
                password: &config.surrealdb_pass,
            })
            .await
            .map_err(|e| CharterError::DatabaseError(format!("SurrealDB auth failed: {e}")))?;

        client
            .use_ns(&config.surrealdb_namespace)
            .use_db(&config.surrealdb_database)
            .await
            .map_err(|e| CharterError::DatabaseError(format!("SurrealDB namespace error: {e}")))?;

        info!(
            url = %config.surrealdb_url,
            namespace = %config.surrealdb_namespace,
            database = %config.surrealdb_database,
            "Connected to SurrealDB"
        );
        Ok(Self::from_client(client))
    }

    /// Wrap a client that is already signed in with namespace and database selected
    pub fn from_client(client: Surreal<Any>) -> Self {
        Self { client }
    }

    /// Define tables, fields and indexes; safe to run on every start
    pub async fn init_schema(&self) -> Result<()> {
        self.client
            .query(
                r#"
                DEFINE TABLE IF NOT EXISTS crm_node SCHEMAFULL;
                DEFINE FIELD IF NOT EXISTS class ON crm_node TYPE string;
                DEFINE FIELD IF NOT EXISTS name ON crm_node TYPE string;
                DEFINE FIELD IF NOT EXISTS arch_id ON crm_node TYPE option<string>;
                DEFINE FIELD IF NOT EXISTS mom_id ON crm_node TYPE option<string>;
                DEFINE FIELD IF NOT EXISTS file_id ON crm_node TYPE option<string>;
                DEFINE FIELD IF NOT EXISTS created_at ON crm_node TYPE datetime;
                DEFINE INDEX IF NOT EXISTS idx_crm_node_key ON crm_node FIELDS class, name UNIQUE;
                DEFINE TABLE IF NOT EXISTS crm_link SCHEMALESS;
                DEFINE FIELD IF NOT EXISTS property ON crm_link TYPE string;
                DEFINE INDEX IF NOT EXISTS idx_crm_link_property ON crm_link FIELDS property;
            "#,
            )
            .await
            .and_then(|response| response.check())
            .map_err(|e| CharterError::DatabaseError(format!("Schema init failed: {e}")))?;

        Ok(())
    }
}

/// Node record for SurrealDB
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Thing>,
    class: String,
    name: String,
    arch_id: Option<String>,
    mom_id: Option<String>,
    file_id: Option<String>,
    created_at: Datetime,
}

impl From<&CrmNode> for NodeRecord {
    fn from(node: &CrmNode) -> Self {
        Self {
            id: None,
            class: node.class.as_str().to_string(),
            name: node.name.clone(),
            arch_id: node.arch_id.clone(),
            mom_id: node.mom_id.clone(),
            file_id: node.file_id.clone(),
            created_at: Datetime::from(node.created_at),
        }
    }
}

impl NodeRecord {
    fn into_node(self, id: Uuid) -> Result<CrmNode> {
        let class = CrmClass::from_label(&self.class).ok_or_else(|| {
            CharterError::DatabaseError(format!("Unknown CRM class: {}", self.class))
        })?;
        Ok(CrmNode {
            id,
            class,
            name: self.name,
            arch_id: self.arch_id,
            mom_id: self.mom_id,
            file_id: self.file_id,
            created_at: self.created_at.0,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: usize,
}

/// Query parameters identifying a link
fn link_bindings(link: &CrmLink) -> [(&'static str, String); 3] {
    [
        ("subject", link.subject.id().to_string()),
        ("object", link.object.id().to_string()),
        ("property", link.property.as_str().to_string()),
    ]
}

impl SurrealDbStore {
    async fn count(&self, table: &'static str) -> Result<usize> {
        let row: Option<CountRow> = self
            .client
            .query(format!("SELECT count() AS count FROM {table} GROUP ALL"))
            .await
            .map_err(|e| CharterError::DatabaseError(format!("Count failed: {e}")))?
            .take(0)
            .map_err(|e| CharterError::DatabaseError(format!("Result extraction failed: {e}")))?;

        Ok(row.map(|r| r.count).unwrap_or(0))
    }

    async fn get_node(&self, key: &NodeKey) -> Result<Option<CrmNode>> {
        let id = key.id();
        let record: Option<NodeRecord> = self
            .client
            .select((NODE_TABLE, id.to_string()))
            .await
            .map_err(|e| CharterError::DatabaseError(format!("Failed to get node: {e}")))?;

        record.map(|r| r.into_node(id)).transpose()
    }
}

#[async_trait]
impl GraphStore for SurrealDbStore {
    async fn get_or_create_node(&self, node: &CrmNode) -> Result<bool> {
        if self.get_node(&node.key()).await?.is_some() {
            return Ok(false);
        }

        let _: Option<NodeRecord> = self
            .client
            .create((NODE_TABLE, node.id.to_string()))
            .content(NodeRecord::from(node))
            .await
            .map_err(|e| CharterError::DatabaseError(format!("Failed to store node: {e}")))?;

        debug!(node = %node.key(), "Created node");
        Ok(true)
    }

    async fn connect(&self, link: &CrmLink) -> Result<bool> {
        if self.is_connected(link).await? {
            return Ok(false);
        }

        let [subject, object, property] = link_bindings(link);
        self.client
            .query(
                r#"
                LET $from = type::thing('crm_node', $subject);
                LET $to = type::thing('crm_node', $object);
                RELATE $from->crm_link->$to SET property = $property;
            "#,
            )
            .bind(subject)
            .bind(object)
            .bind(property)
            .await
            .and_then(|response| response.check())
            .map_err(|e| CharterError::DatabaseError(format!("Failed to store link: {e}")))?;

        debug!(%link, "Created link");
        Ok(true)
    }

    async fn is_connected(&self, link: &CrmLink) -> Result<bool> {
        let [subject, object, property] = link_bindings(link);
        let row: Option<CountRow> = self
            .client
            .query(
                "SELECT count() AS count FROM crm_link \
                 WHERE in = type::thing('crm_node', $subject) \
                 AND out = type::thing('crm_node', $object) \
                 AND property = $property GROUP ALL",
            )
            .bind(subject)
            .bind(object)
            .bind(property)
            .await
            .map_err(|e| CharterError::DatabaseError(format!("Query failed: {e}")))?
            .take(0)
            .map_err(|e| CharterError::DatabaseError(format!("Result extraction failed: {e}")))?;

        Ok(row.is_some_and(|r| r.count > 0))
    }

    async fn find_by_name(&self, class: CrmClass, name: &str) -> Result<Option<CrmNode>> {
        self.get_node(&NodeKey::new(class, name)).await
    }

    async fn node_count(&self) -> Result<usize> {
        self.count("crm_node").await
    }

    async fn link_count(&self) -> Result<usize> {
        self.count("crm_link").await
    }

    async fn clear(&self) -> Result<()> {
        self.client
            .query("DELETE crm_link; DELETE crm_node;")
            .await
            .and_then(|response| response.check())
            .map_err(|e| CharterError::DatabaseError(format!("Clear failed: {e}")))?;

        info!("Deleted all nodes and links");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charter_core::{CrmProperty, GraphPlan};

    async fn memory_store() -> SurrealDbStore {
        let client = any::connect("mem://").await.unwrap();
        client.use_ns("charters").use_db("test").await.unwrap();
        SurrealDbStore::from_client(client)
    }

    #[tokio::test]
    async fn test_rerun_against_existing_schema() {
        let store = memory_store().await;

        let mut plan = GraphPlan::new();
        let charter = plan.add_node(
            CrmNode::new(CrmClass::E5Event, "SpAR Urk. 2101").with_arch_id("SpAR Urk. 2101"),
        );
        let gut = plan.node(CrmClass::E53Place, "Gut");
        let teingen = plan.node(CrmClass::E53Place, "Teingen");
        plan.connect(&gut, CrmProperty::P89FallsWithin, &teingen);
        plan.connect(&charter, CrmProperty::P161HasSpatialProjection, &gut);
        let link = CrmLink::new(gut.clone(), CrmProperty::P89FallsWithin, teingen.clone());
        let inverse = CrmLink::new(teingen, CrmProperty::P89FallsWithin, gut);

        for run in 0..2 {
            store.init_schema().await.unwrap();
            let report = store.apply(&plan).await.unwrap();
            assert_eq!(report.nodes_created, if run == 0 { 3 } else { 0 });
            assert_eq!(report.links_created, if run == 0 { 2 } else { 0 });
            assert!(store.is_connected(&link).await.unwrap());
            assert!(!store.is_connected(&inverse).await.unwrap());
        }

        assert_eq!(store.node_count().await.unwrap(), 3);
        assert_eq!(store.link_count().await.unwrap(), 2);
        let stored = store
            .find_by_name(CrmClass::E5Event, "SpAR Urk. 2101")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.arch_id.as_deref(), Some("SpAR Urk. 2101"));
    }

    #[tokio::test]
    async fn test_clear_keeps_schema() {
        let store = memory_store().await;
        store.init_schema().await.unwrap();
        store
            .get_or_create_node(&CrmNode::new(CrmClass::E21Person, "Otto Prager"))
            .await
            .unwrap();

        store.clear().await.unwrap();
        assert_eq!(store.node_count().await.unwrap(), 0);

        store.init_schema().await.unwrap();
        assert!(store
            .get_or_create_node(&CrmNode::new(CrmClass::E21Person, "Otto Prager"))
            .await
            .unwrap());
    }

    #[test]
    fn test_node_record_round_trip() {
        let node = CrmNode::new(CrmClass::E5Event, "SpAR Urk. 35")
            .with_arch_id("SpAR Urk. 35")
            .with_file_id("urk0035.txt");
        let record = NodeRecord::from(&node);
        assert_eq!(record.class, "E5Event");

        let back = record.into_node(node.id).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_unknown_class_is_rejected() {
        let mut record = NodeRecord::from(&CrmNode::new(CrmClass::E21Person, "Otto"));
        record.class = "E99Unknown".to_string();
        assert!(matches!(
            record.into_node(Uuid::nil()),
            Err(CharterError::DatabaseError(_))
        ));
    }

    #[test]
    fn test_record_omits_missing_id() {
        let record = NodeRecord::from(&CrmNode::new(CrmClass::E53Place, "Teingen"));
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["name"], "Teingen");
    }

    #[test]
    fn test_link_bindings() {
        let link = CrmLink::new(
            NodeKey::new(CrmClass::E53Place, "Gut"),
            CrmProperty::P89FallsWithin,
            NodeKey::new(CrmClass::E53Place, "Teingen"),
        );
        let [(_, subject), (_, object), (_, property)] = link_bindings(&link);
        assert_eq!(subject, link.subject.id().to_string());
        assert_eq!(object, link.object.id().to_string());
        assert_eq!(property, "P89_falls_within");
    }
}
