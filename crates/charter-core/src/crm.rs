//! CIDOC-CRM vocabulary
//!
//! The subset of CRM classes and properties used to graph charter abstracts,
//! plus the node/link records handed to a graph store.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Classes and properties
// ============================================================================

/// CRM entity classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CrmClass {
    E5Event,
    E7Activity,
    E21Person,
    E30Right,
    E53Place,
    E55Type,
    E74Group,
}

impl CrmClass {
    /// Get the class label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E5Event => "E5Event",
            Self::E7Activity => "E7Activity",
            Self::E21Person => "E21Person",
            Self::E30Right => "E30Right",
            Self::E53Place => "E53Place",
            Self::E55Type => "E55Type",
            Self::E74Group => "E74Group",
        }
    }

    /// Get from label
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "E5Event" => Some(Self::E5Event),
            "E7Activity" => Some(Self::E7Activity),
            "E21Person" => Some(Self::E21Person),
            "E30Right" => Some(Self::E30Right),
            "E53Place" => Some(Self::E53Place),
            "E55Type" => Some(Self::E55Type),
            "E74Group" => Some(Self::E74Group),
            _ => None,
        }
    }
}

impl std::fmt::Display for CrmClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// CRM properties (typed edges)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CrmProperty {
    P2HasType,                    // E5Event -> E55Type
    P9ConsistsOf,                 // E5Event -> E7Activity
    P11HadParticipant,            // E5Event/E7Activity -> E21Person/E74Group
    P14CarriedOutBy,              // E7Activity -> E21Person
    P75Possesses,                 // E21Person -> E30Right
    P89FallsWithin,               // E53Place -> E53Place
    P107HasCurrentOrFormerMember, // E74Group -> E21Person
    P129IsAbout,                  // E30Right -> E5Event/E7Activity
    P161HasSpatialProjection,     // E5Event/E7Activity -> E53Place
}

impl CrmProperty {
    /// Get the property label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P2HasType => "P2_has_type",
            Self::P9ConsistsOf => "P9_consists_of",
            Self::P11HadParticipant => "P11_had_participant",
            Self::P14CarriedOutBy => "P14_carried_out_by",
            Self::P75Possesses => "P75_possesses",
            Self::P89FallsWithin => "P89_falls_within",
            Self::P107HasCurrentOrFormerMember => "P107_has_current_or_former_member",
            Self::P129IsAbout => "P129_is_about",
            Self::P161HasSpatialProjection => "P161_has_spatial_projection",
        }
    }
}

impl std::fmt::Display for CrmProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Nodes and links
// ============================================================================

/// Identity of a node: nodes are unique per class and name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey {
    pub class: CrmClass,
    pub name: String,
}

impl NodeKey {
    pub fn new(class: CrmClass, name: impl Into<String>) -> Self {
        Self {
            class,
            name: name.into(),
        }
    }

    /// Deterministic node id, stable across runs
    pub fn id(&self) -> Uuid {
        Uuid::new_v5(
            &Uuid::NAMESPACE_OID,
            format!("{}:{}", self.class, self.name).as_bytes(),
        )
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.class, self.name)
    }
}

/// A typed node of the charter graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmNode {
    /// Unique identifier (derived from the key)
    pub id: Uuid,

    /// CRM class
    pub class: CrmClass,

    /// Name of the node
    pub name: String,

    /// Archive id of the object
    pub arch_id: Option<String>,

    /// Monasterium id of the object
    pub mom_id: Option<String>,

    /// Id of a related file (document, image, ...)
    pub file_id: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl CrmNode {
    /// Create a new node
    pub fn new(class: CrmClass, name: impl Into<String>) -> Self {
        let key = NodeKey::new(class, name);
        Self {
            id: key.id(),
            class,
            name: key.name,
            arch_id: None,
            mom_id: None,
            file_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.class, self.name.clone())
    }

    /// Set archive id
    pub fn with_arch_id(mut self, arch_id: impl Into<String>) -> Self {
        self.arch_id = Some(arch_id.into());
        self
    }

    /// Set Monasterium id
    pub fn with_mom_id(mut self, mom_id: impl Into<String>) -> Self {
        self.mom_id = Some(mom_id.into());
        self
    }

    /// Set related file id
    pub fn with_file_id(mut self, file_id: impl Into<String>) -> Self {
        self.file_id = Some(file_id.into());
        self
    }
}

/// A typed, directed edge between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrmLink {
    pub subject: NodeKey,
    pub property: CrmProperty,
    pub object: NodeKey,
}

impl CrmLink {
    pub fn new(subject: NodeKey, property: CrmProperty, object: NodeKey) -> Self {
        Self {
            subject,
            property,
            object,
        }
    }
}

impl std::fmt::Display for CrmLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-[{}]->{}", self.subject, self.property, self.object)
    }
}

// ============================================================================
// Graph plan
// ============================================================================

/// Nodes and links to write, deduplicated and in insertion order
#[derive(Debug, Clone, Default)]
pub struct GraphPlan {
    nodes: Vec<CrmNode>,
    node_index: HashMap<NodeKey, usize>,
    links: Vec<CrmLink>,
    link_set: HashSet<CrmLink>,
}

impl GraphPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a node, returning its key
    pub fn node(&mut self, class: CrmClass, name: &str) -> NodeKey {
        self.add_node(CrmNode::new(class, name))
    }

    /// Add a prepared node unless one with the same key exists
    pub fn add_node(&mut self, node: CrmNode) -> NodeKey {
        let key = node.key();
        if !self.node_index.contains_key(&key) {
            self.node_index.insert(key.clone(), self.nodes.len());
            self.nodes.push(node);
        }
        key
    }

    /// Connect two nodes; returns false if the link already existed
    pub fn connect(&mut self, subject: &NodeKey, property: CrmProperty, object: &NodeKey) -> bool {
        let link = CrmLink::new(subject.clone(), property, object.clone());
        if self.link_set.contains(&link) {
            return false;
        }
        self.link_set.insert(link.clone());
        self.links.push(link);
        true
    }

    pub fn is_connected(&self, subject: &NodeKey, property: CrmProperty, object: &NodeKey) -> bool {
        self.link_set
            .contains(&CrmLink::new(subject.clone(), property, object.clone()))
    }

    pub fn get(&self, key: &NodeKey) -> Option<&CrmNode> {
        self.node_index.get(key).map(|&i| &self.nodes[i])
    }

    pub fn nodes(&self) -> &[CrmNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[CrmLink] {
        &self.links
    }

    /// Check if the plan holds anything
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    /// Fold another plan into this one, keeping deduplication
    pub fn merge(&mut self, other: GraphPlan) {
        for node in other.nodes {
            self.add_node(node);
        }
        for link in other.links {
            self.connect(&link.subject, link.property, &link.object);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
