//! Graph Loader module
//!
//! Converts extraction results into CIDOC-CRM nodes and links. The verb of an
//! abstract is read as the legal activity recorded by the charter, the subject
//! as the actor who carried it out, and the objects as further participants,
//! places, or rights.

use charter_core::{CrmClass, CrmNode, CrmProperty, GraphPlan, NodeKey, ParsedCharter};

use crate::{ExtractionResult, IndirectObject};

// ============================================================================
// Charter Graph Loader
// ============================================================================

/// Builds a deduplicated graph plan for a batch of charters
#[derive(Debug, Default)]
pub struct CharterGraphLoader {
    plan: GraphPlan,
    /// Charters whose extraction was empty
    skipped: Vec<String>,
}

impl CharterGraphLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the charter node, carrying the archive identifiers of the record
    pub fn add_charter_node(&mut self, charter: &ParsedCharter) -> NodeKey {
        let mut node = CrmNode::new(CrmClass::E5Event, charter.charter_id.as_str());
        node.arch_id = charter.arch_id.clone();
        node.mom_id = charter.mom_id.clone();
        node.file_id = charter.file_id.clone();
        self.plan.add_node(node)
    }

    /// Add a charter and the entities extracted from its abstract.
    ///
    /// Returns false if the extraction was empty and nothing but the charter
    /// node was added.
    pub fn add_charter(&mut self, charter: &ParsedCharter, result: &ExtractionResult) -> bool {
        let charter_key = self.add_charter_node(charter);
        let graphed = self.add_extraction(&charter_key, result);
        if !graphed {
            self.skipped.push(charter.charter_id.clone());
        }
        graphed
    }

    /// Connect the entities of one extraction to an existing charter node.
    ///
    /// Only a quadruple graphs its direct object, as a second participant; a
    /// triple is graphed like a pair. For a place link the edge runs from the
    /// holding to the governing place (`Gut` `P89_falls_within` `Teingen`),
    /// never the inverse.
    pub fn add_extraction(&mut self, charter: &NodeKey, result: &ExtractionResult) -> bool {
        let (subject, verb) = match (result.subject(), result.verb()) {
            (Some(subject), Some(verb)) => (subject, verb),
            _ => return false,
        };
        let plan = &mut self.plan;

        let activity = plan.node(CrmClass::E7Activity, verb);
        let actor = plan.node(CrmClass::E21Person, subject);
        plan.connect(charter, CrmProperty::P11HadParticipant, &actor);
        plan.connect(&activity, CrmProperty::P14CarriedOutBy, &actor);
        plan.connect(&activity, CrmProperty::P11HadParticipant, &actor);
        plan.connect(charter, CrmProperty::P9ConsistsOf, &activity);

        let (Some(direct_object), Some(indirect_object)) =
            (result.direct_object(), result.indirect_object())
        else {
            return true;
        };

        let second_actor = plan.node(CrmClass::E21Person, direct_object);
        plan.connect(charter, CrmProperty::P11HadParticipant, &second_actor);
        plan.connect(&activity, CrmProperty::P11HadParticipant, &second_actor);

        match indirect_object {
            IndirectObject::RightTag { category, value } => {
                let right = plan.node(*category, value);
                plan.connect(&actor, CrmProperty::P75Possesses, &right);
                plan.connect(&second_actor, CrmProperty::P75Possesses, &right);
                plan.connect(&right, CrmProperty::P129IsAbout, &activity);
                plan.connect(&right, CrmProperty::P129IsAbout, charter);
            }
            IndirectObject::PlaceLink { primary, secondary } => {
                let place = plan.node(CrmClass::E53Place, primary);
                let governing = plan.node(CrmClass::E53Place, secondary);
                plan.connect(&place, CrmProperty::P89FallsWithin, &governing);
                plan.connect(charter, CrmProperty::P161HasSpatialProjection, &governing);
                plan.connect(&activity, CrmProperty::P161HasSpatialProjection, &place);
                plan.connect(charter, CrmProperty::P161HasSpatialProjection, &place);
            }
            IndirectObject::PlainText(text) => {
                let place = plan.node(CrmClass::E53Place, text);
                plan.connect(&activity, CrmProperty::P161HasSpatialProjection, &place);
                plan.connect(charter, CrmProperty::P161HasSpatialProjection, &place);
            }
        }

        true
    }

    /// Charter ids that were not graphed
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn plan(&self) -> &GraphPlan {
        &self.plan
    }

    /// Take ownership of the plan
    pub fn into_plan(self) -> GraphPlan {
        self.plan
    }
}

// ============================================================================
// Sample graph
// ============================================================================

/// A small regesta graph with hand-identified entities: two charters sharing
/// a type, and the merchants taking part in them.
pub fn sample_graph() -> GraphPlan {
    let mut plan = GraphPlan::new();

    let charter = plan.add_node(
        CrmNode::new(CrmClass::E5Event, "charter i")
            .with_arch_id("SpAR Urk. 35")
            .with_mom_id("12580210")
            .with_file_id("urk0035.txt"),
    );
    let charter2 = plan.add_node(
        CrmNode::new(CrmClass::E5Event, "charter ii")
            .with_arch_id("SpAR Urk. 86")
            .with_mom_id("12590716")
            .with_file_id("urk0086.txt"),
    );
    let charter_type = plan.node(CrmClass::E55Type, "charter type");
    let person = plan.node(CrmClass::E21Person, "Otto Prager");
    let group = plan.node(CrmClass::E74Group, "merchant class");
    let person2 = plan.node(CrmClass::E21Person, "Ortlieb in Foro");
    let person3 = plan.node(CrmClass::E21Person, "Albert de Porta");

    plan.connect(&charter, CrmProperty::P2HasType, &charter_type);
    plan.connect(&charter2, CrmProperty::P2HasType, &charter_type);
    plan.connect(&group, CrmProperty::P107HasCurrentOrFormerMember, &person);
    plan.connect(&group, CrmProperty::P107HasCurrentOrFormerMember, &person2);
    plan.connect(&charter, CrmProperty::P11HadParticipant, &group);
    plan.connect(&charter, CrmProperty::P11HadParticipant, &person);
    plan.connect(&charter, CrmProperty::P11HadParticipant, &person2);
    plan.connect(&charter2, CrmProperty::P11HadParticipant, &person2);
    plan.connect(&charter2, CrmProperty::P11HadParticipant, &person3);

    plan
}

// ============================================================================
// Tests
// ============================================================================
