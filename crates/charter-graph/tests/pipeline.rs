//! Charter abstracts through extraction, loading, and the in-memory store

use charter_core::{CrmClass, CrmLink, CrmProperty, NodeKey, ParsedCharter};
use charter_extractor::{
    sample_graph, CharterGraphLoader, DependencyPatternExtractor, ExtractionResult,
    IndirectObject, RelationExtractor,
};
use charter_graph::{GraphStore, InMemoryGraph};

const CHARTERS: &str = include_str!("../../../data/charters.json");

fn charters() -> Vec<ParsedCharter> {
    serde_json::from_str(CHARTERS).unwrap()
}

fn extract_all() -> Vec<(ParsedCharter, ExtractionResult)> {
    let extractor = DependencyPatternExtractor::new();
    charters()
        .into_iter()
        .map(|c| {
            let result = extractor.extract(&c.sentence);
            (c, result)
        })
        .collect()
}

fn result_for<'a>(
    results: &'a [(ParsedCharter, ExtractionResult)],
    id: &str,
) -> &'a ExtractionResult {
    &results.iter().find(|(c, _)| c.charter_id == id).unwrap().1
}

fn link(subject: NodeKey, property: CrmProperty, object: NodeKey) -> CrmLink {
    CrmLink::new(subject, property, object)
}

#[test]
fn test_example_abstracts() {
    let results = extract_all();
    assert_eq!(results.len(), 5);

    assert_eq!(
        result_for(&results, "SpAR Urk. 2101"),
        &ExtractionResult::Quadruple {
            subject: "Ulrich von Abbach".to_string(),
            verb: "verkaufen".to_string(),
            direct_object: "St. Katharinenspital".to_string(),
            indirect_object: IndirectObject::place("Gut", "Teingen"),
        }
    );
    assert_eq!(
        result_for(&results, "SpAR Urk. 1483"),
        &ExtractionResult::Pair {
            subject: "Hainreich von Trautenberch".to_string(),
            verb: "verschaffen".to_string(),
        }
    );
    assert_eq!(
        result_for(&results, "SpAR Urk. 799"),
        &ExtractionResult::Quadruple {
            subject: "Rudger der Mulnar".to_string(),
            verb: "vermachen".to_string(),
            direct_object: "St. Katharinenspital".to_string(),
            indirect_object: IndirectObject::place("Äcker", "Chesching"),
        }
    );
    assert_eq!(result_for(&results, "SpAR Urk. 35"), &ExtractionResult::Empty);
    assert_eq!(
        result_for(&results, "SpAR Urk. 86"),
        &ExtractionResult::Quadruple {
            subject: "Bruno von Aichkirchen".to_string(),
            verb: "verkaufen".to_string(),
            direct_object: "St. Katharinenspital".to_string(),
            indirect_object: IndirectObject::place("Grund", "Stadt"),
        }
    );
}

#[tokio::test]
async fn test_load_into_memory_graph() {
    let mut loader = CharterGraphLoader::new();
    for (charter, result) in extract_all() {
        loader.add_charter(&charter, &result);
    }
    assert_eq!(loader.skipped(), ["SpAR Urk. 35".to_string()]);

    let graph = InMemoryGraph::new();
    let report = graph.apply(loader.plan()).await.unwrap();
    assert_eq!(report.nodes_created, graph.node_count().await.unwrap());
    assert_eq!(report.links_created, graph.link_count().await.unwrap());

    // one hospital node shared by every sale and bequest
    let hospital = graph
        .find_by_name(CrmClass::E21Person, "St. Katharinenspital")
        .await
        .unwrap();
    assert!(hospital.is_some());
    assert_eq!(graph.nodes_of(CrmClass::E5Event).await.len(), 5);
    assert_eq!(graph.nodes_of(CrmClass::E7Activity).await.len(), 3);

    let sale = NodeKey::new(CrmClass::E7Activity, "verkaufen");
    for seller in ["Ulrich von Abbach", "Bruno von Aichkirchen"] {
        let actor = NodeKey::new(CrmClass::E21Person, seller);
        assert!(graph
            .is_connected(&link(sale.clone(), CrmProperty::P14CarriedOutBy, actor))
            .await
            .unwrap());
    }

    let field = NodeKey::new(CrmClass::E53Place, "Äcker");
    let village = NodeKey::new(CrmClass::E53Place, "Chesching");
    assert!(graph
        .is_connected(&link(field, CrmProperty::P89FallsWithin, village.clone()))
        .await
        .unwrap());
    assert!(graph
        .is_connected(&link(
            NodeKey::new(CrmClass::E5Event, "SpAR Urk. 799"),
            CrmProperty::P161HasSpatialProjection,
            village,
        ))
        .await
        .unwrap());

    let charter = graph
        .find_by_name(CrmClass::E5Event, "SpAR Urk. 86")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(charter.mom_id.as_deref(), Some("12590716"));
}

#[tokio::test]
async fn test_reload_converges() {
    let graph = InMemoryGraph::new();
    let mut loader = CharterGraphLoader::new();
    for (charter, result) in extract_all() {
        loader.add_charter(&charter, &result);
    }
    let plan = loader.into_plan();

    graph.apply(&plan).await.unwrap();
    let nodes = graph.node_count().await.unwrap();
    let links = graph.link_count().await.unwrap();

    let again = graph.apply(&plan).await.unwrap();
    assert_eq!(again.nodes_created, 0);
    assert_eq!(again.links_created, 0);
    assert_eq!(graph.node_count().await.unwrap(), nodes);
    assert_eq!(graph.link_count().await.unwrap(), links);
}

#[tokio::test]
async fn test_seed_sample_graph() {
    let graph = InMemoryGraph::new();
    let report = graph.apply(&sample_graph()).await.unwrap();
    assert_eq!(report.nodes_created, 7);
    assert_eq!(report.links_created, 9);

    graph.clear().await.unwrap();
    assert_eq!(graph.node_count().await.unwrap(), 0);
}
