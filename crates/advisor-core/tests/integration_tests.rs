//! Advisor Core Integration Tests

use std::sync::Arc;

use advisor_core::{
    domain::advisory::{
        AdvisoryEngine, EnhancedBusinessAnalyzer, Intent, QueryAnalyzer, StrategyTable,
        SynthesisStrategy, Urgency,
        prompts::{CLASSIFY_HEADLINE, TOOLS_HEADLINE},
    },
    domain::knowledge::{AdvisoryGraphBuilder, DocumentStore, KnowledgeGraphStore},
    infrastructure::knowledge::{MemoryDocumentStore, SqliteDocumentStore},
    storage::Database,
    testing::{ScriptedGateway, sample_extraction},
};

fn offline_engine() -> AdvisoryEngine {
    AdvisoryEngine::new(Arc::new(ScriptedGateway::failing("connection refused")))
}

#[tokio::test]
async fn test_unreachable_gateway_yields_fallback_recommendation() {
    let rec = offline_engine()
        .get_advisory_recommendations("How can I reduce costs in my bakery?", None)
        .await;

    assert_eq!(rec.confidence_score, 70);
    assert!(!rec.recommended_solutions.is_empty());
    assert!(!rec.suggested_tools.is_empty());
    assert!(!rec.implementation_plan.phases.is_empty());
    assert!(!rec.next_steps.is_empty());
    assert!(!rec.is_error());
}

#[tokio::test]
async fn test_restaurant_wait_times() {
    let rec = offline_engine()
        .get_advisory_recommendations(
            "Our restaurant has long wait times during peak dinner hours",
            Some("restaurant"),
        )
        .await;

    assert_eq!(rec.industry.as_deref(), Some("restaurant"));
    assert!(!rec.pain_points_identified.is_empty());
    assert!(rec.confidence_score <= 100);
}

#[tokio::test]
async fn test_degenerate_queries_never_fail() {
    let engine = offline_engine();

    for query in ["", "   ", "\u{0}\u{7}\t\n", "?!?!"] {
        let rec = engine.get_advisory_recommendations(query, None).await;
        assert!(rec.confidence_score <= 100);
        assert_eq!(rec.query, query);
    }
}

#[tokio::test]
async fn test_heuristic_analysis_when_gateway_down() {
    let analyzer = QueryAnalyzer::new(Arc::new(ScriptedGateway::failing("timeout")));

    let analysis = analyzer
        .analyze("We have an urgent problem with cash flow and inventory")
        .await;

    assert_eq!(analysis.intent, Intent::IdentifyPainPoints);
    assert_eq!(analysis.urgency, Urgency::Critical);
    assert!(analysis.extracted_topics.contains(&"cash flow".to_string()));
    assert!(analysis.industry_hints.contains(&"retail".to_string()));
}

#[tokio::test]
async fn test_fenced_tools_response() {
    let gateway = ScriptedGateway::new()
        .with_response(
            CLASSIFY_HEADLINE,
            r#"{"intent": "find_tools", "extracted_topics": ["scheduling"], "industry_hints": [], "urgency": "medium", "budget_hints": []}"#,
        )
        .with_response(
            TOOLS_HEADLINE,
            "Here you go:\n```json\n{\"suggested_tools\": [{\"name\": \"Homebase\", \"vendor\": \"Homebase\", \"cost\": \"Free tier\", \"complexity\": \"low\"}], \"confidence_score\": 81}\n```",
        );
    let gateway = Arc::new(gateway);
    let engine = AdvisoryEngine::new(gateway.clone());

    let rec = engine
        .get_advisory_recommendations("what software helps with staff scheduling", None)
        .await;

    assert_eq!(rec.confidence_score, 81);
    assert_eq!(rec.suggested_tools[0].name, "Homebase");
    assert_eq!(gateway.call_count().await, 2);
    assert!(gateway.was_called_with("staff scheduling").await);
}

#[tokio::test]
async fn test_unrouted_intent_yields_error_recommendation() {
    let engine = offline_engine()
        .with_strategies(StrategyTable::default().without_route(Intent::CostAnalysis));

    let rec = engine
        .get_advisory_recommendations("what is the budget impact", None)
        .await;

    assert_eq!(rec.confidence_score, 0);
    assert!(rec.is_error());

    let rerouted = offline_engine().with_strategies(
        StrategyTable::default().with_route(Intent::CostAnalysis, SynthesisStrategy::SuggestTools),
    );
    let rec = rerouted
        .get_advisory_recommendations("what is the budget impact", None)
        .await;
    assert_eq!(rec.confidence_score, 70);
}

#[tokio::test]
async fn test_document_extraction_into_graph_when_gateway_down() {
    let analyzer = EnhancedBusinessAnalyzer::new(Arc::new(ScriptedGateway::failing("offline")));
    let document = "Our kitchen staff rely on paper tickets and the menu changes weekly.";

    let extraction = analyzer
        .extract_business_advisory_knowledge(document, "ops-notes.txt", None)
        .await;
    assert_eq!(extraction.industry, "restaurant");
    assert!(extraction.pain_points[0].evidence.contains(&"ops-notes.txt".to_string()));

    let builder = AdvisoryGraphBuilder::new(Arc::new(MemoryDocumentStore::new()));
    let result = builder.build_advisory_graph(&extraction, "ops-notes.txt").await;

    assert!(result.success);
    assert_eq!(result.nodes_created, 3);
    assert_eq!(result.relationships_created, 2);
}

async fn assert_rebuild_merges_nodes<S: DocumentStore>(store: Arc<S>) {
    let builder = AdvisoryGraphBuilder::new(store);
    let extraction = sample_extraction();

    let first = builder.build_advisory_graph(&extraction, "doc-1").await;
    assert!(first.success);
    assert_eq!(first.nodes_created, 4);
    assert_eq!(first.nodes_inserted, 4);
    assert_eq!(first.relationships_created, 3);

    let second = builder.build_advisory_graph(&extraction, "doc-2").await;
    assert!(second.success);
    assert_eq!(second.nodes_created, 4);
    assert_eq!(second.nodes_inserted, 0);

    let stats = builder.graph().stats().await.unwrap();
    assert_eq!(stats.node_count, 4);
    assert_eq!(stats.relationship_count, 6);
    assert_eq!(stats.nodes_by_type["pain_point"], 2);
    assert_eq!(stats.relationships_by_type["SOLVES"], 4);

    let tool = builder
        .graph()
        .get_node("tool_square_for_retail")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tool.source_documents, vec!["doc-1", "doc-2"]);
}

#[tokio::test]
async fn test_rebuild_from_second_document_in_memory() {
    assert_rebuild_merges_nodes(Arc::new(MemoryDocumentStore::new())).await;
}

#[tokio::test]
async fn test_rebuild_from_second_document_in_sqlite() {
    let db = Database::in_memory().await.unwrap();
    assert_rebuild_merges_nodes(Arc::new(SqliteDocumentStore::new(db.pool().clone()))).await;
}

#[tokio::test]
async fn test_graph_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.db");

    {
        let db = Database::open(&path).await.unwrap();
        let builder = AdvisoryGraphBuilder::new(Arc::new(SqliteDocumentStore::new(db.pool().clone())));
        builder.build_advisory_graph(&sample_extraction(), "doc-1").await;
        db.close().await;
    }

    let db = Database::open(&path).await.unwrap();
    let graph = KnowledgeGraphStore::new(Arc::new(SqliteDocumentStore::new(db.pool().clone())));
    let snapshot = graph.export().await.unwrap();

    assert_eq!(snapshot.nodes.len(), 4);
    assert_eq!(snapshot.relationships.len(), 3);
    assert!(graph.query_graph_for_solutions(&["Frequent Stockouts".into()], None).await.is_empty());
    assert!(graph.get_node_neighborhood("tool_square_for_retail", 2).await.is_empty());
}
