//! Integration tests for the GraphRag service: ingestion, recovery and
//! question answering.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use lexgraph_core::config::LexGraphConfig;
use lexgraph_core::error::{LexGraphError, LexGraphResult};
use lexgraph_core::traits::{DecisionMaker, GenerationOptions, Llm, LlmResponse};
use lexgraph_core::types::{Decision, Message, RiskLevel, Verdict};
use lexgraph_graph::GraphRag;

const POLICY: &str = "Section 4: Data Storage\n\n4.1 Approval from DPO is required.\n4.2 Data must be encrypted at rest.\n";

fn config(dir: &Path) -> LexGraphConfig {
    LexGraphConfig::default().with_graph_db_path(dir.join("graph_db"))
}

struct FailingDecisionMaker;

#[async_trait]
impl DecisionMaker for FailingDecisionMaker {
    async fn decide(&self, _question: &str, _evidence: &str, _extra: &str) -> LexGraphResult<Decision> {
        Err(LexGraphError::decision("decision service unavailable"))
    }
}

/// Returns a fixed verdict and records the evidence it was given.
struct RecordingDecisionMaker {
    evidence: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl DecisionMaker for RecordingDecisionMaker {
    async fn decide(&self, _question: &str, evidence: &str, extra: &str) -> LexGraphResult<Decision> {
        self.evidence
            .lock()
            .unwrap()
            .push((evidence.to_string(), extra.to_string()));
        Ok(Decision {
            decision: Verdict::Conditional,
            reason: "Section 4.1 requires DPO approval before external storage.".to_string(),
            risk_level: RiskLevel::High,
            confidence_score: 0.9,
            suggested_changes: vec!["Request DPO approval".to_string()],
            alternative_actions: vec!["Use internal storage".to_string()],
            references: vec!["Policy Section 4.1".to_string()],
        })
    }
}

/// Leaves the verdict open and explains itself only in prose.
struct ProseDecisionMaker;

#[async_trait]
impl DecisionMaker for ProseDecisionMaker {
    async fn decide(&self, _question: &str, _evidence: &str, _extra: &str) -> LexGraphResult<Decision> {
        Ok(Decision {
            decision: Verdict::Unknown,
            reason: "It depends on whether the DPO has signed off.".to_string(),
            risk_level: RiskLevel::Medium,
            confidence_score: 0.7,
            suggested_changes: Vec::new(),
            alternative_actions: Vec::new(),
            references: Vec::new(),
        })
    }
}

struct CannedLlm(String);

#[async_trait]
impl Llm for CannedLlm {
    async fn generate(
        &self,
        _messages: &[Message],
        _options: Option<GenerationOptions>,
    ) -> LexGraphResult<LlmResponse> {
        Ok(LlmResponse::text(self.0.clone()))
    }

    fn model_name(&self) -> &str {
        "canned"
    }
}

#[tokio::test]
async fn test_dpo_requirement_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let rag = GraphRag::new(config(dir.path())).unwrap();

    let report = rag
        .ingest_text("4.1 Approval from DPO is required.", "policy.txt", false)
        .await
        .unwrap();
    assert_eq!(report.file, "policy.txt");
    assert_eq!(report.total_nodes, 2);
    assert_eq!(report.total_edges, 1);

    let rels = rag.get_entity_relationships("req_4_1", None).unwrap();
    assert!(rels.found);
    assert_eq!(rels.outgoing.len(), 1);
    assert_eq!(rels.outgoing[0].entity_id, "req_dpo_approval");
    assert_eq!(rels.outgoing[0].relationship, "REQUIRES");

    let answer = rag
        .answer_question("Can we store data on an external server without DPO approval?", "")
        .await
        .unwrap();
    assert_eq!(answer.decision, Verdict::Conditional);
    assert_eq!(answer.confidence, 0.5);
    assert!(answer.answer.starts_with("Based on the knowledge graph:"));
    assert!(answer
        .graph_paths
        .iter()
        .any(|p| p.relationship == "REQUIRES" && p.target == "DPO Approval Required"));
}

#[tokio::test]
async fn test_empty_graph_query() {
    let dir = tempfile::tempdir().unwrap();
    let rag = GraphRag::new(config(dir.path())).unwrap();

    let result = rag.query("Does external storage require DPO approval?").unwrap();
    assert!(!result.concepts.is_empty());
    assert!(result.matched_entities.is_empty());
    assert!(result.related_info.is_empty());

    let answer = rag
        .answer_question("Does external storage require DPO approval?", "")
        .await
        .unwrap();
    assert_eq!(answer.decision, Verdict::Unknown);
    assert_eq!(answer.confidence, 0.0);
    assert!(answer.matched_entities.is_empty());
    assert_eq!(
        answer.suggested_changes,
        vec!["Ingest relevant documents to build knowledge graph"]
    );
}

#[tokio::test]
async fn test_graph_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let rag = GraphRag::new(config(dir.path())).unwrap();
        rag.ingest_text(POLICY, "storage.txt", false).await.unwrap();
    }

    let rag = GraphRag::new(config(dir.path())).unwrap();
    let stats = rag.stats().unwrap();
    assert_eq!(stats.node_types.get("Section"), Some(&1));
    assert_eq!(stats.node_types.get("Requirement"), Some(&3));
    assert_eq!(stats.relationship_types.get("CONTAINS"), Some(&2));
    assert_eq!(stats.relationship_types.get("REQUIRES"), Some(&1));

    let view = rag.view(2).unwrap();
    assert_eq!(view.nodes.len(), 2);
    assert_eq!(view.total_nodes, stats.total_nodes);
}

#[tokio::test]
async fn test_corrupt_snapshot_starts_empty_and_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let graph_dir = dir.path().join("graph_db");
    std::fs::create_dir_all(&graph_dir).unwrap();
    std::fs::write(graph_dir.join("knowledge_graph.db"), b"definitely not sqlite").unwrap();

    let rag = GraphRag::new(config(dir.path())).unwrap();
    assert_eq!(rag.stats().unwrap().total_nodes, 0);

    rag.ingest_text("4.1 Approval from DPO is required.", "policy.txt", false)
        .await
        .unwrap();
    drop(rag);

    let reopened = GraphRag::new(config(dir.path())).unwrap();
    assert_eq!(reopened.stats().unwrap().total_nodes, 2);
}

#[tokio::test]
async fn test_failing_decision_maker_falls_back_to_graph() {
    let dir = tempfile::tempdir().unwrap();
    let rag = GraphRag::new(config(dir.path()))
        .unwrap()
        .with_decision_maker(Arc::new(FailingDecisionMaker));
    rag.ingest_text(POLICY, "storage.txt", false).await.unwrap();

    let answer = rag
        .answer_question("Does external storage require DPO approval?", "")
        .await
        .unwrap();
    assert_eq!(answer.decision, Verdict::Conditional);
    assert_eq!(answer.risk_level, RiskLevel::Medium);
    assert!(answer.answer.contains("requires DPO Approval Required."));
    assert!(answer.references.iter().all(|r| r.starts_with("Graph entity: ")));
}

#[tokio::test]
async fn test_decision_maker_gets_evidence() {
    let dir = tempfile::tempdir().unwrap();
    let decider = Arc::new(RecordingDecisionMaker {
        evidence: Mutex::new(Vec::new()),
    });
    let rag = GraphRag::new(config(dir.path()))
        .unwrap()
        .with_decision_maker(decider.clone());
    rag.ingest_text(POLICY, "storage.txt", false).await.unwrap();

    let answer = rag
        .answer_question("Does external storage require DPO approval?", "Vendor is in the EU")
        .await
        .unwrap();
    assert_eq!(answer.decision, Verdict::Conditional);
    assert_eq!(answer.risk_level, RiskLevel::High);
    assert_eq!(answer.references, vec!["Policy Section 4.1"]);
    assert_eq!(answer.alternative_actions, vec!["Use internal storage"]);

    let calls = decider.evidence.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (evidence, extra) = &calls[0];
    assert!(evidence.starts_with("KNOWLEDGE GRAPH CONTEXT:"));
    assert!(evidence.contains("RELEVANT ENTITIES FROM GRAPH:"));
    assert_eq!(extra, "Vendor is in the EU");
    assert!(answer.graph_context_summary.len() <= evidence.len() + 3);
}

#[tokio::test]
async fn test_llm_extraction_path() {
    let dir = tempfile::tempdir().unwrap();
    let reply = "```json\n{\"entities\": [{\"id\": \"theft\", \"type\": \"crime\", \"name\": \"Theft\"}, {\"id\": \"intent\", \"type\": \"Element\", \"name\": \"Intent\"}], \"relationships\": [{\"source\": \"theft\", \"target\": \"intent\", \"type\": \"requires\"}]}\n```";
    let rag = GraphRag::new(config(dir.path()))
        .unwrap()
        .with_llm(Arc::new(CannedLlm(reply.to_string())));

    let report = rag
        .ingest_text("Whoever dishonestly takes property commits theft.", "ipc.txt", true)
        .await
        .unwrap();
    assert_eq!(report.entities_extracted, 2);
    assert_eq!(report.relationships_extracted, 1);

    let rels = rag.get_entity_relationships("theft", None).unwrap();
    assert_eq!(rels.outgoing[0].relationship, "REQUIRES");

    // use_llm = false goes through the rule-based extractor, which finds nothing here
    let report = rag
        .ingest_text("Whoever dishonestly takes property commits theft.", "ipc2.txt", false)
        .await
        .unwrap();
    assert_eq!(report.entities_extracted, 0);
}

#[tokio::test]
async fn test_folder_ingestion_records_failures() {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir_all(&docs).unwrap();
    std::fs::write(docs.join("b_storage.txt"), POLICY).unwrap();
    std::fs::write(docs.join("a_access.txt"), "7.1 Access requires CISO approval.").unwrap();
    std::fs::write(docs.join("c_broken.txt"), [0xffu8, 0xfe, 0x80]).unwrap();
    std::fs::write(docs.join("notes.md"), "4.9 Ignored entirely.").unwrap();

    let rag = GraphRag::new(config(dir.path())).unwrap();
    let report = rag.ingest_folder(&docs, false).await.unwrap();

    let files: Vec<&str> = report.results.iter().map(|r| r.file.as_str()).collect();
    assert_eq!(files, vec!["a_access.txt", "b_storage.txt", "c_broken.txt"]);
    assert_eq!(report.files_processed, 3);
    assert_eq!(report.failures().count(), 1);
    assert!(report.results[2].error.is_some());
    assert!(report.results[0].report.is_some());
    assert!(rag.get_entity_relationships("req_4_9", None).map(|r| !r.found).unwrap());

    drop(rag);
    let reopened = GraphRag::new(config(dir.path())).unwrap();
    assert_eq!(reopened.stats().unwrap().total_nodes, report.total_nodes);
    let approval = reopened.get_entity_relationships("req_ciso_approval", None).unwrap();
    assert!(approval.found);
    assert_eq!(approval.incoming[0].entity_id, "req_7_1");
}

#[tokio::test]
async fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let rag = GraphRag::new(config(dir.path())).unwrap();
    let err = rag
        .ingest_file(dir.path().join("nope.txt"), false)
        .await
        .unwrap_err();
    assert_eq!(err.code().as_str(), "DOC_001");
}

#[tokio::test]
async fn test_paths_and_traversal_through_service() {
    let dir = tempfile::tempdir().unwrap();
    let rag = GraphRag::new(config(dir.path())).unwrap();
    rag.ingest_text(POLICY, "storage.txt", false).await.unwrap();

    let paths = rag.find_paths("section_4", "req_dpo_approval", None).unwrap();
    assert_eq!(paths, vec![vec!["section_4", "req_4_1", "req_dpo_approval"]]);

    let traversal = rag.traverse("req_dpo_approval", None, 2).unwrap();
    let ids: Vec<&str> = traversal.related.iter().map(|h| h.entity_id.as_str()).collect();
    assert_eq!(ids, vec!["req_4_1", "section_4"]);
    assert_eq!(traversal.related[0].relationship, "reverse_REQUIRES");
}

#[tokio::test]
async fn test_same_section_from_two_files() {
    let dir = tempfile::tempdir().unwrap();
    let rag = GraphRag::new(config(dir.path())).unwrap();

    let first = rag.ingest_text(POLICY, "file1.txt", false).await.unwrap();
    let second = rag.ingest_text(POLICY, "file2.txt", false).await.unwrap();
    assert_eq!(first.total_nodes, second.total_nodes);
    assert_eq!(first.total_edges, second.total_edges);

    let view = rag.view(100).unwrap();
    let requirement = view.nodes.iter().find(|n| n.id == "req_4_1").unwrap();
    let sources: Vec<&str> = requirement.source_files.iter().map(String::as_str).collect();
    assert_eq!(sources, vec!["file1.txt", "file2.txt"]);
    assert_eq!(requirement.text_property("source_file"), Some("file1.txt"));
}

#[tokio::test]
async fn test_open_verdict_is_read_from_reason() {
    let dir = tempfile::tempdir().unwrap();
    let rag = GraphRag::new(config(dir.path()))
        .unwrap()
        .with_decision_maker(Arc::new(ProseDecisionMaker));
    rag.ingest_text(POLICY, "storage.txt", false).await.unwrap();

    let answer = rag
        .answer_question("Can we store data externally?", "")
        .await
        .unwrap();
    assert_eq!(answer.decision, Verdict::Conditional);
    assert_eq!(answer.confidence, 0.7);
    assert!(answer.answer.starts_with("It depends"));
}
