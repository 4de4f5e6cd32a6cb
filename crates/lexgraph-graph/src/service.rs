//! `GraphRag`: ingestion and question answering over one knowledge graph.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use lexgraph_core::config::LexGraphConfig;
use lexgraph_core::error::{LexGraphError, LexGraphResult};
use lexgraph_core::traits::{ConceptExtractor, DecisionMaker, EntityExtractor, Llm};
use lexgraph_core::types::{ExtractionResult, RiskLevel, Verdict};

use crate::decision::{fallback_decision, verdict_from_reason};
use crate::entity::{LlmEntityExtractor, RuleBasedExtractor};
use crate::graph::{GraphStats, GraphView};
use crate::ingest::loader::folder_extensions;
use crate::ingest::{
    download, download_client, load_file, FolderEntry, FolderReport, IngestionReport,
    LoadedDocument, TextChunker,
};
use crate::persistence::SqliteSnapshotStore;
use crate::retrieval::{
    extract_graph_paths, format_evidence, EntityMatch, EntityRelationships, GraphPath,
    QueryResult, RetrievalEngine, Traversal,
};
use crate::store::GraphStore;

/// Default number of nodes and edges returned by [`GraphRag::view`].
pub const DEFAULT_VIEW_LIMIT: usize = 100;

const ANSWER_MATCHES: usize = 5;
const CONTEXT_SUMMARY_CHARS: usize = 500;

/// A question answered from the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphAnswer {
    pub question: String,
    pub answer: String,
    pub decision: Verdict,
    pub matched_entities: Vec<EntityMatch>,
    pub graph_paths: Vec<GraphPath>,
    pub confidence: f32,
    pub risk_level: RiskLevel,
    pub references: Vec<String>,
    pub suggested_changes: Vec<String>,
    pub alternative_actions: Vec<String>,
    /// Start of the evidence handed to the decision-maker.
    pub graph_context_summary: String,
}

/// Knowledge-graph RAG service.
///
/// Extraction runs before any lock is taken; each batch of chunk results is
/// merged and saved as one update. Read operations hold a single read guard
/// for their whole duration.
pub struct GraphRag {
    config: LexGraphConfig,
    store: Arc<GraphStore>,
    retrieval: RetrievalEngine,
    chunker: TextChunker,
    rules: RuleBasedExtractor,
    llm_extractor: Option<Arc<dyn EntityExtractor>>,
    decision_maker: Option<Arc<dyn DecisionMaker>>,
    http: reqwest::Client,
}

impl GraphRag {
    /// Open the graph stored under `config.graph_db_path`.
    pub fn new(config: LexGraphConfig) -> LexGraphResult<Self> {
        let persistence = Arc::new(SqliteSnapshotStore::new(&config.graph_db_path));
        let store = Arc::new(GraphStore::open(persistence));
        Self::with_store(config, store)
    }

    /// Build a service around an existing store.
    pub fn with_store(config: LexGraphConfig, store: Arc<GraphStore>) -> LexGraphResult<Self> {
        let chunker = TextChunker::from_config(&config.chunking)?;
        let retrieval = RetrievalEngine::new(config.retrieval.clone());

        Ok(Self {
            config,
            store,
            retrieval,
            chunker,
            rules: RuleBasedExtractor::new(),
            llm_extractor: None,
            decision_maker: None,
            http: download_client()?,
        })
    }

    /// Extract entities with `llm` when LLM extraction is requested.
    pub fn with_llm(self, llm: Arc<dyn Llm>) -> Self {
        self.with_extractor(Arc::new(LlmEntityExtractor::new(llm)))
    }

    /// Use a custom extractor when LLM extraction is requested.
    pub fn with_extractor(mut self, extractor: Arc<dyn EntityExtractor>) -> Self {
        self.llm_extractor = Some(extractor);
        self
    }

    pub fn with_decision_maker(mut self, decision_maker: Arc<dyn DecisionMaker>) -> Self {
        self.decision_maker = Some(decision_maker);
        self
    }

    pub fn with_concept_extractor(mut self, concepts: Arc<dyn ConceptExtractor>) -> Self {
        self.retrieval = self.retrieval.with_concept_extractor(concepts);
        self
    }

    pub fn config(&self) -> &LexGraphConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<GraphStore> {
        &self.store
    }

    // ---- Ingestion ----

    /// Ingest raw text under `source_name`.
    pub async fn ingest_text(
        &self,
        text: &str,
        source_name: &str,
        use_llm: bool,
    ) -> LexGraphResult<IngestionReport> {
        let (report, batches) = self.extract_document(text, source_name, use_llm).await;
        self.store.merge_and_persist(&batches, source_name)?;
        self.with_totals(report)
    }

    /// Ingest one file; the file name becomes the source name.
    pub async fn ingest_file(
        &self,
        path: impl AsRef<Path>,
        use_llm: bool,
    ) -> LexGraphResult<IngestionReport> {
        let document = load_file(path.as_ref()).await?;
        self.ingest_text(&document.text, &document.name, use_llm)
            .await
    }

    /// Ingest every supported file of a folder in file-name order.
    ///
    /// A file that fails is recorded in the report and skipped. The graph
    /// is saved once, after the last file.
    pub async fn ingest_folder(
        &self,
        folder: impl AsRef<Path>,
        use_llm: bool,
    ) -> LexGraphResult<FolderReport> {
        let folder = folder.as_ref();
        let files = list_documents(folder).await?;

        let mut results = Vec::with_capacity(files.len());
        for path in &files {
            let file = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            match self.ingest_unsaved(path, use_llm).await {
                Ok(report) => results.push(FolderEntry {
                    file,
                    report: Some(report),
                    error: None,
                }),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    results.push(FolderEntry {
                        file,
                        report: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        self.store.save()?;

        let graph = self.store.read()?;
        tracing::info!(
            "Ingested folder {}: {} files, graph has {} nodes and {} edges",
            folder.display(),
            results.len(),
            graph.node_count(),
            graph.edge_count()
        );

        Ok(FolderReport {
            files_processed: results.len(),
            results,
            total_nodes: graph.node_count(),
            total_edges: graph.edge_count(),
        })
    }

    /// Download a document and ingest it.
    pub async fn ingest_url(&self, url: &str, use_llm: bool) -> LexGraphResult<IngestionReport> {
        let LoadedDocument {
            name,
            file_type,
            text,
        } = download(&self.http, url).await?;

        let mut report = self.ingest_text(&text, &name, use_llm).await?;
        report.source_url = Some(url.to_string());
        report.file_type = Some(file_type);
        Ok(report)
    }

    async fn ingest_unsaved(&self, path: &Path, use_llm: bool) -> LexGraphResult<IngestionReport> {
        let document = load_file(path).await?;
        let (report, batches) = self
            .extract_document(&document.text, &document.name, use_llm)
            .await;
        self.store.merge_all(&batches, &document.name)?;
        self.with_totals(report)
    }

    fn extractor(&self, use_llm: bool) -> &dyn EntityExtractor {
        match &self.llm_extractor {
            Some(extractor) if use_llm && self.config.use_llm => extractor.as_ref(),
            _ => &self.rules,
        }
    }

    async fn extract_document(
        &self,
        text: &str,
        source_name: &str,
        use_llm: bool,
    ) -> (IngestionReport, Vec<ExtractionResult>) {
        let extractor = self.extractor(use_llm);
        let chunks = self.chunker.split(text);

        let mut batches = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            let batch = extractor.extract(chunk, source_name).await;
            tracing::debug!(
                "{} chunk {}/{}: {} entities, {} relationships",
                source_name,
                i + 1,
                chunks.len(),
                batch.entity_count(),
                batch.relationship_count()
            );
            batches.push(batch);
        }

        let report = IngestionReport {
            file: source_name.to_string(),
            chunks_processed: chunks.len(),
            entities_extracted: batches.iter().map(ExtractionResult::entity_count).sum(),
            relationships_extracted: batches
                .iter()
                .map(ExtractionResult::relationship_count)
                .sum(),
            ..Default::default()
        };

        tracing::info!(
            "Extracted {} entities and {} relationships from {} ({} chunks, {} extractor)",
            report.entities_extracted,
            report.relationships_extracted,
            source_name,
            report.chunks_processed,
            extractor.name()
        );

        (report, batches)
    }

    fn with_totals(&self, mut report: IngestionReport) -> LexGraphResult<IngestionReport> {
        let graph = self.store.read()?;
        report.total_nodes = graph.node_count();
        report.total_edges = graph.edge_count();
        Ok(report)
    }

    // ---- Retrieval ----

    pub fn stats(&self) -> LexGraphResult<GraphStats> {
        self.store.stats()
    }

    /// The first `limit` nodes and edges, plus totals.
    pub fn view(&self, limit: usize) -> LexGraphResult<GraphView> {
        self.store.view(limit)
    }

    /// Retrieve graph context for a question.
    pub fn query(&self, question: &str) -> LexGraphResult<QueryResult> {
        let graph = self.store.read()?;
        Ok(self.retrieval.query_graph(&graph, question))
    }

    pub fn find_paths(
        &self,
        source_entity: &str,
        target_entity: &str,
        max_length: Option<usize>,
    ) -> LexGraphResult<Vec<Vec<String>>> {
        let graph = self.store.read()?;
        Ok(self
            .retrieval
            .find_paths(&graph, source_entity, target_entity, max_length))
    }

    pub fn get_entity_relationships(
        &self,
        entity_id: &str,
        relationship_types: Option<&[String]>,
    ) -> LexGraphResult<EntityRelationships> {
        let graph = self.store.read()?;
        Ok(self
            .retrieval
            .get_entity_relationships(&graph, entity_id, relationship_types))
    }

    pub fn traverse(
        &self,
        start_entity: &str,
        relationship_types: Option<&[String]>,
        max_depth: usize,
    ) -> LexGraphResult<Traversal> {
        let graph = self.store.read()?;
        Ok(self
            .retrieval
            .traverse(&graph, start_entity, relationship_types, max_depth))
    }

    /// Answer a question from graph evidence.
    ///
    /// Uses the decision-maker when one is configured and falls back to a
    /// graph-only decision when it is absent or fails.
    pub async fn answer_question(
        &self,
        question: &str,
        extra_context: &str,
    ) -> LexGraphResult<GraphAnswer> {
        let result = self.query(question)?;
        let evidence = format_evidence(&result);

        let decision = match &self.decision_maker {
            Some(decision_maker) => {
                match decision_maker.decide(question, &evidence, extra_context).await {
                    Ok(mut decision) => {
                        if decision.decision == Verdict::Unknown {
                            decision.decision = verdict_from_reason(&decision.reason);
                        }
                        decision
                    }
                    Err(e) => {
                        tracing::warn!("Decision-maker failed, using graph-only answer: {}", e);
                        fallback_decision(&result)
                    }
                }
            }
            None => fallback_decision(&result),
        };

        Ok(GraphAnswer {
            question: question.to_string(),
            answer: decision.reason,
            decision: decision.decision,
            matched_entities: result
                .matched_entities
                .iter()
                .take(ANSWER_MATCHES)
                .cloned()
                .collect(),
            graph_paths: extract_graph_paths(&result),
            confidence: decision.confidence_score,
            risk_level: decision.risk_level,
            references: decision.references,
            suggested_changes: decision.suggested_changes,
            alternative_actions: decision.alternative_actions,
            graph_context_summary: summarize(&evidence),
        })
    }
}

fn summarize(evidence: &str) -> String {
    let mut chars = evidence.chars();
    let summary: String = chars.by_ref().take(CONTEXT_SUMMARY_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", summary)
    } else {
        summary
    }
}

/// Supported documents directly inside `folder`, sorted by file name.
async fn list_documents(folder: &Path) -> LexGraphResult<Vec<PathBuf>> {
    let is_dir = tokio::fs::metadata(folder)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Err(LexGraphError::document_not_found(folder.display().to_string()));
    }

    let extensions = folder_extensions();
    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(folder).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)));
        if supported && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}
