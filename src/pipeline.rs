//! The composite question-answering pipeline.
//!
//! One parameterized flow: relevance gate, retrieval, answer generation,
//! and web/video enrichment, merged into a single attributed answer. The
//! gate short-circuits out-of-domain queries with a fixed refusal before
//! any retrieval, generation, or search call is made. Search legs fail
//! soft: an error degrades that section to a placeholder without touching
//! the other two.

use crate::config::Settings;
use crate::embedding::Embedder;
use crate::error::{Result, RoostError};
use crate::gate::{GateStrategy, KeywordGate, ModelGate, RelevanceGate};
use crate::rag::{ContextBuilder, ContextChunk, Generator, RagEngine};
use crate::search::{
    GoogleWebSearch, VideoResult, VideoSearchProvider, WebResult, WebSearchProvider,
    YoutubeVideoSearch,
};
use crate::vector_store::VectorStore;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Fixed refusal for out-of-domain queries.
pub const REFUSAL_MESSAGE: &str =
    "This assistant is specialized for poultry farming only. Please ask a poultry-related question.";

/// Placeholder when the knowledge base produced no answer.
pub const NO_KNOWLEDGE_ANSWER: &str = "The knowledge base could not answer this question.";

/// Placeholder when web search produced nothing or failed.
pub const NO_WEB_RESULTS: &str = "No relevant web results found.";

/// Placeholder when video search produced nothing or failed.
pub const NO_VIDEO_RESULTS: &str = "No video results found.";

/// Outcome of one answer section.
#[derive(Debug, Clone)]
pub enum Section<T> {
    /// The section produced content.
    Ok(T),
    /// The backend answered but had nothing to offer.
    Empty,
    /// The backend failed; the reason is kept for diagnostics.
    Failed(String),
}

impl<T> Section<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Section::Ok(_))
    }
}

/// The merged, attributed answer for one query.
///
/// Created per query, appended to session history, never mutated.
#[derive(Debug, Clone)]
pub struct CompositeAnswer {
    /// Whether the relevance gate rejected the query.
    pub refused: bool,
    /// Knowledge-base answer text.
    pub knowledge: Section<String>,
    /// Chunks the answer was generated from, for citation.
    pub sources: Vec<ContextChunk>,
    /// Web enrichment results.
    pub web: Section<Vec<WebResult>>,
    /// Video enrichment results.
    pub video: Section<Vec<VideoResult>>,
}

impl CompositeAnswer {
    /// The fixed refusal answer.
    pub fn refusal() -> Self {
        Self {
            refused: true,
            knowledge: Section::Empty,
            sources: Vec::new(),
            web: Section::Empty,
            video: Section::Empty,
        }
    }

    /// Render the answer as display text: three labeled sections in fixed
    /// order, with placeholders substituted for empty or failed sections.
    pub fn render(&self) -> String {
        if self.refused {
            return REFUSAL_MESSAGE.to_string();
        }

        let mut out = String::new();

        out.push_str("### Knowledge Base\n");
        match &self.knowledge {
            Section::Ok(answer) => out.push_str(answer),
            Section::Empty | Section::Failed(_) => out.push_str(NO_KNOWLEDGE_ANSWER),
        }

        if !self.sources.is_empty() {
            out.push_str("\n\nSources: ");
            let mut names: Vec<&str> = self.sources.iter().map(|s| s.source.as_str()).collect();
            names.dedup();
            out.push_str(&names.join(", "));
        }

        out.push_str("\n\n### Web Results\n");
        match &self.web {
            Section::Ok(results) => {
                for result in results {
                    out.push_str(&format!(
                        "- {} ({})\n  {}\n",
                        result.title, result.url, result.snippet
                    ));
                }
            }
            Section::Empty | Section::Failed(_) => {
                out.push_str(NO_WEB_RESULTS);
                out.push('\n');
            }
        }

        out.push_str("\n### Video Results\n");
        match &self.video {
            Section::Ok(results) => {
                for result in results {
                    out.push_str(&format!(
                        "- {} [{}] ({})\n",
                        result.title, result.channel, result.url
                    ));
                }
            }
            Section::Empty | Section::Failed(_) => {
                out.push_str(NO_VIDEO_RESULTS);
                out.push('\n');
            }
        }

        out
    }
}

/// One completed question/answer turn.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub query: String,
    pub answer: String,
}

/// Session-scoped conversation context.
///
/// Created at session start, appended after each answer, cleared at
/// session end. Single writer per session; never shared across users.
#[derive(Debug, Default)]
pub struct Session {
    exchanges: Vec<Exchange>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordered history of prior (query, answer) pairs.
    pub fn history(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// Append a completed exchange.
    pub fn record(&mut self, query: &str, answer: &str) {
        self.exchanges.push(Exchange {
            query: query.to_string(),
            answer: answer.to_string(),
        });
    }

    /// Clear conversation history.
    pub fn clear(&mut self) {
        self.exchanges.clear();
    }
}

/// The assembled answering pipeline.
pub struct Assistant {
    gate: Box<dyn RelevanceGate>,
    retriever: ContextBuilder,
    generator: Arc<dyn Generator>,
    web: Option<Arc<dyn WebSearchProvider>>,
    video: Option<Arc<dyn VideoSearchProvider>>,
    web_results: usize,
    video_results: usize,
}

impl Assistant {
    /// Assemble the pipeline from settings and shared components.
    ///
    /// Search providers with missing credentials are disabled rather than
    /// fatal; their sections render the placeholder.
    pub fn from_settings(
        settings: &Settings,
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let strategy: GateStrategy = settings
            .gate
            .strategy
            .parse()
            .map_err(RoostError::Config)?;

        let gate: Box<dyn RelevanceGate> = match strategy {
            GateStrategy::Keyword => Box::new(KeywordGate::new(&settings.gate.keywords)),
            GateStrategy::Model => Box::new(ModelGate::new(
                &settings.gate.model,
                settings.prompts.gate.clone(),
            )),
        };

        let retriever = ContextBuilder::new(vector_store, embedder, settings.rag.retrieval_k);
        let generator = Arc::new(RagEngine::new(
            &settings.rag.model,
            settings.prompts.rag.clone(),
        ));

        let web: Option<Arc<dyn WebSearchProvider>> = match GoogleWebSearch::from_env() {
            Ok(provider) => Some(Arc::new(provider)),
            Err(e) => {
                warn!("Web search disabled: {}", e);
                None
            }
        };

        let video: Option<Arc<dyn VideoSearchProvider>> = match YoutubeVideoSearch::from_env() {
            Ok(provider) => Some(Arc::new(provider)),
            Err(e) => {
                warn!("Video search disabled: {}", e);
                None
            }
        };

        Ok(Self {
            gate,
            retriever,
            generator,
            web,
            video,
            web_results: settings.search.web_results,
            video_results: settings.search.video_results,
        })
    }

    /// Assemble the pipeline from explicit components (used by tests).
    pub fn with_components(
        gate: Box<dyn RelevanceGate>,
        retriever: ContextBuilder,
        generator: Arc<dyn Generator>,
        web: Option<Arc<dyn WebSearchProvider>>,
        video: Option<Arc<dyn VideoSearchProvider>>,
        web_results: usize,
        video_results: usize,
    ) -> Self {
        Self {
            gate,
            retriever,
            generator,
            web,
            video,
            web_results,
            video_results,
        }
    }

    /// Answer a query and append the exchange to the session.
    ///
    /// An out-of-domain query returns the fixed refusal without any
    /// retrieval, generation, or search call. An unavailable index is
    /// fatal to the query; backend failures degrade their section.
    #[instrument(skip(self, session), fields(query = %query))]
    pub async fn answer(&self, session: &mut Session, query: &str) -> Result<CompositeAnswer> {
        if !self.gate.is_relevant(query).await? {
            info!("Query rejected by relevance gate");
            let composite = CompositeAnswer::refusal();
            session.record(query, &composite.render());
            return Ok(composite);
        }

        let (knowledge, sources) = match self.retriever.build(query).await {
            Ok(chunks) => match self.generator.generate(query, &chunks).await {
                Ok(answer) => (Section::Ok(answer), chunks),
                Err(e) => {
                    warn!("Answer generation failed: {}", e);
                    (Section::Failed(e.to_string()), chunks)
                }
            },
            // A missing or mismatched index is a query-fatal condition, not
            // a degradable section.
            Err(e @ (RoostError::IndexUnavailable(_) | RoostError::Config(_))) => return Err(e),
            Err(e) => {
                warn!("Retrieval failed: {}", e);
                (Section::Failed(e.to_string()), Vec::new())
            }
        };

        let (web, video) = tokio::join!(self.search_web(query), self.search_videos(query));

        let composite = CompositeAnswer {
            refused: false,
            knowledge,
            sources,
            web,
            video,
        };

        session.record(query, &composite.render());
        Ok(composite)
    }

    async fn search_web(&self, query: &str) -> Section<Vec<WebResult>> {
        let Some(provider) = &self.web else {
            return Section::Failed("web search not configured".to_string());
        };

        match provider.search(query, self.web_results).await {
            Ok(results) if results.is_empty() => Section::Empty,
            Ok(results) => Section::Ok(results),
            Err(e) => {
                warn!("Web search failed: {}", e);
                Section::Failed(e.to_string())
            }
        }
    }

    async fn search_videos(&self, query: &str) -> Section<Vec<VideoResult>> {
        let Some(provider) = &self.video else {
            return Section::Failed("video search not configured".to_string());
        };

        match provider.search(query, self.video_results).await {
            Ok(results) if results.is_empty() => Section::Empty,
            Ok(results) => Section::Ok(results),
            Err(e) => {
                warn!("Video search failed: {}", e);
                Section::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::{ChunkKind, DocChunk, MemoryVectorStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedGate {
        relevant: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RelevanceGate for FixedGate {
        async fn is_relevant(&self, _query: &str) -> Result<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.relevant)
        }
    }

    struct CountingEmbedder {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1.0, 0.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(texts.len(), Ordering::SeqCst);
            Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn model_id(&self) -> &str {
            "stub-model"
        }
    }

    struct FixedGenerator {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Generator for FixedGenerator {
        async fn generate(&self, _question: &str, _chunks: &[ContextChunk]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("Keep brooder temperature at 35 degrees in week one.".to_string())
        }
    }

    struct StubWebSearch {
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl WebSearchProvider for StubWebSearch {
        async fn search(&self, _query: &str, n: usize) -> Result<Vec<WebResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RoostError::Search("connection reset".to_string()));
            }
            Ok((0..n)
                .map(|i| WebResult {
                    title: format!("Result {}", i),
                    url: format!("https://example.com/{}", i),
                    snippet: "snippet".to_string(),
                })
                .collect())
        }
    }

    struct StubVideoSearch {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl VideoSearchProvider for StubVideoSearch {
        async fn search(&self, _query: &str, n: usize) -> Result<Vec<VideoResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((0..n)
                .map(|i| VideoResult {
                    title: format!("Video {}", i),
                    url: format!("https://www.youtube.com/watch?v=vid{}", i),
                    channel: "Farm Channel".to_string(),
                })
                .collect())
        }
    }

    struct Counters {
        gate: Arc<AtomicUsize>,
        embedder: Arc<AtomicUsize>,
        generator: Arc<AtomicUsize>,
        web: Arc<AtomicUsize>,
        video: Arc<AtomicUsize>,
    }

    async fn assistant(relevant: bool, web_fails: bool) -> (Assistant, Counters) {
        let counters = Counters {
            gate: Arc::new(AtomicUsize::new(0)),
            embedder: Arc::new(AtomicUsize::new(0)),
            generator: Arc::new(AtomicUsize::new(0)),
            web: Arc::new(AtomicUsize::new(0)),
            video: Arc::new(AtomicUsize::new(0)),
        };

        let store = Arc::new(MemoryVectorStore::new());
        store.set_embedding_model("stub-model").await.unwrap();
        store
            .upsert(&DocChunk::new(
                "poultry1.pdf".to_string(),
                ChunkKind::Text,
                "Brooder temperature guidance for chicks.".to_string(),
                None,
                vec![1.0, 0.0, 0.0],
                0,
            ))
            .await
            .unwrap();

        let retriever = ContextBuilder::new(
            store,
            Arc::new(CountingEmbedder {
                calls: counters.embedder.clone(),
            }),
            3,
        );

        let assistant = Assistant::with_components(
            Box::new(FixedGate {
                relevant,
                calls: counters.gate.clone(),
            }),
            retriever,
            Arc::new(FixedGenerator {
                calls: counters.generator.clone(),
            }),
            Some(Arc::new(StubWebSearch {
                fail: web_fails,
                calls: counters.web.clone(),
            })),
            Some(Arc::new(StubVideoSearch {
                calls: counters.video.clone(),
            })),
            3,
            3,
        );

        (assistant, counters)
    }

    #[tokio::test]
    async fn test_rejected_query_short_circuits() {
        let (assistant, counters) = assistant(false, false).await;
        let mut session = Session::new();

        let composite = assistant
            .answer(&mut session, "how do I fix my tractor")
            .await
            .unwrap();

        assert!(composite.refused);
        assert_eq!(composite.render(), REFUSAL_MESSAGE);

        // No retrieval, generation, or search call happened.
        assert_eq!(counters.gate.load(Ordering::SeqCst), 1);
        assert_eq!(counters.embedder.load(Ordering::SeqCst), 0);
        assert_eq!(counters.generator.load(Ordering::SeqCst), 0);
        assert_eq!(counters.web.load(Ordering::SeqCst), 0);
        assert_eq!(counters.video.load(Ordering::SeqCst), 0);

        // The refusal is still recorded in session history.
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].answer, REFUSAL_MESSAGE);
    }

    #[tokio::test]
    async fn test_full_pipeline_produces_all_sections() {
        let (assistant, counters) = assistant(true, false).await;
        let mut session = Session::new();

        let composite = assistant
            .answer(&mut session, "brooder temperature for chicks")
            .await
            .unwrap();

        assert!(!composite.refused);
        assert!(composite.knowledge.is_ok());
        assert!(composite.web.is_ok());
        assert!(composite.video.is_ok());
        assert_eq!(composite.sources.len(), 1);

        let rendered = composite.render();
        assert!(rendered.contains("### Knowledge Base"));
        assert!(rendered.contains("### Web Results"));
        assert!(rendered.contains("### Video Results"));
        assert!(rendered.contains("35 degrees"));

        assert_eq!(counters.generator.load(Ordering::SeqCst), 1);
        assert_eq!(counters.web.load(Ordering::SeqCst), 1);
        assert_eq!(counters.video.load(Ordering::SeqCst), 1);
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_web_failure_degrades_only_web_section() {
        let (assistant, _counters) = assistant(true, true).await;
        let mut session = Session::new();

        let composite = assistant
            .answer(&mut session, "poultry feed ratios")
            .await
            .unwrap();

        assert!(composite.knowledge.is_ok());
        assert!(matches!(composite.web, Section::Failed(_)));
        assert!(composite.video.is_ok());

        let rendered = composite.render();
        assert!(rendered.contains(NO_WEB_RESULTS));
        assert!(rendered.contains("Video 0"));
        assert!(rendered.contains("35 degrees"));
    }

    #[tokio::test]
    async fn test_empty_index_is_fatal_to_query() {
        let counters_gate = Arc::new(AtomicUsize::new(0));
        let store = Arc::new(MemoryVectorStore::new());
        let retriever = ContextBuilder::new(
            store,
            Arc::new(CountingEmbedder {
                calls: Arc::new(AtomicUsize::new(0)),
            }),
            3,
        );

        let assistant = Assistant::with_components(
            Box::new(FixedGate {
                relevant: true,
                calls: counters_gate,
            }),
            retriever,
            Arc::new(FixedGenerator {
                calls: Arc::new(AtomicUsize::new(0)),
            }),
            None,
            None,
            3,
            3,
        );

        let mut session = Session::new();
        let err = assistant
            .answer(&mut session, "poultry vaccination")
            .await
            .unwrap_err();
        assert!(matches!(err, RoostError::IndexUnavailable(_)));
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_session_history_accumulates() {
        let (assistant, _counters) = assistant(true, false).await;
        let mut session = Session::new();

        assistant.answer(&mut session, "first question").await.unwrap();
        assistant.answer(&mut session, "second question").await.unwrap();

        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[0].query, "first question");
        assert_eq!(session.history()[1].query, "second question");

        session.clear();
        assert!(session.history().is_empty());
    }
}
