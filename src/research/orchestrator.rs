//! Depth-bounded research orchestration.
//!
//! Drives the session loop: snapshot the frontier, dispatch every item
//! through the limiter, settle-all join, merge contributions, advance
//! depth, and finally synthesize the report. Item failures are contained
//! at the item boundary; only the synthesis step can fail a session.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::config::ResearchConfig;
use super::executor::{DepthInfo, QueryExecutor};
use super::limiter::ConcurrencyLimiter;
use super::parser::extract_report;
use super::progress::{ProgressObserver, ProgressTracker, ProgressUpdate};
use super::state::{QueryItem, Research, ResearchStatus};
use crate::agent::traits::Agent;
use crate::agent::{LlmProvider, ReporterAgent, TokenUsage};
use crate::error::ResearchError;
use crate::search::SearchProvider;

/// Summary of a completed session.
#[derive(Debug, Clone)]
pub struct ResearchOutcome {
    /// The synthesized report.
    pub report: String,
    /// Learnings accumulated across all depths.
    pub learnings_count: usize,
    /// Total items dispatched (seeds plus follow-ups).
    pub queries_dispatched: usize,
    /// Items that failed (search failure or retry exhaustion).
    pub queries_failed: usize,
    /// Depths fully executed.
    pub depths_completed: usize,
    /// Total tokens consumed by reasoning calls.
    pub total_tokens: u32,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Orchestrates one research session from seed frontier to final report.
pub struct ResearchOrchestrator {
    executor: Arc<QueryExecutor>,
    provider: Arc<dyn LlmProvider>,
    reporter: ReporterAgent,
    config: ResearchConfig,
}

impl ResearchOrchestrator {
    /// Creates an orchestrator with the given collaborators and
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::Config`] if the configuration bounds are
    /// invalid.
    pub fn new(
        search: Arc<dyn SearchProvider>,
        provider: Arc<dyn LlmProvider>,
        config: ResearchConfig,
    ) -> Result<Self, ResearchError> {
        let executor = Arc::new(QueryExecutor::new(search, Arc::clone(&provider), &config)?);
        let reporter = ReporterAgent::new(&config);
        Ok(Self {
            executor,
            provider,
            reporter,
            config,
        })
    }

    /// Runs the full session: depth-bounded expansion, then synthesis.
    ///
    /// The seed frontier is `research.queries` as given at call time.
    /// Per-item failures never abort siblings, the depth batch, or later
    /// depths; they only reduce the volume of learnings collected.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::Synthesis`] if the final report call
    /// fails or its output lacks the reasoning-complete marker. This is
    /// the only terminal error.
    pub async fn run(
        &self,
        research: &mut Research,
        observer: Option<ProgressObserver>,
    ) -> Result<ResearchOutcome, ResearchError> {
        let start = Instant::now();
        let tracker = Arc::new(ProgressTracker::new(
            self.config.max_depth,
            research.queries.len(),
            observer,
        ));
        let limiter = ConcurrencyLimiter::new(self.config.concurrency);

        info!(
            research = research.name,
            seed_queries = research.queries.len(),
            max_depth = self.config.max_depth,
            concurrency = self.config.concurrency,
            "starting research session"
        );

        let mut frontier: Vec<QueryItem> = research.queries.clone();
        let mut depth = 1usize;
        let mut queries_failed = 0usize;
        let mut depths_completed = 0usize;
        let mut total_tokens = TokenUsage::default();

        while !frontier.is_empty() {
            tracker.report(ProgressUpdate {
                current_depth: Some(depth),
                ..ProgressUpdate::default()
            });

            let depth_info = DepthInfo {
                current: depth,
                max: self.config.max_depth,
            };
            // Items within a depth see the learnings as of depth start;
            // contributions are merged single-threaded after the join.
            let snapshot = Arc::new(research.clone());

            let mut handles = Vec::with_capacity(frontier.len());
            for item in frontier.drain(..) {
                let executor = Arc::clone(&self.executor);
                let limiter = limiter.clone();
                let tracker = Arc::clone(&tracker);
                let snapshot = Arc::clone(&snapshot);

                handles.push(tokio::spawn(async move {
                    let result = limiter
                        .run(async {
                            // Reported on admission, so current_query
                            // tracks items as they actually start.
                            tracker.report(ProgressUpdate {
                                current_depth: Some(depth_info.current),
                                current_query: Some(item.query.clone()),
                            });
                            executor.execute(&item, &snapshot, depth_info).await
                        })
                        .await
                        .and_then(|inner| inner);

                    // Settled items count whether they succeeded or not,
                    // so the loop can never stall on failures.
                    tracker.complete_one();
                    (item, result)
                }));
            }

            // Settle-all join: wait for every dispatched item; a single
            // failure never short-circuits the batch.
            let mut next_frontier: Vec<QueryItem> = Vec::new();
            for handle in handles {
                match handle.await {
                    Ok((item, Ok(report))) => {
                        debug!(
                            query = item.query,
                            learnings = report.learnings.len(),
                            follow_ups = report.follow_ups.len(),
                            "merging item contribution"
                        );
                        research.learnings.extend(report.learnings);
                        next_frontier.extend(report.follow_ups);
                        total_tokens.absorb(report.usage);
                    }
                    Ok((item, Err(error))) => {
                        queries_failed += 1;
                        warn!(query = item.query, %error, "query item failed");
                    }
                    Err(join_error) => {
                        // The task died before it could report; count it
                        // settled so completed_queries still converges.
                        queries_failed += 1;
                        tracker.complete_one();
                        warn!(%join_error, "query task join failed");
                    }
                }
            }

            depths_completed = depth;
            research.queries.extend(next_frontier.iter().cloned());
            tracker.extend_total(next_frontier.len());

            info!(
                depth,
                discovered = next_frontier.len(),
                learnings = research.learnings.len(),
                "depth settled"
            );

            depth += 1;
            frontier = next_frontier;
        }

        let report = self.synthesize(research, &mut total_tokens).await?;
        research.status = ResearchStatus::Done;

        info!(
            research = research.name,
            learnings = research.learnings.len(),
            failed = queries_failed,
            elapsed_s = start.elapsed().as_secs_f64(),
            "research session complete"
        );

        Ok(ResearchOutcome {
            report,
            learnings_count: research.learnings.len(),
            queries_dispatched: research.queries.len(),
            queries_failed,
            depths_completed,
            total_tokens: total_tokens.total_tokens,
            elapsed: start.elapsed(),
        })
    }

    /// One reasoning call over the entire accumulated state.
    ///
    /// Any failure here, transport or a response without the
    /// reasoning-complete marker, is terminal for the session. The
    /// final call carries no per-call deadline.
    async fn synthesize(
        &self,
        research: &Research,
        total_tokens: &mut TokenUsage,
    ) -> Result<String, ResearchError> {
        let user_msg = crate::agent::prompt::build_report_prompt(research);
        let response = self
            .reporter
            .execute(&*self.provider, &user_msg)
            .await
            .map_err(|e| ResearchError::Synthesis {
                message: format!("report call failed: {e}"),
            })?;
        total_tokens.absorb(response.usage);
        extract_report(&response.content)
    }
}

impl std::fmt::Debug for ResearchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchOrchestrator")
            .field("provider", &self.provider.name())
            .field("executor", &self.executor)
            .field("max_depth", &self.config.max_depth)
            .field("concurrency", &self.config.concurrency)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::message::{ChatRequest, ChatResponse};
    use crate::error::ResearchError;
    use crate::search::{SearchOptions, SearchRecord};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reporter responses are distinguished from analyst responses by the
    /// system prompt; this body ends a session with a fixed report.
    const REPORT_BODY: &str = "weighing everything</think>\n# Findings\nthe report body";

    /// Search provider that fails for queries listed in `fail_queries`.
    struct ScriptedSearch {
        calls: AtomicUsize,
        fail_queries: Vec<String>,
    }

    impl ScriptedSearch {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_queries: Vec::new(),
            }
        }

        fn failing_for(queries: &[&str]) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_queries: queries.iter().map(ToString::to_string).collect(),
            }
        }
    }

    #[async_trait]
    impl SearchProvider for ScriptedSearch {
        fn name(&self) -> &'static str {
            "scripted-search"
        }

        async fn search(
            &self,
            query: &str,
            _options: &SearchOptions,
        ) -> Result<Vec<SearchRecord>, ResearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_queries.iter().any(|q| q == query) {
                return Err(ResearchError::Search {
                    message: format!("no results for {query}"),
                });
            }
            Ok(vec![SearchRecord {
                title: format!("about {query}"),
                url: "https://example.com".to_string(),
                content: "content".to_string(),
                score: None,
            }])
        }
    }

    /// Provider that answers analyst calls from a per-query script and
    /// reporter calls with [`REPORT_BODY`].
    struct ScriptedProvider {
        analyst_calls: AtomicUsize,
        reporter_calls: AtomicUsize,
        /// (query marker, response body); first marker contained in the
        /// user message wins. Falls back to an empty-output body.
        scripts: Vec<(String, String)>,
    }

    impl ScriptedProvider {
        fn new(scripts: Vec<(String, String)>) -> Self {
            Self {
                analyst_calls: AtomicUsize::new(0),
                reporter_calls: AtomicUsize::new(0),
                scripts,
            }
        }

        fn analysis_body(learning: &str, follow_ups: &[(&str, &str)]) -> String {
            let follow_ups: Vec<String> = follow_ups
                .iter()
                .map(|(q, g)| format!(r#"{{"query": "{q}", "goal": "{g}"}}"#))
                .collect();
            format!(
                "thinking</think><output>{{\"learnings\": [{{\"content\": \"{learning}\"}}], \"followUpQueries\": [{}]}}</output>",
                follow_ups.join(",")
            )
        }

        fn empty_body() -> String {
            Self::analysis_body("nothing notable", &[])
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ResearchError> {
            let system = &request.messages[0].content;
            let content = if system.contains("research reporter") {
                self.reporter_calls.fetch_add(1, Ordering::SeqCst);
                REPORT_BODY.to_string()
            } else {
                self.analyst_calls.fetch_add(1, Ordering::SeqCst);
                let user = &request.messages[1].content;
                self.scripts
                    .iter()
                    .find(|(marker, _)| user.contains(marker.as_str()))
                    .map_or_else(Self::empty_body, |(_, body)| body.clone())
            };
            Ok(ChatResponse {
                content,
                usage: TokenUsage {
                    prompt_tokens: 10,
                    completion_tokens: 10,
                    total_tokens: 20,
                },
                finish_reason: Some("stop".to_string()),
            })
        }
    }

    fn config(max_depth: usize, concurrency: usize) -> ResearchConfig {
        ResearchConfig::builder()
            .api_key("test")
            .max_depth(max_depth)
            .concurrency(concurrency)
            .build()
            .unwrap_or_else(|_| unreachable!())
    }

    fn seed(queries: &[(&str, &str)]) -> Research {
        Research::new(
            "r1",
            "test session",
            queries
                .iter()
                .map(|(q, g)| QueryItem::new(*q, *g))
                .collect(),
            vec!["what is going on?".to_string()],
        )
    }

    /// Observer that records (completed, total) from every snapshot; the
    /// counter invariant is asserted over the log after the run.
    fn recording_observer() -> (Arc<Mutex<Vec<(usize, usize)>>>, ProgressObserver) {
        let seen: Arc<Mutex<Vec<(usize, usize)>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let observer: ProgressObserver = Box::new(move |progress| {
            if let Ok(mut log) = seen_clone.lock() {
                log.push((progress.completed_queries, progress.total_queries));
            }
        });
        (seen, observer)
    }

    fn assert_counters_monotonic(log: &[(usize, usize)]) {
        for (completed, total) in log {
            assert!(completed <= total, "completed {completed} > total {total}");
        }
        for window in log.windows(2) {
            assert!(window[0].0 <= window[1].0);
            assert!(window[0].1 <= window[1].1);
        }
    }

    #[tokio::test]
    async fn test_scenario_single_depth() {
        let search = Arc::new(ScriptedSearch::ok());
        let provider = Arc::new(ScriptedProvider::new(vec![(
            "Q1".to_string(),
            ScriptedProvider::analysis_body("L1", &[("Q2", "G2")]),
        )]));
        let orchestrator = ResearchOrchestrator::new(
            search.clone(),
            provider.clone(),
            config(1, 1),
        )
        .unwrap_or_else(|_| unreachable!());

        let mut research = seed(&[("Q1", "G1")]);
        let (seen, observer) = recording_observer();
        let outcome = orchestrator
            .run(&mut research, Some(observer))
            .await
            .unwrap_or_else(|e| unreachable!("run failed: {e}"));

        // Exactly one search+reasoning round; follow-ups discarded at the
        // depth ceiling.
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.analyst_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.reporter_calls.load(Ordering::SeqCst), 1);
        assert_eq!(research.queries.len(), 1);
        assert_eq!(research.learnings, vec!["L1".to_string()]);
        assert_eq!(research.status, ResearchStatus::Done);
        assert_eq!(outcome.report, "# Findings\nthe report body");
        assert_eq!(outcome.queries_dispatched, 1);
        assert_eq!(outcome.queries_failed, 0);
        assert_eq!(outcome.depths_completed, 1);

        let log = seen.lock().unwrap_or_else(|p| p.into_inner());
        assert_counters_monotonic(&log);
        assert_eq!(log.last().copied(), Some((1, 1)));
    }

    #[tokio::test]
    async fn test_scenario_expansion_two_depths() {
        // Each of the two seed items yields exactly one follow-up.
        let search = Arc::new(ScriptedSearch::ok());
        let provider = Arc::new(ScriptedProvider::new(vec![
            (
                "QA".to_string(),
                ScriptedProvider::analysis_body("LA", &[("QA2", "GA2")]),
            ),
            (
                "QB".to_string(),
                ScriptedProvider::analysis_body("LB", &[("QB2", "GB2")]),
            ),
        ]));
        let orchestrator = ResearchOrchestrator::new(
            search.clone(),
            provider.clone(),
            config(2, 2),
        )
        .unwrap_or_else(|_| unreachable!());

        let mut research = seed(&[("QA", "GA"), ("QB", "GB")]);
        let (seen, observer) = recording_observer();
        let outcome = orchestrator
            .run(&mut research, Some(observer))
            .await
            .unwrap_or_else(|e| unreachable!("run failed: {e}"));

        // Frontier sizes [2, 2]: four items processed across two depths.
        assert_eq!(search.calls.load(Ordering::SeqCst), 4);
        assert_eq!(provider.analyst_calls.load(Ordering::SeqCst), 4);
        assert_eq!(research.queries.len(), 4);
        assert_eq!(outcome.queries_dispatched, 4);
        assert_eq!(outcome.depths_completed, 2);
        // The "QA"/"QB" markers also match the depth-2 queries "QA2" and
        // "QB2", so the same learnings accumulate again: the engine
        // performs no deduplication. Depth-2 follow-ups are discarded at
        // the ceiling, which is why the loop still terminates.
        assert_eq!(
            research.learnings,
            vec![
                "LA".to_string(),
                "LB".to_string(),
                "LA".to_string(),
                "LB".to_string(),
            ]
        );

        let log = seen.lock().unwrap_or_else(|p| p.into_inner());
        assert_counters_monotonic(&log);
        assert_eq!(log.last().copied(), Some((4, 4)));
    }

    #[tokio::test]
    async fn test_scenario_search_failure_isolation() {
        let search = Arc::new(ScriptedSearch::failing_for(&["BAD"]));
        let provider = Arc::new(ScriptedProvider::new(vec![(
            "GOOD".to_string(),
            ScriptedProvider::analysis_body("from the good item", &[]),
        )]));
        let orchestrator = ResearchOrchestrator::new(
            search.clone(),
            provider.clone(),
            config(1, 2),
        )
        .unwrap_or_else(|_| unreachable!());

        let mut research = seed(&[("BAD", "G"), ("GOOD", "G")]);
        let outcome = orchestrator
            .run(&mut research, None)
            .await
            .unwrap_or_else(|e| unreachable!("run failed: {e}"));

        // The failing item contributes nothing; the session still
        // completes with a valid report.
        assert_eq!(outcome.queries_failed, 1);
        assert_eq!(research.learnings, vec!["from the good item".to_string()]);
        assert_eq!(research.status, ResearchStatus::Done);
        assert!(!outcome.report.is_empty());
        // Failed search never reaches the reasoning provider.
        assert_eq!(provider.analyst_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_scenario_retry_exhaustion_isolation() {
        let search = Arc::new(ScriptedSearch::ok());
        // "NOISY" gets a body with no output block: parse fails every
        // attempt. The other item succeeds.
        let provider = Arc::new(ScriptedProvider::new(vec![
            ("NOISY".to_string(), "garbled nonsense".to_string()),
            (
                "CLEAN".to_string(),
                ScriptedProvider::analysis_body("clean fact", &[]),
            ),
        ]));
        let orchestrator = ResearchOrchestrator::new(
            search.clone(),
            provider.clone(),
            config(1, 2),
        )
        .unwrap_or_else(|_| unreachable!());

        let mut research = seed(&[("NOISY", "G"), ("CLEAN", "G")]);
        let (seen, observer) = recording_observer();
        let outcome = orchestrator
            .run(&mut research, Some(observer))
            .await
            .unwrap_or_else(|e| unreachable!("run failed: {e}"));

        // 3 attempts for the noisy item + 1 for the clean one.
        assert_eq!(provider.analyst_calls.load(Ordering::SeqCst), 4);
        assert_eq!(outcome.queries_failed, 1);
        assert_eq!(research.learnings, vec!["clean fact".to_string()]);
        assert_eq!(research.status, ResearchStatus::Done);

        let log = seen.lock().unwrap_or_else(|p| p.into_inner());
        assert_counters_monotonic(&log);
        assert_eq!(log.last().copied(), Some((2, 2)));
    }

    #[tokio::test]
    async fn test_dispatch_respects_concurrency_bound() {
        /// Search provider that records how many executors are inside
        /// their external call at once.
        struct GaugedSearch {
            in_flight: AtomicUsize,
            peak: AtomicUsize,
        }

        #[async_trait]
        impl SearchProvider for GaugedSearch {
            fn name(&self) -> &'static str {
                "gauged"
            }

            async fn search(
                &self,
                _query: &str,
                _options: &SearchOptions,
            ) -> Result<Vec<SearchRecord>, ResearchError> {
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(Vec::new())
            }
        }

        let search = Arc::new(GaugedSearch {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let provider = Arc::new(ScriptedProvider::new(Vec::new()));
        let orchestrator =
            ResearchOrchestrator::new(search.clone(), provider, config(1, 2))
                .unwrap_or_else(|_| unreachable!());

        let mut research = seed(&[
            ("Q1", "G"),
            ("Q2", "G"),
            ("Q3", "G"),
            ("Q4", "G"),
            ("Q5", "G"),
            ("Q6", "G"),
        ]);
        let outcome = orchestrator
            .run(&mut research, None)
            .await
            .unwrap_or_else(|e| unreachable!("run failed: {e}"));

        assert!(search.peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(outcome.queries_dispatched, 6);
    }

    #[tokio::test]
    async fn test_synthesis_failure_is_terminal() {
        /// Provider whose reporter response has no `</think>` marker.
        struct MarkerlessProvider;

        #[async_trait]
        impl LlmProvider for MarkerlessProvider {
            fn name(&self) -> &'static str {
                "markerless"
            }

            async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ResearchError> {
                let system = &request.messages[0].content;
                let content = if system.contains("research reporter") {
                    "prose without any marker".to_string()
                } else {
                    ScriptedProvider::empty_body()
                };
                Ok(ChatResponse {
                    content,
                    usage: TokenUsage::default(),
                    finish_reason: None,
                })
            }
        }

        let orchestrator = ResearchOrchestrator::new(
            Arc::new(ScriptedSearch::ok()),
            Arc::new(MarkerlessProvider),
            config(1, 1),
        )
        .unwrap_or_else(|_| unreachable!());

        let mut research = seed(&[("Q1", "G1")]);
        let result = orchestrator.run(&mut research, None).await;

        assert!(matches!(result, Err(ResearchError::Synthesis { .. })));
        // Status stays in progress when synthesis fails.
        assert_eq!(research.status, ResearchStatus::InProgress);
    }

    #[tokio::test]
    async fn test_frontier_exhaustion_before_depth_bound() {
        // No analyst call yields follow-ups: the frontier exhausts after
        // depth 1 even though the bound allows 3, and the report is
        // still produced.
        let search = Arc::new(ScriptedSearch::ok());
        let provider = Arc::new(ScriptedProvider::new(Vec::new()));
        let orchestrator = ResearchOrchestrator::new(
            search,
            provider.clone(),
            config(3, 1),
        )
        .unwrap_or_else(|_| unreachable!());

        let mut research = seed(&[("Q1", "G1")]);
        let outcome = orchestrator
            .run(&mut research, None)
            .await
            .unwrap_or_else(|e| unreachable!("run failed: {e}"));

        // Depth 1 ran; no follow-ups, so depths 2..3 never dispatched.
        assert_eq!(outcome.depths_completed, 1);
        assert_eq!(provider.reporter_calls.load(Ordering::SeqCst), 1);
        assert_eq!(research.status, ResearchStatus::Done);
    }
}
