//! Route detection and the ordered fallback chain.
//!
//! ## States
//! `LOADED → CHECK_COLD_START → {COLD_START | INSUFFICIENT_POPULATION |
//! COLLABORATIVE} → RANKED → (FALLBACK_ON_EMPTY)? → DONE`
//!
//! The route decides which strategies apply; the chain then tries every
//! applicable strategy in order and keeps the first non-empty ranking.
//! With the standard chain that gives:
//! - collaborative route: collaborative, then cold start, then popularity
//! - cold start / insufficient population: cold start (major known), then
//!   popularity

use anyhow::{Context, Result};
use data_loader::{CourseIdx, InteractionMatrix};
use sources::{
    Candidate, CandidateSource, ColdStartStrategy, CollaborativeStrategy, PopularityStrategy,
    RankingContext, RankingStrategy, Route, StudentContext,
};
use tracing::{debug, instrument, warn};

/// Fewest students for pairwise similarity to mean anything
pub const MIN_POPULATION: usize = 2;

/// Pick the route for a request.
///
/// Checked in order: too little history, too few students, otherwise
/// collaborative.
pub fn detect_route(
    student: &StudentContext,
    matrix: &InteractionMatrix,
    cold_start_threshold: usize,
) -> Route {
    if student.is_cold_start(cold_start_threshold) {
        Route::ColdStart
    } else if matrix.num_students() < MIN_POPULATION {
        Route::InsufficientPopulation
    } else {
        Route::Collaborative
    }
}

/// Result of running the chain
#[derive(Debug, Clone, PartialEq)]
pub struct ChainResult {
    pub route: Route,
    /// Strategy that produced the ranking; `None` when every strategy came
    /// back empty
    pub source: Option<CandidateSource>,
    pub candidates: Vec<Candidate>,
}

impl ChainResult {
    pub fn empty(route: Route) -> Self {
        Self {
            route,
            source: None,
            candidates: Vec::new(),
        }
    }
}

/// Ordered list of ranking strategies.
///
/// ## Usage
/// ```ignore
/// let chain = StrategyChain::new()
///     .add_strategy(CollaborativeStrategy::new())
///     .add_strategy(ColdStartStrategy::new())
///     .add_strategy(PopularityStrategy::new());
///
/// let result = chain.rank(&pool, &ctx)?;
/// ```
pub struct StrategyChain {
    strategies: Vec<Box<dyn RankingStrategy>>,
}

impl StrategyChain {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Collaborative, then cold start, then popularity
    pub fn standard(
        collaborative: CollaborativeStrategy,
        cold_start: ColdStartStrategy,
    ) -> Self {
        Self::new()
            .add_strategy(collaborative)
            .add_strategy(cold_start)
            .add_strategy(PopularityStrategy::new())
    }

    /// Append a strategy (builder pattern)
    pub fn add_strategy(mut self, strategy: impl RankingStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run applicable strategies in order; the first non-empty ranking wins.
    ///
    /// An empty pool short-circuits to an empty result. A strategy error
    /// aborts the chain.
    #[instrument(skip(self, pool, ctx), fields(route = ?ctx.route, pool = pool.len()))]
    pub fn rank(&self, pool: &[CourseIdx], ctx: &RankingContext<'_>) -> Result<ChainResult> {
        if pool.is_empty() {
            debug!("Candidate pool is empty, nothing to rank");
            return Ok(ChainResult::empty(ctx.route));
        }

        for strategy in &self.strategies {
            if !strategy.is_applicable(ctx) {
                debug!("Skipping {}: not applicable", strategy.name());
                continue;
            }

            let candidates = strategy
                .rank(pool, ctx)
                .with_context(|| format!("{} failed", strategy.name()))?;

            if candidates.is_empty() {
                debug!("{} produced no candidates, falling through", strategy.name());
                continue;
            }

            debug!("{} produced {} candidates", strategy.name(), candidates.len());
            return Ok(ChainResult {
                route: ctx.route,
                source: Some(strategy.source()),
                candidates,
            });
        }

        warn!("Every strategy came back empty for a pool of {}", pool.len());
        Ok(ChainResult::empty(ctx.route))
    }
}

impl Default for StrategyChain {
    fn default() -> Self {
        Self::standard(CollaborativeStrategy::new(), ColdStartStrategy::new())
    }
}
