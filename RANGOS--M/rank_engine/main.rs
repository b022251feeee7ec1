//! Rank runtime: validation, work limits and telemetry around the pure strategies.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::json;
use shared_logging::LogLevel;
use uuid::Uuid;

use crate::{
    config::EngineConfig,
    error::RankError,
    point::{Point, SetRole},
    ranks::{compute_ranks, RankResult},
    strategy::RankStrategy,
    telemetry::RankTelemetry,
};

/// Rank of one query point, kept next to the point for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPoint {
    /// Position in the query set.
    pub index: usize,
    /// The query point.
    pub point: Point,
    /// Number of reference points with a strictly smaller `y`.
    pub rank: usize,
}

/// Outcome of one rank computation.
#[derive(Debug, Clone, Serialize)]
pub struct RankReport {
    /// Unique run id.
    pub run_id: Uuid,
    /// Strategy that produced the ranks.
    pub strategy: RankStrategy,
    /// When the computation finished.
    pub computed_at: DateTime<Utc>,
    /// |A|.
    pub reference_len: usize,
    /// Wall time spent in the strategy, in milliseconds.
    pub elapsed_ms: f64,
    /// Per-query entries, in query order.
    pub entries: Vec<RankedPoint>,
}

impl RankReport {
    fn new(
        strategy: RankStrategy,
        reference_len: usize,
        query: &[Point],
        ranks: RankResult,
        elapsed: Duration,
    ) -> Self {
        let entries = query
            .iter()
            .zip(ranks)
            .enumerate()
            .map(|(index, (point, rank))| RankedPoint {
                index,
                point: *point,
                rank,
            })
            .collect();
        Self {
            run_id: Uuid::new_v4(),
            strategy,
            computed_at: Utc::now(),
            reference_len,
            elapsed_ms: millis(elapsed),
            entries,
        }
    }

    /// Bare ranks, aligned with the query set.
    #[must_use]
    pub fn ranks(&self) -> RankResult {
        self.entries.iter().map(|entry| entry.rank).collect()
    }
}

/// Both strategies run over the same input.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyComparison {
    /// Brute-force ranks.
    pub brute_force: RankResult,
    /// Sorted-strategy ranks.
    pub sorted: RankResult,
    /// First query index where the strategies disagree.
    pub first_mismatch: Option<usize>,
    /// Elapsed milliseconds keyed by strategy label.
    pub timings_ms: IndexMap<String, f64>,
}

impl StrategyComparison {
    /// True when both strategies produced the same ranks.
    #[must_use]
    pub fn agrees(&self) -> bool {
        self.first_mismatch.is_none() && self.brute_force.len() == self.sorted.len()
    }
}

/// Rank runtime guarding the pure strategy functions.
#[derive(Debug)]
pub struct RankRuntime {
    config: EngineConfig,
    telemetry: Option<RankTelemetry>,
}

impl RankRuntime {
    /// Returns a builder.
    #[must_use]
    pub fn builder() -> RankRuntimeBuilder {
        RankRuntimeBuilder::default()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns telemetry handle.
    #[must_use]
    pub const fn telemetry(&self) -> Option<&RankTelemetry> {
        self.telemetry.as_ref()
    }

    /// Ranks `query` against `reference` with the configured default strategy.
    pub fn rank_default(
        &self,
        reference: &[Point],
        query: &[Point],
    ) -> Result<RankReport, RankError> {
        self.rank(self.config.default_strategy, reference, query)
    }

    /// Ranks `query` against `reference`.
    ///
    /// Fails with [`RankError::NonFiniteCoordinate`] on NaN or infinite `y`
    /// and with [`RankError::WorkLimitExceeded`] when brute force would do
    /// more comparisons than configured. Empty sets are valid.
    pub fn rank(
        &self,
        strategy: RankStrategy,
        reference: &[Point],
        query: &[Point],
    ) -> Result<RankReport, RankError> {
        self.guard(strategy, reference, query)?;
        self.log(
            LogLevel::Debug,
            "rank.compute.start",
            json!({
                "strategy": strategy.label(),
                "reference": reference.len(),
                "query": query.len(),
            }),
        );
        let (ranks, elapsed) = timed(strategy, reference, query);
        let report = RankReport::new(strategy, reference.len(), query, ranks, elapsed);
        self.log(
            LogLevel::Info,
            "rank.compute.complete",
            json!({
                "run_id": report.run_id,
                "strategy": strategy.label(),
                "reference": reference.len(),
                "query": query.len(),
                "elapsed_ms": report.elapsed_ms,
            }),
        );
        Ok(report)
    }

    /// Runs both strategies on the same input and reports whether they agree.
    pub fn compare(
        &self,
        reference: &[Point],
        query: &[Point],
    ) -> Result<StrategyComparison, RankError> {
        self.guard(RankStrategy::BruteForce, reference, query)?;
        let mut timings_ms = IndexMap::new();
        let (brute_force, brute_elapsed) = timed(RankStrategy::BruteForce, reference, query);
        timings_ms.insert(RankStrategy::BruteForce.label().to_string(), millis(brute_elapsed));
        let (sorted, sorted_elapsed) = timed(RankStrategy::Sorted, reference, query);
        timings_ms.insert(RankStrategy::Sorted.label().to_string(), millis(sorted_elapsed));
        let first_mismatch = brute_force
            .iter()
            .zip(&sorted)
            .position(|(brute, fast)| brute != fast);
        let comparison = StrategyComparison {
            brute_force,
            sorted,
            first_mismatch,
            timings_ms,
        };
        let level = if comparison.agrees() {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };
        self.log(
            level,
            "rank.compare.complete",
            json!({
                "reference": reference.len(),
                "query": query.len(),
                "agrees": comparison.agrees(),
                "first_mismatch": comparison.first_mismatch,
                "timings_ms": comparison.timings_ms,
            }),
        );
        Ok(comparison)
    }

    fn guard(
        &self,
        strategy: RankStrategy,
        reference: &[Point],
        query: &[Point],
    ) -> Result<(), RankError> {
        let checked = ensure_finite(SetRole::Reference, reference)
            .and_then(|()| ensure_finite(SetRole::Query, query))
            .and_then(|()| match strategy {
                RankStrategy::BruteForce => self.ensure_work_budget(reference.len(), query.len()),
                RankStrategy::Sorted => Ok(()),
            });
        if let Err(err) = &checked {
            self.log(
                LogLevel::Warn,
                "rank.compute.rejected",
                json!({ "strategy": strategy.label(), "error": err.to_string() }),
            );
        }
        checked
    }

    fn ensure_work_budget(&self, reference: usize, query: usize) -> Result<(), RankError> {
        let limit = self.config.max_brute_force_work;
        let work = to_u64(reference).saturating_mul(to_u64(query));
        if work > limit {
            return Err(RankError::WorkLimitExceeded {
                reference,
                query,
                limit,
            });
        }
        Ok(())
    }

    fn log(&self, level: LogLevel, message: &str, metadata: serde_json::Value) {
        if let Some(tel) = &self.telemetry {
            let _ = tel.log(level, message, metadata);
        }
    }
}

/// Builder for `RankRuntime`.
#[derive(Debug, Default)]
pub struct RankRuntimeBuilder {
    config: Option<EngineConfig>,
    telemetry: Option<RankTelemetry>,
}

impl RankRuntimeBuilder {
    /// Sets configuration.
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets telemetry.
    #[must_use]
    pub fn telemetry(mut self, telemetry: RankTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Builds the runtime, validating the configuration.
    pub fn build(self) -> anyhow::Result<RankRuntime> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        Ok(RankRuntime {
            config,
            telemetry: self.telemetry,
        })
    }
}

fn ensure_finite(role: SetRole, points: &[Point]) -> Result<(), RankError> {
    match points.iter().position(|p| !p.y().is_finite()) {
        Some(index) => Err(RankError::NonFiniteCoordinate {
            role,
            index,
            value: points[index].y(),
        }),
        None => Ok(()),
    }
}

fn timed(strategy: RankStrategy, reference: &[Point], query: &[Point]) -> (RankResult, Duration) {
    let started = Instant::now();
    let ranks = compute_ranks(strategy, reference, query);
    (ranks, started.elapsed())
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1_000.0
}

fn to_u64(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{generator::PointGenerator, workbench::example_pair};
    use shared_logging::MemoryLogSink;
    use std::sync::Arc;

    fn runtime_with_sink(config: EngineConfig) -> (RankRuntime, Arc<MemoryLogSink>) {
        let sink = Arc::new(MemoryLogSink::new());
        let telemetry = RankTelemetry::builder("rank-runtime")
            .sink(sink.clone())
            .build()
            .unwrap();
        let runtime = RankRuntime::builder()
            .config(config)
            .telemetry(telemetry)
            .build()
            .unwrap();
        (runtime, sink)
    }

    #[test]
    fn ranks_example_with_both_strategies() {
        let (reference, query) = example_pair();
        let (runtime, sink) = runtime_with_sink(EngineConfig::default());
        for strategy in RankStrategy::ALL {
            let report = runtime.rank(strategy, &reference, &query).unwrap();
            assert_eq!(report.ranks(), vec![3, 2, 1]);
            assert_eq!(report.strategy, strategy);
            assert_eq!(report.reference_len, 3);
            assert_eq!(report.entries[1].point, query[1]);
            assert_eq!(report.entries[1].index, 1);
        }
        let messages = sink.messages();
        assert_eq!(
            messages
                .iter()
                .filter(|m| *m == "rank.compute.complete")
                .count(),
            2
        );
    }

    #[test]
    fn default_strategy_comes_from_config() {
        let config = EngineConfig {
            default_strategy: RankStrategy::BruteForce,
            ..EngineConfig::default()
        };
        let (runtime, _) = runtime_with_sink(config);
        let report = runtime
            .rank_default(&[Point::new(0.0, 5.0)], &[Point::new(0.0, 5.0)])
            .unwrap();
        assert_eq!(report.strategy, RankStrategy::BruteForce);
        assert_eq!(report.ranks(), vec![0]);
    }

    #[test]
    fn empty_sets_are_not_errors() {
        let runtime = RankRuntime::builder().build().unwrap();
        let report = runtime
            .rank(RankStrategy::Sorted, &[], &[Point::new(0.0, 0.0)])
            .unwrap();
        assert_eq!(report.ranks(), vec![0]);
        let report = runtime
            .rank(RankStrategy::BruteForce, &[Point::new(0.0, 0.0)], &[])
            .unwrap();
        assert!(report.entries.is_empty());
    }

    #[test]
    fn rejects_non_finite_y() {
        let (runtime, sink) = runtime_with_sink(EngineConfig::default());
        let reference = vec![Point::new(0.0, 1.0), Point::new(0.0, f64::NAN)];
        let err = runtime
            .rank(RankStrategy::Sorted, &reference, &[Point::new(0.0, 2.0)])
            .unwrap_err();
        assert!(matches!(
            err,
            RankError::NonFiniteCoordinate {
                role: SetRole::Reference,
                index: 1,
                ..
            }
        ));
        let err = runtime
            .rank(
                RankStrategy::BruteForce,
                &[],
                &[Point::new(0.0, f64::INFINITY)],
            )
            .unwrap_err();
        assert!(matches!(
            err,
            RankError::NonFiniteCoordinate {
                role: SetRole::Query,
                index: 0,
                ..
            }
        ));
        assert!(sink.messages().iter().all(|m| m == "rank.compute.rejected"));
    }

    #[test]
    fn brute_force_respects_work_limit() {
        let config = EngineConfig {
            max_brute_force_work: 100,
            ..EngineConfig::default()
        };
        let (runtime, _) = runtime_with_sink(config);
        let reference = PointGenerator::new(1).generate(20, 0.0..1.0);
        let query = PointGenerator::new(2).generate(6, 0.0..1.0);
        let err = runtime
            .rank(RankStrategy::BruteForce, &reference, &query)
            .unwrap_err();
        assert_eq!(
            err,
            RankError::WorkLimitExceeded {
                reference: 20,
                query: 6,
                limit: 100
            }
        );
        assert!(runtime.rank(RankStrategy::Sorted, &reference, &query).is_ok());
        assert!(runtime
            .rank(RankStrategy::BruteForce, &reference, &query[..5])
            .is_ok());
        assert!(runtime.compare(&reference, &query).is_err());
    }

    #[test]
    fn compare_reports_agreement_and_timings() {
        let (runtime, sink) = runtime_with_sink(EngineConfig::default());
        let reference = PointGenerator::new(5)
            .with_quantization(0.1)
            .generate(200, -1.0..1.0);
        let query = PointGenerator::new(6).generate(150, -1.2..1.2);
        let comparison = runtime.compare(&reference, &query).unwrap();
        assert!(comparison.agrees());
        assert_eq!(comparison.brute_force, comparison.sorted);
        assert_eq!(comparison.sorted.len(), 150);
        assert_eq!(
            comparison.timings_ms.keys().collect::<Vec<_>>(),
            vec!["brute-force", "sorted"]
        );
        let record = sink
            .records()
            .into_iter()
            .find(|r| r.message == "rank.compare.complete")
            .unwrap();
        assert_eq!(record.level, LogLevel::Info);
        assert_eq!(record.metadata["agrees"], true);
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let config = EngineConfig {
            max_brute_force_work: 0,
            ..EngineConfig::default()
        };
        assert!(RankRuntime::builder().config(config).build().is_err());
    }

    #[test]
    fn report_serializes_to_json() {
        let runtime = RankRuntime::builder().build().unwrap();
        let (reference, query) = example_pair();
        let report = runtime.rank(RankStrategy::Sorted, &reference, &query).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["strategy"], "sorted");
        assert_eq!(value["entries"][0]["rank"], 3);
        assert_eq!(value["entries"][2]["point"]["y"], 0.4);
    }
}
