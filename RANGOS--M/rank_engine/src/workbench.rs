use crate::{
    error::RankError,
    point::{render_points, Point, PointSet, SetRole},
    runtime::{RankReport, RankRuntime},
    strategy::RankStrategy,
};

/// Built-in reference set A.
pub const EXAMPLE_REFERENCE: [Point; 3] = [
    Point::new(0.5, 3.0),
    Point::new(0.1, 1.0),
    Point::new(0.3, 0.2),
];

/// Built-in query set B.
pub const EXAMPLE_QUERY: [Point; 3] = [
    Point::new(1.5, 3.5),
    Point::new(1.8, 1.2),
    Point::new(1.1, 0.4),
];

/// Owned copies of the example sets, `(A, B)`.
#[must_use]
pub fn example_pair() -> (PointSet, PointSet) {
    (EXAMPLE_REFERENCE.to_vec(), EXAMPLE_QUERY.to_vec())
}

/// The two point sets an interactive session edits.
#[derive(Debug, Clone, PartialEq)]
pub struct Workbench {
    reference: PointSet,
    query: PointSet,
}

impl Default for Workbench {
    fn default() -> Self {
        let (reference, query) = example_pair();
        Self { reference, query }
    }
}

impl Workbench {
    /// Starts from the example pair.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from explicit sets.
    #[must_use]
    pub fn with_sets(reference: PointSet, query: PointSet) -> Self {
        Self { reference, query }
    }

    /// Reference set A.
    #[must_use]
    pub fn reference(&self) -> &[Point] {
        &self.reference
    }

    /// Query set B.
    #[must_use]
    pub fn query(&self) -> &[Point] {
        &self.query
    }

    /// Set playing `role`.
    #[must_use]
    pub fn set(&self, role: SetRole) -> &[Point] {
        match role {
            SetRole::Reference => &self.reference,
            SetRole::Query => &self.query,
        }
    }

    /// Replaces A entirely.
    pub fn replace_reference(&mut self, points: PointSet) {
        self.reference = points;
    }

    /// Replaces B entirely.
    pub fn replace_query(&mut self, points: PointSet) {
        self.query = points;
    }

    /// Replaces the set playing `role`.
    pub fn replace(&mut self, role: SetRole, points: PointSet) {
        match role {
            SetRole::Reference => self.replace_reference(points),
            SetRole::Query => self.replace_query(points),
        }
    }

    /// Restores the example pair.
    pub fn reset_to_example(&mut self) {
        *self = Self::default();
    }

    /// Ranks B against A. Either set being empty is rejected before the
    /// runtime is called.
    pub fn compute(
        &self,
        runtime: &RankRuntime,
        strategy: RankStrategy,
    ) -> Result<RankReport, RankError> {
        if self.reference.is_empty() {
            return Err(RankError::EmptySet(SetRole::Reference));
        }
        if self.query.is_empty() {
            return Err(RankError::EmptySet(SetRole::Query));
        }
        runtime.rank(strategy, &self.reference, &self.query)
    }

    /// Listing of both sets.
    #[must_use]
    pub fn render_sets(&self, reference_label: &str, query_label: &str) -> String {
        format!(
            "{}\n{}",
            render_points(&self.reference, reference_label),
            render_points(&self.query, query_label)
        )
    }
}

/// One line per query point: ` B[i] = (x, y)  =>  rank = r`.
#[must_use]
pub fn render_results(report: &RankReport) -> String {
    let mut out = format!("Results ({}):\n", report.strategy.description());
    for entry in &report.entries {
        out.push_str(&format!(
            " B[{}] = {}  =>  rank = {}\n",
            entry.index, entry.point, entry.rank
        ));
    }
    out
}
