//! Precision/recall evaluation against ground-truth classes

use std::collections::HashSet;

use indicatif::ProgressBar;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{CbirError, Result};
use crate::ground_truth::{ClassLabel, GroundTruthCatalog};
use crate::search::SearchEngine;

/// Precision and recall at one retrieval depth.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PrecisionRecallPoint {
    pub precision: f64,
    pub recall: f64,
}

impl PrecisionRecallPoint {
    pub fn new(precision: f64, recall: f64) -> Self {
        Self { precision, recall }
    }

    /// Harmonic mean of precision and recall, 0 when both are 0.
    pub fn f1(&self) -> f64 {
        let denom = self.precision + self.recall;
        if denom == 0.0 {
            0.0
        } else {
            2.0 * self.precision * self.recall / denom
        }
    }
}

/// Points indexed by depth: `points()[k - 1]` holds depth `k`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Curve {
    points: Vec<PrecisionRecallPoint>,
}

impl Curve {
    pub fn new(points: Vec<PrecisionRecallPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PrecisionRecallPoint] {
        &self.points
    }

    /// Point at depth `k` (1-based).
    pub fn at_depth(&self, k: usize) -> Option<&PrecisionRecallPoint> {
        k.checked_sub(1).and_then(|i| self.points.get(i))
    }

    /// Elementwise sum of two curves of equal length.
    pub fn merge(&self, other: &Curve) -> Result<Curve> {
        if self.len() != other.len() {
            return Err(CbirError::CurveLengthMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(Curve::new(
            self.points
                .iter()
                .zip(&other.points)
                .map(|(a, b)| {
                    PrecisionRecallPoint::new(a.precision + b.precision, a.recall + b.recall)
                })
                .collect(),
        ))
    }

    /// Divide every point by `class_count`, turning a merged sum into a mean.
    pub fn mean(&self, class_count: usize) -> Curve {
        let n = class_count as f64;
        Curve::new(
            self.points
                .iter()
                .map(|p| PrecisionRecallPoint::new(p.precision / n, p.recall / n))
                .collect(),
        )
    }

    /// Rows of `[precision, recall, f1]`.
    pub fn with_f1(&self) -> Vec<[f64; 3]> {
        self.points
            .iter()
            .map(|p| [p.precision, p.recall, p.f1()])
            .collect()
    }

    /// Rows of `[precision, recall]`.
    pub fn rows(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| [p.precision, p.recall]).collect()
    }
}

/// Runs class queries through a search engine and scores the rankings.
#[derive(Debug, Clone)]
pub struct Evaluator {
    engine: SearchEngine,
    catalog: GroundTruthCatalog,
}

impl Evaluator {
    pub fn new(engine: SearchEngine, catalog: GroundTruthCatalog) -> Self {
        Self { engine, catalog }
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    pub fn catalog(&self) -> &GroundTruthCatalog {
        &self.catalog
    }

    /// Precision/recall at every depth `1..=n`, querying with the class's
    /// first member. `n` of `None` or 0 means the whole image catalog.
    pub fn compute_precision_recall(&self, class: &ClassLabel, n: Option<usize>) -> Result<Curve> {
        let Some(query) = class.first_member() else {
            return Err(CbirError::DegenerateClass {
                name: class.name().to_owned(),
            });
        };
        let n = n
            .filter(|&n| n > 0)
            .unwrap_or_else(|| self.engine.catalog().count());

        let ranking = self.engine.search(query, Some(n));
        if ranking.is_empty() {
            return Err(CbirError::not_found(format!(
                "query image {} of class {}",
                query,
                class.name()
            )));
        }

        let members: HashSet<&str> = class.members().iter().map(String::as_str).collect();
        let class_size = class.size() as f64;

        let mut points = Vec::with_capacity(n);
        let mut true_positives = 0usize;
        for k in 1..=n {
            // depths beyond the ranking reuse the full ranking
            if let Some(record) = ranking.get(k - 1) {
                if members.contains(record.name.as_str()) {
                    true_positives += 1;
                }
            }
            let retrieved = k.min(ranking.len()) as f64;
            points.push(PrecisionRecallPoint::new(
                true_positives as f64 / retrieved,
                true_positives as f64 / class_size,
            ));
        }

        debug!(
            "class {}: {} of {} members in top {}",
            class.name(),
            true_positives,
            class.size(),
            n
        );
        Ok(Curve::new(points))
    }

    /// Mean curve over `classes`, merged one class at a time.
    pub fn evaluate_classes<I>(
        &self,
        classes: I,
        n: Option<usize>,
        progress: Option<&ProgressBar>,
    ) -> Result<Curve>
    where
        I: IntoIterator<Item = ClassLabel>,
    {
        let mut sum: Option<Curve> = None;
        let mut count = 0usize;

        for class in classes {
            let curve = self.compute_precision_recall(&class, n)?;
            sum = Some(match sum {
                None => curve,
                Some(acc) => acc.merge(&curve)?,
            });
            count += 1;
            if let Some(pb) = progress {
                pb.inc(1);
            }
        }

        let sum = sum.ok_or_else(|| CbirError::not_found("ground-truth classes to evaluate"))?;
        info!("evaluated {} classes at depth {}", count, sum.len());
        Ok(sum.mean(count))
    }

    /// Evaluate one named class, or every class when `class_name` is `None`.
    pub fn evaluate(
        &self,
        class_name: Option<&str>,
        n: Option<usize>,
        progress: Option<&ProgressBar>,
    ) -> Result<Curve> {
        match class_name {
            Some(name) => {
                let class = self.catalog.get_or_err(name)?;
                self.evaluate_classes(std::iter::once(class), n, progress)
            }
            None => self.evaluate_classes(self.catalog.all(), n, progress),
        }
    }
}
