//! Deterministic random-forest binary classifier.
//!
//! Model:
//! - `n_estimators` CART trees, each grown on a bootstrap resample.
//! - Splits minimise weighted Gini impurity over `max_features` randomly
//!   drawn features; thresholds are midpoints between adjacent distinct values.
//! - Leaves keep integer class counts, so a serialized forest reloads
//!   bit-for-bit and classifies identically.
//!
//! Two outputs are exposed and they can disagree near the boundary:
//! `predict_probability` averages leaf fractions, while `predict` is a majority
//! vote of per-tree hard labels.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::features::FEATURE_COUNT;
use crate::result::AiError;

/// Hard-label + probability contract the risk models are written against.
pub trait BinaryClassifier: Send + Sync {
    /// Native hard label.
    fn predict(&self, x: &[f64; FEATURE_COUNT]) -> bool;

    /// Probability of the positive class, in \[0, 1\].
    fn predict_probability(&self, x: &[f64; FEATURE_COUNT]) -> f64;
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Features considered per split (`floor(sqrt(FEATURE_COUNT))` by default).
    pub max_features: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 120,
            max_depth: 6,
            min_samples_split: 2,
            max_features: 2,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        negatives: u32,
        positives: u32,
    },
}

/// A single CART tree stored as an arena; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn leaf_for(&self, x: &[f64; FEATURE_COUNT]) -> (u32, u32) {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf {
                    negatives,
                    positives,
                } => return (*negatives, *positives),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn predict(&self, x: &[f64; FEATURE_COUNT]) -> bool {
        let (negatives, positives) = self.leaf_for(x);
        positives > negatives
    }

    pub fn predict_probability(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        let (negatives, positives) = self.leaf_for(x);
        let total = negatives + positives;
        if total == 0 {
            return 0.0;
        }
        f64::from(positives) / f64::from(total)
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }

    /// Structural check for trees that came from outside this process.
    ///
    /// Children must point strictly forward (no cycles), feature indices must
    /// be in range, and thresholds must be finite.
    pub fn validate(&self) -> Result<(), AiError> {
        if self.nodes.is_empty() {
            return Err(AiError::MalformedModel("tree has no nodes".to_string()));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                threshold,
                left,
                right,
            } = node
            {
                if *feature >= FEATURE_COUNT {
                    return Err(AiError::MalformedModel(format!(
                        "node {idx} splits on feature {feature} (only {FEATURE_COUNT} exist)"
                    )));
                }
                if !threshold.is_finite() {
                    return Err(AiError::MalformedModel(format!("node {idx} has a non-finite threshold")));
                }
                for child in [*left, *right] {
                    if child <= idx || child >= self.nodes.len() {
                        return Err(AiError::MalformedModel(format!(
                            "node {idx} has out-of-order child {child}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Bagged ensemble of [`DecisionTree`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit a forest. Deterministic for identical rows, labels and `params.seed`.
    pub fn fit(
        rows: &[[f64; FEATURE_COUNT]],
        labels: &[bool],
        params: ForestParams,
    ) -> Result<Self, AiError> {
        if rows.is_empty() {
            return Err(AiError::InvalidInput("no training rows".to_string()));
        }
        if rows.len() != labels.len() {
            return Err(AiError::InvalidInput(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if params.n_estimators == 0 {
            return Err(AiError::InvalidInput("n_estimators must be >= 1".to_string()));
        }
        if params.max_features == 0 || params.max_features > FEATURE_COUNT {
            return Err(AiError::InvalidInput(format!(
                "max_features must be within 1..={FEATURE_COUNT}"
            )));
        }
        if rows.iter().flatten().any(|v| !v.is_finite()) {
            return Err(AiError::InvalidInput("feature values must be finite".to_string()));
        }

        let mut rng = StdRng::seed_from_u64(params.seed);
        let n = rows.len();
        let mut trees = Vec::with_capacity(params.n_estimators);

        for _ in 0..params.n_estimators {
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let mut grower = TreeGrower {
                rows,
                labels,
                params: &params,
                rng: &mut rng,
                nodes: Vec::new(),
            };
            grower.grow(&sample, 0);
            trees.push(DecisionTree {
                nodes: grower.nodes,
            });
        }

        Ok(Self { params, trees })
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn validate(&self) -> Result<(), AiError> {
        if self.trees.is_empty() {
            return Err(AiError::MalformedModel("forest has no trees".to_string()));
        }
        for tree in &self.trees {
            tree.validate()?;
        }
        Ok(())
    }
}

impl BinaryClassifier for RandomForest {
    fn predict(&self, x: &[f64; FEATURE_COUNT]) -> bool {
        let votes = self.trees.iter().filter(|t| t.predict(x)).count();
        votes * 2 > self.trees.len()
    }

    fn predict_probability(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict_probability(x)).sum();
        sum / self.trees.len() as f64
    }
}

struct TreeGrower<'a> {
    rows: &'a [[f64; FEATURE_COUNT]],
    labels: &'a [bool],
    params: &'a ForestParams,
    rng: &'a mut StdRng,
    nodes: Vec<Node>,
}

struct Candidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl TreeGrower<'_> {
    fn counts(&self, sample: &[usize]) -> (u32, u32) {
        let positives = sample.iter().filter(|&&i| self.labels[i]).count() as u32;
        (sample.len() as u32 - positives, positives)
    }

    fn push_leaf(&mut self, (negatives, positives): (u32, u32)) -> usize {
        self.nodes.push(Node::Leaf {
            negatives,
            positives,
        });
        self.nodes.len() - 1
    }

    fn grow(&mut self, sample: &[usize], depth: usize) -> usize {
        let counts = self.counts(sample);
        let pure = counts.0 == 0 || counts.1 == 0;
        if pure || depth >= self.params.max_depth || sample.len() < self.params.min_samples_split {
            return self.push_leaf(counts);
        }

        let Some(best) = self.best_split(sample) else {
            return self.push_leaf(counts);
        };

        // Reserve the slot so children get larger indices than their parent.
        let idx = self.push_leaf(counts);

        let (left, right): (Vec<usize>, Vec<usize>) = sample
            .iter()
            .partition(|&&i| self.rows[i][best.feature] <= best.threshold);

        let left = self.grow(&left, depth + 1);
        let right = self.grow(&right, depth + 1);
        self.nodes[idx] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        idx
    }

    /// Draw features in random order and evaluate the first `max_features`
    /// that are not constant within `sample`.
    fn best_split(&mut self, sample: &[usize]) -> Option<Candidate> {
        let mut order: Vec<usize> = (0..FEATURE_COUNT).collect();
        order.shuffle(&mut *self.rng);

        let mut best: Option<Candidate> = None;
        let mut visited = 0;

        for feature in order {
            if visited >= self.params.max_features {
                break;
            }

            let mut values: Vec<(f64, bool)> = sample
                .iter()
                .map(|&i| (self.rows[i][feature], self.labels[i]))
                .collect();
            values.sort_by(|a, b| a.0.total_cmp(&b.0));

            if values.first().map(|v| v.0) == values.last().map(|v| v.0) {
                continue;
            }
            visited += 1;

            if let Some(candidate) = best_threshold(feature, &values) {
                if best.as_ref().is_none_or(|b| candidate.impurity < b.impurity) {
                    best = Some(candidate);
                }
            }
        }

        best
    }
}

/// Sweep sorted `(value, label)` pairs and return the lowest-impurity cut.
fn best_threshold(feature: usize, sorted: &[(f64, bool)]) -> Option<Candidate> {
    let total = sorted.len() as f64;
    let total_pos = sorted.iter().filter(|v| v.1).count() as f64;

    let mut left_n = 0.0;
    let mut left_pos = 0.0;
    let mut best: Option<Candidate> = None;

    for pair in sorted.windows(2) {
        let (value, label) = pair[0];
        left_n += 1.0;
        if label {
            left_pos += 1.0;
        }

        let next = pair[1].0;
        if next <= value {
            continue;
        }

        let right_n = total - left_n;
        let right_pos = total_pos - left_pos;
        let impurity =
            (left_n * gini(left_pos, left_n) + right_n * gini(right_pos, right_n)) / total;

        if best.as_ref().is_none_or(|b| impurity < b.impurity) {
            best = Some(Candidate {
                feature,
                threshold: (value + next) / 2.0,
                impurity,
            });
        }
    }

    best
}

fn gini(positives: f64, n: f64) -> f64 {
    if n == 0.0 {
        return 0.0;
    }
    let p = positives / n;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}
