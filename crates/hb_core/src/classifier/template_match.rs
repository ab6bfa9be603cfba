//! Template-match strategy
//!
//! Six defenders are matched one-to-one against every template of the
//! frame's direction with the Hungarian algorithm; the template with the
//! smallest mean assigned distance wins.
//!
//! ## Selection
//! With more than six defenders, [`DefenderSelection::GoalSide`] uses the six
//! closest to the defended goal (RIGHT: largest x first, LEFT: smallest x
//! first, ties by y, then by player id). [`DefenderSelection::BestFit`] scores
//! every six-player subset of the [`BEST_FIT_POOL`] goal-side defenders and
//! keeps the smallest mean distance per template, so a goalkeeper standing on
//! the line does not distort the shape. Selections are put into canonical
//! order so the result never depends on feed order.
//!
//! ## Ties
//! Equal mean distances resolve to the template declared first in the
//! registry.

use std::cmp::Ordering;

use pathfinding::kuhn_munkres::kuhn_munkres_min;
use pathfinding::matrix::Matrix;

use super::{Classification, FormationStrategy};
use crate::config::DefenderSelection;
use crate::model::{Direction, PlayerObservation, UNKNOWN_LABEL};
use crate::templates::{FormationTemplate, Point, TemplateRegistry, TEMPLATE_POINTS};

/// Fixed-point scale for assignment costs (1e-6 court units)
const COST_SCALE: f64 = 1_000_000.0;

/// Upper bound for one scaled cost; six of them summed by the solver stay far
/// from overflowing `i64`.
const MAX_COST: i64 = i64::MAX / 64;

/// Defenders considered by best-fit selection (nearest the goal first).
pub const BEST_FIT_POOL: usize = 10;

/// Fit of the observed defenders to one template.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateScore {
    pub label: String,
    pub mean_distance: f64,
}

impl TemplateScore {
    #[inline]
    pub fn confidence(&self) -> f64 {
        1.0 / (1.0 + self.mean_distance)
    }
}

#[derive(Debug, Clone)]
pub struct TemplateMatchStrategy {
    templates: Vec<FormationTemplate>,
    selection: DefenderSelection,
}

impl TemplateMatchStrategy {
    pub fn new(registry: &TemplateRegistry) -> Self {
        Self {
            templates: registry.iter().cloned().collect(),
            selection: DefenderSelection::default(),
        }
    }

    pub fn with_selection(mut self, selection: DefenderSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Scores for every template of `direction`, in registry order.
    pub fn score(&self, defenders: &[&PlayerObservation], direction: Direction) -> Vec<TemplateScore> {
        let candidates = match self.selection {
            DefenderSelection::GoalSide => vec![select_positions(defenders, direction)],
            DefenderSelection::BestFit => candidate_subsets(defenders, direction),
        };

        self.templates
            .iter()
            .filter(|t| t.direction == direction)
            .map(|t| {
                let mut best = f64::INFINITY;
                for observed in &candidates {
                    let mean = mean_assignment_distance(observed, &t.points);
                    // strict: the first subset in canonical order wins ties
                    if mean < best {
                        best = mean;
                    }
                }
                TemplateScore {
                    label: t.label.clone(),
                    mean_distance: best,
                }
            })
            .collect()
    }
}

impl FormationStrategy for TemplateMatchStrategy {
    fn name(&self) -> &'static str {
        "template-match"
    }

    fn classify(&self, defenders: &[&PlayerObservation], direction: Direction) -> Classification {
        let mut best: Option<TemplateScore> = None;
        for score in self.score(defenders, direction) {
            // strict comparison keeps the earlier template on ties
            if best.as_ref().map_or(true, |b| score.mean_distance < b.mean_distance) {
                best = Some(score);
            }
        }

        match best {
            Some(score) => Classification {
                confidence: score.confidence(),
                label: score.label,
            },
            None => Classification {
                label: UNKNOWN_LABEL.to_string(),
                confidence: 0.0,
            },
        }
    }
}

/// Orders defenders nearest-to-goal first.
fn goal_order(a: &PlayerObservation, b: &PlayerObservation, direction: Direction) -> Ordering {
    let by_x = match direction {
        Direction::Right => b.x.total_cmp(&a.x),
        Direction::Left => a.x.total_cmp(&b.x),
    };
    by_x.then(a.y.total_cmp(&b.y))
        .then_with(|| a.player_id.cmp(&b.player_id))
}

fn canonical_order(a: &PlayerObservation, b: &PlayerObservation) -> Ordering {
    a.x.total_cmp(&b.x)
        .then(a.y.total_cmp(&b.y))
        .then_with(|| a.player_id.cmp(&b.player_id))
}

/// The (at most) six positions compared against the templates.
pub fn select_positions(defenders: &[&PlayerObservation], direction: Direction) -> Vec<Point> {
    let mut chosen: Vec<&PlayerObservation> = defenders.to_vec();
    if chosen.len() > TEMPLATE_POINTS {
        chosen.sort_by(|a, b| goal_order(a, b, direction));
        chosen.truncate(TEMPLATE_POINTS);
    }
    chosen.sort_by(|a, b| canonical_order(a, b));
    chosen.iter().map(|p| p.position()).collect()
}

/// Every six-player subset of the goal-side pool, each in canonical order.
/// With six or fewer defenders this is the single full set.
fn candidate_subsets(defenders: &[&PlayerObservation], direction: Direction) -> Vec<Vec<Point>> {
    let mut pool: Vec<&PlayerObservation> = defenders.to_vec();
    if pool.len() > BEST_FIT_POOL {
        pool.sort_by(|a, b| goal_order(a, b, direction));
        pool.truncate(BEST_FIT_POOL);
    }
    pool.sort_by(|a, b| canonical_order(a, b));
    let positions: Vec<Point> = pool.iter().map(|p| p.position()).collect();

    if positions.len() <= TEMPLATE_POINTS {
        return vec![positions];
    }
    combinations(positions.len(), TEMPLATE_POINTS)
        .into_iter()
        .map(|idx| idx.into_iter().map(|i| positions[i]).collect())
        .collect()
}

/// `k`-element index combinations of `0..n` in lexicographic order.
fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if k > n {
        return out;
    }
    let mut idx: Vec<usize> = (0..k).collect();
    loop {
        out.push(idx.clone());
        // rightmost index that can still move
        let Some(i) = (0..k).rev().find(|&i| idx[i] < n - k + i) else {
            return out;
        };
        idx[i] += 1;
        for j in i + 1..k {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

#[inline]
fn distance(a: Point, b: Point) -> f64 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    (dx * dx + dy * dy).sqrt()
}

/// Integer cost for the assignment solver, capped at [`MAX_COST`].
#[inline]
fn scaled_cost(dist: f64) -> i64 {
    let scaled = (dist * COST_SCALE).round();
    if scaled >= MAX_COST as f64 {
        MAX_COST
    } else {
        scaled as i64
    }
}

/// Mean Euclidean distance of the minimum-cost one-to-one assignment between
/// `observed` and `template`.
///
/// `observed` must not be longer than `template`.
pub fn mean_assignment_distance(observed: &[Point], template: &[Point]) -> f64 {
    let rows = observed.len();
    if rows == 0 {
        return 0.0;
    }

    let costs = Matrix::from_fn(rows, template.len(), |(i, j)| {
        scaled_cost(distance(observed[i], template[j]))
    });
    let (_, assignment) = kuhn_munkres_min(&costs);

    let total: f64 = assignment
        .iter()
        .enumerate()
        .map(|(i, &j)| distance(observed[i], template[j]))
        .sum();
    total / rows as f64
}
