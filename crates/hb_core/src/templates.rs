//! Formation Template Registry
//!
//! The single table of canonical defender shapes, keyed by
//! (formation label, attack direction). The built-in table is embedded at
//! compile time and parsed once at startup; a replacement table can be
//! supplied as YAML with the same schema.
//!
//! ## Schema
//!
//! ```yaml
//! templates:
//!   - label: "0-6"
//!     right: [[0.8, 0.175], ...]   # exactly 6 points
//!     left:  [[0.2, 0.175], ...]   # exactly 6 points
//! ```
//!
//! Validation is all-or-nothing: a registry either satisfies every rule or
//! is never constructed.

use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::error::TemplateError;
use crate::model::Direction;

/// Defenders per template.
pub const TEMPLATE_POINTS: usize = 6;

/// Built-in template table (compile-time embedding).
pub const BUILTIN_TEMPLATES_YAML: &str = include_str!("../data/formation_templates.yaml");

/// Normalized court position `(x, y)`.
pub type Point = (f64, f64);

#[derive(Debug, Deserialize)]
struct TemplateFile {
    templates: Vec<TemplateEntry>,
}

#[derive(Debug, Deserialize)]
struct TemplateEntry {
    label: String,
    right: Option<Vec<[f64; 2]>>,
    left: Option<Vec<[f64; 2]>>,
}

/// Idealized positions of six defenders for one formation and direction.
#[derive(Debug, Clone, PartialEq)]
pub struct FormationTemplate {
    pub label: String,
    pub direction: Direction,
    pub points: [Point; TEMPLATE_POINTS],
}

/// Validated, immutable template table.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateRegistry {
    /// Declaration order; RIGHT before LEFT within a label
    templates: Vec<FormationTemplate>,
}

impl TemplateRegistry {
    /// Registry built from the embedded table.
    pub fn builtin() -> Result<Self, TemplateError> {
        Self::from_yaml_str(BUILTIN_TEMPLATES_YAML)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, TemplateError> {
        let file: TemplateFile = serde_yaml::from_str(yaml)?;
        if file.templates.is_empty() {
            return Err(TemplateError::Empty);
        }

        let mut seen = FxHashSet::default();
        let mut templates = Vec::with_capacity(file.templates.len() * 2);

        for entry in file.templates {
            let label = entry.label.trim().to_string();
            if label.is_empty() {
                return Err(TemplateError::EmptyLabel);
            }
            if !seen.insert(label.clone()) {
                return Err(TemplateError::DuplicateLabel { label });
            }

            for (direction, points) in [(Direction::Right, entry.right), (Direction::Left, entry.left)] {
                let points = points.ok_or_else(|| TemplateError::MissingDirection {
                    label: label.clone(),
                    direction,
                })?;
                templates.push(build_template(&label, direction, &points)?);
            }
        }

        tracing::debug!(labels = seen.len(), "formation template registry loaded");
        Ok(Self { templates })
    }

    /// Templates for one direction, in tie-break order.
    pub fn for_direction(&self, direction: Direction) -> impl Iterator<Item = &FormationTemplate> {
        self.templates.iter().filter(move |t| t.direction == direction)
    }

    pub fn get(&self, label: &str, direction: Direction) -> Option<&FormationTemplate> {
        self.templates
            .iter()
            .find(|t| t.label == label && t.direction == direction)
    }

    /// Distinct labels in declaration order.
    pub fn labels(&self) -> Vec<&str> {
        self.for_direction(Direction::Right).map(|t| t.label.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormationTemplate> {
        self.templates.iter()
    }

    /// Number of (label, direction) entries.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn build_template(
    label: &str,
    direction: Direction,
    raw: &[[f64; 2]],
) -> Result<FormationTemplate, TemplateError> {
    if raw.len() != TEMPLATE_POINTS {
        return Err(TemplateError::WrongPointCount {
            label: label.to_string(),
            direction,
            found: raw.len(),
            expected: TEMPLATE_POINTS,
        });
    }

    let mut points = [(0.0, 0.0); TEMPLATE_POINTS];
    for (index, [x, y]) in raw.iter().copied().enumerate() {
        if !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
            return Err(TemplateError::PointOutOfRange {
                label: label.to_string(),
                direction,
                index,
                x,
                y,
            });
        }
        points[index] = (x, y);
    }

    Ok(FormationTemplate {
        label: label.to_string(),
        direction,
        points,
    })
}
