//! Analysis Pipeline
//!
//! frames → classification (parallel) → segmentation → merge → aggregation.
//!
//! Configuration and templates are checked in [`Analyzer::new`]; once an
//! analyzer exists, running it cannot fail. Per-frame problems only show up
//! as counters in [`Diagnostics`].

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;

use crate::classifier::FrameClassifier;
use crate::config::AnalysisConfig;
use crate::error::{Result, TemplateError};
use crate::frames::FrameIndex;
use crate::model::{Direction, DominantFormation, FrameClassification, Phase, PlayerObservation};
use crate::phase::{PhaseAggregator, PhaseMerger, PhaseSegmenter};
use crate::templates::TemplateRegistry;

/// Frame classifications in ascending (frame number, direction) order.
///
/// This is what a frame-stepping viewer queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationTimeline {
    entries: Vec<FrameClassification>,
}

impl ClassificationTimeline {
    pub fn new(mut entries: Vec<FrameClassification>) -> Self {
        entries.sort_by_key(|c| (c.frame_num, c.direction));
        Self { entries }
    }

    /// Classification available for `frame_num`, if any.
    pub fn at(&self, frame_num: u32) -> Option<&FrameClassification> {
        let idx = self.entries.partition_point(|c| c.frame_num < frame_num);
        self.entries.get(idx).filter(|c| c.frame_num == frame_num)
    }

    pub fn at_direction(&self, frame_num: u32, direction: Direction) -> Option<&FrameClassification> {
        self.entries
            .binary_search_by_key(&(frame_num, direction), |c| (c.frame_num, c.direction))
            .ok()
            .map(|idx| &self.entries[idx])
    }

    pub fn as_slice(&self) -> &[FrameClassification] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FrameClassification> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Occurrences of every label over the whole timeline.
    pub fn label_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for c in &self.entries {
            *counts.entry(c.formation_label.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// Run counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    /// Observations kept after duplicate removal
    pub observations: usize,
    pub frames_seen: usize,
    pub frames_classified: usize,
    /// Frames skipped for having fewer than six defenders
    pub insufficient_defender_frames: usize,
    pub duplicate_observations: usize,
    pub raw_phases: usize,
    pub merged_phases: usize,
    /// Merged phases dropped for having no classified frame
    pub empty_phases: usize,
    pub short_rows_dropped: usize,
    /// Total occurrences per formation label
    pub label_counts: BTreeMap<String, usize>,
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub formations: Vec<DominantFormation>,
    pub timeline: ClassificationTimeline,
    pub raw_phases: Vec<Phase>,
    pub merged_phases: Vec<Phase>,
    pub diagnostics: Diagnostics,
}

/// Configured, validated pipeline.
#[derive(Debug)]
pub struct Analyzer {
    config: AnalysisConfig,
    classifier: FrameClassifier,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig, registry: &TemplateRegistry) -> Result<Self> {
        config.validate()?;
        if registry.is_empty() {
            return Err(TemplateError::Empty.into());
        }

        let classifier = FrameClassifier::from_config(&config, registry);
        tracing::info!(
            strategy = %config.strategy,
            aggregation = %config.aggregation,
            min_phase_duration = config.min_phase_duration,
            "analyzer ready"
        );
        Ok(Self { config, classifier })
    }

    /// Analyzer over the embedded template table.
    pub fn with_builtin_templates(config: AnalysisConfig) -> Result<Self> {
        let registry = TemplateRegistry::builtin()?;
        Self::new(config, &registry)
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Classify every eligible frame.
    pub fn classify(&self, index: &FrameIndex) -> ClassificationTimeline {
        let entries: Vec<FrameClassification> = if self.config.parallel {
            index
                .frames()
                .par_iter()
                .filter_map(|frame| self.classifier.classify_frame(frame))
                .collect()
        } else {
            index
                .iter()
                .filter_map(|frame| self.classifier.classify_frame(frame))
                .collect()
        };
        ClassificationTimeline::new(entries)
    }

    pub fn run(&self, index: &FrameIndex) -> AnalysisReport {
        let timeline = self.classify(index);

        let raw_phases =
            PhaseSegmenter::segment(index.frames(), self.config.inner_zone, self.config.defenders);
        let merged_phases = PhaseMerger::new(self.config.min_phase_duration).merge(raw_phases.clone());
        let outcome = PhaseAggregator::new(self.config.aggregation)
            .with_min_output_duration(self.config.min_output_duration)
            .aggregate(&merged_phases, timeline.as_slice());

        let diagnostics = Diagnostics {
            observations: index.observation_count(),
            frames_seen: index.len(),
            frames_classified: timeline.len(),
            insufficient_defender_frames: index.len() - timeline.len(),
            duplicate_observations: index.duplicate_count(),
            raw_phases: raw_phases.len(),
            merged_phases: merged_phases.len(),
            empty_phases: outcome.empty_phases,
            short_rows_dropped: outcome.short_rows,
            label_counts: timeline.label_counts(),
        };

        tracing::info!(
            observations = diagnostics.observations,
            frames = diagnostics.frames_seen,
            classified = diagnostics.frames_classified,
            raw_phases = diagnostics.raw_phases,
            merged_phases = diagnostics.merged_phases,
            rows = outcome.formations.len(),
            "analysis complete"
        );

        AnalysisReport {
            formations: outcome.formations,
            timeline,
            raw_phases,
            merged_phases,
            diagnostics,
        }
    }

    /// Group and analyze a flat observation list.
    pub fn analyze<I>(&self, observations: I) -> AnalysisReport
    where
        I: IntoIterator<Item = PlayerObservation>,
    {
        self.run(&FrameIndex::from_observations(observations))
    }
}
