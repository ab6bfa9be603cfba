//! Formation Analysis CLI Library
//!
//! Position feed CSV → hb_core pipeline → phase table + count table + run metadata

pub mod feed;
pub mod report;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hb_core::{AnalysisConfig, AnalysisReport, Analyzer, Diagnostics, FrameClassification, FrameIndex, TemplateRegistry};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use feed::{read_feed, FeedConfig, FeedError, FeedStats, Offset};
pub use report::{counts_path, write_label_counts, write_phase_table};

/// Contents of a `--config` file: engine settings plus feed corrections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub analysis: AnalysisConfig,
    pub feed: FeedConfig,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: RunConfig = serde_yaml::from_str(&yaml)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.analysis.validate()?;
        Ok(config)
    }
}

/// Embedded templates, or the table in `path` when given.
pub fn load_templates(path: Option<&Path>) -> Result<TemplateRegistry> {
    let registry = match path {
        Some(path) => {
            let yaml = fs::read_to_string(path)
                .with_context(|| format!("Failed to read template table: {}", path.display()))?;
            TemplateRegistry::from_yaml_str(&yaml)
                .with_context(|| format!("Invalid template table: {}", path.display()))?
        }
        None => TemplateRegistry::builtin().context("Embedded template table is invalid")?,
    };
    Ok(registry)
}

/// SHA256 of a file as a hex string.
pub fn file_checksum(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Run metadata
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub input: PathBuf,
    /// SHA256 of the input feed (hex)
    pub input_checksum: String,
    /// RFC3339
    pub created_at: String,
    pub engine_version: String,
    pub strategy: String,
    pub aggregation: String,
    pub rows_written: usize,
    pub feed: FeedStats,
    pub diagnostics: Diagnostics,
}

/// Read a feed and run the engine over it.
pub fn analyze_csv(
    csv_path: &Path,
    config: &RunConfig,
    templates: &TemplateRegistry,
) -> Result<(AnalysisReport, FeedStats)> {
    let analyzer = Analyzer::new(config.analysis.clone(), templates)?;

    let (observations, stats) = read_feed(csv_path, &config.feed)?;
    println!(
        "✅ Parsed {} observations (failed: {}, total rows: {})",
        stats.parsed, stats.failed, stats.total_rows
    );

    let index = FrameIndex::from_observations(observations);
    Ok((analyzer.run(&index), stats))
}

/// Full run: analyze `csv_path`, write the phase table to `out` and the label
/// counts next to it.
pub fn run_analysis(
    csv_path: &Path,
    out: &Path,
    config: &RunConfig,
    templates: &TemplateRegistry,
) -> Result<RunMetadata> {
    let (report, stats) = analyze_csv(csv_path, config, templates)?;

    write_phase_table(out, &report.formations)?;
    let counts_out = counts_path(out);
    write_label_counts(&counts_out, &report.diagnostics.label_counts)?;
    println!("✅ Wrote {} phases to {}", report.formations.len(), out.display());
    println!("   Label counts: {}", counts_out.display());

    Ok(RunMetadata {
        input: csv_path.to_path_buf(),
        input_checksum: file_checksum(csv_path)?,
        created_at: chrono::Utc::now().to_rfc3339(),
        engine_version: hb_core::VERSION.to_string(),
        strategy: config.analysis.strategy.to_string(),
        aggregation: config.analysis.aggregation.to_string(),
        rows_written: report.formations.len(),
        feed: stats,
        diagnostics: report.diagnostics,
    })
}

/// Classifications recorded for `frame_num` (one per direction at most).
pub fn classify_frame_at(
    csv_path: &Path,
    frame_num: u32,
    config: &RunConfig,
    templates: &TemplateRegistry,
) -> Result<Vec<FrameClassification>> {
    let analyzer = Analyzer::new(config.analysis.clone(), templates)?;
    let (observations, _) = read_feed(csv_path, &config.feed)?;

    // only the requested frame needs classifying
    let index = FrameIndex::from_observations(observations.into_iter().filter(|o| o.frame_num == frame_num));
    Ok(analyzer.classify(&index).iter().cloned().collect())
}

pub fn save_metadata(path: &Path, meta: &RunMetadata) -> Result<()> {
    let metadata_json = serde_json::to_string_pretty(meta)?;
    fs::write(path, metadata_json)
        .with_context(|| format!("Failed to write metadata: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hb_core::{Direction, StrategyKind, Team};
    use std::fmt::Write as _;

    /// RIGHT attack on frames 0..120 with red defending, one red player
    /// advanced into the inner zone; white attackers as noise.
    fn feed_csv() -> String {
        let mut csv = String::from("frame_num,id,team_color,x,y,direction\n");
        for frame in 0..120 {
            for i in 0..6 {
                let x = if i == 2 { 0.5 } else { 0.75 };
                writeln!(csv, "{frame},r{i},red,{x},{:.2},right", 0.25 + i as f64 * 0.1).unwrap();
            }
            writeln!(csv, "{frame},w0,white,0.6,0.5,right").unwrap();
        }
        csv
    }

    fn write_feed(dir: &Path) -> PathBuf {
        let path = dir.join("feed.csv");
        fs::write(&path, feed_csv()).unwrap();
        path
    }

    #[test]
    fn test_run_analysis_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = write_feed(dir.path());
        let out = dir.path().join("phases.csv");
        let templates = load_templates(None).unwrap();

        let meta = run_analysis(&csv_path, &out, &RunConfig::default(), &templates).unwrap();

        assert_eq!(meta.rows_written, 1);
        assert_eq!(meta.feed.parsed, 120 * 7);
        assert_eq!(meta.input_checksum, file_checksum(&csv_path).unwrap());
        assert_eq!(meta.strategy, "zone-count");

        let table = fs::read_to_string(&out).unwrap();
        assert!(table.lines().nth(1).unwrap().starts_with("0,119,1-5,right,1.00,"));
        let counts = fs::read_to_string(dir.path().join("phases_counts.csv")).unwrap();
        assert_eq!(counts, "formation_label,count\n1-5,120\n");
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formation.yaml");
        fs::write(
            &path,
            "analysis:\n  strategy: template-match\n  min_phase_duration: 25\nfeed:\n  offsets:\n    red: { dx: 0.1, dy: -0.1 }\n",
        )
        .unwrap();

        let config = RunConfig::load(&path).unwrap();
        assert_eq!(config.analysis.strategy, StrategyKind::TemplateMatch);
        assert_eq!(config.analysis.min_phase_duration, 25);
        assert_eq!(config.feed.offset(Team::Red), Offset { dx: 0.1, dy: -0.1 });
    }

    #[test]
    fn test_shipped_config_parses() {
        let config: RunConfig = serde_yaml::from_str(include_str!("../../../config/formation.yaml")).unwrap();
        assert!(config.analysis.validate().is_ok());
        assert_eq!(config.analysis, AnalysisConfig::default());
        assert_eq!(config.feed.offset(Team::White), Offset { dx: 0.05, dy: 0.0 });
    }

    #[test]
    fn test_invalid_config_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "analysis:\n  min_phase_duration: 0\n").unwrap();
        assert!(RunConfig::load(&path).is_err());
    }

    #[test]
    fn test_template_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.yaml");
        fs::write(&path, hb_core::templates::BUILTIN_TEMPLATES_YAML).unwrap();
        assert_eq!(load_templates(Some(&path)).unwrap().len(), load_templates(None).unwrap().len());

        fs::write(&path, "templates: []\n").unwrap();
        assert!(load_templates(Some(&path)).is_err());
    }

    #[test]
    fn test_classify_frame_at() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = write_feed(dir.path());
        let templates = load_templates(None).unwrap();

        let at = classify_frame_at(&csv_path, 42, &RunConfig::default(), &templates).unwrap();
        assert_eq!(at.len(), 1);
        assert_eq!(at[0].direction, Direction::Right);
        assert_eq!(at[0].formation_label, "1-5");

        assert!(classify_frame_at(&csv_path, 500, &RunConfig::default(), &templates).unwrap().is_empty());
    }

    #[test]
    fn test_save_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = write_feed(dir.path());
        let templates = load_templates(None).unwrap();
        let meta = run_analysis(&csv_path, &dir.path().join("phases.csv"), &RunConfig::default(), &templates).unwrap();

        let meta_path = dir.path().join("meta.json");
        save_metadata(&meta_path, &meta).unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&meta_path).unwrap()).unwrap();
        assert_eq!(json["diagnostics"]["frames_classified"], 120);
        assert_eq!(json["feed"]["failed"], 0);
    }
}
