//! Report Writers
//!
//! Phase table and per-label count table, both CSV.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hb_core::DominantFormation;

pub const PHASE_TABLE_HEADER: [&str; 6] =
    ["start_frame", "end_frame", "formation_label", "direction", "confidence", "breakdown"];

/// `phases.csv` → `phases_counts.csv`, next to the phase table.
pub fn counts_path(out: &Path) -> PathBuf {
    let stem = out.file_stem().and_then(|s| s.to_str()).unwrap_or("phases");
    out.with_file_name(format!("{stem}_counts.csv"))
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    Ok(())
}

/// One row per dominant formation, confidence rounded to two decimals.
pub fn write_phase_table(path: &Path, formations: &[DominantFormation]) -> Result<()> {
    create_parent(path)?;
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create phase table: {}", path.display()))?;

    writer.write_record(PHASE_TABLE_HEADER)?;
    for row in formations {
        writer.write_record([
            row.start_frame.to_string(),
            row.end_frame.to_string(),
            row.formation_label.clone(),
            row.direction.to_string(),
            format!("{:.2}", row.aggregate_confidence),
            row.breakdown_string(),
        ])?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write phase table: {}", path.display()))?;
    Ok(())
}

/// Total occurrences per label, in label order.
pub fn write_label_counts(path: &Path, counts: &BTreeMap<String, usize>) -> Result<()> {
    create_parent(path)?;
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create count table: {}", path.display()))?;

    writer.write_record(["formation_label", "count"])?;
    for (label, count) in counts {
        writer.write_record([label.as_str(), count.to_string().as_str()])?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write count table: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hb_core::Direction;

    fn formation() -> DominantFormation {
        let mut breakdown = BTreeMap::new();
        breakdown.insert("1-5".to_string(), 80);
        breakdown.insert("2-4".to_string(), 20);
        DominantFormation {
            start_frame: 100,
            end_frame: 199,
            formation_label: "1-5".to_string(),
            direction: Direction::Right,
            aggregate_confidence: 0.8765,
            breakdown,
        }
    }

    #[test]
    fn test_counts_path() {
        assert_eq!(counts_path(Path::new("out/phases.csv")), PathBuf::from("out/phases_counts.csv"));
        assert_eq!(counts_path(Path::new("result")), PathBuf::from("result_counts.csv"));
    }

    #[test]
    fn test_write_phase_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/phases.csv");

        write_phase_table(&path, &[formation()]).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("start_frame,end_frame,formation_label,direction,confidence,breakdown")
        );
        assert_eq!(lines.next(), Some("100,199,1-5,right,0.88,\"1-5: 80, 2-4: 20\""));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_write_label_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phases_counts.csv");
        let counts: BTreeMap<String, usize> = [("2-4".to_string(), 20), ("1-5".to_string(), 80)].into_iter().collect();

        write_label_counts(&path, &counts).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "formation_label,count\n1-5,80\n2-4,20\n");
    }

    #[test]
    fn test_empty_phase_table_has_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phases.csv");
        write_phase_table(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 1);
    }
}
