use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use super::aggregator::PreparationSummaryItem;

// ============================================================================
// Preparation List Export
// ============================================================================
//
// Plain UTF-8 text, one heading per dish and one line per size total:
//
//     Preparation List - 2024-05-01
//
//     Dal Fry
//       Plate: 5
//       Half Tray: 2
//
// Write-only; there is no parser for this format.
//
// ============================================================================

pub fn export_file_name(delivery_date: NaiveDate) -> String {
    format!("preparation-list-{}.txt", delivery_date.format("%Y-%m-%d"))
}

pub fn render_manifest(delivery_date: NaiveDate, items: &[PreparationSummaryItem]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Preparation List - {}", delivery_date.format("%Y-%m-%d"));
    out.push('\n');

    if items.is_empty() {
        out.push_str("No orders for this date.\n");
        return out;
    }

    // Keep dishes in first-seen order even if the input interleaves them
    let mut groups: Vec<(&str, Vec<&PreparationSummaryItem>)> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|(name, _)| *name == item.item_name) {
            Some((_, entries)) => entries.push(item),
            None => groups.push((item.item_name.as_str(), vec![item])),
        }
    }

    for (i, (name, entries)) in groups.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{name}");
        for entry in entries {
            let _ = writeln!(out, "  {}: {}", entry.size_type.label(), entry.total_quantity);
        }
    }

    out
}

/// Render and write the manifest into `dir`, returning the file path
pub async fn write_manifest(
    dir: &Path,
    delivery_date: NaiveDate,
    items: &[PreparationSummaryItem],
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create export directory {}", dir.display()))?;

    let path = dir.join(export_file_name(delivery_date));
    tokio::fs::write(&path, render_manifest(delivery_date, items))
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), entries = items.len(), "Wrote preparation list");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::SizeType;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn entry(name: &str, size_type: SizeType, total_quantity: u64) -> PreparationSummaryItem {
        PreparationSummaryItem {
            item_name: name.to_string(),
            size_type,
            total_quantity,
        }
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name(date()), "preparation-list-2024-05-01.txt");
    }

    #[test]
    fn test_render_groups_by_dish() {
        let items = vec![
            entry("Dal Fry", SizeType::Plate, 5),
            entry("Veg Biryani", SizeType::FullTray, 1),
            entry("Dal Fry", SizeType::HalfTray, 2),
        ];

        let text = render_manifest(date(), &items);
        assert_eq!(
            text,
            "Preparation List - 2024-05-01\n\
             \n\
             Dal Fry\n  Plate: 5\n  Half Tray: 2\n\
             \n\
             Veg Biryani\n  Full Tray: 1\n"
        );
    }

    #[test]
    fn test_render_empty_manifest() {
        let text = render_manifest(date(), &[]);
        assert!(text.starts_with("Preparation List - 2024-05-01"));
        assert!(text.ends_with("No orders for this date.\n"));
    }

    #[tokio::test]
    async fn test_write_manifest_creates_dated_file() {
        let dir = std::env::temp_dir().join(format!("prep-export-{}", uuid::Uuid::new_v4()));
        let items = vec![entry("Dal Fry", SizeType::Plate, 5)];

        let path = write_manifest(&dir, date(), &items).await.unwrap();

        assert_eq!(path.file_name().unwrap(), "preparation-list-2024-05-01.txt");
        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(written.contains("Dal Fry\n  Plate: 5\n"));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
