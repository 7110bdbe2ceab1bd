//! Plain-text export of the pin board

use std::path::{Path, PathBuf};

use crate::Result;
use crate::pins::PinnedItem;
use crate::sanitize::sanitize;
use crate::variant::{EngineConfig, ExportLabel};

/// MIME type of every export
pub const EXPORT_MIME_TYPE: &str = "text/plain";

const BLOCK_RULE: &str = "----------------";

/// A ready-to-save text file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested filename
    pub filename: String,
    /// Always [`EXPORT_MIME_TYPE`]
    pub mime_type: &'static str,
    /// File contents
    pub body: String,
}

impl ExportArtifact {
    /// Write the artifact into `dir` under its suggested filename
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn save_in(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.body)?;
        tracing::info!(path = %path.display(), bytes = self.body.len(), "exported pin board");
        Ok(path)
    }
}

/// Render every pinned item as a labelled plain-text block
///
/// Returns `None` when there is nothing to export. Blocks keep insertion
/// order and are separated by a blank line.
#[must_use]
pub fn export(config: &EngineConfig, items: &[PinnedItem]) -> Option<ExportArtifact> {
    if items.is_empty() {
        return None;
    }

    let body = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            format!(
                "{}\n{BLOCK_RULE}\n{}\n",
                block_label(config.export_label, i, item),
                sanitize(&item.content)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    Some(ExportArtifact {
        filename: config.export_filename.to_string(),
        mime_type: EXPORT_MIME_TYPE,
        body,
    })
}

fn block_label(style: ExportLabel, index: usize, item: &PinnedItem) -> String {
    match style {
        ExportLabel::Indexed(title) => format!("{title} {}", index + 1),
        ExportLabel::CategoryTimestamp => {
            let category = item
                .category
                .map_or_else(|| "GENERAL".to_string(), |c| c.to_string().to_uppercase());
            format!("[{category}] {}", item.pinned_at.format("%Y-%m-%d %H:%M UTC"))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::pins::PinCategory;

    fn item(id: &str, content: &str, category: Option<PinCategory>) -> PinnedItem {
        PinnedItem {
            id: id.to_string(),
            content: content.to_string(),
            category,
            pinned_at: Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn empty_board_exports_nothing() {
        assert!(export(&EngineConfig::strategy(), &[]).is_none());
    }

    #[test]
    fn indexed_blocks_in_insertion_order() {
        let items = [item("1", "A", None), item("2", "B", None)];
        let artifact = export(&EngineConfig::strategy(), &items).unwrap();

        assert_eq!(
            artifact.body,
            "STRATEGY BLOCK 1\n----------------\nA\n\n\nSTRATEGY BLOCK 2\n----------------\nB\n"
        );
        assert_eq!(artifact.filename, "My_Viral_Strategy.txt");
        assert_eq!(artifact.mime_type, "text/plain");
    }

    #[test]
    fn category_timestamp_labels_and_sanitized_content() {
        let items = [
            item("1", "**No beef** at all", Some(PinCategory::Medical)),
            item("2", "Walk daily", None),
        ];
        let artifact = export(&EngineConfig::nutrition(), &items).unwrap();

        assert!(artifact.body.starts_with("[MEDICAL] 2026-10-19 09:30 UTC\n"));
        assert!(artifact.body.contains("No beef at all"));
        assert!(!artifact.body.contains("**"));
        assert!(artifact.body.contains("[GENERAL] 2026-10-19 09:30 UTC"));
    }

    #[test]
    fn save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = export(&EngineConfig::strategy(), &[item("1", "A", None)]).unwrap();

        let path = artifact.save_in(dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), artifact.body);
    }
}
