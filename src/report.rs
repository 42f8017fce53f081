// 📊 Report Builder - grouping, classification and written artifacts
//
// Reads a finished (resolved) snapshot; never touches the Collector.

use crate::collector::{AccountRecord, PersistentId, PlatformKind};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const JSON_ARTIFACT: &str = "found_accounts.json";
pub const TEXT_ARTIFACT: &str = "found_accounts.txt";
pub const CSV_ARTIFACT: &str = "found_accounts.csv";

pub const TOOL_NAME: &str = "Minecraft Alt Checker";

/// Manual lookup page for names no service could confirm
pub fn lookup_link(username: &str) -> String {
    format!(
        "https://namemc.com/search?q={}",
        urlencoding::encode(username)
    )
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Classification {
    /// Java account with a real profile UUID
    Primary,
    /// Bedrock account (no Java UUID expected)
    Secondary,
    /// Not found anywhere, or never resolved
    Unconfirmed,
}

impl Classification {
    pub fn of(record: &AccountRecord) -> Self {
        if record.platform_kind == PlatformKind::Secondary {
            return Classification::Secondary;
        }
        match record.persistent_id {
            Some(PersistentId::Confirmed(_)) => Classification::Primary,
            _ => Classification::Unconfirmed,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Classification::Primary => "JAVA",
            Classification::Secondary => "BEDROCK",
            Classification::Unconfirmed => "NOT FOUND",
        }
    }

    pub fn is_verified(&self) -> bool {
        !matches!(self, Classification::Unconfirmed)
    }
}

// ============================================================================
// NOTIFICATION PAYLOAD
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct NotificationEntry {
    pub username: String,
    /// Dashed UUID or sentinel text; None if never resolved
    pub identifier: Option<String>,
    pub status: Classification,
    pub renamed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_link: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub verified: usize,
    pub unverified: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Origin {
    pub tool: String,
    pub version: String,
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
}

impl Origin {
    pub fn current() -> Self {
        Origin {
            tool: TOOL_NAME.to_string(),
            version: crate::VERSION.to_string(),
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationPayload {
    pub title: String,
    /// Primary, then Secondary, then Unconfirmed; discovery order within each
    pub entries: Vec<NotificationEntry>,
    pub summary: Summary,
    pub origin: Origin,
}

// ============================================================================
// BUILDER
// ============================================================================

pub struct ReportBuilder {
    records: Vec<AccountRecord>,
}

impl ReportBuilder {
    /// `records` in discovery order (as returned by `Collector::snapshot`)
    pub fn new(records: Vec<AccountRecord>) -> Self {
        ReportBuilder { records }
    }

    pub fn records(&self) -> &[AccountRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Names grouped by exact provenance label, groups and names in first-seen order
    pub fn groups(&self) -> Vec<(String, Vec<String>)> {
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();
        for record in &self.records {
            let label = record.source_label();
            match groups.iter_mut().find(|(l, _)| *l == label) {
                Some((_, names)) => names.push(record.username.clone()),
                None => groups.push((label, vec![record.username.clone()])),
            }
        }
        groups
    }

    pub fn classify(&self) -> Vec<(Classification, &AccountRecord)> {
        self.records
            .iter()
            .map(|r| (Classification::of(r), r))
            .collect()
    }

    /// One record per confirmed UUID (earliest discovered wins); sentinel and
    /// unresolved records are never collapsed.
    pub fn deduplicated(&self) -> Vec<&AccountRecord> {
        let mut ordered: Vec<(usize, &AccountRecord)> = self.records.iter().enumerate().collect();
        ordered.sort_by_key(|(i, r)| (r.discovered_at, *i));

        let mut seen = HashSet::new();
        let mut keep: Vec<(usize, &AccountRecord)> = ordered
            .into_iter()
            .filter(|(_, r)| match &r.persistent_id {
                Some(PersistentId::Confirmed(id)) => seen.insert(id.clone()),
                _ => true,
            })
            .collect();

        keep.sort_by_key(|(i, _)| *i);
        keep.into_iter().map(|(_, r)| r).collect()
    }

    pub fn notification(&self) -> NotificationPayload {
        let mut entries: Vec<NotificationEntry> = self
            .deduplicated()
            .into_iter()
            .map(|record| {
                let status = Classification::of(record);
                NotificationEntry {
                    username: record.username.clone(),
                    identifier: record.persistent_id.as_ref().map(|id| id.to_string()),
                    status,
                    renamed: record.rename.is_some(),
                    lookup_link: (status == Classification::Unconfirmed)
                        .then(|| lookup_link(&record.username)),
                }
            })
            .collect();

        // stable: discovery order kept within each bucket
        entries.sort_by_key(|e| e.status as u8);

        let verified = entries.iter().filter(|e| e.status.is_verified()).count();
        NotificationPayload {
            title: format!("{} Results", TOOL_NAME),
            summary: Summary {
                verified,
                unverified: entries.len() - verified,
            },
            entries,
            origin: Origin::current(),
        }
    }

    // ========================================================================
    // ARTIFACTS
    // ========================================================================

    /// Grouped human-readable report with a trailing total
    pub fn render_text(&self, generated: DateTime<Local>) -> String {
        let rule = "=".repeat(60);
        let mut out = String::new();
        out.push_str(&format!("{}\n", rule));
        out.push_str("MINECRAFT ALT ACCOUNT CHECKER - RESULTS\n");
        out.push_str(&format!("Date: {}\n", generated.format("%Y-%m-%d %H:%M:%S")));
        out.push_str(&format!("{}\n\n", rule));

        for (label, names) in self.groups() {
            out.push_str(&format!("\n[{}]\n", label));
            out.push_str(&format!("{}\n", "-".repeat(40)));
            for name in names {
                out.push_str(&format!("  • {}\n", name));
            }
        }

        out.push_str(&format!("\n{}\n", rule));
        out.push_str(&format!("Total found: {} accounts\n", self.records.len()));
        out
    }

    pub fn write_json(&self, path: &Path) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(&self.records)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn write_text(&self, path: &Path) -> crate::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(self.render_text(Local::now()).as_bytes())?;
        Ok(())
    }

    /// One row per record
    pub fn write_csv(&self, path: &Path) -> crate::Result<()> {
        let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
        writer
            .write_record([
                "username",
                "sources",
                "platform",
                "identifier",
                "previous_name",
                "discovered_at",
            ])
            .map_err(csv_error)?;

        for record in &self.records {
            writer
                .write_record([
                    record.username.as_str(),
                    record.source_label().as_str(),
                    record.platform_kind.as_str(),
                    record.persistent_id.as_ref().map(|id| id.as_str()).unwrap_or(""),
                    record.rename.as_ref().map(|r| r.previous_name.as_str()).unwrap_or(""),
                    record.discovered_at.to_rfc3339().as_str(),
                ])
                .map_err(csv_error)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write all three artifacts into `dir`. Nothing is written for an empty run.
    pub fn write_artifacts(&self, dir: &Path) -> crate::Result<Vec<PathBuf>> {
        if self.records.is_empty() {
            return Ok(Vec::new());
        }
        fs::create_dir_all(dir)?;

        let json = dir.join(JSON_ARTIFACT);
        let text = dir.join(TEXT_ARTIFACT);
        let csv = dir.join(CSV_ARTIFACT);
        self.write_json(&json)?;
        self.write_text(&text)?;
        self.write_csv(&csv)?;
        Ok(vec![json, text, csv])
    }
}

fn csv_error(e: csv::Error) -> crate::Error {
    crate::Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
}
