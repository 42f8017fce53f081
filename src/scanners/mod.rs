// 🔎 Scanner Framework - one scanner per launcher data source
//
// Every scanner knows exactly one on-disk format. A scanner never fails past its
// own boundary: missing roots/files are skipped, malformed files are recorded in
// the ScanReport and scanning moves on to the next candidate location.
//
// Adding a source = add a ScannerKind variant + a Scanner impl. Nothing shared changes.

pub mod json_config;
pub mod key_value;
pub mod logs;
pub mod modrinth_db;
pub mod walk;

use crate::collector::{Collector, SubmitOutcome};
use crate::error::Error;
use crate::extractor;
use crate::roots::SourceRoots;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

pub use json_config::{
    AtLauncherScanner, BadlionScanner, FeatherScanner, LabyModScanner, LunarClientScanner,
    MultiMcScanner, OfficialLauncherScanner, TLauncherAccountsScanner,
};
pub use key_value::{TLauncherConfigScanner, TechnicScanner};
pub use logs::MinecraftLogsScanner;
pub use modrinth_db::ModrinthDatabaseScanner;
pub use walk::{CurseForgeScanner, DeepSearchScanner, ModrinthAccountsScanner};

// ============================================================================
// SCANNER KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScannerKind {
    OfficialLauncher,
    TLauncherConfig,
    TLauncherAccounts,
    MultiMc,
    LunarClient,
    Badlion,
    Feather,
    LabyMod,
    CurseForge,
    AtLauncher,
    Technic,
    ModrinthAccounts,
    ModrinthDatabase,
    MinecraftLogs,
    DeepSearch,
}

impl ScannerKind {
    /// Sweep order
    pub const ALL: [ScannerKind; 15] = [
        ScannerKind::OfficialLauncher,
        ScannerKind::TLauncherConfig,
        ScannerKind::TLauncherAccounts,
        ScannerKind::MultiMc,
        ScannerKind::LunarClient,
        ScannerKind::Badlion,
        ScannerKind::Feather,
        ScannerKind::LabyMod,
        ScannerKind::CurseForge,
        ScannerKind::AtLauncher,
        ScannerKind::Technic,
        ScannerKind::ModrinthAccounts,
        ScannerKind::ModrinthDatabase,
        ScannerKind::MinecraftLogs,
        ScannerKind::DeepSearch,
    ];

    /// Human-readable name for display
    pub fn name(&self) -> &'static str {
        match self {
            ScannerKind::OfficialLauncher => "official Minecraft Launcher",
            ScannerKind::TLauncherConfig => "TLauncher config",
            ScannerKind::TLauncherAccounts => "TLauncher accounts",
            ScannerKind::MultiMc => "MultiMC/PolyMC",
            ScannerKind::LunarClient => "Lunar Client",
            ScannerKind::Badlion => "Badlion Client",
            ScannerKind::Feather => "Feather Client",
            ScannerKind::LabyMod => "LabyMod",
            ScannerKind::CurseForge => "CurseForge",
            ScannerKind::AtLauncher => "ATLauncher",
            ScannerKind::Technic => "Technic Launcher",
            ScannerKind::ModrinthAccounts => "Modrinth App accounts",
            ScannerKind::ModrinthDatabase => "Modrinth App database",
            ScannerKind::MinecraftLogs => "Minecraft logs",
            ScannerKind::DeepSearch => "deep search",
        }
    }
}

/// Scanner construction options the sweep passes through
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub db_busy_timeout: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            db_busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Factory: Box<dyn Scanner> for a kind
pub fn get_scanner(kind: ScannerKind, options: &ScanOptions) -> Box<dyn Scanner> {
    match kind {
        ScannerKind::OfficialLauncher => Box::new(OfficialLauncherScanner),
        ScannerKind::TLauncherConfig => Box::new(TLauncherConfigScanner),
        ScannerKind::TLauncherAccounts => Box::new(TLauncherAccountsScanner),
        ScannerKind::MultiMc => Box::new(MultiMcScanner),
        ScannerKind::LunarClient => Box::new(LunarClientScanner),
        ScannerKind::Badlion => Box::new(BadlionScanner),
        ScannerKind::Feather => Box::new(FeatherScanner),
        ScannerKind::LabyMod => Box::new(LabyModScanner),
        ScannerKind::CurseForge => Box::new(CurseForgeScanner),
        ScannerKind::AtLauncher => Box::new(AtLauncherScanner),
        ScannerKind::Technic => Box::new(TechnicScanner),
        ScannerKind::ModrinthAccounts => Box::new(ModrinthAccountsScanner),
        ScannerKind::ModrinthDatabase => Box::new(ModrinthDatabaseScanner::new(options.db_busy_timeout)),
        ScannerKind::MinecraftLogs => Box::new(MinecraftLogsScanner),
        ScannerKind::DeepSearch => Box::new(DeepSearchScanner),
    }
}

// ============================================================================
// SCANNER TRAIT
// ============================================================================

/// Scanner - the one capability every source implements
pub trait Scanner: Send + Sync {
    fn kind(&self) -> ScannerKind;

    /// Look under `roots` and submit every candidate through `ctx`.
    /// Must not panic or propagate errors; record them on `ctx` instead.
    fn scan(&self, roots: &SourceRoots, ctx: &mut ScanContext<'_>);
}

// ============================================================================
// SCAN REPORT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanOutcome {
    /// At least one source file was read
    Found,
    /// Nothing to read: roots or files absent
    Missing,
    /// Files existed but none could be read
    Malformed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub kind: ScannerKind,
    pub files_read: usize,
    pub failures: Vec<String>,
    pub accepted: usize,
    pub merged: usize,
    pub rejected: usize,
}

impl ScanReport {
    pub fn new(kind: ScannerKind) -> Self {
        ScanReport {
            kind,
            files_read: 0,
            failures: Vec::new(),
            accepted: 0,
            merged: 0,
            rejected: 0,
        }
    }

    pub fn outcome(&self) -> ScanOutcome {
        if self.files_read > 0 {
            ScanOutcome::Found
        } else if !self.failures.is_empty() {
            ScanOutcome::Malformed
        } else {
            ScanOutcome::Missing
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} file(s), {} new, {} merged, {} rejected, {} failure(s)",
            self.kind.name(),
            self.files_read,
            self.accepted,
            self.merged,
            self.rejected,
            self.failures.len()
        )
    }
}

// ============================================================================
// SCAN CONTEXT
// ============================================================================

/// Submission channel handed to a scanner; tallies outcomes into its report.
pub struct ScanContext<'a> {
    collector: &'a Collector,
    report: ScanReport,
}

impl<'a> ScanContext<'a> {
    pub fn new(collector: &'a Collector, kind: ScannerKind) -> Self {
        ScanContext {
            collector,
            report: ScanReport::new(kind),
        }
    }

    pub fn submit(&mut self, candidate: &str, provenance: &str) {
        self.submit_with_info(candidate, provenance, "");
    }

    pub fn submit_with_info(&mut self, candidate: &str, provenance: &str, extra_info: &str) {
        match self.collector.submit_with_info(candidate, provenance, extra_info) {
            SubmitOutcome::Created => self.report.accepted += 1,
            SubmitOutcome::Merged => self.report.merged += 1,
            SubmitOutcome::AlreadyKnown => {}
            SubmitOutcome::Rejected(_) => self.report.rejected += 1,
        }
    }

    /// Submit a string-valued field if present
    pub fn submit_field(&mut self, node: &Value, key: &str, provenance: &str) {
        if let Some(name) = node.get(key).and_then(Value::as_str) {
            self.submit(name, provenance);
        }
    }

    /// Feed a schema-less document through the recursive extractor
    pub fn extract(&mut self, node: &Value, provenance: &str) {
        for name in extractor::candidates(node) {
            self.submit(&name, provenance);
        }
    }

    pub fn file_read(&mut self) {
        self.report.files_read += 1;
    }

    /// Record a failure; SourceUnavailable is not a failure and is dropped
    pub fn record(&mut self, err: Error) {
        match err {
            Error::SourceUnavailable(path) => {
                debug!(path = %path.display(), "source not present");
            }
            other => {
                debug!(scanner = self.report.kind.name(), "{}", other);
                self.report.failures.push(other.to_string());
            }
        }
    }

    /// Read and parse a JSON file, counting it as read on success
    pub fn load_json(&mut self, path: &Path) -> Option<Value> {
        match read_json(path) {
            Ok(value) => {
                self.file_read();
                Some(value)
            }
            Err(e) => {
                self.record(e);
                None
            }
        }
    }

    /// Read a text file (lossy UTF-8), counting it as read on success
    pub fn load_text(&mut self, path: &Path) -> Option<String> {
        match read_text(path) {
            Ok(text) => {
                self.file_read();
                Some(text)
            }
            Err(e) => {
                self.record(e);
                None
            }
        }
    }

    pub fn finish(self) -> ScanReport {
        self.report
    }
}

// ============================================================================
// FILE HELPERS
// ============================================================================

pub fn read_text(path: &Path) -> crate::Result<String> {
    if !path.is_file() {
        return Err(Error::SourceUnavailable(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn read_json(path: &Path) -> crate::Result<Value> {
    let text = read_text(path)?;
    // Some launchers write a UTF-8 BOM
    let text = text.trim_start_matches('\u{feff}');
    serde_json::from_str(text).map_err(|e| Error::malformed(path, e))
}

/// Entries of an object, or elements of an array: launchers disagree on which
/// one holds their account list.
pub fn entries(node: &Value) -> Vec<&Value> {
    match node {
        Value::Object(map) => map.values().collect(),
        Value::Array(items) => items.iter().collect(),
        _ => Vec::new(),
    }
}

/// Last path component as text, for provenance labels
pub fn file_label(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

// ============================================================================
// SWEEP
// ============================================================================

/// Run every scanner in `kinds` in order against `roots`.
pub fn run_scanners(
    kinds: &[ScannerKind],
    roots: &SourceRoots,
    collector: &Collector,
    options: &ScanOptions,
) -> Vec<ScanReport> {
    kinds
        .iter()
        .map(|&kind| {
            info!("Searching in {}...", kind.name());
            let scanner = get_scanner(kind, options);
            let mut ctx = ScanContext::new(collector, kind);
            scanner.scan(roots, &mut ctx);
            let report = ctx.finish();
            debug!("{}", report.summary());
            report
        })
        .collect()
}

pub fn run_all(roots: &SourceRoots, collector: &Collector, options: &ScanOptions) -> Vec<ScanReport> {
    run_scanners(&ScannerKind::ALL, roots, collector, options)
}
