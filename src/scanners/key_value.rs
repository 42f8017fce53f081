// 🔑 Flat key=value scanners - TLauncher.cfg, Technic launcher.properties

use super::json_config::tlauncher_dirs;
use super::{ScanContext, Scanner, ScannerKind};
use crate::roots::SourceRoots;
use regex::Regex;
use std::sync::OnceLock;

/// Values of `key=value` pairs whose key matches `pattern` (built by `key_pattern`).
///
/// The value runs to end of line and is trimmed; empty values are skipped.
/// Matches anywhere in a line, so `client.username=` also satisfies `username`.
pub fn find_values(content: &str, pattern: &Regex) -> Vec<String> {
    pattern
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn key_pattern(keys: &[&str]) -> Regex {
    let alternation = keys
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?:{})=([^\n\r]+)", alternation)).expect("escaped literals always compile")
}

// ============================================================================
// TLAUNCHER.CFG
// ============================================================================

pub struct TLauncherConfigScanner;

impl TLauncherConfigScanner {
    pub const KEYS: [&'static str; 3] = ["login", "username", "client.username"];

    fn pattern() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| key_pattern(&Self::KEYS))
    }
}

impl Scanner for TLauncherConfigScanner {
    fn kind(&self) -> ScannerKind {
        ScannerKind::TLauncherConfig
    }

    fn scan(&self, roots: &SourceRoots, ctx: &mut ScanContext<'_>) {
        for dir in tlauncher_dirs(roots) {
            let Some(content) = ctx.load_text(&dir.join("TLauncher.cfg")) else {
                continue;
            };
            for value in find_values(&content, Self::pattern()) {
                ctx.submit(&value, "TLauncher");
            }
        }
    }
}

// ============================================================================
// TECHNIC launcher.properties
// ============================================================================

pub struct TechnicScanner;

impl TechnicScanner {
    pub const KEYS: [&'static str; 2] = ["username", "displayName"];

    fn pattern() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| key_pattern(&Self::KEYS))
    }
}

impl Scanner for TechnicScanner {
    fn kind(&self) -> ScannerKind {
        ScannerKind::Technic
    }

    fn scan(&self, roots: &SourceRoots, ctx: &mut ScanContext<'_>) {
        for dir in SourceRoots::join_each(&[roots.appdata()], ".technic") {
            let Some(content) = ctx.load_text(&dir.join("launcher.properties")) else {
                continue;
            };
            for value in find_values(&content, Self::pattern()) {
                ctx.submit(&value, "Technic Launcher");
            }
        }
    }
}
