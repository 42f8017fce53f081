// 🌲 Schema-less scanners - find account files, hand them to the recursive extractor

use super::{ScanContext, Scanner, ScannerKind};
use crate::roots::SourceRoots;
use std::path::Path;
use walkdir::WalkDir;

/// `*account*.json` (name compared lowercase)
pub fn is_account_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.to_lowercase().contains("account") && name.ends_with(".json"))
}

/// Extract from every account file under `dir`, descending at most `max_depth`
/// directories below it. `provenance` labels each file from its path.
fn extract_account_files(
    dir: &Path,
    max_depth: Option<usize>,
    provenance: &dyn Fn(&Path) -> String,
    ctx: &mut ScanContext<'_>,
) {
    let mut walker = WalkDir::new(dir).min_depth(1).sort_by_file_name();
    if let Some(depth) = max_depth {
        // files directly in `dir` sit at walkdir depth 1
        walker = walker.max_depth(depth + 1);
    }

    for entry in walker.into_iter().filter_map(Result::ok) {
        if entry.file_type().is_file() && is_account_file(entry.path()) {
            if let Some(data) = ctx.load_json(entry.path()) {
                ctx.extract(&data, &provenance(entry.path()));
            }
        }
    }
}

// ============================================================================
// CURSEFORGE
// ============================================================================

pub struct CurseForgeScanner;

impl Scanner for CurseForgeScanner {
    fn kind(&self) -> ScannerKind {
        ScannerKind::CurseForge
    }

    fn scan(&self, roots: &SourceRoots, ctx: &mut ScanContext<'_>) {
        for dir in SourceRoots::join_each(&[roots.appdata()], "curseforge") {
            if dir.is_dir() {
                extract_account_files(&dir, None, &|_| "CurseForge".to_string(), ctx);
            }
        }
    }
}

// ============================================================================
// MODRINTH (accounts.json variants)
// ============================================================================

/// `usercache.json` is deliberately absent: it lists other players seen on servers.
pub struct ModrinthAccountsScanner;

impl ModrinthAccountsScanner {
    pub const FILES: [&'static str; 3] = [
        "accounts.json",
        "launcher/accounts.json",
        "config/accounts.json",
    ];
}

impl Scanner for ModrinthAccountsScanner {
    fn kind(&self) -> ScannerKind {
        ScannerKind::ModrinthAccounts
    }

    fn scan(&self, roots: &SourceRoots, ctx: &mut ScanContext<'_>) {
        for dir in SourceRoots::join_each(&[roots.appdata()], "ModrinthApp") {
            for rel in Self::FILES {
                if let Some(data) = ctx.load_json(&dir.join(rel)) {
                    ctx.extract(&data, "Modrinth App");
                }
            }
        }
    }
}

// ============================================================================
// DEEP SEARCH
// ============================================================================

pub struct DeepSearchScanner;

impl DeepSearchScanner {
    pub const KEYWORDS: [&'static str; 7] = [
        "minecraft", "launcher", "multimc", "tlauncher", "lunar", "badlion", "feather",
    ];

    /// Subdirectory levels searched below each matching directory
    pub const MAX_DEPTH: usize = 3;

    /// Tagged with the directory that holds the file
    pub fn provenance(file: &Path) -> String {
        let dir = file.parent().unwrap_or(file);
        format!("Deep Search ({})", dir.display())
    }

    pub fn matches_keyword(name: &str) -> bool {
        let name = name.to_lowercase();
        Self::KEYWORDS.iter().any(|kw| name.contains(kw))
    }
}

impl Scanner for DeepSearchScanner {
    fn kind(&self) -> ScannerKind {
        ScannerKind::DeepSearch
    }

    fn scan(&self, roots: &SourceRoots, ctx: &mut ScanContext<'_>) {
        let mut searched = Vec::new();
        for root in [roots.appdata(), roots.local_appdata()].into_iter().flatten() {
            // Same directory reachable from two roots is searched once
            let root = root.to_path_buf();
            if searched.contains(&root) {
                continue;
            }
            searched.push(root.clone());

            let Ok(entries) = std::fs::read_dir(&root) else {
                continue;
            };
            let mut dirs: Vec<_> = entries
                .flatten()
                .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
                .filter(|e| e.file_name().to_str().is_some_and(Self::matches_keyword))
                .map(|e| e.path())
                .collect();
            dirs.sort();

            for dir in dirs {
                extract_account_files(&dir, Some(Self::MAX_DEPTH), &Self::provenance, ctx);
            }
        }
    }
}
