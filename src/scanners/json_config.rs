// 🧾 Structured-config scanners - fixed JSON schemas, one launcher each

use super::{entries, file_label, ScanContext, Scanner, ScannerKind};
use crate::roots::SourceRoots;
use serde_json::Value;
use std::path::Path;

// ============================================================================
// OFFICIAL LAUNCHER
// ============================================================================

/// `.minecraft` launcher files: profiles, account stores, Microsoft Store variants
pub struct OfficialLauncherScanner;

impl OfficialLauncherScanner {
    const ACCOUNT_FILES: [&'static str; 2] = [
        "launcher_accounts.json",
        "launcher_accounts_microsoft_store.json",
    ];

    fn scan_profiles(&self, dir: &Path, ctx: &mut ScanContext<'_>) {
        let Some(data) = ctx.load_json(&dir.join("launcher_profiles.json")) else {
            return;
        };

        if let Some(auth) = data.get("authenticationDatabase") {
            for user in entries(auth) {
                ctx.submit_field(user, "displayName", "Minecraft Launcher (authenticationDatabase)");
                ctx.submit_field(user, "username", "Minecraft Launcher (authenticationDatabase)");
            }
        }

        if let Some(profiles) = data.get("profiles") {
            for profile in entries(profiles) {
                ctx.submit_field(profile, "name", "Minecraft Launcher (Profile)");
            }
        }
    }

    fn scan_accounts(&self, dir: &Path, file: &str, ctx: &mut ScanContext<'_>) {
        let Some(data) = ctx.load_json(&dir.join(file)) else {
            return;
        };

        let profile_source = format!("Minecraft Launcher ({})", file);
        let xbox_source = format!("Minecraft Launcher ({}) - Xbox/MS", file);

        if let Some(accounts) = data.get("accounts") {
            for account in entries(accounts) {
                if let Some(profile) = account.get("minecraftProfile") {
                    ctx.submit_field(profile, "name", &profile_source);
                }
                // Top-level username is the Microsoft / Xbox gamertag
                ctx.submit_field(account, "username", &xbox_source);
            }
        }
    }

    fn scan_store_profiles(&self, dir: &Path, ctx: &mut ScanContext<'_>) {
        let Some(data) = ctx.load_json(&dir.join("launcher_profiles_microsoft_store.json")) else {
            return;
        };
        if let Some(profiles) = data.get("profiles") {
            for profile in entries(profiles) {
                ctx.submit_field(profile, "name", "Minecraft MS Store");
            }
        }
    }
}

impl Scanner for OfficialLauncherScanner {
    fn kind(&self) -> ScannerKind {
        ScannerKind::OfficialLauncher
    }

    fn scan(&self, roots: &SourceRoots, ctx: &mut ScanContext<'_>) {
        let Some(appdata) = roots.appdata() else {
            return;
        };
        let dir = appdata.join(".minecraft");

        self.scan_profiles(&dir, ctx);
        for file in Self::ACCOUNT_FILES {
            self.scan_accounts(&dir, file, ctx);
        }
        self.scan_store_profiles(&dir, ctx);
    }
}

// ============================================================================
// TLAUNCHER (accounts.json)
// ============================================================================

pub(crate) fn tlauncher_dirs(roots: &SourceRoots) -> Vec<std::path::PathBuf> {
    let mut dirs = SourceRoots::join_each(&[roots.appdata()], ".tlauncher");
    dirs.extend(SourceRoots::join_each(&[roots.appdata()], "tlauncher"));
    dirs.extend(SourceRoots::join_each(&[roots.user_profile()], ".tlauncher"));
    dirs
}

/// TLauncher `accounts.json`: a list, or a map of account objects
pub struct TLauncherAccountsScanner;

impl Scanner for TLauncherAccountsScanner {
    fn kind(&self) -> ScannerKind {
        ScannerKind::TLauncherAccounts
    }

    fn scan(&self, roots: &SourceRoots, ctx: &mut ScanContext<'_>) {
        for dir in tlauncher_dirs(roots) {
            let Some(data) = ctx.load_json(&dir.join("accounts.json")) else {
                continue;
            };
            for account in entries(&data) {
                ctx.submit_field(account, "username", "TLauncher");
            }
        }
    }
}

// ============================================================================
// MULTIMC / POLYMC / PRISM
// ============================================================================

/// MultiMC-family `accounts.json`: `accounts[].profile.name`
pub struct MultiMcScanner;

impl MultiMcScanner {
    const DIR_NAMES: [&'static str; 3] = ["MultiMC", "PolyMC", "PrismLauncher"];
}

impl Scanner for MultiMcScanner {
    fn kind(&self) -> ScannerKind {
        ScannerKind::MultiMc
    }

    fn scan(&self, roots: &SourceRoots, ctx: &mut ScanContext<'_>) {
        for name in Self::DIR_NAMES {
            for dir in SourceRoots::join_each(&[roots.appdata(), roots.local_appdata()], name) {
                let Some(data) = ctx.load_json(&dir.join("accounts.json")) else {
                    continue;
                };
                let source = format!("MultiMC/PolyMC ({})", file_label(&dir));
                submit_profile_names(&data, "profile", &source, ctx);
            }
        }
    }
}

/// `accounts` collection whose entries nest the name under `profile_key.name`
fn submit_profile_names(data: &Value, profile_key: &str, source: &str, ctx: &mut ScanContext<'_>) {
    let Some(accounts) = data.get("accounts") else {
        return;
    };
    for account in entries(accounts) {
        if let Some(profile) = account.get(profile_key) {
            ctx.submit_field(profile, "name", source);
        }
    }
}

// ============================================================================
// LUNAR CLIENT
// ============================================================================

pub struct LunarClientScanner;

impl Scanner for LunarClientScanner {
    fn kind(&self) -> ScannerKind {
        ScannerKind::LunarClient
    }

    fn scan(&self, roots: &SourceRoots, ctx: &mut ScanContext<'_>) {
        for dir in SourceRoots::join_each(&[roots.user_profile(), roots.appdata()], ".lunarclient") {
            let game_accounts = dir.join("settings").join("game").join("accounts.json");
            if let Some(data) = ctx.load_json(&game_accounts) {
                submit_profile_names(&data, "minecraftProfile", "Lunar Client", ctx);
            }

            if let Some(data) = ctx.load_json(&dir.join("launcher-accounts.json")) {
                if let Value::Object(map) = &data {
                    for account in map.values() {
                        ctx.submit_field(account, "name", "Lunar Client");
                    }
                }
            }
        }
    }
}

// ============================================================================
// FLAT ACCOUNT LISTS (Badlion, LabyMod)
// ============================================================================

/// `[ { "username": .. }, .. ]` - anything that is not a list is ignored
fn submit_username_list(data: &Value, source: &str, ctx: &mut ScanContext<'_>) {
    if let Value::Array(accounts) = data {
        for account in accounts {
            ctx.submit_field(account, "username", source);
        }
    }
}

pub struct BadlionScanner;

impl Scanner for BadlionScanner {
    fn kind(&self) -> ScannerKind {
        ScannerKind::Badlion
    }

    fn scan(&self, roots: &SourceRoots, ctx: &mut ScanContext<'_>) {
        for dir in SourceRoots::join_each(&[roots.appdata()], "Badlion Client") {
            if let Some(data) = ctx.load_json(&dir.join("accounts.json")) {
                submit_username_list(&data, "Badlion Client", ctx);
            }
        }
    }
}

pub struct LabyModScanner;

impl Scanner for LabyModScanner {
    fn kind(&self) -> ScannerKind {
        ScannerKind::LabyMod
    }

    fn scan(&self, roots: &SourceRoots, ctx: &mut ScanContext<'_>) {
        for dir in SourceRoots::join_each(&[roots.appdata()], ".labymod") {
            if let Some(data) = ctx.load_json(&dir.join("accounts.json")) {
                submit_username_list(&data, "LabyMod", ctx);
            }
        }
    }
}

// ============================================================================
// FEATHER CLIENT
// ============================================================================

pub struct FeatherScanner;

impl Scanner for FeatherScanner {
    fn kind(&self) -> ScannerKind {
        ScannerKind::Feather
    }

    fn scan(&self, roots: &SourceRoots, ctx: &mut ScanContext<'_>) {
        for dir in SourceRoots::join_each(&[roots.appdata(), roots.user_profile()], ".feather") {
            if let Some(data) = ctx.load_json(&dir.join("accounts.json")) {
                submit_profile_names(&data, "profile", "Feather Client", ctx);
            }
        }
    }
}

// ============================================================================
// ATLAUNCHER
// ============================================================================

/// ATLauncher `launcher.json`: a single `account.minecraftUsername`
pub struct AtLauncherScanner;

impl Scanner for AtLauncherScanner {
    fn kind(&self) -> ScannerKind {
        ScannerKind::AtLauncher
    }

    fn scan(&self, roots: &SourceRoots, ctx: &mut ScanContext<'_>) {
        for dir in SourceRoots::join_each(&[roots.appdata()], "ATLauncher") {
            let Some(data) = ctx.load_json(&dir.join("launcher.json")) else {
                continue;
            };
            if let Some(account) = data.get("account") {
                ctx.submit_field(account, "minecraftUsername", "ATLauncher");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{Collector, PlatformKind};
    use crate::scanners::ScanOutcome;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn run(scanner: &dyn Scanner, root: &Path) -> (Collector, crate::scanners::ScanReport) {
        let collector = Collector::new();
        let mut ctx = ScanContext::new(&collector, scanner.kind());
        scanner.scan(&SourceRoots::single(root), &mut ctx);
        let report = ctx.finish();
        (collector, report)
    }

    #[test]
    fn test_official_launcher_profiles() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            ".minecraft/launcher_profiles.json",
            r#"{
                "authenticationDatabase": {
                    "abc": { "displayName": "AuthUser1", "username": "mail@example.com" }
                },
                "profiles": { "p1": { "name": "ProfileGuy" }, "p2": { "name": "forge" } }
            }"#,
        );

        let (collector, report) = run(&OfficialLauncherScanner, dir.path());
        let names: Vec<String> = collector.snapshot().into_iter().map(|r| r.username).collect();

        assert_eq!(names, vec!["AuthUser1", "ProfileGuy"]);
        assert_eq!(report.files_read, 1);
        assert_eq!(report.rejected, 2);
        assert_eq!(
            collector.find("AuthUser1").unwrap().sources,
            vec!["Minecraft Launcher (authenticationDatabase)"]
        );
    }

    #[test]
    fn test_official_launcher_xbox_username_is_secondary() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            ".minecraft/launcher_accounts.json",
            r#"{"accounts":{"1":{"username":"XboxPlayer1"}}}"#,
        );

        let (collector, _) = run(&OfficialLauncherScanner, dir.path());
        let record = collector.find("XboxPlayer1").unwrap();

        assert_eq!(record.platform_kind, PlatformKind::Secondary);
        assert_eq!(
            record.sources,
            vec!["Minecraft Launcher (launcher_accounts.json) - Xbox/MS"]
        );
    }

    #[test]
    fn test_official_launcher_minecraft_profile_is_primary() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            ".minecraft/launcher_accounts_microsoft_store.json",
            r#"{"accounts":{"1":{"minecraftProfile":{"name":"JavaGuy"}}}}"#,
        );
        write(
            dir.path(),
            ".minecraft/launcher_profiles_microsoft_store.json",
            r#"{"profiles":{"x":{"name":"StoreGuy"}}}"#,
        );

        let (collector, report) = run(&OfficialLauncherScanner, dir.path());
        assert_eq!(collector.find("JavaGuy").unwrap().platform_kind, PlatformKind::Primary);
        assert_eq!(collector.find("StoreGuy").unwrap().sources, vec!["Minecraft MS Store"]);
        assert_eq!(report.files_read, 2);
    }

    #[test]
    fn test_tlauncher_list_and_map() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".tlauncher/accounts.json", r#"[{"username":"ListUser"}]"#);
        write(dir.path(), "tlauncher/accounts.json", r#"{"a":{"username":"MapUser"},"b":3}"#);

        let (collector, report) = run(&TLauncherAccountsScanner, dir.path());
        assert!(collector.find("ListUser").is_some());
        assert!(collector.find("MapUser").is_some());
        // .tlauncher is reached from both APPDATA and USERPROFILE in a single-root fixture
        assert_eq!(report.files_read, 3);
        assert_eq!(collector.len(), 2);
    }

    #[test]
    fn test_multimc_provenance_names_the_directory() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "PrismLauncher/accounts.json",
            r#"{"accounts":[{"profile":{"name":"PrismUser"}},{"type":"MSA"}]}"#,
        );

        let (collector, _) = run(&MultiMcScanner, dir.path());
        assert_eq!(
            collector.find("PrismUser").unwrap().sources,
            vec!["MultiMC/PolyMC (PrismLauncher)"]
        );
    }

    #[test]
    fn test_lunar_both_files() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            ".lunarclient/settings/game/accounts.json",
            r#"{"accounts":{"id1":{"minecraftProfile":{"name":"LunarOne"}}}}"#,
        );
        write(
            dir.path(),
            ".lunarclient/launcher-accounts.json",
            r#"{"x":{"name":"LunarTwo"},"y":"junk"}"#,
        );

        let (collector, _) = run(&LunarClientScanner, dir.path());
        assert!(collector.find("LunarOne").is_some());
        assert!(collector.find("LunarTwo").is_some());
    }

    #[test]
    fn test_badlion_ignores_non_list() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Badlion Client/accounts.json", r#"{"username":"NotAList"}"#);

        let (collector, report) = run(&BadlionScanner, dir.path());
        assert!(collector.is_empty());
        assert_eq!(report.outcome(), ScanOutcome::Found);
    }

    #[test]
    fn test_labymod_and_feather() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".labymod/accounts.json", r#"[{"username":"LabyUser"}]"#);
        write(
            dir.path(),
            ".feather/accounts.json",
            r#"{"accounts":[{"profile":{"name":"FeatherUser"}}]}"#,
        );

        let (laby, _) = run(&LabyModScanner, dir.path());
        let (feather, _) = run(&FeatherScanner, dir.path());
        assert!(laby.find("LabyUser").is_some());
        assert!(feather.find("FeatherUser").is_some());
    }

    #[test]
    fn test_atlauncher_single_account() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "ATLauncher/launcher.json",
            r#"{"account":{"minecraftUsername":"AtlUser"}}"#,
        );

        let (collector, _) = run(&AtLauncherScanner, dir.path());
        assert_eq!(collector.find("atluser").unwrap().sources, vec!["ATLauncher"]);
    }

    #[test]
    fn test_malformed_file_does_not_stop_scan() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".minecraft/launcher_profiles.json", "{ truncated");
        write(
            dir.path(),
            ".minecraft/launcher_accounts.json",
            r#"{"accounts":{"1":{"minecraftProfile":{"name":"StillFound"}}}}"#,
        );

        let (collector, report) = run(&OfficialLauncherScanner, dir.path());
        assert!(collector.find("StillFound").is_some());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.outcome(), ScanOutcome::Found);
    }
}
