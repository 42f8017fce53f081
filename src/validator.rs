// ✅ Name Validator - is a candidate a plausible Minecraft account name?
// Pure predicate: length, charset, exclusion list. No I/O.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 16;

/// Tokens that show up in launcher configs under name-like keys but are never accounts
pub const EXCLUDED_NAMES: &[&str] = &[
    // Technical terms
    "init", "oled", "home", "amd64", "search_results", "loader_manifest",
    "game_versions", "loaders", "true", "false", "null", "none", "default",
    "config", "mods", "saves", "logs", "resourcepacks", "shaderpacks",
    "versions", "assets", "libraries", "runtime", "bin", "natives",
    // Mod loaders / modding platforms
    "fabric", "quilt", "neo", "forge", "neoforge", "liteloader", "modloader",
    "optifine", "iris", "canvas", "sodium", "lithium", "phosphor",
    // Server software
    "bukkit", "bungeecord", "paper", "purpur", "spigot", "velocity",
    "waterfall", "folia", "geyser", "sponge",
    // Roles and generic vocabulary
    "babric", "ornithe", "nilloader", "datapack", "minecraft", "java",
    "client", "server", "vanilla", "snapshot", "release", "beta", "alpha",
    "main", "test", "debug", "dev", "prod", "local", "global", "user",
    "player", "guest", "admin", "owner", "mod", "staff", "member",
    "launcher", "profile", "instance", "world", "dimension", "biome",
];

fn excluded() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| EXCLUDED_NAMES.iter().copied().collect())
}

// ============================================================================
// REJECTION REASONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rejection {
    /// Empty or whitespace-only
    Empty,
    /// Outside [3, 16] characters
    Length,
    /// Contains a character outside [A-Za-z0-9_]
    Charset,
    /// On the exclusion list (case-insensitive)
    Excluded,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::Empty => "empty",
            Rejection::Length => "length",
            Rejection::Charset => "charset",
            Rejection::Excluded => "excluded",
        }
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Why `candidate` is not a plausible account name, or `None` if it is.
///
/// The candidate is checked as given; callers that want trimming (the
/// collector does) trim first.
pub fn rejection_reason(candidate: &str) -> Option<Rejection> {
    if candidate.trim().is_empty() {
        return Some(Rejection::Empty);
    }

    // Charset is ASCII-only, so byte length == char length once it passes;
    // count chars here so multi-byte junk gets the length verdict consistently.
    let len = candidate.chars().count();
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        return Some(Rejection::Length);
    }

    if !candidate
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Some(Rejection::Charset);
    }

    if excluded().contains(candidate.to_ascii_lowercase().as_str()) {
        return Some(Rejection::Excluded);
    }

    None
}

pub fn is_valid_name(candidate: &str) -> bool {
    rejection_reason(candidate).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_names() {
        assert!(is_valid_name("Steve"));
        assert!(is_valid_name("Alex_123"));
        assert!(is_valid_name("abc"));
        assert!(is_valid_name("A234567890123456"));
    }

    #[test]
    fn test_rejects_empty_and_whitespace() {
        assert_eq!(rejection_reason(""), Some(Rejection::Empty));
        assert_eq!(rejection_reason("   "), Some(Rejection::Empty));
    }

    #[test]
    fn test_length_bounds() {
        assert_eq!(rejection_reason("ab"), Some(Rejection::Length));
        assert_eq!(rejection_reason("A2345678901234567"), Some(Rejection::Length));
    }

    #[test]
    fn test_rejects_bad_characters() {
        assert_eq!(rejection_reason("bad name"), Some(Rejection::Charset));
        assert_eq!(rejection_reason("name!"), Some(Rejection::Charset));
        assert_eq!(rejection_reason("Jürgen"), Some(Rejection::Charset));
        assert_eq!(rejection_reason("a-b-c"), Some(Rejection::Charset));
    }

    #[test]
    fn test_exclusion_is_case_insensitive() {
        assert_eq!(rejection_reason("Forge"), Some(Rejection::Excluded));
        assert_eq!(rejection_reason("MINECRAFT"), Some(Rejection::Excluded));
        assert_eq!(rejection_reason("search_results"), Some(Rejection::Excluded));
        assert!(is_valid_name("Forged"));
    }

    #[test]
    fn test_exclusion_list_is_lowercase() {
        for name in EXCLUDED_NAMES {
            assert_eq!(*name, name.to_lowercase());
        }
        assert!(EXCLUDED_NAMES.len() >= 70);
    }
}
