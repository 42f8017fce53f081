// 📁 Source Roots - per-user base directories the scanners look under
// Resolution order: explicit override > Windows env var > dirs fallback.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRoots {
    /// %APPDATA% (roaming application data)
    pub appdata: Option<PathBuf>,

    /// %LOCALAPPDATA%
    pub local_appdata: Option<PathBuf>,

    /// %USERPROFILE% (home directory)
    pub user_profile: Option<PathBuf>,
}

impl SourceRoots {
    /// Resolve from the environment, filling gaps from `overrides` first.
    pub fn resolve(overrides: &SourceRoots) -> Self {
        SourceRoots {
            appdata: overrides
                .appdata
                .clone()
                .or_else(|| env_path("APPDATA"))
                .or_else(dirs::config_dir),
            local_appdata: overrides
                .local_appdata
                .clone()
                .or_else(|| env_path("LOCALAPPDATA"))
                .or_else(dirs::data_local_dir),
            user_profile: overrides
                .user_profile
                .clone()
                .or_else(|| env_path("USERPROFILE"))
                .or_else(dirs::home_dir),
        }
    }

    /// All three roots pointing at the same directory (fixtures, portable installs)
    pub fn single(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        SourceRoots {
            appdata: Some(root.clone()),
            local_appdata: Some(root.clone()),
            user_profile: Some(root),
        }
    }

    /// `root/rel` for each present root, in the order given
    pub fn join_each(roots: &[Option<&Path>], rel: &str) -> Vec<PathBuf> {
        roots.iter().flatten().map(|r| r.join(rel)).collect()
    }

    pub fn appdata(&self) -> Option<&Path> {
        self.appdata.as_deref()
    }

    pub fn local_appdata(&self) -> Option<&Path> {
        self.local_appdata.as_deref()
    }

    pub fn user_profile(&self) -> Option<&Path> {
        self.user_profile.as_deref()
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win() {
        let overrides = SourceRoots::single("/fixtures");
        let roots = SourceRoots::resolve(&overrides);
        assert_eq!(roots.appdata(), Some(Path::new("/fixtures")));
        assert_eq!(roots.local_appdata(), Some(Path::new("/fixtures")));
        assert_eq!(roots.user_profile(), Some(Path::new("/fixtures")));
    }

    #[test]
    fn test_join_each_skips_missing_roots() {
        let roots = SourceRoots {
            appdata: Some(PathBuf::from("/a")),
            local_appdata: None,
            user_profile: Some(PathBuf::from("/u")),
        };
        let paths = SourceRoots::join_each(
            &[roots.appdata(), roots.local_appdata(), roots.user_profile()],
            ".feather",
        );
        assert_eq!(paths, vec![PathBuf::from("/a/.feather"), PathBuf::from("/u/.feather")]);
    }
}
