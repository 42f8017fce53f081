// 📜 Log-text scanner - `.minecraft/logs/*.log` and rotated `*.log.gz`

use super::{ScanContext, Scanner, ScannerKind};
use crate::error::Error;
use crate::roots::SourceRoots;
use flate2::read::MultiGzDecoder;
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

const SOURCE: &str = "Minecraft Logs";

/// `Setting user: <name>` printed by the client at session start
fn session_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Setting user: ([A-Za-z0-9_]+)").expect("static pattern"))
}

/// `[Client thread/INFO]: <name> (Session ID ...` printed on connect
fn client_connect() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[Client thread/INFO\]: ([A-Za-z0-9_]+) \(Session ID").expect("static pattern")
    })
}

/// Names announced by either marker, in order of appearance per marker
pub fn names_in_log(content: &str) -> Vec<String> {
    [session_start(), client_connect()]
        .iter()
        .flat_map(|re| re.captures_iter(content))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Decompressed, lossy-UTF-8 content of a plain or gzip log (every gzip member)
pub fn read_log(path: &Path) -> crate::Result<String> {
    let mut bytes = Vec::new();
    let file = File::open(path)?;
    if is_gzip(path) {
        MultiGzDecoder::new(file)
            .read_to_end(&mut bytes)
            .map_err(|e| Error::malformed(path, e))?;
    } else {
        let mut file = file;
        file.read_to_end(&mut bytes)?;
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn is_gzip(path: &Path) -> bool {
    path.to_str().is_some_and(|p| p.ends_with(".log.gz"))
}

fn is_log(path: &Path) -> bool {
    path.to_str()
        .is_some_and(|p| p.ends_with(".log") || p.ends_with(".log.gz"))
}

pub struct MinecraftLogsScanner;

impl Scanner for MinecraftLogsScanner {
    fn kind(&self) -> ScannerKind {
        ScannerKind::MinecraftLogs
    }

    fn scan(&self, roots: &SourceRoots, ctx: &mut ScanContext<'_>) {
        for logs_dir in SourceRoots::join_each(&[roots.appdata()], ".minecraft/logs") {
            let entries = match std::fs::read_dir(&logs_dir) {
                Ok(entries) => entries,
                Err(_) => continue,
            };

            let mut paths: Vec<_> = entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| p.is_file() && is_log(p))
                .collect();
            paths.sort();

            for path in paths {
                match read_log(&path) {
                    Ok(content) => {
                        ctx.file_read();
                        for name in names_in_log(&content) {
                            ctx.submit(&name, SOURCE);
                        }
                    }
                    Err(e) => ctx.record(e),
                }
            }
        }
    }
}
