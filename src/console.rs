// 🖥️ Console output - colored sections for the interactive run
//
// With the `console` feature off everything prints plain and no keypress is awaited.

use alt_checker::report::ReportBuilder;
use alt_checker::scanners::{ScanOutcome, ScanReport};
use std::io::{self, Write};

#[cfg(feature = "console")]
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{disable_raw_mode, enable_raw_mode},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Header,
    Section,
    Good,
    Warn,
    Bad,
}

#[cfg(feature = "console")]
impl Tone {
    fn color(self) -> Color {
        match self {
            Tone::Header => Color::Magenta,
            Tone::Section => Color::Cyan,
            Tone::Good => Color::Green,
            Tone::Warn => Color::Yellow,
            Tone::Bad => Color::Red,
        }
    }
}

#[cfg(feature = "console")]
pub fn line(tone: Tone, text: &str) {
    let mut stdout = io::stdout();
    let _ = execute!(
        stdout,
        SetForegroundColor(tone.color()),
        Print(text),
        ResetColor,
        Print("\n")
    );
}

#[cfg(not(feature = "console"))]
pub fn line(_tone: Tone, text: &str) {
    println!("{}", text);
}

pub fn banner(title: &str) {
    let rule = "=".repeat(60);
    line(Tone::Header, &rule);
    line(Tone::Header, &format!("{:^60}", title));
    line(Tone::Header, &rule);
}

/// Per-scanner summary; sources that were simply absent stay quiet
pub fn scan_summary(reports: &[ScanReport]) {
    for report in reports {
        match report.outcome() {
            ScanOutcome::Found => line(Tone::Section, &format!("[*] {}", report.summary())),
            ScanOutcome::Malformed => line(Tone::Warn, &format!("[!] {}", report.summary())),
            ScanOutcome::Missing => {}
        }
    }
}

/// `[label]` headers with `-> name` lines, labels sorted for display
pub fn grouped_listing(report: &ReportBuilder) -> Vec<(Tone, String)> {
    let mut groups = report.groups();
    groups.sort_by(|a, b| a.0.cmp(&b.0));

    let mut lines = Vec::new();
    for (label, names) in groups {
        lines.push((Tone::Section, format!("\n  [{}]", label)));
        for name in names {
            lines.push((Tone::Warn, format!("    -> {}", name)));
        }
    }
    lines
}

pub fn results(report: &ReportBuilder) {
    banner("RESULTS");
    if report.is_empty() {
        line(Tone::Bad, "\n[-] No Minecraft accounts found.");
        return;
    }
    line(
        Tone::Good,
        &format!("\n[+] Total {} account(s) found:\n", report.len()),
    );
    for (tone, text) in grouped_listing(report) {
        line(tone, &text);
    }
}

#[cfg(feature = "console")]
pub fn wait_for_keypress() {
    print!("\nPress Enter to exit...");
    let _ = io::stdout().flush();

    if enable_raw_mode().is_err() {
        return;
    }
    loop {
        match event::read() {
            Ok(Event::Key(key))
                if key.kind == KeyEventKind::Press
                    && matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')) =>
            {
                break
            }
            Ok(_) => continue,
            Err(_) => break,
        }
    }
    let _ = disable_raw_mode();
    println!();
}

#[cfg(not(feature = "console"))]
pub fn wait_for_keypress() {
    let _ = io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use alt_checker::Collector;

    #[test]
    fn test_grouped_listing_sorts_labels() {
        let collector = Collector::new();
        collector.submit("Zed_1", "TLauncher");
        collector.submit("Amy_1", "Lunar Client");
        collector.submit("Bob_1", "TLauncher");

        let lines = grouped_listing(&ReportBuilder::new(collector.snapshot()));
        let texts: Vec<&str> = lines.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "\n  [Lunar Client]",
                "    -> Amy_1",
                "\n  [TLauncher]",
                "    -> Zed_1",
                "    -> Bob_1",
            ]
        );
        assert_eq!(lines[0].0, Tone::Section);
    }
}
