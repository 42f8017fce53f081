// Colored output and keypress wait; plain fallback without the `console` feature
mod console;

use alt_checker::{
    run_all, sink, Collector, Config, IdentityResolver, NullSink, ReportBuilder, ScanOptions,
    SourceRoots,
};
use anyhow::{Context, Result};
use chrono::Local;
use console::Tone;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = Config::load();
    run(&config);

    if config.wait_for_keypress {
        console::wait_for_keypress();
    }
    Ok(())
}

/// Full sweep. Every failure past this point is logged and the run carries on.
fn run(config: &Config) {
    console::banner("MINECRAFT ALT ACCOUNT CHECKER");
    console::line(
        Tone::Warn,
        &format!("\nStart time: {}", Local::now().format("%Y-%m-%d %H:%M:%S")),
    );

    // 1. Scan every source
    let roots = SourceRoots::resolve(&config.roots);
    let collector = Collector::new();
    let options = ScanOptions {
        db_busy_timeout: config.db_busy_timeout(),
    };
    let reports = run_all(&roots, &collector, &options);
    console::scan_summary(&reports);

    // 2. Show what was found
    console::results(&ReportBuilder::new(collector.snapshot()));
    if collector.is_empty() {
        return;
    }

    // 3. Resolve identities (without a client the records stay unresolved)
    console::line(Tone::Section, "\n[*] Fetching UUIDs...");
    match IdentityResolver::http(&config.services, config.lookup_timeout())
        .context("Failed to set up identity lookups")
    {
        Ok(resolver) => {
            let resolved = resolver
                .with_concurrency(config.lookup_concurrency)
                .resolve_all(&collector);
            info!(resolved, "identity resolution finished");
        }
        Err(e) => {
            warn!("{:#}", e);
            console::line(Tone::Bad, &format!("[-] {:#}", e));
        }
    }

    // 4. Artifacts + notification; neither failure stops the other
    let sink = sink::from_config(config).unwrap_or_else(|e| {
        warn!("{}", e);
        console::line(Tone::Bad, &format!("[-] {}", e));
        Box::new(NullSink)
    });
    let report = ReportBuilder::new(collector.snapshot());
    let publication = sink::publish(&report, &config.output_dir, sink.as_ref());

    for path in &publication.written {
        console::line(Tone::Good, &format!("[+] Results exported to: {}", path.display()));
    }
    for e in [&publication.artifact_error, &publication.delivery_error].into_iter().flatten() {
        console::line(Tone::Bad, &format!("[-] {}", e));
    }

    console::line(Tone::Header, &format!("\n{}", "=".repeat(60)));
}
