// 📣 Report Sinks - where the notification payload goes
//
// Delivery is optional and never affects the run: callers log the error and move on.

use crate::error::Error;
use crate::report::{Classification, NotificationPayload, ReportBuilder};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

pub trait ReportSink {
    fn name(&self) -> &str;

    fn deliver(&self, payload: &NotificationPayload) -> crate::Result<()>;
}

/// Default when no endpoint is configured
pub struct NullSink;

impl ReportSink for NullSink {
    fn name(&self) -> &str {
        "none"
    }

    fn deliver(&self, payload: &NotificationPayload) -> crate::Result<()> {
        debug!(entries = payload.entries.len(), "no notification endpoint configured");
        Ok(())
    }
}

// ============================================================================
// WEBHOOK (Discord embed)
// ============================================================================

const EMBED_COLOR: u32 = 0xFF0000;

pub struct WebhookSink {
    client: Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: &str, timeout: Duration) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Notification(format!("HTTP client: {}", e)))?;
        Ok(WebhookSink {
            client,
            url: url.to_string(),
        })
    }

    /// Discord webhook body: one embed, one field per entry
    pub fn render(payload: &NotificationPayload) -> Value {
        let fields: Vec<Value> = payload
            .entries
            .iter()
            .map(|entry| {
                let identifier = entry.identifier.as_deref().unwrap_or("Unknown");
                let (name, value) = match entry.status {
                    Classification::Primary => {
                        let tag = if entry.renamed { " [Updated IGN]" } else { "" };
                        (
                            format!(":coffee: {} [JAVA]{}", entry.username, tag),
                            format!("```{}```", identifier),
                        )
                    }
                    Classification::Secondary => (
                        format!(":rock: {} [BEDROCK]", entry.username),
                        format!("```{}```", identifier),
                    ),
                    Classification::Unconfirmed => (
                        format!(":question: {} [NOT FOUND]", entry.username),
                        format!(
                            "[Check on NameMC]({})",
                            entry.lookup_link.as_deref().unwrap_or_default()
                        ),
                    ),
                };
                json!({ "name": name, "value": value, "inline": false })
            })
            .collect();

        json!({
            "username": payload.origin.tool,
            "embeds": [{
                "title": format!(":pick: {}", payload.title),
                "description": format!(
                    "**{}** verified account(s) found\n**{}** unverified",
                    payload.summary.verified, payload.summary.unverified
                ),
                "color": EMBED_COLOR,
                "fields": fields,
                "footer": {
                    "text": format!("{} v{}", payload.origin.tool, payload.origin.version)
                },
                "timestamp": payload.origin.generated_at.to_rfc3339(),
            }]
        })
    }
}

impl ReportSink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    fn deliver(&self, payload: &NotificationPayload) -> crate::Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&Self::render(payload))
            .send()
            .map_err(|e| Error::Notification(e.to_string()))?;

        match response.status() {
            StatusCode::NO_CONTENT => {
                info!("results sent to webhook");
                Ok(())
            }
            status => Err(Error::Notification(format!(
                "webhook answered {}",
                status.as_u16()
            ))),
        }
    }
}

/// Webhook when a URL is configured, otherwise NullSink
pub fn from_config(config: &crate::config::Config) -> crate::Result<Box<dyn ReportSink>> {
    match config.webhook_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => {
            Ok(Box::new(WebhookSink::new(url, config.notify_timeout())?))
        }
        _ => Ok(Box::new(NullSink)),
    }
}

// ============================================================================
// PUBLISH (artifacts + delivery)
// ============================================================================

/// Result of publishing a finished run; a failure on one side never skips the other
#[derive(Debug)]
pub struct Publication {
    pub written: Vec<PathBuf>,
    pub artifact_error: Option<Error>,
    pub delivery_error: Option<Error>,
}

/// Write the artifacts into `output_dir`, then hand the payload to `sink`.
pub fn publish(report: &ReportBuilder, output_dir: &Path, sink: &dyn ReportSink) -> Publication {
    let (written, artifact_error) = match report.write_artifacts(output_dir) {
        Ok(written) => (written, None),
        Err(e) => {
            warn!("Failed to write results to {}: {}", output_dir.display(), e);
            (Vec::new(), Some(e))
        }
    };

    let delivery_error = sink.deliver(&report.notification()).err();
    if let Some(e) = &delivery_error {
        warn!(sink = sink.name(), "{}", e);
    }

    Publication {
        written,
        artifact_error,
        delivery_error,
    }
}
