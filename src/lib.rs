// Minecraft Alt Checker - Core Library
// Scanners, collector, identity resolver and report builder; the binary wires them up

pub mod error;
pub mod validator;
pub mod collector;
pub mod roots;
pub mod config;
pub mod extractor;
pub mod scanners;
pub mod resolver;
pub mod report;
pub mod sink;

// Re-export commonly used types
pub use error::{Error, LookupError, Result};
pub use validator::{is_valid_name, rejection_reason, Rejection};
pub use collector::{
    AccountRecord, Collector, PersistentId, PlatformKind, Rename, Resolution, SubmitOutcome,
    SENTINEL_NOT_FOUND, SENTINEL_SECONDARY,
};
pub use roots::SourceRoots;
pub use config::{Config, ServiceEndpoints};
pub use scanners::{
    get_scanner, run_all, run_scanners, ScanContext, ScanOptions, ScanOutcome, ScanReport,
    Scanner, ScannerKind,
};
pub use resolver::{format_uuid, IdentityResolver, IdentityService, Profile};
pub use report::{Classification, NotificationPayload, ReportBuilder};
pub use sink::{NullSink, ReportSink, WebhookSink};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
