// 📥 Collector - Registry of discovered accounts
//
// One AccountRecord per case-insensitive username. Records are created only by a
// successful validation, mutated only by merge (provenance union) or by the
// identity resolver, and never deleted.

use crate::validator::{rejection_reason, Rejection};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// Provenance substring (case-insensitive) that marks the Bedrock / Xbox ecosystem
pub const SECONDARY_PLATFORM_MARKER: &str = "xbox";

pub const SENTINEL_SECONDARY: &str = "No UUID (Bedrock account)";
pub const SENTINEL_NOT_FOUND: &str = "Not found (Name changed?)";

// ============================================================================
// PLATFORM KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    /// Java Edition: has (or may have) a Mojang profile UUID
    Primary,
    /// Bedrock via Xbox / Microsoft Store: no Java UUID expected
    Secondary,
}

impl PlatformKind {
    /// Initial guess from the provenance tag of the first discovery
    pub fn infer(provenance: &str) -> Self {
        if provenance
            .to_lowercase()
            .contains(SECONDARY_PLATFORM_MARKER)
        {
            PlatformKind::Secondary
        } else {
            PlatformKind::Primary
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::Primary => "JAVA",
            PlatformKind::Secondary => "BEDROCK",
        }
    }
}

// ============================================================================
// PERSISTENT ID
// ============================================================================

/// Resolved identity. Serializes to the dashed UUID or to its sentinel text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PersistentId {
    Confirmed(String),
    SecondaryPlatform,
    NotFound,
}

impl PersistentId {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, PersistentId::Confirmed(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            PersistentId::Confirmed(id) => id,
            PersistentId::SecondaryPlatform => SENTINEL_SECONDARY,
            PersistentId::NotFound => SENTINEL_NOT_FOUND,
        }
    }
}

impl fmt::Display for PersistentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PersistentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// ACCOUNT RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rename {
    pub previous_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountRecord {
    /// Canonical display name (updated when a rename is discovered)
    pub username: String,

    /// Provenance tags in first-seen order; grows by union, never shrinks
    pub sources: Vec<String>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub extra_info: String,

    pub persistent_id: Option<PersistentId>,

    pub platform_kind: PlatformKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rename: Option<Rename>,

    pub discovered_at: DateTime<Utc>,
}

impl AccountRecord {
    pub fn new(username: String, provenance: String, extra_info: String) -> Self {
        AccountRecord {
            platform_kind: PlatformKind::infer(&provenance),
            username,
            sources: vec![provenance],
            extra_info,
            persistent_id: None,
            rename: None,
            discovered_at: Utc::now(),
        }
    }

    /// Provenance label used for grouping ("A, B")
    pub fn source_label(&self) -> String {
        self.sources.join(", ")
    }

    pub fn is_resolved(&self) -> bool {
        self.persistent_id.is_some()
    }
}

// ============================================================================
// RESOLUTION (written back by the identity resolver)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Found under the queried name
    Confirmed { id: String },
    /// Found, but the account now goes by `current_name`
    Renamed { id: String, current_name: String },
    /// Primary miss on a Bedrock-sourced record
    SecondaryPlatform,
    /// No service knew the name
    NotFound,
}

// ============================================================================
// SUBMIT OUTCOME
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created,
    /// Known name, new provenance tag added
    Merged,
    /// Known name and tag; nothing changed
    AlreadyKnown,
    Rejected(Rejection),
}

// ============================================================================
// COLLECTOR
// ============================================================================

#[derive(Default)]
struct Registry {
    records: Vec<AccountRecord>,
    /// lowercase username -> index into `records`
    index: HashMap<String, usize>,
}

/// Shared, cloneable handle; clones see the same registry.
#[derive(Clone, Default)]
pub struct Collector {
    inner: Arc<RwLock<Registry>>,
}

impl Collector {
    pub fn new() -> Self {
        Collector::default()
    }

    // A panic while holding the lock cannot leave a half-merged record (every
    // mutation is a single push or field write), so poisoned state is still usable.
    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn submit(&self, candidate: &str, provenance: &str) -> SubmitOutcome {
        self.submit_with_info(candidate, provenance, "")
    }

    /// Validate and record a candidate name. Invalid candidates are dropped.
    pub fn submit_with_info(
        &self,
        candidate: &str,
        provenance: &str,
        extra_info: &str,
    ) -> SubmitOutcome {
        let name = candidate.trim();
        if let Some(reason) = rejection_reason(name) {
            return SubmitOutcome::Rejected(reason);
        }

        let key = name.to_lowercase();
        let mut registry = self.write();

        if let Some(&idx) = registry.index.get(&key) {
            let record = &mut registry.records[idx];
            if record.sources.iter().any(|s| s == provenance) {
                return SubmitOutcome::AlreadyKnown;
            }
            record.sources.push(provenance.to_string());
            debug!(username = %record.username, source = provenance, "also found");
            return SubmitOutcome::Merged;
        }

        let record = AccountRecord::new(
            name.to_string(),
            provenance.to_string(),
            extra_info.to_string(),
        );
        info!(
            username = %record.username,
            source = provenance,
            platform = record.platform_kind.as_str(),
            "found account"
        );
        let idx = registry.records.len();
        registry.records.push(record);
        registry.index.insert(key, idx);
        SubmitOutcome::Created
    }

    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-only copy of all records in discovery order
    pub fn snapshot(&self) -> Vec<AccountRecord> {
        self.read().records.clone()
    }

    pub fn get(&self, index: usize) -> Option<AccountRecord> {
        self.read().records.get(index).cloned()
    }

    /// Case-insensitive lookup by current username
    pub fn find(&self, username: &str) -> Option<AccountRecord> {
        let registry = self.read();
        registry
            .index
            .get(&username.to_lowercase())
            .map(|&idx| registry.records[idx].clone())
    }

    /// Indices of records that still lack a persistent id
    pub fn unresolved(&self) -> Vec<usize> {
        self.read()
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_resolved())
            .map(|(i, _)| i)
            .collect()
    }

    /// Apply one resolver verdict to the record at `index`.
    ///
    /// A rename onto a name already held by a different record keeps the
    /// queried username so the one-record-per-name rule still holds; the id is
    /// stored either way and the report collapses the pair by id.
    pub fn apply_resolution(&self, index: usize, resolution: Resolution) {
        let mut registry = self.write();
        let Registry { records, index: by_name } = &mut *registry;
        let Some(record) = records.get_mut(index) else {
            return;
        };

        match resolution {
            Resolution::Confirmed { id } => {
                record.persistent_id = Some(PersistentId::Confirmed(id));
                record.platform_kind = PlatformKind::Primary;
            }
            Resolution::Renamed { id, current_name } => {
                record.persistent_id = Some(PersistentId::Confirmed(id));
                record.platform_kind = PlatformKind::Primary;

                let new_key = current_name.to_lowercase();
                let old_key = record.username.to_lowercase();
                if new_key == old_key {
                    return;
                }
                if by_name.get(&new_key).is_some_and(|&other| other != index) {
                    debug!(
                        username = %record.username,
                        current = %current_name,
                        "current name already collected; keeping queried name"
                    );
                    return;
                }
                by_name.remove(&old_key);
                by_name.insert(new_key, index);
                let previous = std::mem::replace(&mut record.username, current_name);
                record.rename = Some(Rename { previous_name: previous });
            }
            Resolution::SecondaryPlatform => {
                record.persistent_id = Some(PersistentId::SecondaryPlatform);
            }
            Resolution::NotFound => {
                record.persistent_id = Some(PersistentId::NotFound);
            }
        }
    }
}
