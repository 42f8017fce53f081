// 🪪 Identity Resolver - match collected names to Mojang profile UUIDs
//
// 1. Primary (Mojang) by current name -> Confirmed.
// 2. Primary miss on a Bedrock-sourced record -> SecondaryPlatform, stop.
// 3. Otherwise try each fallback service in order; first hit wins, and a
//    different current name means the account was renamed.
// 4. Nobody knows it -> NotFound.
//
// Every remote failure is a miss. Nothing here propagates an error.

use crate::collector::{AccountRecord, Collector, PlatformKind, Resolution};
use crate::config::ServiceEndpoints;
use crate::error::{Error, LookupError};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

// ============================================================================
// PROFILE + UUID FORMAT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Dashed lowercase UUID when parseable, otherwise as returned
    pub id: String,
    pub name: String,
}

impl Profile {
    pub fn new(id: &str, name: &str) -> Self {
        Profile {
            id: format_uuid(id),
            name: name.to_string(),
        }
    }
}

/// `0123456789abcdef0123456789abcdef` -> `01234567-89ab-cdef-0123-456789abcdef`
pub fn format_uuid(raw: &str) -> String {
    match uuid::Uuid::try_parse(raw.trim()) {
        Ok(id) => id.hyphenated().to_string(),
        Err(_) => raw.to_string(),
    }
}

// ============================================================================
// SERVICE TRAIT
// ============================================================================

pub trait IdentityService: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` = the service answered and does not know the name.
    fn lookup(&self, username: &str) -> Result<Option<Profile>, LookupError>;
}

/// GET `url`; 200 decodes into `T`, 204/404 is a clean miss, anything else is an error.
fn get_json<T: for<'de> Deserialize<'de>>(
    client: &Client,
    url: &str,
) -> Result<Option<T>, LookupError> {
    let response = client.get(url).send()?;
    match response.status() {
        StatusCode::OK => {
            let body = response.text()?;
            serde_json::from_str(&body)
                .map(Some)
                .map_err(|e| LookupError::Decode(e.to_string()))
        }
        StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(None),
        other => Err(LookupError::Status(other.as_u16())),
    }
}

fn segment(username: &str) -> String {
    urlencoding::encode(username).into_owned()
}

// ============================================================================
// MOJANG (primary)
// ============================================================================

#[derive(Deserialize)]
struct MojangProfile {
    id: String,
    name: String,
}

pub struct MojangService {
    client: Client,
    base: String,
}

impl MojangService {
    pub fn new(client: Client, base: &str) -> Self {
        MojangService {
            client,
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

impl IdentityService for MojangService {
    fn name(&self) -> &str {
        "Mojang"
    }

    fn lookup(&self, username: &str) -> Result<Option<Profile>, LookupError> {
        let url = format!("{}/users/profiles/minecraft/{}", self.base, segment(username));
        Ok(get_json::<MojangProfile>(&self.client, &url)?
            .filter(|p| !p.id.is_empty())
            .map(|p| Profile::new(&p.id, &p.name)))
    }
}

// ============================================================================
// ASHCON
// ============================================================================

#[derive(Deserialize)]
struct AshconUser {
    #[serde(default)]
    uuid: String,
    #[serde(default)]
    username: String,
}

pub struct AshconService {
    client: Client,
    base: String,
}

impl AshconService {
    pub fn new(client: Client, base: &str) -> Self {
        AshconService {
            client,
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

impl IdentityService for AshconService {
    fn name(&self) -> &str {
        "Ashcon"
    }

    fn lookup(&self, username: &str) -> Result<Option<Profile>, LookupError> {
        let url = format!("{}/mojang/v2/user/{}", self.base, segment(username));
        Ok(get_json::<AshconUser>(&self.client, &url)?
            .filter(|u| !u.uuid.is_empty() && !u.username.is_empty())
            .map(|u| Profile::new(&u.uuid, &u.username)))
    }
}

// ============================================================================
// MINETOOLS
// ============================================================================

#[derive(Deserialize)]
struct MinetoolsUuid {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

pub struct MinetoolsService {
    client: Client,
    base: String,
}

impl MinetoolsService {
    pub fn new(client: Client, base: &str) -> Self {
        MinetoolsService {
            client,
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

impl IdentityService for MinetoolsService {
    fn name(&self) -> &str {
        "Minetools"
    }

    fn lookup(&self, username: &str) -> Result<Option<Profile>, LookupError> {
        let url = format!("{}/uuid/{}", self.base, segment(username));
        let Some(body) = get_json::<MinetoolsUuid>(&self.client, &url)? else {
            return Ok(None);
        };
        if body.status.as_deref() == Some("ERR") {
            return Ok(None);
        }
        Ok(match (body.id, body.name) {
            (Some(id), Some(name)) if !id.is_empty() && !name.is_empty() => {
                Some(Profile::new(&id, &name))
            }
            _ => None,
        })
    }
}

// ============================================================================
// PLAYERDB
// ============================================================================

#[derive(Deserialize)]
struct PlayerDbResponse {
    #[serde(default)]
    success: bool,
    data: Option<PlayerDbData>,
}

#[derive(Deserialize)]
struct PlayerDbData {
    player: Option<PlayerDbPlayer>,
}

#[derive(Deserialize)]
struct PlayerDbPlayer {
    #[serde(default)]
    id: String,
    #[serde(default)]
    username: String,
}

pub struct PlayerDbService {
    client: Client,
    base: String,
}

impl PlayerDbService {
    /// Status PlayerDB answers for a name it does not know
    pub const UNKNOWN_PLAYER_STATUS: u16 = 400;

    pub fn new(client: Client, base: &str) -> Self {
        PlayerDbService {
            client,
            base: base.trim_end_matches('/').to_string(),
        }
    }

    /// An unknown-player status is a clean miss, not a failure
    fn unknown_as_miss<T>(result: Result<Option<T>, LookupError>) -> Result<Option<T>, LookupError> {
        match result {
            Err(LookupError::Status(Self::UNKNOWN_PLAYER_STATUS)) => Ok(None),
            other => other,
        }
    }
}

impl IdentityService for PlayerDbService {
    fn name(&self) -> &str {
        "PlayerDB"
    }

    fn lookup(&self, username: &str) -> Result<Option<Profile>, LookupError> {
        let url = format!("{}/api/player/minecraft/{}", self.base, segment(username));
        let response = get_json::<PlayerDbResponse>(&self.client, &url);
        let Some(body) = Self::unknown_as_miss(response)? else {
            return Ok(None);
        };
        if !body.success {
            return Ok(None);
        }
        Ok(body
            .data
            .and_then(|d| d.player)
            .filter(|p| !p.id.is_empty() && !p.username.is_empty())
            .map(|p| Profile::new(&p.id, &p.username)))
    }
}

// ============================================================================
// LABY.NET (+ Mojang reverse lookup for the current name)
// ============================================================================

#[derive(Deserialize)]
struct LabyUuid {
    #[serde(default)]
    uuid: String,
}

#[derive(Deserialize)]
struct MojangName {
    #[serde(default)]
    name: Option<String>,
}

pub struct LabyService {
    client: Client,
    base: String,
    session_base: String,
}

impl LabyService {
    pub fn new(client: Client, base: &str, session_base: &str) -> Self {
        LabyService {
            client,
            base: base.trim_end_matches('/').to_string(),
            session_base: session_base.trim_end_matches('/').to_string(),
        }
    }

    /// id -> current name. `Ok(None)` when the profile is unknown.
    /// A profile body without a name yields `fallback`.
    pub fn current_name(&self, id: &str, fallback: &str) -> Result<Option<String>, LookupError> {
        let url = format!("{}/user/profile/{}", self.session_base, segment(id));
        Ok(get_json::<MojangName>(&self.client, &url)?
            .map(|n| n.name.unwrap_or_else(|| fallback.to_string())))
    }
}

impl IdentityService for LabyService {
    fn name(&self) -> &str {
        "Laby.net"
    }

    fn lookup(&self, username: &str) -> Result<Option<Profile>, LookupError> {
        let url = format!("{}/api/user/{}/get-uuid", self.base, segment(username));
        let Some(body) = get_json::<LabyUuid>(&self.client, &url)? else {
            return Ok(None);
        };
        if body.uuid.is_empty() {
            return Ok(None);
        }
        // An id without a confirmed current name is a miss
        Ok(self
            .current_name(&body.uuid, username)?
            .map(|current| Profile::new(&body.uuid, &current)))
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

pub struct IdentityResolver {
    primary: Box<dyn IdentityService>,
    fallbacks: Vec<Box<dyn IdentityService>>,
    concurrency: usize,
}

impl IdentityResolver {
    pub fn new(
        primary: Box<dyn IdentityService>,
        fallbacks: Vec<Box<dyn IdentityService>>,
    ) -> Self {
        IdentityResolver {
            primary,
            fallbacks,
            concurrency: 1,
        }
    }

    /// Mojang primary with Ashcon, Minetools, PlayerDB, Laby.net fallbacks
    pub fn http(endpoints: &ServiceEndpoints, timeout: Duration) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("alt-checker/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {}", e)))?;

        Ok(IdentityResolver::new(
            Box::new(MojangService::new(client.clone(), &endpoints.mojang)),
            vec![
                Box::new(AshconService::new(client.clone(), &endpoints.ashcon)),
                Box::new(MinetoolsService::new(client.clone(), &endpoints.minetools)),
                Box::new(PlayerDbService::new(client.clone(), &endpoints.playerdb)),
                Box::new(LabyService::new(client, &endpoints.laby, &endpoints.mojang_session)),
            ],
        ))
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Verdict for one record. Pure with respect to the collector.
    pub fn resolve(&self, record: &AccountRecord) -> Resolution {
        let username = record.username.as_str();

        match self.primary.lookup(username) {
            Ok(Some(profile)) => {
                info!(username, id = %profile.id, "confirmed");
                return Resolution::Confirmed { id: profile.id };
            }
            Ok(None) => {}
            Err(e) => debug!(username, service = self.primary.name(), "lookup failed: {}", e),
        }

        if record.platform_kind == PlatformKind::Secondary {
            info!(username, "no Java profile (Bedrock account)");
            return Resolution::SecondaryPlatform;
        }

        debug!(username, "checking fallback services");
        let mut last_error = None;
        for service in &self.fallbacks {
            match service.lookup(username) {
                Ok(Some(profile)) => {
                    if profile.name.to_lowercase() != username.to_lowercase() {
                        info!(
                            username,
                            current = %profile.name,
                            id = %profile.id,
                            service = service.name(),
                            "renamed"
                        );
                        return Resolution::Renamed {
                            id: profile.id,
                            current_name: profile.name,
                        };
                    }
                    info!(username, id = %profile.id, service = service.name(), "confirmed");
                    return Resolution::Confirmed { id: profile.id };
                }
                Ok(None) => {}
                Err(e) => {
                    debug!(username, service = service.name(), "lookup failed: {}", e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(source) => warn!(
                "{}",
                Error::RemoteLookup {
                    username: username.to_string(),
                    source,
                }
            ),
            None => info!(username, "not found in any database"),
        }
        Resolution::NotFound
    }

    /// Resolve every record without a persistent id.
    ///
    /// Up to `concurrency` lookups run at once. Each worker resolves from a
    /// snapshot of its record and writes the verdict back in one step.
    pub fn resolve_all(&self, collector: &Collector) -> usize {
        let pending = collector.unresolved();
        if pending.is_empty() {
            return 0;
        }

        let next = AtomicUsize::new(0);
        let workers = self.concurrency.min(pending.len());

        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let slot = next.fetch_add(1, Ordering::Relaxed);
                    let Some(&index) = pending.get(slot) else {
                        break;
                    };
                    if let Some(record) = collector.get(index) {
                        let resolution = self.resolve(&record);
                        collector.apply_resolution(index, resolution);
                    }
                });
            }
        });

        pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{PersistentId, Rename};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Canned answers; records every query it receives
    struct FakeService {
        name: &'static str,
        answers: HashMap<String, Profile>,
        fail: bool,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl FakeService {
        fn new(name: &'static str) -> Self {
            FakeService {
                name,
                answers: HashMap::new(),
                fail: false,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn knows(mut self, query: &str, id: &str, current: &str) -> Self {
            self.answers.insert(query.to_lowercase(), Profile::new(id, current));
            self
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }

        fn calls(&self) -> Arc<Mutex<Vec<String>>> {
            Arc::clone(&self.calls)
        }
    }

    impl IdentityService for FakeService {
        fn name(&self) -> &str {
            self.name
        }

        fn lookup(&self, username: &str) -> Result<Option<Profile>, LookupError> {
            self.calls.lock().unwrap().push(username.to_string());
            if self.fail {
                return Err(LookupError::Status(503));
            }
            Ok(self.answers.get(&username.to_lowercase()).cloned())
        }
    }

    const ID: &str = "069a79f444e94726a5befca90e38aaf5";
    const ID_DASHED: &str = "069a79f4-44e9-4726-a5be-fca90e38aaf5";

    #[test]
    fn test_format_uuid() {
        assert_eq!(format_uuid(ID), ID_DASHED);
        assert_eq!(format_uuid(ID_DASHED), ID_DASHED);
        assert_eq!(format_uuid("069A79F444E94726A5BEFCA90E38AAF5"), ID_DASHED);
        assert_eq!(format_uuid("not-a-uuid"), "not-a-uuid");
    }

    #[test]
    fn test_playerdb_unknown_player_is_miss() {
        let unknown: Result<Option<()>, LookupError> = Err(LookupError::Status(400));
        assert!(matches!(PlayerDbService::unknown_as_miss(unknown), Ok(None)));

        let outage: Result<Option<()>, LookupError> = Err(LookupError::Status(503));
        assert!(matches!(
            PlayerDbService::unknown_as_miss(outage),
            Err(LookupError::Status(503))
        ));

        let hit: Result<Option<u8>, LookupError> = Ok(Some(1));
        assert!(matches!(PlayerDbService::unknown_as_miss(hit), Ok(Some(1))));
    }

    #[test]
    fn test_primary_hit() {
        let collector = Collector::new();
        collector.submit("Notch", "Lunar Client");

        let fallback = FakeService::new("fb").knows("Notch", ID, "Notch");
        let fallback_calls = fallback.calls();
        let resolver = IdentityResolver::new(
            Box::new(FakeService::new("primary").knows("Notch", ID, "Notch")),
            vec![Box::new(fallback)],
        );
        resolver.resolve_all(&collector);

        let record = collector.get(0).unwrap();
        assert_eq!(record.persistent_id, Some(PersistentId::Confirmed(ID_DASHED.to_string())));
        assert!(fallback_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_primary_hit_promotes_xbox_record() {
        let collector = Collector::new();
        collector.submit("Both1", "Launcher - Xbox/MS");

        let resolver = IdentityResolver::new(
            Box::new(FakeService::new("primary").knows("Both1", ID, "Both1")),
            vec![],
        );
        resolver.resolve_all(&collector);

        assert_eq!(collector.get(0).unwrap().platform_kind, PlatformKind::Primary);
    }

    #[test]
    fn test_fallback_rename() {
        let collector = Collector::new();
        collector.submit("OldName", "TLauncher");

        let resolver = IdentityResolver::new(
            Box::new(FakeService::new("primary")),
            vec![Box::new(FakeService::new("first").knows("OldName", ID, "NewName"))],
        );
        resolver.resolve_all(&collector);

        let record = collector.get(0).unwrap();
        assert_eq!(record.username, "NewName");
        assert_eq!(record.rename, Some(Rename { previous_name: "OldName".to_string() }));
        assert!(record.persistent_id.unwrap().is_confirmed());
    }

    #[test]
    fn test_fallback_same_name_different_case_is_not_rename() {
        let record = AccountRecord::new("steve".into(), "A".into(), String::new());
        let resolver = IdentityResolver::new(
            Box::new(FakeService::new("primary")),
            vec![Box::new(FakeService::new("first").knows("steve", ID, "Steve"))],
        );
        assert_eq!(
            resolver.resolve(&record),
            Resolution::Confirmed { id: ID_DASHED.to_string() }
        );
    }

    #[test]
    fn test_secondary_platform_short_circuit() {
        let record = AccountRecord::new(
            "XboxPlayer1".into(),
            "Minecraft Launcher (launcher_accounts.json) - Xbox/MS".into(),
            String::new(),
        );
        let fallback = FakeService::new("first").knows("XboxPlayer1", ID, "XboxPlayer1");
        let calls = fallback.calls();
        let resolver =
            IdentityResolver::new(Box::new(FakeService::new("primary")), vec![Box::new(fallback)]);

        assert_eq!(resolver.resolve(&record), Resolution::SecondaryPlatform);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_failures_fall_through_in_order() {
        let record = AccountRecord::new("Renamed1".into(), "A".into(), String::new());
        let first = FakeService::new("first").failing();
        let second = FakeService::new("second");
        let third = FakeService::new("third").knows("Renamed1", ID, "Renamed2");
        let (c1, c2, c3) = (first.calls(), second.calls(), third.calls());

        let resolver = IdentityResolver::new(
            Box::new(FakeService::new("primary").failing()),
            vec![Box::new(first), Box::new(second), Box::new(third)],
        );

        assert_eq!(
            resolver.resolve(&record),
            Resolution::Renamed { id: ID_DASHED.to_string(), current_name: "Renamed2".to_string() }
        );
        assert_eq!(c1.lock().unwrap().len(), 1);
        assert_eq!(c2.lock().unwrap().len(), 1);
        assert_eq!(c3.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_all_miss_is_not_found() {
        let record = AccountRecord::new("Nobody123".into(), "A".into(), String::new());
        let resolver = IdentityResolver::new(
            Box::new(FakeService::new("primary")),
            vec![Box::new(FakeService::new("first").failing()), Box::new(FakeService::new("second"))],
        );
        assert_eq!(resolver.resolve(&record), Resolution::NotFound);
    }

    #[test]
    fn test_resolve_all_concurrent_covers_every_record() {
        let collector = Collector::new();
        let mut primary = FakeService::new("primary");
        for i in 0..20 {
            let name = format!("Player{}", i);
            collector.submit(&name, "A");
            if i % 2 == 0 {
                primary = primary.knows(&name, &format!("{:032x}", i + 1), &name);
            }
        }

        let resolver = IdentityResolver::new(Box::new(primary), vec![]).with_concurrency(4);
        assert_eq!(resolver.resolve_all(&collector), 20);

        let records = collector.snapshot();
        assert!(records.iter().all(|r| r.persistent_id.is_some()));
        let confirmed = records
            .iter()
            .filter(|r| r.persistent_id.as_ref().unwrap().is_confirmed())
            .count();
        assert_eq!(confirmed, 10);
        assert!(collector.unresolved().is_empty());
    }

    #[test]
    fn test_resolved_records_are_skipped() {
        let collector = Collector::new();
        collector.submit("Done1", "A");
        collector.apply_resolution(0, Resolution::NotFound);

        let primary = FakeService::new("primary");
        let calls = primary.calls();
        let resolver = IdentityResolver::new(Box::new(primary), vec![]);

        assert_eq!(resolver.resolve_all(&collector), 0);
        assert!(calls.lock().unwrap().is_empty());
    }
}
