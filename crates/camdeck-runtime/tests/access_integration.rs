//! Integration tests for the access core facade.
//!
//! Tests the complete flow: config → AccessCore → scoped query / playback.

use camdeck_auth::{AccessDenied, Action, Actor, Field, FilterValue, ResourceType, Role};
use camdeck_runtime::event::EventDraft;
use camdeck_runtime::playback::{
    read_jsonl, AuditError, AuditSink, InMemoryAvailability, MediaAvailability, MemoryAuditLog,
    PlaybackAuditRecord, ReasonCode,
};
use camdeck_runtime::scope::{InMemoryRepository, Record, ResourceRequest};
use camdeck_runtime::{
    AccessCore, CamdeckConfig, ConfigLoader, CoreError, PlaybackError, PlaybackIntent,
    PlaybackSource, ScopeError,
};
use camdeck_types::{ActorId, ErrorClass, ErrorCode, EventId, GroupId, MediaId};
use serde_json::json;
use std::sync::Arc;

fn actor(role: Role) -> Actor {
    Actor::new(ActorId::new(), [role])
}

fn record(value: serde_json::Value) -> Record {
    value.as_object().cloned().expect("record literal should be an object")
}

struct Harness {
    core: AccessCore,
    availability: Arc<InMemoryAvailability>,
    audit: Arc<MemoryAuditLog>,
    admin: Actor,
}

fn harness() -> Harness {
    let availability = Arc::new(InMemoryAvailability::new());
    let audit = Arc::new(MemoryAuditLog::new());
    let core = AccessCore::builder(CamdeckConfig::default())
        .availability(availability.clone())
        .audit(audit.clone())
        .build()
        .expect("default config should build");
    Harness {
        core,
        availability,
        audit,
        admin: actor(Role::Admin),
    }
}

impl Harness {
    fn activate(&self, code: &str) -> EventId {
        let event = self
            .core
            .create_event(&self.admin, EventDraft::new(code, format!("Event {code}")))
            .expect("admin should create events");
        self.core
            .activate_event(&self.admin, event.id, true)
            .expect("admin should activate events")
            .id
    }
}

// =============================================================================
// Scoped queries
// =============================================================================

mod scoped_queries {
    use super::*;

    fn seed_two_events(repo: &InMemoryRepository, old: EventId, active: EventId) {
        for (event, camera) in [(old, "OLD-1"), (active, "NEW-1"), (active, "NEW-2")] {
            repo.seed(
                ResourceType::Media,
                record(json!({
                    "event_id": event.uuid().to_string(),
                    "camera_number": camera,
                    "full_name": "Ada Lovelace",
                    "region": "north",
                    "editor_name": "Bo",
                    "has_issues": true,
                    "issue_type": "audio",
                })),
            );
        }
    }

    #[test]
    fn client_cannot_escape_active_event() {
        let h = harness();
        let old = h.activate("OLD");
        let active = h.activate("NEW");
        let repo = InMemoryRepository::new();
        seed_two_events(&repo, old, active);

        let request = ResourceRequest::new(ResourceType::Media, Action::SEARCH)
            .filter(Field::EventId, FilterValue::Id(old.uuid()));

        for role in [Role::Admin, Role::TeamLead, Role::QA] {
            let rows = h
                .core
                .read(&actor(role), &request, &repo)
                .expect("read should succeed");
            assert_eq!(rows.len(), 2, "role {role} saw rows outside the active event");
            for row in rows {
                assert_eq!(row.get("event_id"), Some(&json!(active.uuid().to_string())));
            }
        }
    }

    #[test]
    fn no_active_event_reads_empty_and_writes_fail() {
        let h = harness();
        let repo = InMemoryRepository::new();
        repo.seed(
            ResourceType::Media,
            record(json!({ "event_id": EventId::new().uuid().to_string() })),
        );
        let editor = actor(Role::Editor);

        let rows = h
            .core
            .read(
                &editor,
                &ResourceRequest::new(ResourceType::Media, Action::SEARCH),
                &repo,
            )
            .expect("read without active event is not an error");
        assert!(rows.is_empty());

        let err = h
            .core
            .write(
                &editor,
                &ResourceRequest::new(ResourceType::Media, Action::WRITE),
                record(json!({ "camera_number": "C9" })),
                &repo,
            )
            .expect_err("write needs an active event");
        assert!(matches!(err, CoreError::Scope(ScopeError::NoActiveEvent)));
        assert_eq!(err.code(), "SCOPE_NO_ACTIVE_EVENT");
        assert_eq!(err.class(), ErrorClass::Precondition);
        assert!(err.is_recoverable());
        assert_eq!(repo.all(ResourceType::Media).len(), 1);
    }

    #[test]
    fn forbidden_wins_over_missing_event() {
        let h = harness();
        let err = h
            .core
            .authorize_and_scope(
                &actor(Role::Backup),
                &ResourceRequest::new(ResourceType::Registration, Action::SEARCH),
            )
            .expect_err("backup cannot read registrations");
        assert_eq!(err.code(), "SCOPE_FORBIDDEN");
    }

    #[test]
    fn qa_never_sees_names_or_regions() {
        let h = harness();
        let active = h.activate("QA");
        let repo = InMemoryRepository::new();
        seed_two_events(&repo, EventId::new(), active);

        let rows = h
            .core
            .read(
                &actor(Role::QA),
                &ResourceRequest::new(ResourceType::Media, Action::SEARCH),
                &repo,
            )
            .expect("qa may search media");
        assert_eq!(rows.len(), 2);

        let allowed = ["camera_number", "sd_label", "issue_type", "issue_status", "event_id"];
        for row in &rows {
            assert!(!row.contains_key("full_name"));
            assert!(!row.contains_key("region"));
            assert!(!row.contains_key("editor_name"));
            for key in row.keys() {
                assert!(allowed.contains(&key.as_str()), "unexpected key {key}");
            }
        }
    }

    #[test]
    fn qa_issue_filter_cannot_be_lifted() {
        let h = harness();
        let active = h.activate("ISS");
        let event = active.uuid().to_string();
        let repo = InMemoryRepository::new();
        for (camera, has_issues) in [("C1", true), ("C2", false), ("C3", false)] {
            repo.seed(
                ResourceType::Media,
                record(json!({
                    "event_id": event,
                    "camera_number": camera,
                    "has_issues": has_issues,
                })),
            );
        }
        let qa = actor(Role::QA);

        let request = ResourceRequest::new(ResourceType::Media, Action::SEARCH)
            .filter(Field::HasIssues, FilterValue::Bool(false));
        let rows = h.core.read(&qa, &request, &repo).expect("read");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("camera_number"), Some(&json!("C1")));

        let err = h
            .core
            .write(
                &qa,
                &ResourceRequest::new(ResourceType::Issue, Action::WRITE),
                record(json!({ "camera_number": "C2", "has_issues": false })),
                &repo,
            )
            .expect_err("qa cannot write outside issues-only scope");
        assert!(matches!(
            err,
            CoreError::Scope(ScopeError::Forbidden(AccessDenied::Field {
                field: Field::HasIssues,
                ..
            }))
        ));
    }

    #[test]
    fn qa_cannot_search_by_name() {
        let h = harness();
        h.activate("NAME");
        let request = ResourceRequest::new(ResourceType::Media, Action::SEARCH)
            .filter(Field::FullName, FilterValue::Text("Ada".into()));

        let err = h
            .core
            .authorize_and_scope(&actor(Role::QA), &request)
            .expect_err("qa lacks search_by_name");
        assert_eq!(err.class(), ErrorClass::Forbidden);

        let outcome = h
            .core
            .authorize_and_scope(&actor(Role::TeamLead), &request)
            .expect("team lead may search by name");
        assert!(!outcome.is_empty());
    }

    #[test]
    fn group_leader_limited_to_led_groups() {
        let h = harness();
        let active = h.activate("GRP");
        let event = active.uuid().to_string();
        let (mine, theirs) = (GroupId::new(), GroupId::new());
        let repo = InMemoryRepository::new();
        for group in [mine, theirs, theirs] {
            repo.seed(
                ResourceType::Registration,
                record(json!({
                    "event_id": event,
                    "group_id": group.uuid().to_string(),
                    "full_name": "Participant",
                })),
            );
        }

        let leader = Actor::new(ActorId::new(), [Role::GroupLeader]).leading([mine]);
        let request = ResourceRequest::new(ResourceType::Registration, Action::SEARCH)
            .filter(Field::GroupId, FilterValue::AnyOf(vec![theirs.uuid()]));
        let rows = h.core.read(&leader, &request, &repo).expect("read");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("group_id"), Some(&json!(mine.uuid().to_string())));
    }

    #[test]
    fn editor_writes_are_stamped_and_owned() {
        let h = harness();
        let active = h.activate("EDIT");
        let repo = InMemoryRepository::new();
        let editor = actor(Role::Editor);
        let request = ResourceRequest::new(ResourceType::Media, Action::WRITE);

        let stored = h
            .core
            .write(
                &editor,
                &request,
                record(json!({ "camera_number": "C7", "event_id": EventId::new().uuid().to_string() })),
                &repo,
            )
            .expect("editor may write media");
        assert_eq!(stored.get("event_id"), Some(&json!(active.uuid().to_string())));
        assert_eq!(
            stored.get("editor_id"),
            Some(&json!(editor.id().uuid().to_string()))
        );

        let err = h
            .core
            .write(
                &editor,
                &request,
                record(json!({ "camera_number": "C8", "editor_id": ActorId::new().uuid().to_string() })),
                &repo,
            )
            .expect_err("editor cannot write on behalf of another editor");
        assert_eq!(err.code(), "SCOPE_FORBIDDEN");

        let err = h
            .core
            .write(&editor, &request, record(json!({ "bogus": 1 })), &repo)
            .expect_err("unknown keys are rejected");
        assert!(matches!(
            err,
            CoreError::Scope(ScopeError::Forbidden(AccessDenied::UnknownField(_)))
        ));
        assert_eq!(repo.all(ResourceType::Media).len(), 1);
    }

    #[test]
    fn group_leader_writes_stay_inside_led_groups() {
        let h = harness();
        h.activate("LEAD-WRITE");
        let repo = InMemoryRepository::new();
        let mine = GroupId::new();
        let leader = Actor::new(ActorId::new(), [Role::GroupLeader]).leading([mine]);
        let request = ResourceRequest::new(ResourceType::Registration, Action::WRITE);

        let err = h
            .core
            .write(&leader, &request, record(json!({ "full_name": "Walk-in" })), &repo)
            .expect_err("a write without a group cannot be placed in scope");
        assert!(matches!(
            err,
            CoreError::Scope(ScopeError::Forbidden(AccessDenied::Field {
                field: Field::GroupId,
                ..
            }))
        ));
        assert!(repo.all(ResourceType::Registration).is_empty());

        h.core
            .write(
                &leader,
                &request,
                record(json!({ "full_name": "Walk-in", "group_id": mine.uuid().to_string() })),
                &repo,
            )
            .expect("leader may register into a led group");
        assert_eq!(repo.all(ResourceType::Registration).len(), 1);
    }
}

// =============================================================================
// Event management
// =============================================================================

mod event_management {
    use super::*;

    #[test]
    fn only_admin_and_team_lead_manage_events() {
        let h = harness();
        for role in [
            Role::GroupLeader,
            Role::QA,
            Role::QALead,
            Role::Backup,
            Role::BackupLead,
            Role::Editor,
        ] {
            let err = h
                .core
                .create_event(&actor(role), EventDraft::new("X", "X"))
                .expect_err("role cannot create events");
            assert_eq!(err.code(), "AUTH_CAPABILITY_DENIED", "role {role}");
        }

        let lead = actor(Role::TeamLead);
        let event = h
            .core
            .create_event(&lead, EventDraft::new("LEAD", "Lead Event"))
            .expect("team lead creates");
        h.core.activate_event(&lead, event.id, false).expect("activate");
        h.core.complete_event(&lead, event.id).expect("complete");
        h.core.archive_event(&lead, event.id).expect("archive");
        assert_eq!(h.core.transition_history(10).len(), 3);
    }

    #[test]
    fn scenario_conflict_then_force() {
        let h = harness();
        let a = h
            .core
            .create_event(&h.admin, EventDraft::new("A", "A"))
            .expect("create A");
        let b = h
            .core
            .create_event(&h.admin, EventDraft::new("B", "B"))
            .expect("create B");
        h.core.activate_event(&h.admin, a.id, false).expect("activate A");

        let err = h
            .core
            .activate_event(&h.admin, b.id, false)
            .expect_err("conflict");
        assert_eq!(err.class(), ErrorClass::Conflict);

        h.core.activate_event(&h.admin, b.id, true).expect("force B");
        assert_eq!(h.core.current_active_event().map(|e| e.id), Some(b.id));
    }
}

// =============================================================================
// Playback
// =============================================================================

mod playback {
    use super::*;

    fn media(h: &Harness, availability: MediaAvailability, open_issues: bool) -> MediaId {
        let media = MediaId::new();
        h.availability.set(media, availability);
        h.availability.set_open_issues(media, open_issues);
        media
    }

    fn everywhere() -> MediaAvailability {
        MediaAvailability {
            backup_verified: true,
            backup_available: true,
            editor_online: true,
            local_available: true,
            qa_cache_available: true,
        }
    }

    #[test]
    fn verified_backup_beats_live_stream() {
        let h = harness();
        let id = media(&h, everywhere(), false);

        let ticket = h
            .core
            .resolve_playback(&h.admin, id, PlaybackIntent::Stream)
            .expect("admin may stream");
        assert_eq!(ticket.source, PlaybackSource::VerifiedBackup);
        assert!(ticket.url.path().contains("/backup/"));
        assert!(ticket
            .url
            .query_pairs()
            .any(|(k, v)| k == "audit" && v == ticket.audit_id.uuid().to_string()));

        let unverified = media(
            &h,
            MediaAvailability {
                backup_verified: false,
                ..everywhere()
            },
            false,
        );
        let ticket = h
            .core
            .resolve_playback(&h.admin, unverified, PlaybackIntent::Stream)
            .expect("admin may stream");
        assert_eq!(ticket.source, PlaybackSource::EditorLiveStream);
    }

    #[test]
    fn offline_media_fails_for_everyone() {
        let h = harness();
        let id = media(&h, MediaAvailability::default(), true);

        for role in [Role::Admin, Role::QA, Role::GroupLeader] {
            let err = h
                .core
                .resolve_playback(&actor(role), id, PlaybackIntent::Stream)
                .expect_err("offline");
            assert!(matches!(err, CoreError::Playback(PlaybackError::Offline(_))));
        }
        assert!(h.audit.is_empty());
    }

    #[test]
    fn qa_streams_only_media_with_open_issues() {
        let h = harness();
        let qa = actor(Role::QA);
        let flagged = media(&h, everywhere(), true);
        let clean = media(&h, everywhere(), false);

        let ticket = h
            .core
            .resolve_playback(&qa, flagged, PlaybackIntent::Stream)
            .expect("issue review");
        assert_eq!(ticket.reason, ReasonCode::IssueReview);

        let err = h
            .core
            .resolve_playback(&qa, clean, PlaybackIntent::Stream)
            .expect_err("no open issues");
        assert_eq!(err.code(), "PLAYBACK_FORBIDDEN");

        let err = h
            .core
            .resolve_playback(&qa, flagged, PlaybackIntent::Download)
            .expect_err("qa cannot download");
        assert_eq!(err.code(), "PLAYBACK_FORBIDDEN");

        let records = h.audit.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].media, flagged);
        assert_eq!(records[0].reason, ReasonCode::IssueReview);
    }

    #[test]
    fn download_is_audited_with_its_own_reason() {
        let h = harness();
        let id = media(&h, everywhere(), false);
        let ticket = h
            .core
            .resolve_playback(&h.admin, id, PlaybackIntent::Download)
            .expect("admin may download");
        assert_eq!(ticket.reason, ReasonCode::Download);
        assert!(ticket.url.as_str().starts_with("http://localhost:8080/download/"));
        assert_eq!(h.audit.records()[0].intent, PlaybackIntent::Download);
    }

    struct RejectingSink;

    impl AuditSink for RejectingSink {
        fn append(&self, _record: &PlaybackAuditRecord) -> Result<(), AuditError> {
            Err(AuditError::Rejected("audit store unavailable".into()))
        }
    }

    #[test]
    fn audit_failure_withholds_url() {
        let availability = Arc::new(InMemoryAvailability::new());
        let id = MediaId::new();
        availability.set(id, everywhere());
        let core = AccessCore::builder(CamdeckConfig::default())
            .availability(availability)
            .audit(Arc::new(RejectingSink))
            .build()
            .expect("build");

        let err = core
            .resolve_playback(&actor(Role::Admin), id, PlaybackIntent::Stream)
            .expect_err("fail closed");
        assert!(matches!(err, CoreError::Playback(PlaybackError::AuditFailed(_))));
        assert_eq!(err.code(), "PLAYBACK_AUDIT_FAILED");
        assert!(err.is_recoverable());
    }

    #[test]
    fn unknown_media_is_reported() {
        let h = harness();
        let err = h
            .core
            .resolve_playback(&h.admin, MediaId::new(), PlaybackIntent::Stream)
            .expect_err("unknown media");
        assert!(matches!(err, CoreError::Playback(PlaybackError::Availability(_))));
    }
}

// =============================================================================
// Configuration
// =============================================================================

mod configuration {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn layers_apply_in_order() {
        let dir = TempDir::new().expect("tempdir");
        let global = dir.path().join("global.toml");
        std::fs::write(
            &global,
            r#"
[playback]
stream_base_url = "https://global.example.org/stream"
download_base_url = "https://global.example.org/download"
url_ttl_secs = 120
"#,
        )
        .expect("write global");

        let project = dir.path().join("project");
        std::fs::create_dir_all(project.join(".camdeck")).expect("mkdir");
        std::fs::write(
            project.join(".camdeck").join("config.toml"),
            r#"
[playback]
stream_base_url = "https://project.example.org/stream"

[lifecycle]
history_capacity = 16
"#,
        )
        .expect("write project");

        let config = ConfigLoader::new()
            .with_global_config(&global)
            .with_project_root(&project)
            .load_with_env(|name| match name {
                "CAMDECK_URL_TTL_SECS" => Some("45".into()),
                _ => None,
            })
            .expect("load");

        assert_eq!(config.playback.stream_base_url, "https://project.example.org/stream");
        assert_eq!(config.playback.download_base_url, "https://global.example.org/download");
        assert_eq!(config.playback.url_ttl_secs, 45);
        assert_eq!(config.lifecycle.history_capacity, 16);
    }

    #[test]
    fn invalid_env_url_is_rejected() {
        let err = ConfigLoader::new()
            .skip_global_config()
            .skip_project_config()
            .load_with_env(|name| {
                (name == "CAMDECK_STREAM_BASE_URL").then(|| "mailto:ops@example.org".to_string())
            })
            .expect_err("cannot-be-a-base url");
        assert_eq!(err.code(), "CONFIG_INVALID_URL");
    }

    #[test]
    fn configured_urls_and_jsonl_audit_flow_through_core() {
        let dir = TempDir::new().expect("tempdir");
        let audit_path = dir.path().join("audit").join("playback.jsonl");

        let config = ConfigLoader::new()
            .skip_global_config()
            .skip_project_config()
            .load_with_env(|name| match name {
                "CAMDECK_STREAM_BASE_URL" => Some("https://cdn.example.org/v1/stream".into()),
                "CAMDECK_AUDIT_PATH" => Some(audit_path.display().to_string()),
                _ => None,
            })
            .expect("load");

        let availability = Arc::new(InMemoryAvailability::new());
        let id = MediaId::new();
        availability.set(
            id,
            MediaAvailability {
                qa_cache_available: true,
                ..Default::default()
            },
        );
        let core = AccessCore::builder(config)
            .availability(availability)
            .build()
            .expect("build with jsonl audit");

        let admin = actor(Role::Admin);
        let ticket = core
            .resolve_playback(&admin, id, PlaybackIntent::Stream)
            .expect("stream");
        assert_eq!(ticket.source, PlaybackSource::QAReviewCache);
        assert!(ticket
            .url
            .as_str()
            .starts_with("https://cdn.example.org/v1/stream/qa-cache/"));

        let records = read_jsonl(&audit_path).expect("audit file");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, ticket.audit_id);
        assert_eq!(records[0].actor, admin.id());
        assert_eq!(records[0].source, PlaybackSource::QAReviewCache);
    }
}
