//! Gated, audited playback resolution.

use super::{
    resolve_source, AuditError, AuditSink, AvailabilityError, AvailabilityProvider,
    PlaybackAuditRecord, PlaybackSource, UrlIssuer,
};
use camdeck_auth::{
    Action, Actor, GrantTablePolicy, PolicyDecision, PolicyEngine, ResourceType, RoleSet,
    ScopePredicate,
};
use camdeck_types::{AuditRecordId, ErrorClass, ErrorCode, MediaId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};
use url::Url;

/// What the caller wants to do with the media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackIntent {
    Stream,
    Download,
}

impl fmt::Display for PlaybackIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stream => "stream",
            Self::Download => "download",
        })
    }
}

/// Why a playback was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// Stream granted through `playback_issues_only` on media with open issues.
    IssueReview,
    /// Stream granted through `playback_all`, within the caller's scope.
    AdminOversight,
    /// Download granted through `download`.
    Download,
}

/// A granted playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackTicket {
    pub source: PlaybackSource,
    pub url: Url,
    pub audit_id: AuditRecordId,
    pub reason: ReasonCode,
    pub expires_at: DateTime<Utc>,
}

/// Playback resolution failure.
///
/// # Error Codes
///
/// | Variant | Code | Recoverable |
/// |---------|------|-------------|
/// | [`PlaybackError::Offline`] | `PLAYBACK_OFFLINE` | No |
/// | [`PlaybackError::Forbidden`] | `PLAYBACK_FORBIDDEN` | No |
/// | [`PlaybackError::AuditFailed`] | `PLAYBACK_AUDIT_FAILED` | Yes |
/// | [`PlaybackError::Availability`] | `PLAYBACK_AVAILABILITY_FAILED` | Depends on source |
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No copy of the media is reachable.
    #[error("media offline: {0}")]
    Offline(MediaId),

    /// The caller's roles do not grant this intent on this media.
    #[error("{intent} of {media} forbidden for roles {roles}: {reason}")]
    Forbidden {
        media: MediaId,
        intent: PlaybackIntent,
        roles: RoleSet,
        reason: &'static str,
    },

    /// The audit record could not be stored; no URL was issued.
    #[error("playback audit failed: {0}")]
    AuditFailed(#[source] AuditError),

    /// The availability provider failed.
    #[error(transparent)]
    Availability(#[from] AvailabilityError),
}

impl ErrorCode for PlaybackError {
    fn code(&self) -> &'static str {
        match self {
            Self::Offline(_) => "PLAYBACK_OFFLINE",
            Self::Forbidden { .. } => "PLAYBACK_FORBIDDEN",
            Self::AuditFailed(_) => "PLAYBACK_AUDIT_FAILED",
            Self::Availability(_) => "PLAYBACK_AVAILABILITY_FAILED",
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            Self::Offline(_) | Self::AuditFailed(_) => ErrorClass::Unavailable,
            Self::Forbidden { .. } => ErrorClass::Forbidden,
            Self::Availability(e) => e.class(),
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Offline(_) | Self::Forbidden { .. } => false,
            Self::AuditFailed(_) => true,
            Self::Availability(e) => e.is_recoverable(),
        }
    }
}

/// Resolves where media may be played from and issues audited URLs.
///
/// # Order of Checks
///
/// 1. Availability → source. `Offline` fails for every role.
/// 2. Capability. Stream needs `playback_all`, or `playback_issues_only`
///    on media with open issues. Download needs `download`.
/// 3. Audit append. A sink failure fails the request (fail-closed).
/// 4. URL.
///
/// Denied requests are logged, not audited.
pub struct PlaybackResolver<P = GrantTablePolicy> {
    policy: P,
    availability: Arc<dyn AvailabilityProvider>,
    audit: Arc<dyn AuditSink>,
    urls: UrlIssuer,
}

impl PlaybackResolver<GrantTablePolicy> {
    /// Creates a resolver using the grant table policy.
    #[must_use]
    pub fn new(
        availability: Arc<dyn AvailabilityProvider>,
        audit: Arc<dyn AuditSink>,
        urls: UrlIssuer,
    ) -> Self {
        Self::with_policy(GrantTablePolicy, availability, audit, urls)
    }
}

impl<P: PolicyEngine> PlaybackResolver<P> {
    /// Creates a resolver with a custom policy engine.
    #[must_use]
    pub fn with_policy(
        policy: P,
        availability: Arc<dyn AvailabilityProvider>,
        audit: Arc<dyn AuditSink>,
        urls: UrlIssuer,
    ) -> Self {
        Self {
            policy,
            availability,
            audit,
            urls,
        }
    }

    /// Resolves `media` for `actor` and issues a URL.
    ///
    /// # Errors
    ///
    /// See [`PlaybackError`].
    pub fn resolve(
        &self,
        actor: &Actor,
        media: MediaId,
        intent: PlaybackIntent,
    ) -> Result<PlaybackTicket, PlaybackError> {
        let availability = self.availability.availability(media)?;
        let source = resolve_source(&availability);
        if source.is_offline() {
            debug!(media = %media, intent = %intent, "media offline");
            return Err(PlaybackError::Offline(media));
        }

        let reason = self.authorize(actor, media, intent).inspect_err(|e| {
            warn!(actor = %actor.id(), media = %media, intent = %intent, error = %e, "playback denied");
        })?;

        let now = Utc::now();
        let record = PlaybackAuditRecord {
            id: AuditRecordId::new(),
            actor: actor.id(),
            roles: actor.roles(),
            media,
            source,
            intent,
            reason,
            at: now,
        };
        self.audit.append(&record).map_err(|e| {
            error!(actor = %actor.id(), media = %media, error = %e, "playback audit append failed");
            PlaybackError::AuditFailed(e)
        })?;

        let (url, expires_at) = self
            .urls
            .issue(source, intent, media, record.id, now)
            .ok_or(PlaybackError::Offline(media))?;

        debug!(
            actor = %actor.id(),
            media = %media,
            source = %source,
            audit = %record.id,
            "playback url issued"
        );

        Ok(PlaybackTicket {
            source,
            url,
            audit_id: record.id,
            reason,
            expires_at,
        })
    }

    fn authorize(
        &self,
        actor: &Actor,
        media: MediaId,
        intent: PlaybackIntent,
    ) -> Result<ReasonCode, PlaybackError> {
        let forbidden = |reason| PlaybackError::Forbidden {
            media,
            intent,
            roles: actor.roles(),
            reason,
        };

        match intent {
            PlaybackIntent::Download => {
                let decision = self.policy.evaluate_actor(actor, ResourceType::Media, Action::DOWNLOAD);
                if decision.allowed {
                    Ok(ReasonCode::Download)
                } else {
                    Err(forbidden("download not granted"))
                }
            }
            PlaybackIntent::Stream => {
                let oversight =
                    self.policy
                        .evaluate_actor(actor, ResourceType::Media, Action::PLAYBACK_ALL);
                if oversight.allowed {
                    if let Some(reason) = self.out_of_scope(actor, media, &oversight)? {
                        return Err(forbidden(reason));
                    }
                    return Ok(ReasonCode::AdminOversight);
                }
                if !oversight.grants(Action::PLAYBACK_ISSUES_ONLY) {
                    return Err(forbidden("playback not granted"));
                }
                if self.availability.has_open_issues(media)? {
                    Ok(ReasonCode::IssueReview)
                } else {
                    Err(forbidden("media has no open issues"))
                }
            }
        }
    }
}

impl<P> PlaybackResolver<P> {
    /// Checks a `playback_all` grant against the caller's scope restrictions
    /// and returns the denial reason, if any. Unknown ownership is denied.
    fn out_of_scope(
        &self,
        actor: &Actor,
        media: MediaId,
        decision: &PolicyDecision,
    ) -> Result<Option<&'static str>, AvailabilityError> {
        if decision.restrictions.iter().all(|r| r.is_global()) {
            return Ok(None);
        }
        let ownership = self.availability.ownership(media)?;

        for restriction in &decision.restrictions {
            let denied = match restriction {
                ScopePredicate::Global => None,
                ScopePredicate::OwnGroups => (!ownership
                    .group
                    .is_some_and(|g| actor.owner().led_groups.contains(&g)))
                .then_some("media outside led groups"),
                ScopePredicate::IssuesOnly => (!self.availability.has_open_issues(media)?)
                    .then_some("media has no open issues"),
                ScopePredicate::OwnItems => (ownership.editor != Some(actor.id()))
                    .then_some("media not owned by caller"),
            };
            if denied.is_some() {
                return Ok(denied);
            }
        }
        Ok(None)
    }
}

impl<P> fmt::Debug for PlaybackResolver<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackResolver")
            .field("urls", &self.urls)
            .finish_non_exhaustive()
    }
}
