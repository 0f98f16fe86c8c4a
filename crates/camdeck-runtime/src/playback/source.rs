//! Playback source selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical origin a media file is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackSource {
    /// Verified copy on backup disks.
    VerifiedBackup,
    /// An online editor's local copy.
    EditorLiveStream,
    /// QA review cache.
    #[serde(rename = "qa_review_cache")]
    QAReviewCache,
    /// No reachable copy.
    Offline,
}

impl PlaybackSource {
    /// URL path segment for this source. `None` for `Offline`.
    #[must_use]
    pub const fn path_segment(self) -> Option<&'static str> {
        match self {
            Self::VerifiedBackup => Some("backup"),
            Self::EditorLiveStream => Some("editor"),
            Self::QAReviewCache => Some("qa-cache"),
            Self::Offline => None,
        }
    }

    #[must_use]
    pub fn is_offline(self) -> bool {
        matches!(self, Self::Offline)
    }
}

impl fmt::Display for PlaybackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::VerifiedBackup => "verified_backup",
            Self::EditorLiveStream => "editor_live_stream",
            Self::QAReviewCache => "qa_review_cache",
            Self::Offline => "offline",
        };
        f.write_str(name)
    }
}

/// Where copies of one media item currently live.
///
/// Recomputed per request from the availability provider; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MediaAvailability {
    pub backup_verified: bool,
    pub backup_available: bool,
    pub editor_online: bool,
    pub local_available: bool,
    pub qa_cache_available: bool,
}

/// Picks the source to serve from.
///
/// Priority: verified backup, then an online editor's local copy, then the
/// QA cache, otherwise offline.
///
/// # Example
///
/// ```
/// use camdeck_runtime::playback::{resolve_source, MediaAvailability, PlaybackSource};
///
/// let both = MediaAvailability {
///     backup_verified: true,
///     backup_available: true,
///     editor_online: true,
///     local_available: true,
///     ..Default::default()
/// };
/// assert_eq!(resolve_source(&both), PlaybackSource::VerifiedBackup);
/// assert_eq!(resolve_source(&MediaAvailability::default()), PlaybackSource::Offline);
/// ```
#[must_use]
pub fn resolve_source(availability: &MediaAvailability) -> PlaybackSource {
    if availability.backup_verified && availability.backup_available {
        PlaybackSource::VerifiedBackup
    } else if availability.editor_online && availability.local_available {
        PlaybackSource::EditorLiveStream
    } else if availability.qa_cache_available {
        PlaybackSource::QAReviewCache
    } else {
        PlaybackSource::Offline
    }
}
