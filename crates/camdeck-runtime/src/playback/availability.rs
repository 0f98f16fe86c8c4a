//! Live media availability.

use super::MediaAvailability;
use camdeck_types::{ActorId, ErrorClass, ErrorCode, GroupId, MediaId};
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

/// Availability lookup failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvailabilityError {
    #[error("unknown media: {0}")]
    UnknownMedia(MediaId),

    #[error("availability provider unavailable: {0}")]
    Unavailable(String),
}

impl ErrorCode for AvailabilityError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownMedia(_) => "AVAILABILITY_UNKNOWN_MEDIA",
            Self::Unavailable(_) => "AVAILABILITY_UNAVAILABLE",
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            Self::UnknownMedia(_) => ErrorClass::NotFound,
            Self::Unavailable(_) => ErrorClass::Unavailable,
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Who a piece of media belongs to, for scoped playback.
///
/// `None` means the provider does not know; scoped callers are denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaOwnership {
    pub group: Option<GroupId>,
    pub editor: Option<ActorId>,
}

/// Source of truth for where media copies live.
pub trait AvailabilityProvider: Send + Sync {
    /// Returns the current availability of `media`.
    ///
    /// # Errors
    ///
    /// Returns [`AvailabilityError`] for unknown media or a provider failure.
    fn availability(&self, media: MediaId) -> Result<MediaAvailability, AvailabilityError>;

    /// Returns `true` if `media` has at least one open QA issue.
    ///
    /// # Errors
    ///
    /// Returns [`AvailabilityError`] for unknown media or a provider failure.
    fn has_open_issues(&self, media: MediaId) -> Result<bool, AvailabilityError>;

    /// Returns the group and editor `media` belongs to.
    ///
    /// The default knows neither.
    ///
    /// # Errors
    ///
    /// Returns [`AvailabilityError`] for unknown media or a provider failure.
    fn ownership(&self, _media: MediaId) -> Result<MediaOwnership, AvailabilityError> {
        Ok(MediaOwnership::default())
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Entry {
    availability: MediaAvailability,
    open_issues: bool,
    ownership: MediaOwnership,
}

/// In-process [`AvailabilityProvider`].
#[derive(Debug, Default)]
pub struct InMemoryAvailability {
    entries: RwLock<HashMap<MediaId, Entry>>,
}

impl InMemoryAvailability {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the availability of `media`, keeping its issue flag.
    pub fn set(&self, media: MediaId, availability: MediaAvailability) {
        self.entries.write().entry(media).or_default().availability = availability;
    }

    /// Sets whether `media` has open issues, keeping its availability.
    pub fn set_open_issues(&self, media: MediaId, open: bool) {
        self.entries.write().entry(media).or_default().open_issues = open;
    }

    /// Sets the owning group and editor of `media`.
    pub fn set_ownership(&self, media: MediaId, ownership: MediaOwnership) {
        self.entries.write().entry(media).or_default().ownership = ownership;
    }

    fn entry(&self, media: MediaId) -> Result<Entry, AvailabilityError> {
        self.entries
            .read()
            .get(&media)
            .copied()
            .ok_or(AvailabilityError::UnknownMedia(media))
    }
}

impl AvailabilityProvider for InMemoryAvailability {
    fn availability(&self, media: MediaId) -> Result<MediaAvailability, AvailabilityError> {
        self.entry(media).map(|e| e.availability)
    }

    fn has_open_issues(&self, media: MediaId) -> Result<bool, AvailabilityError> {
        self.entry(media).map(|e| e.open_issues)
    }

    fn ownership(&self, media: MediaId) -> Result<MediaOwnership, AvailabilityError> {
        self.entry(media).map(|e| e.ownership)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camdeck_types::assert_error_codes;

    #[test]
    fn unknown_media() {
        let provider = InMemoryAvailability::new();
        let media = MediaId::new();
        assert_eq!(
            provider.availability(media),
            Err(AvailabilityError::UnknownMedia(media))
        );
    }

    #[test]
    fn set_keeps_other_half() {
        let provider = InMemoryAvailability::new();
        let media = MediaId::new();
        provider.set_open_issues(media, true);
        provider.set(
            media,
            MediaAvailability {
                qa_cache_available: true,
                ..Default::default()
            },
        );
        assert_eq!(provider.has_open_issues(media), Ok(true));
        assert!(provider.availability(media).map(|a| a.qa_cache_available).unwrap_or(false));
    }

    #[test]
    fn ownership_defaults_to_unknown() {
        let provider = InMemoryAvailability::new();
        let media = MediaId::new();
        provider.set_open_issues(media, false);
        assert_eq!(provider.ownership(media), Ok(MediaOwnership::default()));

        let group = GroupId::new();
        provider.set_ownership(
            media,
            MediaOwnership {
                group: Some(group),
                editor: None,
            },
        );
        assert_eq!(provider.ownership(media).map(|o| o.group), Ok(Some(group)));
        let unknown = MediaId::new();
        assert_eq!(
            provider.ownership(unknown),
            Err(AvailabilityError::UnknownMedia(unknown))
        );
    }

    #[test]
    fn codes() {
        assert_error_codes(
            &[
                AvailabilityError::UnknownMedia(MediaId::new()),
                AvailabilityError::Unavailable("timeout".into()),
            ],
            "AVAILABILITY_",
        );
    }
}
