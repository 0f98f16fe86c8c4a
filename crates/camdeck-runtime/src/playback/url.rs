//! Signed-by-audit playback URLs.

use super::{PlaybackIntent, PlaybackSource};
use crate::config::{ConfigError, PlaybackConfig};
use camdeck_types::{AuditRecordId, MediaId};
use chrono::{DateTime, Duration, Utc};
use url::Url;

/// Upper bound applied to the configured URL lifetime (one week).
pub const MAX_URL_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Builds stream and download URLs from configured base URLs.
///
/// ```text
/// {base}/{backup|editor|qa-cache}/{media_id}?audit={record_id}&expires={unix}
/// ```
#[derive(Debug, Clone)]
pub struct UrlIssuer {
    stream_base: Url,
    download_base: Url,
    ttl: Duration,
}

impl UrlIssuer {
    /// Creates an issuer from playback configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] for a base URL that does not
    /// parse or cannot carry a path.
    pub fn from_config(config: &PlaybackConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            stream_base: config.stream_base()?,
            download_base: config.download_base()?,
            ttl: Duration::seconds(
                i64::try_from(config.url_ttl_secs)
                    .unwrap_or(MAX_URL_TTL_SECS)
                    .min(MAX_URL_TTL_SECS),
            ),
        })
    }

    /// Returns the URL lifetime.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Builds the URL for `media` served from `source`.
    ///
    /// Returns `None` for [`PlaybackSource::Offline`].
    #[must_use]
    pub fn issue(
        &self,
        source: PlaybackSource,
        intent: PlaybackIntent,
        media: MediaId,
        audit: AuditRecordId,
        now: DateTime<Utc>,
    ) -> Option<(Url, DateTime<Utc>)> {
        let segment = source.path_segment()?;
        let expires_at = now + self.ttl;

        let mut url = match intent {
            PlaybackIntent::Stream => self.stream_base.clone(),
            PlaybackIntent::Download => self.download_base.clone(),
        };
        {
            let mut segments = url.path_segments_mut().ok()?;
            segments
                .pop_if_empty()
                .push(segment)
                .push(&media.uuid().to_string());
        }
        url.query_pairs_mut()
            .append_pair("audit", &audit.uuid().to_string())
            .append_pair("expires", &expires_at.timestamp().to_string());

        Some((url, expires_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn issuer() -> UrlIssuer {
        UrlIssuer::from_config(&PlaybackConfig {
            stream_base_url: "https://media.example.org/stream/".into(),
            download_base_url: "https://files.example.org".into(),
            url_ttl_secs: 60,
        })
        .expect("valid config")
    }

    #[test]
    fn stream_url_layout() {
        let now = Utc
            .with_ymd_and_hms(2026, 4, 1, 10, 0, 0)
            .single()
            .expect("valid date");
        let media = MediaId::new();
        let audit = AuditRecordId::new();

        let (url, expires) = issuer()
            .issue(PlaybackSource::VerifiedBackup, PlaybackIntent::Stream, media, audit, now)
            .expect("url");

        assert_eq!(expires, now + Duration::seconds(60));
        assert_eq!(
            url.as_str(),
            format!(
                "https://media.example.org/stream/backup/{}?audit={}&expires={}",
                media.uuid(),
                audit.uuid(),
                expires.timestamp()
            )
        );
    }

    #[test]
    fn download_uses_download_base() {
        let (url, _) = issuer()
            .issue(
                PlaybackSource::QAReviewCache,
                PlaybackIntent::Download,
                MediaId::new(),
                AuditRecordId::new(),
                Utc::now(),
            )
            .expect("url");
        assert_eq!(url.host_str(), Some("files.example.org"));
        assert!(url.path().starts_with("/qa-cache/"));
    }

    #[test]
    fn ttl_is_capped() {
        let issuer = UrlIssuer::from_config(&PlaybackConfig {
            url_ttl_secs: u64::MAX,
            ..PlaybackConfig::default()
        })
        .expect("valid config");
        assert_eq!(issuer.ttl(), Duration::seconds(MAX_URL_TTL_SECS));
    }

    #[test]
    fn offline_has_no_url() {
        assert!(issuer()
            .issue(
                PlaybackSource::Offline,
                PlaybackIntent::Stream,
                MediaId::new(),
                AuditRecordId::new(),
                Utc::now(),
            )
            .is_none());
    }
}
