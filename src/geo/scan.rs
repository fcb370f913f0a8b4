//! Checkpoint scan validation primitives.
//!
//! A scanner submits whatever it read: the short numeric code typed by hand
//! or the QR payload. Resolution tries each [`LookupStrategy`] in order and
//! folds the matches into a [`Resolution`]; the distance check is a
//! [`ScanVerdict`].

use serde::Serialize;

use super::{distance, GeoPoint};

/// How a submitted code is matched against the checkpoint store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStrategy {
    /// Numeric code printed next to the QR sticker
    ShortCode,
    /// Full QR payload
    QrPayload,
}

impl LookupStrategy {
    /// Resolution order
    pub const ORDER: [LookupStrategy; 2] = [LookupStrategy::ShortCode, LookupStrategy::QrPayload];

    /// Whether this strategy can match `code` at all
    pub fn applies_to(self, code: &str) -> bool {
        match self {
            LookupStrategy::ShortCode => !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit()),
            LookupStrategy::QrPayload => !code.is_empty(),
        }
    }

    /// Strategies applicable to `code`, in resolution order
    pub fn candidates(code: &str) -> impl Iterator<Item = LookupStrategy> + '_ {
        Self::ORDER.into_iter().filter(move |s| s.applies_to(code))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LookupStrategy::ShortCode => "short_code",
            LookupStrategy::QrPayload => "qr_payload",
        }
    }
}

impl std::fmt::Display for LookupStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of resolving a code. `Inactive` and `Unknown` are reported to
/// the caller identically; the distinction exists for logging.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    Active(T),
    Inactive(T),
    Unknown,
}

impl<T> Resolution<T> {
    /// Fold one strategy's match into the current resolution.
    ///
    /// An active match always wins; an inactive one only replaces `Unknown`.
    pub fn observe(self, candidate: Option<T>, is_active: impl Fn(&T) -> bool) -> Self {
        match (self, candidate) {
            (Resolution::Active(current), _) => Resolution::Active(current),
            (_, Some(found)) if is_active(&found) => Resolution::Active(found),
            (Resolution::Unknown, Some(found)) => Resolution::Inactive(found),
            (current, _) => current,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Resolution::Active(_))
    }
}

/// Server-side verdict for one scan attempt
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScanVerdict {
    pub distance_meters: f64,
    pub is_valid: bool,
}

impl ScanVerdict {
    /// Distance from the reporter to the checkpoint and whether it falls
    /// within the radius. The boundary is inclusive; an inactive checkpoint
    /// is never valid.
    pub fn evaluate(reporter: GeoPoint, checkpoint: GeoPoint, radius_meters: f64, is_active: bool) -> Self {
        let distance_meters = distance(reporter, checkpoint);
        Self {
            distance_meters,
            is_valid: is_active && distance_meters <= radius_meters,
        }
    }

    /// Feedback line shown to the reporter
    pub fn message(&self, radius_meters: f64) -> String {
        if self.is_valid {
            "Checkpoint scanned successfully".to_string()
        } else {
            format!(
                "Too far from checkpoint: {:.0} m (allowed {:.0} m)",
                self.distance_meters, radius_meters
            )
        }
    }
}
