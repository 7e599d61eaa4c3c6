use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Traffic-light state of one sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorStatus {
    Normal,
    Warning,
    Alarm,
    /// Last reading is older than the staleness window.
    Stale,
}

impl SensorStatus {
    /// Classifies a fill level against its thresholds.
    ///
    /// Levels are "remaining liquid", so falling *below* a threshold escalates.
    #[must_use]
    pub fn classify(value: f64, warn: Option<f64>, alarm: Option<f64>) -> Self {
        if alarm.is_some_and(|alarm| value < alarm) {
            Self::Alarm
        } else if warn.is_some_and(|warn| value < warn) {
            Self::Warning
        } else {
            Self::Normal
        }
    }

    /// Like [`SensorStatus::classify`], but readings older than `stale_after`
    /// relative to `now` are reported as [`SensorStatus::Stale`].
    ///
    /// A window reaching past the earliest representable instant never marks
    /// a reading stale.
    #[must_use]
    pub fn classify_at(
        value: f64,
        warn: Option<f64>,
        alarm: Option<f64>,
        measured_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        stale_after: Duration,
    ) -> Self {
        let cutoff = now.checked_sub_signed(stale_after);
        if matches!((measured_at, cutoff), (Some(at), Some(cutoff)) if at < cutoff) {
            return Self::Stale;
        }
        Self::classify(value, warn, alarm)
    }

    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Normal => "🟢",
            Self::Warning => "🟡",
            Self::Alarm => "🔴",
            Self::Stale => "⚪",
        }
    }

    #[must_use]
    pub fn from_glyph(raw: &str) -> Option<Self> {
        match raw.trim() {
            "🟢" => Some(Self::Normal),
            "🟡" => Some(Self::Warning),
            "🔴" => Some(Self::Alarm),
            "⚪" => Some(Self::Stale),
            _ => None,
        }
    }

    /// Maps the backend's color token for a sensor to a status.
    ///
    /// The backend spells the stale token `decrepated`; both spellings are accepted.
    #[must_use]
    pub fn from_color_token(token: &str) -> Option<Self> {
        match token {
            "normal" => Some(Self::Normal),
            "warning" => Some(Self::Warning),
            "alarm" => Some(Self::Alarm),
            "stale" | "deprecated" | "decrepated" => Some(Self::Stale),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeDelta, TimeZone, Utc};

    use super::SensorStatus;

    #[test]
    fn falling_below_thresholds_escalates() {
        assert_eq!(SensorStatus::classify(80.0, Some(60.0), Some(30.0)), SensorStatus::Normal);
        assert_eq!(SensorStatus::classify(50.0, Some(60.0), Some(30.0)), SensorStatus::Warning);
        assert_eq!(SensorStatus::classify(20.0, Some(60.0), Some(30.0)), SensorStatus::Alarm);
        assert_eq!(SensorStatus::classify(20.0, None, None), SensorStatus::Normal);
    }

    #[test]
    fn old_readings_are_stale_regardless_of_level() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("valid");
        let old = now - Duration::minutes(16);
        let fresh = now - Duration::minutes(5);
        let window = Duration::minutes(15);
        assert_eq!(
            SensorStatus::classify_at(10.0, Some(60.0), Some(30.0), Some(old), now, window),
            SensorStatus::Stale
        );
        assert_eq!(
            SensorStatus::classify_at(10.0, Some(60.0), Some(30.0), Some(fresh), now, window),
            SensorStatus::Alarm
        );
    }

    #[test]
    fn glyphs_and_tokens_roundtrip_to_status() {
        for status in [
            SensorStatus::Normal,
            SensorStatus::Warning,
            SensorStatus::Alarm,
            SensorStatus::Stale,
        ] {
            assert_eq!(SensorStatus::from_glyph(status.glyph()), Some(status));
        }
        assert_eq!(SensorStatus::from_color_token("decrepated"), Some(SensorStatus::Stale));
        assert_eq!(SensorStatus::from_color_token("purple"), None);
    }

    #[test]
    fn huge_window_does_not_overflow() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("valid");
        let ancient = now - Duration::days(365 * 100);
        assert_eq!(
            SensorStatus::classify_at(80.0, None, None, Some(ancient), now, TimeDelta::MAX),
            SensorStatus::Normal
        );
    }
}
