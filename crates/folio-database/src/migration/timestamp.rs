//! Migration timestamps and ids.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Timelike, Utc};

use super::error::MigrationError;

/// Sixteen-digit `YYYYMMDDHHMMSSNN` timestamp. `NN` orders migrations
/// written within the same second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MigrationTimestamp(u64);

impl MigrationTimestamp {
    /// Number of digits in the textual form.
    pub const LEN: usize = 16;

    /// Cursor of an installation that predates migrations. Sorts before
    /// every real migration, so all of them run.
    pub const SENTINEL: Self = Self(0);

    /// Builds a timestamp from a UTC instant and a same-second sequence.
    pub fn from_datetime(at: DateTime<Utc>, sequence: u8) -> Self {
        let date = u64::from(at.year().max(0).unsigned_abs()) * 10_000
            + u64::from(at.month()) * 100
            + u64::from(at.day());
        let time = u64::from(at.hour()) * 10_000 + u64::from(at.minute()) * 100 + u64::from(at.second());
        Self((date * 1_000_000 + time) * 100 + u64::from(sequence.min(99)))
    }

    /// The current second with sequence `99`, later than any migration
    /// authored during it.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now(), 99)
    }

    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }
}

impl fmt::Display for MigrationTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016}", self.0)
    }
}

impl FromStr for MigrationTimestamp {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::LEN || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MigrationError::Invalid(format!(
                "'{s}' is not a {}-digit migration timestamp",
                Self::LEN
            )));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|e| MigrationError::Invalid(format!("'{s}': {e}")))
    }
}

/// `{timestamp}-{name}`, e.g. `2023021721394600-add-title-input`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MigrationId {
    pub timestamp: MigrationTimestamp,
    pub name: String,
}

impl fmt::Display for MigrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.timestamp, self.name)
    }
}

impl FromStr for MigrationId {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (timestamp, rest) = match (s.get(..MigrationTimestamp::LEN), s.get(MigrationTimestamp::LEN..)) {
            (Some(ts), Some(rest)) => (ts, rest),
            _ => return Err(MigrationError::Invalid(format!("'{s}' is too short to be a migration id"))),
        };
        let name = rest
            .strip_prefix('-')
            .filter(|n| !n.is_empty())
            .ok_or_else(|| MigrationError::Invalid(format!("'{s}' has no migration name")))?;
        if !name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
        {
            return Err(MigrationError::Invalid(format!(
                "Migration name '{name}' may only use lowercase letters, digits, '-' and '_'"
            )));
        }

        Ok(Self {
            timestamp: timestamp.parse()?,
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_from_datetime() {
        let at = Utc.with_ymd_and_hms(2023, 2, 17, 21, 39, 46).unwrap();
        assert_eq!(
            MigrationTimestamp::from_datetime(at, 0).to_string(),
            "2023021721394600"
        );
        assert_eq!(
            MigrationTimestamp::from_datetime(at, 99).to_string(),
            "2023021721394699"
        );
    }

    #[test]
    fn test_sentinel_sorts_first() {
        assert_eq!(MigrationTimestamp::SENTINEL.to_string(), "0000000000000000");
        assert!(MigrationTimestamp::SENTINEL < "2000010100000000".parse().unwrap());
        assert!("0000000000000000".parse::<MigrationTimestamp>().unwrap().is_sentinel());
    }

    #[test]
    fn test_timestamp_rejects_malformed() {
        assert!("202302172139460".parse::<MigrationTimestamp>().is_err());
        assert!("2023021721394600x".parse::<MigrationTimestamp>().is_err());
        assert!("2023-02-17213946".parse::<MigrationTimestamp>().is_err());
    }

    #[test]
    fn test_migration_id_round_trip() {
        let id: MigrationId = "2023021721394600-add-title-input".parse().unwrap();
        assert_eq!(id.timestamp.to_string(), "2023021721394600");
        assert_eq!(id.name, "add-title-input");
        assert_eq!(id.to_string(), "2023021721394600-add-title-input");

        assert!("2023021721394600".parse::<MigrationId>().is_err());
        assert!("2023021721394600-".parse::<MigrationId>().is_err());
        assert!("2023021721394600-Add Title".parse::<MigrationId>().is_err());
    }
}
