use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManifestVersion {
    #[serde(rename = "1")]
    V1,
    #[serde(rename = "2")]
    V2,
}

/// Generation time shared by every manifest of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseManifest {
    pub timestamp: i64,
    pub date_string: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub timestamp: i64,
    #[serde(rename = "dateString")]
    pub date_string: String,
    pub version: ManifestVersion,
}

impl BaseManifest {
    /// Both fields are derived from the same instant, truncated to milliseconds,
    /// so `date_string` is always the ISO-8601 rendering of `timestamp`.
    pub fn capture(now: DateTime<Utc>) -> Self {
        let timestamp = now.timestamp_millis();
        let instant = DateTime::from_timestamp_millis(timestamp).unwrap_or(now);

        BaseManifest {
            timestamp,
            date_string: instant.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn tag(&self, version: ManifestVersion) -> Manifest {
        Manifest {
            timestamp: self.timestamp,
            date_string: self.date_string.clone(),
            version,
        }
    }
}
