//! Shared serde helpers for configuration types.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Custom deserializer for Duration from milliseconds
pub fn deserialize_duration_from_ms<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let ms = u64::deserialize(deserializer)?;
    Ok(Duration::from_millis(ms))
}

/// Custom deserializer for Duration from seconds
pub fn deserialize_duration_from_seconds<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = u64::deserialize(deserializer)?;
    Ok(Duration::from_secs(secs))
}

/// Custom serializer for Duration to milliseconds
pub fn serialize_duration_to_ms<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Custom serializer for Duration to seconds
pub fn serialize_duration_to_seconds<S>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_secs())
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct TestDurationMs {
        #[serde(
            deserialize_with = "deserialize_duration_from_ms",
            serialize_with = "serialize_duration_to_ms"
        )]
        duration: Duration,
    }

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct TestDurationSecs {
        #[serde(
            deserialize_with = "deserialize_duration_from_seconds",
            serialize_with = "serialize_duration_to_seconds"
        )]
        duration: Duration,
    }

    #[test]
    fn duration_ms_round_trips() {
        let parsed: TestDurationMs = serde_json::from_str(r#"{"duration": 1500}"#).unwrap();
        assert_eq!(parsed.duration, Duration::from_millis(1500));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), r#"{"duration":1500}"#);
    }

    #[test]
    fn duration_secs_round_trips() {
        let parsed: TestDurationSecs = serde_json::from_str(r#"{"duration": 30}"#).unwrap();
        assert_eq!(parsed.duration, Duration::from_secs(30));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), r#"{"duration":30}"#);
    }
}
