#[cfg(feature = "chrono")]
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
#[cfg(feature = "uuid")]
use uuid::Uuid;

#[allow(unused_imports)]
use crate::*;

#[cfg(feature = "chrono")]
const DATE_FORMAT: &str = "%Y-%m-%d";
#[cfg(feature = "chrono")]
const TIME_FORMAT: &str = "%H:%M:%S%.f";
#[cfg(feature = "chrono")]
const LOCAL_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

// --- chrono::DateTime<Utc> ---
/// Encodes a `chrono::DateTime<Utc>` as RFC 3339 with a `Z` suffix.
#[cfg(feature = "chrono")]
impl Encoder for DateTime<Utc> {
    fn encode(&self, writer: &mut SerializationWriter) -> Result<()> {
        writer.write_str(&self.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

/// Decodes any RFC 3339 timestamp, converting its offset to UTC.
#[cfg(feature = "chrono")]
impl Decoder for DateTime<Utc> {
    fn decode(node: &ParseNode<'_>) -> Result<Self> {
        DateTime::<FixedOffset>::decode(node).map(|ts| ts.with_timezone(&Utc))
    }
}

// --- chrono::DateTime<FixedOffset> ---
/// Keeps the offset the timestamp was written with.
#[cfg(feature = "chrono")]
impl Encoder for DateTime<FixedOffset> {
    fn encode(&self, writer: &mut SerializationWriter) -> Result<()> {
        writer.write_str(&self.to_rfc3339_opts(SecondsFormat::AutoSi, false))
    }
}

#[cfg(feature = "chrono")]
impl Decoder for DateTime<FixedOffset> {
    fn decode(node: &ParseNode<'_>) -> Result<Self> {
        let text = node.as_str()?;
        DateTime::parse_from_rfc3339(text).map_err(|_| node.invalid_value("timestamp", text))
    }
}

// --- chrono::NaiveDate ---
/// Date-only values travel as `YYYY-MM-DD`.
#[cfg(feature = "chrono")]
impl Encoder for NaiveDate {
    fn encode(&self, writer: &mut SerializationWriter) -> Result<()> {
        writer.write_str(&self.format(DATE_FORMAT).to_string())
    }
}

#[cfg(feature = "chrono")]
impl Decoder for NaiveDate {
    fn decode(node: &ParseNode<'_>) -> Result<Self> {
        let text = node.as_str()?;
        NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| node.invalid_value("date", text))
    }
}

// --- chrono::NaiveTime ---
/// Time-only values travel as `HH:MM:SS` with an optional fraction.
#[cfg(feature = "chrono")]
impl Encoder for NaiveTime {
    fn encode(&self, writer: &mut SerializationWriter) -> Result<()> {
        writer.write_str(&self.format(TIME_FORMAT).to_string())
    }
}

#[cfg(feature = "chrono")]
impl Decoder for NaiveTime {
    fn decode(node: &ParseNode<'_>) -> Result<Self> {
        let text = node.as_str()?;
        NaiveTime::parse_from_str(text, TIME_FORMAT).map_err(|_| node.invalid_value("time", text))
    }
}

// --- chrono::NaiveDateTime ---
#[cfg(feature = "chrono")]
impl Encoder for NaiveDateTime {
    fn encode(&self, writer: &mut SerializationWriter) -> Result<()> {
        writer.write_str(&self.format(LOCAL_DATE_TIME_FORMAT).to_string())
    }
}

#[cfg(feature = "chrono")]
impl Decoder for NaiveDateTime {
    fn decode(node: &ParseNode<'_>) -> Result<Self> {
        let text = node.as_str()?;
        NaiveDateTime::parse_from_str(text, LOCAL_DATE_TIME_FORMAT)
            .map_err(|_| node.invalid_value("date-time", text))
    }
}

// --- uuid::Uuid ---
/// Lowercase hyphenated form. Decode also accepts the simple, braced and URN forms.
#[cfg(feature = "uuid")]
impl Encoder for Uuid {
    fn encode(&self, writer: &mut SerializationWriter) -> Result<()> {
        writer.write_str(self.hyphenated().encode_lower(&mut Uuid::encode_buffer()))
    }
}

#[cfg(feature = "uuid")]
impl Decoder for Uuid {
    fn decode(node: &ParseNode<'_>) -> Result<Self> {
        let text = node.as_str()?;
        Uuid::parse_str(text).map_err(|_| node.invalid_value("uuid", text))
    }
}
