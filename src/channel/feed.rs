//! The latest feed entry of a channel, as fetched by a multi-field read.

use super::error::Error;
use super::format::{parse_float, parse_int, parse_long};
use super::{FIELD_COUNT, FIELD_NAMES, FieldValue, field_index};
use serde::Deserialize;

/// Picks the string value of `key` out of a flat JSON object.
///
/// This is a narrow search, not a parser: it finds `"key":"` and returns the
/// text up to the next `"`. A missing key, a `null` or non-string value, or an
/// unterminated string all give `""`.
///
/// ```
/// use libthingspeak::channel::feed::extract;
///
/// let payload = r#"{"status":"ok","created_at":"2024-01-01T00:00:00Z"}"#;
/// assert_eq!(extract(payload, "status"), "ok");
/// assert_eq!(extract(payload, "field1"), "");
/// ```
pub fn extract<'p>(payload: &'p str, key: &str) -> &'p str {
    if key.is_empty() {
        return "";
    }
    for (at, _) in payload.match_indices(key) {
        if !payload[..at].ends_with('"') {
            continue;
        }
        if let Some(value) = payload[at + key.len()..].strip_prefix("\":\"") {
            return value.find('"').map_or("", |end| &value[..end]);
        }
    }
    ""
}

/// Shape of a feed entry, for the structured parse.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FeedRecord<'a> {
    #[serde(borrow)]
    field1: Option<&'a str>,
    #[serde(borrow)]
    field2: Option<&'a str>,
    #[serde(borrow)]
    field3: Option<&'a str>,
    #[serde(borrow)]
    field4: Option<&'a str>,
    #[serde(borrow)]
    field5: Option<&'a str>,
    #[serde(borrow)]
    field6: Option<&'a str>,
    #[serde(borrow)]
    field7: Option<&'a str>,
    #[serde(borrow)]
    field8: Option<&'a str>,
    #[serde(borrow)]
    status: Option<&'a str>,
    #[serde(borrow)]
    created_at: Option<&'a str>,
    #[serde(borrow)]
    latitude: Option<&'a str>,
    #[serde(borrow)]
    longitude: Option<&'a str>,
    #[serde(borrow)]
    elevation: Option<&'a str>,
}

/// All values of the most recent feed entry.
///
/// Accessors never touch the network; before the first successful read every
/// value is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSnapshot {
    fields: [FieldValue; FIELD_COUNT],
    status: FieldValue,
    created_at: FieldValue,
    latitude: FieldValue,
    longitude: FieldValue,
    elevation: FieldValue,
}

impl FeedSnapshot {
    /// Builds a snapshot from a feed payload.
    ///
    /// Well-formed JSON goes through `serde-json-core`; anything it rejects
    /// (escaped strings, numbers where text is expected, trailing bytes) falls
    /// back to [`extract`] key by key. Either way a key that is missing ends up
    /// as an empty value.
    pub fn parse(payload: &str) -> Self {
        match serde_json_core::from_str::<FeedRecord<'_>>(payload) {
            Ok((record, _)) => Self::from_record(&record),
            Err(_) => {
                trace!("feed is not plain JSON, searching keys");
                Self::from_search(payload)
            }
        }
    }

    fn from_record(record: &FeedRecord<'_>) -> Self {
        let fields = [
            record.field1,
            record.field2,
            record.field3,
            record.field4,
            record.field5,
            record.field6,
            record.field7,
            record.field8,
        ];
        Self {
            fields: fields.map(text),
            status: text(record.status),
            created_at: text(record.created_at),
            latitude: text(record.latitude),
            longitude: text(record.longitude),
            elevation: text(record.elevation),
        }
    }

    fn from_search(payload: &str) -> Self {
        let lookup = |key: &str| text(Some(extract(payload, key)));
        Self {
            fields: FIELD_NAMES.map(lookup),
            status: lookup("status"),
            created_at: lookup("created_at"),
            latitude: lookup("latitude"),
            longitude: lookup("longitude"),
            elevation: lookup("elevation"),
        }
    }

    /// Text of field `field` (1-8).
    pub fn field_as_str(&self, field: u32) -> Result<&str, Error> {
        Ok(self.fields[field_index(field)?].as_str())
    }

    /// Field `field` as a float, `0.0` when it is not numeric.
    pub fn field_as_float(&self, field: u32) -> Result<f32, Error> {
        self.field_as_str(field).map(parse_float)
    }

    /// Field `field` as a long, `0` when it is not numeric.
    pub fn field_as_long(&self, field: u32) -> Result<i64, Error> {
        self.field_as_str(field).map(parse_long)
    }

    /// Field `field` as an int, `0` when it is not numeric.
    pub fn field_as_int(&self, field: u32) -> Result<i32, Error> {
        self.field_as_str(field).map(parse_int)
    }

    /// Status message of the entry
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Timestamp of the entry
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Latitude, `0.0` when absent
    pub fn latitude(&self) -> f32 {
        parse_float(&self.latitude)
    }

    /// Longitude, `0.0` when absent
    pub fn longitude(&self) -> f32 {
        parse_float(&self.longitude)
    }

    /// Elevation, `0.0` when absent
    pub fn elevation(&self) -> f32 {
        parse_float(&self.elevation)
    }
}

/// Marker for a client built without multi-field read support.
///
/// It takes no space, so a compact client never carries a [`FeedSnapshot`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Compact;

/// Values that do not fit a field are treated as malformed.
fn text(value: Option<&str>) -> FieldValue {
    value
        .and_then(|value| FieldValue::try_from(value).ok())
        .unwrap_or_default()
}
