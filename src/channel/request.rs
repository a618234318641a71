//! Building the body of an update request.
//!
//! An update is a form-encoded parameter list (`field1=..&status=..`) that
//! always ends in `headers=false`. [`UpdateBody`] streams that list through the
//! [`Payload`] trait, so the same walk both measures `Content-Length` and writes
//! the bytes.

use super::error::Error;
use super::format::format_float;
use super::{FIELD_COUNT, FIELD_MAX_LEN, FIELD_NAMES, FieldValue, field_index};
use crate::network::application::http::Payload;
use crate::network::error::Error as NetworkError;

/// Appended to every update so the service answers with a bare body.
const TRAILER: &[u8] = b"headers=false";

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Values staged for the next multi-field write.
///
/// Empty field slots and unset location, status or timestamp are left out of
/// the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingUpdate {
    fields: [FieldValue; FIELD_COUNT],
    latitude: Option<f32>,
    longitude: Option<f32>,
    elevation: Option<f32>,
    status: Option<FieldValue>,
    created_at: Option<FieldValue>,
}

impl PendingUpdate {
    /// Stages field text for field `field` (1-8).
    pub fn set_field(&mut self, field: u32, value: FieldValue) -> Result<(), Error> {
        let index = field_index(field)?;
        self.fields[index] = value;
        Ok(())
    }

    /// Stages the latitude; NaN unsets it.
    pub fn set_latitude(&mut self, latitude: f32) -> Result<(), Error> {
        self.latitude = coordinate(latitude)?;
        Ok(())
    }

    /// Stages the longitude; NaN unsets it.
    pub fn set_longitude(&mut self, longitude: f32) -> Result<(), Error> {
        self.longitude = coordinate(longitude)?;
        Ok(())
    }

    /// Stages the elevation; NaN unsets it.
    pub fn set_elevation(&mut self, elevation: f32) -> Result<(), Error> {
        self.elevation = coordinate(elevation)?;
        Ok(())
    }

    /// Stages the status message; an empty string unsets it.
    pub fn set_status(&mut self, status: &str) -> Result<(), Error> {
        self.status = optional_text(status)?;
        Ok(())
    }

    /// Stages the entry timestamp (ISO 8601); an empty string unsets it.
    pub fn set_created_at(&mut self, created_at: &str) -> Result<(), Error> {
        self.created_at = optional_text(created_at)?;
        Ok(())
    }

    /// Staged text of field `field`, empty when unset or out of range.
    pub fn field(&self, field: u32) -> &str {
        field_index(field).map_or("", |index| self.fields[index].as_str())
    }

    /// Staged latitude
    pub fn latitude(&self) -> Option<f32> {
        self.latitude
    }

    /// Staged longitude
    pub fn longitude(&self) -> Option<f32> {
        self.longitude
    }

    /// Staged elevation
    pub fn elevation(&self) -> Option<f32> {
        self.elevation
    }

    /// Staged status
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Staged timestamp
    pub fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }

    /// Whether nothing would be sent.
    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|field| field.is_empty())
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.elevation.is_none()
            && self.status.is_none()
            && self.created_at.is_none()
    }

    /// Drops everything staged.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// The update body for everything staged.
    ///
    /// # Errors
    ///
    /// [`Error::NotStaged`] when nothing is staged, since an update carrying
    /// only `headers=false` would be rejected by the service.
    pub fn body(&self) -> Result<UpdateBody<'_>, Error> {
        if self.is_empty() {
            return Err(Error::NotStaged);
        }
        Ok(UpdateBody::Staged(self))
    }

    /// Calls `visit` with each staged `(name, value)` pair in wire order.
    fn visit(
        &self,
        visit: &mut dyn FnMut(&str, &str) -> Result<(), NetworkError>,
    ) -> Result<(), NetworkError> {
        for (&name, value) in FIELD_NAMES.iter().zip(&self.fields) {
            if !value.is_empty() {
                visit(name, value.as_str())?;
            }
        }

        let location = [
            ("lat", self.latitude),
            ("long", self.longitude),
            ("elevation", self.elevation),
        ];
        for (name, coordinate) in location {
            if let Some(coordinate) = coordinate {
                // Range was checked when the coordinate was staged.
                let text = format_float(coordinate).unwrap_or_default();
                visit(name, text.as_str())?;
            }
        }

        if let Some(status) = &self.status {
            visit("status", status.as_str())?;
        }
        if let Some(created_at) = &self.created_at {
            visit("created_at", created_at.as_str())?;
        }
        Ok(())
    }
}

fn coordinate(value: f32) -> Result<Option<f32>, Error> {
    if value.is_nan() {
        return Ok(None);
    }
    format_float(value)?;
    Ok(Some(value))
}

fn optional_text(text: &str) -> Result<Option<FieldValue>, Error> {
    if text.len() > FIELD_MAX_LEN {
        return Err(Error::OutOfRange);
    }
    if text.is_empty() {
        return Ok(None);
    }
    FieldValue::try_from(text)
        .map(Some)
        .map_err(|_| Error::OutOfRange)
}

/// The form-encoded body of a `POST /update`.
#[derive(Debug, Clone, Copy)]
pub enum UpdateBody<'a> {
    /// One field, as written by `write_field`.
    Field {
        /// Parameter name, `field1` to `field8`
        name: &'static str,
        /// Unencoded field text
        value: &'a str,
    },
    /// Everything staged in a [`PendingUpdate`].
    Staged(&'a PendingUpdate),
    /// A caller-built parameter string, sent verbatim.
    Raw(&'a str),
}

impl<'a> UpdateBody<'a> {
    /// Body for a single field write.
    pub fn field(field: u32, value: &'a str) -> Result<Self, Error> {
        let name = FIELD_NAMES[field_index(field)?];
        Ok(UpdateBody::Field { name, value })
    }
}

impl Payload for UpdateBody<'_> {
    fn emit(&self, sink: &mut dyn FnMut(&[u8]) -> Result<(), NetworkError>) -> Result<(), NetworkError> {
        let mut empty = true;
        match self {
            UpdateBody::Field { name, value } => {
                emit_param(sink, &mut empty, *name, *value)?;
            }
            UpdateBody::Staged(update) => {
                update.visit(&mut |name: &str, value: &str| {
                    emit_param(sink, &mut empty, name, value)
                })?;
            }
            UpdateBody::Raw(raw) => {
                if !raw.is_empty() {
                    sink(raw.as_bytes())?;
                    empty = false;
                }
            }
        }

        if !empty {
            sink(b"&")?;
        }
        sink(TRAILER)
    }
}

fn emit_param(
    sink: &mut dyn FnMut(&[u8]) -> Result<(), NetworkError>,
    empty: &mut bool,
    name: &str,
    value: &str,
) -> Result<(), NetworkError> {
    if !*empty {
        sink(b"&")?;
    }
    *empty = false;
    sink(name.as_bytes())?;
    sink(b"=")?;
    percent_encode(value, sink)
}

/// Form-encodes `value`: unreserved bytes pass through in runs, every other
/// byte becomes `%XX`.
fn percent_encode(
    value: &str,
    sink: &mut dyn FnMut(&[u8]) -> Result<(), NetworkError>,
) -> Result<(), NetworkError> {
    let bytes = value.as_bytes();
    let mut run_start = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        if is_unreserved(byte) {
            continue;
        }
        if run_start < i {
            sink(&bytes[run_start..i])?;
        }
        sink(&[b'%', HEX[usize::from(byte >> 4)], HEX[usize::from(byte & 0x0f)]])?;
        run_start = i + 1;
    }
    if run_start < bytes.len() {
        sink(&bytes[run_start..])?;
    }
    Ok(())
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~')
}
