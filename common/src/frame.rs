use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One catalog entry: an opaque image name and its capture timestamp.
///
/// The catalog returns timestamps as `"YYYY-MM-DD HH:MM:SS"`. Entries from the
/// list-all endpoint carry only a date, so `image` is empty there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDescriptor {
    #[serde(default)]
    pub image: String,
    pub date: String,
}

impl FrameDescriptor {
    pub fn new(image: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            date: date.into(),
        }
    }

    /// The calendar day part of the timestamp.
    pub fn day(&self) -> Result<NaiveDate, FrameError> {
        let day = self.date.split(' ').next().unwrap_or_default();
        NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .map_err(|_| FrameError::BadTimestamp(self.date.clone()))
    }

    /// The `yyyy/mm/dd` segment used by the archive path for this frame.
    pub fn archive_date(&self) -> Result<String, FrameError> {
        Ok(self.day()?.format("%Y/%m/%d").to_string())
    }
}

/// A descriptor together with the raw image payload fetched for it.
///
/// Keeping both in one record means captions can never drift from the
/// frames they belong to.
#[derive(Debug, Clone)]
pub struct FetchedFrame {
    pub descriptor: FrameDescriptor,
    pub bytes: Bytes,
}

impl FetchedFrame {
    pub fn new(descriptor: FrameDescriptor, bytes: impl Into<Bytes>) -> Self {
        Self {
            descriptor,
            bytes: bytes.into(),
        }
    }

    /// Text drawn onto this frame.
    pub fn caption(&self) -> &str {
        &self.descriptor.date
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("timestamp {0:?} does not start with a YYYY-MM-DD date")]
    BadTimestamp(String),
}
