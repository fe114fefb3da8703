//! Append-only stream type and its identifier allocation rules.

use std::{fmt, str::FromStr};

use bytes::Bytes;

use crate::key_value_store::StoreError;

pub const INVALID_STREAM_ID_FORMAT: &str = "Invalid stream ID format";
pub const STREAM_ID_ZERO: &str = "The ID specified in XADD must be greater than 0-0";
pub const STREAM_ID_NOT_INCREASING: &str =
    "The ID specified in XADD is equal or smaller than the target stream top item";

/// Composite `<milliseconds>-<sequence>` identifier. Field order gives the
/// lexicographic ordering streams rely on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamId {
    pub milliseconds: u64,
    pub sequence: u64,
}

impl StreamId {
    pub const ZERO: StreamId = StreamId {
        milliseconds: 0,
        sequence: 0,
    };

    pub fn new(milliseconds: u64, sequence: u64) -> Self {
        Self {
            milliseconds,
            sequence,
        }
    }

    /// Id following `self` within the same millisecond.
    fn next_sequence(&self) -> Result<StreamId, StoreError> {
        let sequence = self
            .sequence
            .checked_add(1)
            .ok_or_else(|| StoreError::InvalidArgument(STREAM_ID_NOT_INCREASING.to_string()))?;

        Ok(StreamId::new(self.milliseconds, sequence))
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.milliseconds, self.sequence)
    }
}

/// The three id forms a client may hand to `XADD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamIdRequest {
    /// `*`
    AutoGenerated,
    /// `<ms>-*`
    AutoSequence(u64),
    /// `<ms>-<seq>`
    Explicit(StreamId),
}

impl FromStr for StreamIdRequest {
    type Err = StoreError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input == "*" {
            return Ok(StreamIdRequest::AutoGenerated);
        }

        let invalid_format = || StoreError::InvalidArgument(INVALID_STREAM_ID_FORMAT.to_string());

        let Some((milliseconds, sequence)) = input.split_once('-') else {
            return Err(invalid_format());
        };

        let milliseconds = parse_id_part(milliseconds).ok_or_else(invalid_format)?;

        if sequence == "*" {
            return Ok(StreamIdRequest::AutoSequence(milliseconds));
        }

        let sequence = parse_id_part(sequence).ok_or_else(invalid_format)?;

        Ok(StreamIdRequest::Explicit(StreamId::new(
            milliseconds,
            sequence,
        )))
    }
}

/// Plain decimal digits only; `u64::from_str` would also take a leading `+`.
fn parse_id_part(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    part.parse::<u64>().ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEntry {
    pub id: StreamId,
    pub values: Vec<(Bytes, Bytes)>,
}

impl StreamEntry {
    /// Builds an entry from a flat `field value [field value ...]` list.
    /// The id stays at `0-0` until the entry is appended.
    pub fn from_arguments(arguments: Vec<Bytes>) -> Result<Self, StoreError> {
        if arguments.len() % 2 != 0 {
            return Err(StoreError::InvalidArgument(
                "wrong number of field/value arguments".to_string(),
            ));
        }

        let mut values = Vec::with_capacity(arguments.len() / 2);
        let mut iter = arguments.into_iter();

        while let (Some(field), Some(value)) = (iter.next(), iter.next()) {
            values.push((field, value));
        }

        Ok(Self {
            id: StreamId::ZERO,
            values,
        })
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stream {
    entries: Vec<StreamEntry>,
}

impl Stream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[StreamEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Largest id in the stream, `0-0` when empty.
    pub fn last_id(&self) -> StreamId {
        self.entries
            .last()
            .map(|entry| entry.id)
            .unwrap_or(StreamId::ZERO)
    }

    /// Appends `entry` under `id`. Leaves the stream untouched on error.
    pub fn append_with_id(
        &mut self,
        id: StreamId,
        mut entry: StreamEntry,
    ) -> Result<StreamId, StoreError> {
        if id == StreamId::ZERO {
            return Err(StoreError::InvalidArgument(STREAM_ID_ZERO.to_string()));
        }

        if id <= self.last_id() {
            return Err(StoreError::InvalidArgument(
                STREAM_ID_NOT_INCREASING.to_string(),
            ));
        }

        entry.id = id;
        self.entries.push(entry);

        Ok(id)
    }

    /// `*`: current time, bumping the sequence when the clock has not moved
    /// past the last entry's millisecond.
    pub fn append_with_auto_generated_id(
        &mut self,
        now_milliseconds: u64,
        entry: StreamEntry,
    ) -> Result<StreamId, StoreError> {
        let last_id = self.last_id();

        let id = if now_milliseconds == last_id.milliseconds {
            last_id.next_sequence()?
        } else {
            StreamId::new(now_milliseconds, 0)
        };

        self.append_with_id(id, entry)
    }

    /// `<ms>-*`: next sequence inside `milliseconds`, or `0` for a new one.
    pub fn append_with_auto_generated_sequence(
        &mut self,
        milliseconds: u64,
        entry: StreamEntry,
    ) -> Result<StreamId, StoreError> {
        let last_id = self.last_id();

        let id = if milliseconds == last_id.milliseconds {
            last_id.next_sequence()?
        } else {
            StreamId::new(milliseconds, 0)
        };

        self.append_with_id(id, entry)
    }
}
