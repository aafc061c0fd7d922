//! Activity log frames: 11-byte headers and 3-byte sample blocks.
//!
//! The band streams its activity log on the activity-data characteristic as
//! a flat byte stream: a header frame announcing a timestamp and how many
//! sample bytes follow, then that many bytes of 3-byte sample blocks (one
//! per minute), then the next header. A header announcing zero following
//! bytes ends the transfer.

use std::ops::RangeInclusive;

use chrono::{NaiveDate, NaiveDateTime};
use zerocopy::byteorder::little_endian::U16;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::{ACTIVITY_BLOCK_SIZE, ACTIVITY_DATA_TYPE, ACTIVITY_HEADER_SIZE, YEAR_BASE};

/// Header frame in wire layout
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct ActivityHeaderRaw {
    pub data_type: u8,
    /// year offset, month (0-based), day, hour, minute, second
    pub timestamp: [u8; 6],
    pub data_to_read: U16,
    pub data_until_next_header: U16,
}

/// Sample block in wire layout
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct ActivitySampleBlockRaw {
    pub category: u8,
    pub intensity: u8,
    pub steps: u8,
}

/// A decoded header frame. Counts are already scaled to bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActivityHeader {
    pub data_type: u8,
    /// Timestamp bytes exactly as received, echoed back in acknowledgments
    pub raw_timestamp: [u8; 6],
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub data_to_read: u32,
    /// Bytes of sample blocks before the next header; 0 ends the transfer
    pub data_until_next_header: u32,
}

impl ActivityHeader {
    /// Start of the segment, if the band sent a valid calendar date
    pub fn start_time(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_opt(self.hour, self.minute, self.second)
    }

    pub fn is_final(&self) -> bool {
        self.data_until_next_header == 0
    }

    /// Number of sample blocks announced by this header
    pub fn block_count(&self) -> u32 {
        self.data_until_next_header / ACTIVITY_BLOCK_SIZE as u32
    }
}

impl From<ActivityHeaderRaw> for ActivityHeader {
    fn from(raw: ActivityHeaderRaw) -> Self {
        let [year_off, month0, day, hour, minute, second] = raw.timestamp;

        let mut data_to_read = raw.data_to_read.get() as u32;
        let mut data_until_next_header = raw.data_until_next_header.get() as u32;
        // Type 1 counts are in blocks, convert to bytes
        if raw.data_type == ACTIVITY_DATA_TYPE {
            data_to_read *= ACTIVITY_BLOCK_SIZE as u32;
            data_until_next_header *= ACTIVITY_BLOCK_SIZE as u32;
        }

        Self {
            data_type: raw.data_type,
            raw_timestamp: raw.timestamp,
            year: YEAR_BASE + year_off as i32,
            month: month0 as u32 + 1,
            day: day as u32,
            hour: hour as u32,
            minute: minute as u32,
            second: second as u32,
            data_to_read,
            data_until_next_header,
        }
    }
}

/// One minute of activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActivitySampleBlock {
    pub category: u8,
    pub intensity: u8,
    /// 0 means no steps in this minute, not invalid data
    pub steps: u8,
}

impl From<ActivitySampleBlockRaw> for ActivitySampleBlock {
    fn from(raw: ActivitySampleBlockRaw) -> Self {
        Self {
            category: raw.category,
            intensity: raw.intensity,
            steps: raw.steps,
        }
    }
}

/// Result of testing an 11-byte window for the header signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFrame {
    Header(ActivityHeader),
    NotAHeader,
}

/// Recognizes header frames and decodes sample blocks.
///
/// The second header byte is the year offset of the transfer. Which offsets
/// count as a header is configuration, normally derived from the wall clock
/// when the session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityFrameDecoder {
    accepted_year_offsets: RangeInclusive<u8>,
}

impl ActivityFrameDecoder {
    pub fn new(accepted_year_offsets: RangeInclusive<u8>) -> Self {
        Self { accepted_year_offsets }
    }

    /// Decoder accepting exactly one year offset
    pub fn for_year_offset(year_offset: u8) -> Self {
        Self::new(year_offset..=year_offset)
    }

    pub fn accepted_year_offsets(&self) -> &RangeInclusive<u8> {
        &self.accepted_year_offsets
    }

    pub fn decode_header(&self, bytes: &[u8]) -> HeaderFrame {
        if bytes.len() != ACTIVITY_HEADER_SIZE {
            return HeaderFrame::NotAHeader;
        }
        let Ok(raw) = ActivityHeaderRaw::read_from_bytes(bytes) else {
            return HeaderFrame::NotAHeader;
        };
        if raw.data_type != ACTIVITY_DATA_TYPE || !self.accepted_year_offsets.contains(&raw.timestamp[0]) {
            return HeaderFrame::NotAHeader;
        }
        HeaderFrame::Header(ActivityHeader::from(raw))
    }

    pub fn decode_block(&self, bytes: &[u8; ACTIVITY_BLOCK_SIZE]) -> ActivitySampleBlock {
        let [category, intensity, steps] = *bytes;
        ActivitySampleBlock::from(ActivitySampleBlockRaw {
            category,
            intensity,
            steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: [u8; 11] = [1, 17, 4, 7, 9, 42, 1, 4, 0, 4, 0];

    #[test]
    fn decodes_header_fields() {
        let decoder = ActivityFrameDecoder::for_year_offset(17);
        let HeaderFrame::Header(header) = decoder.decode_header(&HEADER) else {
            panic!("expected a header");
        };

        assert_eq!(header.year, 2017);
        assert_eq!(header.month, 5);
        assert_eq!((header.day, header.hour, header.minute, header.second), (7, 9, 42, 1));
        assert_eq!(header.data_to_read, 12);
        assert_eq!(header.data_until_next_header, 12);
        assert_eq!(header.block_count(), 4);
        assert_eq!(header.raw_timestamp, [17, 4, 7, 9, 42, 1]);
        assert_eq!(
            header.start_time(),
            NaiveDate::from_ymd_opt(2017, 5, 7).unwrap().and_hms_opt(9, 42, 1)
        );
        assert!(!header.is_final());
    }

    #[test]
    fn counts_are_little_endian() {
        let decoder = ActivityFrameDecoder::for_year_offset(17);
        let bytes = [1, 17, 0, 1, 0, 0, 0, 0x2c, 0x01, 0x01, 0x01];
        let HeaderFrame::Header(header) = decoder.decode_header(&bytes) else {
            panic!("expected a header");
        };
        assert_eq!(header.data_to_read, 300 * 3);
        assert_eq!(header.data_until_next_header, 257 * 3);
    }

    #[test]
    fn rejects_wrong_signature() {
        let decoder = ActivityFrameDecoder::for_year_offset(17);

        let mut wrong_type = HEADER;
        wrong_type[0] = 2;
        assert_eq!(decoder.decode_header(&wrong_type), HeaderFrame::NotAHeader);

        let mut wrong_year = HEADER;
        wrong_year[1] = 26;
        assert_eq!(decoder.decode_header(&wrong_year), HeaderFrame::NotAHeader);

        assert_eq!(decoder.decode_header(&HEADER[..10]), HeaderFrame::NotAHeader);
        assert_eq!(decoder.decode_header(&[]), HeaderFrame::NotAHeader);
    }

    #[test]
    fn year_range_is_configurable() {
        let decoder = ActivityFrameDecoder::new(25..=26);
        let mut header = HEADER;
        header[1] = 25;
        assert!(matches!(decoder.decode_header(&header), HeaderFrame::Header(_)));
        header[1] = 26;
        assert!(matches!(decoder.decode_header(&header), HeaderFrame::Header(_)));
        header[1] = 17;
        assert_eq!(decoder.decode_header(&header), HeaderFrame::NotAHeader);
    }

    #[test]
    fn invalid_calendar_date_has_no_start_time() {
        let decoder = ActivityFrameDecoder::for_year_offset(17);
        let bytes = [1, 17, 13, 40, 0, 0, 0, 0, 0, 0, 0];
        let HeaderFrame::Header(header) = decoder.decode_header(&bytes) else {
            panic!("expected a header");
        };
        assert_eq!(header.start_time(), None);
        assert!(header.is_final());
    }

    #[test]
    fn decodes_block() {
        let decoder = ActivityFrameDecoder::for_year_offset(17);
        let block = decoder.decode_block(&[5, 20, 87]);
        assert_eq!(
            block,
            ActivitySampleBlock {
                category: 5,
                intensity: 20,
                steps: 87
            }
        );
    }
}
