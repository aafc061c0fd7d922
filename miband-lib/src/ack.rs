use std::fmt;

use zerocopy::byteorder::little_endian::U16;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::activity::ActivityHeader;
use crate::constants::{ACK_SIZE, CMD_ACK_ACTIVITY};

/// Acknowledgment for a transferred activity segment, written to the control point.
///
/// The count is the header's `data_until_next_header` truncated to 16 bits.
/// When the band should keep the data it is sent bitwise complemented,
/// otherwise the band erases the acknowledged segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct AcknowledgmentMessage {
    pub command: u8,
    pub timestamp: [u8; 6],
    pub count: U16,
}

impl AcknowledgmentMessage {
    pub fn build(header: &ActivityHeader, retain_on_device: bool) -> Self {
        let count = header.data_until_next_header as u16;
        let count = if retain_on_device { !count } else { count };

        Self {
            command: CMD_ACK_ACTIVITY,
            timestamp: header.raw_timestamp,
            count: U16::new(count),
        }
    }

    pub fn to_bytes(&self) -> [u8; ACK_SIZE] {
        let mut out = [0u8; ACK_SIZE];
        out.copy_from_slice(self.as_bytes());
        out
    }
}

impl fmt::Display for AcknowledgmentMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.as_bytes()))
    }
}
