//! Activity transfer session: reassembles notification fragments into
//! header frames and sample blocks.
//!
//! The band gives no message boundaries; a notification may carry a partial
//! header, several blocks, or a block split across two notifications. The
//! session buffers whatever it cannot decode yet and drains the buffer as
//! soon as a full header or block is available.
//!
//! ```text
//!             header (next > 0)
//!  AwaitingHeader ───────────────▶ ReadingBlocks { remaining }
//!     │   ▲                              │
//!     │   └──────── remaining == 0 ──────┘
//!     │ header (next == 0)
//!     ▼
//!  Complete
//! ```

use std::ops::RangeInclusive;

use bytes::BytesMut;
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, TimeDelta};
use strum_macros::Display;
use tracing::{debug, trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ack::AcknowledgmentMessage;
use crate::activity::{ActivityFrameDecoder, ActivityHeader, ActivitySampleBlock, HeaderFrame};
use crate::constants::{ACTIVITY_BLOCK_SIZE, ACTIVITY_HEADER_SIZE, YEAR_BASE};

/// Per-session settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Year offsets (year - 2000) that mark a valid header frame
    pub accepted_year_offsets: RangeInclusive<u8>,
    /// Ask the band to keep acknowledged data instead of erasing it
    pub retain_on_device: bool,
}

impl SessionConfig {
    /// Accept headers stamped with exactly `year_offset`
    pub fn for_year_offset(year_offset: u8) -> Self {
        Self {
            accepted_year_offsets: year_offset..=year_offset,
            retain_on_device: false,
        }
    }

    /// Accept headers from the year of `date` and the year before it, so a
    /// transfer started in early January still picks up December data.
    pub fn for_date(date: NaiveDate) -> Self {
        let offset = (date.year() - YEAR_BASE).clamp(0, u8::MAX as i32) as u8;
        Self {
            accepted_year_offsets: offset.saturating_sub(1)..=offset,
            retain_on_device: false,
        }
    }

    /// [`SessionConfig::for_date`] with the local wall clock
    pub fn today() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    pub fn with_retain_on_device(mut self, retain_on_device: bool) -> Self {
        self.retain_on_device = retain_on_device;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ReassemblerState {
    AwaitingHeader,
    ReadingBlocks { remaining: u32 },
    Complete,
}

/// One header and the sample blocks that followed it
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActivitySegment {
    pub header: ActivityHeader,
    pub blocks: Vec<ActivitySampleBlock>,
}

impl ActivitySegment {
    pub fn steps(&self) -> u64 {
        self.blocks.iter().map(|b| b.steps as u64).sum()
    }

    /// Blocks paired with their minute. Times are `None` when the header
    /// carried an impossible date.
    pub fn samples(&self) -> impl Iterator<Item = ActivitySample> + '_ {
        let start = self.header.start_time();
        self.blocks.iter().enumerate().map(move |(minute, block)| ActivitySample {
            time: start.map(|t| t + TimeDelta::minutes(minute as i64)),
            block: *block,
        })
    }
}

/// A sample block with its timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActivitySample {
    pub time: Option<NaiveDateTime>,
    pub block: ActivitySampleBlock,
}

/// State of one activity transfer. Exactly one per connection; drop it when
/// the transfer completes or the link goes away.
#[derive(Debug)]
pub struct ActivitySession {
    decoder: ActivityFrameDecoder,
    retain_on_device: bool,
    buffer: BytesMut,
    state: ReassemblerState,
    headers_seen: u32,
    pending_acks: Vec<AcknowledgmentMessage>,
    total_steps: u64,
    segments: Vec<ActivitySegment>,
    bytes_observed: u64,
    unframed_bytes: u64,
}

impl ActivitySession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            decoder: ActivityFrameDecoder::new(config.accepted_year_offsets),
            retain_on_device: config.retain_on_device,
            buffer: BytesMut::new(),
            state: ReassemblerState::AwaitingHeader,
            headers_seen: 0,
            pending_acks: Vec::new(),
            total_steps: 0,
            segments: Vec::new(),
            bytes_observed: 0,
            unframed_bytes: 0,
        }
    }

    /// Feed one notification fragment, in arrival order.
    ///
    /// Fragments may have any length. Whatever cannot be decoded yet stays
    /// buffered for the next call.
    pub fn ingest(&mut self, fragment: &[u8]) {
        self.bytes_observed += fragment.len() as u64;
        self.buffer.extend_from_slice(fragment);
        trace!(len = fragment.len(), buffered = self.buffer.len(), "Ingested fragment");
        self.drain();
    }

    fn drain(&mut self) {
        loop {
            match self.state {
                ReassemblerState::Complete => return,
                ReassemblerState::AwaitingHeader => {
                    if self.buffer.len() < ACTIVITY_HEADER_SIZE {
                        return;
                    }
                    let window = self.buffer.split_to(ACTIVITY_HEADER_SIZE);
                    match self.decoder.decode_header(&window) {
                        HeaderFrame::Header(header) => self.on_header(header),
                        HeaderFrame::NotAHeader => {
                            self.unframed_bytes += ACTIVITY_HEADER_SIZE as u64;
                            warn!(window = %hex::encode(&window), "Expected an activity header, skipping window");
                        }
                    }
                }
                ReassemblerState::ReadingBlocks { remaining } => {
                    if self.buffer.len() < ACTIVITY_BLOCK_SIZE {
                        return;
                    }
                    let chunk = self.buffer.split_to(ACTIVITY_BLOCK_SIZE);
                    let mut raw = [0u8; ACTIVITY_BLOCK_SIZE];
                    raw.copy_from_slice(&chunk);
                    let block = self.decoder.decode_block(&raw);
                    self.on_block(block);

                    let remaining = remaining.saturating_sub(ACTIVITY_BLOCK_SIZE as u32);
                    self.state = if remaining == 0 {
                        ReassemblerState::AwaitingHeader
                    } else {
                        ReassemblerState::ReadingBlocks { remaining }
                    };
                }
            }
        }
    }

    fn on_header(&mut self, header: ActivityHeader) {
        self.headers_seen += 1;
        debug!(
            index = self.headers_seen,
            start = ?header.start_time(),
            data_to_read = header.data_to_read,
            data_until_next_header = header.data_until_next_header,
            "Activity header"
        );

        if header.is_final() {
            debug!(total_steps = self.total_steps, "Activity transfer complete");
            self.state = ReassemblerState::Complete;
            return;
        }

        // The first header primes the transfer and is never acknowledged
        if self.headers_seen > 1 {
            self.pending_acks
                .push(AcknowledgmentMessage::build(&header, self.retain_on_device));
        }

        self.segments.push(ActivitySegment {
            header,
            blocks: Vec::with_capacity(header.block_count() as usize),
        });
        self.state = ReassemblerState::ReadingBlocks {
            remaining: header.data_until_next_header,
        };
    }

    fn on_block(&mut self, block: ActivitySampleBlock) {
        trace!(?block, "Activity block");
        self.total_steps += block.steps as u64;
        if let Some(segment) = self.segments.last_mut() {
            segment.blocks.push(block);
        }
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Acknowledgments to write to the control point once the transfer completes
    pub fn pending_acknowledgments(&self) -> &[AcknowledgmentMessage] {
        &self.pending_acks
    }

    pub fn take_acknowledgments(&mut self) -> Vec<AcknowledgmentMessage> {
        std::mem::take(&mut self.pending_acks)
    }

    /// Drop the oldest pending acknowledgment once it has been written
    pub fn confirm_acknowledgment(&mut self) -> Option<AcknowledgmentMessage> {
        if self.pending_acks.is_empty() {
            None
        } else {
            Some(self.pending_acks.remove(0))
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == ReassemblerState::Complete
    }

    pub fn state(&self) -> ReassemblerState {
        self.state
    }

    pub fn headers_seen(&self) -> u32 {
        self.headers_seen
    }

    pub fn segments(&self) -> &[ActivitySegment] {
        &self.segments
    }

    /// Every decoded minute, in stream order
    pub fn samples(&self) -> impl Iterator<Item = ActivitySample> + '_ {
        self.segments.iter().flat_map(|segment| segment.samples())
    }

    /// Bytes received but not yet decoded
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes that arrived after the final header
    pub fn trailing_bytes(&self) -> &[u8] {
        if self.is_complete() { &self.buffer[..] } else { &[] }
    }

    pub fn bytes_observed(&self) -> u64 {
        self.bytes_observed
    }

    /// Bytes skipped because an 11-byte window failed the header signature
    pub fn unframed_bytes(&self) -> u64 {
        self.unframed_bytes
    }
}
