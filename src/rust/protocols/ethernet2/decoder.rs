// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use super::{
    aligner::SfdAligner,
    crc::Crc32,
    frame::{
        Frame,
        Payload,
        ETHERNET2_HEADER_SIZE,
    },
    protocol::{
        self,
        ETHERTYPE_TYPE_MIN,
    },
};
use crate::{
    protocols::layer1::StreamBeat,
    runtime::{
        fail::Fail,
        network::{
            config::{
                DecoderConfig,
                Delimiting,
            },
            consts::FCS_SIZE,
        },
    },
};
use ::libc::{
    EBADMSG,
    EMSGSIZE,
};
use ::std::{
    fmt,
    mem,
};

//======================================================================================================================
// Structures
//======================================================================================================================

/// Receiver states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RxState {
    Idle,
    /// Header and payload bytes.
    Receive,
    /// Collecting the FCS; `index` bytes already stored.
    CrcCheck { index: usize },
    /// Dropping what is left of a rejected burst until the line goes idle.
    Discard,
}

/// Reasons for rejecting a received frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RxError {
    /// The FCS does not match the CRC-32 of the received header and payload.
    CrcMismatch { computed: u32, received: u32 },
    /// The line went idle before the frame was complete.
    Truncated { position: usize },
    /// The payload is longer than the MTU.
    Oversized { mtu: usize },
}

/// Outcome of one receive cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RxEvent {
    /// Nothing resolved on this cycle.
    Pending,
    /// A frame passed the FCS check and is available through [FrameDecoder::frame].
    Received,
    /// A frame was dropped.
    Rejected(RxError),
}

/// Receive statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RxStats {
    pub frames_received: u64,
    pub crc_errors: u64,
    pub truncated: u64,
    pub oversized: u64,
}

/// Streaming Ethernet II receiver: one byte per tick.
pub struct FrameDecoder {
    config: DecoderConfig,
    /// Present when the line still carries preamble and SFD.
    aligner: Option<SfdAligner>,
    state: RxState,
    crc: Crc32,
    /// Bytes consumed for the current frame, FCS included.
    position: usize,
    header: [u8; ETHERNET2_HEADER_SIZE],
    payload: Payload,
    /// Payload length of the current frame, when the wire contract announces it.
    expected: Option<usize>,
    /// Delay line holding the last bytes seen, which may turn out to be the FCS.
    window: [u8; FCS_SIZE],
    window_len: usize,
    received_fcs: [u8; FCS_SIZE],
    frame: Option<Frame>,
    error: Option<RxError>,
    stats: RxStats,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl FrameDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        let aligner: Option<SfdAligner> = if config.get_strip_preamble() {
            Some(SfdAligner::new())
        } else {
            None
        };
        Self {
            config,
            aligner,
            state: RxState::Idle,
            crc: Crc32::new(),
            position: 0,
            header: [0; ETHERNET2_HEADER_SIZE],
            payload: Payload::new(),
            expected: None,
            window: [0; FCS_SIZE],
            window_len: 0,
            received_fcs: [0; FCS_SIZE],
            frame: None,
            error: None,
            stats: RxStats::default(),
        }
    }

    /// Consumes the beat presented on this cycle.
    pub fn tick(&mut self, beat: StreamBeat) -> RxEvent {
        let beat: StreamBeat = match self.aligner.as_mut() {
            Some(aligner) => aligner.tick(beat),
            None => beat,
        };
        let (next, event): (RxState, RxEvent) = self.transition(beat);
        self.state = next;
        event
    }

    fn transition(&mut self, beat: StreamBeat) -> (RxState, RxEvent) {
        match (self.state, beat.byte()) {
            (RxState::Idle, None) => (RxState::Idle, RxEvent::Pending),
            (RxState::Idle, Some(byte)) => {
                self.begin_frame();
                self.receive(byte)
            },
            (RxState::Receive, Some(byte)) => self.receive(byte),
            (RxState::Receive, None) => self.end_of_stream(),
            (RxState::CrcCheck { index }, Some(byte)) => {
                self.position += 1;
                self.received_fcs[index] = byte;
                if index + 1 < FCS_SIZE {
                    (RxState::CrcCheck { index: index + 1 }, RxEvent::Pending)
                } else {
                    self.check_fcs()
                }
            },
            (RxState::CrcCheck { .. }, None) => self.reject(RxError::Truncated {
                position: self.position,
            }),
            (RxState::Discard, Some(_)) => {
                self.position += 1;
                (RxState::Discard, RxEvent::Pending)
            },
            (RxState::Discard, None) => (RxState::Idle, RxEvent::Pending),
        }
    }

    /// Clears everything left over from the previous frame.
    fn begin_frame(&mut self) {
        self.crc.reset();
        self.position = 0;
        self.header = [0; ETHERNET2_HEADER_SIZE];
        self.payload.clear();
        self.expected = None;
        self.window_len = 0;
        self.received_fcs = [0; FCS_SIZE];
        self.frame = None;
        self.error = None;
        trace!("begin_frame(): delimiting={:?}", self.config.get_delimiting());
    }

    fn receive(&mut self, byte: u8) -> (RxState, RxEvent) {
        let offset: usize = self.position;
        self.position += 1;

        if offset < ETHERNET2_HEADER_SIZE {
            self.header[offset] = byte;
            self.crc.update(byte);
            if offset + 1 == ETHERNET2_HEADER_SIZE {
                return self.header_complete();
            }
            return (RxState::Receive, RxEvent::Pending);
        }

        match self.expected {
            Some(len) => match self.commit(byte) {
                Err(e) => self.reject_and_discard(e),
                Ok(()) if self.payload.len() == len => (RxState::CrcCheck { index: 0 }, RxEvent::Pending),
                Ok(()) => (RxState::Receive, RxEvent::Pending),
            },
            None => {
                if self.window_len < FCS_SIZE {
                    self.window[self.window_len] = byte;
                    self.window_len += 1;
                    return (RxState::Receive, RxEvent::Pending);
                }
                let oldest: u8 = self.window[0];
                self.window.rotate_left(1);
                self.window[FCS_SIZE - 1] = byte;
                match self.commit(oldest) {
                    Err(e) => self.reject_and_discard(e),
                    Ok(()) => (RxState::Receive, RxEvent::Pending),
                }
            },
        }
    }

    /// Decides how the payload is delimited once the EtherType is known.
    fn header_complete(&mut self) -> (RxState, RxEvent) {
        let ether_type: u16 = u16::from_be_bytes([self.header[12], self.header[13]]);
        self.expected = match self.config.get_delimiting() {
            Delimiting::EndOfStream => None,
            Delimiting::Fixed(len) => Some(len),
            Delimiting::LengthField => match protocol::payload_length(ether_type) {
                Some(len) => Some(len),
                None => {
                    if ether_type < ETHERTYPE_TYPE_MIN {
                        warn!("header_complete(): undefined ether_type={:#06x}", ether_type);
                    }
                    None
                },
            },
        };
        debug!(
            "header_complete(): ether_type={:#06x} expected={:?}",
            ether_type, self.expected
        );

        match self.expected {
            Some(len) if len > self.config.get_mtu() => self.reject_and_discard(RxError::Oversized {
                mtu: self.config.get_mtu(),
            }),
            Some(0) => (RxState::CrcCheck { index: 0 }, RxEvent::Pending),
            _ => (RxState::Receive, RxEvent::Pending),
        }
    }

    /// Stores a byte known to belong to the payload and folds it into the CRC.
    fn commit(&mut self, byte: u8) -> Result<(), RxError> {
        let mtu: usize = self.config.get_mtu();
        if self.payload.len() >= mtu || self.payload.try_push(byte).is_err() {
            return Err(RxError::Oversized { mtu });
        }
        self.crc.update(byte);
        Ok(())
    }

    /// The line went idle in the middle of [RxState::Receive].
    fn end_of_stream(&mut self) -> (RxState, RxEvent) {
        if self.expected.is_none() && self.position >= ETHERNET2_HEADER_SIZE + FCS_SIZE {
            // The delay line holds the FCS: the check resolves on this cycle.
            self.received_fcs = self.window;
            return self.check_fcs();
        }
        self.reject(RxError::Truncated {
            position: self.position,
        })
    }

    fn check_fcs(&mut self) -> (RxState, RxEvent) {
        let computed: u32 = self.crc.finalize();
        let received: u32 = u32::from_be_bytes(self.received_fcs);
        if computed != received {
            return self.reject(RxError::CrcMismatch { computed, received });
        }

        let payload: Payload = mem::take(&mut self.payload);
        let frame: Frame = Frame::from_parts(&self.header, payload);
        debug!(
            "check_fcs(): frame received (dst={}, broadcast={}, multicast={}, src={}, ether_type={:#06x}, len={})",
            frame.dst_addr(),
            frame.dst_addr().is_broadcast(),
            frame.dst_addr().is_multicast(),
            frame.src_addr(),
            frame.ether_type(),
            frame.payload().len()
        );
        self.frame = Some(frame);
        self.stats.frames_received += 1;
        (RxState::Idle, RxEvent::Received)
    }

    fn reject(&mut self, error: RxError) -> (RxState, RxEvent) {
        warn!("reject(): {} (position={})", error, self.position);
        match error {
            RxError::CrcMismatch { .. } => self.stats.crc_errors += 1,
            RxError::Truncated { .. } => self.stats.truncated += 1,
            RxError::Oversized { .. } => self.stats.oversized += 1,
        }
        self.error = Some(error);
        (RxState::Idle, RxEvent::Rejected(error))
    }

    fn reject_and_discard(&mut self, error: RxError) -> (RxState, RxEvent) {
        let (_, event): (RxState, RxEvent) = self.reject(error);
        (RxState::Discard, event)
    }

    pub fn state(&self) -> RxState {
        self.state
    }

    /// Bytes consumed for the current (or last) frame.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn stats(&self) -> RxStats {
        self.stats
    }

    /// Returns the last frame that passed the FCS check. Cleared when the next frame starts.
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn take_frame(&mut self) -> Option<Frame> {
        self.frame.take()
    }

    /// Payload bytes of the current (or last) frame. While a frame is being received under end-of-stream
    /// delimiting, the last four bytes seen are held back as they may be the FCS.
    pub fn payload(&self) -> &[u8] {
        match &self.frame {
            Some(frame) => frame.payload(),
            None => &self.payload,
        }
    }

    pub fn payload_at(&self, offset: usize) -> Option<u8> {
        self.payload().get(offset).copied()
    }

    /// Returns true when the last frame passed the FCS check.
    pub fn is_complete(&self) -> bool {
        self.frame.is_some()
    }

    /// Returns the reason the last frame was rejected, if it was. Cleared when the next frame starts.
    pub fn error(&self) -> Option<RxError> {
        self.error
    }

    pub fn error_flag(&self) -> bool {
        self.error.is_some()
    }

    pub fn aligner(&self) -> Option<&SfdAligner> {
        self.aligner.as_ref()
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl fmt::Display for RxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RxError::CrcMismatch { computed, received } => write!(
                f,
                "FCS mismatch (computed={:#010x}, received={:#010x})",
                computed, received
            ),
            RxError::Truncated { position } => write!(f, "frame truncated (position={})", position),
            RxError::Oversized { mtu } => write!(f, "payload exceeds mtu (mtu={})", mtu),
        }
    }
}

impl From<RxError> for Fail {
    fn from(error: RxError) -> Self {
        let errno: i32 = match error {
            RxError::CrcMismatch { .. } | RxError::Truncated { .. } => EBADMSG,
            RxError::Oversized { .. } => EMSGSIZE,
        };
        Fail::new(errno, &error.to_string())
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
