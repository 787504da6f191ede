// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use super::{
    crc::Crc32,
    frame::{
        Frame,
        ETHERNET2_HEADER_SIZE,
    },
    padding,
};
use crate::{
    protocols::layer1::{
        drain,
        BeatSource,
        StreamBeat,
    },
    runtime::{
        fail::Fail,
        network::{
            config::EncoderConfig,
            consts::{
                FCS_SIZE,
                MIN_FRAME_SIZE,
                PREAMBLE_BYTE,
                PREAMBLE_LENGTH,
                SFD_BYTE,
            },
        },
    },
};
use ::libc::{
    EBUSY,
    EMSGSIZE,
};

//======================================================================================================================
// Constants
//======================================================================================================================

/// Bytes taken by the destination and source addresses.
const MAC_FIELDS_SIZE: usize = 12;

//======================================================================================================================
// Structures
//======================================================================================================================

/// Transmitter states. Indices count the bytes already emitted within the current field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxState {
    Idle,
    /// Preamble bytes, then the SFD once `index` reaches the preamble length.
    Preamble { index: usize },
    /// Destination then source address.
    Mac { index: usize },
    EtherType { index: usize },
    Payload { index: usize },
    /// `fcs` is latched when the state is entered.
    Fcs { fcs: [u8; FCS_SIZE], index: usize },
}

/// Transmit statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TxStats {
    /// Frames whose last FCS byte went out.
    pub frames_sent: u64,
    /// Valid beats emitted for completed frames, preamble and SFD included.
    pub bytes_sent: u64,
    /// Start requests refused because a frame was in flight.
    pub busy_rejects: u64,
}

/// Streaming Ethernet II transmitter: one byte per tick.
pub struct FrameEncoder {
    config: EncoderConfig,
    state: TxState,
    /// Frame in flight.
    frame: Frame,
    /// Serialized header of the frame in flight.
    header: [u8; ETHERNET2_HEADER_SIZE],
    crc: Crc32,
    /// Valid beats emitted for the frame in flight.
    position: usize,
    stats: TxStats,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl FrameEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self {
            config,
            state: TxState::Idle,
            frame: Frame::default(),
            header: [0; ETHERNET2_HEADER_SIZE],
            crc: Crc32::new(),
            position: 0,
            stats: TxStats::default(),
        }
    }

    /// Latches `frame` for transmission, starting with the next tick. Only honored when idle: a request arriving
    /// while a frame is in flight is dropped with `EBUSY` and leaves that frame untouched. Payloads larger than the
    /// MTU, once padded, are refused with `EMSGSIZE`.
    pub fn start(&mut self, frame: Frame) -> Result<(), Fail> {
        if self.state != TxState::Idle {
            self.stats.busy_rejects += 1;
            let cause: String = format!(
                "transmission in progress (state={:?}, position={})",
                self.state, self.position
            );
            warn!("start(): {}", cause);
            return Err(Fail::new(EBUSY, &cause));
        }

        let frame: Frame = if self.config.get_pad_short_frames() {
            padding::pad_to_minimum(&frame)
        } else {
            frame
        };

        if frame.payload().len() > self.config.get_mtu() {
            let cause: String = format!(
                "payload exceeds mtu (len={}, mtu={}, padded={})",
                frame.payload().len(),
                self.config.get_mtu(),
                self.config.get_pad_short_frames()
            );
            warn!("start(): {}", cause);
            return Err(Fail::new(EMSGSIZE, &cause));
        }

        self.frame = frame;
        self.header = self.frame.serialize_header();
        self.crc.reset();
        self.position = 0;
        self.state = TxState::Preamble { index: 0 };
        debug!(
            "start(): dst={} src={} ether_type={:#06x} len={}",
            self.frame.dst_addr(),
            self.frame.src_addr(),
            self.frame.ether_type(),
            self.frame.payload().len()
        );
        Ok(())
    }

    /// Advances one cycle and returns the beat driven on it.
    pub fn tick(&mut self) -> StreamBeat {
        let (next, beat): (TxState, StreamBeat) = self.transition();
        if beat.valid {
            self.position += 1;
            trace!("tick(): state={:?} data={:#04x}", self.state, beat.data);
        }
        if let (TxState::Fcs { .. }, TxState::Idle) = (self.state, next) {
            self.stats.frames_sent += 1;
            self.stats.bytes_sent += self.position as u64;
            debug!("tick(): frame sent (bytes={})", self.position);
        }
        self.state = next;
        beat
    }

    /// Computes the next state and the beat for the current cycle.
    fn transition(&mut self) -> (TxState, StreamBeat) {
        match self.state {
            TxState::Idle => (TxState::Idle, StreamBeat::idle()),
            TxState::Preamble { index } if index < PREAMBLE_LENGTH => {
                (TxState::Preamble { index: index + 1 }, StreamBeat::data(PREAMBLE_BYTE))
            },
            TxState::Preamble { .. } => (TxState::Mac { index: 0 }, StreamBeat::data(SFD_BYTE)),
            TxState::Mac { index } => {
                let byte: u8 = self.covered(self.header[index]);
                let next: TxState = if index + 1 < MAC_FIELDS_SIZE {
                    TxState::Mac { index: index + 1 }
                } else {
                    TxState::EtherType { index: 0 }
                };
                (next, StreamBeat::data(byte))
            },
            TxState::EtherType { index } => {
                let byte: u8 = self.covered(self.header[MAC_FIELDS_SIZE + index]);
                let next: TxState = if index == 0 {
                    TxState::EtherType { index: 1 }
                } else if self.frame.payload().is_empty() {
                    self.enter_fcs()
                } else {
                    TxState::Payload { index: 0 }
                };
                (next, StreamBeat::data(byte))
            },
            TxState::Payload { index } => {
                let byte: u8 = self.covered(self.frame.payload()[index]);
                let next: TxState = if index + 1 < self.frame.payload().len() {
                    TxState::Payload { index: index + 1 }
                } else {
                    self.enter_fcs()
                };
                (next, StreamBeat::data(byte))
            },
            TxState::Fcs { fcs, index } => {
                let next: TxState = if index + 1 < FCS_SIZE {
                    TxState::Fcs { fcs, index: index + 1 }
                } else {
                    TxState::Idle
                };
                (next, StreamBeat::data(fcs[index]))
            },
        }
    }

    /// Feeds a byte covered by the FCS into the CRC and hands it back.
    fn covered(&mut self, byte: u8) -> u8 {
        self.crc.update(byte);
        byte
    }

    /// Latches the FCS once the last covered byte has been folded.
    fn enter_fcs(&self) -> TxState {
        TxState::Fcs {
            fcs: self.crc.fcs(),
            index: 0,
        }
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state != TxState::Idle
    }

    /// Valid beats emitted so far for the current (or last) frame.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn stats(&self) -> TxStats {
        self.stats
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl BeatSource for FrameEncoder {
    fn tick(&mut self) -> StreamBeat {
        FrameEncoder::tick(self)
    }

    fn is_idle(&self) -> bool {
        !self.is_busy()
    }
}

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Encodes `frame` with a fresh encoder and returns every byte put on the wire, preamble and SFD included.
pub fn encode(config: EncoderConfig, frame: Frame) -> Result<Vec<u8>, Fail> {
    let mut encoder: FrameEncoder = FrameEncoder::new(config);
    let max_ticks: usize = PREAMBLE_LENGTH + 1 + frame.wire_len().max(MIN_FRAME_SIZE);
    encoder.start(frame)?;
    Ok(drain(&mut encoder, max_ticks)
        .into_iter()
        .filter_map(|beat: StreamBeat| beat.byte())
        .collect())
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        protocols::ethernet2::crc,
        runtime::network::types::MacAddress,
    };
    use ::anyhow::Result;

    fn sample(payload: &[u8]) -> Result<Frame> {
        Ok(Frame::new(
            MacAddress::new([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
            MacAddress::new([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]),
            0x0800,
            payload,
        )?)
    }

    /// Runs `encoder` for `ticks` cycles.
    fn run(encoder: &mut FrameEncoder, ticks: usize) -> Vec<StreamBeat> {
        (0..ticks).map(|_| encoder.tick()).collect()
    }

    #[test]
    fn idle_encoder_drives_nothing() -> Result<()> {
        let mut encoder: FrameEncoder = FrameEncoder::new(EncoderConfig::default());
        crate::ensure_eq!(run(&mut encoder, 3), vec![StreamBeat::idle(); 3]);
        crate::ensure_eq!(encoder.is_busy(), false);
        Ok(())
    }

    #[test]
    fn wire_layout() -> Result<()> {
        let payload: [u8; 10] = [0xde, 0xad, 0xbe, 0xef, 0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc];
        let frame: Frame = sample(&payload)?;
        let fcs: u32 = frame.fcs();
        let bytes: Vec<u8> = encode(EncoderConfig::default(), frame)?;

        crate::ensure_eq!(bytes.len(), 8 + 14 + payload.len() + 4);
        crate::ensure_eq!(&bytes[..7], &[PREAMBLE_BYTE; 7]);
        crate::ensure_eq!(bytes[7], SFD_BYTE);
        crate::ensure_eq!(&bytes[8..14], &[0xaau8, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        crate::ensure_eq!(&bytes[14..20], &[0x11u8, 0x22, 0x33, 0x44, 0x55, 0x66]);
        crate::ensure_eq!(&bytes[20..22], &[0x08u8, 0x00]);
        crate::ensure_eq!(&bytes[22..32], &payload);
        crate::ensure_eq!(&bytes[32..], &fcs.to_be_bytes());
        Ok(())
    }

    /// The FCS covers addresses, EtherType and payload, never the preamble or the SFD.
    #[test]
    fn fcs_excludes_preamble() -> Result<()> {
        let bytes: Vec<u8> = encode(EncoderConfig::default(), sample(&[0x01, 0x02, 0x03])?)?;
        let (covered, fcs) = bytes[8..].split_at(bytes.len() - 8 - FCS_SIZE);
        crate::ensure_eq!(fcs, &crc::checksum(covered).to_be_bytes());
        crate::ensure_neq!(fcs, &crc::checksum(&bytes[..bytes.len() - FCS_SIZE]).to_be_bytes());
        Ok(())
    }

    #[test]
    fn empty_payload_goes_straight_to_fcs() -> Result<()> {
        let mut encoder: FrameEncoder = FrameEncoder::new(EncoderConfig::default());
        encoder.start(sample(&[])?)?;
        let beats: Vec<StreamBeat> = run(&mut encoder, 8 + 14);
        crate::ensure_eq!(beats.iter().all(|beat: &StreamBeat| beat.valid), true);
        crate::ensure_eq!(
            encoder.state(),
            TxState::Fcs {
                fcs: sample(&[])?.fcs().to_be_bytes(),
                index: 0
            }
        );
        run(&mut encoder, FCS_SIZE);
        crate::ensure_eq!(encoder.is_busy(), false);
        crate::ensure_eq!(encoder.tick(), StreamBeat::idle());
        crate::ensure_eq!(encoder.position(), 8 + 14 + FCS_SIZE);
        Ok(())
    }

    #[test]
    fn busy_start_leaves_frame_in_flight_untouched() -> Result<()> {
        let payload: Vec<u8> = (0..32u8).collect();
        let reference: Vec<u8> = encode(EncoderConfig::default(), sample(&payload)?)?;

        let mut encoder: FrameEncoder = FrameEncoder::new(EncoderConfig::default());
        encoder.start(sample(&payload)?)?;
        let mut bytes: Vec<u8> = Vec::new();
        for tick in 0..reference.len() {
            if tick == 20 {
                match encoder.start(sample(&[0xff; 4])?) {
                    Ok(()) => anyhow::bail!("start should be refused while busy"),
                    Err(e) => crate::ensure_eq!(e.errno, EBUSY),
                }
            }
            bytes.extend(encoder.tick().byte());
        }
        crate::ensure_eq!(bytes, reference);
        crate::ensure_eq!(encoder.tick(), StreamBeat::idle());
        crate::ensure_eq!(encoder.stats().busy_rejects, 1);
        crate::ensure_eq!(encoder.stats().frames_sent, 1);
        Ok(())
    }

    #[test]
    fn payload_above_mtu_is_refused_before_transmission() -> Result<()> {
        let mut encoder: FrameEncoder = FrameEncoder::new(EncoderConfig::default().with_mtu(8)?);
        match encoder.start(sample(&[0; 9])?) {
            Ok(()) => anyhow::bail!("payload above mtu should be refused"),
            Err(e) => crate::ensure_eq!(e.errno, EMSGSIZE),
        }
        crate::ensure_eq!(encoder.is_busy(), false);
        crate::ensure_eq!(encoder.tick(), StreamBeat::idle());
        encoder.start(sample(&[0; 8])?)?;
        crate::ensure_eq!(encoder.is_busy(), true);
        Ok(())
    }

    #[test]
    fn padding_stretches_short_frames() -> Result<()> {
        let config: EncoderConfig = EncoderConfig::default().with_padding(true);
        let bytes: Vec<u8> = encode(config, sample(&[0x42])?)?;
        crate::ensure_eq!(bytes.len(), 8 + 64);
        crate::ensure_eq!(bytes[22], 0x42);
        crate::ensure_eq!(bytes[23], 0x00);
        Ok(())
    }

    /// Padding must not push the payload past the MTU.
    #[test]
    fn padding_respects_mtu() -> Result<()> {
        let config: EncoderConfig = EncoderConfig::default().with_mtu(20)?.with_padding(true);
        match encode(config.clone(), sample(&[0x42; 10])?) {
            Ok(bytes) => anyhow::bail!("padded payload above mtu should be refused (len={})", bytes.len()),
            Err(e) => crate::ensure_eq!(e.errno, EMSGSIZE),
        }

        let mut encoder: FrameEncoder = FrameEncoder::new(config);
        crate::ensure_eq!(encoder.start(sample(&[0x42; 10])?).is_err(), true);
        crate::ensure_eq!(encoder.is_busy(), false);
        crate::ensure_eq!(encoder.tick(), StreamBeat::idle());

        // An MTU that fits the minimum payload keeps padding usable.
        let config: EncoderConfig = EncoderConfig::default().with_mtu(46)?.with_padding(true);
        let bytes: Vec<u8> = encode(config, sample(&[0x42; 10])?)?;
        crate::ensure_eq!(bytes.len(), 8 + 64);
        Ok(())
    }

    #[test]
    fn back_to_back_frames_reset_crc() -> Result<()> {
        let mut encoder: FrameEncoder = FrameEncoder::new(EncoderConfig::default());
        let first: Frame = sample(&[0x01; 5])?;
        let second: Frame = sample(&[0x02; 7])?;
        encoder.start(first.clone())?;
        let a: Vec<u8> = drain(&mut encoder, 1000).into_iter().filter_map(|b: StreamBeat| b.byte()).collect();
        encoder.start(second.clone())?;
        let b: Vec<u8> = drain(&mut encoder, 1000).into_iter().filter_map(|b: StreamBeat| b.byte()).collect();
        crate::ensure_eq!(&a[8..], &first.to_bytes()[..]);
        crate::ensure_eq!(&b[8..], &second.to_bytes()[..]);
        crate::ensure_eq!(encoder.stats().frames_sent, 2);
        Ok(())
    }
}
