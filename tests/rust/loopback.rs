// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

#![cfg_attr(feature = "strict", deny(warnings))]
#![deny(clippy::all)]

//======================================================================================================================
// Imports
//======================================================================================================================

use ::anyhow::Result;
use ::ethstream::{
    protocols::{
        ethernet2::{
            encode,
            MAX_PAYLOAD_SIZE,
        },
        layer1::StreamBeat,
    },
    runtime::network::config::{
        DecoderConfig,
        EncoderConfig,
    },
    Frame,
    FrameDecoder,
    FrameEncoder,
    MacAddress,
    RxError,
    RxEvent,
    SfdAligner,
};
use ::rand::{
    rngs::SmallRng,
    Rng,
    SeedableRng,
};

//======================================================================================================================
// Constants
//======================================================================================================================

const ALICE_MAC: MacAddress = MacAddress::new([0x12, 0x23, 0x45, 0x67, 0x89, 0xab]);
const BOB_MAC: MacAddress = MacAddress::new([0xab, 0x89, 0x67, 0x45, 0x23, 0x12]);

/// Bytes ahead of the destination address: preamble and SFD.
const LEADER_SIZE: usize = 8;

//======================================================================================================================
// Helpers
//======================================================================================================================

fn random_frame(rng: &mut SmallRng, len: usize) -> Result<Frame> {
    let payload: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
    let ether_type: u16 = rng.gen_range(0x0600..=0xffff);
    Ok(Frame::new(ALICE_MAC, BOB_MAC, ether_type, &payload)?)
}

/// Clocks an encoder into a decoder, through an aligner, one beat per cycle, until the encoder goes idle again.
/// Returns the events reported by the decoder.
fn clock(encoder: &mut FrameEncoder, aligner: &mut SfdAligner, decoder: &mut FrameDecoder) -> Vec<RxEvent> {
    let mut events: Vec<RxEvent> = Vec::new();
    loop {
        let busy: bool = encoder.is_busy();
        let event: RxEvent = decoder.tick(aligner.tick(encoder.tick()));
        if event != RxEvent::Pending {
            events.push(event);
        }
        if !busy {
            break;
        }
    }
    events
}

//======================================================================================================================
// Tests
//======================================================================================================================

/// Every payload length goes through the encoder and back out of the decoder unchanged.
#[test]
fn loopback_all_payload_lengths() -> Result<()> {
    ethstream::runtime::logging::initialize();
    let mut rng: SmallRng = SmallRng::seed_from_u64(42);
    let mut encoder: FrameEncoder = FrameEncoder::new(EncoderConfig::default());
    let mut aligner: SfdAligner = SfdAligner::new();
    let mut decoder: FrameDecoder = FrameDecoder::new(DecoderConfig::default());

    for len in 0..=MAX_PAYLOAD_SIZE {
        let frame: Frame = random_frame(&mut rng, len)?;
        encoder.start(frame.clone())?;
        let events: Vec<RxEvent> = clock(&mut encoder, &mut aligner, &mut decoder);
        ethstream::ensure_eq!(events, vec![RxEvent::Received]);
        ethstream::ensure_eq!(decoder.take_frame(), Some(frame));
    }

    ethstream::ensure_eq!(encoder.stats().frames_sent, MAX_PAYLOAD_SIZE as u64 + 1);
    ethstream::ensure_eq!(decoder.stats().frames_received, MAX_PAYLOAD_SIZE as u64 + 1);
    ethstream::ensure_eq!(decoder.stats().crc_errors, 0);
    ethstream::ensure_eq!(aligner.missing_sfd(), 0);
    Ok(())
}

/// A single flipped bit anywhere past the SFD is caught.
#[test]
fn corrupted_frames_are_rejected() -> Result<()> {
    ethstream::runtime::logging::initialize();
    let mut rng: SmallRng = SmallRng::seed_from_u64(7);
    let frame: Frame = random_frame(&mut rng, 64)?;
    let bytes: Vec<u8> = encode(EncoderConfig::default(), frame.clone())?;
    let mut decoder: FrameDecoder = FrameDecoder::new(DecoderConfig::default().with_strip_preamble(true));

    for offset in LEADER_SIZE..bytes.len() {
        for bit in 0..8 {
            let mut corrupted: Vec<u8> = bytes.clone();
            corrupted[offset] ^= 1 << bit;
            let mut rejected: bool = false;
            for beat in corrupted.iter().map(|b: &u8| StreamBeat::data(*b)).chain([StreamBeat::idle()]) {
                match decoder.tick(beat) {
                    RxEvent::Rejected(RxError::CrcMismatch { .. }) => rejected = true,
                    RxEvent::Pending => (),
                    event => anyhow::bail!("unexpected event {:?} (offset={}, bit={})", event, offset, bit),
                }
            }
            ethstream::ensure_eq!(rejected, true);
            ethstream::ensure_eq!(decoder.error_flag(), true);
        }
    }

    // A clean copy goes through right after.
    for beat in bytes.iter().map(|b: &u8| StreamBeat::data(*b)).chain([StreamBeat::idle()]) {
        decoder.tick(beat);
    }
    ethstream::ensure_eq!(decoder.error_flag(), false);
    ethstream::ensure_eq!(decoder.frame(), Some(&frame));
    Ok(())
}

/// Whatever precedes the SFD, the decoded frame is the same.
#[test]
fn preamble_contents_do_not_change_the_frame() -> Result<()> {
    ethstream::runtime::logging::initialize();
    let mut rng: SmallRng = SmallRng::seed_from_u64(0x55);
    let frame: Frame = random_frame(&mut rng, 46)?;
    let mut decoder: FrameDecoder = FrameDecoder::new(DecoderConfig::default().with_strip_preamble(true));

    let mut leaders: Vec<Vec<u8>> = vec![vec![0x55; 7], vec![0x00, 0xff, 0x12], vec![]];
    for _ in 0..16 {
        let len: usize = rng.gen_range(0..=16);
        leaders.push((0..len).map(|_| rng.gen_range(0x00..0xd5)).collect());
    }

    for leader in leaders {
        let bytes: Vec<u8> = [leader.clone(), vec![0xd5], frame.to_bytes()].concat();
        let events: Vec<RxEvent> = bytes
            .iter()
            .map(|b: &u8| StreamBeat::data(*b))
            .chain([StreamBeat::idle()])
            .map(|beat: StreamBeat| decoder.tick(beat))
            .filter(|event: &RxEvent| *event != RxEvent::Pending)
            .collect();
        ethstream::ensure_eq!(events, vec![RxEvent::Received]);
        ethstream::ensure_eq!(decoder.take_frame(), Some(frame.clone()));
    }
    ethstream::ensure_eq!(decoder.stats().frames_received, 19);
    Ok(())
}

/// Start requests issued mid-frame do not disturb the frame on the wire.
#[test]
fn busy_encoder_refuses_new_frames() -> Result<()> {
    ethstream::runtime::logging::initialize();
    let mut rng: SmallRng = SmallRng::seed_from_u64(1);
    let first: Frame = random_frame(&mut rng, 100)?;
    let intruder: Frame = random_frame(&mut rng, 10)?;

    let mut encoder: FrameEncoder = FrameEncoder::new(EncoderConfig::default());
    let mut aligner: SfdAligner = SfdAligner::new();
    let mut decoder: FrameDecoder = FrameDecoder::new(DecoderConfig::default());
    encoder.start(first.clone())?;

    let mut received: Vec<Frame> = Vec::new();
    let mut refused: usize = 0;
    while encoder.is_busy() {
        if encoder.start(intruder.clone()).is_err() {
            refused += 1;
        }
        if decoder.tick(aligner.tick(encoder.tick())) == RxEvent::Received {
            received.extend(decoder.take_frame());
        }
    }
    if decoder.tick(aligner.tick(encoder.tick())) == RxEvent::Received {
        received.extend(decoder.take_frame());
    }

    ethstream::ensure_eq!(received, vec![first.clone()]);
    ethstream::ensure_eq!(refused, LEADER_SIZE + first.wire_len());
    ethstream::ensure_eq!(encoder.stats().busy_rejects, refused as u64);
    Ok(())
}

/// Padded frames survive the round trip with their padding.
#[test]
fn padded_loopback() -> Result<()> {
    let mut encoder: FrameEncoder = FrameEncoder::new(EncoderConfig::default().with_padding(true));
    let mut aligner: SfdAligner = SfdAligner::new();
    let mut decoder: FrameDecoder = FrameDecoder::new(DecoderConfig::default());

    let frame: Frame = Frame::new(ALICE_MAC, MacAddress::broadcast(), 0x0806, &[0x01; 28])?;
    encoder.start(frame)?;
    ethstream::ensure_eq!(
        clock(&mut encoder, &mut aligner, &mut decoder),
        vec![RxEvent::Received]
    );
    ethstream::ensure_eq!(decoder.payload().len(), 46);
    ethstream::ensure_eq!(decoder.position(), 64);
    Ok(())
}
