// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

#![cfg_attr(feature = "strict", deny(warnings))]
#![deny(clippy::all)]

//======================================================================================================================
// Imports
//======================================================================================================================

use ::anyhow::Result;
use ::ethstream::{
    protocols::layer1::beats_from_bytes,
    runtime::network::config::{
        DecoderConfig,
        Delimiting,
        EncoderConfig,
    },
    Config,
    Frame,
    FrameDecoder,
    MacAddress,
    RxEvent,
};
use ::std::path::PathBuf;

//======================================================================================================================
// Helpers
//======================================================================================================================

fn config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/rust/data/codec.yaml")
}

//======================================================================================================================
// Tests
//======================================================================================================================

#[test]
fn load_codec_config() -> Result<()> {
    ethstream::runtime::logging::initialize();
    let config: Config = Config::new(config_path())?;

    let encoder: EncoderConfig = EncoderConfig::new(&config)?;
    ethstream::ensure_eq!(encoder.get_mtu(), 1500);
    ethstream::ensure_eq!(encoder.get_pad_short_frames(), true);

    let decoder: DecoderConfig = DecoderConfig::new(&config)?;
    ethstream::ensure_eq!(decoder.get_mtu(), 1500);
    ethstream::ensure_eq!(decoder.get_delimiting(), Delimiting::EndOfStream);
    ethstream::ensure_eq!(decoder.get_strip_preamble(), true);
    Ok(())
}

#[test]
fn missing_config_file() -> Result<()> {
    match Config::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/rust/data/missing.yaml")) {
        Ok(_) => anyhow::bail!("loading a missing file should fail"),
        Err(e) => ethstream::ensure_eq!(e.errno, libc::ENOENT),
    }
    Ok(())
}

/// Padding is part of the payload as far as the receiver is concerned.
#[test]
fn configured_codec_keeps_padding() -> Result<()> {
    ethstream::runtime::logging::initialize();
    let config: Config = Config::new(config_path())?;
    let frame: Frame = Frame::new(
        MacAddress::broadcast(),
        MacAddress::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]),
        0x0806,
        &[0x0a, 0x0b, 0x0c],
    )?;

    let bytes: Vec<u8> = ethstream::protocols::ethernet2::encode(EncoderConfig::new(&config)?, frame.clone())?;
    ethstream::ensure_eq!(bytes.len(), 8 + 64);

    let mut decoder: FrameDecoder = FrameDecoder::new(DecoderConfig::new(&config)?);
    let events: Vec<RxEvent> = beats_from_bytes(&bytes)
        .map(|beat| decoder.tick(beat))
        .filter(|event: &RxEvent| *event != RxEvent::Pending)
        .collect();
    ethstream::ensure_eq!(events, vec![RxEvent::Received]);
    ethstream::ensure_eq!(decoder.payload().len(), 46);
    ethstream::ensure_eq!(&decoder.payload()[..3], frame.payload());
    ethstream::ensure_eq!(decoder.payload()[3..].iter().all(|b: &u8| *b == 0), true);
    Ok(())
}

/// Length-coded frames are delimited by their EtherType.
#[test]
fn length_field_config_from_string() -> Result<()> {
    let config: Config = "ethstream:\n  mtu: 64\n  rx_delimiting: length_field\n".parse()?;
    let decoder: DecoderConfig = DecoderConfig::new(&config)?;
    ethstream::ensure_eq!(decoder.get_mtu(), 64);
    ethstream::ensure_eq!(decoder.get_delimiting(), Delimiting::LengthField);

    let frame: Frame = Frame::new(MacAddress::broadcast(), MacAddress::nil(), 2, &[0x01, 0x02])?;
    let mut decoder: FrameDecoder = FrameDecoder::new(decoder);
    let mut received: usize = 0;
    for beat in beats_from_bytes(&frame.to_bytes()) {
        if decoder.tick(beat) == RxEvent::Received {
            received += 1;
        }
    }
    ethstream::ensure_eq!(received, 1);
    ethstream::ensure_eq!(decoder.take_frame(), Some(frame));
    Ok(())
}
