// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

#![cfg_attr(feature = "strict", deny(warnings))]
#![deny(clippy::all)]

//======================================================================================================================
// Imports
//======================================================================================================================

use ::anyhow::Result;
use ::clap::{
    Arg,
    ArgAction,
    ArgMatches,
    Command,
};
use ::ethstream::{
    protocols::{
        ethernet2::encode,
        layer1::beats_from_bytes,
    },
    runtime::network::config::{
        DecoderConfig,
        EncoderConfig,
    },
    Frame,
    FrameDecoder,
    MacAddress,
    RxEvent,
};
use ::std::str::FromStr;

//======================================================================================================================
// Program Arguments
//======================================================================================================================

/// Program Arguments
#[derive(Debug)]
struct ProgramArguments {
    /// Destination MAC address.
    dst: MacAddress,
    /// Source MAC address.
    src: MacAddress,
    /// EtherType (or payload length) field.
    ether_type: u16,
    /// Payload bytes.
    payload: Vec<u8>,
    /// Zero-pad short frames before transmission?
    pad: bool,
    /// Wire offset of a bit to flip before decoding.
    corrupt: Option<usize>,
}

/// Associate functions for Program Arguments
impl ProgramArguments {
    /// Default destination address.
    const DEFAULT_DST: &'static str = "ff:ff:ff:ff:ff:ff";
    /// Default source address.
    const DEFAULT_SRC: &'static str = "02:00:00:00:00:01";
    /// Default EtherType (IPv4).
    const DEFAULT_ETHER_TYPE: u16 = 0x0800;

    /// Parses the program arguments from the command line interface.
    pub fn new(app_name: &'static str, app_author: &'static str, app_about: &'static str) -> Result<Self> {
        let matches: ArgMatches = Command::new(app_name)
            .author(app_author)
            .about(app_about)
            .arg(
                Arg::new("dst")
                    .long("dst")
                    .value_parser(clap::value_parser!(String))
                    .required(false)
                    .value_name("XX:XX:XX:XX:XX:XX")
                    .help("Sets destination MAC address"),
            )
            .arg(
                Arg::new("src")
                    .long("src")
                    .value_parser(clap::value_parser!(String))
                    .required(false)
                    .value_name("XX:XX:XX:XX:XX:XX")
                    .help("Sets source MAC address"),
            )
            .arg(
                Arg::new("ether-type")
                    .long("ether-type")
                    .value_parser(clap::value_parser!(String))
                    .required(false)
                    .value_name("0xHHHH")
                    .help("Sets EtherType field"),
            )
            .arg(
                Arg::new("payload")
                    .long("payload")
                    .value_parser(clap::value_parser!(String))
                    .required(false)
                    .value_name("TEXT")
                    .help("Sets payload"),
            )
            .arg(
                Arg::new("pad")
                    .long("pad")
                    .action(ArgAction::SetTrue)
                    .help("Pads short frames to the minimum frame size"),
            )
            .arg(
                Arg::new("corrupt")
                    .long("corrupt")
                    .value_parser(clap::value_parser!(usize))
                    .required(false)
                    .value_name("OFFSET")
                    .help("Flips the lowest bit of the wire byte at OFFSET"),
            )
            .get_matches();

        // Default arguments.
        let mut args: ProgramArguments = ProgramArguments {
            dst: MacAddress::from_str(Self::DEFAULT_DST)?,
            src: MacAddress::from_str(Self::DEFAULT_SRC)?,
            ether_type: Self::DEFAULT_ETHER_TYPE,
            payload: b"hello".to_vec(),
            pad: matches.get_flag("pad"),
            corrupt: matches.get_one::<usize>("corrupt").copied(),
        };

        if let Some(addr) = matches.get_one::<String>("dst") {
            args.dst = MacAddress::from_str(addr)?;
        }
        if let Some(addr) = matches.get_one::<String>("src") {
            args.src = MacAddress::from_str(addr)?;
        }
        if let Some(ether_type) = matches.get_one::<String>("ether-type") {
            args.set_ether_type(ether_type)?;
        }
        if let Some(payload) = matches.get_one::<String>("payload") {
            args.payload = payload.as_bytes().to_vec();
        }

        Ok(args)
    }

    /// Sets the EtherType, given either in hexadecimal with a `0x` prefix or in decimal.
    fn set_ether_type(&mut self, ether_type: &str) -> Result<()> {
        self.ether_type = match ether_type.strip_prefix("0x") {
            Some(hex) => u16::from_str_radix(hex, 16)?,
            None => ether_type.parse()?,
        };
        Ok(())
    }
}

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Prints `bytes` in rows of 16.
fn dump(bytes: &[u8]) {
    for (i, row) in bytes.chunks(16).enumerate() {
        let hex: Vec<String> = row.iter().map(|b: &u8| format!("{:02x}", b)).collect();
        println!("{:04x}  {}", i * 16, hex.join(" "));
    }
}

/// Drives the application.
fn main() -> Result<()> {
    ethstream::runtime::logging::initialize();
    let args: ProgramArguments = ProgramArguments::new(
        "frame-loopback",
        "Microsoft Corporation",
        "Encodes an Ethernet II frame and decodes it back.",
    )?;

    let frame: Frame = Frame::new(args.dst, args.src, args.ether_type, &args.payload)?;
    println!("Frame: {:?}", frame);

    let mut bytes: Vec<u8> = encode(EncoderConfig::default().with_padding(args.pad), frame)?;
    if let Some(offset) = args.corrupt {
        match bytes.get_mut(offset) {
            Some(byte) => *byte ^= 0x01,
            None => anyhow::bail!("corrupt offset out of range (offset={}, len={})", offset, bytes.len()),
        }
    }
    println!("Wire ({} bytes):", bytes.len());
    dump(&bytes);

    let mut decoder: FrameDecoder = FrameDecoder::new(DecoderConfig::default().with_strip_preamble(true));
    for beat in beats_from_bytes(&bytes) {
        match decoder.tick(beat) {
            RxEvent::Pending => (),
            RxEvent::Received => match decoder.frame() {
                Some(frame) => println!("Received: {:?}", frame),
                None => anyhow::bail!("frame reported but not available"),
            },
            RxEvent::Rejected(e) => println!("Rejected: {}", e),
        }
    }

    Ok(())
}
