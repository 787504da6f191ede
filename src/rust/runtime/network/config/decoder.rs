// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    ethstream::config::Config,
    runtime::{
        fail::Fail,
        network::consts::DEFAULT_MTU,
    },
};
use ::libc::{
    EINVAL,
    ERANGE,
};
use ::std::str::FromStr;

//======================================================================================================================
// Structures
//======================================================================================================================

/// How the receiver finds the end of the payload in the incoming byte stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delimiting {
    /// The frame ends with the first invalid beat; the four bytes before it are the FCS.
    EndOfStream,
    /// EtherType values up to 1500 are read as the payload length (IEEE 802.3). Type-coded frames fall back to
    /// [Delimiting::EndOfStream].
    LengthField,
    /// Every frame carries exactly this many payload bytes.
    Fixed(usize),
}

/// Frame Decoder Configuration Descriptor
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Largest payload accepted on reception.
    mtu: usize,
    /// Wire contract used to delimit payloads.
    delimiting: Delimiting,
    /// Does the stream still carry preamble and SFD?
    strip_preamble: bool,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

/// Associate functions for Frame Decoder Configuration Descriptor
impl DecoderConfig {
    /// Creates a Frame Decoder Configuration Descriptor.
    pub fn new(config: &Config) -> Result<Self, Fail> {
        let mtu: usize = super::check_mtu(config.mtu()?)?;
        let delimiting: Delimiting = config.rx_delimiting()?;
        Self::check_delimiting(delimiting, mtu)?;
        Ok(Self {
            mtu,
            delimiting,
            strip_preamble: config.rx_strip_preamble()?,
        })
    }

    /// Overrides the MTU of the target [DecoderConfig].
    pub fn with_mtu(self, mtu: usize) -> Result<Self, Fail> {
        let mtu: usize = super::check_mtu(mtu)?;
        Self::check_delimiting(self.delimiting, mtu)?;
        Ok(Self { mtu, ..self })
    }

    /// Overrides the delimiting mode of the target [DecoderConfig].
    pub fn with_delimiting(self, delimiting: Delimiting) -> Result<Self, Fail> {
        Self::check_delimiting(delimiting, self.mtu)?;
        Ok(Self { delimiting, ..self })
    }

    /// Enables or disables preamble stripping in the target [DecoderConfig].
    pub fn with_strip_preamble(self, strip_preamble: bool) -> Self {
        Self { strip_preamble, ..self }
    }

    /// Gets the MTU in the target [DecoderConfig].
    pub fn get_mtu(&self) -> usize {
        self.mtu
    }

    /// Gets the delimiting mode in the target [DecoderConfig].
    pub fn get_delimiting(&self) -> Delimiting {
        self.delimiting
    }

    /// Gets the preamble stripping option in the target [DecoderConfig].
    pub fn get_strip_preamble(&self) -> bool {
        self.strip_preamble
    }

    fn check_delimiting(delimiting: Delimiting, mtu: usize) -> Result<(), Fail> {
        match delimiting {
            Delimiting::Fixed(len) if len > mtu => {
                let cause: String = format!("fixed payload length exceeds mtu (len={}, mtu={})", len, mtu);
                error!("check_delimiting(): {}", cause);
                Err(Fail::new(ERANGE, &cause))
            },
            _ => Ok(()),
        }
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

/// Default Trait Implementation for Frame Decoder Configuration Descriptor
impl Default for DecoderConfig {
    /// Creates a Frame Decoder Configuration Descriptor with the default values.
    fn default() -> Self {
        DecoderConfig {
            mtu: DEFAULT_MTU,
            delimiting: Delimiting::EndOfStream,
            strip_preamble: false,
        }
    }
}

/// Parses the mode names used in configuration files. [Delimiting::Fixed] carries its length separately, so it
/// parses with a zero length.
impl FromStr for Delimiting {
    type Err = Fail;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "end_of_stream" => Ok(Delimiting::EndOfStream),
            "length_field" => Ok(Delimiting::LengthField),
            "fixed" => Ok(Delimiting::Fixed(0)),
            _ => {
                let cause: String = format!("unknown delimiting mode (mode={:?})", s);
                Err(Fail::new(EINVAL, &cause))
            },
        }
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
