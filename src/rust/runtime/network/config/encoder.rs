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

//======================================================================================================================
// Structures
//======================================================================================================================

/// Frame Encoder Configuration Descriptor
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Largest payload accepted for transmission.
    mtu: usize,
    /// Zero-pad payloads of short frames up to the Ethernet minimum?
    pad_short_frames: bool,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

/// Associate functions for Frame Encoder Configuration Descriptor
impl EncoderConfig {
    /// Creates a Frame Encoder Configuration Descriptor.
    pub fn new(config: &Config) -> Result<Self, Fail> {
        Ok(Self {
            mtu: super::check_mtu(config.mtu()?)?,
            pad_short_frames: config.tx_pad_short_frames()?,
        })
    }

    /// Overrides the MTU of the target [EncoderConfig].
    pub fn with_mtu(self, mtu: usize) -> Result<Self, Fail> {
        Ok(Self {
            mtu: super::check_mtu(mtu)?,
            ..self
        })
    }

    /// Enables or disables padding of short frames in the target [EncoderConfig].
    pub fn with_padding(self, pad_short_frames: bool) -> Self {
        Self {
            pad_short_frames,
            ..self
        }
    }

    /// Gets the MTU in the target [EncoderConfig].
    pub fn get_mtu(&self) -> usize {
        self.mtu
    }

    /// Gets the padding option in the target [EncoderConfig].
    pub fn get_pad_short_frames(&self) -> bool {
        self.pad_short_frames
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

/// Default Trait Implementation for Frame Encoder Configuration Descriptor
impl Default for EncoderConfig {
    /// Creates a Frame Encoder Configuration Descriptor with the default values.
    fn default() -> Self {
        EncoderConfig {
            mtu: DEFAULT_MTU,
            pad_short_frames: false,
        }
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
