// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    protocols::layer1::StreamBeat,
    runtime::network::consts::SFD_BYTE,
};

//======================================================================================================================
// Structures
//======================================================================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AlignerState {
    /// Discarding preamble, looking for the SFD.
    Hunt,
    /// SFD seen: frame bytes pass through.
    Pass,
}

/// Strips preamble and SFD off a byte stream so that the first byte passed downstream is the first destination
/// address byte. Every byte ahead of the first SFD of a burst is dropped, whatever its value.
pub struct SfdAligner {
    state: AlignerState,
    /// Bytes dropped in the current burst.
    discarded: usize,
    /// Bursts that ended before an SFD showed up.
    missing_sfd: u64,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl SfdAligner {
    pub fn new() -> Self {
        Self {
            state: AlignerState::Hunt,
            discarded: 0,
            missing_sfd: 0,
        }
    }

    /// Consumes one beat from the line and returns the beat to present downstream on the same cycle.
    pub fn tick(&mut self, beat: StreamBeat) -> StreamBeat {
        match (self.state, beat.byte()) {
            (state, None) => {
                if state == AlignerState::Hunt && self.discarded > 0 {
                    self.missing_sfd += 1;
                    warn!("tick(): burst ended without SFD (discarded={})", self.discarded);
                }
                self.state = AlignerState::Hunt;
                self.discarded = 0;
                StreamBeat::idle()
            },
            (AlignerState::Hunt, Some(SFD_BYTE)) => {
                trace!("tick(): SFD found (discarded={})", self.discarded);
                self.state = AlignerState::Pass;
                StreamBeat::idle()
            },
            (AlignerState::Hunt, Some(_)) => {
                self.discarded += 1;
                StreamBeat::idle()
            },
            (AlignerState::Pass, Some(_)) => beat,
        }
    }

    /// Returns true once the SFD of the current burst has been seen.
    pub fn is_aligned(&self) -> bool {
        self.state == AlignerState::Pass
    }

    pub fn missing_sfd(&self) -> u64 {
        self.missing_sfd
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl Default for SfdAligner {
    fn default() -> Self {
        Self::new()
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
