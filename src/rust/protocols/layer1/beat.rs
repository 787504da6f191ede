// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use super::BeatSource;
use ::std::fmt;

//======================================================================================================================
// Structures
//======================================================================================================================

/// One cycle of the stream: a byte, qualified by a validity flag. There is no backpressure: a sink must take every
/// valid beat on the cycle it is presented.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamBeat {
    /// Byte on the data lines. Meaningless when `valid` is low.
    pub data: u8,
    /// Validity flag.
    pub valid: bool,
}

//======================================================================================================================
// Associate Functions
//======================================================================================================================

impl StreamBeat {
    /// A cycle with nothing on the lines.
    pub const fn idle() -> Self {
        Self { data: 0, valid: false }
    }

    /// A cycle carrying `data`.
    pub const fn data(data: u8) -> Self {
        Self { data, valid: true }
    }

    /// Returns the byte of the target [StreamBeat] if it is valid.
    pub fn byte(&self) -> Option<u8> {
        if self.valid {
            Some(self.data)
        } else {
            None
        }
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl fmt::Debug for StreamBeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.byte() {
            Some(data) => write!(f, "StreamBeat({:02x})", data),
            None => write!(f, "StreamBeat(-)"),
        }
    }
}

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Presents `bytes` as one burst of valid beats, closed by a single idle beat.
pub fn beats_from_bytes(bytes: &[u8]) -> impl Iterator<Item = StreamBeat> + '_ {
    bytes
        .iter()
        .map(|b: &u8| StreamBeat::data(*b))
        .chain(::std::iter::once(StreamBeat::idle()))
}

/// Returns the bytes carried by the valid beats of `beats`, in order.
pub fn collect_valid<I: IntoIterator<Item = StreamBeat>>(beats: I) -> Vec<u8> {
    beats.into_iter().filter_map(|beat: StreamBeat| beat.byte()).collect()
}

/// Ticks `source` until it goes idle, returning every beat produced on the way. At most `max_ticks` cycles are run.
pub fn drain<S: BeatSource>(source: &mut S, max_ticks: usize) -> Vec<StreamBeat> {
    let mut beats: Vec<StreamBeat> = Vec::new();
    while !source.is_idle() && beats.len() < max_ticks {
        beats.push(source.tick());
    }
    beats
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
