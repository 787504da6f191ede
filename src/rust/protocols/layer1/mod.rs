// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod beat;

//======================================================================================================================
// Exports
//======================================================================================================================

pub use self::beat::{
    beats_from_bytes,
    collect_valid,
    drain,
    StreamBeat,
};

//======================================================================================================================
// Traits
//======================================================================================================================

/// API for anything that drives a byte-synchronous stream, one [StreamBeat] per tick.
pub trait BeatSource {
    /// Advances one cycle and returns the beat presented on that cycle.
    fn tick(&mut self) -> StreamBeat;

    /// Returns true when the target [BeatSource] has nothing left to send.
    fn is_idle(&self) -> bool;
}
