// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use super::frame::{
    Frame,
    MIN_PAYLOAD_SIZE,
};

//======================================================================================================================
// Standalone Functions
//======================================================================================================================

/// Returns `frame` with its payload zero-extended to the 46-byte minimum, so that the frame spans 64 bytes from the
/// destination address to the FCS. Frames that are long enough are returned unchanged.
///
/// The receiver cannot tell padding from data: upper layers must carry their own length.
pub fn pad_to_minimum(frame: &Frame) -> Frame {
    let mut padded: Frame = frame.clone();
    if padded.payload().len() < MIN_PAYLOAD_SIZE {
        trace!("pad_to_minimum(): padding payload (len={})", padded.payload().len());
        padded.zero_extend(MIN_PAYLOAD_SIZE);
    }
    padded
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::runtime::network::{
        consts::MIN_FRAME_SIZE,
        types::MacAddress,
    };
    use ::anyhow::Result;

    #[test]
    fn short_frame_reaches_minimum_size() -> Result<()> {
        let frame: Frame = Frame::new(MacAddress::broadcast(), MacAddress::nil(), 0x0806, &[0x01, 0x02])?;
        let padded: Frame = pad_to_minimum(&frame);
        crate::ensure_eq!(padded.wire_len(), MIN_FRAME_SIZE);
        crate::ensure_eq!(&padded.payload()[..2], &[0x01u8, 0x02]);
        crate::ensure_eq!(padded.payload()[2..].iter().all(|b: &u8| *b == 0), true);
        Ok(())
    }

    #[test]
    fn long_frame_is_untouched() -> Result<()> {
        let payload: Vec<u8> = (0..100u8).collect();
        let frame: Frame = Frame::new(MacAddress::broadcast(), MacAddress::nil(), 0x0800, &payload)?;
        crate::ensure_eq!(pad_to_minimum(&frame), frame);
        Ok(())
    }
}
