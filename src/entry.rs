use crate::error::{Error, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

//===========================================================================//

/// One picture stored in (or destined for) an ICO container: its pixel
/// dimensions plus the encoded PNG bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Entry {
    width: u32,
    height: u32,
    payload: Vec<u8>,
}

impl Entry {
    /// Creates a new entry.  The dimensions are not checked here; the writer
    /// validates them against the directory's single-byte fields.
    pub fn new(width: u32, height: u32, payload: Vec<u8>) -> Entry {
        Entry { width, height, payload }
    }

    /// Returns the width of the picture, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the picture, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the raw, encoded picture data.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consumes the entry, returning its encoded picture data.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

//===========================================================================//

/// What the writer does with a width or height that can't be stored in a
/// single directory byte.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum DimensionPolicy {
    /// Fail with `WidthOverflow`/`HeightOverflow` for anything outside
    /// `1..=255`.
    #[default]
    Reject,
    /// Keep only the low byte, so 256 is stored as 0 and 300 as 44.  This
    /// matches files written by older tools.
    Wrap,
}

impl DimensionPolicy {
    /// Converts a dimension to its directory byte, or `None` if this policy
    /// rejects it.
    pub(crate) fn to_byte(self, value: u32) -> Option<u8> {
        match self {
            DimensionPolicy::Reject => match u8::try_from(value) {
                Ok(0) | Err(_) => None,
                Ok(byte) => Some(byte),
            },
            DimensionPolicy::Wrap => Some(value as u8),
        }
    }

    /// Converts the size of entry `index` to its directory bytes, failing
    /// with `WidthOverflow` or `HeightOverflow` if this policy rejects it.
    pub fn size_bytes(
        self,
        index: usize,
        width: u32,
        height: u32,
    ) -> Result<(u8, u8)> {
        let width_byte = match self.to_byte(width) {
            Some(byte) => byte,
            None => return Err(Error::WidthOverflow { index, width }),
        };
        let height_byte = match self.to_byte(height) {
            Some(byte) => byte,
            None => return Err(Error::HeightOverflow { index, height }),
        };
        Ok((width_byte, height_byte))
    }
}

//===========================================================================//


//===========================================================================//
