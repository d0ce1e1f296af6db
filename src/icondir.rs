use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};

//===========================================================================//

/// The size of the ICONDIR header, in bytes.
pub const HEADER_LEN: usize = 6;
/// The size of one ICONDIRENTRY record, in bytes.
pub const DIR_ENTRY_LEN: usize = 16;
/// The resource type number for icon (as opposed to cursor) files.
pub const ICON_RESOURCE_TYPE: u16 = 1;
/// The color plane count written into every directory record.
pub const COLOR_PLANES: u16 = 1;
/// The bits-per-pixel written into every directory record.  Payloads are
/// always described as true color with alpha, whatever they really hold.
pub const BITS_PER_PIXEL: u16 = 32;

//===========================================================================//

/// The fixed header at the start of every container.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Header {
    /// Must be 0.
    pub reserved: u16,
    /// Must be [`ICON_RESOURCE_TYPE`].
    pub resource_type: u16,
    /// Number of directory records that follow.
    pub count: u16,
}

impl Header {
    /// Returns the header for an icon container with `count` entries.
    pub fn for_icons(count: u16) -> Header {
        Header { reserved: 0, resource_type: ICON_RESOURCE_TYPE, count }
    }

    /// Returns the number of bytes taken by this header plus its directory.
    pub fn directory_end(&self) -> u64 {
        (HEADER_LEN + DIR_ENTRY_LEN * self.count as usize) as u64
    }

    fn read_from<R: Read>(mut reader: R) -> io::Result<Header> {
        let reserved = reader.read_u16::<LittleEndian>()?;
        let resource_type = reader.read_u16::<LittleEndian>()?;
        let count = reader.read_u16::<LittleEndian>()?;
        Ok(Header { reserved, resource_type, count })
    }

    /// Returns the six header bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        LittleEndian::write_u16(&mut bytes[0..2], self.reserved);
        LittleEndian::write_u16(&mut bytes[2..4], self.resource_type);
        LittleEndian::write_u16(&mut bytes[4..6], self.count);
        bytes
    }

    /// Writes the six header bytes.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&self.to_bytes())
    }

    fn validate(&self) -> Result<()> {
        if self.reserved != 0 {
            format_error!(
                "Invalid reserved field value in ICONDIR \
                 (was {}, but must be 0)",
                self.reserved
            );
        }
        if self.resource_type != ICON_RESOURCE_TYPE {
            format_error!(
                "Invalid resource type (was {}, but must be {})",
                self.resource_type,
                ICON_RESOURCE_TYPE
            );
        }
        Ok(())
    }
}

//===========================================================================//

/// One raw directory record, exactly as stored in the file.  A width or
/// height byte of 0 is kept as 0.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct DirectoryEntry {
    /// Width in pixels, modulo 256.
    pub width: u8,
    /// Height in pixels, modulo 256.
    pub height: u8,
    /// Palette size; 0 for true-color images.
    pub color_count: u8,
    /// Should be 0.
    pub reserved: u8,
    /// Color planes.
    pub planes: u16,
    /// Bits per pixel.
    pub bit_count: u16,
    /// Exact payload length, in bytes.
    pub byte_size: u32,
    /// Absolute offset of the payload from the start of the file.
    pub offset: u32,
}

impl DirectoryEntry {
    /// Returns the offset one past the last byte of this entry's payload.
    pub fn end(&self) -> u64 {
        self.offset as u64 + self.byte_size as u64
    }

    fn read_from<R: Read>(mut reader: R) -> io::Result<DirectoryEntry> {
        Ok(DirectoryEntry {
            width: reader.read_u8()?,
            height: reader.read_u8()?,
            color_count: reader.read_u8()?,
            reserved: reader.read_u8()?,
            planes: reader.read_u16::<LittleEndian>()?,
            bit_count: reader.read_u16::<LittleEndian>()?,
            byte_size: reader.read_u32::<LittleEndian>()?,
            offset: reader.read_u32::<LittleEndian>()?,
        })
    }

    /// Returns the sixteen record bytes.
    pub fn to_bytes(&self) -> [u8; DIR_ENTRY_LEN] {
        let mut bytes = [0u8; DIR_ENTRY_LEN];
        bytes[0] = self.width;
        bytes[1] = self.height;
        bytes[2] = self.color_count;
        bytes[3] = self.reserved;
        LittleEndian::write_u16(&mut bytes[4..6], self.planes);
        LittleEndian::write_u16(&mut bytes[6..8], self.bit_count);
        LittleEndian::write_u32(&mut bytes[8..12], self.byte_size);
        LittleEndian::write_u32(&mut bytes[12..16], self.offset);
        bytes
    }

    /// Writes the sixteen record bytes.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&self.to_bytes())
    }
}

//===========================================================================//

/// Parses a header and its directory records from the start of `bytes`.
/// Any bytes past the directory are ignored.
pub fn decode_directory(
    bytes: &[u8],
) -> Result<(Header, Vec<DirectoryEntry>)> {
    if bytes.len() < HEADER_LEN {
        return Err(Error::Truncated {
            needed: HEADER_LEN as u64,
            available: bytes.len() as u64,
        });
    }
    let mut reader = bytes;
    let header = Header::read_from(&mut reader)?;
    header.validate()?;
    let needed = header.directory_end();
    if (bytes.len() as u64) < needed {
        return Err(Error::Truncated {
            needed,
            available: bytes.len() as u64,
        });
    }
    let mut entries = Vec::with_capacity(header.count as usize);
    for _ in 0..header.count {
        entries.push(DirectoryEntry::read_from(&mut reader)?);
    }
    Ok((header, entries))
}

/// Returns the indices of two entries whose payload ranges overlap, if any.
/// Empty payloads never overlap anything.
pub(crate) fn find_overlap(
    entries: &[DirectoryEntry],
) -> Option<(usize, usize)> {
    let mut order: Vec<usize> = (0..entries.len())
        .filter(|&index| entries[index].byte_size > 0)
        .collect();
    order.sort_by_key(|&index| entries[index].offset);
    let mut furthest: Option<usize> = None;
    for index in order {
        if let Some(previous) = furthest {
            if (entries[index].offset as u64) < entries[previous].end() {
                return Some((previous, index));
            }
            if entries[index].end() > entries[previous].end() {
                furthest = Some(index);
            }
        } else {
            furthest = Some(index);
        }
    }
    None
}

//===========================================================================//

/// What the encoder needs to know about one entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EntryLayout {
    /// Width byte to store.
    pub width: u8,
    /// Height byte to store.
    pub height: u8,
    /// Length of the payload, in bytes.
    pub byte_size: usize,
}

/// A header and directory computed by [`encode_directory`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncodedDirectory {
    header: Header,
    entries: Vec<DirectoryEntry>,
}

impl EncodedDirectory {
    /// Returns the header.
    pub fn header(&self) -> Header {
        self.header
    }

    /// Returns the directory records, in insertion order.
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Returns the payload offset of each record, in insertion order.
    pub fn offsets(&self) -> Vec<u32> {
        self.entries.iter().map(|entry| entry.offset).collect()
    }

    /// Returns the total file length once all payloads are appended.
    pub fn file_len(&self) -> u64 {
        self.entries
            .last()
            .map_or(self.header.directory_end(), DirectoryEntry::end)
    }

    /// Writes the header followed by every directory record.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        self.header.write_to(&mut writer)?;
        for entry in self.entries.iter() {
            entry.write_to(&mut writer)?;
        }
        Ok(())
    }

    /// Returns the header and directory as one byte buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes =
            Vec::with_capacity(self.header.directory_end() as usize);
        bytes.extend_from_slice(&self.header.to_bytes());
        for entry in self.entries.iter() {
            bytes.extend_from_slice(&entry.to_bytes());
        }
        bytes
    }
}

/// Computes the header and directory for payloads packed back to back, in
/// the given order, directly after the directory.
pub fn encode_directory(layouts: &[EntryLayout]) -> Result<EncodedDirectory> {
    let count = match u16::try_from(layouts.len()) {
        Ok(count) => count,
        Err(_) => return Err(Error::TooManyEntries { count: layouts.len() }),
    };
    let header = Header::for_icons(count);
    let mut data_offset = header.directory_end();
    let mut entries = Vec::with_capacity(layouts.len());
    for (index, layout) in layouts.iter().enumerate() {
        let too_large =
            || Error::PayloadTooLarge { index, size: layout.byte_size };
        let byte_size =
            u32::try_from(layout.byte_size).map_err(|_| too_large())?;
        let offset = u32::try_from(data_offset).map_err(|_| too_large())?;
        data_offset += byte_size as u64;
        if data_offset > u32::MAX as u64 + 1 {
            return Err(too_large());
        }
        entries.push(DirectoryEntry {
            width: layout.width,
            height: layout.height,
            color_count: 0,
            reserved: 0,
            planes: COLOR_PLANES,
            bit_count: BITS_PER_PIXEL,
            byte_size,
            offset,
        });
    }
    Ok(EncodedDirectory { header, entries })
}

//===========================================================================//


//===========================================================================//
