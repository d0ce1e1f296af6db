use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::icondir::{
    decode_directory, find_overlap, DirectoryEntry, Header, DIR_ENTRY_LEN,
    HEADER_LEN,
};
use byteorder::{ByteOrder, LittleEndian};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, trace};

//===========================================================================//

/// An open ICO container.  The header and directory are parsed and checked
/// up front; payloads are read lazily, one seek per extraction.
pub struct IconReader<R> {
    source: R,
    source_len: u64,
    header: Header,
    entries: Vec<DirectoryEntry>,
}

impl<R: Read + Seek> IconReader<R> {
    /// Parses the header and directory of an ICO container.  Fails if the
    /// header is malformed, if the source is too short to hold the declared
    /// directory, if a payload starts inside the header or directory, or if
    /// two payload ranges overlap.  Payloads extending past
    /// the end of the source are only reported when extracted.
    pub fn open(mut source: R) -> Result<IconReader<R>> {
        let source_len = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::with_capacity(HEADER_LEN);
        (&mut source).take(HEADER_LEN as u64).read_to_end(&mut bytes)?;
        if bytes.len() == HEADER_LEN {
            let count = LittleEndian::read_u16(&bytes[4..]) as u64;
            (&mut source)
                .take(count * DIR_ENTRY_LEN as u64)
                .read_to_end(&mut bytes)?;
        }
        let (header, entries) = decode_directory(&bytes)?;
        let directory_end = header.directory_end();
        for (index, entry) in entries.iter().enumerate() {
            if (entry.offset as u64) < directory_end {
                format_error!(
                    "Payload of entry {} starts at offset {}, inside the \
                     directory (which ends at {})",
                    index,
                    entry.offset,
                    directory_end
                );
            }
        }
        if let Some((first, second)) = find_overlap(&entries) {
            format_error!(
                "Payloads of entries {} and {} overlap \
                 ({}..{} and {}..{})",
                first,
                second,
                entries[first].offset,
                entries[first].end(),
                entries[second].offset,
                entries[second].end()
            );
        }
        debug!(count = header.count, source_len, "Opened ICO container");
        Ok(IconReader { source, source_len, header, entries })
    }

    /// Reads the payload of the entry at `index`.  Each call seeks
    /// independently, so calls may come in any order.
    pub fn extract_payload(&mut self, index: usize) -> Result<Vec<u8>> {
        let entry = match self.entries.get(index) {
            Some(&entry) => entry,
            None => {
                return Err(Error::IndexOutOfRange {
                    index,
                    count: self.entries.len(),
                })
            }
        };
        if entry.end() > self.source_len {
            return Err(Error::PayloadOutOfRange {
                index,
                offset: entry.offset,
                size: entry.byte_size,
                source_len: self.source_len,
            });
        }
        trace!(index, offset = entry.offset, size = entry.byte_size, "Seek");
        self.source.seek(SeekFrom::Start(entry.offset as u64))?;
        let mut payload = vec![0u8; entry.byte_size as usize];
        self.source.read_exact(&mut payload)?;
        Ok(payload)
    }

    /// Reads the entry at `index`, pairing its payload with the width and
    /// height bytes from the directory.  A size byte of 0 is reported as 0.
    pub fn extract_entry(&mut self, index: usize) -> Result<Entry> {
        let payload = self.extract_payload(index)?;
        let record = &self.entries[index];
        Ok(Entry::new(record.width as u32, record.height as u32, payload))
    }

    /// Reads every entry, in directory order.
    pub fn into_entries(mut self) -> Result<Vec<Entry>> {
        (0..self.entries.len())
            .map(|index| self.extract_entry(index))
            .collect()
    }
}

impl<R> IconReader<R> {
    /// Returns the parsed header.
    pub fn header(&self) -> Header {
        self.header
    }

    /// Returns the directory records in the order they appear in the file,
    /// which need not match the order of their payloads.
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the container holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the total length of the source, in bytes.
    pub fn source_len(&self) -> u64 {
        self.source_len
    }

    /// Gives back the underlying source.
    pub fn into_inner(self) -> R {
        self.source
    }
}

//===========================================================================//

/// Reads every entry of the ICO file at `path`.  The file is closed before
/// this returns, whether or not reading succeeded.
pub fn read_icon_file<P: AsRef<Path>>(path: P) -> Result<Vec<Entry>> {
    let file = File::open(path.as_ref())?;
    IconReader::open(file)?.into_entries()
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::IconReader;
    use crate::error::{Error, ErrorKind};
    use std::io::Cursor;

    // Two entries whose payloads are stored in the reverse order of their
    // directory records.
    const REVERSED: &[u8] = b"\
        \x00\x00\x01\x00\x02\x00\
        \
        \x10\x10\x00\x00\x01\x00\x20\x00\
        \x03\x00\x00\x00\x29\x00\x00\x00\
        \
        \x20\x20\x00\x00\x01\x00\x20\x00\
        \x03\x00\x00\x00\x26\x00\x00\x00\
        \
        BBBAAA";

    #[test]
    fn read_empty_icon_set() {
        let input = b"\x00\x00\x01\x00\x00\x00";
        let reader = IconReader::open(Cursor::new(input)).unwrap();
        assert!(reader.is_empty());
        assert_eq!(reader.header().count, 0);
        assert_eq!(reader.source_len(), 6);
    }

    #[test]
    fn directory_order_is_not_offset_order() {
        let mut reader = IconReader::open(Cursor::new(REVERSED)).unwrap();
        assert_eq!(reader.len(), 2);
        assert_eq!(reader.entries()[0].offset, 41);
        assert_eq!(reader.entries()[1].offset, 38);
        // Extract out of order to make sure each call re-seeks.
        assert_eq!(reader.extract_payload(1).unwrap(), b"BBB");
        assert_eq!(reader.extract_payload(0).unwrap(), b"AAA");
        assert_eq!(reader.extract_payload(1).unwrap(), b"BBB");
    }

    #[test]
    fn extract_entry_carries_directory_size() {
        let mut reader = IconReader::open(Cursor::new(REVERSED)).unwrap();
        let entry = reader.extract_entry(1).unwrap();
        assert_eq!((entry.width(), entry.height()), (32, 32));
        assert_eq!(entry.payload(), b"BBB");
    }

    #[test]
    fn into_entries_keeps_directory_order() {
        let reader = IconReader::open(Cursor::new(REVERSED)).unwrap();
        let entries = reader.into_entries().unwrap();
        let payloads: Vec<&[u8]> =
            entries.iter().map(|entry| entry.payload()).collect();
        assert_eq!(payloads, vec![&b"AAA"[..], &b"BBB"[..]]);
    }

    #[test]
    fn index_out_of_range() {
        let mut reader = IconReader::open(Cursor::new(REVERSED)).unwrap();
        match reader.extract_payload(2) {
            Err(Error::IndexOutOfRange { index, count }) => {
                assert_eq!((index, count), (2, 2));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn payload_past_end_of_source() {
        let mut input = REVERSED.to_vec();
        // Bump the first record's offset from 41 to 42.
        input[18] = 0x2a;
        let mut reader = IconReader::open(Cursor::new(input)).unwrap();
        let error = reader.extract_payload(0).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::OutOfRange);
        match error {
            Error::PayloadOutOfRange { index, offset, size, source_len } => {
                assert_eq!((index, offset, size, source_len), (0, 42, 3, 44));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // The other entry is still readable.
        assert_eq!(reader.extract_payload(1).unwrap(), b"BBB");
    }

    #[test]
    fn overlapping_payloads_are_rejected() {
        let mut input = REVERSED.to_vec();
        // Point the first record at the second record's payload.
        input[18] = 0x27;
        match IconReader::open(Cursor::new(input)) {
            Err(Error::Format(message)) => {
                assert!(message.contains("overlap"), "{}", message)
            }
            Err(other) => panic!("unexpected error: {:?}", other),
            Ok(_) => panic!("overlap was not detected"),
        }
    }

    #[test]
    fn payload_inside_directory_is_rejected() {
        let mut input = REVERSED.to_vec();
        // Point the first record at its own directory bytes.
        input[18] = 0x10;
        match IconReader::open(Cursor::new(input)) {
            Err(Error::Format(message)) => {
                assert!(message.contains("entry 0"), "{}", message);
                assert!(message.contains("offset 16"), "{}", message);
            }
            Err(other) => panic!("unexpected error: {:?}", other),
            Ok(_) => panic!("offset inside the directory was accepted"),
        }
    }

    #[test]
    fn payload_at_zero_is_rejected() {
        let mut input = REVERSED.to_vec();
        input[34] = 0x00;
        let error = IconReader::open(Cursor::new(input)).err().unwrap();
        assert_eq!(error.kind(), ErrorKind::Format);
    }

    #[test]
    fn truncated_directory() {
        let input = &REVERSED[..30];
        match IconReader::open(Cursor::new(input)) {
            Err(Error::Truncated { needed, available }) => {
                assert_eq!((needed, available), (38, 30));
            }
            Err(other) => panic!("unexpected error: {:?}", other),
            Ok(_) => panic!("truncation was not detected"),
        }
    }

    #[test]
    fn wrong_resource_type() {
        let input = b"\x00\x00\x02\x00\x00\x00";
        let error = IconReader::open(Cursor::new(input)).err().unwrap();
        assert_eq!(error.kind(), ErrorKind::Format);
    }
}

//===========================================================================//
