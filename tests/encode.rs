extern crate icopack;

use icopack::icondir::{decode_directory, BITS_PER_PIXEL, COLOR_PLANES};
use icopack::{Entry, Error, IconReader, Picture, WriteOptions};
use std::io::Cursor;

//===========================================================================//

fn gradient(width: u32, height: u32) -> Picture {
    let mut rgba = Vec::<u8>::new();
    for y in 0..height {
        for x in 0..width {
            let alpha = if (x + y) % 7 == 0 { 0x80 } else { 0xff };
            rgba.extend_from_slice(&[x as u8, y as u8, 0x40, alpha]);
        }
    }
    Picture::from_rgba_data(width, height, rgba)
}

fn payload(length: usize, seed: u8) -> Vec<u8> {
    (0..length).map(|index| seed.wrapping_add(index as u8)).collect()
}

//===========================================================================//

#[test]
fn two_payloads_of_100_and_200_bytes() {
    let entries = vec![
        Entry::new(16, 16, payload(100, 1)),
        Entry::new(32, 32, payload(200, 2)),
    ];
    let mut file = Vec::<u8>::new();
    let directory = icopack::write_icon(&mut file, &entries).unwrap();
    assert_eq!(directory.offsets(), vec![38, 138]);
    assert_eq!(directory.file_len(), 338);
    assert_eq!(file.len(), 338);
    let (_, records) = decode_directory(&file).unwrap();
    assert_eq!(records[0].offset, 38);
    assert_eq!(records[1].offset, 138);
}

#[test]
fn offsets_are_packed_in_order() {
    let lengths = [7usize, 0, 31, 1, 250];
    let entries: Vec<Entry> = lengths
        .iter()
        .enumerate()
        .map(|(index, &length)| {
            let side = 16 * (index as u32 + 1);
            Entry::new(side, side, payload(length, index as u8))
        })
        .collect();
    let mut file = Vec::<u8>::new();
    icopack::write_icon(&mut file, &entries).unwrap();
    let (header, records) = decode_directory(&file).unwrap();
    assert_eq!(header.count as usize, lengths.len());
    let mut expected_offset = 6 + 16 * lengths.len() as u32;
    for (record, &length) in records.iter().zip(lengths.iter()) {
        assert_eq!(record.offset, expected_offset);
        assert_eq!(record.byte_size as usize, length);
        expected_offset += length as u32;
    }
    assert_eq!(file.len() as u32, expected_offset);
}

#[test]
fn directory_fields_are_constant() {
    let entries = vec![
        Entry::new(1, 1, payload(3, 0)),
        Entry::new(255, 128, payload(5, 0)),
    ];
    let mut file = Vec::<u8>::new();
    icopack::write_icon(&mut file, &entries).unwrap();
    let (_, records) = decode_directory(&file).unwrap();
    for record in records.iter() {
        assert_eq!(record.planes, COLOR_PLANES);
        assert_eq!(record.bit_count, BITS_PER_PIXEL);
        assert_eq!(record.color_count, 0);
        assert_eq!(record.reserved, 0);
    }
    assert_eq!((records[1].width, records[1].height), (255, 128));
}

#[test]
fn payloads_round_trip_byte_for_byte() {
    let entries: Vec<Entry> = (1..=6u32)
        .map(|index| {
            Entry::new(index * 40, index, payload(index as usize * 13, 9))
        })
        .collect();
    let mut file = Vec::<u8>::new();
    icopack::write_icon(&mut file, &entries).unwrap();
    let mut reader = IconReader::open(Cursor::new(file)).unwrap();
    assert_eq!(reader.len(), entries.len());
    for (index, entry) in entries.iter().enumerate() {
        assert_eq!(reader.extract_payload(index).unwrap(), entry.payload());
    }
    let read_back = reader.into_entries().unwrap();
    assert_eq!(read_back, entries);
}

#[test]
fn resampled_pngs_round_trip() {
    let source = gradient(64, 48);
    let sizes = [16u32, 24, 32, 48];
    let entries: Vec<Entry> = sizes
        .iter()
        .map(|&size| {
            let picture = source.resample(size, size).unwrap();
            let png = picture.encode_png().unwrap();
            Entry::new(size, size, png)
        })
        .collect();
    let mut file = Vec::<u8>::new();
    icopack::write_icon(&mut file, &entries).unwrap();
    let mut reader = IconReader::open(Cursor::new(file)).unwrap();
    for (index, &size) in sizes.iter().enumerate() {
        let payload = reader.extract_payload(index).unwrap();
        assert_eq!(payload.as_slice(), entries[index].payload());
        let picture = Picture::read_png(payload.as_slice()).unwrap();
        assert_eq!((picture.width(), picture.height()), (size, size));
    }
}

#[test]
fn empty_input_is_rejected() {
    let mut file = Vec::<u8>::new();
    let result = icopack::write_icon(&mut file, &[]);
    assert!(matches!(result, Err(Error::EmptyInput)));
    assert!(file.is_empty());
}

#[test]
fn size_256_is_rejected_unless_wrapping() {
    let entries = vec![Entry::new(256, 256, payload(4, 0))];
    let mut file = Vec::<u8>::new();
    let result = icopack::write_icon(&mut file, &entries);
    assert!(matches!(result, Err(Error::WidthOverflow { .. })));

    let options = WriteOptions::wrapping();
    icopack::write_icon_with(&mut file, &entries, options).unwrap();
    let (_, records) = decode_directory(&file).unwrap();
    assert_eq!((records[0].width, records[0].height), (0, 0));
}

#[test]
fn write_icon_file_creates_a_readable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.ico");
    let entries = vec![
        Entry::new(16, 16, payload(10, 3)),
        Entry::new(48, 48, payload(20, 4)),
    ];
    icopack::write_icon_file(&path, &entries, WriteOptions::default())
        .unwrap();
    let read_back = icopack::read_icon_file(&path).unwrap();
    assert_eq!(read_back, entries);
}

#[test]
fn write_icon_file_leaves_nothing_behind_on_bad_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.ico");
    let entries = vec![Entry::new(16, 512, payload(10, 3))];
    let result =
        icopack::write_icon_file(&path, &entries, WriteOptions::default());
    assert!(matches!(result, Err(Error::HeightOverflow { index: 0, .. })));
    assert!(!path.exists());
}

//===========================================================================//
