use crate::entry::{DimensionPolicy, Entry};
use crate::error::{Error, Result};
use crate::icondir::{encode_directory, EncodedDirectory, EntryLayout};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

//===========================================================================//

/// Settings for writing an ICO container.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct WriteOptions {
    /// How to treat widths and heights outside `1..=255`.
    pub dimensions: DimensionPolicy,
}

impl WriteOptions {
    /// Returns options that wrap oversized dimensions instead of rejecting
    /// them.
    pub fn wrapping() -> WriteOptions {
        WriteOptions { dimensions: DimensionPolicy::Wrap }
    }
}

//===========================================================================//

/// Writes `entries` as an ICO container, rejecting dimensions that don't fit
/// in a directory byte.  Returns the directory that was written.
pub fn write_icon<W: Write>(
    writer: W,
    entries: &[Entry],
) -> Result<EncodedDirectory> {
    write_icon_with(writer, entries, WriteOptions::default())
}

/// Writes `entries` as an ICO container: the header, then one directory
/// record per entry, then every payload back to back in the same order.
/// Nothing is written if the entries fail validation.
pub fn write_icon_with<W: Write>(
    mut writer: W,
    entries: &[Entry],
    options: WriteOptions,
) -> Result<EncodedDirectory> {
    let directory = plan_directory(entries, options)?;
    emit(&mut writer, &directory, entries)?;
    Ok(directory)
}

/// Writes `entries` to a new ICO file at `path`.  The file is only created
/// once the entries have been validated, and is closed on every exit path.
pub fn write_icon_file<P: AsRef<Path>>(
    path: P,
    entries: &[Entry],
    options: WriteOptions,
) -> Result<EncodedDirectory> {
    let directory = plan_directory(entries, options)?;
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    emit(&mut writer, &directory, entries)?;
    writer.flush()?;
    Ok(directory)
}

fn plan_directory(
    entries: &[Entry],
    options: WriteOptions,
) -> Result<EncodedDirectory> {
    if entries.is_empty() {
        return Err(Error::EmptyInput);
    }
    let mut layouts = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let (width, height) = options.dimensions.size_bytes(
            index,
            entry.width(),
            entry.height(),
        )?;
        if width as u32 != entry.width() || height as u32 != entry.height() {
            warn!(
                index,
                "Storing {}x{} as {}x{} in the directory",
                entry.width(),
                entry.height(),
                width,
                height
            );
        }
        layouts.push(EntryLayout {
            width,
            height,
            byte_size: entry.payload().len(),
        });
    }
    encode_directory(&layouts)
}

fn emit<W: Write>(
    writer: &mut W,
    directory: &EncodedDirectory,
    entries: &[Entry],
) -> Result<()> {
    directory.write_to(&mut *writer)?;
    for (record, entry) in directory.entries().iter().zip(entries) {
        debug!(
            width = record.width,
            height = record.height,
            offset = record.offset,
            size = record.byte_size,
            "Writing payload"
        );
        writer.write_all(entry.payload())?;
    }
    Ok(())
}

//===========================================================================//


//===========================================================================//
