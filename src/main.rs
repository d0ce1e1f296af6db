//! icopack - builds multi-resolution ICO files from a single image, and
//! unpacks them again.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use icopack::icondir::DirectoryEntry;
use icopack::{Entry, IconReader, Picture, WriteOptions};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

//===========================================================================//

#[derive(Parser)]
#[command(name = "icopack")]
#[command(about = "Packs an image at several sizes into an ICO file")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
#[command(after_help = "Example: icopack logo.png 16 32 48 logo.ico")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    pack: PackArgs,

    /// Log every directory record as it is read or written
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct PackArgs {
    /// <input-image> <size>... <output-ico>
    #[arg(value_name = "ARGS")]
    args: Vec<String>,

    /// Store sizes above 255 modulo 256 (so 256 becomes 0) instead of
    /// failing
    #[arg(long)]
    wrap_dimensions: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Extracts every image in an ICO file as icon_<W>x<H>.png
    Extract {
        /// ICO file to read
        container: PathBuf,

        /// Directory to write the PNG files into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Lists the directory records of an ICO file
    List {
        /// ICO file to read
        container: PathBuf,
    },
}

//===========================================================================//

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(default_level)
                }),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Some(Command::Extract { container, output }) => {
            extract(&container, &output)
        }
        Some(Command::List { container }) => list(&container),
        None => {
            let (input, sizes, output) = parse_pack_args(&cli.pack.args)
                .unwrap_or_else(|error| error.exit());
            let options = if cli.pack.wrap_dimensions {
                WriteOptions::wrapping()
            } else {
                WriteOptions::default()
            };
            pack(&input, &sizes, &output, options)
        }
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {:#}", error);
            ExitCode::FAILURE
        }
    }
}

/// Splits the positional arguments into input path, sizes and output path,
/// or returns the usage error to exit with.
fn parse_pack_args(
    args: &[String],
) -> Result<(PathBuf, Vec<u32>, PathBuf), clap::Error> {
    if args.len() < 3 {
        return Err(Cli::command().error(
            ErrorKind::MissingRequiredArgument,
            "expected an input image, at least one size, and an output path",
        ));
    }
    let mut sizes = Vec::with_capacity(args.len() - 2);
    for arg in &args[1..args.len() - 1] {
        match arg.parse::<u32>() {
            Ok(size) if size > 0 => sizes.push(size),
            _ => {
                return Err(Cli::command().error(
                    ErrorKind::ValueValidation,
                    format!(
                        "invalid size '{}' (expected a positive integer)",
                        arg
                    ),
                ))
            }
        }
    }
    let input = PathBuf::from(&args[0]);
    let output = PathBuf::from(&args[args.len() - 1]);
    Ok((input, sizes, output))
}

//===========================================================================//

fn pack(
    input: &Path,
    sizes: &[u32],
    output: &Path,
    options: WriteOptions,
) -> Result<()> {
    let source = Picture::open(input)
        .with_context(|| format!("failed to load {}", input.display()))?;
    // Check every size against the directory before resampling anything.
    for (index, &size) in sizes.iter().enumerate() {
        options.dimensions.size_bytes(index, size, size)?;
    }
    let mut entries = Vec::with_capacity(sizes.len());
    for &size in sizes {
        info!("Adding {}x{}", size, size);
        let payload = source.resample(size, size)?.encode_png()?;
        entries.push(Entry::new(size, size, payload));
    }
    let directory = icopack::write_icon_file(output, &entries, options)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(
        "Wrote {} images ({} bytes) to {}",
        entries.len(),
        directory.file_len(),
        output.display()
    );
    Ok(())
}

fn extract(container: &Path, output: &Path) -> Result<()> {
    let file = File::open(container)
        .with_context(|| format!("failed to open {}", container.display()))?;
    let mut reader = IconReader::open(file)
        .with_context(|| format!("failed to read {}", container.display()))?;
    std::fs::create_dir_all(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let mut used = HashSet::new();
    for index in 0..reader.len() {
        let record = reader.entries()[index];
        let payload = reader.extract_payload(index)?;
        let picture = Picture::read_png(payload.as_slice())
            .with_context(|| format!("entry {} is not a valid PNG", index))?;
        let name = entry_file_name(&record, index, &mut used);
        let path = output.join(&name);
        info!("Extracting entry {} to {}", index, path.display());
        let out_file = File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(out_file);
        picture.write_png(&mut writer)?;
        writer.flush()?;
    }
    Ok(())
}

/// Picks `icon_<W>x<H>.png` for an entry, adding `_<index>` if that name was
/// already taken by an earlier entry.
fn entry_file_name(
    record: &DirectoryEntry,
    index: usize,
    used: &mut HashSet<String>,
) -> String {
    let name = format!("icon_{}x{}.png", record.width, record.height);
    if used.insert(name.clone()) {
        return name;
    }
    let name =
        format!("icon_{}x{}_{}.png", record.width, record.height, index);
    used.insert(name.clone());
    name
}

fn list(container: &Path) -> Result<()> {
    let file = File::open(container)
        .with_context(|| format!("failed to open {}", container.display()))?;
    let reader = IconReader::open(file)
        .with_context(|| format!("failed to read {}", container.display()))?;
    for (index, entry) in reader.entries().iter().enumerate() {
        println!(
            "{:5}: {}x{}, {} bytes at offset {}",
            index, entry.width, entry.height, entry.byte_size, entry.offset
        );
    }
    Ok(())
}

//===========================================================================//


//===========================================================================//
