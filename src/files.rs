//! File-level entry points: `<input>` encodes to `<input>.huff`, and
//! `<name>.huff` decodes back to `<name>`.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

use crate::{decode, encode, CodecConfig, CompressionError, Decoder, DecompressionError, FrequencyTable};


pub const EXTENSION: &str = "huff";


#[derive(Debug, Error)]
pub enum FileError {

    #[error("{} does not end in .huff", .0.display())]
    InvalidExtension (PathBuf),

    #[error("{}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Compression (#[from] CompressionError),

    #[error(transparent)]
    Decompression (#[from] DecompressionError)

}

impl FileError {

    fn io(path: &Path) -> impl FnOnce(io::Error) -> FileError + '_ {
        move |source| FileError::Io { path: path.to_path_buf(), source }
    }

}


pub fn frequency_table(path: &Path, config: &CodecConfig) -> Result<FrequencyTable, FileError> {
    FrequencyTable::from_reader(byte_stream(path, config)?, config.buffer_size())
        .map_err(FileError::io(path))
}


pub fn byte_stream(path: &Path, config: &CodecConfig) -> Result<BufReader<File>, FileError> {
    File::open(path)
        .map(|file| BufReader::with_capacity(config.buffer_size(), file))
        .map_err(FileError::io(path))
}


pub fn sink(path: &Path, config: &CodecConfig) -> Result<BufWriter<File>, FileError> {
    File::create(path)
        .map(|file| BufWriter::with_capacity(config.buffer_size(), file))
        .map_err(FileError::io(path))
}


pub fn encoded_path(path: &Path) -> PathBuf {

    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(EXTENSION);

    PathBuf::from(name)
}


/// Strips the `.huff` extension. A bare `.huff` has no name left and is rejected.
pub fn decoded_path(path: &Path) -> Result<PathBuf, FileError> {
    match path.extension() {
        Some(extension) if extension == EXTENSION => Ok(path.with_extension("")),
        _ => Err(FileError::InvalidExtension(path.to_path_buf())),
    }
}


/// Encodes `path` into `<path>.huff`, returning the path written.
pub fn encode_file(path: &Path, config: &CodecConfig) -> Result<PathBuf, FileError> {

    let frequencies = frequency_table(path, config)?;
    let input = byte_stream(path, config)?;

    let output_path = encoded_path(path);
    let output = sink(&output_path, config)?;

    write_output(&output_path, output, |output| encode(&frequencies, input, output, config))?;

    info!("encoded {} into {}", path.display(), output_path.display());

    Ok(output_path)
}


/// Decodes a `.huff` file next to itself, returning the path written.
///
/// The output file is only created once the header has been read and checked.
pub fn decode_file(path: &Path, config: &CodecConfig) -> Result<PathBuf, FileError> {

    let output_path = decoded_path(path)?;

    let decoder = Decoder::new(byte_stream(path, config)?, config)?;

    let output = sink(&output_path, config)?;

    write_output(&output_path, output, |output| decoder.decode_into(output))?;

    info!("decoded {} into {}", path.display(), output_path.display());

    Ok(output_path)
}


/// Decodes a `.huff` file into memory.
pub fn decode_to_vec(path: &Path, config: &CodecConfig) -> Result<Vec<u8>, FileError> {

    let mut decoded = Vec::new();

    decode(byte_stream(path, config)?, &mut decoded, config)?;

    Ok(decoded)
}


/// Runs `write` over the freshly created `output`, removing `output_path` if it fails.
fn write_output<W, T, E>(output_path: &Path, output: W, write: impl FnOnce(W) -> Result<T, E>) -> Result<T, FileError>
where
    W: Write,
    FileError: From<E>
{
    write(output).map_err(|e| {
        remove_partial(output_path);
        FileError::from(e)
    })
}


fn remove_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!("could not remove partial output {}: {e}", path.display());
    }
}
