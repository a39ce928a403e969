mod bitvec;
pub mod config;
pub mod files;
pub mod frequency;
pub mod header;
pub mod packer;
pub mod tree;
pub mod walker;

use std::io::{self, Read, Write};

use log::debug;
use thiserror::Error;

pub use bitvec::{BitIterator, BitVec, BitView};
pub use config::CodecConfig;
pub use frequency::FrequencyTable;
pub use header::{CodeTable, MAGIC};
pub use tree::{HuffmanTree, Node};
pub use walker::WalkSummary;

use packer::BitPacker;


#[derive(Debug, Error)]
pub enum CompressionError {

    #[error("symbol {symbol:#04x} occurs {count} times, more than a header record can hold")]
    FrequencyOverflow { symbol: u8, count: u64 },

    #[error("symbol {0:#04x} was not counted in the frequency table")]
    UnknownSymbol (u8),

    #[error(transparent)]
    Io (#[from] io::Error)

}


#[derive(Debug, Error)]
pub enum DecompressionError {

    #[error("missing magic preamble")]
    InvalidMagic,

    #[error("tree header is truncated")]
    TruncatedHeader,

    #[error("tree header root is a leaf")]
    LeafRoot,

    #[error("tree header nests deeper than {} levels", header::MAX_DEPTH)]
    TreeTooDeep,

    #[error("tree header is not followed by an all-zero record")]
    MissingTerminator,

    #[error(transparent)]
    Io (#[from] io::Error)

}


/// Writes the encoded form of `input` to `output`.
///
/// `frequencies` must be the byte counts of exactly the bytes `input` yields;
/// the stream is read once, after the tree is built from the counts.
pub fn encode(frequencies: &FrequencyTable, mut input: impl Read, mut output: impl Write, config: &CodecConfig) -> Result<(), CompressionError> {

    output.write_all(&MAGIC)?;

    let Some(tree) = HuffmanTree::from_frequencies(frequencies) else {
        debug!("empty input, writing the preamble only");
        output.flush()?;
        return Ok(());
    };

    let mut header = Vec::with_capacity(tree.leaf_count() * 2 * header::RECORD_LEN);
    let table = header::write_tree(&tree, &mut header)?;

    output.write_all(&header)?;

    debug!("alphabet of {} symbols, {} byte tree header", table.len(), header.len());

    let mut packer = BitPacker::new(output, config.buffer_size());
    let mut buffer = vec![0; config.buffer_size()];

    loop {
        match input.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => packer.pack(&buffer[..n], &table)?,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    let (_, payload_len) = packer.finish()?;

    debug!("{} input bytes packed into {payload_len} payload bytes", frequencies.total());

    Ok(())
}


/// Reads an encoded stream. The header is parsed and checked when the decoder
/// is created, before any output exists.
pub struct Decoder<R: Read> {

    input: R,
    tree: Option<HuffmanTree>,
    config: CodecConfig

}

impl<R: Read> Decoder<R> {

    pub fn new(mut input: R, config: &CodecConfig) -> Result<Self, DecompressionError> {

        header::read_magic(&mut input)?;

        let tree = header::read_tree(&mut input)?;

        if let Some(tree) = &tree {
            debug!("read tree header: {} leaves, depth {}", tree.leaf_count(), tree.depth());
        }

        Ok(Self {
            input,
            tree,
            config: *config
        })
    }


    pub fn decode_into(self, mut output: impl Write) -> Result<WalkSummary, DecompressionError> {

        let Self { input, tree, config } = self;

        match tree {
            Some(mut tree) => walker::walk(&mut tree, input, output, config.buffer_size()),
            None => {
                output.flush()?;
                Ok(WalkSummary::default())
            }
        }
    }

}


/// Decodes `input` into `output`. Nothing is written unless the header is valid.
pub fn decode(input: impl Read, output: impl Write, config: &CodecConfig) -> Result<WalkSummary, DecompressionError> {
    Decoder::new(input, config)?
        .decode_into(output)
}


pub fn compress(data: &[u8]) -> Result<Box<[u8]>, CompressionError> {

    let mut compressed = Vec::new();

    encode(&FrequencyTable::from_bytes(data), data, &mut compressed, &CodecConfig::default())?;

    Ok(compressed.into_boxed_slice())
}


pub fn decompress(data: &[u8]) -> Result<Box<[u8]>, DecompressionError> {

    let mut decompressed = Vec::new();

    decode(data, &mut decompressed, &CodecConfig::default())?;

    Ok(decompressed.into_boxed_slice())
}
