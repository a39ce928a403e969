//! Binary tree header: an 8-byte magic preamble, the tree's nodes as 8-byte
//! records in preorder, and an all-zero terminator record.
//!
//! A record is the little-endian word `freq << 1`. Bit 0 flags the node type
//! (0 inner, 1 leaf). Byte 7 is zero for inner nodes and holds the symbol for
//! leaves, so a leaf count has 55 usable bits.

use std::io::{self, Read, Write};

use log::trace;

use crate::bitvec::BitVec;
use crate::tree::{HuffmanTree, Node};
use crate::{CompressionError, DecompressionError};


pub const MAGIC: [u8; 8] = [0x7B, 0x68, 0x75, 0x7C, 0x6D, 0x7D, 0x66, 0x66];

pub const RECORD_LEN: usize = 8;

const TERMINATOR: [u8; RECORD_LEN] = [0; RECORD_LEN];

/// Largest leaf count a record can carry.
pub const MAX_LEAF_COUNT: u64 = (1 << 55) - 1;

/// Deepest inner node accepted when reading a header.
pub const MAX_DEPTH: usize = 256;

const LEAF_FLAG: u8 = 1;


/// Root-to-leaf path of every leaf, `false` for a left step and `true` for a right step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {

    paths: Vec<Option<BitVec>>

}

impl CodeTable {

    fn new() -> Self {
        Self {
            paths: vec![None; 256]
        }
    }


    pub fn get(&self, symbol: u8) -> Option<&BitVec> {
        self.paths[symbol as usize].as_ref()
    }


    pub fn len(&self) -> usize {
        self.paths.iter()
            .filter(|path| path.is_some())
            .count()
    }


    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }


    pub fn iter(&self) -> impl Iterator<Item = (u8, &BitVec)> + '_ {
        self.paths.iter()
            .enumerate()
            .filter_map(|(symbol, path)| path.as_ref().map(|path| (symbol as u8, path)))
    }

}


fn encode_record(node: &Node) -> [u8; RECORD_LEN] {

    let mut record = (node.freq() << 1).to_le_bytes();

    match node {
        Node::Inner { .. } => {
            record[7] = 0;
        },
        Node::Leaf { symbol, .. } => {
            record[0] |= LEAF_FLAG;
            record[7] = *symbol;
        },
    }

    record
}


/// Writes the tree records and the terminator, returning the path of every leaf.
pub fn write_tree(tree: &HuffmanTree, mut writer: impl Write) -> Result<CodeTable, CompressionError> {

    let mut table = CodeTable::new();
    let mut path = Vec::new();

    write_node(tree.root(), &mut path, &mut table, &mut writer)?;

    writer.write_all(&TERMINATOR)?;

    Ok(table)
}


fn write_node(node: &Node, path: &mut Vec<bool>, table: &mut CodeTable, writer: &mut impl Write) -> Result<(), CompressionError> {

    match node {

        Node::Inner { left, right, .. } => {

            writer.write_all(&encode_record(node))?;

            path.push(false);
            write_node(left, path, table, writer)?;
            path.pop();

            path.push(true);
            write_node(right, path, table, writer)?;
            path.pop();
        },

        Node::Leaf { symbol, count } => {

            if *count > MAX_LEAF_COUNT {
                return Err(CompressionError::FrequencyOverflow { symbol: *symbol, count: *count });
            }

            writer.write_all(&encode_record(node))?;

            trace!("symbol {symbol:#04x} x{count}: {} bit code", path.len());
            table.paths[*symbol as usize] = Some(BitVec::from_bool_slice(path));
        },
    }

    Ok(())
}


/// Consumes the magic preamble.
pub fn read_magic(reader: &mut impl Read) -> Result<(), DecompressionError> {

    let mut preamble = [0; MAGIC.len()];

    match reader.read_exact(&mut preamble) {
        Ok(()) if preamble == MAGIC => Ok(()),
        Ok(()) => Err(DecompressionError::InvalidMagic),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(DecompressionError::InvalidMagic),
        Err(e) => Err(e.into()),
    }
}


/// Reads the tree records and the terminator that follow the magic preamble.
///
/// Returns `Ok(None)` when the input ends right there, which is how an empty
/// file is encoded.
pub fn read_tree(reader: &mut impl Read) -> Result<Option<HuffmanTree>, DecompressionError> {

    let Some(root_record) = read_first_record(reader)? else {
        return Ok(None);
    };

    let root = decode_node(root_record, reader, 0)?;

    let tree = HuffmanTree::from_root(root)
        .ok_or(DecompressionError::LeafRoot)?;

    let mut terminator = [0; RECORD_LEN];

    match reader.read_exact(&mut terminator) {
        Ok(()) if terminator == TERMINATOR => Ok(Some(tree)),
        Ok(()) => Err(DecompressionError::MissingTerminator),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(DecompressionError::MissingTerminator),
        Err(e) => Err(e.into()),
    }
}


fn read_first_record(reader: &mut impl Read) -> Result<Option<[u8; RECORD_LEN]>, DecompressionError> {

    let mut record = [0; RECORD_LEN];
    let mut filled = 0;

    while filled < RECORD_LEN {
        match reader.read(&mut record[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(DecompressionError::TruncatedHeader),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(Some(record))
}


fn read_record(reader: &mut impl Read) -> Result<[u8; RECORD_LEN], DecompressionError> {

    let mut record = [0; RECORD_LEN];

    reader.read_exact(&mut record)
        .map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => DecompressionError::TruncatedHeader,
            _ => e.into(),
        })?;

    Ok(record)
}


fn decode_node(mut record: [u8; RECORD_LEN], reader: &mut impl Read, depth: usize) -> Result<Node, DecompressionError> {

    if record[0] & LEAF_FLAG != 0 {

        let symbol = record[7];
        // The symbol byte is not part of the count
        record[7] = 0;

        return Ok(Node::Leaf {
            symbol,
            count: u64::from_le_bytes(record) >> 1
        });
    }

    if depth >= MAX_DEPTH {
        return Err(DecompressionError::TreeTooDeep);
    }

    let left = decode_node(read_record(reader)?, reader, depth + 1)?;
    let right = decode_node(read_record(reader)?, reader, depth + 1)?;

    Ok(Node::Inner {
        freq: 0,
        left: Box::new(left),
        right: Box::new(right)
    })
}


#[cfg(test)]
mod tests {

    use std::io::{self, Cursor};

    use rand::{rngs::StdRng, Rng, SeedableRng};

    use crate::frequency::FrequencyTable;

    use super::*;


    fn tree_of(data: &[u8]) -> HuffmanTree {
        HuffmanTree::from_frequencies(&FrequencyTable::from_bytes(data)).unwrap()
    }


    /// Same tree shape and leaf counts; inner frequencies are not stored.
    fn same_shape(a: &Node, b: &Node) -> bool {
        match (a, b) {
            (Node::Inner { left: la, right: ra, .. }, Node::Inner { left: lb, right: rb, .. })
                => same_shape(la, lb) && same_shape(ra, rb),
            (Node::Leaf { .. }, Node::Leaf { .. }) => a == b,
            _ => false,
        }
    }


    #[test]
    fn header_layout() {

        let mut header = Vec::new();
        let table = write_tree(&tree_of(&[0x41, 0x41, 0x42]), &mut header).unwrap();

        let expected: [u8; 32] = [
            // inner, freq 3
            0x06, 0, 0, 0, 0, 0, 0, 0x00,
            // leaf 0x42 x1
            0x03, 0, 0, 0, 0, 0, 0, 0x42,
            // leaf 0x41 x2
            0x05, 0, 0, 0, 0, 0, 0, 0x41,
            // terminator
            0, 0, 0, 0, 0, 0, 0, 0,
        ];

        assert_eq!(header, expected);

        assert_eq!(*table.get(0x42).unwrap().to_bool_slice(), [false]);
        assert_eq!(*table.get(0x41).unwrap().to_bool_slice(), [true]);
        assert_eq!(table.get(0x43), None);
        assert_eq!(table.len(), 2);
    }


    #[test]
    fn leaf_count_uses_upper_bytes() {

        let node = Node::Leaf { symbol: 0xAB, count: 0x0123_4567_89AB };

        let record = encode_record(&node);

        assert_eq!(record[0] & LEAF_FLAG, 1);
        assert_eq!(record[7], 0xAB);

        let decoded = decode_node(record, &mut io::empty(), 0).unwrap();

        assert_eq!(decoded, node);

        let largest = Node::Leaf { symbol: 0xff, count: MAX_LEAF_COUNT };

        assert_eq!(decode_node(encode_record(&largest), &mut io::empty(), 0).unwrap(), largest);
    }


    #[test]
    fn header_reads_back() {

        let mut rng = StdRng::seed_from_u64(0);

        for _ in 0..50 {

            let len = rng.gen_range(1..2000);
            let spread = rng.gen_range(1..=255_u8);
            let data: Vec<u8> = (0..len).map(|_| rng.gen_range(0..spread)).collect();

            let tree = tree_of(&data);

            let mut header = Vec::new();
            write_tree(&tree, &mut header).unwrap();

            let mut reader = Cursor::new(&header);
            let read = read_tree(&mut reader).unwrap().unwrap();

            assert!(same_shape(tree.root(), read.root()));
            assert_eq!(reader.position() as usize, header.len());
        }
    }


    #[test]
    fn codes_are_prefix_free() {

        let data: Vec<u8> = (0..5000_u32).map(|i| (i * i % 97) as u8).collect();
        let frequencies = FrequencyTable::from_bytes(&data);

        let table = write_tree(&HuffmanTree::from_frequencies(&frequencies).unwrap(), io::sink()).unwrap();

        let codes: Vec<Box<[bool]>> = table.iter().map(|(_, path)| path.to_bool_slice()).collect();

        assert_eq!(codes.len(), frequencies.alphabet_len());
        for (symbol, _) in frequencies.iter_nonzero() {
            assert!(table.get(symbol).is_some());
        }

        for (i, a) in codes.iter().enumerate() {
            assert!(!a.is_empty());
            for (j, b) in codes.iter().enumerate() {
                if i != j {
                    assert!(!b.starts_with(a), "{a:?} is a prefix of {b:?}");
                }
            }
        }
    }


    #[test]
    fn header_is_deterministic() {

        let data = b"abracadabra, the quick brown fox";
        let frequencies = FrequencyTable::from_bytes(data);

        let mut first = Vec::new();
        let mut second = Vec::new();
        write_tree(&HuffmanTree::from_frequencies(&frequencies).unwrap(), &mut first).unwrap();
        write_tree(&HuffmanTree::from_frequencies(&frequencies).unwrap(), &mut second).unwrap();

        assert_eq!(first, second);
    }


    #[test]
    fn rejects_oversized_count() {

        let mut counts = [0; 256];
        counts[7] = MAX_LEAF_COUNT + 1;
        counts[8] = 1;

        let tree = HuffmanTree::from_frequencies(&FrequencyTable::from_counts(counts)).unwrap();

        assert!(matches!(
            write_tree(&tree, io::sink()),
            Err(CompressionError::FrequencyOverflow { symbol: 7, .. })
        ));
    }


    #[test]
    fn magic_checks() {

        assert!(read_magic(&mut Cursor::new(MAGIC)).is_ok());
        assert!(matches!(read_magic(&mut Cursor::new(b"{huf|m}g")), Err(DecompressionError::InvalidMagic)));
        assert!(matches!(read_magic(&mut Cursor::new(&MAGIC[..5])), Err(DecompressionError::InvalidMagic)));
    }


    #[test]
    fn missing_terminator() {

        let mut header = Vec::new();
        write_tree(&tree_of(b"AAB"), &mut header).unwrap();

        let last = header.len() - 1;
        header[last] = 1;
        assert!(matches!(read_tree(&mut Cursor::new(&header)), Err(DecompressionError::MissingTerminator)));

        header.truncate(header.len() - RECORD_LEN);
        assert!(matches!(read_tree(&mut Cursor::new(&header)), Err(DecompressionError::MissingTerminator)));
    }


    #[test]
    fn truncated_and_degenerate_headers() {

        assert!(matches!(read_tree(&mut io::empty()), Ok(None)));

        // Stops inside the second record
        let truncated = [0x06, 0, 0, 0, 0, 0, 0, 0, 0x03, 0, 0];
        assert!(matches!(read_tree(&mut Cursor::new(&truncated)), Err(DecompressionError::TruncatedHeader)));

        let short = [0x06, 0, 0];
        assert!(matches!(read_tree(&mut Cursor::new(&short)), Err(DecompressionError::TruncatedHeader)));

        let leaf_root = [0x03, 0, 0, 0, 0, 0, 0, 0x41, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(read_tree(&mut Cursor::new(&leaf_root)), Err(DecompressionError::LeafRoot)));
    }


    #[test]
    fn rejects_deep_nesting() {

        // An endless left spine of inner records
        let spine = vec![0x02_u8; RECORD_LEN * (MAX_DEPTH + 2)];

        assert!(matches!(read_tree(&mut Cursor::new(&spine)), Err(DecompressionError::TreeTooDeep)));
    }

}
