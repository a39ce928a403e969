use std::io::{self, Write};

use crate::bitvec::BitVec;
use crate::header::CodeTable;
use crate::CompressionError;


/// Packs code paths into bytes, least significant bit first, flushing
/// complete bytes to the output in batches.
pub struct BitPacker<W: Write> {

    output: W,
    pending: BitVec,
    /// Flush once this many complete bytes are pending
    flush_at: usize,
    bytes_written: u64

}

impl<W: Write> BitPacker<W> {

    pub fn new(output: W, buffer_size: usize) -> Self {

        let flush_at = buffer_size.max(1);

        Self {
            output,
            pending: BitVec::with_capacity(flush_at * 8 + 256),
            flush_at,
            bytes_written: 0
        }
    }


    pub fn push_path(&mut self, path: &BitVec) -> io::Result<()> {

        self.pending.extend_from_bits(&path.as_bit_view());

        if self.pending.complete_bytes() >= self.flush_at {
            self.flush_complete()?;
        }

        Ok(())
    }


    /// Appends the code of every byte in `data`.
    pub fn pack(&mut self, data: &[u8], table: &CodeTable) -> Result<(), CompressionError> {

        for &byte in data {

            let path = table.get(byte)
                .ok_or(CompressionError::UnknownSymbol(byte))?;

            self.push_path(path)?;
        }

        Ok(())
    }


    fn flush_complete(&mut self) -> io::Result<()> {

        let bytes = self.pending.take_complete_bytes();

        self.output.write_all(&bytes)?;
        self.bytes_written += bytes.len() as u64;

        Ok(())
    }


    /// Writes the remaining bits, zero-padding the final byte, and returns
    /// the output together with the number of payload bytes written.
    pub fn finish(mut self) -> io::Result<(W, u64)> {

        let pending = std::mem::take(&mut self.pending).into_padded_bytes();

        self.output.write_all(&pending)?;
        self.output.flush()?;

        Ok((self.output, self.bytes_written + pending.len() as u64))
    }

}


#[cfg(test)]
mod tests {

    use std::io;

    use crate::frequency::FrequencyTable;
    use crate::header::write_tree;
    use crate::tree::HuffmanTree;

    use super::*;


    fn table_for(data: &[u8]) -> CodeTable {
        let tree = HuffmanTree::from_frequencies(&FrequencyTable::from_bytes(data)).unwrap();
        write_tree(&tree, io::sink()).unwrap()
    }


    #[test]
    fn pads_final_byte_with_zeros() {

        let data = [0x41, 0x41, 0x42];
        let table = table_for(&data);

        let mut packer = BitPacker::new(Vec::new(), 4096);
        packer.pack(&data, &table).unwrap();

        let (payload, len) = packer.finish().unwrap();

        // 0x41 -> [true], 0x42 -> [false]
        assert_eq!(payload, vec![0b0000_0011]);
        assert_eq!(len, 1);
    }


    #[test]
    fn first_path_bit_is_least_significant() {

        let mut packer = BitPacker::new(Vec::new(), 1);

        packer.push_path(&BitVec::from_bool_slice(&[true, false, true])).unwrap();
        packer.push_path(&BitVec::from_bool_slice(&[true, true, false, false, true, true, true])).unwrap();

        let (payload, len) = packer.finish().unwrap();

        assert_eq!(payload, vec![0b1001_1101, 0b0000_0011]);
        assert_eq!(len, 2);
    }


    #[test]
    fn small_buffer_matches_large_buffer() {

        let data: Vec<u8> = (0..20_000_u32).map(|i| (i % 13 + i % 7) as u8).collect();
        let table = table_for(&data);

        let mut small = BitPacker::new(Vec::new(), 1);
        let mut large = BitPacker::new(Vec::new(), 1 << 20);

        for chunk in data.chunks(333) {
            small.pack(chunk, &table).unwrap();
            large.pack(chunk, &table).unwrap();
        }

        assert_eq!(small.finish().unwrap(), large.finish().unwrap());
    }


    #[test]
    fn unknown_symbol_is_an_error() {

        let table = table_for(b"ab");

        let mut packer = BitPacker::new(Vec::new(), 16);

        assert!(matches!(packer.pack(b"abc", &table), Err(CompressionError::UnknownSymbol(b'c'))));
    }

}
