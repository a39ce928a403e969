use std::io::{self, Read};


/// Occurrence count of every byte value in one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {

    counts: [u64; 256]

}

impl FrequencyTable {

    pub const fn new() -> Self {
        Self {
            counts: [0; 256]
        }
    }


    pub const fn from_counts(counts: [u64; 256]) -> Self {
        Self {
            counts
        }
    }


    pub fn from_bytes(data: &[u8]) -> Self {

        let mut table = Self::new();
        table.add_bytes(data);

        table
    }


    /// Counts every byte the reader yields, reading `buffer_size` bytes at a time.
    pub fn from_reader(mut reader: impl Read, buffer_size: usize) -> io::Result<Self> {

        let mut table = Self::new();
        let mut buffer = vec![0; buffer_size.max(1)];

        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => table.add_bytes(&buffer[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(table)
    }


    pub fn add_bytes(&mut self, data: &[u8]) {
        for &byte in data {
            self.counts[byte as usize] += 1;
        }
    }


    pub const fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }


    pub const fn counts(&self) -> &[u64; 256] {
        &self.counts
    }


    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }


    /// How many distinct byte values occur at least once.
    pub fn alphabet_len(&self) -> usize {
        self.counts.iter()
            .filter(|&&count| count > 0)
            .count()
    }


    /// Symbols with a nonzero count, in ascending byte order.
    pub fn iter_nonzero(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts.iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(symbol, &count)| (symbol as u8, count))
    }

}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}
