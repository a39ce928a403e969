
/// Growable bit sequence packed least-significant-bit first:
/// the first bit appended to a byte lands in bit 0, the eighth in bit 7.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitVec {

    /// The actual raw bits
    raw_data: Vec<u8>,
    /// How many high bits of the last byte are padding.
    /// Padding bits are always zero
    last_byte_padding: u8

}

impl BitVec {

    pub fn new() -> Self {
        Self {
            raw_data: Vec::new(),
            last_byte_padding: 0
        }
    }


    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            raw_data: Vec::with_capacity(least_bytes_repr_for_bits(capacity)),
            last_byte_padding: 0
        }
    }


    pub fn len_bits(&self) -> usize {
        self.raw_data.len() * 8 - self.last_byte_padding as usize
    }


    pub fn is_empty(&self) -> bool {
        self.raw_data.is_empty()
    }


    /// Number of bytes whose eight bits are all meaningful.
    pub fn complete_bytes(&self) -> usize {
        self.raw_data.len() - (self.last_byte_padding != 0) as usize
    }


    pub fn append_bit(&mut self, bit: bool) {

        match self.raw_data.last_mut() {

            Some(last_byte) if self.last_byte_padding != 0 => {

                *last_byte |= (bit as u8) << (8 - self.last_byte_padding);

                self.last_byte_padding -= 1;
            },

            _ => {

                self.raw_data.push(bit as u8);
                self.last_byte_padding = 7;
            },
        }
    }


    pub fn extend_from_bits(&mut self, bit_view: &BitView) {

        if self.last_byte_padding == 0 {

            // The bits are aligned, so the raw bytes can be copied as they are

            self.raw_data.extend_from_slice(bit_view.raw_data);
            self.last_byte_padding = bit_view.last_byte_padding;

        } else {

            for bit in bit_view.iter_bits() {
                self.append_bit(bit)
            }

        }
    }


    /// Removes and returns every complete byte, keeping a trailing partial byte in place.
    pub fn take_complete_bytes(&mut self) -> Vec<u8> {

        if self.last_byte_padding == 0 {
            return std::mem::take(&mut self.raw_data);
        }

        let partial = self.raw_data.split_off(self.complete_bytes());

        std::mem::replace(&mut self.raw_data, partial)
    }


    /// Consumes the vector and returns its bytes, the last one zero-padded on the high end.
    pub fn into_padded_bytes(self) -> Vec<u8> {
        self.raw_data
    }


    pub fn as_bit_view(&self) -> BitView {
        BitView {
            raw_data: &self.raw_data,
            last_byte_padding: self.last_byte_padding
        }
    }


    pub fn iter_bits(&self) -> BitIterator {
        BitIterator {
            bits: self.as_bit_view(),
            i: 0,
        }
    }


    pub fn from_bool_slice(bools: &[bool]) -> Self {

        let mut res = Self::with_capacity(bools.len());

        for &b in bools {
            res.append_bit(b)
        }

        res
    }


    pub fn to_bool_slice(&self) -> Box<[bool]> {
        self.iter_bits()
            .collect()
    }

}


pub const fn least_bytes_repr_for_bits(bit_count: usize) -> usize {
    bit_count / 8 + (bit_count % 8 != 0) as usize
}


#[derive(Debug, Clone)]
pub struct BitView<'a> {

    raw_data: &'a [u8],
    last_byte_padding: u8

}

impl<'a> BitView<'a> {

    pub fn iter_bits(&self) -> BitIterator<'a> {
        BitIterator {
            bits: self.clone(),
            i: 0
        }
    }


    /// Views whole bytes, all eight bits of each meaningful.
    pub const fn from_bytes(bytes: &'a [u8]) -> BitView<'a> {
        Self::from_padded_bytes(bytes, 0)
    }


    pub const fn from_padded_bytes(bytes: &'a [u8], last_byte_padding: u8) -> BitView<'a> {
        Self {
            raw_data: bytes,
            last_byte_padding
        }
    }


    pub fn len_bits(&self) -> usize {
        self.raw_data.len() * 8 - self.last_byte_padding as usize
    }


    pub fn to_bool_slice(&self) -> Box<[bool]> {
        self.iter_bits()
            .collect()
    }

}


pub struct BitIterator<'a> {

    bits: BitView<'a>,
    i: usize

}

impl<'a> Iterator for BitIterator<'a> {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {

        if self.i >= self.bits.len_bits() {
            return None;
        }

        let byte = self.bits.raw_data[self.i / 8];

        let bit_in_byte_i = (self.i % 8) as u8;

        self.i += 1;

        Some(
            (byte & (1_u8 << bit_in_byte_i)) != 0
        )
    }


    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bits.len_bits().saturating_sub(self.i);
        (remaining, Some(remaining))
    }
}
