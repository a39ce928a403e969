
/// Chunk size used by every streaming pass unless configured otherwise.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {

    /// Bytes read or written per chunk, never zero
    buffer_size: usize

}

impl CodecConfig {

    pub const fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE
        }
    }


    /// Sets the chunk size. Zero is raised to one.
    pub const fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = if buffer_size == 0 { 1 } else { buffer_size };
        self
    }


    pub const fn buffer_size(&self) -> usize {
        self.buffer_size
    }

}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::new()
    }
}
