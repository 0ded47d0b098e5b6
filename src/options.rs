use derive_getters::Getters;

/// Knobs carried by the codec.
///
/// The compression options affect only the encoder's byte-level choices; the
/// remaining two affect only the decoder's in-memory representation. None of
/// them change the wire format's semantics.
#[derive(Debug, Clone, Getters)]
pub struct CodecOptions {
    /// gzip level 0-9; 0 disables compression regardless of array size.
    compression_level: u8,
    /// Smallest element count that will be compressed. Compression carries a
    /// fixed overhead in the file, so small arrays can come out larger
    /// compressed than plain.
    compression_min_elements: usize,
    /// On read, transpose a struct of parallel arrays back into the array of
    /// records it was written from.
    reconstitute_struct_array: bool,
    /// On read, return record fields in the order they were written rather
    /// than HDF5's natural alphabetical order.
    preserve_field_order: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            compression_level: 0,
            compression_min_elements: 0,
            reconstitute_struct_array: false,
            preserve_field_order: true,
        }
    }
}

impl CodecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// `level` is passed straight to the gzip filter; values outside 0-9
    /// surface as an HDF5 error at write time.
    pub fn set_compression_level(&mut self, level: u8) {
        self.compression_level = level;
    }

    pub fn set_compression_min_elements(&mut self, min_elements: usize) {
        self.compression_min_elements = min_elements;
    }

    pub fn set_reconstitute_struct_array(&mut self, reconstitute: bool) {
        self.reconstitute_struct_array = reconstitute;
    }

    pub fn set_preserve_field_order(&mut self, preserve: bool) {
        self.preserve_field_order = preserve;
    }
}
