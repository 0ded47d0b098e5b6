//! Codec between structured in-memory values and the Persistable HDF5
//! layout.
//!
//! A [`Value`] (scalars, dense n-d arrays, ordered records, arrays of
//! records) maps onto HDF5 groups, datasets and attributes under the same
//! conventions as the sibling MATLAB, C++ and Java codecs: any conforming
//! writer's output is readable by any conforming reader.
//!
//! ```no_run
//! use h5persist::{Hdf5Codec, Record, Value};
//!
//! # fn main() -> h5persist::Result<()> {
//! let mut inputs = Record::new();
//! inputs.insert("cadence", 42i64);
//! inputs.insert("label", "q17");
//!
//! let codec = Hdf5Codec::new();
//! codec.write("inputs.h5", &inputs)?;
//! let roundtrip = codec.read("inputs.h5")?;
//! assert_eq!(roundtrip, Value::Record(inputs));
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use decode::Decoder;
use encode::Encoder;

mod decode;
pub mod dtype;
mod encode;
mod layout;
pub mod options;
#[cfg(unix)]
pub mod pidfile;
pub mod result;
pub mod stacktrace;
pub mod value;

pub use dtype::DType;
pub use options::CodecOptions;
pub use result::{Error, Result};
pub use value::{NumArray, Record, RecordArray, Scalar, Value};

/// The codec entry point.
///
/// Each call opens its own file handle and closes it on every exit path; a
/// codec holds no state besides its options, so distinct instances may run
/// concurrently on distinct files.
#[derive(Debug, Clone, Default)]
pub struct Hdf5Codec {
    options: CodecOptions,
}

impl Hdf5Codec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CodecOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn set_compression_level(&mut self, level: u8) {
        self.options.set_compression_level(level);
    }

    pub fn set_compression_min_elements(&mut self, min_elements: usize) {
        self.options.set_compression_min_elements(min_elements);
    }

    pub fn set_reconstitute_struct_array(&mut self, reconstitute: bool) {
        self.options.set_reconstitute_struct_array(reconstitute);
    }

    pub fn set_preserve_field_order(&mut self, preserve: bool) {
        self.options.set_preserve_field_order(preserve);
    }

    /// Creates a new file at `path` and writes `record` as its root.
    ///
    /// A failed write leaves the file in an undefined state; callers should
    /// delete it.
    pub fn write(&self, path: impl AsRef<Path>, record: &Record) -> Result<()> {
        let file = hdf5::File::create(path)?;
        Encoder::new(&self.options).write_record(&file, record)
    }

    /// Reads a whole file back as its root record.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<Value> {
        let file = hdf5::File::open(path)?;
        Decoder::new(&self.options).read_root(&file)
    }

    /// Decodes only the subtree at `group_path`, which names nested groups
    /// separated by `/` (a leading `/` is tolerated). So the field
    /// `inner.cadence` of the root record is addressed as
    /// `"inner/cadence"`.
    pub fn read_group(&self, path: impl AsRef<Path>, group_path: &str) -> Result<Value> {
        let file = hdf5::File::open(path)?;
        let decoder = Decoder::new(&self.options);
        if group_path.chars().all(|c| c == layout::GROUP_DELIMITER) {
            return decoder.read_root(&file);
        }
        decoder.read_at(&file, group_path)
    }
}
