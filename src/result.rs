use thiserror::Error;

pub type Result<A, E = Error> = std::result::Result<A, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    IoFailed(#[from] std::io::Error),
    #[error("HDF5 error: {0}")]
    Hdf5Failed(#[from] hdf5::Error),
    #[error("string not storable as HDF5 variable-length UTF-8: {0}")]
    InvalidString(#[from] hdf5::types::StringError),
    #[error("group not found: {0}")]
    GroupNotFound(String),
    #[error("unknown DATA_TYPE tag {tag} at {path}")]
    UnknownDType { path: String, tag: i8 },
    #[error("missing DATA_TYPE attribute at {path}")]
    MissingDataType { path: String },
    #[error("missing, duplicate or non-contiguous FIELD_ORDER under {path}")]
    FieldOrderGap { path: String },
    #[error("malformed struct array element name {name:?} at {path}")]
    MalformedStructArrayName { path: String, name: String },
    #[error("shape mismatch at {path}: {detail}")]
    ShapeMismatch { path: String, detail: String },
    #[error("record array at {path} violates the schema of element 0: {detail}")]
    HeterogeneousRecordArray { path: String, detail: String },
}
