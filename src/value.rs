use indexmap::IndexMap;
use ndarray::{Array1, ArrayD, IxDyn};

use crate::dtype::DType;
use crate::result::{Error, Result};

/// Rebuilds an n-d array from row-major cells, reporting the offending HDF5
/// path on a count/shape disagreement.
pub(crate) fn reshaped<T>(path: &str, shape: &[usize], cells: Vec<T>) -> Result<ArrayD<T>> {
    ArrayD::from_shape_vec(IxDyn(shape), cells).map_err(|e| Error::ShapeMismatch {
        path: path.to_owned(),
        detail: e.to_string(),
    })
}

/// A value exchanged through the codec.
///
/// Arrays are dense and rectangular; ragged data is representable only by
/// nesting records. Scalars written to disk become 1-D length-1 datasets and
/// are unboxed again on read.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A missing or blank value (`EMPTY_FIELD` on disk).
    Empty,
    Scalar(Scalar),
    NumArray(NumArray),
    BoolArray(ArrayD<bool>),
    StrArray(ArrayD<String>),
    Record(Record),
    RecordArray(RecordArray),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    Str(String),
}

/// An n-dimensional numeric array of one of the registry dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum NumArray {
    Int8(ArrayD<i8>),
    Int16(ArrayD<i16>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
}

/// An ordered mapping from field name to [`Value`].
///
/// Insertion order is significant: the encoder records it in `FIELD_ORDER`
/// attributes and the decoder can reproduce it. Inserting an existing name
/// replaces the value in place.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

/// An n-dimensional rectangular array of records sharing one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordArray(ArrayD<Record>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScalarKind {
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Bool,
    Str,
}

impl Value {
    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Empty => "empty",
            Value::Scalar(_) => "scalar",
            Value::NumArray(_) => "numeric array",
            Value::BoolArray(_) => "boolean array",
            Value::StrArray(_) => "string array",
            Value::Record(_) => "record",
            Value::RecordArray(_) => "record array",
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_num_array(&self) -> Option<&NumArray> {
        match self {
            Value::NumArray(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_bool_array(&self) -> Option<&ArrayD<bool>> {
        match self {
            Value::BoolArray(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_str_array(&self) -> Option<&ArrayD<String>> {
        match self {
            Value::StrArray(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_record_array(&self) -> Option<&RecordArray> {
        match self {
            Value::RecordArray(a) => Some(a),
            _ => None,
        }
    }

    /// The value as a scalar primitive, unboxing length-1 containers the way
    /// the parallel-array eligibility rule does.
    pub(crate) fn unboxed_scalar(&self) -> Option<Scalar> {
        fn unboxable(ndim: usize, len: usize) -> bool {
            ndim <= 1 && len == 1
        }
        match self {
            Value::Scalar(s) => Some(s.clone()),
            Value::NumArray(a) if unboxable(a.ndim(), a.len()) => a.scalar_iter().next(),
            Value::BoolArray(a) if unboxable(a.ndim(), a.len()) => {
                a.iter().next().map(|&b| Scalar::Bool(b))
            }
            Value::StrArray(a) if unboxable(a.ndim(), a.len()) => {
                a.iter().next().map(|s| Scalar::Str(s.clone()))
            }
            _ => None,
        }
    }
}

impl Scalar {
    pub(crate) fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Int8(_) => ScalarKind::Int8,
            Scalar::Int16(_) => ScalarKind::Int16,
            Scalar::Int32(_) => ScalarKind::Int32,
            Scalar::Int64(_) => ScalarKind::Int64,
            Scalar::Float32(_) => ScalarKind::Float32,
            Scalar::Float64(_) => ScalarKind::Float64,
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::Str(_) => ScalarKind::Str,
        }
    }
}

impl NumArray {
    pub fn dtype(&self) -> DType {
        match self {
            NumArray::Int8(_) => DType::Int8,
            NumArray::Int16(_) => DType::Int16,
            NumArray::Int32(_) => DType::Int32,
            NumArray::Int64(_) => DType::Int64,
            NumArray::Float32(_) => DType::Float32,
            NumArray::Float64(_) => DType::Float64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            NumArray::Int8(a) => a.shape(),
            NumArray::Int16(a) => a.shape(),
            NumArray::Int32(a) => a.shape(),
            NumArray::Int64(a) => a.shape(),
            NumArray::Float32(a) => a.shape(),
            NumArray::Float64(a) => a.shape(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements in row-major order, each wrapped as a [`Scalar`].
    pub(crate) fn scalar_iter(&self) -> Box<dyn Iterator<Item = Scalar> + '_> {
        match self {
            NumArray::Int8(a) => Box::new(a.iter().map(|&v| Scalar::Int8(v))),
            NumArray::Int16(a) => Box::new(a.iter().map(|&v| Scalar::Int16(v))),
            NumArray::Int32(a) => Box::new(a.iter().map(|&v| Scalar::Int32(v))),
            NumArray::Int64(a) => Box::new(a.iter().map(|&v| Scalar::Int64(v))),
            NumArray::Float32(a) => Box::new(a.iter().map(|&v| Scalar::Float32(v))),
            NumArray::Float64(a) => Box::new(a.iter().map(|&v| Scalar::Float64(v))),
        }
    }
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field, keeping its position if the name already exists.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

// Field order is part of a record's identity, so equality is positional
// rather than IndexMap's set-like comparison.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Record {
            fields: iter.into_iter().collect(),
        }
    }
}

impl RecordArray {
    /// Builds an array of the given shape from elements in row-major order.
    pub fn from_shape_vec(
        shape: &[usize],
        elements: Vec<Record>,
    ) -> Result<Self, ndarray::ShapeError> {
        Ok(RecordArray(ArrayD::from_shape_vec(IxDyn(shape), elements)?))
    }

    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    pub fn ndim(&self) -> usize {
        self.0.ndim()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: &[usize]) -> Option<&Record> {
        self.0.get(IxDyn(index))
    }

    /// Elements in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.0.iter()
    }

    pub fn as_array(&self) -> &ArrayD<Record> {
        &self.0
    }
}

impl From<ArrayD<Record>> for RecordArray {
    fn from(array: ArrayD<Record>) -> Self {
        RecordArray(array)
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Value::Scalar(scalar)
    }
}

impl From<NumArray> for Value {
    fn from(array: NumArray) -> Self {
        Value::NumArray(array)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl From<RecordArray> for Value {
    fn from(array: RecordArray) -> Self {
        Value::RecordArray(array)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Scalar(Scalar::Bool(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(Scalar::Str(value.to_owned()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(Scalar::Str(value))
    }
}

impl From<ArrayD<bool>> for Value {
    fn from(array: ArrayD<bool>) -> Self {
        Value::BoolArray(array)
    }
}

impl From<ArrayD<String>> for Value {
    fn from(array: ArrayD<String>) -> Self {
        Value::StrArray(array)
    }
}

impl From<Vec<bool>> for Value {
    fn from(values: Vec<bool>) -> Self {
        Value::BoolArray(Array1::from(values).into_dyn())
    }
}

impl From<Vec<String>> for Value {
    fn from(values: Vec<String>) -> Self {
        Value::StrArray(Array1::from(values).into_dyn())
    }
}

impl From<Vec<&str>> for Value {
    fn from(values: Vec<&str>) -> Self {
        values
            .into_iter()
            .map(str::to_owned)
            .collect::<Vec<_>>()
            .into()
    }
}

macro_rules! numeric_conversions {
    ($($prim:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$prim> for Scalar {
                fn from(value: $prim) -> Self {
                    Scalar::$variant(value)
                }
            }

            impl From<$prim> for Value {
                fn from(value: $prim) -> Self {
                    Value::Scalar(Scalar::$variant(value))
                }
            }

            impl From<ArrayD<$prim>> for NumArray {
                fn from(array: ArrayD<$prim>) -> Self {
                    NumArray::$variant(array)
                }
            }

            impl From<ArrayD<$prim>> for Value {
                fn from(array: ArrayD<$prim>) -> Self {
                    Value::NumArray(NumArray::$variant(array))
                }
            }

            impl From<Vec<$prim>> for Value {
                fn from(values: Vec<$prim>) -> Self {
                    Value::NumArray(NumArray::$variant(Array1::from(values).into_dyn()))
                }
            }
        )*
    };
}

numeric_conversions! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
}

#[cfg(test)]
mod tests {
    use ndarray::arr2;

    use super::*;

    #[test]
    fn record_preserves_insertion_order() {
        let mut record = Record::new();
        record.insert("zebra", 1i64);
        record.insert("aardvark", 2i64);
        record.insert("moose", 3i64);
        let names: Vec<_> = record.field_names().collect();
        assert_eq!(names, ["zebra", "aardvark", "moose"]);
    }

    #[test]
    fn record_equality_is_positional() {
        let mut a = Record::new();
        a.insert("x", 1i64);
        a.insert("y", 2i64);
        let mut b = Record::new();
        b.insert("y", 2i64);
        b.insert("x", 1i64);
        assert_ne!(a, b);
    }

    #[test]
    fn unboxes_length_one_containers() {
        assert_eq!(
            Value::from(vec![7i64]).unboxed_scalar(),
            Some(Scalar::Int64(7))
        );
        assert_eq!(
            Value::from("word").unboxed_scalar(),
            Some(Scalar::Str("word".to_owned()))
        );
        assert_eq!(Value::from(vec![1i64, 2]).unboxed_scalar(), None);
        assert_eq!(
            Value::from(arr2(&[[1i64]]).into_dyn()).unboxed_scalar(),
            None
        );
    }

    #[test]
    fn num_array_reports_registry_dtype() {
        let array = Value::from(vec![1.5f32, 2.5]);
        let array = array.as_num_array().unwrap();
        assert_eq!(array.dtype(), DType::Float32);
        assert_eq!(array.shape(), [2]);
    }
}
