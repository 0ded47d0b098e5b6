use hdf5::types::VarLenUnicode;
use hdf5::{Group, H5Type};
use ndarray::{aview1, ArrayD};

use crate::dtype::DType;
use crate::layout;
use crate::options::CodecOptions;
use crate::result::{Error, Result};
use crate::value::{reshaped, NumArray, Record, RecordArray, Scalar, ScalarKind, Value};

/// Walks a value and synthesises the Persistable group/attribute/dataset
/// layout under an open HDF5 group.
pub(crate) struct Encoder<'a> {
    options: &'a CodecOptions,
}

impl<'a> Encoder<'a> {
    pub fn new(options: &'a CodecOptions) -> Self {
        Self { options }
    }

    /// Emits `record` into `group`, which becomes an opaque record group.
    pub fn write_record(&self, group: &Group, record: &Record) -> Result<()> {
        write_scalar_tag(group, DType::Opaque)?;
        for (order, (name, value)) in record.iter().enumerate() {
            let field = group.create_group(name)?;
            field
                .new_attr::<i64>()
                .create(layout::FIELD_ORDER)?
                .write_scalar(&(order as i64))?;
            self.write_value(&field, name, value)?;
        }
        Ok(())
    }

    fn write_value(&self, group: &Group, name: &str, value: &Value) -> Result<()> {
        match value {
            Value::Empty => write_flag(group, layout::EMPTY_FIELD),
            // The sibling codecs treat a blank string like a missing value.
            Value::Scalar(Scalar::Str(s)) if s.is_empty() => {
                write_flag(group, layout::EMPTY_FIELD)
            }
            Value::Scalar(scalar) => self.write_scalar(group, name, scalar),
            Value::NumArray(array) => self.write_num_array(group, name, array),
            Value::BoolArray(array) => {
                write_flag(group, layout::LOGICAL_BOOLEAN_ARRAY)?;
                self.write_num_array(group, name, &array.mapv(i8::from).into())
            }
            Value::StrArray(array) => self.write_str_array(group, name, array),
            Value::Record(record) => self.write_record(group, record),
            Value::RecordArray(array) => self.write_record_array(group, name, array),
        }
    }

    /// Scalars are materialised as 1-D length-1 arrays; the decoder unboxes.
    fn write_scalar(&self, group: &Group, name: &str, scalar: &Scalar) -> Result<()> {
        match scalar {
            Scalar::Int8(v) => self.write_num_array(group, name, &boxed(*v).into()),
            Scalar::Int16(v) => self.write_num_array(group, name, &boxed(*v).into()),
            Scalar::Int32(v) => self.write_num_array(group, name, &boxed(*v).into()),
            Scalar::Int64(v) => self.write_num_array(group, name, &boxed(*v).into()),
            Scalar::Float32(v) => self.write_num_array(group, name, &boxed(*v).into()),
            Scalar::Float64(v) => self.write_num_array(group, name, &boxed(*v).into()),
            Scalar::Bool(v) => {
                write_flag(group, layout::LOGICAL_BOOLEAN_ARRAY)?;
                self.write_num_array(group, name, &boxed(i8::from(*v)).into())
            }
            Scalar::Str(v) => self.write_str_array(group, name, &boxed(v.clone())),
        }
    }

    fn write_num_array(&self, group: &Group, name: &str, array: &NumArray) -> Result<()> {
        write_boxed_tag(group, array.dtype())?;
        match array {
            NumArray::Int8(a) => self.write_dataset(group, name, a),
            NumArray::Int16(a) => self.write_dataset(group, name, a),
            NumArray::Int32(a) => self.write_dataset(group, name, a),
            NumArray::Int64(a) => self.write_dataset(group, name, a),
            NumArray::Float32(a) => self.write_dataset(group, name, a),
            NumArray::Float64(a) => self.write_dataset(group, name, a),
        }
    }

    fn write_str_array(&self, group: &Group, name: &str, array: &ArrayD<String>) -> Result<()> {
        write_boxed_tag(group, DType::String)?;
        let mut cells = Vec::with_capacity(array.len());
        for s in array.iter() {
            cells.push(s.parse::<VarLenUnicode>()?);
        }
        let data = reshaped(&group.name(), array.shape(), cells)?;
        // Variable-length strings do not go through the gzip policy.
        group.new_dataset_builder().with_data(&data).create(name)?;
        Ok(())
    }

    fn write_dataset<T: H5Type>(&self, group: &Group, name: &str, data: &ArrayD<T>) -> Result<()> {
        let builder = group.new_dataset_builder().with_data(data);
        let level = *self.options.compression_level();
        let builder = if level > 0 && data.len() > *self.options.compression_min_elements() {
            builder.deflate(level)
        } else {
            builder
        };
        builder.create(name)?;
        Ok(())
    }

    fn write_record_array(&self, group: &Group, name: &str, array: &RecordArray) -> Result<()> {
        self.check_field_names(group, array)?;
        // A 0-dimensional shape denotes a scalar, so a 0-d record array goes
        // out as a length-1 vector.
        let shape: Vec<usize> = if array.ndim() == 0 {
            vec![1]
        } else {
            array.shape().to_vec()
        };
        if let Some(columns) = self.parallel_columns(group, array, &shape)? {
            write_flag(group, layout::PARALLEL_ARRAY)?;
            return self.write_record(group, &columns);
        }

        write_flag(group, layout::STRUCT_OBJECT_ARRAY)?;
        let dims: Vec<i64> = shape.iter().map(|&d| d as i64).collect();
        group
            .new_attr::<i64>()
            .shape(dims.len())
            .create(layout::STRUCT_OBJECT_ARRAY_DIMS)?
            .write(aview1(&dims))?;
        for (index, element) in array.iter().enumerate() {
            let child = group.create_group(&layout::element_name(name, index, &shape))?;
            self.write_record(&child, element)?;
        }
        Ok(())
    }

    /// Element 0 defines the schema; any later element with a different
    /// field-name set is a writer-side error, never a silent demotion.
    fn check_field_names(&self, group: &Group, array: &RecordArray) -> Result<()> {
        let Some(first) = array.iter().next() else {
            return Ok(());
        };
        let mut expected: Vec<&str> = first.field_names().collect();
        expected.sort_unstable();
        for (index, element) in array.iter().enumerate().skip(1) {
            let mut actual: Vec<&str> = element.field_names().collect();
            actual.sort_unstable();
            if actual != expected {
                return Err(heterogeneous(
                    group,
                    format!("element {index} has fields {actual:?}, element 0 has {expected:?}"),
                ));
            }
        }
        Ok(())
    }

    /// When every field of element 0 is a scalar primitive, transposes the
    /// array into a record of per-field arrays shaped like the whole array.
    /// Returns `None` when the array is not parallelisable (including the
    /// zero-length case, which is stored as an empty struct array).
    fn parallel_columns(
        &self,
        group: &Group,
        array: &RecordArray,
        shape: &[usize],
    ) -> Result<Option<Record>> {
        let Some(first) = array.iter().next() else {
            return Ok(None);
        };
        let mut schema: Vec<(String, ScalarKind)> = Vec::with_capacity(first.len());
        for (field, value) in first.iter() {
            match value.unboxed_scalar() {
                Some(scalar) => schema.push((field.to_owned(), scalar.kind())),
                None => return Ok(None),
            }
        }

        let mut columns = Record::new();
        for (field, kind) in &schema {
            let mut cells = Vec::with_capacity(array.len());
            for (index, element) in array.iter().enumerate() {
                let scalar = element
                    .get(field)
                    .and_then(Value::unboxed_scalar)
                    .ok_or_else(|| {
                        heterogeneous(
                            group,
                            format!("element {index} field {field:?} is not a scalar primitive"),
                        )
                    })?;
                if scalar.kind() != *kind {
                    return Err(heterogeneous(
                        group,
                        format!("element {index} field {field:?} changes primitive type"),
                    ));
                }
                cells.push(scalar);
            }
            columns.insert(field, column_value(group, shape, *kind, cells)?);
        }
        Ok(Some(columns))
    }
}

fn column_value(
    group: &Group,
    shape: &[usize],
    kind: ScalarKind,
    cells: Vec<Scalar>,
) -> Result<Value> {
    macro_rules! collect {
        ($variant:ident, $prim:ty) => {{
            let data: Vec<$prim> = cells
                .into_iter()
                .map(|s| match s {
                    Scalar::$variant(v) => v,
                    _ => unreachable!("column kind checked by the caller"),
                })
                .collect();
            reshaped(&group.name(), shape, data).map(Value::from)
        }};
    }
    match kind {
        ScalarKind::Int8 => collect!(Int8, i8),
        ScalarKind::Int16 => collect!(Int16, i16),
        ScalarKind::Int32 => collect!(Int32, i32),
        ScalarKind::Int64 => collect!(Int64, i64),
        ScalarKind::Float32 => collect!(Float32, f32),
        ScalarKind::Float64 => collect!(Float64, f64),
        ScalarKind::Bool => collect!(Bool, bool),
        ScalarKind::Str => collect!(Str, String),
    }
}

fn boxed<T: Clone>(value: T) -> ArrayD<T> {
    ArrayD::from_elem(ndarray::IxDyn(&[1]), value)
}

/// Record groups carry the opaque tag as a plain scalar attribute.
fn write_scalar_tag(group: &Group, dtype: DType) -> Result<()> {
    group
        .new_attr::<i8>()
        .create(layout::DATA_TYPE)?
        .write_scalar(&i8::from(dtype))?;
    Ok(())
}

/// Leaf groups carry the tag as a 1-element int8 vector.
fn write_boxed_tag(group: &Group, dtype: DType) -> Result<()> {
    group
        .new_attr::<i8>()
        .shape(1)
        .create(layout::DATA_TYPE)?
        .write(aview1(&[i8::from(dtype)]))?;
    Ok(())
}

/// Presence-only markers are written as int8 `[0]`.
fn write_flag(group: &Group, name: &str) -> Result<()> {
    group
        .new_attr::<i8>()
        .shape(1)
        .create(name)?
        .write(aview1(&[0i8]))?;
    Ok(())
}

fn heterogeneous(group: &Group, detail: String) -> Error {
    Error::HeterogeneousRecordArray {
        path: group.name(),
        detail,
    }
}
