use hdf5::types::VarLenUnicode;
use hdf5::{Dataset, Group};

use crate::dtype::DType;
use crate::layout;
use crate::options::CodecOptions;
use crate::result::{Error, Result};
use crate::value::{Record, RecordArray, Scalar, Value};

/// Walks an open HDF5 file, classifying each group by its attributes and
/// children, and rebuilds the value it encodes.
pub(crate) struct Decoder<'a> {
    options: &'a CodecOptions,
}

impl<'a> Decoder<'a> {
    pub fn new(options: &'a CodecOptions) -> Self {
        Self { options }
    }

    /// The root of a Persistable file is always a record.
    pub fn read_root(&self, group: &Group) -> Result<Value> {
        self.read_record(group).map(Value::Record)
    }

    /// Resolves `group_path` (one segment per `/`, leading `/` tolerated)
    /// and decodes that subtree only.
    pub fn read_at(&self, root: &Group, group_path: &str) -> Result<Value> {
        let mut current = root.clone();
        for segment in group_path
            .split(layout::GROUP_DELIMITER)
            .filter(|s| !s.is_empty())
        {
            current = current
                .group(segment)
                .map_err(|_| Error::GroupNotFound(group_path.to_owned()))?;
        }
        self.read_group(&current)
    }

    /// Classification order: parallel array, struct array, leaf dataset,
    /// empty field, record.
    fn read_group(&self, group: &Group) -> Result<Value> {
        let attrs = group.attr_names()?;
        let has = |name: &str| attrs.iter().any(|a| a == name);

        if has(layout::PARALLEL_ARRAY) {
            return self.read_parallel_array(group);
        }
        if has(layout::STRUCT_OBJECT_ARRAY) {
            return self.read_struct_array(group);
        }
        let members = group.member_names()?;
        if members.len() == 1 {
            if let Ok(dataset) = group.dataset(&members[0]) {
                return self.read_dataset(group, &dataset, has(layout::LOGICAL_BOOLEAN_ARRAY));
            }
        }
        if members.is_empty() && has(layout::EMPTY_FIELD) {
            return Ok(Value::Empty);
        }
        self.read_record(group).map(Value::Record)
    }

    fn read_record(&self, group: &Group) -> Result<Record> {
        let mut record = Record::new();
        for name in self.ordered_field_names(group)? {
            let child = group.group(&name)?;
            let value = self.read_group(&child)?;
            record.insert(name, value);
        }
        Ok(record)
    }

    /// With `preserve_field_order`, children are replayed by their
    /// `FIELD_ORDER` attribute, which must be a dense 0-based sequence;
    /// otherwise they come back in ascending name order.
    fn ordered_field_names(&self, group: &Group) -> Result<Vec<String>> {
        let mut names = group.member_names()?;
        if !*self.options.preserve_field_order() {
            names.sort_unstable();
            return Ok(names);
        }
        let gap = || Error::FieldOrderGap { path: group.name() };
        let mut ordered: Vec<Option<String>> = vec![None; names.len()];
        for name in names.drain(..) {
            let child = group.group(&name)?;
            let order = field_order(&child).ok_or_else(gap)?;
            let slot = ordered.get_mut(order).ok_or_else(gap)?;
            if slot.replace(name).is_some() {
                return Err(gap());
            }
        }
        ordered.into_iter().map(|slot| slot.ok_or_else(gap)).collect()
    }

    fn read_dataset(&self, group: &Group, dataset: &Dataset, logical: bool) -> Result<Value> {
        let tag = read_i8_attr(group, layout::DATA_TYPE).ok_or_else(|| Error::MissingDataType {
            path: group.name(),
        })?;
        let dtype = DType::try_from(tag).map_err(|_| Error::UnknownDType {
            path: group.name(),
            tag,
        })?;

        if logical {
            let bytes = dataset.read_dyn::<i8>()?;
            return Ok(unbox(Value::BoolArray(bytes.mapv(|v| v != 0))));
        }
        let value = match dtype {
            DType::Int8 => Value::from(dataset.read_dyn::<i8>()?),
            DType::Int16 => Value::from(dataset.read_dyn::<i16>()?),
            DType::Int32 => Value::from(dataset.read_dyn::<i32>()?),
            DType::Int64 => Value::from(dataset.read_dyn::<i64>()?),
            DType::Float32 => Value::from(dataset.read_dyn::<f32>()?),
            DType::Float64 => Value::from(dataset.read_dyn::<f64>()?),
            DType::String => {
                let cells = dataset.read_dyn::<VarLenUnicode>()?;
                Value::StrArray(cells.mapv(|s| s.as_str().to_owned()))
            }
            // Opaque marks record groups, never datasets.
            DType::Opaque => {
                return Err(Error::UnknownDType {
                    path: group.name(),
                    tag,
                })
            }
        };
        Ok(unbox(value))
    }

    fn read_parallel_array(&self, group: &Group) -> Result<Value> {
        let record = self.read_record(group)?;
        if !*self.options.reconstitute_struct_array() {
            return Ok(Value::Record(record));
        }
        self.reconstitute(group, &record).map(Value::RecordArray)
    }

    /// Transposes a record of per-field arrays back into the array of
    /// records it was written from. Every field must carry the same shape.
    fn reconstitute(&self, group: &Group, record: &Record) -> Result<RecordArray> {
        let mut shape: Option<Vec<usize>> = None;
        let mut columns: Vec<(&str, Vec<Scalar>)> = Vec::with_capacity(record.len());
        for (name, value) in record.iter() {
            let (field_shape, cells) = column_cells(group, name, value)?;
            match &shape {
                None => shape = Some(field_shape),
                Some(expected) if *expected == field_shape => {}
                Some(expected) => {
                    return Err(Error::ShapeMismatch {
                        path: group.name(),
                        detail: format!(
                            "field {name:?} has shape {field_shape:?}, expected {expected:?}"
                        ),
                    })
                }
            }
            columns.push((name, cells));
        }

        let shape = shape.unwrap_or_else(|| vec![0]);
        let count: usize = shape.iter().product();
        let mut elements = Vec::with_capacity(count);
        for index in 0..count {
            let mut element = Record::new();
            for (name, cells) in &columns {
                element.insert(*name, Value::Scalar(cells[index].clone()));
            }
            elements.push(element);
        }
        RecordArray::from_shape_vec(&shape, elements).map_err(|e| Error::ShapeMismatch {
            path: group.name(),
            detail: e.to_string(),
        })
    }

    fn read_struct_array(&self, group: &Group) -> Result<Value> {
        let dims = group
            .attr(layout::STRUCT_OBJECT_ARRAY_DIMS)
            .and_then(|attr| attr.read_raw::<i64>())
            .map_err(|e| Error::ShapeMismatch {
                path: group.name(),
                detail: format!("unreadable {}: {e}", layout::STRUCT_OBJECT_ARRAY_DIMS),
            })?;
        let mut shape = Vec::with_capacity(dims.len());
        for dim in dims {
            shape.push(usize::try_from(dim).map_err(|_| Error::ShapeMismatch {
                path: group.name(),
                detail: format!("negative dimension {dim}"),
            })?);
        }
        // An empty dims vector also denotes a zero-length array.
        let count: usize = if shape.is_empty() {
            shape.push(0);
            0
        } else {
            shape.iter().product()
        };

        let mut slots: Vec<Option<Record>> = vec![None; count];
        for name in group.member_names()? {
            let index = layout::parse_element_index(&name, &shape).ok_or_else(|| {
                Error::MalformedStructArrayName {
                    path: group.name(),
                    name: name.clone(),
                }
            })?;
            let child = group.group(&name)?;
            let element = match self.read_group(&child)? {
                Value::Record(element) => element,
                other => {
                    return Err(Error::ShapeMismatch {
                        path: group.name(),
                        detail: format!(
                            "element {name:?} decodes to a {}, not a record",
                            other.variant_name()
                        ),
                    })
                }
            };
            if slots[index].replace(element).is_some() {
                return Err(Error::MalformedStructArrayName {
                    path: group.name(),
                    name,
                });
            }
        }

        let mut elements = Vec::with_capacity(count);
        for (index, slot) in slots.into_iter().enumerate() {
            elements.push(slot.ok_or_else(|| Error::ShapeMismatch {
                path: group.name(),
                detail: format!("no element at flat index {index}"),
            })?);
        }
        let array = RecordArray::from_shape_vec(&shape, elements).map_err(|e| {
            Error::ShapeMismatch {
                path: group.name(),
                detail: e.to_string(),
            }
        })?;
        Ok(Value::RecordArray(array))
    }
}

/// Scalars travel as 1-D length-1 arrays; collapse them back on read.
fn unbox(value: Value) -> Value {
    let boxed = match &value {
        Value::NumArray(a) => a.ndim() == 1 && a.len() == 1,
        Value::BoolArray(a) => a.ndim() == 1 && a.len() == 1,
        Value::StrArray(a) => a.ndim() == 1 && a.len() == 1,
        _ => false,
    };
    match value.unboxed_scalar() {
        Some(scalar) if boxed => Value::Scalar(scalar),
        _ => value,
    }
}

fn column_cells(group: &Group, name: &str, value: &Value) -> Result<(Vec<usize>, Vec<Scalar>)> {
    match value {
        Value::NumArray(a) => Ok((a.shape().to_vec(), a.scalar_iter().collect())),
        Value::BoolArray(a) => Ok((
            a.shape().to_vec(),
            a.iter().map(|&b| Scalar::Bool(b)).collect(),
        )),
        Value::StrArray(a) => Ok((
            a.shape().to_vec(),
            a.iter().map(|s| Scalar::Str(s.clone())).collect(),
        )),
        // A one-element column came back unboxed.
        Value::Scalar(s) => Ok((vec![1], vec![s.clone()])),
        other => Err(Error::ShapeMismatch {
            path: group.name(),
            detail: format!(
                "parallel-array field {name:?} is a {}, not an array",
                other.variant_name()
            ),
        }),
    }
}

fn field_order(child: &Group) -> Option<usize> {
    let raw = child.attr(layout::FIELD_ORDER).ok()?.read_raw::<i64>().ok()?;
    usize::try_from(*raw.first()?).ok()
}

fn read_i8_attr(group: &Group, name: &str) -> Option<i8> {
    let raw = group.attr(name).ok()?.read_raw::<i8>().ok()?;
    raw.first().copied()
}
