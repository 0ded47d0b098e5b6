//! Naming and attribute conventions of the Persistable HDF5 dialect.
//!
//! Attribute names, the struct-array element naming scheme and the row-major
//! index encoding are all part of the wire contract shared with the sibling
//! codecs.

pub(crate) const DATA_TYPE: &str = "DATA_TYPE";
pub(crate) const FIELD_ORDER: &str = "FIELD_ORDER";
pub(crate) const EMPTY_FIELD: &str = "EMPTY_FIELD";
pub(crate) const LOGICAL_BOOLEAN_ARRAY: &str = "LOGICAL_BOOLEAN_ARRAY";
pub(crate) const PARALLEL_ARRAY: &str = "PARALLEL_ARRAY";
pub(crate) const STRUCT_OBJECT_ARRAY: &str = "STRUCT_OBJECT_ARRAY";
pub(crate) const STRUCT_OBJECT_ARRAY_DIMS: &str = "STRUCT_OBJECT_ARRAY_DIMS";

pub(crate) const GROUP_DELIMITER: char = '/';

/// Row-major strides: element `j` is the number of flat positions between
/// consecutive subscripts along dimension `j` (the last subscript varies
/// fastest).
pub(crate) fn row_major_strides(dims: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; dims.len()];
    for j in (0..dims.len().saturating_sub(1)).rev() {
        strides[j] = strides[j + 1] * dims[j + 1];
    }
    strides
}

/// Name of the element subgroup holding position `index` (flat, row-major)
/// of a struct array shaped `dims`: `<field>-i0-i1-…-iR`.
pub(crate) fn element_name(field: &str, index: usize, dims: &[usize]) -> String {
    let mut name = String::from(field);
    let mut rem = index;
    for stride in row_major_strides(dims) {
        let subscript = rem / stride;
        rem -= subscript * stride;
        name.push('-');
        name.push_str(&subscript.to_string());
    }
    name
}

/// Parses an element subgroup name back to its flat row-major index.
///
/// The field prefix may itself contain `-`; the trailing `rank` tokens are
/// the subscripts. Returns `None` for names that do not parse or subscripts
/// outside `dims`.
pub(crate) fn parse_element_index(name: &str, dims: &[usize]) -> Option<usize> {
    let tokens: Vec<&str> = name.split('-').collect();
    if tokens.len() < dims.len() + 1 {
        return None;
    }
    let subscripts = &tokens[tokens.len() - dims.len()..];
    let mut index = 0;
    for ((token, &dim), stride) in subscripts.iter().zip(dims).zip(row_major_strides(dims)) {
        let subscript: usize = token.parse().ok()?;
        if subscript >= dim {
            return None;
        }
        index += subscript * stride;
    }
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides_vary_last_subscript_fastest() {
        assert_eq!(row_major_strides(&[3, 4, 5]), [20, 5, 1]);
        assert_eq!(row_major_strides(&[2]), [1]);
        assert_eq!(row_major_strides(&[]), [] as [usize; 0]);
    }

    #[test]
    fn element_names_encode_subscripts_in_base_ten() {
        assert_eq!(element_name("stack", 0, &[2, 2]), "stack-0-0");
        assert_eq!(element_name("stack", 1, &[2, 2]), "stack-0-1");
        assert_eq!(element_name("stack", 2, &[2, 2]), "stack-1-0");
        assert_eq!(element_name("stack", 27, &[3, 4, 5]), "stack-1-1-2");
        assert_eq!(element_name("a", 11, &[12]), "a-11");
    }

    #[test]
    fn names_round_trip_through_the_index() {
        let dims = [3, 4, 5];
        for index in 0..60 {
            let name = element_name("elem", index, &dims);
            assert_eq!(parse_element_index(&name, &dims), Some(index));
        }
    }

    #[test]
    fn field_prefix_may_contain_separator() {
        let name = element_name("my-field", 5, &[2, 4]);
        assert_eq!(name, "my-field-1-1");
        assert_eq!(parse_element_index(&name, &[2, 4]), Some(5));
    }

    #[test]
    fn rejects_malformed_names() {
        assert_eq!(parse_element_index("elem-1", &[2, 2]), None);
        assert_eq!(parse_element_index("elem-x-0", &[2, 2]), None);
        assert_eq!(parse_element_index("elem-2-0", &[2, 2]), None);
        assert_eq!(parse_element_index("elem", &[2]), None);
    }
}
