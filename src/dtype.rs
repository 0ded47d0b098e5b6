use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Element-type tags stored in the `DATA_TYPE` attribute.
///
/// The tag values are shared with the MATLAB, C++ and Java Persistable
/// codecs; changing them breaks interoperability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i8)]
pub enum DType {
    Int8 = 2,
    Int16 = 3,
    Int32 = 4,
    Int64 = 5,
    Float32 = 6,
    Float64 = 7,
    String = 8,
    /// Marker for record groups (`H5T_OPAQUE` in the reference dialect).
    Opaque = 9,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_the_wire_contract() {
        assert_eq!(i8::from(DType::Int8), 2);
        assert_eq!(i8::from(DType::Float64), 7);
        assert_eq!(i8::from(DType::String), 8);
        assert_eq!(i8::from(DType::Opaque), 9);
        assert_eq!(DType::try_from(5).unwrap(), DType::Int64);
        assert!(DType::try_from(1).is_err());
        assert!(DType::try_from(10).is_err());
    }
}
