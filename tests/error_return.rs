use h5persist::result::Result;
use h5persist::stacktrace::{ErrorReturn, StackFrame};
use h5persist::{Hdf5Codec, Value};
use tempfile::TempDir;

#[test]
fn error_file_round_trips_through_the_codec() -> Result<()> {
    let dir = TempDir::new()?;
    let error = ErrorReturn {
        message: "unable to permute image".to_owned(),
        identifier: "PermuterError".to_owned(),
        stack: vec![
            StackFrame {
                file: "permuter.rs".to_owned(),
                name: "permute_color".to_owned(),
                line: 41,
            },
            StackFrame {
                file: "major_tom.rs".to_owned(),
                name: "run".to_owned(),
                line: 9,
            },
        ],
    };

    let path = error.write_error_file(dir.path(), "permuter")?;
    assert_eq!(path.file_name().unwrap(), "permuter-error.h5");

    // The stack has scalar-only fields, so it lands as a parallel array and
    // reconstitutes back into frames.
    let mut codec = Hdf5Codec::new();
    codec.set_reconstitute_struct_array(true);
    let value = codec.read(&path)?;
    let record = value.as_record().unwrap();
    assert_eq!(
        record.get("message"),
        Some(&Value::from("unable to permute image"))
    );
    assert_eq!(
        record.get("identifier"),
        Some(&Value::from("PermuterError"))
    );

    let stack = record.get("stack").unwrap().as_record_array().unwrap();
    assert_eq!(stack.shape(), [2]);
    let first = stack.get(&[0]).unwrap();
    assert_eq!(first.get("file"), Some(&Value::from("permuter.rs")));
    assert_eq!(first.get("name"), Some(&Value::from("permute_color")));
    assert_eq!(first.get("line"), Some(&Value::from(41i64)));
    Ok(())
}

#[test]
fn captured_error_writes_even_without_symbols() -> Result<()> {
    let dir = TempDir::new()?;
    let error = ErrorReturn::capture("IoError", "file vanished");
    let path = error.write_error_file(dir.path(), "flipper")?;

    let value = Hdf5Codec::new().read(&path)?;
    let record = value.as_record().unwrap();
    assert_eq!(record.get("message"), Some(&Value::from("file vanished")));
    assert_eq!(record.get("identifier"), Some(&Value::from("IoError")));
    assert!(record.get("stack").is_some());
    Ok(())
}
