use h5persist::result::Result;
use h5persist::{Hdf5Codec, Record, RecordArray, Value};

fn main() -> Result<()> {
    let mut cadences = Vec::new();
    for index in 0..4i64 {
        let mut cadence = Record::new();
        cadence.insert("index", index);
        cadence.insert("flux", 100.25f64 + index as f64);
        cadence.insert("quality", index % 2 == 0);
        cadences.push(cadence);
    }

    let mut inputs = Record::new();
    inputs.insert("target", "kplr008462852");
    inputs.insert("gap", Value::Empty);
    inputs.insert(
        "cadences",
        RecordArray::from_shape_vec(&[2, 2], cadences).unwrap(),
    );

    let mut codec = Hdf5Codec::new();
    codec.set_compression_level(4);
    codec.write("inputs.h5", &inputs)?;
    println!("wrote inputs.h5 ({} root fields)", inputs.len());
    Ok(())
}
