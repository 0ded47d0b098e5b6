use h5persist::result::Result;
use h5persist::Hdf5Codec;

fn main() -> Result<()> {
    let mut codec = Hdf5Codec::new();
    codec.set_reconstitute_struct_array(true);

    // whole file
    dbg!(codec.read("inputs.h5")?);

    // a single subtree, addressed with the HDF5 group delimiter
    dbg!(codec.read_group("inputs.h5", "target")?);

    Ok(())
}
