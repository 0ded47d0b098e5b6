//! PID-file emission in the `<hostname>:<pid>` form the pipeline worker
//! polls for.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::result::Result;

/// Fixed by the sibling-tool convention; the worker looks for exactly this
/// name regardless of which language wrote it.
pub const PID_FILE_NAME: &str = ".matlab.pids";

/// Writes the PID file into `dir` and returns its path.
pub fn write_pid_file(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = dir.as_ref().join(PID_FILE_NAME);
    let contents = format!("{}:{}", hostname()?, std::process::id());
    fs::write(&path, contents.as_bytes())?;
    Ok(path)
}

fn hostname() -> io::Result<String> {
    let mut buf = [0u8; 256];
    // SAFETY: buf is valid for buf.len() bytes for the duration of the call.
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_file_names_this_process() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_pid_file(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), PID_FILE_NAME);
        let contents = fs::read_to_string(&path).unwrap();
        let (host, pid) = contents.split_once(':').unwrap();
        assert!(!host.is_empty());
        assert_eq!(pid.parse::<u32>().unwrap(), std::process::id());
    }
}
