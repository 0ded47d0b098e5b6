//! Error-report files in the layout the pipeline worker expects.
//!
//! On failure, an algorithm process writes `<module>-error.h5` next to its
//! working files; the worker reads it back with the same codec and folds the
//! message and stack into the task log. The codec itself is unaware of this
//! convention.

use std::error::Error as StdError;
use std::path::{Path, PathBuf};

use backtrace::Backtrace;
use ndarray::Array1;

use crate::result::Result;
use crate::value::{Record, RecordArray, Value};
use crate::Hdf5Codec;

/// One step of a captured call stack.
#[derive(Debug, Clone, PartialEq)]
pub struct StackFrame {
    pub file: String,
    pub name: String,
    pub line: i64,
}

/// The payload of an error file: a message, a short identifier, and the
/// stack that raised it.
#[derive(Debug, Clone)]
pub struct ErrorReturn {
    pub message: String,
    pub identifier: String,
    pub stack: Vec<StackFrame>,
}

impl ErrorReturn {
    /// Captures the current call stack under the given identifier.
    pub fn capture(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            identifier: identifier.into(),
            stack: capture_frames(),
        }
    }

    pub fn from_error(identifier: impl Into<String>, error: &(dyn StdError + 'static)) -> Self {
        Self::capture(identifier, error.to_string())
    }

    /// The record written to disk: `{message, identifier, stack}` with
    /// `stack` a record array of `{file, name, line}` frames. With resolved
    /// frames every field is scalar, so the stack lands as a parallel array,
    /// which is what the sibling readers expect.
    pub fn to_record(&self) -> Record {
        let frames: Vec<Record> = self
            .stack
            .iter()
            .map(|frame| {
                let mut record = Record::new();
                record.insert("file", frame.file.clone());
                record.insert("name", frame.name.clone());
                record.insert("line", frame.line);
                record
            })
            .collect();
        let stack = RecordArray::from(Array1::from(frames).into_dyn());

        let mut record = Record::new();
        record.insert("message", self.message.clone());
        record.insert("identifier", self.identifier.clone());
        record.insert("stack", Value::RecordArray(stack));
        record
    }

    /// Writes `<module>-error.h5` into `dir` and returns the file path.
    pub fn write_error_file(&self, dir: impl AsRef<Path>, module_name: &str) -> Result<PathBuf> {
        let path = dir.as_ref().join(format!("{module_name}-error.h5"));
        Hdf5Codec::new().write(&path, &self.to_record())?;
        Ok(path)
    }
}

/// Frames without a resolved symbol, file or line are dropped; the report
/// only makes sense for frames a reader can look up.
fn capture_frames() -> Vec<StackFrame> {
    let backtrace = Backtrace::new();
    let mut frames = Vec::new();
    for frame in backtrace.frames() {
        for symbol in frame.symbols() {
            let (Some(name), Some(file), Some(line)) =
                (symbol.name(), symbol.filename(), symbol.lineno())
            else {
                continue;
            };
            frames.push(StackFrame {
                file: file.display().to_string(),
                name: name.to_string(),
                line: i64::from(line),
            });
        }
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_carries_the_expected_fields_in_order() {
        let error = ErrorReturn {
            message: "boom".to_owned(),
            identifier: "ValueError".to_owned(),
            stack: vec![StackFrame {
                file: "module.rs".to_owned(),
                name: "run".to_owned(),
                line: 12,
            }],
        };
        let record = error.to_record();
        let names: Vec<_> = record.field_names().collect();
        assert_eq!(names, ["message", "identifier", "stack"]);
        let stack = record.get("stack").unwrap().as_record_array().unwrap();
        assert_eq!(stack.shape(), [1]);
        let frame = stack.get(&[0]).unwrap();
        assert_eq!(frame.get("line"), Some(&Value::from(12i64)));
    }

    #[test]
    fn capture_resolves_at_least_one_frame() {
        let error = ErrorReturn::capture("TestError", "synthetic");
        assert_eq!(error.identifier, "TestError");
        // Symbol resolution depends on the build, so only sanity-check the
        // shape of whatever came back.
        for frame in &error.stack {
            assert!(frame.line >= 0);
        }
    }
}
