//! Struct archiving functionality
//!
//! Archives are timestamped CSV files inside the session's archive root. Records must be flat
//! structs, as CSV has no representation for nested data.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Could not create the archive file: {0}")]
    CreateError(std::io::Error),

    #[error("Could not write the record: {0}")]
    WriteError(csv::Error),

    #[error("Could not flush the archive: {0}")]
    FlushError(std::io::Error),

    #[error("The archiver has not been initialised")]
    NotInit,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root.
    pub fn from_path<P: AsRef<Path>>(session: &Session, path: P) -> Result<Self, ArchiveError> {
        let session_path = session.arch_root.join(path);

        if let Some(parent) = session_path.parent() {
            std::fs::create_dir_all(parent).map_err(ArchiveError::CreateError)?;
        }

        let file = File::create(session_path).map_err(ArchiveError::CreateError)?;

        let w = WriterBuilder::new().has_headers(true).from_writer(file);

        Ok(Self { writer: Some(w) })
    }

    /// Serialise a record into the archive.
    pub fn serialise<T: Serialize>(&mut self, record: T) -> Result<(), ArchiveError> {
        match self.writer {
            Some(ref mut w) => {
                w.serialize(record).map_err(ArchiveError::WriteError)?;
                w.flush().map_err(ArchiveError::FlushError)
            }
            None => Err(ArchiveError::NotInit),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        time_s: f64,
        speed_ms: f64,
    }

    #[test]
    fn test_archiver() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new_in("arch_test", dir.path()).unwrap();

        let mut arch = Archiver::from_path(&session, "plan/rows.csv").unwrap();
        arch.serialise(Row { time_s: 0.0, speed_ms: 0.5 }).unwrap();
        arch.serialise(Row { time_s: 0.1, speed_ms: 0.6 }).unwrap();

        let contents =
            std::fs::read_to_string(session.arch_root.join("plan/rows.csv")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec!["time_s,speed_ms", "0.0,0.5", "0.1,0.6"]);

        let mut unset = Archiver::default();
        assert!(matches!(
            unset.serialise(Row { time_s: 0.0, speed_ms: 0.0 }),
            Err(ArchiveError::NotInit)
        ));

        session.exit();
    }
}
