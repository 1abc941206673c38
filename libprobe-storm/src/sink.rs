use crate::types::Finding;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tracing::warn;

/// Fire-and-forget sink for findings: every hit goes to stdout immediately
/// and, when an output path was given, the identical line is appended to the
/// file. The handle is shared by all workers; the mutex keeps appends whole.
pub struct ResultSink {
    file: Option<Mutex<File>>,
    ndjson: bool,
}

impl ResultSink {
    /// A file that cannot be opened is reported once and the sink degrades
    /// to stdout-only; the scan itself goes on.
    pub fn new(output: Option<&Path>, ndjson: bool) -> Self {
        let file = output.and_then(|path| {
            match OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => Some(Mutex::new(file)),
                Err(e) => {
                    warn!("could not open output file {}: {}", path.display(), e);
                    None
                }
            }
        });
        Self { file, ndjson }
    }

    pub fn report(&self, finding: &Finding) {
        let line = if self.ndjson {
            match serde_json::to_string(finding) {
                Ok(json) => json,
                Err(_) => return,
            }
        } else {
            format!("[+] {}", finding)
        };

        println!("{}", line);

        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                if let Err(e) = writeln!(file, "{}", line) {
                    warn!("failed to append to output file: {}", e);
                }
            }
        }
    }
}
