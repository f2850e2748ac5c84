//! Per-tool run journal.
//!
//! Each line is `[YYYY-MM-DD HH:MM:SS] message`, appended to the tool's log
//! file and echoed to stdout. The sink and clock are injected so runs can be
//! captured in memory.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::error;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub type Clock = fn() -> NaiveDateTime;

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub struct Journal {
    sink: Box<dyn Write + Send>,
    echo: bool,
    clock: Clock,
}

impl Journal {
    pub fn new(sink: Box<dyn Write + Send>, echo: bool) -> Self {
        Self {
            sink,
            echo,
            clock: local_now,
        }
    }

    /// Open `<dir>/<file_name>` for appending, creating both if needed.
    pub fn open(dir: &Path, file_name: &str) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
        let path = dir.join(file_name);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        Ok(Self::new(Box::new(file), true))
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Current time according to the journal's clock.
    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    /// Append one timestamped line. A failing sink is reported, not fatal.
    pub fn record(&mut self, message: impl AsRef<str>) {
        let line = format!("[{}] {}", self.now().format(TIMESTAMP_FORMAT), message.as_ref());
        if let Err(e) = writeln!(self.sink, "{}", line).and_then(|_| self.sink.flush()) {
            error!("Failed to write journal line: {}", e);
        }
        if self.echo {
            println!("{}", line);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::SharedBuffer;
    use super::*;
    use chrono::NaiveDate;

    fn fixed_clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    #[test]
    fn test_record_format() {
        let buf = SharedBuffer::default();
        let mut journal = Journal::new(Box::new(buf.clone()), false).with_clock(fixed_clock);
        journal.record("Starting code generation job");
        journal.record(String::from("Job completed."));
        assert_eq!(
            buf.contents(),
            "[2024-01-02 03:04:05] Starting code generation job\n\
             [2024-01-02 03:04:05] Job completed.\n"
        );
    }

    #[test]
    fn test_open_appends() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        {
            let mut journal = Journal::open(&logs, "codegen_log.txt")
                .unwrap()
                .with_clock(fixed_clock);
            journal.record("first");
        }
        {
            let mut journal = Journal::open(&logs, "codegen_log.txt")
                .unwrap()
                .with_clock(fixed_clock);
            journal.record("second");
        }
        let text = std::fs::read_to_string(logs.join("codegen_log.txt")).unwrap();
        assert_eq!(
            text,
            "[2024-01-02 03:04:05] first\n[2024-01-02 03:04:05] second\n"
        );
    }
}
