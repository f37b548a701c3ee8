//! The match journal: a bounded queue of timestamped event strings
//! drained by a dedicated writer thread that appends to a durable file.
//!
//! `record` is fire-and-forget from the caller's perspective; it only
//! blocks while the queue is at capacity. The writer thread exits once
//! every handle has been dropped and the queue has drained.

use chrono::Local;
use std::{
    fmt,
    fs::OpenOptions,
    io::{self, Write},
    path::Path,
    sync::mpsc::{self, SyncSender},
    thread,
};

/// Most records the queue holds before producers block.
pub const QUEUE_CAPACITY: usize = 50;

/// Default journal file, appended to in the working directory.
pub const DEFAULT_JOURNAL_PATH: &str = "game_log";

/// A cloneable handle onto the journal queue.
#[derive(Clone, Debug)]
pub struct Journal {
    sender: SyncSender<String>,
}

impl Journal {
    /// Open (or create) the journal file and start the writer thread.
    pub fn spawn<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let (sender, receiver) = mpsc::sync_channel::<String>(QUEUE_CAPACITY);
        thread::Builder::new()
            .name("journal".to_string())
            .spawn(move || {
                while let Ok(line) = receiver.recv() {
                    // Flush per line so records survive an abrupt exit.
                    if writeln!(file, "{line}")
                        .and_then(|()| file.flush())
                        .is_err()
                    {
                        break;
                    }
                }
            })?;
        Ok(Self { sender })
    }

    /// Queue one record, stamped with the enqueue time.
    pub fn record(&self, message: impl fmt::Display) {
        let line = format!("[{}] {message}", Local::now().format("%H:%M:%S"));
        let _ = self.sender.send(line);
    }
}
