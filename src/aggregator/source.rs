//! Opening perf logs and reporting scan progress.
//!
//! Logs may be plain text or gzip-compressed; compression is detected from
//! the magic bytes, not the file name. Progress is measured in raw (possibly
//! compressed) bytes pulled from the file.

use crate::utils::config::PROGRESS_STEP_PERCENT;
use flate2::bufread::MultiGzDecoder;
use log::{debug, info};
use std::cell::Cell;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::rc::Rc;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Shared count of bytes read from the underlying source
#[derive(Debug, Clone, Default)]
pub struct ByteCounter(Rc<Cell<u64>>);

impl ByteCounter {
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    fn add(&self, n: usize) {
        self.0.set(self.0.get() + n as u64);
    }
}

/// Reader that counts the bytes passing through it
pub struct CountingReader<R> {
    inner: R,
    counter: ByteCounter,
}

impl<R: Read> CountingReader<R> {
    pub fn new(inner: R, counter: ByteCounter) -> Self {
        Self { inner, counter }
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.counter.add(n);
        Ok(n)
    }
}

/// An opened perf log, decompressed if needed
pub struct LogSource {
    pub reader: Box<dyn BufRead>,
    pub counter: ByteCounter,
    pub total_bytes: u64,
    pub compressed: bool,
}

impl LogSource {
    /// Open a log file
    ///
    /// **Public** - main entry point
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let total_bytes = file.metadata()?.len();
        let source = Self::from_reader(file, total_bytes)?;

        info!(
            "<< streaming {} ({} bytes{})",
            path.display(),
            total_bytes,
            if source.compressed { ", gzip" } else { "" }
        );
        Ok(source)
    }

    /// Wrap any reader, sniffing for gzip compression
    pub fn from_reader<R: Read + 'static>(inner: R, total_bytes: u64) -> io::Result<Self> {
        let counter = ByteCounter::default();
        let mut buffered = BufReader::new(CountingReader::new(inner, counter.clone()));
        let compressed = buffered.fill_buf()?.starts_with(&GZIP_MAGIC);

        let reader: Box<dyn BufRead> = if compressed {
            Box::new(BufReader::new(MultiGzDecoder::new(buffered)))
        } else {
            Box::new(buffered)
        };

        Ok(Self {
            reader,
            counter,
            total_bytes,
            compressed,
        })
    }
}

/// Logs scan progress at fixed percentage steps
pub struct ProgressReporter {
    counter: ByteCounter,
    total_bytes: u64,
    next_percent: u64,
}

impl ProgressReporter {
    pub fn new(counter: ByteCounter, total_bytes: u64) -> Self {
        Self {
            counter,
            total_bytes,
            next_percent: PROGRESS_STEP_PERCENT,
        }
    }

    /// Fraction of the source consumed so far
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            1.0
        } else {
            (self.counter.get() as f64 / self.total_bytes as f64).min(1.0)
        }
    }

    /// Report if another step has been crossed since the last report
    pub fn tick(&mut self) {
        if self.next_percent > 100 {
            return;
        }

        let percent = (self.fraction() * 100.0) as u64;
        if percent >= self.next_percent {
            info!(
                "Processing: {}% ({} / {} bytes)",
                percent,
                self.counter.get(),
                self.total_bytes
            );
            self.next_percent = (percent / PROGRESS_STEP_PERCENT + 1) * PROGRESS_STEP_PERCENT;
        }
    }

    pub fn finish(&self) {
        debug!(
            "Finished reading {} of {} bytes",
            self.counter.get(),
            self.total_bytes
        );
    }
}
