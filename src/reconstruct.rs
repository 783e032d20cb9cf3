//! Streaming file reconstruction
//!
//! Simulates receiving a large file by appending fixed-size chunks of filler
//! bytes until the destination holds exactly `total_size` bytes. The last
//! chunk is cut short so the file never overshoots.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Byte written for every position of the reconstructed file
pub const FILLER_BYTE: u8 = b'A';

/// Largest filler block held in memory; bigger chunks are written in pieces
const MAX_BLOCK_SIZE: usize = 64 * 1024;

/// Reconstruction errors
#[derive(Debug, thiserror::Error)]
pub enum ReconstructError {
    #[error("Chunk size must be greater than zero")]
    ZeroChunkSize,

    #[error("Failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path} after {written} bytes: {source}")]
    Write {
        path: PathBuf,
        written: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to flush {path}: {source}")]
    Flush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How often progress is reported while writing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressCadence {
    EveryChunk,
    /// Report each time another `n` percent of the target has been written
    Percent(u8),
}

impl ProgressCadence {
    /// Cadence from a percent step, where 0 means every chunk
    pub fn from_step(step: u8) -> Self {
        match step {
            0 => Self::EveryChunk,
            n => Self::Percent(n.min(100)),
        }
    }
}

/// Receives `(written, total)` as the file grows
pub trait ProgressObserver {
    fn on_progress(&mut self, written: u64, total: u64);
}

impl<F: FnMut(u64, u64)> ProgressObserver for F {
    fn on_progress(&mut self, written: u64, total: u64) {
        self(written, total)
    }
}

/// One reconstruction run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconstructionJob {
    pub chunk_size: usize,
    pub total_size: u64,
    pub destination: PathBuf,
}

impl ReconstructionJob {
    pub fn new(chunk_size: usize, total_size: u64, destination: impl AsRef<Path>) -> Self {
        Self {
            chunk_size,
            total_size,
            destination: destination.as_ref().to_path_buf(),
        }
    }

    /// Write the file and return the number of bytes written.
    ///
    /// The destination is created or truncated. On a write failure the
    /// partial file stays where it is.
    pub fn run<O: ProgressObserver + ?Sized>(
        &self,
        cadence: ProgressCadence,
        observer: &mut O,
    ) -> Result<u64, ReconstructError> {
        if self.chunk_size == 0 {
            return Err(ReconstructError::ZeroChunkSize);
        }

        let path = &self.destination;
        let file = File::create(path).map_err(|source| ReconstructError::Create {
            path: path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        tracing::info!(
            path = %path.display(),
            chunk_size = self.chunk_size,
            total_size = self.total_size,
            "Reconstructing file"
        );

        let written = self.stream(&mut writer, cadence, observer)?;

        writer.flush().map_err(|source| ReconstructError::Flush {
            path: path.clone(),
            source,
        })?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|source| ReconstructError::Flush {
                path: path.clone(),
                source,
            })?;

        observer.on_progress(written, self.total_size);
        tracing::info!(path = %path.display(), bytes = written, "File reconstructed");

        Ok(written)
    }

    /// Push `total_size` filler bytes into `writer`, chunk by chunk.
    ///
    /// Stops at the first failed write; whatever reached `writer` stays there.
    fn stream<W: Write, O: ProgressObserver + ?Sized>(
        &self,
        writer: &mut W,
        cadence: ProgressCadence,
        observer: &mut O,
    ) -> Result<u64, ReconstructError> {
        let total = self.total_size;
        let block_len = usize::try_from(total)
            .map_or(MAX_BLOCK_SIZE, |t| t.min(MAX_BLOCK_SIZE))
            .min(self.chunk_size);
        let block = vec![FILLER_BYTE; block_len];
        let mut written: u64 = 0;
        let mut throttle = Throttle::new(cadence, total);

        while written < total {
            let chunk_end = written.saturating_add(self.chunk_size as u64).min(total);

            while written < chunk_end {
                let len = usize::try_from(chunk_end - written)
                    .map_or(block.len(), |r| r.min(block.len()));
                writer
                    .write_all(&block[..len])
                    .map_err(|source| ReconstructError::Write {
                        path: self.destination.clone(),
                        written,
                        source,
                    })?;
                written += len as u64;
            }

            if written < total && throttle.should_report(written) {
                observer.on_progress(written, total);
            }
        }

        Ok(written)
    }
}

/// Decides which intermediate chunks get a progress report
struct Throttle {
    step_bytes: Option<u64>,
    next_mark: u64,
}

impl Throttle {
    fn new(cadence: ProgressCadence, total: u64) -> Self {
        let step_bytes = match cadence {
            ProgressCadence::EveryChunk => None,
            ProgressCadence::Percent(pct) => {
                let step = u128::from(total) * u128::from(pct) / 100;
                Some((step as u64).max(1))
            }
        };
        Self {
            step_bytes,
            next_mark: step_bytes.unwrap_or(0),
        }
    }

    fn should_report(&mut self, written: u64) -> bool {
        let Some(step) = self.step_bytes else {
            return true;
        };
        if written < self.next_mark {
            return false;
        }
        while self.next_mark <= written && self.next_mark < u64::MAX {
            self.next_mark = self.next_mark.saturating_add(step);
        }
        true
    }
}
