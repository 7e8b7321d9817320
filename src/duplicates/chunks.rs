//! Lockstep chunk streaming for content comparison.
//!
//! Each file being compared gets its own reader thread. The reader fills a
//! chunk, hands it over a rendezvous channel, and blocks until the comparison
//! loop takes it. A reader is therefore never more than one chunk ahead of the
//! consumer, which keeps memory at O(chunk size) per file.
//!
//! Readers are spawned into a [`std::thread::Scope`] so the file handle is
//! closed before the owning comparison returns. Dropping a [`ChunkStream`]
//! disconnects the channel and the blocked reader exits on its next send.

use std::fs::File;
use std::io::{self, Read};
use std::thread::Scope;

use crossbeam_channel::{Receiver, Sender};

/// Default chunk size for content comparison (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// One step of a chunk stream.
#[derive(Debug)]
pub enum Chunk {
    /// A chunk of file content. Only the final chunk may be shorter than the
    /// configured chunk size.
    Data(Vec<u8>),
    /// The file has no more content.
    Eof,
    /// Reading failed; the stream ends after this.
    Failed(io::Error),
}

/// Consumer side of a per-file chunk reader.
pub struct ChunkStream {
    rx: Receiver<io::Result<Vec<u8>>>,
}

impl ChunkStream {
    /// Spawn a reader for `file` inside `scope`.
    pub fn spawn<'scope, 'env>(
        scope: &'scope Scope<'scope, 'env>,
        file: File,
        chunk_size: usize,
    ) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(0);
        scope.spawn(move || produce(file, chunk_size.max(1), &tx));
        Self { rx }
    }

    /// Block until the reader hands over its next chunk.
    pub fn next_chunk(&self) -> Chunk {
        match self.rx.recv() {
            Ok(Ok(data)) => Chunk::Data(data),
            Ok(Err(e)) => Chunk::Failed(e),
            // Reader dropped its sender: end of file.
            Err(_) => Chunk::Eof,
        }
    }
}

fn produce(mut file: File, chunk_size: usize, tx: &Sender<io::Result<Vec<u8>>>) {
    loop {
        let mut buf = vec![0u8; chunk_size];
        match read_full(&mut file, &mut buf) {
            Ok(0) => return,
            Ok(n) => {
                buf.truncate(n);
                if tx.send(Ok(buf)).is_err() {
                    // Consumer stopped early (mismatch or peer failure).
                    return;
                }
            }
            Err(e) => {
                let _ = tx.send(Err(e));
                return;
            }
        }
    }
}

/// Fill `buf` as far as the file allows.
///
/// A plain `read` may return short counts before EOF, which would make equal
/// files look different when chunks are compared pairwise.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
