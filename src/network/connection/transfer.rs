//! File-transfer mode.
//!
//! After `FILE` is accepted the connection stops reading lines and copies
//! raw bytes into the destination file. Bytes the line reader had already
//! buffered behind the FILE line belong to the file and are written first.
//!
//! With a declared size exactly that many bytes are consumed and the
//! connection goes back to command mode. Without one the copy runs until
//! end of stream, which also ends the connection.

use courier_proto::LineCodec;
use std::io;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;

/// Knobs for one transfer.
#[derive(Debug, Clone, Copy)]
pub(super) struct TransferLimits {
    pub chunk_size: usize,
    pub max_bytes: Option<u64>,
    pub idle: Option<Duration>,
}

/// How a transfer ended.
#[derive(Debug)]
pub(super) enum Outcome {
    /// Declared size reached; the connection can keep going.
    Complete { bytes: u64 },
    /// Undeclared transfer ran to end of stream (or a read error).
    StreamEnded { bytes: u64 },
    /// Stream ended before the declared size.
    Incomplete { bytes: u64, expected: u64 },
    /// Undeclared stream went past the size limit.
    TooLarge { bytes: u64, limit: u64 },
    IdleTimeout { bytes: u64 },
    Cancelled { bytes: u64 },
    /// Writing the file failed.
    Failed { bytes: u64, error: io::Error },
}

/// Copy the raw byte stream behind `reader` into `file`.
pub(super) async fn receive<R>(
    reader: &mut FramedRead<R, LineCodec>,
    file: &mut File,
    declared: Option<u64>,
    limits: TransferLimits,
    token: &CancellationToken,
) -> Outcome
where
    R: AsyncRead + Unpin,
{
    let mut sink = Sink {
        file,
        written: 0,
        max_bytes: limits.max_bytes,
    };

    // Bytes that arrived in the same read as the FILE line
    let buffered = reader.read_buffer_mut();
    let take = match declared {
        Some(size) => usize::try_from(size).unwrap_or(usize::MAX).min(buffered.len()),
        None => buffered.len(),
    };
    let head = buffered.split_to(take);
    reader.decoder_mut().reset();
    if !head.is_empty() {
        if let Err(outcome) = sink.write(&head).await {
            return outcome;
        }
    }

    let mut buf = vec![0u8; limits.chunk_size.max(1)];
    loop {
        let want = match declared {
            Some(size) => {
                let left = size - sink.written;
                if left == 0 {
                    break;
                }
                usize::try_from(left).unwrap_or(usize::MAX).min(buf.len())
            }
            None => buf.len(),
        };

        let read = tokio::select! {
            _ = token.cancelled() => return Outcome::Cancelled { bytes: sink.written },
            read = read_chunk(reader.get_mut(), &mut buf[..want], limits.idle) => read,
        };

        let n = match read {
            Some(Ok(0)) => return sink.ended(declared, None).await,
            Some(Ok(n)) => n,
            Some(Err(e)) => return sink.ended(declared, Some(e)).await,
            None => return Outcome::IdleTimeout { bytes: sink.written },
        };

        if let Err(outcome) = sink.write(&buf[..n]).await {
            return outcome;
        }
    }

    sink.finish().await
}

/// Read one chunk, giving up after `idle` without data. `None` = timed out.
async fn read_chunk<R>(reader: &mut R, buf: &mut [u8], idle: Option<Duration>) -> Option<io::Result<usize>>
where
    R: AsyncRead + Unpin,
{
    match idle {
        Some(limit) => tokio::time::timeout(limit, reader.read(buf)).await.ok(),
        None => Some(reader.read(buf).await),
    }
}

struct Sink<'a> {
    file: &'a mut File,
    written: u64,
    max_bytes: Option<u64>,
}

impl Sink<'_> {
    async fn write(&mut self, chunk: &[u8]) -> Result<(), Outcome> {
        let total = self.written + chunk.len() as u64;
        if let Some(limit) = self.max_bytes {
            if total > limit {
                return Err(Outcome::TooLarge {
                    bytes: total,
                    limit,
                });
            }
        }
        if let Err(error) = self.file.write_all(chunk).await {
            return Err(Outcome::Failed {
                bytes: self.written,
                error,
            });
        }
        self.written = total;
        Ok(())
    }

    /// The stream stopped delivering bytes (end of stream or read error).
    async fn ended(self, declared: Option<u64>, error: Option<io::Error>) -> Outcome {
        if let Some(e) = error {
            tracing::debug!(error = %e, "Read error during file transfer");
        }
        let bytes = self.written;
        match self.finish().await {
            Outcome::Complete { .. } => match declared {
                Some(expected) => Outcome::Incomplete { bytes, expected },
                None => Outcome::StreamEnded { bytes },
            },
            failed => failed,
        }
    }

    async fn finish(self) -> Outcome {
        match self.file.flush().await {
            Ok(()) => Outcome::Complete {
                bytes: self.written,
            },
            Err(error) => Outcome::Failed {
                bytes: self.written,
                error,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use tempfile::TempDir;
    use tokio::io::AsyncWriteExt;

    const LIMITS: TransferLimits = TransferLimits {
        chunk_size: 4,
        max_bytes: None,
        idle: None,
    };

    async fn dest(tmp: &TempDir) -> (std::path::PathBuf, File) {
        let path = tmp.path().join("out.bin");
        let file = File::create(&path).await.unwrap();
        (path, file)
    }

    #[tokio::test]
    async fn declared_transfer_uses_buffered_bytes_then_resumes_lines() {
        let tmp = TempDir::new().unwrap();
        let (path, mut file) = dest(&tmp).await;
        let (mut client, server) = tokio::io::duplex(1024);
        let mut reader = FramedRead::new(server, LineCodec::new());

        client.write_all(b"FILE out.bin 10\n0123456789MSG after\n").await.unwrap();
        assert!(reader.next().await.is_some());

        let outcome = receive(&mut reader, &mut file, Some(10), LIMITS, &CancellationToken::new()).await;
        assert!(matches!(outcome, Outcome::Complete { bytes: 10 }));
        assert_eq!(std::fs::read(&path).unwrap(), b"0123456789");

        let next = reader.next().await.unwrap().unwrap();
        assert_eq!(next, courier_proto::InboundLine::Text("MSG after".into()));
    }

    #[tokio::test]
    async fn undeclared_transfer_runs_to_eof() {
        let tmp = TempDir::new().unwrap();
        let (path, mut file) = dest(&tmp).await;
        let (mut client, server) = tokio::io::duplex(1024);
        let mut reader = FramedRead::new(server, LineCodec::new());

        client.write_all(b"FILE out.bin\nhello").await.unwrap();
        assert!(reader.next().await.is_some());
        client.write_all(b" world, in pieces").await.unwrap();
        drop(client);

        let outcome = receive(&mut reader, &mut file, None, LIMITS, &CancellationToken::new()).await;
        assert!(matches!(outcome, Outcome::StreamEnded { bytes: 22 }));
        assert_eq!(std::fs::read(&path).unwrap(), b"hello world, in pieces");
    }

    #[tokio::test]
    async fn short_stream_is_incomplete() {
        let tmp = TempDir::new().unwrap();
        let (path, mut file) = dest(&tmp).await;
        let (mut client, server) = tokio::io::duplex(1024);
        let mut reader = FramedRead::new(server, LineCodec::new());

        client.write_all(b"FILE out.bin 100\nabc").await.unwrap();
        assert!(reader.next().await.is_some());
        drop(client);

        let outcome = receive(&mut reader, &mut file, Some(100), LIMITS, &CancellationToken::new()).await;
        assert!(matches!(
            outcome,
            Outcome::Incomplete {
                bytes: 3,
                expected: 100
            }
        ));
        assert_eq!(std::fs::read(&path).unwrap(), b"abc");
    }

    #[tokio::test]
    async fn undeclared_stream_over_limit_is_cut_off() {
        let tmp = TempDir::new().unwrap();
        let (_path, mut file) = dest(&tmp).await;
        let (mut client, server) = tokio::io::duplex(1024);
        let mut reader = FramedRead::new(server, LineCodec::new());
        let limits = TransferLimits {
            max_bytes: Some(8),
            ..LIMITS
        };

        client.write_all(b"FILE out.bin\n").await.unwrap();
        assert!(reader.next().await.is_some());
        client.write_all(b"0123456789").await.unwrap();
        drop(client);

        let outcome = receive(&mut reader, &mut file, None, limits, &CancellationToken::new()).await;
        assert!(matches!(outcome, Outcome::TooLarge { limit: 8, .. }));
    }

    #[tokio::test]
    async fn idle_transfer_times_out() {
        let tmp = TempDir::new().unwrap();
        let (_path, mut file) = dest(&tmp).await;
        let (_client, server) = tokio::io::duplex(1024);
        let mut reader = FramedRead::new(server, LineCodec::new());
        let limits = TransferLimits {
            idle: Some(Duration::from_millis(50)),
            ..LIMITS
        };

        let outcome = receive(&mut reader, &mut file, Some(5), limits, &CancellationToken::new()).await;
        assert!(matches!(outcome, Outcome::IdleTimeout { bytes: 0 }));
    }

    #[tokio::test]
    async fn cancellation_stops_transfer() {
        let tmp = TempDir::new().unwrap();
        let (_path, mut file) = dest(&tmp).await;
        let (_client, server) = tokio::io::duplex(1024);
        let mut reader = FramedRead::new(server, LineCodec::new());
        let token = CancellationToken::new();
        token.cancel();

        let outcome = receive(&mut reader, &mut file, None, LIMITS, &token).await;
        assert!(matches!(outcome, Outcome::Cancelled { bytes: 0 }));
    }
}
