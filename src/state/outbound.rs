//! Shared write half of a connection.

use courier_proto::{LineCodec, ProtocolError, Reply};
use futures_util::SinkExt;
use std::sync::Arc;
use tokio::io::AsyncWrite;
use tokio::sync::Mutex;
use tokio_util::codec::FramedWrite;

type LineWriter = FramedWrite<Box<dyn AsyncWrite + Send + Unpin>, LineCodec>;

/// Cloneable handle to a connection's outgoing line stream.
///
/// The Connection Handler and the session's Delivery Loop both write
/// through this. Each `send` holds the lock for one whole line, so lines
/// from the two writers never interleave.
#[derive(Clone)]
pub struct Outbound {
    writer: Arc<Mutex<LineWriter>>,
}

impl Outbound {
    pub fn new<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let writer: Box<dyn AsyncWrite + Send + Unpin> = Box::new(writer);
        Self {
            writer: Arc::new(Mutex::new(FramedWrite::new(writer, LineCodec::new()))),
        }
    }

    /// Write one reply line and flush it.
    pub async fn send(&self, reply: Reply) -> Result<(), ProtocolError> {
        self.writer.lock().await.send(reply.to_string()).await
    }

    /// Flush and shut down the write half.
    pub async fn close(&self) -> Result<(), ProtocolError> {
        SinkExt::<String>::close(&mut *self.writer.lock().await).await
    }
}
