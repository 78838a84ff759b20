//! Test client.
//!
//! Speaks the line protocol over a real TCP connection and asserts on the
//! lines it gets back.

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

/// A test client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;

        // Split stream for reading and writing
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }

    /// Send one command line (newline appended).
    pub async fn send(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Send raw bytes as-is.
    #[allow(dead_code)]
    pub async fn send_bytes(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Close our write side; the server sees end of stream.
    #[allow(dead_code)]
    pub async fn shutdown_write(&mut self) -> anyhow::Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }

    /// Receive a single line.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive a line with a timeout. End of stream is an error.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("connection closed");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Receive a line and assert it equals `expected`.
    pub async fn expect(&mut self, expected: &str) {
        match self.recv().await {
            Ok(line) => assert_eq!(line, expected),
            Err(e) => panic!("expected {expected:?}, got error: {e}"),
        }
    }

    /// Send a command and assert on the single reply.
    pub async fn roundtrip(&mut self, line: &str, expected: &str) {
        self.send(line).await.expect("send failed");
        self.expect(expected).await;
    }

    /// Assert the server closes the connection without sending anything else.
    #[allow(dead_code)]
    pub async fn expect_closed(&mut self) {
        let mut line = String::new();
        let n = timeout(Duration::from_secs(5), self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for close")
            .unwrap_or(0);
        assert_eq!(n, 0, "expected close, got line {line:?}");
    }

    /// LOGIN and expect success.
    pub async fn login(&mut self, user: &str, pass: &str) {
        self.roundtrip(&format!("LOGIN {user} {pass}"), "Login successful!")
            .await;
    }

    /// Connect and log in.
    #[allow(dead_code)]
    pub async fn logged_in(address: &str, user: &str, pass: &str) -> Self {
        let mut client = Self::connect(address).await.expect("Failed to connect");
        client.login(user, pass).await;
        client
    }

    /// Send EXIT and expect the closing notice.
    #[allow(dead_code)]
    pub async fn exit(&mut self) {
        self.roundtrip("EXIT", "Closing connection...").await;
    }
}
