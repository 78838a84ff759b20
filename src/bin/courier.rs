//! courier - interactive line client for courierd.
//!
//! Prints every line the server sends and forwards stdin lines. Two local
//! commands are handled here:
//!
//! - `UPLOAD <path>` sends `FILE <basename> <size>` followed by the file bytes
//! - `EXIT` is sent to the server, then the client quits

use anyhow::Context as _;
use courier_proto::{InboundLine, LineCodec};
use futures_util::StreamExt;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio_util::codec::FramedRead;

const DEFAULT_ADDRESS: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());

    let stream = TcpStream::connect(&address)
        .await
        .with_context(|| format!("failed to connect to {address}"))?;
    println!("Connected to {address}. Commands: LOGIN, SEND, MSG, UPLOAD <path>, EXIT");

    let (read_half, mut write_half) = stream.into_split();

    // Print server lines until the server closes the connection
    let printer = tokio::spawn(async move {
        let mut lines = FramedRead::new(read_half, LineCodec::new());
        while let Some(line) = lines.next().await {
            match line {
                Ok(InboundLine::Text(text)) => println!("{text}"),
                Ok(other) => println!("<unreadable line from server: {other:?}>"),
                Err(e) => {
                    eprintln!("read error: {e}");
                    break;
                }
            }
        }
        println!("Server closed the connection.");
    });

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = stdin.next_line().await? {
        let trimmed = line.trim();
        if printer.is_finished() {
            break;
        }

        if let Some(path) = strip_verb(trimmed, "UPLOAD") {
            if let Err(e) = upload(&mut write_half, Path::new(path)).await {
                eprintln!("upload failed: {e:#}");
            }
            continue;
        }

        write_half.write_all(trimmed.as_bytes()).await?;
        write_half.write_all(b"\n").await?;

        if trimmed.eq_ignore_ascii_case("EXIT") {
            break;
        }
    }

    // Let the final server lines print before exiting
    let _ = write_half.shutdown().await;
    let _ = printer.await;
    Ok(())
}

/// `UPLOAD path` → `Some("path")`, matching the verb case-insensitively.
fn strip_verb<'a>(line: &'a str, verb: &str) -> Option<&'a str> {
    let (head, rest) = line.split_once(char::is_whitespace)?;
    head.eq_ignore_ascii_case(verb).then(|| rest.trim())
}

async fn upload(writer: &mut OwnedWriteHalf, path: &Path) -> anyhow::Result<()> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("path has no usable file name")?;
    let mut file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("cannot open {}", path.display()))?;
    let size = file.metadata().await?.len();

    writer
        .write_all(format!("FILE {name} {size}\n").as_bytes())
        .await?;
    let sent = tokio::io::copy(&mut file, writer).await?;
    writer.flush().await?;

    println!("Sent {sent} bytes from {}", path.display());
    Ok(())
}
