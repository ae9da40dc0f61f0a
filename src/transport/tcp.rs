//! TCP exchange with the rendering service.
//!
//! Every call owns exactly one connection:
//!
//! ```text
//! Idle ─► Connected ─► Sent ─► HeaderRead ─► BodyRead ─► Done
//!   └──────────┴─────────┴──────────┴────────────┴─────► Failed
//! ```
//!
//! The stream is dropped (and so closed) on every exit path. There is no
//! pooling and no retry; callers that want a retry call again.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use neutral_ipc_client::config::IpcConfig;
//! use neutral_ipc_client::protocol::{control, format, Record};
//! use neutral_ipc_client::transport::IpcClient;
//!
//! let client = IpcClient::new(Arc::new(IpcConfig::resolve()));
//! let request = Record::new(control::PARSE_TEMPLATE, format::JSON, "{}", format::TEXT, "hi")?;
//! let response = client.exchange(&request).await?;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::config::IpcConfig;
use crate::error::{IpcError, Result};
use crate::protocol::{Header, Record, HEADER_SIZE};

/// Client for one-shot request/response exchanges.
///
/// Holds no connection state between calls, so a single client can be used
/// from many tasks at once.
#[derive(Debug, Clone)]
pub struct IpcClient {
    config: Arc<IpcConfig>,
}

impl IpcClient {
    /// Create a client bound to the given settings.
    pub fn new(config: Arc<IpcConfig>) -> Self {
        Self { config }
    }

    /// Settings this client connects with.
    pub fn config(&self) -> &IpcConfig {
        &self.config
    }

    /// Send `request` and wait for the single response record.
    pub async fn exchange(&self, request: &Record) -> Result<Record> {
        let mut stream = self.connect().await?;
        let response = exchange_on(&mut stream, request, &self.config).await;
        trace!("Closing IPC connection to {}", self.config.addr());
        response
    }

    /// Connect within the configured timeout.
    async fn connect(&self) -> Result<TcpStream> {
        let addr = self.config.addr();
        let timeout = self.config.timeout;

        let stream = tokio::time::timeout(
            timeout,
            TcpStream::connect((self.config.host.as_str(), self.config.port)),
        )
        .await
        .map_err(|_| IpcError::ConnectTimeout {
            addr: addr.clone(),
            timeout,
        })??;

        debug!("IPC client connected to {}", addr);
        Ok(stream)
    }
}

/// Run one exchange over an already-connected stream.
///
/// Ordering is strict: write, header read, segment 1, segment 2. Each phase
/// is bounded by `config.timeout`.
pub async fn exchange_on<S>(stream: &mut S, request: &Record, config: &IpcConfig) -> Result<Record>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let timeout = config.timeout;

    let encoded = request.encode();
    with_deadline(timeout, "writing request", async {
        stream.write_all(&encoded).await?;
        stream.flush().await?;
        Ok::<_, IpcError>(())
    })
    .await?;
    trace!("Sent {} byte request", encoded.len());

    let mut header_bytes = [0u8; HEADER_SIZE];
    with_deadline(timeout, "reading response header", async {
        stream.read_exact(&mut header_bytes).await.map_err(eof_as_closed)?;
        Ok::<_, IpcError>(())
    })
    .await?;
    let header = Header::decode(&header_bytes)?;
    trace!(
        "Response header: control={} length1={} length2={}",
        header.control,
        header.length1,
        header.length2
    );

    let content1 = with_deadline(
        timeout,
        "reading response segment 1",
        read_content(stream, header.length1 as usize, config.buffer_size),
    )
    .await?;
    let content2 = with_deadline(
        timeout,
        "reading response segment 2",
        read_content(stream, header.length2 as usize, config.buffer_size),
    )
    .await?;

    Record::decode(&header_bytes, content1, content2)
}

/// Read exactly `length` bytes in chunks of at most `buffer_size`.
///
/// A zero length returns immediately without touching the reader. Memory
/// grows one chunk at a time, so a bogus length costs nothing until bytes
/// actually arrive. Premature EOF fails with [`IpcError::ConnectionClosed`].
pub async fn read_content<R>(reader: &mut R, length: usize, buffer_size: usize) -> Result<Bytes>
where
    R: AsyncRead + Unpin,
{
    if length == 0 {
        return Ok(Bytes::new());
    }

    let chunk_size = buffer_size.max(1);
    let mut content = BytesMut::new();
    let mut remaining = length;

    while remaining > 0 {
        let n = chunk_size.min(remaining);
        let start = content.len();
        content.reserve(n);
        content.resize(start + n, 0);
        reader
            .read_exact(&mut content[start..])
            .await
            .map_err(eof_as_closed)?;
        remaining -= n;
        trace!("Read {} byte chunk, {} remaining", n, remaining);
    }

    Ok(content.freeze())
}

async fn with_deadline<T, F>(timeout: Duration, phase: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| IpcError::Timeout(phase))?
}

fn eof_as_closed(e: std::io::Error) -> IpcError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        IpcError::ConnectionClosed
    } else {
        IpcError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{control, encode_record, format};

    fn config_with_buffer(buffer_size: usize) -> IpcConfig {
        IpcConfig {
            buffer_size,
            timeout: Duration::from_secs(2),
            ..IpcConfig::default()
        }
    }

    #[tokio::test]
    async fn test_read_content_chunking_is_transparent() {
        let buffer_size = 8;
        for length in [0usize, 1, buffer_size, buffer_size + 1, 5 * buffer_size + 3] {
            let body: Vec<u8> = (0..length).map(|i| (i % 251) as u8).collect();

            let mut one_shot: &[u8] = &body;
            let whole = read_content(&mut one_shot, length, usize::MAX).await.unwrap();

            let mut chunked: &[u8] = &body;
            let pieces = read_content(&mut chunked, length, buffer_size).await.unwrap();

            assert_eq!(whole, pieces, "length {}", length);
            assert_eq!(&pieces[..], &body[..]);
        }
    }

    #[tokio::test]
    async fn test_read_content_zero_length_does_not_read() {
        let mut reader: &[u8] = b"untouched";
        let content = read_content(&mut reader, 0, 4).await.unwrap();

        assert!(content.is_empty());
        assert_eq!(reader, b"untouched");
    }

    #[tokio::test]
    async fn test_read_content_stops_at_length() {
        let mut reader: &[u8] = b"abcdefgh";
        let content = read_content(&mut reader, 5, 2).await.unwrap();

        assert_eq!(&content[..], b"abcde");
        assert_eq!(reader, b"fgh");
    }

    #[tokio::test]
    async fn test_read_content_premature_eof() {
        let mut reader: &[u8] = b"abc";
        let result = read_content(&mut reader, 10, 4).await;

        assert!(matches!(result, Err(IpcError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_read_content_huge_declared_length_then_eof() {
        let mut reader: &[u8] = b"abc";
        let result = read_content(&mut reader, u32::MAX as usize, 8192).await;

        assert!(matches!(result, Err(IpcError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_exchange_on_bogus_segment_length() {
        let (mut client, mut server) = tokio::io::duplex(64);
        let config = config_with_buffer(8192);

        tokio::spawn(async move {
            let mut sink = vec![0u8; HEADER_SIZE + 2];
            server.read_exact(&mut sink).await.unwrap();
            let header = Header::new(control::STATUS_OK, format::JSON, u32::MAX, format::TEXT, u32::MAX);
            server.write_all(&header.encode()).await.unwrap();
            server.write_all(b"{}").await.unwrap();
        });

        let request = Record::new(control::PARSE_TEMPLATE, format::JSON, "{}", format::TEXT, "").unwrap();
        let result = exchange_on(&mut client, &request, &config).await;

        assert!(matches!(result, Err(IpcError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_read_content_across_partial_writes() {
        let (mut client, mut server) = tokio::io::duplex(3);

        let writer = tokio::spawn(async move {
            let pieces: [&[u8]; 4] = [b"he", b"llo ", b"wor", b"ld"];
            for piece in pieces {
                server.write_all(piece).await.unwrap();
            }
        });

        let content = read_content(&mut client, 11, 4).await.unwrap();
        assert_eq!(&content[..], b"hello world");
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_exchange_on_duplex() {
        let (mut client, mut server) = tokio::io::duplex(64);
        let config = config_with_buffer(4);

        let service = tokio::spawn(async move {
            let mut header = [0u8; HEADER_SIZE];
            server.read_exact(&mut header).await.unwrap();
            let header = Header::decode(&header).unwrap();
            let mut body = vec![0u8; header.content_len() as usize];
            server.read_exact(&mut body).await.unwrap();

            let response = encode_record(
                control::STATUS_OK,
                format::JSON,
                "{\"status_code\":\"200\"}",
                format::TEXT,
                "<h1>Hello</h1>",
            )
            .unwrap();
            server.write_all(&response).await.unwrap();
            (header, body)
        });

        let request = Record::new(control::PARSE_TEMPLATE, format::JSON, "{}", format::PATH, "/t.ntpl").unwrap();
        let response = exchange_on(&mut client, &request, &config).await.unwrap();

        assert_eq!(response.control(), control::STATUS_OK);
        assert_eq!(response.content1_text(), "{\"status_code\":\"200\"}");
        assert_eq!(response.content2_text(), "<h1>Hello</h1>");

        let (sent_header, sent_body) = service.await.unwrap();
        assert_eq!(sent_header.control, control::PARSE_TEMPLATE);
        assert_eq!(sent_body, b"{}/t.ntpl");
    }

    #[tokio::test]
    async fn test_exchange_on_truncated_header() {
        let (mut client, mut server) = tokio::io::duplex(64);
        let config = config_with_buffer(4);

        tokio::spawn(async move {
            let mut sink = vec![0u8; HEADER_SIZE + 2];
            server.read_exact(&mut sink).await.unwrap();
            server.write_all(&[0u8; 5]).await.unwrap();
            // dropping `server` closes the stream
        });

        let request = Record::new(control::PARSE_TEMPLATE, format::JSON, "{}", format::TEXT, "").unwrap();
        let result = exchange_on(&mut client, &request, &config).await;

        assert!(matches!(result, Err(IpcError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_exchange_on_read_deadline() {
        let (mut client, mut server) = tokio::io::duplex(64);
        let config = IpcConfig {
            timeout: Duration::from_millis(50),
            ..IpcConfig::default()
        };

        let silent = tokio::spawn(async move {
            let mut sink = vec![0u8; HEADER_SIZE];
            server.read_exact(&mut sink).await.unwrap();
            tokio::time::sleep(Duration::from_millis(500)).await;
            drop(server);
        });

        let request = Record::new(control::PARSE_TEMPLATE, format::JSON, "", format::TEXT, "").unwrap();
        let result = exchange_on(&mut client, &request, &config).await;

        assert!(matches!(result, Err(IpcError::Timeout("reading response header"))));
        silent.abort();
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Bind then drop to get a port nothing is listening on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = IpcClient::new(Arc::new(IpcConfig {
            port,
            ..IpcConfig::default()
        }));
        let request = Record::new(control::PARSE_TEMPLATE, format::JSON, "{}", format::TEXT, "x").unwrap();

        assert!(matches!(client.exchange(&request).await, Err(IpcError::Io(_))));
    }
}
