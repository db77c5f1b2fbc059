//! HTTP client for the inference server
//!
//! Hand-rolled HTTP/1.1 over a TCP socket: one request per connection,
//! `Connection: close`, responses parsed with httparse and bodies decoded
//! with serde-json-core. Every request is bounded by the configured
//! timeout; a stuck server can only cost one poll interval.

use core::fmt::Write as _;
use core::net::IpAddr;

use defmt::{debug, warn};
use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::TcpSocket;
use embassy_net::Stack;
use embassy_time::{with_timeout, Duration};
use embedded_io_async::Write;
use heapless::String;

use phyllo_core::config::ServerConfig;
use phyllo_core::controller::UploadResponse;
use phyllo_core::result::AnalysisResult;

/// Errors from one HTTP exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum NetError {
    /// Host name did not resolve
    Dns,
    /// TCP connect failed
    Connect,
    /// Socket read/write failed mid-exchange
    Io,
    /// The request exceeded the configured timeout
    Timeout,
    /// Server answered with an unexpected status
    Status(u16),
    /// Response was not parseable HTTP/JSON
    Parse,
}

const TCP_BUFFER: usize = 1024;
const RESPONSE_BUFFER: usize = 2048;

/// POST the image; classify the server's answer for the controller
pub async fn upload(stack: Stack<'static>, server: &ServerConfig, image: &[u8]) -> UploadResponse {
    match upload_inner(stack, server, image).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Upload failed: {:?}", e);
            let mut reason: String<32> = String::new();
            let _ = match e {
                NetError::Status(code) => write!(reason, "status {code}"),
                NetError::Dns => write!(reason, "dns fail"),
                NetError::Connect => write!(reason, "connect fail"),
                NetError::Timeout => write!(reason, "resp timeout"),
                NetError::Io => write!(reason, "socket write"),
                NetError::Parse => write!(reason, "bad response"),
            };
            UploadResponse::Failed { reason }
        }
    }
}

async fn upload_inner(
    stack: Stack<'static>,
    server: &ServerConfig,
    image: &[u8],
) -> Result<UploadResponse, NetError> {
    let mut head: String<256> = String::new();
    write!(
        head,
        "POST {} HTTP/1.1\r\nHost: {}:{}\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        server.upload_path, server.host, server.port, image.len()
    )
    .map_err(|_| NetError::Io)?;

    let mut raw = [0u8; RESPONSE_BUFFER];
    let len = exchange(stack, server, head.as_bytes(), image, &mut raw).await?;
    let (code, body) = parse_response(&raw[..len])?;

    if code != 200 {
        return Err(NetError::Status(code));
    }

    // The body may carry the analysis synchronously, just a correlation
    // timestamp, or no JSON at all; all three are acceptable.
    match serde_json_core::from_slice::<AnalysisResult>(body) {
        Ok((result, _)) => {
            let has_analysis = !result.leaf_name.is_empty()
                || !result.disease.is_empty()
                || !result.solution.is_empty();
            if has_analysis {
                Ok(UploadResponse::Result(result))
            } else if result.timestamp.is_empty() {
                Ok(UploadResponse::Accepted { token: None })
            } else {
                Ok(UploadResponse::Accepted {
                    token: Some(result.timestamp),
                })
            }
        }
        Err(_) => {
            debug!("Upload response carried no JSON result");
            Ok(UploadResponse::Accepted { token: None })
        }
    }
}

/// GET the latest analysis result; `Ok(None)` when none is available yet
pub async fn fetch_result(
    stack: Stack<'static>,
    server: &ServerConfig,
) -> Result<Option<AnalysisResult>, NetError> {
    let mut head: String<256> = String::new();
    write!(
        head,
        "GET {} HTTP/1.1\r\nHost: {}:{}\r\nConnection: close\r\n\r\n",
        server.result_path, server.host, server.port
    )
    .map_err(|_| NetError::Io)?;

    let mut raw = [0u8; RESPONSE_BUFFER];
    let len = exchange(stack, server, head.as_bytes(), &[], &mut raw).await?;
    let (code, body) = parse_response(&raw[..len])?;

    match code {
        200 => {
            let (result, _) =
                serde_json_core::from_slice::<AnalysisResult>(body).map_err(|_| NetError::Parse)?;
            // An error marker deserializes to an empty result
            Ok((!result.is_empty()).then_some(result))
        }
        404 => Ok(None),
        other => Err(NetError::Status(other)),
    }
}

/// One bounded request/response exchange; returns bytes read
async fn exchange(
    stack: Stack<'static>,
    server: &ServerConfig,
    head: &[u8],
    body: &[u8],
    response: &mut [u8],
) -> Result<usize, NetError> {
    let timeout = Duration::from_millis(u64::from(server.request_timeout_ms));

    with_timeout(timeout, async {
        let address = resolve(stack, server.host.as_str()).await?;

        let mut rx_buffer = [0u8; TCP_BUFFER];
        let mut tx_buffer = [0u8; TCP_BUFFER];
        let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);

        socket
            .connect((address, server.port))
            .await
            .map_err(|_| NetError::Connect)?;

        socket.write_all(head).await.map_err(|_| NetError::Io)?;
        if !body.is_empty() {
            socket.write_all(body).await.map_err(|_| NetError::Io)?;
        }
        socket.flush().await.map_err(|_| NetError::Io)?;

        // Connection: close - read until EOF or the buffer is full
        let mut len = 0;
        loop {
            match socket.read(&mut response[len..]).await {
                Ok(0) => break,
                Ok(n) => {
                    len += n;
                    if len == response.len() {
                        break;
                    }
                }
                Err(_) => return Err(NetError::Io),
            }
        }

        socket.close();
        Ok(len)
    })
    .await
    .map_err(|_| NetError::Timeout)?
}

async fn resolve(stack: Stack<'static>, host: &str) -> Result<IpAddr, NetError> {
    if let Ok(address) = host.parse::<IpAddr>() {
        return Ok(address);
    }

    let addresses = stack
        .dns_query(host, DnsQueryType::A)
        .await
        .map_err(|_| NetError::Dns)?;
    addresses
        .first()
        .map(|a| IpAddr::from(*a))
        .ok_or(NetError::Dns)
}

/// Split a raw HTTP response into status code and body
fn parse_response(raw: &[u8]) -> Result<(u16, &[u8]), NetError> {
    let mut headers = [httparse::EMPTY_HEADER; 16];
    let mut response = httparse::Response::new(&mut headers);

    match response.parse(raw) {
        Ok(httparse::Status::Complete(body_start)) => {
            let code = response.code.ok_or(NetError::Parse)?;
            Ok((code, &raw[body_start..]))
        }
        _ => Err(NetError::Parse),
    }
}
