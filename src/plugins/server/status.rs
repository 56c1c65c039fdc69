//! Java edition server-list-ping.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::format::strip_colors;
use super::ServerError;
use crate::shared::errors::BotResult;

const PROTOCOL_VERSION: i32 = 47;
const NEXT_STATE_STATUS: i32 = 1;
const MAX_FRAME: i32 = 2 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerStatus {
    pub version: String,
    pub online: u32,
    pub max: u32,
    pub sample: Vec<String>,
    pub motd: String,
    pub latency_ms: u64,
}

impl ServerStatus {
    pub fn summary(&self) -> String {
        let mut out = format!(
            "🟢 Server is online\nVersion: {}\nPlayers: {}/{}\nLatency: {} ms",
            self.version, self.online, self.max, self.latency_ms
        );
        if !self.motd.is_empty() {
            out.push_str(&format!("\nMOTD: {}", self.motd));
        }
        out
    }
}

#[async_trait]
pub trait StatusProbe: Send + Sync {
    async fn status(&self) -> BotResult<ServerStatus>;
}

// ============================================================================
// VarInt framing
// ============================================================================

pub fn write_varint(buf: &mut Vec<u8>, value: i32) {
    let mut value = value as u32;
    loop {
        if value & !0x7F == 0 {
            buf.push(value as u8);
            return;
        }
        buf.push(((value & 0x7F) | 0x80) as u8);
        value >>= 7;
    }
}

pub async fn read_varint<R: AsyncRead + Unpin>(reader: &mut R) -> Result<i32, ServerError> {
    let mut value: u32 = 0;
    for shift in 0..5 {
        let byte = reader.read_u8().await?;
        value |= ((byte & 0x7F) as u32) << (7 * shift);
        if byte & 0x80 == 0 {
            return Ok(value as i32);
        }
    }
    Err(ServerError::Malformed("VarInt too long".to_string()))
}

fn write_string(buf: &mut Vec<u8>, text: &str) {
    write_varint(buf, text.len() as i32);
    buf.extend_from_slice(text.as_bytes());
}

/// Prefixes a packet id and payload with its VarInt length.
fn frame(packet_id: i32, payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(payload.len() + 1);
    write_varint(&mut body, packet_id);
    body.extend_from_slice(payload);

    let mut out = Vec::with_capacity(body.len() + 5);
    write_varint(&mut out, body.len() as i32);
    out.extend_from_slice(&body);
    out
}

pub fn handshake_packet(host: &str, port: u16) -> Vec<u8> {
    let mut payload = Vec::new();
    write_varint(&mut payload, PROTOCOL_VERSION);
    write_string(&mut payload, host);
    payload.extend_from_slice(&port.to_be_bytes());
    write_varint(&mut payload, NEXT_STATE_STATUS);
    frame(0x00, &payload)
}

/// Reads one frame and returns `(packet id, remaining payload)`.
async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<(i32, Vec<u8>), ServerError> {
    let length = read_varint(reader).await?;
    if length <= 0 || length > MAX_FRAME {
        return Err(ServerError::Malformed(format!("bad frame length {}", length)));
    }
    let mut body = vec![0u8; length as usize];
    reader.read_exact(&mut body).await?;

    let mut cursor: &[u8] = &body;
    let packet_id = read_varint(&mut cursor).await?;
    Ok((packet_id, cursor.to_vec()))
}

// ============================================================================
// Status JSON
// ============================================================================

#[derive(Deserialize)]
struct StatusJson {
    version: VersionJson,
    players: PlayersJson,
    #[serde(default)]
    description: serde_json::Value,
}

#[derive(Deserialize)]
struct VersionJson {
    name: String,
}

#[derive(Deserialize)]
struct PlayersJson {
    online: u32,
    max: u32,
    #[serde(default)]
    sample: Vec<SampleJson>,
}

#[derive(Deserialize)]
struct SampleJson {
    name: String,
}

/// Flattens a chat component (string, object with `text`/`extra`, or array).
pub fn flatten_motd(value: &serde_json::Value) -> String {
    fn walk(value: &serde_json::Value, out: &mut String) {
        match value {
            serde_json::Value::String(s) => out.push_str(s),
            serde_json::Value::Array(items) => items.iter().for_each(|v| walk(v, out)),
            serde_json::Value::Object(map) => {
                if let Some(text) = map.get("text") {
                    walk(text, out);
                }
                if let Some(extra) = map.get("extra") {
                    walk(extra, out);
                }
            }
            _ => {}
        }
    }

    let mut out = String::new();
    walk(value, &mut out);
    strip_colors(&out).trim().to_string()
}

pub fn parse_status(json: &str, latency_ms: u64) -> Result<ServerStatus, ServerError> {
    let parsed: StatusJson =
        serde_json::from_str(json).map_err(|e| ServerError::Malformed(format!("status JSON: {}", e)))?;

    Ok(ServerStatus {
        version: parsed.version.name,
        online: parsed.players.online,
        max: parsed.players.max,
        sample: parsed.players.sample.into_iter().map(|p| p.name).collect(),
        motd: flatten_motd(&parsed.description),
        latency_ms,
    })
}

// ============================================================================
// Client
// ============================================================================

#[derive(Debug, Clone)]
pub struct PingClient {
    host: String,
    port: u16,
    timeout: Duration,
}

impl PingClient {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    pub async fn ping(&self) -> Result<ServerStatus, ServerError> {
        tokio::time::timeout(self.timeout, self.exchange())
            .await
            .map_err(|_| ServerError::Timeout(self.timeout))?
    }

    async fn exchange(&self) -> Result<ServerStatus, ServerError> {
        let mut stream = TcpStream::connect((self.host.as_str(), self.port)).await?;

        stream.write_all(&handshake_packet(&self.host, self.port)).await?;
        stream.write_all(&frame(0x00, &[])).await?;
        stream.flush().await?;

        let (packet_id, payload) = read_frame(&mut stream).await?;
        if packet_id != 0x00 {
            return Err(ServerError::Malformed(format!("unexpected packet {:#x}", packet_id)));
        }
        let mut cursor: &[u8] = &payload;
        let json_len = read_varint(&mut cursor).await?;
        if json_len < 0 || json_len as usize > cursor.len() {
            return Err(ServerError::Malformed("status string overruns frame".to_string()));
        }
        let json = String::from_utf8_lossy(&cursor[..json_len as usize]).into_owned();

        let started = Instant::now();
        let token = chrono::Utc::now().timestamp_millis();
        stream.write_all(&frame(0x01, &token.to_be_bytes())).await?;
        stream.flush().await?;
        let (pong_id, _) = read_frame(&mut stream).await?;
        if pong_id != 0x01 {
            return Err(ServerError::Malformed(format!("unexpected packet {:#x}", pong_id)));
        }
        let latency_ms = started.elapsed().as_millis() as u64;

        parse_status(&json, latency_ms)
    }
}

#[async_trait]
impl StatusProbe for PingClient {
    async fn status(&self) -> BotResult<ServerStatus> {
        let status = self.ping().await.map_err(|e| {
            tracing::warn!(target: "server", "Status ping to {}:{} failed: {}", self.host, self.port, e);
            e
        })?;
        Ok(status)
    }
}
