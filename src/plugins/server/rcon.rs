//! Minimal RCON client.
//!
//! Frames are `length | request id | type | body NUL | NUL`, all integers
//! little-endian i32, where `length` counts everything after itself.

use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use super::ServerError;
use crate::shared::errors::BotResult;

pub const PACKET_RESPONSE: i32 = 0;
pub const PACKET_COMMAND: i32 = 2;
pub const PACKET_AUTH_RESPONSE: i32 = 2;
pub const PACKET_LOGIN: i32 = 3;

const LOGIN_ID: i32 = 1;
const COMMAND_ID: i32 = 2;
/// id + type + two NUL terminators.
const MIN_LENGTH: i32 = 10;
const MAX_LENGTH: i32 = 4096 + MIN_LENGTH;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub id: i32,
    pub kind: i32,
    pub body: String,
}

impl Packet {
    pub fn new(id: i32, kind: i32, body: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            body: body.into(),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let body = self.body.as_bytes();
        let length = (body.len() as i32) + MIN_LENGTH;
        let mut buf = Vec::with_capacity(length as usize + 4);
        buf.extend_from_slice(&length.to_le_bytes());
        buf.extend_from_slice(&self.id.to_le_bytes());
        buf.extend_from_slice(&self.kind.to_le_bytes());
        buf.extend_from_slice(body);
        buf.extend_from_slice(&[0, 0]);
        buf
    }
}

pub async fn read_packet<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Packet, ServerError> {
    let length = reader.read_i32_le().await?;
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        return Err(ServerError::Malformed(format!("bad length {}", length)));
    }

    let mut payload = vec![0u8; length as usize];
    reader.read_exact(&mut payload).await?;

    let id = i32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
    let kind = i32::from_le_bytes([payload[4], payload[5], payload[6], payload[7]]);
    let body_end = payload.len() - 2;
    let body = String::from_utf8_lossy(&payload[8..body_end]).into_owned();

    Ok(Packet { id, kind, body })
}

pub async fn write_packet<W: AsyncWrite + Unpin>(writer: &mut W, packet: &Packet) -> Result<(), ServerError> {
    writer.write_all(&packet.encode()).await?;
    writer.flush().await?;
    Ok(())
}

/// Sends a command string to the server and returns its raw text reply.
#[async_trait]
pub trait RconExecutor: Send + Sync {
    async fn execute(&self, command: &str) -> BotResult<String>;
}

#[derive(Debug, Clone)]
pub struct RconClient {
    host: String,
    port: u16,
    password: String,
    timeout: Duration,
}

impl RconClient {
    pub fn new(host: impl Into<String>, port: u16, password: impl Into<String>, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            password: password.into(),
            timeout,
        }
    }

    /// Opens a connection, logs in, runs one command, and closes.
    pub async fn run(&self, command: &str) -> Result<String, ServerError> {
        tokio::time::timeout(self.timeout, self.exchange(command))
            .await
            .map_err(|_| ServerError::Timeout(self.timeout))?
    }

    async fn exchange(&self, command: &str) -> Result<String, ServerError> {
        let mut stream = TcpStream::connect((self.host.as_str(), self.port)).await?;

        write_packet(&mut stream, &Packet::new(LOGIN_ID, PACKET_LOGIN, self.password.as_str())).await?;
        loop {
            let reply = read_packet(&mut stream).await?;
            if reply.id == -1 {
                return Err(ServerError::AuthFailed);
            }
            if reply.kind == PACKET_AUTH_RESPONSE {
                break;
            }
        }

        write_packet(&mut stream, &Packet::new(COMMAND_ID, PACKET_COMMAND, command)).await?;
        let reply = read_packet(&mut stream).await?;
        if reply.kind != PACKET_RESPONSE {
            return Err(ServerError::Malformed(format!("unexpected packet type {}", reply.kind)));
        }

        Ok(reply.body)
    }
}

#[async_trait]
impl RconExecutor for RconClient {
    async fn execute(&self, command: &str) -> BotResult<String> {
        tracing::debug!(target: "server", command, "RCON command");
        let reply = self.run(command).await.map_err(|e| {
            tracing::warn!(target: "server", command, "RCON command failed: {}", e);
            e
        })?;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    /// Accepts one connection and answers like a Minecraft server would.
    async fn fake_server(password: &'static str, reply: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let login = read_packet(&mut socket).await.unwrap();
            assert_eq!(login.kind, PACKET_LOGIN);

            if login.body != password {
                write_packet(&mut socket, &Packet::new(-1, PACKET_AUTH_RESPONSE, "")).await.unwrap();
                return;
            }
            write_packet(&mut socket, &Packet::new(login.id, PACKET_AUTH_RESPONSE, "")).await.unwrap();

            let command = read_packet(&mut socket).await.unwrap();
            assert_eq!(command.kind, PACKET_COMMAND);
            let body = format!("{}: {}", command.body, reply);
            write_packet(&mut socket, &Packet::new(command.id, PACKET_RESPONSE, body)).await.unwrap();
        });

        port
    }

    #[test]
    fn test_packet_encoding_layout() {
        let bytes = Packet::new(7, PACKET_COMMAND, "seed").encode();

        assert_eq!(&bytes[0..4], &14i32.to_le_bytes());
        assert_eq!(&bytes[4..8], &7i32.to_le_bytes());
        assert_eq!(&bytes[8..12], &2i32.to_le_bytes());
        assert_eq!(&bytes[12..16], b"seed");
        assert_eq!(&bytes[16..], &[0, 0]);
    }

    #[tokio::test]
    async fn test_read_packet_rejects_short_length() {
        let mut bytes: &[u8] = &[4, 0, 0, 0, 1, 2, 3, 4];
        assert!(matches!(read_packet(&mut bytes).await, Err(ServerError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_run_command_against_fake_server() {
        let port = fake_server("hunter2", "ok").await;
        let client = RconClient::new("127.0.0.1", port, "hunter2", Duration::from_secs(5));

        let reply = client.run("list").await.unwrap();
        assert_eq!(reply, "list: ok");
    }

    #[tokio::test]
    async fn test_wrong_password_is_auth_failure() {
        let port = fake_server("hunter2", "ok").await;
        let client = RconClient::new("127.0.0.1", port, "wrong", Duration::from_secs(5));

        assert!(matches!(client.run("list").await, Err(ServerError::AuthFailed)));
    }
}
