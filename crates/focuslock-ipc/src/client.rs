//! IPC client implementation

use focuslock_api::{Command, Event, Request, Response, ResponsePayload, ResponseResult};
use focuslock_util::FocusError;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::debug;

use crate::{IpcError, IpcResult};

/// IPC Client for connecting to focuslockd
pub struct IpcClient {
    reader: BufReader<tokio::net::unix::OwnedReadHalf>,
    writer: tokio::net::unix::OwnedWriteHalf,
    next_request_id: u64,
}

impl IpcClient {
    /// Connect to focuslockd
    pub async fn connect(socket_path: impl AsRef<Path>) -> IpcResult<Self> {
        let stream = UnixStream::connect(socket_path).await?;
        let (read_half, write_half) = stream.into_split();

        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            next_request_id: 1,
        })
    }

    /// Send a command and wait for its response
    pub async fn send(&mut self, command: Command) -> IpcResult<Response> {
        let request_id = self.next_request_id;
        self.next_request_id += 1;

        let request = Request::new(request_id, command);
        let mut json = serde_json::to_string(&request)?;
        json.push('\n');

        self.writer.write_all(json.as_bytes()).await?;

        let mut line = String::new();
        loop {
            line.clear();
            let n = self.reader.read_line(&mut line).await?;
            if n == 0 {
                return Err(IpcError::ConnectionClosed);
            }

            match serde_json::from_str::<Response>(line.trim()) {
                Ok(response) if response.request_id == request_id => return Ok(response),
                // Rejected as malformed before it had an id
                Ok(response) if response.request_id == 0 => return Ok(response),
                Ok(response) => {
                    debug!(request_id = response.request_id, "Skipping stale response");
                }
                Err(e) => {
                    // Events interleave with responses on subscribed connections
                    if serde_json::from_str::<Event>(line.trim()).is_err() {
                        return Err(IpcError::Json(e));
                    }
                }
            }
        }
    }

    /// Send a command and unwrap the payload, rebuilding any server error
    pub async fn request(&mut self, command: Command) -> Result<ResponsePayload, FocusError> {
        let response = self.send(command).await?;
        match response.result {
            ResponseResult::Ok(payload) => Ok(payload),
            ResponseResult::Err(e) => Err(e.into_focus_error()),
        }
    }

    /// Subscribe to events and consume this client to return an event stream
    pub async fn subscribe(mut self) -> IpcResult<EventStream> {
        let response = self.send(Command::SubscribeEvents).await?;

        match response.result {
            ResponseResult::Ok(_) => {}
            ResponseResult::Err(e) => {
                return Err(IpcError::ServerError(e.message));
            }
        }

        Ok(EventStream {
            reader: self.reader,
            _writer: self.writer,
        })
    }
}

/// Stream of events from focuslockd
pub struct EventStream {
    reader: BufReader<tokio::net::unix::OwnedReadHalf>,
    // Dropping the write half would shut down our side of the connection
    _writer: tokio::net::unix::OwnedWriteHalf,
}

impl EventStream {
    /// Wait for the next event
    pub async fn next(&mut self) -> IpcResult<Event> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(IpcError::ConnectionClosed);
        }

        let event: Event = serde_json::from_str(line.trim())?;
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_to_missing_socket_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = IpcClient::connect(dir.path().join("missing.sock")).await;
        let err: FocusError = result.err().unwrap().into();
        assert_eq!(err, FocusError::ipc("focuslockd is not running"));
    }

    #[test]
    fn disconnects_are_told_apart_from_protocol_errors() {
        assert!(IpcError::ConnectionClosed.is_disconnect());
        assert!(IpcError::Io(std::io::ErrorKind::BrokenPipe.into()).is_disconnect());
        assert!(!IpcError::InvalidMessage("bad line".into()).is_disconnect());
        assert!(!IpcError::ServerError("denied".into()).is_disconnect());
    }
}
