//! Unix-socket [`CommandSource`] implementation.
//!
//! Binds a Unix stream socket and accepts one connection at a time.
//! Each line received is parsed as a JSON-encoded [`Command`], handed to the
//! splitter, and answered with one JSON-encoded [`DispatchResult`] line.
//!
//! # Wire format
//!
//! Every message is a single line of JSON followed by `\n`:
//!
//! ```json
//! {"Workspace":"3"}
//! {"CycleWorkspaces":"next"}
//! {"ChangeMonitorSilent":"l"}
//! "GrabRogueWindows"
//! ```
//!
//! and every answer is
//!
//! ```json
//! {"success":false,"error":"Invalid cycle value: 0"}
//! ```

use crate::command::{Command, DispatchResult, Request};
use crate::traits::CommandSource;
use log::{debug, error, info};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// A [`CommandSource`] that listens on a Unix stream socket for
/// JSON-encoded commands.
///
/// Each accepted connection can send multiple newline-delimited JSON
/// commands.  When the connection closes, the listener waits for the
/// next one.
pub struct UnixSocketListener {
    path: PathBuf,
}

/// Errors produced by the Unix socket listener.
#[derive(Debug, thiserror::Error)]
pub enum UnixSocketError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Whether the listener keeps serving after a connection ends.
enum Flow {
    Continue,
    Stop,
}

impl UnixSocketListener {
    /// Create a new listener bound to `path`.
    ///
    /// The socket file is created when [`run`](CommandSource::run) is called
    /// and removed when the source shuts down.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serve one client until it disconnects.
    fn serve(&self, stream: UnixStream, sink: &mpsc::Sender<Request>) -> Result<Flow, UnixSocketError> {
        let mut writer = stream.try_clone()?;
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            let text = line?;
            if text.trim().is_empty() {
                continue;
            }
            let result = match serde_json::from_str::<Command>(&text) {
                Ok(command) => {
                    debug!("received {:?}", command);
                    let (reply_tx, reply_rx) = mpsc::channel();
                    let request = Request {
                        command,
                        reply: Some(reply_tx),
                    };
                    if sink.send(request).is_err() {
                        info!("sink closed, shutting down");
                        return Ok(Flow::Stop);
                    }
                    match reply_rx.recv() {
                        Ok(result) => result,
                        Err(_) => DispatchResult::err("request dropped without an answer"),
                    }
                }
                Err(e) => {
                    error!("bad command: {}: {}", text, e);
                    DispatchResult::err(UnixSocketError::from(e).to_string())
                }
            };
            let mut answer = serde_json::to_string(&result)?;
            answer.push('\n');
            writer.write_all(answer.as_bytes())?;
        }
        Ok(Flow::Continue)
    }
}

impl CommandSource for UnixSocketListener {
    type Error = UnixSocketError;

    /// Bind the socket and start accepting connections.
    ///
    /// This method **blocks** until the receiving end of `sink` goes away.
    /// Run it on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Request>) -> Result<(), Self::Error> {
        // Remove stale socket if present.
        let _ = std::fs::remove_file(&self.path);

        let listener = UnixListener::bind(&self.path)?;
        info!("listening on {}", self.path.display());

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    debug!("client connected");
                    match self.serve(stream, &sink) {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::Stop) => break,
                        Err(e) => error!("client error: {}", e),
                    }
                    debug!("client disconnected");
                }
                Err(e) => {
                    error!("accept error: {}", e);
                }
            }
        }
        let _ = std::fs::remove_file(&self.path);
        Ok(())
    }
}

//  Tests
