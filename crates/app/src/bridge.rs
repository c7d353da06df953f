//! Newline-delimited JSON transport to the host environment.
//!
//! The extension side drives this binary over stdin/stdout in a
//! native-messaging style: one JSON value per line. Three kinds of messages
//! arrive on the same stream — host replies (tagged `reply`), selection
//! events (tagged `event`), and UI commands (tagged `cmd`). Commands that
//! arrive while a host reply is pending are queued, never dropped.
//!
//! Logging must go to stderr; stdout belongs to the protocol.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tokio::sync::Mutex;

use tabcap_capture::host::{BrowserHost, HostError, HostReply, HostRequest, TabInfo};
use tabcap_capture::selector::{SelectionEvent, SelectionOutcome, SelectionSession, SessionStep};
use tabcap_core::record::ImageRef;

use crate::session::SessionSnapshot;

/// A workflow command from the UI surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum UiCommand {
    Screenshot,
    Thumbnail,
    Save,
    RefreshUrl,
    Status,
}

/// What the binary sends back to the UI after each command.
#[derive(Clone, Debug, Serialize)]
pub struct UiNotice {
    pub ok: bool,
    pub message: String,
    pub session: SessionSnapshot,
}

/// Any message the far side may send.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Incoming {
    Reply(HostReply),
    Event(SelectionEvent),
    Command(UiCommand),
}

struct Io<R, W> {
    reader: R,
    writer: W,
    queued: VecDeque<UiCommand>,
}

impl<R, W> Io<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn send<T: Serialize>(&mut self, value: &T) -> Result<(), HostError> {
        let mut line = serde_json::to_string(value)
            .map_err(|err| HostError::Transport(format!("encoding outgoing message: {err}")))?;
        line.push('\n');
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|err| HostError::Transport(format!("writing to host: {err}")))?;
        self.writer
            .flush()
            .await
            .map_err(|err| HostError::Transport(format!("flushing to host: {err}")))
    }

    /// Read the next well-formed message; `None` on EOF. Unparsable lines
    /// are logged and skipped.
    async fn read_incoming(&mut self) -> Result<Option<Incoming>, HostError> {
        let mut line = String::new();
        loop {
            line.clear();
            let n = self
                .reader
                .read_line(&mut line)
                .await
                .map_err(|err| HostError::Transport(format!("reading from host: {err}")))?;
            if n == 0 {
                return Ok(None);
            }
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(incoming) => return Ok(Some(incoming)),
                Err(err) => {
                    tracing::warn!(%err, line = line.trim(), "skipping unparsable message");
                }
            }
        }
    }

    /// Send a request and wait for the matching reply, queueing commands and
    /// ignoring stray events seen in the meantime.
    async fn request(&mut self, request: &HostRequest) -> Result<HostReply, HostError> {
        self.send(request).await?;
        loop {
            match self.read_incoming().await? {
                None => return Err(HostError::Transport("host closed the stream".into())),
                Some(Incoming::Reply(HostReply::Error { message })) => {
                    return Err(HostError::Transport(message))
                }
                Some(Incoming::Reply(reply)) => return Ok(reply),
                Some(Incoming::Command(cmd)) => self.queued.push_back(cmd),
                Some(Incoming::Event(_)) => {
                    tracing::warn!("ignoring selection event outside a selection")
                }
            }
        }
    }
}

/// [`BrowserHost`] over a pair of line-oriented JSON streams.
pub struct JsonBridge<R, W> {
    io: Mutex<Io<R, W>>,
}

/// The production bridge: stdin/stdout.
pub type StdioBridge = JsonBridge<BufReader<Stdin>, Stdout>;

impl JsonBridge<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> JsonBridge<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            io: Mutex::new(Io {
                reader,
                writer,
                queued: VecDeque::new(),
            }),
        }
    }

    /// Next UI command, in arrival order; `None` once the stream closes.
    pub async fn next_command(&self) -> Result<Option<UiCommand>, HostError> {
        let mut io = self.io.lock().await;
        if let Some(cmd) = io.queued.pop_front() {
            return Ok(Some(cmd));
        }
        loop {
            match io.read_incoming().await? {
                None => return Ok(None),
                Some(Incoming::Command(cmd)) => return Ok(Some(cmd)),
                Some(_) => tracing::warn!("ignoring host message outside an operation"),
            }
        }
    }

    /// Send a notice to the UI surface.
    pub async fn notify(&self, notice: &UiNotice) -> Result<(), HostError> {
        self.io.lock().await.send(notice).await
    }
}

fn unexpected(reply: &HostReply) -> HostError {
    HostError::Transport(format!("unexpected reply: {reply:?}"))
}

#[async_trait::async_trait]
impl<R, W> BrowserHost for JsonBridge<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn active_tab(&self) -> Result<TabInfo, HostError> {
        let mut io = self.io.lock().await;
        match io.request(&HostRequest::ActiveTab).await? {
            HostReply::ActiveTab { tab: Some(tab) } => Ok(tab),
            HostReply::ActiveTab { tab: None } => Err(HostError::NoActiveTab),
            other => Err(unexpected(&other)),
        }
    }

    async fn capture_visible_tab(&self, tab: &TabInfo) -> Result<ImageRef, HostError> {
        let mut io = self.io.lock().await;
        let request = HostRequest::CaptureVisibleTab {
            window_id: tab.window_id,
        };
        match io.request(&request).await? {
            HostReply::Captured { image } if image.is_empty() => Err(HostError::EmptyCapture),
            HostReply::Captured { image } => Ok(ImageRef::new(image)),
            other => Err(unexpected(&other)),
        }
    }

    async fn run_selection(&self, tab: &TabInfo) -> Result<SelectionOutcome, HostError> {
        let mut io = self.io.lock().await;

        let begin = HostRequest::BeginSelection { tab_id: tab.id };
        let mut session = match io.request(&begin).await? {
            HostReply::SelectionStarted { device_pixel_ratio } => {
                SelectionSession::new(device_pixel_ratio)
            }
            other => return Err(unexpected(&other)),
        };

        // Pump overlay events through the state machine until it resolves,
        // mirroring the live drag rectangle back so the overlay can draw it.
        let outcome = loop {
            match io.read_incoming().await? {
                None => return Err(HostError::Transport("host closed mid-selection".into())),
                Some(Incoming::Event(event)) => match session.handle(event) {
                    SessionStep::Pending(next) => {
                        if let Some((left, top, width, height)) = next.drag_rect() {
                            let draw = HostRequest::DrawSelection {
                                left,
                                top,
                                width,
                                height,
                            };
                            io.send(&draw).await?;
                        }
                        session = next;
                    }
                    SessionStep::Done(outcome) => break outcome,
                },
                Some(Incoming::Command(cmd)) => io.queued.push_back(cmd),
                Some(Incoming::Reply(reply)) => return Err(unexpected(&reply)),
            }
        };

        match io.request(&HostRequest::EndSelection { tab_id: tab.id }).await? {
            HostReply::SelectionEnded => Ok(outcome),
            other => Err(unexpected(&other)),
        }
    }

    async fn open_url(&self, url: &str) -> Result<(), HostError> {
        let mut io = self.io.lock().await;
        let request = HostRequest::OpenUrl { url: url.into() };
        match io.request(&request).await? {
            HostReply::Opened => Ok(()),
            other => Err(unexpected(&other)),
        }
    }
}
