//! Line-oriented stand-in for a chat network.
//!
//! Input lines are `[chat_id] text`; lines without a leading chat id come from the
//! configured default chat. Replies and broadcasts are written as `[chat_id] text`.

use crate::app::Dispatcher;
use crate::core::{MessageSender, SubscriberId};
use crate::utils::error::DeliveryError;
use async_trait::async_trait;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

pub struct ConsoleSender<W> {
    out: Mutex<W>,
}

impl<W> ConsoleSender<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl ConsoleSender<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> MessageSender for ConsoleSender<W> {
    async fn send_message(
        &self,
        recipient: SubscriberId,
        text: &str,
    ) -> std::result::Result<(), DeliveryError> {
        let mut out = self.out.lock().await;
        let framed = format!("[{}] {}\n", recipient, text);
        out.write_all(framed.as_bytes())
            .await
            .map_err(|e| delivery_error(recipient, e))?;
        out.flush().await.map_err(|e| delivery_error(recipient, e))
    }
}

fn delivery_error(recipient: SubscriberId, error: io::Error) -> DeliveryError {
    match error.kind() {
        // the reader went away, nobody is listening on this chat anymore
        io::ErrorKind::BrokenPipe => DeliveryError::Unreachable(recipient.0),
        _ => DeliveryError::Transport(error.to_string()),
    }
}

/// Splits an optional leading chat id off a console line.
pub fn parse_line(line: &str, default_chat_id: i64) -> (SubscriberId, &str) {
    let line = line.trim();
    if let Some((head, rest)) = line.split_once(char::is_whitespace) {
        if let Ok(id) = head.parse::<i64>() {
            return (SubscriberId(id), rest.trim_start());
        }
    }
    (SubscriberId(default_chat_id), line)
}

/// Reads commands until EOF or cancellation, one task per command.
pub async fn run_console<R>(
    input: R,
    dispatcher: Arc<Dispatcher>,
    sender: Arc<dyn MessageSender>,
    default_chat_id: i64,
    cancel: CancellationToken,
) where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut in_flight = JoinSet::new();

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            next = lines.next_line() => match next {
                Ok(Some(line)) => line,
                Ok(None) => {
                    tracing::info!("Console input closed");
                    break;
                }
                Err(e) => {
                    tracing::error!("❌ Failed to read console input: {}", e);
                    break;
                }
            },
        };

        if line.trim().is_empty() {
            continue;
        }

        let (from, text) = parse_line(&line, default_chat_id);
        let text = text.to_string();
        let dispatcher = Arc::clone(&dispatcher);
        let sender = Arc::clone(&sender);

        in_flight.spawn(async move {
            let reply = dispatcher.handle(from, &text).await;
            if let Err(e) = sender.send_message(from, &reply).await {
                tracing::warn!(chat = %from, "⚠️ Reply not delivered: {}", e);
            }
        });
    }

    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            tracing::error!("Command task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_with_chat_id() {
        let (id, text) = parse_line("42 /subscribe", 1);
        assert_eq!(id, SubscriberId(42));
        assert_eq!(text, "/subscribe");
    }

    #[test]
    fn test_parse_line_without_chat_id() {
        let (id, text) = parse_line("  2:67 osmanov ", 7);
        assert_eq!(id, SubscriberId(7));
        assert_eq!(text, "2:67 osmanov");

        let (id, text) = parse_line("-100123 /start", 7);
        assert_eq!(id, SubscriberId(-100123));
        assert_eq!(text, "/start");
    }

    #[tokio::test]
    async fn test_console_sender_frames_messages() {
        let sender = ConsoleSender::new(Vec::new());
        sender.send_message(SubscriberId(3), "hello").await.unwrap();

        assert_eq!(String::from_utf8(sender.into_inner()).unwrap(), "[3] hello\n");
    }

    struct FailingWriter(io::ErrorKind);

    impl AsyncWrite for FailingWriter {
        fn poll_write(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &[u8],
        ) -> std::task::Poll<io::Result<usize>> {
            std::task::Poll::Ready(Err(io::Error::from(self.0)))
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_console_sender_maps_write_errors() {
        let closed = ConsoleSender::new(FailingWriter(io::ErrorKind::BrokenPipe));
        assert_eq!(
            closed.send_message(SubscriberId(8), "hi").await,
            Err(DeliveryError::Unreachable(8))
        );

        let broken = ConsoleSender::new(FailingWriter(io::ErrorKind::PermissionDenied));
        assert!(matches!(
            broken.send_message(SubscriberId(8), "hi").await,
            Err(DeliveryError::Transport(_))
        ));
    }
}
