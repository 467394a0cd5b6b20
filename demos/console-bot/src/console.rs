//! A terminal transport: stdin lines in, stdout replies out.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use herald::prelude::*;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Lines starting with this are delivered as if another bot sent them.
const BOT_MARKER: &str = "bot:";

/// Reads one message per stdin line.
pub struct StdinSource {
    sink: Arc<StdoutSink>,
    closed: Arc<Notify>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl StdinSource {
    pub fn new(self_id: impl Into<String>) -> Self {
        Self {
            sink: Arc::new(StdoutSink {
                self_id: self_id.into(),
            }),
            closed: Arc::new(Notify::new()),
            reader: Mutex::new(None),
        }
    }

    /// Notified once stdin reaches end of file.
    pub fn closed(&self) -> Arc<Notify> {
        Arc::clone(&self.closed)
    }
}

#[async_trait]
impl MessageSource for StdinSource {
    fn name(&self) -> &str {
        "stdin"
    }

    async fn on_message(&self, dispatcher: MessageDispatcher) -> TransportResult<()> {
        let mut reader = self.reader.lock();
        if reader.is_some() {
            return Err(TransportError::NotAvailable {
                name: self.name().to_string(),
            });
        }

        let sink: BoxedSink = self.sink.clone();
        let closed = Arc::clone(&self.closed);
        *reader = Some(tokio::spawn(async move {
            let ids = AtomicU64::new(1);
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let id = ids.fetch_add(1, Ordering::Relaxed).to_string();
                        let message = match line.strip_prefix(BOT_MARKER) {
                            Some(text) => InboundMessage::new(id, "other-bot", text.trim_start())
                                .from_bot(true),
                            None => InboundMessage::new(id, "console", line),
                        };
                        debug!(id = %message.id, text = %message.text, "Read line");
                        dispatcher(message, Arc::clone(&sink));
                    }
                    Ok(None) => break,
                    Err(e) => {
                        error!(error = %e, "Failed to read stdin");
                        break;
                    }
                }
            }
            closed.notify_one();
        }));
        Ok(())
    }

    async fn shutdown(&self) -> TransportResult<()> {
        if let Some(reader) = self.reader.lock().take() {
            reader.abort();
        }
        Ok(())
    }
}

/// Prints replies, rendering code blocks as fenced text.
pub struct StdoutSink {
    self_id: String,
}

#[async_trait]
impl MessageSink for StdoutSink {
    fn self_id(&self) -> &str {
        &self.self_id
    }

    async fn reply(
        &self,
        message: &InboundMessage,
        content: &str,
        options: ReplyOptions,
    ) -> TransportResult<()> {
        println!("[reply to #{}]\n{}", message.id, options.render(content));
        Ok(())
    }
}
