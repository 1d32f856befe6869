use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use crate::advisor::{self, ChatMessage};
use crate::client::DynGenAiClient;
use crate::config::ModelSettings;

/// First message of every session.
pub const CHAT_GREETING: &str = "爷爷奶奶、叔叔阿姨好！我是您的AI养生营养师。\
    关于日常饮食、降压降脂、或是某种菜怎么做更好，您都可以问我。我会尽力给您最实用的建议！";

/// Appended to the assistant turn when an exchange fails. Partial streamed
/// content is kept in front of it.
pub const CHAT_APOLOGY: &str = "哎呀，网络好像打了个盹，您可以再试一次吗？";

/// Observable state of the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSnapshot {
    pub history: Vec<ChatMessage>,
    pub busy: bool,
}

impl Default for ChatSnapshot {
    fn default() -> Self {
        Self {
            history: vec![ChatMessage::assistant(CHAT_GREETING)],
            busy: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty or whitespace-only input; nothing changed.
    Empty,
    /// An exchange was already in flight; nothing changed.
    Busy,
    /// The exchange ran to completion (the reply may be the apology).
    Completed,
}

/// Owns the message history and serializes one in-flight exchange at a time.
pub struct ChatOrchestrator {
    client: Arc<DynGenAiClient>,
    models: ModelSettings,
    state: watch::Sender<ChatSnapshot>,
}

impl ChatOrchestrator {
    pub fn new(client: Arc<DynGenAiClient>, models: ModelSettings) -> Self {
        let (state, _) = watch::channel(ChatSnapshot::default());
        Self {
            client,
            models,
            state,
        }
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.state.subscribe()
    }

    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let message = text.trim();
        if message.is_empty() {
            return SubmitOutcome::Empty;
        }

        let mut replay = Vec::new();
        let accepted = self.state.send_if_modified(|snapshot| {
            if snapshot.busy {
                return false;
            }
            replay = snapshot.history.clone();
            snapshot.history.push(ChatMessage::user(message));
            snapshot.history.push(ChatMessage::assistant(""));
            snapshot.busy = true;
            true
        });
        if !accepted {
            return SubmitOutcome::Busy;
        }

        match advisor::open_stream(self.client.as_ref(), &self.models, &replay, message).await {
            Ok(mut stream) => loop {
                match stream.next_chunk().await {
                    Some(Ok(chunk)) => {
                        self.state.send_modify(|snapshot| {
                            if let Some(reply) = snapshot.history.last_mut() {
                                reply.content.push_str(&chunk);
                            }
                        });
                    }
                    Some(Err(error)) => {
                        warn!(%error, "chat stream failed mid-reply");
                        self.apologize();
                        break;
                    }
                    None => break,
                }
            },
            Err(error) => {
                warn!(%error, "chat stream could not be opened");
                self.apologize();
            }
        }

        self.state.send_modify(|snapshot| snapshot.busy = false);
        SubmitOutcome::Completed
    }

    fn apologize(&self) {
        self.state.send_modify(|snapshot| {
            if let Some(reply) = snapshot.history.last_mut() {
                if !reply.content.is_empty() {
                    reply.content.push_str("\n\n");
                }
                reply.content.push_str(CHAT_APOLOGY);
            }
        });
    }
}
