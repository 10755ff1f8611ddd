//! Telegram delivery and command polling.
//!
//! Two concerns share one client: outbound reports (fire-and-forget, a
//! delivery failure is logged and never fails the engine loop) and the
//! inbound command poller, which long-polls `getUpdates` on its own thread
//! and answers /start, /analyse, /status and /stats.

use serde::Deserialize;
use serde_json::json;
use sniper_core::sources::{Notifier, SourceError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";
const POLL_TIMEOUT_SECS: u64 = 30;

/// Bot commands the poller understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Analyse,
    Status,
    Stats,
}

/// Parse a message text into a command. Accepts the `/command@BotName`
/// form Telegram uses in group chats; anything else is ignored.
pub fn parse_command(text: &str) -> Option<Command> {
    let first = text.split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    let name = name.split('@').next()?;
    match name {
        "start" => Some(Command::Start),
        "analyse" | "analyze" => Some(Command::Analyse),
        "status" => Some(Command::Status),
        "stats" => Some(Command::Stats),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Clone)]
pub struct TelegramClient {
    client: reqwest::blocking::Client,
    base_url: String,
    token: String,
    chat_id: String,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, token, chat_id)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        // Long-poll timeout plus headroom
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 15))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.into(),
            token: token.into(),
            chat_id: chat_id.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, self.token)
    }

    pub fn send_message(&self, chat_id: &str, text: &str) -> Result<(), SourceError> {
        let resp = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&json!({"chat_id": chat_id, "text": text}))
            .send()
            .map_err(|e| SourceError::NetworkUnreachable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(SourceError::ProviderRejected(format!(
                "sendMessage returned HTTP {}",
                resp.status()
            )));
        }
        Ok(())
    }

    fn get_updates(&self, offset: i64) -> Result<UpdatesResponse, SourceError> {
        let url = format!(
            "{}?offset={offset}&timeout={POLL_TIMEOUT_SECS}",
            self.method_url("getUpdates")
        );
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| SourceError::NetworkUnreachable(e.to_string()))?;
        let updates: UpdatesResponse = resp
            .json()
            .map_err(|e| SourceError::ResponseFormatChanged(e.to_string()))?;
        if !updates.ok {
            return Err(SourceError::ProviderRejected(
                "getUpdates returned ok=false".into(),
            ));
        }
        Ok(updates)
    }
}

impl Notifier for TelegramClient {
    fn publish(&self, message: &str) {
        if let Err(e) = self.send_message(&self.chat_id, message) {
            tracing::warn!(error = %e, "failed to deliver telegram message");
        }
    }
}

/// Spawn the command poller thread. The handler runs on the poller thread
/// and its return value is sent back as the reply.
pub fn spawn_command_poller<F>(client: TelegramClient, handler: F) -> JoinHandle<()>
where
    F: Fn(Command) -> String + Send + 'static,
{
    thread::Builder::new()
        .name("sniper-telegram".into())
        .spawn(move || poll_loop(client, handler))
        .expect("failed to spawn telegram poller thread")
}

fn poll_loop<F>(client: TelegramClient, handler: F)
where
    F: Fn(Command) -> String,
{
    tracing::info!("telegram command poller started");
    let mut offset = 0i64;
    loop {
        let updates = match client.get_updates(offset) {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!(error = %e, "getUpdates failed, backing off");
                thread::sleep(Duration::from_secs(10));
                continue;
            }
        };

        for update in updates.result {
            offset = offset.max(update.update_id + 1);
            let Some(message) = update.message else {
                continue;
            };
            let Some(command) = message.text.as_deref().and_then(parse_command) else {
                continue;
            };
            tracing::info!(?command, chat = message.chat.id, "handling command");
            let reply = handler(command);
            if let Err(e) = client.send_message(&message.chat.id.to_string(), &reply) {
                tracing::warn!(error = %e, "failed to reply to command");
            }
        }
    }
}
