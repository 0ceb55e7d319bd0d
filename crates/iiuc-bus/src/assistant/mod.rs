//! Chat assistant that answers bus questions from the timetable.

mod responder;

pub use responder::{generate_response, greeting, Reply, DEVELOPER_BIO};

use crate::schedule::ScheduleRecord;
use crate::settings::AssistantSettings;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// One message in the chat transcript.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub is_bot: bool,
    pub timestamp: DateTime<Utc>,
    pub suggestions: Vec<String>,
}

impl ChatMessage {
    fn from_bot(reply: Reply) -> Self {
        let timestamp = Utc::now();
        Self {
            id: timestamp.timestamp_millis().to_string(),
            text: reply.text,
            is_bot: true,
            timestamp,
            suggestions: reply.suggestions,
        }
    }
}

/// Answers messages after a short "typing" pause.
#[derive(Debug, Clone)]
pub struct Assistant {
    delay: Duration,
    jitter: Duration,
}

impl Assistant {
    pub fn new(settings: &AssistantSettings) -> Self {
        Self {
            delay: Duration::from_millis(settings.delay_ms),
            jitter: Duration::from_millis(settings.jitter_ms),
        }
    }

    /// An assistant that answers immediately.
    pub fn instant() -> Self {
        Self {
            delay: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    pub fn greeting(&self) -> ChatMessage {
        ChatMessage::from_bot(greeting())
    }

    /// Waits for the thinking delay, then answers `message`.
    ///
    /// Returns `None` for a blank message.
    pub async fn respond(&self, message: &str, schedules: &[ScheduleRecord]) -> Option<ChatMessage> {
        if message.trim().is_empty() {
            return None;
        }

        let delay = self.thinking_delay();
        if !delay.is_zero() {
            debug!(delay_ms = delay.as_millis() as u64, "Assistant thinking");
            tokio::time::sleep(delay).await;
        }

        Some(ChatMessage::from_bot(generate_response(message, schedules)))
    }

    fn thinking_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.delay;
        }
        self.delay + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleDataset;

    #[test]
    fn test_thinking_delay_within_bounds() {
        let assistant = Assistant::new(&AssistantSettings {
            delay_ms: 1000,
            jitter_ms: 1000,
        });
        for _ in 0..50 {
            let delay = assistant.thinking_delay();
            assert!(delay >= Duration::from_millis(1000));
            assert!(delay <= Duration::from_millis(2000));
        }
    }

    #[tokio::test]
    async fn test_respond_rejects_blank() {
        let dataset = ScheduleDataset::bundled().unwrap();
        let assistant = Assistant::instant();
        assert!(assistant.respond("   ", dataset.records()).await.is_none());
    }

    #[tokio::test]
    async fn test_respond_answers() {
        let dataset = ScheduleDataset::bundled().unwrap();
        let assistant = Assistant::instant();
        let message = assistant
            .respond("Who is Anamul Haque?", dataset.records())
            .await
            .unwrap();
        assert!(message.is_bot);
        assert_eq!(message.text, DEVELOPER_BIO);
    }

    #[tokio::test]
    async fn test_respond_keeps_message_untrimmed() {
        let dataset = ScheduleDataset::bundled().unwrap();
        let assistant = Assistant::instant();
        let message = assistant.respond("7:00 ", dataset.records()).await.unwrap();
        assert!(message.text.starts_with("🕐 Found 6 bus(es) at 7:00 :"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_respond_waits_for_delay() {
        let dataset = ScheduleDataset::bundled().unwrap();
        let assistant = Assistant::new(&AssistantSettings {
            delay_ms: 1000,
            jitter_ms: 0,
        });
        let start = tokio::time::Instant::now();
        assistant.respond("hello", dataset.records()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }
}
