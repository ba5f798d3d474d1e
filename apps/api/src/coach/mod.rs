//! Chat coach: free-form conversation with Bridget, grounded on the user's
//! most recent entries.

pub mod handlers;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::interview::render_entries_for_prompt;
use crate::journal::models::JournalEntry;
use crate::llm_client::prompts::BRIDGET_SYSTEM;
use crate::llm_client::{ChatTurn, TextGenerator};

/// Recent entries shared with the coach.
const COACH_CONTEXT_ENTRIES: usize = 10;
/// Older turns beyond this are dropped before the call.
const MAX_HISTORY_TURNS: usize = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct CoachRequest {
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachReply {
    pub reply: String,
}

pub fn coach_system_instruction(entries: &[JournalEntry]) -> String {
    format!(
        "{BRIDGET_SYSTEM}\n\nThe user's recent achievements:\n{}",
        render_entries_for_prompt(entries, COACH_CONTEXT_ENTRIES)
    )
}

pub async fn reply(
    generator: &dyn TextGenerator,
    entries: &[JournalEntry],
    request: CoachRequest,
) -> Result<CoachReply, AppError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let skip = request.history.len().saturating_sub(MAX_HISTORY_TURNS);
    let mut turns: Vec<ChatTurn> = request
        .history
        .into_iter()
        .skip(skip)
        .filter(|t| !t.text.trim().is_empty())
        .collect();
    turns.push(ChatTurn::user(message));
    debug!("Coach call with {} turns", turns.len());

    let text = generator
        .generate(&coach_system_instruction(entries), &turns)
        .await?;
    Ok(CoachReply {
        reply: text.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::journal::store::tests::new_entry;
    use crate::llm_client::testing::{FailingGenerator, StubGenerator};

    #[tokio::test]
    async fn test_reply_includes_recent_entries_in_system() {
        let entries = vec![new_entry("Hackathon Win").into_entry("u1", Uuid::new_v4(), Utc::now())];
        let stub = StubGenerator::new(" Talk about the hackathon! ");
        let request = CoachRequest {
            history: vec![ChatTurn::user("hi"), ChatTurn::model("Hello!")],
            message: "What should I say first?".into(),
        };

        let reply = reply(&stub, &entries, request).await.unwrap();
        assert_eq!(reply.reply, "Talk about the hackathon!");
        let system = stub.last_system.lock().unwrap().clone().unwrap();
        assert!(system.contains("Bridget"));
        assert!(system.contains("Hackathon Win"));
    }

    #[tokio::test]
    async fn test_blank_message_rejected() {
        let stub = StubGenerator::new("unused");
        let request = CoachRequest {
            history: vec![],
            message: "  ".into(),
        };
        let err = reply(&stub, &[], request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_model_failure_surfaces() {
        let request = CoachRequest {
            history: vec![],
            message: "Help".into(),
        };
        let err = reply(&FailingGenerator, &[], request).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[test]
    fn test_chat_turn_roles_deserialize() {
        let turns: Vec<ChatTurn> =
            serde_json::from_str(r#"[{"role":"user","text":"a"},{"role":"model","text":"b"}]"#)
                .unwrap();
        assert_eq!(turns[1].role, crate::llm_client::ChatRole::Model);
    }
}
