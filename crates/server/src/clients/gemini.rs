//! Gemini `generateContent` client implementing the move-selector interface.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::Config;
use crate::selector::{MoveChoice, MoveQuery, MoveSelector, SelectorError};

/// Total prompts sent per selection, counting correction turns.
const MAX_ATTEMPTS: usize = 3;

pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .user_agent("LlmChess/1.0")
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap();
        Self {
            client,
            api_key: config.gemini_api_key.clone(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn generate(&self, model: &str, contents: &[Value]) -> Result<String, SelectorError> {
        let api_key = self.api_key.as_deref().ok_or(SelectorError::NotConfigured)?;

        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&json!({ "contents": contents }))
            .send()
            .await
            .map_err(|e| SelectorError::Http(format!("Request error: {e}")))?;

        if !resp.status().is_success() {
            return Err(SelectorError::Http(format!("HTTP {}", resp.status())));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| SelectorError::MalformedReply(format!("JSON parse error: {e}")))?;

        let text = body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| SelectorError::MalformedReply("no text candidate in reply".into()))?;

        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl MoveSelector for GeminiClient {
    /// Ask the model for a move, re-prompting with a correction when the
    /// reply is not in the legal set. After the last attempt the reply is
    /// returned as-is; the game service applies its deterministic fallback.
    async fn select_move(&self, query: &MoveQuery) -> Result<MoveChoice, SelectorError> {
        let mut contents = vec![user_turn(&initial_prompt(query))];
        let mut reply = String::new();

        for attempt in 1..=MAX_ATTEMPTS {
            reply = self.generate(&query.model_id, &contents).await?;
            tracing::info!("Model suggested move {:?} (attempt {attempt})", reply);

            if let Some(choice) = extract_choice(&reply, &query.legal_moves_uci) {
                return Ok(choice);
            }

            contents.push(model_turn(&reply));
            contents.push(user_turn(&correction_prompt(&reply, &query.legal_moves_uci)));
        }

        tracing::warn!("Model gave no legal move in {MAX_ATTEMPTS} attempts; last reply {:?}", reply);
        Ok(MoveChoice {
            uci: reply,
            reasoning: None,
        })
    }
}

fn user_turn(text: &str) -> Value {
    json!({ "role": "user", "parts": [{ "text": text }] })
}

fn model_turn(text: &str) -> Value {
    json!({ "role": "model", "parts": [{ "text": text }] })
}

fn side_to_move(fen: &str) -> &'static str {
    match fen.split_whitespace().nth(1) {
        Some("b") => "Black",
        _ => "White",
    }
}

fn initial_prompt(query: &MoveQuery) -> String {
    let side = side_to_move(&query.fen);
    format!(
        "You are a chess engine playing as {side}.\n\
         The current board state in FEN notation is:\n\
         {fen}\n\
         History of moves in UCI format: {history}\n\
         LEGAL MOVES available: {legal}\n\
         Your task is to select the best legal move for {side} from the list provided.\n\
         Respond *only* with the chosen move in UCI notation (e.g. 'g8f6', 'e7e5'). \
         Do not add any other text.",
        fen = query.fen,
        history = query.history_uci.join(" "),
        legal = query.legal_moves_uci.join(" "),
    )
}

fn correction_prompt(reply: &str, legal: &[String]) -> String {
    format!(
        "Your selected move '{reply}' is illegal or invalid. \
         Please choose a different move from these legal moves: {}\n\
         Respond *only* with the chosen move in UCI notation.",
        legal.join(" "),
    )
}

/// Find a legal move in the model's reply. The whole trimmed reply is the
/// common case; otherwise scan tokens so a chatty reply like "I will play
/// e7e5." still yields the move, with the full text kept as reasoning.
fn extract_choice(reply: &str, legal: &[String]) -> Option<MoveChoice> {
    let exact = reply.trim();
    if legal.iter().any(|m| m == exact) {
        return Some(MoveChoice {
            uci: exact.to_string(),
            reasoning: None,
        });
    }

    for token in reply.split_whitespace() {
        let token = token.trim_matches(|c: char| !c.is_ascii_alphanumeric());
        if legal.iter().any(|m| m == token) {
            return Some(MoveChoice {
                uci: token.to_string(),
                reasoning: Some(reply.to_string()),
            });
        }
    }

    None
}
