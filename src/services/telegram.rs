use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::TelegramError;
use crate::models::{ChoiceOption, FileAttachment, Reply};

/// Bot API limit for one text message, in characters.
pub const MESSAGE_LIMIT: usize = 4096;

#[derive(Serialize)]
struct SendMessageRequest {
    chat_id: i64,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<Value>,
}

#[derive(Serialize)]
struct AnswerCallbackRequest<'a> {
    callback_query_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramBot {
    client: Client,
    api_url: String,
}

impl TelegramBot {
    pub fn new(bot_token: &str, api_base: &str) -> Self {
        TelegramBot {
            client: Client::new(),
            api_url: format!("{}/bot{}", api_base.trim_end_matches('/'), bot_token),
        }
    }

    /// Sends `text` as HTML. The text is escaped here, so callers pass plain
    /// text. Returns the id of the sent message.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<Value>,
    ) -> Result<i64, TelegramError> {
        let request = SendMessageRequest {
            chat_id,
            text: html_escape(text),
            parse_mode: Some("HTML".to_string()),
            reply_markup: keyboard,
        };

        let url = format!("{}/sendMessage", self.api_url);
        let response_text = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?
            .text()
            .await?;

        let result = parse_response(&response_text)?;
        result
            .get("message_id")
            .and_then(Value::as_i64)
            .ok_or_else(|| TelegramError::Api("No message ID in response".to_string()))
    }

    pub async fn answer_callback_query(&self, callback_query_id: &str, text: Option<&str>) -> Result<(), TelegramError> {
        let request = AnswerCallbackRequest { callback_query_id, text };

        let url = format!("{}/answerCallbackQuery", self.api_url);
        let response_text = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?
            .text()
            .await?;

        parse_response(&response_text).map(|_| ())
    }

    pub async fn send_document(
        &self,
        chat_id: i64,
        file: &FileAttachment,
        caption: Option<&str>,
    ) -> Result<i64, TelegramError> {
        let bytes = B64.decode(&file.content_base64)?;

        let mut form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .part(
                "document",
                reqwest::multipart::Part::bytes(bytes)
                    .file_name(file.filename.clone())
                    .mime_str(&file.mime)?,
            );
        if let Some(caption) = caption {
            form = form.text("caption", caption.to_string());
        }

        let url = format!("{}/sendDocument", self.api_url);
        let response_text = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await?
            .text()
            .await?;

        let result = parse_response(&response_text)?;
        result
            .get("message_id")
            .and_then(Value::as_i64)
            .ok_or_else(|| TelegramError::Api("No message ID in response".to_string()))
    }

    /// Delivers a dialog reply: the text (split when it is too long, keyboard
    /// on the last part), then the attached file if there is one.
    pub async fn send_reply(&self, chat_id: i64, reply: &Reply) -> Result<(), TelegramError> {
        let chunks = split_message(&reply.text, MESSAGE_LIMIT);
        let last = chunks.len().saturating_sub(1);

        for (i, chunk) in chunks.iter().enumerate() {
            let keyboard = if i == last && !reply.options.is_empty() {
                Some(inline_keyboard(&reply.options, reply.columns))
            } else {
                None
            };
            let message_id = self.send_message(chat_id, chunk, keyboard).await?;
            debug!(chat_id, message_id, "reply sent");
        }

        if let Some(file) = &reply.file {
            self.send_document(chat_id, file, Some("Дисклеймеры по всем выбранным городам"))
                .await?;
        }
        Ok(())
    }
}

fn parse_response(body: &str) -> Result<Value, TelegramError> {
    let response: TelegramResponse = serde_json::from_str(body)?;

    if response.ok {
        Ok(response.result.unwrap_or(Value::Null))
    } else {
        Err(TelegramError::Api(
            response.description.unwrap_or_else(|| "unknown error".to_string()),
        ))
    }
}

/// Escapes the three characters Telegram's HTML mode treats specially.
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// `reply_markup` with `columns` buttons per row. Selected options get a
/// check mark.
pub fn inline_keyboard(options: &[ChoiceOption], columns: usize) -> Value {
    let rows: Vec<Vec<Value>> = options
        .chunks(columns.max(1))
        .map(|row| {
            row.iter()
                .map(|option| {
                    let label = if option.selected {
                        format!("✅ {}", option.label)
                    } else {
                        option.label.clone()
                    };
                    json!({ "text": label, "callback_data": option.token })
                })
                .collect()
        })
        .collect();

    json!({ "inline_keyboard": rows })
}

/// Splits on line boundaries so that every part has at most `limit`
/// characters. A single longer line is cut hard.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len > limit && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len > limit {
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(limit) {
                parts.push(piece.iter().collect());
            }
            continue;
        }
        current.push_str(line);
        current_len += line_len;
    }
    if !current.is_empty() || parts.is_empty() {
        parts.push(current);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html_special_characters() {
        assert_eq!(html_escape("ООО «Лавка» <b>&</b>"), "ООО «Лавка» &lt;b&gt;&amp;&lt;/b&gt;");
    }

    #[test]
    fn keyboard_rows_follow_columns() {
        let options = vec![
            ChoiceOption::new("a", "A"),
            ChoiceOption::new("b", "B").selected(true),
            ChoiceOption::new("c", "C"),
        ];
        let keyboard = inline_keyboard(&options, 2);
        let rows = keyboard["inline_keyboard"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1]["text"], "✅ B");
        assert_eq!(rows[0][1]["callback_data"], "b");
        assert_eq!(rows[1][0]["text"], "C");
    }

    #[test]
    fn long_messages_split_on_lines() {
        let text = "ab\ncd\nef";
        assert_eq!(split_message(text, 6), vec!["ab\ncd\n", "ef"]);
        assert_eq!(split_message("short", 10), vec!["short"]);
        assert_eq!(split_message("abcdef", 4), vec!["abcd", "ef"]);
        assert_eq!(split_message("", 4), vec![""]);
    }

    #[test]
    fn api_errors_carry_description() {
        let err = parse_response(r#"{"ok":false,"description":"Bad Request: chat not found"}"#).unwrap_err();
        assert!(matches!(err, TelegramError::Api(ref d) if d == "Bad Request: chat not found"));

        let ok = parse_response(r#"{"ok":true,"result":{"message_id":5}}"#).unwrap();
        assert_eq!(ok["message_id"], 5);
    }
}
