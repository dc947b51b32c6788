use thiserror::Error;

use crate::models::DialogState;

/// A single raw answer failed its field validator. The conversation stays in
/// the same state and echoes `message` back to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FieldValidationError {
    pub message: String,
}

impl FieldValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisclaimerError {
    /// The creative schema gate rejected the parameter set. Carries the
    /// message of the first failing rule.
    #[error("{0}")]
    Validation(String),

    /// The city passed validation but the registry has no entity for it.
    #[error("Город '{0}' не найден в списке доступных городов")]
    UnknownEntity(String),
}

impl From<FieldValidationError> for DisclaimerError {
    fn from(err: FieldValidationError) -> Self {
        DisclaimerError::Validation(err.message)
    }
}

pub type DisclaimerResult<T> = Result<T, DisclaimerError>;

/// Input that no handler of the current state accepts. The session is reset
/// to idle; the process keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    #[error("unrecognized interaction {input:?} in state {state:?}")]
    UnrecognizedInteraction { state: DialogState, input: String },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid PORT value: {0}")]
    InvalidPort(String),

    #[error("Invalid ADMIN_IDS entry: {0}")]
    InvalidAdminId(String),
}

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Telegram request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse Telegram response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Telegram API error: {0}")]
    Api(String),

    #[error("Attachment is not valid base64: {0}")]
    Attachment(#[from] base64::DecodeError),
}
