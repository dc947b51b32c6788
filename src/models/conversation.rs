use serde::{Deserialize, Serialize};

use crate::models::{DialogState, FileAttachment};

/// One raw input from the transport: typed text (commands start with `/`)
/// or the token of a pressed button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Input {
    Text(String),
    Callback(String),
}

#[derive(Debug, Deserialize)]
pub struct ConversationRequest {
    pub text: Option<String>,
    pub callback: Option<String>,
}

impl ConversationRequest {
    pub fn into_input(self) -> Option<Input> {
        match (self.callback, self.text) {
            (Some(token), _) => Some(Input::Callback(token)),
            (None, Some(text)) => Some(Input::Text(text)),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub token: String,
    pub label: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

impl ChoiceOption {
    pub fn new(token: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            label: label.into(),
            selected: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Completed { disclaimers: Vec<CityText> },
    Failed { error: String },
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityText {
    pub city: String,
    pub text: String,
}

/// What the presentation layer should show after one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
    /// Buttons per row when rendered as a keyboard.
    pub columns: usize,
    pub state: DialogState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileAttachment>,
}

impl Reply {
    pub fn text(text: impl Into<String>, state: DialogState) -> Self {
        Self {
            text: text.into(),
            options: Vec::new(),
            columns: 1,
            state,
            outcome: None,
            file: None,
        }
    }

    pub fn with_options(mut self, options: Vec<ChoiceOption>, columns: usize) -> Self {
        self.options = options;
        self.columns = columns;
        self
    }

    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn with_file(mut self, file: FileAttachment) -> Self {
        self.file = Some(file);
        self
    }
}
