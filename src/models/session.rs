use serde::Serialize;

use crate::models::{ChannelType, CreativeFields, CreativeParams, CreativeType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Single,
    Batch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogState {
    Idle,
    ChoosingScenario,
    ChoosingType,
    ChoosingGeography,
    ChoosingMultipleGeography,
    ChoosingChannel,
    EnteringStartDate,
    EnteringEndDate,
    EnteringMaxDiscount,
    ChoosingDeliveryInfo,
    EnteringDeliveryText,
    EnteringDiscountSize,
    ChoosingDiscountUnit,
    ChoosingFirstOrder,
    ChoosingCategory,
    EnteringCategoryName,
    EnteringMinAmount,
    EnteringMaxDiscountPromo,
    EnteringUsageCount,
    Confirming,
}

/// Answers collected so far. Becomes a [`CreativeParams`] once type and
/// channel are known.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Draft {
    pub creative_type: Option<CreativeType>,
    pub city: Option<String>,
    /// Batch mode selection, in the order the cities were picked.
    pub cities: Vec<String>,
    pub channel: Option<ChannelType>,
    pub fields: CreativeFields,
}

impl Draft {
    /// Parameters for the checks and the generator. In batch mode the first
    /// selected city stands in for the single city.
    pub fn params(&self) -> Option<CreativeParams> {
        let city = self
            .city
            .clone()
            .or_else(|| self.cities.first().cloned())
            .unwrap_or_default();

        Some(CreativeParams {
            creative_type: self.creative_type?,
            city,
            channel: self.channel.unwrap_or(ChannelType::Other),
            fields: self.fields.clone(),
        })
    }
}

/// Per-user conversation. Mutated only by the state machine, one input at a
/// time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationSession {
    pub state: DialogState,
    pub mode: Mode,
    pub draft: Draft,
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationSession {
    pub fn new() -> Self {
        Self {
            state: DialogState::Idle,
            mode: Mode::Single,
            draft: Draft::default(),
        }
    }

    /// Drops collected data and returns to idle.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Drops collected data and starts over at type selection in `mode`.
    pub fn restart(&mut self, mode: Mode) {
        self.mode = mode;
        self.draft = Draft::default();
        self.state = DialogState::ChoosingType;
    }
}
