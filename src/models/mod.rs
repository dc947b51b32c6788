pub mod creative;
pub mod geography;
pub mod session;
pub mod conversation;
pub mod disclaimer;
pub mod telegram;

pub use creative::{format_amount, ChannelType, CreativeFields, CreativeParams, CreativeType, DiscountUnit};
pub use geography::{CityClass, CityRecord, LegalEntity};
pub use session::{ConversationSession, DialogState, Draft, Mode};
pub use conversation::{ChoiceOption, CityText, ConversationRequest, Input, Outcome, Reply};
pub use disclaimer::{
    BatchRequest,
    BatchResponse,
    CityInfo,
    DisclaimerResponse,
    FileAttachment,
    ValidateRequest,
};
pub use telegram::{CallbackQuery, TelegramChat, TelegramMessage, TelegramUpdate, TelegramUser};
