use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CreativeType {
    DynamicNewcomer,
    ClassicNewcomer,
    PromoCode,
    Certificate,
    Image,
    Product,
    Vendor,
}

impl CreativeType {
    pub fn display_name(self) -> &'static str {
        match self {
            CreativeType::DynamicNewcomer => "Скидка новичка (динамическая)",
            CreativeType::ClassicNewcomer => "Скидка новичка (классическая)",
            CreativeType::PromoCode => "Промокод",
            CreativeType::Certificate => "Сертификат",
            CreativeType::Image => "Имиджевый креатив",
            CreativeType::Product => "Продуктовый креатив",
            CreativeType::Vendor => "Вендорский креатив",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChannelType {
    TvRadio,
    Other,
}

impl ChannelType {
    pub fn display_name(self) -> &'static str {
        match self {
            ChannelType::TvRadio => "ТВ/Радио (полная версия юр.лица)",
            ChannelType::Other => "Другие форматы (короткая версия)",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            ChannelType::TvRadio => "ТВ/Радио",
            ChannelType::Other => "Другие форматы",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum DiscountUnit {
    Percent,
    Rubles,
}

impl DiscountUnit {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "%" => Some(DiscountUnit::Percent),
            "₽" => Some(DiscountUnit::Rubles),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            DiscountUnit::Percent => "%",
            DiscountUnit::Rubles => "₽",
        }
    }
}

/// Optional creative fields. Which of them must be present is decided by the
/// creative schema, not by this type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreativeFields {
    pub end_date: Option<String>,
    pub start_date: Option<String>,

    pub max_discount_amount: Option<i64>,
    pub add_delivery_info: bool,
    pub delivery_info_text: Option<String>,

    pub discount_size: Option<f64>,
    pub discount_unit: Option<String>, // "%" | "₽"
    pub first_order_only: bool,
    pub specific_category: Option<String>,
    pub min_order_amount: Option<i64>,
    pub max_promo_discount: Option<i64>,

    pub usage_count: Option<i64>,
}

impl CreativeFields {
    pub fn unit(&self) -> Option<DiscountUnit> {
        self.discount_unit.as_deref().and_then(DiscountUnit::parse)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeParams {
    pub creative_type: CreativeType,
    #[serde(default)]
    pub city: String,
    pub channel: ChannelType,
    #[serde(flatten)]
    pub fields: CreativeFields,
}

impl CreativeParams {
    pub fn new(creative_type: CreativeType, city: impl Into<String>, channel: ChannelType) -> Self {
        Self {
            creative_type,
            city: city.into(),
            channel,
            fields: CreativeFields::default(),
        }
    }

    pub fn with_fields(mut self, fields: CreativeFields) -> Self {
        self.fields = fields;
        self
    }
}

/// Renders an amount without a trailing `.0` for whole numbers.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn type_tags_round_trip_through_strum_and_serde() {
        assert_eq!(CreativeType::from_str("promo_code").unwrap(), CreativeType::PromoCode);
        assert_eq!(CreativeType::DynamicNewcomer.as_ref(), "dynamic_newcomer");
        assert_eq!(ChannelType::from_str("tv_radio").unwrap(), ChannelType::TvRadio);

        let json = serde_json::to_string(&CreativeType::ClassicNewcomer).unwrap();
        assert_eq!(json, "\"classic_newcomer\"");
    }

    #[test]
    fn params_deserialize_flat() {
        let params: CreativeParams = serde_json::from_str(
            r#"{"creative_type":"promo_code","city":"москва","channel":"other",
                "end_date":"31.12.24","discount_size":20,"discount_unit":"%","first_order_only":true}"#,
        )
        .unwrap();

        assert_eq!(params.creative_type, CreativeType::PromoCode);
        assert_eq!(params.fields.discount_size, Some(20.0));
        assert_eq!(params.fields.unit(), Some(DiscountUnit::Percent));
        assert!(params.fields.first_order_only);
        assert!(params.fields.min_order_amount.is_none());
    }

    #[test]
    fn amounts_drop_trailing_zero() {
        assert_eq!(format_amount(20.0), "20");
        assert_eq!(format_amount(12.5), "12.5");
    }
}
