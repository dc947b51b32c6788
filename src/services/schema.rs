use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::error::{DisclaimerError, DisclaimerResult, FieldValidationError};
use crate::models::{CreativeFields, CreativeParams, CreativeType, DiscountUnit};
use crate::services::validators::{self, FieldKind, FieldResult, FieldValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    City,
    Channel,
    StartDate,
    EndDate,
    MaxDiscountAmount,
    AddDeliveryInfo,
    DeliveryInfoText,
    DiscountSize,
    DiscountUnit,
    FirstOrderOnly,
    SpecificCategory,
    MinOrderAmount,
    MaxPromoDiscount,
    UsageCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Required,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "check", content = "label")]
pub enum Check {
    KnownCity,
    /// Date format; the label prefixes the message at the final gate.
    Date(Option<&'static str>),
    Positive(&'static str),
    /// Unit is `%` or `₽`, then the size is bounded by that unit.
    UnitAndSize,
    PositiveCount,
    AfterStartDate,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub field: Field,
    pub presence: Presence,
    pub checks: &'static [Check],
}

#[derive(Debug, Serialize)]
pub struct CreativeSchema {
    pub creative_type: CreativeType,
    pub fields: &'static [FieldSpec],
    /// After city and channel, the gate checks every required presence
    /// before running the remaining checks.
    #[serde(skip)]
    pub presence_first: bool,
}

const CITY: FieldSpec = FieldSpec {
    field: Field::City,
    presence: Presence::Required,
    checks: &[Check::KnownCity],
};

const CHANNEL: FieldSpec = FieldSpec {
    field: Field::Channel,
    presence: Presence::Required,
    checks: &[],
};

const END_DATE: FieldSpec = FieldSpec {
    field: Field::EndDate,
    presence: Presence::Required,
    checks: &[Check::Date(None)],
};

static DYNAMIC_NEWCOMER: CreativeSchema = CreativeSchema {
    creative_type: CreativeType::DynamicNewcomer,
    presence_first: false,
    fields: &[CITY, CHANNEL, END_DATE],
};

static CLASSIC_NEWCOMER: CreativeSchema = CreativeSchema {
    creative_type: CreativeType::ClassicNewcomer,
    presence_first: false,
    fields: &[
        CITY,
        CHANNEL,
        END_DATE,
        FieldSpec {
            field: Field::MaxDiscountAmount,
            presence: Presence::Required,
            checks: &[Check::Positive("Максимальный размер скидки")],
        },
        FieldSpec {
            field: Field::AddDeliveryInfo,
            presence: Presence::Optional,
            checks: &[],
        },
        FieldSpec {
            field: Field::DeliveryInfoText,
            presence: Presence::Optional,
            checks: &[],
        },
    ],
};

static PROMO_CODE: CreativeSchema = CreativeSchema {
    creative_type: CreativeType::PromoCode,
    presence_first: false,
    fields: &[
        CITY,
        CHANNEL,
        END_DATE,
        FieldSpec {
            field: Field::DiscountSize,
            presence: Presence::Required,
            checks: &[],
        },
        FieldSpec {
            field: Field::DiscountUnit,
            presence: Presence::Required,
            checks: &[Check::UnitAndSize],
        },
        FieldSpec {
            field: Field::FirstOrderOnly,
            presence: Presence::Optional,
            checks: &[],
        },
        FieldSpec {
            field: Field::SpecificCategory,
            presence: Presence::Optional,
            checks: &[],
        },
        FieldSpec {
            field: Field::MinOrderAmount,
            presence: Presence::Optional,
            checks: &[Check::Positive("Минимальная сумма заказа")],
        },
        FieldSpec {
            field: Field::MaxPromoDiscount,
            presence: Presence::Optional,
            checks: &[Check::Positive("Максимальная скидка")],
        },
    ],
};

static CERTIFICATE: CreativeSchema = CreativeSchema {
    creative_type: CreativeType::Certificate,
    presence_first: false,
    fields: &[
        CITY,
        CHANNEL,
        END_DATE,
        FieldSpec {
            field: Field::UsageCount,
            presence: Presence::Required,
            checks: &[Check::PositiveCount],
        },
    ],
};

static VENDOR: CreativeSchema = CreativeSchema {
    creative_type: CreativeType::Vendor,
    presence_first: true,
    fields: &[
        CITY,
        CHANNEL,
        FieldSpec {
            field: Field::StartDate,
            presence: Presence::Required,
            checks: &[Check::Date(Some("Дата начала"))],
        },
        FieldSpec {
            field: Field::EndDate,
            presence: Presence::Required,
            checks: &[Check::Date(Some("Дата окончания")), Check::AfterStartDate],
        },
    ],
};

static IMAGE: CreativeSchema = CreativeSchema {
    creative_type: CreativeType::Image,
    presence_first: false,
    fields: &[CITY, CHANNEL],
};

static PRODUCT: CreativeSchema = CreativeSchema {
    creative_type: CreativeType::Product,
    presence_first: false,
    fields: &[CITY, CHANNEL],
};

pub fn schema_for(creative_type: CreativeType) -> &'static CreativeSchema {
    match creative_type {
        CreativeType::DynamicNewcomer => &DYNAMIC_NEWCOMER,
        CreativeType::ClassicNewcomer => &CLASSIC_NEWCOMER,
        CreativeType::PromoCode => &PROMO_CODE,
        CreativeType::Certificate => &CERTIFICATE,
        CreativeType::Image => &IMAGE,
        CreativeType::Product => &PRODUCT,
        CreativeType::Vendor => &VENDOR,
    }
}

impl CreativeSchema {
    pub fn spec(&self, field: Field) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|spec| spec.field == field)
    }

    pub fn position(&self, field: Field) -> Option<usize> {
        self.fields.iter().position(|spec| spec.field == field)
    }
}

impl Field {
    /// Presence as the final gate sees it. Zero numbers and empty strings
    /// count as missing.
    pub fn is_present(self, params: &CreativeParams) -> bool {
        let f = &params.fields;
        match self {
            Field::City => !params.city.is_empty(),
            Field::Channel => true,
            Field::StartDate => non_empty(&f.start_date),
            Field::EndDate => non_empty(&f.end_date),
            Field::MaxDiscountAmount => non_zero(f.max_discount_amount),
            Field::AddDeliveryInfo => f.add_delivery_info,
            Field::DeliveryInfoText => non_empty(&f.delivery_info_text),
            Field::DiscountSize => f.discount_size.is_some_and(|v| v != 0.0),
            Field::DiscountUnit => non_empty(&f.discount_unit),
            Field::FirstOrderOnly => f.first_order_only,
            Field::SpecificCategory => non_empty(&f.specific_category),
            Field::MinOrderAmount => non_zero(f.min_order_amount),
            Field::MaxPromoDiscount => non_zero(f.max_promo_discount),
            Field::UsageCount => non_zero(f.usage_count),
        }
    }

    pub fn required_message(self) -> &'static str {
        match self {
            Field::City => "Город не указан",
            Field::Channel => "Канал размещения не указан",
            Field::StartDate => "Дата начала обязательна",
            Field::EndDate => "Дата окончания обязательна",
            Field::MaxDiscountAmount => "Максимальный размер скидки обязателен",
            Field::DiscountSize => "Размер скидки обязателен",
            Field::DiscountUnit => "Единица измерения скидки должна быть % или ₽",
            Field::UsageCount => "Количество применений обязательно",
            Field::AddDeliveryInfo
            | Field::DeliveryInfoText
            | Field::FirstOrderOnly
            | Field::SpecificCategory
            | Field::MinOrderAmount
            | Field::MaxPromoDiscount => "Поле обязательно",
        }
    }

    /// Raw-text shape for fields typed by the user; `None` for fields picked
    /// from a choice set.
    pub fn kind(self) -> Option<FieldKind> {
        match self {
            Field::StartDate | Field::EndDate => Some(FieldKind::Date),
            Field::MaxDiscountAmount
            | Field::MinOrderAmount
            | Field::MaxPromoDiscount
            | Field::UsageCount => Some(FieldKind::PositiveInteger),
            Field::DiscountSize => Some(FieldKind::PositiveNumber),
            Field::DeliveryInfoText | Field::SpecificCategory => Some(FieldKind::Text),
            Field::City => Some(FieldKind::City),
            Field::Channel | Field::AddDeliveryInfo | Field::DiscountUnit | Field::FirstOrderOnly => {
                None
            }
        }
    }

    /// Stores a value produced by [`validators::validate_field`] for this field.
    pub fn assign(self, fields: &mut CreativeFields, value: FieldValue) {
        match (self, value) {
            (Field::StartDate, FieldValue::Text(s)) => fields.start_date = Some(s),
            (Field::EndDate, FieldValue::Text(s)) => fields.end_date = Some(s),
            (Field::DeliveryInfoText, FieldValue::Text(s)) => {
                fields.delivery_info_text = Some(s)
            }
            (Field::SpecificCategory, FieldValue::Text(s)) => fields.specific_category = Some(s),
            (Field::MaxDiscountAmount, FieldValue::Integer(n)) => {
                fields.max_discount_amount = Some(n)
            }
            (Field::MinOrderAmount, FieldValue::Integer(n)) => fields.min_order_amount = Some(n),
            (Field::MaxPromoDiscount, FieldValue::Integer(n)) => {
                fields.max_promo_discount = Some(n)
            }
            (Field::UsageCount, FieldValue::Integer(n)) => fields.usage_count = Some(n),
            (Field::DiscountSize, FieldValue::Number(n)) => fields.discount_size = Some(n),
            (Field::DiscountSize, FieldValue::Integer(n)) => fields.discount_size = Some(n as f64),
            (field, value) => {
                tracing::warn!(field = field.as_ref(), ?value, "value does not fit field, ignored")
            }
        }
    }

    /// Clears the field so it reads as missing again.
    pub fn clear(self, fields: &mut CreativeFields) {
        match self {
            Field::StartDate => fields.start_date = None,
            Field::EndDate => fields.end_date = None,
            Field::MaxDiscountAmount => fields.max_discount_amount = None,
            Field::AddDeliveryInfo => fields.add_delivery_info = false,
            Field::DeliveryInfoText => fields.delivery_info_text = None,
            Field::DiscountSize => fields.discount_size = None,
            Field::DiscountUnit => fields.discount_unit = None,
            Field::FirstOrderOnly => fields.first_order_only = false,
            Field::SpecificCategory => fields.specific_category = None,
            Field::MinOrderAmount => fields.min_order_amount = None,
            Field::MaxPromoDiscount => fields.max_promo_discount = None,
            Field::UsageCount => fields.usage_count = None,
            Field::City | Field::Channel => {}
        }
    }

    fn date_value(self, fields: &CreativeFields) -> Option<&str> {
        match self {
            Field::StartDate => fields.start_date.as_deref(),
            Field::EndDate => fields.end_date.as_deref(),
            _ => None,
        }
    }

    fn numeric_value(self, fields: &CreativeFields) -> Option<f64> {
        match self {
            Field::MaxDiscountAmount => fields.max_discount_amount.map(|v| v as f64),
            Field::MinOrderAmount => fields.min_order_amount.map(|v| v as f64),
            Field::MaxPromoDiscount => fields.max_promo_discount.map(|v| v as f64),
            Field::DiscountSize => fields.discount_size,
            Field::UsageCount => fields.usage_count.map(|v| v as f64),
            _ => None,
        }
    }
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}

fn non_zero(value: Option<i64>) -> bool {
    value.is_some_and(|v| v != 0)
}

impl Check {
    fn run(self, field: Field, params: &CreativeParams) -> FieldResult<()> {
        let f = &params.fields;
        match self {
            Check::KnownCity => validators::validate_city(&params.city),
            Check::Date(_) => match field.date_value(f) {
                Some(date) => validators::validate_date(date),
                None => Ok(()),
            },
            Check::Positive(label) => {
                validators::validate_positive_number(field.numeric_value(f), label)
            }
            Check::UnitAndSize => match f.unit() {
                Some(DiscountUnit::Percent) => validators::validate_percentage(f.discount_size),
                Some(DiscountUnit::Rubles) => {
                    validators::validate_positive_number(f.discount_size, "Размер скидки")
                }
                None => Err(FieldValidationError::new(Field::DiscountUnit.required_message())),
            },
            Check::PositiveCount => match f.usage_count {
                Some(n) if n <= 0 => Err(FieldValidationError::new(
                    "Количество применений должно быть целым положительным числом",
                )),
                _ => Ok(()),
            },
            Check::AfterStartDate => match (f.start_date.as_deref(), f.end_date.as_deref()) {
                (Some(start), Some(end)) => validators::validate_dates_order(start, end),
                _ => Ok(()),
            },
        }
    }

    fn gate_label(self) -> Option<&'static str> {
        match self {
            Check::Date(label) => label,
            _ => None,
        }
    }
}

/// Runs the checks attached to one field against a (possibly partial)
/// parameter set. Messages are the bare validator messages.
pub fn check_field(spec: &FieldSpec, params: &CreativeParams) -> FieldResult<()> {
    spec.checks.iter().try_for_each(|check| check.run(spec.field, params))
}

fn check_presence(spec: &FieldSpec, params: &CreativeParams) -> DisclaimerResult<()> {
    if spec.presence == Presence::Required && !spec.field.is_present(params) {
        return Err(DisclaimerError::Validation(
            spec.field.required_message().to_string(),
        ));
    }
    Ok(())
}

/// Final gate: every field of the type's schema in order, presence first,
/// then its checks. Stops at the first failure.
pub fn validate_params(params: &CreativeParams) -> DisclaimerResult<()> {
    let schema = schema_for(params.creative_type);

    let mut presence_checked = false;

    for spec in schema.fields {
        // City and channel are settled before any type-specific rule.
        if schema.presence_first && !presence_checked && !matches!(spec.field, Field::City | Field::Channel) {
            schema.fields.iter().try_for_each(|other| check_presence(other, params))?;
            presence_checked = true;
        }
        check_presence(spec, params)?;

        for check in spec.checks {
            if let Err(err) = check.run(spec.field, params) {
                let message = match check.gate_label() {
                    Some(label) => format!("{}: {}", label, err.message),
                    None => err.message,
                };
                return Err(DisclaimerError::Validation(message));
            }
        }
    }

    Ok(())
}
