use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FieldValidationError;
use crate::models::geography;

pub type FieldResult<T> = Result<T, FieldValidationError>;

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2})\.([0-9]{2})\.([0-9]{2}|[0-9]{4})$").expect("date pattern compiles")
});

/// `DD.MM.YY` or `DD.MM.YYYY`. February allows up to 29 days in any year.
pub fn validate_date(text: &str) -> FieldResult<()> {
    if text.is_empty() {
        return Err(FieldValidationError::new("Дата не указана"));
    }

    let caps = DATE_PATTERN.captures(text).ok_or_else(|| {
        FieldValidationError::new(
            "Неверный формат даты. Используйте ДД.ММ.ГГ или ДД.ММ.ГГГГ (например, 31.12.24 или 31.12.2024)",
        )
    })?;

    let day: u32 = caps[1].parse().unwrap_or(0);
    let month: u32 = caps[2].parse().unwrap_or(0);

    if !(1..=12).contains(&month) {
        return Err(FieldValidationError::new("Месяц должен быть от 01 до 12"));
    }
    if !(1..=31).contains(&day) {
        return Err(FieldValidationError::new("День должен быть от 01 до 31"));
    }
    if matches!(month, 4 | 6 | 9 | 11) && day > 30 {
        return Err(FieldValidationError::new(format!(
            "В месяце {:02} не может быть {} дней",
            month, day
        )));
    }
    if month == 2 && day > 29 {
        return Err(FieldValidationError::new("В феврале не может быть больше 29 дней"));
    }

    Ok(())
}

/// Absent values pass; present values must be strictly positive.
pub fn validate_positive_number(value: Option<f64>, label: &str) -> FieldResult<()> {
    match value {
        Some(v) if v <= 0.0 || v.is_nan() => Err(FieldValidationError::new(format!(
            "{} должно быть положительным числом",
            label
        ))),
        _ => Ok(()),
    }
}

/// Absent values pass; present values must lie in `(0, 100]`.
pub fn validate_percentage(value: Option<f64>) -> FieldResult<()> {
    match value {
        Some(v) if !(v > 0.0 && v <= 100.0) => {
            Err(FieldValidationError::new("Процент должен быть от 0 до 100"))
        }
        _ => Ok(()),
    }
}

/// Parses `DD.MM.YY` / `DD.MM.YYYY` into a calendar date. Two-digit years
/// 00..=68 land in 2000s, 69..=99 in 1900s.
pub fn parse_flexible_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.split('.');
    let (day, month, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    if !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = match year.len() {
        2 => {
            let yy: i32 = year.parse().ok()?;
            if yy < 69 {
                2000 + yy
            } else {
                1900 + yy
            }
        }
        4 => year.parse().ok()?,
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Start must strictly precede end. Either side failing to parse as a real
/// calendar date is reported as a comparison failure.
pub fn validate_dates_order(start: &str, end: &str) -> FieldResult<()> {
    match (parse_flexible_date(start), parse_flexible_date(end)) {
        (Some(start), Some(end)) if start < end => Ok(()),
        (Some(_), Some(_)) => Err(FieldValidationError::new(
            "Дата начала должна быть раньше даты окончания",
        )),
        _ => Err(FieldValidationError::new("Ошибка при сравнении дат")),
    }
}

pub fn validate_city(city: &str) -> FieldResult<()> {
    if city.is_empty() {
        return Err(FieldValidationError::new("Город не указан"));
    }
    if !geography::registry().contains(city) {
        return Err(FieldValidationError::new(format!(
            "Город '{}' не найден в списке доступных городов",
            city
        )));
    }
    Ok(())
}

/// Shape of a raw answer typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Date,
    PositiveInteger,
    PositiveNumber,
    Percentage,
    City,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Number(f64),
    Text(String),
}

/// Parses and validates one raw answer.
pub fn validate_field(kind: FieldKind, raw: &str) -> FieldResult<FieldValue> {
    let text = raw.trim();
    match kind {
        FieldKind::Date => {
            validate_date(text)?;
            Ok(FieldValue::Text(text.to_string()))
        }
        FieldKind::PositiveInteger => match text.parse::<i64>() {
            Ok(n) if n > 0 => Ok(FieldValue::Integer(n)),
            _ => Err(FieldValidationError::new(
                "Пожалуйста, введите положительное целое число",
            )),
        },
        FieldKind::PositiveNumber => match parse_decimal(text) {
            Some(n) if n > 0.0 => Ok(FieldValue::Number(n)),
            _ => Err(FieldValidationError::new("Пожалуйста, введите положительное число")),
        },
        FieldKind::Percentage => {
            let n = parse_decimal(text)
                .ok_or_else(|| FieldValidationError::new("Пожалуйста, введите положительное число"))?;
            validate_percentage(Some(n))?;
            Ok(FieldValue::Number(n))
        }
        FieldKind::City => {
            validate_city(text)?;
            Ok(FieldValue::Text(geography::normalize_city_key(text)))
        }
        FieldKind::Text => {
            if text.is_empty() {
                return Err(FieldValidationError::new("Текст не может быть пустым"));
            }
            Ok(FieldValue::Text(text.to_string()))
        }
    }
}

/// Accepts both `12.5` and `12,5`.
fn parse_decimal(text: &str) -> Option<f64> {
    text.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: FieldResult<()>) -> String {
        result.unwrap_err().message
    }

    #[test]
    fn accepts_both_year_widths() {
        assert!(validate_date("31.12.24").is_ok());
        assert!(validate_date("31.12.2024").is_ok());
        assert!(validate_date("01.01.00").is_ok());
    }

    #[test]
    fn rejects_malformed_dates() {
        for bad in ["", "1.12.24", "31/12/24", "31.12.024", "31.12.24 ", "aa.bb.cc"] {
            assert!(validate_date(bad).is_err(), "{bad:?} should fail");
        }
        assert_eq!(message(validate_date("")), "Дата не указана");
    }

    #[test]
    fn month_and_day_bounds() {
        assert_eq!(message(validate_date("10.13.24")), "Месяц должен быть от 01 до 12");
        assert_eq!(message(validate_date("10.00.24")), "Месяц должен быть от 01 до 12");
        assert_eq!(message(validate_date("00.10.24")), "День должен быть от 01 до 31");
        assert_eq!(message(validate_date("32.01.24")), "День должен быть от 01 до 31");
        assert_eq!(message(validate_date("31.04.24")), "В месяце 04 не может быть 31 дней");
        assert!(validate_date("30.11.24").is_ok());
        assert!(validate_date("31.12.24").is_ok());
    }

    #[test]
    fn february_is_capped_at_29_regardless_of_leap_year() {
        assert!(validate_date("29.02.25").is_ok());
        assert!(validate_date("29.02.2023").is_ok());
        assert_eq!(
            message(validate_date("30.02.24")),
            "В феврале не может быть больше 29 дней"
        );
    }

    #[test]
    fn dates_order() {
        assert!(validate_dates_order("01.01.24", "01.01.25").is_ok());
        assert!(validate_dates_order("31.12.24", "01.01.2025").is_ok());
        assert_eq!(
            message(validate_dates_order("01.01.25", "01.01.24")),
            "Дата начала должна быть раньше даты окончания"
        );
        assert_eq!(
            message(validate_dates_order("01.01.24", "01.01.24")),
            "Дата начала должна быть раньше даты окончания"
        );
    }

    #[test]
    fn dates_order_reports_unparseable_side() {
        // Passes validate_date but is not a real calendar day.
        assert_eq!(
            message(validate_dates_order("29.02.25", "01.03.25")),
            "Ошибка при сравнении дат"
        );
        assert_eq!(message(validate_dates_order("soon", "01.03.25")), "Ошибка при сравнении дат");
    }

    #[test]
    fn two_digit_year_pivot() {
        assert_eq!(parse_flexible_date("01.01.68"), NaiveDate::from_ymd_opt(2068, 1, 1));
        assert_eq!(parse_flexible_date("01.01.69"), NaiveDate::from_ymd_opt(1969, 1, 1));
    }

    #[test]
    fn percentage_bounds() {
        assert!(validate_percentage(None).is_ok());
        assert!(validate_percentage(Some(100.0)).is_ok());
        assert!(validate_percentage(Some(0.5)).is_ok());
        assert!(validate_percentage(Some(0.0)).is_err());
        assert!(validate_percentage(Some(150.0)).is_err());
    }

    #[test]
    fn positive_number_names_the_field() {
        assert!(validate_positive_number(None, "Размер скидки").is_ok());
        assert_eq!(
            message(validate_positive_number(Some(-5.0), "Размер скидки")),
            "Размер скидки должно быть положительным числом"
        );
    }

    #[test]
    fn city_membership_ignores_case_and_whitespace() {
        assert!(validate_city("  Москва ").is_ok());
        assert!(validate_city("СПБ").is_ok());
        assert_eq!(message(validate_city("")), "Город не указан");
        assert_eq!(
            message(validate_city("Атлантис")),
            "Город 'Атлантис' не найден в списке доступных городов"
        );
    }

    #[test]
    fn raw_field_parsing() {
        assert_eq!(
            validate_field(FieldKind::PositiveNumber, "12,5").unwrap(),
            FieldValue::Number(12.5)
        );
        assert_eq!(
            validate_field(FieldKind::PositiveInteger, " 1000 ").unwrap(),
            FieldValue::Integer(1000)
        );
        assert!(validate_field(FieldKind::PositiveInteger, "0").is_err());
        assert!(validate_field(FieldKind::PositiveInteger, "1.5").is_err());
        assert!(validate_field(FieldKind::Percentage, "150").is_err());
        assert_eq!(
            validate_field(FieldKind::City, " Тула ").unwrap(),
            FieldValue::Text("тула".to_string())
        );
        assert!(validate_field(FieldKind::Text, "   ").is_err());
    }
}
