use tracing::{debug, error, info};

use crate::error::{DisclaimerError, DisclaimerResult};
use crate::models::{format_amount, geography, CreativeParams, CreativeType, DiscountUnit};
use crate::services::schema;

// Legal copy, reproduced character for character.
pub const LINK_MO: &str = "clck.ru/397gmg";
pub const LINK_CITIES: &str = "clck.ru/3Dq8fF";

pub const EXCLUDED_CATEGORIES: &str = "«Сертификаты», «Магазин Яндекса» и «Магазины по пути»";
pub const PROMO_EXCLUDED: &str = "«Магазин Яндекса», «Товары для взрослых», «Сертификаты», «Молочные смеси», товары с доставкой «По пути», «Аптеки»";
pub const NO_COMBINATION: &str = "Не суммируется с другими акциями.";
pub const CERTIFICATE_RULE: &str = "Если номинал сертификата покрывает полностью стоимость заказа, то сумма каждой единицы товара, оплачиваемых пользователем, с учетом скидки будет равна 1 (одному) рублю.";
pub const CERTIFICATE_LINK: &str = "https://yandex.ru/legal/promocode_eda/";
pub const LIMITED_QUANTITY: &str = "Количество товаров ограничено.";
pub const DELIVERY_NOT_INCLUDED: &str = "Не применяется на стоимость доставки и упаковки.";
pub const DEFAULT_DELIVERY_INFO: &str = "Три бесплатные доставки в пешей и одна в авто зоне. Доставку осуществляют партнеры Яндекс Еды.";

/// One city's disclaimer in a batch.
pub type CityDisclaimer = (String, String);

/// Validates `params` against the creative schema and composes the text.
pub fn generate(params: &CreativeParams) -> DisclaimerResult<String> {
    if let Err(err) = schema::validate_params(params) {
        info!(
            creative_type = params.creative_type.as_ref(),
            city = %params.city,
            error = %err,
            "creative parameters rejected"
        );
        return Err(err);
    }

    let entity = geography::resolve_entity(&params.city, params.channel).map_err(|err| {
        error!(city = %params.city, "city passed validation but has no legal entity");
        err
    })?;

    let text = compose(params, entity);
    debug!(creative_type = params.creative_type.as_ref(), city = %params.city, "disclaimer generated");
    Ok(text)
}

/// Generates the same creative for every city, in the given order. The
/// first failure aborts the whole batch and no partial output is returned.
pub fn generate_batch(params: &CreativeParams, cities: &[String]) -> DisclaimerResult<Vec<CityDisclaimer>> {
    if cities.is_empty() {
        return Err(DisclaimerError::Validation("Город не указан".to_string()));
    }

    let mut city_params = params.clone();
    cities
        .iter()
        .map(|city| {
            city_params.city = city.clone();
            generate(&city_params).map(|text| (city.clone(), text))
        })
        .collect()
}

fn compose(params: &CreativeParams, entity: &str) -> String {
    let f = &params.fields;
    let end_date = f.end_date.as_deref().unwrap_or_default();

    match params.creative_type {
        CreativeType::DynamicNewcomer => format!(
            "Акция действует до {}. Не распространяется на категории {}. Подробности - {}. {}.",
            end_date, EXCLUDED_CATEGORIES, LINK_MO, entity
        ),
        CreativeType::ClassicNewcomer => format!(
            "Акция действует до {} (максимальный размер скидки - {} руб.). Не распространяется на категории {}. Подробности - {}. {}{}",
            end_date,
            f.max_discount_amount.unwrap_or_default(),
            EXCLUDED_CATEGORIES,
            LINK_CITIES,
            delivery_clause(f.add_delivery_info, f.delivery_info_text.as_deref()),
            entity
        ),
        CreativeType::PromoCode => {
            let unit = f.unit();
            let mut discount = format!(
                "скидка {}{}",
                format_amount(f.discount_size.unwrap_or_default()),
                unit.map(DiscountUnit::symbol).unwrap_or_default()
            );
            let conditions = promo_conditions(
                f.first_order_only,
                f.specific_category.as_deref(),
                f.min_order_amount,
                f.max_promo_discount,
                unit,
            );
            if !conditions.is_empty() {
                discount.push(' ');
                discount.push_str(&conditions);
            }
            format!(
                "До {} {}. Не применяется к товарам из разделов {}. {} {}",
                end_date, discount, PROMO_EXCLUDED, NO_COMBINATION, entity
            )
        }
        CreativeType::Certificate => format!(
            "Сертификат действует до {}. Количество применений сертификата - не более {} раз в пределах номинала сертификата. {} Подробные условия применения - {}. {} {}",
            end_date,
            f.usage_count.unwrap_or_default(),
            CERTIFICATE_RULE,
            CERTIFICATE_LINK,
            DELIVERY_NOT_INCLUDED,
            entity
        ),
        CreativeType::Image => entity.to_string(),
        CreativeType::Product => format!("{} {}", LIMITED_QUANTITY, entity),
        CreativeType::Vendor => format!(
            "Акция действует с {} по {}. {} {}",
            f.start_date.as_deref().unwrap_or_default(),
            end_date,
            LIMITED_QUANTITY,
            entity
        ),
    }
}

/// Delivery sentence for the classic newcomer discount; empty unless the
/// flag is set. Caller text wins over the default.
pub fn delivery_clause(add_delivery_info: bool, custom_text: Option<&str>) -> String {
    if !add_delivery_info {
        return String::new();
    }
    match custom_text.map(sanitize_fragment).filter(|s| !s.is_empty()) {
        Some(text) => text,
        None => DEFAULT_DELIVERY_INFO.to_string(),
    }
}

/// Condition tail of a promo code discount. First order wins over a
/// category; the ruble cap is dropped when the discount is already in rubles.
pub fn promo_conditions(
    first_order_only: bool,
    category: Option<&str>,
    min_order_amount: Option<i64>,
    max_promo_discount: Option<i64>,
    unit: Option<DiscountUnit>,
) -> String {
    let mut conditions: Vec<String> = Vec::new();

    let category = category.map(sanitize_fragment).filter(|c| !c.is_empty());
    if first_order_only {
        conditions.push("на первый заказ".to_string());
    } else if let Some(category) = category {
        conditions.push(format!("на заказ из категорий \"{}\"", category));
    }

    if let Some(min) = min_order_amount.filter(|&v| v != 0) {
        conditions.push(format!("от {} ₽", min));
    }

    if let Some(max) = max_promo_discount.filter(|&v| v != 0) {
        if unit != Some(DiscountUnit::Rubles) {
            conditions.push(format!("не более {} ₽", max));
        }
    }

    conditions.join(" ")
}

/// Free text typed by a user goes into one line of legal copy.
fn sanitize_fragment(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_clause_defaults_and_overrides() {
        assert_eq!(delivery_clause(false, Some("ignored")), "");
        assert_eq!(delivery_clause(true, None), DEFAULT_DELIVERY_INFO);
        assert_eq!(delivery_clause(true, Some("   ")), DEFAULT_DELIVERY_INFO);
        assert_eq!(delivery_clause(true, Some(" Доставка\nбесплатно. ")), "Доставка бесплатно.");
    }

    #[test]
    fn first_order_takes_precedence_over_category() {
        let text = promo_conditions(true, Some("Сыры"), None, None, Some(DiscountUnit::Percent));
        assert_eq!(text, "на первый заказ");

        let text = promo_conditions(false, Some("Сыры"), None, None, Some(DiscountUnit::Percent));
        assert_eq!(text, "на заказ из категорий \"Сыры\"");
    }

    #[test]
    fn ruble_cap_skipped_for_ruble_discounts() {
        assert_eq!(
            promo_conditions(false, None, Some(1000), Some(300), Some(DiscountUnit::Percent)),
            "от 1000 ₽ не более 300 ₽"
        );
        assert_eq!(
            promo_conditions(false, None, Some(1000), Some(300), Some(DiscountUnit::Rubles)),
            "от 1000 ₽"
        );
        assert_eq!(promo_conditions(false, None, None, None, None), "");
    }
}
