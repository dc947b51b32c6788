use lavka_disclaimer_backend::error::DisclaimerError;
use lavka_disclaimer_backend::models::{ChannelType, CreativeFields, CreativeParams, CreativeType};
use lavka_disclaimer_backend::services::generator::{generate, generate_batch};

const LAVKA_SHORT: &str = "ООО «Яндекс Лавка», Москва, ОГРН 1187746479250";
const LAVKA_FULL: &str = "ООО «Яндекс.Лавка», 123112, г. Москва, пр. 1-й Красногвардейский, д. 22, стр. 1, эт. 12, пом. 12-40, ОГРН 1187746479250";

fn params(creative_type: CreativeType, city: &str, channel: ChannelType, fields: CreativeFields) -> CreativeParams {
    CreativeParams::new(creative_type, city, channel).with_fields(fields)
}

fn ends(end: &str) -> CreativeFields {
    CreativeFields {
        end_date: Some(end.to_string()),
        ..Default::default()
    }
}

#[test]
fn dynamic_newcomer() {
    let text = generate(&params(CreativeType::DynamicNewcomer, "МО", ChannelType::Other, ends("31.12.24"))).unwrap();
    assert_eq!(
        text,
        "Акция действует до 31.12.24. Не распространяется на категории «Сертификаты», «Магазин Яндекса» и «Магазины по пути». Подробности - clck.ru/397gmg. ООО «Яндекс Лавка», Москва, ОГРН 1187746479250."
    );
}

#[test]
fn classic_newcomer_without_delivery() {
    let fields = CreativeFields {
        max_discount_amount: Some(500),
        ..ends("31.12.24")
    };
    let text = generate(&params(CreativeType::ClassicNewcomer, "москва", ChannelType::Other, fields)).unwrap();
    assert_eq!(
        text,
        format!(
            "Акция действует до 31.12.24 (максимальный размер скидки - 500 руб.). Не распространяется на категории «Сертификаты», «Магазин Яндекса» и «Магазины по пути». Подробности - clck.ru/3Dq8fF. {}",
            LAVKA_SHORT
        )
    );
}

#[test]
fn classic_newcomer_with_default_and_custom_delivery() {
    let fields = CreativeFields {
        max_discount_amount: Some(500),
        add_delivery_info: true,
        ..ends("31.12.24")
    };
    let text = generate(&params(CreativeType::ClassicNewcomer, "москва", ChannelType::Other, fields.clone())).unwrap();
    assert!(text.ends_with(&format!(
        "Подробности - clck.ru/3Dq8fF. Три бесплатные доставки в пешей и одна в авто зоне. Доставку осуществляют партнеры Яндекс Еды.{}",
        LAVKA_SHORT
    )));

    let custom = CreativeFields {
        delivery_info_text: Some("Бесплатная доставка\nот 500 ₽. ".to_string()),
        ..fields
    };
    let text = generate(&params(CreativeType::ClassicNewcomer, "москва", ChannelType::Other, custom)).unwrap();
    assert!(text.ends_with(&format!("clck.ru/3Dq8fF. Бесплатная доставка от 500 ₽.{}", LAVKA_SHORT)));
}

#[test]
fn promo_code_reference_example() {
    let fields = CreativeFields {
        discount_size: Some(20.0),
        discount_unit: Some("%".to_string()),
        first_order_only: true,
        min_order_amount: Some(1000),
        ..ends("31.12.24")
    };
    let text = generate(&params(CreativeType::PromoCode, "москва", ChannelType::Other, fields)).unwrap();
    assert_eq!(
        text,
        "До 31.12.24 скидка 20% на первый заказ от 1000 ₽. Не применяется к товарам из разделов «Магазин Яндекса», «Товары для взрослых», «Сертификаты», «Молочные смеси», товары с доставкой «По пути», «Аптеки». Не суммируется с другими акциями. ООО «Яндекс Лавка», Москва, ОГРН 1187746479250"
    );
}

#[test]
fn promo_code_category_and_caps() {
    let fields = CreativeFields {
        discount_size: Some(15.0),
        discount_unit: Some("%".to_string()),
        specific_category: Some("Сыры".to_string()),
        max_promo_discount: Some(300),
        ..ends("15.02.25")
    };
    let text = generate(&params(CreativeType::PromoCode, "тула", ChannelType::Other, fields)).unwrap();
    assert!(text.starts_with("До 15.02.25 скидка 15% на заказ из категорий \"Сыры\" не более 300 ₽. Не применяется"));
    assert!(text.ends_with("Не суммируется с другими акциями. ООО «Лавка Счастья», Липецк, ОГРН 1234800004878"));
}

#[test]
fn promo_code_in_rubles_drops_the_cap() {
    let fields = CreativeFields {
        discount_size: Some(300.0),
        discount_unit: Some("₽".to_string()),
        max_promo_discount: Some(300),
        ..ends("15.02.25")
    };
    let text = generate(&params(CreativeType::PromoCode, "москва", ChannelType::Other, fields)).unwrap();
    assert!(text.starts_with("До 15.02.25 скидка 300₽. Не применяется"));
    assert!(!text.contains("не более"));
}

#[test]
fn promo_code_fractional_size() {
    let fields = CreativeFields {
        discount_size: Some(12.5),
        discount_unit: Some("%".to_string()),
        ..ends("15.02.25")
    };
    let text = generate(&params(CreativeType::PromoCode, "москва", ChannelType::Other, fields)).unwrap();
    assert!(text.starts_with("До 15.02.25 скидка 12.5%. "));
}

#[test]
fn certificate_on_tv() {
    let fields = CreativeFields {
        usage_count: Some(3),
        ..ends("01.03.25")
    };
    let text = generate(&params(CreativeType::Certificate, "москва", ChannelType::TvRadio, fields)).unwrap();
    assert_eq!(
        text,
        format!(
            "Сертификат действует до 01.03.25. Количество применений сертификата - не более 3 раз в пределах номинала сертификата. Если номинал сертификата покрывает полностью стоимость заказа, то сумма каждой единицы товара, оплачиваемых пользователем, с учетом скидки будет равна 1 (одному) рублю. Подробные условия применения - https://yandex.ru/legal/promocode_eda/. Не применяется на стоимость доставки и упаковки. {}",
            LAVKA_FULL
        )
    );
}

#[test]
fn image_is_the_short_operator_text() {
    let text = generate(&params(CreativeType::Image, "москва", ChannelType::Other, CreativeFields::default())).unwrap();
    assert_eq!(text, LAVKA_SHORT);
}

#[test]
fn product() {
    let text = generate(&params(CreativeType::Product, "иркутск", ChannelType::Other, CreativeFields::default())).unwrap();
    assert_eq!(text, "Количество товаров ограничено. ООО «ПРОДСНАБ», Иркутск, ОГРН 1213800013250");
}

#[test]
fn vendor() {
    let fields = CreativeFields {
        start_date: Some("01.12.24".to_string()),
        ..ends("31.12.2024")
    };
    let text = generate(&params(CreativeType::Vendor, "спб", ChannelType::Other, fields)).unwrap();
    assert_eq!(
        text,
        format!("Акция действует с 01.12.24 по 31.12.2024. Количество товаров ограничено. {}", LAVKA_SHORT)
    );
}

#[test]
fn unknown_city_fails_for_every_type() {
    for creative_type in [
        CreativeType::DynamicNewcomer,
        CreativeType::ClassicNewcomer,
        CreativeType::PromoCode,
        CreativeType::Certificate,
        CreativeType::Image,
        CreativeType::Product,
        CreativeType::Vendor,
    ] {
        let err = generate(&params(creative_type, "атлантис", ChannelType::Other, ends("31.12.24"))).unwrap_err();
        assert_eq!(
            err,
            DisclaimerError::Validation("Город 'атлантис' не найден в списке доступных городов".to_string())
        );
    }
}

#[test]
fn batch_keeps_city_order() {
    let cities = vec!["тула".to_string(), "москва".to_string(), "тверь".to_string()];
    let results = generate_batch(
        &params(CreativeType::Product, "", ChannelType::Other, CreativeFields::default()),
        &cities,
    )
    .unwrap();

    let order: Vec<&str> = results.iter().map(|(city, _)| city.as_str()).collect();
    assert_eq!(order, ["тула", "москва", "тверь"]);
    assert_eq!(results[1].1, format!("Количество товаров ограничено. {}", LAVKA_SHORT));
}

#[test]
fn batch_is_all_or_nothing() {
    let cities = vec!["москва".to_string(), "атлантис".to_string()];
    let result = generate_batch(
        &params(CreativeType::DynamicNewcomer, "", ChannelType::Other, ends("31.12.24")),
        &cities,
    );
    assert_eq!(
        result,
        Err(DisclaimerError::Validation(
            "Город 'атлантис' не найден в списке доступных городов".to_string()
        ))
    );
}

#[test]
fn batch_needs_at_least_one_city() {
    let result = generate_batch(&params(CreativeType::Image, "", ChannelType::Other, CreativeFields::default()), &[]);
    assert_eq!(result, Err(DisclaimerError::Validation("Город не указан".to_string())));
}

#[test]
fn vendor_needs_both_dates_before_format_checks() {
    let fields = CreativeFields {
        start_date: Some("01.13.24".to_string()),
        ..Default::default()
    };
    let err = generate(&params(CreativeType::Vendor, "москва", ChannelType::Other, fields)).unwrap_err();
    assert_eq!(err, DisclaimerError::Validation("Дата окончания обязательна".to_string()));
}
