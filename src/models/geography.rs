use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::error::{DisclaimerError, DisclaimerResult};
use crate::models::ChannelType;

/// Legal signature of one registered organization.
#[derive(Debug, PartialEq, Eq)]
pub struct LegalEntity {
    pub short: &'static str,
    pub full: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CityClass {
    Corporate,
    Franchise,
}

pub static YANDEX_LAVKA: LegalEntity = LegalEntity {
    short: "ООО «Яндекс Лавка», Москва, ОГРН 1187746479250",
    full: "ООО «Яндекс.Лавка», 123112, г. Москва, пр. 1-й Красногвардейский, д. 22, стр. 1, эт. 12, пом. 12-40, ОГРН 1187746479250",
};

static LAVKA_SCHASTYA: LegalEntity = LegalEntity {
    short: "ООО «Лавка Счастья», Липецк, ОГРН 1234800004878",
    full: "ООО «Лавка Счастья» (398059, г. Липецк, ул. Коммунальная, д. 3, помещ. 1, ОГРН 1234800004878)",
};

static DVM_GROUP: LegalEntity = LegalEntity {
    short: "ООО «ДВМ-ГРУПП», Тверь, ОГРН 1246900009850",
    full: "ООО «ДВМ-ГРУПП» (170100, г. Тверь, б-р Радищева, д. 12, этаж 2 помещ. 15, ОГРН 1246900009850)",
};

static YARLAVKA: LegalEntity = LegalEntity {
    short: "ООО «ЯРЛАВКА», Ярославль, ОГРН 1257600001845",
    full: "ООО «ЯРЛАВКА» (150007, г. Ярославль, Сквозной переулок, д. 8А, кв. 3, ОГРН 1257600001845)",
};

static LAVKA_RADOSTI: LegalEntity = LegalEntity {
    short: "ООО «Лавка Радости», Липецк, ОГРН 1254800002049",
    full: "ООО «Лавка Радости» (398059, Липецкая область, г. Липецк, ул. Коммунальная, д. 3, помещ. 1, ОГРН 1254800002049)",
};

static GOSSTROYRESURS: LegalEntity = LegalEntity {
    short: "ООО «ГОССТРОЙРЕСУРС», Калуга, ОГРН 1154028002688",
    full: "ООО «ГОССТРОЙРЕСУРС» (248001, Калужская область, г Калуга, ул Суворова, д. 17, ОГРН 1154028002688)",
};

static PREMIUM_STORE: LegalEntity = LegalEntity {
    short: "ООО «Премиум Стор», рп Панковка, ОГРН 1157847202996",
    full: "ООО «Премиум Стор» (173526, Новгородская область, рп Панковка, ул. Строительная, д. 7Б, офис 1Б, ОГРН 1157847202996)",
};

static LAVKAGOU: LegalEntity = LegalEntity {
    short: "ООО «ЛАВКАГОУ», Санкт-Петербург, ОГРН 1257800045051",
    full: "ООО «ЛАВКАГОУ» (197376, г. Санкт-Петербург, ул. Планерная, д. 99 стр.1, помещ. 47Н, ОГРН 1257800045051)",
};

static AMR: LegalEntity = LegalEntity {
    short: "ООО «АМР», Липецкая область, м.о. Липецкий, с. Сырское, ОГРН 1254800003875",
    full: "ООО «АМР» (Липецкая обл., М.О. Липецкий, с. Сырское, ул. Воронежская, стр. 35, помещ. 11, ОГРН 1254800003875)",
};

static IVLAVKA: LegalEntity = LegalEntity {
    short: "ООО «ИВЛАВКА», Иваново, ОГРН 1253700005591",
    full: "ООО «ИВЛАВКА» (153000, Ивановская область, г. Иваново, ул. Палехская, д. 6., ОГРН 1253700005591)",
};

static LAVKA_MECHTY: LegalEntity = LegalEntity {
    short: "ООО «Лавка мечты», Липецк, ОГРН 1254800004700",
    full: "ООО «Лавка мечты» (398001, г. Липецк, ул Л. Толстого, д. 7, помещ. 2, ОГРН 1254800004700)",
};

static PRODSNAB: LegalEntity = LegalEntity {
    short: "ООО «ПРОДСНАБ», Иркутск, ОГРН 1213800013250",
    full: "ООО «ПРОДСНАБ» (664035, Иркутская обл., г. Иркутск, ул. Рабочего штаба, д. 15, помещ. 6, ОГРН 1213800013250)",
};

static SERVICE_FRANCHISE: LegalEntity = LegalEntity {
    short: "ООО «Сервисная франшиза магазинов и кафе», Москва, ОГРН 1237700294138",
    full: "ООО «Сервисная франшиза магазинов и кафе» (123007,г. Москва, проезд 3-й Хорошевский, д. 1 стр. 1, помещ. 3/1, ОГРН 1237700294138)",
};

/// Corporate keys with the label used in choice sets. `None` marks an alias
/// that is accepted as input but not offered as a separate option.
static CORPORATE_CITIES: &[(&str, Option<&str>)] = &[
    ("москва", Some("Москва")),
    ("мо", Some("МО (Московская область)")),
    ("московская область", None),
    ("санкт-петербург", Some("Санкт-Петербург")),
    ("спб", None),
    ("ло", Some("Ленинградская область")),
    ("ленинградская область", None),
    ("казань", Some("Казань")),
    ("новосибирск", Some("Новосибирск")),
    ("нижний новгород", Some("Нижний Новгород")),
    ("ростов", Some("Ростов")),
    ("краснодар", Some("Краснодар")),
    ("екатеринбург", Some("Екатеринбург")),
    ("челябинск", Some("Челябинск")),
    ("тюмень", Some("Тюмень")),
    ("сочи", Some("Сочи")),
    ("воронеж", Some("Воронеж")),
    ("пермь", Some("Пермь")),
];

static FRANCHISE_CITIES: &[(&str, &str, &LegalEntity)] = &[
    ("тула", "Тула", &LAVKA_SCHASTYA),
    ("тверь", "Тверь", &DVM_GROUP),
    ("ярославль", "Ярославль", &YARLAVKA),
    ("рязань", "Рязань", &LAVKA_RADOSTI),
    ("калуга", "Калуга", &GOSSTROYRESURS),
    ("великий новгород", "Великий Новгород", &PREMIUM_STORE),
    ("обнинск", "Обнинск", &LAVKAGOU),
    ("липецк", "Липецк", &AMR),
    ("иваново", "Иваново", &IVLAVKA),
    ("тамбов", "Тамбов", &LAVKA_MECHTY),
    ("владимир", "Владимир", &DVM_GROUP),
    ("иркутск", "Иркутск", &PRODSNAB),
    ("набережные челны", "Набережные Челны", &PREMIUM_STORE),
    ("нижнекамск", "Нижнекамск", &PREMIUM_STORE),
    ("чебоксары", "Чебоксары", &SERVICE_FRANCHISE),
    ("йошкар-ола", "Йошкар-Ола", &SERVICE_FRANCHISE),
];

#[derive(Debug)]
pub struct CityRecord {
    pub key: &'static str,
    pub class: CityClass,
    pub entity: &'static LegalEntity,
    pub label: Option<&'static str>,
}

/// City keys mapped to their classification and legal entity. Built once,
/// read-only afterwards; validation and generation both consult it.
#[derive(Debug)]
pub struct GeographyRegistry {
    records: Vec<CityRecord>,
    index: HashMap<&'static str, usize>,
}

static REGISTRY: Lazy<GeographyRegistry> = Lazy::new(GeographyRegistry::build);

pub fn registry() -> &'static GeographyRegistry {
    &REGISTRY
}

/// Lower-cased, trimmed lookup key.
pub fn normalize_city_key(city: &str) -> String {
    city.trim().to_lowercase()
}

/// Human-facing city name: regional aliases collapse to one spelling, any
/// other input gets its first letter capitalised and the rest lower-cased.
pub fn normalize_city_display(city: &str) -> String {
    match normalize_city_key(city).as_str() {
        "мо" | "московская область" => "МО".to_string(),
        "спб" | "санкт-петербург" => "Санкт-Петербург".to_string(),
        "ло" | "ленинградская область" => "Ленинградская область".to_string(),
        _ => {
            let trimmed = city.trim();
            let mut chars = trimmed.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        }
    }
}

impl GeographyRegistry {
    fn build() -> Self {
        let mut records = Vec::with_capacity(CORPORATE_CITIES.len() + FRANCHISE_CITIES.len());
        for &(key, label) in CORPORATE_CITIES {
            records.push(CityRecord {
                key,
                class: CityClass::Corporate,
                entity: &YANDEX_LAVKA,
                label,
            });
        }
        for &(key, label, entity) in FRANCHISE_CITIES {
            records.push(CityRecord {
                key,
                class: CityClass::Franchise,
                entity,
                label: Some(label),
            });
        }

        let index = records
            .iter()
            .enumerate()
            .map(|(i, record)| (record.key, i))
            .collect();

        Self { records, index }
    }

    pub fn lookup(&self, city: &str) -> Option<&CityRecord> {
        self.index
            .get(normalize_city_key(city).as_str())
            .map(|&i| &self.records[i])
    }

    pub fn contains(&self, city: &str) -> bool {
        self.lookup(city).is_some()
    }

    /// Every accepted key, corporate first, in registry order.
    pub fn all_cities(&self) -> Vec<&'static str> {
        self.records.iter().map(|r| r.key).collect()
    }

    pub fn records(&self) -> &[CityRecord] {
        &self.records
    }

    /// Cities offered in choice sets: МО first, then the rest of the
    /// corporate cities, then franchise cities.
    pub fn options(&self) -> Vec<&CityRecord> {
        let mut listed: Vec<&CityRecord> = self.records.iter().filter(|r| r.label.is_some()).collect();
        listed.sort_by_key(|r| (r.key != "мо", r.class == CityClass::Franchise));
        listed
    }

    /// Signature text for a city on a channel: full form for TV/radio,
    /// short form everywhere else.
    pub fn resolve_entity(&self, city: &str, channel: ChannelType) -> DisclaimerResult<&'static str> {
        let record = self
            .lookup(city)
            .ok_or_else(|| DisclaimerError::UnknownEntity(city.to_string()))?;

        Ok(match channel {
            ChannelType::TvRadio => record.entity.full,
            ChannelType::Other => record.entity.short,
        })
    }
}

pub fn resolve_entity(city: &str, channel: ChannelType) -> DisclaimerResult<&'static str> {
    registry().resolve_entity(city, channel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corporate_cities_share_operator_entity() {
        for &(key, _) in CORPORATE_CITIES {
            assert_eq!(resolve_entity(key, ChannelType::TvRadio).unwrap(), YANDEX_LAVKA.full);
            assert_eq!(resolve_entity(key, ChannelType::Other).unwrap(), YANDEX_LAVKA.short);
        }
    }

    #[test]
    fn franchise_city_uses_own_entity() {
        assert_eq!(
            resolve_entity("Тула", ChannelType::Other).unwrap(),
            "ООО «Лавка Счастья», Липецк, ОГРН 1234800004878"
        );
        assert_eq!(
            resolve_entity("  ИРКУТСК ", ChannelType::TvRadio).unwrap(),
            PRODSNAB.full
        );
    }

    #[test]
    fn shared_franchise_entity_renders_identically() {
        let tver = resolve_entity("тверь", ChannelType::TvRadio).unwrap();
        let vladimir = resolve_entity("владимир", ChannelType::TvRadio).unwrap();
        assert_eq!(tver, vladimir);

        let chelny = resolve_entity("набережные челны", ChannelType::Other).unwrap();
        let nizhnekamsk = resolve_entity("нижнекамск", ChannelType::Other).unwrap();
        assert_eq!(chelny, nizhnekamsk);
    }

    #[test]
    fn unknown_city_is_rejected() {
        assert_eq!(
            resolve_entity("атлантис", ChannelType::Other),
            Err(DisclaimerError::UnknownEntity("атлантис".to_string()))
        );
    }

    #[test]
    fn all_cities_is_union_of_both_sets() {
        let all = registry().all_cities();
        assert_eq!(all.len(), CORPORATE_CITIES.len() + FRANCHISE_CITIES.len());
        assert!(all.contains(&"спб"));
        assert!(all.contains(&"йошкар-ола"));
    }

    #[test]
    fn options_put_mo_first_and_skip_aliases() {
        let options = registry().options();
        assert_eq!(options[0].key, "мо");
        assert!(options.iter().all(|r| r.key != "спб"));
        let first_franchise = options.iter().position(|r| r.class == CityClass::Franchise).unwrap();
        assert!(options[first_franchise..].iter().all(|r| r.class == CityClass::Franchise));
    }

    #[test]
    fn display_names() {
        assert_eq!(normalize_city_display("московская область"), "МО");
        assert_eq!(normalize_city_display(" СПБ "), "Санкт-Петербург");
        assert_eq!(normalize_city_display("ло"), "Ленинградская область");
        assert_eq!(normalize_city_display("тула"), "Тула");
        assert_eq!(normalize_city_display("ВЕЛИКИЙ НОВГОРОД"), "Великий новгород");
    }
}
