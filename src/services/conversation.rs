use std::str::FromStr;

use strum::{EnumString, IntoEnumIterator};
use tracing::{debug, info, warn};

use crate::error::ConversationError;
use crate::models::{
    format_amount, geography, ChannelType, ChoiceOption, CityText, ConversationSession,
    CreativeType, DialogState, Draft, Input, Mode, Outcome, Reply,
};
use crate::services::export;
use crate::services::generator::{self, DEFAULT_DELIVERY_INFO};
use crate::services::schema::{self, Field};
use crate::services::validators::{self, FieldValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Command {
    Start,
    Create,
    Batch,
    Help,
    Skip,
    Cancel,
}

impl Command {
    /// `/create`, `/create@SomeBot` and the main menu button captions.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        match text {
            MENU_CREATE => return Some(Command::Create),
            MENU_BATCH => return Some(Command::Batch),
            MENU_HELP => return Some(Command::Help),
            _ => {}
        }
        let name = text.strip_prefix('/')?.split_whitespace().next()?;
        let name = name.split('@').next().unwrap_or(name);
        Command::from_str(&name.to_lowercase()).ok()
    }
}

pub const MENU_CREATE: &str = "➕ Создать дисклеймер";
pub const MENU_BATCH: &str = "🗺 Несколько городов";
pub const MENU_HELP: &str = "❓ Помощь";

const WELCOME: &str = "👋 Привет! Я бот для генерации дисклеймеров Яндекс Лавки.\n\n\
Команды:\n\
/create — пошаговое создание\n\
/batch — один креатив для нескольких городов\n\
/cancel — отменить создание\n\
/help — справка";

const HELP: &str = "📚 Справка по боту\n\n\
Типы креативов:\n\
• Скидка новичка (динамическая/классическая)\n\
• Промокод\n\
• Сертификат\n\
• Имиджевый креатив\n\
• Продуктовый креатив\n\
• Вендорский креатив\n\n\
Каналы размещения:\n\
• ТВ/Радио — полная версия юр.лица\n\
• Другие форматы — короткая версия\n\n\
Формат даты: ДД.ММ.ГГ или ДД.ММ.ГГГГ (например, 31.12.24)\n\n\
Для создания дисклеймера используйте /create, для нескольких городов — /batch.";

const IDLE_HINT: &str = "Используйте /create для пошагового создания дисклеймера или /help для справки.";
const PICK_FROM_LIST: &str = "Пожалуйста, выберите вариант из списка";
const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━";

#[derive(Clone, Copy)]
enum Event<'a> {
    Callback(&'a str),
    Text(&'a str),
}

impl<'a> Event<'a> {
    fn from_input(input: &'a Input) -> Self {
        match input {
            Input::Text(text) => Event::Text(text),
            Input::Callback(token) => Event::Callback(token),
        }
    }
}

fn command(input: &Input) -> Option<Command> {
    match input {
        Input::Text(text) => Command::parse(text),
        // Buttons may carry a command, e.g. the skip button.
        Input::Callback(token) if token.starts_with('/') => Command::parse(token),
        Input::Callback(_) => None,
    }
}

/// Runs one step of the dialog for `session`.
///
/// Input that no handler of the current state accepts resets the session to
/// idle and answers with the idle hint.
pub fn handle_input(session: &mut ConversationSession, input: Input) -> Reply {
    let before = session.state;

    let mut reply = match dispatch(session, &input) {
        Ok(reply) => reply,
        Err(err) => {
            warn!(error = %err, "resetting conversation");
            session.clear();
            main_menu(IDLE_HINT)
        }
    };

    if before != session.state {
        debug!(from = ?before, to = ?session.state, "state transition");
    }
    reply.state = session.state;
    reply
}

/// Current prompt for the session, without consuming input.
pub fn prompt(session: &ConversationSession) -> Reply {
    let state = session.state;
    let draft = &session.draft;

    match state {
        DialogState::Idle => main_menu("Главное меню. Выберите действие:"),
        DialogState::ChoosingScenario => Reply::text("Выберите сценарий:", state).with_options(
            vec![
                ChoiceOption::new("scenario:single", "📍 Один город"),
                ChoiceOption::new("scenario:multiple", "🗺 Несколько городов"),
            ],
            1,
        ),
        DialogState::ChoosingType => {
            let options = CreativeType::iter()
                .enumerate()
                .map(|(i, t)| {
                    ChoiceOption::new(format!("type:{}", t.as_ref()), format!("{}. {}", i + 1, t.display_name()))
                        .selected(draft.creative_type == Some(t))
                })
                .collect();
            Reply::text("Выберите тип креатива:", state).with_options(options, 1)
        }
        DialogState::ChoosingGeography => {
            let mut options: Vec<ChoiceOption> = geography::registry()
                .options()
                .into_iter()
                .map(|record| {
                    ChoiceOption::new(format!("geo:{}", record.key), record.label.unwrap_or(record.key))
                        .selected(draft.city.as_deref() == Some(record.key))
                })
                .collect();
            options.push(ChoiceOption::new("back", "⬅️ Назад"));
            Reply::text(format!("{}\n\nВыберите географию:", type_line(draft)), state).with_options(options, 2)
        }
        DialogState::ChoosingMultipleGeography => {
            let mut options: Vec<ChoiceOption> = geography::registry()
                .options()
                .into_iter()
                .map(|record| {
                    ChoiceOption::new(format!("geo:{}", record.key), record.label.unwrap_or(record.key))
                        .selected(draft.cities.iter().any(|c| c == record.key))
                })
                .collect();
            options.push(ChoiceOption::new("geo:all", "☑️ Выбрать все"));
            options.push(ChoiceOption::new("geo:done", "✅ Готово"));
            Reply::text(
                format!(
                    "{}\n\nВыберите города (можно несколько), затем нажмите «Готово».\nВыбрано: {}",
                    type_line(draft),
                    draft.cities.len()
                ),
                state,
            )
            .with_options(options, 2)
        }
        DialogState::ChoosingChannel => {
            let mut options: Vec<ChoiceOption> = ChannelType::iter()
                .map(|c| {
                    ChoiceOption::new(format!("channel:{}", c.as_ref()), c.display_name())
                        .selected(draft.channel == Some(c))
                })
                .collect();
            if session.mode == Mode::Single {
                options.push(ChoiceOption::new("back", "⬅️ Назад"));
            }
            Reply::text(format!("{}\n\nВыберите канал размещения:", geography_line(session)), state)
                .with_options(options, 1)
        }
        DialogState::EnteringStartDate => {
            Reply::text("Введите дату начала акции (формат: ДД.ММ.ГГ):", state)
        }
        DialogState::EnteringEndDate => {
            let subject = match draft.creative_type {
                Some(CreativeType::PromoCode) => "промокода",
                Some(CreativeType::Certificate) => "сертификата",
                _ => "акции",
            };
            Reply::text(format!("Введите дату окончания {} (формат: ДД.ММ.ГГ):", subject), state)
        }
        DialogState::EnteringMaxDiscount => {
            Reply::text("Введите максимальный размер скидки в рублях:", state)
        }
        DialogState::ChoosingDeliveryInfo => {
            Reply::text("Добавить информацию о доставке?", state).with_options(yes_no("delivery"), 2)
        }
        DialogState::EnteringDeliveryText => Reply::text(
            format!(
                "Введите текст о доставке или отправьте /skip для использования стандартного текста:\n\n\
                 Стандартный текст: \"{}\"",
                DEFAULT_DELIVERY_INFO
            ),
            state,
        )
        .with_options(vec![skip_option()], 1),
        DialogState::EnteringDiscountSize => Reply::text("Введите размер скидки (только число):", state),
        DialogState::ChoosingDiscountUnit => Reply::text("Выберите единицу измерения:", state).with_options(
            vec![
                ChoiceOption::new("unit:%", "% Проценты"),
                ChoiceOption::new("unit:₽", "₽ Рубли"),
            ],
            2,
        ),
        DialogState::ChoosingFirstOrder => {
            Reply::text("Промокод только для первого заказа?", state).with_options(yes_no("first"), 2)
        }
        DialogState::ChoosingCategory => Reply::text("Промокод для конкретной категории/товара?", state)
            .with_options(yes_no("category"), 2),
        DialogState::EnteringCategoryName => Reply::text("Введите название категории:", state),
        DialogState::EnteringMinAmount => {
            Reply::text("Минимальная сумма заказа в рублях (или /skip):", state)
                .with_options(vec![skip_option()], 1)
        }
        DialogState::EnteringMaxDiscountPromo => {
            Reply::text("Максимальная скидка в рублях (или /skip):", state).with_options(vec![skip_option()], 1)
        }
        DialogState::EnteringUsageCount => Reply::text("Введите количество применений сертификата:", state),
        DialogState::Confirming => Reply::text(summary(session), state).with_options(
            vec![
                ChoiceOption::new("confirm:yes", "✅ Да, генерировать"),
                ChoiceOption::new("confirm:edit", "✏️ Изменить параметры"),
                ChoiceOption::new("confirm:restart", "🔄 Начать заново"),
            ],
            1,
        ),
    }
}

fn dispatch(session: &mut ConversationSession, input: &Input) -> Result<Reply, ConversationError> {
    let origin = session.state;
    let unrecognized = || ConversationError::UnrecognizedInteraction {
        state: origin,
        input: match input {
            Input::Text(text) | Input::Callback(text) => text.clone(),
        },
    };

    // Commands and result actions work from any state.
    if let Some(cmd) = command(input) {
        return Ok(run_command(session, cmd));
    }

    let event = Event::from_input(input);
    match event {
        Event::Callback("result:new") => {
            session.clear();
            session.state = DialogState::ChoosingScenario;
            return Ok(prompt(session));
        }
        Event::Callback("result:menu") => {
            session.clear();
            return Ok(prompt(session));
        }
        _ => {}
    }

    match (session.state, event) {
        (DialogState::Idle, Event::Text(_)) => Ok(main_menu(IDLE_HINT)),

        (DialogState::ChoosingScenario, Event::Callback(token)) => match token {
            "scenario:single" => {
                session.restart(Mode::Single);
                Ok(prompt(session))
            }
            "scenario:multiple" => {
                session.restart(Mode::Batch);
                Ok(prompt(session))
            }
            _ => Ok(retry(session, PICK_FROM_LIST)),
        },

        (DialogState::ChoosingType, Event::Callback(token)) => {
            match token.strip_prefix("type:").and_then(|tag| CreativeType::from_str(tag).ok()) {
                Some(creative_type) => {
                    session.draft.creative_type = Some(creative_type);
                    session.state = entry_state(Field::City, session.mode, &session.draft)
                        .unwrap_or(DialogState::ChoosingGeography);
                    Ok(prompt(session))
                }
                None => Ok(retry(session, PICK_FROM_LIST)),
            }
        }

        (DialogState::ChoosingGeography, Event::Callback("back")) => {
            session.state = DialogState::ChoosingType;
            Ok(prompt(session))
        }
        (DialogState::ChoosingGeography, Event::Callback(token)) => match token.strip_prefix("geo:") {
            Some(city) => Ok(pick_city(session, city)),
            None => Ok(retry(session, PICK_FROM_LIST)),
        },
        (DialogState::ChoosingGeography, Event::Text(text)) => Ok(pick_city(session, text)),

        (DialogState::ChoosingMultipleGeography, Event::Callback(token)) => match token {
            "geo:done" if session.draft.cities.is_empty() => Ok(retry(session, "Выберите хотя бы один город")),
            "geo:done" => Ok(advance(session, Field::City)),
            "geo:all" => {
                toggle_all_cities(&mut session.draft);
                Ok(prompt(session))
            }
            _ => match token.strip_prefix("geo:") {
                Some(city) => Ok(toggle_city(session, city)),
                None => Ok(retry(session, PICK_FROM_LIST)),
            },
        },
        (DialogState::ChoosingMultipleGeography, Event::Text(text)) => Ok(toggle_city(session, text)),

        (DialogState::ChoosingChannel, Event::Callback("back")) if session.mode == Mode::Single => {
            session.state = DialogState::ChoosingGeography;
            Ok(prompt(session))
        }
        (DialogState::ChoosingChannel, Event::Callback(token)) => {
            match token.strip_prefix("channel:").and_then(|tag| ChannelType::from_str(tag).ok()) {
                Some(channel) => {
                    session.draft.channel = Some(channel);
                    Ok(advance(session, Field::Channel))
                }
                None => Ok(retry(session, PICK_FROM_LIST)),
            }
        }

        (DialogState::ChoosingDeliveryInfo, Event::Callback(token)) => match yes_no_answer(token, "delivery") {
            Some(answer) => {
                session.draft.fields.add_delivery_info = answer;
                if !answer {
                    session.draft.fields.delivery_info_text = None;
                }
                Ok(advance(session, Field::AddDeliveryInfo))
            }
            None => Ok(retry(session, PICK_FROM_LIST)),
        },

        (DialogState::ChoosingDiscountUnit, Event::Callback(token)) => match token.strip_prefix("unit:") {
            Some(unit @ ("%" | "₽")) => Ok(pick_unit(session, unit)),
            _ => Ok(retry(session, PICK_FROM_LIST)),
        },

        (DialogState::ChoosingFirstOrder, Event::Callback(token)) => match yes_no_answer(token, "first") {
            Some(answer) => {
                session.draft.fields.first_order_only = answer;
                Ok(advance(session, Field::FirstOrderOnly))
            }
            None => Ok(retry(session, PICK_FROM_LIST)),
        },

        (DialogState::ChoosingCategory, Event::Callback(token)) => match yes_no_answer(token, "category") {
            Some(true) => {
                session.state = DialogState::EnteringCategoryName;
                Ok(prompt(session))
            }
            Some(false) => {
                session.draft.fields.specific_category = None;
                Ok(advance(session, Field::SpecificCategory))
            }
            None => Ok(retry(session, PICK_FROM_LIST)),
        },

        (DialogState::Confirming, Event::Callback(token)) => match token {
            "confirm:yes" => confirm(session).ok_or_else(unrecognized),
            "confirm:edit" => {
                let mode = session.mode;
                session.restart(mode);
                let mut reply = prompt(session);
                reply.text = format!("Давайте начнем заново.\n\n{}", reply.text);
                Ok(reply)
            }
            "confirm:restart" => {
                let mode = session.mode;
                session.restart(mode);
                Ok(prompt(session))
            }
            _ => Ok(retry(session, PICK_FROM_LIST)),
        },

        (state, Event::Text(text)) => match entered_field(state) {
            Some(field) => Ok(enter_value(session, field, text)),
            // Typed text where a button is expected.
            None => Ok(retry(session, PICK_FROM_LIST)),
        },

        // A button press that no handler of this state accepts, usually a
        // stale keyboard from an earlier conversation.
        (_, Event::Callback(_)) => Err(unrecognized()),
    }
}

fn run_command(session: &mut ConversationSession, cmd: Command) -> Reply {
    match cmd {
        Command::Start => {
            session.clear();
            main_menu(WELCOME)
        }
        Command::Create => {
            session.clear();
            session.state = DialogState::ChoosingScenario;
            prompt(session)
        }
        Command::Batch => {
            session.restart(Mode::Batch);
            prompt(session)
        }
        Command::Help => {
            let mut reply = prompt(session);
            reply.text = format!("{}\n\n{}", HELP, reply.text);
            reply
        }
        Command::Cancel => {
            session.clear();
            main_menu("Создание дисклеймера отменено.").with_outcome(Outcome::Aborted)
        }
        Command::Skip => match entered_field(session.state) {
            Some(field @ (Field::DeliveryInfoText | Field::MinOrderAmount | Field::MaxPromoDiscount)) => {
                field.clear(&mut session.draft.fields);
                advance(session, field)
            }
            _ => retry(session, "Этот шаг нельзя пропустить"),
        },
    }
}

/// Checks one typed answer, stores it and moves on. On failure the state is
/// kept and the validator message is shown with the same prompt.
fn enter_value(session: &mut ConversationSession, field: Field, raw: &str) -> Reply {
    let Some(kind) = field.kind() else {
        return retry(session, PICK_FROM_LIST);
    };

    let value = match validators::validate_field(kind, raw) {
        Ok(value) => value,
        Err(err) => {
            debug!(field = field.as_ref(), error = %err, "answer rejected");
            return retry(session, &err.message);
        }
    };
    field.assign(&mut session.draft.fields, value);

    // Cross-field rules, e.g. the vendor end date must follow the start date.
    if let Some(Err(err)) = check_entered(&session.draft, field) {
        debug!(field = field.as_ref(), error = %err, "answer rejected by schema rule");
        field.clear(&mut session.draft.fields);
        return retry(session, &err.message);
    }

    advance(session, field)
}

fn check_entered(draft: &Draft, field: Field) -> Option<validators::FieldResult<()>> {
    let params = draft.params()?;
    let spec = schema::schema_for(params.creative_type).spec(field)?;
    Some(schema::check_field(spec, &params))
}

fn pick_city(session: &mut ConversationSession, raw: &str) -> Reply {
    match validators::validate_field(validators::FieldKind::City, raw) {
        Ok(FieldValue::Text(key)) => {
            session.draft.city = Some(key);
            advance(session, Field::City)
        }
        Ok(_) => retry(session, PICK_FROM_LIST),
        Err(err) => {
            debug!(city = raw, error = %err, "city rejected");
            retry(session, &err.message)
        }
    }
}

fn toggle_city(session: &mut ConversationSession, raw: &str) -> Reply {
    match validators::validate_field(validators::FieldKind::City, raw) {
        Ok(FieldValue::Text(key)) => {
            let cities = &mut session.draft.cities;
            match cities.iter().position(|c| *c == key) {
                Some(i) => {
                    cities.remove(i);
                }
                None => cities.push(key),
            }
            prompt(session)
        }
        Ok(_) => retry(session, PICK_FROM_LIST),
        Err(err) => retry(session, &err.message),
    }
}

/// Selects every offered city, or clears the selection when all of them are
/// already picked.
fn toggle_all_cities(draft: &mut Draft) {
    let offered: Vec<&'static str> = geography::registry().options().into_iter().map(|r| r.key).collect();
    if offered.iter().all(|key| draft.cities.iter().any(|c| c == key)) {
        draft.cities.clear();
        return;
    }
    for key in offered {
        if !draft.cities.iter().any(|c| c == key) {
            draft.cities.push(key.to_string());
        }
    }
}

/// A percentage above 100 sends the user back to the size question.
fn pick_unit(session: &mut ConversationSession, unit: &str) -> Reply {
    session.draft.fields.discount_unit = Some(unit.to_string());

    match check_entered(&session.draft, Field::DiscountUnit) {
        Some(Err(err)) => {
            debug!(unit, error = %err, "discount size does not fit unit");
            Field::DiscountUnit.clear(&mut session.draft.fields);
            Field::DiscountSize.clear(&mut session.draft.fields);
            session.state = DialogState::EnteringDiscountSize;
            retry(session, &err.message)
        }
        _ => advance(session, Field::DiscountUnit),
    }
}

fn confirm(session: &mut ConversationSession) -> Option<Reply> {
    let params = session.draft.params()?;

    let reply = match session.mode {
        Mode::Single => match generator::generate(&params) {
            Ok(text) => {
                let reply = Reply::text(
                    format!(
                        "✅ Дисклеймер готов!\n\n{SEPARATOR}\n{}\n{SEPARATOR}\n\n📋 Скопируйте текст выше",
                        text
                    ),
                    DialogState::Idle,
                );
                reply.with_options(result_options(), 1).with_outcome(Outcome::Completed {
                    disclaimers: vec![CityText {
                        city: params.city.clone(),
                        text,
                    }],
                })
            }
            Err(err) => failure(&err.to_string()),
        },
        Mode::Batch => match generator::generate_batch(&params, &session.draft.cities) {
            Ok(results) => {
                let mut text = format!("✅ Дисклеймеры готовы: {}\n", results.len());
                for (city, disclaimer) in &results {
                    text.push_str(&format!(
                        "\n📍 {}\n{}\n",
                        geography::normalize_city_display(city),
                        disclaimer
                    ));
                }
                text.push_str("\n📎 Все тексты также собраны в файле.");

                let file = export::text_attachment(&results);
                Reply::text(text, DialogState::Idle)
                    .with_options(result_options(), 1)
                    .with_file(file)
                    .with_outcome(Outcome::Completed {
                        disclaimers: results
                            .into_iter()
                            .map(|(city, text)| CityText { city, text })
                            .collect(),
                    })
            }
            Err(err) => failure(&err.to_string()),
        },
    };

    info!(
        creative_type = params.creative_type.as_ref(),
        mode = ?session.mode,
        completed = matches!(reply.outcome, Some(Outcome::Completed { .. })),
        "conversation finished"
    );
    session.clear();
    Some(reply)
}

fn failure(message: &str) -> Reply {
    Reply::text(
        format!(
            "❌ Ошибка валидации:\n{}\n\nИспользуйте /create для создания нового дисклеймера.",
            message
        ),
        DialogState::Idle,
    )
    .with_options(result_options(), 1)
    .with_outcome(Outcome::Failed {
        error: message.to_string(),
    })
}

/// Moves to the question for the first schema field after `after` that still
/// applies, or to confirmation when none is left.
fn advance(session: &mut ConversationSession, after: Field) -> Reply {
    session.state = next_state(session.mode, &session.draft, after);
    prompt(session)
}

fn next_state(mode: Mode, draft: &Draft, after: Field) -> DialogState {
    let Some(creative_type) = draft.creative_type else {
        return DialogState::ChoosingType;
    };
    let schema = schema::schema_for(creative_type);
    let start = schema.position(after).map_or(0, |i| i + 1);

    schema.fields[start..]
        .iter()
        .find_map(|spec| entry_state(spec.field, mode, draft))
        .unwrap_or(DialogState::Confirming)
}

/// State that asks for `field`, or `None` if the field does not apply to
/// the answers given so far.
fn entry_state(field: Field, mode: Mode, draft: &Draft) -> Option<DialogState> {
    Some(match field {
        Field::City => match mode {
            Mode::Single => DialogState::ChoosingGeography,
            Mode::Batch => DialogState::ChoosingMultipleGeography,
        },
        Field::Channel => DialogState::ChoosingChannel,
        Field::StartDate => DialogState::EnteringStartDate,
        Field::EndDate => DialogState::EnteringEndDate,
        Field::MaxDiscountAmount => DialogState::EnteringMaxDiscount,
        Field::AddDeliveryInfo => DialogState::ChoosingDeliveryInfo,
        Field::DeliveryInfoText if !draft.fields.add_delivery_info => return None,
        Field::DeliveryInfoText => DialogState::EnteringDeliveryText,
        Field::DiscountSize => DialogState::EnteringDiscountSize,
        Field::DiscountUnit => DialogState::ChoosingDiscountUnit,
        Field::FirstOrderOnly => DialogState::ChoosingFirstOrder,
        Field::SpecificCategory => DialogState::ChoosingCategory,
        Field::MinOrderAmount => DialogState::EnteringMinAmount,
        Field::MaxPromoDiscount => DialogState::EnteringMaxDiscountPromo,
        Field::UsageCount => DialogState::EnteringUsageCount,
    })
}

/// Field typed by the user in a text entry state.
fn entered_field(state: DialogState) -> Option<Field> {
    match state {
        DialogState::EnteringStartDate => Some(Field::StartDate),
        DialogState::EnteringEndDate => Some(Field::EndDate),
        DialogState::EnteringMaxDiscount => Some(Field::MaxDiscountAmount),
        DialogState::EnteringDeliveryText => Some(Field::DeliveryInfoText),
        DialogState::EnteringDiscountSize => Some(Field::DiscountSize),
        DialogState::EnteringCategoryName => Some(Field::SpecificCategory),
        DialogState::EnteringMinAmount => Some(Field::MinOrderAmount),
        DialogState::EnteringMaxDiscountPromo => Some(Field::MaxPromoDiscount),
        DialogState::EnteringUsageCount => Some(Field::UsageCount),
        _ => None,
    }
}

fn retry(session: &ConversationSession, message: &str) -> Reply {
    let mut reply = prompt(session);
    reply.text = format!("❌ {}\n\n{}", message, reply.text);
    reply
}

fn main_menu(text: &str) -> Reply {
    Reply::text(text, DialogState::Idle).with_options(
        vec![
            ChoiceOption::new("/create", MENU_CREATE),
            ChoiceOption::new("/batch", MENU_BATCH),
            ChoiceOption::new("/help", MENU_HELP),
        ],
        2,
    )
}

fn result_options() -> Vec<ChoiceOption> {
    vec![
        ChoiceOption::new("result:new", "🔄 Создать новый"),
        ChoiceOption::new("result:menu", "📋 Главное меню"),
    ]
}

fn yes_no(prefix: &str) -> Vec<ChoiceOption> {
    vec![
        ChoiceOption::new(format!("{prefix}:yes"), "✅ Да"),
        ChoiceOption::new(format!("{prefix}:no"), "❌ Нет"),
    ]
}

fn yes_no_answer(token: &str, prefix: &str) -> Option<bool> {
    match token.strip_prefix(prefix)?.strip_prefix(':')? {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}

fn skip_option() -> ChoiceOption {
    ChoiceOption::new("/skip", "⏭ Пропустить")
}

fn type_line(draft: &Draft) -> String {
    match draft.creative_type {
        Some(t) => format!("✅ Тип: {}", t.display_name()),
        None => String::new(),
    }
}

fn geography_line(session: &ConversationSession) -> String {
    match session.mode {
        Mode::Single => format!(
            "✅ География: {}",
            geography::normalize_city_display(session.draft.city.as_deref().unwrap_or_default())
        ),
        Mode::Batch => format!("✅ Города: {}", cities_display(&session.draft.cities)),
    }
}

fn cities_display(cities: &[String]) -> String {
    cities
        .iter()
        .map(|c| geography::normalize_city_display(c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn summary(session: &ConversationSession) -> String {
    let draft = &session.draft;
    let f = &draft.fields;
    let mut s = String::from("📋 Проверьте параметры:\n\n");

    if let Some(t) = draft.creative_type {
        s.push_str(&format!("🎨 Тип: {}\n", t.display_name()));
    }
    match session.mode {
        Mode::Single => s.push_str(&format!(
            "📍 География: {}\n",
            geography::normalize_city_display(draft.city.as_deref().unwrap_or_default())
        )),
        Mode::Batch => s.push_str(&format!(
            "📍 Города ({}): {}\n",
            draft.cities.len(),
            cities_display(&draft.cities)
        )),
    }
    if let Some(channel) = draft.channel {
        s.push_str(&format!("📺 Канал: {}\n", channel.short_name()));
    }
    if let Some(start) = f.start_date.as_deref() {
        s.push_str(&format!("📅 Действует с: {}\n", start));
    }
    if let Some(end) = f.end_date.as_deref() {
        s.push_str(&format!("📅 Действует до: {}\n", end));
    }
    if let Some(max) = f.max_discount_amount {
        s.push_str(&format!("💰 Макс. скидка: {} ₽\n", max));
    }
    if let Some(size) = f.discount_size {
        s.push_str(&format!(
            "💰 Размер скидки: {}{}\n",
            format_amount(size),
            f.discount_unit.as_deref().unwrap_or_default()
        ));
    }
    if f.first_order_only {
        s.push_str("🎯 Только первый заказ: Да\n");
    }
    if let Some(category) = f.specific_category.as_deref() {
        s.push_str(&format!("🏷 Категория: {}\n", category));
    }
    if let Some(min) = f.min_order_amount {
        s.push_str(&format!("📦 Мин. сумма заказа: {} ₽\n", min));
    }
    if let Some(max) = f.max_promo_discount {
        s.push_str(&format!("💳 Макс. скидка: {} ₽\n", max));
    }
    if let Some(count) = f.usage_count {
        s.push_str(&format!("🔄 Применений: {} раз\n", count));
    }
    if f.add_delivery_info {
        s.push_str("🚚 Доставка: Да\n");
    }

    s.push_str("\nВсе верно?");
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(creative_type: CreativeType) -> Draft {
        Draft {
            creative_type: Some(creative_type),
            ..Default::default()
        }
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("/create"), Some(Command::Create));
        assert_eq!(Command::parse(" /Skip "), Some(Command::Skip));
        assert_eq!(Command::parse("/batch@LavkaBot"), Some(Command::Batch));
        assert_eq!(Command::parse("/help me"), Some(Command::Help));
        assert_eq!(Command::parse(MENU_CREATE), Some(Command::Create));
        assert_eq!(Command::parse("create"), None);
        assert_eq!(Command::parse("/unknown"), None);
        assert_eq!(Command::parse("/"), None);
    }

    #[test]
    fn question_order_follows_schema() {
        let d = draft(CreativeType::PromoCode);
        assert_eq!(next_state(Mode::Single, &d, Field::City), DialogState::ChoosingChannel);
        assert_eq!(next_state(Mode::Single, &d, Field::Channel), DialogState::EnteringEndDate);
        assert_eq!(next_state(Mode::Single, &d, Field::EndDate), DialogState::EnteringDiscountSize);
        assert_eq!(next_state(Mode::Single, &d, Field::MaxPromoDiscount), DialogState::Confirming);

        let d = draft(CreativeType::Vendor);
        assert_eq!(next_state(Mode::Batch, &d, Field::Channel), DialogState::EnteringStartDate);
        assert_eq!(next_state(Mode::Batch, &d, Field::StartDate), DialogState::EnteringEndDate);

        assert_eq!(next_state(Mode::Single, &draft(CreativeType::Image), Field::Channel), DialogState::Confirming);
    }

    #[test]
    fn delivery_text_only_when_requested() {
        let mut d = draft(CreativeType::ClassicNewcomer);
        assert_eq!(next_state(Mode::Single, &d, Field::AddDeliveryInfo), DialogState::Confirming);

        d.fields.add_delivery_info = true;
        assert_eq!(next_state(Mode::Single, &d, Field::AddDeliveryInfo), DialogState::EnteringDeliveryText);
    }

    #[test]
    fn city_question_depends_on_mode() {
        let d = draft(CreativeType::Product);
        assert_eq!(entry_state(Field::City, Mode::Single, &d), Some(DialogState::ChoosingGeography));
        assert_eq!(entry_state(Field::City, Mode::Batch, &d), Some(DialogState::ChoosingMultipleGeography));
    }

    #[test]
    fn yes_no_tokens() {
        assert_eq!(yes_no_answer("first:yes", "first"), Some(true));
        assert_eq!(yes_no_answer("first:no", "first"), Some(false));
        assert_eq!(yes_no_answer("firstno", "first"), None);
        assert_eq!(yes_no_answer("delivery:yes", "first"), None);
    }

    #[test]
    fn help_keeps_the_current_question() {
        let mut session = ConversationSession::new();
        session.restart(Mode::Single);
        let reply = run_command(&mut session, Command::Help);
        assert!(reply.text.ends_with("Выберите тип креатива:"));
        assert_eq!(session.state, DialogState::ChoosingType);
    }
}
