//! Keyword router that turns user text into mock API calls and canned replies.
//!
//! The router is transport-agnostic: a chat front end feeds it `(user_id, text)`
//! and sends back every returned reply in order.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::{
    models::{
        AppointmentRequest, ListingSearch, ReturnCondition, ReturnRequest, Speciality,
        ViewingRequest,
    },
    ErrorKind, MockApiClient, MockApiError, Result,
};

pub const GREETING: &str = "Демо-бот запущен.\n\
    Доступные режимы: ecom | realty | clinic\n\n\
    Напишите один из режимов, чтобы переключиться.";
pub const FALLBACK_REPLY: &str = "Я понял вас. Для демо попробуйте сценарии из выбранного режима.";
pub const UNAVAILABLE_REPLY: &str = "Сервис временно недоступен, попробуйте позже.";
pub const REJECTED_REPLY: &str = "Не удалось выполнить запрос, проверьте данные.";
pub const MALFORMED_REPLY: &str = "Сервис ответил некорректно, попробуйте позже.";

const DEFAULT_ORDER_ID: &str = "1234";
const RETURN_SKU: &str = "HOO-XL";
const UPSELL_LIMIT: u32 = 3;
const VIEWING_LISTING: &str = "APT-202";

/// Business scenario a user is currently talking to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Ecom,
    Realty,
    Clinic,
}

impl Mode {
    /// Parses a mode name, ignoring case. The whole message must be the name.
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_lowercase().as_str() {
            "ecom" => Some(Self::Ecom),
            "realty" => Some(Self::Realty),
            "clinic" => Some(Self::Clinic),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ecom => "ecom",
            Self::Realty => "realty",
            Self::Clinic => "clinic",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Picks the user-facing reply for a failed upstream call.
pub fn error_reply(err: &MockApiError) -> &'static str {
    match err.kind() {
        ErrorKind::Transient => UNAVAILABLE_REPLY,
        ErrorKind::Rejected => REJECTED_REPLY,
        ErrorKind::Decode => MALFORMED_REPLY,
    }
}

/// Formats a price with space-separated thousands, e.g. `14 500 000`.
pub fn format_price(price: u64) -> String {
    let digits = price.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

/// Per-user scenario state plus the shared mock API client.
///
/// Modes live in memory only and are lost on restart.
pub struct Assistant {
    api: MockApiClient,
    modes: Mutex<HashMap<i64, Mode>>,
}

impl fmt::Debug for Assistant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assistant").field("api", &self.api).finish()
    }
}

impl Assistant {
    pub fn new(api: MockApiClient) -> Self {
        Self {
            api,
            modes: Mutex::new(HashMap::new()),
        }
    }

    pub fn api(&self) -> &MockApiClient {
        &self.api
    }

    /// Current mode of `user_id`; users that never chose one are in [`Mode::Ecom`].
    pub fn mode(&self, user_id: i64) -> Mode {
        self.modes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user_id)
            .copied()
            .unwrap_or_default()
    }

    fn set_mode(&self, user_id: i64, mode: Mode) {
        self.modes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id, mode);
    }

    /// Resets the user to the default scenario and returns the greeting.
    pub fn start(&self, user_id: i64) -> String {
        self.set_mode(user_id, Mode::default());
        GREETING.to_owned()
    }

    /// Routes one message and returns the replies to send, in order.
    ///
    /// Upstream failures never escape: they are logged and turned into a reply.
    pub async fn handle_text(&self, user_id: i64, text: &str) -> Vec<String> {
        if let Some(mode) = Mode::parse(text) {
            self.set_mode(user_id, mode);

            #[cfg(feature = "tracing")]
            tracing::debug!(user_id, %mode, "mode switched");

            return vec![format!(
                "Режим переключен на: {mode}. Спросите что-нибудь по сценарию."
            )];
        }

        let mode = self.mode(user_id);
        let text = text.to_lowercase();
        let routed = match mode {
            Mode::Ecom => self.ecom(user_id, &text).await,
            Mode::Realty => self.realty(&text).await,
            Mode::Clinic => self.clinic(&text).await,
        };

        match routed {
            Ok(Some(replies)) => replies,
            Ok(None) => vec![FALLBACK_REPLY.to_owned()],
            Err(err) => {
                log_failure(user_id, mode, &err);
                vec![error_reply(&err).to_owned()]
            }
        }
    }

    async fn ecom(&self, user_id: i64, text: &str) -> Result<Option<Vec<String>>> {
        if contains_any(text, &["где мой заказ", "заказ #"]) {
            let digits: String = text.chars().filter(char::is_ascii_digit).collect();
            let order_id = if digits.is_empty() {
                DEFAULT_ORDER_ID
            } else {
                digits.as_str()
            };
            let order = self.api.order_status(order_id).await?;
            return Ok(Some(vec![format!(
                "Заказ #{}: {}, ETA {}",
                order.order_id, order.status, order.eta
            )]));
        }

        if contains_any(text, &["вернуть", "возврат"]) {
            let receipt = self
                .api
                .create_return(&ReturnRequest {
                    order_id: DEFAULT_ORDER_ID.to_owned(),
                    item_sku: RETURN_SKU.to_owned(),
                    reason: "size".to_owned(),
                    condition: ReturnCondition::New,
                })
                .await?;
            let mut replies = vec![format!(
                "Создан возврат: {} — этикетка: {}",
                receipt.rma, receipt.label_url
            )];

            // The return already exists, so an upsell failure only replaces the second reply.
            match self.api.related_items(RETURN_SKU, UPSELL_LIMIT).await {
                Ok(related) => {
                    let names: Vec<&str> = related.iter().map(|item| item.name.as_str()).collect();
                    replies.push(format!(
                        "Рекомендую добавить к заказу: {}. Нужна помощь?",
                        names.join(", ")
                    ));
                }
                Err(err) => {
                    log_failure(user_id, Mode::Ecom, &err);
                    replies.push(error_reply(&err).to_owned());
                }
            }
            return Ok(Some(replies));
        }

        Ok(None)
    }

    async fn realty(&self, text: &str) -> Result<Option<Vec<String>>> {
        if contains_any(text, &["квартира", "2-к", "2к"]) {
            let search = ListingSearch {
                budget_max: 15_000_000,
                district: Some("ЮЗАО".to_owned()),
                rooms: Some(2),
                mortgage: Some(true),
            };
            let listings = self.api.search_listings(&search).await?;
            let preview: Vec<String> = listings
                .iter()
                .map(|listing| {
                    format!(
                        "{}: {} ₽ — {}",
                        listing.id,
                        format_price(listing.price),
                        listing.address
                    )
                })
                .collect();
            return Ok(Some(vec![format!(
                "Подходящие варианты:\n{}\n\nБронируем {VIEWING_LISTING} завтра 19:00?",
                preview.join("\n")
            )]));
        }

        if contains_any(text, &["бронь", "заброни"]) {
            let booking = self
                .api
                .book_viewing(&ViewingRequest {
                    listing_id: VIEWING_LISTING.to_owned(),
                    datetime: "2025-08-21T19:00".to_owned(),
                    name: "Илья".to_owned(),
                    phone: "+7...".to_owned(),
                })
                .await?;
            let reply = if booking.is_booked() {
                "Бронь подтверждена. Приглашение отправлено."
            } else {
                "Не удалось забронировать, попробуйте позже."
            };
            return Ok(Some(vec![reply.to_owned()]));
        }

        Ok(None)
    }

    async fn clinic(&self, text: &str) -> Result<Option<Vec<String>>> {
        if contains_any(text, &["болит горло", "температура"]) {
            let slots = self
                .api
                .clinic_slots(Speciality::Otolaryngologist, Some("2025-08-20"))
                .await?;
            return Ok(Some(vec![format!(
                "Это не медицинская консультация. Рекомендую очный приём у ЛОР.\n\
                 Доступные слоты: {}",
                slots.join(", ")
            )]));
        }

        if text.contains("18:00") {
            let appointment = self
                .api
                .book_appointment(&AppointmentRequest {
                    speciality: Speciality::Otolaryngologist,
                    datetime: "2025-08-20T18:00".to_owned(),
                    name: "Олег".to_owned(),
                    phone: "+7...".to_owned(),
                })
                .await?;
            let reply = if appointment.is_booked() {
                format!("Запись подтверждена. Номер талона {}.", appointment.ticket)
            } else {
                "Не удалось записать, попробуйте позже.".to_owned()
            };
            return Ok(Some(vec![reply]));
        }

        Ok(None)
    }
}

fn log_failure(user_id: i64, mode: Mode, err: &MockApiError) {
    #[cfg(feature = "tracing")]
    tracing::warn!(user_id, %mode, kind = ?err.kind(), error = %err, "scenario call failed");

    #[cfg(not(feature = "tracing"))]
    let _ = (user_id, mode, err);
}

#[cfg(test)]
mod tests {
    use super::{error_reply, format_price, Assistant, Mode, REJECTED_REPLY, UNAVAILABLE_REPLY};
    use crate::{MockApiClient, MockApiError};

    #[test]
    fn mode_parse_is_case_insensitive() {
        assert_eq!(Mode::parse("Realty"), Some(Mode::Realty));
        assert_eq!(Mode::parse("CLINIC"), Some(Mode::Clinic));
        assert_eq!(Mode::parse(" clinic\n"), None);
        assert_eq!(Mode::parse("ecommerce"), None);
        assert_eq!(Mode::Clinic.to_string(), "clinic");
    }

    #[test]
    fn format_price_groups_thousands() {
        assert_eq!(format_price(14_500_000), "14 500 000");
        assert_eq!(format_price(999), "999");
        assert_eq!(format_price(1_000), "1 000");
        assert_eq!(format_price(0), "0");
    }

    #[test]
    fn error_reply_depends_on_kind() {
        let rejected = MockApiError::Http {
            status: 404,
            body: "{}".to_owned(),
        };
        let unavailable = MockApiError::Server {
            status: 503,
            body: String::new(),
            attempts: 3,
        };
        assert_eq!(error_reply(&rejected), REJECTED_REPLY);
        assert_eq!(error_reply(&unavailable), UNAVAILABLE_REPLY);
    }

    #[test]
    fn start_resets_mode_to_ecom() {
        let assistant = Assistant::new(MockApiClient::new("http://127.0.0.1:9"));
        assert_eq!(assistant.mode(7), Mode::Ecom);
        assistant.set_mode(7, Mode::Clinic);
        assert_eq!(assistant.mode(7), Mode::Clinic);
        assert!(assistant.start(7).contains("ecom | realty | clinic"));
        assert_eq!(assistant.mode(7), Mode::Ecom);
    }

    #[tokio::test]
    async fn switching_mode_needs_no_upstream() {
        let assistant = Assistant::new(MockApiClient::new("http://127.0.0.1:9"));
        let replies = assistant.handle_text(1, "REALTY").await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("realty"));
        assert_eq!(assistant.mode(1), Mode::Realty);
        assert_eq!(assistant.mode(2), Mode::Ecom);
    }
}
