//! Request and response bodies of the mock API.

use serde::{Deserialize, Serialize};

use crate::QueryParams;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub ok: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub sku: String,
    pub name: String,
}

/// Delivery status of an e-commerce order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatus {
    pub order_id: String,
    pub status: String,
    /// Estimated delivery date, `YYYY-MM-DD`.
    pub eta: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnCondition {
    New,
    Used,
    Damaged,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnRequest {
    pub order_id: String,
    pub item_sku: String,
    pub reason: String,
    pub condition: ReturnCondition,
}

/// Return merchandise authorization issued by the shop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnReceipt {
    pub rma: String,
    pub label_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedItem {
    pub sku: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub price: u64,
    pub address: String,
    pub rooms: u32,
    pub area: f64,
}

/// Filters for the listing search. Only `budget_max` is required.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListingSearch {
    pub budget_max: u64,
    pub district: Option<String>,
    pub rooms: Option<u32>,
    pub mortgage: Option<bool>,
}

impl ListingSearch {
    pub fn new(budget_max: u64) -> Self {
        Self {
            budget_max,
            ..Self::default()
        }
    }

    pub(crate) fn to_query(&self) -> QueryParams {
        let budget_max = i64::try_from(self.budget_max).unwrap_or(i64::MAX);
        QueryParams::new()
            .with("budget_max", budget_max)
            .with_opt("district", self.district.as_deref())
            .with_opt("rooms", self.rooms)
            .with_opt("mortgage", self.mortgage)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewingRequest {
    pub listing_id: String,
    /// ISO 8601 local date-time, e.g. `2025-08-21T19:00`.
    pub datetime: String,
    pub name: String,
    pub phone: String,
}

/// Confirmation of a listing viewing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub status: String,
    pub calendar_invite: String,
}

impl Booking {
    pub fn is_booked(&self) -> bool {
        self.status == "booked"
    }
}

/// Clinic doctor speciality, serialized with the clinic's own labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speciality {
    #[serde(rename = "лор")]
    Otolaryngologist,
    #[serde(rename = "терапевт")]
    Therapist,
    #[serde(rename = "педиатр")]
    Pediatrician,
    #[serde(rename = "кардиолог")]
    Cardiologist,
}

impl Speciality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Otolaryngologist => "лор",
            Self::Therapist => "терапевт",
            Self::Pediatrician => "педиатр",
            Self::Cardiologist => "кардиолог",
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SlotsResponse {
    pub slots: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub speciality: Speciality,
    pub datetime: String,
    pub name: String,
    pub phone: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub status: String,
    pub ticket: String,
}

impl Appointment {
    pub fn is_booked(&self) -> bool {
        self.status == "booked"
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ListingSearch, ReturnCondition, ReturnRequest, Speciality};
    use crate::Scalar;

    #[test]
    fn speciality_uses_clinic_labels() {
        assert_eq!(
            serde_json::to_value(Speciality::Otolaryngologist).expect("must serialize"),
            json!("лор")
        );
        let parsed: Speciality = serde_json::from_value(json!("кардиолог")).expect("must parse");
        assert_eq!(parsed, Speciality::Cardiologist);
        assert_eq!(Speciality::Therapist.as_str(), "терапевт");
    }

    #[test]
    fn return_request_condition_is_snake_case() {
        let request = ReturnRequest {
            order_id: "1234".to_owned(),
            item_sku: "HOO-XL".to_owned(),
            reason: "size".to_owned(),
            condition: ReturnCondition::New,
        };
        let value = serde_json::to_value(&request).expect("must serialize");
        assert_eq!(value["condition"], json!("new"));
    }

    #[test]
    fn listing_search_omits_missing_filters() {
        let search = ListingSearch {
            rooms: Some(2),
            ..ListingSearch::new(15_000_000)
        };
        let query: Vec<(String, Scalar)> = search
            .to_query()
            .iter()
            .map(|(name, value)| (name.to_owned(), value.clone()))
            .collect();
        assert_eq!(
            query,
            vec![
                ("budget_max".to_owned(), Scalar::Integer(15_000_000)),
                ("rooms".to_owned(), Scalar::Integer(2)),
            ]
        );
    }
}
