use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    models::{
        Appointment, AppointmentRequest, Booking, Health, Listing, ListingSearch, OrderStatus,
        RelatedItem, ReturnReceipt, ReturnRequest, SlotsResponse, Speciality, ViewingRequest,
    },
    MockApiClient, MockApiError, QueryParams, Result,
};

pub const HEALTH_PATH: &str = "/healthz";
pub const ORDER_PATH: &str = "/mock/ecom/order";
pub const RETURN_PATH: &str = "/mock/ecom/return";
pub const RELATED_PATH: &str = "/mock/ecom/related";
pub const REALTY_SEARCH_PATH: &str = "/mock/realty/search";
pub const REALTY_BOOK_PATH: &str = "/mock/realty/book";
pub const CLINIC_SLOTS_PATH: &str = "/mock/clinic/slots";
pub const CLINIC_BOOK_PATH: &str = "/mock/clinic/book";

pub(crate) fn decode_model<T: DeserializeOwned>(value: Value, path: &str) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|err| MockApiError::Decode(format!("unexpected response shape from {path}: {err}")))
}

impl MockApiClient {
    pub async fn health(&self) -> Result<Health> {
        let value = self.get(HEALTH_PATH, ()).await?;
        decode_model(value, HEALTH_PATH)
    }

    /// Looks up the delivery status of an order.
    pub async fn order_status(&self, order_id: &str) -> Result<OrderStatus> {
        let value = self.get(ORDER_PATH, [("order_id", order_id)]).await?;
        decode_model(value, ORDER_PATH)
    }

    /// Opens a return for one order line. Unknown SKUs are rejected with 404.
    pub async fn create_return(&self, request: &ReturnRequest) -> Result<ReturnReceipt> {
        let value = self.post(RETURN_PATH, request).await?;
        decode_model(value, RETURN_PATH)
    }

    /// Returns up to `limit` upsell suggestions for `sku`.
    pub async fn related_items(&self, sku: &str, limit: u32) -> Result<Vec<RelatedItem>> {
        let query = QueryParams::new().with("sku", sku).with("limit", limit);
        let value = self.get(RELATED_PATH, query).await?;
        decode_model(value, RELATED_PATH)
    }

    pub async fn search_listings(&self, search: &ListingSearch) -> Result<Vec<Listing>> {
        let value = self.get(REALTY_SEARCH_PATH, search.to_query()).await?;
        decode_model(value, REALTY_SEARCH_PATH)
    }

    /// Books a viewing. Unknown listings are rejected with 404.
    pub async fn book_viewing(&self, request: &ViewingRequest) -> Result<Booking> {
        let value = self.post(REALTY_BOOK_PATH, request).await?;
        decode_model(value, REALTY_BOOK_PATH)
    }

    /// Lists free appointment slots as ISO 8601 date-times.
    pub async fn clinic_slots(
        &self,
        speciality: Speciality,
        date_from: Option<&str>,
    ) -> Result<Vec<String>> {
        let query = QueryParams::new()
            .with("speciality", speciality.as_str())
            .with_opt("date_from", date_from);
        let value = self.get(CLINIC_SLOTS_PATH, query).await?;
        let response: SlotsResponse = decode_model(value, CLINIC_SLOTS_PATH)?;
        Ok(response.slots)
    }

    pub async fn book_appointment(&self, request: &AppointmentRequest) -> Result<Appointment> {
        let value = self.post(CLINIC_BOOK_PATH, request).await?;
        decode_model(value, CLINIC_BOOK_PATH)
    }
}
