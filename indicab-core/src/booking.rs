use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::repository::Entity;
use crate::validation::not_blank;

pub const DEFAULT_STATUS: &str = "pending";

/// Document field names used by the booking reports and filters.
pub const STATUS_FIELD: &str = "status";
pub const PICKUP_DATE_FIELD: &str = "pickupDate";

/// A vehicle rental booking as stored in the `bookings` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub pickup_location: String,
    pub dropoff_location: Option<String>,
    pub pickup_date: Option<NaiveDate>,
    pub pickup_time: String,
    pub return_date: Option<NaiveDate>,
    pub return_time: Option<String>,
    pub rental_duration: Option<i32>,
    pub special_requests: Option<String>,
    // Free text: no fixed set of statuses is enforced.
    #[serde(default = "default_status")]
    pub status: String,
    pub estimated_fare: Option<f64>,
    created_at: DateTime<Utc>,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

impl Booking {
    /// Builds an unsaved booking from a submission. The creation timestamp is
    /// fixed here and never changes afterwards.
    pub fn new(req: NewBooking) -> Self {
        let status = req
            .status
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(default_status);

        Self {
            id: None,
            customer_name: req.customer_name,
            customer_email: req.customer_email,
            pickup_location: req.pickup_location,
            dropoff_location: req.dropoff_location,
            pickup_date: req.pickup_date,
            pickup_time: req.pickup_time,
            return_date: req.return_date,
            return_time: req.return_time,
            rental_duration: req.rental_duration,
            special_requests: req.special_requests,
            status,
            estimated_fare: req.estimated_fare,
            created_at: Utc::now(),
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Booking {
    const COLLECTION: &'static str = "bookings";
    const DATE_FIELDS: &'static [&'static str] = &[PICKUP_DATE_FIELD, "returnDate"];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

/// Booking submission. Every field defaults so that a missing required field
/// is reported by validation rather than as a malformed body.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct NewBooking {
    #[validate(custom(function = "not_blank", message = "Customer name is required"))]
    pub customer_name: String,
    #[validate(
        custom(function = "not_blank", message = "Customer email is required"),
        email(message = "Invalid email address")
    )]
    pub customer_email: String,
    #[validate(custom(function = "not_blank", message = "Pickup location is required"))]
    pub pickup_location: String,
    pub dropoff_location: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub pickup_date: Option<NaiveDate>,
    #[validate(custom(function = "not_blank", message = "Pickup time is required"))]
    pub pickup_time: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub return_date: Option<NaiveDate>,
    pub return_time: Option<String>,
    pub rental_duration: Option<i32>,
    pub special_requests: Option<String>,
    pub status: Option<String>,
    pub estimated_fare: Option<f64>,
}

/// Booking forms post `""` for untouched date inputs.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Number of bookings carrying one status value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: Option<String>,
    pub count: u64,
}

/// Number of bookings picked up on one calendar day. `pickup_date` is `None`
/// for bookings submitted without a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    pub pickup_date: Option<NaiveDate>,
    pub count: u64,
}
