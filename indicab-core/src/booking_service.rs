use std::sync::Arc;

use chrono::NaiveDate;
use indicab_shared::Masked;
use tracing::{debug, info};

use crate::booking::{Booking, DailyCount, NewBooking, StatusCount, PICKUP_DATE_FIELD, STATUS_FIELD};
use crate::repository::{Repository, StoreError};
use crate::validation::{self, FieldError};
use crate::{CoreError, CoreResult};

/// Booking submissions, status changes and the two booking reports.
pub struct BookingService {
    repo: Arc<dyn Repository<Booking>>,
}

impl BookingService {
    pub fn new(repo: Arc<dyn Repository<Booking>>) -> Self {
        Self { repo }
    }

    /// Validates and stores a new booking. Nothing is written when validation fails.
    pub async fn create_booking(&self, req: NewBooking) -> CoreResult<Booking> {
        validation::check(&req)?;

        let booking = self.repo.save(Booking::new(req)).await?;
        info!(
            booking_id = ?booking.id,
            customer = %Masked(&booking.customer_email),
            "Booking created"
        );
        Ok(booking)
    }

    pub async fn list_bookings(&self) -> CoreResult<Vec<Booking>> {
        let bookings = self.repo.find_all().await?;
        debug!("Listed {} bookings", bookings.len());
        Ok(bookings)
    }

    pub async fn list_bookings_with_status(&self, status: &str) -> CoreResult<Vec<Booking>> {
        Ok(self.repo.find_where(&[(STATUS_FIELD, status)]).await?)
    }

    pub async fn get_booking(&self, id: &str) -> CoreResult<Booking> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("booking {}", id)))
    }

    /// Overwrites the status with `status` as given. Any non-blank value is accepted.
    pub async fn update_status(&self, id: &str, status: String) -> CoreResult<Booking> {
        if status.trim().is_empty() {
            return Err(CoreError::ValidationError(vec![FieldError::new(
                STATUS_FIELD,
                "Status is required",
            )]));
        }

        let mut booking = self.get_booking(id).await?;
        let previous = std::mem::replace(&mut booking.status, status);
        let booking = self.repo.save(booking).await?;
        info!(booking_id = id, from = %previous, to = %booking.status, "Booking status updated");
        Ok(booking)
    }

    /// Count of bookings per distinct status. Order is whatever the store groups in.
    pub async fn status_counts(&self) -> CoreResult<Vec<StatusCount>> {
        let groups = self.repo.count_by(STATUS_FIELD, false).await?;
        Ok(groups
            .into_iter()
            .map(|g| StatusCount {
                status: g.key,
                count: g.count,
            })
            .collect())
    }

    /// Count of bookings per pickup date, ascending. Bookings without a
    /// pickup date are reported first under a null date.
    pub async fn bookings_per_day(&self) -> CoreResult<Vec<DailyCount>> {
        let groups = self
            .repo
            .count_by(PICKUP_DATE_FIELD, true)
            .await?;

        groups
            .into_iter()
            .map(|g| -> CoreResult<DailyCount> {
                let pickup_date = match g.key {
                    Some(key) => Some(key.parse::<NaiveDate>().map_err(|e| {
                        StoreError::Serialization(format!("invalid pickup date {:?}: {}", key, e))
                    })?),
                    None => None,
                };
                Ok(DailyCount {
                    pickup_date,
                    count: g.count,
                })
            })
            .collect()
    }
}
