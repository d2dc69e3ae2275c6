pub mod booking;
pub mod booking_service;
pub mod contact;
pub mod contact_service;
pub mod memory;
pub mod repository;
pub mod validation;

pub use booking::{Booking, DailyCount, NewBooking, StatusCount};
pub use booking_service::BookingService;
pub use contact::{ContactMessage, NewContactMessage};
pub use contact_service::ContactMessageService;
pub use memory::InMemoryRepository;
pub use repository::{Entity, GroupCount, Repository, StoreError, StoreResult};
pub use validation::FieldError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {}", FieldError::summary(.0))]
    ValidationError(Vec<FieldError>),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type CoreResult<T> = Result<T, CoreError>;
