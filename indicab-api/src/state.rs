use std::sync::Arc;

use indicab_core::{
    Booking, BookingService, ContactMessage, ContactMessageService, InMemoryRepository, Repository,
};

#[derive(Clone)]
pub struct AppState {
    pub bookings: Arc<BookingService>,
    pub contact_messages: Arc<ContactMessageService>,
}

impl AppState {
    pub fn new(
        bookings: Arc<dyn Repository<Booking>>,
        contact_messages: Arc<dyn Repository<ContactMessage>>,
    ) -> Self {
        Self {
            bookings: Arc::new(BookingService::new(bookings)),
            contact_messages: Arc::new(ContactMessageService::new(contact_messages)),
        }
    }

    /// State backed by process-local collections; nothing survives a restart.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryRepository::<Booking>::new()),
            Arc::new(InMemoryRepository::<ContactMessage>::new()),
        )
    }
}
