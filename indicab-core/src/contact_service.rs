use std::sync::Arc;

use indicab_shared::Masked;
use tracing::{debug, info};

use crate::contact::{ContactMessage, NewContactMessage, CONTACT_METHOD_FIELD, INQUIRY_TYPE_FIELD};
use crate::repository::Repository;
use crate::validation;
use crate::{CoreError, CoreResult};

pub struct ContactMessageService {
    repo: Arc<dyn Repository<ContactMessage>>,
}

impl ContactMessageService {
    pub fn new(repo: Arc<dyn Repository<ContactMessage>>) -> Self {
        Self { repo }
    }

    pub async fn create_contact_message(&self, req: NewContactMessage) -> CoreResult<ContactMessage> {
        validation::check(&req)?;

        let message = self.repo.save(ContactMessage::new(req)).await?;
        info!(
            message_id = ?message.id,
            sender = %Masked(&message.email),
            "Contact message received"
        );
        Ok(message)
    }

    pub async fn list_contact_messages(&self) -> CoreResult<Vec<ContactMessage>> {
        let messages = self.repo.find_all().await?;
        debug!("Listed {} contact messages", messages.len());
        Ok(messages)
    }

    /// Filters on inquiry type and/or contact method; with neither this is a plain listing.
    pub async fn list_contact_messages_by(
        &self,
        inquiry_type: Option<&str>,
        contact_method: Option<&str>,
    ) -> CoreResult<Vec<ContactMessage>> {
        let mut criteria = Vec::new();
        if let Some(inquiry_type) = inquiry_type {
            criteria.push((INQUIRY_TYPE_FIELD, inquiry_type));
        }
        if let Some(contact_method) = contact_method {
            criteria.push((CONTACT_METHOD_FIELD, contact_method));
        }
        Ok(self.repo.find_where(&criteria).await?)
    }

    pub async fn get_contact_message(&self, id: &str) -> CoreResult<ContactMessage> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("contact message {}", id)))
    }

    /// Sets `resolved`. Resolving an already resolved message leaves it unchanged.
    pub async fn mark_resolved(&self, id: &str) -> CoreResult<ContactMessage> {
        let mut message = self.get_contact_message(id).await?;
        message.resolved = true;
        let message = self.repo.save(message).await?;
        info!(message_id = id, "Contact message resolved");
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryRepository;

    fn setup() -> (Arc<InMemoryRepository<ContactMessage>>, ContactMessageService) {
        let repo = Arc::new(InMemoryRepository::new());
        let service = ContactMessageService::new(repo.clone());
        (repo, service)
    }

    fn request(inquiry_type: &str, contact_method: &str) -> NewContactMessage {
        NewContactMessage {
            name: "Ravi Kumar".to_string(),
            email: "ravi@example.com".to_string(),
            inquiry_type: Some(inquiry_type.to_string()),
            contact_method: Some(contact_method.to_string()),
            message: "Need an Innova for a weekend trip".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_starts_unresolved() {
        let (_repo, service) = setup();
        let msg = service.create_contact_message(request("booking", "email")).await.unwrap();
        assert!(msg.id.is_some());
        assert!(!msg.resolved);
    }

    #[tokio::test]
    async fn test_invalid_message_not_persisted() {
        let (repo, service) = setup();
        let mut req = request("general", "phone");
        req.email = "ravi".to_string();

        let err = service.create_contact_message(req).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_mark_resolved_is_idempotent() {
        let (_repo, service) = setup();
        let id = service
            .create_contact_message(request("feedback", "whatsapp"))
            .await
            .unwrap()
            .id
            .unwrap();

        let first = service.mark_resolved(&id).await.unwrap();
        let second = service.mark_resolved(&id).await.unwrap();

        assert!(first.resolved);
        assert_eq!(first, second);
        assert_eq!(service.list_contact_messages().await.unwrap(), vec![second]);
    }

    #[tokio::test]
    async fn test_mark_resolved_unknown_id() {
        let (repo, service) = setup();
        let err = service.mark_resolved("missing").await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_by_filters() {
        let (_repo, service) = setup();
        service.create_contact_message(request("booking", "email")).await.unwrap();
        service.create_contact_message(request("booking", "phone")).await.unwrap();
        service.create_contact_message(request("corporate", "email")).await.unwrap();

        assert_eq!(service.list_contact_messages_by(Some("booking"), None).await.unwrap().len(), 2);
        assert_eq!(service.list_contact_messages_by(None, Some("email")).await.unwrap().len(), 2);
        assert_eq!(
            service
                .list_contact_messages_by(Some("booking"), Some("phone"))
                .await
                .unwrap()
                .len(),
            1
        );
        assert_eq!(service.list_contact_messages_by(None, None).await.unwrap().len(), 3);
    }
}
