use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::repository::Entity;
use crate::validation::not_blank;

pub const INQUIRY_TYPE_FIELD: &str = "inquiryType";
pub const CONTACT_METHOD_FIELD: &str = "contactMethod";

/// A message left through the contact form, stored in `contact_messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub inquiry_type: Option<String>,
    pub contact_method: Option<String>,
    pub message: String,
    #[serde(default)]
    pub resolved: bool,
    created_at: DateTime<Utc>,
}

impl ContactMessage {
    pub fn new(req: NewContactMessage) -> Self {
        Self {
            id: None,
            name: req.name,
            email: req.email,
            inquiry_type: req.inquiry_type,
            contact_method: req.contact_method,
            message: req.message,
            resolved: false,
            created_at: Utc::now(),
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for ContactMessage {
    const COLLECTION: &'static str = "contact_messages";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct NewContactMessage {
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    pub name: String,
    #[validate(
        custom(function = "not_blank", message = "Email is required"),
        email(message = "Invalid email address")
    )]
    pub email: String,
    pub inquiry_type: Option<String>,
    pub contact_method: Option<String>,
    #[validate(custom(function = "not_blank", message = "Message is required"))]
    pub message: String,
}
