//! Enquiry submission and new-user profile completion.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{ItemId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnquiryError {
    #[error("Please accept terms & conditions")]
    TermsNotAccepted,

    #[error("Please enter your name")]
    MissingName,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please login first")]
    NotLoggedIn,

    #[error("{0}")]
    Failed(String),
}

/// What the user typed into the enquiry dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnquiryForm {
    pub full_name: String,
    pub email: String,
    pub city: String,
    pub agree_to_terms: bool,
}

impl EnquiryForm {
    pub fn validate(&self) -> Result<(), EnquiryError> {
        if !self.agree_to_terms {
            return Err(EnquiryError::TermsNotAccepted);
        }
        if self.full_name.trim().is_empty() {
            return Err(EnquiryError::MissingName);
        }
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(EnquiryError::InvalidEmail),
        }
    }
}

/// Body of `POST auctions/submit-enquiry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnquiryRequest {
    pub item_id: ItemId,
    pub product_id: ItemId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub new_user: bool,
}

impl EnquiryRequest {
    pub fn new(item_id: &ItemId, form: &EnquiryForm, phone: &str, new_user: bool) -> Self {
        Self {
            item_id: item_id.clone(),
            product_id: item_id.clone(),
            name: form.full_name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: phone.to_string(),
            new_user,
        }
    }
}

/// Body of `POST users/update-user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub username: String,
    pub phone: String,
}

impl UpdateUserRequest {
    /// The username is derived as `<email local part>_<now_ms>`.
    pub fn new(id: &UserId, form: &EnquiryForm, phone: &str, now_ms: i64) -> Self {
        let email = form.email.trim();
        let local = email.split('@').next().unwrap_or_default();
        Self {
            id: id.clone(),
            name: form.full_name.trim().to_string(),
            email: email.to_string(),
            username: format!("{local}_{now_ms}"),
            phone: phone.to_string(),
        }
    }
}

/// Name and email remembered between enquiry dialogs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormPrefill {
    pub full_name: String,
    pub email: String,
    pub emd_amount: Option<String>,
    pub pan_number: Option<String>,
}
