//! Notification routing for geofence alerts.

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Where alerts for a geofence are delivered.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationConfig {
    #[serde(default)]
    pub email: Vec<String>,
    #[serde(default)]
    pub sms: Vec<String>,
    #[serde(default)]
    pub push_notification: bool,
}

impl NotificationConfig {
    /// Adds an email recipient, ignoring blanks and duplicates.
    pub fn add_email(&mut self, address: impl Into<String>) {
        push_unique(&mut self.email, address.into());
    }

    /// Adds an SMS recipient, ignoring blanks and duplicates.
    pub fn add_sms(&mut self, number: impl Into<String>) {
        push_unique(&mut self.sms, number.into());
    }

    pub fn has_recipients(&self) -> bool {
        self.push_notification || !self.email.is_empty() || !self.sms.is_empty()
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        let emails = self
            .email
            .iter()
            .filter(|address| shared::validation::validate_email_address(address).is_err())
            .map(|address| ValidationError::InvalidEmail {
                address: address.clone(),
            });

        let phones = self
            .sms
            .iter()
            .filter(|number| shared::validation::validate_phone_number(number).is_err())
            .map(|number| ValidationError::InvalidPhone {
                number: number.clone(),
            });

        emails.chain(phones).collect()
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    let value = value.trim().to_string();
    if !value.is_empty() && !list.contains(&value) {
        list.push(value);
    }
}
