use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::CustomerError;
use super::value_objects::{Email, PhoneNumber};

// ============================================================================
// Customer Record
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub phone: PhoneNumber,
    pub email: Option<Email>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw registration input as it arrives from a form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

impl Customer {
    /// Validate input and build a record ready for the store.
    /// Nothing is written when this fails.
    pub fn register(input: NewCustomer) -> Result<Self, CustomerError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(CustomerError::EmptyName);
        }

        let phone = input.phone.trim();
        if phone.is_empty() {
            return Err(CustomerError::EmptyPhone);
        }

        let email = non_blank(input.email.as_ref()).map(Email::new);
        if let Some(email) = &email {
            validate_email(email)?;
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            phone: PhoneNumber::new(phone),
            email,
            address: non_blank(input.address.as_ref()),
            created_at: Utc::now(),
        })
    }
}

/// Basic email format check
fn validate_email(email: &Email) -> Result<(), CustomerError> {
    let value = email.as_str();
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(CustomerError::InvalidEmail(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_customer() -> NewCustomer {
        NewCustomer {
            name: "  Asha Patel ".to_string(),
            phone: "555-0101".to_string(),
            email: Some("asha@example.com".to_string()),
            address: Some("   ".to_string()),
        }
    }

    #[test]
    fn test_customer_registration() {
        let customer = Customer::register(new_customer()).unwrap();

        assert_eq!(customer.name, "Asha Patel");
        assert_eq!(customer.phone.as_str(), "555-0101");
        assert_eq!(customer.email.as_ref().map(Email::as_str), Some("asha@example.com"));
        assert_eq!(customer.address, None);
    }

    #[test]
    fn test_registration_with_empty_name_fails() {
        let input = NewCustomer { name: " ".to_string(), ..new_customer() };
        assert!(matches!(Customer::register(input).unwrap_err(), CustomerError::EmptyName));
    }

    #[test]
    fn test_registration_with_empty_phone_fails() {
        let input = NewCustomer { phone: String::new(), ..new_customer() };
        assert!(matches!(Customer::register(input).unwrap_err(), CustomerError::EmptyPhone));
    }

    #[test]
    fn test_registration_with_invalid_email_fails() {
        let input = NewCustomer { email: Some("invalid-email".to_string()), ..new_customer() };
        assert!(matches!(Customer::register(input).unwrap_err(), CustomerError::InvalidEmail(_)));
    }

    #[test]
    fn test_blank_email_is_treated_as_absent() {
        let input = NewCustomer { email: Some("".to_string()), ..new_customer() };
        let customer = Customer::register(input).unwrap();
        assert!(customer.email.is_none());
    }
}
