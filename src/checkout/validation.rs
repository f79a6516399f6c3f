//! Contact-field checks run before anything is priced or persisted.

use crate::domain::{CustomerInfo, PaymentMethod};
use crate::error::CheckoutError;

const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

/// Fails on the first missing or malformed field, naming it.
pub fn validate_customer(customer: &CustomerInfo, method: PaymentMethod) -> Result<(), CheckoutError> {
    if customer.name.trim().is_empty() {
        return Err(CheckoutError::validation("name", "Please enter your full name."));
    }
    if customer.phone.trim().is_empty() {
        return Err(CheckoutError::validation("phone", "Please enter your phone number."));
    }
    if !is_valid_phone(&customer.phone) {
        return Err(CheckoutError::validation("phone", "Please enter a valid phone number."));
    }
    if let Some(email) = customer.email.as_deref().filter(|e| !e.trim().is_empty()) {
        if !is_valid_email(email) {
            return Err(CheckoutError::validation("email", "Please enter a valid email address."));
        }
    }
    if method.requires_address() && customer.address.as_deref().map_or(true, |a| a.trim().is_empty()) {
        return Err(CheckoutError::validation(
            "address",
            "A delivery address is required for cash on delivery.",
        ));
    }
    Ok(())
}

/// Optional leading `+`, then 7 to 15 digits. Spaces, dashes, dots and
/// parentheses are ignored.
pub fn is_valid_phone(phone: &str) -> bool {
    let trimmed = phone.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let mut digits = 0;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return false,
        }
    }
    (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
}

pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> CustomerInfo {
        CustomerInfo {
            name: "Mariam Al Nuaimi".into(),
            phone: "+971 50 123 4567".into(),
            email: Some("mariam@example.ae".into()),
            address: Some("Villa 12, Al Wasl Road".into()),
            city: Some("Dubai".into()),
            user_id: None,
        }
    }

    fn failed_field(result: Result<(), CheckoutError>) -> Option<&'static str> {
        match result {
            Err(CheckoutError::Validation { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn test_complete_customer_passes() {
        assert_eq!(validate_customer(&customer(), PaymentMethod::HomeDelivery), Ok(()));
    }

    #[test]
    fn test_missing_name_is_reported() {
        let mut c = customer();
        c.name = "   ".into();
        assert_eq!(failed_field(validate_customer(&c, PaymentMethod::HomeDelivery)), Some("name"));
    }

    #[test]
    fn test_phone_format() {
        assert!(is_valid_phone("0501234567"));
        assert!(is_valid_phone("+1 (555) 010-9999"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("+97150abc4567"));
        assert!(!is_valid_phone("++971501234567"));
    }

    #[test]
    fn test_address_only_required_for_home_delivery() {
        let mut c = customer();
        c.address = None;
        assert_eq!(failed_field(validate_customer(&c, PaymentMethod::HomeDelivery)), Some("address"));
        assert_eq!(validate_customer(&c, PaymentMethod::BankTransfer), Ok(()));
        assert_eq!(validate_customer(&c, PaymentMethod::Whatsapp), Ok(()));
    }

    #[test]
    fn test_email_checked_only_when_given() {
        let mut c = customer();
        c.email = Some("not-an-email".into());
        assert_eq!(failed_field(validate_customer(&c, PaymentMethod::Online)), Some("email"));
        c.email = Some(String::new());
        assert_eq!(validate_customer(&c, PaymentMethod::Online), Ok(()));
    }
}
