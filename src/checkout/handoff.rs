//! Message handoff: the WhatsApp channel sends a plaintext order summary to
//! the merchant instead of persisting an order.

use std::fmt::Write;

use super::OrderDraft;
use crate::domain::format_money;

pub const DEFAULT_WHATSAPP_ENDPOINT: &str = "https://wa.me/{phone}?text={text}";

/// Target of the handoff. `endpoint` is a template with `{phone}` and `{text}` slots.
#[derive(Debug, Clone, PartialEq)]
pub struct WhatsappHandoff {
    pub number: String,
    pub endpoint: String,
}

impl Default for WhatsappHandoff {
    fn default() -> Self {
        Self {
            number: String::new(),
            endpoint: DEFAULT_WHATSAPP_ENDPOINT.to_string(),
        }
    }
}

impl WhatsappHandoff {
    pub fn new(number: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Fills the endpoint template. The phone keeps digits only; the text is URL-encoded.
    pub fn url(&self, message: &str) -> String {
        let phone: String = self.number.chars().filter(char::is_ascii_digit).collect();
        self.endpoint
            .replace("{phone}", &phone)
            .replace("{text}", &urlencoding::encode(message))
    }
}

/// Renders the order summary in a fixed order: payment method, customer,
/// items, totals, notes.
pub fn compose_message(draft: &OrderDraft) -> String {
    let money = |amount| format_money(amount, draft.currency);
    let customer = &draft.customer;
    let b = &draft.breakdown;
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "*New Order*");
    let _ = writeln!(out, "Payment: {}", draft.payment_method.label());

    let _ = writeln!(out, "\n*Customer*");
    let _ = writeln!(out, "Name: {}", customer.name.trim());
    let _ = writeln!(out, "Phone: {}", customer.phone.trim());
    for (label, value) in [
        ("Email", &customer.email),
        ("Address", &customer.address),
        ("City", &customer.city),
    ] {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            let _ = writeln!(out, "{label}: {value}");
        }
    }

    let _ = writeln!(out, "\n*Items*");
    for (index, item) in draft.items.iter().enumerate() {
        let options = if item.options.is_empty() {
            String::new()
        } else {
            format!(" ({})", item.options)
        };
        let _ = writeln!(
            out,
            "{}. {}{} {} × {} = {}",
            index + 1,
            item.name,
            options,
            item.quantity,
            money(item.price),
            money(item.total)
        );
    }

    let _ = writeln!(out, "\n*Summary*");
    let _ = writeln!(out, "Subtotal: {}", money(b.subtotal));
    if !b.discount.is_zero() {
        match &draft.coupon {
            Some(coupon) => {
                let _ = writeln!(out, "Discount ({}): -{}", coupon.code, money(b.discount));
            }
            None => {
                let _ = writeln!(out, "Discount: -{}", money(b.discount));
            }
        }
    }
    if b.has_free_shipping() {
        let _ = writeln!(out, "Shipping: FREE");
    } else {
        let _ = writeln!(out, "Shipping: {}", money(b.shipping));
    }
    if !b.tax.is_zero() {
        let _ = writeln!(out, "Tax: {}", money(b.tax));
    }
    let _ = writeln!(out, "Total: {}", money(b.total));

    if let Some(notes) = draft.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        let _ = writeln!(out, "\n*Notes*");
        let _ = writeln!(out, "{notes}");
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CurrencyCode, CustomerInfo, DiscountDescriptor, DiscountKind, OrderItem, PaymentMethod};
    use crate::pricing::PriceBreakdown;
    use rust_decimal_macros::dec;

    fn draft() -> OrderDraft {
        OrderDraft {
            customer: CustomerInfo {
                name: "Mariam".into(),
                phone: "+971 50 123 4567".into(),
                email: None,
                address: Some("Villa 12".into()),
                city: Some("Dubai".into()),
                user_id: None,
            },
            payment_method: PaymentMethod::Whatsapp,
            items: vec![
                OrderItem {
                    name: "Abaya".into(),
                    product_id: "p1".into(),
                    variant_id: Some("p1-m".into()),
                    options: "M / Black".into(),
                    quantity: 2,
                    price: dec!(100),
                    total: dec!(200),
                    image: None,
                    stock_removed: 0,
                },
                OrderItem {
                    name: "Scarf".into(),
                    product_id: "p2".into(),
                    variant_id: None,
                    options: String::new(),
                    quantity: 1,
                    price: dec!(50),
                    total: dec!(50),
                    image: None,
                    stock_removed: 0,
                },
            ],
            currency: CurrencyCode::AED,
            breakdown: PriceBreakdown {
                subtotal: dec!(250),
                discount: dec!(25),
                subtotal_after_discount: dec!(225),
                shipping: dec!(0),
                tax: dec!(0),
                total: dec!(225),
            },
            coupon: Some(DiscountDescriptor {
                id: "SAVE10".into(),
                code: "SAVE10".into(),
                kind: DiscountKind::Percentage,
                value: dec!(10),
            }),
            notes: Some("Please call before delivery".into()),
        }
    }

    #[test]
    fn test_message_sections_in_fixed_order() {
        let message = compose_message(&draft());
        let expected = "*New Order*\n\
            Payment: WhatsApp Order\n\
            \n\
            *Customer*\n\
            Name: Mariam\n\
            Phone: +971 50 123 4567\n\
            Address: Villa 12\n\
            City: Dubai\n\
            \n\
            *Items*\n\
            1. Abaya (M / Black) 2 × 100.00 AED = 200.00 AED\n\
            2. Scarf 1 × 50.00 AED = 50.00 AED\n\
            \n\
            *Summary*\n\
            Subtotal: 250.00 AED\n\
            Discount (SAVE10): -25.00 AED\n\
            Shipping: FREE\n\
            Total: 225.00 AED\n\
            \n\
            *Notes*\n\
            Please call before delivery";
        assert_eq!(message, expected);
    }

    #[test]
    fn test_shipping_fee_shown_when_charged() {
        let mut d = draft();
        d.breakdown.shipping = dec!(25);
        d.breakdown.total = dec!(250);
        d.notes = None;
        let message = compose_message(&d);
        assert!(message.contains("Shipping: 25.00 AED"));
        assert!(message.ends_with("Total: 250.00 AED"));
    }

    #[test]
    fn test_url_encodes_text_and_strips_phone() {
        let handoff = WhatsappHandoff::new("+971 50-000 0000", DEFAULT_WHATSAPP_ENDPOINT);
        let url = handoff.url("Total: 225.00 AED\n1 × Abaya & more");
        assert_eq!(
            url,
            "https://wa.me/971500000000?text=Total%3A%20225.00%20AED%0A1%20%C3%97%20Abaya%20%26%20more"
        );
    }
}
