//! Plain-text invoice shown on the confirmation page and attached to receipts.

use std::fmt::Write;

use crate::domain::{format_money, Order};

const RULE: &str = "----------------------------------------";

pub fn render_invoice(order: &Order) -> String {
    let money = |amount| format_money(amount, order.currency);
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "INVOICE {}", order.order_number);
    let _ = writeln!(out, "Date: {}", order.created_at.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(out, "Status: {}", order.status.label());
    let _ = writeln!(out, "Payment: {}", order.payment_method.label());
    let _ = writeln!(out, "{RULE}");

    let _ = writeln!(out, "Bill to: {}", order.customer_name);
    let _ = writeln!(out, "Phone: {}", order.customer_phone);
    if let Some(email) = &order.customer_email {
        let _ = writeln!(out, "Email: {email}");
    }
    match (&order.customer_address, &order.customer_city) {
        (Some(address), Some(city)) => {
            let _ = writeln!(out, "Address: {address}, {city}");
        }
        (Some(address), None) => {
            let _ = writeln!(out, "Address: {address}");
        }
        (None, Some(city)) => {
            let _ = writeln!(out, "City: {city}");
        }
        (None, None) => {}
    }
    let _ = writeln!(out, "{RULE}");

    for item in &order.items {
        let name = if item.options.is_empty() {
            item.name.clone()
        } else {
            format!("{} ({})", item.name, item.options)
        };
        let _ = writeln!(out, "{name}");
        let _ = writeln!(out, "  {} × {} = {}", item.quantity, money(item.price), money(item.total));
    }
    let _ = writeln!(out, "{RULE}");

    let _ = writeln!(out, "Subtotal: {}", money(order.subtotal));
    if !order.discount.is_zero() {
        let _ = writeln!(out, "Discount: -{}", money(order.discount));
    }
    if order.shipping.is_zero() {
        let _ = writeln!(out, "Shipping: FREE");
    } else {
        let _ = writeln!(out, "Shipping: {}", money(order.shipping));
    }
    if !order.tax.is_zero() {
        let _ = writeln!(out, "Tax: {}", money(order.tax));
    }
    let _ = write!(out, "Total: {}", money(order.total));
    out
}
