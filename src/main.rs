use std::process::ExitCode;

use rust_decimal::Decimal;
use tracing::{error, info, Instrument};

use storefront_orders::app_system::{setup_tracing, SeedData, StoreConfig, StoreSystem};
use storefront_orders::checkout::{CheckoutRequest, SubmissionOutcome};
use storefront_orders::domain::{CartLine, CustomerInfo, OrderStatus, PaymentMethod, Price};
use storefront_orders::invoice::render_invoice;
use storefront_orders::realtime::RealtimeOrderSync;

const DEMO_SEED: &str = r#"{
    "coupons": [
        { "code": "WELCOME10", "discount_type": "percentage", "discount_value": "10", "min_order_amount": "100" }
    ],
    "stock": [
        { "key": { "kind": "variant", "id": "abaya-m" }, "quantity": 5 },
        { "key": { "kind": "product", "id": "scarf" }, "quantity": 2 }
    ]
}"#;

#[tokio::main]
async fn main() -> ExitCode {
    setup_tracing();

    match run().await {
        Ok(()) => {
            info!("Demo completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Demo failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = StoreConfig::from_env()?;
    let currency = config.currency;

    let system = StoreSystem::start(config);
    system.load_seed(SeedData::from_json(DEMO_SEED)?).await?;

    // Customer session: live view of their orders
    let sync = RealtimeOrderSync::subscribe(&system.orders, "demo-customer".to_string()).await?;

    let mut cart = system.new_cart();
    cart.add_line(
        CartLine::new("abaya", "Classic Abaya", Price::new(Decimal::from(100), currency), 2)
            .with_variant("abaya-m")
            .with_option("Size", "M"),
    )?;
    cart.add_line(CartLine::new("scarf", "Silk Scarf", Price::new(Decimal::from(50), currency), 1))?;

    let request = CheckoutRequest {
        customer: CustomerInfo {
            name: "Demo Customer".to_string(),
            phone: "+971 50 123 4567".to_string(),
            email: Some("demo@example.com".to_string()),
            address: Some("Villa 12, Al Wasl Road".to_string()),
            city: Some("Dubai".to_string()),
            user_id: Some("demo-customer".to_string()),
        },
        payment_method: PaymentMethod::HomeDelivery,
        coupon_code: Some("welcome10".to_string()),
        notes: None,
    };

    let span = tracing::info_span!("checkout");
    let outcome = async {
        info!("Submitting cart");
        system.checkout.submit(&mut cart, request).await
    }
    .instrument(span)
    .await?;

    let order_number = match &outcome {
        SubmissionOutcome::HandedOff { url, .. } => {
            info!(%url, "Order handed off to WhatsApp");
            return Ok(system.shutdown().await?);
        }
        other => other.order_number().unwrap_or_default().to_string(),
    };

    let span = tracing::info_span!("fulfillment", %order_number);
    async {
        for next in [OrderStatus::Confirmed, OrderStatus::Processing, OrderStatus::Shipped] {
            system.orders.transition(order_number.clone(), next).await?;
            info!(status = %next, "Order status updated");
        }
        Ok::<_, Box<dyn std::error::Error>>(())
    }
    .instrument(span)
    .await?;

    for notification in sync.notifications().await {
        info!(order_number = %notification.order_number, "{}", notification.message);
    }
    sync.unsubscribe().await;

    let order = system.orders.track(order_number, Some("demo@example.com")).await?;
    println!("{}", render_invoice(&order));

    system.shutdown().await?;
    Ok(())
}
