mod common;

use common::*;
use std::sync::Arc;
use std::time::Duration;
use wifipay::application::events::{CheckoutEvent, NoopObserver, checkout_event_channel};
use wifipay::domain::checkout::{CheckoutRequest, TransactionId};
use wifipay::domain::phone::PhoneNumber;
use wifipay::domain::ports::{
    PaymentGateway, PaymentGatewayBox, SmsNotifier, SmsNotifierBox, VoucherIssuer, VoucherIssuerBox,
};
use wifipay::domain::voucher::VoucherCode;
use wifipay::infrastructure::simulated::{
    SimulatedMobileMoney, SimulatedSms, SimulatedVoucherIssuer, shared_rng, simulated_pipeline,
};
use wifipay::interfaces::trigger::PayTrigger;

#[tokio::test]
async fn test_stages_as_trait_objects() {
    let config = instant_config();
    let rng = shared_rng(always_succeed());
    let gateway: PaymentGatewayBox =
        Box::new(SimulatedMobileMoney::new(config.payment.clone(), rng.clone()));
    let vouchers: VoucherIssuerBox =
        Box::new(SimulatedVoucherIssuer::new(config.voucher.clone(), rng.clone()));
    let sms: SmsNotifierBox = Box::new(SimulatedSms::new(config.sms.clone(), rng));

    let request: CheckoutRequest = ready_selection().snapshot().unwrap();
    let phone: PhoneNumber = request.phone().clone();

    // Verify Send + Sync by spawning tasks
    let payment_handle = tokio::spawn(async move { gateway.initiate(&request).await.unwrap() });
    let voucher_handle = tokio::spawn(async move {
        vouchers
            .issue(
                &ready_selection().snapshot().unwrap(),
                &TransactionId("MTN1".to_string()),
            )
            .await
            .unwrap()
    });

    let transaction = payment_handle.await.unwrap();
    assert!(transaction.0.starts_with("MTN"));

    let voucher: VoucherCode = voucher_handle.await.unwrap();
    assert_eq!(voucher.as_str(), "WFP-AAAA-AAAA");

    let sms_handle = tokio::spawn(async move { sms.send(&phone, &voucher).await.unwrap() });
    assert!(sms_handle.await.unwrap().0.starts_with("SMS"));
}

#[tokio::test]
async fn test_pipeline_runs_on_spawned_tasks() {
    let pipeline = Arc::new(simulated_pipeline(&instant_config(), always_succeed()));
    let (tx, mut rx) = checkout_event_channel();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pipeline = pipeline.clone();
            let tx = tx.clone();
            tokio::spawn(async move { pipeline.checkout(&ready_selection(), &tx).await })
        })
        .collect();
    drop(tx);

    for handle in handles {
        assert!(handle.await.unwrap().is_success());
    }

    let mut succeeded = 0;
    while let Some(event) = rx.recv().await {
        if matches!(event, CheckoutEvent::Succeeded(_)) {
            succeeded += 1;
        }
    }
    assert_eq!(succeeded, 4);
}

#[tokio::test(start_paused = true)]
async fn test_trigger_ignores_press_while_in_flight() {
    // Reference delays so the first run is still going when the second press lands.
    let mut config = instant_config();
    config.payment.delay_ms = 2000;
    let pipeline = simulated_pipeline(&config, always_succeed());
    let trigger = PayTrigger::new();
    let selection = ready_selection();
    assert!(trigger.is_enabled(&selection));

    let first = trigger.press(&pipeline, &selection, &NoopObserver);
    let second = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(trigger.is_in_flight());
        assert!(!trigger.is_enabled(&selection));
        trigger.press(&pipeline, &selection, &NoopObserver).await
    };
    let (first, second) = tokio::join!(first, second);

    assert!(first.expect("first press runs").is_success());
    assert!(second.is_none());
    assert!(!trigger.is_in_flight());
    assert!(trigger.is_enabled(&selection));
}
