//! Gateway payment flow and callback reconciliation.

mod common;

use common::*;

use courtbook_core::error::ErrorKind;
use courtbook_core::traits::gateway::GatewayPaymentStatus;
use courtbook_core::traits::notifier::NotificationCategory;
use courtbook_entity::booking::{BookingStatus, PaymentStatus};
use courtbook_service::booking::{ReconcileDisposition, ReconcileTarget, SettlementMethod};
use courtbook_store::{BookingStore, CourtStore, LoyaltyLedger};

async fn gateway_booking(env: &TestEnv) -> (courtbook_entity::booking::Booking, String) {
    let court = env.add_court(false).await;
    let created = env
        .coordinator
        .create_booking(
            &player(),
            booking_request(
                court.id,
                t(19, 0),
                t(20, 0),
                SettlementMethod::Gateway { return_url: None },
            ),
        )
        .await
        .unwrap();
    let pidx = created.booking.gateway_ref.clone().expect("pidx stored");
    (created.booking, pidx)
}

#[tokio::test]
async fn test_gateway_booking_is_held_pending_with_expiry() {
    let env = TestEnv::new();
    let (booking, pidx) = gateway_booking(&env).await;

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.payment_status, PaymentStatus::Pending);
    assert!(booking.reservation_expires_at.is_some());
    assert!(booking.purchase_order_id.is_some());

    // The stored record carries the reference before the redirect URL
    // was returned.
    let stored = env
        .bookings
        .find_by_gateway_ref(&pidx)
        .await
        .unwrap()
        .expect("record reachable by pidx");
    assert_eq!(stored.id, booking.id);
}

#[tokio::test]
async fn test_successful_verification_confirms_and_awards_points() {
    let env = TestEnv::new();
    let (booking, pidx) = gateway_booking(&env).await;
    env.gateway.complete(&pidx).await;

    let outcome = env.coordinator.verify_and_reconcile(&pidx).await.unwrap();
    assert_eq!(outcome.disposition, ReconcileDisposition::Confirmed);

    let stored = env.bookings.get(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Confirmed);
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
    assert!(stored.reservation_expires_at.is_none());
    assert!(stored.gateway_txn_ref.is_some());

    // Peak price 1500 earns 150 points at the default divisor.
    assert_eq!(env.loyalty.balance(stored.user_id).await.unwrap(), 150);
    assert_eq!(
        env.notifier
            .sent_in_category(NotificationCategory::PaymentSuccess)
            .await
            .len(),
        1
    );
}

#[tokio::test]
async fn test_duplicate_callbacks_are_idempotent() {
    let env = TestEnv::new();
    let (booking, pidx) = gateway_booking(&env).await;
    env.gateway.complete(&pidx).await;

    let first = env.coordinator.verify_and_reconcile(&pidx).await.unwrap();
    let second = env.coordinator.verify_and_reconcile(&pidx).await.unwrap();

    assert_eq!(first.disposition, ReconcileDisposition::Confirmed);
    assert_eq!(second.disposition, ReconcileDisposition::AlreadyConfirmed);

    // No duplicate loyalty transaction from the second callback.
    let stored = env.bookings.get(booking.id).await.unwrap().unwrap();
    let log = env.loyalty.transactions(stored.user_id).await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(env.loyalty.balance(stored.user_id).await.unwrap(), 150);
}

#[tokio::test]
async fn test_amount_mismatch_cancels_despite_gateway_success() {
    let env = TestEnv::new();
    let (booking, pidx) = gateway_booking(&env).await;
    // Gateway says Completed but reports 50000 paisa against the
    // expected 150000.
    env.gateway.complete_with_amount(&pidx, 50_000).await;

    let err = env.coordinator.verify_and_reconcile(&pidx).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AmountMismatch);

    let stored = env.bookings.get(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Cancelled);
    assert_eq!(stored.payment_status, PaymentStatus::Failed);

    let failures = env
        .notifier
        .sent_in_category(NotificationCategory::PaymentFailed)
        .await;
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].user_id, stored.user_id);
}

#[tokio::test]
async fn test_non_success_status_withdraws_the_booking() {
    let env = TestEnv::new();
    let (booking, pidx) = gateway_booking(&env).await;
    env.gateway
        .finish_with_status(&pidx, GatewayPaymentStatus::UserCanceled)
        .await;

    let outcome = env.coordinator.verify_and_reconcile(&pidx).await.unwrap();
    assert_eq!(
        outcome.disposition,
        ReconcileDisposition::Rejected(GatewayPaymentStatus::UserCanceled)
    );

    let stored = env.bookings.get(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Cancelled);
    assert_eq!(stored.payment_status, PaymentStatus::Failed);
}

#[tokio::test]
async fn test_verification_outage_cancels_and_surfaces_gateway_error() {
    let env = TestEnv::new();
    let (booking, pidx) = gateway_booking(&env).await;
    env.gateway.fail_verify(&pidx).await;

    let err = env.coordinator.verify_and_reconcile(&pidx).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Gateway);

    let stored = env.bookings.get(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Cancelled);
    assert_eq!(stored.payment_status, PaymentStatus::Failed);
}

#[tokio::test]
async fn test_unknown_reference_is_not_found() {
    let env = TestEnv::new();
    let err = env
        .coordinator
        .verify_and_reconcile("pidx-never-issued")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_failed_initiation_leaves_terminal_booking_not_stuck_pending() {
    let env = TestEnv::new();
    let court = env.add_court(false).await;
    env.gateway.fail_next_initiate().await;

    let err = env
        .coordinator
        .create_booking(
            &player(),
            booking_request(
                court.id,
                t(10, 0),
                t(11, 0),
                SettlementMethod::Gateway { return_url: None },
            ),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Gateway);

    // The slot is not stuck behind a pending record.
    assert!(env
        .coordinator
        .create_booking(
            &player(),
            booking_request(court.id, t(10, 0), t(11, 0), SettlementMethod::Offline),
        )
        .await
        .is_ok());
}

#[tokio::test]
async fn test_zero_price_gateway_booking_confirms_without_gateway() {
    let env = TestEnv::new();

    // A court whose regular rate is zero.
    let court = courtbook_entity::court::Court {
        id: courtbook_core::types::id::CourtId::new(),
        name: "Community Court".to_string(),
        opening_time: t(6, 0),
        closing_time: t(22, 0),
        requires_prepayment: false,
        pricing: courtbook_entity::court::CourtPricing::flat(0),
    };
    let court = env.courts.insert(court).await.unwrap();

    let created = env
        .coordinator
        .create_booking(
            &player(),
            booking_request(
                court.id,
                t(10, 0),
                t(11, 0),
                SettlementMethod::Gateway { return_url: None },
            ),
        )
        .await
        .unwrap();

    assert_eq!(created.booking.status, BookingStatus::Confirmed);
    assert_eq!(created.booking.payment_status, PaymentStatus::Paid);
    assert!(created.payment_url.is_none());
    assert!(created.booking.gateway_ref.is_none());
}

#[tokio::test]
async fn test_reconcile_outcome_carries_the_booking() {
    let env = TestEnv::new();
    let (booking, pidx) = gateway_booking(&env).await;
    env.gateway.complete(&pidx).await;

    let outcome = env.coordinator.verify_and_reconcile(&pidx).await.unwrap();
    match outcome.target {
        ReconcileTarget::Booking(b) => assert_eq!(b.id, booking.id),
        ReconcileTarget::Registration(_) => panic!("expected a booking target"),
    }
}
