use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::*;
use crate::domain::{
    entities::{
        installments::InstallmentEntity, payment_providers::PaymentProviderEntity,
        transactions::TransactionEntity,
    },
    repositories::{
        booking_logs::MockBookingLogRepository, bookings::MockBookingRepository,
        installments::MockInstallmentRepository, payment_gateway::MockXenditGateway,
        payment_providers::MockPaymentProviderRepository, transactions::MockTransactionRepository,
    },
};

type TestUseCase = XenditWebhookUseCase<
    MockBookingRepository,
    MockInstallmentRepository,
    MockTransactionRepository,
    MockBookingLogRepository,
    MockPaymentProviderRepository,
    MockXenditGateway,
>;

struct Mocks {
    booking_repo: MockBookingRepository,
    installment_repo: MockInstallmentRepository,
    transaction_repo: MockTransactionRepository,
    booking_log_repo: MockBookingLogRepository,
    provider_repo: MockPaymentProviderRepository,
    gateway: MockXenditGateway,
}

impl Mocks {
    fn new() -> Self {
        Self {
            booking_repo: MockBookingRepository::new(),
            installment_repo: MockInstallmentRepository::new(),
            transaction_repo: MockTransactionRepository::new(),
            booking_log_repo: MockBookingLogRepository::new(),
            provider_repo: MockPaymentProviderRepository::new(),
            gateway: MockXenditGateway::new(),
        }
    }

    fn with_provider(mut self) -> Self {
        self.provider_repo
            .expect_find_active_production()
            .returning(|| Ok(Some(provider())));
        self
    }

    fn build(self) -> TestUseCase {
        XenditWebhookUseCase::new(
            Arc::new(self.booking_repo),
            Arc::new(self.installment_repo),
            Arc::new(self.transaction_repo),
            Arc::new(self.booking_log_repo),
            Arc::new(self.provider_repo),
            Arc::new(self.gateway),
            Arc::new(BookingLocks::new()),
        )
    }
}

fn provider() -> PaymentProviderEntity {
    PaymentProviderEntity {
        id: Uuid::new_v4(),
        name: "Xendit".to_string(),
        secret_key: Some("xnd_production_key".to_string()),
        base_url: "https://api.xendit.co".to_string(),
        environment: "production".to_string(),
        status: "active".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn booking(id: Uuid, total_amount: i64, status: BookingStatus) -> BookingEntity {
    BookingEntity {
        id,
        user_id: Uuid::new_v4(),
        total_amount,
        payment_method: "online".to_string(),
        status: status.as_str().to_string(),
        payment_link: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn invoice(booking_id: Uuid, status: InvoiceStatus, paid_amount: i64) -> XenditInvoice {
    XenditInvoice {
        id: "inv-abc".to_string(),
        external_id: booking_id.to_string(),
        status,
        amount: paid_amount,
        paid_amount: Some(paid_amount),
        payment_method: Some("QRIS".to_string()),
        invoice_url: None,
        currency: Some("IDR".to_string()),
        description: None,
    }
}

fn installment(booking_id: Uuid, amount: i64) -> InstallmentEntity {
    InstallmentEntity {
        id: Uuid::new_v4(),
        booking_id,
        amount,
        payment_method: "QRIS".to_string(),
        note: None,
        performed_by: None,
        created_at: Utc::now(),
    }
}

fn transaction(booking_id: Uuid, reference: &str) -> TransactionEntity {
    TransactionEntity {
        id: Uuid::new_v4(),
        booking_id,
        user_id: Uuid::new_v4(),
        amount: 100_000,
        type_: "online".to_string(),
        payment_type: "online".to_string(),
        status: "paid".to_string(),
        description: None,
        reference: Some(reference.to_string()),
        created_at: Utc::now(),
    }
}

fn payload(invoice_id: &str, booking_id: Uuid, status: Option<InvoiceStatus>) -> XenditCallbackPayload {
    XenditCallbackPayload {
        id: Some(invoice_id.to_string()),
        external_id: Some(booking_id.to_string()),
        status,
        amount: None,
        paid_amount: None,
        payment_method: None,
        extra: serde_json::Map::new(),
    }
}

#[tokio::test]
async fn full_payment_marks_booking_paid_without_installment() {
    let booking_id = Uuid::new_v4();
    let mut mocks = Mocks::new().with_provider();

    mocks
        .booking_repo
        .expect_find_by_id()
        .returning(move |id| Ok(Some(booking(id, 100_000, BookingStatus::Pending))));
    mocks
        .booking_repo
        .expect_update_status()
        .withf(|_, status| *status == BookingStatus::Paid)
        .times(1)
        .returning(|id, _| Ok(id));
    mocks
        .gateway
        .expect_get_invoice()
        .returning(move |_, _, _, _| Ok(invoice(booking_id, InvoiceStatus::Settled, 100_000)));
    mocks
        .transaction_repo
        .expect_find_by_reference()
        .returning(|_| Ok(None));
    mocks
        .transaction_repo
        .expect_insert()
        .withf(|tx| tx.payment_type == "online" && tx.amount == 100_000 && tx.status == "paid")
        .times(1)
        .returning(|_| Ok(Uuid::new_v4()));
    mocks
        .installment_repo
        .expect_list_by_booking()
        .returning(|_| Ok(vec![]));
    mocks.installment_repo.expect_insert().times(0);
    mocks
        .booking_log_repo
        .expect_insert()
        .withf(|log| log.action_type == "payment_received" && log.new_data.is_some())
        .times(1)
        .returning(|_| Ok(Uuid::new_v4()));

    let outcome = mocks
        .build()
        .handle_callback(payload("inv-abc", booking_id, Some(InvoiceStatus::Settled)))
        .await
        .unwrap();

    assert_eq!(outcome.verified_status, Some(InvoiceStatus::Settled));
}

#[tokio::test]
async fn partial_payment_records_installment() {
    let booking_id = Uuid::new_v4();
    let mut mocks = Mocks::new().with_provider();

    mocks
        .booking_repo
        .expect_find_by_id()
        .returning(move |id| Ok(Some(booking(id, 100_000, BookingStatus::Pending))));
    mocks
        .booking_repo
        .expect_update_status()
        .withf(|_, status| *status == BookingStatus::Installment)
        .times(1)
        .returning(|id, _| Ok(id));
    mocks
        .gateway
        .expect_get_invoice()
        .returning(move |_, _, _, _| Ok(invoice(booking_id, InvoiceStatus::Paid, 50_000)));
    mocks
        .transaction_repo
        .expect_find_by_reference()
        .returning(|_| Ok(None));
    mocks
        .transaction_repo
        .expect_insert()
        .withf(|tx| tx.payment_type == "installment" && tx.amount == 50_000)
        .times(1)
        .returning(|_| Ok(Uuid::new_v4()));
    mocks
        .installment_repo
        .expect_list_by_booking()
        .returning(|_| Ok(vec![]));
    mocks
        .installment_repo
        .expect_insert()
        .withf(|row| row.amount == 50_000 && row.payment_method == "QRIS")
        .times(1)
        .returning(|_| Ok(Uuid::new_v4()));
    mocks
        .booking_log_repo
        .expect_insert()
        .times(1)
        .returning(|_| Ok(Uuid::new_v4()));

    mocks
        .build()
        .handle_callback(payload("inv-abc", booking_id, Some(InvoiceStatus::Paid)))
        .await
        .unwrap();
}

#[tokio::test]
async fn final_installment_completes_the_booking() {
    let booking_id = Uuid::new_v4();
    let mut mocks = Mocks::new().with_provider();

    mocks
        .booking_repo
        .expect_find_by_id()
        .returning(move |id| Ok(Some(booking(id, 100_000, BookingStatus::Installment))));
    mocks
        .booking_repo
        .expect_update_status()
        .withf(|_, status| *status == BookingStatus::Paid)
        .times(1)
        .returning(|id, _| Ok(id));
    mocks
        .gateway
        .expect_get_invoice()
        .returning(move |_, _, _, _| Ok(invoice(booking_id, InvoiceStatus::Settled, 50_000)));
    mocks
        .transaction_repo
        .expect_find_by_reference()
        .returning(|_| Ok(None));
    mocks
        .transaction_repo
        .expect_insert()
        .withf(|tx| tx.payment_type == "online")
        .times(1)
        .returning(|_| Ok(Uuid::new_v4()));
    mocks
        .installment_repo
        .expect_list_by_booking()
        .returning(move |id| Ok(vec![installment(id, 50_000)]));
    // Completion of the plan records no extra installment row.
    mocks.installment_repo.expect_insert().times(0);
    mocks
        .booking_log_repo
        .expect_insert()
        .times(1)
        .returning(|_| Ok(Uuid::new_v4()));

    mocks
        .build()
        .handle_callback(payload("inv-abc", booking_id, Some(InvoiceStatus::Settled)))
        .await
        .unwrap();
}

#[tokio::test]
async fn expired_invoice_expires_the_booking() {
    let booking_id = Uuid::new_v4();
    let mut mocks = Mocks::new().with_provider();

    mocks
        .booking_repo
        .expect_find_by_id()
        .returning(move |id| Ok(Some(booking(id, 100_000, BookingStatus::Pending))));
    mocks
        .booking_repo
        .expect_update_status()
        .withf(|_, status| *status == BookingStatus::Expired)
        .times(1)
        .returning(|id, _| Ok(id));
    mocks
        .gateway
        .expect_get_invoice()
        .returning(move |_, _, _, _| Ok(invoice(booking_id, InvoiceStatus::Expired, 0)));
    mocks.transaction_repo.expect_insert().times(0);
    mocks
        .booking_log_repo
        .expect_insert()
        .withf(|log| log.action_type == "payment_expired")
        .times(1)
        .returning(|_| Ok(Uuid::new_v4()));

    let outcome = mocks
        .build()
        .handle_callback(payload("inv-abc", booking_id, Some(InvoiceStatus::Expired)))
        .await
        .unwrap();

    assert_eq!(outcome.verified_status, Some(InvoiceStatus::Expired));
}

#[tokio::test]
async fn pending_invoice_changes_nothing() {
    let booking_id = Uuid::new_v4();
    let mut mocks = Mocks::new().with_provider();

    mocks
        .booking_repo
        .expect_find_by_id()
        .returning(move |id| Ok(Some(booking(id, 100_000, BookingStatus::Pending))));
    mocks.booking_repo.expect_update_status().times(0);
    mocks
        .gateway
        .expect_get_invoice()
        .returning(move |_, _, _, _| Ok(invoice(booking_id, InvoiceStatus::Pending, 0)));
    mocks.transaction_repo.expect_insert().times(0);
    mocks.installment_repo.expect_insert().times(0);
    mocks.booking_log_repo.expect_insert().times(0);

    let outcome = mocks
        .build()
        .handle_callback(payload("inv-abc", booking_id, Some(InvoiceStatus::Pending)))
        .await
        .unwrap();

    assert_eq!(outcome.verified_status, Some(InvoiceStatus::Pending));
}

#[tokio::test]
async fn verified_status_wins_over_claimed_status() {
    let booking_id = Uuid::new_v4();
    let mut mocks = Mocks::new().with_provider();

    mocks
        .booking_repo
        .expect_find_by_id()
        .returning(move |id| Ok(Some(booking(id, 100_000, BookingStatus::Pending))));
    mocks
        .booking_repo
        .expect_update_status()
        .withf(|_, status| *status == BookingStatus::Paid)
        .times(1)
        .returning(|id, _| Ok(id));
    mocks
        .gateway
        .expect_get_invoice()
        .returning(move |_, _, _, _| Ok(invoice(booking_id, InvoiceStatus::Settled, 100_000)));
    mocks
        .transaction_repo
        .expect_find_by_reference()
        .returning(|_| Ok(None));
    mocks
        .transaction_repo
        .expect_insert()
        .times(1)
        .returning(|_| Ok(Uuid::new_v4()));
    mocks
        .installment_repo
        .expect_list_by_booking()
        .returning(|_| Ok(vec![]));
    mocks
        .booking_log_repo
        .expect_insert()
        .times(1)
        .returning(|_| Ok(Uuid::new_v4()));

    // Payload claims PENDING; the fetched invoice says SETTLED and is obeyed.
    let outcome = mocks
        .build()
        .handle_callback(payload("inv-abc", booking_id, Some(InvoiceStatus::Pending)))
        .await
        .unwrap();

    assert_eq!(outcome.verified_status, Some(InvoiceStatus::Settled));
}

#[tokio::test]
async fn verification_failure_writes_nothing() {
    let booking_id = Uuid::new_v4();
    let mut mocks = Mocks::new().with_provider();

    mocks
        .booking_repo
        .expect_find_by_id()
        .returning(move |id| Ok(Some(booking(id, 100_000, BookingStatus::Pending))));
    mocks.booking_repo.expect_update_status().times(0);
    mocks
        .gateway
        .expect_get_invoice()
        .returning(|_, _, _, _| Err(GatewayError::Upstream(503)));
    mocks.transaction_repo.expect_insert().times(0);
    mocks.installment_repo.expect_insert().times(0);
    mocks.booking_log_repo.expect_insert().times(0);

    let err = mocks
        .build()
        .handle_callback(payload("inv-abc", booking_id, Some(InvoiceStatus::Settled)))
        .await
        .unwrap_err();

    assert!(matches!(err, WebhookError::Verification(_)));
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn unknown_booking_is_rejected_before_verification() {
    let mut mocks = Mocks::new();

    mocks.booking_repo.expect_find_by_id().returning(|_| Ok(None));
    mocks.provider_repo.expect_find_active_production().times(0);
    mocks.gateway.expect_get_invoice().times(0);

    let err = mocks
        .build()
        .handle_callback(payload("inv-abc", Uuid::new_v4(), None))
        .await
        .unwrap_err();

    assert!(matches!(err, WebhookError::BookingNotFound));
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_uuid_external_id_is_treated_as_unknown_booking() {
    let mocks = Mocks::new();

    let err = mocks
        .build()
        .handle_callback(XenditCallbackPayload {
            id: Some("inv-abc".to_string()),
            external_id: Some("not-a-booking".to_string()),
            status: None,
            amount: None,
            paid_amount: None,
            payment_method: None,
            extra: serde_json::Map::new(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, WebhookError::BookingNotFound));
}

#[tokio::test]
async fn payload_without_identifiers_is_invalid() {
    let mocks = Mocks::new();

    let err = mocks
        .build()
        .handle_callback(XenditCallbackPayload {
            id: None,
            external_id: Some(Uuid::new_v4().to_string()),
            status: None,
            amount: None,
            paid_amount: None,
            payment_method: None,
            extra: serde_json::Map::new(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, WebhookError::InvalidPayload(_)));
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn settle_is_a_noop_when_booking_already_paid() {
    let booking_id = Uuid::new_v4();
    let mut mocks = Mocks::new().with_provider();

    mocks
        .booking_repo
        .expect_find_by_id()
        .returning(move |id| Ok(Some(booking(id, 100_000, BookingStatus::Paid))));
    mocks.booking_repo.expect_update_status().times(0);
    mocks
        .gateway
        .expect_get_invoice()
        .returning(move |_, _, _, _| Ok(invoice(booking_id, InvoiceStatus::Settled, 100_000)));
    mocks.transaction_repo.expect_find_by_reference().times(0);
    mocks.transaction_repo.expect_insert().times(0);
    mocks.installment_repo.expect_insert().times(0);
    mocks.booking_log_repo.expect_insert().times(0);

    let outcome = mocks
        .build()
        .handle_callback(payload("inv-abc", booking_id, Some(InvoiceStatus::Settled)))
        .await
        .unwrap();

    assert_eq!(outcome.verified_status, Some(InvoiceStatus::Settled));
}

#[tokio::test]
async fn redelivered_settle_with_known_reference_is_a_noop() {
    let booking_id = Uuid::new_v4();
    let mut mocks = Mocks::new().with_provider();

    mocks
        .booking_repo
        .expect_find_by_id()
        .returning(move |id| Ok(Some(booking(id, 100_000, BookingStatus::Installment))));
    mocks.booking_repo.expect_update_status().times(0);
    mocks
        .gateway
        .expect_get_invoice()
        .returning(move |_, _, _, _| Ok(invoice(booking_id, InvoiceStatus::Settled, 50_000)));
    mocks
        .transaction_repo
        .expect_find_by_reference()
        .withf(|reference| reference == "inv-abc")
        .returning(move |reference| Ok(Some(transaction(booking_id, reference))));
    mocks.transaction_repo.expect_insert().times(0);
    mocks.installment_repo.expect_insert().times(0);
    mocks.booking_log_repo.expect_insert().times(0);

    mocks
        .build()
        .handle_callback(payload("inv-abc", booking_id, Some(InvoiceStatus::Settled)))
        .await
        .unwrap();
}

#[tokio::test]
async fn expiry_leaves_terminal_bookings_alone() {
    let booking_id = Uuid::new_v4();
    let mut mocks = Mocks::new().with_provider();

    mocks
        .booking_repo
        .expect_find_by_id()
        .returning(move |id| Ok(Some(booking(id, 100_000, BookingStatus::Cancelled))));
    mocks.booking_repo.expect_update_status().times(0);
    mocks
        .gateway
        .expect_get_invoice()
        .returning(move |_, _, _, _| Ok(invoice(booking_id, InvoiceStatus::Expired, 0)));
    mocks.booking_log_repo.expect_insert().times(0);

    mocks
        .build()
        .handle_callback(payload("inv-abc", booking_id, Some(InvoiceStatus::Expired)))
        .await
        .unwrap();
}

#[tokio::test]
async fn missing_provider_secret_blocks_verification() {
    let booking_id = Uuid::new_v4();
    let mut mocks = Mocks::new();

    mocks
        .booking_repo
        .expect_find_by_id()
        .returning(move |id| Ok(Some(booking(id, 100_000, BookingStatus::Pending))));
    mocks.provider_repo.expect_find_active_production().returning(|| {
        let mut record = provider();
        record.secret_key = None;
        Ok(Some(record))
    });
    mocks.gateway.expect_get_invoice().times(0);

    let err = mocks
        .build()
        .handle_callback(payload("inv-abc", booking_id, None))
        .await
        .unwrap_err();

    assert!(matches!(err, WebhookError::ProviderNotConfigured));
    assert_eq!(err.error_code(), "PROVIDER_NOT_CONFIGURED");
}

#[tokio::test]
async fn installment_threshold_decides_the_new_status() {
    // (prior installment amounts, paid now, expected status)
    let cases: Vec<(Vec<i64>, i64, BookingStatus)> = vec![
        (vec![], 100_000, BookingStatus::Paid),
        (vec![], 99_999, BookingStatus::Installment),
        (vec![30_000], 70_000, BookingStatus::Paid),
        (vec![30_000], 69_999, BookingStatus::Installment),
        (vec![30_000, 30_000], 50_000, BookingStatus::Paid),
    ];

    for (prior, paid_now, expected) in cases {
        let booking_id = Uuid::new_v4();
        let mut mocks = Mocks::new().with_provider();
        let prior_rows: Vec<InstallmentEntity> = prior
            .iter()
            .map(|amount| installment(booking_id, *amount))
            .collect();

        mocks
            .booking_repo
            .expect_find_by_id()
            .returning(move |id| Ok(Some(booking(id, 100_000, BookingStatus::Pending))));
        mocks
            .booking_repo
            .expect_update_status()
            .withf(move |_, status| *status == expected)
            .times(1)
            .returning(|id, _| Ok(id));
        mocks
            .gateway
            .expect_get_invoice()
            .returning(move |_, _, _, _| Ok(invoice(booking_id, InvoiceStatus::Settled, paid_now)));
        mocks
            .transaction_repo
            .expect_find_by_reference()
            .returning(|_| Ok(None));
        mocks
            .transaction_repo
            .expect_insert()
            .returning(|_| Ok(Uuid::new_v4()));
        mocks
            .installment_repo
            .expect_list_by_booking()
            .returning(move |_| Ok(prior_rows.clone()));
        mocks
            .installment_repo
            .expect_insert()
            .times(if expected == BookingStatus::Installment { 1 } else { 0 })
            .returning(|_| Ok(Uuid::new_v4()));
        mocks
            .booking_log_repo
            .expect_insert()
            .returning(|_| Ok(Uuid::new_v4()));

        mocks
            .build()
            .handle_callback(payload("inv-abc", booking_id, Some(InvoiceStatus::Settled)))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn failed_write_does_not_abort_the_remaining_writes() {
    let booking_id = Uuid::new_v4();
    let mut mocks = Mocks::new().with_provider();

    mocks
        .booking_repo
        .expect_find_by_id()
        .returning(move |id| Ok(Some(booking(id, 100_000, BookingStatus::Pending))));
    mocks
        .booking_repo
        .expect_update_status()
        .times(1)
        .returning(|_, _| Err(anyhow::anyhow!("connection reset")));
    mocks
        .gateway
        .expect_get_invoice()
        .returning(move |_, _, _, _| Ok(invoice(booking_id, InvoiceStatus::Settled, 100_000)));
    mocks
        .transaction_repo
        .expect_find_by_reference()
        .returning(|_| Ok(None));
    mocks
        .transaction_repo
        .expect_insert()
        .times(1)
        .returning(|_| Ok(Uuid::new_v4()));
    mocks
        .installment_repo
        .expect_list_by_booking()
        .returning(|_| Ok(vec![]));
    mocks
        .booking_log_repo
        .expect_insert()
        .times(1)
        .returning(|_| Ok(Uuid::new_v4()));

    // The status update fails, but the callback still reports success so the
    // provider does not retry a verified payment.
    mocks
        .build()
        .handle_callback(payload("inv-abc", booking_id, Some(InvoiceStatus::Settled)))
        .await
        .unwrap();
}

#[test]
fn booking_locks_reuse_the_same_lock_per_booking() {
    let locks = BookingLocks::new();
    let booking_id = Uuid::new_v4();

    let first = locks.lock_for(booking_id);
    let second = locks.lock_for(booking_id);
    let other = locks.lock_for(Uuid::new_v4());

    assert!(Arc::ptr_eq(&first, &second));
    assert!(!Arc::ptr_eq(&first, &other));
}
