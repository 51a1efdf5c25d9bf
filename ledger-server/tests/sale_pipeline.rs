//! End-to-end sale pipeline tests over an in-memory database with
//! scripted receipt-store and mailer doubles.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;

use ledger_server::billing::{BillingError, Mailer, ObjectStore, OutboundMail};
use ledger_server::core::Config;
use ledger_server::db::init_memory_database;
use ledger_server::db::models::{ProductCreate, Sale};
use ledger_server::db::repository::{NotificationRepository, ProductRepository, SaleRepository};
use ledger_server::sales::SaleTransactionCoordinator;
use ledger_server::{AppError, ServerState};
use shared::models::{BillingStatus, CreateSaleRequest, NotificationKind, SaleLineRequest};
use shared::util::{DAY_MS, now_millis};

/// In-memory receipt store.
#[derive(Default)]
struct MemoryStore {
    docs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    fn len(&self) -> usize {
        self.docs.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn persist(&self, name: &str, bytes: &[u8]) -> Result<String, BillingError> {
        self.docs
            .lock()
            .unwrap()
            .insert(name.to_string(), bytes.to_vec());
        Ok(name.to_string())
    }

    async fn fetch(&self, reference: &str) -> Result<Vec<u8>, BillingError> {
        self.docs
            .lock()
            .unwrap()
            .get(reference)
            .cloned()
            .ok_or_else(|| BillingError::Persist(format!("missing document: {reference}")))
    }

    async fn delete(&self, reference: &str) -> Result<(), BillingError> {
        self.docs.lock().unwrap().remove(reference);
        Ok(())
    }
}

/// Mailer that fails its first `failures` sends, then succeeds.
struct FlakyMailer {
    failures: AtomicUsize,
    sent: AtomicUsize,
}

impl FlakyMailer {
    fn failing(failures: usize) -> Self {
        Self {
            failures: AtomicUsize::new(failures),
            sent: AtomicUsize::new(0),
        }
    }

    fn sent_count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Mailer for FlakyMailer {
    async fn send(&self, _mail: &OutboundMail) -> Result<(), BillingError> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(BillingError::Dispatch("gateway unavailable".into()));
        }
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn test_config(max_attempts: u32) -> Config {
    Config {
        work_dir: "/tmp/ledger-test".into(),
        http_port: 0,
        environment: "test".into(),
        mail_api_url: String::new(),
        mail_from: "receipts@ledger.local".into(),
        mail_timeout_ms: 1_000,
        billing_max_attempts: max_attempts,
        billing_retry_batch: 10,
        billing_retry_interval_ms: 3_600_000,
        maintenance_interval_ms: 86_400_000,
        lead_time_days: 7,
    }
}

async fn test_state(
    max_attempts: u32,
    store: Arc<MemoryStore>,
    mailer: Arc<FlakyMailer>,
) -> ServerState {
    let db = init_memory_database().await.unwrap();
    ServerState::initialize_with(test_config(max_attempts), db, store, mailer)
}

async fn seed_product(state: &ServerState, name: &str, inventory: i64, threshold: i64) -> String {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .create(ProductCreate {
            owner: "user1".into(),
            name: name.into(),
            unit_price: Decimal::new(1299, 2),
            unit_cost: Decimal::new(500, 2),
            inventory,
            min_threshold: Some(threshold),
            category: None,
            category_name: None,
        })
        .await
        .unwrap();
    product.id_string()
}

fn request_for(lines: Vec<(String, i64)>) -> CreateSaleRequest {
    CreateSaleRequest {
        customer_name: "Ada Lovelace".into(),
        customer_email: "ada@example.com".into(),
        lines: lines
            .into_iter()
            .map(|(product_id, quantity)| SaleLineRequest {
                product_id,
                quantity,
            })
            .collect(),
    }
}

fn message_of(err: AppError) -> String {
    err.to_string()
}

#[tokio::test]
async fn one_bad_line_rejects_the_whole_request() {
    let store = Arc::new(MemoryStore::default());
    let mailer = Arc::new(FlakyMailer::failing(0));
    let state = test_state(5, store.clone(), mailer.clone()).await;

    let good = seed_product(&state, "Beans", 50, 10).await;
    let short = seed_product(&state, "Rice", 2, 10).await;

    let coordinator = SaleTransactionCoordinator::new(state.clone());
    let err = coordinator
        .create_sale("user1", request_for(vec![(good.clone(), 3), (short.clone(), 5)]))
        .await
        .unwrap_err();
    let msg = message_of(err);
    assert!(msg.contains("Insufficient inventory for \"Rice\""));
    assert!(msg.contains("Available: 2, Requested: 5"));

    // Nothing committed, nothing decremented, nothing billed.
    let products = ProductRepository::new(state.db.clone());
    let beans = products
        .find_by_id(&ProductRepository::id_of(&good))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(beans.inventory, 50);
    let sales = SaleRepository::new(state.db.clone());
    assert!(sales.list_for_owner("user1").await.unwrap().is_empty());
    assert_eq!(store.len(), 0);
    assert_eq!(mailer.sent_count(), 0);
}

#[tokio::test]
async fn repeated_lines_validate_against_cumulative_quantity() {
    let store = Arc::new(MemoryStore::default());
    let mailer = Arc::new(FlakyMailer::failing(0));
    let state = test_state(5, store, mailer).await;

    let id = seed_product(&state, "Beans", 5, 2).await;
    let coordinator = SaleTransactionCoordinator::new(state.clone());

    // 3 + 3 exceeds the 5 on hand even though each line alone fits.
    let err = coordinator
        .create_sale("user1", request_for(vec![(id.clone(), 3), (id.clone(), 3)]))
        .await
        .unwrap_err();
    assert!(message_of(err).contains("Available: 2, Requested: 3"));

    let products = ProductRepository::new(state.db.clone());
    let unchanged = products
        .find_by_id(&ProductRepository::id_of(&id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.inventory, 5);
}

#[tokio::test]
async fn foreign_products_read_as_not_found() {
    let store = Arc::new(MemoryStore::default());
    let mailer = Arc::new(FlakyMailer::failing(0));
    let state = test_state(5, store, mailer).await;

    let id = seed_product(&state, "Beans", 5, 2).await;
    let coordinator = SaleTransactionCoordinator::new(state.clone());

    let err = coordinator
        .create_sale("intruder", request_for(vec![(id, 1)]))
        .await
        .unwrap_err();
    assert!(message_of(err).contains("not found or unauthorized"));
}

#[tokio::test]
async fn committed_batch_bills_once_and_alerts_on_low_stock() {
    let store = Arc::new(MemoryStore::default());
    let mailer = Arc::new(FlakyMailer::failing(0));
    let state = test_state(5, store.clone(), mailer.clone()).await;

    let beans = seed_product(&state, "Beans", 50, 10).await;
    // 12 - 3 = 9 <= threshold 10, so this line should raise a low-stock alert.
    let rice = seed_product(&state, "Rice", 12, 10).await;

    let coordinator = SaleTransactionCoordinator::new(state.clone());
    let views = coordinator
        .create_sale("user1", request_for(vec![(beans.clone(), 3), (rice.clone(), 3)]))
        .await
        .unwrap();

    assert_eq!(views.len(), 2);
    for view in &views {
        assert_eq!(view.billing_status, BillingStatus::Generated);
        assert!(view.receipt_ref.is_some());
        assert_eq!(view.amount, Decimal::new(1299, 2) * Decimal::from(3));
    }
    // One composite receipt for the batch.
    assert_eq!(views[0].receipt_ref, views[1].receipt_ref);
    assert_eq!(store.len(), 1);
    assert_eq!(mailer.sent_count(), 1);

    let products = ProductRepository::new(state.db.clone());
    let after = products
        .find_by_id(&ProductRepository::id_of(&rice))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.inventory, 9);
    assert!(after.last_sold_at.is_some());

    let notifications = NotificationRepository::new(state.db.clone());
    let feed = notifications.list_for_user("user1", false).await.unwrap();
    assert!(
        feed.iter()
            .any(|n| n.kind == NotificationKind::LowStock && n.message.contains("Rice")),
        "expected a low-stock alert for Rice, got: {feed:?}"
    );
    assert!(
        !feed
            .iter()
            .any(|n| n.kind == NotificationKind::LowStock && n.message.contains("Beans")),
        "Beans stayed above threshold"
    );
}

#[tokio::test]
async fn sale_commit_raises_a_forecast_warning_near_depletion() {
    let store = Arc::new(MemoryStore::default());
    let mailer = Arc::new(FlakyMailer::failing(0));
    let state = test_state(5, store, mailer).await;

    let id = seed_product(&state, "Beans", 14, 2).await;

    // Two days of prior history (with a minute of margin so the elapsed-day
    // count stays at 2 through the recompute).
    let sales = SaleRepository::new(state.db.clone());
    sales
        .create(Sale {
            id: None,
            owner: "user1".into(),
            customer_name: "Ada Lovelace".into(),
            customer_email: "ada@example.com".into(),
            product: ProductRepository::id_of(&id),
            product_name: "Beans".into(),
            quantity: 4,
            unit_price: Decimal::ONE,
            unit_cost: Decimal::ZERO,
            amount: Decimal::from(4),
            sold_at: now_millis() - 2 * DAY_MS + 60_000,
            billing_status: BillingStatus::Generated,
            billing_attempts: 0,
            next_billing_attempt_at: None,
            receipt_ref: Some("receipts/old.txt".into()),
        })
        .await
        .unwrap();

    let coordinator = SaleTransactionCoordinator::new(state.clone());
    coordinator
        .create_sale("user1", request_for(vec![(id, 2)]))
        .await
        .unwrap();

    // 6 units over 2 days is 3/day; 12 on hand deplete in 4 days.
    let feed = NotificationRepository::new(state.db.clone())
        .list_for_user("user1", false)
        .await
        .unwrap();
    assert!(
        feed.iter()
            .any(|n| n.kind == NotificationKind::ForecastWarning && n.message.contains("Beans")),
        "expected a forecast warning, got: {feed:?}"
    );
    // 12 units against a threshold of 2 is not low stock.
    assert!(!feed.iter().any(|n| n.kind == NotificationKind::LowStock));
}

#[tokio::test]
async fn dispatch_failure_queues_for_retry_and_recovery_completes_billing() {
    let store = Arc::new(MemoryStore::default());
    let mailer = Arc::new(FlakyMailer::failing(1));
    let state = test_state(5, store.clone(), mailer.clone()).await;

    let id = seed_product(&state, "Beans", 50, 5).await;
    let coordinator = SaleTransactionCoordinator::new(state.clone());
    let views = coordinator
        .create_sale("user1", request_for(vec![(id.clone(), 2)]))
        .await
        .unwrap();

    // The sale itself committed; only billing is behind.
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].billing_status, BillingStatus::Failed);
    assert!(views[0].receipt_ref.is_none());

    let sales = SaleRepository::new(state.db.clone());
    let sale = sales
        .find_by_id(&SaleRepository::id_of(&views[0].id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sale.billing_attempts, 1);
    assert!(sale.next_billing_attempt_at.is_some());

    // Pull the scheduled attempt into the past, then sweep.
    state
        .db
        .query("UPDATE sale SET next_billing_attempt_at = 0")
        .await
        .unwrap();
    let attempted = state.billing.retry_batch(10).await;
    assert_eq!(attempted, 1);

    let recovered = sales
        .find_by_id(&SaleRepository::id_of(&views[0].id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(recovered.billing_status, BillingStatus::Generated);
    assert!(recovered.receipt_ref.is_some());
    assert_eq!(store.len(), 1);
    assert_eq!(mailer.sent_count(), 1);
}

#[tokio::test]
async fn exhausted_retry_budget_abandons_the_line() {
    let store = Arc::new(MemoryStore::default());
    let mailer = Arc::new(FlakyMailer::failing(usize::MAX));
    let state = test_state(1, store, mailer).await;

    let id = seed_product(&state, "Beans", 50, 5).await;
    let coordinator = SaleTransactionCoordinator::new(state.clone());
    let views = coordinator
        .create_sale("user1", request_for(vec![(id, 2)]))
        .await
        .unwrap();
    assert_eq!(views[0].billing_status, BillingStatus::Abandoned);

    // Abandoned lines never re-enter the retry sweep.
    state
        .db
        .query("UPDATE sale SET next_billing_attempt_at = 0")
        .await
        .unwrap();
    assert_eq!(state.billing.retry_batch(10).await, 0);
}
