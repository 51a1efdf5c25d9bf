//! Billing pipeline
//!
//! Turns committed sale lines into a durable, dispatched receipt
//! document:
//!
//! ```text
//! render → temp artifact → ObjectStore::persist → Mailer::send
//!    └ success: every line GENERATING → GENERATED (+ durable reference)
//!    └ failure: every line GENERATING → FAILED (+ backoff bookkeeping)
//!                 └ budget spent: FAILED → ABANDONED (dead letter)
//! ```
//!
//! Billing never rolls back the sale commit; a failed receipt leaves the
//! ledger correct and the lines queued for retry.

pub mod mailer;
pub mod renderer;
pub mod store;

pub use mailer::{HttpMailer, LogMailer, MailAttachment, Mailer, OutboundMail};
pub use renderer::ReceiptBatch;
pub use store::{FsObjectStore, ObjectStore};

use std::io::Write;
use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

use crate::db::models::Sale;
use crate::db::repository::SaleRepository;
use shared::util::now_millis;

/// First retry waits this long.
pub const RETRY_BASE_BACKOFF_MS: i64 = 30 * 60 * 1000;

/// Backoff ceiling.
pub const RETRY_MAX_BACKOFF_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Receipt rendering failed: {0}")]
    Render(String),

    #[error("Receipt persistence failed: {0}")]
    Persist(String),

    #[error("Receipt dispatch failed: {0}")]
    Dispatch(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<crate::db::repository::RepoError> for BillingError {
    fn from(err: crate::db::repository::RepoError) -> Self {
        BillingError::Database(err.to_string())
    }
}

/// Exponential backoff for the `attempts`-th failure: 30 min doubling,
/// capped at 24 h.
pub fn backoff_ms(attempts: u32) -> i64 {
    let doublings = attempts.saturating_sub(1).min(31);
    RETRY_BASE_BACKOFF_MS
        .saturating_mul(1i64 << doublings)
        .min(RETRY_MAX_BACKOFF_MS)
}

pub struct BillingPipeline {
    sales: SaleRepository,
    store: Arc<dyn ObjectStore>,
    mailer: Arc<dyn Mailer>,
    mail_from: String,
    max_attempts: u32,
}

impl BillingPipeline {
    pub fn new(
        db: Surreal<Db>,
        store: Arc<dyn ObjectStore>,
        mailer: Arc<dyn Mailer>,
        mail_from: String,
        max_attempts: u32,
    ) -> Self {
        Self {
            sales: SaleRepository::new(db),
            store,
            mailer,
            mail_from,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Generate one receipt for a batch of committed lines (all
    /// GENERATING, same customer).
    ///
    /// Success marks every line GENERATED with the durable reference and
    /// returns it. Any failure marks every line FAILED with its backoff
    /// deadline, or ABANDONED once the attempt budget is spent.
    pub async fn generate(&self, batch: &[Sale]) -> Result<String, BillingError> {
        let Some(receipt) = ReceiptBatch::from_sales(batch) else {
            return Err(BillingError::Render("empty batch".into()));
        };

        match self.produce_and_dispatch(&receipt).await {
            Ok(reference) => {
                for sale in batch {
                    let Some(id) = sale.id.as_ref() else { continue };
                    match self.sales.mark_generated(id, &reference).await {
                        Ok(Some(_)) => {}
                        Ok(None) => {
                            tracing::warn!(sale = %id, "GENERATED transition rejected by guard");
                        }
                        Err(e) => {
                            tracing::error!(sale = %id, error = %e, "Failed to store billing success");
                        }
                    }
                }
                tracing::info!(
                    receipt = %receipt.receipt_no,
                    reference = %reference,
                    lines = batch.len(),
                    "Receipt generated"
                );
                Ok(reference)
            }
            Err(e) => {
                tracing::warn!(receipt = %receipt.receipt_no, error = %e, "Receipt generation failed");
                self.fail_batch(batch).await;
                Err(e)
            }
        }
    }

    /// Render, spool through a scoped temp file, persist, dispatch.
    async fn produce_and_dispatch(&self, receipt: &ReceiptBatch) -> Result<String, BillingError> {
        let document = receipt.render();

        // Scoped temp artifact: deleted on every exit path, success or not.
        let mut artifact = tempfile::NamedTempFile::new()
            .map_err(|e| BillingError::Render(format!("temp artifact: {e}")))?;
        artifact
            .write_all(document.as_bytes())
            .map_err(|e| BillingError::Render(format!("temp artifact: {e}")))?;
        let bytes = std::fs::read(artifact.path())
            .map_err(|e| BillingError::Render(format!("temp artifact: {e}")))?;

        let filename = format!("receipt-{}.txt", receipt.receipt_no);
        let reference = self.store.persist(&filename, &bytes).await?;

        let mail = OutboundMail {
            from: self.mail_from.clone(),
            to: receipt.customer_email.clone(),
            subject: format!("Your receipt {}", receipt.receipt_no),
            body: format!(
                "Hi {},\n\nthank you for your purchase. \
                 Your receipt ({} item(s), total {}) is attached.\n",
                receipt.customer_name,
                receipt.lines.len(),
                receipt.total
            ),
            attachment: Some(MailAttachment {
                filename,
                content_type: "text/plain".into(),
                bytes,
            }),
        };
        if let Err(e) = self.mailer.send(&mail).await {
            // The attempt failed as a whole; a retry persists its own
            // document, so drop this one rather than orphan it.
            if let Err(del) = self.store.delete(&reference).await {
                tracing::warn!(reference = %reference, error = %del, "Orphaned receipt cleanup failed");
            }
            return Err(e);
        }

        Ok(reference)
    }

    /// Record a failed attempt on every line of the batch.
    async fn fail_batch(&self, batch: &[Sale]) {
        let now = now_millis();
        for sale in batch {
            let Some(id) = sale.id.as_ref() else { continue };
            let attempts = sale.billing_attempts + 1;
            let next_attempt_at = now + backoff_ms(attempts);

            match self.sales.mark_failed(id, attempts, next_attempt_at).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    tracing::warn!(sale = %id, "FAILED transition rejected by guard");
                    continue;
                }
                Err(e) => {
                    tracing::error!(sale = %id, error = %e, "Failed to store billing failure");
                    continue;
                }
            }

            if attempts >= self.max_attempts {
                match self.sales.mark_abandoned(id).await {
                    Ok(Some(_)) => {
                        tracing::error!(
                            sale = %id,
                            attempts,
                            "Billing abandoned after exhausting the retry budget"
                        );
                    }
                    Ok(None) => {
                        tracing::warn!(sale = %id, "ABANDONED transition rejected by guard");
                    }
                    Err(e) => {
                        tracing::error!(sale = %id, error = %e, "Failed to dead-letter sale");
                    }
                }
            }
        }
    }

    /// Load a persisted receipt document by its stored reference.
    pub async fn fetch_receipt(&self, reference: &str) -> Result<Vec<u8>, BillingError> {
        self.store.fetch(reference).await
    }

    /// One retry sweep: claim up to `limit` overdue FAILED sales and
    /// regenerate each as an independent single-line batch. Returns how
    /// many attempts were made.
    pub async fn retry_batch(&self, limit: usize) -> usize {
        let due = match self.sales.find_failed_due(now_millis(), limit).await {
            Ok(due) => due,
            Err(e) => {
                tracing::error!(error = %e, "Billing retry selection failed");
                return 0;
            }
        };

        let mut attempted = 0;
        for sale in due {
            let Some(id) = sale.id.clone() else { continue };
            // Claim FAILED → GENERATING; a parallel sweep loses the race
            // and skips.
            let claimed = match self.sales.mark_generating(&id).await {
                Ok(Some(claimed)) => claimed,
                Ok(None) => continue,
                Err(e) => {
                    tracing::error!(sale = %id, error = %e, "Failed to claim sale for retry");
                    continue;
                }
            };
            attempted += 1;
            if let Err(e) = self.generate(std::slice::from_ref(&claimed)).await {
                tracing::warn!(sale = %id, error = %e, "Billing retry attempt failed");
            }
        }
        attempted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_from_thirty_minutes_and_caps_at_a_day() {
        assert_eq!(backoff_ms(1), 30 * 60 * 1000);
        assert_eq!(backoff_ms(2), 60 * 60 * 1000);
        assert_eq!(backoff_ms(3), 2 * 60 * 60 * 1000);
        assert_eq!(backoff_ms(6), 16 * 60 * 60 * 1000);
        assert_eq!(backoff_ms(7), RETRY_MAX_BACKOFF_MS);
        assert_eq!(backoff_ms(40), RETRY_MAX_BACKOFF_MS);
    }
}
