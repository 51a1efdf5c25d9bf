//! Receipt renderer
//!
//! Deterministic fixed-width text documents: the same batch always
//! renders to the same bytes, so a retried generation reproduces the
//! receipt exactly.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::db::models::Sale;
use shared::util::format_millis;

/// Rendered line width.
const WIDTH: usize = 48;

/// One itemized row.
#[derive(Debug, Clone)]
pub struct ReceiptLine {
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub amount: Decimal,
}

/// Everything one receipt document needs, snapshotted from the batch.
#[derive(Debug, Clone)]
pub struct ReceiptBatch {
    pub receipt_no: String,
    pub customer_name: String,
    pub customer_email: String,
    pub issued_at: i64,
    pub lines: Vec<ReceiptLine>,
    pub total: Decimal,
}

impl ReceiptBatch {
    /// Snapshot a committed batch. The lines share one customer by
    /// construction; an empty batch has no receipt.
    pub fn from_sales(sales: &[Sale]) -> Option<Self> {
        let first = sales.first()?;
        let lines: Vec<ReceiptLine> = sales
            .iter()
            .map(|s| ReceiptLine {
                product_name: s.product_name.clone(),
                quantity: s.quantity,
                unit_price: s.unit_price,
                amount: s.amount,
            })
            .collect();
        let total = lines.iter().map(|l| l.amount).sum();

        Some(Self {
            receipt_no: Uuid::new_v4().to_string(),
            customer_name: first.customer_name.clone(),
            customer_email: first.customer_email.clone(),
            issued_at: first.sold_at,
            lines,
            total,
        })
    }

    /// Render the fixed-width document.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(WIDTH);
        let thin = "-".repeat(WIDTH);

        out.push_str(&rule);
        out.push('\n');
        out.push_str(&center("SALES RECEIPT"));
        out.push('\n');
        out.push_str(&rule);
        out.push('\n');
        out.push_str(&format!("Receipt : {}\n", self.receipt_no));
        out.push_str(&format!("Date    : {}\n", format_millis(self.issued_at)));
        out.push_str(&format!("Customer: {}\n", self.customer_name));
        out.push_str(&format!("Email   : {}\n", self.customer_email));
        out.push_str(&thin);
        out.push('\n');
        out.push_str(&row("ITEM", "QTY", "AMOUNT"));
        for line in &self.lines {
            out.push_str(&row(
                &truncate(&line.product_name, 26),
                &format!("x{}", line.quantity),
                &line.amount.to_string(),
            ));
            out.push_str(&format!("  @ {}\n", line.unit_price));
        }
        out.push_str(&thin);
        out.push('\n');
        out.push_str(&row("TOTAL", "", &self.total.to_string()));
        out.push_str(&rule);
        out.push('\n');
        out.push_str(&center("Thank you for your business!"));
        out.push('\n');
        out
    }
}

fn center(text: &str) -> String {
    let pad = WIDTH.saturating_sub(text.chars().count()) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

/// Left item, then qty and amount right-aligned into fixed columns.
fn row(item: &str, qty: &str, amount: &str) -> String {
    format!("{item:<28}{qty:>6}{amount:>14}\n")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::BillingStatus;
    use surrealdb::RecordId;

    fn sale(name: &str, qty: i64, price: Decimal) -> Sale {
        Sale {
            id: None,
            owner: "user1".into(),
            customer_name: "Ada Lovelace".into(),
            customer_email: "ada@example.com".into(),
            product: RecordId::from_table_key("product", "p"),
            product_name: name.into(),
            quantity: qty,
            unit_price: price,
            unit_cost: Decimal::ZERO,
            amount: price * Decimal::from(qty),
            sold_at: 1_700_000_000_000,
            billing_status: BillingStatus::Generating,
            billing_attempts: 0,
            next_billing_attempt_at: None,
            receipt_ref: None,
        }
    }

    #[test]
    fn empty_batch_has_no_receipt() {
        assert!(ReceiptBatch::from_sales(&[]).is_none());
    }

    #[test]
    fn totals_are_exact_decimal_sums() {
        let batch = ReceiptBatch::from_sales(&[
            sale("Beans", 3, Decimal::new(1050, 2)),
            sale("Rice", 2, Decimal::new(199, 2)),
        ])
        .unwrap();
        assert_eq!(batch.total, Decimal::new(3548, 2)); // 31.50 + 3.98
    }

    #[test]
    fn rendering_is_deterministic_and_itemized() {
        let batch = ReceiptBatch::from_sales(&[sale("Beans", 3, Decimal::new(1050, 2))]).unwrap();
        let first = batch.render();
        let second = batch.render();
        assert_eq!(first, second);

        assert!(first.contains("SALES RECEIPT"));
        assert!(first.contains("Ada Lovelace"));
        assert!(first.contains("Beans"));
        assert!(first.contains("x3"));
        assert!(first.contains("31.50"));
        assert!(first.contains("@ 10.50"));
        assert!(first.contains(&batch.receipt_no));
    }

    #[test]
    fn long_product_names_are_truncated() {
        let name = "An unreasonably long product name for a shelf label";
        let batch = ReceiptBatch::from_sales(&[sale(name, 1, Decimal::ONE)]).unwrap();
        let doc = batch.render();
        assert!(!doc.contains(name));
        assert!(doc.contains("An unreasonably long prod"));
    }
}
