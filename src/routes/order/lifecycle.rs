//! The transactional heart of the order lifecycle: approve, reject and
//! mark-paid are multi-row transitions whose writes must land together.
//!
//! Every operation takes the order row lock (`FOR UPDATE`) before touching
//! invoices, so concurrent calls on the same order serialize instead of
//! racing the invoice existence check. `UNIQUE (invoices.order_id)` is the
//! schema-level backstop for the one-invoice-per-order invariant.

use crate::db_models::{Invoice, Order, OrderStatus, PaymentStatus};
use crate::errors::custom::CustomError;
use crate::schema::invoices::dsl as invoice_dsl;
use crate::schema::orders::dsl as order_dsl;
use diesel::prelude::*;
use diesel::PgConnection;
use tracing::instrument;
use uuid::Uuid;

fn lock_order(conn: &mut PgConnection, id: Uuid) -> Result<Order, CustomError> {
    order_dsl::orders
        .find(id)
        .select(Order::as_select())
        .for_update()
        .first(conn)
        .optional()?
        .ok_or_else(|| CustomError::NotFound(format!("order {} not found", id)))
}

/// Transitions an order to `Approved` and generates its invoice if one does
/// not exist yet. Re-approving an already approved order skips the status
/// write but still runs the invoice check, so the operation is idempotent.
#[instrument(name = "Approve order transaction", skip(conn))]
pub fn approve(conn: &mut PgConnection, order_id: Uuid) -> Result<Order, CustomError> {
    conn.transaction::<Order, CustomError, _>(|conn| {
        let order = lock_order(conn, order_id)?;

        let order = match order.status {
            OrderStatus::Approved => order,
            OrderStatus::Pending => diesel::update(order_dsl::orders.find(order_id))
                .set(order_dsl::status.eq(OrderStatus::Approved))
                .returning(Order::as_returning())
                .get_result(conn)?,
            OrderStatus::Rejected | OrderStatus::Completed => {
                return Err(CustomError::Conflict(format!(
                    "order {} cannot be approved from status {:?}",
                    order_id, order.status
                )));
            }
        };

        let existing: Option<Uuid> = invoice_dsl::invoices
            .filter(invoice_dsl::order_id.eq(order.id))
            .select(invoice_dsl::id)
            .first(conn)
            .optional()?;

        if existing.is_none() {
            diesel::insert_into(invoice_dsl::invoices)
                .values((
                    invoice_dsl::id.eq(Uuid::new_v4()),
                    invoice_dsl::order_id.eq(order.id),
                    invoice_dsl::vendor_id.eq(order.vendor_id),
                    invoice_dsl::total_price.eq(order.estimated_price),
                    invoice_dsl::payment_status.eq(PaymentStatus::Pending),
                    invoice_dsl::created_at.eq(chrono::Local::now().naive_utc()),
                ))
                .execute(conn)?;
        }

        Ok(order)
    })
}

/// Rejects an order, deleting any unpaid invoice attached to it. A paid
/// invoice blocks the rejection entirely; nothing changes in that case.
#[instrument(name = "Reject order transaction", skip(conn))]
pub fn reject(conn: &mut PgConnection, order_id: Uuid) -> Result<Order, CustomError> {
    conn.transaction::<Order, CustomError, _>(|conn| {
        let order = lock_order(conn, order_id)?;

        let invoice: Option<Invoice> = invoice_dsl::invoices
            .filter(invoice_dsl::order_id.eq(order.id))
            .select(Invoice::as_select())
            .first(conn)
            .optional()?;

        if let Some(ref invoice) = invoice {
            if invoice.payment_status == PaymentStatus::Completed {
                return Err(CustomError::Conflict(
                    "cannot reject a paid order".to_string(),
                ));
            }
        }

        if invoice.is_some() {
            diesel::delete(invoice_dsl::invoices.filter(invoice_dsl::order_id.eq(order.id)))
                .execute(conn)?;
        }

        let order = diesel::update(order_dsl::orders.find(order_id))
            .set(order_dsl::status.eq(OrderStatus::Rejected))
            .returning(Order::as_returning())
            .get_result(conn)?;

        Ok(order)
    })
}

/// Marks an invoice paid and flips the linked order to `Completed` in the
/// same transaction. The order update is unconditional once the invoice row
/// is located.
#[instrument(name = "Mark invoice paid transaction", skip(conn))]
pub fn mark_paid(conn: &mut PgConnection, invoice_id: Uuid) -> Result<Invoice, CustomError> {
    conn.transaction::<Invoice, CustomError, _>(|conn| {
        let invoice: Invoice = invoice_dsl::invoices
            .find(invoice_id)
            .select(Invoice::as_select())
            .first(conn)
            .optional()?
            .ok_or_else(|| CustomError::NotFound(format!("invoice {} not found", invoice_id)))?;

        // Same lock order as approve/reject: the order row first.
        lock_order(conn, invoice.order_id)?;

        let invoice = diesel::update(invoice_dsl::invoices.find(invoice_id))
            .set(invoice_dsl::payment_status.eq(PaymentStatus::Completed))
            .returning(Invoice::as_returning())
            .get_result::<Invoice>(conn)?;

        diesel::update(order_dsl::orders.find(invoice.order_id))
            .set(order_dsl::status.eq(OrderStatus::Completed))
            .execute(conn)?;

        Ok(invoice)
    })
}
