use crate::authz::require_admin;
use crate::db::PgPool;
use crate::db_models::Invoice;
use crate::errors::custom::CustomError;
use crate::middleware::AuthenticatedUser;
use crate::routes::order::lifecycle;
use crate::schema::invoices::dsl as invoice_dsl;
use crate::schema::users::dsl as user_dsl;
use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct InvoiceWithVendor {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub vendor_email: String,
    pub company_name: Option<String>,
}

type InvoiceVendorRow = (Invoice, String, Option<String>);

impl From<InvoiceVendorRow> for InvoiceWithVendor {
    fn from((invoice, vendor_email, company_name): InvoiceVendorRow) -> Self {
        Self {
            invoice,
            vendor_email,
            company_name,
        }
    }
}

/******************************************/
// Admin view of every invoice with vendor identity
/******************************************/
/**
 * @route   GET /api/invoices
 * @access  JWT Protected (admin)
 */
#[instrument(name = "List all invoices", skip(pool, user))]
pub async fn list_all_invoices(
    pool: web::Data<PgPool>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, CustomError> {
    require_admin(&user)?;
    let pool = pool.clone();

    let invoices = web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        invoice_dsl::invoices
            .inner_join(user_dsl::users)
            .order(invoice_dsl::created_at.desc())
            .select((
                Invoice::as_select(),
                user_dsl::email,
                user_dsl::company_name,
            ))
            .load::<InvoiceVendorRow>(&mut conn)
            .map_err(CustomError::from)
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    let invoices: Vec<InvoiceWithVendor> =
        invoices.into_iter().map(InvoiceWithVendor::from).collect();
    Ok(HttpResponse::Ok().json(invoices))
}

/******************************************/
// Vendor-scoped invoice listing
/******************************************/
/**
 * @route   GET /api/invoices/vendor
 * @access  JWT Protected
 */
#[instrument(name = "List vendor invoices", skip(pool, user))]
pub async fn list_vendor_invoices(
    pool: web::Data<PgPool>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, CustomError> {
    let pool = pool.clone();
    let vendor_id = user.user_id;

    let invoices = web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        invoice_dsl::invoices
            .filter(invoice_dsl::vendor_id.eq(vendor_id))
            .order(invoice_dsl::created_at.desc())
            .select(Invoice::as_select())
            .load::<Invoice>(&mut conn)
            .map_err(CustomError::from)
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    Ok(HttpResponse::Ok().json(invoices))
}

/******************************************/
// Marking an invoice paid completes the linked order
/******************************************/
/**
 * @route   PUT /api/invoices/{id}/mark-completed
 * @access  JWT Protected (admin)
 */
#[instrument(name = "Mark invoice completed", skip(pool, user))]
pub async fn mark_invoice_completed(
    pool: web::Data<PgPool>,
    invoice_id: web::Path<Uuid>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, CustomError> {
    require_admin(&user)?;
    let pool = pool.clone();
    let invoice_id = invoice_id.into_inner();

    let invoice = web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        lifecycle::mark_paid(&mut conn, invoice_id)
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    Ok(HttpResponse::Ok().json(invoice))
}

/******************************************/
// Deleting an invoice
/******************************************/
/**
 * @route   DELETE /api/invoices/{id}
 * @access  JWT Protected (admin)
 */
#[instrument(name = "Delete invoice", skip(pool, user))]
pub async fn delete_invoice(
    pool: web::Data<PgPool>,
    invoice_id: web::Path<Uuid>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, CustomError> {
    require_admin(&user)?;
    let pool = pool.clone();
    let invoice_id = invoice_id.into_inner();

    let affected = web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        diesel::delete(invoice_dsl::invoices.find(invoice_id))
            .execute(&mut conn)
            .map_err(CustomError::from)
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    if affected == 0 {
        return Err(CustomError::NotFound(format!(
            "invoice {} not found",
            invoice_id
        )));
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({"message": "Invoice deleted"})))
}
