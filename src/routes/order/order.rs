use super::lifecycle;
use crate::authz::{require_admin, require_owner_or_admin};
use crate::db::PgPool;
use crate::db_models::{Order, OrderStatus};
use crate::errors::custom::CustomError;
use crate::middleware::AuthenticatedUser;
use crate::schema::orders::dsl as order_dsl;
use crate::schema::users::dsl as user_dsl;
use crate::validations::order::OrderPrice;
use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct OrderPayloadBody {
    pub title: String,
    pub description: String,
    pub fabric: String,
    pub measurements: String,
    pub estimated_price: i32,
    pub urgency: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub image: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdatePriceBody {
    pub estimated_price: i32,
}

#[derive(Debug, Serialize)]
pub struct OrderWithVendor {
    #[serde(flatten)]
    pub order: Order,
    pub vendor_email: String,
    pub company_name: Option<String>,
    pub contact_name: Option<String>,
}

type OrderVendorRow = (Order, String, Option<String>, Option<String>);

impl From<OrderVendorRow> for OrderWithVendor {
    fn from((order, vendor_email, company_name, contact_name): OrderVendorRow) -> Self {
        Self {
            order,
            vendor_email,
            company_name,
            contact_name,
        }
    }
}

/******************************************/
// New Order Creation route
/******************************************/
/**
 * @route   POST /api/orders
 * @access  JWT Protected
 */
#[instrument(name = "Create new order", skip(req_order, pool, user))]
pub async fn create_order(
    pool: web::Data<PgPool>,
    req_order: web::Json<OrderPayloadBody>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, CustomError> {
    let pool = pool.clone();
    let body = req_order.into_inner();
    let price = OrderPrice::parse(body.estimated_price).map_err(CustomError::ValidationError)?;
    let vendor_id = user.user_id;
    let order_id = Uuid::new_v4();
    let order_created_at = chrono::Local::now().naive_utc();

    let order = web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        diesel::insert_into(order_dsl::orders)
            .values((
                order_dsl::id.eq(order_id),
                order_dsl::vendor_id.eq(vendor_id),
                order_dsl::title.eq(body.title),
                order_dsl::description.eq(body.description),
                order_dsl::fabric.eq(body.fabric),
                order_dsl::measurements.eq(body.measurements),
                order_dsl::estimated_price.eq(price.get()),
                order_dsl::urgency.eq(body.urgency),
                order_dsl::delivery_date.eq(body.delivery_date),
                order_dsl::notes.eq(body.notes),
                order_dsl::image.eq(body.image),
                order_dsl::status.eq(OrderStatus::Pending),
                order_dsl::is_deleted.eq(false),
                order_dsl::created_at.eq(order_created_at),
            ))
            .returning(Order::as_returning())
            .get_result::<Order>(&mut conn)
            .map_err(CustomError::from)
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    Ok(HttpResponse::Created().json(order))
}

/******************************************/
// Listing own orders, soft-deleted rows excluded
/******************************************/
/**
 * @route   GET /api/orders
 * @access  JWT Protected
 */
#[instrument(name = "List vendor orders", skip(pool, user))]
pub async fn list_vendor_orders(
    pool: web::Data<PgPool>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, CustomError> {
    let pool = pool.clone();
    let vendor_id = user.user_id;

    let orders = web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        order_dsl::orders
            .filter(order_dsl::vendor_id.eq(vendor_id))
            .filter(order_dsl::is_deleted.eq(false))
            .order(order_dsl::created_at.desc())
            .select(Order::as_select())
            .load::<Order>(&mut conn)
            .map_err(CustomError::from)
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    Ok(HttpResponse::Ok().json(orders))
}

/******************************************/
// Admin view of every live order with vendor identity
/******************************************/
/**
 * @route   GET /api/orders/admin/all
 * @access  JWT Protected (admin)
 */
#[instrument(name = "List all orders", skip(pool, user))]
pub async fn list_all_orders(
    pool: web::Data<PgPool>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, CustomError> {
    require_admin(&user)?;
    let pool = pool.clone();

    let orders = web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        order_dsl::orders
            .inner_join(user_dsl::users)
            .filter(order_dsl::is_deleted.eq(false))
            .order(order_dsl::created_at.desc())
            .select((
                Order::as_select(),
                user_dsl::email,
                user_dsl::company_name,
                user_dsl::contact_name,
            ))
            .load::<OrderVendorRow>(&mut conn)
            .map_err(CustomError::from)
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    let orders: Vec<OrderWithVendor> = orders.into_iter().map(OrderWithVendor::from).collect();
    Ok(HttpResponse::Ok().json(orders))
}

/******************************************/
// Retrieving a single order with vendor identity
/******************************************/
/**
 * @route   GET /api/orders/{id}
 * @access  JWT Protected
 */
#[instrument(name = "Get order", skip(pool, user))]
pub async fn get_order(
    pool: web::Data<PgPool>,
    order_id: web::Path<Uuid>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, CustomError> {
    let pool = pool.clone();
    let order_id = order_id.into_inner();

    let row = web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        order_dsl::orders
            .inner_join(user_dsl::users)
            .filter(order_dsl::id.eq(order_id))
            .select((
                Order::as_select(),
                user_dsl::email,
                user_dsl::company_name,
                user_dsl::contact_name,
            ))
            .first::<OrderVendorRow>(&mut conn)
            .optional()
            .map_err(CustomError::from)?
            .ok_or_else(|| CustomError::NotFound(format!("order {} not found", order_id)))
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderWithVendor::from(row)))
}

/******************************************/
// Vendor edit, only while the order is still pending
/******************************************/
/**
 * @route   PUT /api/orders/{id}
 * @access  JWT Protected
 */
#[instrument(name = "Update order by vendor", skip(req_order, pool, user))]
pub async fn update_order_by_vendor(
    pool: web::Data<PgPool>,
    order_id: web::Path<Uuid>,
    req_order: web::Json<OrderPayloadBody>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, CustomError> {
    let pool = pool.clone();
    let order_id = order_id.into_inner();
    let body = req_order.into_inner();
    let price = OrderPrice::parse(body.estimated_price).map_err(CustomError::ValidationError)?;
    let vendor_id = user.user_id;

    let order = web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        conn.transaction::<Order, CustomError, _>(|conn| {
            let order: Order = order_dsl::orders
                .find(order_id)
                .select(Order::as_select())
                .for_update()
                .first(conn)
                .optional()?
                .ok_or_else(|| CustomError::NotFound(format!("order {} not found", order_id)))?;

            if order.vendor_id != vendor_id {
                return Err(CustomError::Forbidden(
                    "caller does not own this order".to_string(),
                ));
            }
            if order.status != OrderStatus::Pending {
                return Err(CustomError::Conflict(
                    "order can only be edited while pending".to_string(),
                ));
            }

            let order = diesel::update(order_dsl::orders.find(order_id))
                .set((
                    order_dsl::title.eq(body.title),
                    order_dsl::description.eq(body.description),
                    order_dsl::fabric.eq(body.fabric),
                    order_dsl::measurements.eq(body.measurements),
                    order_dsl::estimated_price.eq(price.get()),
                    order_dsl::urgency.eq(body.urgency),
                    order_dsl::delivery_date.eq(body.delivery_date),
                    order_dsl::notes.eq(body.notes),
                    order_dsl::image.eq(body.image),
                ))
                .returning(Order::as_returning())
                .get_result(conn)?;
            Ok(order)
        })
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    Ok(HttpResponse::Ok().json(order))
}

/******************************************/
// Admin edit, locked once the order is completed
/******************************************/
/**
 * @route   PUT /api/orders/admin/{id}
 * @access  JWT Protected (admin)
 */
#[instrument(name = "Update order by admin", skip(req_order, pool, user))]
pub async fn update_order_by_admin(
    pool: web::Data<PgPool>,
    order_id: web::Path<Uuid>,
    req_order: web::Json<OrderPayloadBody>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, CustomError> {
    require_admin(&user)?;
    let pool = pool.clone();
    let order_id = order_id.into_inner();
    let body = req_order.into_inner();
    let price = OrderPrice::parse(body.estimated_price).map_err(CustomError::ValidationError)?;

    let order = web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        conn.transaction::<Order, CustomError, _>(|conn| {
            let order: Order = order_dsl::orders
                .find(order_id)
                .select(Order::as_select())
                .for_update()
                .first(conn)
                .optional()?
                .ok_or_else(|| CustomError::NotFound(format!("order {} not found", order_id)))?;

            if order.status == OrderStatus::Completed {
                return Err(CustomError::Conflict(
                    "editing is locked once an order is completed".to_string(),
                ));
            }

            let order = diesel::update(order_dsl::orders.find(order_id))
                .set((
                    order_dsl::title.eq(body.title),
                    order_dsl::description.eq(body.description),
                    order_dsl::fabric.eq(body.fabric),
                    order_dsl::measurements.eq(body.measurements),
                    order_dsl::estimated_price.eq(price.get()),
                    order_dsl::urgency.eq(body.urgency),
                    order_dsl::delivery_date.eq(body.delivery_date),
                    order_dsl::notes.eq(body.notes),
                    order_dsl::image.eq(body.image),
                ))
                .returning(Order::as_returning())
                .get_result(conn)?;
            Ok(order)
        })
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    Ok(HttpResponse::Ok().json(order))
}

/******************************************/
// Admin price override; generated invoices keep their total
/******************************************/
/**
 * @route   PUT /api/orders/{id}/price
 * @access  JWT Protected (admin)
 */
#[instrument(name = "Update order price", skip(req_price, pool, user))]
pub async fn update_order_price(
    pool: web::Data<PgPool>,
    order_id: web::Path<Uuid>,
    req_price: web::Json<UpdatePriceBody>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, CustomError> {
    require_admin(&user)?;
    let pool = pool.clone();
    let order_id = order_id.into_inner();
    let price =
        OrderPrice::parse(req_price.estimated_price).map_err(CustomError::ValidationError)?;

    let order = web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        diesel::update(order_dsl::orders.find(order_id))
            .set((
                order_dsl::estimated_price.eq(price.get()),
                order_dsl::admin_edited.eq(true),
            ))
            .returning(Order::as_returning())
            .get_result::<Order>(&mut conn)
            .map_err(CustomError::from)
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    Ok(HttpResponse::Ok().json(order))
}

/******************************************/
// Approving an order generates its invoice
/******************************************/
/**
 * @route   POST /api/orders/{id}/approve
 * @access  JWT Protected (admin)
 */
#[instrument(name = "Approve order", skip(pool, user))]
pub async fn approve_order(
    pool: web::Data<PgPool>,
    order_id: web::Path<Uuid>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, CustomError> {
    require_admin(&user)?;
    let pool = pool.clone();
    let order_id = order_id.into_inner();

    let order = web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        lifecycle::approve(&mut conn, order_id)
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    Ok(HttpResponse::Ok().json(order))
}

/******************************************/
// Rejecting an order, refused while its invoice is paid
/******************************************/
/**
 * @route   PUT /api/orders/{id}/reject
 * @access  JWT Protected (admin)
 */
#[instrument(name = "Reject order", skip(pool, user))]
pub async fn reject_order(
    pool: web::Data<PgPool>,
    order_id: web::Path<Uuid>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, CustomError> {
    require_admin(&user)?;
    let pool = pool.clone();
    let order_id = order_id.into_inner();

    let order = web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        lifecycle::reject(&mut conn, order_id)
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    Ok(HttpResponse::Ok().json(order))
}

/******************************************/
// Vendor soft delete; the row is kept
/******************************************/
/**
 * @route   DELETE /api/orders/{id}
 * @access  JWT Protected
 */
#[instrument(name = "Soft delete order", skip(pool, user))]
pub async fn delete_order_by_vendor(
    pool: web::Data<PgPool>,
    order_id: web::Path<Uuid>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, CustomError> {
    let pool = pool.clone();
    let order_id = order_id.into_inner();
    let vendor_id = user.user_id;

    let affected = web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        diesel::update(
            order_dsl::orders
                .filter(order_dsl::id.eq(order_id))
                .filter(order_dsl::vendor_id.eq(vendor_id)),
        )
        .set(order_dsl::is_deleted.eq(true))
        .execute(&mut conn)
        .map_err(CustomError::from)
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    if affected == 0 {
        return Err(CustomError::Forbidden(
            "Unauthorized or not found".to_string(),
        ));
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({"message": "Order deleted"})))
}

/******************************************/
// Hard delete for admin or the owning vendor
/******************************************/
/**
 * @route   DELETE /api/orders/admin/{id}
 * @access  JWT Protected (admin or owner)
 */
#[instrument(name = "Hard delete order", skip(pool, user))]
pub async fn delete_order_by_admin(
    pool: web::Data<PgPool>,
    order_id: web::Path<Uuid>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, CustomError> {
    let pool = pool.clone();
    let order_id = order_id.into_inner();
    let caller = user.into_inner();

    web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        let owner: Uuid = order_dsl::orders
            .find(order_id)
            .select(order_dsl::vendor_id)
            .first(&mut conn)
            .optional()
            .map_err(CustomError::from)?
            .ok_or_else(|| CustomError::NotFound(format!("order {} not found", order_id)))?;

        require_owner_or_admin(&caller, owner)?;

        diesel::delete(order_dsl::orders.find(order_id))
            .execute(&mut conn)
            .map_err(CustomError::from)
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    Ok(HttpResponse::Ok().json(serde_json::json!({"message": "Order deleted"})))
}
