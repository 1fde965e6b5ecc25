use crate::helper::{sample_order_body, spawn_app};
use diesel::prelude::*;
use serde_json::Value;
use tailoring::db::drop_database;
use tailoring::schema::orders::dsl as order_dsl;
use uuid::Uuid;

#[tokio::test]
async fn order_creation_get_and_list() {
    let app = spawn_app().await;
    let token = app.login_vendor().await;

    let order_response = app.create_order(sample_order_body(12_000), &token).await;
    assert_eq!(order_response.status().as_u16(), 201);

    let order_body: Value = order_response.json().await.unwrap();
    let order_id = order_body["id"].as_str().expect("Order id not found");
    assert_eq!(order_body["status"], "Pending");

    let get_response = app
        .api_client
        .get(&format!("{}/api/orders/{}", &app.address, order_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(get_response.status().as_u16(), 200);
    let get_text = get_response.text().await.unwrap();
    assert!(get_text.contains("Pending"));
    assert!(get_text.contains(&app.vendor.email));

    let list_response = app
        .api_client
        .get(&format!("{}/api/orders", &app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request.");
    let list_text = list_response.text().await.unwrap();
    assert!(list_text.contains(order_id));
    drop_database(&app.database_name);
}

#[tokio::test]
async fn negative_price_is_rejected() {
    let app = spawn_app().await;
    let token = app.login_vendor().await;

    let response = app.create_order(sample_order_body(-50), &token).await;

    assert_eq!(response.status().as_u16(), 400);
    drop_database(&app.database_name);
}

#[tokio::test]
async fn soft_deleted_order_is_hidden_but_kept() {
    let app = spawn_app().await;
    let token = app.login_vendor().await;

    let order_response = app.create_order(sample_order_body(8_000), &token).await;
    let order_body: Value = order_response.json().await.unwrap();
    let order_id = order_body["id"].as_str().unwrap().to_string();

    let delete_response = app
        .api_client
        .delete(&format!("{}/api/orders/{}", &app.address, order_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(delete_response.status().as_u16(), 200);

    let list_response = app
        .api_client
        .get(&format!("{}/api/orders", &app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request.");
    let list_text = list_response.text().await.unwrap();
    assert!(!list_text.contains(&order_id));

    // The row survives, flagged instead of removed.
    let mut conn = app.db_pool.get().unwrap();
    let is_deleted: bool = order_dsl::orders
        .find(Uuid::parse_str(&order_id).unwrap())
        .select(order_dsl::is_deleted)
        .first(&mut conn)
        .expect("Soft-deleted order row is gone");
    assert!(is_deleted);
    drop_database(&app.database_name);
}

#[tokio::test]
async fn vendor_cannot_soft_delete_someone_elses_order() {
    let app = spawn_app().await;
    let vendor_token = app.login_vendor().await;
    let admin_token = app.login_admin().await;

    let order_response = app
        .create_order(sample_order_body(8_000), &vendor_token)
        .await;
    let order_body: Value = order_response.json().await.unwrap();
    let order_id = order_body["id"].as_str().unwrap();

    // The admin user does not own the order, so the scoped soft delete
    // matches nothing.
    let delete_response = app
        .api_client
        .delete(&format!("{}/api/orders/{}", &app.address, order_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(delete_response.status().as_u16(), 403);
    drop_database(&app.database_name);
}

#[tokio::test]
async fn vendor_edits_are_locked_after_approval() {
    let app = spawn_app().await;
    let vendor_token = app.login_vendor().await;
    let admin_token = app.login_admin().await;

    let order_response = app
        .create_order(sample_order_body(10_000), &vendor_token)
        .await;
    let order_body: Value = order_response.json().await.unwrap();
    let order_id = order_body["id"].as_str().unwrap();

    let approve_response = app.approve_order(order_id, &admin_token).await;
    assert_eq!(approve_response.status().as_u16(), 200);

    let update_response = app
        .api_client
        .put(&format!("{}/api/orders/{}", &app.address, order_id))
        .bearer_auth(&vendor_token)
        .json(&sample_order_body(9_000))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(update_response.status().as_u16(), 409);
    drop_database(&app.database_name);
}

#[tokio::test]
async fn lifecycle_operations_require_the_admin_capability() {
    let app = spawn_app().await;
    let vendor_token = app.login_vendor().await;

    let order_response = app
        .create_order(sample_order_body(10_000), &vendor_token)
        .await;
    let order_body: Value = order_response.json().await.unwrap();
    let order_id = order_body["id"].as_str().unwrap();

    let approve_response = app.approve_order(order_id, &vendor_token).await;
    assert_eq!(approve_response.status().as_u16(), 403);

    let reject_response = app.reject_order(order_id, &vendor_token).await;
    assert_eq!(reject_response.status().as_u16(), 403);
    drop_database(&app.database_name);
}

#[tokio::test]
async fn admin_hard_delete_removes_order_and_invoice() {
    let app = spawn_app().await;
    let vendor_token = app.login_vendor().await;
    let admin_token = app.login_admin().await;

    let order_response = app
        .create_order(sample_order_body(10_000), &vendor_token)
        .await;
    let order_body: Value = order_response.json().await.unwrap();
    let order_id = order_body["id"].as_str().unwrap();
    app.approve_order(order_id, &admin_token).await;

    let delete_response = app
        .api_client
        .delete(&format!("{}/api/orders/admin/{}", &app.address, order_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(delete_response.status().as_u16(), 200);

    use tailoring::schema::invoices::dsl as invoice_dsl;
    let mut conn = app.db_pool.get().unwrap();
    let order_count: i64 = order_dsl::orders
        .filter(order_dsl::id.eq(Uuid::parse_str(order_id).unwrap()))
        .count()
        .get_result(&mut conn)
        .unwrap();
    let invoice_count: i64 = invoice_dsl::invoices
        .filter(invoice_dsl::order_id.eq(Uuid::parse_str(order_id).unwrap()))
        .count()
        .get_result(&mut conn)
        .unwrap();
    assert_eq!(order_count, 0);
    assert_eq!(invoice_count, 0);
    drop_database(&app.database_name);
}
