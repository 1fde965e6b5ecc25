use crate::helper::spawn_app;
use serde_json::Value;
use tailoring::db::drop_database;

#[tokio::test]
async fn register_and_login_round_trip() {
    let app = spawn_app().await;

    let register_response = app
        .api_client
        .post(&format!("{}/api/auth/register", &app.address))
        .json(&serde_json::json!({
            "email": "new.vendor@stitchworks.io",
            "password": "a-strong-password"
        }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(register_response.status().as_u16(), 201);

    let login_response = app
        .api_client
        .post(&format!("{}/api/auth/login", &app.address))
        .json(&serde_json::json!({
            "email": "new.vendor@stitchworks.io",
            "password": "a-strong-password"
        }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(login_response.status().as_u16(), 200);

    let body: Value = login_response.json().await.unwrap();
    assert!(body.get("token").is_some(), "JWT token not found in response");
    assert_eq!(body["user"]["role"], "vendor");
    drop_database(&app.database_name);
}

#[tokio::test]
async fn registering_the_same_email_twice_is_a_conflict() {
    let app = spawn_app().await;
    let body = serde_json::json!({
        "email": "duplicate@stitchworks.io",
        "password": "a-strong-password"
    });

    let first = app
        .api_client
        .post(&format!("{}/api/auth/register", &app.address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(first.status().as_u16(), 201);

    let second = app
        .api_client
        .post(&format!("{}/api/auth/register", &app.address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(second.status().as_u16(), 409);
    drop_database(&app.database_name);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(&format!("{}/api/auth/login", &app.address))
        .json(&serde_json::json!({
            "email": app.vendor.email,
            "password": "definitely-wrong"
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 401);
    drop_database(&app.database_name);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .get(&format!("{}/api/orders", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(response.status().as_u16(), 401);
    drop_database(&app.database_name);
}
