use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

use argon2::{password_hash::SaltString, Argon2, PasswordHasher};
use diesel::r2d2::{ConnectionManager, Pool};
use dotenv::dotenv;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::env;
use tailoring::db::{create_database, PgPool};
use tailoring::db_models::UserRole;
use tailoring::schema::users::dsl as user_dsl;
use tailoring::startup::Application;
use tailoring::telemetry::{get_subscriber, init_subscriber};
use uuid::Uuid;

static TRACING: Lazy<()> = Lazy::new(|| {
    dotenv().ok();
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    // We cannot assign the output of `get_subscriber` to a variable based on the value of `TEST_LOG`
    // because the sink is part of the type returned by `get_subscriber`, therefore they are not the
    // same type. We could work around it, but this is the most straight-forward way of moving forward.
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    };
});

pub struct TestUser {
    pub user_id: Uuid,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}
impl TestUser {
    pub fn generate(role: UserRole) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            email: format!("{}@testmail.com", Uuid::new_v4()),
            password: Uuid::new_v4().to_string(),
            role,
        }
    }
    fn store(&self, pool: &PgPool) {
        let salt_argon = SaltString::generate(&mut rand::thread_rng());
        let hashed_password = Argon2::default()
            .hash_password(self.password.as_bytes(), &salt_argon)
            .unwrap()
            .to_string();
        let mut conn = pool.get().expect("Failed to get db connection from pool");

        diesel::insert_into(user_dsl::users)
            .values((
                user_dsl::id.eq(self.user_id),
                user_dsl::email.eq(self.email.clone()),
                user_dsl::password_hash.eq(hashed_password),
                user_dsl::role.eq(self.role),
                user_dsl::registered_at.eq(chrono::Local::now().naive_utc()),
            ))
            .execute(&mut conn)
            .expect("Failed to create test user.");
    }
}

pub struct TestApp {
    pub port: u16,
    pub address: String,
    pub db_pool: PgPool,
    pub database_name: String,
    pub vendor: TestUser,
    pub admin: TestUser,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .api_client
            .post(&format!("{}/api/auth/login", &self.address))
            .json(&serde_json::json!({
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(response.status().as_u16(), 200);

        let body: Value = response.json().await.unwrap();
        body["token"]
            .as_str()
            .expect("Token not found")
            .to_string()
    }

    pub async fn login_vendor(&self) -> String {
        self.login(&self.vendor.email, &self.vendor.password).await
    }

    pub async fn login_admin(&self) -> String {
        self.login(&self.admin.email, &self.admin.password).await
    }

    pub async fn create_order(&self, body: Value, token: &str) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/orders", &self.address))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn approve_order(&self, order_id: &str, token: &str) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/orders/{}/approve", &self.address, order_id))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn reject_order(&self, order_id: &str, token: &str) -> reqwest::Response {
        self.api_client
            .put(&format!("{}/api/orders/{}/reject", &self.address, order_id))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn mark_invoice_completed(&self, invoice_id: &str, token: &str) -> reqwest::Response {
        self.api_client
            .put(&format!(
                "{}/api/invoices/{}/mark-completed",
                &self.address, invoice_id
            ))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub fn sample_order_body(price: i32) -> Value {
    serde_json::json!({
        "title": "Three piece suit",
        "description": "Charcoal wool, single breasted",
        "fabric": "Wool",
        "measurements": "Chest 40, waist 34, sleeve 25",
        "estimated_price": price
    })
}

pub fn run_db_migrations(conn: &mut impl MigrationHarness<diesel::pg::Pg>) {
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Could not run migrations");
}

pub async fn spawn_app() -> TestApp {
    // To Ensure that the tracing stack is only initialized once
    Lazy::force(&TRACING);

    dotenv().ok();
    if env::var("JWT_SECRET").is_err() {
        env::set_var("JWT_SECRET", "test-secret");
    }
    let database_name = Uuid::new_v4().to_string();
    let database_url = env::var("DATABASE_TEST_URL").expect("DATABASE_TEST_URL must be set");
    create_database(&database_name);

    let new_database_url = format!("{}/{}", database_url, database_name);
    let manager = ConnectionManager::<PgConnection>::new(new_database_url.clone());
    let pool = Pool::builder()
        .build(manager)
        .expect("Failed to create pool.");
    // Run migrations
    let mut conn = pool.get().expect("Couldn't get db connection from Pool");
    run_db_migrations(&mut conn);
    drop(conn);

    let application = Application::build(0, pool.clone())
        .await
        .expect("Failed to build application");
    let application_port = application.port();
    let address = format!("http://127.0.0.1:{}", application_port);
    let _ = tokio::spawn(application.run_until_stopped());

    let client = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap();

    let testapp = TestApp {
        port: application_port,
        address,
        db_pool: pool.clone(),
        database_name,
        vendor: TestUser::generate(UserRole::Vendor),
        admin: TestUser::generate(UserRole::Admin),
        api_client: client,
    };
    testapp.vendor.store(&testapp.db_pool);
    testapp.admin.store(&testapp.db_pool);
    testapp
}
