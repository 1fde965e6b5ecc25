use crate::db::PgPool;
use crate::middleware::jwt_auth_middleware;
use crate::routes::{
    auth::auth::{login_user, register_user},
    health_check::health_check,
    invoice::invoice::{
        delete_invoice, list_all_invoices, list_vendor_invoices, mark_invoice_completed,
    },
    order::order::{
        approve_order, create_order, delete_order_by_admin, delete_order_by_vendor, get_order,
        list_all_orders, list_vendor_orders, reject_order, update_order_by_admin,
        update_order_by_vendor, update_order_price,
    },
    user::user::{
        create_vendor, delete_vendor, get_profile, list_vendors, reset_vendor_password,
        update_profile,
    },
};
use actix_web::{dev::Server, web, App, HttpServer};
use actix_web_lab::middleware::from_fn;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

/**************************************************************/
// Application state to reuse the same code in main and tests
/***************************************************************/
pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(port: u16, pool: PgPool) -> Result<Self, std::io::Error> {
        let listener = if port == 0 {
            TcpListener::bind("127.0.0.1:0")?
        } else {
            let address = format!("127.0.0.1:{}", port);
            TcpListener::bind(&address)?
        };

        let actual_port = listener.local_addr()?.port();

        let server = run_server(listener, pool.clone()).await?;
        Ok(Self {
            port: actual_port,
            server,
        })
    }
    pub fn port(&self) -> u16 {
        self.port
    }
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

/******************************************/
// Running Server
/******************************************/
pub async fn run_server(listener: TcpListener, pool: PgPool) -> Result<Server, std::io::Error> {
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(pool.clone()))
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .route("/auth/register", web::post().to(register_user))
                    .route("/auth/login", web::post().to(login_user))
                    .service(
                        web::scope("")
                            .wrap(from_fn(jwt_auth_middleware))
                            .route("/users/me", web::get().to(get_profile))
                            .route("/users/me", web::put().to(update_profile))
                            .route("/users/vendors", web::get().to(list_vendors))
                            .route("/users/vendors", web::post().to(create_vendor))
                            .route("/users/vendors/{id}", web::delete().to(delete_vendor))
                            .route(
                                "/users/vendors/{id}/password",
                                web::put().to(reset_vendor_password),
                            )
                            // Admin order routes come first so they are not
                            // swallowed by the `{id}` matchers below.
                            .route("/orders/admin/all", web::get().to(list_all_orders))
                            .route("/orders/admin/{id}", web::put().to(update_order_by_admin))
                            .route(
                                "/orders/admin/{id}",
                                web::delete().to(delete_order_by_admin),
                            )
                            .route("/orders", web::post().to(create_order))
                            .route("/orders", web::get().to(list_vendor_orders))
                            .route("/orders/{id}/approve", web::post().to(approve_order))
                            .route("/orders/{id}/reject", web::put().to(reject_order))
                            .route("/orders/{id}/price", web::put().to(update_order_price))
                            .route("/orders/{id}", web::get().to(get_order))
                            .route("/orders/{id}", web::put().to(update_order_by_vendor))
                            .route("/orders/{id}", web::delete().to(delete_order_by_vendor))
                            .route("/invoices", web::get().to(list_all_invoices))
                            .route("/invoices/vendor", web::get().to(list_vendor_invoices))
                            .route(
                                "/invoices/{id}/mark-completed",
                                web::put().to(mark_invoice_completed),
                            )
                            .route("/invoices/{id}", web::delete().to(delete_invoice)),
                    ),
            )
    })
    .listen(listener)?
    .run();
    Ok(server)
}
