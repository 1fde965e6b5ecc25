pub mod auth_jwt;
pub mod authz;
pub mod config;
pub mod db;
pub mod db_models;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod schema;
pub mod session_state;
pub mod startup;
pub mod telemetry;
pub mod validations;
