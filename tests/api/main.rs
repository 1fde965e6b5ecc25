mod auth;
mod health_check;
mod helper;
mod order;
