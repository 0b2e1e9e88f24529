pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod router;
