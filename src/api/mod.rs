mod handlers;
pub mod response;
mod routes;
pub mod views;

pub use routes::create_router;
