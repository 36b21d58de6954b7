mod admin;
mod pages;

pub use admin::health;
pub use pages::{create_form, create_page, index, view_page};
