pub mod auth;
pub mod categories;
pub mod health;
pub mod products;
pub mod subcategories;
pub mod uploads;
