pub mod prelude;

pub mod categories;
pub mod products;
pub mod sub_categories;
pub mod tokens;
pub mod users;
