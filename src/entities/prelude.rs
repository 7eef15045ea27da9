pub use super::categories::Entity as Categories;
pub use super::products::Entity as Products;
pub use super::sub_categories::Entity as SubCategories;
pub use super::tokens::Entity as Tokens;
pub use super::users::Entity as Users;
