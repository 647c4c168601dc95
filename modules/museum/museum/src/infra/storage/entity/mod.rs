pub mod catalog_object;
pub mod modified_object;
pub mod user;
pub mod user_inventory;
pub mod user_modified_object;
