pub mod recipe;
pub mod relation;
pub mod shopping_list;
pub mod subscription;
