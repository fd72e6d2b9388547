pub mod auth;
pub mod catalog;
pub mod recipe;
pub mod user;
