
mod auth;
mod recipes;
mod relations;
mod users;
