pub mod color;
pub mod hash;
pub mod jwt;
