pub mod auth;
pub mod blog;
pub mod producto;
pub mod shared;
