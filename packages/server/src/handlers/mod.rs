pub mod assets;
pub mod auth;
pub mod blog;
pub mod forms;
pub mod producto;
