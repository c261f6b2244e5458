pub mod blog;
pub mod producto;
pub mod trabajador;
