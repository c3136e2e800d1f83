pub mod admin;
pub mod permissions;
pub mod server;
