pub mod admin;
pub mod auth;
pub mod participant;
pub mod session;
pub mod shared;
pub mod tenant;
