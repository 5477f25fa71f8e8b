pub mod hash;
pub mod jwt;
