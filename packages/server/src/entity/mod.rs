pub mod admin;
pub mod answer;
pub mod participant;
pub mod participation;
pub mod round;
pub mod session;
pub mod tenant;
