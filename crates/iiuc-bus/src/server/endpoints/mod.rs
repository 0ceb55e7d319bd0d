pub mod admin;
pub mod assistant;
pub mod auth;
pub mod me;
pub mod schedule;
pub mod status;
pub mod student;
pub mod teacher;
