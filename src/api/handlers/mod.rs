pub mod admin;
pub mod auth;
pub mod bookings;
pub mod pages;
pub mod profile;
pub mod root;
pub mod turfs;
