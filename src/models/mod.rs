pub mod booking;
pub mod emergency;
pub mod provider;
pub mod user;
