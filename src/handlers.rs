pub mod auth;
pub mod permissions;
pub mod reports;
pub mod search;
