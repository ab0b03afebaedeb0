pub mod auth;
pub mod averbacao;
pub mod permission;
pub mod search;
