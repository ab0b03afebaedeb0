pub mod auth;
pub mod permission_model;
pub mod permission_provider;
pub mod report_service;
pub mod route_access;
pub mod search_service;
