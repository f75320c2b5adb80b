pub mod access;
pub mod activity;
pub mod auth;
pub mod config;
pub mod database_validator;
pub mod login;
pub mod onboarding;
pub mod streak;
pub mod trial;
