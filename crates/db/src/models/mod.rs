pub mod activity;
pub mod profile;
pub mod user_subscription;
