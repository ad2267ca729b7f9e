pub mod admin;
pub mod auth;
pub mod notices;
pub mod root;
pub mod users;
