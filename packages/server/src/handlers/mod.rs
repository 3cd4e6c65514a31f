pub mod embed;
pub mod health;
pub mod model;
pub mod request;
pub mod user;
