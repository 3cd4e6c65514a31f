pub mod model;
pub mod request;
pub mod user;
