pub mod model;
pub mod request;
pub mod shared;
pub mod user;
