pub mod config;
pub mod request_status;
pub mod storage;

pub use request_status::RequestStatus;
