pub mod http;
pub mod status;
pub mod users;
