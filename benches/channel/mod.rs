pub mod feed;
pub mod request;
