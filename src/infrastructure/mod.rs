pub mod encoder;
pub mod http;
pub mod storage;
