pub mod client;
pub mod retry;

pub use client::{HttpFetcher, RAW_DOWNLOAD_HEADER};
pub use retry::RetryPolicy;
