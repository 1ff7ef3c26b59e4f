pub mod client;
pub mod index;
pub mod query;
pub mod report;
#[cfg(feature = "server")]
pub mod serve;
pub mod status;
