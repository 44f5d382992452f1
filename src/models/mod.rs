pub mod bid;
pub mod job;
pub mod pending;
pub mod vendor;
