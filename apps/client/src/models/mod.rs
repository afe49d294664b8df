pub mod analysis;
pub mod documents;
pub mod job;
pub mod search;
