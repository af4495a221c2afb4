pub mod candidate;
pub mod job;
pub mod recommendation;
pub mod user;
