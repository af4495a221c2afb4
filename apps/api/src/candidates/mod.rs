// Candidate profiles, job applications and interview scheduling.

pub mod applications;
pub mod handlers;
pub mod interviews;
pub mod profile;
