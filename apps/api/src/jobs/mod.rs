// Companies and job postings (recruiter side).

pub mod handlers;
pub mod store;
