// Shared screening snapshot: jobs, candidates and matches mirrored from the
// recruitment backend, refreshed on an interval and after each completed interview.
// Interview sessions read matches from here but never write to it.

pub mod cache;
pub mod dashboard;
pub mod handlers;
