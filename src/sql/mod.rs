//! SQL output side: escaping (C5) and INSERT batching (C6).

pub mod batch;
pub mod escape;
