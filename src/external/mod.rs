//! Outbound HTTP plumbing shared by toast surfaces.

pub mod client;
