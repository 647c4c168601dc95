//! Infrastructure: persistence and outbound collaborator adapters.

pub mod ai;
pub mod fetcher;
pub mod object_storage;
pub mod storage;
