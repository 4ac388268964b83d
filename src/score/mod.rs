//! Client-side score pipeline: record types, the append-only local
//! ledger, digest-at-commit, and batch sync to the remote authority.

pub mod integrity;
pub mod ledger;
pub mod record;
pub mod sync;
