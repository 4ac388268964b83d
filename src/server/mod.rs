//! The remote authority: trusted-side validation of submitted scores and
//! the leaderboard built from what survives it.

pub mod authority;
pub mod validate;
