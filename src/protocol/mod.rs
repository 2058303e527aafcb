//! Broker protocol: topic grammar, JSON codec and the command router.

pub mod codec;
pub mod router;
pub mod topic;
