//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against the host-simulated adapters.  All tests run on the host
//! (x86_64) with no real hardware or broker required.

mod connectivity_tests;
mod harness;
mod node_service_tests;
mod router_tests;
