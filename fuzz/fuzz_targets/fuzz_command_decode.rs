//! Fuzz target: `decode_command` + `encode_reply`
//!
//! Arbitrary payload bytes must decode or fail cleanly, and whatever the
//! outcome, the reply built from it must serialise.
//!
//! cargo fuzz run fuzz_command_decode

#![no_main]

use homenode::protocol::codec::{decode_command, encode_reply, Reply};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let reply = match decode_command(data) {
        Ok(msg) => Reply::state(&msg.action, &msg.correlation_id),
        Err(e) => Reply::error(&e.correlation_id, e.error),
    };
    encode_reply(&reply).expect("reply must serialise");
});
