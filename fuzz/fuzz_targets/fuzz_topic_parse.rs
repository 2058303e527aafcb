//! Fuzz target: `parse_command_topic`
//!
//! Arbitrary UTF-8 topics must never panic the parser.  Accepted topics
//! must rebuild to the exact same string.
//!
//! cargo fuzz run fuzz_topic_parse

#![no_main]

use homenode::protocol::topic::{command_topic, parse_command_topic, MAX_SEGMENT_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(topic) = core::str::from_utf8(data) else {
        return;
    };

    if let Ok(parsed) = parse_command_topic("smarthome", topic) {
        assert!(!parsed.room.is_empty() && parsed.room.len() <= MAX_SEGMENT_LEN);
        assert!(!parsed.device.is_empty() && parsed.device.len() <= MAX_SEGMENT_LEN);

        // Every accepted topic fits the outbound buffer.
        let rebuilt = command_topic("smarthome", parsed.room, parsed.device)
            .expect("accepted topic must fit the topic buffer");
        assert_eq!(rebuilt.as_str(), topic);
    }
});
