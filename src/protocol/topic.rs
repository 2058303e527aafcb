//! Topic grammar.
//!
//! ```text
//!   inbound   <prefix>/<room>/<device>/command
//!   outbound  <prefix>/<room>/<device>/state
//! ```
//!
//! Matching is exact and case-sensitive.  Room and device segments are
//! non-empty and at most [`MAX_SEGMENT_LEN`] bytes.

use core::fmt::Write;

use heapless::String;

use crate::app::ports::MAX_TOPIC_LEN;
use crate::error::TopicError;

pub const MAX_SEGMENT_LEN: usize = 31;
pub const COMMAND_SUFFIX: &str = "command";
pub const STATE_SUFFIX: &str = "state";

pub type TopicBuf = String<MAX_TOPIC_LEN>;

/// Room and device segments borrowed from an inbound topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTopic<'a> {
    pub room: &'a str,
    pub device: &'a str,
}

/// A prefix, room or device segment: non-empty, at most
/// [`MAX_SEGMENT_LEN`] bytes, no separator or MQTT wildcard.
pub fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.len() <= MAX_SEGMENT_LEN
        && !segment.contains(['/', '+', '#'])
}

pub fn parse_command_topic<'a>(
    prefix: &str,
    topic: &'a str,
) -> Result<CommandTopic<'a>, TopicError> {
    let mut parts = topic.split('/');
    let (Some(head), Some(room), Some(device), Some(suffix), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(TopicError::SegmentCount);
    };

    if head != prefix {
        return Err(TopicError::WrongPrefix);
    }
    if suffix != COMMAND_SUFFIX {
        return Err(TopicError::WrongSuffix);
    }
    if room.is_empty() || device.is_empty() {
        return Err(TopicError::EmptySegment);
    }
    if room.len() > MAX_SEGMENT_LEN || device.len() > MAX_SEGMENT_LEN {
        return Err(TopicError::SegmentTooLong);
    }
    Ok(CommandTopic { room, device })
}

fn format_topic(
    prefix: &str,
    room: &str,
    device: &str,
    suffix: &str,
) -> Result<TopicBuf, TopicError> {
    let mut buf = TopicBuf::new();
    write!(buf, "{prefix}/{room}/{device}/{suffix}").map_err(|_| TopicError::TooLong)?;
    Ok(buf)
}

pub fn command_topic(prefix: &str, room: &str, device: &str) -> Result<TopicBuf, TopicError> {
    format_topic(prefix, room, device, COMMAND_SUFFIX)
}

pub fn state_topic(prefix: &str, room: &str, device: &str) -> Result<TopicBuf, TopicError> {
    format_topic(prefix, room, device, STATE_SUFFIX)
}
