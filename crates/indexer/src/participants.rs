// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::hex;
use alloy::primitives::Address;
use serde_json::Value;
use std::collections::HashSet;

const ADDRESS_LEN: usize = 20;

/// Distinct addresses seen in transfer logs, kept in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantSet {
    ordered: Vec<Address>,
    seen: HashSet<Address>,
}

impl ParticipantSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the address was already present
    pub fn insert(&mut self, address: Address) -> bool {
        if !self.seen.insert(address) {
            return false;
        }
        self.ordered.push(address);
        true
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.seen.contains(address)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.ordered
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.ordered.iter()
    }

    pub fn into_vec(self) -> Vec<Address> {
        self.ordered
    }
}

impl Extend<Address> for ParticipantSet {
    fn extend<T: IntoIterator<Item = Address>>(&mut self, iter: T) {
        for address in iter {
            self.insert(address);
        }
    }
}

impl FromIterator<Address> for ParticipantSet {
    fn from_iter<T: IntoIterator<Item = Address>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

/// Address held in the low 20 bytes of an indexed topic
pub fn topic_address(topic: &str) -> Option<Address> {
    let bytes = hex::decode(topic).ok()?;
    if bytes.len() < ADDRESS_LEN {
        return None;
    }
    Some(Address::from_slice(&bytes[bytes.len() - ADDRESS_LEN..]))
}

/// The `from` and `to` participants of one log entry.
///
/// `None` when the entry has fewer than three topics or either address topic is malformed.
pub fn entry_participants(entry: &Value) -> Option<(Address, Address)> {
    let topics = entry.get("topics")?.as_array()?;
    if topics.len() < 3 {
        return None;
    }
    let from = topic_address(topics[1].as_str()?)?;
    let to = topic_address(topics[2].as_str()?)?;
    Some((from, to))
}

/// Add the participants of every well-formed entry. Returns the number of entries skipped.
pub fn collect_participants(entries: &[Value], set: &mut ParticipantSet) -> usize {
    let mut skipped = 0;
    for entry in entries {
        match entry_participants(entry) {
            Some((from, to)) => {
                set.insert(from);
                set.insert(to);
            }
            None => skipped += 1,
        }
    }
    skipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use serde_json::json;

    const TRANSFER: &str = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

    #[test]
    fn test_topic_address_is_case_insensitive() {
        let expected = address!("00000000000000000000000000000000000000aa");
        assert_eq!(
            topic_address("0x00000000000000000000000000000000000000000000000000000000000000AA"),
            Some(expected)
        );
        assert_eq!(
            topic_address("0x00000000000000000000000000000000000000000000000000000000000000aa"),
            Some(expected)
        );
    }

    #[test]
    fn test_topic_address_rejects_malformed() {
        assert_eq!(topic_address("0xzz"), None);
        assert_eq!(topic_address("0x1234"), None);
        assert_eq!(topic_address(""), None);
    }

    #[test]
    fn test_entries_with_short_topics_are_skipped() {
        let entries = vec![
            json!({ "topics": [TRANSFER, format!("0x{:064x}", 10)] }),
            json!({ "data": "0x" }),
            json!({
                "topics": [
                    TRANSFER,
                    "0x000000000000000000000000000000000000000000000000000000000000000a",
                    "0x000000000000000000000000000000000000000000000000000000000000000b"
                ]
            }),
        ];

        let mut set = ParticipantSet::new();
        let skipped = collect_participants(&entries, &mut set);

        assert_eq!(skipped, 2);
        assert_eq!(
            set.as_slice(),
            &[
                address!("000000000000000000000000000000000000000a"),
                address!("000000000000000000000000000000000000000b")
            ]
        );
    }

    #[test]
    fn test_participant_set_deduplicates() {
        let a = address!("000000000000000000000000000000000000000a");
        let b = address!("000000000000000000000000000000000000000b");
        let set: ParticipantSet = vec![a, b, a, b, a].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.into_vec(), vec![a, b]);
    }
}
