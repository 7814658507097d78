use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// A remembrance category (morning, evening, after prayer, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzkarCategory {
    pub category_name: String,
    #[serde(default)]
    pub items: Vec<AzkarItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AzkarItem {
    pub content: String,
    /// Target repetitions. The upstream dataset writes this as a string,
    /// sometimes empty.
    #[serde(deserialize_with = "deserialize_count")]
    pub count: u32,
    pub description: String,
    pub reference: String,
}

impl AzkarItem {
    /// Items without an explicit count are said once.
    pub fn target(&self) -> u32 {
        self.count.max(1)
    }
}

fn deserialize_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let count = match value {
        serde_json::Value::Number(n) => n.as_u64().unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    };
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

/// Repetition counters for one Azkar screen. In-memory only.
#[derive(Debug, Clone, Default)]
pub struct AzkarSession {
    counters: HashMap<usize, u32>,
}

impl AzkarSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one repetition of item `index`, never going past `target`
    /// when a target is set. Returns the new count.
    pub fn increment(&mut self, index: usize, target: u32) -> u32 {
        let count = self.counters.entry(index).or_insert(0);
        if target == 0 || *count < target {
            *count += 1;
        }
        *count
    }

    pub fn count(&self, index: usize) -> u32 {
        self.counters.get(&index).copied().unwrap_or(0)
    }

    pub fn is_done(&self, index: usize, target: u32) -> bool {
        target > 0 && self.count(index) >= target
    }

    pub fn reset_item(&mut self, index: usize) {
        self.counters.remove(&index);
    }

    pub fn reset(&mut self) {
        self.counters.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_count_from_string_or_number() {
        let item: AzkarItem =
            serde_json::from_str(r#"{"content":"سبحان الله","count":"33"}"#).unwrap();
        assert_eq!(item.count, 33);

        let item: AzkarItem = serde_json::from_str(r#"{"content":"x","count":3}"#).unwrap();
        assert_eq!(item.count, 3);

        let item: AzkarItem = serde_json::from_str(r#"{"content":"x","count":""}"#).unwrap();
        assert_eq!(item.count, 0);
        assert_eq!(item.target(), 1);
    }

    #[test]
    fn test_session_saturates_at_target() {
        let mut session = AzkarSession::new();
        assert_eq!(session.increment(0, 3), 1);
        assert_eq!(session.increment(0, 3), 2);
        assert_eq!(session.increment(0, 3), 3);
        assert_eq!(session.increment(0, 3), 3);
        assert!(session.is_done(0, 3));
        assert_eq!(session.count(1), 0);
    }

    #[test]
    fn test_session_reset() {
        let mut session = AzkarSession::new();
        session.increment(0, 0);
        session.increment(1, 0);
        session.reset_item(0);
        assert_eq!(session.count(0), 0);
        assert_eq!(session.count(1), 1);

        session.reset();
        assert_eq!(session.count(1), 0);
    }
}
