// Identifier value objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

const RANDOM_SUFFIX_LEN: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LootId(pub String);

impl LootId {
    /// `<unix-millis>-<9 hex chars>`, time-prefixed so ids roughly sort by creation.
    pub fn generate(now_millis: i64) -> Self {
        let random = Uuid::new_v4().simple().to_string();
        Self(format!("{}-{}", now_millis, &random[..RANDOM_SUFFIX_LEN]))
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for LootId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_are_time_prefixed_and_unique() {
        let ids = (0..256)
            .map(|_| LootId::generate(1_760_515_200_000).into_inner())
            .collect::<HashSet<_>>();
        assert_eq!(ids.len(), 256);
        for id in ids {
            let (millis, suffix) = id.split_once('-').expect("separator");
            assert_eq!(millis, "1760515200000");
            assert_eq!(suffix.len(), RANDOM_SUFFIX_LEN);
            assert!(suffix.chars().all(|ch| ch.is_ascii_hexdigit()));
        }
    }
}
