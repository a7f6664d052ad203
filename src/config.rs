use serde_derive::{Deserialize, Serialize};

/// Configuration of a [`Btree`](crate::Btree).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct BtreeConfig {
    /// Maximum number of children of an internal node.
    /// A node holds at most `order - 1` keys.
    pub order: usize,
}

impl Default for BtreeConfig {
    fn default() -> Self {
        Self { order: 4 }
    }
}

impl BtreeConfig {
    pub fn order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }
}

/// Configuration of a [`TransactionLog`](crate::TransactionLog).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TransactionLogConfig {
    /// Keep at most this many entries, evicting the oldest ones first.
    /// `None` means the log is unbounded.
    pub max_entries: Option<usize>,
}

impl TransactionLogConfig {
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntryId, Number, TransactionLog};

    #[test]
    fn defaults() {
        assert_eq!(4, BtreeConfig::default().order);
        assert_eq!(7, BtreeConfig::default().order(7).order);
        assert_eq!(None, TransactionLogConfig::default().max_entries);
        assert_eq!(
            Some(10),
            TransactionLogConfig::default().max_entries(10).max_entries
        );
    }

    #[test]
    fn serialize_configuration() {
        let config = TransactionLogConfig::default().max_entries(25);
        let bytes = bincode::serialize(&config).unwrap();
        let restored: TransactionLogConfig = bincode::deserialize(&bytes).unwrap();
        assert_eq!(config, restored);

        let config = BtreeConfig::default().order(16);
        let bytes = bincode::serialize(&config).unwrap();
        let restored: BtreeConfig = bincode::deserialize(&bytes).unwrap();
        assert_eq!(16, restored.order);
    }

    #[test]
    fn serialize_keys_and_ids() {
        let mut log = TransactionLog::new();
        log.commit(1);
        let id = log.commit(2);
        let restored: EntryId = bincode::deserialize(&bincode::serialize(&id).unwrap()).unwrap();
        assert_eq!(Some(1), log.commit_index(restored));

        let n = Number::new(-2.5).unwrap();
        let restored: Number = bincode::deserialize(&bincode::serialize(&n).unwrap()).unwrap();
        assert_eq!(n, restored);

        // NaN is rejected when deserializing a number
        let nan = bincode::serialize(&f64::NAN).unwrap();
        assert!(bincode::deserialize::<Number>(&nan).is_err());
    }
}
