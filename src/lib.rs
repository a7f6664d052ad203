//! In-memory index structures for embedded record stores.
//!
//! - [`Btree`]: ordered map with range walks in both directions.
//! - [`Index`] and [`OrderedIndex`]: inverted index from a field value to the
//!   records holding that value.
//! - [`TransactionLog`]: bounded history of values with undo and redo.
//!
//! All structures are synchronous and meant to be owned by a single thread.

mod btree;
mod config;
mod error;
mod events;
mod index;
mod key;
mod rule;
mod transaction_log;

pub use btree::{Btree, Range};
pub use config::{BtreeConfig, TransactionLogConfig};
pub use error::{Error, Result};
pub use events::{Emitter, Observer};
pub use index::{Index, OrderedIndex};
pub use key::{KeyType, Number};
pub use rule::RangeRule;
pub use transaction_log::{Commit, EntryId, LogEvent, TransactionLog};
