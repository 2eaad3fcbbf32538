#![forbid(unsafe_code)]
//! Mutable, heap-backed BSON document trees.
//! Nodes live in a flat element table and are addressed by copyable [`Element`] handles,
//! so subtrees can be inserted, removed, reordered and renamed without reserializing the
//! document. The `$pull` and `$push` update modifiers are built on top of these primitives.

pub mod accessors;
pub mod append;
pub mod compare;
pub mod config;
pub mod document;
pub mod dup_set;
pub mod element;
pub mod error;
pub mod heap;
pub mod ids;
pub mod iter;
pub mod modifier;
pub mod modifier_pull;
pub mod modifier_push;
pub mod path;
pub mod safe_num;
mod table;
pub mod traits;
pub mod types;
pub mod value;

pub use compare::{compare_values, sort_children, SortDirection, SortPattern};
pub use config::DocumentOptions;
pub use document::Document;
pub use dup_set::SmallDupSet;
pub use error::{Error, Result};
pub use heap::{Heap, MAX_ENTRY_LEN};
pub use ids::{Element, HeapRef};
pub use iter::{FieldNameFilter, FilterIter, SiblingIter, SubtreeIter};
pub use modifier::{apply_modifiers, ExecInfo, Modifier};
pub use modifier_pull::ModifierPull;
pub use modifier_push::ModifierPush;
pub use path::{find_longest_prefix, FieldRef};
pub use safe_num::SafeNum;
pub use table::SHORT_STRING_LIMIT;
pub use traits::{EqualsValue, Filter, MatchPredicate};
pub use types::{BsonType, ObjectId, Timestamp};
pub use value::Value;
