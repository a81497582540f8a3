//! Strata: Structured Nested Maps
//!
//! A nested map with a fixed number of levels. Every entry at level `i` is a
//! map with `levels - i` levels, per-level widths are kept current across
//! mutations, and whole maps can be flattened, re-stratified, filtered and
//! have their levels permuted.

pub mod config;
pub mod entries;
pub mod error;
pub mod key;
pub mod leveled;
pub mod logging;
pub mod nested;
pub mod shape;
pub mod walk;

pub use config::{ConfigLoader, KeyMode, RenderConfig, StrataConfig, ValueMode, WalkConfig};
pub use entries::Entries;
pub use error::{ErrorKind, LoadError, MapError};
pub use key::{Key, KeyTuple};
pub use leveled::{
    Criteria, Criterion, FilterOptions, FlattenIter, FlattenOptions, KeyMatcher, LeveledMap, Node,
};
pub use logging::{init_logging, LoggingConfig};
pub use nested::Nested;
pub use shape::{Shape, FLATTENED_LEVEL_NAME_SEPARATOR};
pub use walk::DirectoryWalker;
