//! # Chain Hash Map
//!
//! A Rust implementation of a hash table using separate chaining.
//!
//! Each bucket owns a chain of the entries whose keys hashed to its index,
//! and the table doubles its bucket count whenever the entry count has
//! reached the bucket count. Chains therefore stay short and `insert`,
//! `get`, and `remove` all run in amortized O(1).
//!
//! The map is single-threaded; callers that share it across threads must
//! provide their own synchronization.
//!
//! ## Basic Usage
//!
//! ```rust
//! use chainmap::ChainHashMap;
//!
//! // Create a new hash map
//! let mut map = ChainHashMap::new();
//!
//! // Insert values
//! map.insert("apple".to_string(), 1);
//! map.insert("banana".to_string(), 2);
//!
//! // Retrieve values
//! assert_eq!(map.get("apple"), Some(&1));
//!
//! // Update values
//! map.insert("apple".to_string(), 10);
//! assert_eq!(map.get("apple"), Some(&10));
//!
//! // Remove values
//! map.remove("apple");
//! assert_eq!(map.get("apple"), None);
//! ```
//!
//! ## Choosing the initial capacity
//!
//! ```rust
//! use chainmap::ChainHashMap;
//!
//! // The bucket count is taken exactly as supplied and doubles from there,
//! // so a table created with 3 buckets grows through 6, 12, 24, ...
//! let mut map = ChainHashMap::with_capacity(3)?;
//! for i in 0..4 {
//!     map.insert(i, i * i);
//! }
//!
//! assert_eq!(map.capacity(), 6);
//! assert_eq!(map.get(&3), Some(&9));
//!
//! // A table with no buckets is rejected up front.
//! assert!(ChainHashMap::<u32, u32>::with_capacity(0).is_err());
//! # Ok::<(), chainmap::InvalidCapacity>(())
//! ```

/// Module implementing the separate-chaining hash map
mod chain_hashmap;
/// Utility functions and traits for the hash map
mod utils;

pub use chain_hashmap::{ChainHashMap, InvalidCapacity, Iter};
pub use utils::HashMapExtensions;
