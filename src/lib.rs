#![warn(clippy::all)]
#![warn(rust_2018_idioms)]

//! `dirset` provides a concurrent hash set of 64-bit identifiers (phone
//! numbers), each optionally paired with a 128-bit user identifier (a
//! [`Uuid`][uuid]), laid out in flat, contiguous buffers that a secure
//! computation engine can consume directly.
//!
//! The set is split into two independently synchronized layers:
//!
//! - a *pending-operation log* that accepts `insert` and `remove` calls from
//!   any number of threads with a bounded critical section, and
//! - a *committed generation* of open-addressing buffers (identifier slots
//!   plus positionally aligned value words) that is only ever mutated by
//!   [`commit`][commit], which drains the log, grows capacity when the load
//!   factor demands it, and publishes the result.
//!
//! [`borrow_buffers`][borrow] hands the committed buffers to a caller-supplied
//! accessor while excluding concurrent commits, so the consumer always sees
//! one consistent generation. [`len`][len] reports the committed element
//! count and never reflects intents that have not been committed yet.
//!
//! [uuid]: https://docs.rs/uuid
//! [commit]: ./struct.DirectoryHashSet.html#method.commit
//! [borrow]: ./struct.DirectoryHashSet.html#method.borrow_buffers
//! [len]: ./struct.DirectoryHashSet.html#method.len
//!
//! # Example
//!
//! `DirectoryHashSet` is cloneable; clones share the same underlying table,
//! so hand one to each mutating thread and keep one for the commit loop.
//!
//! ```rust
//! use dirset::DirectoryHashSet;
//! use std::convert::Infallible;
//!
//! let directory = DirectoryHashSet::new(1000, 0.75, 0.85);
//!
//! let handles: Vec<_> = (0..4i64)
//!     .map(|thread_id| {
//!         let directory = directory.clone();
//!         std::thread::spawn(move || {
//!             for element in 1..=100 {
//!                 directory.insert(thread_id * 1000 + element, None);
//!             }
//!         })
//!     })
//!     .collect();
//! handles.into_iter().for_each(|h| h.join().unwrap());
//!
//! // Nothing is visible until a commit drains the pending log.
//! assert_eq!(directory.len(), 0);
//! assert!(directory.commit());
//! assert_eq!(directory.len(), 400);
//!
//! directory
//!     .borrow_buffers(|phones, uuids, capacity| {
//!         assert_eq!(phones.len(), capacity);
//!         assert_eq!(uuids.len(), capacity * 2);
//!         Ok::<_, Infallible>(())
//!     })
//!     .unwrap();
//! ```
//!
//! # Optional features
//!
//! - `logging`: emits `debug`-level records through the [`log`][log] crate
//!   when a commit applies operations or grows the table. The insert/remove
//!   fast path never logs.
//!
//! [log]: https://crates.io/crates/log

mod buffers;
mod factory;
mod pending;
mod planner;
mod set;

pub use factory::DirectoryHashSetFactory;
pub use set::DirectoryHashSet;
