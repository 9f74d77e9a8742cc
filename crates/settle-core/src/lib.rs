//! # Async state, guarded dispatch, and shared caches
//!
//! Settle tracks the lifecycle of a long-running operation (a fetch, a
//! query) for one consumer, and makes sure results that arrive after the
//! consumer went away are dropped instead of applied. There are four pieces:
//!
//! - `AsyncState` / `transition`: the `idle → pending → resolved | rejected`
//!   machine.
//! - `CancellationGuard`: wraps a dispatcher so it goes quiet once its
//!   `Scope` is disposed.
//! - `AsyncRunner`: starts an operation on a local executor and routes the
//!   outcome through the guard.
//! - `ResultCache`: keyed results shared by many runners.
//!
//! ## Running an operation
//!
//! ```rust
//! use futures::executor::LocalPool;
//! use settle_core::prelude::*;
//!
//! let mut pool = LocalPool::new();
//! let session = Scope::new();
//! let runner: AsyncRunner<String, String> =
//!     AsyncRunner::new(&session, pool.spawner(), RunnerOptions::default());
//!
//! runner.run(Some(async { Ok("pikachu".to_string()) })).unwrap();
//! assert_eq!(runner.status(), AsyncStatus::Pending);
//!
//! pool.run_until_stalled();
//! assert_eq!(runner.data().as_deref(), Some("pikachu"));
//! ```
//!
//! `run(None)` does nothing, which suits callers that only sometimes have
//! work to start.
//!
//! ## Sessions and disposal
//!
//! Each runner is bound to a `Scope`. Disposing the scope (or dropping its
//! last handle) flips the guard exactly once; after that every transition
//! for that runner is silently ignored, including results of operations
//! that were already in flight. The operations themselves keep running:
//! nothing here aborts work, it only stops delivery.
//!
//! A session created with `Scope::child` ends when its own last handle goes
//! away, or when its parent is disposed, whichever comes first. Keep the
//! child handle around for as long as the session should receive results.
//!
//! ## Caching
//!
//! ```rust
//! use futures::executor::LocalPool;
//! use settle_core::prelude::*;
//!
//! let mut pool = LocalPool::new();
//! let provider = Scope::new();
//! let cache: ResultCache<String, u32> = ResultCache::new();
//!
//! let first_session = provider.child();
//! let first: AsyncRunner<u32, String> =
//!     AsyncRunner::new(&first_session, pool.spawner(), RunnerOptions::default());
//! cache.load(&first, "bulbasaur".into(), || async { Ok(1) }).unwrap();
//! pool.run_until_stalled();
//!
//! // A second consumer sharing the same cache skips the fetch entirely.
//! let second_session = provider.child();
//! let second: AsyncRunner<u32, String> =
//!     AsyncRunner::new(&second_session, pool.spawner(), RunnerOptions::default());
//! let lookup = cache
//!     .load(&second, "bulbasaur".into(), || async { Err("not called".to_string()) })
//!     .unwrap();
//! assert_eq!(lookup, CacheLookup::Hit);
//! assert_eq!(second.data(), Some(1));
//! ```
//!
//! Pass the cache handle explicitly to every consumer; there is no global
//! lookup.

pub mod cache;
pub mod error;
pub mod guard;
pub mod machine;
pub mod prelude;
pub mod reducer;
pub mod runner;
pub mod scope;
pub mod signal;

pub use cache::*;
pub use error::*;
pub use guard::*;
pub use machine::*;
pub use reducer::*;
pub use runner::*;
pub use scope::*;
pub use signal::*;
