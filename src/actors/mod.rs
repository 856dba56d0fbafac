//! Actor-based polling core
//!
//! Each actor runs as an independent async task and is controlled through a
//! cloneable handle that talks to it over Tokio channels.
//!
//! ```text
//!   PollerActor (interval ticker)        API / CLI "check now"
//!            │                                   │
//!            └──────────┬────────────────────────┘
//!                       ▼
//!                Monitor::run_cycle
//!        probe_all ─► TrackerActor ─► AlertDispatcher
//!                       ▲
//!                       └── Snapshot (query)
//! ```
//!
//! - **TrackerActor**: sole owner of the streak states; every update and
//!   snapshot is serialised through its command channel
//! - **PollerActor**: runs a poll cycle on every tick of the configured interval
//!
//! Commands are sent over mpsc, replies come back over oneshot channels.

pub mod messages;
pub mod poller;
pub mod tracker;
