//! # Tabshelf Architecture
//!
//! Tabshelf is the **state core of a browser new-tab page**: the user's
//! settings and a live bookmarks drawer. It owns no rendering and no browser
//! API. Hosts plug in the two external stores and draw whatever the core
//! tells them to.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Host (page script, test harness, ...)                      │
//! │  - Forwards storage and bookmark notifications              │
//! │  - Renders view slots, dialogs, tooltips                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Wiring (app.rs, init.rs)                                   │
//! │  - Data directory, configuration, startup                   │
//! │  - Drawer density follows the settings store                │
//! └─────────────────────────────────────────────────────────────┘
//!                │                               │
//!                ▼                               ▼
//! ┌───────────────────────────┐   ┌─────────────────────────────┐
//! │  Settings (settings/)     │   │  Bookmarks (bookmarks/)     │
//! │  - Stored value + override│   │  - Navigator: folder view,  │
//! │    slots per key          │   │    stack, reconciliation    │
//! │  - Override rules         │   │  - Editor: drag/drop, menu, │
//! │  - Deduplicated events    │   │    dialogs                  │
//! └───────────────────────────┘   └─────────────────────────────┘
//!                │                               │
//!                ▼                               ▼
//! ┌───────────────────────────┐   ┌─────────────────────────────┐
//! │  SettingsStorage trait    │   │  BookmarkTree trait         │
//! │  - FsStorage, MemStorage  │   │  - MemBookmarkTree          │
//! └───────────────────────────┘   └─────────────────────────────┘
//! ```
//!
//! ## Key Principle: External Stores Are the Truth
//!
//! Neither component trusts its own cache. Settings writes go to storage and
//! come back as change batches before local state moves. The bookmarks view
//! is patched from tree notifications and re-fetched when a patch is not
//! certain.
//!
//! ## Threading
//!
//! Everything is single-threaded and synchronous. Shared state uses `Rc`,
//! `RefCell` and `Cell`; notifications are delivered in order, inline.
//!
//! ## Module Overview
//!
//! - [`settings`]: Settings keys, the store, override rules, storage backends
//! - [`bookmarks`]: Tree model and store trait, navigator, drag algebra, editor
//! - [`events`]: Typed synchronous pub/sub
//! - [`app`]: Host wiring of settings and drawer
//! - [`init`]: Data directory resolution and startup
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod app;
pub mod bookmarks;
pub mod config;
pub mod error;
pub mod events;
pub mod init;
pub mod settings;
