//! lip - source-based package manager for teeth
//!
//! This library implements the whole install pipeline: specifier parsing,
//! version-range matching, iterative dependency resolution against a remote
//! version index, content-addressed archive caching, dependency-ordered
//! planning, and the transactional install/upgrade over the two state roots
//! (`~/.lip` per user, `./.lip` per workspace).
//!
//! # Pipeline
//!
//! ```text
//! Specifier ──► Resolver ──► Planner ──► Installer
//!                  │
//!                  ├── Fetcher ──► ToothCache
//!                  ├── VersionIndex
//!                  └── RecordStore
//! ```
//!
//! Everything is synchronous and single-threaded; the only suspension
//! points are network and disk I/O inside the fetcher and index client.
//! The [`Context`] value carries the filesystem roots explicitly so the
//! pipeline can be pointed at a temporary root in tests.

pub mod cache;
pub mod context;
pub mod error;
pub mod fetch;
pub mod index;
pub mod install;
pub mod options;
pub mod paths;
pub mod plan;
pub mod record;
pub mod resolve;
pub mod specifier;
pub mod tooth;
pub mod version;

pub use cache::ToothCache;
pub use context::Context;
pub use error::{LipError, LipResult};
pub use fetch::{Downloader, Fetcher, HttpDownloader, ProgressStyle};
pub use index::{HttpVersionIndex, VersionIndex};
pub use install::{ConsoleInteraction, Installer, Interaction};
pub use options::InstallOptions;
pub use record::{Record, RecordStore};
pub use resolve::{select_version, Resolution, ResolvedTooth, Resolver};
pub use specifier::Specifier;
pub use tooth::{Manifest, ToothFile};
pub use version::{Version, VersionMatch, VersionRange};
