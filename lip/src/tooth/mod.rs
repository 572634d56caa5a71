//! Tooth archives and their manifests.
//!
//! A tooth ships as a `.tth` file: a zip container holding a `tooth.json`
//! manifest next to the asset tree it installs. [`ToothFile`] opens the
//! container, exposes the manifest and the asset listing without extracting,
//! and extracts the assets on demand during install.

mod archive;
mod manifest;

pub use archive::{AssetEntry, ToothFile};
pub use manifest::Manifest;

/// Name of the manifest document inside a tooth archive.
pub const MANIFEST_NAME: &str = "tooth.json";
