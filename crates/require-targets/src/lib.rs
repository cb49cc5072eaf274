//! Platform model and on-disk installation layout for the require module loader.
//!
//! A module version is only usable on a host when it was built for that host's
//! platform. A platform is assembled from:
//! - **OS family:** decides the native shared library file name and the
//!   search-path separator
//! - **Target architecture:** the architecture tag (e.g. `linux-x86_64`) that
//!   names per-architecture build output directories
//! - **Base version:** the framework release layer every module build is
//!   nested under

pub mod environment;
pub mod error;
pub mod layout;
pub mod platform;
pub mod search_path;

pub use environment::OsFamily;
pub use error::{Result, TargetError};
pub use layout::{InstalledPlatform, ModuleLayout};
pub use platform::Platform;
pub use search_path::SearchPath;
