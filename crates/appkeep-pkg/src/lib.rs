//! appkeep-pkg: Package manager abstraction
//!
//! Resolves inventory names to winget package identifiers and runs
//! unattended installs.

pub mod error;
pub mod parse;
pub mod traits;
pub mod types;
pub mod winget;

pub use error::PackageError;
pub use traits::PackageManager;
pub use types::{PackageManagerType, PackageMatch, QueryKind};
pub use winget::{WingetConfig, WingetManager};
