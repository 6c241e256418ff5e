//! Package manager traits

use async_trait::async_trait;

use crate::error::PackageError;
use crate::types::{PackageManagerType, PackageMatch};

/// Backend that resolves names to packages and installs them
#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Resolve an application name to a package, `None` when nothing usable matched
    async fn find_package(&self, name: &str) -> Result<Option<PackageMatch>, PackageError>;

    /// Install one package unattended
    async fn install(&self, package_id: &str) -> Result<(), PackageError>;

    fn manager_type(&self) -> PackageManagerType;

    /// Check whether the backend can be invoked at all
    async fn is_available(&self) -> bool;
}
