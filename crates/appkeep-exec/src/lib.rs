//! appkeep-exec: Local process execution
//!
//! Runs external tools with captured output, an optional timeout and no
//! console window on Windows.

pub mod error;
pub mod local;
pub mod result;
pub mod traits;

pub use error::ExecError;
pub use local::LocalExecutor;
pub use result::CommandResult;
pub use traits::CommandExecutor;
