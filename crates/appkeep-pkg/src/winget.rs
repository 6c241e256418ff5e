//! winget package manager (Windows Package Manager)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use appkeep_exec::{CommandExecutor, ExecError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::PackageError;
use crate::parse::{self, PARSER_VERSION};
use crate::traits::PackageManager;
use crate::types::{PackageManagerType, PackageMatch, QueryKind};

/// winget invocation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WingetConfig {
    /// Program name or path
    #[serde(default = "default_program")]
    pub program: String,
    /// Ceiling for one `winget install`
    #[serde(default = "default_install_timeout")]
    pub install_timeout_secs: u64,
    /// Ceiling for one `winget search`
    #[serde(default = "default_search_timeout")]
    pub search_timeout_secs: u64,
    /// Ceiling for `winget --version`
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

fn default_program() -> String {
    "winget".to_string()
}

fn default_install_timeout() -> u64 {
    300
}

fn default_search_timeout() -> u64 {
    20
}

fn default_probe_timeout() -> u64 {
    10
}

impl Default for WingetConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            install_timeout_secs: default_install_timeout(),
            search_timeout_secs: default_search_timeout(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

impl WingetConfig {
    #[must_use]
    pub fn install_timeout(&self) -> Duration {
        Duration::from_secs(self.install_timeout_secs)
    }

    #[must_use]
    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// winget package manager implementation
pub struct WingetManager {
    /// Executor for running winget
    executor: Arc<dyn CommandExecutor>,
    config: WingetConfig,
}

impl WingetManager {
    /// Create a new winget manager
    ///
    /// # Arguments
    /// * `executor` - Executor for running winget commands
    /// * `config` - Program path and timeouts
    pub fn new(executor: Arc<dyn CommandExecutor>, config: WingetConfig) -> Self {
        Self { executor, config }
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    /// Arguments of the exact full-name search
    #[must_use]
    pub fn exact_search_args(name: &str) -> Vec<String> {
        Self::args(&["search", "--exact", "--name", name, "--accept-source-agreements"])
    }

    /// Arguments of the broader first-word search
    #[must_use]
    pub fn fallback_search_args(name: &str) -> Vec<String> {
        Self::args(&[
            "search",
            "--name",
            parse::first_word(name),
            "--accept-source-agreements",
        ])
    }

    /// Arguments of an unattended install
    #[must_use]
    pub fn install_args(package_id: &str) -> Vec<String> {
        Self::args(&[
            "install",
            "--id",
            package_id,
            "--silent",
            "--accept-package-agreements",
            "--accept-source-agreements",
        ])
    }

    /// Run one search and return its stdout
    async fn search(&self, args: &[String]) -> Result<String, PackageError> {
        let result = self
            .executor
            .run_with_timeout(&self.config.program, args, self.config.search_timeout())
            .await
            .map_err(|e| PackageError::CatalogQueryFailed(e.to_string()))?;
        Ok(result.stdout)
    }

    /// Search and parse, treating a failed query as empty output
    async fn search_and_parse(
        &self,
        name: &str,
        args: &[String],
        query: QueryKind,
    ) -> Option<PackageMatch> {
        let output = match self.search(args).await {
            Ok(output) => output,
            Err(e) => {
                warn!(name = %name, query = ?query, error = %e, "catalog query failed");
                String::new()
            }
        };

        match parse::parse_search_output(&output, name) {
            Some(found) => {
                if found.score == 0 {
                    debug!(
                        name = %name,
                        id = %found.package_id,
                        parser = PARSER_VERSION,
                        raw = %output,
                        "accepted zero-score catalog match"
                    );
                }
                Some(PackageMatch {
                    id: found.package_id,
                    score: found.score,
                    query,
                })
            }
            None => {
                debug!(name = %name, query = ?query, parser = PARSER_VERSION, raw = %output, "no catalog candidates");
                None
            }
        }
    }
}

#[async_trait]
impl PackageManager for WingetManager {
    #[instrument(skip(self))]
    async fn find_package(&self, name: &str) -> Result<Option<PackageMatch>, PackageError> {
        if let Some(found) = self
            .search_and_parse(name, &Self::exact_search_args(name), QueryKind::Exact)
            .await
        {
            return Ok(Some(found));
        }

        let found = self
            .search_and_parse(name, &Self::fallback_search_args(name), QueryKind::FirstWord)
            .await;
        Ok(found)
    }

    #[instrument(skip(self))]
    async fn install(&self, package_id: &str) -> Result<(), PackageError> {
        info!("starting winget install");

        let timeout = self.config.install_timeout();
        let result = self
            .executor
            .run_with_timeout(&self.config.program, &Self::install_args(package_id), timeout)
            .await
            .map_err(|e| match e {
                ExecError::Timeout { timeout } => PackageError::InstallTimeout(timeout),
                other => PackageError::InstallInvocation(other.to_string()),
            })?;

        if !result.success() {
            return Err(PackageError::InstallNonZeroExit {
                status: result.status,
                message: parse::extract_install_error(&result.combined_output()),
            });
        }

        info!(duration = ?result.duration, "winget install completed");
        Ok(())
    }

    fn manager_type(&self) -> PackageManagerType {
        PackageManagerType::Winget
    }

    async fn is_available(&self) -> bool {
        match self
            .executor
            .run_with_timeout(
                &self.config.program,
                &Self::args(&["--version"]),
                self.config.probe_timeout(),
            )
            .await
        {
            Ok(result) => result.success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use appkeep_exec::CommandResult;

    use super::*;

    /// Answers by the first matching argument list, recording every call
    #[derive(Default)]
    struct ScriptedExecutor {
        replies: Vec<(Vec<String>, Result<CommandResult, ExecError>)>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedExecutor {
        fn reply(mut self, args: Vec<String>, result: Result<CommandResult, ExecError>) -> Self {
            self.replies.push((args, result));
            self
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandExecutor for ScriptedExecutor {
        async fn run(&self, program: &str, args: &[String]) -> Result<CommandResult, ExecError> {
            assert_eq!(program, "winget");
            self.calls.lock().unwrap().push(args.to_vec());
            self.replies
                .iter()
                .find(|(expected, _)| expected == args)
                .map_or_else(|| Ok(CommandResult::with_stdout(0, "")), |(_, r)| r.clone())
        }

        async fn run_with_timeout(
            &self,
            program: &str,
            args: &[String],
            _timeout: Duration,
        ) -> Result<CommandResult, ExecError> {
            self.run(program, args).await
        }

        fn executor_type(&self) -> &'static str {
            "scripted"
        }
    }

    fn manager(executor: ScriptedExecutor) -> (WingetManager, Arc<ScriptedExecutor>) {
        let executor = Arc::new(executor);
        (
            WingetManager::new(executor.clone(), WingetConfig::default()),
            executor,
        )
    }

    #[tokio::test]
    async fn test_exact_match_skips_fallback() {
        let (winget, executor) = manager(ScriptedExecutor::default().reply(
            WingetManager::exact_search_args("Mozilla Firefox"),
            Ok(CommandResult::with_stdout(0, "Mozilla Firefox  Mozilla.Firefox  121.0  winget")),
        ));

        let found = winget.find_package("Mozilla Firefox").await.unwrap().unwrap();

        assert_eq!(found.id, "Mozilla.Firefox");
        assert_eq!(found.query, QueryKind::Exact);
        assert_eq!(executor.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_fallback_uses_first_word() {
        let (winget, executor) = manager(ScriptedExecutor::default().reply(
            WingetManager::fallback_search_args("Mozilla Firefox (x64 en-US)"),
            Ok(CommandResult::with_stdout(0, "Mozilla Firefox  Mozilla.Firefox  121.0  winget")),
        ));

        let found = winget
            .find_package("Mozilla Firefox (x64 en-US)")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.query, QueryKind::FirstWord);
        assert_eq!(found.score, 2);
        let calls = executor.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1][2], "Mozilla");
    }

    #[tokio::test]
    async fn test_failed_queries_mean_not_found() {
        let (winget, _) = manager(
            ScriptedExecutor::default()
                .reply(
                    WingetManager::exact_search_args("Inhouse Tool"),
                    Err(ExecError::Timeout {
                        timeout: Duration::from_secs(20),
                    }),
                )
                .reply(
                    WingetManager::fallback_search_args("Inhouse Tool"),
                    Ok(CommandResult::with_stdout(1, "No package found matching input criteria.")),
                ),
        );

        assert_eq!(winget.find_package("Inhouse Tool").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_install_success_and_args() {
        let (winget, executor) = manager(ScriptedExecutor::default());

        winget.install("Git.Git").await.unwrap();

        assert_eq!(
            executor.calls()[0],
            vec![
                "install",
                "--id",
                "Git.Git",
                "--silent",
                "--accept-package-agreements",
                "--accept-source-agreements"
            ]
        );
    }

    #[tokio::test]
    async fn test_install_non_zero_exit_extracts_line() {
        let mut result = CommandResult::with_stdout(
            -1978335212,
            "Found Git [Git.Git]\nThis application is licensed to you by its owner.\n",
        );
        result.stderr = "Installer failed with exit code: 1603".to_string();
        let (winget, _) = manager(
            ScriptedExecutor::default().reply(WingetManager::install_args("Git.Git"), Ok(result)),
        );

        let err = winget.install("Git.Git").await.unwrap_err();
        assert!(matches!(err, PackageError::InstallNonZeroExit { .. }));
        assert_eq!(err.to_string(), "Installer failed with exit code: 1603");
    }

    #[tokio::test]
    async fn test_install_timeout_and_missing_tool() {
        let (winget, _) = manager(ScriptedExecutor::default().reply(
            WingetManager::install_args("Slow.App"),
            Err(ExecError::Timeout {
                timeout: Duration::from_secs(300),
            }),
        ));
        let err = winget.install("Slow.App").await.unwrap_err();
        assert_eq!(err.to_string(), "Installation timed out after 300 seconds");

        let (winget, _) = manager(ScriptedExecutor::default().reply(
            WingetManager::install_args("Any.App"),
            Err(ExecError::NotFound("winget".to_string())),
        ));
        let err = winget.install("Any.App").await.unwrap_err();
        assert!(matches!(err, PackageError::InstallInvocation(_)));
        assert_eq!(err.to_string(), "program not found: winget");
    }

    #[tokio::test]
    async fn test_is_available() {
        let (winget, _) = manager(ScriptedExecutor::default());
        assert!(winget.is_available().await);

        let (winget, _) = manager(ScriptedExecutor::default().reply(
            vec!["--version".to_string()],
            Err(ExecError::NotFound("winget".to_string())),
        ));
        assert!(!winget.is_available().await);
    }
}
