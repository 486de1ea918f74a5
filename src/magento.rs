use async_trait::async_trait;
use tracing::info;

use crate::{Command, ExecError, Operation};

/// The seam the strategy and search layers run operations through, so tests
/// can substitute a stub for the real container exec.
#[async_trait]
pub trait MagentoRunner {
    /// Runs one maintenance operation to completion, returning the captured
    /// combined output on success
    async fn run(&self, op: Operation) -> Result<String, ExecError>;
}

/// Runs `bin/magento` subcommands inside the application's compose service.
///
/// All of the invocation context is explicit construction-time configuration;
/// nothing here reads the ambient environment.
#[derive(Debug, Clone)]
pub struct MagentoExec {
    /// The compose program, e.g. `docker-compose`
    pub compose: String,
    /// The compose service the application runs in, e.g. `fpm`
    pub service: String,
    /// Path of the magento binary inside the service, e.g. `bin/magento`
    pub magento_bin: String,
}

impl MagentoExec {
    pub fn new(
        compose: impl AsRef<str>,
        service: impl AsRef<str>,
        magento_bin: impl AsRef<str>,
    ) -> Self {
        Self {
            compose: compose.as_ref().to_owned(),
            service: service.as_ref().to_owned(),
            magento_bin: magento_bin.as_ref().to_owned(),
        }
    }

    /// The full invocation for one operation, `-T` because there is no TTY to
    /// allocate for a piped child
    fn command_for(&self, op: Operation) -> Command {
        Command::new(&self.compose)
            .args(["exec", "-T", &self.service, &self.magento_bin])
            .arg(op.as_str())
    }
}

#[async_trait]
impl MagentoRunner for MagentoExec {
    /// Synchronously invokes the operation inside the service, blocking until
    /// the external process exits. There is deliberately no timeout: a hung
    /// external command hangs the whole program rather than being masked.
    ///
    /// The captured output is echoed to the operator's standard streams
    /// regardless of the outcome, and is also carried inside the error on
    /// failure.
    async fn run(&self, op: Operation) -> Result<String, ExecError> {
        let cmd = self.command_for(op);
        let unified = cmd.unified();
        info!("running: {unified}");
        let comres = cmd
            .run_to_completion()
            .await
            .map_err(|cause| ExecError::Start {
                command: unified.clone(),
                cause,
            })?;
        print!("{}", comres.stdout_as_utf8_lossy());
        eprint!("{}", comres.stderr_as_utf8_lossy());
        if comres.successful() {
            Ok(comres.combined_output_lossy())
        } else {
            Err(ExecError::Unsuccessful {
                command: unified,
                status: comres.status.code(),
                output: comres.combined_output_lossy(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_for_builds_compose_exec() {
        let exec = MagentoExec::new("docker-compose", "fpm", "bin/magento");
        let cmd = exec.command_for(Operation::SetupUpgrade);
        assert_eq!(
            cmd.unified(),
            "docker-compose exec -T fpm bin/magento setup:upgrade"
        );
    }

    #[tokio::test]
    async fn spawn_failure_maps_to_start_error() {
        let exec = MagentoExec::new("nonexistent-compose-bfa3", "fpm", "bin/magento");
        let err = exec.run(Operation::CacheFlush).await.unwrap_err();
        match err {
            ExecError::Start { ref command, .. } => {
                assert_eq!(
                    command,
                    "nonexistent-compose-bfa3 exec -T fpm bin/magento cache:flush"
                );
            }
            other => panic!("expected Start error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unsuccessful_exit_carries_status_and_output() {
        // `true` as the compose program makes the whole invocation exit 0,
        // `false` makes it exit 1, without needing a real compose setup
        let ok = MagentoExec::new("true", "fpm", "bin/magento");
        assert!(ok.run(Operation::CacheFlush).await.is_ok());

        let bad = MagentoExec::new("false", "fpm", "bin/magento");
        let err = bad.run(Operation::CacheFlush).await.unwrap_err();
        match err {
            ExecError::Unsuccessful { status, .. } => assert_eq!(status, Some(1)),
            other => panic!("expected Unsuccessful error, got {other:?}"),
        }
    }
}
