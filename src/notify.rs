use tokio::task;
use tracing::warn;

use crate::Command;

/// Starts the optional ambient chime as a detached task and returns
/// immediately.
///
/// The handle is dropped on purpose: whether the chime plays, fails to start,
/// or is still running when the process exits is irrelevant to the search and
/// to the exit code. Any failure is a warning, nothing more.
pub fn spawn_chime(chime: Option<String>) {
    let Some(chime) = chime else { return };
    task::spawn(async move {
        match Command::new(&chime).run_to_completion().await {
            Ok(comres) if !comres.successful() => {
                warn!("🙁 chime command `{chime}` exited unsuccessfully");
            }
            Err(e) => warn!("🙁 failed to run chime command `{chime}`: {e:?}"),
            Ok(_) => (),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn chime_is_fire_and_forget() {
        // none of these block or propagate errors
        spawn_chime(None);
        spawn_chime(Some("true".to_owned()));
        spawn_chime(Some("nonexistent-player-bfa3".to_owned()));
    }
}
