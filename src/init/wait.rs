use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{Instant, timeout_at};
use tower::BoxError;
use tracing::error;

/// Wait for the first task in the set to finish, propagating its error.
pub async fn wait_for_any_task(
    tasks: &mut JoinSet<Result<(), BoxError>>,
) -> Result<(), BoxError> {
    match tasks.join_next().await {
        None => Ok(()), // empty set, nothing to wait on
        Some(res) => res?,
    }
}

/// Wait for all remaining tasks, failing if they do not finish in time.
pub async fn wait_for_tasks_with_timeout(
    tasks: &mut JoinSet<Result<(), BoxError>>,
    timeout: Duration,
) -> Result<(), BoxError> {
    let stop_at = Instant::now() + timeout;

    let mut result = Ok(());
    loop {
        match timeout_at(stop_at, tasks.join_next()).await {
            Err(_) => {
                result = Err("timed out waiting for tasks to complete".into());
                break;
            }
            Ok(None) => break,
            Ok(Some(joined)) => match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => result = Err(e),
                Err(e) => error!("Failed to join with task: {:?}", e),
            },
        }
    }

    result
}
