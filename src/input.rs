//! User activity handling.
//!
//! Every line typed on stdin counts as user activity and resets the poll
//! count, which resumes a scheduler that hit its ceiling.  `q` quits.
//!
//! ## For contributors
//!
//! To add a new command:
//!
//! 1. Add a variant to [`Action`].
//! 2. Add a match arm in [`parse_line`] that returns it.
//! 3. Handle it in [`listen`].

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

use crate::poll::UpdateScheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Reset the poll count.
    Activity,
    Quit,
}

/// Map one input line to an action.
pub fn parse_line(line: &str) -> Action {
    match line.trim() {
        "q" | "quit" => Action::Quit,
        _ => Action::Activity,
    }
}

/// Read lines until `q` or end of input, resetting the scheduler on each one.
///
/// Returns `true` when the user asked to quit, `false` at end of input.
pub async fn listen<R>(reader: R, scheduler: &UpdateScheduler) -> std::io::Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Action::Quit => {
                info!("Quit requested");
                return Ok(true);
            }
            Action::Activity => scheduler.reset(),
        }
    }
    Ok(false)
}
