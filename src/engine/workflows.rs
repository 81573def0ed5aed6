// src/engine/workflows.rs

//! Canned workflows for the git endpoints.

use std::path::Path;

use crate::engine::sequencer::{Step, Workflow};
use crate::exec::Operation;

/// Merge the currently checked-out branch into `target` and push, then
/// return to the original branch.
///
/// Modeled as explicit steps rather than one opaque shell line so each git
/// operation's failure is independently visible in the stream. The final
/// checkout runs as a cleanup step on failure paths too, so a failed merge
/// does not leave the checkout parked on `target`.
pub fn merge_into(repo: &Path, current: &str, target: &str) -> Workflow {
    let git = |args: &[&str]| {
        Operation::new("git")
            .args(args.iter().copied())
            .current_dir(repo)
    };

    Workflow::new(vec![
        Step::new(format!("checkout {target}"), git(&["checkout", target])),
        Step::new("pull", git(&["pull"])),
        Step::new(format!("merge {current}"), git(&["merge", current])),
        Step::new("push", git(&["push"])),
    ])
    .with_cleanup(Step::new(
        format!("checkout {current}"),
        git(&["checkout", current]),
    ))
}
