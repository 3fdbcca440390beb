//! `tabdash rm`: confirmed delete.

use tabdash_core::DeleteOutcome;

use crate::{open_store, parse_position, CommandOutput, DashBackend};

pub fn run_remove_for_test(args: &[&str], backend: &dyn DashBackend) -> CommandOutput {
    CommandOutput::from_result(execute_remove(args, backend))
}

fn parse_remove_args(args: &[&str]) -> Result<(usize, bool), (i32, String)> {
    let mut index = None;
    let mut assume_yes = false;
    for arg in args {
        match *arg {
            "--help" | "-h" => {
                let help = concat!(
                    "Usage: tabdash rm <position> [flags]\n",
                    "\n",
                    "Delete a bookmark after confirmation\n",
                    "\n",
                    "Flags:\n",
                    "  -y, --yes   Auto-confirm: delete without showing the prompt\n",
                );
                return Err((0, help.to_string()));
            }
            "-y" | "--yes" => assume_yes = true,
            v if v.starts_with('-') => return Err((2, format!("unknown flag: {v}"))),
            v => {
                if index.is_some() {
                    return Err((2, "expected 1 argument (position)".to_string()));
                }
                index = Some(parse_position(v)?);
            }
        }
    }
    match index {
        Some(index) => Ok((index, assume_yes)),
        None => Err((2, "expected 1 argument (position)".to_string())),
    }
}

fn execute_remove(
    args: &[&str],
    backend: &dyn DashBackend,
) -> Result<CommandOutput, (i32, String)> {
    let (index, assume_yes) = parse_remove_args(args)?;
    let (mut store, warning) = open_store(backend)?;

    let mut confirm = |prompt: &str| assume_yes || backend.confirm(prompt);
    let outcome = store
        .delete_at(index, &mut confirm)
        .map_err(|e| (1, format!("delete bookmark: {e}")))?;

    let stdout = match outcome {
        DeleteOutcome::Deleted(bookmark) => {
            tracing::info!(position = index + 1, "bookmark deleted");
            format!("Deleted #{} {} ({})\n", index + 1, bookmark.name, bookmark.url)
        }
        DeleteOutcome::Declined => "Cancelled.\n".to_string(),
    };
    Ok(CommandOutput {
        stdout,
        stderr: warning.unwrap_or_default(),
        exit_code: 0,
    })
}
