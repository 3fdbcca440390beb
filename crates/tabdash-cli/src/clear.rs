//! `tabdash clear-data`: wipe the whole namespace.

use tabdash_core::privacy::{clear_all_data, ClearOutcome};

use crate::{open_store, CommandOutput, DashBackend};

pub fn run_clear_for_test(args: &[&str], backend: &dyn DashBackend) -> CommandOutput {
    CommandOutput::from_result(execute_clear(args, backend))
}

fn execute_clear(args: &[&str], backend: &dyn DashBackend) -> Result<CommandOutput, (i32, String)> {
    let mut assume_yes = false;
    for arg in args {
        match *arg {
            "--help" | "-h" => {
                let help = concat!(
                    "Usage: tabdash clear-data [flags]\n",
                    "\n",
                    "Delete all bookmarks and settings. Asks twice.\n",
                    "\n",
                    "Flags:\n",
                    "  -y, --yes   Auto-confirm: clear without showing either prompt\n",
                );
                return Err((0, help.to_string()));
            }
            "-y" | "--yes" => assume_yes = true,
            v if v.starts_with('-') => return Err((2, format!("unknown flag: {v}"))),
            _ => return Err((2, "expected 0 arguments".to_string())),
        }
    }

    let (mut store, warning) = open_store(backend)?;
    let mut confirm = |prompt: &str| assume_yes || backend.confirm(prompt);
    let outcome =
        clear_all_data(&mut store, &mut confirm).map_err(|e| (1, format!("clear data: {e}")))?;

    let stdout = match outcome {
        ClearOutcome::Cleared { keys_removed } => {
            format!("Cleared all dashboard data ({keys_removed} key(s) removed).\n")
        }
        ClearOutcome::Declined => "Cancelled.\n".to_string(),
    };
    Ok(CommandOutput {
        stdout,
        stderr: warning.unwrap_or_default(),
        exit_code: 0,
    })
}

#[cfg(test)]
mod tests {
    use tabdash_core::privacy::{CLEAR_FINAL_PROMPT, CLEAR_WARNING_PROMPT};

    use crate::run_cli_for_test;
    use crate::tests_common::MockDashBackend;

    fn seeded() -> MockDashBackend {
        let backend = MockDashBackend::new();
        backend.seed("savedLinks", r#"[{"name":"A","url":"https://a"}]"#);
        backend.seed("savedTheme", "nord");
        backend
    }

    #[test]
    fn both_prompts_must_agree() {
        let backend = seeded();
        backend.answer(&[true, false]);
        let out = run_cli_for_test(&["clear-data"], &backend);
        assert_eq!(out.stdout, "Cancelled.\n");
        assert_eq!(
            backend.prompts.borrow().as_slice(),
            [CLEAR_WARNING_PROMPT.to_string(), CLEAR_FINAL_PROMPT.to_string()]
        );
        assert_eq!(backend.stored("savedTheme").as_deref(), Some("nord"));
    }

    #[test]
    fn confirmed_clear_removes_every_key() {
        let backend = seeded();
        backend.answer(&[true, true]);
        let out = run_cli_for_test(&["clear-data"], &backend);
        assert_eq!(out.exit_code, 0, "{}", out.stderr);
        assert_eq!(out.stdout, "Cleared all dashboard data (2 key(s) removed).\n");
        assert_eq!(backend.stored("savedLinks"), None);
        assert_eq!(backend.stored("savedTheme"), None);
    }

    #[test]
    fn yes_flag_skips_prompts() {
        let backend = seeded();
        let out = run_cli_for_test(&["clear-data", "--yes"], &backend);
        assert_eq!(out.exit_code, 0);
        assert!(backend.prompts.borrow().is_empty());
        assert_eq!(backend.stored("savedLinks"), None);
    }
}
