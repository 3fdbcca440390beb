//! `tabdash edit`: change a bookmark in place.

use tabdash_core::FormMode;

use crate::{open_store, parse_position, CommandOutput, DashBackend};

pub fn run_edit_for_test(args: &[&str], backend: &dyn DashBackend) -> CommandOutput {
    CommandOutput::from_result(execute_edit(args, backend))
}

#[derive(Debug, PartialEq, Eq)]
struct EditArgs {
    index: usize,
    name: Option<String>,
    url: Option<String>,
}

fn parse_edit_args(args: &[&str]) -> Result<EditArgs, (i32, String)> {
    let mut index = None;
    let mut name = None;
    let mut url = None;
    let mut i = 0;

    while i < args.len() {
        let arg = args[i];
        match arg {
            "--help" | "-h" => {
                let help = concat!(
                    "Usage: tabdash edit <position> [flags]\n",
                    "\n",
                    "Edit a bookmark. Fields not given keep their current value.\n",
                    "\n",
                    "Flags:\n",
                    "  --name string   New display name (may be empty)\n",
                    "  --url string    New url\n",
                );
                return Err((0, help.to_string()));
            }
            "--name" | "--url" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    return Err((2, format!("flag {arg} requires a value")));
                };
                if arg == "--name" {
                    name = Some((*value).to_string());
                } else {
                    url = Some((*value).to_string());
                }
            }
            v if v.starts_with("--name=") => {
                name = Some(v.trim_start_matches("--name=").to_string());
            }
            v if v.starts_with("--url=") => {
                url = Some(v.trim_start_matches("--url=").to_string());
            }
            v if v.starts_with("--") => return Err((2, format!("unknown flag: {v}"))),
            v => {
                if index.is_some() {
                    return Err((2, "expected 1 argument (position)".to_string()));
                }
                index = Some(parse_position(v)?);
            }
        }
        i += 1;
    }

    let Some(index) = index else {
        return Err((2, "expected 1 argument (position)".to_string()));
    };
    if name.is_none() && url.is_none() {
        return Err((2, "nothing to change: pass --name and/or --url".to_string()));
    }
    Ok(EditArgs { index, name, url })
}

fn execute_edit(args: &[&str], backend: &dyn DashBackend) -> Result<CommandOutput, (i32, String)> {
    let parsed = parse_edit_args(args)?;
    let (mut store, warning) = open_store(backend)?;

    store
        .open_edit_form_at(parsed.index)
        .map_err(|e| (1, format!("edit bookmark: {e}")))?;
    let name = parsed.name.unwrap_or_else(|| store.form().name.clone());
    let url = parsed.url.unwrap_or_else(|| store.form().url.clone());
    let label = store
        .session()
        .mode()
        .map(FormMode::submit_label)
        .unwrap_or("Save Changes");

    let outcome = store
        .submit(&name, &url)
        .map_err(|e| (1, format!("edit bookmark: {e}")))?;
    let saved_url = store
        .get(outcome.id())
        .map(|b| b.url.clone())
        .unwrap_or_default();
    tracing::info!(position = parsed.index + 1, "bookmark updated");

    Ok(CommandOutput {
        stdout: format!("{label}: #{} {name} -> {saved_url}\n", parsed.index + 1),
        stderr: warning.unwrap_or_default(),
        exit_code: 0,
    })
}
