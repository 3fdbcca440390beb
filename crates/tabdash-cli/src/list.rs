//! `tabdash list`: render the bookmark list.

use std::io::Write;

use tabdash_core::render::RenderedList;
use tabwriter::TabWriter;

use crate::{open_store, CommandOutput, DashBackend};

pub const EMPTY_LIST_MESSAGE: &str = "No bookmarks yet. Add one with \"tabdash add <name> <url>\".";

pub fn run_list_for_test(args: &[&str], backend: &dyn DashBackend) -> CommandOutput {
    CommandOutput::from_result(execute_list(args, backend))
}

fn execute_list(args: &[&str], backend: &dyn DashBackend) -> Result<CommandOutput, (i32, String)> {
    let mut json = false;
    let mut filter = None;
    let mut i = 0;
    while i < args.len() {
        match args[i] {
            "--help" | "-h" => {
                let help = concat!(
                    "Usage: tabdash list [flags]\n",
                    "\n",
                    "List bookmarks in display order\n",
                    "\n",
                    "Flags:\n",
                    "  --filter text   Only show bookmarks whose name contains text (any case)\n",
                    "  --json          Output the rendered list as JSON\n",
                );
                return Err((0, help.to_string()));
            }
            "--json" => json = true,
            "--filter" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    return Err((2, "flag --filter requires a value".to_string()));
                };
                filter = Some(*value);
            }
            v if v.starts_with("--filter=") => filter = Some(v.trim_start_matches("--filter=")),
            v if v.starts_with('-') => return Err((2, format!("unknown flag: {v}"))),
            _ => return Err((2, "expected 0 arguments".to_string())),
        }
        i += 1;
    }

    let (mut store, warning) = open_store(backend)?;
    if let Some(query) = filter {
        store.set_filter(query);
    }
    let rendered = store.render_visible();
    let stdout = if json {
        let mut text = serde_json::to_string_pretty(&rendered.items)
            .map_err(|e| (1, format!("encode list: {e}")))?;
        text.push('\n');
        text
    } else if store.is_empty() {
        format!("{EMPTY_LIST_MESSAGE}\n")
    } else if rendered.is_empty() {
        format!("No bookmarks match {:?}.\n", store.filter())
    } else {
        format_table(&rendered).map_err(|e| (1, e))?
    };

    Ok(CommandOutput {
        stdout,
        stderr: warning.unwrap_or_default(),
        exit_code: 0,
    })
}

/// Tab-aligned table; the icon column shows the fallback glyph.
fn format_table(list: &RenderedList) -> Result<String, String> {
    let mut tw = TabWriter::new(Vec::new()).padding(2);
    writeln!(tw, "#\tICON\tNAME\tURL").map_err(|e| e.to_string())?;
    for item in &list.items {
        writeln!(
            tw,
            "{}\t{}\t{}\t{}",
            item.position + 1,
            item.icon_text(),
            item.name,
            item.href
        )
        .map_err(|e| e.to_string())?;
    }
    tw.flush().map_err(|e| e.to_string())?;
    let bytes = tw.into_inner().map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| e.to_string())
}
