//! `tabdash export` and `tabdash import`: backup documents.

use tabdash_core::backup::{backup_file_name, export, import, ExportDocument};

use crate::{open_store, CommandOutput, DashBackend};

pub fn run_export_for_test(args: &[&str], backend: &dyn DashBackend) -> CommandOutput {
    CommandOutput::from_result(execute_export(args, backend))
}

pub fn run_import_for_test(args: &[&str], backend: &dyn DashBackend) -> CommandOutput {
    CommandOutput::from_result(execute_import(args, backend))
}

/// Single optional positional argument shared by both commands.
fn parse_path_arg<'a>(args: &[&'a str], help: &str) -> Result<Option<&'a str>, (i32, String)> {
    let mut path = None;
    for arg in args {
        match *arg {
            "--help" | "-h" => return Err((0, help.to_string())),
            "-" => path = Some("-"),
            v if v.starts_with('-') => return Err((2, format!("unknown flag: {v}"))),
            v => {
                if path.is_some() {
                    return Err((2, "expected at most 1 argument (file)".to_string()));
                }
                path = Some(v);
            }
        }
    }
    Ok(path)
}

fn execute_export(
    args: &[&str],
    backend: &dyn DashBackend,
) -> Result<CommandOutput, (i32, String)> {
    let help = concat!(
        "Usage: tabdash export [file]\n",
        "\n",
        "Write settings and bookmarks to a JSON backup.\n",
        "Defaults to tabdash-backup-<date>.json; use - for stdout.\n",
    );
    let path = parse_path_arg(args, help)?;
    let (store, warning) = open_store(backend)?;

    let document = export(&store, backend.now_utc()).map_err(|e| (1, format!("export: {e}")))?;
    let mut text = serde_json::to_string_pretty(&document)
        .map_err(|e| (1, format!("export: encode backup: {e}")))?;
    text.push('\n');

    let stderr = warning.unwrap_or_default();
    if path == Some("-") {
        return Ok(CommandOutput {
            stdout: text,
            stderr,
            exit_code: 0,
        });
    }

    let target = path
        .map(str::to_string)
        .unwrap_or_else(|| backup_file_name(backend.now_local().date()));
    backend
        .write_file(&target, &text)
        .map_err(|e| (1, format!("export: {e}")))?;
    tracing::info!(file = %target, "exported dashboard backup");

    Ok(CommandOutput {
        stdout: format!("{}\n", export_summary(&document, &target)),
        stderr,
        exit_code: 0,
    })
}

fn export_summary(document: &ExportDocument, target: &str) -> String {
    let links = document.links.as_ref().map(Vec::len).unwrap_or(0);
    format!(
        "Exported {links} bookmark(s) and {} setting(s) to {target}",
        document.settings.len()
    )
}

fn execute_import(
    args: &[&str],
    backend: &dyn DashBackend,
) -> Result<CommandOutput, (i32, String)> {
    let help = concat!(
        "Usage: tabdash import <file>\n",
        "\n",
        "Restore settings and bookmarks from a JSON backup.\n",
        "The bookmark list is replaced, not merged.\n",
    );
    let Some(path) = parse_path_arg(args, help)? else {
        return Err((2, "expected 1 argument (file)".to_string()));
    };
    let raw = backend.read_file(path).map_err(|e| (1, format!("import: {e}")))?;

    let (mut store, warning) = open_store(backend)?;
    let report = import(&mut store, &raw).map_err(|e| (1, format!("import: {e}")))?;

    let mut stdout = format!("Imported {} setting(s)", report.settings_restored);
    match report.links_replaced {
        Some(count) => stdout.push_str(&format!(" and {count} bookmark(s)")),
        None => stdout.push_str(", bookmark list taken from settings"),
    }
    stdout.push_str(&format!(" from {path}\n"));

    Ok(CommandOutput {
        stdout,
        stderr: warning.unwrap_or_default(),
        exit_code: 0,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::run_cli_for_test;
    use crate::tests_common::MockDashBackend;

    #[test]
    fn export_defaults_to_dated_file_name() {
        let backend = MockDashBackend::new();
        run_cli_for_test(&["add", "Mail", "mail.com"], &backend);
        let out = run_cli_for_test(&["export"], &backend);
        assert_eq!(out.exit_code, 0, "{}", out.stderr);
        assert_eq!(
            out.stdout,
            "Exported 1 bookmark(s) and 1 setting(s) to tabdash-backup-2026-01-05.json\n"
        );

        let files = backend.files.borrow();
        let raw = files.get("tabdash-backup-2026-01-05.json").unwrap();
        let value: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["exportDate"], "2026-01-05T09:07:03.000Z");
        assert_eq!(value["links"][0]["url"], "https://mail.com");
    }

    #[test]
    fn export_dash_writes_stdout() {
        let backend = MockDashBackend::new();
        let out = run_cli_for_test(&["export", "-"], &backend);
        assert_eq!(out.exit_code, 0);
        assert!(out.stdout.contains("\"exportDate\""));
        assert!(backend.files.borrow().is_empty());
    }

    #[test]
    fn import_replaces_list_and_restores_settings() {
        let backend = MockDashBackend::new();
        run_cli_for_test(&["add", "Old", "old.example"], &backend);
        backend.files.borrow_mut().insert(
            "backup.json".to_string(),
            r#"{"version":"1.0","exportDate":"2026-01-01T00:00:00.000Z","settings":{"savedTheme":"nord","username":"Ada"},"links":[{"name":"New","url":"https://new.example"}]}"#.to_string(),
        );

        let out = run_cli_for_test(&["import", "backup.json"], &backend);
        assert_eq!(out.exit_code, 0, "{}", out.stderr);
        assert_eq!(
            out.stdout,
            "Imported 2 setting(s) and 1 bookmark(s) from backup.json\n"
        );
        assert_eq!(backend.stored("savedTheme").as_deref(), Some("nord"));
        assert_eq!(
            backend.stored("savedLinks").as_deref(),
            Some(r#"[{"name":"New","url":"https://new.example"}]"#)
        );
    }

    #[test]
    fn invalid_backup_is_rejected_without_changes() {
        let backend = MockDashBackend::new();
        run_cli_for_test(&["add", "Keep", "keep.example"], &backend);
        let before = backend.stored("savedLinks");
        backend
            .files
            .borrow_mut()
            .insert("bad.json".to_string(), "{ nope".to_string());

        let out = run_cli_for_test(&["import", "bad.json"], &backend);
        assert_eq!(out.exit_code, 1);
        assert!(out.stderr.starts_with("import: invalid backup file"), "{}", out.stderr);
        assert_eq!(backend.stored("savedLinks"), before);
    }

    #[test]
    fn import_requires_a_file() {
        let backend = MockDashBackend::new();
        let out = run_cli_for_test(&["import"], &backend);
        assert_eq!(out.exit_code, 2);
        assert_eq!(out.stderr, "expected 1 argument (file)\n");
    }
}
