//! `tabdash add`: create a bookmark through the modal form.

use tabdash_core::FormMode;

use crate::{open_store, CommandOutput, DashBackend};

pub fn run_add_for_test(args: &[&str], backend: &dyn DashBackend) -> CommandOutput {
    CommandOutput::from_result(execute_add(args, backend))
}

fn parse_add_args<'a>(args: &[&'a str]) -> Result<(&'a str, &'a str), (i32, String)> {
    let mut positional = Vec::new();
    for arg in args {
        match *arg {
            "--help" | "-h" => {
                let help = concat!(
                    "Usage: tabdash add <name> <url>\n",
                    "\n",
                    "Add a bookmark at the end of the list. Urls without a scheme get https://\n",
                );
                return Err((0, help.to_string()));
            }
            v if v.starts_with("--") => return Err((2, format!("unknown flag: {v}"))),
            v => positional.push(v),
        }
    }
    match positional.as_slice() {
        [name, url] => Ok((*name, *url)),
        _ => Err((
            2,
            format!("expected 2 arguments (name, url), got {}", positional.len()),
        )),
    }
}

fn execute_add(args: &[&str], backend: &dyn DashBackend) -> Result<CommandOutput, (i32, String)> {
    let (name, url) = parse_add_args(args)?;
    let (mut store, warning) = open_store(backend)?;

    store.open_create_form();
    let mode = store.session().mode();
    let outcome = store
        .submit(name, url)
        .map_err(|e| (1, format!("add bookmark: {e}")))?;

    let id = outcome.id();
    let position = store.position_of(id).map(|p| p + 1).unwrap_or(store.len());
    let saved_url = store.get(id).map(|b| b.url.clone()).unwrap_or_default();
    let label = mode.map(FormMode::submit_label).unwrap_or("Add Link");
    tracing::info!(position, "bookmark added");

    Ok(CommandOutput {
        stdout: format!("{label}: #{position} {name} -> {saved_url}\n"),
        stderr: warning.unwrap_or_default(),
        exit_code: 0,
    })
}

#[cfg(test)]
mod tests {
    use crate::run_cli_for_test;
    use crate::tests_common::MockDashBackend;

    #[test]
    fn add_normalizes_and_appends() {
        let backend = MockDashBackend::new();
        let first = run_cli_for_test(&["add", "Mail", "mail.com"], &backend);
        assert_eq!(first.exit_code, 0, "{}", first.stderr);
        assert_eq!(first.stdout, "Add Link: #1 Mail -> https://mail.com\n");

        let second = run_cli_for_test(&["add", "News", "http://news.example"], &backend);
        assert_eq!(second.stdout, "Add Link: #2 News -> http://news.example\n");

        assert_eq!(
            backend.stored("savedLinks").as_deref(),
            Some(r#"[{"name":"Mail","url":"https://mail.com"},{"name":"News","url":"http://news.example"}]"#)
        );
    }

    #[test]
    fn add_requires_two_arguments() {
        let backend = MockDashBackend::new();
        let out = run_cli_for_test(&["add", "Mail"], &backend);
        assert_eq!(out.exit_code, 2);
        assert_eq!(out.stderr, "expected 2 arguments (name, url), got 1\n");
        assert_eq!(backend.stored("savedLinks"), None);
    }

    #[test]
    fn quota_failure_reports_and_keeps_list() {
        let backend = MockDashBackend::with_quota(64);
        backend.seed("savedLinks", r#"[{"name":"A","url":"https://a"}]"#);
        let out = run_cli_for_test(&["add", "Far too long a name", "long-host.example"], &backend);
        assert_eq!(out.exit_code, 1);
        assert!(out.stderr.starts_with("add bookmark: storage quota exceeded"), "{}", out.stderr);
        assert_eq!(
            backend.stored("savedLinks").as_deref(),
            Some(r#"[{"name":"A","url":"https://a"}]"#)
        );
    }
}
