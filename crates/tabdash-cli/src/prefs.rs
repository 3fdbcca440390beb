//! Preference commands: theme, background, search engine, greeting name,
//! mute, quotes and the status line.

use chrono::Timelike;
use tabdash_core::prefs::{self, SEARCH_ENGINES};
use tabdash_core::quotes::random_quote;
use tabdash_core::KeyValueStorage;

use crate::{CommandOutput, DashBackend};

fn storage_err(context: &str) -> impl Fn(tabdash_core::StorageError) -> (i32, String) + '_ {
    move |e| (1, format!("{context}: {e}"))
}

fn open_storage(
    backend: &dyn DashBackend,
) -> Result<(Box<dyn KeyValueStorage>, Option<String>), (i32, String)> {
    let opened = backend.open_storage().map_err(|e| (1, e))?;
    Ok((opened.storage, opened.warning))
}

fn help_request(args: &[&str], help: &str) -> Result<(), (i32, String)> {
    if args.iter().any(|a| matches!(*a, "--help" | "-h")) {
        return Err((0, help.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// theme
// ---------------------------------------------------------------------------

pub fn run_theme_for_test(args: &[&str], backend: &dyn DashBackend) -> CommandOutput {
    CommandOutput::from_result(execute_theme(args, backend))
}

fn execute_theme(args: &[&str], backend: &dyn DashBackend) -> Result<CommandOutput, (i32, String)> {
    help_request(
        args,
        concat!(
            "Usage: tabdash theme [name] [flags]\n",
            "\n",
            "Show the current theme, or switch to another one.\n",
            "\n",
            "Flags:\n",
            "  --accent color   Use the custom theme with this accent color\n",
        ),
    )?;

    let mut name = None;
    let mut accent = None;
    let mut i = 0;
    while i < args.len() {
        match args[i] {
            "--accent" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    return Err((2, "flag --accent requires a value".to_string()));
                };
                accent = Some(*value);
            }
            v if v.starts_with("--accent=") => accent = Some(v.trim_start_matches("--accent=")),
            v if v.starts_with('-') => return Err((2, format!("unknown flag: {v}"))),
            v => {
                if name.is_some() {
                    return Err((2, "expected at most 1 argument (theme)".to_string()));
                }
                name = Some(v);
            }
        }
        i += 1;
    }
    if name.is_some() && accent.is_some() {
        return Err((2, "pass either a theme name or --accent, not both".to_string()));
    }

    let (mut storage, warning) = open_storage(backend)?;
    let state = match (name, accent) {
        (_, Some(color)) => prefs::set_custom_accent(storage.as_mut(), color)
            .map_err(storage_err("set accent"))?,
        (Some(theme), None) => {
            if theme.trim().is_empty() {
                return Err((2, "theme name must not be empty".to_string()));
            }
            prefs::apply_theme(storage.as_mut(), theme).map_err(storage_err("set theme"))?
        }
        (None, None) => prefs::theme(storage.as_ref()).map_err(storage_err("read theme"))?,
    };

    let stdout = match state.accent {
        Some(accent) => format!("theme: {} (accent {accent})\n", state.name),
        None => format!("theme: {}\n", state.name),
    };
    Ok(CommandOutput::with_warning(stdout, warning))
}

// ---------------------------------------------------------------------------
// background
// ---------------------------------------------------------------------------

pub fn run_background_for_test(args: &[&str], backend: &dyn DashBackend) -> CommandOutput {
    CommandOutput::from_result(execute_background(args, backend))
}

#[derive(Default)]
struct BackgroundArgs<'a> {
    url: Option<&'a str>,
    blur: Option<u32>,
    brightness: Option<u32>,
    reset: bool,
}

fn parse_number(flag: &str, raw: &str) -> Result<u32, (i32, String)> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| (2, format!("invalid value for {flag}: {raw} (expected a whole number)")))
}

fn parse_background_args<'a>(args: &[&'a str]) -> Result<BackgroundArgs<'a>, (i32, String)> {
    let mut parsed = BackgroundArgs::default();
    let mut i = 0;
    while i < args.len() {
        let (flag, inline) = match args[i].split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag, Some(value)),
            _ => (args[i], None),
        };
        match flag {
            "--help" | "-h" => {
                let help = concat!(
                    "Usage: tabdash background [flags]\n",
                    "\n",
                    "Show the background settings, or change them.\n",
                    "\n",
                    "Flags:\n",
                    "  --url url            Use the image at url as background\n",
                    "  --blur px            Blur radius in pixels (0-20)\n",
                    "  --brightness pct     Brightness in percent (0-200)\n",
                    "  --reset              Remove the image and restore blur 5, brightness 100\n",
                );
                return Err((0, help.to_string()));
            }
            "--reset" => parsed.reset = true,
            "--url" | "--blur" | "--brightness" => {
                let value = match inline {
                    Some(value) => value,
                    None => {
                        i += 1;
                        match args.get(i) {
                            Some(value) => *value,
                            None => return Err((2, format!("flag {flag} requires a value"))),
                        }
                    }
                };
                match flag {
                    "--url" => parsed.url = Some(value),
                    "--blur" => parsed.blur = Some(parse_number(flag, value)?),
                    _ => parsed.brightness = Some(parse_number(flag, value)?),
                }
            }
            v if v.starts_with('-') => return Err((2, format!("unknown flag: {v}"))),
            _ => return Err((2, "expected 0 arguments".to_string())),
        }
        i += 1;
    }
    let changes = parsed.url.is_some() || parsed.blur.is_some() || parsed.brightness.is_some();
    if parsed.reset && changes {
        return Err((2, "--reset cannot be combined with other flags".to_string()));
    }
    if parsed.url.is_some_and(|url| url.trim().is_empty()) {
        return Err((2, "background url must not be blank".to_string()));
    }
    Ok(parsed)
}

fn execute_background(
    args: &[&str],
    backend: &dyn DashBackend,
) -> Result<CommandOutput, (i32, String)> {
    let parsed = parse_background_args(args)?;
    let (mut storage, warning) = open_storage(backend)?;

    if parsed.reset {
        prefs::reset_background(storage.as_mut()).map_err(storage_err("reset background"))?;
    }
    if let Some(url) = parsed.url {
        prefs::set_background_url(storage.as_mut(), url)
            .map_err(storage_err("set background"))?;
    }
    if let Some(px) = parsed.blur {
        prefs::set_background_blur(storage.as_mut(), px).map_err(storage_err("set blur"))?;
    }
    if let Some(percent) = parsed.brightness {
        prefs::set_background_brightness(storage.as_mut(), percent)
            .map_err(storage_err("set brightness"))?;
    }

    let bg = prefs::background(storage.as_ref()).map_err(storage_err("read background"))?;
    let stdout = format!(
        "image: {}\nfilter: {}\n",
        bg.image.as_deref().unwrap_or("none"),
        bg.css_filter()
    );
    Ok(CommandOutput::with_warning(stdout, warning))
}

// ---------------------------------------------------------------------------
// engine / search
// ---------------------------------------------------------------------------

pub fn run_engine_for_test(args: &[&str], backend: &dyn DashBackend) -> CommandOutput {
    CommandOutput::from_result(execute_engine(args, backend))
}

fn execute_engine(args: &[&str], backend: &dyn DashBackend) -> Result<CommandOutput, (i32, String)> {
    help_request(
        args,
        concat!(
            "Usage: tabdash engine [next]\n",
            "\n",
            "Show the search engine, or switch to the next one.\n",
        ),
    )?;
    let advance = match args {
        [] => false,
        ["next"] => true,
        _ => return Err((2, "expected no argument or \"next\"".to_string())),
    };

    let (mut storage, warning) = open_storage(backend)?;
    let engine = if advance {
        prefs::cycle_engine(storage.as_mut()).map_err(storage_err("switch engine"))?
    } else {
        prefs::current_engine(storage.as_ref()).map_err(storage_err("read engine"))?
    };

    let mut stdout = String::new();
    for candidate in SEARCH_ENGINES.iter() {
        let marker = if candidate.name == engine.name { "*" } else { " " };
        stdout.push_str(&format!("{marker} {}\n", candidate.name));
    }
    Ok(CommandOutput::with_warning(stdout, warning))
}

pub fn run_search_for_test(args: &[&str], backend: &dyn DashBackend) -> CommandOutput {
    CommandOutput::from_result(execute_search(args, backend))
}

fn execute_search(args: &[&str], backend: &dyn DashBackend) -> Result<CommandOutput, (i32, String)> {
    help_request(
        args,
        "Usage: tabdash search <query...>\n\nPrint the search url for a query.\n",
    )?;
    let query = args.join(" ");
    let (storage, warning) = open_storage(backend)?;
    let engine = prefs::current_engine(storage.as_ref()).map_err(storage_err("read engine"))?;
    let Some(url) = prefs::search_url(&engine, &query) else {
        return Err((2, "search query must not be empty".to_string()));
    };
    Ok(CommandOutput::with_warning(format!("{url}\n"), warning))
}

// ---------------------------------------------------------------------------
// name / mute / status
// ---------------------------------------------------------------------------

pub fn run_name_for_test(args: &[&str], backend: &dyn DashBackend) -> CommandOutput {
    CommandOutput::from_result(execute_name(args, backend))
}

fn execute_name(args: &[&str], backend: &dyn DashBackend) -> Result<CommandOutput, (i32, String)> {
    help_request(
        args,
        "Usage: tabdash name [name]\n\nShow or set the name used in the greeting.\n",
    )?;
    let (mut storage, warning) = open_storage(backend)?;
    if !args.is_empty() {
        let saved = prefs::set_display_name(storage.as_mut(), &args.join(" "))
            .map_err(storage_err("set name"))?;
        if !saved {
            return Err((2, "name must not be blank".to_string()));
        }
    }
    let name = prefs::display_name(storage.as_ref()).map_err(storage_err("read name"))?;
    Ok(CommandOutput::with_warning(format!("{name}\n"), warning))
}

pub fn run_mute_for_test(args: &[&str], backend: &dyn DashBackend) -> CommandOutput {
    CommandOutput::from_result(execute_mute(args, backend))
}

fn execute_mute(args: &[&str], backend: &dyn DashBackend) -> Result<CommandOutput, (i32, String)> {
    help_request(args, "Usage: tabdash mute\n\nToggle sound effects.\n")?;
    if !args.is_empty() {
        return Err((2, "expected 0 arguments".to_string()));
    }
    let (mut storage, warning) = open_storage(backend)?;
    let muted = prefs::toggle_mute(storage.as_mut()).map_err(storage_err("toggle mute"))?;
    let state = if muted { "muted" } else { "unmuted" };
    Ok(CommandOutput::with_warning(format!("sound {state}\n"), warning))
}

pub fn run_status_for_test(args: &[&str], backend: &dyn DashBackend) -> CommandOutput {
    CommandOutput::from_result(execute_status(args, backend))
}

fn execute_status(args: &[&str], backend: &dyn DashBackend) -> Result<CommandOutput, (i32, String)> {
    help_request(
        args,
        concat!(
            "Usage: tabdash status [flags]\n",
            "\n",
            "Show greeting, date and clock.\n",
            "\n",
            "Flags:\n",
            "  --24h / --12h                 Switch the clock format and save it\n",
            "  --seconds / --no-seconds      Show or hide seconds and save it\n",
        ),
    )?;

    let (mut storage, warning) = open_storage(backend)?;
    let mut clock = prefs::clock_prefs(storage.as_ref()).map_err(storage_err("read clock"))?;
    let before = clock;
    for arg in args {
        match *arg {
            "--24h" => clock.use_24h = true,
            "--12h" => clock.use_24h = false,
            "--seconds" => clock.show_seconds = true,
            "--no-seconds" => clock.show_seconds = false,
            v if v.starts_with('-') => return Err((2, format!("unknown flag: {v}"))),
            _ => return Err((2, "expected 0 arguments".to_string())),
        }
    }
    if clock != before {
        prefs::set_clock_prefs(storage.as_mut(), clock).map_err(storage_err("save clock"))?;
    }

    let now = backend.now_local();
    let name = prefs::display_name(storage.as_ref()).map_err(storage_err("read name"))?;
    let stdout = format!(
        "{}, {name}!\n{}\n{}\n",
        prefs::greeting(now.hour()),
        prefs::format_date(now.date()),
        prefs::format_clock(now.time(), clock)
    );
    Ok(CommandOutput::with_warning(stdout, warning))
}

// ---------------------------------------------------------------------------
// quote
// ---------------------------------------------------------------------------

pub fn run_quote_for_test(args: &[&str], _backend: &dyn DashBackend) -> CommandOutput {
    CommandOutput::from_result(execute_quote(args))
}

fn execute_quote(args: &[&str]) -> Result<CommandOutput, (i32, String)> {
    help_request(args, "Usage: tabdash quote\n\nPrint a random quote.\n")?;
    if !args.is_empty() {
        return Err((2, "expected 0 arguments".to_string()));
    }
    let quote = random_quote(&mut rand::thread_rng());
    Ok(CommandOutput::ok(format!("{}\n", quote.display())))
}
