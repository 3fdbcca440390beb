use tabdash_cli::config::{load_config, ENV_CONFIG};

fn main() {
    tabdash_cli::set_version(env!("CARGO_PKG_VERSION"));
    let args: Vec<String> = std::env::args().skip(1).collect();

    let explicit = std::env::var(ENV_CONFIG).ok();
    let config = match load_config(explicit.as_deref()) {
        Ok((config, _)) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };
    if let Err(err) = tabdash_cli::logging::init_logging(&config.logging) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }

    let backend = tabdash_cli::FilesystemDashBackend::new(config);
    let out = tabdash_cli::run_cli(&args, &backend);
    if !out.stdout.is_empty() {
        print!("{}", out.stdout);
    }
    if !out.stderr.is_empty() {
        eprint!("{}", out.stderr);
    }
    std::process::exit(out.exit_code);
}
