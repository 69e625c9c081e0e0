//!
//! eventdesk terminal client
//! -------------------------
//! Connects to the event service, confirms any existing session and then either runs one
//! command (`-c`) or starts the interactive shell.

use std::env;
use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use eventdesk::cli::shell::{Flow, Shell, HELP};
use eventdesk::config::ClientConfig;
use eventdesk::AppContext;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--api <url>] [--timeout-ms <ms>] [--user <u> --password <p>] [-c <command>]\n\nFlags:\n  --api <url>          Base URL of the event API (default: $EVENTDESK_API_BASE or http://localhost:8080)\n  --timeout-ms <ms>    Request timeout (default: $EVENTDESK_TIMEOUT_MS or 10000)\n  --user <u>           Sign in at start-up (requires --password)\n  --password <p>       Password for --user\n  -c, --command <cmd>  Run one shell command and exit\n  -h, --help           Show this help\n\n{HELP}"
    );
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    api: Option<String>,
    timeout_ms: Option<String>,
    user: Option<String>,
    password: Option<String>,
    command: Option<String>,
    help: bool,
}

fn program_name(args: &[String]) -> String { args.first().cloned().unwrap_or_else(|| "eventdesk".into()) }

/// Parse `argv` (program name first, possibly absent). Every flag except `-h` takes a value.
fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut opts = Options::default();
    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        if flag == "-h" || flag == "--help" {
            opts.help = true;
            return Ok(opts);
        }
        let slot = match flag {
            "--api" => &mut opts.api,
            "--timeout-ms" => &mut opts.timeout_ms,
            "--user" => &mut opts.user,
            "--password" => &mut opts.password,
            "-c" | "--command" => &mut opts.command,
            unk => return Err(format!("Unrecognized argument: {}", unk)),
        };
        let Some(v) = args.get(i + 1) else { return Err(format!("{} requires a value", flag)); };
        *slot = Some(v.clone());
        i += 2;
    }
    Ok(opts)
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let args: Vec<String> = env::args().collect();
    let program = program_name(&args);
    let opts = match parse_args(&args) {
        Ok(o) => o,
        Err(msg) => {
            eprintln!("{}", msg);
            print_usage(&program);
            std::process::exit(2);
        }
    };
    if opts.help {
        print_usage(&program);
        return Ok(());
    }

    let mut cfg = ClientConfig::from_env().context("invalid environment configuration")?;
    if let Some(v) = &opts.api {
        cfg = cfg.with_base(v).context("--api")?;
    }
    if let Some(v) = &opts.timeout_ms {
        cfg = cfg.with_timeout_ms(v).context("--timeout-ms")?;
    }

    let ctx = AppContext::start(cfg).await.context("failed to initialise client")?;
    let mut shell = Shell::new(ctx);

    match (opts.user, opts.password) {
        (Some(u), Some(p)) => {
            if let Err(e) = shell.context().session().login(&u, &p).await {
                error!(target: "eventdesk", "auto-login failed: {}", e);
            }
        }
        (Some(_), None) | (None, Some(_)) => eprintln!("--user and --password must be given together; continuing signed out"),
        (None, None) => {}
    }

    if let Some(cmd) = opts.command {
        return shell.execute(&cmd).await.map(|_| ()).map_err(anyhow::Error::new);
    }

    info!(target: "eventdesk", "interactive shell ready; type 'help' for commands");
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut input = String::new();
    loop {
        input.clear();
        print!("> ");
        let _ = stdout.flush();
        match stdin.read_line(&mut input) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        match shell.execute(&input).await {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => eprintln!("error: {}", e),
        }
    }
    Ok(())
}
