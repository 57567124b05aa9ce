mod config;
mod db;
mod error;
mod exchange;
mod ipc;
mod records;
mod status;
mod student;
mod validate;

use std::io::{self, BufRead, Write};

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    // stdout carries responses; logs go to stderr only.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cfg = config::Config::from_env().context("failed to read configuration")?;
    let mut state = ipc::AppState::new(cfg.threshold);

    if let Some(path) = cfg.workspace.as_deref() {
        // A bad startup workspace leaves the sidecar running without one.
        if let Err(e) = ipc::open_workspace(&mut state, path) {
            log::error!("could not open workspace {}: {e}", path.display());
        }
    }
    log::info!(
        "rosterd {} ready (GPA threshold {})",
        env!("CARGO_PKG_VERSION"),
        state.threshold.value()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                log::error!("stdin read failed: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                log::warn!("discarding malformed request: {e}");
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{resp}");
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    Ok(())
}
