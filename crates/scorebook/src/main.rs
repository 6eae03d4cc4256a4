//! Replays a JSON play script through the scorekeeping core and prints the
//! final game and its at-bat log as JSON.
//!
//! Usage: `scorebook [SCRIPT]` (reads stdin when SCRIPT is omitted or `-`).

mod script;

use std::io::Read;

use anyhow::Context;

use slowpitch_infra::ScorekeepingConfig;

fn main() -> anyhow::Result<()> {
    slowpitch_observability::init();

    let config = ScorekeepingConfig::from_env();
    let raw = read_input(std::env::args().nth(1))?;
    let script: script::Script =
        serde_json::from_str(&raw).context("play script is not valid JSON")?;

    let replay = script::replay(&script, &config)?;
    tracing::info!(
        at_bats = replay.at_bats.len(),
        away = replay.game.score().away(),
        home = replay.game.score().home(),
        "replay finished"
    );

    let out = serde_json::to_string_pretty(&replay).context("failed to render game")?;
    println!("{out}");
    Ok(())
}

fn read_input(path: Option<String>) -> anyhow::Result<String> {
    match path.as_deref() {
        None | Some("-") => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read play script from stdin")?;
            Ok(raw)
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read play script {path}")),
    }
}
