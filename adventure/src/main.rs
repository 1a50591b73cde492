//! Stdio shim for the world-state engine.
//!
//! Reads one JSON tool call per line from stdin and writes one JSON
//! response per line to stdout:
//!
//! ```text
//! > {"tool": "move_player", "args": {"location": "study"}}
//! < {"result": "Player moved from foyer to study"}
//! < {"error": {"kind": "invalid_transition", "message": "the locked oak door is locked"}}
//! ```
//!
//! Logging goes to stderr so stdout carries only responses. The state
//! file path comes from `ADVENTURE_STATE_FILE` (default
//! `world_state.json`). Run with `--tools` to print the tool catalog
//! and exit.

use adventure_core::{tools, ToolError, WorldEngine, WorldTools};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// One decoded tool call.
#[derive(Debug, Deserialize)]
struct ToolRequest {
    tool: String,

    #[serde(default)]
    args: Value,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Log to stderr only; stdout is reserved for responses.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if std::env::args().any(|a| a == "--tools") {
        println!("{}", catalog_json());
        return Ok(());
    }

    let path = std::env::var("ADVENTURE_STATE_FILE")
        .unwrap_or_else(|_| "world_state.json".to_string());
    info!(%path, "starting world-state engine");
    let engine = WorldEngine::with_path(&path);

    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = handle_line(&engine, line).await;
        stdout.write_all(response.to_string().as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}

/// Decode one request line and run it. Every failure becomes an error
/// response; nothing terminates the process.
async fn handle_line(engine: &WorldEngine, line: &str) -> Value {
    let request: ToolRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(err) => {
            return json!({
                "error": { "kind": "bad_request", "message": err.to_string() }
            })
        }
    };

    match tools::dispatch(engine, &request.tool, &request.args).await {
        Ok(result) => json!({ "result": result }),
        Err(ToolError::World(err)) => json!({
            "error": { "kind": err.kind(), "message": err.to_string() }
        }),
        Err(err) => json!({
            "error": { "kind": "bad_request", "message": err.to_string() }
        }),
    }
}

fn catalog_json() -> Value {
    let tools: Vec<Value> = WorldTools::all()
        .into_iter()
        .map(|t| {
            json!({
                "name": t.name,
                "description": t.description,
                "input_schema": t.input_schema,
            })
        })
        .collect();
    json!({ "tools": tools })
}
