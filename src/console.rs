//! Line-oriented front end: reads `!command` lines from stdin and prints the
//! replies.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::app::App;
use crate::commands::dispatch;
use crate::plugins::projects::types::Member;

const BANNER: &str = "🤖 craftdesk ready. Type `!help` for commands, `quit` to exit.";
const NOT_A_COMMAND: &str = "Commands start with `!`. Try `!help`.";

pub async fn run_console(app: Arc<App>, caller: Member) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    stdout.write_all(format!("{}\n", BANNER).as_bytes()).await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }

        let text = match dispatch(&app, &caller, line).await {
            Some(reply) => reply.render(),
            None => NOT_A_COMMAND.to_string(),
        };
        stdout.write_all(format!("{}\n\n", text).as_bytes()).await?;
        stdout.flush().await?;
    }

    tracing::info!(target: "system", "Console closed");
    Ok(())
}
