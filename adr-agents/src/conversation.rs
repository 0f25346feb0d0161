//! Multi-turn conversations with an agent
//!
//! Every line read is one more turn in the same session, so the agent sees the whole exchange
//! when it asks follow-up questions or waits for a confirmation.

use crate::Agent;
use std::io::{BufRead, Write};

/// Lines that end the conversation
pub const EXIT_COMMANDS: &[&str] = &["quit", "exit"];

/// Reads user turns from `input` until an exit command or end of input and writes each answer
/// to `output`. Returns the number of turns sent to the agent.
///
/// A failed turn is reported and the conversation goes on.
pub async fn run_conversation<R, W>(
    agent: &dyn Agent,
    session_id: i64,
    mut input: R,
    output: &mut W,
) -> anyhow::Result<usize>
where
    R: BufRead,
    W: Write,
{
    let mut turns = 0;

    loop {
        write!(output, "You> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&line) {
            break;
        }

        turns += 1;
        match agent.execute(line, session_id).await {
            Ok(result) => writeln!(output, "\n--- Agent Result ---\n{}\n", result)?,
            Err(e) => {
                tracing::warn!(session_id, error = %e, "Turn failed");
                writeln!(output, "\nError: {:#}\n", e)?
            }
        }
    }

    Ok(turns)
}
