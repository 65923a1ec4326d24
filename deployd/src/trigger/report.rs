//! Console report for a trigger outcome

use std::io::{self, Write};

use crate::trigger::client::TriggerOutcome;

/// Write a human-readable account of the outcome
///
/// Only [`TriggerOutcome::Deployed`] ever prints the success line.
pub fn report<W: Write>(outcome: &TriggerOutcome, out: &mut W) -> io::Result<()> {
    match outcome {
        TriggerOutcome::Deployed(response) => {
            writeln!(out, "Deployment successful: {}", response.message())?;
            write_section(out, "Output", response.output())?;
        }
        TriggerOutcome::Rejected(response) => {
            writeln!(out, "Deployment failed: {}", response.error())?;
            write_section(out, "Stderr", response.stderr())?;
        }
        TriggerOutcome::RequestFailed(err) => {
            writeln!(out, "Deployment request failed: {}", err)?;
        }
    }
    out.flush()
}

fn write_section<W: Write>(out: &mut W, title: &str, body: &str) -> io::Result<()> {
    if body.is_empty() {
        return Ok(());
    }
    writeln!(out, "{}:", title)?;
    write!(out, "{}", body)?;
    if !body.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(())
}
