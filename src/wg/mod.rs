use std::io::Write;
use std::process::{Command, Output, Stdio};

use crate::error::{Error, Result};

pub mod conf;
pub mod keys;
pub mod quick;

/// Runs `cmd` to completion, feeding `input` on stdin. A non-zero exit carries the combined output.
fn run(mut cmd: Command, input: Option<&str>) -> Result<Output> {
    let description = describe(&cmd);
    let output = spawn(&mut cmd, input).map_err(|err| Error::io(format!("running {}", description), err))?;

    if !output.status.success() {
        return Err(Error::ExternalTool {
            command: description,
            output: format!("{} ({})", combined_output(&output), output.status),
        });
    }

    if !output.stderr.is_empty() {
        tracing::warn!(
            stderr = String::from_utf8_lossy(&output.stderr).trim(),
            command = %description,
            "external tool stderr"
        );
    }

    Ok(output)
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn spawn(cmd: &mut Command, input: Option<&str>) -> std::io::Result<Output> {
    let Some(input) = input else {
        return cmd.output();
    };

    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes())?;
        stdin.write_all(b"\n")?;
    }
    child.wait_with_output()
}

fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut combined = stdout.trim().to_string();
    if !stderr.trim().is_empty() {
        if !combined.is_empty() {
            combined.push('\n');
        }
        combined.push_str(stderr.trim());
    }
    combined
}

fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
