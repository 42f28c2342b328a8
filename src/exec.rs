use crate::error::PipelineError;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;

/// Run one external command to completion and return its stdout.
///
/// A non-zero exit becomes [`PipelineError::ToolFailed`] carrying the first
/// stderr line; failing to spawn becomes [`PipelineError::ToolLaunch`].
pub fn run(mut command: Command) -> Result<Vec<u8>, PipelineError> {
    let tool = tool_name(&command);
    let start = Instant::now();
    let output = command
        .stdin(Stdio::null())
        .output()
        .map_err(|source| PipelineError::ToolLaunch {
            tool: tool.clone(),
            source,
        })?;
    let elapsed_ms = start.elapsed().as_millis();

    tracing::debug!(
        tool = %tool,
        elapsed_ms,
        status = %output.status,
        stdout_bytes = output.stdout.len(),
        "external command complete"
    );

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = stderr
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("no diagnostic output")
            .to_string();
        return Err(PipelineError::ToolFailed {
            tool,
            status: output.status.to_string(),
            detail,
        });
    }
    Ok(output.stdout)
}

fn tool_name(command: &Command) -> String {
    let program = Path::new(command.get_program());
    program
        .file_name()
        .unwrap_or(program.as_os_str())
        .to_string_lossy()
        .into_owned()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut command = Command::new("/bin/sh");
        command.args(["-c", script]);
        command
    }

    #[test]
    fn returns_stdout_on_success() {
        let stdout = run(sh("printf '10 7 10 7 '")).unwrap();
        assert_eq!(stdout, b"10 7 10 7 ");
    }

    #[test]
    fn failure_keeps_first_stderr_line() {
        let script = "echo >&2; echo 'bad frame' >&2; echo second >&2; exit 3";
        let err = run(sh(script)).unwrap_err();
        match err {
            PipelineError::ToolFailed { tool, detail, .. } => {
                assert_eq!(tool, "sh");
                assert_eq!(detail, "bad frame");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_program_is_a_launch_error() {
        let err = run(Command::new("/nonexistent/rife2x-tool")).unwrap_err();
        assert!(matches!(err, PipelineError::ToolLaunch { ref tool, .. } if tool == "rife2x-tool"));
    }
}
