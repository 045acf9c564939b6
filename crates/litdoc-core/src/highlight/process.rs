//! External highlighter process (`pygmentize` by default).

use std::io;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStderr, ChildStdout, Command};

use super::{HighlightError, Highlighter};

/// Default highlighter program.
pub const DEFAULT_PROGRAM: &str = "pygmentize";

/// Default arguments; `{language}` is replaced with the grammar name.
pub const DEFAULT_ARGS: &[&str] = &["-l", "{language}", "-f", "html", "-O", "encoding=utf-8"];

/// Default time allowed for one highlighter invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const LANGUAGE_PLACEHOLDER: &str = "{language}";

/// Highlighter that pipes the payload through an external program.
///
/// One process is spawned per call. The payload is written to its stdin,
/// stdout is collected in arrival order, and the first bytes seen on stderr
/// fail the call without waiting for the process to exit.
#[derive(Debug, Clone)]
pub struct ProcessHighlighter {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl Default for ProcessHighlighter {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_owned(),
            args: DEFAULT_ARGS.iter().map(|&arg| arg.to_owned()).collect(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl ProcessHighlighter {
    /// Create a highlighter running `program` with `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Set the per-invocation timeout (`None` waits indefinitely).
    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments with the language placeholder filled in.
    fn args_for(&self, language: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace(LANGUAGE_PLACEHOLDER, language))
            .collect()
    }

    async fn run(&self, language: &str, payload: String) -> Result<String, HighlightError> {
        let mut child = Command::new(&self.program)
            .args(self.args_for(language))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| HighlightError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Both output pipes are taken before anything is written.
        let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;
        let mut stdin = child.stdin.take().ok_or_else(|| missing_pipe("stdin"))?;

        let write = async move {
            stdin.write_all(payload.as_bytes()).await?;
            stdin.shutdown().await
        };
        let io = async { tokio::try_join!(write, collect_stdout(stdout, Vec::new())) };
        let errors = first_stderr(stderr);
        tokio::pin!(io, errors);

        let mut stderr_closed = false;
        let result = loop {
            tokio::select! {
                biased;
                text = &mut errors, if !stderr_closed => match text? {
                    Some(stderr) => return Err(HighlightError::Process { stderr }),
                    None => stderr_closed = true,
                },
                result = &mut io => break result,
            }
        };

        // Output already complete; stderr still decides, including when a
        // broken pipe was caused by the process bailing out early.
        if !stderr_closed && let Some(stderr) = errors.await? {
            return Err(HighlightError::Process { stderr });
        }
        let ((), buffer) = result?;

        let status = child.wait().await?;
        if !status.success() {
            tracing::warn!(
                program = %self.program,
                %status,
                "Highlighter exited unsuccessfully without error output"
            );
        }

        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl Highlighter for ProcessHighlighter {
    async fn highlight(&self, language: &str, payload: String) -> Result<String, HighlightError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.run(language, payload))
                .await
                .unwrap_or_else(|_| Err(HighlightError::Timeout(limit))),
            None => self.run(language, payload).await,
        }
    }
}

/// Append stdout to `buffer` in arrival order until EOF.
async fn collect_stdout(mut stdout: ChildStdout, mut buffer: Vec<u8>) -> io::Result<Vec<u8>> {
    stdout.read_to_end(&mut buffer).await?;
    Ok(buffer)
}

/// Resolve with the first stderr chunk, or `None` once stderr closes empty.
async fn first_stderr(mut stderr: ChildStderr) -> io::Result<Option<String>> {
    let mut chunk = vec![0u8; 4096];
    let read = stderr.read(&mut chunk).await?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&chunk[..read]).into_owned()))
}

fn missing_pipe(name: &str) -> HighlightError {
    HighlightError::Io(io::Error::other(format!("highlighter {name} was not captured")))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    /// Shell stand-in for `pygmentize`: `$1` is the language.
    fn sh(script: &str) -> ProcessHighlighter {
        ProcessHighlighter::new(
            "sh",
            vec![
                "-c".to_owned(),
                script.to_owned(),
                "sh".to_owned(),
                LANGUAGE_PLACEHOLDER.to_owned(),
            ],
        )
    }

    const ECHO: &str = r#"printf '<div class="highlight"><pre>'; cat; printf '</pre></div>\n'"#;

    #[test]
    fn test_default_args() {
        let highlighter = ProcessHighlighter::default();
        assert_eq!(highlighter.program(), "pygmentize");
        assert_eq!(
            highlighter.args_for("ruby"),
            vec!["-l", "ruby", "-f", "html", "-O", "encoding=utf-8"]
        );
    }

    #[tokio::test]
    async fn test_echo_round_trip() {
        let out = sh(ECHO).highlight("js", "a\nb\n".to_owned()).await.unwrap();
        assert_eq!(out, "<div class=\"highlight\"><pre>a\nb\n</pre></div>\n");
    }

    #[tokio::test]
    async fn test_language_argument_passed() {
        let out = sh("printf %s \"$1\"")
            .highlight("python", String::new())
            .await
            .unwrap();
        assert_eq!(out, "python");
    }

    #[tokio::test]
    async fn test_large_payload_is_not_truncated() {
        let payload = "x = 1\n".repeat(50_000);
        let out = sh("cat").highlight("py", payload.clone()).await.unwrap();
        assert_eq!(out.len(), payload.len());
    }

    #[tokio::test]
    async fn test_stderr_fails() {
        let err = sh("echo \"no lexer for alias '$1'\" >&2; exit 1")
            .highlight("klingon", "x\n".to_owned())
            .await
            .unwrap_err();
        match err {
            HighlightError::Process { stderr } => {
                assert!(stderr.contains("no lexer for alias 'klingon'"));
            }
            other => panic!("expected process error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stderr_wins_over_stdout() {
        let err = sh("cat; echo warning >&2")
            .highlight("js", "x\n".to_owned())
            .await
            .unwrap_err();
        assert!(matches!(err, HighlightError::Process { .. }));
    }

    #[tokio::test]
    async fn test_nonzero_exit_without_stderr_is_ok() {
        let out = sh("cat; exit 3")
            .highlight("js", "x\n".to_owned())
            .await
            .unwrap();
        assert_eq!(out, "x\n");
    }

    #[tokio::test]
    async fn test_timeout() {
        let err = sh("sleep 5")
            .timeout(Some(Duration::from_millis(100)))
            .highlight("js", String::new())
            .await
            .unwrap_err();
        assert!(matches!(err, HighlightError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let err = ProcessHighlighter::new("litdoc-no-such-highlighter", Vec::new())
            .highlight("js", String::new())
            .await
            .unwrap_err();
        assert!(matches!(err, HighlightError::Spawn { .. }));
    }
}
