//! Local model runner backend
//!
//! Spawns the configured runner once per call (default `ollama run <model>`),
//! writes the prompt to its stdin and takes stdout as the completion.
//! Sampling parameters are exported to the child as `MOVEAUDIT_TEMPERATURE`,
//! `MOVEAUDIT_TOP_P` and `MOVEAUDIT_MAX_TOKENS` for runners that honor them.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

use crate::config::BackendConfig;
use crate::inference::{InferenceClient, InferenceError, SamplingParams};

pub struct LocalRunnerClient {
    program: String,
    args: Vec<String>,
}

impl LocalRunnerClient {
    pub fn from_config(config: &BackendConfig) -> Result<Self, InferenceError> {
        let (program, rest) = config
            .command
            .split_first()
            .ok_or_else(|| InferenceError::BackendError("local runner command is empty".to_string()))?;

        let mut args = rest.to_vec();
        args.push(config.model.clone());

        Ok(Self {
            program: program.clone(),
            args,
        })
    }
}

impl InferenceClient for LocalRunnerClient {
    fn complete(&self, prompt: &str, sampling: &SamplingParams) -> Result<String, InferenceError> {
        debug!("Local runner: spawning {} {:?}", self.program, self.args);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env("MOVEAUDIT_TEMPERATURE", sampling.temperature.to_string())
            .env("MOVEAUDIT_TOP_P", sampling.top_p.to_string())
            .env("MOVEAUDIT_MAX_TOKENS", sampling.max_tokens.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| InferenceError::BackendUnavailable(format!("cannot start {}: {}", self.program, e)))?;

        // Feed stdin from a separate thread so a chatty runner cannot deadlock on a full pipe
        let writer = child.stdin.take().map(|mut stdin| {
            let prompt = prompt.to_string();
            thread::spawn(move || stdin.write_all(prompt.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| InferenceError::BackendError(format!("runner I/O failed: {}", e)))?;

        // The exit status decides the outcome; a runner may exit without reading stdin
        match writer.map(|handle| handle.join()) {
            Some(Ok(Err(e))) => debug!("Local runner: prompt not fully written: {}", e),
            Some(Err(_)) => debug!("Local runner: stdin writer thread panicked"),
            Some(Ok(Ok(()))) | None => {}
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InferenceError::BackendError(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| InferenceError::BackendError(format!("runner output is not UTF-8: {}", e)))
    }

    fn describe(&self) -> String {
        format!("local {} {}", self.program, self.args.join(" "))
    }
}
