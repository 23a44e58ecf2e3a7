//! Shared mock infrastructure for unit tests.
//!
//! Provides a scripted [`ClusterGateway`], a recording [`CommandRunner`], an
//! in-memory [`TemplateStore`] and a recording [`ProgressReporter`] so each
//! test file doesn't have to re-define the same boilerplate.

#![allow(clippy::expect_used, dead_code)]

use std::process::{ExitStatus, Output};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use testpod_cli::application::ports::{
    ClusterGateway, CommandRunner, EnvVars, Invocation, ProgressReporter, TemplateStore,
};
use testpod_cli::domain::Template;
use testpod_cli::domain::error::ToolError;

// ── Scripted gateway ─────────────────────────────────────────────────────────

/// What a scripted gateway call does.
pub enum Reply {
    /// Succeed with this output.
    Ok(String),
    /// Fail like a non-zero kubectl exit with this output.
    Fail(&'static str),
    /// End an interactive session with this exit code.
    Exit(i32),
    /// Never complete.
    Hang,
}

type Script = Box<dyn Fn(&Invocation) -> Reply>;

/// Gateway that answers from a script and records every invocation.
pub struct ScriptedGateway {
    script: Script,
    calls: Mutex<Vec<Invocation>>,
    blocking_calls: Mutex<Vec<Invocation>>,
}

impl ScriptedGateway {
    pub fn new(script: impl Fn(&Invocation) -> Reply + 'static) -> Self {
        Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
            blocking_calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call succeeds with empty output.
    pub fn happy() -> Self {
        Self::new(|_| Reply::Ok(String::new()))
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn blocking_calls(&self) -> Vec<Invocation> {
        self.blocking_calls.lock().expect("lock").clone()
    }

    /// First argument of every async call, e.g. `["apply", "wait", "exec"]`.
    pub fn verbs(&self) -> Vec<String> {
        self.calls().iter().map(|c| verb(c).to_string()).collect()
    }

    /// `[kind, name]` of every async delete, in order.
    pub fn deletes(&self) -> Vec<Vec<String>> {
        delete_targets(&self.calls())
    }

    pub fn blocking_deletes(&self) -> Vec<Vec<String>> {
        delete_targets(&self.blocking_calls())
    }

    fn reply(&self, invocation: &Invocation) -> Reply {
        (self.script)(invocation)
    }
}

pub fn verb(invocation: &Invocation) -> &str {
    invocation.args.first().map_or("", String::as_str)
}

fn delete_targets(calls: &[Invocation]) -> Vec<Vec<String>> {
    calls
        .iter()
        .filter(|c| verb(c) == "delete")
        .map(|c| {
            c.args
                .iter()
                .filter(|a| !a.starts_with('-') && *a != "delete")
                .cloned()
                .collect()
        })
        .collect()
}

fn exited(invocation: &Invocation, code: i32) -> anyhow::Error {
    ToolError::Exited {
        command: invocation.describe("kubectl"),
        code,
    }
    .into()
}

fn failed(invocation: &Invocation, output: &str) -> anyhow::Error {
    ToolError::Failed {
        command: invocation.describe("kubectl"),
        status: "exit status: 1".to_string(),
        output: output.to_string(),
    }
    .into()
}

impl ClusterGateway for ScriptedGateway {
    async fn run(&self, invocation: &Invocation) -> Result<String> {
        invocation.validate()?;
        self.calls.lock().expect("lock").push(invocation.clone());
        match self.reply(invocation) {
            Reply::Ok(out) => Ok(out),
            Reply::Fail(out) => Err(failed(invocation, out)),
            Reply::Exit(code) => Err(exited(invocation, code)),
            Reply::Hang => std::future::pending().await,
        }
    }

    fn run_blocking(&self, invocation: &Invocation) -> Result<String> {
        invocation.validate()?;
        self.blocking_calls
            .lock()
            .expect("lock")
            .push(invocation.clone());
        match self.reply(invocation) {
            Reply::Ok(out) => Ok(out),
            Reply::Fail(out) => Err(failed(invocation, out)),
            Reply::Exit(code) => Err(exited(invocation, code)),
            Reply::Hang => anyhow::bail!("blocking call cannot hang"),
        }
    }
}

// ── Recording command runner ─────────────────────────────────────────────────

/// One recorded process execution.
#[derive(Debug, Clone)]
pub struct RunnerCall {
    pub method: &'static str,
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub stdin: Option<Vec<u8>>,
}

type RunnerReply = Box<dyn Fn(&[String]) -> Result<Output>>;

/// `CommandRunner` that records calls and answers with a canned `Output`.
pub struct RecordingRunner {
    reply: RunnerReply,
    calls: Mutex<Vec<RunnerCall>>,
}

impl RecordingRunner {
    pub fn new(reply: impl Fn(&[String]) -> Result<Output> + 'static) -> Self {
        Self {
            reply: Box::new(reply),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RunnerCall> {
        self.calls.lock().expect("lock").clone()
    }

    fn record(
        &self,
        method: &'static str,
        program: &str,
        args: &[String],
        env: &EnvVars,
        stdin: Option<&[u8]>,
    ) -> Result<Output> {
        self.calls.lock().expect("lock").push(RunnerCall {
            method,
            program: program.to_string(),
            args: args.to_vec(),
            env: env.to_vec(),
            stdin: stdin.map(<[u8]>::to_vec),
        });
        (self.reply)(args)
    }
}

impl CommandRunner for RecordingRunner {
    async fn run(&self, program: &str, args: &[String], env: &EnvVars) -> Result<Output> {
        self.record("run", program, args, env, None)
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[String],
        env: &EnvVars,
        _timeout: Duration,
    ) -> Result<Output> {
        self.record("run_with_timeout", program, args, env, None)
    }

    async fn run_with_stdin(
        &self,
        program: &str,
        args: &[String],
        env: &EnvVars,
        stdin: &[u8],
    ) -> Result<Output> {
        self.record("run_with_stdin", program, args, env, Some(stdin))
    }

    async fn run_status(&self, program: &str, args: &[String], env: &EnvVars) -> Result<ExitStatus> {
        self.record("run_status", program, args, env, None)
            .map(|o| o.status)
    }

    fn run_blocking(&self, program: &str, args: &[String], env: &EnvVars) -> Result<Output> {
        self.record("run_blocking", program, args, env, None)
    }
}

// ── In-memory template store ─────────────────────────────────────────────────

pub struct MemoryTemplateStore {
    template: Template,
}

impl MemoryTemplateStore {
    pub fn new(template: Template) -> Self {
        Self { template }
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn load_or_init(&self) -> Result<Template> {
        Ok(self.template.clone())
    }
}

// ── Recording reporter ───────────────────────────────────────────────────────

/// Reporter that records events as `"step: …"`, `"success: …"`, `"warn: …"`.
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("lock").clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix("warn: ").map(str::to_string))
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.events.lock().expect("lock").push(format!("step: {message}"));
    }

    fn success(&self, message: &str) {
        self.events
            .lock()
            .expect("lock")
            .push(format!("success: {message}"));
    }

    fn warn(&self, message: &str) {
        self.events.lock().expect("lock").push(format!("warn: {message}"));
    }
}
