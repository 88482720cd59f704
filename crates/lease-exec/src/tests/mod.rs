//! Crate-level test doubles and BDD tests.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use crate::environment::Environment;
use crate::error::ExecError;
use crate::process::{ScriptExecutor, ScriptInvocation};
use crate::properties::Properties;


/// Configuration with one script per action, mirroring a typical deployment.
pub(crate) fn exec_config() -> Properties {
    [
        ("exec.join", "join.sh"),
        ("exec.leave", "leave.sh -s"),
        ("exec.modify", "modify.sh -a -h"),
        ("exec.renew", "renew.sh -g"),
        ("exec.status", "status.sh"),
    ]
    .into_iter()
    .collect()
}

/// What a [`RecordingExecutor`] saw for one call.
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub(crate) argv: Vec<String>,
    pub(crate) environment: Environment,
    pub(crate) working_dir: Option<PathBuf>,
}

/// Replies with a fixed status text and records every invocation.
#[derive(Debug, Default)]
pub(crate) struct RecordingExecutor {
    reply: String,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingExecutor {
    pub(crate) fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn last_call(&self) -> RecordedCall {
        self.calls().pop().expect("executor was not called")
    }
}

impl ScriptExecutor for RecordingExecutor {
    fn execute(&self, invocation: ScriptInvocation) -> Result<String, ExecError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                argv: invocation.argv().to_vec(),
                environment: invocation.environment().clone(),
                working_dir: invocation.working_dir().map(PathBuf::from),
            });
        Ok(self.reply.clone())
    }
}

/// Fails every call as if the script could not be started.
pub(crate) struct SpawnFailureExecutor;

impl ScriptExecutor for SpawnFailureExecutor {
    fn execute(&self, invocation: ScriptInvocation) -> Result<String, ExecError> {
        Err(ExecError::Spawn {
            program: invocation.argv().first().cloned().unwrap_or_default(),
            source: Arc::new(std::io::Error::from(std::io::ErrorKind::NotFound)),
        })
    }
}
