//! Notification sinks
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Add CommandSink with bounded execution time
//! - 1.0.0: LogSink

use async_trait::async_trait;
use log::{debug, info};
use std::time::Duration;
use tokio::process::Command;

use super::{NotificationIntent, APP_NAME};
use crate::core::DeliveryError;

/// Default upper bound for a notifier process
const COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers notification intents.
///
/// Implementations report failures through [`DeliveryError`]; callers log and
/// discard them.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &'static str;

    async fn notify(&self, intent: &NotificationIntent) -> Result<(), DeliveryError>;
}

/// Writes notifications to the log. Used when no desktop notifier is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, intent: &NotificationIntent) -> Result<(), DeliveryError> {
        info!(
            "Notification: {} - {}",
            intent.title,
            intent.body.replace('\n', " | ")
        );
        Ok(())
    }
}

/// Runs an external notifier program (e.g. `notify-send`) with title and body
/// appended as the last two arguments.
#[derive(Debug, Clone)]
pub struct CommandSink {
    program: String,
    args: Vec<String>,
    app_name_flag: Option<String>,
    timeout: Duration,
}

impl CommandSink {
    /// Build from a command line such as `notify-send -a campus`
    ///
    /// Returns None for an empty command line.
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            app_name_flag: None,
            timeout: COMMAND_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Pass [`APP_NAME`] with this flag on every call (`-a` for notify-send)
    pub fn with_app_name_flag(mut self, flag: impl Into<String>) -> Self {
        self.app_name_flag = Some(flag.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument list for one notification: configured args, optional
    /// app name, then title and body
    pub fn command_args(&self, intent: &NotificationIntent) -> Vec<String> {
        let mut args = self.args.clone();
        if let Some(flag) = &self.app_name_flag {
            args.push(flag.clone());
            args.push(APP_NAME.to_string());
        }
        args.push(intent.title.clone());
        args.push(intent.body.clone());
        args
    }
}

#[async_trait]
impl NotificationSink for CommandSink {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn notify(&self, intent: &NotificationIntent) -> Result<(), DeliveryError> {
        let mut command = Command::new(&self.program);
        command.args(self.command_args(intent)).kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(DeliveryError::new(
                    self.name(),
                    format!("failed to run {}: {e}", self.program),
                ))
            }
            Err(_) => {
                return Err(DeliveryError::new(
                    self.name(),
                    format!("{} timed out after {:?}", self.program, self.timeout),
                ))
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DeliveryError::new(
                self.name(),
                format!("{} exited with {}: {}", self.program, output.status, stderr.trim()),
            ));
        }

        debug!("Notification delivered via {}: {}", self.program, intent.title);
        Ok(())
    }
}
