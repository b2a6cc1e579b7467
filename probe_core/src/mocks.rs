//! Test and helper peripherals for probe_core

use std::collections::VecDeque;

use probe_traits::{Command, Peripheral, Response};

/// A bus that never completes an exchange; every transact times out.
pub struct DeadBus;

impl Peripheral for DeadBus {
    fn transact(
        &mut self,
        _cmd: Command,
    ) -> Result<Response, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "dead bus",
        )))
    }
}

/// Replays a fixed list of responses and records every command it receives.
/// Once the script runs out it keeps rejecting.
#[derive(Debug, Default)]
pub struct ScriptedPeripheral {
    script: VecDeque<Response>,
    pub commands: Vec<Command>,
}

impl ScriptedPeripheral {
    pub fn new(script: impl IntoIterator<Item = Response>) -> Self {
        Self {
            script: script.into_iter().collect(),
            commands: Vec::new(),
        }
    }
}

impl Peripheral for ScriptedPeripheral {
    fn transact(
        &mut self,
        cmd: Command,
    ) -> Result<Response, Box<dyn std::error::Error + Send + Sync>> {
        self.commands.push(cmd);
        Ok(self.script.pop_front().unwrap_or(Response::rejected(0)))
    }
}
