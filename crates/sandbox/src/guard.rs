// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! RAII guard that stops a sandbox when it goes out of scope.
//!
//! The sandbox is acquired once at pipeline start. Wrapping it in a
//! [`SandboxGuard`] ties its release to the scope of the pipeline run, so
//! an early `?` return or a panic still stops the container.

use crate::{Sandbox, SandboxError};
use std::ops::{Deref, DerefMut};

/// Owns a sandbox and stops it on drop.
///
/// # Example
/// ```no_run
/// use sandbox::{DockerSandbox, DockerSpec, SandboxGuard};
///
/// let spec = DockerSpec::gpu("trtllm:latest", "llm-benchmark", "/data/bench");
/// let mut guard = SandboxGuard::new(DockerSandbox::start(&spec)?);
/// // ... use &mut *guard as a Sandbox ...
/// guard.release()?; // or let it drop
/// # Ok::<(), sandbox::SandboxError>(())
/// ```
pub struct SandboxGuard<S: Sandbox> {
    /// Wrapped in `Option` so `release()` can take it before drop.
    inner: Option<S>,
}

impl<S: Sandbox> SandboxGuard<S> {
    pub fn new(sandbox: S) -> Self {
        Self {
            inner: Some(sandbox),
        }
    }

    /// Stops the sandbox now, reporting any error.
    pub fn release(mut self) -> Result<(), SandboxError> {
        match self.inner.take() {
            Some(mut sandbox) => sandbox.stop(),
            None => Ok(()),
        }
    }
}

impl<S: Sandbox> Deref for SandboxGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.inner.as_ref().expect("sandbox already released")
    }
}

impl<S: Sandbox> DerefMut for SandboxGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        self.inner.as_mut().expect("sandbox already released")
    }
}

impl<S: Sandbox> Drop for SandboxGuard<S> {
    fn drop(&mut self) {
        if let Some(mut sandbox) = self.inner.take() {
            if let Err(e) = sandbox.stop() {
                tracing::error!("failed to stop sandbox '{}': {e}", sandbox.id());
            }
        }
    }
}

impl<S: Sandbox + std::fmt::Debug> std::fmt::Debug for SandboxGuard<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SandboxGuard")
            .field("inner", &self.inner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CommandLine, ExecOptions, ExecOutput};
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingSandbox {
        stops: Rc<Cell<u32>>,
    }

    impl Sandbox for CountingSandbox {
        fn id(&self) -> &str {
            "counting"
        }

        fn execute(
            &mut self,
            _cmd: &CommandLine,
            _opts: &ExecOptions,
        ) -> Result<ExecOutput, SandboxError> {
            Ok(ExecOutput::new(0, Vec::new()))
        }

        fn stop(&mut self) -> Result<(), SandboxError> {
            self.stops.set(self.stops.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_drop_stops_once() {
        let stops = Rc::new(Cell::new(0));
        {
            let mut guard = SandboxGuard::new(CountingSandbox {
                stops: Rc::clone(&stops),
            });
            guard
                .run(&CommandLine::new("true"), &ExecOptions::default())
                .unwrap();
        }
        assert_eq!(stops.get(), 1);
    }

    #[test]
    fn test_release_stops_once() {
        let stops = Rc::new(Cell::new(0));
        let guard = SandboxGuard::new(CountingSandbox {
            stops: Rc::clone(&stops),
        });
        guard.release().unwrap();
        assert_eq!(stops.get(), 1);
    }

    #[test]
    fn test_stops_on_early_return() {
        fn failing_stage(sb: &mut dyn Sandbox) -> Result<(), String> {
            sb.run(&CommandLine::new("true"), &ExecOptions::default())
                .map_err(|e| e.to_string())?;
            Err("stage failed".into())
        }

        let stops = Rc::new(Cell::new(0));
        let result = (|| {
            let mut guard = SandboxGuard::new(CountingSandbox {
                stops: Rc::clone(&stops),
            });
            failing_stage(&mut *guard)
        })();
        assert!(result.is_err());
        assert_eq!(stops.get(), 1);
    }
}
