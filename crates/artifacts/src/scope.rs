// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Scoped ownership of the intermediate checkpoint tree.
//!
//! Checkpoints are only needed between conversion and engine build. The
//! compile stage acquires a [`CheckpointScope`] before converting anything
//! and releases it once after the last build, whatever the per-model
//! outcomes were. If the scope is dropped without being released (an
//! early return or a panic), the tree is removed from the host instead.

use sandbox::{CommandLine, ExecOptions, Sandbox};
use std::path::{Path, PathBuf};

/// Guarantees deletion of the checkpoint tree on the stage's exit path.
#[derive(Debug)]
pub struct CheckpointScope {
    /// `None` once released.
    root: Option<PathBuf>,
}

impl CheckpointScope {
    /// Takes ownership of the checkpoint tree rooted at `root`.
    pub fn acquire(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        tracing::debug!("checkpoint scope acquired at {}", root.display());
        Self { root: Some(root) }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Deletes the tree through the sandbox, which owns the files it wrote.
    ///
    /// Failures are logged and reported as `false`; they never abort the
    /// caller.
    pub fn release(mut self, sandbox: &mut dyn Sandbox) -> bool {
        let Some(root) = self.root.take() else {
            return true;
        };
        tracing::info!("deleting converted checkpoints at {}", root.display());

        let cmd = CommandLine::new("rm").arg("-rf").arg(root.display().to_string());
        match sandbox.run(&cmd, &ExecOptions::default()) {
            Ok(out) if out.success() => true,
            Ok(out) => {
                tracing::warn!(
                    "checkpoint cleanup exited with {}: {}",
                    out.exit_code,
                    out.text().trim(),
                );
                false
            }
            Err(e) => {
                tracing::warn!("checkpoint cleanup could not run: {e}");
                false
            }
        }
    }
}

impl Drop for CheckpointScope {
    fn drop(&mut self) {
        let Some(root) = self.root.take() else {
            return;
        };
        tracing::warn!(
            "checkpoint scope dropped without release; removing {} from the host",
            root.display(),
        );
        match std::fs::remove_dir_all(&root) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("failed to remove {}: {e}", root.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandbox::HostSandbox;

    #[test]
    fn test_release_deletes_through_sandbox() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("checkpoints");
        std::fs::create_dir_all(root.join("m/tp_1/float16")).unwrap();
        std::fs::write(root.join("m/tp_1/float16/rank0.safetensors"), b"w").unwrap();

        let scope = CheckpointScope::acquire(&root);
        let mut sb = HostSandbox::new();
        assert!(scope.release(&mut sb));
        assert!(!root.exists());
    }

    #[test]
    fn test_release_of_missing_tree_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let scope = CheckpointScope::acquire(dir.path().join("never-created"));
        assert!(scope.release(&mut HostSandbox::new()));
    }

    #[test]
    fn test_release_failure_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let scope = CheckpointScope::acquire(dir.path().join("checkpoints"));
        let mut sb = HostSandbox::new();
        sb.stop().unwrap();
        assert!(!scope.release(&mut sb));
    }

    #[test]
    fn test_drop_without_release_removes_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("checkpoints");
        std::fs::create_dir_all(root.join("m/tp_2/fp8")).unwrap();
        {
            let scope = CheckpointScope::acquire(&root);
            assert_eq!(scope.root(), Some(root.as_path()));
        }
        assert!(!root.exists());
    }
}
