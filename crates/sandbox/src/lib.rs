// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # sandbox
//!
//! The execution sandbox adapter: "run this command in the isolated
//! environment and give me back its exit status and output".
//!
//! - [`Sandbox`]: the trait the pipeline depends on.
//! - [`CommandLine`]: a structured program + argv, never shell-interpolated,
//!   with secret masking for logs.
//! - [`DockerSandbox`]: a long-lived container driven through `docker exec`.
//! - [`HostSandbox`]: runs commands directly on the host.
//! - [`SandboxGuard`]: scoped acquisition: the sandbox is stopped when the
//!   guard drops, including on error paths.
//!
//! # Example
//! ```no_run
//! use sandbox::{CommandLine, ExecOptions, HostSandbox, Sandbox, SandboxGuard};
//!
//! let mut sb = SandboxGuard::new(HostSandbox::new());
//! let out = sb.run(&CommandLine::new("nvidia-smi"), &ExecOptions::default()).unwrap();
//! println!("exit={} {}", out.exit_code, out.text());
//! ```

mod command;
mod docker;
mod error;
mod exec;
mod guard;
mod host;

pub use command::CommandLine;
pub use docker::{DockerSandbox, DockerSpec};
pub use error::SandboxError;
pub use exec::{ExecOptions, ExecOutput, Sandbox};
pub use guard::SandboxGuard;
pub use host::HostSandbox;
