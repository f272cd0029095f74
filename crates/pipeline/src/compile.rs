// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Compile stage: checkpoint conversion and engine build.
//!
//! Work is keyed by [`ArtifactKey`]. A key whose engine already exists is
//! skipped, so a second run after a successful one builds nothing. The
//! intermediate checkpoint tree is owned by a [`CheckpointScope`] and
//! deleted once when the stage ends, whether it ends normally or with an
//! error.

use artifacts::{ArtifactKey, ArtifactLayout, ArtifactStage, CheckpointScope};
use bench_config::{BenchConfig, ModelSpec};
use sandbox::Sandbox;
use tracing::{info, warn};

use crate::commands::CommandBuilder;
use crate::{CommandOutcome, PipelineError};

/// One (model, TP size) pair the compile stage considers.
#[derive(Debug, Clone)]
pub struct CompileTask<'a> {
    pub model: &'a ModelSpec,
    pub key: ArtifactKey,
    /// `true` if the engine already exists and the task will be skipped.
    pub cached: bool,
}

/// Lists every compile task in execution order with its cache status.
pub fn plan_compile<'a>(config: &'a BenchConfig, layout: &ArtifactLayout) -> Vec<CompileTask<'a>> {
    config
        .enabled_models()
        .flat_map(|model| {
            model.tp_sizes.iter().map(move |&tp_size| {
                let key = ArtifactKey::new(&model.name, tp_size, model.precision);
                let cached = layout.exists(&key, ArtifactStage::Engine);
                CompileTask { model, key, cached }
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileOutcome {
    /// The engine was already built.
    Skipped,
    Built,
    /// Conversion or build exited non-zero.
    Failed {
        convert: CommandOutcome,
        build: CommandOutcome,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileReport {
    pub entries: Vec<(ArtifactKey, CompileOutcome)>,
    /// Whether the checkpoint tree was deleted through the sandbox.
    pub checkpoints_removed: bool,
}

impl CompileReport {
    pub fn built(&self) -> usize {
        self.count(|o| *o == CompileOutcome::Built)
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| *o == CompileOutcome::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, CompileOutcome::Failed { .. }))
    }

    fn count(&self, wanted: impl Fn(&CompileOutcome) -> bool) -> usize {
        self.entries.iter().filter(|(_, o)| wanted(o)).count()
    }
}

/// Converts and builds every engine that does not exist yet.
///
/// A failed conversion is logged and the build is still attempted; a
/// failed build is logged and the stage moves on.
pub fn compile_engines(
    config: &BenchConfig,
    layout: &ArtifactLayout,
    sandbox: &mut dyn Sandbox,
) -> Result<CompileReport, PipelineError> {
    let builder = CommandBuilder::new(config, layout);
    let env = builder.env();
    let scope = CheckpointScope::acquire(layout.checkpoints_root());
    let mut report = CompileReport::default();

    for task in plan_compile(config, layout) {
        let CompileTask { model, key, cached } = task;
        if cached {
            info!("engine {key} exists, skipping");
            report.entries.push((key, CompileOutcome::Skipped));
            continue;
        }

        info!("converting checkpoint {key}");
        let out = env.run(sandbox, model.family, builder.convert_command(model, key.tp_size))?;
        let convert = CommandOutcome::of(&out);
        if !convert.is_success() {
            warn!("checkpoint conversion for {key} failed ({convert}); building anyway");
        }

        info!("building engine {key}");
        let out = env.run(sandbox, model.family, builder.build_command(model, key.tp_size)?)?;
        let build = CommandOutcome::of(&out);

        let outcome = if convert.is_success() && build.is_success() {
            CompileOutcome::Built
        } else {
            if !build.is_success() {
                warn!("engine build for {key} failed ({build})");
            }
            CompileOutcome::Failed { convert, build }
        };
        report.entries.push((key, outcome));
    }

    report.checkpoints_removed = scope.release(sandbox);
    info!(
        "compile stage done: {} built, {} skipped, {} failed",
        report.built(),
        report.skipped(),
        report.failed(),
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sample_config;

    #[test]
    fn test_plan_reports_cache_status() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().to_str().unwrap();
        let config = sample_config(base);
        let layout = ArtifactLayout::new(base);

        let plan = plan_compile(&config, &layout);
        assert_eq!(plan.len(), 4);
        assert!(plan.iter().all(|t| !t.cached));

        let engine = layout.engine_file(&plan[1].key);
        std::fs::create_dir_all(engine.parent().unwrap()).unwrap();
        std::fs::write(&engine, b"").unwrap();

        let plan = plan_compile(&config, &layout);
        assert!(!plan[0].cached);
        assert!(plan[1].cached);
        assert_eq!(plan[1].key.to_string(), "llama-7b/tp_2/float16");
    }
}
