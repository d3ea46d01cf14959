use std::collections::{HashMap, HashSet};

use mercato_core::{MercatoError, PipelineMetadata, PipelineReport, PipelineTask};
use tokio::time::Instant;

use crate::Mercato;

/// Builder for an ordered batch of routed requests.
pub struct PipelineBuilder<'a> {
    pub(crate) mercato: &'a Mercato,
    pub(crate) tasks: Vec<(String, PipelineTask)>,
}

fn resolved_name(index: usize, task: &PipelineTask) -> String {
    task.name.clone().unwrap_or_else(|| format!("task_{index}"))
}

impl<'a> PipelineBuilder<'a> {
    /// Create an empty pipeline bound to a router.
    #[must_use]
    pub const fn new(mercato: &'a Mercato) -> Self {
        Self {
            mercato,
            tasks: Vec::new(),
        }
    }

    /// Replace the task list.
    ///
    /// Unnamed tasks are keyed `task_{index}` by their position.
    ///
    /// # Errors
    /// Returns `InvalidArg` if two tasks resolve to the same name.
    pub fn tasks(mut self, tasks: &[PipelineTask]) -> Result<Self, MercatoError> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(tasks.len());
        for (i, t) in tasks.iter().enumerate() {
            let name = resolved_name(i, t);
            if !seen.insert(name.clone()) {
                return Err(MercatoError::InvalidArg(format!(
                    "duplicate task name '{name}' in pipeline"
                )));
            }
            out.push((name, t.clone()));
        }
        self.tasks = out;
        Ok(self)
    }

    /// Append one task.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the task's name is already taken.
    pub fn add_task(mut self, task: PipelineTask) -> Result<Self, MercatoError> {
        let name = resolved_name(self.tasks.len(), &task);
        if self.tasks.iter().any(|(n, _)| *n == name) {
            return Err(MercatoError::InvalidArg(format!(
                "duplicate task name '{name}' already exists in pipeline"
            )));
        }
        self.tasks.push((name, task));
        Ok(self)
    }

    /// Execute the tasks strictly in order.
    ///
    /// A failed task never stops the ones after it, and each task is routed
    /// with its own options.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "mercato::core::pipeline",
            skip(self),
            fields(tasks = self.tasks.len()),
        )
    )]
    pub async fn run(self) -> PipelineReport {
        let started = Instant::now();
        let total_tasks = self.tasks.len();
        let mut results = HashMap::with_capacity(total_tasks);
        let mut order = Vec::with_capacity(total_tasks);

        for (name, task) in self.tasks {
            let res = self
                .mercato
                .route_with(task.data_type, &task.params, &task.options())
                .await;
            results.insert(name.clone(), res);
            order.push(name);
        }

        let successful_tasks = results.values().filter(|r| r.success).count();
        #[allow(clippy::cast_precision_loss)]
        let success_rate = if total_tasks == 0 {
            0.0
        } else {
            successful_tasks as f64 / total_tasks as f64
        };

        PipelineReport {
            results,
            order,
            metadata: PipelineMetadata {
                total_tasks,
                successful_tasks,
                success_rate,
                elapsed: started.elapsed(),
            },
        }
    }
}

impl Mercato {
    /// Start building a pipeline.
    #[must_use]
    pub const fn pipeline(&self) -> PipelineBuilder<'_> {
        PipelineBuilder::new(self)
    }

    /// Run `tasks` in order and collect their results by name.
    ///
    /// # Errors
    /// Returns `InvalidArg` if two tasks resolve to the same name; nothing is
    /// executed in that case.
    pub async fn run_pipeline(
        &self,
        tasks: &[PipelineTask],
    ) -> Result<PipelineReport, MercatoError> {
        Ok(self.pipeline().tasks(tasks)?.run().await)
    }
}
