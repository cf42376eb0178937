//! Pipeline executor - runs every step of a pipeline in declaration order

use crate::{
    core::{PipelineConfig, StepExecutionResult, StepExecutionStatus, StepType},
    execution::{PipelineError, StepExecutor},
    persistence::ExtractStore,
    script::ScriptRunner,
    source::SourceFetcher,
};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Events that can occur during pipeline execution
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    PipelineStarted {
        run_id: Uuid,
        pipeline_name: String,
        step_count: usize,
    },
    StepStarted {
        run_id: Uuid,
        step_name: String,
        step_type: StepType,
    },
    StepFinished {
        run_id: Uuid,
        result: StepExecutionResult,
    },
    PipelineFinished {
        run_id: Uuid,
        succeeded: bool,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// Runs a validated pipeline against a source and the extract store.
///
/// Steps run strictly one after another. A failing DDL step aborts the run
/// immediately; any other failure is collected and reported once every step
/// has been attempted.
pub struct PipelineExecutor {
    config: PipelineConfig,
    steps: StepExecutor,
    event_handlers: Vec<EventHandler>,
}

impl PipelineExecutor {
    /// Create an executor, preparing the extract folder of `config`
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let store = ExtractStore::open(&config.extract_path())?;
        info!("Extract store: {}", store.db_path().display());

        Ok(Self {
            config,
            steps: StepExecutor::new(store, ScriptRunner::default()),
            event_handlers: Vec::new(),
        })
    }

    pub fn with_source(mut self, source: Arc<dyn SourceFetcher>) -> Self {
        self.steps = self.steps.with_source(source);
        self
    }

    pub fn with_script_runner(mut self, scripts: ScriptRunner) -> Self {
        self.steps = self.steps.with_script_runner(scripts);
        self
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &ExtractStore {
        self.steps.store()
    }

    fn emit_event(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    /// Execute the entire pipeline and return one result per step
    pub async fn execute(&self) -> Result<Vec<StepExecutionResult>, PipelineError> {
        let run_id = Uuid::new_v4();
        let pipeline_name = self.config.name();

        info!(
            "Pipeline execution started for {} version {} ({})",
            pipeline_name,
            self.config.version(),
            run_id
        );
        self.emit_event(ExecutionEvent::PipelineStarted {
            run_id,
            pipeline_name: pipeline_name.to_string(),
            step_count: self.config.steps().len(),
        });

        let mut results = Vec::with_capacity(self.config.steps().len());

        for step in self.config.steps() {
            self.emit_event(ExecutionEvent::StepStarted {
                run_id,
                step_name: step.name().to_string(),
                step_type: step.step_type(),
            });

            let result = self.steps.process(step).await;
            log_step_result(&result);
            self.emit_event(ExecutionEvent::StepFinished {
                run_id,
                result: result.clone(),
            });

            let ddl_failure = match (step.step_type(), &result.status) {
                (StepType::Ddl, StepExecutionStatus::Error) => {
                    Some(result.error_message.clone().unwrap_or_default())
                }
                _ => None,
            };
            results.push(result);

            if let Some(message) = ddl_failure {
                let err = PipelineError::DdlStepFailed {
                    step: step.name().to_string(),
                    message,
                    results,
                };
                error!("{}", err);
                self.emit_event(ExecutionEvent::PipelineFinished {
                    run_id,
                    succeeded: false,
                });
                return Err(err);
            }
        }

        let failed: Vec<String> = results
            .iter()
            .filter(|r| r.is_error())
            .map(|r| r.step_name.clone())
            .collect();

        if !failed.is_empty() {
            let err = PipelineError::StepsFailed {
                steps: failed,
                results,
            };
            error!("{}", err);
            self.emit_event(ExecutionEvent::PipelineFinished {
                run_id,
                succeeded: false,
            });
            return Err(err);
        }

        info!("Pipeline execution finished: {} ({})", pipeline_name, run_id);
        self.emit_event(ExecutionEvent::PipelineFinished {
            run_id,
            succeeded: true,
        });
        Ok(results)
    }
}

fn log_step_result(result: &StepExecutionResult) {
    match result.status {
        StepExecutionStatus::Error => error!(
            "Step {} failed with error: {}",
            result.step_name,
            result.error_message.as_deref().unwrap_or_default()
        ),
        StepExecutionStatus::Skipped => info!("Step {} was skipped.", result.step_name),
        StepExecutionStatus::Complete => {
            info!("Step {} has completed successfully.", result.step_name)
        }
    }
}
