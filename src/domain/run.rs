//! Lifecycle of a recorded run.

/// Where a run stands from the recorder's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// No pipeline-start notification seen yet
    #[default]
    NotStarted,

    /// Pipeline started; task and import notifications expected
    Running,

    /// Run-complete notification recorded (terminal)
    Finished,
}

impl RunState {
    /// Transition on a pipeline-start notification
    pub fn on_pipeline_start(self) -> Self {
        match self {
            Self::NotStarted | Self::Running => Self::Running,
            Self::Finished => Self::Finished,
        }
    }

    /// Whether the run has reached its terminal state
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }
}
