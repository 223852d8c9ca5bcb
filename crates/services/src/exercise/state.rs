use mastery_core::TaskSession;
use mastery_core::model::{SessionId, TaskId};
use mastery_core::session::SessionProgress;

use crate::progress_service::TaskReport;

/// A task session together with what has been persisted for it.
#[derive(Debug, Clone)]
pub struct Exercise {
    session: TaskSession,
    result_id: Option<i64>,
    report: Option<TaskReport>,
}

impl Exercise {
    pub(crate) fn new(session: TaskSession) -> Self {
        Self {
            session,
            result_id: None,
            report: None,
        }
    }

    #[must_use]
    pub fn session(&self) -> &TaskSession {
        &self.session
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.session.id()
    }

    #[must_use]
    pub fn task_id(&self) -> TaskId {
        self.session.task_id()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        self.session.progress()
    }

    /// Storage id of the persisted `TaskResult`, once written.
    #[must_use]
    pub fn result_id(&self) -> Option<i64> {
        self.result_id
    }

    /// Registry outcome of the final score, once reported.
    #[must_use]
    pub fn report(&self) -> Option<&TaskReport> {
        self.report.as_ref()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.report.is_some()
    }

    pub(crate) fn session_mut(&mut self) -> &mut TaskSession {
        &mut self.session
    }

    pub(crate) fn set_result_id(&mut self, id: i64) {
        self.result_id = Some(id);
    }

    pub(crate) fn set_report(&mut self, report: TaskReport) {
        self.report = Some(report);
    }

    pub(crate) fn restart(&mut self) {
        self.session.reset();
        self.result_id = None;
        self.report = None;
    }
}
