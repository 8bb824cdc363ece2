use std::sync::Arc;

use fxhash::FxHashMap;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::PlanError;
use crate::planner::{DayPlanner, Plan, PlanRequest};

type PlanSlot = Arc<RwLock<Option<Result<Plan, PlanError>>>>;

struct PlanningSession {
    task: Option<JoinHandle<()>>,
    latest: PlanSlot,
}

/// Named planning sessions. Resubmitting a session aborts the in-flight
/// run and installs a fresh result slot, so a superseded run's partial
/// output can never surface: latest input wins.
pub struct PlannerManager {
    planner: Arc<DayPlanner>,
    sessions: RwLock<FxHashMap<String, PlanningSession>>,
}

impl PlannerManager {
    pub fn new(planner: DayPlanner) -> Self {
        PlannerManager {
            planner: Arc::new(planner),
            sessions: RwLock::new(FxHashMap::default()),
        }
    }

    pub async fn submit(&self, session_id: &str, request: PlanRequest) {
        let mut sessions = self.sessions.write().await;

        if let Some(previous) = sessions.remove(session_id) {
            if let Some(task) = previous.task {
                task.abort();
            }
            debug!(session_id, "superseded in-flight planning task");
        }

        let latest: PlanSlot = Arc::new(RwLock::new(None));
        let slot = Arc::clone(&latest);
        let planner = Arc::clone(&self.planner);
        let task = tokio::spawn(async move {
            let result = planner.plan(request).await;
            *slot.write().await = Some(result);
        });

        sessions.insert(
            session_id.to_string(),
            PlanningSession {
                task: Some(task),
                latest,
            },
        );
    }

    pub async fn cancel(&self, session_id: &str) {
        if let Some(session) = self.sessions.write().await.remove(session_id) {
            if let Some(task) = session.task {
                task.abort();
            }
            debug!(session_id, "cancelled planning session");
        }
    }

    pub async fn current_plan(&self, session_id: &str) -> Option<Result<Plan, PlanError>> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(session_id)?;
        let latest = session.latest.read().await;
        latest.clone()
    }

    /// Awaits the latest submitted task for the session, then returns its
    /// result. Mostly useful for tests and batch callers.
    pub async fn wait(&self, session_id: &str) -> Option<Result<Plan, PlanError>> {
        let task = {
            let mut sessions = self.sessions.write().await;
            sessions.get_mut(session_id)?.task.take()
        };

        if let Some(task) = task {
            // An aborted task resolves with a cancellation error; the slot
            // it would have written to is already unreachable.
            let _ = task.await;
        }

        self.current_plan(session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{self, hm};

    fn request(ids: &[&str]) -> PlanRequest {
        PlanRequest {
            stops: ids
                .iter()
                .enumerate()
                .map(|(index, id)| test_utils::visit(id, 50.85 + index as f64 * 0.01, 4.35))
                .collect(),
            start_time: hm("08:00"),
            return_destination: None,
        }
    }

    #[tokio::test]
    async fn test_submit_and_wait_returns_the_plan() {
        let manager = PlannerManager::new(DayPlanner::new(test_utils::fixed_client(2.0, 10.0)));

        manager.submit("day-1", request(&["a", "b"])).await;
        let plan = manager.wait("day-1").await.unwrap().unwrap();

        assert_eq!(plan.ordered_stops.len(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_session_has_no_result() {
        let manager = PlannerManager::new(DayPlanner::new(test_utils::fixed_client(2.0, 10.0)));

        manager.submit("day-1", request(&["a", "b", "c"])).await;
        manager.cancel("day-1").await;

        assert!(manager.current_plan("day-1").await.is_none());
        assert!(manager.wait("day-1").await.is_none());
    }

    #[tokio::test]
    async fn test_resubmission_wins_over_the_earlier_request() {
        let manager = PlannerManager::new(DayPlanner::new(test_utils::fixed_client(2.0, 10.0)));

        manager.submit("day-1", request(&["a", "b", "c"])).await;
        manager.submit("day-1", request(&["x", "y"])).await;

        let plan = manager.wait("day-1").await.unwrap().unwrap();
        let ids: Vec<&str> = plan.ordered_stops.iter().map(|stop| stop.id()).collect();

        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"x"));
        assert!(ids.contains(&"y"));
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let manager = PlannerManager::new(DayPlanner::new(test_utils::fixed_client(2.0, 10.0)));

        manager.submit("day-1", request(&["a"])).await;
        manager.submit("day-2", request(&["b", "c"])).await;

        let first = manager.wait("day-1").await.unwrap().unwrap();
        let second = manager.wait("day-2").await.unwrap().unwrap();

        assert_eq!(first.ordered_stops.len(), 1);
        assert_eq!(second.ordered_stops.len(), 2);
    }
}
