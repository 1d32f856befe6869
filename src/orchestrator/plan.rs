use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use crate::client::DynGenAiClient;
use crate::config::ModelSettings;
use crate::imagery;
use crate::planner::{self, DailyPlan, MealSlot};

/// Message shown when the plan fetch fails; the underlying detail is logged.
pub const PLAN_FAILURE_MESSAGE: &str = "调取 AI 专家库失败了，可能是网络开小差。";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlanStatus {
    #[default]
    Idle,
    Loading,
    ImagesLoading,
    Ready,
    Error,
}

impl PlanStatus {
    pub fn is_fetching(self) -> bool {
        matches!(self, PlanStatus::Loading | PlanStatus::ImagesLoading)
    }
}

/// Observable state of the plan flow. The previous plan is retained while a
/// refresh is in flight; renderers decide what to show.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanSnapshot {
    pub status: PlanStatus,
    pub plan: Option<DailyPlan>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A cycle was already in flight; the trigger was ignored.
    AlreadyRunning,
    Ready,
    Failed,
}

/// Sequences plan fetch → per-recipe image fetch, publishing every
/// incremental update through a watch channel.
///
/// One cycle at a time: a trigger while fetching is suppressed rather than
/// cancelling the in-flight sequence.
pub struct PlanOrchestrator {
    client: Arc<DynGenAiClient>,
    models: ModelSettings,
    state: watch::Sender<PlanSnapshot>,
}

impl PlanOrchestrator {
    pub fn new(client: Arc<DynGenAiClient>, models: ModelSettings) -> Self {
        let (state, _) = watch::channel(PlanSnapshot::default());
        Self {
            client,
            models,
            state,
        }
    }

    pub fn snapshot(&self) -> PlanSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlanSnapshot> {
        self.state.subscribe()
    }

    pub async fn refresh(&self) -> RefreshOutcome {
        let started = self.state.send_if_modified(|snapshot| {
            if snapshot.status.is_fetching() {
                return false;
            }
            snapshot.status = PlanStatus::Loading;
            snapshot.error = None;
            true
        });
        if !started {
            return RefreshOutcome::AlreadyRunning;
        }

        let date = planner::today_zh();
        let plan = match planner::fetch_daily_plan(self.client.as_ref(), &self.models, &date).await
        {
            Ok(plan) => plan,
            Err(error) => {
                warn!(%error, "daily plan fetch failed");
                self.state.send_modify(|snapshot| {
                    snapshot.status = PlanStatus::Error;
                    snapshot.error = Some(PLAN_FAILURE_MESSAGE.to_string());
                });
                return RefreshOutcome::Failed;
            }
        };

        let prompts: Vec<(MealSlot, String)> = MealSlot::ALL
            .iter()
            .map(|&slot| (slot, plan.recipe(slot).image_prompt.clone()))
            .collect();

        self.state.send_modify(|snapshot| {
            snapshot.plan = Some(plan);
            snapshot.status = PlanStatus::ImagesLoading;
        });

        // Sequential on purpose: each resolved image is revealed before the
        // next request is issued.
        for (slot, prompt) in prompts {
            let url = imagery::fetch_recipe_image(self.client.as_ref(), &self.models, &prompt).await;
            self.state.send_modify(|snapshot| {
                if let Some(plan) = snapshot.plan.as_mut() {
                    plan.recipe_mut(slot).image_url = Some(url);
                }
            });
        }

        self.state
            .send_modify(|snapshot| snapshot.status = PlanStatus::Ready);
        RefreshOutcome::Ready
    }
}
