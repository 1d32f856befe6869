use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::oneshot;

use crate::advisor::ChatRole;
use crate::client::{
    ContentStream, GenAiClient, GenAiError, GenerateContentRequest, GenerateContentResponse,
};
use crate::config::ModelSettings;
use crate::imagery::PLACEHOLDER_IMAGE_URL;

use super::{
    CHAT_APOLOGY, CHAT_GREETING, ChatOrchestrator, PLAN_FAILURE_MESSAGE, PlanOrchestrator,
    PlanStatus, RefreshOutcome, SubmitOutcome,
};

const PLAN_MODEL: &str = "plan-model";
const CHAT_MODEL: &str = "chat-model";
const IMAGE_MODEL: &str = "image-model";

fn models() -> ModelSettings {
    ModelSettings {
        plan: PLAN_MODEL.to_string(),
        chat: CHAT_MODEL.to_string(),
        image: IMAGE_MODEL.to_string(),
    }
}

/// Scripted collaborator: queued responses per endpoint, recorded calls, and
/// optional one-shot gates so tests can hold a request in flight.
#[derive(Default)]
struct FakeService {
    plan_results: Mutex<Vec<Result<GenerateContentResponse, GenAiError>>>,
    image_results: Mutex<Vec<Result<GenerateContentResponse, GenAiError>>>,
    stream_results: Mutex<Vec<Result<ContentStream, GenAiError>>>,
    calls: Mutex<Vec<String>>,
    image_gate: Mutex<Option<oneshot::Receiver<()>>>,
    stream_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeService {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn queue_plan(&self, result: Result<GenerateContentResponse, GenAiError>) {
        self.plan_results.lock().unwrap().push(result);
    }

    fn queue_image(&self, result: Result<GenerateContentResponse, GenAiError>) {
        self.image_results.lock().unwrap().push(result);
    }

    fn queue_stream(&self, result: Result<ContentStream, GenAiError>) {
        self.stream_results.lock().unwrap().push(result);
    }

    /// Holds the next image request until the returned sender fires.
    fn gate_images(&self) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        *self.image_gate.lock().unwrap() = Some(gate);
        release
    }

    /// Holds the next stream request until the returned sender fires.
    fn gate_stream(&self) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        *self.stream_gate.lock().unwrap() = Some(gate);
        release
    }

    fn image_call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|model| model.as_str() == IMAGE_MODEL)
            .count()
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GenAiClient for FakeService {
    async fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenAiError> {
        self.calls.lock().unwrap().push(request.model.clone());
        if request.model == IMAGE_MODEL {
            let gate = self.image_gate.lock().unwrap().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            self.image_results.lock().unwrap().remove(0)
        } else {
            self.plan_results.lock().unwrap().remove(0)
        }
    }

    async fn stream_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<ContentStream, GenAiError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("stream:{}", request.model));
        let gate = self.stream_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.stream_results.lock().unwrap().remove(0)
    }
}

fn recipe_json(title: &str) -> serde_json::Value {
    json!({
        "title": title,
        "ingredients": ["小米", "南瓜"],
        "cookingMethod": "同煮四十分钟。",
        "benefits": "健脾养胃。",
        "imagePrompt": format!("photo of {title}")
    })
}

fn plan_response(tip: &str) -> GenerateContentResponse {
    let payload = json!({
        "breakfast": recipe_json("小米南瓜粥"),
        "lunch": recipe_json("清蒸鲈鱼"),
        "dinner": recipe_json("冬瓜虾皮汤"),
        "dailyTip": tip
    })
    .to_string();

    serde_json::from_value(json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": payload}]},
            "finishReason": "STOP"
        }]
    }))
    .unwrap()
}

fn image_response(data: &str) -> GenerateContentResponse {
    serde_json::from_value(json!({
        "candidates": [{
            "content": {
                "parts": [{"inlineData": {"mimeType": "image/png", "data": data}}]
            }
        }]
    }))
    .unwrap()
}

fn upstream_error() -> GenAiError {
    GenAiError::Api {
        status: 503,
        message: "overloaded".to_string(),
    }
}

fn chunk_stream(chunks: &[&str]) -> ContentStream {
    ContentStream::from_chunks(chunks.iter().map(|c| Ok(c.to_string())).collect())
}

#[tokio::test]
async fn refresh_success_resolves_plan_then_images() {
    let service = FakeService::new();
    service.queue_plan(Ok(plan_response("多喝水")));
    service.queue_image(Ok(image_response("aaa")));
    service.queue_image(Ok(image_response("bbb")));
    service.queue_image(Ok(image_response("ccc")));

    let orchestrator = PlanOrchestrator::new(service.clone(), models());
    let outcome = orchestrator.refresh().await;

    assert_eq!(outcome, RefreshOutcome::Ready);
    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.status, PlanStatus::Ready);
    assert!(snapshot.error.is_none());

    let plan = snapshot.plan.unwrap();
    assert_eq!(plan.daily_tip, "多喝水");
    assert_eq!(
        plan.breakfast.image_url.as_deref(),
        Some("data:image/png;base64,aaa")
    );
    assert_eq!(
        plan.lunch.image_url.as_deref(),
        Some("data:image/png;base64,bbb")
    );
    assert_eq!(
        plan.dinner.image_url.as_deref(),
        Some("data:image/png;base64,ccc")
    );
    assert_eq!(service.image_call_count(), 3);
}

#[tokio::test]
async fn refresh_is_suppressed_while_a_cycle_is_in_flight() {
    let service = FakeService::new();
    service.queue_plan(Ok(plan_response("多喝水")));
    service.queue_image(Ok(image_response("aaa")));
    service.queue_image(Ok(image_response("bbb")));
    service.queue_image(Ok(image_response("ccc")));
    let release = service.gate_images();

    let orchestrator = Arc::new(PlanOrchestrator::new(service.clone(), models()));
    let mut updates = orchestrator.subscribe();

    let running = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.refresh().await }
    });

    updates
        .wait_for(|snapshot| snapshot.status == PlanStatus::ImagesLoading)
        .await
        .unwrap();

    // Text is available before any image resolves.
    let snapshot = orchestrator.snapshot();
    let plan = snapshot.plan.as_ref().unwrap();
    assert_eq!(plan.daily_tip, "多喝水");
    assert!(plan.recipes().iter().all(|recipe| recipe.image_url.is_none()));

    // A trigger while fetching is ignored, not queued.
    assert_eq!(orchestrator.refresh().await, RefreshOutcome::AlreadyRunning);

    release.send(()).unwrap();
    assert_eq!(running.await.unwrap(), RefreshOutcome::Ready);
    assert_eq!(orchestrator.snapshot().status, PlanStatus::Ready);
}

#[tokio::test]
async fn plan_failure_reports_error_and_requests_no_images() {
    let service = FakeService::new();
    service.queue_plan(Err(upstream_error()));

    let orchestrator = PlanOrchestrator::new(service.clone(), models());
    let outcome = orchestrator.refresh().await;

    assert_eq!(outcome, RefreshOutcome::Failed);
    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.status, PlanStatus::Error);
    assert_eq!(snapshot.error.as_deref(), Some(PLAN_FAILURE_MESSAGE));
    assert!(snapshot.plan.is_none());
    assert_eq!(service.image_call_count(), 0);
}

#[tokio::test]
async fn failed_refresh_retains_the_previous_plan() {
    let service = FakeService::new();
    service.queue_plan(Ok(plan_response("多喝水")));
    service.queue_image(Ok(image_response("aaa")));
    service.queue_image(Ok(image_response("bbb")));
    service.queue_image(Ok(image_response("ccc")));
    service.queue_plan(Err(upstream_error()));

    let orchestrator = PlanOrchestrator::new(service.clone(), models());
    assert_eq!(orchestrator.refresh().await, RefreshOutcome::Ready);
    assert_eq!(orchestrator.refresh().await, RefreshOutcome::Failed);

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.status, PlanStatus::Error);
    assert_eq!(snapshot.error.as_deref(), Some(PLAN_FAILURE_MESSAGE));
    assert_eq!(snapshot.plan.unwrap().daily_tip, "多喝水");
}

#[tokio::test]
async fn error_state_recovers_on_the_next_trigger() {
    let service = FakeService::new();
    service.queue_plan(Err(upstream_error()));
    service.queue_plan(Ok(plan_response("少吃盐")));
    service.queue_image(Ok(image_response("aaa")));
    service.queue_image(Ok(image_response("bbb")));
    service.queue_image(Ok(image_response("ccc")));

    let orchestrator = PlanOrchestrator::new(service.clone(), models());
    assert_eq!(orchestrator.refresh().await, RefreshOutcome::Failed);
    assert_eq!(orchestrator.refresh().await, RefreshOutcome::Ready);

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.status, PlanStatus::Ready);
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.plan.unwrap().daily_tip, "少吃盐");
}

#[tokio::test]
async fn image_failure_degrades_to_placeholder_without_touching_other_recipes() {
    let service = FakeService::new();
    service.queue_plan(Ok(plan_response("多喝水")));
    service.queue_image(Ok(image_response("aaa")));
    service.queue_image(Err(upstream_error()));
    service.queue_image(Ok(image_response("ccc")));

    let orchestrator = PlanOrchestrator::new(service.clone(), models());
    assert_eq!(orchestrator.refresh().await, RefreshOutcome::Ready);

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.status, PlanStatus::Ready);

    let plan = snapshot.plan.unwrap();
    assert_eq!(
        plan.breakfast.image_url.as_deref(),
        Some("data:image/png;base64,aaa")
    );
    assert_eq!(plan.lunch.image_url.as_deref(), Some(PLACEHOLDER_IMAGE_URL));
    assert_eq!(
        plan.dinner.image_url.as_deref(),
        Some("data:image/png;base64,ccc")
    );
    assert_eq!(plan.lunch.title, "清蒸鲈鱼");
    assert_eq!(plan.breakfast.title, "小米南瓜粥");
}

#[tokio::test]
async fn chat_starts_with_the_greeting() {
    let service = FakeService::new();
    let orchestrator = ChatOrchestrator::new(service, models());

    let snapshot = orchestrator.snapshot();
    assert!(!snapshot.busy);
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(snapshot.history[0].role, ChatRole::Assistant);
    assert_eq!(snapshot.history[0].content, CHAT_GREETING);
}

#[tokio::test]
async fn chat_submit_streams_reply_into_placeholder() {
    let service = FakeService::new();
    service.queue_stream(Ok(chunk_stream(&["建议", "睡前", "泡脚"])));

    let orchestrator = ChatOrchestrator::new(service.clone(), models());
    let outcome = orchestrator.submit("晚上失眠怎么办").await;

    assert_eq!(outcome, SubmitOutcome::Completed);
    let snapshot = orchestrator.snapshot();
    assert!(!snapshot.busy);
    assert_eq!(snapshot.history.len(), 3);
    assert_eq!(snapshot.history[1].role, ChatRole::User);
    assert_eq!(snapshot.history[1].content, "晚上失眠怎么办");
    assert_eq!(snapshot.history[2].role, ChatRole::Assistant);
    assert_eq!(snapshot.history[2].content, "建议睡前泡脚");
}

#[tokio::test]
async fn chat_ignores_empty_input() {
    let service = FakeService::new();
    let orchestrator = ChatOrchestrator::new(service.clone(), models());

    assert_eq!(orchestrator.submit("   ").await, SubmitOutcome::Empty);

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.history.len(), 1);
    assert!(!snapshot.busy);
    assert_eq!(service.call_count(), 0);
}

#[tokio::test]
async fn chat_rejects_a_second_submit_while_busy() {
    let service = FakeService::new();
    service.queue_stream(Ok(chunk_stream(&["好的"])));
    let release = service.gate_stream();

    let orchestrator = Arc::new(ChatOrchestrator::new(service.clone(), models()));
    let mut updates = orchestrator.subscribe();

    let running = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.submit("每天吃多少盐合适？").await }
    });

    updates.wait_for(|snapshot| snapshot.busy).await.unwrap();
    let len_before = orchestrator.snapshot().history.len();
    assert_eq!(len_before, 3);

    assert_eq!(
        orchestrator.submit("降压操怎么配合饮食？").await,
        SubmitOutcome::Busy
    );
    assert_eq!(orchestrator.snapshot().history.len(), len_before);

    release.send(()).unwrap();
    assert_eq!(running.await.unwrap(), SubmitOutcome::Completed);
    assert!(!orchestrator.snapshot().busy);
}

#[tokio::test]
async fn chat_mid_stream_failure_keeps_partial_content_and_apologizes() {
    let service = FakeService::new();
    service.queue_stream(Ok(ContentStream::from_chunks(vec![
        Ok("建议".to_string()),
        Err(GenAiError::Stream("connection reset".to_string())),
    ])));

    let orchestrator = ChatOrchestrator::new(service, models());
    let outcome = orchestrator.submit("晚上失眠怎么办").await;

    assert_eq!(outcome, SubmitOutcome::Completed);
    let snapshot = orchestrator.snapshot();
    assert!(!snapshot.busy);
    let reply = &snapshot.history[2].content;
    assert_eq!(reply, &format!("建议\n\n{CHAT_APOLOGY}"));
}

#[tokio::test]
async fn chat_open_failure_replaces_placeholder_with_apology() {
    let service = FakeService::new();
    service.queue_stream(Err(upstream_error()));

    let orchestrator = ChatOrchestrator::new(service, models());
    let outcome = orchestrator.submit("五谷杂粮怎么搭配最养胃？").await;

    assert_eq!(outcome, SubmitOutcome::Completed);
    let snapshot = orchestrator.snapshot();
    assert!(!snapshot.busy);
    assert_eq!(snapshot.history[2].content, CHAT_APOLOGY);
}
