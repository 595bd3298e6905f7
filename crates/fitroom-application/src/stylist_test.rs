use crate::stylist::Stylist;
use fitroom_core::error::{FitroomError, Result};
use fitroom_core::garment::Garment;
use fitroom_core::media::ImageData;
use fitroom_core::pose::{self, find_pose};
use fitroom_core::session::SessionState;
use fitroom_core::synthesis::SynthesisClient;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

// Scripted mock client: each call pops the next queued response and counts
// how often each operation was invoked.
struct MockSynthesisClient {
    responses: Mutex<VecDeque<Result<String>>>,
    model_calls: AtomicUsize,
    outfit_calls: AtomicUsize,
    pose_calls: AtomicUsize,
}

impl MockSynthesisClient {
    fn new(responses: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            model_calls: AtomicUsize::new(0),
            outfit_calls: AtomicUsize::new(0),
            pose_calls: AtomicUsize::new(0),
        })
    }

    fn next_response(&self) -> Result<String> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("mock client ran out of scripted responses")
    }

    fn total_calls(&self) -> usize {
        self.model_calls.load(Ordering::SeqCst)
            + self.outfit_calls.load(Ordering::SeqCst)
            + self.pose_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SynthesisClient for MockSynthesisClient {
    async fn generate_model_image(&self, _photo: &ImageData) -> Result<String> {
        self.model_calls.fetch_add(1, Ordering::SeqCst);
        self.next_response()
    }

    async fn generate_outfit_image(
        &self,
        base_image_url: &str,
        _garment_image: &ImageData,
        _garment_name: &str,
        _pose_instruction: &str,
    ) -> Result<String> {
        assert!(!base_image_url.is_empty());
        self.outfit_calls.fetch_add(1, Ordering::SeqCst);
        self.next_response()
    }

    async fn generate_pose_variation(
        &self,
        base_image_url: &str,
        _pose_instruction: &str,
    ) -> Result<String> {
        assert!(!base_image_url.is_empty());
        self.pose_calls.fetch_add(1, Ordering::SeqCst);
        self.next_response()
    }
}

// Mock client whose outfit calls block until the test releases them, for
// exercising the single-flight guard.
struct BlockingSynthesisClient {
    gate: tokio::sync::Semaphore,
}

#[async_trait::async_trait]
impl SynthesisClient for BlockingSynthesisClient {
    async fn generate_model_image(&self, _photo: &ImageData) -> Result<String> {
        Ok("model_v1.png".to_string())
    }

    async fn generate_outfit_image(
        &self,
        _base_image_url: &str,
        _garment_image: &ImageData,
        _garment_name: &str,
        _pose_instruction: &str,
    ) -> Result<String> {
        let _permit = self.gate.acquire().await.unwrap();
        Ok("outfit_v1.png".to_string())
    }

    async fn generate_pose_variation(
        &self,
        _base_image_url: &str,
        _pose_instruction: &str,
    ) -> Result<String> {
        Ok("pose_v1.png".to_string())
    }
}

fn photo() -> ImageData {
    ImageData {
        mime: "image/jpeg".to_string(),
        bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
    }
}

fn garment(id: &str, name: &str) -> Garment {
    Garment::from_url(id, name, format!("https://example.com/{id}.png"))
}

fn garment_image() -> ImageData {
    ImageData {
        mime: "image/png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}

#[tokio::test]
async fn model_generation_seeds_base_layer() {
    let client = MockSynthesisClient::new(vec![Ok("model_v1.png".to_string())]);
    let stylist = Stylist::new(client.clone());

    stylist.start_model_generation(&photo()).await.unwrap();

    let session = stylist.session().await;
    assert_eq!(session.state, SessionState::ModelReady);
    assert_eq!(session.history.len(), 1);
    assert!(session.history[0].garment.is_none());
    assert_eq!(
        session.history[0].pose_image(pose::default_pose().name),
        Some("model_v1.png")
    );
    assert_eq!(session.error, None);
    assert_eq!(client.model_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn model_generation_failure_returns_to_empty() {
    let client = MockSynthesisClient::new(vec![Err(FitroomError::remote(
        Some(500),
        "internal provider error",
    ))]);
    let stylist = Stylist::new(client);

    let err = stylist.start_model_generation(&photo()).await.unwrap_err();
    assert!(err.is_remote());

    let session = stylist.session().await;
    assert_eq!(session.state, SessionState::Empty);
    assert!(session.history.is_empty());
    let message = session.error.unwrap();
    assert!(message.starts_with("Failed to create model"));
}

#[tokio::test]
async fn model_generation_requires_empty_session() {
    let client = MockSynthesisClient::new(vec![Ok("model_v1.png".to_string())]);
    let stylist = Stylist::new(client);

    stylist.start_model_generation(&photo()).await.unwrap();
    let err = stylist.start_model_generation(&photo()).await.unwrap_err();
    assert!(err.is_invalid_state());
}

#[tokio::test]
async fn each_successful_selection_appends_one_layer() {
    let client = MockSynthesisClient::new(vec![
        Ok("model_v1.png".to_string()),
        Ok("outfit_v1.png".to_string()),
        Ok("outfit_v2.png".to_string()),
        Ok("outfit_v3.png".to_string()),
    ]);
    let stylist = Stylist::new(client);
    stylist.start_model_generation(&photo()).await.unwrap();

    for (id, name) in [("tee", "Tee"), ("jacket", "Jacket"), ("scarf", "Scarf")] {
        stylist
            .select_garment(garment(id, name), &garment_image())
            .await
            .unwrap();
    }

    let session = stylist.session().await;
    // 1 base layer + one layer per successful selection.
    assert_eq!(session.history.len(), 4);
    assert!(session.history[0].garment.is_none());
    assert_eq!(session.state, SessionState::Styled);
    assert_eq!(session.displayed_image_url(), Some("outfit_v3.png"));
}

#[tokio::test]
async fn reselecting_a_removed_garment_synthesizes_again() {
    let client = MockSynthesisClient::new(vec![
        Ok("model_v1.png".to_string()),
        Ok("outfit_v1.png".to_string()),
        Ok("outfit_v2.png".to_string()),
    ]);
    let stylist = Stylist::new(client.clone());
    stylist.start_model_generation(&photo()).await.unwrap();

    stylist
        .select_garment(garment("tee", "Tee"), &garment_image())
        .await
        .unwrap();
    assert_eq!(client.outfit_calls.load(Ordering::SeqCst), 1);

    stylist.remove_last_garment().await.unwrap().unwrap();

    // No undo cache: the same garment costs a fresh synthesis call.
    stylist
        .select_garment(garment("tee", "Tee"), &garment_image())
        .await
        .unwrap();
    assert_eq!(client.outfit_calls.load(Ordering::SeqCst), 2);

    let session = stylist.session().await;
    assert_eq!(session.history.len(), 2);
    assert_eq!(session.displayed_image_url(), Some("outfit_v2.png"));
}

#[tokio::test]
async fn garment_failure_leaves_history_unchanged() {
    let client = MockSynthesisClient::new(vec![
        Ok("model_v1.png".to_string()),
        Err(FitroomError::network("connection reset")),
    ]);
    let stylist = Stylist::new(client);
    stylist.start_model_generation(&photo()).await.unwrap();

    let err = stylist
        .select_garment(garment("shirt1", "Shirt"), &garment_image())
        .await
        .unwrap_err();
    assert!(err.is_network());

    let session = stylist.session().await;
    assert_eq!(session.state, SessionState::ModelReady);
    assert_eq!(session.history.len(), 1);
    assert!(session.error.as_deref().unwrap().starts_with("Failed to apply Shirt"));
    // The displayed image reverts to the last successful layer.
    assert_eq!(session.displayed_image_url(), Some("model_v1.png"));
}

#[tokio::test]
async fn cached_pose_switches_without_network() {
    let client = MockSynthesisClient::new(vec![
        Ok("model_v1.png".to_string()),
        Ok("side_v1.png".to_string()),
    ]);
    let stylist = Stylist::new(client.clone());
    stylist.start_model_generation(&photo()).await.unwrap();

    let side = find_pose("side").unwrap();
    stylist.select_pose(side).await.unwrap();
    assert_eq!(client.pose_calls.load(Ordering::SeqCst), 1);

    // Back to the default pose (cached at generation time): no call.
    stylist.select_pose(pose::default_pose()).await.unwrap();
    // And back to side again: still cached, still no further call.
    stylist.select_pose(side).await.unwrap();
    assert_eq!(client.pose_calls.load(Ordering::SeqCst), 1);

    let session = stylist.session().await;
    assert_eq!(session.current_pose_name(), "side");
    assert_eq!(session.displayed_image_url(), Some("side_v1.png"));
    assert_eq!(session.history[0].pose_images.len(), 2);
}

#[tokio::test]
async fn uncached_pose_costs_exactly_one_call_and_one_entry() {
    let client = MockSynthesisClient::new(vec![
        Ok("model_v1.png".to_string()),
        Ok("outfit_v1.png".to_string()),
        Ok("outfit_side.png".to_string()),
    ]);
    let stylist = Stylist::new(client.clone());
    stylist.start_model_generation(&photo()).await.unwrap();
    stylist
        .select_garment(garment("tee", "Tee"), &garment_image())
        .await
        .unwrap();

    let before = stylist.session().await;
    assert_eq!(before.history[1].pose_images.len(), 1);

    stylist.select_pose(find_pose("side").unwrap()).await.unwrap();

    let session = stylist.session().await;
    assert_eq!(client.pose_calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.history.len(), 2);
    assert_eq!(session.history[1].pose_images.len(), 2);
    assert_eq!(session.history[1].pose_image("side"), Some("outfit_side.png"));
    assert_eq!(session.displayed_image_url(), Some("outfit_side.png"));
}

#[tokio::test]
async fn pose_failure_keeps_previous_pose() {
    let client = MockSynthesisClient::new(vec![
        Ok("model_v1.png".to_string()),
        Err(FitroomError::remote(Some(429), "RESOURCE_EXHAUSTED")),
    ]);
    let stylist = Stylist::new(client);
    stylist.start_model_generation(&photo()).await.unwrap();

    let err = stylist.select_pose(find_pose("walk").unwrap()).await.unwrap_err();
    assert!(err.is_remote());

    let session = stylist.session().await;
    assert_eq!(session.current_pose_name(), pose::default_pose().name);
    assert_eq!(session.state, SessionState::ModelReady);
    assert!(session.error.as_deref().unwrap().starts_with("Failed to change pose"));
    assert_eq!(session.history[0].pose_images.len(), 1);
}

#[tokio::test]
async fn clear_outfit_truncates_to_identical_base() {
    let client = MockSynthesisClient::new(vec![
        Ok("model_v1.png".to_string()),
        Ok("outfit_v1.png".to_string()),
        Ok("outfit_v2.png".to_string()),
    ]);
    let stylist = Stylist::new(client.clone());
    stylist.start_model_generation(&photo()).await.unwrap();
    stylist
        .select_garment(garment("tee", "Tee"), &garment_image())
        .await
        .unwrap();
    stylist
        .select_garment(garment("jacket", "Jacket"), &garment_image())
        .await
        .unwrap();

    let base_before = stylist.session().await.history[0].clone();
    let calls_before = client.total_calls();

    stylist.clear_outfit().await.unwrap();

    let session = stylist.session().await;
    assert_eq!(session.history.len(), 1);
    assert_eq!(session.history[0], base_before);
    assert_eq!(session.state, SessionState::ModelReady);
    // Clearing is purely local.
    assert_eq!(client.total_calls(), calls_before);
}

#[tokio::test]
async fn remove_last_garment_is_local_and_bottoms_out() {
    let client = MockSynthesisClient::new(vec![
        Ok("model_v1.png".to_string()),
        Ok("outfit_v1.png".to_string()),
    ]);
    let stylist = Stylist::new(client.clone());
    stylist.start_model_generation(&photo()).await.unwrap();
    stylist
        .select_garment(garment("tee", "Tee"), &garment_image())
        .await
        .unwrap();

    let calls_before = client.total_calls();
    let removed = stylist.remove_last_garment().await.unwrap().unwrap();
    assert_eq!(removed.display_name(), "Tee");
    // The base layer is never removable.
    assert!(stylist.remove_last_garment().await.unwrap().is_none());
    assert_eq!(client.total_calls(), calls_before);
}

#[tokio::test]
async fn remove_last_garment_clears_stale_error_even_at_base() {
    let client = MockSynthesisClient::new(vec![
        Ok("model_v1.png".to_string()),
        Err(FitroomError::remote(Some(500), "internal provider error")),
    ]);
    let stylist = Stylist::new(client);
    stylist.start_model_generation(&photo()).await.unwrap();
    stylist.select_pose(find_pose("walk").unwrap()).await.unwrap_err();
    assert!(stylist.session().await.error.is_some());

    // Nothing to remove, but the failure banner must still go away.
    assert!(stylist.remove_last_garment().await.unwrap().is_none());
    let session = stylist.session().await;
    assert_eq!(session.error, None);
    assert_eq!(session.state, SessionState::ModelReady);
}

#[tokio::test]
async fn start_over_discards_everything() {
    let client = MockSynthesisClient::new(vec![
        Ok("model_v1.png".to_string()),
        Err(FitroomError::network("reset")),
    ]);
    let stylist = Stylist::new(client);
    stylist.start_model_generation(&photo()).await.unwrap();
    let _ = stylist
        .select_garment(garment("tee", "Tee"), &garment_image())
        .await;

    stylist.start_over().await.unwrap();

    let session = stylist.session().await;
    assert_eq!(session.state, SessionState::Empty);
    assert!(session.history.is_empty());
    assert_eq!(session.error, None);
    assert_eq!(session.current_pose_index, 0);
}

#[tokio::test]
async fn styling_before_model_generation_is_rejected() {
    let client = MockSynthesisClient::new(vec![]);
    let stylist = Stylist::new(client.clone());

    let err = stylist
        .select_garment(garment("tee", "Tee"), &garment_image())
        .await
        .unwrap_err();
    assert!(err.is_invalid_state());
    let err = stylist.select_pose(find_pose("side").unwrap()).await.unwrap_err();
    assert!(err.is_invalid_state());
    assert_eq!(client.total_calls(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_operations_are_rejected_while_loading() {
    let client = Arc::new(BlockingSynthesisClient {
        gate: tokio::sync::Semaphore::new(0),
    });
    let stylist = Stylist::new(client.clone());
    stylist.start_model_generation(&photo()).await.unwrap();

    let in_flight = {
        let stylist = stylist.clone();
        tokio::spawn(async move {
            stylist
                .select_garment(garment("tee", "Tee"), &garment_image())
                .await
        })
    };

    // Let the spawned call reach the blocked provider.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let err = stylist
        .select_garment(garment("jacket", "Jacket"), &garment_image())
        .await
        .unwrap_err();
    assert!(err.is_invalid_state());
    let err = stylist.select_pose(find_pose("side").unwrap()).await.unwrap_err();
    assert!(err.is_invalid_state());
    let err = stylist.clear_outfit().await.unwrap_err();
    assert!(err.is_invalid_state());

    client.gate.add_permits(1);
    in_flight.await.unwrap().unwrap();

    let session = stylist.session().await;
    assert_eq!(session.state, SessionState::Styled);
    assert_eq!(session.history.len(), 2);
}
