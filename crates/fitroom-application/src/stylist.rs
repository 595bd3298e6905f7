//! The outfit session state machine.
//!
//! `Stylist` owns the single [`OutfitSession`] and mediates every mutation:
//! user intents come in, synthesis calls go out through the
//! [`SynthesisClient`] seam, and the session snapshot is what the
//! presentation layer renders.
//!
//! State flow:
//!
//! ```text
//! Empty -> GeneratingModel -> ModelReady -> ApplyingGarment -> Styled
//!                                  ^            (loops)          |
//!                                  +--- clear_outfit / undo -----+
//! ```
//!
//! Only one synthesis call may be in flight at a time. The presentation
//! layer disables inputs while loading, but the guard is enforced here as
//! well: any operation that would start a call while one is pending fails
//! with `InvalidState`.

use fitroom_core::error::{FitroomError, Result};
use fitroom_core::garment::Garment;
use fitroom_core::media::ImageData;
use fitroom_core::outfit::OutfitLayer;
use fitroom_core::pose::{self, Pose};
use fitroom_core::session::{OutfitSession, SessionState};
use fitroom_core::synthesis::SynthesisClient;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Orchestrates one styling session against the synthesis provider.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct Stylist {
    session: Arc<RwLock<OutfitSession>>,
    client: Arc<dyn SynthesisClient>,
}

impl Stylist {
    /// Creates a stylist with a fresh empty session.
    pub fn new(client: Arc<dyn SynthesisClient>) -> Self {
        Self {
            session: Arc::new(RwLock::new(OutfitSession::new())),
            client,
        }
    }

    /// Returns a snapshot of the current session.
    pub async fn session(&self) -> OutfitSession {
        self.session.read().await.clone()
    }

    /// The data-URL the presentation layer should display right now.
    pub async fn displayed_image_url(&self) -> Option<String> {
        self.session
            .read()
            .await
            .displayed_image_url()
            .map(str::to_string)
    }

    /// Generates the neutral base model from an uploaded photo.
    ///
    /// Valid only from `Empty`. On success the history is seeded with the
    /// base layer and the session moves to `ModelReady`; on failure the
    /// session returns to `Empty` with a user-facing error recorded.
    pub async fn start_model_generation(&self, photo: &ImageData) -> Result<String> {
        {
            let mut session = self.session.write().await;
            self.guard_not_loading(&session)?;
            if session.state != SessionState::Empty {
                return Err(FitroomError::invalid_state(format!(
                    "model generation requires an empty session (state: {})",
                    session.state
                )));
            }
            session.state = SessionState::GeneratingModel;
            session.loading_message = "Generating your model...".to_string();
            session.error = None;
        }

        let result = self.client.generate_model_image(photo).await;

        let mut session = self.session.write().await;
        match result {
            Ok(url) => {
                session.initialize_base_layer(OutfitLayer::base(pose::default_pose().name, url.as_str()))?;
                self.settle(&mut session, None);
                Ok(url)
            }
            Err(err) => {
                self.settle(&mut session, Some(err.friendly_message("Failed to create model")));
                Err(err)
            }
        }
    }

    /// Applies a garment on top of the current outfit.
    ///
    /// Valid from `ModelReady` or `Styled`. Every selection appends a new
    /// layer, even when the same garment is chosen again; there is no undo
    /// cache. On failure the history is unchanged and the previous image
    /// stays displayed.
    pub async fn select_garment(&self, garment: Garment, garment_image: &ImageData) -> Result<String> {
        let (base_url, pose_instruction) = {
            let mut session = self.session.write().await;
            self.guard_not_loading(&session)?;
            self.guard_can_style(&session)?;
            let pose_name = session.current_pose_name();
            let base = session
                .top_layer()
                .and_then(|top| top.pose_image(pose_name).or_else(|| top.any_image()))
                .map(str::to_string)
                .ok_or_else(|| {
                    FitroomError::invalid_state("no base image available for garment application")
                })?;
            let instruction = pose::find_pose(pose_name)
                .unwrap_or_else(pose::default_pose)
                .instruction;
            session.state = SessionState::ApplyingGarment;
            session.loading_message = format!("Adding {}...", garment.name);
            session.error = None;
            (base, instruction)
        };

        let result = self
            .client
            .generate_outfit_image(&base_url, garment_image, &garment.name, pose_instruction)
            .await;

        let mut session = self.session.write().await;
        match result {
            Ok(url) => {
                let pose_name = session.current_pose_name();
                let name = garment.name.clone();
                session.push_layer(OutfitLayer::with_garment(garment, pose_name, url.as_str()))?;
                log::debug!("applied garment '{name}', stack depth {}", session.history.len());
                self.settle(&mut session, None);
                Ok(url)
            }
            Err(err) => {
                let message = err.friendly_message(&format!("Failed to apply {}", garment.name));
                self.settle(&mut session, Some(message));
                Err(err)
            }
        }
    }

    /// Switches the displayed pose.
    ///
    /// A pose the top layer already has cached switches instantly with zero
    /// network calls. An uncached pose costs exactly one synthesis call; on
    /// success the top layer's cache gains that one entry.
    pub async fn select_pose(&self, target: Pose) -> Result<()> {
        let base_url = {
            let mut session = self.session.write().await;
            self.guard_not_loading(&session)?;
            self.guard_can_style(&session)?;

            let cached = session
                .top_layer()
                .and_then(|top| top.pose_image(target.name))
                .is_some();
            if cached {
                Self::set_pose_index(&mut session, target);
                session.error = None;
                return Ok(());
            }

            let base = session
                .displayed_image_url()
                .map(str::to_string)
                .ok_or_else(|| {
                    FitroomError::invalid_state("no base image available for pose change")
                })?;
            session.state = SessionState::ApplyingPose;
            session.loading_message = "Changing pose...".to_string();
            session.error = None;
            base
        };

        let result = self
            .client
            .generate_pose_variation(&base_url, target.instruction)
            .await;

        let mut session = self.session.write().await;
        match result {
            Ok(url) => {
                if let Some(top) = session.top_layer_mut() {
                    top.cache_pose_image(target.name, url);
                }
                Self::set_pose_index(&mut session, target);
                self.settle(&mut session, None);
                Ok(())
            }
            Err(err) => {
                self.settle(&mut session, Some(err.friendly_message("Failed to change pose")));
                Err(err)
            }
        }
    }

    /// Removes the most recently applied garment. No network call.
    ///
    /// Returns the removed layer, or `None` when only the base layer is
    /// left.
    pub async fn remove_last_garment(&self) -> Result<Option<OutfitLayer>> {
        let mut session = self.session.write().await;
        self.guard_not_loading(&session)?;
        let removed = session.pop_layer();
        // Settle even when nothing came off, so a stale error from an
        // earlier failure does not outlive a local action.
        self.settle(&mut session, None);
        Ok(removed)
    }

    /// Truncates the outfit back to the bare model. No network call.
    pub async fn clear_outfit(&self) -> Result<()> {
        let mut session = self.session.write().await;
        self.guard_not_loading(&session)?;
        session.truncate_to_base();
        self.settle(&mut session, None);
        Ok(())
    }

    /// Discards the whole session and returns to `Empty`.
    pub async fn start_over(&self) -> Result<()> {
        let mut session = self.session.write().await;
        self.guard_not_loading(&session)?;
        *session = OutfitSession::new();
        Ok(())
    }

    fn guard_not_loading(&self, session: &OutfitSession) -> Result<()> {
        if session.state.is_loading() {
            // A defect in the caller: inputs must be disabled while loading.
            log::warn!("rejected concurrent operation while {}", session.state);
            return Err(FitroomError::invalid_state(
                "a synthesis call is already in flight",
            ));
        }
        Ok(())
    }

    fn guard_can_style(&self, session: &OutfitSession) -> Result<()> {
        if !session.state.can_style() {
            return Err(FitroomError::invalid_state(format!(
                "styling requires a generated model (state: {})",
                session.state
            )));
        }
        Ok(())
    }

    /// Returns the session to the stable state matching its history,
    /// recording an error message if the operation failed.
    fn settle(&self, session: &mut OutfitSession, error: Option<String>) {
        session.state = session.stable_state();
        session.loading_message.clear();
        session.error = error;
        session.touch();
    }

    fn set_pose_index(session: &mut OutfitSession, target: Pose) {
        if let Some(index) = pose::POSES.iter().position(|p| p.name == target.name) {
            session.current_pose_index = index;
        }
    }
}
