//! Styling session domain model.
//!
//! An `OutfitSession` is the single mutable object behind the UI: the outfit
//! history, the selected pose, the lifecycle state and the last user-facing
//! error. Exactly one exists per run; nothing about it is persisted.
//!
//! The mutation helpers here enforce the history invariants (never empty
//! once initialized, layer 0 is always the base model, append-only apart
//! from pop-last and truncate-to-base). Orchestration of synthesis calls
//! lives in the application layer.

use crate::error::{FitroomError, Result};
use crate::outfit::OutfitLayer;
use crate::pose;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Lifecycle state of a styling session.
///
/// `GeneratingModel`, `ApplyingGarment` and `ApplyingPose` are transient
/// loading states: exactly one synthesis call is in flight while the session
/// is in one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum SessionState {
    /// No model yet; waiting for a photo upload.
    Empty,
    /// The base model image is being generated from the uploaded photo.
    GeneratingModel,
    /// Base model exists, no garments applied.
    ModelReady,
    /// A garment is being applied on top of the current outfit.
    ApplyingGarment,
    /// An uncached pose is being rendered for the top layer.
    ApplyingPose,
    /// At least one garment has been applied.
    Styled,
}

impl SessionState {
    /// True while a synthesis call is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            Self::GeneratingModel | Self::ApplyingGarment | Self::ApplyingPose
        )
    }

    /// True in the stable states garments and poses may be selected from.
    pub fn can_style(&self) -> bool {
        matches!(self, Self::ModelReady | Self::Styled)
    }
}

/// The in-memory model of one styling session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitSession {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Timestamp when the session was created (ISO 8601 format)
    pub created_at: String,
    /// Timestamp when the session was last updated (ISO 8601 format)
    pub updated_at: String,
    /// Ordered outfit layers; empty until model generation succeeds,
    /// never empty afterwards.
    pub history: Vec<OutfitLayer>,
    /// Index into the pose catalog for the currently displayed pose.
    pub current_pose_index: usize,
    /// Lifecycle state.
    pub state: SessionState,
    /// Message shown while a synthesis call is in flight.
    pub loading_message: String,
    /// Last user-facing error, cleared on the next successful action.
    pub error: Option<String>,
}

impl Default for OutfitSession {
    fn default() -> Self {
        Self::new()
    }
}

impl OutfitSession {
    /// Creates an empty session awaiting a photo upload.
    pub fn new() -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: now.clone(),
            updated_at: now,
            history: Vec::new(),
            current_pose_index: 0,
            state: SessionState::Empty,
            loading_message: String::new(),
            error: None,
        }
    }

    /// Marks the session as updated now.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }

    /// The stable state matching the current history: `Empty` before the
    /// model exists, `ModelReady` with only the base layer, `Styled` once
    /// garments are stacked.
    pub fn stable_state(&self) -> SessionState {
        match self.history.len() {
            0 => SessionState::Empty,
            1 => SessionState::ModelReady,
            _ => SessionState::Styled,
        }
    }

    /// Name of the currently selected pose.
    pub fn current_pose_name(&self) -> &'static str {
        pose::pose_at(self.current_pose_index)
            .unwrap_or_else(pose::default_pose)
            .name
    }

    /// The top of the outfit stack, if the model has been generated.
    pub fn top_layer(&self) -> Option<&OutfitLayer> {
        self.history.last()
    }

    pub fn top_layer_mut(&mut self) -> Option<&mut OutfitLayer> {
        self.history.last_mut()
    }

    /// The image to display: the top layer's image for the current pose,
    /// falling back to any cached image of that layer.
    pub fn displayed_image_url(&self) -> Option<&str> {
        let top = self.top_layer()?;
        top.pose_image(self.current_pose_name()).or_else(|| top.any_image())
    }

    /// Pose names the top layer already has cached.
    pub fn available_pose_names(&self) -> Vec<String> {
        self.top_layer()
            .map(|layer| layer.pose_images.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Installs the base model layer after a successful generation.
    ///
    /// # Errors
    ///
    /// `InvalidState` if a history already exists.
    pub fn initialize_base_layer(&mut self, layer: OutfitLayer) -> Result<()> {
        if !self.history.is_empty() {
            return Err(FitroomError::invalid_state(
                "base layer already initialized",
            ));
        }
        if !layer.is_base() {
            return Err(FitroomError::invalid_state(
                "first outfit layer must not carry a garment",
            ));
        }
        self.history.push(layer);
        self.touch();
        Ok(())
    }

    /// Appends a garment layer on top of the stack.
    ///
    /// # Errors
    ///
    /// `InvalidState` if the base layer does not exist yet or the layer
    /// carries no garment.
    pub fn push_layer(&mut self, layer: OutfitLayer) -> Result<()> {
        if self.history.is_empty() {
            return Err(FitroomError::invalid_state(
                "cannot stack a garment before the base layer exists",
            ));
        }
        if layer.is_base() {
            return Err(FitroomError::invalid_state(
                "only the first layer may be the base model",
            ));
        }
        self.history.push(layer);
        self.touch();
        Ok(())
    }

    /// Pops the top garment layer. Returns the removed layer, or `None`
    /// when only the base layer is left (the base is never removable).
    ///
    /// The pose index is clamped to a pose the new top layer has cached so
    /// the display never goes blank.
    pub fn pop_layer(&mut self) -> Option<OutfitLayer> {
        if self.history.len() <= 1 {
            return None;
        }
        let removed = self.history.pop();
        self.clamp_pose_to_top_layer();
        self.touch();
        removed
    }

    /// Truncates the history back to the base layer. No-op when no garments
    /// are stacked.
    pub fn truncate_to_base(&mut self) {
        if self.history.len() > 1 {
            self.history.truncate(1);
            self.clamp_pose_to_top_layer();
            self.touch();
        }
    }

    fn clamp_pose_to_top_layer(&mut self) {
        let current = self.current_pose_name();
        // Fall back to the first catalog pose the surviving layer has an
        // image for, so the pick is stable regardless of cache insertion
        // order.
        let fallback = match self.top_layer() {
            Some(top) if top.pose_image(current).is_none() => pose::POSES
                .iter()
                .position(|p| top.pose_image(p.name).is_some()),
            _ => None,
        };
        if let Some(index) = fallback {
            self.current_pose_index = index;
        }
    }
}
