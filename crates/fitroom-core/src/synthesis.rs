//! Remote image synthesis client trait.
//!
//! The hosted generative model is an opaque capability behind this seam:
//! three single-shot operations, each one logical request/response. No
//! retries happen here; a single failed attempt surfaces to the state
//! machine as a classified [`FitroomError`](crate::error::FitroomError).

use crate::error::Result;
use crate::media::ImageData;

/// Client for the hosted generative-image API.
///
/// All operations return an image as a `data:` URL on success and classify
/// failures as `UnsupportedMedia`, `RemoteService`, `Network` or
/// `InvalidState` (empty base image, a caller sequencing defect).
#[async_trait::async_trait]
pub trait SynthesisClient: Send + Sync {
    /// Generates the neutral full-body model image from a user photo.
    async fn generate_model_image(&self, photo: &ImageData) -> Result<String>;

    /// Renders the current outfit with `garment` applied on top.
    ///
    /// `base_image_url` is the data-URL of the image the garment is layered
    /// onto; `pose_instruction` describes the pose the result should keep.
    async fn generate_outfit_image(
        &self,
        base_image_url: &str,
        garment_image: &ImageData,
        garment_name: &str,
        pose_instruction: &str,
    ) -> Result<String>;

    /// Re-renders `base_image_url` from a different perspective, keeping
    /// person, clothing and background identical.
    async fn generate_pose_variation(
        &self,
        base_image_url: &str,
        pose_instruction: &str,
    ) -> Result<String>;
}
