//! Domain layer for FitRoom.
//!
//! Entities, invariants and service traits for virtual try-on styling
//! sessions. No I/O happens in this crate; the synthesis provider and the
//! key store are reached through the traits in [`synthesis`] and
//! [`keystore`].

pub mod error;
pub mod garment;
pub mod keystore;
pub mod media;
pub mod outfit;
pub mod pose;
pub mod session;
pub mod synthesis;

// Re-export common error type
pub use error::{FitroomError, Result};
pub use garment::{Garment, GarmentSource, Wardrobe};
pub use keystore::KeyStore;
pub use media::ImageData;
pub use outfit::OutfitLayer;
pub use session::{OutfitSession, SessionState};
pub use synthesis::SynthesisClient;
