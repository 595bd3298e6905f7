//! Infrastructure adapters for FitRoom.
//!
//! Implementations of the domain service traits: the Gemini synthesis
//! client, the file-backed key store, plus path management and image
//! loading helpers.

pub mod fetch;
pub mod gemini;
pub mod key_store;
pub mod paths;

pub use crate::gemini::GeminiClient;
pub use crate::key_store::FileKeyStore;
pub use crate::paths::FitroomPaths;
