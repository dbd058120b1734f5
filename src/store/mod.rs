pub mod artifact;
pub mod session;

pub use artifact::ArtifactStore;
pub use session::{SavedSession, SessionStore};
