// Application layer - Use case interactors and session state

pub mod container;
pub mod media_registry;
pub mod progress;
pub mod session;
pub mod trim_interactor;

// Re-export the main entry points
pub use container::{AppContainer, DefaultAppContainer};
pub use session::{SessionStatus, TrimSession};
pub use trim_interactor::{TrimInteractor, TrimRequest};
