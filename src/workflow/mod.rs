pub mod coordinator;

pub use coordinator::{RequestCoordinator, NO_ANSWER, NO_SUMMARY};
