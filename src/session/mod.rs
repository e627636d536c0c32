pub mod lifecycle;

pub use lifecycle::{SessionSnapshot, SessionState};
