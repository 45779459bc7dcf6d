pub mod button;
pub mod reset;
pub mod router;

pub use button::{ButtonId, ButtonSet};
pub use reset::{ResetGesture, ResetWatch};
pub use router::{ButtonInputRouter, FingerId, OverlayButton};
