pub mod api;
pub mod cancellation;
pub mod worker;

pub use api::{router, MinionState};
pub use cancellation::CancelRegistry;
pub use worker::{crack_range, WorkerOutcome};
