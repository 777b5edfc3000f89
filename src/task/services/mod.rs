//! Application services for the task lifecycle workflow.
//!
//! Each service is a stateless entry point sharing only the repository ports;
//! none calls another directly. The review service is the single producer of
//! outbound notifications, through the [`crate::task::ports::ReviewNotifier`]
//! port.

mod cancellation;
mod completion;
mod review;
mod sweeper;

pub use cancellation::{
    AssignmentOutcome, CancelScope, CancellationError, CancellationOutcome, CancellationService,
};
pub use completion::{CompletionError, CompletionService, TaskSubmission};
pub use review::{NotificationOutcome, ReviewError, ReviewOutcome, ReviewService};
pub use sweeper::{SweepError, SweepOutcome, SweeperService};
