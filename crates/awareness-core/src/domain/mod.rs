//! Domain model (state, deltas, state changers, failures).
//!
//! - state: State / Delta / Props / ErrorSlot
//! - changer: StateChanger と HandlerResult
//! - errors: HandlerFailure

pub mod changer;
pub mod errors;
pub mod state;

pub use changer::{
    ChangerKind, Deferred, HandlerResult, IterSteps, StateChanger, Step, StepSource, Stepwise,
    Transform,
};
pub use errors::HandlerFailure;
pub use state::{Delta, ErrorSlot, Props, State};
