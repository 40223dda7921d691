//! ECS Systems
//!
//! Turn resolution and autonomous planning.

pub mod policy;
pub mod turn;

pub use policy::{
    decide, explore, hunt, plan_autonomous_action, return_to_entrance, step_toward, PlannedAction,
    PolicyMode,
};
pub use turn::{
    resolve_action, resolve_pending_action, PendingAction, ResolvedEvent, SessionProgress,
    TurnOutcome, TurnReport,
};
