//! Turn Resolution System
//!
//! Applies one action to the cave and the explorer and settles the
//! consequences: hazard damage, respawn, treasure pickup, victory and defeat.
//!
//! Every turn is all-or-nothing. A rejected action returns
//! [`InvalidAction`] before anything is mutated.

use bevy_ecs::prelude::*;
use cave_events::{Action, Cell, Direction, Outcome, Percept, Percepts, SessionState, TurnEventKind};

use crate::components::{Cave, Explorer, KnowledgeBase};
use crate::error::InvalidAction;

/// Resource: session-wide progress
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionProgress {
    pub state: SessionState,
    /// Accepted moves and attacks so far
    pub turn: u64,
    /// Set once the beast has been killed
    pub heard_scream: bool,
    pub last_notification: Option<String>,
}

/// Something that happened while resolving a turn, with where the explorer
/// stood and how many lives it had once it took effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedEvent {
    pub kind: TurnEventKind,
    pub cell: Cell,
    pub lives: u32,
}

impl ResolvedEvent {
    fn new(kind: TurnEventKind, cell: Cell, lives: u32) -> Self {
        Self { kind, cell, lives }
    }
}

/// Result of an accepted action.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    pub action: Action,
    pub turn: u64,
    /// Percepts sensed where the action resolved
    pub percepts: Percepts,
    pub notification: Option<String>,
    pub state: SessionState,
    pub events: Vec<ResolvedEvent>,
}

impl TurnReport {
    pub fn has_event(&self, kind: TurnEventKind) -> bool {
        self.events.iter().any(|event| event.kind == kind)
    }
}

/// Resource: action waiting for the turn schedule
#[derive(Resource, Debug, Default)]
pub struct PendingAction(pub Option<Action>);

/// Resource: what the turn schedule made of the pending action
#[derive(Resource, Debug, Default)]
pub struct TurnOutcome(pub Option<Result<TurnReport, InvalidAction>>);

const PIT_MESSAGE: &str = "You fell into a pit! You lose a life.";
const BEAST_MESSAGE: &str = "The beast devoured you! You lose a life.";
const DEFEAT_MESSAGE: &str = "You have lost all your lives. Game over.";
const TREASURE_MESSAGE: &str = "You found the treasure!";
const VICTORY_MESSAGE: &str = "Congratulations! You escaped with the treasure. Victory!";
const HIT_MESSAGE: &str = "You killed the beast! A scream echoes through the cave.";
const MISS_MESSAGE: &str = "The arrow missed.";

/// Resolves one action against the session state.
pub fn resolve_action(
    cave: &mut Cave,
    explorer: &mut Explorer,
    knowledge: &mut KnowledgeBase,
    progress: &mut SessionProgress,
    action: Action,
) -> Result<TurnReport, InvalidAction> {
    if progress.state.is_over() {
        return Err(InvalidAction::SessionOver);
    }

    let report = match action {
        Action::Move(direction) => resolve_move(cave, explorer, knowledge, progress, direction)?,
        Action::Attack(direction) => {
            resolve_attack(cave, explorer, knowledge, progress, direction)?
        }
        Action::Idle => {
            return Ok(TurnReport {
                action,
                turn: progress.turn,
                percepts: Percepts::new(),
                notification: None,
                state: progress.state,
                events: Vec::new(),
            })
        }
    };

    progress.last_notification = report.notification.clone();
    Ok(report)
}

fn resolve_move(
    cave: &mut Cave,
    explorer: &mut Explorer,
    knowledge: &mut KnowledgeBase,
    progress: &mut SessionProgress,
    direction: Direction,
) -> Result<TurnReport, InvalidAction> {
    let next = explorer
        .position
        .step(direction, cave.size())
        .ok_or(InvalidAction::OffGrid(direction))?;

    progress.turn += 1;
    explorer.position = next;
    knowledge.record_visit(next);

    let percepts = cave.perceive(next, progress.heard_scream);
    tracing::debug!(turn = progress.turn, cell = %next, %percepts, "explorer moved");

    let mut events = vec![ResolvedEvent::new(TurnEventKind::Moved, next, explorer.lives)];

    let hazard = if percepts.contains(Percept::Pit) {
        Some((TurnEventKind::FellIntoPit, PIT_MESSAGE))
    } else if percepts.contains(Percept::Beast) {
        Some((TurnEventKind::Devoured, BEAST_MESSAGE))
    } else {
        None
    };

    let notification = if let Some((kind, message)) = hazard {
        knowledge.record_danger(next);
        if kind == TurnEventKind::Devoured && explorer.has_arrow {
            knowledge.set_beast_target(next);
        }
        let lives = explorer.lose_life();
        events.push(ResolvedEvent::new(kind, next, lives));
        tracing::info!(cell = %next, lives, "explorer hurt by {:?}", kind);

        if lives == 0 {
            progress.state = SessionState::GameOver(Outcome::Defeat);
            events.push(ResolvedEvent::new(TurnEventKind::Died, next, lives));
            tracing::info!(turn = progress.turn, "explorer lost the last life");
            Some(DEFEAT_MESSAGE.to_string())
        } else {
            explorer.respawn();
            knowledge.record_visit(Cell::ENTRANCE);
            events.push(ResolvedEvent::new(
                TurnEventKind::Respawned,
                Cell::ENTRANCE,
                lives,
            ));

            if explorer.has_treasure {
                progress.state = SessionState::GameOver(Outcome::Victory);
                events.push(ResolvedEvent::new(
                    TurnEventKind::Escaped,
                    Cell::ENTRANCE,
                    lives,
                ));
                tracing::info!(turn = progress.turn, "explorer escaped with the treasure");
                Some(format!("{} {}", message, VICTORY_MESSAGE))
            } else {
                Some(message.to_string())
            }
        }
    } else if percepts.contains(Percept::Treasure) && !explorer.has_treasure {
        explorer.has_treasure = true;
        cave.collect_treasure(next);
        events.push(ResolvedEvent::new(
            TurnEventKind::TreasureTaken,
            next,
            explorer.lives,
        ));
        tracing::info!(cell = %next, "treasure taken");
        Some(TREASURE_MESSAGE.to_string())
    } else if explorer.has_treasure && next == Cell::ENTRANCE {
        progress.state = SessionState::GameOver(Outcome::Victory);
        events.push(ResolvedEvent::new(TurnEventKind::Escaped, next, explorer.lives));
        tracing::info!(turn = progress.turn, "explorer escaped with the treasure");
        Some(VICTORY_MESSAGE.to_string())
    } else {
        percepts.advisory_message()
    };

    Ok(TurnReport {
        action: Action::Move(direction),
        turn: progress.turn,
        percepts,
        notification,
        state: progress.state,
        events,
    })
}

fn resolve_attack(
    cave: &mut Cave,
    explorer: &mut Explorer,
    knowledge: &mut KnowledgeBase,
    progress: &mut SessionProgress,
    direction: Direction,
) -> Result<TurnReport, InvalidAction> {
    if !explorer.take_arrow() {
        return Err(InvalidAction::NoArrow);
    }

    progress.turn += 1;
    knowledge.clear_beast_target();

    let origin = explorer.position;
    let hit = cave.shoot_arrow(origin, direction);
    let (kind, message) = if hit {
        progress.heard_scream = true;
        (TurnEventKind::ArrowHit, HIT_MESSAGE)
    } else {
        (TurnEventKind::ArrowMissed, MISS_MESSAGE)
    };
    tracing::info!(turn = progress.turn, cell = %origin, %direction, hit, "arrow loosed");

    Ok(TurnReport {
        action: Action::Attack(direction),
        turn: progress.turn,
        percepts: cave.perceive(origin, progress.heard_scream),
        notification: Some(message.to_string()),
        state: progress.state,
        events: vec![ResolvedEvent::new(kind, origin, explorer.lives)],
    })
}

/// System to resolve the pending action, if any
pub fn resolve_pending_action(
    mut pending: ResMut<PendingAction>,
    mut cave: ResMut<Cave>,
    mut explorer: ResMut<Explorer>,
    mut knowledge: ResMut<KnowledgeBase>,
    mut progress: ResMut<SessionProgress>,
    mut outcome: ResMut<TurnOutcome>,
) {
    let Some(action) = pending.0.take() else {
        return;
    };

    let result = resolve_action(&mut cave, &mut explorer, &mut knowledge, &mut progress, action);
    if let Err(rejected) = &result {
        tracing::debug!(%action, %rejected, "action rejected");
    }
    outcome.0 = Some(result);
}
