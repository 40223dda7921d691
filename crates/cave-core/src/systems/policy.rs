//! Exploration Policy
//!
//! Picks the explorer's next action from its beliefs. Priority order:
//!
//! 1. Return to the entrance once the treasure is carried.
//! 2. Hunt a located beast while the arrow is still in hand.
//! 3. Step toward a random frontier cell.
//!
//! The policy is greedy and local. It never steps into a cell known to be
//! dangerous, and it goes idle when no acceptable step exists.

use bevy_ecs::prelude::*;
use cave_events::{Action, Cell, Direction};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::{Cave, Explorer, KnowledgeBase};
use crate::systems::turn::SessionProgress;
use crate::SimRng;

/// Which branch of the policy produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyMode {
    ReturnToEntrance,
    Hunting,
    Exploring,
}

/// Resource: the policy's latest decision
#[derive(Resource, Debug, Default)]
pub struct PlannedAction(pub Option<Action>);

/// Decides the next autonomous action.
///
/// Senses the explorer's cell once and folds the percepts into
/// `knowledge` before choosing. The cave itself is only read.
pub fn decide<R: Rng>(
    cave: &Cave,
    explorer: &Explorer,
    knowledge: &mut KnowledgeBase,
    heard_scream: bool,
    rng: &mut R,
) -> Action {
    let position = explorer.position;

    if explorer.has_treasure {
        let action = return_to_entrance(position, knowledge);
        log_decision(PolicyMode::ReturnToEntrance, position, action);
        return action;
    }

    let percepts = cave.perceive(position, heard_scream);
    knowledge.update_from_percepts(position, &percepts);

    if explorer.has_arrow {
        knowledge.locate_beast(position, &percepts);
        if let Some(target) = knowledge.beast_target() {
            if let Some(action) = hunt(position, target, knowledge) {
                log_decision(PolicyMode::Hunting, position, action);
                return action;
            }
        }
    }

    let action = explore(position, knowledge, rng);
    log_decision(PolicyMode::Exploring, position, action);
    action
}

fn log_decision(mode: PolicyMode, position: Cell, action: Action) {
    tracing::debug!(?mode, cell = %position, %action, "policy decision");
}

/// Steps to the safe neighbour closest to the entrance.
///
/// Ties go to the first candidate in `Direction::ALL` order. Idle at the
/// entrance or when no neighbour is a safe step.
pub fn return_to_entrance(position: Cell, knowledge: &KnowledgeBase) -> Action {
    if position == Cell::ENTRANCE {
        return Action::Idle;
    }

    position
        .moves(knowledge.size())
        .filter(|(_, cell)| knowledge.is_safe_step(*cell))
        .min_by_key(|(_, cell)| cell.manhattan(Cell::ENTRANCE))
        .map(|(direction, _)| Action::Move(direction))
        .unwrap_or(Action::Idle)
}

/// Closes in on `target` and shoots from an adjacent cell.
///
/// The row gap is closed before the column gap. Returns `None` when the one
/// step that would close the gap is not a safe step.
pub fn hunt(position: Cell, target: Cell, knowledge: &KnowledgeBase) -> Option<Action> {
    if position == target {
        return None;
    }

    let direction = if position.row != target.row {
        vertical_toward(position, target)
    } else {
        horizontal_toward(position, target)
    };

    let aligned = position.row == target.row || position.col == target.col;
    if aligned && position.manhattan(target) == 1 {
        return Some(Action::Attack(direction));
    }

    let next = position.step(direction, knowledge.size())?;
    knowledge
        .is_safe_step(next)
        .then_some(Action::Move(direction))
}

/// Moves one step toward a frontier cell picked uniformly at random.
///
/// If that step would enter a known-dangerous cell, the remaining frontier
/// cells are tried in random order. Idle when the frontier is empty or
/// every step is blocked.
pub fn explore<R: Rng>(position: Cell, knowledge: &KnowledgeBase, rng: &mut R) -> Action {
    let mut frontier: Vec<Cell> = knowledge.rebuild_frontier().into_iter().collect();
    frontier.shuffle(rng);

    frontier
        .into_iter()
        .find_map(|target| step_toward(position, target, knowledge))
        .map(Action::Move)
        .unwrap_or(Action::Idle)
}

/// First step from `position` toward `target` that avoids known dangers.
///
/// The larger gap is closed first; on equal gaps the row goes first.
pub fn step_toward(position: Cell, target: Cell, knowledge: &KnowledgeBase) -> Option<Direction> {
    let row_gap = position.row.abs_diff(target.row);
    let col_gap = position.col.abs_diff(target.col);

    let vertical = (row_gap > 0).then(|| vertical_toward(position, target));
    let horizontal = (col_gap > 0).then(|| horizontal_toward(position, target));
    let ordered = if col_gap > row_gap {
        [horizontal, vertical]
    } else {
        [vertical, horizontal]
    };

    ordered.into_iter().flatten().find(|direction| {
        position
            .step(*direction, knowledge.size())
            .is_some_and(|cell| !knowledge.is_dangerous(cell))
    })
}

fn vertical_toward(position: Cell, target: Cell) -> Direction {
    if target.row < position.row {
        Direction::Up
    } else {
        Direction::Down
    }
}

fn horizontal_toward(position: Cell, target: Cell) -> Direction {
    if target.col < position.col {
        Direction::Left
    } else {
        Direction::Right
    }
}

/// System to plan the explorer's next autonomous action
pub fn plan_autonomous_action(
    cave: Res<Cave>,
    explorer: Res<Explorer>,
    progress: Res<SessionProgress>,
    mut knowledge: ResMut<KnowledgeBase>,
    mut rng: ResMut<SimRng>,
    mut planned: ResMut<PlannedAction>,
) {
    let action = if progress.state.is_over() {
        Action::Idle
    } else {
        decide(
            &cave,
            &explorer,
            &mut knowledge,
            progress.heard_scream,
            &mut rng.0,
        )
    };
    planned.0 = Some(action);
}
