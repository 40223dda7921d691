//! Session Interface
//!
//! A [`Session`] owns one ECS world holding the cave, the explorer, its
//! beliefs and the seeded RNG. Hosts drive it one call at a time:
//! [`Session::apply_action`] for play, [`Session::compute_autonomous_action`]
//! for the policy, and [`Session::current_view`] for rendering.

use bevy_ecs::prelude::*;
use cave_events::{Action, Cell, Marker, SessionState, SessionView};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::components::{Cave, Explorer, KnowledgeBase};
use crate::config::{GameConfig, WorldConfig};
use crate::error::{ConfigurationError, InvalidAction};
use crate::events::{record_turn_events, EventLogger};
use crate::systems::{
    plan_autonomous_action, resolve_pending_action, PendingAction, PlannedAction,
    SessionProgress, TurnOutcome, TurnReport,
};
use crate::SimRng;

/// Resource: identity and parameters of the running session
#[derive(Resource, Debug, Clone)]
pub struct SessionInfo {
    pub id: Uuid,
    pub config: GameConfig,
}

/// One play-through, from hazard placement to victory or defeat.
///
/// Calls are synchronous and never overlap; a host that shares a session
/// across threads must serialize access itself.
pub struct Session {
    world: World,
    turn_schedule: Schedule,
    planning_schedule: Schedule,
    /// Fixed layout restored on reset, when the session was built from one
    layout: Option<Cave>,
}

/// Creates a session with the standard explorer on a custom grid.
pub fn new_session(
    grid_size: usize,
    pit_count: usize,
    seed: u64,
) -> Result<Session, ConfigurationError> {
    Session::new(GameConfig::with_grid(grid_size, pit_count), seed)
}

/// Draws a session id from the session's own RNG stream.
fn next_session_id(rng: &mut SmallRng) -> Uuid {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid()
}

impl Session {
    /// Creates a session with hazards placed from `seed`.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let mut rng = SmallRng::seed_from_u64(seed);
        let cave = Cave::generate(&config.world, &mut rng)?;
        Ok(Self::assemble(config, cave, rng, None))
    }

    /// Creates a session on a fixed cave layout.
    ///
    /// The world section of `config` is replaced by the layout's own
    /// dimensions. `seed` still drives the policy and the session id.
    pub fn with_cave(
        cave: Cave,
        mut config: GameConfig,
        seed: u64,
    ) -> Result<Self, ConfigurationError> {
        config.world = WorldConfig {
            grid_size: cave.size(),
            pit_count: cave.cells_with(Marker::Pit).count(),
        };
        config.validate()?;
        let rng = SmallRng::seed_from_u64(seed);
        Ok(Self::assemble(config, cave.clone(), rng, Some(cave)))
    }

    fn assemble(config: GameConfig, cave: Cave, mut rng: SmallRng, layout: Option<Cave>) -> Self {
        let id = next_session_id(&mut rng);

        let mut world = World::new();
        world.insert_resource(SimRng(rng));
        world.insert_resource(EventLogger::null());
        world.insert_resource(PendingAction::default());
        world.insert_resource(PlannedAction::default());
        world.insert_resource(TurnOutcome::default());

        let mut turn_schedule = Schedule::default();
        turn_schedule.add_systems((resolve_pending_action, record_turn_events).chain());

        let mut planning_schedule = Schedule::default();
        planning_schedule.add_systems(plan_autonomous_action);

        let mut session = Self {
            world,
            turn_schedule,
            planning_schedule,
            layout,
        };
        session.start(id, config, cave);
        session
    }

    /// Installs fresh per-play-through resources.
    fn start(&mut self, id: Uuid, config: GameConfig, cave: Cave) {
        tracing::info!(
            session_id = %id,
            grid_size = cave.size(),
            pits = config.world.pit_count,
            lives = config.explorer.starting_lives,
            "session started"
        );

        self.world.insert_resource(KnowledgeBase::new(cave.size()));
        self.world
            .insert_resource(Explorer::new(config.explorer.starting_lives));
        self.world.insert_resource(cave);
        self.world.insert_resource(SessionProgress::default());
        self.world.insert_resource(SessionInfo { id, config });
        self.world.resource_mut::<PendingAction>().0 = None;
        self.world.resource_mut::<PlannedAction>().0 = None;
        self.world.resource_mut::<TurnOutcome>().0 = None;
    }

    /// Routes this session's turn events to `logger`.
    pub fn with_event_logger(mut self, logger: EventLogger) -> Self {
        self.world.insert_resource(logger);
        self
    }

    /// Player-facing projection of the session.
    ///
    /// A cell shows its marker once visited, while the explorer stands on
    /// it, or after the explorer was hurt there. Everything else is `None`.
    pub fn current_view(&self) -> SessionView {
        let cave = self.cave();
        let explorer = self.explorer();
        let knowledge = self.knowledge();
        let progress = self.progress();
        let size = cave.size();

        let cells = (0..size)
            .map(|row| {
                (0..size)
                    .map(|col| {
                        let cell = Cell::new(row, col);
                        let revealed = knowledge.is_visited(cell)
                            || knowledge.is_dangerous(cell)
                            || cell == explorer.position;
                        revealed.then(|| visible_marker(cave, explorer, cell))
                    })
                    .collect()
            })
            .collect();

        SessionView {
            session_id: self.id(),
            turn: progress.turn,
            grid_size: size,
            cells,
            explorer: explorer.snapshot(),
            last_notification: progress.last_notification.clone(),
            state: progress.state,
            heard_scream: progress.heard_scream,
        }
    }

    /// Resolves one action.
    ///
    /// A rejected action leaves every part of the session untouched. `Idle`
    /// is accepted and changes nothing.
    pub fn apply_action(&mut self, action: Action) -> Result<TurnReport, InvalidAction> {
        self.world.resource_mut::<PendingAction>().0 = Some(action);
        self.turn_schedule.run(&mut self.world);
        self.world
            .resource_mut::<TurnOutcome>()
            .0
            .take()
            .unwrap_or(Err(InvalidAction::SessionOver))
    }

    /// Asks the exploration policy for the next action.
    ///
    /// The policy senses the explorer's cell and updates its beliefs, but
    /// the cave and the explorer are not touched. Once the session is over
    /// the answer is always `Idle`.
    pub fn compute_autonomous_action(&mut self) -> Action {
        self.planning_schedule.run(&mut self.world);
        self.world
            .resource_mut::<PlannedAction>()
            .0
            .take()
            .unwrap_or(Action::Idle)
    }

    /// Starts a fresh play-through with a new session id.
    ///
    /// Hazards are re-placed from the same RNG stream, or the fixed layout
    /// is restored for sessions built with [`Session::with_cave`].
    pub fn reset(&mut self) -> Result<(), ConfigurationError> {
        let config = self.config().clone();
        let mut rng = self.world.resource_mut::<SimRng>();
        let cave = match &self.layout {
            Some(layout) => layout.clone(),
            None => Cave::generate(&config.world, &mut rng.0)?,
        };
        let id = next_session_id(&mut rng.0);

        tracing::info!(previous = %self.id(), "session reset");
        self.start(id, config, cave);
        Ok(())
    }

    /// Flushes buffered turn events to the log file, if any.
    pub fn flush_events(&mut self) -> std::io::Result<()> {
        self.world.resource_mut::<EventLogger>().flush()
    }

    pub fn id(&self) -> Uuid {
        self.world.resource::<SessionInfo>().id
    }

    pub fn config(&self) -> &GameConfig {
        &self.world.resource::<SessionInfo>().config
    }

    pub fn state(&self) -> SessionState {
        self.progress().state
    }

    pub fn is_over(&self) -> bool {
        self.state().is_over()
    }

    pub fn turn(&self) -> u64 {
        self.progress().turn
    }

    pub fn explorer(&self) -> &Explorer {
        self.world.resource::<Explorer>()
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        self.world.resource::<KnowledgeBase>()
    }

    pub fn progress(&self) -> &SessionProgress {
        self.world.resource::<SessionProgress>()
    }

    /// Ground truth. Hosts showing this to a player defeat the game.
    pub fn cave(&self) -> &Cave {
        self.world.resource::<Cave>()
    }

    pub fn event_count(&self) -> u64 {
        self.world.resource::<EventLogger>().event_count()
    }
}

fn visible_marker(cave: &Cave, explorer: &Explorer, cell: Cell) -> Marker {
    if explorer.has_treasure && cell == explorer.position {
        return Marker::Treasure;
    }
    match cave.marker(cell) {
        Marker::Beast if !cave.beast_alive() => Marker::Empty,
        marker => marker,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cave_events::{Direction, Outcome};

    /// Beast at (2,2), treasure at (0,2), pit at (1,0)
    fn fixed_session() -> Session {
        let cave =
            Cave::from_layout(5, Cell::new(2, 2), Cell::new(0, 2), &[Cell::new(1, 0)]).unwrap();
        Session::with_cave(cave, GameConfig::default(), 42).unwrap()
    }

    #[test]
    fn test_new_session_defaults() {
        let session = new_session(5, 3, 42).unwrap();
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.turn(), 0);
        assert_eq!(session.explorer().lives, 2);
        assert_eq!(session.cave().cells_with(Marker::Pit).count(), 3);
    }

    #[test]
    fn test_new_session_rejects_small_grid() {
        assert!(matches!(
            new_session(2, 3, 42),
            Err(ConfigurationError::GridTooSmall { .. })
        ));
        assert!(matches!(
            new_session(0, 0, 42),
            Err(ConfigurationError::EmptyGrid)
        ));
    }

    #[test]
    fn test_with_cave_takes_layout_dimensions() {
        let session = fixed_session();
        assert_eq!(session.config().world.grid_size, 5);
        assert_eq!(session.config().world.pit_count, 1);
    }

    #[test]
    fn test_with_cave_rejects_zero_lives() {
        let cave = Cave::from_layout(3, Cell::new(2, 2), Cell::new(0, 2), &[]).unwrap();
        let mut config = GameConfig::default();
        config.explorer.starting_lives = 0;
        assert!(matches!(
            Session::with_cave(cave, config, 1),
            Err(ConfigurationError::NoLives)
        ));
    }

    #[test]
    fn test_initial_view_reveals_only_entrance() {
        let session = fixed_session();
        let view = session.current_view();

        assert_eq!(view.revealed_count(), 1);
        assert_eq!(view.marker_at(Cell::ENTRANCE), Some(Marker::Entrance));
        assert_eq!(view.marker_at(Cell::new(2, 2)), None);
        assert_eq!(view.last_notification, None);
        assert_eq!(view.session_id, session.id());
    }

    #[test]
    fn test_view_reveals_hazard_after_contact() {
        let mut session = fixed_session();
        session.apply_action(Action::Move(Direction::Down)).unwrap();

        let view = session.current_view();
        assert_eq!(view.marker_at(Cell::new(1, 0)), Some(Marker::Pit));
        assert_eq!(view.explorer.position, Cell::ENTRANCE);
        assert_eq!(
            view.last_notification.as_deref(),
            Some("You fell into a pit! You lose a life.")
        );
    }

    #[test]
    fn test_view_shows_carried_treasure_and_dead_beast() {
        let mut session = fixed_session();
        session.apply_action(Action::Move(Direction::Right)).unwrap();
        session.apply_action(Action::Move(Direction::Right)).unwrap();
        session.apply_action(Action::Attack(Direction::Down)).unwrap();
        session.apply_action(Action::Move(Direction::Down)).unwrap();
        session.apply_action(Action::Move(Direction::Down)).unwrap();

        let view = session.current_view();
        assert!(view.heard_scream);
        assert_eq!(view.marker_at(Cell::new(2, 2)), Some(Marker::Treasure));
        assert_eq!(view.marker_at(Cell::new(0, 2)), Some(Marker::Empty));

        session.apply_action(Action::Move(Direction::Left)).unwrap();
        let view = session.current_view();
        assert_eq!(view.marker_at(Cell::new(2, 2)), Some(Marker::Empty));
    }

    #[test]
    fn test_rejected_action_leaves_session_untouched() {
        let mut session = fixed_session();
        let before = session.current_view();

        assert_eq!(
            session.apply_action(Action::Move(Direction::Up)),
            Err(InvalidAction::OffGrid(Direction::Up))
        );
        assert_eq!(session.current_view(), before);
        assert_eq!(session.turn(), 0);
    }

    #[test]
    fn test_second_attack_rejected() {
        let mut session = fixed_session();
        session.apply_action(Action::Attack(Direction::Right)).unwrap();
        assert_eq!(
            session.apply_action(Action::Attack(Direction::Down)),
            Err(InvalidAction::NoArrow)
        );
        assert_eq!(session.turn(), 1);
    }

    #[test]
    fn test_actions_rejected_after_game_over() {
        let mut session = fixed_session();
        session.apply_action(Action::Move(Direction::Down)).unwrap();
        let report = session.apply_action(Action::Move(Direction::Down)).unwrap();
        assert_eq!(report.state, SessionState::GameOver(Outcome::Defeat));

        assert_eq!(
            session.apply_action(Action::Move(Direction::Right)),
            Err(InvalidAction::SessionOver)
        );
        assert_eq!(session.compute_autonomous_action(), Action::Idle);
    }

    #[test]
    fn test_autonomous_action_leaves_explorer_in_place() {
        let mut session = fixed_session();
        let action = session.compute_autonomous_action();

        assert!(matches!(action, Action::Move(_)));
        assert_eq!(session.explorer().position, Cell::ENTRANCE);
        assert_eq!(session.turn(), 0);
        // The breeze at the entrance keeps both neighbours unclassified
        assert_eq!(session.knowledge().safe_cells().len(), 1);
    }

    #[test]
    fn test_reset_restores_fixed_layout() {
        let mut session = fixed_session();
        let first_id = session.id();
        session.apply_action(Action::Move(Direction::Right)).unwrap();
        session.apply_action(Action::Move(Direction::Right)).unwrap();
        assert!(session.explorer().has_treasure);

        session.reset().unwrap();
        assert_ne!(session.id(), first_id);
        assert_eq!(session.turn(), 0);
        assert_eq!(session.explorer(), &Explorer::new(2));
        assert_eq!(session.knowledge(), &KnowledgeBase::new(5));
        assert_eq!(session.cave().marker(Cell::new(0, 2)), Marker::Treasure);
    }

    #[test]
    fn test_reset_replaces_hazards() {
        let mut session = new_session(5, 3, 7).unwrap();
        let before: Vec<Cell> = session.cave().cells_with(Marker::Pit).collect();

        let mut changed = false;
        for _ in 0..10 {
            session.reset().unwrap();
            let after: Vec<Cell> = session.cave().cells_with(Marker::Pit).collect();
            changed |= after != before;
        }
        assert!(changed);
        assert_eq!(session.state(), SessionState::Playing);
    }

    #[test]
    fn test_null_logger_counts_events() {
        let mut session = fixed_session();
        session.apply_action(Action::Move(Direction::Down)).unwrap();
        // moved, fell_into_pit, respawned
        assert_eq!(session.event_count(), 3);

        session.apply_action(Action::Idle).unwrap();
        let _ = session.apply_action(Action::Move(Direction::Up));
        assert_eq!(session.event_count(), 3);
    }
}
