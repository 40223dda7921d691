//! Event Logger
//!
//! Append-only JSONL log of resolved turns.

use bevy_ecs::prelude::*;
use cave_events::{generate_event_id, TurnEvent};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::session::SessionInfo;
use crate::systems::TurnOutcome;

/// Resource for logging turn events to a JSONL file
#[derive(Resource)]
pub struct EventLogger {
    writer: Option<BufWriter<File>>,
    event_count: u64,
    next_event_id: u64,
}

impl EventLogger {
    /// Create a new event logger writing to the specified path
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            event_count: 0,
            next_event_id: 1,
        })
    }

    /// Create a logger that discards events
    pub fn null() -> Self {
        Self {
            writer: None,
            event_count: 0,
            next_event_id: 1,
        }
    }

    /// Generate the next event ID
    pub fn next_id(&mut self) -> String {
        let id = generate_event_id(self.next_event_id);
        self.next_event_id += 1;
        id
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    pub fn is_recording(&self) -> bool {
        self.writer.is_some()
    }

    /// Log an event to the file
    pub fn log(&mut self, event: &TurnEvent) -> std::io::Result<()> {
        self.event_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = event.to_jsonl()?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    /// Log multiple events
    pub fn log_batch(&mut self, events: &[TurnEvent]) -> std::io::Result<()> {
        for event in events {
            self.log(event)?;
        }
        Ok(())
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(error = %e, "failed to flush event logger");
        }
    }
}

/// System to append the events of the turn just resolved
///
/// Rejected actions and idle turns produce nothing. The turn notification
/// rides on the last event of the turn. A turn that ends the session also
/// flushes the log.
pub fn record_turn_events(
    info: Res<SessionInfo>,
    outcome: Res<TurnOutcome>,
    mut logger: ResMut<EventLogger>,
) {
    let Some(Ok(report)) = &outcome.0 else {
        return;
    };

    let last = report.events.len().saturating_sub(1);
    let events: Vec<TurnEvent> = report
        .events
        .iter()
        .enumerate()
        .map(|(index, resolved)| TurnEvent {
            event_id: logger.next_id(),
            session_id: info.id,
            turn: report.turn,
            kind: resolved.kind,
            action: report.action,
            cell: resolved.cell,
            percepts: report.percepts.clone(),
            lives: resolved.lives,
            notification: if index == last {
                report.notification.clone()
            } else {
                None
            },
        })
        .collect();

    if let Err(e) = logger.log_batch(&events) {
        tracing::warn!(turn = report.turn, error = %e, "failed to record turn events");
        return;
    }

    // The log is complete once the session ends
    if events.iter().any(|event| event.kind.is_terminal()) {
        if let Err(e) = logger.flush() {
            tracing::warn!(turn = report.turn, error = %e, "failed to flush event log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cave_events::{Action, Cell, Direction, Percepts, TurnEventKind};
    use std::io::BufRead;
    use uuid::Uuid;

    fn sample_event(logger: &mut EventLogger) -> TurnEvent {
        TurnEvent {
            event_id: logger.next_id(),
            session_id: Uuid::nil(),
            turn: 1,
            kind: TurnEventKind::Moved,
            action: Action::Move(Direction::Right),
            cell: Cell::new(0, 1),
            percepts: Percepts::new(),
            lives: 2,
            notification: None,
        }
    }

    #[test]
    fn test_event_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        let mut logger = EventLogger::new(&path).unwrap();
        assert!(logger.is_recording());
        let event = sample_event(&mut logger);
        logger.log(&event).unwrap();
        logger.flush().unwrap();

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 1);

        let parsed = TurnEvent::from_jsonl(&lines[0]).unwrap();
        assert_eq!(parsed.event_id, "evt_00000001");
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_null_logger() {
        let mut logger = EventLogger::null();
        assert!(!logger.is_recording());

        let event = sample_event(&mut logger);
        logger.log_batch(&[event.clone(), event]).unwrap();
        assert_eq!(logger.event_count(), 2);
    }

    #[test]
    fn test_event_id_generation() {
        let mut logger = EventLogger::null();
        assert_eq!(logger.next_id(), "evt_00000001");
        assert_eq!(logger.next_id(), "evt_00000002");
    }

    #[test]
    fn test_terminal_turn_flushes_log() {
        use crate::config::GameConfig;
        use crate::systems::{ResolvedEvent, TurnReport};
        use cave_events::{Outcome, SessionState};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        let mut world = World::new();
        world.insert_resource(SessionInfo {
            id: Uuid::nil(),
            config: GameConfig::default(),
        });
        world.insert_resource(EventLogger::new(&path).unwrap());
        world.insert_resource(TurnOutcome(Some(Ok(TurnReport {
            action: Action::Move(Direction::Down),
            turn: 4,
            percepts: Percepts::new(),
            notification: Some("You have lost all your lives. Game over.".to_string()),
            state: SessionState::GameOver(Outcome::Defeat),
            events: vec![
                ResolvedEvent {
                    kind: TurnEventKind::Moved,
                    cell: Cell::new(1, 0),
                    lives: 1,
                },
                ResolvedEvent {
                    kind: TurnEventKind::Died,
                    cell: Cell::new(1, 0),
                    lives: 0,
                },
            ],
        }))));

        let mut schedule = Schedule::default();
        schedule.add_systems(record_turn_events);
        schedule.run(&mut world);

        // Still owned by the world, yet already on disk
        assert_eq!(world.resource::<EventLogger>().event_count(), 2);
        let contents = std::fs::read_to_string(&path).unwrap();
        let events: Vec<TurnEvent> = contents
            .lines()
            .map(|line| TurnEvent::from_jsonl(line).unwrap())
            .collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].lives, 1);
        assert_eq!(events[1].kind, TurnEventKind::Died);
        assert_eq!(events[0].notification, None);
        assert!(events[1].notification.is_some());
    }

    #[test]
    fn test_drop_flushes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        {
            let mut logger = EventLogger::new(&path).unwrap();
            let event = sample_event(&mut logger);
            logger.log(&event).unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }
}
