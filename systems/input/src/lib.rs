#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Input routing system that turns player intents into world commands.

use log::debug;
use math_snake_core::{Command, Heading, Operation, SessionPhase, SessionView};

/// Player intents captured by adapters between frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Steer the actor toward a heading.
    Steer(Heading),
    /// Flip between running and paused.
    TogglePause,
    /// Choose the operation for a new session.
    SelectOperation(Operation),
    /// Start over with the chosen operation.
    Restart,
    /// Abandon the session and return to operation selection.
    ReturnToMenu,
}

/// Immutable facts about the session the router filters against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoutingView {
    /// Active phase.
    pub phase: SessionPhase,
    /// Operation chosen for the session, if any.
    pub operation: Option<Operation>,
    /// Heading the next tick will use.
    pub heading: Heading,
}

impl From<&SessionView> for RoutingView {
    fn from(view: &SessionView) -> Self {
        Self {
            phase: view.phase,
            operation: view.operation,
            heading: view.heading,
        }
    }
}

/// Pure system that filters intents before they reach the world.
#[derive(Debug, Default)]
pub struct InputRouter;

impl InputRouter {
    /// Consumes intents in arrival order and emits the commands that should be applied.
    ///
    /// Steering is checked against the heading forwarded most recently, so a
    /// quick two-step turn within one frame is preserved.
    pub fn handle(&mut self, intents: &[Intent], view: RoutingView, out: &mut Vec<Command>) {
        let mut heading = view.heading;
        let mut phase = view.phase;
        let mut operation = view.operation;

        for intent in intents {
            let command = match (*intent, phase) {
                (Intent::Steer(requested), SessionPhase::Running) => {
                    if heading.is_reversal(requested) {
                        None
                    } else {
                        heading = requested;
                        Some(Command::SteerActor { heading: requested })
                    }
                }
                (Intent::TogglePause, SessionPhase::Running) => {
                    phase = SessionPhase::Paused;
                    Some(Command::TogglePause)
                }
                (Intent::TogglePause, SessionPhase::Paused) => {
                    phase = SessionPhase::Running;
                    Some(Command::TogglePause)
                }
                (Intent::SelectOperation(chosen), SessionPhase::SelectingOperation) => {
                    phase = SessionPhase::Running;
                    heading = Heading::Right;
                    operation = Some(chosen);
                    Some(Command::SelectOperation { operation: chosen })
                }
                (Intent::Restart, _)
                    if operation.is_some() && phase != SessionPhase::SelectingOperation =>
                {
                    phase = SessionPhase::Running;
                    heading = Heading::Right;
                    Some(Command::Restart)
                }
                (Intent::ReturnToMenu, _) if phase != SessionPhase::SelectingOperation => {
                    phase = SessionPhase::SelectingOperation;
                    operation = None;
                    Some(Command::ReturnToMenu)
                }
                _ => None,
            };

            match command {
                Some(command) => out.push(command),
                None => debug!("dropping {intent:?} in {phase:?} heading {heading:?}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(heading: Heading) -> RoutingView {
        RoutingView {
            phase: SessionPhase::Running,
            operation: Some(Operation::Add),
            heading,
        }
    }

    fn route(intents: &[Intent], view: RoutingView) -> Vec<Command> {
        let mut router = InputRouter::default();
        let mut out = Vec::new();
        router.handle(intents, view, &mut out);
        out
    }

    #[test]
    fn reversal_is_dropped() {
        let mut router = InputRouter::default();
        let mut out = Vec::new();
        router.handle(
            &[Intent::Steer(Heading::Left)],
            running(Heading::Right),
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn perpendicular_turns_are_forwarded() {
        assert_eq!(
            route(&[Intent::Steer(Heading::Up)], running(Heading::Right)),
            vec![Command::SteerActor {
                heading: Heading::Up
            }]
        );
    }

    #[test]
    fn two_step_turn_in_one_frame_is_kept() {
        assert_eq!(
            route(
                &[Intent::Steer(Heading::Up), Intent::Steer(Heading::Left)],
                running(Heading::Right)
            ),
            vec![
                Command::SteerActor {
                    heading: Heading::Up
                },
                Command::SteerActor {
                    heading: Heading::Left
                },
            ]
        );
    }

    #[test]
    fn steering_is_dropped_outside_running() {
        let view = RoutingView {
            phase: SessionPhase::Paused,
            ..running(Heading::Right)
        };
        assert!(route(&[Intent::Steer(Heading::Up)], view).is_empty());
    }

    #[test]
    fn pause_is_dropped_in_game_over_and_menu() {
        for phase in [SessionPhase::GameOver, SessionPhase::SelectingOperation] {
            let view = RoutingView {
                phase,
                ..running(Heading::Right)
            };
            assert!(route(&[Intent::TogglePause], view).is_empty());
        }
    }

    #[test]
    fn double_toggle_forwards_both() {
        assert_eq!(
            route(
                &[Intent::TogglePause, Intent::TogglePause],
                running(Heading::Right)
            ),
            vec![Command::TogglePause, Command::TogglePause]
        );
    }

    #[test]
    fn operation_choice_only_in_menu() {
        let menu = RoutingView {
            phase: SessionPhase::SelectingOperation,
            operation: None,
            heading: Heading::Right,
        };
        assert_eq!(
            route(&[Intent::SelectOperation(Operation::Divide)], menu),
            vec![Command::SelectOperation {
                operation: Operation::Divide
            }]
        );
        assert!(route(
            &[Intent::SelectOperation(Operation::Divide)],
            running(Heading::Right)
        )
        .is_empty());
    }

    #[test]
    fn restart_requires_a_chosen_operation() {
        let game_over = RoutingView {
            phase: SessionPhase::GameOver,
            ..running(Heading::Up)
        };
        assert_eq!(route(&[Intent::Restart], game_over), vec![Command::Restart]);

        let menu = RoutingView {
            phase: SessionPhase::SelectingOperation,
            operation: None,
            heading: Heading::Right,
        };
        assert!(route(&[Intent::Restart], menu).is_empty());
        assert!(route(&[Intent::ReturnToMenu], menu).is_empty());
    }
}
