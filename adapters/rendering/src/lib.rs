#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Math Snake adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use math_snake_core::{
    FatalCollision, GridPosition, GridSize, Heading, Operation, SessionPhase, SessionView,
};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Directional presses in the order they were detected this frame.
    pub steer: Vec<Heading>,
    /// Whether the adapter detected a pause toggle.
    pub toggle_pause: bool,
    /// Operation picked from the menu, if any.
    pub select_operation: Option<Operation>,
    /// Whether the adapter detected a restart request.
    pub restart: bool,
    /// Whether the adapter detected a request to return to the menu.
    pub return_to_menu: bool,
}

impl FrameInput {
    /// Reports whether the frame carried no player input at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steer.is_empty()
            && !self.toggle_pause
            && self.select_operation.is_none()
            && !self.restart
            && !self.return_to_menu
    }
}

/// Describes the square play grid that adapters draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of cells along each edge.
    pub side: u32,
    /// Side length of a single cell expressed in world units.
    pub cell_length: f32,
    /// Color used when drawing grid lines.
    pub line_color: Color,
}

impl GridPresentation {
    /// Cell length used by [`project`].
    pub const DEFAULT_CELL_LENGTH: f32 = 32.0;

    /// Checks that the grid has cells and a positive finite cell length.
    pub fn validate(&self) -> std::result::Result<(), RenderingError> {
        if self.side == 0 {
            return Err(RenderingError::EmptyGrid);
        }
        if !(self.cell_length.is_finite() && self.cell_length > 0.0) {
            return Err(RenderingError::InvalidCellLength {
                cell_length: self.cell_length,
            });
        }
        Ok(())
    }

    /// Calculates the total side length of the grid.
    #[must_use]
    pub const fn length(&self) -> f32 {
        self.side as f32 * self.cell_length
    }

    /// World-space position of the top-left corner of `cell`.
    #[must_use]
    pub fn cell_origin(&self, cell: GridPosition) -> Vec2 {
        Vec2::new(cell.x() as f32, cell.y() as f32) * self.cell_length
    }

    /// World-space position of the center of `cell`.
    #[must_use]
    pub fn cell_center(&self, cell: GridPosition) -> Vec2 {
        self.cell_origin(cell) + Vec2::splat(self.cell_length * 0.5)
    }
}

/// Colors used for the scene's inhabitants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Fill of the cell under the head.
    pub head: Color,
    /// Fill of the remaining body cells.
    pub body: Color,
    /// Fill of every target cell.
    pub target: Color,
    /// Color of the numbers printed on targets.
    pub text: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            head: Color::from_rgb_u8(0x2f, 0x95, 0x32),
            body: Color::from_rgb_u8(0x2f, 0x95, 0x32).lighten(0.35),
            target: Color::from_rgb_u8(0xff, 0xc1, 0x07),
            text: Color::from_rgb_u8(0x20, 0x20, 0x20),
        }
    }
}

/// Actor cell visible in the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneActorCell {
    /// Grid cell covered by the actor.
    pub position: GridPosition,
    /// Whether this cell is the head.
    pub is_head: bool,
}

/// Target visible in the scene.
///
/// Whether the value is correct stays hidden from the projection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneTarget {
    /// Grid cell occupied by the target.
    pub position: GridPosition,
    /// Number printed on the target.
    pub value: i32,
}

/// Text shown alongside the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HudPresentation {
    /// Question of the active round.
    pub question: Option<String>,
    /// Operation chosen for the session.
    pub operation: Option<Operation>,
    /// Current score.
    pub score: u32,
    /// Speed relative to the initial period, in percent.
    pub speed_percent: u32,
    /// Current period between ticks.
    pub tick_period: Duration,
    /// Number of actor cells.
    pub length: usize,
}

/// Phase-specific overlay drawn above the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overlay {
    /// Operation picker shown before a session starts.
    OperationMenu,
    /// Paused banner.
    Paused,
    /// Final result after a fatal collision.
    GameOver {
        /// Collision that ended the run, when known.
        cause: Option<FatalCollision>,
        /// Score at the end of the run.
        score: u32,
    },
}

/// Scene description combining the grid, actor, targets and HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Grid that composes the play area.
    pub grid: GridPresentation,
    /// Colors applied to actor and targets.
    pub palette: Palette,
    /// Actor cells, head first.
    pub actor: Vec<SceneActorCell>,
    /// Heading the actor travels in.
    pub heading: Heading,
    /// Targets currently on the grid.
    pub targets: Vec<SceneTarget>,
    /// Text shown alongside the grid.
    pub hud: HudPresentation,
    /// Overlay for the active phase, absent while running.
    pub overlay: Option<Overlay>,
}

/// Builds a scene describing the provided session snapshot.
#[must_use]
pub fn project(view: &SessionView) -> Scene {
    let actor = view
        .actor
        .iter()
        .enumerate()
        .map(|(index, position)| SceneActorCell {
            position: *position,
            is_head: index == 0,
        })
        .collect();

    let targets = view
        .targets
        .iter()
        .map(|target| SceneTarget {
            position: target.position,
            value: target.value,
        })
        .collect();

    let overlay = match view.phase {
        SessionPhase::SelectingOperation => Some(Overlay::OperationMenu),
        SessionPhase::Paused => Some(Overlay::Paused),
        SessionPhase::GameOver => Some(Overlay::GameOver {
            cause: view.fatal,
            score: view.score,
        }),
        SessionPhase::Running => None,
    };

    Scene {
        grid: default_grid(view.grid_size),
        palette: Palette::default(),
        actor,
        heading: view.heading,
        targets,
        hud: HudPresentation {
            question: view.problem.as_ref().map(|problem| problem.question().to_owned()),
            operation: view.operation,
            score: view.score,
            speed_percent: view.speed_percent(),
            tick_period: view.tick_period,
            length: view.actor.len(),
        },
        overlay,
    }
}

fn default_grid(size: GridSize) -> GridPresentation {
    GridPresentation {
        side: size.get(),
        cell_length: GridPresentation::DEFAULT_CELL_LENGTH,
        line_color: Color::from_rgb_u8(0x30, 0x30, 0x38),
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Math Snake scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta, per-frame
    /// input captured by the adapter, and replaces the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The grid must contain at least one cell.
    EmptyGrid,
    /// Cell length must be positive and finite.
    InvalidCellLength {
        /// Provided length that failed validation.
        cell_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "grid must contain at least one cell"),
            Self::InvalidCellLength { cell_length } => {
                write!(f, "cell_length must be positive (received {cell_length})")
            }
        }
    }
}

impl Error for RenderingError {}
