//! Drag-to-reorder interaction.
//!
//! # Responsibility
//! - Track pointer gestures over note cards as a small state machine.
//! - Turn a completed drag into a full replacement ordering.
//!
//! # Invariants
//! - A drag only activates once its activation constraint is met: pointer
//!   travel past a distance, or a held press past a delay.
//! - A delay-activated press that strays beyond its tolerance is abandoned.
//! - A committed ordering is always a permutation of the input sequence.
//! - Releasing on the origin card, outside any card, or before activation
//!   commits nothing.

use crate::model::note::NoteId;
use log::debug;
use std::time::{Duration, Instant};

/// Default activation distance in logical pixels.
pub const DEFAULT_ACTIVATION_DISTANCE: f32 = 8.0;
/// Default press delay for touch input.
pub const DEFAULT_TOUCH_DELAY: Duration = Duration::from_millis(200);
/// Default movement allowed while a touch press is still pending.
pub const DEFAULT_TOUCH_TOLERANCE: f32 = 8.0;

/// Pointer position in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Point at `(x, y)`.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance_to(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// When a press turns into a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    /// Mouse-style: the pointer must travel `distance` from the origin.
    Distance(f32),
    /// Touch-style: the press must be held for `delay` without moving more
    /// than `tolerance` from the origin.
    Delay { delay: Duration, tolerance: f32 },
}

impl Activation {
    /// Touch activation with the default delay and tolerance.
    pub fn touch() -> Self {
        Self::Delay {
            delay: DEFAULT_TOUCH_DELAY,
            tolerance: DEFAULT_TOUCH_TOLERANCE,
        }
    }
}

impl Default for Activation {
    fn default() -> Self {
        Self::Distance(DEFAULT_ACTIVATION_DISTANCE)
    }
}

/// Gesture state.
#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    /// Pointer is down on a card but the drag has not activated yet.
    Pressed {
        note_id: NoteId,
        origin: Point,
        pressed_at: Instant,
    },
    Dragging { note_id: NoteId },
}

/// Drag state machine for one note grid.
#[derive(Debug, Clone)]
pub struct DragController {
    activation: Activation,
    state: DragState,
}

impl Default for DragController {
    fn default() -> Self {
        Self::with_activation(Activation::default())
    }
}

impl DragController {
    /// Distance-activated controller.
    pub fn new(activation_distance: f32) -> Self {
        Self::with_activation(Activation::Distance(activation_distance))
    }

    /// Controller with an explicit activation constraint.
    pub fn with_activation(activation: Activation) -> Self {
        let activation = match activation {
            Activation::Distance(distance) => Activation::Distance(distance.max(0.0)),
            Activation::Delay { delay, tolerance } => Activation::Delay {
                delay,
                tolerance: tolerance.max(0.0),
            },
        };
        Self {
            activation,
            state: DragState::Idle,
        }
    }

    /// Constraint this controller activates drags with.
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Current gesture state.
    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Returns whether a drag has activated and not yet ended.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Pointer pressed on the card for `note_id`.
    pub fn pointer_down(&mut self, note_id: impl Into<NoteId>, at: Point) {
        self.pointer_down_at(note_id, at, Instant::now());
    }

    /// `pointer_down` with an explicit press time.
    pub fn pointer_down_at(&mut self, note_id: impl Into<NoteId>, at: Point, now: Instant) {
        self.state = DragState::Pressed {
            note_id: note_id.into(),
            origin: at,
            pressed_at: now,
        };
    }

    /// Pointer moved; activates the drag once the constraint is met.
    ///
    /// Returns `true` when this move started the drag.
    pub fn pointer_move(&mut self, to: Point) -> bool {
        self.pointer_move_at(to, Instant::now())
    }

    /// `pointer_move` with an explicit event time.
    pub fn pointer_move_at(&mut self, to: Point, now: Instant) -> bool {
        let (origin, pressed_at) = match &self.state {
            DragState::Pressed {
                origin, pressed_at, ..
            } => (*origin, *pressed_at),
            _ => return false,
        };
        let travelled = origin.distance_to(to);

        match self.activation {
            Activation::Distance(distance) => travelled >= distance && self.activate(),
            Activation::Delay { delay, tolerance } => {
                if now.saturating_duration_since(pressed_at) >= delay {
                    self.activate()
                } else if travelled > tolerance {
                    debug!("event=drag_abort module=reorder reason=moved_before_delay");
                    self.state = DragState::Idle;
                    false
                } else {
                    false
                }
            }
        }
    }

    /// Press held still until `now`; activates a delay-constrained drag once
    /// the delay has passed.
    ///
    /// Returns `true` when this call started the drag.
    pub fn pointer_hold_at(&mut self, now: Instant) -> bool {
        let Activation::Delay { delay, .. } = self.activation else {
            return false;
        };
        let held = matches!(
            &self.state,
            DragState::Pressed { pressed_at, .. }
                if now.saturating_duration_since(*pressed_at) >= delay
        );
        held && self.activate()
    }

    fn activate(&mut self) -> bool {
        let note_id = match &self.state {
            DragState::Pressed { note_id, .. } => note_id.clone(),
            _ => return false,
        };
        debug!("event=drag_start module=reorder note_id={note_id}");
        self.state = DragState::Dragging { note_id };
        true
    }

    /// Pointer released over `over` (a card id), or outside any card.
    ///
    /// Returns the new full ordering of `sequence` when a move happened.
    pub fn pointer_up(&mut self, over: Option<&str>, sequence: &[NoteId]) -> Option<Vec<NoteId>> {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        let DragState::Dragging { note_id } = state else {
            return None;
        };
        drop_ordering(&note_id, over, sequence)
    }

    /// Abandons any gesture in progress.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

/// Ordering that results from dropping `active` onto `over` within `sequence`.
///
/// `None` when dropped outside any card, onto itself, or when either id is
/// not part of `sequence`.
pub fn drop_ordering(active: &str, over: Option<&str>, sequence: &[NoteId]) -> Option<Vec<NoteId>> {
    let target = over?;
    if target == active {
        return None;
    }

    let from = sequence.iter().position(|id| id == active)?;
    let to = sequence.iter().position(|id| id == target)?;
    debug!("event=drag_drop module=reorder note_id={active} from={from} to={to}");
    Some(move_item(sequence, from, to))
}

/// Moves the element at `from` to index `to`, shifting the rest.
///
/// Out-of-range indices return the input unchanged.
pub fn move_item<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut moved = items.to_vec();
    if from >= moved.len() || to >= moved.len() || from == to {
        return moved;
    }
    let item = moved.remove(from);
    moved.insert(to, item);
    moved
}

#[cfg(test)]
mod tests {
    use super::{drop_ordering, move_item, Activation, DragController, DragState, Point};
    use std::time::{Duration, Instant};

    fn seq(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn move_item_is_a_single_element_move_not_a_swap() {
        assert_eq!(move_item(&[1, 2, 3, 4], 0, 2), vec![2, 3, 1, 4]);
        assert_eq!(move_item(&[1, 2, 3, 4], 3, 1), vec![1, 4, 2, 3]);
        assert_eq!(move_item(&[1, 2], 0, 5), vec![1, 2]);
    }

    #[test]
    fn drag_activates_only_past_threshold() {
        let mut drag = DragController::default();
        drag.pointer_down("a", Point::new(0.0, 0.0));
        assert!(!drag.pointer_move(Point::new(3.0, 4.0)));
        assert!(matches!(drag.state(), DragState::Pressed { .. }));
        assert!(drag.pointer_move(Point::new(6.0, 8.0)));
        assert!(drag.is_dragging());
    }

    #[test]
    fn release_over_other_card_yields_reordered_sequence() {
        let sequence = seq(&["a", "b", "c"]);
        let mut drag = DragController::default();
        drag.pointer_down("a", Point::new(0.0, 0.0));
        drag.pointer_move(Point::new(50.0, 0.0));
        let order = drag.pointer_up(Some("c"), &sequence).unwrap();
        assert_eq!(order, seq(&["b", "c", "a"]));
        assert_eq!(drag.state(), &DragState::Idle);
    }

    #[test]
    fn release_on_origin_outside_or_before_activation_commits_nothing() {
        let sequence = seq(&["a", "b"]);
        let mut drag = DragController::default();

        drag.pointer_down("a", Point::new(0.0, 0.0));
        assert!(drag.pointer_up(Some("b"), &sequence).is_none());

        drag.pointer_down("a", Point::new(0.0, 0.0));
        drag.pointer_move(Point::new(20.0, 0.0));
        assert!(drag.pointer_up(Some("a"), &sequence).is_none());

        drag.pointer_down("a", Point::new(0.0, 0.0));
        drag.pointer_move(Point::new(20.0, 0.0));
        assert!(drag.pointer_up(None, &sequence).is_none());
        assert_eq!(drag.state(), &DragState::Idle);
    }

    #[test]
    fn cancel_returns_to_idle() {
        let mut drag = DragController::default();
        drag.pointer_down("a", Point::new(0.0, 0.0));
        drag.pointer_move(Point::new(20.0, 0.0));
        drag.cancel();
        assert_eq!(drag.state(), &DragState::Idle);
    }

    #[test]
    fn touch_press_activates_after_delay_within_tolerance() {
        let start = Instant::now();
        let mut drag = DragController::with_activation(Activation::touch());
        drag.pointer_down_at("a", Point::new(0.0, 0.0), start);

        assert!(!drag.pointer_move_at(Point::new(4.0, 0.0), start + Duration::from_millis(50)));
        assert!(!drag.pointer_hold_at(start + Duration::from_millis(150)));
        assert!(matches!(drag.state(), DragState::Pressed { .. }));

        assert!(drag.pointer_hold_at(start + Duration::from_millis(200)));
        assert!(drag.is_dragging());
        let order = drag.pointer_up(Some("b"), &seq(&["a", "b"])).unwrap();
        assert_eq!(order, seq(&["b", "a"]));
    }

    #[test]
    fn touch_press_moved_past_tolerance_before_delay_is_abandoned() {
        let start = Instant::now();
        let mut drag = DragController::with_activation(Activation::touch());
        drag.pointer_down_at("a", Point::new(0.0, 0.0), start);

        assert!(!drag.pointer_move_at(Point::new(0.0, 30.0), start + Duration::from_millis(100)));
        assert_eq!(drag.state(), &DragState::Idle);
        assert!(!drag.pointer_hold_at(start + Duration::from_millis(300)));
        assert!(!drag.is_dragging());
    }

    #[test]
    fn distance_activation_ignores_hold() {
        let start = Instant::now();
        let mut drag = DragController::default();
        drag.pointer_down_at("a", Point::new(0.0, 0.0), start);
        assert!(!drag.pointer_hold_at(start + Duration::from_secs(5)));
        assert!(matches!(drag.state(), DragState::Pressed { .. }));
    }

    #[test]
    fn drop_ordering_works_on_ids_outside_any_gesture() {
        let sequence = seq(&["a", "b", "c", "d"]);
        assert_eq!(
            drop_ordering("d", Some("b"), &sequence),
            Some(seq(&["a", "d", "b", "c"]))
        );
        assert_eq!(drop_ordering("d", Some("d"), &sequence), None);
        assert_eq!(drop_ordering("d", None, &sequence), None);
        assert_eq!(drop_ordering("ghost", Some("a"), &sequence), None);
    }
}
