// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `understory_drag_drop` crate.
//!
//! These drive `DragCoordinator` against a small element tree whose handlers
//! are scripted per element, and check the order of raised events, effect
//! negotiation and the single terminal result.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use kurbo::{Point, Rect};
use proptest::prelude::*;
use understory_drag_drop::routed::{bubble_path, raise_bubbling};
use understory_drag_drop::{
    DragAction, DragCoordinator, DragDropEffects, DragDropKeyStates, DragError, DragEventArgs,
    DragEventKind, DragHost, DragPhase, GiveFeedbackArgs, QueryContinueDragArgs,
    negotiate_effects,
};

const ROOT: u32 = 0;
const SOURCE: u32 = 1;
const TARGET: u32 = 2;
const OTHER: u32 = 3;
const INERT: u32 = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Seen {
    Drag(DragEventKind, u32),
    Feedback(DragDropEffects),
    Query(DragAction),
}

#[derive(Copy, Clone, Debug, Default)]
struct Response {
    effects: Option<DragDropEffects>,
    handled: bool,
}

struct Element {
    parent: Option<u32>,
    bounds: Rect,
    allow_drop: bool,
}

#[derive(Debug, PartialEq, Eq)]
struct Boom;

impl std::fmt::Display for Boom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("boom")
    }
}

/// Root at 0 with four children laid out left to right.
struct Host {
    elements: Vec<Element>,
    responses: HashMap<(DragEventKind, u32), Response>,
    source_answer: Option<DragAction>,
    fail_on: Option<DragEventKind>,
    seen: Vec<Seen>,
}

impl Host {
    fn new() -> Self {
        let child = |x: f64, allow_drop| Element {
            parent: Some(ROOT),
            bounds: Rect::new(x, 0., x + 100., 100.),
            allow_drop,
        };
        Self {
            elements: vec![
                Element {
                    parent: None,
                    bounds: Rect::new(0., 0., 1000., 1000.),
                    allow_drop: false,
                },
                child(0., false),
                child(100., true),
                child(200., true),
                child(300., false),
            ],
            responses: HashMap::new(),
            source_answer: None,
            fail_on: None,
            seen: Vec::new(),
        }
    }

    /// Makes `element` handle every drag event, reporting `effects`.
    fn accept(&mut self, element: u32, effects: DragDropEffects) {
        for kind in [
            DragEventKind::Enter,
            DragEventKind::Over,
            DragEventKind::Leave,
            DragEventKind::Drop,
        ] {
            self.respond(kind, element, Some(effects), true);
        }
    }

    fn respond(
        &mut self,
        kind: DragEventKind,
        element: u32,
        effects: Option<DragDropEffects>,
        handled: bool,
    ) {
        self.responses
            .insert((kind, element), Response { effects, handled });
    }

    fn drag_events(&self) -> Vec<(DragEventKind, u32)> {
        self.seen
            .iter()
            .filter_map(|seen| match seen {
                Seen::Drag(kind, element) => Some((*kind, *element)),
                _ => None,
            })
            .collect()
    }

    fn last_feedback(&self) -> Option<DragDropEffects> {
        self.seen.iter().rev().find_map(|seen| match seen {
            Seen::Feedback(effects) => Some(*effects),
            _ => None,
        })
    }
}

impl DragHost<String> for Host {
    type Key = u32;
    type Error = Boom;

    fn raise_drag_event(
        &mut self,
        kind: DragEventKind,
        target: u32,
        args: &mut DragEventArgs<u32, String>,
    ) -> Result<(), Boom> {
        if self.fail_on == Some(kind) {
            return Err(Boom);
        }
        let path = bubble_path(target, |node| self.elements[node as usize].parent);
        let responses = &self.responses;
        let seen = &mut self.seen;
        raise_bubbling(&path, args, |node, args| {
            seen.push(Seen::Drag(kind, node));
            if let Some(response) = responses.get(&(kind, node)) {
                if let Some(effects) = response.effects {
                    args.effects = effects;
                }
                args.handled = response.handled;
            }
            Ok::<(), Boom>(())
        })?;
        Ok(())
    }

    fn raise_give_feedback(
        &mut self,
        _source: u32,
        args: &mut GiveFeedbackArgs<u32>,
    ) -> Result<(), Boom> {
        self.seen.push(Seen::Feedback(args.effects));
        Ok(())
    }

    fn raise_query_continue_drag(
        &mut self,
        _source: u32,
        args: &mut QueryContinueDragArgs<u32>,
    ) -> Result<(), Boom> {
        if let Some(action) = self.source_answer {
            args.action = action;
            args.handled = true;
        }
        self.seen.push(Seen::Query(args.action));
        Ok(())
    }

    fn allows_drop(&self, element: u32) -> bool {
        self.elements[element as usize].allow_drop
    }

    fn contains_point(&self, element: u32, point: Point) -> bool {
        self.elements[element as usize].bounds.contains(point)
    }

    fn visual_children(&self, element: u32) -> impl Iterator<Item = u32> + '_ {
        (0..self.elements.len())
            .map(|idx| u32::try_from(idx).unwrap())
            .filter(move |&idx| self.elements[idx as usize].parent == Some(element))
    }

    fn parent(&self, element: u32) -> Option<u32> {
        self.elements[element as usize].parent
    }

    fn root_visual(&self) -> Option<u32> {
        Some(ROOT)
    }
}

type Results = Rc<RefCell<Vec<DragDropEffects>>>;

fn start(
    drags: &mut DragCoordinator<u32, String>,
    host: &mut Host,
    allowed: DragDropEffects,
    keys: DragDropKeyStates,
) -> Results {
    let results = Results::default();
    let sink = Rc::clone(&results);
    drags
        .start(host, SOURCE, "payload".to_string(), allowed, keys, move |effects| {
            sink.borrow_mut().push(effects);
        })
        .unwrap();
    results
}

fn over(element: u32) -> Point {
    Point::new(f64::from(element) * 100. - 50., 50.)
}

#[test]
fn start_queries_source_then_gives_feedback() {
    let mut host = Host::new();
    let mut drags = DragCoordinator::default();
    start(
        &mut drags,
        &mut host,
        DragDropEffects::ALL,
        DragDropKeyStates::LEFT_MOUSE_BUTTON,
    );

    assert_eq!(
        host.seen,
        vec![
            Seen::Query(DragAction::Continue),
            Seen::Feedback(DragDropEffects::MOVE),
        ]
    );
    assert_eq!(drags.phase(), Some(DragPhase::Active));
    let session = drags.session().unwrap();
    assert_eq!(session.source(), SOURCE);
    assert_eq!(session.data(), "payload");
    assert_eq!(session.current_target(), None);
}

#[test]
fn only_one_session_at_a_time() {
    let mut host = Host::new();
    let mut drags = DragCoordinator::default();
    let results = start(
        &mut drags,
        &mut host,
        DragDropEffects::MOVE,
        DragDropKeyStates::LEFT_MOUSE_BUTTON,
    );
    let first = drags.session().unwrap().id();

    let second_results = Results::default();
    let sink = Rc::clone(&second_results);
    let err = drags
        .start(
            &mut host,
            OTHER,
            "second".to_string(),
            DragDropEffects::COPY,
            DragDropKeyStates::LEFT_MOUSE_BUTTON,
            move |effects| sink.borrow_mut().push(effects),
        )
        .unwrap_err();
    assert_eq!(err, DragError::AlreadyActive);
    assert_eq!(drags.session().unwrap().id(), first);
    assert_eq!(drags.session().unwrap().source(), SOURCE);

    drags.escape_changed(&mut host, true).unwrap();
    assert_eq!(*results.borrow(), vec![DragDropEffects::NONE]);
    assert!(second_results.borrow().is_empty());
    assert!(!drags.is_active());

    let again = start(
        &mut drags,
        &mut host,
        DragDropEffects::MOVE,
        DragDropKeyStates::LEFT_MOUSE_BUTTON,
    );
    assert!(drags.is_active());
    assert!(drags.session().unwrap().id() > first);
    assert!(again.borrow().is_empty());
}

#[test]
fn debug_output_names_the_active_session() {
    let mut host = Host::new();
    let mut drags = DragCoordinator::default();
    start(
        &mut drags,
        &mut host,
        DragDropEffects::MOVE,
        DragDropKeyStates::LEFT_MOUSE_BUTTON,
    );
    let id = drags.session().unwrap().id();
    let text = format!("{drags:?}");
    assert!(text.contains(&format!("active: Some({id:?})")), "{text}");

    drags.cancel(&mut host).unwrap();
    assert!(format!("{drags:?}").contains("active: None"));
}

#[test]
fn three_pulses_then_release_drops_with_move() {
    let mut host = Host::new();
    host.accept(TARGET, DragDropEffects::MOVE);
    let mut drags = DragCoordinator::default();
    let results = start(
        &mut drags,
        &mut host,
        DragDropEffects::MOVE,
        DragDropKeyStates::LEFT_MOUSE_BUTTON,
    );

    drags
        .pointer_moved(&mut host, TARGET, over(TARGET), 1_000)
        .unwrap();
    for now in [1_250, 1_500, 1_750] {
        assert_eq!(drags.tick(&mut host, now).unwrap(), None);
    }
    let overs = host
        .drag_events()
        .iter()
        .filter(|event| **event == (DragEventKind::Over, TARGET))
        .count();
    assert_eq!(overs, 4, "one drag-over for the move and three pulses");
    assert_eq!(host.last_feedback(), Some(DragDropEffects::MOVE));

    let done = drags
        .key_states_changed(&mut host, DragDropKeyStates::empty())
        .unwrap();
    assert_eq!(done, Some(DragDropEffects::MOVE));
    assert_eq!(*results.borrow(), vec![DragDropEffects::MOVE]);
    assert_eq!(host.drag_events().last(), Some(&(DragEventKind::Drop, TARGET)));
    assert!(!drags.is_active());
}

#[test]
fn pulses_wait_for_the_interval() {
    let mut host = Host::new();
    host.accept(TARGET, DragDropEffects::COPY);
    let mut drags = DragCoordinator::default();
    start(
        &mut drags,
        &mut host,
        DragDropEffects::COPY,
        DragDropKeyStates::LEFT_MOUSE_BUTTON,
    );

    drags.tick(&mut host, 5_000).unwrap();
    assert!(host.drag_events().is_empty(), "no pulses before the pointer moves");

    drags
        .pointer_moved(&mut host, TARGET, over(TARGET), 0)
        .unwrap();
    let after_move = host.drag_events().len();
    drags.tick(&mut host, 249).unwrap();
    assert_eq!(host.drag_events().len(), after_move);

    // A new move restarts the pulse clock.
    drags
        .pointer_moved(&mut host, TARGET, over(TARGET), 200)
        .unwrap();
    let after_second_move = host.drag_events().len();
    drags.tick(&mut host, 300).unwrap();
    assert_eq!(host.drag_events().len(), after_second_move);
    drags.tick(&mut host, 450).unwrap();
    assert_eq!(host.drag_events().len(), after_second_move + 1);
}

#[test]
fn custom_pulse_interval() {
    use core::time::Duration;
    use understory_drag_drop::DragConfig;

    let mut host = Host::new();
    host.accept(TARGET, DragDropEffects::COPY);
    let mut drags = DragCoordinator::new(
        DragConfig::default().with_pulse_interval(Duration::from_millis(40)),
    );
    start(
        &mut drags,
        &mut host,
        DragDropEffects::COPY,
        DragDropKeyStates::LEFT_MOUSE_BUTTON,
    );
    drags
        .pointer_moved(&mut host, TARGET, over(TARGET), 0)
        .unwrap();
    let after_move = host.drag_events().len();
    drags.tick(&mut host, 40).unwrap();
    assert_eq!(host.drag_events().len(), after_move + 1);
}

#[test]
fn unhandled_drop_still_reports_target_effect() {
    let mut host = Host::new();
    host.respond(DragEventKind::Drop, TARGET, Some(DragDropEffects::COPY), false);
    let mut drags = DragCoordinator::default();
    let results = start(
        &mut drags,
        &mut host,
        DragDropEffects::ALL,
        DragDropKeyStates::LEFT_MOUSE_BUTTON,
    );

    drags
        .pointer_moved(&mut host, TARGET, over(TARGET), 0)
        .unwrap();
    let done = drags
        .key_states_changed(&mut host, DragDropKeyStates::empty())
        .unwrap();

    assert_eq!(done, Some(DragDropEffects::COPY));
    assert_eq!(*results.borrow(), vec![DragDropEffects::COPY]);
    // The unhandled drop bubbled to the root.
    assert_eq!(
        host.drag_events()[host.drag_events().len() - 2..],
        [(DragEventKind::Drop, TARGET), (DragEventKind::Drop, ROOT)]
    );
}

#[test]
fn moving_between_targets_leaves_then_enters() {
    let mut host = Host::new();
    host.accept(TARGET, DragDropEffects::COPY);
    host.accept(OTHER, DragDropEffects::COPY);
    let mut drags = DragCoordinator::default();
    start(
        &mut drags,
        &mut host,
        DragDropEffects::COPY,
        DragDropKeyStates::LEFT_MOUSE_BUTTON,
    );

    drags
        .pointer_moved(&mut host, TARGET, over(TARGET), 0)
        .unwrap();
    drags
        .pointer_moved(&mut host, TARGET, over(TARGET), 10)
        .unwrap();
    drags
        .pointer_moved(&mut host, OTHER, over(OTHER), 20)
        .unwrap();

    assert_eq!(
        host.drag_events(),
        vec![
            (DragEventKind::Enter, TARGET),
            (DragEventKind::Over, TARGET),
            (DragEventKind::Over, TARGET),
            (DragEventKind::Leave, TARGET),
            (DragEventKind::Enter, OTHER),
            (DragEventKind::Over, OTHER),
        ]
    );
    assert_eq!(drags.session().unwrap().current_target(), Some(OTHER));
}

#[test]
fn every_drag_event_is_followed_by_source_events() {
    let mut host = Host::new();
    host.accept(TARGET, DragDropEffects::LINK);
    let mut drags = DragCoordinator::default();
    start(
        &mut drags,
        &mut host,
        DragDropEffects::COPY | DragDropEffects::LINK,
        DragDropKeyStates::LEFT_MOUSE_BUTTON,
    );
    host.seen.clear();

    drags
        .pointer_moved(&mut host, TARGET, over(TARGET), 0)
        .unwrap();
    assert_eq!(
        host.seen,
        vec![
            Seen::Drag(DragEventKind::Enter, TARGET),
            Seen::Feedback(DragDropEffects::LINK),
            Seen::Query(DragAction::Continue),
            Seen::Drag(DragEventKind::Over, TARGET),
            Seen::Feedback(DragDropEffects::LINK),
            Seen::Query(DragAction::Continue),
        ]
    );
}

#[test]
fn escape_cancels_with_leave() {
    let mut host = Host::new();
    host.accept(TARGET, DragDropEffects::MOVE);
    let mut drags = DragCoordinator::default();
    let results = start(
        &mut drags,
        &mut host,
        DragDropEffects::MOVE,
        DragDropKeyStates::LEFT_MOUSE_BUTTON,
    );
    drags
        .pointer_moved(&mut host, TARGET, over(TARGET), 0)
        .unwrap();

    let done = drags.escape_changed(&mut host, true).unwrap();
    assert_eq!(done, Some(DragDropEffects::NONE));
    assert_eq!(host.drag_events().last(), Some(&(DragEventKind::Leave, TARGET)));
    assert_eq!(*results.borrow(), vec![DragDropEffects::NONE]);

    // Later input for the finished drag is ignored.
    let seen = host.seen.len();
    assert_eq!(drags.escape_changed(&mut host, false), Ok(None));
    assert_eq!(
        drags.pointer_moved(&mut host, OTHER, over(OTHER), 10),
        Ok(None)
    );
    assert_eq!(host.seen.len(), seen);
    assert_eq!(results.borrow().len(), 1);
}

#[test]
fn release_over_rejecting_target_cancels() {
    let mut host = Host::new();
    let mut drags = DragCoordinator::default();
    let results = start(
        &mut drags,
        &mut host,
        DragDropEffects::MOVE,
        DragDropKeyStates::LEFT_MOUSE_BUTTON,
    );

    drags
        .pointer_moved(&mut host, INERT, over(INERT), 0)
        .unwrap();
    // Elements that refuse drops are never dispatched to.
    assert!(host.drag_events().is_empty());
    assert_eq!(host.last_feedback(), Some(DragDropEffects::NONE));

    let done = drags
        .key_states_changed(&mut host, DragDropKeyStates::empty())
        .unwrap();
    assert_eq!(done, Some(DragDropEffects::NONE));
    assert_eq!(*results.borrow(), vec![DragDropEffects::NONE]);
}

#[test]
fn modifier_keys_change_feedback() {
    let mut host = Host::new();
    // The target neither handles nor reports, so feedback is negotiated.
    let mut drags = DragCoordinator::default();
    start(
        &mut drags,
        &mut host,
        DragDropEffects::ALL,
        DragDropKeyStates::LEFT_MOUSE_BUTTON,
    );
    drags
        .pointer_moved(&mut host, TARGET, over(TARGET), 0)
        .unwrap();
    assert_eq!(host.last_feedback(), Some(DragDropEffects::MOVE));

    let held = DragDropKeyStates::LEFT_MOUSE_BUTTON;
    drags
        .key_states_changed(&mut host, held | DragDropKeyStates::CONTROL_KEY)
        .unwrap();
    assert_eq!(host.last_feedback(), Some(DragDropEffects::COPY));

    drags
        .key_states_changed(
            &mut host,
            held | DragDropKeyStates::CONTROL_KEY | DragDropKeyStates::SHIFT_KEY,
        )
        .unwrap();
    assert_eq!(host.last_feedback(), Some(DragDropEffects::LINK));
    assert_eq!(
        drags.session().unwrap().key_states(),
        held | DragDropKeyStates::CONTROL_KEY | DragDropKeyStates::SHIFT_KEY
    );
}

#[test]
fn stale_source_is_recovered_on_pulse() {
    let mut host = Host::new();
    host.accept(TARGET, DragDropEffects::MOVE);
    host.accept(OTHER, DragDropEffects::MOVE);
    let mut drags = DragCoordinator::default();
    start(
        &mut drags,
        &mut host,
        DragDropEffects::MOVE,
        DragDropKeyStates::LEFT_MOUSE_BUTTON,
    );

    let point = over(TARGET);
    drags.pointer_moved(&mut host, TARGET, point, 0).unwrap();

    // The target slides away and the other element ends up under the pointer.
    host.elements[TARGET as usize].bounds = Rect::new(600., 0., 700., 100.);
    host.elements[OTHER as usize].bounds = Rect::new(100., 0., 200., 100.);
    drags.tick(&mut host, 250).unwrap();

    assert_eq!(drags.session().unwrap().current_target(), Some(OTHER));
    assert_eq!(
        host.drag_events()[2..],
        [
            (DragEventKind::Leave, TARGET),
            (DragEventKind::Enter, OTHER),
            (DragEventKind::Over, OTHER),
        ]
    );
}

#[test]
fn source_can_cancel_before_the_drag_starts() {
    let mut host = Host::new();
    host.source_answer = Some(DragAction::Cancel);
    let mut drags = DragCoordinator::default();
    let results = start(
        &mut drags,
        &mut host,
        DragDropEffects::MOVE,
        DragDropKeyStates::LEFT_MOUSE_BUTTON,
    );

    assert_eq!(*results.borrow(), vec![DragDropEffects::NONE]);
    assert!(!drags.is_active());
    // No feedback is given for a drag the source refused.
    assert_eq!(host.seen, vec![Seen::Query(DragAction::Cancel)]);
}

#[test]
fn source_answer_overrides_default() {
    let mut host = Host::new();
    host.accept(TARGET, DragDropEffects::MOVE);
    let mut drags = DragCoordinator::default();
    let results = start(
        &mut drags,
        &mut host,
        DragDropEffects::MOVE,
        DragDropKeyStates::LEFT_MOUSE_BUTTON,
    );
    drags
        .pointer_moved(&mut host, TARGET, over(TARGET), 0)
        .unwrap();

    // The source keeps the drag going although the button is up.
    host.source_answer = Some(DragAction::Continue);
    assert_eq!(
        drags.key_states_changed(&mut host, DragDropKeyStates::empty()),
        Ok(None)
    );
    assert!(drags.is_active());

    host.source_answer = Some(DragAction::Drop);
    let done = drags.tick(&mut host, 250).unwrap();
    assert_eq!(done, Some(DragDropEffects::MOVE));
    assert_eq!(*results.borrow(), vec![DragDropEffects::MOVE]);
}

#[test]
fn explicit_cancel() {
    let mut host = Host::new();
    host.accept(TARGET, DragDropEffects::COPY);
    let mut drags = DragCoordinator::default();
    assert_eq!(drags.cancel(&mut host), Err(DragError::NoActiveSession));

    let results = start(
        &mut drags,
        &mut host,
        DragDropEffects::COPY,
        DragDropKeyStates::LEFT_MOUSE_BUTTON,
    );
    drags
        .pointer_moved(&mut host, TARGET, over(TARGET), 0)
        .unwrap();

    assert_eq!(drags.cancel(&mut host), Ok(DragDropEffects::NONE));
    assert_eq!(host.drag_events().last(), Some(&(DragEventKind::Leave, TARGET)));
    assert_eq!(*results.borrow(), vec![DragDropEffects::NONE]);
    assert!(!drags.is_active());
}

#[test]
fn host_error_abandons_session_without_result() {
    let mut host = Host::new();
    host.accept(TARGET, DragDropEffects::COPY);
    host.fail_on = Some(DragEventKind::Over);
    let mut drags = DragCoordinator::default();
    let results = start(
        &mut drags,
        &mut host,
        DragDropEffects::COPY,
        DragDropKeyStates::LEFT_MOUSE_BUTTON,
    );

    let err = drags
        .pointer_moved(&mut host, TARGET, over(TARGET), 0)
        .unwrap_err();
    assert_eq!(err, DragError::Host(Boom));
    assert!(!drags.is_active());
    assert!(results.borrow().is_empty());

    host.fail_on = None;
    start(
        &mut drags,
        &mut host,
        DragDropEffects::COPY,
        DragDropKeyStates::LEFT_MOUSE_BUTTON,
    );
    assert!(drags.is_active());
}

#[test]
fn error_messages() {
    assert_eq!(
        DragError::<Boom>::AlreadyActive.to_string(),
        "a drag operation is already in progress"
    );
    assert_eq!(
        DragError::<Boom>::NoActiveSession.to_string(),
        "no drag operation is in progress"
    );
    assert_eq!(
        DragError::Host(Boom).to_string(),
        "drag event dispatch failed: boom"
    );
}

fn effects_strategy() -> impl Strategy<Value = DragDropEffects> {
    (0_u32..8).prop_map(DragDropEffects::from_bits_truncate)
}

fn keys_strategy() -> impl Strategy<Value = DragDropKeyStates> {
    (0_u8..64).prop_map(DragDropKeyStates::from_bits_truncate)
}

proptest! {
    #[test]
    fn negotiated_effect_is_allowed(allowed in effects_strategy(), keys in keys_strategy()) {
        let effects = negotiate_effects(allowed, keys);
        prop_assert!(allowed.contains(effects));
    }

    #[test]
    fn negotiation_ignores_buttons_and_alt(allowed in effects_strategy(), keys in keys_strategy()) {
        let modifiers = keys & (DragDropKeyStates::CONTROL_KEY | DragDropKeyStates::SHIFT_KEY);
        prop_assert_eq!(negotiate_effects(allowed, keys), negotiate_effects(allowed, modifiers));
    }
}
