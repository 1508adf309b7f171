//! Keyboard dispatch for the viewer.
//!
//! Bindings live in a [`ShortcutDispatcher`] owned by the session that uses
//! them. There is no process-wide registry: each session registers its map at
//! construction and the map goes away with it. Keys are structured chords
//! rather than strings, so bindings cannot drift apart from the input layer
//! over spelling.
//!
//! [`DoublePressDetector`] implements press-twice-to-confirm for destructive
//! actions, with time injected through the [`Clock`] trait so the window can
//! be tested without sleeping.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// A physical key, independent of modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// A printable character as reported by the input layer.
    Char(char),
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Enter,
    Escape,
    Delete,
    Backspace,
    Space,
    Tab,
}

/// Modifier state held during a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        shift: false,
        alt: false,
    };
}

/// A key plus its modifiers, the unit shortcuts are bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyChord {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyChord {
    pub const fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Chord with no modifiers held.
    pub const fn bare(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    /// Chord with only Ctrl held.
    pub const fn ctrl(key: Key) -> Self {
        Self::new(key, Modifiers::CTRL)
    }
}

/// Everything a shortcut can ask the viewer session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewerAction {
    NextImage,
    PreviousImage,
    DeleteCurrent,
    CommitSelection,
    CancelSelection,
    ToggleSelectionAxis,
    SaveAs,
    OpenEditor,
    RefreshSession,
}

const DEFAULT_BINDINGS: &[(KeyChord, ViewerAction)] = &[
    (KeyChord::bare(Key::ArrowRight), ViewerAction::NextImage),
    (KeyChord::bare(Key::Space), ViewerAction::NextImage),
    (KeyChord::bare(Key::ArrowLeft), ViewerAction::PreviousImage),
    (KeyChord::bare(Key::Backspace), ViewerAction::PreviousImage),
    (KeyChord::bare(Key::Delete), ViewerAction::DeleteCurrent),
    (KeyChord::bare(Key::Enter), ViewerAction::CommitSelection),
    (KeyChord::bare(Key::Escape), ViewerAction::CancelSelection),
    (KeyChord::bare(Key::Tab), ViewerAction::ToggleSelectionAxis),
    (KeyChord::ctrl(Key::Char('s')), ViewerAction::SaveAs),
    (KeyChord::bare(Key::Char('e')), ViewerAction::OpenEditor),
    (KeyChord::bare(Key::Char('r')), ViewerAction::RefreshSession),
];

/// Owned mapping from key chords to viewer actions.
///
/// Passed by reference into whatever consumes input; dropped with the session
/// it belongs to.
#[derive(Debug, Clone, Default)]
pub struct ShortcutDispatcher {
    bindings: HashMap<KeyChord, ViewerAction>,
}

impl ShortcutDispatcher {
    /// Empty dispatcher with nothing bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher preloaded with the stock bindings.
    pub fn with_defaults() -> Self {
        let mut dispatcher = Self::new();
        for (chord, action) in DEFAULT_BINDINGS {
            dispatcher.register(*chord, *action);
        }
        dispatcher
    }

    /// Binds `chord` to `action`, returning the action it displaced.
    pub fn register(&mut self, chord: KeyChord, action: ViewerAction) -> Option<ViewerAction> {
        self.bindings.insert(chord, action)
    }

    /// Removes the binding for `chord`, returning the action it held.
    pub fn unregister(&mut self, chord: KeyChord) -> Option<ViewerAction> {
        self.bindings.remove(&chord)
    }

    /// Looks up the action bound to `chord`.
    pub fn resolve(&self, chord: KeyChord) -> Option<ViewerAction> {
        self.bindings.get(&chord).copied()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Source of the current instant. Production code uses [`SystemClock`];
/// tests substitute a controllable fake.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// [`Clock`] backed by `Instant::now`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Outcome of a qualifying press fed to [`DoublePressDetector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoublePress {
    /// First press: the detector is armed and waits for the confirmation.
    Armed,
    /// Second press within the window: the action is confirmed.
    Confirmed,
}

/// Press-twice-to-confirm state machine.
///
/// The caller feeds it every qualifying press via [`press`] and calls
/// [`disarm`] whenever any other input arrives. A press while armed and
/// inside the window confirms; an expired window is observed lazily, so a
/// late press simply arms again.
///
/// [`press`]: DoublePressDetector::press
/// [`disarm`]: DoublePressDetector::disarm
#[derive(Debug)]
pub struct DoublePressDetector<C: Clock = SystemClock> {
    window: Duration,
    clock: C,
    armed_until: Option<Instant>,
}

impl DoublePressDetector {
    pub fn new(window: Duration) -> Self {
        Self::with_clock(window, SystemClock)
    }
}

impl<C: Clock> DoublePressDetector<C> {
    pub fn with_clock(window: Duration, clock: C) -> Self {
        Self {
            window,
            clock,
            armed_until: None,
        }
    }

    /// Feeds one qualifying press into the machine.
    pub fn press(&mut self) -> DoublePress {
        let now = self.clock.now();
        match self.armed_until {
            Some(deadline) if now <= deadline => {
                self.armed_until = None;
                DoublePress::Confirmed
            }
            _ => {
                self.armed_until = Some(now + self.window);
                DoublePress::Armed
            }
        }
    }

    /// Cancels a pending confirmation. Call on any non-qualifying input.
    pub fn disarm(&mut self) {
        self.armed_until = None;
    }

    /// Whether a confirmation is still possible right now.
    pub fn is_armed(&self) -> bool {
        self.armed_until
            .map_or(false, |deadline| self.clock.now() <= deadline)
    }
}
