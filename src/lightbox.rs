//! Modal image viewer.
//!
//! Two states, `Closed` and `Open`. Opening captures three things: the
//! navigation domain (the ordered sequence of every rendered grid image,
//! frozen at open time), the activated image's position within it, and
//! the page element that held focus (so close can restore it). While
//! open the overlay is modal: page scroll is locked and keyboard focus
//! cycles strictly among the overlay's own controls.
//!
//! Everything that used to be page-wide mutable state in gallery
//! implementations of this shape (the current image, the previously
//! focused element) lives here as plain fields, so several independent
//! instances can exist side by side and tests need no global setup.
//!
//! ## Keyboard contract (only while open)
//!
//! | Key | Effect |
//! |-----|--------|
//! | Escape | close, restore focus |
//! | ArrowLeft / ArrowRight | navigate −1 / +1, wrapping |
//! | Tab / Shift-Tab | cycle focus over close → prev → next |

use crate::grid::ImageHandle;
use maud::{Markup, html};
use tracing::debug;

/// Keyboard input the lightbox understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    Tab { shift: bool },
}

/// Identifies a focusable element on the underlying page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// The overlay's interactive controls, in trap cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Close,
    Prev,
    Next,
}

const TRAP_CYCLE: [Control; 3] = [Control::Close, Control::Prev, Control::Next];

/// Where a pointer activation landed on the open overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayClick {
    /// The dimmed backdrop around the image: closes.
    Backdrop,
    /// The image itself: inert.
    Image,
}

/// One entry of the navigation domain, captured at open time.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainEntry {
    pub handle: ImageHandle,
    /// Best available full-resolution source for this item.
    pub src: String,
    pub alt: String,
}

/// The modal overlay state machine. Starts closed.
#[derive(Debug, Default)]
pub struct Lightbox {
    open: bool,
    /// Position of the displayed image within `domain`. `None` while
    /// closed, or when the activated image could not be located (the
    /// degenerate case: the overlay still shows it, navigation no-ops).
    position: Option<usize>,
    domain: Vec<DomainEntry>,
    /// Shown when the activated image was not found in the domain.
    orphan: Option<DomainEntry>,
    /// First focused element captured this session; restored on every
    /// close and kept for later opens.
    prev_focus: Option<ElementId>,
    focused: Option<Control>,
    scroll_locked: bool,
}

impl Lightbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Modal semantics: underlying page scroll is blocked while open.
    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    pub fn focused(&self) -> Option<Control> {
        self.focused
    }

    /// The entry currently displayed, if any.
    pub fn current(&self) -> Option<&DomainEntry> {
        match self.position {
            Some(pos) => self.domain.get(pos),
            None => self.orphan.as_ref(),
        }
    }

    /// Position counter, `"{k+1} / {total}"`, when the displayed image
    /// has a known position.
    pub fn counter(&self) -> Option<String> {
        self.position
            .map(|pos| format!("{} / {}", pos + 1, self.domain.len()))
    }

    /// Open on an activated grid image.
    ///
    /// `domain` is the ordered sequence of all currently rendered grid
    /// images; `page_focus` is whatever held focus on the page. Only the
    /// first open of the session captures the focus to restore; later
    /// opens keep the original capture.
    pub fn open(
        &mut self,
        activated: DomainEntry,
        domain: Vec<DomainEntry>,
        page_focus: Option<ElementId>,
    ) {
        if self.prev_focus.is_none() {
            self.prev_focus = page_focus;
        }
        self.position = domain.iter().position(|e| e.handle == activated.handle);
        self.orphan = match self.position {
            Some(_) => None,
            None => Some(activated),
        };
        self.domain = domain;
        self.open = true;
        self.scroll_locked = true;
        self.focused = Some(Control::Close);
        debug!(position = ?self.position, total = self.domain.len(), "lightbox opened");
    }

    /// Step through the navigation domain, wrapping at both ends. Only
    /// valid while open; a no-op when the displayed image has no known
    /// position in the domain.
    pub fn navigate(&mut self, delta: i64) {
        if !self.open || self.domain.is_empty() {
            return;
        }
        let Some(pos) = self.position else {
            return;
        };
        let total = self.domain.len() as i64;
        self.position = Some(((pos as i64 + delta % total + total) % total) as usize);
    }

    /// Close and hand back the element that should regain focus.
    pub fn close(&mut self) -> Option<ElementId> {
        if !self.open {
            return None;
        }
        self.open = false;
        self.position = None;
        self.orphan = None;
        self.domain.clear();
        self.focused = None;
        self.scroll_locked = false;
        debug!("lightbox closed");
        self.prev_focus.clone()
    }

    /// Pointer activation on the open overlay. Clicking the backdrop
    /// closes; clicking the image does nothing.
    pub fn on_overlay_click(&mut self, target: OverlayClick) -> Option<ElementId> {
        match target {
            OverlayClick::Backdrop if self.open => self.close(),
            _ => None,
        }
    }

    /// Keyboard input. Ignored entirely while closed. Returns the focus
    /// restore target when the key closed the overlay.
    pub fn on_key(&mut self, key: Key) -> Option<ElementId> {
        if !self.open {
            return None;
        }
        match key {
            Key::Escape => return self.close(),
            Key::ArrowLeft => self.navigate(-1),
            Key::ArrowRight => self.navigate(1),
            Key::Tab { shift } => self.cycle_focus(shift),
        }
        None
    }

    /// Focus trap: cycle over the overlay's own controls, wrapping both
    /// directions. Focus never escapes to the page while open.
    fn cycle_focus(&mut self, reverse: bool) {
        let len = TRAP_CYCLE.len();
        let next = match self.focused.and_then(|c| TRAP_CYCLE.iter().position(|t| *t == c)) {
            Some(i) if reverse => (i + len - 1) % len,
            Some(i) => (i + 1) % len,
            None if reverse => len - 1,
            None => 0,
        };
        self.focused = Some(TRAP_CYCLE[next]);
    }

    /// Render the overlay. The same singleton element serves both
    /// states; `aria-hidden` flips and the image slot empties on close.
    pub fn render(&self) -> Markup {
        let tab_index = self.open.then_some("0");
        html! {
            div.lightbox id="lightbox" aria-hidden=(if self.open { "false" } else { "true" })
                aria-modal=[self.open.then_some("true")] {
                button.lb-close aria-label="Close" tabindex=[tab_index] { "\u{00d7}" }
                button.lb-prev aria-label="Previous image" tabindex=[tab_index] { "\u{2039}" }
                img.lb-image src=[self.current().map(|e| e.src.as_str())]
                    alt=[self.current().map(|e| e.alt.as_str())];
                button.lb-next aria-label="Next image" tabindex=[tab_index] { "\u{203a}" }
                div.lb-counter { (self.counter().unwrap_or_default()) }
            }
        }
    }
}
