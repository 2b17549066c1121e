//! Auto-advancing slideshow.
//!
//! The carousel is a state machine over a fixed slide list: a current
//! index, at most one in-flight transition, an auto-advance deadline,
//! and a pause flag. Time is injected: every entry point that can
//! depend on the clock takes `now: Instant`, and the shell drives
//! progress by calling [`Carousel::on_tick`]. No wall-clock reads, no
//! timer callbacks; tests pass synthetic instants.
//!
//! ## Transition lock
//!
//! A transition marks the outgoing slide as exiting and the incoming
//! slide as entering, then finalizes after a fixed duration. Until it
//! finalizes, next/prev/indicator navigation is rejected outright, so
//! transitions never overlap and the index never drifts from what is on
//! screen.
//!
//! ## Timer ownership
//!
//! The auto-advance deadline is a field owned by this controller and
//! cleared on pause and on destroy. There is no way to leak a ticking
//! timer against a destroyed carousel: after [`Carousel::destroy`],
//! every entry point is inert.

use crate::config::CarouselConfig;
use crate::manifest::{Manifest, MediaItem, last_srcset_url};
use maud::{Markup, html};
use rand::Rng;
use rand::seq::SliceRandom;
use std::time::{Duration, Instant};
use tracing::debug;

/// One slide's presentation data.
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    pub src: String,
    /// Largest WebP variant, used as the `<source>` of the slide.
    pub webp: Option<String>,
    pub alt: String,
}

impl Slide {
    fn from_item(item: &MediaItem) -> Option<Self> {
        Some(Self {
            src: item.carousel_src()?.to_string(),
            webp: item
                .srcset_webp
                .as_deref()
                .and_then(last_srcset_url)
                .map(str::to_string),
            alt: item.alt.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    from: usize,
    to: usize,
    ends_at: Instant,
}

/// The slideshow state machine.
#[derive(Debug)]
pub struct Carousel {
    slides: Vec<Slide>,
    index: usize,
    transition: Option<Transition>,
    /// Next automatic advance. `None` while paused, destroyed, or when
    /// there is at most one slide.
    deadline: Option<Instant>,
    paused: bool,
    destroyed: bool,
    interval: Duration,
    transition_duration: Duration,
}

impl Carousel {
    /// Build a carousel over the given items, skipping any without a
    /// usable source. Auto-advance arms only for more than one slide.
    pub fn new(items: &[MediaItem], config: &CarouselConfig, now: Instant) -> Self {
        let slides: Vec<Slide> = items.iter().filter_map(Slide::from_item).collect();
        let deadline = (slides.len() > 1).then(|| now + config.interval());
        Self {
            slides,
            index: 0,
            transition: None,
            deadline,
            paused: false,
            destroyed: false,
            interval: config.interval(),
            transition_duration: config.transition(),
        }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn counter(&self) -> String {
        format!("{} / {}", self.index + 1, self.slides.len())
    }

    /// Advance one slide, wrapping. Rejected (returns `false`) while a
    /// transition is running, after destroy, or with fewer than two
    /// slides.
    pub fn next(&mut self, now: Instant) -> bool {
        let target = (self.index + 1) % self.slides.len().max(1);
        self.go_to(target, now)
    }

    /// Retreat one slide, wrapping.
    pub fn prev(&mut self, now: Instant) -> bool {
        let len = self.slides.len().max(1);
        let target = (self.index + len - 1) % len;
        self.go_to(target, now)
    }

    /// Jump to a slide (indicator click). Same rejection rules as
    /// next/prev; jumping to the current slide is a no-op.
    pub fn go_to(&mut self, target: usize, now: Instant) -> bool {
        if self.destroyed || self.slides.len() < 2 || target >= self.slides.len() {
            return false;
        }
        self.settle(now);
        if self.transition.is_some() || target == self.index {
            return false;
        }
        self.transition = Some(Transition {
            from: self.index,
            to: target,
            ends_at: now + self.transition_duration,
        });
        self.index = target;
        // Any manual or automatic advance restarts the countdown, but a
        // paused carousel stays paused until the pointer leaves.
        if !self.paused {
            self.deadline = Some(now + self.interval);
        }
        debug!(index = self.index, "carousel transition started");
        true
    }

    /// Clock tick: finalize a due transition, then fire a due automatic
    /// advance. The shell calls this from its timer loop.
    pub fn on_tick(&mut self, now: Instant) {
        if self.destroyed {
            return;
        }
        self.settle(now);
        if self.paused {
            return;
        }
        if let Some(deadline) = self.deadline
            && deadline <= now
            && !self.next(now)
        {
            // Advance rejected (still mid-transition): try again a full
            // interval later, like a recurring timer that no-ops.
            self.deadline = Some(now + self.interval);
        }
    }

    /// Pointer entered: stop the countdown without touching the index.
    pub fn pause(&mut self) {
        if self.destroyed {
            return;
        }
        self.paused = true;
        self.deadline = None;
    }

    /// Pointer left: restart a full-length countdown. Never fires an
    /// immediate advance.
    pub fn resume(&mut self, now: Instant) {
        if self.destroyed {
            return;
        }
        self.paused = false;
        self.deadline = (self.slides.len() > 1).then(|| now + self.interval);
    }

    /// Tear down: releases the auto-advance deadline and any in-flight
    /// transition. All further events are ignored.
    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.deadline = None;
        self.transition = None;
    }

    fn settle(&mut self, now: Instant) {
        if let Some(t) = self.transition
            && t.ends_at <= now
        {
            self.transition = None;
            debug!(index = t.to, "carousel transition finalized");
        }
    }

    fn slide_class(&self, i: usize) -> &'static str {
        if let Some(t) = self.transition {
            if i == t.from {
                return "carousel-item fadeOut";
            }
            if i == t.to {
                return "carousel-item fadeIn";
            }
        } else if i == self.index {
            return "carousel-item active";
        }
        "carousel-item"
    }

    /// Render the carousel's inner content: slides, pause indicator,
    /// indicator dots, and the position counter.
    pub fn render(&self) -> Markup {
        html! {
            div.carousel-inner {
                @for (i, slide) in self.slides.iter().enumerate() {
                    div class=(self.slide_class(i)) {
                        picture {
                            @if let Some(webp) = &slide.webp {
                                source type="image/webp" srcset=(webp);
                            }
                            img src=(slide.src)
                                alt=(slide.alt)
                                loading=(if i == 0 { "eager" } else { "lazy" });
                        }
                    }
                }
            }
            div class=(if self.paused { "carousel-pause-indicator visible" } else { "carousel-pause-indicator" }) {}
            div.carousel-indicators {
                @for i in 0..self.slides.len() {
                    div class=(if i == self.index { "carousel-indicator active" } else { "carousel-indicator" })
                        data-index=(i) {}
                }
            }
            div.carousel-counter { (self.counter()) }
        }
    }
}

// ============================================================================
// Image selection
// ============================================================================

/// Items for a section-specific carousel; an unknown key yields an
/// empty list (and the shell simply skips the carousel).
pub fn section_picks(manifest: &Manifest, key: &str) -> Vec<MediaItem> {
    manifest.items(key).to_vec()
}

/// Items for the mixed homepage carousel: up to `sample_size` images
/// sampled without replacement across all sections.
pub fn mixed_picks<R: Rng>(manifest: &Manifest, sample_size: usize, rng: &mut R) -> Vec<MediaItem> {
    let mut all: Vec<&MediaItem> = manifest
        .sections
        .iter()
        .flat_map(|s| s.items.iter())
        .collect();
    all.shuffle(rng);
    all.into_iter().take(sample_size).cloned().collect()
}
