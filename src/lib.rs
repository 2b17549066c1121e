//! # Shutterbox
//!
//! A manifest-driven photo gallery engine. One JSON manifest describes
//! every section and image variant of a portfolio; shutterbox turns it
//! into paginated grids, a keyboard-navigable lightbox, and an
//! auto-advancing carousel.
//!
//! # Architecture: A Headless View Engine
//!
//! The interactive pieces of a gallery are small state machines, and
//! shutterbox keeps them that way: each controller owns explicit typed
//! state, consumes input events, and renders its current state to HTML
//! with Maud. No component reads the clock, touches the network, or
//! holds a callback; the shell around the engine does all of that.
//!
//! ```text
//! manifest.json → Gallery ── grids (pagination, lazy fade-in)
//!                     │  ├── Lightbox (focus trap, wrap-around nav)
//!                     │  └── Carousel (transition lock, auto-advance)
//!                     └── markup out, events in
//! ```
//!
//! This split exists for three reasons:
//!
//! - **Testability**: every behavior in the gallery, down to "resuming
//!   hover-pause restarts a full countdown", is a plain unit test with
//!   synthetic instants. No browser, no timers, no sleeps.
//! - **Determinism**: renders are pure functions of state, so a page
//!   change is atomic from the caller's perspective and two renders of
//!   the same state are byte-identical.
//! - **Portability**: any shell that can deliver events and write
//!   strings can host the engine: the bundled CLI writes static pages,
//!   tests drive it directly.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`manifest`] | Manifest types, tolerant loading, per-surface source fallback chains |
//! | [`config`] | `gallery.toml` loading, validation, stock config generation |
//! | [`grid`] | Section grids: pagination, load lifecycle, cell markup |
//! | [`observer`] | Shared one-shot visibility registry driving deferred loads |
//! | [`lightbox`] | Modal viewer state machine with focus trap and keyboard contract |
//! | [`carousel`] | Slideshow state machine: transition lock, auto-advance deadlines |
//! | [`gallery`] | Page controller wiring manifest, grids, observer, lightbox, carousel |
//! | [`page`] | Static document assembly (index covers, section pages) |
//!
//! # Design Decisions
//!
//! ## Injected Time
//!
//! The carousel's transition finalization and auto-advance are deadline
//! fields compared against an `Instant` the caller passes in. Owners of
//! a deadline clear it on pause and destroy, so a torn-down component
//! can never fire. The alternative (interval callbacks) is exactly the
//! kind of leak-prone plumbing this crate exists to avoid.
//!
//! ## Degradation Over Failure
//!
//! A gallery page has nothing to gain from crashing: a missing manifest
//! renders empty-state messages, an image with no usable variant is
//! skipped, a failed load walks an ordered fallback list and then stays
//! failed. Every degradation is logged through `tracing` with the
//! resource that caused it.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): templates
//! are type-checked Rust expressions, interpolation is escaped by
//! default, and there is no template directory to ship or get out of
//! sync.

pub mod carousel;
pub mod config;
pub mod gallery;
pub mod grid;
pub mod lightbox;
pub mod manifest;
pub mod observer;
pub mod page;
