//! Page controller.
//!
//! Owns everything a gallery page needs at runtime: the loaded
//! manifest, one grid page per section, the shared visibility observer,
//! the lightbox, and (optionally) a carousel. The shell feeds it input
//! events — visibility reports, load results, pointer activation,
//! keyboard input, clock ticks — and reads back markup.
//!
//! Initialization mirrors what the components themselves guarantee: a
//! manifest that failed to load arrives empty, every section renders
//! its empty state, and the page keeps working.

use crate::carousel::Carousel;
use crate::config::GalleryConfig;
use crate::grid::{self, GridPage, ImageHandle};
use crate::lightbox::{DomainEntry, ElementId, Key, Lightbox, OverlayClick};
use crate::manifest::Manifest;
use crate::observer::{VisibilityAction, VisibilityObserver};
use maud::Markup;
use std::time::Instant;
use tracing::{debug, warn};

pub struct Gallery {
    manifest: Manifest,
    config: GalleryConfig,
    /// One derived grid page per section, in manifest order.
    grids: Vec<GridPage>,
    observer: VisibilityObserver,
    lightbox: Lightbox,
    carousel: Option<Carousel>,
}

impl Gallery {
    /// Build the page: derive page 1 of every section and register all
    /// rendered images with the observer.
    pub fn new(manifest: Manifest, config: GalleryConfig) -> Self {
        let grids: Vec<GridPage> = manifest
            .sections
            .iter()
            .map(|section| GridPage::build(section, 1, &config.grid))
            .collect();
        let mut observer = VisibilityObserver::new();
        for page in &grids {
            for cell in &page.items {
                observer.observe(cell.handle.clone(), None);
            }
        }
        debug!(sections = grids.len(), "gallery initialized");
        Self {
            manifest,
            config,
            grids,
            observer,
            lightbox: Lightbox::new(),
            carousel: None,
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn grid(&self, key: &str) -> Option<&GridPage> {
        self.grids.iter().find(|g| g.section == key)
    }

    fn grid_mut(&mut self, key: &str) -> Option<&mut GridPage> {
        self.grids.iter_mut().find(|g| g.section == key)
    }

    /// Re-render one section at the requested (clamped) page. The old
    /// page's pending registrations are dropped and the new page's
    /// images registered; other sections are untouched.
    pub fn render_section(&mut self, key: &str, page: i64) {
        let Some(section) = self.manifest.section(key) else {
            warn!(section = key, "render requested for unknown section");
            return;
        };
        let fresh = GridPage::build(section, page, &self.config.grid);
        let Some(slot) = self.grids.iter_mut().find(|g| g.section == key) else {
            return;
        };
        for cell in &slot.items {
            self.observer.unobserve(&cell.handle);
        }
        for cell in &fresh.items {
            self.observer.observe(cell.handle.clone(), None);
        }
        *slot = fresh;
    }

    /// Pagination controls re-enter here with the target page number.
    pub fn page_prev(&mut self, key: &str) {
        if let Some(page) = self.grid(key).map(|g| g.prev_page()) {
            self.render_section(key, page as i64);
        }
    }

    pub fn page_next(&mut self, key: &str) {
        if let Some(page) = self.grid(key).map(|g| g.next_page()) {
            self.render_section(key, page as i64);
        }
    }

    // ------------------------------------------------------------------
    // Visibility and loading
    // ------------------------------------------------------------------

    /// A rendered image reported a visibility ratio.
    pub fn on_image_visible(&mut self, handle: &ImageHandle, ratio: f32) {
        let Some(action) = self.observer.on_visible(handle, ratio) else {
            return;
        };
        let Some(cell) = self.grid_mut_cell(handle) else {
            return;
        };
        match action {
            VisibilityAction::Swap(src) => cell.on_visible(Some(src)),
            VisibilityAction::Reveal => cell.on_visible(None),
        }
    }

    /// A rendered image finished (or failed) loading its current source.
    pub fn on_image_load_result(&mut self, handle: &ImageHandle, ok: bool) {
        if let Some(cell) = self.grid_mut_cell(handle) {
            cell.on_load_result(ok);
        }
    }

    fn grid_mut_cell(&mut self, handle: &ImageHandle) -> Option<&mut grid::GridItem> {
        let key = handle.section.clone();
        self.grid_mut(&key)?.find_mut(handle)
    }

    // ------------------------------------------------------------------
    // Lightbox
    // ------------------------------------------------------------------

    /// Pointer activation on a grid image: open the lightbox over the
    /// ordered domain of every currently rendered grid image.
    pub fn activate(&mut self, handle: &ImageHandle, page_focus: Option<ElementId>) {
        let domain = self.navigation_domain();
        let Some(activated) = domain.iter().find(|e| e.handle == *handle).cloned() else {
            warn!(handle = %handle, "activation for an image that is not rendered");
            return;
        };
        self.lightbox.open(activated, domain, page_focus);
    }

    /// The ordered sequence the lightbox navigates: every rendered grid
    /// image, section by section in manifest order.
    fn navigation_domain(&self) -> Vec<DomainEntry> {
        self.grids
            .iter()
            .flat_map(|page| page.items.iter())
            .filter_map(|cell| {
                Some(DomainEntry {
                    handle: cell.handle.clone(),
                    src: cell.item.lightbox_src()?.to_string(),
                    alt: cell.item.alt.clone(),
                })
            })
            .collect()
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    /// Keyboard input; active only while the lightbox is open. Returns
    /// the element that should regain focus when the key closed it.
    pub fn on_key(&mut self, key: Key) -> Option<ElementId> {
        self.lightbox.on_key(key)
    }

    pub fn on_overlay_click(&mut self, target: OverlayClick) -> Option<ElementId> {
        self.lightbox.on_overlay_click(target)
    }

    /// Whether underlying page scroll is currently blocked.
    pub fn scroll_locked(&self) -> bool {
        self.lightbox.scroll_locked()
    }

    // ------------------------------------------------------------------
    // Carousel
    // ------------------------------------------------------------------

    /// Attach a carousel over the given picks (see
    /// [`crate::carousel::section_picks`] and
    /// [`crate::carousel::mixed_picks`]). Replaces and tears down any
    /// previous carousel.
    pub fn attach_carousel(&mut self, picks: &[crate::manifest::MediaItem], now: Instant) {
        if let Some(old) = self.carousel.as_mut() {
            old.destroy();
        }
        self.carousel = (!picks.is_empty())
            .then(|| Carousel::new(picks, &self.config.carousel, now));
    }

    pub fn carousel(&self) -> Option<&Carousel> {
        self.carousel.as_ref()
    }

    pub fn carousel_mut(&mut self) -> Option<&mut Carousel> {
        self.carousel.as_mut()
    }

    /// Clock tick, forwarded to every timer owner.
    pub fn on_tick(&mut self, now: Instant) {
        if let Some(carousel) = self.carousel.as_mut() {
            carousel.on_tick(now);
        }
    }

    /// Tear down the carousel, releasing its timer.
    pub fn destroy_carousel(&mut self) {
        if let Some(carousel) = self.carousel.as_mut() {
            carousel.destroy();
        }
        self.carousel = None;
    }

    // ------------------------------------------------------------------
    // Markup
    // ------------------------------------------------------------------

    /// Current contents of a section's grid container.
    pub fn section_markup(&self, key: &str) -> Option<Markup> {
        self.grid(key).map(grid::render)
    }

    pub fn lightbox_markup(&self) -> Markup {
        self.lightbox.render()
    }

    pub fn carousel_markup(&self) -> Option<Markup> {
        self.carousel.as_ref().map(Carousel::render)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{MediaItem, Section};
    use std::time::Duration;

    fn item(id: &str) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            alt: format!("photo {id}"),
            thumb_jpg: Some(format!("{id}-thumb.jpg")),
            full_jpg: Some(format!("{id}-full.jpg")),
            full_webp: Some(format!("{id}-full.webp")),
            ..Default::default()
        }
    }

    fn manifest(sections: &[(&str, usize)]) -> Manifest {
        Manifest {
            sections: sections
                .iter()
                .map(|(key, n)| Section {
                    key: key.to_string(),
                    items: (0..*n).map(|i| item(&format!("{key}{i}"))).collect(),
                })
                .collect(),
        }
    }

    fn gallery(sections: &[(&str, usize)]) -> Gallery {
        Gallery::new(manifest(sections), GalleryConfig::default())
    }

    #[test]
    fn init_renders_page_one_of_every_section() {
        let g = gallery(&[("travel", 30), ("portraits", 3)]);
        assert_eq!(g.grid("travel").unwrap().items.len(), 24);
        assert_eq!(g.grid("portraits").unwrap().items.len(), 3);
    }

    #[test]
    fn empty_manifest_degrades_to_empty_sections() {
        let g = Gallery::new(Manifest::default(), GalleryConfig::default());
        assert!(g.section_markup("anything").is_none());
        assert!(!g.scroll_locked());
    }

    #[test]
    fn empty_section_renders_empty_state_markup() {
        let g = gallery(&[("empty", 0)]);
        let html = g.section_markup("empty").unwrap().into_string();
        assert!(html.contains("No images found for this section"));
    }

    #[test]
    fn page_change_swaps_registrations() {
        let mut g = gallery(&[("travel", 30)]);
        let first_page_handle = ImageHandle::new("travel", 0);
        g.page_next("travel");
        assert_eq!(g.grid("travel").unwrap().page, 2);
        assert_eq!(g.grid("travel").unwrap().items.len(), 6);
        // Old page's images no longer fire.
        g.on_image_visible(&first_page_handle, 1.0);
        assert!(g.grid("travel").unwrap().find(&first_page_handle).is_none());
        // New page's images do.
        let handle = ImageHandle::new("travel", 24);
        g.on_image_visible(&handle, 1.0);
        assert_eq!(
            g.grid("travel").unwrap().find(&handle).unwrap().state,
            grid::LoadState::Loaded
        );
    }

    #[test]
    fn pagination_is_clamped_at_the_edges() {
        let mut g = gallery(&[("travel", 30)]);
        g.page_prev("travel");
        assert_eq!(g.grid("travel").unwrap().page, 1);
        g.page_next("travel");
        g.page_next("travel");
        g.page_next("travel");
        assert_eq!(g.grid("travel").unwrap().page, 2);
    }

    #[test]
    fn visibility_fades_in_rendered_images() {
        let mut g = gallery(&[("travel", 2)]);
        let handle = ImageHandle::new("travel", 0);
        g.on_image_visible(&handle, 0.5);
        assert_eq!(
            g.grid("travel").unwrap().find(&handle).unwrap().state,
            grid::LoadState::Loaded
        );
        // Fires only once; a later report is inert.
        g.on_image_visible(&handle, 0.5);
    }

    #[test]
    fn load_failure_falls_back_through_candidates() {
        let mut g = gallery(&[("travel", 1)]);
        let handle = ImageHandle::new("travel", 0);
        g.on_image_load_result(&handle, false);
        let cell = g.grid("travel").unwrap().find(&handle).unwrap();
        assert_eq!(cell.src, "travel0-full.jpg");
        assert_eq!(cell.state, grid::LoadState::Loading);
    }

    #[test]
    fn activation_opens_lightbox_over_cross_section_domain() {
        let mut g = gallery(&[("travel", 2), ("portraits", 3)]);
        g.activate(
            &ImageHandle::new("portraits", 0),
            Some(ElementId::new("thumb")),
        );
        assert!(g.lightbox().is_open());
        assert_eq!(g.lightbox().counter().as_deref(), Some("3 / 5"));
        assert!(g.scroll_locked());
    }

    #[test]
    fn lightbox_navigation_wraps_across_sections() {
        let mut g = gallery(&[("travel", 2), ("portraits", 1)]);
        g.activate(&ImageHandle::new("portraits", 0), None);
        g.on_key(Key::ArrowRight);
        assert_eq!(g.lightbox().counter().as_deref(), Some("1 / 3"));
        g.on_key(Key::ArrowLeft);
        assert_eq!(g.lightbox().counter().as_deref(), Some("3 / 3"));
    }

    #[test]
    fn escape_closes_and_reports_focus_target() {
        let mut g = gallery(&[("travel", 2)]);
        g.activate(
            &ImageHandle::new("travel", 1),
            Some(ElementId::new("thumb-1")),
        );
        assert_eq!(g.on_key(Key::Escape), Some(ElementId::new("thumb-1")));
        assert!(!g.scroll_locked());
    }

    #[test]
    fn activating_an_unrendered_image_is_a_no_op() {
        let mut g = gallery(&[("travel", 2)]);
        g.activate(&ImageHandle::new("travel", 99), None);
        assert!(!g.lightbox().is_open());
    }

    #[test]
    fn carousel_attach_tick_and_destroy() {
        let mut g = gallery(&[("travel", 3)]);
        let t0 = Instant::now();
        let picks = crate::carousel::section_picks(g.manifest(), "travel");
        g.attach_carousel(&picks, t0);
        assert_eq!(g.carousel().unwrap().len(), 3);

        g.on_tick(t0 + Duration::from_secs(5));
        assert_eq!(g.carousel().unwrap().index(), 1);

        g.destroy_carousel();
        assert!(g.carousel().is_none());
    }

    #[test]
    fn empty_picks_attach_no_carousel() {
        let mut g = gallery(&[("travel", 0)]);
        let picks = crate::carousel::section_picks(g.manifest(), "travel");
        g.attach_carousel(&picks, Instant::now());
        assert!(g.carousel().is_none());
    }
}
