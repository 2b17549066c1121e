//! Section grids with pagination.
//!
//! A grid page is derived state: (section, requested page, page size)
//! determines the slice of images to show. Nothing is stored between
//! renders; paging re-derives the whole view, so a page change is atomic
//! from the caller's perspective.
//!
//! Each rendered cell keeps its [`MediaItem`] as a typed association
//! alongside the handle the shell uses to report events (visibility,
//! load results, activation). The markup still carries `data-*` mirrors
//! of the full-resolution URIs for external consumers, but the engine
//! never reads state back out of markup.
//!
//! ## Pagination rules
//!
//! - Requested page numbers are clamped to `[1, total_pages]`; page 0
//!   and page 9999 are valid requests, not errors.
//! - Pagination controls render only when there is more than one page:
//!   prev (disabled on page 1), an indicator reading
//!   `"page {p} / {total}"`, next (disabled on the last page).
//! - An empty section renders a human-readable empty-state message so
//!   "no data" is distinguishable from "still loading".

use crate::config::GridConfig;
use crate::manifest::{MediaItem, Section};
use maud::{Markup, html};
use std::fmt;
use tracing::{debug, warn};

/// Identifies one rendered grid image: section key plus the item's
/// position in the section's full (renderable) sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageHandle {
    pub section: String,
    pub index: usize,
}

impl ImageHandle {
    pub fn new(section: impl Into<String>, index: usize) -> Self {
        Self {
            section: section.into(),
            index,
        }
    }
}

impl fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.section, self.index)
    }
}

/// Load lifecycle of a rendered image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Rendered, waiting to become visible.
    Deferred,
    /// A source swap is in flight.
    Loading,
    /// Loaded and faded in.
    Loaded,
    /// All fallback candidates exhausted.
    Failed,
}

/// One grid cell: current sources plus the item it was rendered from.
#[derive(Debug, Clone)]
pub struct GridItem {
    pub handle: ImageHandle,
    pub item: MediaItem,
    /// Currently displayed source. Starts at the thumbnail chain and
    /// moves down the fallback list on load failure.
    pub src: String,
    pub srcset: Option<String>,
    pub webp_srcset: Option<String>,
    pub sizes: String,
    pub state: LoadState,
    /// Remaining fallback candidates, built on the first failure.
    fallbacks: Option<Vec<String>>,
}

impl GridItem {
    /// Build a cell from a manifest item. `None` when no variant is
    /// usable at all; the caller skips such items.
    pub fn new(handle: ImageHandle, item: &MediaItem, default_sizes: &str) -> Option<Self> {
        let src = item.grid_src()?.to_string();
        Some(Self {
            handle,
            src,
            srcset: item.srcset_jpg.clone(),
            webp_srcset: item.srcset_webp.clone(),
            sizes: item
                .sizes
                .clone()
                .unwrap_or_else(|| default_sizes.to_string()),
            state: LoadState::Deferred,
            fallbacks: None,
            item: item.clone(),
        })
    }

    /// Visibility callback: swap in a staged source (entering `Loading`)
    /// or, with nothing staged, fade in immediately.
    pub fn on_visible(&mut self, staged: Option<String>) {
        if self.state != LoadState::Deferred {
            return;
        }
        match staged {
            Some(src) => {
                self.src = src;
                self.state = LoadState::Loading;
            }
            None => self.state = LoadState::Loaded,
        }
    }

    /// Outcome of loading the current source. On failure, walks the
    /// ordered fallback list: switch source (and responsive set, since
    /// fallbacks are legacy-format) and try again, or stay failed once
    /// the list is dry.
    pub fn on_load_result(&mut self, ok: bool) {
        if self.state == LoadState::Failed {
            return;
        }
        if ok {
            self.state = LoadState::Loaded;
            return;
        }
        let failed = self.src.clone();
        let fallbacks = self
            .fallbacks
            .get_or_insert_with(|| self.item.fallback_candidates(&failed));
        match fallbacks.iter().position(|c| *c != failed) {
            Some(pos) => {
                let next = fallbacks.remove(pos);
                warn!(
                    handle = %self.handle,
                    failed = %failed,
                    fallback = %next,
                    "image load failed, switching source"
                );
                self.src = next;
                self.srcset = self.item.srcset_jpg.clone();
                self.webp_srcset = None;
                self.state = LoadState::Loading;
            }
            None => {
                warn!(handle = %self.handle, failed = %failed, "image load failed, no fallback left");
                self.state = LoadState::Failed;
            }
        }
    }

    fn state_class(&self) -> Option<&'static str> {
        match self.state {
            LoadState::Deferred | LoadState::Loading => None,
            LoadState::Loaded => Some("loaded"),
            LoadState::Failed => Some("failed"),
        }
    }
}

/// One derived page of a section's grid.
#[derive(Debug, Clone)]
pub struct GridPage {
    pub section: String,
    /// 1-based, already clamped.
    pub page: usize,
    pub total_pages: usize,
    /// Renderable items across the whole section, not just this page.
    pub total_items: usize,
    pub items: Vec<GridItem>,
}

/// Clamp a requested page number (any integer) to `[1, total_pages]`.
pub fn clamp_page(requested: i64, total_pages: usize) -> usize {
    requested.clamp(1, total_pages as i64) as usize
}

impl GridPage {
    /// Derive the grid page for a section. Unrenderable items are
    /// skipped (with a warning) before pagination, so every rendered
    /// page is densely filled.
    pub fn build(section: &Section, requested_page: i64, config: &GridConfig) -> Self {
        let renderable: Vec<(usize, &MediaItem)> = section
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                if item.is_renderable() {
                    true
                } else {
                    warn!(section = %section.key, id = %item.id, "skipping item with no usable source");
                    false
                }
            })
            .collect();

        let total_items = renderable.len();
        let total_pages = total_items.div_ceil(config.page_size).max(1);
        let page = clamp_page(requested_page, total_pages);

        let start = (page - 1) * config.page_size;
        let items = renderable
            .into_iter()
            .skip(start)
            .take(config.page_size)
            .filter_map(|(index, item)| {
                GridItem::new(
                    ImageHandle::new(section.key.clone(), index),
                    item,
                    &config.default_sizes,
                )
            })
            .collect();

        debug!(section = %section.key, page, total_pages, total_items, "grid page derived");
        Self {
            section: section.key.clone(),
            page,
            total_pages,
            total_items,
            items,
        }
    }

    pub fn has_pagination(&self) -> bool {
        self.total_pages > 1
    }

    /// Target of the prev control, clamped at the first page.
    pub fn prev_page(&self) -> usize {
        self.page.saturating_sub(1).max(1)
    }

    /// Target of the next control, clamped at the last page.
    pub fn next_page(&self) -> usize {
        (self.page + 1).min(self.total_pages)
    }

    /// Find a rendered cell by handle.
    pub fn find(&self, handle: &ImageHandle) -> Option<&GridItem> {
        self.items.iter().find(|it| it.handle == *handle)
    }

    pub fn find_mut(&mut self, handle: &ImageHandle) -> Option<&mut GridItem> {
        self.items.iter_mut().find(|it| it.handle == *handle)
    }
}

// ============================================================================
// Markup
// ============================================================================

/// Render the grid container's full contents. The shell replaces the
/// section container's children with this on every render or page
/// change, never patching incrementally.
pub fn render(page: &GridPage) -> Markup {
    if page.items.is_empty() {
        return render_empty_state();
    }
    html! {
        div.grid data-section=(page.section) {
            @for cell in &page.items {
                (render_cell(cell))
            }
        }
        @if page.has_pagination() {
            (render_pagination(page))
        }
    }
}

fn render_cell(cell: &GridItem) -> Markup {
    let position_style = cell
        .item
        .object_position
        .as_ref()
        .map(|p| format!("object-position: {};", p.position));
    html! {
        div.item {
            picture {
                @if let Some(webp) = &cell.webp_srcset {
                    source type="image/webp" srcset=(webp) sizes=(cell.sizes);
                }
                img src=(cell.src)
                    srcset=[cell.srcset.as_deref()]
                    sizes=(cell.sizes)
                    alt=(cell.item.alt)
                    loading="lazy"
                    class=[cell.state_class()]
                    style=[position_style]
                    data-id=(cell.handle)
                    data-full-webp=[cell.item.full_webp.as_deref()]
                    data-full-jpg=[cell.item.full_jpg.as_deref()];
            }
        }
    }
}

fn render_empty_state() -> Markup {
    html! {
        p.empty {
            "No images found for this section. If you opened this file directly, "
            "try serving the site folder over HTTP (for example: "
            code { "python -m http.server" }
            ") so the manifest can be fetched."
        }
    }
}

fn render_pagination(page: &GridPage) -> Markup {
    html! {
        nav.pagination data-section=(page.section) {
            button.page-prev disabled[page.page == 1]
                data-page=(page.prev_page())
                aria-label="Previous page" { "‹" }
            span.page-indicator {
                "page " (page.page) " / " (page.total_pages)
            }
            button.page-next disabled[page.page == page.total_pages]
                data-page=(page.next_page())
                aria-label="Next page" { "›" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::MediaItem;

    fn item(id: &str) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            alt: format!("photo {id}"),
            thumb_jpg: Some(format!("{id}-thumb.jpg")),
            full_jpg: Some(format!("{id}-full.jpg")),
            full_webp: Some(format!("{id}-full.webp")),
            srcset_jpg: Some(format!("{id}-thumb.jpg 600w, {id}-full.jpg 1920w")),
            srcset_webp: Some(format!("{id}-thumb.webp 600w, {id}-full.webp 1920w")),
            ..Default::default()
        }
    }

    fn section(key: &str, count: usize) -> Section {
        Section {
            key: key.to_string(),
            items: (0..count).map(|i| item(&format!("img{i}"))).collect(),
        }
    }

    fn config(page_size: usize) -> GridConfig {
        GridConfig {
            page_size,
            ..Default::default()
        }
    }

    #[test]
    fn full_page_holds_page_size_items() {
        let page = GridPage::build(&section("travel", 60), 1, &config(24));
        assert_eq!(page.items.len(), 24);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn last_page_holds_the_remainder() {
        let page = GridPage::build(&section("travel", 60), 3, &config(24));
        assert_eq!(page.items.len(), 12);
        assert_eq!(page.page, 3);
    }

    #[test]
    fn page_zero_clamps_to_first() {
        let a = GridPage::build(&section("travel", 60), 0, &config(24));
        let b = GridPage::build(&section("travel", 60), 1, &config(24));
        assert_eq!(a.page, b.page);
        assert_eq!(a.items[0].handle, b.items[0].handle);
    }

    #[test]
    fn page_past_the_end_clamps_to_last() {
        let a = GridPage::build(&section("travel", 60), 9999, &config(24));
        let b = GridPage::build(&section("travel", 60), 3, &config(24));
        assert_eq!(a.page, 3);
        assert_eq!(a.items.len(), b.items.len());
    }

    #[test]
    fn negative_page_clamps_to_first() {
        let page = GridPage::build(&section("travel", 60), -5, &config(24));
        assert_eq!(page.page, 1);
    }

    #[test]
    fn handles_are_section_wide_indices() {
        let page = GridPage::build(&section("travel", 60), 2, &config(24));
        assert_eq!(page.items[0].handle, ImageHandle::new("travel", 24));
    }

    #[test]
    fn single_page_renders_no_pagination() {
        let page = GridPage::build(&section("travel", 10), 1, &config(24));
        assert!(!page.has_pagination());
        let html = render(&page).into_string();
        assert!(!html.contains("pagination"));
    }

    #[test]
    fn pagination_indicator_text() {
        let page = GridPage::build(&section("travel", 60), 2, &config(24));
        let html = render(&page).into_string();
        assert!(html.contains("page 2 / 3"));
    }

    #[test]
    fn prev_disabled_on_first_page_next_disabled_on_last() {
        let first = render(&GridPage::build(&section("t", 60), 1, &config(24))).into_string();
        assert!(first.contains(r#"class="page-prev" disabled"#));
        assert!(!first.contains(r#"class="page-next" disabled"#));

        let last = render(&GridPage::build(&section("t", 60), 3, &config(24))).into_string();
        assert!(!last.contains(r#"class="page-prev" disabled"#));
        assert!(last.contains(r#"class="page-next" disabled"#));
    }

    #[test]
    fn prev_next_targets_are_clamped() {
        let first = GridPage::build(&section("t", 60), 1, &config(24));
        assert_eq!(first.prev_page(), 1);
        assert_eq!(first.next_page(), 2);
        let last = GridPage::build(&section("t", 60), 3, &config(24));
        assert_eq!(last.next_page(), 3);
        assert_eq!(last.prev_page(), 2);
    }

    #[test]
    fn empty_section_renders_message_not_grid() {
        let page = GridPage::build(&section("empty", 0), 1, &config(24));
        assert_eq!(page.total_pages, 1);
        let html = render(&page).into_string();
        assert!(html.contains("No images found for this section"));
        assert!(!html.contains("class=\"grid\""));
        assert!(!html.contains("pagination"));
    }

    #[test]
    fn unrenderable_items_are_skipped() {
        let mut sec = section("travel", 2);
        sec.items.push(MediaItem {
            id: "ghost".into(),
            ..Default::default()
        });
        let page = GridPage::build(&sec, 1, &config(24));
        assert_eq!(page.total_items, 2);
        assert_eq!(page.items.len(), 2);
    }

    #[test]
    fn cell_markup_carries_lazy_hint_and_inert_full_uris() {
        let page = GridPage::build(&section("travel", 1), 1, &config(24));
        let html = render(&page).into_string();
        assert!(html.contains(r#"loading="lazy""#));
        assert!(html.contains(r#"data-full-webp="img0-full.webp""#));
        assert!(html.contains(r#"data-full-jpg="img0-full.jpg""#));
        assert!(html.contains(r#"data-id="travel-0""#));
        assert!(html.contains(r#"type="image/webp""#));
    }

    #[test]
    fn visibility_without_staged_source_marks_loaded() {
        let mut page = GridPage::build(&section("travel", 1), 1, &config(24));
        let cell = &mut page.items[0];
        cell.on_visible(None);
        assert_eq!(cell.state, LoadState::Loaded);
        let html = render(&page).into_string();
        assert!(html.contains(r#"class="loaded""#));
    }

    #[test]
    fn visibility_with_staged_source_swaps_and_waits() {
        let mut page = GridPage::build(&section("travel", 1), 1, &config(24));
        let cell = &mut page.items[0];
        cell.on_visible(Some("img0-full.webp".into()));
        assert_eq!(cell.state, LoadState::Loading);
        assert_eq!(cell.src, "img0-full.webp");
        cell.on_load_result(true);
        assert_eq!(cell.state, LoadState::Loaded);
    }

    #[test]
    fn load_failure_walks_fallback_chain_then_fails() {
        let mut page = GridPage::build(&section("travel", 1), 1, &config(24));
        let cell = &mut page.items[0];
        cell.on_visible(Some("img0-full.webp".into()));

        cell.on_load_result(false);
        assert_eq!(cell.state, LoadState::Loading);
        assert_eq!(cell.src, "img0-full.jpg");
        assert!(cell.webp_srcset.is_none());
        assert_eq!(cell.srcset, Some("img0-thumb.jpg 600w, img0-full.jpg 1920w".into()));

        cell.on_load_result(false);
        assert_eq!(cell.src, "img0-thumb.jpg");

        cell.on_load_result(false);
        assert_eq!(cell.state, LoadState::Failed);

        // Terminal: further results change nothing.
        cell.on_load_result(false);
        assert_eq!(cell.state, LoadState::Failed);
    }
}
