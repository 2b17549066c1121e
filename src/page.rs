//! Static page assembly.
//!
//! Renders the HTML documents the CLI writes to disk: the index page
//! (section covers plus the mixed carousel) and one page per section
//! (grid, pagination, lightbox overlay). The interactive controllers
//! render the *contents* of their containers; this module provides the
//! documents those containers live in.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML
//! templating. The stylesheet is embedded at compile time and inlined
//! into every document, so the output directory needs no asset files
//! beyond the images themselves.

use crate::gallery::Gallery;
use crate::manifest::{MediaItem, Section, first_srcset_url};
use maud::{DOCTYPE, Markup, html};

const CSS: &str = include_str!("../static/gallery.css");

/// Renders the base HTML document structure.
fn base_document(title: &str, head_extra: Option<Markup>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                @if let Some(extra) = head_extra {
                    (extra)
                }
                style { (CSS) }
            }
            body {
                (content)
            }
        }
    }
}

/// One cover card on the index page: the section's hero (or first)
/// image linking to the section page.
fn render_cover(section: &Section) -> Option<Markup> {
    let cover = section.cover()?;
    let label = section.label();
    let src = cover.grid_src()?;
    Some(html! {
        a.section-cover href={ (section.key) ".html" } aria-label=(label) {
            picture {
                @if let Some(first) = cover.srcset_webp.as_deref().and_then(first_srcset_url) {
                    source type="image/webp" srcset=(first);
                }
                img src=(src) alt=(if cover.alt.is_empty() { &label } else { &cover.alt });
            }
            div.cover-label { (label) }
        }
    })
}

/// Preload hint for the carousel's first slide, emitted into `<head>`
/// so the browser starts fetching before layout.
fn preload_hint(first_pick: &MediaItem) -> Option<Markup> {
    let href = first_pick.carousel_src()?;
    let mime = href.ends_with(".webp").then_some("image/webp");
    Some(html! {
        link rel="preload" as="image" href=(href) type=[mime];
    })
}

/// The index page: cover grid over all non-empty sections, plus the
/// mixed carousel when one is attached.
pub fn render_index(gallery: &Gallery, carousel_picks: &[MediaItem]) -> Markup {
    let head_extra = carousel_picks.first().and_then(preload_hint);
    let content = html! {
        main.index-page {
            @if let Some(carousel) = gallery.carousel_markup() {
                section.carousel data-section="all" {
                    (carousel)
                }
            }
            div.covers-grid id="covers-grid" {
                @for section in &gallery.manifest().sections {
                    @if !section.items.is_empty() {
                        @if let Some(cover) = render_cover(section) {
                            (cover)
                        }
                    }
                }
            }
        }
    };
    base_document("Gallery", head_extra, content)
}

/// A section page: heading, the section's grid container (pre-filled
/// with page 1), and the lightbox overlay.
pub fn render_section_page(gallery: &Gallery, section: &Section) -> Markup {
    let label = section.label();
    let content = html! {
        main.section-page {
            header.section-header {
                h1 { (label) }
            }
            section.grid-slot data-section=(section.key) {
                @if let Some(grid) = gallery.section_markup(&section.key) {
                    (grid)
                }
            }
        }
        (gallery.lightbox_markup())
    };
    base_document(&label, None, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GalleryConfig;
    use crate::manifest::Manifest;

    fn item(id: &str, hero: bool) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            alt: format!("photo {id}"),
            hero,
            thumb_jpg: Some(format!("{id}-thumb.jpg")),
            full_jpg: Some(format!("{id}-full.jpg")),
            full_webp: Some(format!("{id}-full.webp")),
            srcset_webp: Some(format!("{id}-thumb.webp 600w, {id}-full.webp 1920w")),
            ..Default::default()
        }
    }

    fn manifest() -> Manifest {
        Manifest {
            sections: vec![
                Section {
                    key: "weld-county".into(),
                    items: vec![item("w0", false), item("w1", true)],
                },
                Section {
                    key: "empty-one".into(),
                    items: vec![],
                },
            ],
        }
    }

    fn gallery() -> Gallery {
        Gallery::new(manifest(), GalleryConfig::default())
    }

    #[test]
    fn index_renders_covers_for_non_empty_sections_only() {
        let html = render_index(&gallery(), &[]).into_string();
        assert!(html.contains(r#"href="weld-county.html""#));
        assert!(html.contains("Weld County"));
        assert!(!html.contains("empty-one.html"));
    }

    #[test]
    fn cover_uses_hero_item_and_first_webp_entry() {
        let html = render_index(&gallery(), &[]).into_string();
        assert!(html.contains(r#"src="w1-thumb.jpg""#));
        assert!(html.contains(r#"srcset="w1-thumb.webp""#));
    }

    #[test]
    fn index_emits_preload_hint_for_first_pick() {
        let picks = vec![item("c0", false)];
        let html = render_index(&gallery(), &picks).into_string();
        assert!(html.contains(r#"rel="preload""#));
        assert!(html.contains(r#"href="c0-full.jpg""#));
    }

    #[test]
    fn index_without_picks_has_no_preload() {
        let html = render_index(&gallery(), &[]).into_string();
        assert!(!html.contains("preload"));
    }

    #[test]
    fn section_page_contains_grid_and_lightbox() {
        let g = gallery();
        let section = g.manifest().section("weld-county").unwrap().clone();
        let html = render_section_page(&g, &section).into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>Weld County</h1>"));
        assert!(html.contains(r#"data-section="weld-county""#));
        assert!(html.contains(r#"id="lightbox""#));
        assert!(html.contains(r#"aria-hidden="true""#));
    }

    #[test]
    fn empty_section_page_shows_empty_state() {
        let g = gallery();
        let section = g.manifest().section("empty-one").unwrap().clone();
        let html = render_section_page(&g, &section).into_string();
        assert!(html.contains("No images found for this section"));
    }
}
