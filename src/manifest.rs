//! Manifest loading and the media data model.
//!
//! The manifest is a single JSON object mapping section keys to ordered
//! image lists, produced ahead of time by the image pipeline:
//!
//! ```json
//! {
//!   "travel": [
//!     {
//!       "id": "beach-dawn",
//!       "alt": "beach at dawn",
//!       "hero": true,
//!       "thumb_jpg": "images/travel/beach-dawn-thumb.jpg",
//!       "full_jpg": "images/travel/beach-dawn-full.jpg",
//!       "full_webp": "images/travel/beach-dawn-full.webp",
//!       "srcset_jpg": "... 600w, ... 1200w, ... 1920w",
//!       "sizes": "(max-width: 600px) 100vw, 33vw"
//!     }
//!   ]
//! }
//! ```
//!
//! Key order in the JSON document is display order, so sections are kept
//! as an ordered `Vec` rather than a sorted map. Unknown fields are
//! tolerated; the manifest generator grows fields faster than this crate.
//!
//! ## Loading is never fatal
//!
//! A missing, unreadable, or malformed manifest degrades to an empty
//! manifest with a logged warning. Every section then renders its
//! empty-state message instead. Users can fix the file and reload; the
//! engine does not retry.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::warn;

/// All sections of the gallery, in manifest (display) order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    pub sections: Vec<Section>,
}

/// A named, ordered collection of images.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub key: String,
    pub items: Vec<MediaItem>,
}

/// One photograph's metadata and URI variants.
///
/// Each image exists in up to three resolutions (thumb, medium, full)
/// and two formats (WebP and JPEG). Individual variants may be missing;
/// the `*_src` accessors encode the fallback order for each surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaItem {
    pub id: String,
    pub alt: String,
    /// Marks the section's cover image.
    pub hero: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb_webp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb_jpg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_webp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_jpg: Option<String>,
    /// Responsive size-set string, e.g. `"a.webp 600w, b.webp 1200w"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srcset_webp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srcset_jpg: Option<String>,
    /// Sizing hint for the responsive set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizes: Option<String>,
    /// Focal-point hint, carried through to markup as `object-position`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_position: Option<ObjectPosition>,
}

/// Focal point for cropped presentation, e.g. `"left"` or `"30% 60%"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectPosition {
    pub position: String,
}

impl Manifest {
    /// Section by key.
    pub fn section(&self, key: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.key == key)
    }

    /// Items of a section; an unknown key resolves to an empty list.
    pub fn items(&self, key: &str) -> &[MediaItem] {
        self.section(key).map(|s| s.items.as_slice()).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Section {
    /// The section's cover: first hero-flagged item, else the first item.
    pub fn cover(&self) -> Option<&MediaItem> {
        self.items
            .iter()
            .find(|it| it.hero)
            .or_else(|| self.items.first())
    }

    /// Display label derived from the key: dashes become spaces, words
    /// are title-cased (`"weld-county"` becomes `"Weld County"`).
    pub fn label(&self) -> String {
        section_label(&self.key)
    }
}

pub fn section_label(key: &str) -> String {
    key.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl MediaItem {
    /// Source shown in grid cells: thumbnail first, full as a last resort.
    ///
    /// `None` means no variant exists at all; such an item is
    /// unrenderable and must be skipped, never rendered broken.
    pub fn grid_src(&self) -> Option<&str> {
        self.thumb_jpg
            .as_deref()
            .or(self.thumb_webp.as_deref())
            .or(self.full_jpg.as_deref())
            .or(self.full_webp.as_deref())
    }

    /// Source shown in the lightbox: modern format preferred, then the
    /// legacy full variant, then whatever the grid shows.
    pub fn lightbox_src(&self) -> Option<&str> {
        self.full_webp
            .as_deref()
            .or(self.full_jpg.as_deref())
            .or(self.grid_src())
    }

    /// Source shown in carousel slides.
    pub fn carousel_src(&self) -> Option<&str> {
        self.full_jpg
            .as_deref()
            .or(self.full_webp.as_deref())
            .or(self.thumb_jpg.as_deref())
    }

    pub fn is_renderable(&self) -> bool {
        self.grid_src().is_some()
    }

    /// Ordered fallback candidates for a failed source.
    ///
    /// The chain is directed at the legacy format: the full JPEG variant
    /// first, then the first JPEG entry of the responsive set. The failed
    /// source itself and duplicates are excluded; an empty result means
    /// the element stays failed.
    pub fn fallback_candidates(&self, failed: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut push = |candidate: Option<&str>| {
            if let Some(c) = candidate
                && c != failed
                && !out.iter().any(|seen| seen.as_str() == c)
            {
                out.push(c.to_string());
            }
        };
        push(self.full_jpg.as_deref());
        push(self.srcset_jpg.as_deref().and_then(first_srcset_url));
        out
    }
}

/// URL of the first entry in a size-set string (`"a.jpg 600w, ..."` -> `"a.jpg"`).
pub fn first_srcset_url(srcset: &str) -> Option<&str> {
    srcset
        .split(',')
        .next()
        .and_then(|entry| entry.split_whitespace().next())
        .filter(|url| !url.is_empty())
}

/// URL of the last (largest) entry in a size-set string.
pub fn last_srcset_url(srcset: &str) -> Option<&str> {
    srcset
        .split(',')
        .next_back()
        .and_then(|entry| entry.split_whitespace().next())
        .filter(|url| !url.is_empty())
}

/// Read and parse the manifest, degrading to an empty manifest on any
/// failure. One attempt, no retries; a reload re-reads the file.
pub fn load(path: &Path) -> Manifest {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!(path = %path.display(), %err, "manifest unavailable, sections will be empty");
            return Manifest::default();
        }
    };
    match serde_json::from_str(&text) {
        Ok(manifest) => manifest,
        Err(err) => {
            warn!(path = %path.display(), %err, "manifest parse failed, sections will be empty");
            Manifest::default()
        }
    }
}

// Sections serialize as a JSON map in document order, matching what the
// manifest generator emits. A derived map type would lose the ordering.

impl Serialize for Manifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for section in &self.sections {
            map.serialize_entry(&section.key, &section.items)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Manifest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SectionsVisitor;

        impl<'de> Visitor<'de> for SectionsVisitor {
            type Value = Manifest;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of section key to image list")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Manifest, A::Error> {
                let mut sections = Vec::new();
                while let Some((key, items)) = access.next_entry::<String, Vec<MediaItem>>()? {
                    sections.push(Section { key, items });
                }
                Ok(Manifest { sections })
            }
        }

        deserializer.deserialize_map(SectionsVisitor)
    }
}
