use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Estimated advance per character, as a fraction of the font size, used
/// whenever no matching font face can be found.
const FALLBACK_ADVANCE: f32 = 0.56;

/// Shrink-to-fit never goes below this fraction of the requested size.
const MIN_FIT_SCALE: f32 = 0.4;

/// Width of `text` at `font_size` in the first available family from the
/// CSS-style `font_family` list. `None` when no face on the system matches.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

/// Largest size, capped at `font_size`, at which `text` spans at most
/// `max_width`. Scales down linearly and floors at 40% of the request, so a
/// very long patient note overflows instead of vanishing.
pub fn fit_font_size(text: &str, font_size: f32, max_width: f32, font_family: &str) -> f32 {
    if text.is_empty() || font_size <= 0.0 {
        return font_size;
    }
    if max_width <= 0.0 {
        return font_size * MIN_FIT_SCALE;
    }
    let width = measure_text_width(text, font_size, font_family).unwrap_or_else(|| {
        font_size * FALLBACK_ADVANCE * text.chars().filter(|ch| *ch != '\n').count() as f32
    });
    if width <= max_width {
        font_size
    } else {
        (font_size * max_width / width).max(font_size * MIN_FIT_SCALE)
    }
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let key = normalize_family_key(font_family);
        if !self.faces.contains_key(&key) {
            let face = self.load_face(font_family);
            self.faces.insert(key.clone(), face);
        }
        let face = self.faces.get_mut(&key).and_then(|slot| slot.as_mut())?;
        let normalized = text.replace('\t', "    ");
        face.measure_width(&normalized, font_size)
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        let slots = parse_family_list(font_family);
        let families: Vec<Family<'_>> = slots
            .iter()
            .map(|slot| match slot {
                FamilySlot::Named(name) => Family::Name(name.as_str()),
                FamilySlot::Generic(generic) => *generic,
            })
            .collect();

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut loaded: Option<FontFace> = None;
        self.db.with_face_data(id, |data, index| {
            loaded = FontFace::new(data.to_vec(), index);
        });
        loaded
    }
}

/// One entry of a CSS font-family list, with generic keywords resolved to
/// fontdb's generic families.
#[derive(Debug, Clone, PartialEq)]
enum FamilySlot {
    Named(String),
    Generic(Family<'static>),
}

fn parse_family_list(font_family: &str) -> Vec<FamilySlot> {
    let mut slots = Vec::new();
    for part in font_family.split(',') {
        let raw = part.trim().trim_matches('"').trim_matches('\'');
        if raw.is_empty() {
            continue;
        }
        let slot = match raw.to_ascii_lowercase().as_str() {
            "serif" => FamilySlot::Generic(Family::Serif),
            "sans-serif" => FamilySlot::Generic(Family::SansSerif),
            "monospace" | "ui-monospace" => FamilySlot::Generic(Family::Monospace),
            "cursive" => FamilySlot::Generic(Family::Cursive),
            "fantasy" => FamilySlot::Generic(Family::Fantasy),
            "system-ui" | "-apple-system" | "ui-sans-serif" => {
                FamilySlot::Generic(Family::SansSerif)
            }
            _ => FamilySlot::Named(raw.to_string()),
        };
        slots.push(slot);
    }
    if slots.is_empty() {
        slots.push(FamilySlot::Generic(Family::SansSerif));
    }
    slots
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
    char_advances: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn new(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        drop(face);
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
            char_advances: HashMap::new(),
        })
    }

    fn measure_width(&mut self, text: &str, font_size: f32) -> Option<f32> {
        let scale = font_size / self.units_per_em as f32;
        let fallback = font_size * FALLBACK_ADVANCE;

        if text.is_ascii() {
            let mut width = 0.0f32;
            for byte in text.as_bytes() {
                if *byte == b'\n' {
                    continue;
                }
                match self.ascii_advances[*byte as usize] {
                    0 => width += fallback,
                    advance => width += advance as f32 * scale,
                }
            }
            return Some(width.max(0.0));
        }

        // A parsed Face borrows the font bytes, so it cannot live in the
        // struct; non-ASCII text reparses per call and caches by char.
        let face = Face::parse(&self.data, self.index).ok()?;
        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = match self.char_advances.get(&ch) {
                Some(cached) => *cached,
                None => {
                    let resolved = face
                        .glyph_index(ch)
                        .and_then(|glyph| face.glyph_hor_advance(glyph));
                    self.char_advances.insert(ch, resolved);
                    resolved
                }
            };
            match advance {
                Some(units) => width += units as f32 * scale,
                None => width += fallback,
            }
        }
        Some(width.max(0.0))
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}
