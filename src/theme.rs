use crate::error::LayoutError;
use serde::{Deserialize, Serialize};

/// Label text language. Selects the font stack; the face layout itself is
/// language-independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "ja-JP")]
    JaJp,
    #[serde(rename = "zh-CN")]
    ZhCn,
}

impl Language {
    pub fn parse(value: &str) -> Result<Self, LayoutError> {
        match value.trim() {
            "en-US" | "en" => Ok(Language::EnUs),
            "ja-JP" | "ja" => Ok(Language::JaJp),
            "zh-CN" | "zh" => Ok(Language::ZhCn),
            _ => Err(LayoutError::InvalidLanguage(value.to_string())),
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Language::EnUs => "en-US",
            Language::JaJp => "ja-JP",
            Language::ZhCn => "zh-CN",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::EnUs
    }
}

/// Visual styling for a label face.
///
/// Font sizes are typographic points; vertical anchors are fractions of the
/// label height so one theme scales across sheet formats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub title_font_size: f32,
    pub date_font_size: f32,
    pub year_font_size: f32,
    pub number_font_size: f32,
    pub text_color: String,
    pub background: String,
    pub outline_color: String,
    pub default_title: String,
    pub title_y: f32,
    pub date_y: f32,
    pub year_y: f32,
    pub number_y: f32,
    pub qr_height_ratio: f32,
    pub qr_inset_ratio: f32,
}

impl Theme {
    pub fn latin() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            title_font_size: 12.0,
            date_font_size: 16.0,
            year_font_size: 14.0,
            number_font_size: 14.0,
            text_color: "#000000".to_string(),
            background: "#ffffff".to_string(),
            outline_color: "#999999".to_string(),
            default_title: "SMILEBAR".to_string(),
            title_y: 0.2,
            date_y: 0.4,
            year_y: 0.5667,
            number_y: 0.7333,
            qr_height_ratio: 0.4,
            qr_inset_ratio: 0.08,
        }
    }

    pub fn japanese() -> Self {
        Self {
            font_family: "\"Noto Sans JP\", sans-serif".to_string(),
            ..Self::latin()
        }
    }

    pub fn simplified_chinese() -> Self {
        Self {
            font_family: "\"Noto Sans SC\", sans-serif".to_string(),
            ..Self::latin()
        }
    }

    pub fn for_language(language: Language) -> Self {
        match language {
            Language::EnUs => Self::latin(),
            Language::JaJp => Self::japanese(),
            Language::ZhCn => Self::simplified_chinese(),
        }
    }

    /// First concrete family in the stack, for rasterizers that want a single
    /// name rather than a CSS list.
    pub fn primary_font_family(&self) -> String {
        self.font_family
            .split(',')
            .next()
            .unwrap_or("sans-serif")
            .trim()
            .trim_matches('"')
            .trim_matches('\'')
            .to_string()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::latin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_parses_full_tags_and_shorthands() {
        assert_eq!(Language::parse("en-US").unwrap(), Language::EnUs);
        assert_eq!(Language::parse("ja").unwrap(), Language::JaJp);
        assert_eq!(Language::parse("zh-CN").unwrap(), Language::ZhCn);
        assert!(Language::parse("fr-FR").is_err());
    }

    #[test]
    fn language_serde_round_trips_the_bcp47_tag() {
        let json = serde_json::to_string(&Language::JaJp).unwrap();
        assert_eq!(json, "\"ja-JP\"");
        let back: Language = serde_json::from_str("\"zh-CN\"").unwrap();
        assert_eq!(back, Language::ZhCn);
    }

    #[test]
    fn themes_differ_only_in_font_stack() {
        let latin = Theme::latin();
        let japanese = Theme::for_language(Language::JaJp);
        assert_ne!(latin.font_family, japanese.font_family);
        assert_eq!(latin.date_font_size, japanese.date_font_size);
        assert_eq!(latin.default_title, japanese.default_title);
    }

    #[test]
    fn primary_family_strips_quotes_and_fallbacks() {
        assert_eq!(Theme::latin().primary_font_family(), "Inter");
        assert_eq!(Theme::japanese().primary_font_family(), "Noto Sans JP");
    }

    #[test]
    fn anchors_sit_inside_the_label() {
        let theme = Theme::default();
        for anchor in [theme.title_y, theme.date_y, theme.year_y, theme.number_y] {
            assert!(anchor > 0.0 && anchor < 1.0);
        }
        assert!(theme.title_y < theme.date_y);
        assert!(theme.date_y < theme.year_y);
        assert!(theme.year_y < theme.number_y);
    }
}
