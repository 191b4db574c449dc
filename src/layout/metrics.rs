//! Heuristic text-width estimation without a font-rendering engine.
//!
//! Widths are approximations built from a per-family base multiplier and a
//! per-character-class correction. The estimate only needs to be deterministic
//! and monotonic in font size, since it drives the binary search in the solver.

use super::FontWeight;

/// Average advance per character, as a fraction of the font size.
#[derive(Debug, Clone, Copy)]
pub struct FamilyWidths {
    pub normal: f32,
    pub bold: f32,
}

impl FamilyWidths {
    fn for_weight(&self, weight: FontWeight) -> f32 {
        match weight {
            FontWeight::Normal => self.normal,
            FontWeight::Bold => self.bold,
        }
    }
}

/// Known font families and their width multipliers. Family lookup is
/// case-insensitive; anything unknown falls back to [`DEFAULT_WIDTHS`].
static FAMILY_METRICS: &[(&str, FamilyWidths)] = &[
    (
        "arial",
        FamilyWidths {
            normal: 0.528,
            bold: 0.56,
        },
    ),
    (
        "helvetica",
        FamilyWidths {
            normal: 0.53,
            bold: 0.56,
        },
    ),
    (
        "times new roman",
        FamilyWidths {
            normal: 0.48,
            bold: 0.51,
        },
    ),
    (
        "georgia",
        FamilyWidths {
            normal: 0.51,
            bold: 0.55,
        },
    ),
    (
        "verdana",
        FamilyWidths {
            normal: 0.58,
            bold: 0.62,
        },
    ),
    (
        "tahoma",
        FamilyWidths {
            normal: 0.55,
            bold: 0.59,
        },
    ),
    (
        "courier new",
        FamilyWidths {
            normal: 0.6,
            bold: 0.6,
        },
    ),
    (
        "impact",
        FamilyWidths {
            normal: 0.45,
            bold: 0.45,
        },
    ),
];

pub const DEFAULT_WIDTHS: FamilyWidths = FamilyWidths {
    normal: 0.53,
    bold: 0.56,
};

pub fn family_widths(family: &str) -> FamilyWidths {
    let wanted = family.trim();
    FAMILY_METRICS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
        .map(|(_, widths)| *widths)
        .unwrap_or(DEFAULT_WIDTHS)
}

/// Correction factor for a character relative to the family base multiplier.
fn char_class_factor(ch: char) -> f32 {
    match ch {
        'i' | 'I' | 'l' | '1' => 0.4,
        'f' | 'j' | 't' | 'J' => 0.5,
        'r' | 'F' => 0.65,
        'm' | 'w' | 'M' | 'W' => 1.5,
        ' ' => 0.3,
        '.' | ',' | ';' | ':' | '!' | '|' => 0.35,
        _ => 1.0,
    }
}

/// Estimates the rendered pixel width of `text` at `font_size`.
pub fn estimate_text_width(text: &str, font_size: f32, family: &str, weight: FontWeight) -> f32 {
    let base = family_widths(family).for_weight(weight);
    text.chars()
        .map(|ch| font_size * base * char_class_factor(ch))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_measures_zero() {
        assert_eq!(
            estimate_text_width("", 32.0, "Arial", FontWeight::Normal),
            0.0
        );
    }

    #[test]
    fn width_is_monotonic_in_font_size() {
        let samples = ["Hello World", "iiii", "MMMM", "a.b,c;d", "", "wide MW"];
        for text in samples {
            let mut previous = -1.0_f32;
            for size in [1, 8, 12, 24, 32, 64, 128] {
                let width = estimate_text_width(text, size as f32, "Arial", FontWeight::Normal);
                assert!(
                    width >= previous,
                    "width for {text:?} shrank between sizes (got {width} after {previous})"
                );
                previous = width;
            }
        }
    }

    #[test]
    fn narrow_glyphs_measure_less_than_wide_glyphs() {
        let narrow = estimate_text_width("iiii", 32.0, "Arial", FontWeight::Normal);
        let wide = estimate_text_width("mmmm", 32.0, "Arial", FontWeight::Normal);
        assert!(narrow < wide, "narrow={narrow} wide={wide}");
    }

    #[test]
    fn bold_is_at_least_as_wide_as_normal() {
        for family in ["Arial", "Verdana", "Courier New", "Nonexistent Sans"] {
            let normal = estimate_text_width("Sample Text", 24.0, family, FontWeight::Normal);
            let bold = estimate_text_width("Sample Text", 24.0, family, FontWeight::Bold);
            assert!(bold >= normal, "{family}: bold={bold} normal={normal}");
        }
    }

    #[test]
    fn unknown_family_falls_back_to_default() {
        let unknown = estimate_text_width("Sample", 20.0, "No Such Font", FontWeight::Normal);
        let default =
            "Sample".chars().map(char_class_factor).sum::<f32>() * 20.0 * DEFAULT_WIDTHS.normal;
        assert!((unknown - default).abs() < 1e-4);
    }

    #[test]
    fn family_lookup_is_case_insensitive() {
        let lower = estimate_text_width("abc", 16.0, "arial", FontWeight::Bold);
        let mixed = estimate_text_width("abc", 16.0, "ArIaL", FontWeight::Bold);
        assert_eq!(lower, mixed);
    }

    #[test]
    fn space_and_punctuation_are_narrow() {
        let space = estimate_text_width(" ", 100.0, "Arial", FontWeight::Normal);
        let dot = estimate_text_width(".", 100.0, "Arial", FontWeight::Normal);
        let letter = estimate_text_width("a", 100.0, "Arial", FontWeight::Normal);
        assert!(space < letter);
        assert!(dot < letter);
        assert!((space - 100.0 * 0.528 * 0.3).abs() < 1e-3);
        assert!((dot - 100.0 * 0.528 * 0.35).abs() < 1e-3);
    }
}
