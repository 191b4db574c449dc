//! Greedy line wrapping against the heuristic width estimate.

use super::FontWeight;
use super::metrics::estimate_text_width;

/// Wraps `text` into lines whose estimated width stays within `max_width`.
///
/// Explicit `\n` characters are always honored as hard breaks; an empty
/// paragraph between two breaks is preserved as an empty output line so the
/// vertical spacing of the source text survives wrapping. Words wider than
/// `max_width` are split by [`break_long_word`].
pub fn wrap_text(
    text: &str,
    max_width: f32,
    font_size: f32,
    family: &str,
    weight: FontWeight,
) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        wrap_paragraph(paragraph, max_width, font_size, family, weight, &mut lines);
    }
    lines
}

fn wrap_paragraph(
    paragraph: &str,
    max_width: f32,
    font_size: f32,
    family: &str,
    weight: FontWeight,
    lines: &mut Vec<String>,
) {
    let words: Vec<&str> = paragraph.split_whitespace().collect();
    if words.is_empty() {
        lines.push(String::new());
        return;
    }

    let mut current = String::new();
    for word in words {
        let trial = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if estimate_text_width(&trial, font_size, family, weight) <= max_width {
            current = trial;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if estimate_text_width(word, font_size, family, weight) > max_width {
            let mut fragments = break_long_word(word, max_width, font_size, family, weight);
            // The final fragment stays open so following words may join it.
            current = fragments.pop().unwrap_or_default();
            lines.append(&mut fragments);
        } else {
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
}

/// Splits a single over-wide word into fragments that fit `max_width`, marking
/// each forced break with a trailing hyphen (the final fragment gets none).
///
/// If even a single character is wider than `max_width` it is emitted alone and
/// the overflow is accepted; callers treat such fragments as atomic.
pub fn break_long_word(
    word: &str,
    max_width: f32,
    font_size: f32,
    family: &str,
    weight: FontWeight,
) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current = String::new();
    for ch in word.chars() {
        let mut trial = current.clone();
        trial.push(ch);
        trial.push('-');
        if estimate_text_width(&trial, font_size, family, weight) <= max_width {
            current.push(ch);
        } else if current.is_empty() {
            fragments.push(ch.to_string());
        } else {
            current.push('-');
            fragments.push(std::mem::take(&mut current));
            current.push(ch);
        }
    }
    if !current.is_empty() {
        fragments.push(current);
    }
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAMILY: &str = "Arial";

    fn width(text: &str, size: f32) -> f32 {
        estimate_text_width(text, size, FAMILY, FontWeight::Normal)
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let lines = wrap_text("Hello World", 720.0, 32.0, FAMILY, FontWeight::Normal);
        assert_eq!(lines, vec!["Hello World"]);
    }

    #[test]
    fn explicit_breaks_preserve_empty_lines() {
        let lines = wrap_text(
            "Line one\n\nLine three",
            720.0,
            32.0,
            FAMILY,
            FontWeight::Normal,
        );
        assert_eq!(lines, vec!["Line one", "", "Line three"]);
    }

    #[test]
    fn wrapped_lines_fit_unless_atomic() {
        let texts = [
            "the quick brown fox jumps over the lazy dog",
            "a bb ccc dddd eeeee ffffff ggggggg",
            "punctuation, heavy; text: with. marks!",
            "Supercalifragilisticexpialidocious and friends",
        ];
        for text in texts {
            for max_width in [60.0, 120.0, 200.0, 400.0] {
                for size in [12.0, 18.0, 32.0] {
                    let lines = wrap_text(text, max_width, size, FAMILY, FontWeight::Normal);
                    for line in &lines {
                        let atomic = !line.contains(' ');
                        assert!(
                            width(line, size) <= max_width || atomic,
                            "line {line:?} overflows {max_width} at size {size}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn wrapping_is_idempotent_on_wrapped_lines() {
        let text = "the quick brown fox jumps over the lazy dog again and again";
        let lines = wrap_text(text, 180.0, 18.0, FAMILY, FontWeight::Normal);
        for line in &lines {
            if line.is_empty() {
                continue;
            }
            let rewrapped = wrap_text(line, 180.0, 18.0, FAMILY, FontWeight::Normal);
            assert_eq!(rewrapped, vec![line.clone()]);
        }
    }

    #[test]
    fn long_word_breaks_into_hyphenated_fragments() {
        let word: String = std::iter::repeat('x').take(50).collect();
        let fragments = break_long_word(&word, 100.0, 32.0, FAMILY, FontWeight::Normal);
        assert!(fragments.len() >= 2, "expected multiple fragments");
        for fragment in &fragments[..fragments.len() - 1] {
            assert!(
                fragment.ends_with('-'),
                "non-final fragment {fragment:?} lacks hyphen"
            );
        }
        assert!(!fragments.last().unwrap().ends_with('-'));
        let rejoined: String = fragments
            .iter()
            .map(|fragment| fragment.trim_end_matches('-'))
            .collect();
        assert_eq!(rejoined, word);
    }

    #[test]
    fn oversized_single_characters_are_emitted_alone() {
        // At size 400, a single 'm' is far wider than 100px.
        let fragments = break_long_word("mm", 100.0, 400.0, FAMILY, FontWeight::Normal);
        assert_eq!(fragments, vec!["m", "m"]);
    }

    #[test]
    fn long_word_inside_sentence_is_broken() {
        let text = "see Supercalifragilisticexpialidocious now";
        let lines = wrap_text(text, 120.0, 24.0, FAMILY, FontWeight::Normal);
        assert!(lines.len() > 2);
        assert!(lines.iter().any(|line| line.ends_with('-')));
    }

    #[test]
    fn whitespace_only_paragraph_becomes_empty_line() {
        let lines = wrap_text("one\n   \ntwo", 720.0, 20.0, FAMILY, FontWeight::Normal);
        assert_eq!(lines, vec!["one", "", "two"]);
    }
}
