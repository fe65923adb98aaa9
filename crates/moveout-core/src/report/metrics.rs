//! Helvetica metrics for measuring and wrapping report text
//!
//! Advance widths (1/1000 em) of the standard Type 1 Helvetica faces for
//! printable ASCII. Anything else is measured as a digit.

use super::layout::Font;

const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Convert typographic points to millimetres
pub fn pt_to_mm(pt: f32) -> f32 {
    pt * 25.4 / 72.0
}

fn char_width(ch: char, font: Font) -> u16 {
    let table = match font {
        Font::Regular => &HELVETICA,
        Font::Bold => &HELVETICA_BOLD,
    };
    let code = ch as usize;
    if (32..127).contains(&code) {
        table[code - 32]
    } else {
        FALLBACK_WIDTH
    }
}

/// Rendered width of `text` in millimetres
pub fn text_width(text: &str, size: f32, font: Font) -> f32 {
    let units: u32 = text.chars().map(|ch| u32::from(char_width(ch, font))).sum();
    pt_to_mm(units as f32 / 1000.0 * size)
}

/// Greedy word wrap to `max_width` millimetres
///
/// Explicit newlines start a new line. Words wider than the limit are split
/// between characters. Always returns at least one line.
pub fn wrap_text(text: &str, max_width: f32, size: f32, font: Font) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if text_width(&candidate, size, font) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            for ch in word.chars() {
                current.push(ch);
                if text_width(&current, size, font) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }

        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        // "0" is 556 units; at 10pt that is 5.56pt
        let width = text_width("0", 10.0, Font::Regular);
        assert!((width - pt_to_mm(5.56)).abs() < 1e-4);
        assert!(text_width("Bold", 12.0, Font::Bold) > text_width("Bold", 12.0, Font::Regular));
        assert_eq!(text_width("", 12.0, Font::Regular), 0.0);
    }

    #[test]
    fn test_wrap_short_text_is_one_line() {
        assert_eq!(wrap_text("No notes", 50.0, 9.0, Font::Regular), vec!["No notes"]);
        assert_eq!(wrap_text("", 50.0, 9.0, Font::Regular), vec![""]);
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "Scuff marks along the lower wall behind the door and near the window sill";
        let lines = wrap_text(text, 40.0, 12.0, Font::Regular);

        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 12.0, Font::Regular) <= 40.0, "{line}");
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap_text(&"W".repeat(60), 30.0, 10.0, Font::Regular);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat().len(), 60);
    }

    #[test]
    fn test_wrap_keeps_explicit_newlines() {
        let lines = wrap_text("first\nsecond", 100.0, 8.0, Font::Regular);
        assert_eq!(lines, vec!["first", "second"]);
    }
}
