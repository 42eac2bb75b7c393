use std::collections::VecDeque;
use unicode_width::UnicodeWidthChar;

pub fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// "0 words", "1 word", "12 words".
pub fn word_count_label(text: &str) -> String {
    let count = word_count(text);
    format!("{} word{}", count, if count == 1 { "" } else { "s" })
}

/// Byte index of the char boundary before `index`.
pub fn prev_boundary(text: &str, index: usize) -> usize {
    text[..index.min(text.len())]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Byte index of the char boundary after `index`.
pub fn next_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    text[index..]
        .chars()
        .next()
        .map(|c| index + c.len_utf8())
        .unwrap_or(text.len())
}

#[derive(Debug, Clone, Copy)]
struct Glyph {
    offset: usize,
    width: usize,
    whitespace: bool,
}

/// Splits one logical line into rows the same way ratatui's word wrapper
/// does for `Wrap { trim: false }`. Whitespace swallowed at a wrap point
/// is dropped from the output.
fn simulate_wrapped_rows(glyphs: &[Glyph], max_width: usize) -> Vec<Vec<Glyph>> {
    let mut rows = Vec::new();
    let mut pending_line: Vec<Glyph> = Vec::new();
    let mut pending_word: Vec<Glyph> = Vec::new();
    let mut pending_whitespace: VecDeque<Glyph> = VecDeque::new();
    let mut line_width = 0;
    let mut word_width = 0;
    let mut whitespace_width = 0;
    let mut non_whitespace_previous = false;

    for &glyph in glyphs {
        if glyph.width > max_width {
            continue;
        }

        let word_found = non_whitespace_previous && glyph.whitespace;
        let untrimmed_overflow = pending_line.is_empty()
            && word_width + whitespace_width + glyph.width > max_width;
        if word_found || untrimmed_overflow {
            pending_line.extend(pending_whitespace.drain(..));
            line_width += whitespace_width;
            pending_line.append(&mut pending_word);
            line_width += word_width;
            whitespace_width = 0;
            word_width = 0;
        }

        let line_full = line_width >= max_width;
        let pending_word_overflow =
            glyph.width > 0 && line_width + whitespace_width + word_width >= max_width;
        if line_full || pending_word_overflow {
            let mut remaining_width = max_width.saturating_sub(line_width);
            rows.push(std::mem::take(&mut pending_line));
            line_width = 0;

            while let Some(&front) = pending_whitespace.front() {
                if front.width > remaining_width {
                    break;
                }
                whitespace_width -= front.width;
                remaining_width -= front.width;
                pending_whitespace.pop_front();
            }

            if glyph.whitespace && pending_whitespace.is_empty() {
                continue;
            }
        }

        if glyph.whitespace {
            whitespace_width += glyph.width;
            pending_whitespace.push_back(glyph);
        } else {
            word_width += glyph.width;
            pending_word.push(glyph);
        }
        non_whitespace_previous = !glyph.whitespace;
    }

    if pending_line.is_empty() && pending_word.is_empty() && !pending_whitespace.is_empty() {
        rows.push(Vec::new());
    }
    pending_line.extend(pending_whitespace);
    pending_line.append(&mut pending_word);
    if !pending_line.is_empty() {
        rows.push(pending_line);
    }
    if rows.is_empty() {
        rows.push(Vec::new());
    }
    rows
}

/// Visual (line, column) of the byte offset `cursor` once `text` is
/// word-wrapped at `max_width` columns. Explicit newlines start a new line.
/// A cursor on whitespace dropped at a wrap sits before the next glyph.
pub fn wrapped_cursor_position(text: &str, cursor: usize, max_width: usize) -> (usize, usize) {
    let max_width = max_width.max(1);
    let cursor = cursor.min(text.len());
    let mut first_row = 0;
    let mut line_start = 0;

    for line in text.split('\n') {
        let line_end = line_start + line.len();
        let glyphs: Vec<Glyph> = line
            .char_indices()
            .map(|(index, ch)| Glyph {
                offset: line_start + index,
                width: ch.width().unwrap_or(0),
                whitespace: ch.is_whitespace() && ch != '\u{a0}',
            })
            .collect();
        let rows = simulate_wrapped_rows(&glyphs, max_width);

        if cursor <= line_end {
            for (index, row) in rows.iter().enumerate() {
                let mut col = 0;
                for glyph in row {
                    if glyph.offset >= cursor {
                        return (first_row + index, col);
                    }
                    col += glyph.width;
                }
            }
            let last_width = rows
                .last()
                .map_or(0, |row| row.iter().map(|glyph| glyph.width).sum());
            return (first_row + rows.len() - 1, last_width);
        }

        first_row += rows.len();
        line_start = line_end + 1;
    }

    (first_row, 0)
}

/// Keeps `line` inside a window of `visible` lines starting at `scroll`.
pub fn follow_cursor(scroll: usize, line: usize, visible: usize) -> usize {
    if line < scroll {
        line
    } else if visible > 0 && line >= scroll + visible {
        line + 1 - visible
    } else {
        scroll
    }
}
