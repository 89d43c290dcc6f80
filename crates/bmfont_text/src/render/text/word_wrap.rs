//! Line breaking
//!
//! Splits a character sequence into lines. Widths are measured by a
//! caller-supplied function so the wrapper stays independent of fonts.

use std::str::FromStr;

use crate::error::ConfigurationError;

/// How text is broken into lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    /// Break at word boundaries within the wrap width
    #[default]
    Normal,
    /// Keep explicit line breaks and whitespace verbatim, never reflow
    Pre,
    /// Only break at explicit line breaks
    NoWrap,
}

impl FromStr for WrapMode {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "pre" => Ok(Self::Pre),
            "nowrap" => Ok(Self::NoWrap),
            other => Err(ConfigurationError::InvalidWrapMode(other.to_string())),
        }
    }
}

/// One measured line: character range `[start, end)` and its pixel width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// First character index
    pub start: usize,
    /// One past the last character index
    pub end: usize,
    /// Rendered width in font pixels
    pub width: f32,
}

/// Break `text` into lines
///
/// `measure(text, start, end, width)` must return how many characters from
/// `start` fit before `width` is reached, as a [`Line`].
pub fn lines<M>(text: &[char], mode: WrapMode, width: f32, measure: M) -> Vec<Line>
where
    M: FnMut(&[char], usize, usize, f32) -> Line,
{
    match mode {
        WrapMode::Pre => pre(text, measure),
        WrapMode::Normal => greedy(text, width, measure),
        WrapMode::NoWrap => greedy(text, f32::MAX, measure),
    }
}

fn pre<M>(text: &[char], mut measure: M) -> Vec<Line>
where
    M: FnMut(&[char], usize, usize, f32) -> Line,
{
    let mut lines = Vec::new();
    let mut line_start = 0;

    for (i, &c) in text.iter().enumerate() {
        let is_newline = c == '\n';
        if is_newline || i == text.len() - 1 {
            let line_end = if is_newline { i } else { i + 1 };
            lines.push(measure(text, line_start, line_end, f32::MAX));
            line_start = i + 1;
        }
    }

    lines
}

fn next_newline(text: &[char], start: usize) -> usize {
    text[start..]
        .iter()
        .position(|&c| c == '\n')
        .map_or(text.len(), |offset| start + offset)
}

fn greedy<M>(text: &[char], width: f32, mut measure: M) -> Vec<Line>
where
    M: FnMut(&[char], usize, usize, f32) -> Line,
{
    let mut lines = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let newline = next_newline(text, start);

        // Leading whitespace never starts a wrapped line
        while start < newline && text[start].is_whitespace() {
            start += 1;
        }

        let measured = measure(text, start, newline, width);
        let mut line_end = start + (measured.end - measured.start);
        let mut next_start = line_end + 1;

        if line_end < newline {
            // Overflow: walk back to the last whitespace
            while line_end > start && !text[line_end].is_whitespace() {
                line_end -= 1;
            }

            if line_end == start {
                // A single word wider than the line is split where it overflows
                if next_start > start + 1 {
                    next_start -= 1;
                }
                line_end = next_start;
            } else {
                next_start = line_end;
                while line_end > start && text[line_end - 1].is_whitespace() {
                    line_end -= 1;
                }
            }
        }

        lines.push(measure(text, start, line_end, width));
        start = next_start;
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is 1 unit wide
    fn mono(text: &[char], start: usize, end: usize, width: f32) -> Line {
        let available = if width >= f32::MAX { usize::MAX } else { width as usize };
        let count = (end - start).min(available);
        let _ = text;
        Line {
            start,
            end: start + count,
            width: count as f32,
        }
    }

    fn split(text: &str, mode: WrapMode, width: f32) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        lines(&chars, mode, width, mono)
            .into_iter()
            .map(|l| chars[l.start..l.end].iter().collect())
            .collect()
    }

    #[test]
    fn test_normal_breaks_at_words() {
        assert_eq!(
            split("the quick brown fox", WrapMode::Normal, 10.0),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn test_normal_splits_long_words() {
        assert_eq!(
            split("abcdefghij", WrapMode::Normal, 4.0),
            vec!["abcd", "efgh", "ij"]
        );
    }

    #[test]
    fn test_normal_honours_newlines_and_trims_leading_space() {
        assert_eq!(
            split("ab\n  cd", WrapMode::Normal, 10.0),
            vec!["ab", "cd"]
        );
    }

    #[test]
    fn test_nowrap_ignores_width() {
        assert_eq!(
            split("the quick brown fox\njumps", WrapMode::NoWrap, 4.0),
            vec!["the quick brown fox", "jumps"]
        );
    }

    #[test]
    fn test_pre_keeps_whitespace() {
        assert_eq!(
            split("  a b\n\n c  ", WrapMode::Pre, 2.0),
            vec!["  a b", "", " c  "]
        );
    }

    #[test]
    fn test_empty_text_has_no_lines() {
        assert!(split("", WrapMode::Normal, 10.0).is_empty());
        assert!(split("", WrapMode::Pre, 10.0).is_empty());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("pre".parse::<WrapMode>(), Ok(WrapMode::Pre));
        assert_eq!("nowrap".parse::<WrapMode>(), Ok(WrapMode::NoWrap));
        assert!("wrap".parse::<WrapMode>().is_err());
    }
}
