//! Soft wrapping of catalog text for the terminal

/// Wrap width used next to the score bars
pub const NARROW: usize = 55;

/// Wrap width used for full-screen text
pub const WIDE: usize = 70;

/// Insert line breaks so no line shows more than `width` characters.
///
/// Breaks go right after the last whitespace run at or before the limit, so
/// words are never split and no line is left holding only whitespace. A word longer than the limit keeps its own
/// overlong line. Trailing whitespace does not count towards the limit,
/// which makes `wrap(wrap(s, w), w) == wrap(s, w)`.
pub fn wrap(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / width.max(1));
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        wrap_line(line, width, &mut out);
    }
    out
}

fn wrap_line(line: &str, width: usize, out: &mut String) {
    let chars: Vec<char> = line.chars().collect();
    let mut start = 0;
    loop {
        let segment = &chars[start..];
        let visible = visible_len(segment);
        if visible <= width {
            out.extend(segment);
            return;
        }
        match break_point(segment, visible, width) {
            Some(i) => {
                out.extend(&segment[..=i]);
                out.push('\n');
                start += i + 1;
            }
            None => {
                out.extend(segment);
                return;
            }
        }
    }
}

/// Length without trailing whitespace
fn visible_len(segment: &[char]) -> usize {
    segment.len()
        - segment
            .iter()
            .rev()
            .take_while(|c| c.is_whitespace())
            .count()
}

/// Index of the last character to keep on the current line
fn break_point(segment: &[char], visible: usize, width: usize) -> Option<usize> {
    // Breaking inside the leading whitespace would leave a blank line
    let first = segment.iter().take_while(|c| c.is_whitespace()).count() + 1;
    let found = (first..=width.min(visible - 1))
        .rev()
        .find(|&i| segment[i].is_whitespace())
        .or_else(|| (first.max(width + 1)..visible).find(|&i| segment[i].is_whitespace()))?;
    // Keep the whole run, so the next line starts on a word
    let run = segment[found..]
        .iter()
        .take_while(|c| c.is_whitespace())
        .count();
    Some(found + run - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: &str = "Calculating your carbon footprint helps you understand how your \
daily choices affect the planet and where small changes can make the biggest difference \
over the course of a year.";

    /// Every '\n' in `wrapped` that is not in `original` must follow whitespace.
    fn breaks_follow_whitespace(original: &str, wrapped: &str) -> bool {
        let orig: Vec<char> = original.chars().collect();
        let mut j = 0;
        let mut prev: Option<char> = None;
        for c in wrapped.chars() {
            if j < orig.len() && orig[j] == c {
                j += 1;
                prev = Some(c);
                continue;
            }
            if c != '\n' || !prev.is_some_and(char::is_whitespace) {
                return false;
            }
        }
        j == orig.len()
    }

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(wrap("Short text", 70), "Short text");
        assert_eq!(wrap("", 70), "");
    }

    #[test]
    fn test_lines_fit_width() {
        let wrapped = wrap(LONG, WIDE);
        for line in wrapped.lines() {
            assert!(line.trim_end().chars().count() <= WIDE, "{line:?}");
        }
        assert!(wrapped.lines().count() > 1);
    }

    #[test]
    fn test_breaks_after_whitespace() {
        let wrapped = wrap("aaaa bbbb cccc", 9);
        assert_eq!(wrapped, "aaaa bbbb \ncccc");
        assert!(breaks_follow_whitespace(LONG, &wrap(LONG, NARROW)));
        assert!(breaks_follow_whitespace(LONG, &wrap(LONG, WIDE)));
    }

    #[test]
    fn test_never_splits_words() {
        let wrapped = wrap(LONG, NARROW);
        let words: Vec<&str> = LONG.split_whitespace().collect();
        let rewrapped: Vec<&str> = wrapped.split_whitespace().collect();
        assert_eq!(words, rewrapped);
    }

    #[test]
    fn test_overlong_word_left_unwrapped() {
        let text = "supercalifragilistic word";
        assert_eq!(wrap(text, 5), "supercalifragilistic \nword");
        assert_eq!(wrap("nospaceshereatall", 5), "nospaceshereatall");
    }

    #[test]
    fn test_no_whitespace_only_lines() {
        assert_eq!(wrap("supercal   word", 5), "supercal   \nword");
        assert_eq!(wrap("  abcdefgh", 5), "  abcdefgh");
        assert_eq!(wrap("aaaa   bbbb", 6), "aaaa   \nbbbb");
        for width in [1, 5, 9] {
            let wrapped = wrap("  leading   and  doubled   spaces   everywhere  ", width);
            for line in wrapped.lines() {
                assert!(!line.trim().is_empty(), "width {width}: {wrapped:?}");
            }
        }
    }

    #[test]
    fn test_idempotent() {
        for width in [0, 1, 5, 9, NARROW, WIDE] {
            for text in [
                LONG,
                "aaaa bbbb cccc",
                "  leading   and  doubled   spaces   everywhere  ",
                "supercalifragilistic word and more words",
                "first line\nsecond line that is a good deal longer than the first",
            ] {
                let once = wrap(text, width);
                assert_eq!(wrap(&once, width), once, "width {width} text {text:?}");
            }
        }
    }

    #[test]
    fn test_existing_breaks_preserved() {
        assert_eq!(wrap("one\ntwo", 70), "one\ntwo");
    }
}
