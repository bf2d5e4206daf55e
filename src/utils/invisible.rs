//! Makes invisible characters in file names visible as escape codes.

/// Blank or invisible code points, as inclusive ranges.
const INVISIBLE_RANGES: [(u32, u32); 27] = [
    (9, 13),
    (32, 32),
    (127, 127),
    (160, 160),
    (173, 173),
    (847, 847),
    (1564, 1564),
    (4447, 4448),
    (6068, 6069),
    (6155, 6158),
    (7355, 7356),
    (8192, 8207),
    (8234, 8239),
    (8287, 8303),
    (10240, 10240),
    (12288, 12288),
    (12644, 12644),
    (65024, 65039),
    (65279, 65279),
    (65440, 65440),
    (65520, 65528),
    (65532, 65532),
    (78844, 78844),
    (119155, 119162),
    (917504, 917631),
    (917760, 917999),
    (0xE000, 0xF8FF),
];

/// A run of text, either shown as-is or as highlighted escape codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

pub fn is_invisible(c: char) -> bool {
    let code = c as u32;
    c.is_control()
        || INVISIBLE_RANGES
            .iter()
            .any(|&(start, end)| code >= start && code <= end)
}

pub fn printable_code(c: char) -> String {
    match c {
        '\u{7}' => "\\a".to_string(),
        '\u{8}' => "\\b".to_string(),
        '\u{c}' => "\\f".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        '\u{b}' => "\\v".to_string(),
        _ => format!("\\u{:x}", c as u32),
    }
}

/// Splits `name` into plain and highlighted segments.
///
/// Invisible characters become escape codes. Spaces are kept as they are, except leading
/// and trailing ones, which would otherwise be impossible to spot.
pub fn highlight_invisible(name: &str) -> Vec<Segment> {
    let chars: Vec<char> = name.chars().collect();
    let leading = chars.iter().take_while(|c| is_invisible(**c)).count();
    let trailing = chars[leading..]
        .iter()
        .rev()
        .take_while(|c| is_invisible(**c))
        .count();
    let trailing_start = chars.len() - trailing;

    let mut segments: Vec<Segment> = Vec::new();
    for (i, &c) in chars.iter().enumerate() {
        let edge = i < leading || i >= trailing_start;
        let highlighted = is_invisible(c) && (edge || c != ' ');
        let piece = if highlighted {
            printable_code(c)
        } else {
            c.to_string()
        };

        match segments.last_mut() {
            Some(last) if last.highlighted == highlighted => last.text.push_str(&piece),
            _ => segments.push(Segment {
                text: piece,
                highlighted,
            }),
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(text: &str, highlighted: bool) -> Segment {
        Segment {
            text: text.to_string(),
            highlighted,
        }
    }

    #[test]
    fn test_plain_name_is_one_segment() {
        assert_eq!(highlight_invisible("photo.jpg"), vec![seg("photo.jpg", false)]);
        assert!(highlight_invisible("").is_empty());
    }

    #[test]
    fn test_interior_spaces_kept_edges_escaped() {
        assert_eq!(
            highlight_invisible(" my file "),
            vec![seg("\\u20", true), seg("my file", false), seg("\\u20", true)]
        );
    }

    #[test]
    fn test_control_characters_escaped() {
        assert_eq!(
            highlight_invisible("a\nb\u{200b}c"),
            vec![
                seg("a", false),
                seg("\\n", true),
                seg("b", false),
                seg("\\u200b", true),
                seg("c", false),
            ]
        );
    }
}
