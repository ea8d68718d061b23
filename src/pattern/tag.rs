//! Scanner for bond tag lists, the text between `<` and `>`.

use crate::bond::BondSpec;

use super::error::{PatternError, PatternErrorKind};

/// Parse a tag list in isolation.
///
/// `text` starts right after the opening `<`. Returns a spec holding only
/// the tag masks and the number of characters consumed, including the `>`.
///
/// ```
/// let (spec, consumed) = crabpattern::parse_tag_list("1,2>").unwrap();
/// assert_eq!(spec.tag, (1 << 1) | (1 << 2));
/// assert_eq!(consumed, 4);
/// ```
pub fn parse_tag_list(text: &str) -> Result<(BondSpec, usize), PatternError> {
    let chars: Vec<char> = text.chars().collect();
    let mut spec = BondSpec::default();
    let end = scan_tag_list(&chars, 0, &mut spec)?;
    Ok((spec, end))
}

/// Scan `chars[start..]` up to and including the `>`, adding each label to
/// `spec`. Returns the index just past the `>`.
pub(crate) fn scan_tag_list(
    chars: &[char],
    start: usize,
    spec: &mut BondSpec,
) -> Result<usize, PatternError> {
    let mut pos = start;
    let mut negated = false;
    while let Some(&ch) = chars.get(pos) {
        match ch {
            '>' => return Ok(pos + 1),
            '!' => negated = true,
            ';' => negated = false,
            ',' => {}
            _ => {
                let Some(first) = ch.to_digit(10) else {
                    return Err(PatternError::new(pos, PatternErrorKind::UnrecognizedToken(ch)));
                };
                let mut label = first as u8;
                if let Some(second) = chars.get(pos + 1).and_then(|c| c.to_digit(10)) {
                    label = label * 10 + second as u8;
                    pos += 1;
                }
                spec.add_tag(label, negated);
            }
        }
        pos += 1;
    }
    Err(PatternError::new(
        chars.len(),
        PatternErrorKind::UnterminatedTagList,
    ))
}
