//! Scanner for bracket atom expressions, the text between `[` and `]`.

use crate::atom::{AtomSpec, Chirality};
use crate::flags::{ChargeMask, ClassMask, CountMask, ElementMask, RingMask};

use super::error::{PatternError, PatternErrorKind};

/// Parse a bracket expression in isolation.
///
/// `text` starts right after the opening `[`. Returns the atom spec and the
/// number of characters consumed, including the closing `]`. Error offsets
/// are relative to `text`.
pub fn parse_atom_block(text: &str) -> Result<(AtomSpec, usize), PatternError> {
    let chars: Vec<char> = text.chars().collect();
    scan_atom_block(&chars, 0)
}

/// Scan `chars[start..]` up to and including the closing `]`.
///
/// Returns the atom spec and the index just past the `]`. Offsets in errors are
/// indices into `chars`.
pub(crate) fn scan_atom_block(
    chars: &[char],
    start: usize,
) -> Result<(AtomSpec, usize), PatternError> {
    let mut scanner = BlockScanner {
        chars,
        pos: start,
        spec: AtomSpec::default(),
        not_flag: false,
        atom_seen: false,
    };
    let end = scanner.run()?;
    Ok((scanner.spec, end))
}

struct BlockScanner<'a> {
    chars: &'a [char],
    pos: usize,
    spec: AtomSpec,
    /// `!` seen in the current `;` clause.
    not_flag: bool,
    /// An element was named since the last junction, so `H` is a count.
    atom_seen: bool,
}

impl BlockScanner<'_> {
    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn digit_after(&self) -> Option<u8> {
        self.peek(1)
            .and_then(|c| c.to_digit(10))
            .map(|d| d as u8)
    }

    fn error(&self, pos: usize, kind: PatternErrorKind) -> PatternError {
        PatternError::new(pos, kind)
    }

    fn run(&mut self) -> Result<usize, PatternError> {
        while let Some(ch) = self.peek(0) {
            match ch {
                ']' => return Ok(self.pos + 1),
                '!' => {
                    self.not_flag = true;
                    self.atom_seen = false;
                    self.pos += 1;
                }
                ',' => {
                    self.atom_seen = false;
                    self.pos += 1;
                }
                ';' => {
                    self.not_flag = false;
                    self.atom_seen = false;
                    self.pos += 1;
                }
                '*' => self.element(ElementMask::ANY, 1),
                '?' => self.element(ElementMask::NOT_H, 1),
                '@' => {
                    let count = self.repeat_count('@')?;
                    self.spec.chirality = Chirality::from_count(count);
                }
                '+' | '-' => self.charge(ch)?,
                'a' => {
                    self.spec.add_class(ClassMask::AROMATIC, self.not_flag);
                    self.pos += 1;
                }
                'p' => {
                    self.spec.add_class(ClassMask::PI, self.not_flag);
                    self.pos += 1;
                }
                'r' => self.ring(),
                'v' => self.valence()?,
                'D' => self.degree()?,
                'H' => self.hydrogen(),
                _ => match element_token(ch, self.peek(1)) {
                    Some((mask, len)) => self.element(mask, len),
                    None if ch == 'A' => {
                        self.spec.add_class(ClassMask::ALIPHATIC, self.not_flag);
                        self.pos += 1;
                    }
                    None => {
                        return Err(self.error(self.pos, PatternErrorKind::UnrecognizedToken(ch)))
                    }
                },
            }
        }
        Err(self.error(
            self.chars.len(),
            PatternErrorKind::UnterminatedBracketExpression,
        ))
    }

    /// Record an element spelled by the next `len` characters.
    fn element(&mut self, mask: ElementMask, len: usize) {
        let symbol: String = self.chars[self.pos..self.pos + len].iter().collect();
        self.spec.add_element(mask, self.not_flag, &symbol);
        self.atom_seen = true;
        self.pos += len;
    }

    /// Count for a `@`, `+` or `-` token: an explicit digit, or the length
    /// of the run of `ch`. A run that reaches the end of input is an error.
    fn repeat_count(&mut self, ch: char) -> Result<u32, PatternError> {
        if let Some(digit) = self.digit_after() {
            self.pos += 2;
            return Ok(digit as u32);
        }
        let mut count = 0;
        while self.peek(0) == Some(ch) {
            count += 1;
            self.pos += 1;
        }
        if self.pos >= self.chars.len() {
            return Err(self.error(
                self.chars.len(),
                PatternErrorKind::UnterminatedRepeatToken(ch),
            ));
        }
        Ok(count)
    }

    fn charge(&mut self, ch: char) -> Result<(), PatternError> {
        let count = self.repeat_count(ch)?;
        let Ok(count) = u8::try_from(count) else {
            return Ok(());
        };
        if count > ChargeMask::MAX_MAGNITUDE {
            return Ok(());
        }
        let bucket = if ch == '+' {
            ChargeMask::cation(count)
        } else {
            ChargeMask::anion(count)
        };
        if let Some(bucket) = bucket {
            self.spec.add_charge(bucket, self.not_flag);
        }
        Ok(())
    }

    fn ring(&mut self) {
        match self.digit_after() {
            Some(size) => {
                self.spec.add_cycle(RingMask::from_ring_size(size), self.not_flag);
                self.pos += 2;
            }
            None => {
                self.spec.add_cycle(RingMask::SMALL_RINGS, self.not_flag);
                self.pos += 1;
            }
        }
    }

    /// Digit following the current letter as a small count, or an error at
    /// the offending character.
    fn count_digit(&self) -> Result<CountMask, PatternError> {
        let at = self.pos + 1;
        match self.peek(1) {
            Some(c) => c
                .to_digit(10)
                .and_then(|d| CountMask::from_count(d as u8))
                .ok_or_else(|| self.error(at, PatternErrorKind::UnrecognizedToken(c))),
            None => Err(self.error(
                self.chars.len(),
                PatternErrorKind::UnterminatedBracketExpression,
            )),
        }
    }

    fn valence(&mut self) -> Result<(), PatternError> {
        let valence = self.count_digit()?;
        self.spec.add_valence(valence, self.not_flag);
        self.pos += 2;
        Ok(())
    }

    /// `Dy`, `D<digit>` degree, or the literal symbol `D`.
    fn degree(&mut self) -> Result<(), PatternError> {
        match self.peek(1) {
            Some('y') => self.element(ElementMask::SYM, 2),
            Some(c) if c.is_ascii_digit() => {
                let degree = self.count_digit()?;
                self.spec.add_degree(degree, self.not_flag);
                self.pos += 2;
            }
            _ => self.element(ElementMask::SYM, 1),
        }
        Ok(())
    }

    /// `He`/`Hf`/`Hg`/`Ho`, a hydrogen atom, or a hydrogen count on the
    /// atom already named in this clause.
    fn hydrogen(&mut self) {
        if matches!(self.peek(1), Some('e' | 'f' | 'g' | 'o')) {
            self.element(ElementMask::SYM, 2);
        } else if !self.atom_seen {
            self.element(ElementMask::H, 1);
        } else {
            match self.digit_after() {
                Some(count) => {
                    self.spec.set_hydrogens(count);
                    self.pos += 2;
                }
                None => {
                    self.spec.set_hydrogens(1);
                    self.pos += 1;
                }
            }
        }
    }
}

/// Element named by `lead` and the character after it.
///
/// Returns the mask and how many characters the element spans. Two-letter
/// symbols always win over a one-letter element followed by something else.
/// `A`, `D` and `H` are only partly covered here; their other meanings are
/// resolved by the scanner.
fn element_token(lead: char, next: Option<char>) -> Option<(ElementMask, usize)> {
    use ElementMask as E;

    match lead {
        'A' => pick(next, &[], "cglmsu", None),
        'B' => pick(next, &[('r', E::BR)], "aei", Some(E::B)),
        'C' => pick(next, &[('a', E::CA), ('u', E::CU), ('l', E::CL)], "deors", Some(E::C)),
        'E' => pick(next, &[], "ru", Some(E::E)),
        'F' => pick(next, &[('e', E::FE)], "r", Some(E::F)),
        'G' => pick(next, &[], "ade", Some(E::G)),
        'I' => pick(next, &[], "nr", Some(E::I)),
        'J' => Some((E::J, 1)),
        'K' => Some((E::K, 1)),
        'L' => pick(next, &[], "aiu", Some(E::L)),
        'M' => pick(next, &[('g', E::MG)], "on", Some(E::M)),
        'N' => pick(next, &[('a', E::NA)], "bdi", Some(E::N)),
        'O' => pick(next, &[], "s", Some(E::O)),
        'P' => pick(next, &[], "bdort", Some(E::P)),
        'Q' => Some((E::Q, 1)),
        'R' => pick(next, &[], "behu", Some(E::R)),
        'S' => pick(next, &[('e', E::SE)], "bcimnr", Some(E::S)),
        'T' => pick(next, &[], "abeihlm", Some(E::T)),
        'U' | 'V' | 'W' => Some((E::SYM, 1)),
        'Y' => pick(next, &[], "b", Some(E::SYM)),
        'Z' => pick(next, &[('n', E::ZN)], "r", Some(E::Z)),
        _ => None,
    }
}

/// Second letters with their own bit, then second letters spelling a
/// literal symbol, then the one-letter fallback.
fn pick(
    next: Option<char>,
    dedicated: &[(char, ElementMask)],
    symbols: &str,
    fallback: Option<ElementMask>,
) -> Option<(ElementMask, usize)> {
    let Some(next) = next else {
        return fallback.map(|mask| (mask, 1));
    };
    if let Some(&(_, mask)) = dedicated.iter().find(|(c, _)| *c == next) {
        Some((mask, 2))
    } else if symbols.contains(next) {
        Some((ElementMask::SYM, 2))
    } else {
        fallback.map(|mask| (mask, 1))
    }
}
