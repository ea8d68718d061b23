//! Top-level scan: turns a whole pattern into a [`PatternGraph`].

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::AtomSpec;
use crate::bond::{Bond, BondSpec, Direction};
use crate::flags::{ClassMask, ElementMask, OrderMask, RingMask};
use crate::graph::PatternGraph;

use super::atom_block::scan_atom_block;
use super::error::{PatternError, PatternErrorKind};
use super::tag::scan_tag_list;
use super::Pattern;

/// Ring-closure mark slots: `0`..`9` and `%00`..`%99` share one table.
pub const MARK_SLOTS: usize = 100;

#[derive(Debug, Clone, Copy)]
struct Mark {
    atom: NodeIndex,
    priority: u32,
}

/// Kind of the previous token, for the `<` placement rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Atom,
    Bond,
    Other,
}

pub(crate) struct Compiler<'a> {
    chars: &'a [char],
    pos: usize,
    graph: PatternGraph,
    /// Bond waiting for the next atom or ring closure.
    bond: BondSpec,
    /// An explicit bond symbol is pending.
    bond_flag: bool,
    /// `!` applies to the next bond symbol.
    not_bond: bool,
    base: Option<NodeIndex>,
    marks: [Option<Mark>; MARK_SLOTS],
    branches: Vec<Option<NodeIndex>>,
    lex_pri: u32,
    last: Token,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(chars: &'a [char]) -> Self {
        Self {
            chars,
            pos: 0,
            graph: PatternGraph::new(),
            bond: BondSpec::default(),
            bond_flag: false,
            not_bond: false,
            base: None,
            marks: [None; MARK_SLOTS],
            branches: Vec::new(),
            lex_pri: 0,
            last: Token::Other,
        }
    }

    pub(crate) fn compile(mut self) -> Result<Pattern, PatternError> {
        while let Some(ch) = self.chars.get(self.pos).copied() {
            self.lex_pri += 1;
            self.last = self.token(ch)?;
        }
        self.finish()
    }

    fn error(&self, pos: usize, kind: PatternErrorKind) -> PatternError {
        PatternError::new(pos, kind)
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    /// Consume one token starting with `ch`.
    fn token(&mut self, ch: char) -> Result<Token, PatternError> {
        if let Some((atom, len)) = shorthand_atom(ch, self.peek(1)) {
            self.pos += len;
            self.commit_atom(atom);
            return Ok(Token::Atom);
        }

        match ch {
            '[' => {
                let (atom, end) = scan_atom_block(self.chars, self.pos + 1)?;
                self.pos = end;
                self.commit_atom(atom);
                return Ok(Token::Atom);
            }
            '0'..='9' => {
                let code = ch as u8 - b'0';
                self.ring_mark(code)?;
                self.pos += 1;
            }
            '%' => {
                let code = self.percent_mark()?;
                self.ring_mark(code)?;
                self.pos += 3;
            }
            '-' => self.bond_symbol(OrderMask::SINGLE, Direction::Unspecified),
            '/' => self.bond_symbol(OrderMask::SINGLE, Direction::Up),
            '\\' => self.bond_symbol(OrderMask::SINGLE, Direction::Down),
            '=' => self.bond_symbol(OrderMask::DOUBLE, Direction::Unspecified),
            '#' => self.bond_symbol(OrderMask::TRIPLE, Direction::Unspecified),
            '~' => {
                self.bond.add_class(ClassMask::ANY, self.not_bond);
                self.bond_symbol(OrderMask::ANY, Direction::Unspecified);
            }
            '@' => {
                self.bond.add_cycle(RingMask::CYCLIC, self.not_bond);
                self.bond_flag = true;
                self.pos += 1;
            }
            ':' => {
                self.bond.add_class(ClassMask::AROMATIC, self.not_bond);
                self.bond_flag = true;
                self.pos += 1;
            }
            '<' => {
                if !matches!(self.last, Token::Atom | Token::Bond) {
                    return Err(self.error(self.pos, PatternErrorKind::MisplacedTagList));
                }
                let mut tags = BondSpec::default();
                self.pos = scan_tag_list(self.chars, self.pos + 1, &mut tags)?;
                self.bond.merge(&tags);
            }
            '(' => {
                self.branches.push(self.base);
                self.pos += 1;
            }
            ')' => {
                let Some(base) = self.branches.pop() else {
                    return Err(self.error(self.pos, PatternErrorKind::BranchStackUnderflow));
                };
                self.base = base;
                self.pos += 1;
            }
            '.' => {
                self.base = None;
                self.clear_bond();
                self.pos += 1;
            }
            '!' => {
                self.not_bond = true;
                self.pos += 1;
            }
            ';' => {
                self.not_bond = false;
                self.pos += 1;
            }
            ',' => self.pos += 1,
            _ => return Err(self.error(self.pos, PatternErrorKind::UnrecognizedToken(ch))),
        }

        Ok(match ch {
            '-' | '/' | '\\' | '=' | '#' | '~' | '@' | ':' => Token::Bond,
            _ => Token::Other,
        })
    }

    fn bond_symbol(&mut self, order: OrderMask, direction: Direction) {
        self.bond.add_order(order, self.not_bond);
        if direction != Direction::Unspecified {
            self.bond.direction = direction;
        }
        self.bond_flag = true;
        self.pos += 1;
    }

    fn clear_bond(&mut self) {
        self.bond = BondSpec::default();
        self.bond_flag = false;
        self.not_bond = false;
    }

    /// Two digits after `%`.
    fn percent_mark(&self) -> Result<u8, PatternError> {
        let mut code = 0;
        for offset in 1..=2 {
            let Some(c) = self.peek(offset) else {
                return Err(self.error(self.pos, PatternErrorKind::UnrecognizedToken('%')));
            };
            let Some(digit) = c.to_digit(10) else {
                let at = self.pos + offset;
                return Err(self.error(at, PatternErrorKind::UnrecognizedToken(c)));
            };
            code = code * 10 + digit as u8;
        }
        Ok(code)
    }

    fn commit_atom(&mut self, atom: AtomSpec) {
        let idx = self.graph.add_atom(atom);
        tracing::trace!(atom = idx.index(), priority = self.lex_pri, "atom");
        if let Some(base) = self.base {
            let aromatic =
                self.graph.atom(base).is_aromatic() && self.graph.atom(idx).is_aromatic();
            self.commit_bond(base, idx, [self.lex_pri; 2], aromatic);
        }
        self.clear_bond();
        self.base = Some(idx);
    }

    /// Add the pending bond between `a` and `b`. With no bond symbol written
    /// it defaults to single, plus the aromatic class when `aromatic` is set.
    /// Only chain bonds between two aromatic atoms pass `aromatic`; ring
    /// closures are plain single bonds.
    fn commit_bond(
        &mut self,
        a: NodeIndex,
        b: NodeIndex,
        priority: [u32; 2],
        aromatic: bool,
    ) -> EdgeIndex {
        let mut spec = self.bond;
        if !self.bond_flag {
            spec.add_order(OrderMask::SINGLE, false);
            if aromatic {
                spec.add_class(ClassMask::AROMATIC, false);
            }
        }
        let idx = self.graph.add_bond(a, b, Bond { spec, priority });
        tracing::trace!(
            bond = idx.index(),
            from = a.index(),
            to = b.index(),
            ?priority,
            "bond"
        );
        self.clear_bond();
        idx
    }

    fn ring_mark(&mut self, code: u8) -> Result<(), PatternError> {
        let Some(base) = self.base else {
            return Err(self.error(self.pos, PatternErrorKind::MarkWithoutAtom(code)));
        };
        let slot = code as usize;
        match self.marks[slot].take() {
            Some(mark) => {
                self.commit_bond(base, mark.atom, [self.lex_pri, mark.priority], false);
            }
            None => {
                self.marks[slot] = Some(Mark {
                    atom: base,
                    priority: self.lex_pri,
                });
                self.clear_bond();
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<Pattern, PatternError> {
        let end = self.chars.len();
        if let Some(code) = self.marks.iter().position(Option::is_some) {
            return Err(self.error(end, PatternErrorKind::UnclosedRingMark(code as u8)));
        }
        if !self.branches.is_empty() {
            return Err(self.error(end, PatternErrorKind::DanglingBranch));
        }
        if self.graph.atom_count() == 0 {
            return Err(self.error(end, PatternErrorKind::EmptyPattern));
        }
        Ok(Pattern {
            root: NodeIndex::new(0),
            graph: self.graph,
        })
    }
}

/// Unbracketed atom starting with `ch`, and how many characters it spans.
fn shorthand_atom(ch: char, next: Option<char>) -> Option<(AtomSpec, usize)> {
    use ElementMask as E;

    let atom = match (ch, next) {
        ('C', Some('l' | 'L')) => return Some((AtomSpec::aliphatic(E::CL, false), 2)),
        ('B', Some('r' | 'R')) => return Some((AtomSpec::aliphatic(E::BR, true), 2)),
        ('C', _) => AtomSpec::aliphatic(E::C, true),
        ('B', _) => AtomSpec::aliphatic(E::B, true),
        ('N', _) => AtomSpec::aliphatic(E::N, true),
        ('O', _) => AtomSpec::aliphatic(E::O, true),
        ('S', _) => AtomSpec::aliphatic(E::S, true),
        ('P', _) => AtomSpec::aliphatic(E::P, true),
        ('F', _) => AtomSpec::aliphatic(E::F, true),
        ('I', _) => AtomSpec::aliphatic(E::I, true),
        ('H', _) => AtomSpec::aliphatic(E::H, false),
        ('*', _) => AtomSpec::aliphatic(E::ANY, false),
        ('?', _) => AtomSpec::aliphatic(E::NOT_H, false),
        ('c', _) => AtomSpec::aromatic(E::C, true),
        ('n', _) => AtomSpec::aromatic(E::N, true),
        ('o', _) => AtomSpec::aromatic(E::O, true),
        ('s', _) => AtomSpec::aromatic(E::S, true),
        _ => return None,
    };
    Some((atom, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn compile(text: &str) -> Result<Pattern, PatternError> {
        let chars: Vec<char> = text.chars().collect();
        Compiler::new(&chars).compile()
    }

    fn endpoints(pattern: &Pattern) -> Vec<(usize, usize)> {
        let graph = pattern.graph();
        graph
            .bonds()
            .filter_map(|b| graph.bond_endpoints(b))
            .map(|(a, b)| (a.index(), b.index()))
            .collect()
    }

    fn bond_spec(pattern: &Pattern, idx: usize) -> BondSpec {
        pattern.graph().bond(EdgeIndex::new(idx)).spec
    }

    fn kind(text: &str) -> PatternErrorKind {
        compile(text).unwrap_err().kind
    }

    #[test]
    fn chain() {
        let pattern = compile("CCO").unwrap();
        assert_eq!(pattern.graph().atom_count(), 3);
        assert_eq!(endpoints(&pattern), vec![(0, 1), (1, 2)]);
        assert_eq!(pattern.root(), NodeIndex::new(0));
        assert_eq!(bond_spec(&pattern, 0).order, OrderMask::SINGLE);
    }

    #[test]
    fn ring_closure() {
        let pattern = compile("C1CCCCC1").unwrap();
        assert_eq!(pattern.graph().atom_count(), 6);
        assert_eq!(pattern.graph().bond_count(), 6);
        assert_eq!(endpoints(&pattern)[5], (5, 0));
        assert_eq!(bond_spec(&pattern, 5).order, OrderMask::SINGLE);
    }

    #[test]
    fn ring_closure_priorities() {
        let pattern = compile("C1CC1").unwrap();
        let closure = pattern.graph().bond(EdgeIndex::new(2));
        // C=1, mark=2, C=3, C=4, mark=5
        assert_eq!(closure.priority, [5, 2]);
        let chain = pattern.graph().bond(EdgeIndex::new(0));
        assert_eq!(chain.priority, [3, 3]);
    }

    #[test]
    fn ring_closure_with_bond_symbol() {
        let pattern = compile("C1CCC=1").unwrap();
        assert_eq!(endpoints(&pattern)[3], (3, 0));
        assert_eq!(bond_spec(&pattern, 3).order, OrderMask::DOUBLE);
    }

    #[test]
    fn percent_marks_share_slots_with_digits() {
        let pattern = compile("C%12CC%12").unwrap();
        assert_eq!(endpoints(&pattern), vec![(0, 1), (1, 2), (2, 0)]);

        let pattern = compile("C1CC%01").unwrap();
        assert_eq!(endpoints(&pattern)[2], (2, 0));
    }

    #[test]
    fn closed_mark_can_be_reopened() {
        let pattern = compile("C1CC1CC1CC1").unwrap();
        assert_eq!(pattern.graph().atom_count(), 7);
        assert_eq!(pattern.graph().bond_count(), 8);
        assert_eq!(
            endpoints(&pattern),
            vec![(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 5), (5, 6), (6, 4)]
        );
    }

    #[test]
    fn malformed_percent() {
        assert_eq!(
            compile("C%1").unwrap_err(),
            PatternError::new(1, PatternErrorKind::UnrecognizedToken('%'))
        );
        assert_eq!(
            compile("C%1xC").unwrap_err(),
            PatternError::new(3, PatternErrorKind::UnrecognizedToken('x'))
        );
    }

    #[test]
    fn branch() {
        let pattern = compile("C(C)C").unwrap();
        assert_eq!(pattern.graph().atom_count(), 3);
        assert_eq!(endpoints(&pattern), vec![(0, 1), (0, 2)]);
        let graph = pattern.graph();
        assert_eq!(graph.bond_between(NodeIndex::new(1), NodeIndex::new(2)), None);
    }

    #[test]
    fn nested_branches() {
        let pattern = compile("CC(C(N)O)S").unwrap();
        assert_eq!(
            endpoints(&pattern),
            vec![(0, 1), (1, 2), (2, 3), (2, 4), (1, 5)]
        );
    }

    #[test]
    fn branch_errors() {
        assert_eq!(
            compile("C)").unwrap_err(),
            PatternError::new(1, PatternErrorKind::BranchStackUnderflow)
        );
        assert_eq!(
            compile("C(C").unwrap_err(),
            PatternError::new(3, PatternErrorKind::DanglingBranch)
        );
    }

    #[test]
    fn unclosed_mark() {
        assert_eq!(
            compile("C1CC").unwrap_err(),
            PatternError::new(4, PatternErrorKind::UnclosedRingMark(1))
        );
        assert_eq!(kind("C%42CC"), PatternErrorKind::UnclosedRingMark(42));
    }

    #[test]
    fn mark_without_atom() {
        assert_eq!(
            compile("1CC1").unwrap_err(),
            PatternError::new(0, PatternErrorKind::MarkWithoutAtom(1))
        );
        assert_eq!(kind("C.1C1"), PatternErrorKind::MarkWithoutAtom(1));
    }

    #[test]
    fn separator_starts_a_new_fragment() {
        let pattern = compile("CC.O").unwrap();
        assert_eq!(pattern.graph().atom_count(), 3);
        assert_eq!(endpoints(&pattern), vec![(0, 1)]);
    }

    #[test]
    fn marks_survive_separator() {
        let pattern = compile("C1.C1").unwrap();
        assert_eq!(endpoints(&pattern), vec![(1, 0)]);
    }

    #[test]
    fn empty_patterns() {
        assert_eq!(
            compile("").unwrap_err(),
            PatternError::new(0, PatternErrorKind::EmptyPattern)
        );
        assert_eq!(kind("..;"), PatternErrorKind::EmptyPattern);
        assert_eq!(kind("()"), PatternErrorKind::EmptyPattern);
    }

    #[test]
    fn bond_symbols() {
        let order = |text: &str| bond_spec(&compile(text).unwrap(), 0);
        assert_eq!(order("C-C").order, OrderMask::SINGLE);
        assert_eq!(order("C=C").order, OrderMask::DOUBLE);
        assert_eq!(order("C#N").order, OrderMask::TRIPLE);

        let any = order("C~C");
        assert_eq!(any.order, OrderMask::ANY);
        assert_eq!(any.class, ClassMask::ANY);

        let up = order("C/C");
        assert_eq!(up.order, OrderMask::SINGLE);
        assert_eq!(up.direction, Direction::Up);
        let down = order("C\\C");
        assert_eq!(down.direction, Direction::Down);

        let ring = order("C@C");
        assert_eq!(ring.cycle, RingMask::CYCLIC);
        assert!(ring.order.is_empty());

        let aromatic = order("C:C");
        assert_eq!(aromatic.class, ClassMask::AROMATIC);
    }

    #[test]
    fn negated_bonds() {
        let spec = bond_spec(&compile("C!=C").unwrap(), 0);
        assert_eq!(spec.not_order, OrderMask::DOUBLE);
        assert!(spec.order.is_empty());

        let spec = bond_spec(&compile("C!@;-C").unwrap(), 0);
        assert_eq!(spec.not_cycle, RingMask::CYCLIC);
        assert_eq!(spec.order, OrderMask::SINGLE);
    }

    #[test]
    fn negation_does_not_leak_past_a_bond() {
        let pattern = compile("C!=CC").unwrap();
        assert_eq!(bond_spec(&pattern, 1).order, OrderMask::SINGLE);
        assert!(bond_spec(&pattern, 1).not_order.is_empty());
    }

    #[test]
    fn implicit_aromatic_bonds() {
        let pattern = compile("c1ccccc1").unwrap();
        assert_eq!(pattern.graph().bond_count(), 6);
        for idx in 0..5 {
            let spec = bond_spec(&pattern, idx);
            assert_eq!(spec.order, OrderMask::SINGLE);
            assert_eq!(spec.class, ClassMask::AROMATIC);
        }

        // ring closures only get the single default
        let closure = bond_spec(&pattern, 5);
        assert_eq!(closure.order, OrderMask::SINGLE);
        assert!(closure.class.is_empty());

        let spec = bond_spec(&compile("c1cc:1").unwrap(), 2);
        assert_eq!(spec.class, ClassMask::AROMATIC);
        assert!(spec.order.is_empty());

        let spec = bond_spec(&compile("cC").unwrap(), 0);
        assert!(spec.class.is_empty());

        // an explicit symbol suppresses the default
        let spec = bond_spec(&compile("c=c").unwrap(), 0);
        assert_eq!(spec.order, OrderMask::DOUBLE);
        assert!(spec.class.is_empty());
    }

    #[test]
    fn shorthand_atoms() {
        let pattern = compile("ClBrCBNOSPFIH*?cnos").unwrap();
        let graph = pattern.graph();
        let masks: Vec<_> = graph.atoms().map(|a| graph.atom(a).atom).collect();
        use ElementMask as E;
        assert_eq!(
            masks,
            vec![
                E::CL,
                E::BR,
                E::C,
                E::B,
                E::N,
                E::O,
                E::S,
                E::P,
                E::F,
                E::I,
                E::H,
                E::ANY,
                E::NOT_H,
                E::C,
                E::N,
                E::O,
                E::S,
            ]
        );
        assert!(!graph.atom(NodeIndex::new(0)).implicit_hydrogens);
        assert!(graph.atom(NodeIndex::new(2)).implicit_hydrogens);
        assert!(!graph.atom(NodeIndex::new(10)).implicit_hydrogens);
        assert!(graph.atom(NodeIndex::new(13)).is_aromatic());
        assert!(!graph.atom(NodeIndex::new(2)).is_aromatic());
    }

    #[test]
    fn uppercase_halogen_spellings() {
        let pattern = compile("CLBR").unwrap();
        let graph = pattern.graph();
        assert_eq!(graph.atom_count(), 2);
        assert_eq!(graph.atom(NodeIndex::new(0)).atom, ElementMask::CL);
        assert_eq!(graph.atom(NodeIndex::new(1)).atom, ElementMask::BR);
    }

    #[test]
    fn bracket_atoms() {
        let pattern = compile("[NH3+]C[O-]").unwrap();
        let graph = pattern.graph();
        assert_eq!(graph.atom_count(), 3);
        assert_eq!(graph.atom(NodeIndex::new(0)).tot_hydro, 3);
        assert_eq!(endpoints(&pattern), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn bracket_errors_have_absolute_offsets() {
        assert_eq!(
            compile("CC[Nq]").unwrap_err(),
            PatternError::new(4, PatternErrorKind::UnrecognizedToken('q'))
        );
        assert_eq!(
            compile("CC[N").unwrap_err(),
            PatternError::new(4, PatternErrorKind::UnterminatedBracketExpression)
        );
    }

    #[test]
    fn tag_lists() {
        let spec = bond_spec(&compile("C<1,2>C").unwrap(), 0);
        assert_eq!(spec.tag, (1 << 1) | (1 << 2));
        assert_eq!(spec.order, OrderMask::SINGLE);

        let spec = bond_spec(&compile("C-<!1>C").unwrap(), 0);
        assert_eq!(spec.not_tag, 1 << 1);
        assert_eq!(spec.order, OrderMask::SINGLE);

        // tags fold into whatever the bond symbols already set
        let spec = bond_spec(&compile("C!=;/<4;!5>C").unwrap(), 0);
        assert_eq!(spec.not_order, OrderMask::DOUBLE);
        assert_eq!(spec.order, OrderMask::SINGLE);
        assert_eq!(spec.direction, Direction::Up);
        assert_eq!(spec.tag, 1 << 4);
        assert_eq!(spec.not_tag, 1 << 5);
    }

    #[test]
    fn misplaced_tag_lists() {
        assert_eq!(
            compile("<1>C").unwrap_err(),
            PatternError::new(0, PatternErrorKind::MisplacedTagList)
        );
        assert_eq!(kind("C(<1>C)"), PatternErrorKind::MisplacedTagList);
        assert_eq!(kind("C<1><2>C"), PatternErrorKind::MisplacedTagList);
        assert_eq!(
            compile("C<1,2").unwrap_err(),
            PatternError::new(5, PatternErrorKind::UnterminatedTagList)
        );
    }

    #[test]
    fn unrecognized() {
        assert_eq!(
            compile("C C").unwrap_err(),
            PatternError::new(1, PatternErrorKind::UnrecognizedToken(' '))
        );
        assert_eq!(kind("Cx"), PatternErrorKind::UnrecognizedToken('x'));
        assert_eq!(kind("Ca"), PatternErrorKind::UnrecognizedToken('a'));
    }

    #[test]
    fn first_error_wins() {
        assert_eq!(
            compile("C)1").unwrap_err(),
            PatternError::new(1, PatternErrorKind::BranchStackUnderflow)
        );
    }
}
