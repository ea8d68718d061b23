use crate::flags::{
    admits, excludes_none, ChargeMask, ClassMask, CountMask, ElementMask, RingMask,
};

/// Longest atom or residue name a spec stores.
pub const NAME_WIDTH: usize = 4;

/// Longest literal element symbol a spec stores.
pub const SYMBOL_WIDTH: usize = 2;

/// Tetrahedral handedness requested by a bracket expression.
///
/// Derived from the parity of the `@` run: an odd count is anticlockwise,
/// an even count clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Chirality {
    /// No chirality constraint.
    #[default]
    Unspecified,
    /// `@`, `@@@`, ...
    Anticlockwise,
    /// `@@`, `@@@@`, ...
    Clockwise,
}

impl Chirality {
    pub fn from_count(count: u32) -> Self {
        if count % 2 == 1 {
            Chirality::Anticlockwise
        } else {
            Chirality::Clockwise
        }
    }
}

/// Atom matcher built from one pattern atom.
///
/// Each property has a positive mask (the candidate must hit at least one
/// bit) and a negative mask (the candidate must hit none). An empty mask
/// leaves the property unconstrained. `pos_flag` and `neg_flag` record
/// whether any positive or negative constraint was written at all, so a
/// matcher can skip a whole side cheaply.
///
/// `AtomSpec` is a *query*, not an atom: see [`AtomProps`] for the concrete
/// description of a candidate and [`AtomSpec::matches`] for the predicate.
///
/// # Examples
///
/// ```
/// use crabpattern::{parse_atom_block, ElementMask, CountMask};
///
/// let (spec, consumed) = parse_atom_block("C;D3]").unwrap();
/// assert_eq!(consumed, 5);
/// assert_eq!(spec.atom, ElementMask::C);
/// assert_eq!(spec.degree, CountMask::N3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AtomSpec {
    /// Some positive mask or literal field is set.
    pub pos_flag: bool,
    /// Some negative mask is set.
    pub neg_flag: bool,
    /// The consumer should compute implicit hydrogens for matched atoms.
    /// Recorded only; this crate never computes them.
    pub implicit_hydrogens: bool,
    /// Hydrogen-count matching is requested; `tot_hydro` is a lower bound.
    pub hydro_flag: bool,

    pub chirality: Chirality,

    pub atom: ElementMask,
    pub not_atom: ElementMask,
    pub class: ClassMask,
    pub not_class: ClassMask,
    pub degree: CountMask,
    pub not_degree: CountMask,
    pub cycle: RingMask,
    pub not_cycle: RingMask,
    pub valence: CountMask,
    pub not_valence: CountMask,
    pub charge: ChargeMask,
    pub not_charge: ChargeMask,

    pub imp_hydro: u8,
    pub tot_hydro: u8,

    /// Literal element symbol, for elements matched through [`ElementMask::SYM`].
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub residue: Option<String>,
}

impl AtomSpec {
    /// Unbracketed shorthand atom: element mask only.
    pub fn aliphatic(mask: ElementMask, implicit_hydrogens: bool) -> Self {
        Self {
            atom: mask,
            pos_flag: true,
            implicit_hydrogens,
            ..Self::default()
        }
    }

    /// Unbracketed lowercase atom: element mask plus the aromatic class.
    pub fn aromatic(mask: ElementMask, implicit_hydrogens: bool) -> Self {
        Self {
            class: ClassMask::AROMATIC,
            ..Self::aliphatic(mask, implicit_hydrogens)
        }
    }

    /// Atom identified only by its literal element symbol.
    pub fn literal(symbol: &str) -> Self {
        Self {
            atom: ElementMask::ANY,
            symbol: Some(symbol.chars().take(SYMBOL_WIDTH).collect()),
            pos_flag: true,
            ..Self::default()
        }
    }

    /// Require a literal atom name (truncated to [`NAME_WIDTH`]).
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.chars().take(NAME_WIDTH).collect());
        self.pos_flag = true;
        self
    }

    /// Require a literal residue name (truncated to [`NAME_WIDTH`]).
    pub fn with_residue(mut self, residue: &str) -> Self {
        self.residue = Some(residue.chars().take(NAME_WIDTH).collect());
        self.pos_flag = true;
        self
    }

    pub fn is_aromatic(&self) -> bool {
        self.class.contains(ClassMask::AROMATIC)
    }

    /// Add an element to the positive or negative set.
    ///
    /// The literal symbol is only kept for positive [`ElementMask::SYM`]
    /// matches; a negated symbol excludes every symbol-matched element.
    pub(crate) fn add_element(&mut self, mask: ElementMask, negated: bool, symbol: &str) {
        if negated {
            self.not_atom |= mask;
            self.neg_flag = true;
        } else {
            self.atom |= mask;
            self.pos_flag = true;
            if mask == ElementMask::SYM {
                self.symbol = Some(symbol.to_string());
            }
        }
    }

    pub(crate) fn add_class(&mut self, class: ClassMask, negated: bool) {
        if negated {
            self.not_class |= class;
            self.neg_flag = true;
        } else {
            self.class |= class;
            self.pos_flag = true;
        }
    }

    pub(crate) fn add_degree(&mut self, degree: CountMask, negated: bool) {
        if negated {
            self.not_degree |= degree;
            self.neg_flag = true;
        } else {
            self.degree |= degree;
            self.pos_flag = true;
        }
    }

    pub(crate) fn add_valence(&mut self, valence: CountMask, negated: bool) {
        if negated {
            self.not_valence |= valence;
            self.neg_flag = true;
        } else {
            self.valence |= valence;
            self.pos_flag = true;
        }
    }

    pub(crate) fn add_cycle(&mut self, cycle: RingMask, negated: bool) {
        if negated {
            self.not_cycle |= cycle;
            self.neg_flag = true;
        } else {
            self.cycle |= cycle;
            self.pos_flag = true;
        }
    }

    pub(crate) fn add_charge(&mut self, charge: ChargeMask, negated: bool) {
        if negated {
            self.not_charge |= charge;
            self.neg_flag = true;
        } else {
            self.charge |= charge;
            self.pos_flag = true;
        }
    }

    pub(crate) fn set_hydrogens(&mut self, count: u8) {
        self.imp_hydro = count;
        self.tot_hydro = count;
        self.hydro_flag = true;
    }

    /// Does `candidate` satisfy this spec?
    ///
    /// Positive masks need an intersection, negative masks need none, empty
    /// masks are ignored, literal strings must be equal when present, and a
    /// requested hydrogen count is a lower bound on the candidate's total.
    pub fn matches(&self, candidate: &AtomProps) -> bool {
        let positive = !self.pos_flag
            || (admits(self.atom, candidate.atom)
                && admits(self.charge, candidate.charge)
                && admits(self.cycle, candidate.cycle)
                && admits(self.class, candidate.class)
                && admits(self.degree, candidate.degree)
                && admits(self.valence, candidate.valence));
        if !positive {
            return false;
        }

        let negative = !self.neg_flag
            || (excludes_none(self.not_atom, candidate.atom)
                && excludes_none(self.not_charge, candidate.charge)
                && excludes_none(self.not_cycle, candidate.cycle)
                && excludes_none(self.not_class, candidate.class)
                && excludes_none(self.not_degree, candidate.degree)
                && excludes_none(self.not_valence, candidate.valence));
        if !negative {
            return false;
        }

        literal_matches(&self.name, &candidate.name)
            && literal_matches(&self.residue, &candidate.residue)
            && literal_matches(&self.symbol, &candidate.symbol)
            && (!self.hydro_flag || candidate.tot_hydro >= self.tot_hydro)
    }
}

fn literal_matches(want: &Option<String>, have: &Option<String>) -> bool {
    match want.as_deref() {
        None | Some("") => true,
        Some(w) => have.as_deref() == Some(w),
    }
}

/// Concrete description of a candidate atom, as a matching engine sees it.
///
/// Every mask normally has exactly one bit set: the element, the degree,
/// the charge bucket and so on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AtomProps {
    pub atom: ElementMask,
    pub class: ClassMask,
    pub degree: CountMask,
    pub cycle: RingMask,
    pub valence: CountMask,
    pub charge: ChargeMask,
    pub tot_hydro: u8,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub residue: Option<String>,
}

impl AtomProps {
    /// Neutral, acyclic, unbonded atom of the given element.
    pub fn element(symbol: &str) -> Self {
        Self {
            atom: ElementMask::from_symbol(symbol),
            symbol: Some(symbol.to_string()),
            class: ClassMask::ALIPHATIC,
            degree: CountMask::N0,
            valence: CountMask::N0,
            cycle: RingMask::ACYCLIC,
            charge: ChargeMask::NEUTRAL,
            ..Self::default()
        }
    }

    pub fn with_degree(mut self, degree: u8) -> Self {
        self.degree = CountMask::from_count(degree).unwrap_or_default();
        self
    }

    pub fn with_valence(mut self, valence: u8) -> Self {
        self.valence = CountMask::from_count(valence).unwrap_or_default();
        self
    }

    pub fn with_charge(mut self, charge: i8) -> Self {
        self.charge = ChargeMask::from_formal_charge(charge);
        self
    }

    /// Place the atom in a ring of `size`.
    pub fn in_ring(mut self, size: u8) -> Self {
        self.cycle = RingMask::from_ring_size(size);
        self
    }

    pub fn aromatic(mut self) -> Self {
        self.class = ClassMask::AROMATIC;
        self
    }

    pub fn with_hydrogens(mut self, count: u8) -> Self {
        self.tot_hydro = count;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_residue(mut self, residue: &str) -> Self {
        self.residue = Some(residue.to_string());
        self
    }
}
