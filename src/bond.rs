use crate::flags::{admits, excludes_none, ClassMask, OrderMask, RingMask};

/// Cis/trans direction of a single bond written with `/` or `\`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    #[default]
    Unspecified,
    /// `/`
    Up,
    /// `\`
    Down,
}

/// Bond matcher: positive and negative masks per property, plus the
/// numeric labels written in `<...>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BondSpec {
    pub order: OrderMask,
    pub not_order: OrderMask,
    pub class: ClassMask,
    pub not_class: ClassMask,
    pub cycle: RingMask,
    pub not_cycle: RingMask,
    pub direction: Direction,
    /// Bit `n` set for each label `n` in `<n,...>`.
    pub tag: u128,
    pub not_tag: u128,
}

impl BondSpec {
    /// Fold another spec's constraints into this one.
    pub fn merge(&mut self, other: &BondSpec) {
        self.order |= other.order;
        self.not_order |= other.not_order;
        self.class |= other.class;
        self.not_class |= other.not_class;
        self.cycle |= other.cycle;
        self.not_cycle |= other.not_cycle;
        self.tag |= other.tag;
        self.not_tag |= other.not_tag;
        if other.direction != Direction::Unspecified {
            self.direction = other.direction;
        }
    }

    pub(crate) fn add_order(&mut self, order: OrderMask, negated: bool) {
        if negated {
            self.not_order |= order;
        } else {
            self.order |= order;
        }
    }

    pub(crate) fn add_class(&mut self, class: ClassMask, negated: bool) {
        if negated {
            self.not_class |= class;
        } else {
            self.class |= class;
        }
    }

    pub(crate) fn add_cycle(&mut self, cycle: RingMask, negated: bool) {
        if negated {
            self.not_cycle |= cycle;
        } else {
            self.cycle |= cycle;
        }
    }

    pub(crate) fn add_tag(&mut self, label: u8, negated: bool) {
        let bit = 1u128 << label;
        if negated {
            self.not_tag |= bit;
        } else {
            self.tag |= bit;
        }
    }

    pub fn is_aromatic(&self) -> bool {
        self.class.contains(ClassMask::AROMATIC)
    }

    /// Does `candidate` satisfy this spec? Same rules as
    /// [`AtomSpec::matches`](crate::AtomSpec::matches).
    pub fn matches(&self, candidate: &BondProps) -> bool {
        admits(self.order, candidate.order)
            && admits(self.class, candidate.class)
            && admits(self.cycle, candidate.cycle)
            && excludes_none(self.not_order, candidate.order)
            && excludes_none(self.not_class, candidate.class)
            && excludes_none(self.not_cycle, candidate.cycle)
            && (self.tag == 0 || self.tag & candidate.tag != 0)
            && (self.not_tag == 0 || self.not_tag & candidate.tag == 0)
    }
}

/// Edge of a [`PatternGraph`](crate::PatternGraph).
///
/// `priority[i]` is the lexical priority at which the side of the bond
/// touching endpoint `i` was fixed. For a chain bond both are the priority of
/// the token that committed the second atom; for a ring closure the second is
/// the priority at which the mark was opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bond {
    pub spec: BondSpec,
    pub priority: [u32; 2],
}

/// Concrete description of a candidate bond.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BondProps {
    pub order: OrderMask,
    pub class: ClassMask,
    pub cycle: RingMask,
    pub tag: u128,
}

impl BondProps {
    pub fn single() -> Self {
        Self {
            order: OrderMask::SINGLE,
            class: ClassMask::ALIPHATIC,
            cycle: RingMask::ACYCLIC,
            tag: 0,
        }
    }

    pub fn double() -> Self {
        Self {
            order: OrderMask::DOUBLE,
            ..Self::single()
        }
    }

    pub fn triple() -> Self {
        Self {
            order: OrderMask::TRIPLE,
            ..Self::single()
        }
    }

    /// Ring bond in an aromatic system, single by convention.
    pub fn aromatic(ring_size: u8) -> Self {
        Self {
            order: OrderMask::SINGLE,
            class: ClassMask::AROMATIC,
            cycle: RingMask::from_ring_size(ring_size),
            tag: 0,
        }
    }

    pub fn in_ring(mut self, size: u8) -> Self {
        self.cycle = RingMask::from_ring_size(size);
        self
    }

    pub fn with_tag(mut self, label: u8) -> Self {
        self.tag |= 1u128 << label;
        self
    }
}
