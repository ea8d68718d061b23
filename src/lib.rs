pub mod atom;
pub mod bond;
pub mod flags;
pub mod graph;
pub mod pattern;

pub use atom::{AtomProps, AtomSpec, Chirality, NAME_WIDTH, SYMBOL_WIDTH};
pub use bond::{Bond, BondProps, BondSpec, Direction};
pub use flags::{ChargeMask, ClassMask, CountMask, ElementMask, OrderMask, RingMask};
pub use graph::PatternGraph;
pub use pattern::{
    compile, parse_atom_block, parse_tag_list, Pattern, PatternError, PatternErrorKind,
    MARK_SLOTS,
};
