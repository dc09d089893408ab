//! Base constituents for compound definitions.
//!
//! A compound definition is a linear combination of these thirteen constituents,
//! in this order. Each base is itself an ordinary SP 98 definition.
//!
//! Greek letters are spelled out in the base names: `NU2` is ν2 and `LAM2` is λ2.
//! [`base_index`] accepts either spelling.
use crate::astro::node_factor::NodeFactorFormula;
use crate::astro::{NUM_U_TERMS, NUM_V_TERMS};

/// Number of base constituents a compound definition can combine
pub const NUM_COMPOUND_BASES: usize = 13;

pub(crate) struct CompoundBase {
    pub name: &'static str,
    pub v: [f64; NUM_V_TERMS],
    pub u: [f64; NUM_U_TERMS],
    pub formula: NodeFactorFormula,
}

const fn base(
    name: &'static str,
    v: [f64; NUM_V_TERMS],
    u: [f64; NUM_U_TERMS],
    formula: NodeFactorFormula,
) -> CompoundBase {
    CompoundBase { name, v, u, formula }
}

const NO_U: [f64; NUM_U_TERMS] = [0.; NUM_U_TERMS];

pub(crate) const COMPOUND_BASES: [CompoundBase; NUM_COMPOUND_BASES] = [
    base("O1", [1., -2., 1., 0., 0., 90.], [2., -1., 0., 0., 0., 0., 0.], NodeFactorFormula::F75),
    base("K1", [1., 0., 1., 0., 0., -90.], [0., 0., -1., 0., 0., 0., 0.], NodeFactorFormula::F227),
    base("P1", [1., 0., -1., 0., 0., 90.], NO_U, NodeFactorFormula::Unity),
    base("M2", [2., -2., 2., 0., 0., 0.], [2., -2., 0., 0., 0., 0., 0.], NodeFactorFormula::F78),
    base("S2", [2., 0., 0., 0., 0., 0.], NO_U, NodeFactorFormula::Unity),
    base("N2", [2., -3., 2., 1., 0., 0.], [2., -2., 0., 0., 0., 0., 0.], NodeFactorFormula::F78),
    base(
        "L2",
        [2., -1., 2., -1., 0., 180.],
        [2., -2., 0., 0., 0., -1., 0.],
        NodeFactorFormula::F215,
    ),
    base("K2", [2., 0., 2., 0., 0., 0.], [0., 0., 0., -1., 0., 0., 0.], NodeFactorFormula::F235),
    base("Q1", [1., -3., 1., 1., 0., 90.], [2., -1., 0., 0., 0., 0., 0.], NodeFactorFormula::F75),
    base("NU2", [2., -3., 4., -1., 0., 0.], [2., -2., 0., 0., 0., 0., 0.], NodeFactorFormula::F78),
    base("S1", [1., 0., 0., 0., 0., 0.], NO_U, NodeFactorFormula::Unity),
    base(
        "M1-DUTCH",
        [1., -1., 1., 1., 0., -90.],
        [0., -1., 0., 0., 0., 0., -1.],
        NodeFactorFormula::F206,
    ),
    base(
        "LAM2",
        [2., -1., 0., 1., 0., 180.],
        [2., -2., 0., 0., 0., 0., 0.],
        NodeFactorFormula::F78,
    ),
];

/// Position of the named base in a compound coefficient vector.
///
/// `ν2` and `λ2` are looked up as `NU2` and `LAM2`.
pub fn base_index(name: &str) -> Option<usize> {
    let name = match name {
        "ν2" => "NU2",
        "λ2" => "LAM2",
        other => other,
    };
    COMPOUND_BASES.iter().position(|b| b.name == name)
}
