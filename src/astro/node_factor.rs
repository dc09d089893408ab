//! Node factor formulas of SP 98.
//!
//! Each variant is named after the number of its equation in SP 98 and
//! evaluates the yearly node factor `f` from the [`NodeTerms`] at mid-year.
//! Identifier `1` stands for constituents without nodal modulation (solar ones).
use super::{cos_deg, sin_deg, NodeTerms};
use crate::tidegen_errors::TidegenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeFactorFormula {
    /// No modulation, `f = 1`
    Unity,
    /// Mm
    F73,
    /// Mf
    F74,
    /// O₁, Q₁ and relatives
    F75,
    /// J₁
    F76,
    /// OO₁
    F77,
    /// M₂, N₂ and relatives
    F78,
    /// KQ₁-like terms
    F79,
    /// M₁ from Table 2
    F144,
    /// M₃
    F149,
    /// M₁ (Dutch)
    F206,
    /// L₂
    F215,
    /// K₁
    F227,
    /// K₂
    F235,
}

impl NodeFactorFormula {
    /// Numeric identifier used in definition files.
    pub fn id(self) -> u32 {
        match self {
            NodeFactorFormula::Unity => 1,
            NodeFactorFormula::F73 => 73,
            NodeFactorFormula::F74 => 74,
            NodeFactorFormula::F75 => 75,
            NodeFactorFormula::F76 => 76,
            NodeFactorFormula::F77 => 77,
            NodeFactorFormula::F78 => 78,
            NodeFactorFormula::F79 => 79,
            NodeFactorFormula::F144 => 144,
            NodeFactorFormula::F149 => 149,
            NodeFactorFormula::F206 => 206,
            NodeFactorFormula::F215 => 215,
            NodeFactorFormula::F227 => 227,
            NodeFactorFormula::F235 => 235,
        }
    }

    /// Evaluate the node factor for the given node geometry.
    ///
    /// Arguments
    /// ---------
    /// * `node`: node quantities at the middle of the year
    ///
    /// Return
    /// ------
    /// * the dimensionless node factor `f`
    pub fn evaluate(self, node: &NodeTerms) -> f64 {
        let sin_i = sin_deg(node.i);
        let sin_half = sin_deg(node.i / 2.);
        let cos_half = cos_deg(node.i / 2.);
        let sin_2i = sin_deg(2. * node.i);

        match self {
            NodeFactorFormula::Unity => 1.,
            NodeFactorFormula::F73 => (2. / 3. - sin_i.powi(2)) / 0.5021,
            NodeFactorFormula::F74 => sin_i.powi(2) / 0.1578,
            NodeFactorFormula::F75 => sin_i * cos_half.powi(2) / 0.38,
            NodeFactorFormula::F76 => sin_2i / 0.7214,
            NodeFactorFormula::F77 => sin_i * sin_half.powi(2) / 0.0164,
            NodeFactorFormula::F78 => cos_half.powi(4) / 0.9154,
            NodeFactorFormula::F79 => sin_i.powi(2) / 0.1565,
            NodeFactorFormula::F144 => {
                (1. - 10. * sin_half.powi(2) + 15. * sin_half.powi(4)) * cos_half.powi(2) / 0.5873
            }
            NodeFactorFormula::F149 => cos_half.powi(6) / 0.8758,
            NodeFactorFormula::F206 => NodeFactorFormula::F75.evaluate(node) / node.q_a,
            NodeFactorFormula::F215 => NodeFactorFormula::F78.evaluate(node) / node.r_a,
            NodeFactorFormula::F227 => (0.8965 * sin_2i.powi(2)
                + 0.6001 * sin_2i * cos_deg(node.nu)
                + 0.1006)
                .sqrt(),
            NodeFactorFormula::F235 => (19.0444 * sin_i.powi(4)
                + 2.7702 * sin_i.powi(2) * cos_deg(2. * node.nu)
                + 0.0981)
                .sqrt(),
        }
    }
}

impl TryFrom<u32> for NodeFactorFormula {
    type Error = TidegenError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        let formula = match id {
            1 => NodeFactorFormula::Unity,
            73 => NodeFactorFormula::F73,
            74 => NodeFactorFormula::F74,
            75 => NodeFactorFormula::F75,
            76 => NodeFactorFormula::F76,
            77 => NodeFactorFormula::F77,
            78 => NodeFactorFormula::F78,
            79 => NodeFactorFormula::F79,
            144 => NodeFactorFormula::F144,
            149 => NodeFactorFormula::F149,
            206 => NodeFactorFormula::F206,
            215 => NodeFactorFormula::F215,
            227 => NodeFactorFormula::F227,
            235 => NodeFactorFormula::F235,
            other => return Err(TidegenError::UnknownNodeFactorFormula(other)),
        };
        Ok(formula)
    }
}

impl std::fmt::Display for NodeFactorFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
mod node_factor_test {
    use super::*;
    use crate::constants::{LUNAR_INCLINATION, OBLIQUITY};
    use approx::assert_abs_diff_eq;

    const ALL: [NodeFactorFormula; 14] = [
        NodeFactorFormula::Unity,
        NodeFactorFormula::F73,
        NodeFactorFormula::F74,
        NodeFactorFormula::F75,
        NodeFactorFormula::F76,
        NodeFactorFormula::F77,
        NodeFactorFormula::F78,
        NodeFactorFormula::F79,
        NodeFactorFormula::F144,
        NodeFactorFormula::F149,
        NodeFactorFormula::F206,
        NodeFactorFormula::F215,
        NodeFactorFormula::F227,
        NodeFactorFormula::F235,
    ];

    #[test]
    fn test_id_round_trip() {
        for formula in ALL {
            assert_eq!(NodeFactorFormula::try_from(formula.id()).unwrap(), formula);
        }
    }

    #[test]
    fn test_unknown_id() {
        assert_eq!(
            NodeFactorFormula::try_from(80),
            Err(TidegenError::UnknownNodeFactorFormula(80))
        );
        assert!(NodeFactorFormula::try_from(0).is_err());
    }

    #[test]
    fn test_m2_factor_bounds() {
        // I = ω + i at N = 0, I = ω − i at N = 180
        let low = NodeFactorFormula::F78.evaluate(&NodeTerms::from_longitudes(0., 0.));
        let high = NodeFactorFormula::F78.evaluate(&NodeTerms::from_longitudes(180., 0.));
        let expected_low = cos_deg((OBLIQUITY + LUNAR_INCLINATION) / 2.).powi(4) / 0.9154;
        assert_abs_diff_eq!(low, expected_low, epsilon = 1e-12);
        assert!(low > 0.96 && low < 0.97);
        assert!(high > 1.03 && high < 1.04);
    }

    #[test]
    fn test_factors_near_unity_on_average() {
        // Mean inclination with P near 90 degrees: every formula sits close to 1
        let node = NodeTerms::from_longitudes(90., 90.);
        for formula in ALL {
            let f = formula.evaluate(&node);
            assert!(f > 0.5 && f < 1.5, "formula {formula}: f = {f}");
        }
    }

    #[test]
    fn test_unity() {
        let node = NodeTerms::from_longitudes(12.3, 45.6);
        assert_eq!(NodeFactorFormula::Unity.evaluate(&node), 1.0);
    }
}
