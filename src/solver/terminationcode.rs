use serde::Serialize;

/// How a warp-parameter search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TerminationCode {
    /// Segment endpoints are equal; k = 1 without searching.
    FlatSegment,
    /// Lower bracket end met the target.
    LowerBound,
    /// Upper bracket end met the target.
    UpperBound,
    /// Bisection midpoint met the target.
    Midpoint,
    /// Bracket narrower than the tolerance; last midpoint returned.
    BracketExhausted,
    /// Pre-scan: seed means ascending and straddling 0.5, root taken at k ~ 1.
    IdentityAscending,
    /// Pre-scan: seed means not ascending and neither side clearly off 0.5, root taken at k ~ 1.
    IdentityDescending,
    /// Brent's method converged.
    Brent,
}

impl TerminationCode {
    pub fn code(&self) -> u8 {
        match self {
            TerminationCode::FlatSegment        => 0,
            TerminationCode::LowerBound         => 1,
            TerminationCode::UpperBound         => 2,
            TerminationCode::Midpoint           => 3,
            TerminationCode::BracketExhausted   => 4,
            TerminationCode::IdentityAscending  => 5,
            TerminationCode::IdentityDescending => 6,
            TerminationCode::Brent              => 7,
        }
    }

    /// True for the early exits of the pre-scan, which never bisect.
    pub fn is_pre_scan_exit(&self) -> bool {
        matches!(
            self,
            TerminationCode::IdentityAscending | TerminationCode::IdentityDescending
        )
    }
}
