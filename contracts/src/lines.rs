use std::fmt;
use std::str::FromStr;

use crate::error::{ContractError, ContractKind, ValidationIssue};

/// A 1-based source line reference: either a single line or an inclusive
/// range `N-M` with `N <= M`. Parsed from the wire string form used by
/// `AgentOutput` ("10" or "10-20").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl LineRange {
    pub fn single(line: u32) -> Self {
        Self {
            start: line,
            end: line,
        }
    }

    pub fn contains(&self, line: u32) -> bool {
        self.start <= line && line <= self.end
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

impl FromStr for LineRange {
    type Err = ContractError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let bad = |msg: &str| {
            ContractError::malformed(
                ContractKind::LineRange,
                ValidationIssue::new("lines", format!("{msg}: {raw:?}")),
            )
        };

        match raw.split_once('-') {
            None => {
                let n: u32 = raw.parse().map_err(|_| bad("not a positive integer"))?;
                if n == 0 {
                    return Err(bad("line numbers are 1-based"));
                }
                Ok(LineRange::single(n))
            }
            Some((a, b)) => {
                let start: u32 = a.parse().map_err(|_| bad("range start is not an integer"))?;
                let end: u32 = b.parse().map_err(|_| bad("range end is not an integer"))?;
                if start == 0 || end == 0 {
                    return Err(bad("line numbers are 1-based"));
                }
                if start > end {
                    return Err(bad("range start must be <= end"));
                }
                Ok(LineRange { start, end })
            }
        }
    }
}
