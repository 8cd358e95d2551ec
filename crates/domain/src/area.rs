//! Administrative area tree paths.
//!
//! An area code is a 12-digit string made of four zero-padded segments:
//! country (2 digits), region (3), district (3) and locality (4). The run of
//! trailing zeros tells how deep the node sits: a code ending in 10, 7 or 4
//! zeros names a country, region or district. Segments before that run may
//! themselves be zero. Blank input stands for the root above the countries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of the serialized area code.
pub const AREA_CODE_LEN: usize = 12;

/// Digit width of each tree segment, outermost first.
const SEGMENT_WIDTHS: [usize; 4] = [2, 3, 3, 4];

/// Pattern selecting the countries.
const ROOT_CHILD_PATTERN: &str = "__0000000000";

/// Errors raised while interpreting an area code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AreaCodeError {
    /// The code is not a 12-character digit string.
    #[error("Invalid area code '{code}': expected 12 digits")]
    Malformed { code: String },

    /// A segment value does not fit its digit width.
    #[error("Invalid area segment {segment}: value {value} exceeds {width} digits")]
    SegmentOverflow {
        segment: usize,
        value: u16,
        width: usize,
    },

    /// The code does not end in a recognized zero run, so it has no children.
    #[error("Area code '{code}' is a leaf and has no child areas")]
    Leaf { code: String },
}

/// A typed path in the area tree.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct AreaCode {
    segments: [u16; 4],
}

impl AreaCode {
    /// Builds a code from raw segment values.
    pub fn from_segments(segments: [u16; 4]) -> Result<Self, AreaCodeError> {
        for (segment, (&value, &width)) in segments.iter().zip(SEGMENT_WIDTHS.iter()).enumerate() {
            if u32::from(value) >= 10u32.pow(width as u32) {
                return Err(AreaCodeError::SegmentOverflow {
                    segment,
                    value,
                    width,
                });
            }
        }

        Ok(Self { segments })
    }

    /// Parses the 12-digit storage form. Any digit string is accepted.
    pub fn parse(code: &str) -> Result<Self, AreaCodeError> {
        if code.len() != AREA_CODE_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AreaCodeError::Malformed {
                code: code.to_string(),
            });
        }

        let mut segments = [0u16; 4];
        let mut offset = 0;
        for (slot, width) in segments.iter_mut().zip(SEGMENT_WIDTHS) {
            *slot = code[offset..offset + width]
                .parse()
                .map_err(|_| AreaCodeError::Malformed {
                    code: code.to_string(),
                })?;
            offset += width;
        }

        Ok(Self { segments })
    }

    /// Returns the raw segment values.
    pub fn segments(&self) -> [u16; 4] {
        self.segments
    }

    /// Number of leading segments that identify the node, read from the
    /// trailing zero run: 1 for a country, 2 for a region, 3 for a district
    /// and 4 for a locality.
    pub fn depth(&self) -> usize {
        let code = self.to_string();
        let zeros = code.bytes().rev().take_while(|b| *b == b'0').count();

        // 10 = 3+3+4, 7 = 3+4, 4 = 4 trailing digits
        match zeros {
            10.. => 1,
            7.. => 2,
            4.. => 3,
            _ => 4,
        }
    }

    /// Returns true if this code names a locality (deepest level).
    pub fn is_leaf(&self) -> bool {
        self.depth() == SEGMENT_WIDTHS.len()
    }

    /// Builds the `LIKE` pattern matching the direct children of this node.
    ///
    /// The identifying prefix is kept, the next segment becomes `_` wildcards
    /// and the remaining segments stay literal zeros.
    pub fn child_pattern(&self) -> Result<String, AreaCodeError> {
        let depth = self.depth();
        let Some(&wildcard_width) = SEGMENT_WIDTHS.get(depth) else {
            return Err(AreaCodeError::Leaf {
                code: self.to_string(),
            });
        };

        let code = self.to_string();
        let prefix_len: usize = SEGMENT_WIDTHS[..depth].iter().sum();
        let zeros = AREA_CODE_LEN - prefix_len - wildcard_width;

        let mut pattern = String::with_capacity(AREA_CODE_LEN);
        pattern.push_str(&code[..prefix_len]);
        pattern.extend(std::iter::repeat_n('_', wildcard_width));
        pattern.extend(std::iter::repeat_n('0', zeros));
        Ok(pattern)
    }
}

impl std::fmt::Display for AreaCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (value, width) in self.segments.iter().zip(SEGMENT_WIDTHS) {
            write!(f, "{value:0width$}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for AreaCode {
    type Err = AreaCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AreaCode {
    type Error = AreaCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AreaCode> for String {
    fn from(code: AreaCode) -> Self {
        code.to_string()
    }
}

/// Predicate selecting the direct children of one area.
///
/// `pattern` uses SQL `LIKE` syntax (`_` matches one character). `exclude` is
/// the requested identifier verbatim, so a node never lists itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildAreaPattern {
    pub pattern: String,
    pub exclude: String,
}

impl ChildAreaPattern {
    /// Builds the predicate for a requested area identifier.
    ///
    /// Blank input means the root.
    pub fn for_area(area_id: &str) -> Result<Self, AreaCodeError> {
        let pattern = if area_id.trim().is_empty() {
            ROOT_CHILD_PATTERN.to_string()
        } else {
            AreaCode::parse(area_id)?.child_pattern()?
        };

        Ok(Self {
            pattern,
            exclude: area_id.to_string(),
        })
    }

    /// Evaluates the predicate against a stored area identifier.
    pub fn matches(&self, candidate: &str) -> bool {
        candidate != self.exclude
            && candidate.len() == self.pattern.len()
            && self
                .pattern
                .chars()
                .zip(candidate.chars())
                .all(|(p, c)| p == '_' || p == c)
    }
}
