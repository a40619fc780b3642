//! Dotted capability paths.
//!
//! A capability such as `article.edit` is split on `.` into the segments
//! `["article", "edit"]`, one per level of the permission tree. Splitting is
//! literal: `""` is the single empty segment `[""]` and `"a..b"` contains an
//! empty middle segment. No segment is ever dropped.

use std::fmt::{Display, Formatter};

/// Separator between capability segments.
pub const SEPARATOR: char = '.';

/// Segment matching any single segment at its depth.
pub const WILDCARD: &str = "*";

/// A capability split into its segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CapabilityPath {
    segments: Vec<String>,
}

impl CapabilityPath {
    /// Split a dotted capability string.
    pub fn parse(capability: &str) -> Self {
        Self {
            segments: capability.split(SEPARATOR).map(str::to_owned).collect(),
        }
    }

    /// The segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl Display for CapabilityPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut segments = self.segments.iter();
        if let Some(first) = segments.next() {
            f.write_str(first)?;
        }
        for segment in segments {
            write!(f, "{SEPARATOR}{segment}")?;
        }
        Ok(())
    }
}
