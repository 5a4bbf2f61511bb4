//! Named phantom presets.
//!
//! Presets are registered in [`PhantomKind`], which maps names such as
//! `"simple cell"` to a constructor producing the default phantom.

pub mod simple_cell;

use std::fmt;
use std::str::FromStr;

pub use simple_cell::SimpleCell;

use crate::phantom::Phantom;
use crate::GeometryError;

/// Registry of phantom presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhantomKind {
    SimpleCell,
}

impl PhantomKind {
    /// All registered presets.
    pub const ALL: [PhantomKind; 1] = [PhantomKind::SimpleCell];

    /// Canonical names of all registered presets.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|k| k.name()).collect()
    }

    /// Canonical name of this preset.
    pub fn name(self) -> &'static str {
        match self {
            PhantomKind::SimpleCell => "simple cell",
        }
    }

    /// Build the preset with its default parameters.
    pub fn build(self) -> Phantom {
        match self {
            PhantomKind::SimpleCell => SimpleCell::default().build(),
        }
    }
}

impl FromStr for PhantomKind {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple cell" | "simple_cell" | "simplecell" => Ok(PhantomKind::SimpleCell),
            _ => Err(GeometryError::UnknownPhantom(s.to_string())),
        }
    }
}

impl fmt::Display for PhantomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        assert_eq!("simple cell".parse::<PhantomKind>().unwrap(), PhantomKind::SimpleCell);
        assert_eq!("Simple_Cell".parse::<PhantomKind>().unwrap(), PhantomKind::SimpleCell);
        assert_eq!(PhantomKind::SimpleCell.build().len(), 5);
    }

    #[test]
    fn test_unknown_phantom() {
        let err = "hela".parse::<PhantomKind>().unwrap_err();
        assert!(matches!(err, GeometryError::UnknownPhantom(ref n) if n == "hela"));
    }
}
