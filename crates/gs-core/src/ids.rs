//! Strongly typed identifier wrappers.
//!
//! Pixels are keyed by an integer index; sites and sectors carry the
//! operator's string codes verbatim (e.g. `"MOB0421"`, `"MOB0421_2"`).
//! All IDs are `Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.

use std::collections::BTreeSet;
use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(n: $inner) -> $name {
                $name(n)
            }
        }
    };
}

/// Generate a typed ID wrapper around an owned string code.
macro_rules! named_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(pub String);

        impl $name {
            pub fn new(code: impl Into<String>) -> Self {
                Self(code.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(code: &str) -> $name {
                $name(code.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(code: String) -> $name {
                $name(code)
            }
        }
    };
}

typed_id! {
    /// Stable identifier of one physical grid cell within a scenario/year.
    pub struct PixelIndex(u64);
}

named_id! {
    /// Transmission site code.  One site hosts one or more sectors.
    pub struct SiteId;
}

named_id! {
    /// Sector (cell) code, unique across sites.
    pub struct SectorId;
}

// ── SiteSet ───────────────────────────────────────────────────────────────────

/// The set of sites to decommission in one what-if request.
///
/// Ordered so that logs and repository queries see sites in a stable order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SiteSet(BTreeSet<SiteId>);

impl SiteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, site: SiteId) -> bool {
        self.0.insert(site)
    }

    pub fn contains(&self, site: &SiteId) -> bool {
        self.0.contains(site)
    }

    /// `true` when no site is switched off.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SiteId> + '_ {
        self.0.iter()
    }
}

impl<S: Into<SiteId>> FromIterator<S> for SiteSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        SiteSet(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for SiteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, site) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(site.as_str())?;
        }
        f.write_str("}")
    }
}
