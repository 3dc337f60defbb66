//! Projection families and their navigation block tags.

use std::fmt;

/// Projection family, identified by word 0 of the navigation block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionKind {
    Gvar,
    Geos,
    LambertConformal,
    Mercator,
    PolarStereographic,
}

impl ProjectionKind {
    pub const ALL: [ProjectionKind; 5] = [
        ProjectionKind::Gvar,
        ProjectionKind::Geos,
        ProjectionKind::LambertConformal,
        ProjectionKind::Mercator,
        ProjectionKind::PolarStereographic,
    ];

    /// Navigation block tag word.
    pub const fn tag(&self) -> i32 {
        let text = match self {
            ProjectionKind::Gvar => b"GVAR",
            ProjectionKind::Geos => b"GEOS",
            ProjectionKind::LambertConformal => b"LAMB",
            ProjectionKind::Mercator => b"MERC",
            ProjectionKind::PolarStereographic => b"PS  ",
        };
        i32::from_be_bytes(*text)
    }

    pub fn from_tag(tag: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }

    /// Projection name as written to output metadata.
    pub fn name(&self) -> &'static str {
        match self {
            ProjectionKind::Gvar => "GVAR",
            ProjectionKind::Geos => "GEOS",
            ProjectionKind::LambertConformal => "LAMBERT_CONFORMAL",
            ProjectionKind::Mercator => "MERCATOR",
            ProjectionKind::PolarStereographic => "STEREOGRAPHIC",
        }
    }

    /// Numeric projection index used by gridded-data readers. Satellite
    /// projections have none.
    pub fn proj_index(&self) -> Option<i32> {
        match self {
            ProjectionKind::LambertConformal => Some(3),
            ProjectionKind::Mercator => Some(2),
            ProjectionKind::PolarStereographic => Some(1),
            ProjectionKind::Gvar | ProjectionKind::Geos => None,
        }
    }
}

impl fmt::Display for ProjectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Printable form of a tag word, for diagnostics.
pub fn tag_text(tag: i32) -> String {
    tag.to_be_bytes()
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
        .collect()
}
