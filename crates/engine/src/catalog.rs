//! Responsible-authority catalog used by the cascading selector.

/// How a top-level authority type resolves to a concrete entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityShape {
    /// One choice among a fixed list of sub-options.
    SubOption(&'static [&'static str]),
    /// A federal state, then a district office inside it.
    StateDistrict {
        states: &'static [&'static str],
        districts: &'static [&'static str],
    },
}

/// A top-level authority type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorityKind {
    pub name: &'static str,
    pub shape: AuthorityShape,
}

pub const AREAS_CENTRALES: &str = "Áreas centrales del INE";
pub const JUNTAS_LOCALES: &str = "Juntas Locales";
pub const JUNTAS_DISTRITALES: &str = "Juntas Distritales";

const AREAS_CENTRALES_OPTIONS: &[&str] = &[
    "Consejo General",
    "Secretaría Ejecutiva",
    "Presidencia del Consejo General",
    "Junta General Ejecutiva",
    "Unidad Técnica de Fiscalización",
];

const JUNTAS_LOCALES_OPTIONS: &[&str] = &[
    "Junta Local Ejecutiva en Aguascalientes",
    "Junta Local Ejecutiva en Baja California",
    "Junta Local Ejecutiva en Ciudad de México",
    "Junta Local Ejecutiva en Jalisco",
    "Junta Local Ejecutiva en México",
];

const ESTADOS: &[&str] = &["Aguascalientes", "Ciudad de México", "Jalisco", "México", "Nuevo León"];

const DISTRITOS: &[&str] = &[
    "Junta Distrital Ejecutiva 01",
    "Junta Distrital Ejecutiva 02",
    "Junta Distrital Ejecutiva 03",
];

static AUTHORITY_KINDS: [AuthorityKind; 3] = [
    AuthorityKind {
        name: AREAS_CENTRALES,
        shape: AuthorityShape::SubOption(AREAS_CENTRALES_OPTIONS),
    },
    AuthorityKind {
        name: JUNTAS_LOCALES,
        shape: AuthorityShape::SubOption(JUNTAS_LOCALES_OPTIONS),
    },
    AuthorityKind {
        name: JUNTAS_DISTRITALES,
        shape: AuthorityShape::StateDistrict {
            states: ESTADOS,
            districts: DISTRITOS,
        },
    },
];

/// All top-level authority types in display order.
pub fn authority_kinds() -> &'static [AuthorityKind] {
    &AUTHORITY_KINDS
}

pub fn find_authority(name: &str) -> Option<&'static AuthorityKind> {
    AUTHORITY_KINDS.iter().find(|kind| kind.name == name)
}
