use impugna_types::{AutoridadAgregada, AutoridadData};
use tracing::debug;

use crate::catalog::{AuthorityKind, AuthorityShape, find_authority};

/// Cascading selector for the "Autoridad" step.
///
/// Each resolved leaf (a sub-option, or a state plus district) appends one
/// entry. Picking a new authority type clears the dependent choices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoridadSelector {
    kind: Option<&'static AuthorityKind>,
    estado: Option<String>,
    agregadas: Vec<AutoridadAgregada>,
}

impl AutoridadSelector {
    pub fn kind(&self) -> Option<&'static AuthorityKind> {
        self.kind
    }

    pub fn estado(&self) -> Option<&str> {
        self.estado.as_deref()
    }

    pub fn agregadas(&self) -> &[AutoridadAgregada] {
        &self.agregadas
    }

    /// Selects a top-level authority type by name.
    pub fn choose_authority(&mut self, name: &str) -> bool {
        let Some(kind) = find_authority(name) else {
            return false;
        };
        self.kind = Some(kind);
        self.estado = None;
        true
    }

    /// Options offered by the next selector, given the current choices.
    pub fn pending_options(&self) -> &'static [&'static str] {
        match (self.kind.map(|kind| kind.shape), &self.estado) {
            (Some(AuthorityShape::SubOption(options)), _) => options,
            (Some(AuthorityShape::StateDistrict { states, .. }), None) => states,
            (Some(AuthorityShape::StateDistrict { districts, .. }), Some(_)) => districts,
            (None, _) => &[],
        }
    }

    /// Resolves the next level with `option`. Returns `true` when an entry
    /// was appended.
    pub fn choose_option(&mut self, option: &str) -> bool {
        let Some(kind) = self.kind else {
            return false;
        };
        if !self.pending_options().iter().any(|candidate| *candidate == option) {
            return false;
        }
        match kind.shape {
            AuthorityShape::SubOption(_) => {
                self.push(AutoridadAgregada {
                    autoridad_responsable: kind.name.to_string(),
                    subopcion: Some(option.to_string()),
                    ..Default::default()
                });
                true
            }
            AuthorityShape::StateDistrict { .. } => match &self.estado {
                None => {
                    self.estado = Some(option.to_string());
                    false
                }
                Some(estado) => {
                    let entry = AutoridadAgregada {
                        autoridad_responsable: kind.name.to_string(),
                        estado: Some(estado.clone()),
                        distrito: Some(option.to_string()),
                        ..Default::default()
                    };
                    self.push(entry);
                    true
                }
            },
        }
    }

    /// Goes back to choosing a state for the district authority.
    pub fn clear_estado(&mut self) {
        self.estado = None;
    }

    pub fn set_descripcion(&mut self, index: usize, descripcion: &str) -> bool {
        match self.agregadas.get_mut(index) {
            Some(entry) => {
                entry.descripcion = descripcion.to_string();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<AutoridadAgregada> {
        (index < self.agregadas.len()).then(|| self.agregadas.remove(index))
    }

    /// At least one entry and every entry described.
    pub fn is_valid(&self) -> bool {
        !self.agregadas.is_empty() && self.agregadas.iter().all(AutoridadAgregada::has_description)
    }

    pub fn to_payload(&self) -> AutoridadData {
        AutoridadData {
            autoridades_agregadas: self.agregadas.clone(),
        }
    }

    fn push(&mut self, entry: AutoridadAgregada) {
        debug!(autoridad = %entry.display_label(), "authority added");
        self.agregadas.push(entry);
    }
}
