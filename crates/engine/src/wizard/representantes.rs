use impugna_types::{RegistrantType, Representante, RepresentanteData};
use impugna_util::sanitize_letters_input;

/// Character cap shared by the titular name and both representative fields.
pub const FIELD_MAX_CHARS: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepresentanteField {
    Nombre,
    Calidad,
}

/// Titular name plus a list of at least one representative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepresentantesForm {
    nombre_titular: String,
    representantes: Vec<Representante>,
}

impl Default for RepresentantesForm {
    fn default() -> Self {
        Self {
            nombre_titular: String::new(),
            representantes: vec![Representante::default()],
        }
    }
}

impl RepresentantesForm {
    pub fn nombre_titular(&self) -> &str {
        &self.nombre_titular
    }

    pub fn representantes(&self) -> &[Representante] {
        &self.representantes
    }

    /// Stores the titular name keeping only name characters.
    pub fn set_nombre_titular(&mut self, value: &str) {
        self.nombre_titular = sanitize_letters_input(value, FIELD_MAX_CHARS);
    }

    pub fn add(&mut self) {
        self.representantes.push(Representante::default());
    }

    /// Removes the entry at `index` unless it is the last one left.
    pub fn remove(&mut self, index: usize) -> bool {
        if self.representantes.len() <= 1 || index >= self.representantes.len() {
            return false;
        }
        self.representantes.remove(index);
        true
    }

    /// Names are filtered to letters; the capacity is free text. Both are
    /// capped at [`FIELD_MAX_CHARS`].
    pub fn update(&mut self, index: usize, field: RepresentanteField, value: &str) -> bool {
        let Some(entry) = self.representantes.get_mut(index) else {
            return false;
        };
        match field {
            RepresentanteField::Nombre => entry.nombre = sanitize_letters_input(value, FIELD_MAX_CHARS),
            RepresentanteField::Calidad => entry.calidad = value.chars().take(FIELD_MAX_CHARS).collect(),
        }
        true
    }

    pub fn is_valid(&self) -> bool {
        !self.nombre_titular.trim().is_empty() && self.representantes.iter().all(Representante::is_complete)
    }

    pub fn to_payload(&self) -> RepresentanteData {
        RepresentanteData {
            option: RegistrantType::Representantes,
            nombre_titular: self.nombre_titular.clone(),
            representantes: self.representantes.clone(),
        }
    }
}
