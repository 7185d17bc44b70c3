//! Focusable fields of each wizard step and their binding to the wizard
//! controller.

use impugna_engine::ImpugnacionWizard;
use impugna_engine::catalog::authority_kinds;
use impugna_engine::wizard::{
    RepresentanteField, STEP_ACTORES, STEP_AUTORIDAD, STEP_EVIDENCIA, STEP_IMPUGNACION, STEP_PERSONALIDAD, STEP_REPRESENTANTE,
};

/// Narrative length cap, matching the original text area.
pub const NARRATIVA_MAX_CHARS: usize = 2000;
/// Authority description cap.
pub const DESCRIPCION_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// "Titular" / "Representante" buttons on the first step.
    ActorChoice,
    NombreTitular,
    RepresentanteNombre(usize),
    RepresentanteCalidad(usize),
    AuthorityKinds,
    AuthorityOptions,
    Descripcion(usize),
    Narrativa,
    /// Path prompt of the step's uploader.
    FilePath,
    /// Rows of the step's uploader.
    FileRows,
}

impl Field {
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            Self::NombreTitular
                | Self::RepresentanteNombre(_)
                | Self::RepresentanteCalidad(_)
                | Self::Descripcion(_)
                | Self::Narrativa
                | Self::FilePath
        )
    }

    /// Whether the text lives on the wizard model rather than in the view.
    pub fn is_model_bound(&self) -> bool {
        self.is_text() && !matches!(self, Self::FilePath)
    }

    pub fn label(&self) -> String {
        match self {
            Self::ActorChoice => "Tipo de persona".into(),
            Self::NombreTitular => "Nombre del titular".into(),
            Self::RepresentanteNombre(index) => format!("Nombre del representante {}", index + 1),
            Self::RepresentanteCalidad(index) => format!("Calidad del representante {}", index + 1),
            Self::AuthorityKinds => "Autoridad responsable".into(),
            Self::AuthorityOptions => "Selecciona una opción".into(),
            Self::Descripcion(index) => format!("Acto impugnado {}", index + 1),
            Self::Narrativa => "Narración de los hechos".into(),
            Self::FilePath => "Ruta del archivo".into(),
            Self::FileRows => "Archivos".into(),
        }
    }

    /// Current model value of a model-bound text field.
    pub fn model_value(&self, wizard: &ImpugnacionWizard) -> Option<String> {
        match *self {
            Self::NombreTitular => Some(wizard.representantes().nombre_titular().to_string()),
            Self::RepresentanteNombre(index) => wizard.representantes().representantes().get(index).map(|r| r.nombre.clone()),
            Self::RepresentanteCalidad(index) => wizard.representantes().representantes().get(index).map(|r| r.calidad.clone()),
            Self::Descripcion(index) => wizard.autoridad().agregadas().get(index).map(|a| a.descripcion.clone()),
            Self::Narrativa => Some(wizard.narrativa().to_string()),
            _ => None,
        }
    }

    /// Writes `value` into the model. The model may normalize it; read it
    /// back with [`Field::model_value`].
    pub fn apply(&self, wizard: &mut ImpugnacionWizard, value: &str) {
        match *self {
            Self::NombreTitular => wizard.representantes_mut().set_nombre_titular(value),
            Self::RepresentanteNombre(index) => {
                wizard.representantes_mut().update(index, RepresentanteField::Nombre, value);
            }
            Self::RepresentanteCalidad(index) => {
                wizard.representantes_mut().update(index, RepresentanteField::Calidad, value);
            }
            Self::Descripcion(index) => {
                let capped: String = value.chars().take(DESCRIPCION_MAX_CHARS).collect();
                wizard.autoridad_mut().set_descripcion(index, &capped);
            }
            Self::Narrativa => wizard.set_narrativa(value.chars().take(NARRATIVA_MAX_CHARS).collect::<String>()),
            _ => {}
        }
    }

    /// Inline validation message for the field, if any.
    pub fn validation_message(&self, wizard: &ImpugnacionWizard) -> Option<&'static str> {
        let empty = |value: Option<String>| value.is_some_and(|value| value.trim().is_empty());
        match self {
            Self::NombreTitular | Self::RepresentanteNombre(_) if empty(self.model_value(wizard)) => {
                Some("El nombre es obligatorio")
            }
            Self::RepresentanteCalidad(_) if empty(self.model_value(wizard)) => Some("La calidad es obligatoria"),
            Self::Descripcion(_) if empty(self.model_value(wizard)) => Some("Describe el acto impugnado"),
            Self::Narrativa if !wizard.is_narrativa_valid() => Some("Escribe al menos 10 caracteres"),
            _ => None,
        }
    }

    /// Number of entries of a list field.
    pub fn list_len(&self, wizard: &ImpugnacionWizard, step: usize) -> usize {
        match self {
            Self::AuthorityKinds => authority_kinds().len(),
            Self::AuthorityOptions => wizard.autoridad().pending_options().len(),
            Self::FileRows => wizard.uploader(step).map_or(0, |uploader| uploader.entries().len()),
            _ => 0,
        }
    }
}

/// Focus order of the fields of `step`.
pub fn fields_for(step: usize, wizard: &ImpugnacionWizard) -> Vec<Field> {
    match step {
        STEP_ACTORES => vec![Field::ActorChoice],
        STEP_REPRESENTANTE => {
            let mut fields = vec![Field::NombreTitular];
            for index in 0..wizard.representantes().representantes().len() {
                fields.push(Field::RepresentanteNombre(index));
                fields.push(Field::RepresentanteCalidad(index));
            }
            fields
        }
        STEP_AUTORIDAD => {
            let mut fields = vec![Field::AuthorityKinds, Field::AuthorityOptions];
            fields.extend((0..wizard.autoridad().agregadas().len()).map(Field::Descripcion));
            fields
        }
        STEP_IMPUGNACION => vec![Field::Narrativa, Field::FilePath, Field::FileRows],
        STEP_PERSONALIDAD | STEP_EVIDENCIA => vec![Field::FilePath, Field::FileRows],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use impugna_types::TramiteKind;

    #[test]
    fn representative_fields_follow_the_list() {
        let mut wizard = ImpugnacionWizard::new(TramiteKind::Registro, None);
        assert_eq!(
            fields_for(STEP_REPRESENTANTE, &wizard),
            vec![
                Field::NombreTitular,
                Field::RepresentanteNombre(0),
                Field::RepresentanteCalidad(0)
            ]
        );
        wizard.representantes_mut().add();
        assert_eq!(fields_for(STEP_REPRESENTANTE, &wizard).len(), 5);
    }

    #[test]
    fn applied_values_are_normalized_by_the_model() {
        let mut wizard = ImpugnacionWizard::new(TramiteKind::Registro, None);
        Field::NombreTitular.apply(&mut wizard, "Ana 2 López");
        assert_eq!(Field::NombreTitular.model_value(&wizard).as_deref(), Some("Ana  López"));

        Field::Narrativa.apply(&mut wizard, &"h".repeat(NARRATIVA_MAX_CHARS + 10));
        assert_eq!(wizard.narrativa().chars().count(), NARRATIVA_MAX_CHARS);
        assert_eq!(Field::Narrativa.validation_message(&wizard), None);

        assert_eq!(Field::Descripcion(0).model_value(&wizard), None);
        assert!(!Field::FilePath.is_model_bound());
    }

    #[test]
    fn empty_name_reports_a_message() {
        let wizard = ImpugnacionWizard::new(TramiteKind::Registro, None);
        assert_eq!(
            Field::RepresentanteNombre(0).validation_message(&wizard),
            Some("El nombre es obligatorio")
        );
        assert_eq!(Field::RepresentanteNombre(4).validation_message(&wizard), None);
    }
}
