//! Controller for the impugnación registration wizard.
//!
//! [`ImpugnacionWizard`] owns the per-step form state and computes each
//! step's validity. The [`StepperStore`] is injected on every call and stays
//! the only owner of navigation state.
//!
//! The step graph is not linear: the first step branches. "Titular" jumps
//! straight to the authority step and "Representante" goes through the
//! representatives step. Both jumps use the unguarded
//! [`StepperStore::set_current_step`].

mod autoridad;
mod representantes;

pub use autoridad::AutoridadSelector;
pub use representantes::{FIELD_MAX_CHARS, RepresentanteField, RepresentantesForm};

use impugna_types::{
    ActoresData, DemandaData, EvidenciaData, FormData, PersonalidadData, RegistrantType, StepConfig, StepPayload,
    TramiteKind,
};
use tracing::{debug, info};

use crate::upload::{FileUploader, UploadProfile};
use crate::{NavigationError, StepperStore};

pub const STEP_ACTORES: usize = 0;
pub const STEP_REPRESENTANTE: usize = 1;
pub const STEP_PERSONALIDAD: usize = 2;
pub const STEP_AUTORIDAD: usize = 3;
pub const STEP_IMPUGNACION: usize = 4;
pub const STEP_EVIDENCIA: usize = 5;

/// Minimum trimmed length of the facts narrative.
pub const MIN_NARRATIVE_CHARS: usize = 10;

/// The six steps of the impugnación wizard.
pub fn impugnacion_step_configs() -> Vec<StepConfig> {
    vec![
        StepConfig::new("actores", "Actores", "Persona o representante que registra la impugnación", true),
        StepConfig::new("representante", "Representante", "Datos del representante", true),
        StepConfig::new("personalidad", "Personalidad", "Acreditación de la personalidad", false),
        StepConfig::new("autoridad", "Autoridad", "Autoridad responsable", true),
        StepConfig::new("impugnacion", "Impugnación", "Hechos y agravios", true),
        StepConfig::new("evidencia", "Evidencia", "Pruebas y anexos", false),
    ]
}

/// How a wizard session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardExit {
    /// "Enviar" on the last step; carries the collected data for review.
    Review(FormData),
    /// The user left the wizard; the store was reset.
    Abandoned,
}

#[derive(Debug, Clone)]
pub struct ImpugnacionWizard {
    tramite: TramiteKind,
    expediente: Option<String>,
    registrant: Option<RegistrantType>,
    /// Step the current branch was entered from.
    branch_origin: Option<usize>,
    representantes: RepresentantesForm,
    autoridad: AutoridadSelector,
    narrativa: String,
    personalidad: FileUploader,
    demanda: FileUploader,
    evidencia: FileUploader,
}

impl ImpugnacionWizard {
    pub fn new(tramite: TramiteKind, expediente: Option<String>) -> Self {
        Self {
            tramite,
            expediente: expediente.filter(|value| !value.trim().is_empty()),
            registrant: None,
            branch_origin: None,
            representantes: RepresentantesForm::default(),
            autoridad: AutoridadSelector::default(),
            narrativa: String::new(),
            personalidad: FileUploader::new(UploadProfile::Personalidad.config()),
            demanda: FileUploader::new(UploadProfile::Demanda.config()),
            evidencia: FileUploader::new(UploadProfile::Evidencia.config()),
        }
    }

    // ----- Accessors -----

    pub fn tramite(&self) -> TramiteKind {
        self.tramite
    }

    pub fn expediente(&self) -> Option<&str> {
        self.expediente.as_deref()
    }

    pub fn title(&self) -> &'static str {
        self.tramite.wizard_title()
    }

    pub fn registrant(&self) -> Option<RegistrantType> {
        self.registrant
    }

    pub fn branch_origin(&self) -> Option<usize> {
        self.branch_origin
    }

    pub fn representantes(&self) -> &RepresentantesForm {
        &self.representantes
    }

    pub fn representantes_mut(&mut self) -> &mut RepresentantesForm {
        &mut self.representantes
    }

    pub fn autoridad(&self) -> &AutoridadSelector {
        &self.autoridad
    }

    pub fn autoridad_mut(&mut self) -> &mut AutoridadSelector {
        &mut self.autoridad
    }

    pub fn narrativa(&self) -> &str {
        &self.narrativa
    }

    pub fn set_narrativa(&mut self, text: impl Into<String>) {
        self.narrativa = text.into();
    }

    /// Uploader hosted by `step`, if any.
    pub fn uploader(&self, step: usize) -> Option<&FileUploader> {
        match step {
            STEP_PERSONALIDAD => Some(&self.personalidad),
            STEP_IMPUGNACION => Some(&self.demanda),
            STEP_EVIDENCIA => Some(&self.evidencia),
            _ => None,
        }
    }

    pub fn uploader_mut(&mut self, step: usize) -> Option<&mut FileUploader> {
        match step {
            STEP_PERSONALIDAD => Some(&mut self.personalidad),
            STEP_IMPUGNACION => Some(&mut self.demanda),
            STEP_EVIDENCIA => Some(&mut self.evidencia),
            _ => None,
        }
    }

    // ----- Step 0 branches -----

    /// "Titular" skips the representative steps and lands on the authority step.
    pub fn choose_titular(&mut self, store: &mut StepperStore) -> Result<usize, NavigationError> {
        self.choose_registrant(store, RegistrantType::Titular, STEP_AUTORIDAD)
    }

    pub fn choose_representante(&mut self, store: &mut StepperStore) -> Result<usize, NavigationError> {
        self.choose_registrant(store, RegistrantType::Representantes, STEP_REPRESENTANTE)
    }

    fn choose_registrant(
        &mut self,
        store: &mut StepperStore,
        registrant: RegistrantType,
        target: usize,
    ) -> Result<usize, NavigationError> {
        let payload = StepPayload::Actores(ActoresData {
            option: registrant,
            tipo_tramite: self.tramite,
            expediente: self.expediente.clone(),
        });
        store.update_step_data(STEP_ACTORES, payload, true)?;
        let index = store.set_current_step(target)?;
        self.registrant = Some(registrant);
        self.branch_origin = Some(STEP_ACTORES);
        info!(?registrant, step = index, "registrant chosen");
        Ok(index)
    }

    // ----- Validity -----

    /// Validity predicate of `step` given the current form state.
    pub fn is_step_valid(&self, step: usize) -> bool {
        match step {
            STEP_REPRESENTANTE => self.representantes.is_valid(),
            STEP_AUTORIDAD => self.autoridad.is_valid(),
            STEP_IMPUGNACION => self.is_narrativa_valid() && self.demanda.is_valid(),
            _ => true,
        }
    }

    pub fn is_narrativa_valid(&self) -> bool {
        self.narrativa.trim().chars().count() >= MIN_NARRATIVE_CHARS
    }

    /// Recomputes the predicate of the current step and pushes it into the store.
    pub fn refresh_validity(&self, store: &mut StepperStore) {
        let step = store.current_step();
        let is_valid = self.is_step_valid(step);
        if store.is_step_valid(step) != is_valid {
            debug!(step, is_valid, "step validity changed");
        }
        if let Err(reason) = store.mark_step_as_valid(step, is_valid) {
            debug!(step, %reason, "validity not recorded");
        }
    }

    // ----- Navigation -----

    /// Saves the current step's payload and moves forward.
    ///
    /// On the first step this repeats the branch already chosen; without a
    /// choice it is refused.
    pub fn handle_next(&mut self, store: &mut StepperStore) -> Result<usize, NavigationError> {
        let step = store.current_step();
        if step == STEP_ACTORES {
            return match self.registrant {
                Some(RegistrantType::Titular) => self.choose_titular(store),
                Some(RegistrantType::Representantes) => self.choose_representante(store),
                None => Err(NavigationError::CurrentStepInvalid { index: step }),
            };
        }
        if store.is_last_step() {
            return Err(NavigationError::AtLastStep);
        }
        self.refresh_validity(store);
        if !self.is_step_valid(step) {
            debug!(step, "next refused, step invalid");
            return Err(NavigationError::CurrentStepInvalid { index: step });
        }

        if let Some(payload) = self.payload_for(step) {
            store.update_form_data(FormData::with_entry(FormData::step_key(step), payload));
        }
        if step == STEP_REPRESENTANTE {
            // The representative branch has been walked; back from the
            // authority step now follows the linear order.
            self.branch_origin = None;
        }
        let next = store.set_current_step(step + 1)?;
        self.refresh_validity(store);
        Ok(next)
    }

    /// Goes back one step, honouring the "Titular" shortcut.
    pub fn handle_prev(&mut self, store: &mut StepperStore) -> Result<usize, NavigationError> {
        let step = store.current_step();
        let outcome = if step == STEP_AUTORIDAD && self.branch_origin == Some(STEP_ACTORES) {
            self.branch_origin = None;
            store.set_current_step(STEP_ACTORES)
        } else if step == STEP_REPRESENTANTE {
            store.set_current_step(STEP_ACTORES)
        } else {
            store.prev_step()
        };
        if outcome.is_ok() {
            self.refresh_validity(store);
        }
        outcome
    }

    /// "Enviar": valid only on the last step. Returns the collected data for
    /// the review screen without giving the store a terminal state.
    pub fn handle_finish(&mut self, store: &mut StepperStore) -> Result<WizardExit, NavigationError> {
        let step = store.current_step();
        if !store.is_last_step() {
            return Err(NavigationError::NotAtLastStep { index: step });
        }
        self.refresh_validity(store);
        if !self.is_step_valid(step) {
            return Err(NavigationError::CurrentStepInvalid { index: step });
        }
        if let Some(payload) = self.payload_for(step) {
            store.update_form_data(FormData::with_entry(FormData::step_key(step), payload));
        }
        info!(entries = store.form_data().len(), "wizard finished");
        Ok(WizardExit::Review(store.form_data().clone()))
    }

    /// Leaves the wizard, resetting the store and every local field.
    pub fn handle_back(&mut self, store: &mut StepperStore) -> WizardExit {
        store.reset();
        *self = Self::new(self.tramite, self.expediente.take());
        info!("wizard abandoned");
        WizardExit::Abandoned
    }

    /// Drives simulated uploads. Returns whether anything changed.
    pub fn tick(&mut self, store: &mut StepperStore) -> bool {
        let mut changed = false;
        for uploader in [&mut self.personalidad, &mut self.demanda, &mut self.evidencia] {
            changed |= uploader.tick();
        }
        if changed {
            self.refresh_validity(store);
        }
        changed
    }

    /// Whether any uploader still has queued or in-flight files.
    pub fn is_busy(&self) -> bool {
        self.personalidad.is_busy() || self.demanda.is_busy() || self.evidencia.is_busy()
    }

    /// Payload saved for `step` when leaving it forward.
    pub fn payload_for(&self, step: usize) -> Option<StepPayload> {
        match step {
            STEP_REPRESENTANTE => Some(StepPayload::Representante(self.representantes.to_payload())),
            STEP_PERSONALIDAD => Some(StepPayload::Personalidad(PersonalidadData {
                archivos: self.personalidad.successful_files(),
            })),
            STEP_AUTORIDAD => Some(StepPayload::Autoridad(self.autoridad.to_payload())),
            STEP_IMPUGNACION => Some(StepPayload::Demanda(DemandaData {
                descripcion: self.narrativa.clone(),
                archivos: self.demanda.successful_files(),
            })),
            STEP_EVIDENCIA => Some(StepPayload::Evidencia(EvidenciaData::from_archivos(
                self.evidencia.successful_files(),
            ))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::JUNTAS_LOCALES;
    use crate::upload::FileCandidate;

    fn setup() -> (StepperStore, ImpugnacionWizard) {
        (
            StepperStore::create(impugnacion_step_configs()),
            ImpugnacionWizard::new(TramiteKind::Registro, None),
        )
    }

    fn fill_autoridad(wizard: &mut ImpugnacionWizard) {
        let selector = wizard.autoridad_mut();
        selector.choose_authority(JUNTAS_LOCALES);
        selector.choose_option("Junta Local Ejecutiva en Jalisco");
        selector.set_descripcion(0, "Omisión de respuesta a la solicitud");
    }

    fn upload_demanda(wizard: &mut ImpugnacionWizard, store: &mut StepperStore) {
        let uploader = wizard.uploader_mut(STEP_IMPUGNACION).unwrap();
        uploader.add_files(vec![FileCandidate::new("demanda.pdf", 2048, b"%PDF".to_vec())]);
        while wizard.tick(store) {}
    }

    #[test]
    fn step_catalog_matches_wizard_layout() {
        let configs = impugnacion_step_configs();
        let ids: Vec<_> = configs.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["actores", "representante", "personalidad", "autoridad", "impugnacion", "evidencia"]);
        let optional: Vec<_> = configs.iter().filter(|c| !c.required).map(|c| c.id.as_str()).collect();
        assert_eq!(optional, vec!["personalidad", "evidencia"]);
    }

    #[test]
    fn titular_branch_skips_to_authority_and_back() {
        let (mut store, mut wizard) = setup();

        assert_eq!(wizard.choose_titular(&mut store), Ok(STEP_AUTORIDAD));
        assert!(!store.is_step_visited(STEP_REPRESENTANTE));
        assert!(!store.is_step_visited(STEP_PERSONALIDAD));
        assert!(matches!(
            store.form_data().get("step0"),
            Some(StepPayload::Actores(ActoresData {
                option: RegistrantType::Titular,
                ..
            }))
        ));

        assert_eq!(wizard.handle_prev(&mut store), Ok(STEP_ACTORES));
        assert_eq!(wizard.branch_origin(), None);
    }

    #[test]
    fn representative_branch_walks_linearly_back_from_authority() {
        let (mut store, mut wizard) = setup();
        wizard.choose_representante(&mut store).unwrap();
        wizard.representantes_mut().set_nombre_titular("Lucía Ramírez");
        wizard.representantes_mut().update(0, RepresentanteField::Nombre, "Pedro Soto");
        wizard.representantes_mut().update(0, RepresentanteField::Calidad, "Apoderado");

        assert_eq!(wizard.handle_next(&mut store), Ok(STEP_PERSONALIDAD));
        assert_eq!(wizard.handle_next(&mut store), Ok(STEP_AUTORIDAD));
        assert_eq!(wizard.handle_prev(&mut store), Ok(STEP_PERSONALIDAD));
        assert!(store.form_data().get("step1").is_some());
        assert!(store.form_data().get("step2").is_some());
    }

    #[test]
    fn next_is_refused_while_step_is_invalid() {
        let (mut store, mut wizard) = setup();
        assert_eq!(
            wizard.handle_next(&mut store),
            Err(NavigationError::CurrentStepInvalid { index: STEP_ACTORES })
        );

        wizard.choose_titular(&mut store).unwrap();
        assert_eq!(
            wizard.handle_next(&mut store),
            Err(NavigationError::CurrentStepInvalid { index: STEP_AUTORIDAD })
        );
        assert!(!store.is_step_valid(STEP_AUTORIDAD));

        fill_autoridad(&mut wizard);
        assert_eq!(wizard.handle_next(&mut store), Ok(STEP_IMPUGNACION));
        assert!(store.form_data().get("step3").is_some());
    }

    #[test]
    fn impugnacion_needs_narrative_and_demanda_upload() {
        let (mut store, mut wizard) = setup();
        wizard.choose_titular(&mut store).unwrap();
        fill_autoridad(&mut wizard);
        wizard.handle_next(&mut store).unwrap();

        wizard.set_narrativa("Hechos suficientes para la demanda");
        wizard.refresh_validity(&mut store);
        assert!(!store.is_step_valid(STEP_IMPUGNACION), "upload still missing");

        upload_demanda(&mut wizard, &mut store);
        assert!(store.is_step_valid(STEP_IMPUGNACION));

        wizard.set_narrativa("   corto   ");
        assert!(wizard.handle_next(&mut store).is_err());

        wizard.set_narrativa("Narración completa");
        assert_eq!(wizard.handle_next(&mut store), Ok(STEP_EVIDENCIA));
        match store.form_data().get("step4") {
            Some(StepPayload::Demanda(data)) => assert_eq!(data.archivos.len(), 1),
            other => panic!("unexpected step4 payload: {other:?}"),
        }
    }

    #[test]
    fn finish_hands_over_form_data() {
        let (mut store, mut wizard) = setup();
        assert_eq!(
            wizard.handle_finish(&mut store),
            Err(NavigationError::NotAtLastStep { index: 0 })
        );

        store.set_current_step(STEP_EVIDENCIA).unwrap();
        let exit = wizard.handle_finish(&mut store).unwrap();
        match exit {
            WizardExit::Review(data) => assert!(matches!(data.get("step5"), Some(StepPayload::Evidencia(_)))),
            WizardExit::Abandoned => panic!("expected review"),
        }
        assert_eq!(store.current_step(), STEP_EVIDENCIA);
    }

    #[test]
    fn refresh_validity_tolerates_an_empty_store() {
        let mut store = StepperStore::create(Vec::new());
        let wizard = ImpugnacionWizard::new(TramiteKind::Registro, None);
        wizard.refresh_validity(&mut store);
        assert_eq!(store.total_steps(), 0);
        assert!(!store.is_step_valid(0));
    }

    #[test]
    fn back_resets_store_and_local_state() {
        let (mut store, mut wizard) = setup();
        wizard.choose_titular(&mut store).unwrap();
        fill_autoridad(&mut wizard);

        assert_eq!(wizard.handle_back(&mut store), WizardExit::Abandoned);
        assert_eq!(store.current_step(), 0);
        assert!(store.form_data().is_empty());
        assert!(wizard.autoridad().agregadas().is_empty());
        assert_eq!(wizard.registrant(), None);
    }
}
