use impugna_engine::catalog::JUNTAS_DISTRITALES;
use impugna_engine::wizard::{RepresentanteField, STEP_AUTORIDAD, STEP_EVIDENCIA, STEP_IMPUGNACION};
use impugna_engine::{
    FileCandidate, ImpugnacionWizard, NavigationError, StepperStore, WizardExit, WizardRoute, impugnacion_step_configs,
};
use impugna_types::{StepConfig, StepPayload, TramiteKind};

fn three_steps() -> Vec<StepConfig> {
    ["a", "b", "c"]
        .into_iter()
        .map(|id| StepConfig::new(id, id.to_uppercase(), format!("Paso {id}"), true))
        .collect()
}

#[test]
fn linear_store_stops_at_first_invalid_step() {
    let mut store = StepperStore::create(three_steps());
    assert_eq!(store.current_step(), 0);
    assert!(store.is_step_valid(0));

    store.mark_step_as_valid(0, true).unwrap();
    assert_eq!(store.next_step(), Ok(1));
    assert!(store.is_step_visited(1));
    assert!(!store.is_step_valid(1));

    assert_eq!(store.next_step(), Err(NavigationError::CurrentStepInvalid { index: 1 }));
    assert_eq!(store.current_step(), 1);
}

#[test]
fn branch_skip_bypasses_the_frontier_guard() {
    let mut store = StepperStore::create(impugnacion_step_configs());
    let mut guarded = store.clone();

    assert_eq!(store.set_current_step(3), Ok(3));
    assert!(!store.is_step_visited(1));
    assert!(!store.is_step_visited(2));
    assert!(store.is_step_visited(3));

    assert_eq!(guarded.max_accessible_step(), 1);
    assert_eq!(
        guarded.go_to_step(3),
        Err(NavigationError::BeyondFrontier { index: 3, frontier: 1 })
    );
    assert_eq!(guarded.current_step(), 0);
}

#[test]
fn skipped_steps_stay_reachable_through_the_frontier() {
    let mut store = StepperStore::create(impugnacion_step_configs());
    let mut wizard = ImpugnacionWizard::new(TramiteKind::Registro, None);
    wizard.choose_titular(&mut store).unwrap();

    // Step 1 sits on the frontier, step 2 is beyond it.
    assert_eq!(store.go_to_step(2), Err(NavigationError::BeyondFrontier { index: 2, frontier: 1 }));
    assert_eq!(store.go_to_step(1), Ok(1));
    // The authority step was visited through the branch.
    assert_eq!(store.go_to_step(3), Ok(3));
}

#[test]
fn representative_flow_reaches_review() {
    let mut store = StepperStore::create(impugnacion_step_configs());
    let mut wizard = ImpugnacionWizard::new(TramiteKind::Ampliacion, Some("SUP-JDC-45/2025".into()));

    wizard.choose_representante(&mut store).unwrap();
    let form = wizard.representantes_mut();
    form.set_nombre_titular("María Fernanda Ochoa");
    form.update(0, RepresentanteField::Nombre, "José Ángel Ruiz");
    form.update(0, RepresentanteField::Calidad, "Apoderado legal");
    wizard.handle_next(&mut store).unwrap();

    wizard
        .uploader_mut(2)
        .unwrap()
        .add_files(vec![FileCandidate::new("ine.png", 4096, vec![0x89, 0x50, 0x4e, 0x47])]);
    while wizard.tick(&mut store) {}
    wizard.handle_next(&mut store).unwrap();

    let selector = wizard.autoridad_mut();
    selector.choose_authority(JUNTAS_DISTRITALES);
    selector.choose_option("Nuevo León");
    selector.choose_option("Junta Distrital Ejecutiva 01");
    selector.set_descripcion(0, "Negativa de acceso a la información");
    assert_eq!(wizard.handle_next(&mut store), Ok(STEP_IMPUGNACION));

    wizard.set_narrativa("Se narran los hechos y los agravios causados.");
    wizard
        .uploader_mut(STEP_IMPUGNACION)
        .unwrap()
        .add_files(vec![FileCandidate::new("demanda.pdf", 3 * 1024 * 1024, b"%PDF-1.7".to_vec())]);
    assert_eq!(
        wizard.handle_next(&mut store),
        Err(NavigationError::CurrentStepInvalid { index: STEP_IMPUGNACION })
    );
    while wizard.tick(&mut store) {}
    assert_eq!(wizard.handle_next(&mut store), Ok(STEP_EVIDENCIA));

    let route = WizardRoute::from_store(&store, wizard.tramite(), wizard.expediente());
    assert_eq!(
        route.path(),
        "/registro-impugnacion/evidencia?tipo=ampliacion&expediente=SUP-JDC-45%2F2025"
    );

    let WizardExit::Review(data) = wizard.handle_finish(&mut store).unwrap() else {
        panic!("expected review exit");
    };
    let keys: Vec<_> = data.iter().map(|(key, _)| key.as_str()).collect();
    assert_eq!(keys, vec!["step0", "step1", "step2", "step3", "step4", "step5"]);
    assert!(matches!(data.get("step2"), Some(StepPayload::Personalidad(p)) if p.archivos.len() == 1));

    let json = serde_json::to_value(&data).unwrap();
    assert_eq!(json["step0"]["data"]["tipoTramite"], "ampliacion");
    assert_eq!(json["step3"]["data"]["autoridadesAgregadas"][0]["estado"], "Nuevo León");

    assert!(store.is_completed());
    assert_eq!(store.progress(), 100);
    let collected = store.dispose();
    assert_eq!(collected, data);
}

#[test]
fn titular_back_returns_to_actors() {
    let mut store = StepperStore::create(impugnacion_step_configs());
    let mut wizard = ImpugnacionWizard::new(TramiteKind::Coadyuvante, Some("EXP-1".into()));
    wizard.choose_titular(&mut store).unwrap();
    assert_eq!(store.current_step(), STEP_AUTORIDAD);

    assert_eq!(wizard.handle_prev(&mut store), Ok(0));
    assert_eq!(wizard.handle_prev(&mut store), Err(NavigationError::AtFirstStep));
}
