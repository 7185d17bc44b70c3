//! Application state for the wizard front end.
//!
//! [`App`] owns the [`StepperStore`] for the lifetime of a session (created
//! on start-up, disposed when the session ends) together with the wizard
//! controller and the view state of each component. Components mutate it in
//! their event handlers and report cross-cutting work back as [`Effect`]s.

use chrono::{DateTime, Local};
use impugna_engine::{ImpugnacionWizard, NavigationError, StepperStore, WizardRoute, impugnacion_step_configs};
use impugna_types::FormData;
use impugna_util::UserPreferences;
use rat_focus::{Focus, FocusBuilder};
use tracing::{debug, info, warn};

use crate::TuiOptions;
use crate::ui::components::stepper::StepperViewState;
use crate::ui::components::wizard::WizardViewState;
use crate::ui::theme::{self, LoadedTheme, Theme, ThemeDefinition, catalog};

/// Primary screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Wizard,
    Review,
}

/// Messages delivered by the runtime rather than by user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    Tick,
    Resize(u16, u16),
}

/// Work requested by components and carried out by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Leave the application.
    Exit(ExitReason),
    /// Switch to the review screen with the collected data.
    ShowReview(FormData),
    /// Back from the review screen to the last wizard step.
    ReturnToWizard,
    /// Show or hide the progress bar, persisting the choice.
    ToggleProgress,
    /// Switch to the next palette, persisting the choice.
    CycleTheme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Confirmed on the review screen.
    Submitted,
    /// The user left the wizard.
    Abandoned,
    /// Ctrl+C or a terminal signal.
    Interrupted,
}

/// How a session ended, returned to the caller of [`crate::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Submitted(FormData),
    Abandoned,
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One-line message shown under the step content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Citizen-facing text for a refused navigation request.
    pub fn for_navigation(error: &NavigationError) -> Self {
        match error {
            NavigationError::CurrentStepInvalid { .. } => {
                Self::error("Completa la información requerida de este paso para continuar.")
            }
            NavigationError::AtLastStep => Self::info("Este es el último paso. Usa Enviar para revisar tu registro."),
            NavigationError::NotAtLastStep { .. } => Self::info("Podrás enviar el registro desde el último paso."),
            NavigationError::AtFirstStep => Self::info("Ya estás en el primer paso."),
            other => Self::error(other.to_string()),
        }
    }
}

/// Data shown on the review screen.
#[derive(Debug, Clone)]
pub struct ReviewState {
    pub data: FormData,
    pub generated_at: DateTime<Local>,
    pub show_json: bool,
    pub scroll: u16,
}

impl ReviewState {
    pub fn new(data: FormData, generated_at: DateTime<Local>) -> Self {
        Self {
            data,
            generated_at,
            show_json: false,
            scroll: 0,
        }
    }
}

/// Cross-cutting context: theme and persisted preferences.
pub struct SharedCtx {
    pub theme: Box<dyn Theme>,
    pub theme_definition: &'static ThemeDefinition,
    pub preferences: UserPreferences,
    pub show_progress: bool,
}

pub struct App {
    pub store: StepperStore,
    pub wizard: ImpugnacionWizard,
    pub screen: Screen,
    /// Focus ring over the stepper dots and the step content.
    pub focus: Focus,
    pub ctx: SharedCtx,
    pub stepper: StepperViewState,
    pub form: WizardViewState,
    pub review: Option<ReviewState>,
    pub notice: Option<Notice>,
    route: WizardRoute,
}

impl App {
    /// Creates the session: builds the store, then resolves `initial_route`
    /// once. Afterwards the route is only ever derived from the store.
    pub fn new(options: &TuiOptions, preferences: UserPreferences) -> Self {
        let mut store = StepperStore::create(impugnacion_step_configs());
        let mut tramite = options.tramite;
        let mut expediente = options.expediente.clone();
        let mut notice = None;

        if let Some(path) = options.initial_route.as_deref() {
            match WizardRoute::parse(path, &store) {
                Ok(resolved) => {
                    tramite = resolved.route.tipo;
                    if resolved.route.expediente.is_some() {
                        expediente = resolved.route.expediente.clone();
                    }
                    match resolved.apply(&mut store) {
                        Ok(step) => info!(route = path, step, "initial route applied"),
                        Err(error) => warn!(route = path, %error, "initial route could not be applied"),
                    }
                }
                Err(error) => {
                    warn!(route = path, %error, "initial route ignored");
                    notice = Some(Notice::error(format!("Ruta ignorada: {error}")));
                }
            }
        }

        let wizard = ImpugnacionWizard::new(tramite, expediente);
        wizard.refresh_validity(&mut store);

        let preferred = preferences.preferred_theme();
        let LoadedTheme { definition, theme } = theme::load(options.theme.as_deref(), preferred.as_deref());
        debug!(theme = definition.id, "theme loaded");
        let show_progress = preferences.show_progress();
        let route = WizardRoute::from_store(&store, wizard.tramite(), wizard.expediente());

        let mut app = Self {
            store,
            wizard,
            screen: Screen::Wizard,
            focus: Focus::default(),
            ctx: SharedCtx {
                theme,
                theme_definition: definition,
                preferences,
                show_progress,
            },
            stepper: StepperViewState::default(),
            form: WizardViewState::default(),
            review: None,
            notice,
            route,
        };
        app.rebuild_focus();
        app
    }

    /// Rebuilds the focus ring from the activatable stepper dots and the step
    /// content, keeping the previous focus where it still exists.
    pub fn rebuild_focus(&mut self) {
        self.stepper.sync_steps(self.store.current_step(), self.store.total_steps());
        let previous = std::mem::take(&mut self.focus);
        let mut builder = FocusBuilder::new(Some(previous));
        builder.widget(&self.stepper);
        builder.widget(&self.form);
        self.focus = builder.build();
        if self.focus.focused().is_none() {
            self.focus_content();
        }
    }

    pub fn focus_content(&mut self) {
        self.focus.focus(&self.form);
    }

    /// Focuses the dot of the current step.
    pub fn focus_stepper(&mut self) {
        if let Some(flag) = self.stepper.dot_flag(self.store.current_step()) {
            self.focus.focus(flag);
        }
    }

    pub fn stepper_has_focus(&self) -> bool {
        self.stepper.container_focus.get()
    }

    pub fn route(&self) -> &WizardRoute {
        &self.route
    }

    /// Re-derives the route from the store. Returns whether it changed.
    pub fn sync_route(&mut self) -> bool {
        let route = WizardRoute::from_store(&self.store, self.wizard.tramite(), self.wizard.expediente());
        if route == self.route {
            return false;
        }
        debug!(route = %route, "route changed");
        self.route = route;
        true
    }

    /// Advances simulated uploads.
    pub fn update(&mut self, msg: &Msg) -> bool {
        match msg {
            Msg::Tick => self.wizard.tick(&mut self.store),
            Msg::Resize(..) => true,
        }
    }

    /// Whether the runtime should tick quickly.
    pub fn needs_animation(&self, now: std::time::Instant) -> bool {
        self.wizard.is_busy() || self.stepper.collapse_pending(now)
    }

    /// Applies an effect. Returns the exit reason when the session must end.
    pub fn apply_effect(&mut self, effect: Effect) -> Option<ExitReason> {
        match effect {
            Effect::Exit(reason) => return Some(reason),
            Effect::ShowReview(data) => {
                info!(entries = data.len(), "showing review");
                self.review = Some(ReviewState::new(data, Local::now()));
                self.screen = Screen::Review;
            }
            Effect::ReturnToWizard => {
                self.screen = Screen::Wizard;
                self.focus_content();
            }
            Effect::ToggleProgress => {
                self.ctx.show_progress = !self.ctx.show_progress;
                if let Err(error) = self.ctx.preferences.set_show_progress(self.ctx.show_progress) {
                    warn!(%error, "could not persist progress preference");
                }
            }
            Effect::CycleTheme => {
                let definition = catalog::next_truecolor(self.ctx.theme_definition.id);
                let LoadedTheme { definition, theme } = LoadedTheme::from_definition(definition);
                self.ctx.theme = theme;
                self.ctx.theme_definition = definition;
                if let Err(error) = self.ctx.preferences.set_preferred_theme(Some(definition.id.to_string())) {
                    warn!(%error, "could not persist theme preference");
                }
                info!(theme = definition.id, "theme changed");
            }
        }
        None
    }

    /// Ends the session, disposing the store.
    pub fn finish(self, reason: ExitReason) -> SessionOutcome {
        let collected = self.store.dispose();
        match reason {
            ExitReason::Submitted => SessionOutcome::Submitted(collected),
            ExitReason::Abandoned => SessionOutcome::Abandoned,
            ExitReason::Interrupted => SessionOutcome::Interrupted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use impugna_types::TramiteKind;

    fn app_with(options: TuiOptions) -> App {
        App::new(&options, UserPreferences::ephemeral())
    }

    #[test]
    fn initial_route_is_applied_once() {
        let mut app = app_with(TuiOptions {
            initial_route: Some("/registro-impugnacion/autoridad?tipo=coadyuvante&expediente=EXP-9".into()),
            ..Default::default()
        });
        assert_eq!(app.store.current_step(), 3);
        assert_eq!(app.wizard.tramite(), TramiteKind::Coadyuvante);
        assert_eq!(app.wizard.expediente(), Some("EXP-9"));
        assert!(!app.sync_route());

        app.store.set_current_step(0).unwrap();
        assert!(app.sync_route());
        assert_eq!(app.route().path(), "/registro-impugnacion/actores?tipo=coadyuvante&expediente=EXP-9");
    }

    #[test]
    fn bad_route_falls_back_to_first_step_with_a_notice() {
        let app = app_with(TuiOptions {
            tramite: TramiteKind::Ampliacion,
            initial_route: Some("/registro-impugnacion/desconocido".into()),
            ..Default::default()
        });
        assert_eq!(app.store.current_step(), 0);
        assert_eq!(app.wizard.tramite(), TramiteKind::Ampliacion);
        assert!(matches!(app.notice, Some(Notice { level: NoticeLevel::Error, .. })));
    }

    #[test]
    fn effects_switch_screens_and_toggle_preferences() {
        let dir = tempfile::tempdir().unwrap();
        let preferences = UserPreferences::at_path(dir.path().join("preferences.json")).unwrap();
        let mut app = App::new(&TuiOptions::default(), preferences);
        let shown = app.ctx.show_progress;

        assert_eq!(app.apply_effect(Effect::ToggleProgress), None);
        assert_eq!(app.ctx.show_progress, !shown);
        assert_eq!(app.ctx.preferences.show_progress(), !shown);

        assert_eq!(app.apply_effect(Effect::ShowReview(FormData::new())), None);
        assert_eq!(app.screen, Screen::Review);
        assert!(app.review.is_some());
        app.apply_effect(Effect::ReturnToWizard);
        assert_eq!(app.screen, Screen::Wizard);

        assert_eq!(app.apply_effect(Effect::Exit(ExitReason::Abandoned)), Some(ExitReason::Abandoned));
    }

    #[test]
    fn focus_ring_starts_on_the_content_and_follows_the_current_step() {
        let mut app = app_with(TuiOptions::default());
        assert!(app.form.container_focus.get());
        assert!(!app.stepper_has_focus());

        app.wizard.choose_titular(&mut app.store).unwrap();
        app.rebuild_focus();
        app.focus_stepper();
        assert!(app.stepper_has_focus());
        assert_eq!(app.stepper.focused_dot(), Some(3));

        // Back on the first step the focused dot leaves the ring.
        app.store.set_current_step(0).unwrap();
        app.rebuild_focus();
        assert_eq!(app.stepper.focused_dot(), None);
        assert!(app.focus.focused().is_some());
    }

    #[test]
    fn finishing_disposes_the_store() {
        let mut app = app_with(TuiOptions::default());
        app.wizard.choose_titular(&mut app.store).unwrap();
        match app.finish(ExitReason::Submitted) {
            SessionOutcome::Submitted(data) => assert!(data.get("step0").is_some()),
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}
