//! Route projection for the impugnación wizard.
//!
//! The store is the only source of truth for the active step. A
//! [`WizardRoute`] is recomputed from it whenever the route is shown; the
//! reverse direction exists only for the initial route handed in at start-up.

use std::fmt;

use impugna_types::TramiteKind;
use url::Url;

use crate::{RouteError, StepperStore};

/// First path segment of every wizard route.
pub const ROUTE_PREFIX: &str = "registro-impugnacion";

const ROUTE_BASE: &str = "impugna://wizard/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardRoute {
    pub step_id: String,
    pub tipo: TramiteKind,
    pub expediente: Option<String>,
}

impl WizardRoute {
    /// Projects the active step of `store` into a route.
    pub fn from_store(store: &StepperStore, tipo: TramiteKind, expediente: Option<&str>) -> Self {
        let step_id = store
            .step_config(store.current_step())
            .map(|config| config.id.clone())
            .unwrap_or_default();
        Self {
            step_id,
            tipo,
            expediente: expediente.map(str::to_string),
        }
    }

    /// Path plus query, e.g. `/registro-impugnacion/autoridad?tipo=registro`.
    pub fn path(&self) -> String {
        let mut url = match Url::parse(ROUTE_BASE) {
            Ok(url) => url,
            Err(_) => return format!("/{ROUTE_PREFIX}/{}", self.step_id),
        };
        url.set_path(&format!("/{ROUTE_PREFIX}/{}", self.step_id));
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("tipo", self.tipo.as_str());
            if let Some(expediente) = &self.expediente {
                query.append_pair("expediente", expediente);
            }
        }
        let mut rendered = url.path().to_string();
        if let Some(query) = url.query() {
            rendered.push('?');
            rendered.push_str(query);
        }
        rendered
    }

    /// Resolves a route string against the steps configured in `store`.
    ///
    /// A bare `/registro-impugnacion` resolves to the first step. Missing
    /// `tipo` defaults to `registro`.
    pub fn parse(path: &str, store: &StepperStore) -> Result<ResolvedRoute, RouteError> {
        let base = Url::parse(ROUTE_BASE).map_err(|err| RouteError::Malformed {
            path: path.to_string(),
            reason: err.to_string(),
        })?;
        let url = base.join(path.trim()).map_err(|err| RouteError::Malformed {
            path: path.to_string(),
            reason: err.to_string(),
        })?;
        if url.scheme() != base.scheme() || url.host_str() != base.host_str() {
            return Err(RouteError::ForeignPrefix { path: path.to_string() });
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|segment| !segment.is_empty()).collect())
            .unwrap_or_default();
        let step_id = match segments.as_slice() {
            [prefix] if *prefix == ROUTE_PREFIX => None,
            [prefix, step] if *prefix == ROUTE_PREFIX => Some(*step),
            [prefix, ..] if *prefix == ROUTE_PREFIX => {
                return Err(RouteError::Malformed {
                    path: path.to_string(),
                    reason: "too many path segments".into(),
                });
            }
            _ => return Err(RouteError::ForeignPrefix { path: path.to_string() }),
        };

        let step_index = match step_id {
            None => 0,
            Some(step) => store
                .index_of(step)
                .ok_or_else(|| RouteError::UnknownStep { step: step.to_string() })?,
        };

        let mut tipo = TramiteKind::default();
        let mut expediente = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "tipo" => {
                    tipo = value
                        .parse()
                        .map_err(|_| RouteError::UnknownTramite(value.to_string()))?;
                }
                "expediente" if !value.trim().is_empty() => expediente = Some(value.to_string()),
                _ => {}
            }
        }

        let step_id = store
            .step_config(step_index)
            .map(|config| config.id.clone())
            .unwrap_or_default();
        Ok(ResolvedRoute {
            step_index,
            route: WizardRoute {
                step_id,
                tipo,
                expediente,
            },
        })
    }
}

impl fmt::Display for WizardRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// A parsed route together with the index its step occupies in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub step_index: usize,
    pub route: WizardRoute,
}

impl ResolvedRoute {
    /// Activates the resolved step. Applied once at start-up.
    pub fn apply(&self, store: &mut StepperStore) -> Result<usize, crate::NavigationError> {
        store.set_current_step(self.step_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impugnacion_step_configs;

    fn store() -> StepperStore {
        StepperStore::create(impugnacion_step_configs())
    }

    #[test]
    fn route_tracks_the_store() {
        let mut store = store();
        store.set_current_step(3).unwrap();

        let route = WizardRoute::from_store(&store, TramiteKind::Ampliacion, Some("SUP-JDC-12/2025"));
        assert_eq!(
            route.path(),
            "/registro-impugnacion/autoridad?tipo=ampliacion&expediente=SUP-JDC-12%2F2025"
        );
    }

    #[test]
    fn parse_resolves_step_and_query() {
        let store = store();
        let resolved =
            WizardRoute::parse("/registro-impugnacion/impugnacion?tipo=coadyuvante&expediente=EXP-7", &store).unwrap();

        assert_eq!(resolved.step_index, 4);
        assert_eq!(resolved.route.tipo, TramiteKind::Coadyuvante);
        assert_eq!(resolved.route.expediente.as_deref(), Some("EXP-7"));
    }

    #[test]
    fn bare_prefix_resolves_to_first_step() {
        let resolved = WizardRoute::parse("/registro-impugnacion", &store()).unwrap();
        assert_eq!(resolved.step_index, 0);
        assert_eq!(resolved.route.step_id, "actores");
        assert_eq!(resolved.route.tipo, TramiteKind::Registro);
    }

    #[test]
    fn parse_rejects_unknown_routes() {
        let store = store();
        assert_eq!(
            WizardRoute::parse("/registro-impugnacion/firma", &store),
            Err(RouteError::UnknownStep { step: "firma".into() })
        );
        assert!(matches!(
            WizardRoute::parse("/amicus-curiae/datos", &store),
            Err(RouteError::ForeignPrefix { .. })
        ));
        assert_eq!(
            WizardRoute::parse("/registro-impugnacion/actores?tipo=amicus", &store),
            Err(RouteError::UnknownTramite("amicus".into()))
        );
    }

    #[test]
    fn apply_moves_the_store_once() {
        let mut store = store();
        let resolved = WizardRoute::parse("/registro-impugnacion/evidencia", &store).unwrap();
        assert_eq!(resolved.apply(&mut store), Ok(5));
        assert!(store.is_step_visited(5));
    }
}
