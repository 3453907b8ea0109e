//! Process-wide planner entry point.
//!
//! The host owns the planner that every request goes through. Installing a
//! planner hands it the current entry point as its `next` planner; the
//! matching uninstall puts that entry point back.

use std::sync::{Arc, RwLock};

use common_error::{FenceError, FenceResult};
use fencepost_logical::Query;
use fencepost_optimizer::{Plan, PlanRequest, Planner};
use log::debug;

/// Proof of one [`PlannerHost::install`] call, consumed by the matching
/// [`PlannerHost::uninstall`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping a registration makes its planner impossible to uninstall"]
pub struct Registration {
    id: u64,
}

struct Installed {
    id: u64,
    previous: Arc<dyn Planner>,
}

struct HostState {
    current: Arc<dyn Planner>,
    installed: Vec<Installed>,
    next_id: u64,
}

/// Owner of the current planning entry point.
pub struct PlannerHost {
    state: RwLock<HostState>,
}

impl PlannerHost {
    /// Create a host whose entry point is `standard`.
    pub fn new(standard: Arc<dyn Planner>) -> Self {
        Self {
            state: RwLock::new(HostState {
                current: standard,
                installed: Vec::new(),
                next_id: 0,
            }),
        }
    }

    /// Make `factory(current)` the entry point.
    ///
    /// The factory runs without holding the host lock, so it may query the
    /// host. Installs racing with it fail with `InvalidParameter`.
    pub fn install<F, P>(&self, factory: F) -> FenceResult<Registration>
    where
        F: FnOnce(Arc<dyn Planner>) -> P,
        P: Planner + 'static,
    {
        let previous = self.entry_point()?;
        let planner: Arc<dyn Planner> = Arc::new(factory(Arc::clone(&previous)));

        let mut state = self.write()?;
        if !Arc::ptr_eq(&state.current, &previous) {
            return Err(FenceError::invalid_parameter(
                "entry point changed while the planner was being built",
            ));
        }
        let id = state.next_id;
        state.next_id += 1;
        state.installed.push(Installed { id, previous });
        state.current = planner;

        debug!("installed planner #{id}, {} active", state.installed.len());
        Ok(Registration { id })
    }

    /// Restore the entry point that was current before `registration`.
    ///
    /// Planners must be uninstalled in reverse installation order.
    pub fn uninstall(&self, registration: Registration) -> FenceResult<()> {
        let mut state = self.write()?;
        let Some(top) = state.installed.last() else {
            return Err(FenceError::invalid_parameter(format!(
                "planner #{} is not installed",
                registration.id
            )));
        };
        if top.id != registration.id {
            return Err(FenceError::invalid_parameter(format!(
                "planner #{} must be uninstalled before #{}",
                top.id, registration.id
            )));
        }

        if let Some(installed) = state.installed.pop() {
            state.current = installed.previous;
        }
        debug!("uninstalled planner #{}", registration.id);
        Ok(())
    }

    /// The current entry point.
    pub fn entry_point(&self) -> FenceResult<Arc<dyn Planner>> {
        let state = self
            .state
            .read()
            .map_err(|_| FenceError::internal("planner host lock poisoned"))?;
        Ok(Arc::clone(&state.current))
    }

    /// Number of installed planners.
    pub fn installed(&self) -> FenceResult<usize> {
        self.state
            .read()
            .map(|state| state.installed.len())
            .map_err(|_| FenceError::internal("planner host lock poisoned"))
    }

    fn write(&self) -> FenceResult<std::sync::RwLockWriteGuard<'_, HostState>> {
        self.state
            .write()
            .map_err(|_| FenceError::internal("planner host lock poisoned"))
    }
}

impl Planner for PlannerHost {
    fn plan(&self, query: &Arc<Query>, request: &PlanRequest) -> FenceResult<Plan> {
        self.entry_point()?.plan(query, request)
    }
}
