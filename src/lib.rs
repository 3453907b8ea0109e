//! Fencepost - offset-barrier plan search for a cost-based query planner.
//!
//! Fencepost sits in front of a planner. For every `EXISTS` subquery it
//! asks the planner what the query would cost with an `OFFSET 0` barrier
//! inside that subquery, and keeps the cheapest variant when it clears a
//! configurable cost ratio.

#![forbid(unsafe_code)]

mod host;

pub use common_config as config;
pub use common_error as error;
pub use fencepost_logical as logical;
pub use fencepost_optimizer as optimizer;

pub use host::{PlannerHost, Registration};

use common_config::FencepostConfig;
use common_error::FenceResult;
use fencepost_optimizer::BarrierSearch;
use log::info;

/// Fencepost version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Validate `config` and install a barrier search as `host`'s entry point.
pub fn install_barrier_search(
    host: &PlannerHost,
    config: &FencepostConfig,
) -> FenceResult<Registration> {
    config.validate()?;
    let search = config.barrier_search.clone();
    info!(
        "installing barrier search (enabled={}, threshold={})",
        search.enabled, search.threshold
    );
    host.install(|next| BarrierSearch::with_config(next, search))
}
