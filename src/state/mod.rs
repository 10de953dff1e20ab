pub mod filter_state;
pub mod session;

pub use filter_state::FilterState;
pub use session::{
    recompute_in_background, BatchScope, FacetSession, FacetView, RecomputeRequest,
    RecomputeResult, SharedSession,
};
