//! HTTP API module for the crew roster engine.
//!
//! A thin axum adapter over the rotation, coverage, swap and overtime
//! engines. Errors render as `{code, message, details}` with a status
//! chosen by error class.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    ApproveSwapRequest, CancelSwapRequest, CoverageRequest, DenySwapRequest, MaterializeRequest,
    OvertimeImportRequest, OvertimeParams, RotationOverlay,
};
pub use response::{
    ApiError, ApiErrorResponse, ImportResponse, MaterializeResponse, RotationResponse, SwapDetails,
};
pub use state::AppState;
