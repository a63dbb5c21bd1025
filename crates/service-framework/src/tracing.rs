//! # Observability & Tracing
//!
//! The framework logs through the `tracing` crate and never installs a subscriber on
//! its own. Applications opt in with [`setup_tracing`].
//!
//! ## What Gets Traced
//!
//! - **Definitions**: `Service defined` (debug) with the field count and parent name.
//! - **Invocations**: every call runs inside a `service` span carrying the service
//!   name; `Call` (debug) records the attributes, `Completed` (info) the outcome.
//! - **Callbacks**: entering around hooks and running before/after hooks (trace).
//! - **Failures & errors**: `Failed` (debug) for declared failures, `Rescued` (debug)
//!   with the matching category, `Unrescued error` (warn) when an error escapes.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Outcomes only
//! RUST_LOG=info cargo run
//!
//! # Attributes, failures and rescues
//! RUST_LOG=debug cargo run
//!
//! # Every hook
//! RUST_LOG=service_framework=trace cargo run
//! ```
//!
//! With `RUST_LOG=debug` a failed order looks like:
//!
//! ```text
//! DEBUG service: Call attributes={"product_id": Number(1), "quantity": Number(500), ...} service="PlaceOrder"
//! DEBUG service: Failed service="PlaceOrder"
//!  INFO service: Completed success=false service="PlaceOrder"
//! ```

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once; only the first call installs anything.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
