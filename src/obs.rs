//! Observability helpers for bridge operations.
//!
//! Every operation runs inside a `tracing` span named `session_bridge.op` carrying the `op`
//! and `stage` fields. Tokens and nonces are only ever logged as fingerprints.
//!
//! # Feature Flags
//!
//! - Enable `metrics` to increment the `session_bridge_op_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Bridge operations observed by spans and metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BridgeOp {
	/// Nonce issuance before the widget is shown.
	BeginLogin,
	/// Redirect handling.
	CompleteLogin,
	/// Session lookup on either render path.
	CurrentSession,
	/// Logout and broadcast.
	EndSession,
}
impl BridgeOp {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			BridgeOp::BeginLogin => "begin_login",
			BridgeOp::CompleteLogin => "complete_login",
			BridgeOp::CurrentSession => "current_session",
			BridgeOp::EndSession => "end_session",
		}
	}
}
impl Display for BridgeOp {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to a bridge operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Completion without persistence or verification because storage was unavailable.
	Degraded,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Degraded => "degraded",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
