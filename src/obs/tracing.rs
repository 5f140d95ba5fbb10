// crates.io
use tracing::{Span, span::EnteredSpan};
// self
use crate::{_prelude::*, obs::BridgeOp};

/// A span builder used by bridge operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	span: Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(op: BridgeOp, stage: &'static str) -> Self {
		let span = tracing::info_span!("session_bridge.op", op = op.as_str(), stage);

		Self { span }
	}

	/// Enters the span for the rest of the synchronous operation.
	pub fn entered(self) -> OpSpanGuard {
		OpSpanGuard { _guard: self.span.entered() }
	}
}

/// RAII guard returned by [`OpSpan::entered`].
pub struct OpSpanGuard {
	_guard: EnteredSpan,
}
impl Debug for OpSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("OpSpanGuard(..)")
	}
}
