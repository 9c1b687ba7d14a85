// self
use crate::{_prelude::*, obs::GuardOp};

/// A span builder used by guard operations.
#[derive(Clone, Debug)]
pub struct GuardSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl GuardSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(op: GuardOp, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("storefront_guard.op", op = op.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (op, stage);

			Self {}
		}
	}

	/// Enters the span for the remainder of the calling scope.
	pub fn entered(self) -> GuardSpanGuard {
		#[cfg(feature = "tracing")]
		{
			GuardSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			GuardSpanGuard {}
		}
	}
}

/// RAII guard returned by [`GuardSpan::entered`].
pub struct GuardSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for GuardSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("GuardSpanGuard(..)")
	}
}

/// Emits a `debug` event under the `storefront_guard` target when tracing is enabled.
macro_rules! guard_debug {
	($($arg:tt)+) => {
		#[cfg(feature = "tracing")]
		{
			::tracing::debug!(target: "storefront_guard", $($arg)+);
		}
	};
}
pub(crate) use guard_debug;
