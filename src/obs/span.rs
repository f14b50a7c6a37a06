// crates.io
use tracing::{Instrument, Span, instrument::Instrumented};
// self
use crate::{_prelude::*, obs::Stage};

/// A span builder used by relay stages.
#[derive(Clone, Debug)]
pub struct StageSpan {
	span: Span,
}
impl StageSpan {
	/// Creates a new span tagged with the provided stage + call site.
	pub fn new(stage: Stage, site: &'static str) -> Self {
		let span = tracing::info_span!("lead_relay.flow", stage = stage.as_str(), site);

		Self { span }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = StageSpan::new(Stage::Token, "instrument_wraps_future");
		let value = StageSpan::instrument(&span, async { 42 }).await;

		assert_eq!(value, 42);
	}
}
