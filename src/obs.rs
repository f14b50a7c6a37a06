//! Observability helpers for relay stages.
//!
//! - Every stage runs inside a `lead_relay.flow` span carrying the `stage` field.
//! - Enable the `metrics` feature to increment the `lead_relay_stage_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.
//! - [`init_tracing`] installs the process-wide subscriber for the binary.

mod metrics;
mod span;
mod subscriber;

pub use metrics::*;
pub use span::*;
pub use subscriber::*;

// self
use crate::_prelude::*;

/// Relay stages observed by spans and metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
	/// Obtaining an access token (cache lookup plus exchange).
	Token,
	/// Refresh-token exchange against the OAuth endpoint.
	Exchange,
	/// Create-lead call against the CRM.
	Submit,
	/// Whole inbound request.
	Relay,
}
impl Stage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Stage::Token => "token",
			Stage::Exchange => "exchange",
			Stage::Submit => "submit",
			Stage::Relay => "relay",
		}
	}
}
impl Display for Stage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageOutcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl StageOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageOutcome::Attempt => "attempt",
			StageOutcome::Success => "success",
			StageOutcome::Failure => "failure",
		}
	}
}
impl Display for StageOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
