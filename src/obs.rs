//! Optional observability helpers for strategy stages.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `meveto_strategy.stage` with the `stage`
//!   (login stage) and `op` (call site) fields.
//! - Enable `metrics` to increment the `meveto_strategy_stage_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Login stages observed by the strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthStage {
	/// Authorization redirect URL construction.
	Authorize,
	/// Authorization-code exchange against the token endpoint.
	Exchange,
	/// Authenticated user-profile fetch.
	UserProfile,
	/// Application verify-hook resolution.
	Verify,
}
impl AuthStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthStage::Authorize => "authorize",
			AuthStage::Exchange => "exchange",
			AuthStage::UserProfile => "user_profile",
			AuthStage::Verify => "verify",
		}
	}
}
impl Display for AuthStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageOutcome {
	/// Entry to a strategy stage.
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
