//! Bounded retry policy applied to create-lead attempts.

// self
use crate::{_prelude::*, submit::SubmitError};

/// Decides whether a failed attempt may be repeated.
///
/// `attempt` is 1-based: after the first failure `should_retry(1, ..)` is asked.
pub struct RetryPolicy<E> {
	max_attempts: u32,
	predicate: fn(&E) -> bool,
}
impl<E> RetryPolicy<E> {
	/// Creates a policy allowing at most `max_attempts` attempts (at least one) and retrying only
	/// failures matching `predicate`.
	pub fn new(max_attempts: u32, predicate: fn(&E) -> bool) -> Self {
		Self { max_attempts: max_attempts.max(1), predicate }
	}

	/// Upper bound on attempts, including the first.
	pub fn max_attempts(&self) -> u32 {
		self.max_attempts
	}

	/// Returns `true` when the failure of attempt number `attempt` warrants another attempt.
	pub fn should_retry(&self, attempt: u32, err: &E) -> bool {
		attempt < self.max_attempts && (self.predicate)(err)
	}
}
impl RetryPolicy<SubmitError> {
	/// Attempts allowed by [`RetryPolicy::on_unauthorized`].
	pub const UNAUTHORIZED_MAX_ATTEMPTS: u32 = 2;

	/// Retries once, and only when the CRM answered 401.
	pub fn on_unauthorized() -> Self {
		Self::new(Self::UNAUTHORIZED_MAX_ATTEMPTS, SubmitError::is_unauthorized)
	}
}
impl Default for RetryPolicy<SubmitError> {
	fn default() -> Self {
		Self::on_unauthorized()
	}
}
impl<E> Clone for RetryPolicy<E> {
	fn clone(&self) -> Self {
		*self
	}
}
impl<E> Copy for RetryPolicy<E> {}
impl<E> Debug for RetryPolicy<E> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RetryPolicy").field("max_attempts", &self.max_attempts).finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn rejected(status: StatusCode) -> SubmitError {
		SubmitError::Rejected { status, body: String::new() }
	}

	#[test]
	fn unauthorized_is_retried_exactly_once() {
		let policy = RetryPolicy::on_unauthorized();
		let err = rejected(StatusCode::UNAUTHORIZED);

		assert!(policy.should_retry(1, &err));
		assert!(!policy.should_retry(2, &err));
	}

	#[test]
	fn other_failures_are_not_retried() {
		let policy = RetryPolicy::default();

		assert!(!policy.should_retry(1, &rejected(StatusCode::BAD_REQUEST)));
		assert!(!policy.should_retry(1, &rejected(StatusCode::INTERNAL_SERVER_ERROR)));
		assert!(!policy.should_retry(1, &SubmitError::Timeout));
	}

	#[test]
	fn zero_attempts_is_clamped_to_one() {
		let policy = RetryPolicy::<SubmitError>::new(0, |_| true);

		assert_eq!(policy.max_attempts(), 1);
		assert!(!policy.should_retry(1, &SubmitError::Timeout));
	}
}
