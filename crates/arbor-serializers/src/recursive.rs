//! Recursive serialization support
//!
//! Depth budgets and the per-call resolution context that tracks which
//! objects are currently being expanded.

use serde::{Deserialize, Serialize};

use crate::object::{ObjectRef, identity};

/// How many nested-serializer levels may still be fully expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
	/// No limit
	#[default]
	Unbounded,
	/// At most this many further levels
	Limited(usize),
}

impl Depth {
	/// True when no further level may be expanded
	///
	/// # Examples
	///
	/// ```
	/// use arbor_serializers::Depth;
	///
	/// assert!(Depth::Limited(0).is_exhausted());
	/// assert!(!Depth::Limited(1).is_exhausted());
	/// assert!(!Depth::Unbounded.is_exhausted());
	/// ```
	pub fn is_exhausted(&self) -> bool {
		matches!(self, Depth::Limited(0))
	}

	/// Budget left for the next level down
	///
	/// # Examples
	///
	/// ```
	/// use arbor_serializers::Depth;
	///
	/// assert_eq!(Depth::Limited(2).descend(), Depth::Limited(1));
	/// assert_eq!(Depth::Limited(0).descend(), Depth::Limited(0));
	/// assert_eq!(Depth::Unbounded.descend(), Depth::Unbounded);
	/// ```
	pub fn descend(self) -> Self {
		match self {
			Depth::Unbounded => Depth::Unbounded,
			Depth::Limited(n) => Depth::Limited(n.saturating_sub(1)),
		}
	}
}

impl From<usize> for Depth {
	fn from(depth: usize) -> Self {
		Depth::Limited(depth)
	}
}

impl From<Option<usize>> for Depth {
	fn from(depth: Option<usize>) -> Self {
		depth.map(Depth::Limited).unwrap_or(Depth::Unbounded)
	}
}

/// Per-call state of one top-level serialization
///
/// Created fresh for every top-level call and threaded by `&mut` through the
/// recursion; it is never stored on a field or serializer.
#[derive(Debug, Clone)]
pub struct ResolutionContext {
	/// Remaining nested-expansion budget at the current level
	remaining_depth: Depth,
	/// Identities of the objects being expanded, outermost first
	active_path: Vec<usize>,
}

impl ResolutionContext {
	/// Create a new resolution context
	///
	/// # Examples
	///
	/// ```
	/// use arbor_serializers::{Depth, ResolutionContext};
	///
	/// let context = ResolutionContext::new(Depth::Limited(3));
	/// assert_eq!(context.remaining_depth(), Depth::Limited(3));
	/// assert_eq!(context.active_depth(), 0);
	/// ```
	pub fn new(depth: Depth) -> Self {
		Self {
			remaining_depth: depth,
			active_path: Vec::new(),
		}
	}

	/// Get the remaining depth
	pub fn remaining_depth(&self) -> Depth {
		self.remaining_depth
	}

	/// Check if nested serializers may still expand
	pub fn can_go_deeper(&self) -> bool {
		!self.remaining_depth.is_exhausted()
	}

	/// Number of objects currently being expanded
	pub fn active_depth(&self) -> usize {
		self.active_path.len()
	}

	/// Check whether `object` is already being expanded on the current path
	pub fn is_active(&self, object: &ObjectRef) -> bool {
		self.active_path.contains(&identity(object))
	}

	/// Expand `object` inside `f`, keeping it on the active path meanwhile
	///
	/// The object is popped again whether `f` succeeds or fails. The same
	/// object may be pushed more than once (a whole-object field re-projects
	/// its parent), so the path is a stack rather than a set.
	///
	/// # Examples
	///
	/// ```
	/// use arbor_serializers::{Depth, Record, ResolutionContext};
	///
	/// let user = Record::new("User").into_ref();
	/// let mut context = ResolutionContext::new(Depth::Unbounded);
	///
	/// let seen = context.visit_with(&user, |ctx| ctx.is_active(&user));
	/// assert!(seen);
	/// assert!(!context.is_active(&user));
	/// ```
	pub fn visit_with<F, R>(&mut self, object: &ObjectRef, f: F) -> R
	where
		F: FnOnce(&mut Self) -> R,
	{
		self.active_path.push(identity(object));
		let result = f(self);
		self.active_path.pop();
		result
	}

	/// Run `f` one nested level down, restoring the budget afterwards
	///
	/// # Examples
	///
	/// ```
	/// use arbor_serializers::{Depth, ResolutionContext};
	///
	/// let mut context = ResolutionContext::new(Depth::Limited(1));
	/// context.descend_with(|child| {
	///     assert_eq!(child.remaining_depth(), Depth::Limited(0));
	///     assert!(!child.can_go_deeper());
	/// });
	/// assert_eq!(context.remaining_depth(), Depth::Limited(1));
	/// ```
	pub fn descend_with<F, R>(&mut self, f: F) -> R
	where
		F: FnOnce(&mut Self) -> R,
	{
		let next = self.remaining_depth.descend();
		self.with_depth(next, f)
	}

	/// Run `f` with a replaced depth budget, restoring it afterwards
	pub fn with_depth<F, R>(&mut self, depth: Depth, f: F) -> R
	where
		F: FnOnce(&mut Self) -> R,
	{
		let saved = std::mem::replace(&mut self.remaining_depth, depth);
		let result = f(self);
		self.remaining_depth = saved;
		result
	}
}

impl Default for ResolutionContext {
	fn default() -> Self {
		Self::new(Depth::Unbounded)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::object::Record;
	use rstest::rstest;

	#[rstest]
	fn test_context_new() {
		let context = ResolutionContext::new(Depth::Limited(3));
		assert_eq!(context.remaining_depth(), Depth::Limited(3));
		assert!(context.can_go_deeper());
		assert_eq!(context.active_depth(), 0);
	}

	#[rstest]
	fn test_context_default_is_unbounded() {
		let context = ResolutionContext::default();
		assert_eq!(context.remaining_depth(), Depth::Unbounded);
		assert!(context.can_go_deeper());
	}

	#[rstest]
	fn test_descend_chain() {
		let mut context = ResolutionContext::new(Depth::Limited(2));
		context.descend_with(|child| {
			assert!(child.can_go_deeper());
			child.descend_with(|grandchild| {
				assert!(!grandchild.can_go_deeper());
				grandchild.descend_with(|below| {
					assert_eq!(below.remaining_depth(), Depth::Limited(0));
				});
			});
			assert_eq!(child.remaining_depth(), Depth::Limited(1));
		});
		assert_eq!(context.remaining_depth(), Depth::Limited(2));
	}

	#[rstest]
	fn test_unbounded_never_exhausts() {
		let mut context = ResolutionContext::new(Depth::Unbounded);
		context.descend_with(|child| {
			child.descend_with(|grandchild| assert!(grandchild.can_go_deeper()))
		});
	}

	#[rstest]
	fn test_with_depth_restores() {
		let mut context = ResolutionContext::new(Depth::Limited(5));
		let inside = context.with_depth(Depth::Limited(0), |ctx| ctx.remaining_depth());
		assert_eq!(inside, Depth::Limited(0));
		assert_eq!(context.remaining_depth(), Depth::Limited(5));
	}

	#[rstest]
	fn test_visit_with_detects_active_objects() {
		let user = Record::new("User").into_ref();
		let other = Record::new("User").into_ref();
		let mut context = ResolutionContext::default();

		context.visit_with(&user, |ctx| {
			assert!(ctx.is_active(&user));
			assert!(!ctx.is_active(&other));
			assert_eq!(ctx.active_depth(), 1);
		});
		assert!(!context.is_active(&user));
	}

	#[rstest]
	fn test_visit_with_pops_on_error() {
		let user = Record::new("User").into_ref();
		let mut context = ResolutionContext::default();

		let result: Result<(), &str> = context.visit_with(&user, |_ctx| Err("boom"));
		assert!(result.is_err());
		assert!(!context.is_active(&user));
	}

	#[rstest]
	fn test_same_object_nested_twice() {
		let user = Record::new("User").into_ref();
		let mut context = ResolutionContext::default();

		context.visit_with(&user, |ctx| {
			ctx.visit_with(&user, |inner| assert_eq!(inner.active_depth(), 2));
			// the outer visit is still in effect
			assert!(ctx.is_active(&user));
		});
		assert_eq!(context.active_depth(), 0);
	}

	#[rstest]
	#[case(None, Depth::Unbounded)]
	#[case(Some(0), Depth::Limited(0))]
	#[case(Some(3), Depth::Limited(3))]
	fn test_depth_from_option(#[case] input: Option<usize>, #[case] expected: Depth) {
		assert_eq!(Depth::from(input), expected);
	}
}
