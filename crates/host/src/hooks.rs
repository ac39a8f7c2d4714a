//! Filter and action dispatch.
//!
//! Bindings are kept per tag, sorted by ascending priority and then by
//! registration order. The table is published as an immutable snapshot:
//! dispatch loads the current snapshot and releases it before invoking any
//! callback, so callbacks are free to add or remove bindings and to re-enter
//! dispatch. Changes made during a dispatch take effect on the next one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap as HashMap;
use serde_json::Value;

use crate::error::BoxError;

/// Filter callback. Receives the filtered value first, followed by up to
/// `arity - 1` extra arguments, and returns the replacement value.
pub type Filter = Arc<dyn Fn(&[Value]) -> Result<Value, BoxError> + Send + Sync>;

/// Action callback. Receives up to `arity` arguments.
pub type Action = Arc<dyn Fn(&[Value]) -> Result<(), BoxError> + Send + Sync>;

/// Handle to a single binding, used for removal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(u64);

#[derive(Clone)]
enum Callback {
	Filter(Filter),
	Action(Action),
}

#[derive(Clone)]
struct Binding {
	id: HookId,
	priority: i32,
	arity: usize,
	callback: Callback,
}

#[derive(Clone, Default)]
struct HooksSnapshot {
	by_tag: HashMap<Box<str>, Vec<Binding>>,
	tag_of: HashMap<HookId, Box<str>>,
}

impl HooksSnapshot {
	fn insert(&mut self, tag: &str, binding: Binding) {
		let id = binding.id;
		let list = self.by_tag.entry(Box::from(tag)).or_default();
		let pos = list.partition_point(|b| b.priority <= binding.priority);
		list.insert(pos, binding);
		self.tag_of.insert(id, Box::from(tag));
	}

	fn remove(&mut self, id: HookId) -> bool {
		let Some(tag) = self.tag_of.remove(&id) else {
			return false;
		};
		if let Some(list) = self.by_tag.get_mut(&tag) {
			list.retain(|b| b.id != id);
			if list.is_empty() {
				self.by_tag.remove(&tag);
			}
		}
		true
	}
}

/// Extension-point dispatcher shared by the host and everything hooked into it.
pub struct Hooks {
	snap: ArcSwap<HooksSnapshot>,
	next_id: AtomicU64,
}

impl Default for Hooks {
	fn default() -> Self {
		Self::new()
	}
}

impl Hooks {
	pub fn new() -> Self {
		Self {
			snap: ArcSwap::from_pointee(HooksSnapshot::default()),
			next_id: AtomicU64::new(1),
		}
	}

	/// Binds a filter to `tag`. Lower priorities run first.
	pub fn add_filter(&self, tag: &str, priority: i32, arity: usize, filter: Filter) -> HookId {
		self.insert(tag, priority, arity, Callback::Filter(filter))
	}

	/// Binds an action to `tag`. Lower priorities run first.
	pub fn add_action(&self, tag: &str, priority: i32, arity: usize, action: Action) -> HookId {
		self.insert(tag, priority, arity, Callback::Action(action))
	}

	/// Removes a binding. Returns `false` if it was already gone.
	pub fn remove(&self, id: HookId) -> bool {
		self.update(|snap| snap.remove(id))
	}

	/// Whether anything is bound to `tag`.
	pub fn has_filter(&self, tag: &str) -> bool {
		self.snap.load().by_tag.contains_key(tag)
	}

	/// Number of bindings on `tag`.
	pub fn count(&self, tag: &str) -> usize {
		self.snap.load().by_tag.get(tag).map_or(0, Vec::len)
	}

	/// Runs every filter bound to `tag` over `value`.
	///
	/// The first callback error stops the chain and is returned as-is.
	pub fn apply_filters(&self, tag: &str, value: Value, args: &[Value]) -> Result<Value, BoxError> {
		let snap = self.snap.load_full();
		let Some(bindings) = snap.by_tag.get(tag) else {
			return Ok(value);
		};

		let mut value = value;
		for binding in bindings {
			let Callback::Filter(filter) = &binding.callback else {
				continue;
			};
			let extra = binding.arity.max(1) - 1;
			let mut call = Vec::with_capacity(1 + extra.min(args.len()));
			call.push(std::mem::take(&mut value));
			call.extend(args.iter().take(extra).cloned());
			value = filter(&call)?;
		}
		Ok(value)
	}

	/// Runs every action bound to `tag`.
	pub fn do_action(&self, tag: &str, args: &[Value]) -> Result<(), BoxError> {
		let snap = self.snap.load_full();
		let Some(bindings) = snap.by_tag.get(tag) else {
			return Ok(());
		};

		for binding in bindings {
			let Callback::Action(action) = &binding.callback else {
				continue;
			};
			let take = binding.arity.min(args.len());
			action(&args[..take])?;
		}
		Ok(())
	}

	fn insert(&self, tag: &str, priority: i32, arity: usize, callback: Callback) -> HookId {
		let id = HookId(self.next_id.fetch_add(1, Ordering::Relaxed));
		let binding = Binding {
			id,
			priority,
			arity,
			callback,
		};
		self.update(|snap| snap.insert(tag, binding.clone()));
		tracing::trace!(domain = "hooks", tag, priority, arity, "bound");
		id
	}

	fn update<R>(&self, mut f: impl FnMut(&mut HooksSnapshot) -> R) -> R {
		loop {
			let cur = self.snap.load_full();
			let mut next = (*cur).clone();
			let out = f(&mut next);

			let prev = self.snap.compare_and_swap(&cur, Arc::new(next));
			if Arc::ptr_eq(&prev, &cur) {
				return out;
			}
		}
	}
}

/// Scoped view over a [`Hooks`] dispatcher.
///
/// Remembers every binding made through it so a component can tear down
/// exactly its own callbacks with [`Hook::deregister`].
pub struct Hook {
	hooks: Arc<Hooks>,
	bound: Mutex<Vec<HookId>>,
}

impl Hook {
	pub fn new(hooks: Arc<Hooks>) -> Self {
		Self {
			hooks,
			bound: Mutex::new(Vec::new()),
		}
	}

	pub fn add_filter<F>(&self, tag: &str, priority: i32, arity: usize, filter: F) -> HookId
	where
		F: Fn(&[Value]) -> Result<Value, BoxError> + Send + Sync + 'static,
	{
		let id = self.hooks.add_filter(tag, priority, arity, Arc::new(filter));
		self.bound.lock().push(id);
		id
	}

	pub fn add_action<F>(&self, tag: &str, priority: i32, arity: usize, action: F) -> HookId
	where
		F: Fn(&[Value]) -> Result<(), BoxError> + Send + Sync + 'static,
	{
		let id = self.hooks.add_action(tag, priority, arity, Arc::new(action));
		self.bound.lock().push(id);
		id
	}

	/// Removes every binding made through this scope. Returns how many were live.
	pub fn deregister(&self) -> usize {
		let ids = std::mem::take(&mut *self.bound.lock());
		ids.into_iter().filter(|&id| self.hooks.remove(id)).count()
	}

	pub fn len(&self) -> usize {
		self.bound.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.bound.lock().is_empty()
	}

	/// The dispatcher this scope binds into.
	pub fn dispatcher(&self) -> &Arc<Hooks> {
		&self.hooks
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	fn append(suffix: &'static str) -> Filter {
		Arc::new(move |args: &[Value]| -> Result<Value, BoxError> {
			let base = args[0].as_str().unwrap_or_default();
			Ok(Value::from(format!("{base}{suffix}")))
		})
	}

	#[test]
	fn filters_run_by_priority_then_registration_order() {
		let hooks = Hooks::new();
		hooks.add_filter("title", 20, 1, append("c"));
		hooks.add_filter("title", 10, 1, append("a"));
		hooks.add_filter("title", 20, 1, append("d"));
		hooks.add_filter("title", 10, 1, append("b"));

		let out = hooks.apply_filters("title", json!(""), &[]).unwrap();
		assert_eq!(out, json!("abcd"));
	}

	#[test]
	fn unbound_tag_returns_value_untouched() {
		let hooks = Hooks::new();
		assert_eq!(hooks.apply_filters("nothing", json!(3), &[]).unwrap(), json!(3));
		assert!(hooks.do_action("nothing", &[]).is_ok());
	}

	#[test]
	fn arity_limits_arguments() {
		let hooks = Hooks::new();
		hooks.add_filter(
			"probe",
			10,
			2,
			Arc::new(|args: &[Value]| -> Result<Value, BoxError> { Ok(json!(args.len())) }),
		);
		let out = hooks.apply_filters("probe", json!(null), &[json!(1), json!(2), json!(3)]).unwrap();
		assert_eq!(out, json!(2));
	}

	#[test]
	fn filter_error_stops_the_chain() {
		let hooks = Hooks::new();
		hooks.add_filter(
			"x",
			1,
			1,
			Arc::new(|_: &[Value]| -> Result<Value, BoxError> { Err("boom".into()) }),
		);
		hooks.add_filter("x", 2, 1, append("never"));
		let err = hooks.apply_filters("x", json!(""), &[]).unwrap_err();
		assert_eq!(err.to_string(), "boom");
	}

	#[test]
	fn actions_receive_arguments() {
		let hooks = Hooks::new();
		let seen = Arc::new(Mutex::new(Vec::new()));
		let sink = seen.clone();
		hooks.add_action(
			"saved",
			10,
			2,
			Arc::new(move |args: &[Value]| -> Result<(), BoxError> {
				sink.lock().push(args.to_vec());
				Ok(())
			}),
		);
		hooks.do_action("saved", &[json!("a"), json!(1), json!(true)]).unwrap();
		assert_eq!(*seen.lock(), vec![vec![json!("a"), json!(1)]]);
	}

	#[test]
	fn scope_deregisters_only_its_own_bindings() {
		let hooks = Arc::new(Hooks::new());
		let outside = hooks.add_filter("x", 10, 1, append("o"));

		let scope = Hook::new(hooks.clone());
		scope.add_filter("x", 10, 1, |args: &[Value]| Ok(args[0].clone()));
		scope.add_action("y", 10, 0, |_: &[Value]| Ok(()));
		assert_eq!(scope.len(), 2);
		assert_eq!(hooks.count("x"), 2);

		assert_eq!(scope.deregister(), 2);
		assert!(scope.is_empty());
		assert_eq!(hooks.count("x"), 1);
		assert!(!hooks.has_filter("y"));
		assert!(hooks.remove(outside));
		assert!(!hooks.has_filter("x"));
	}

	#[test]
	fn callbacks_may_bind_during_dispatch() {
		let hooks = Arc::new(Hooks::new());
		let inner = hooks.clone();
		hooks.add_action(
			"init",
			10,
			0,
			Arc::new(move |_: &[Value]| -> Result<(), BoxError> {
				let late: Filter = Arc::new(|_: &[Value]| Ok(json!("bound")));
				inner.add_filter("late", 10, 1, late);
				Ok(())
			}),
		);
		hooks.do_action("init", &[]).unwrap();
		assert_eq!(hooks.apply_filters("late", json!(null), &[]).unwrap(), json!("bound"));
	}
}
