use std::cell::RefCell;
use std::sync::Arc;

use super::Config;
use super::property::{FromPropertyValue, Property};

thread_local! {
	static CURRENT: RefCell<Option<Arc<Config>>> = const { RefCell::new(None) };
}

/// Restores the previously installed configuration, also on unwind.
struct Restore(Option<Arc<Config>>);

impl Drop for Restore {
	fn drop(&mut self) {
		let previous = self.0.take();
		let _ = CURRENT.try_with(|current| *current.borrow_mut() = previous);
	}
}

/// Runs `f` with `config` installed as this thread's configuration.
pub fn scope<R>(config: &Arc<Config>, f: impl FnOnce() -> R) -> R {
	let previous = CURRENT.with(|current| current.replace(Some(Arc::clone(config))));
	let _restore = Restore(previous);
	f()
}

/// The configuration installed on this thread, if any.
pub fn current() -> Option<Arc<Config>> {
	CURRENT.with(|current| current.borrow().clone())
}

/// Reads `property` from the thread's configuration, or its default outside any scope.
pub fn get<T: FromPropertyValue>(property: &Property<T>) -> T {
	match current() {
		Some(config) => config.get(property),
		None => property.default_value(),
	}
}
