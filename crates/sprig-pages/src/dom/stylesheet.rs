//! Constructed stylesheets and document adoption.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use sprig_core::{AnySignal, SubscriptionId};

use super::DomError;
use super::document::Document;
use crate::css::StyleSheet;

struct RuleListInner {
	rules: RefCell<Vec<String>>,
	subscriptions: RefCell<Vec<(AnySignal, SubscriptionId)>>,
}

impl Drop for RuleListInner {
	fn drop(&mut self) {
		for (signal, id) in self.subscriptions.get_mut().drain(..) {
			signal.unsubscribe(id);
		}
	}
}

/// An ordered list of serialized CSS rules.
///
/// Cloning yields another handle to the same list. Signal subscriptions
/// registered through [`CssRuleList::track`] are released when the last
/// handle is dropped.
#[derive(Clone)]
pub struct CssRuleList(Rc<RuleListInner>);

/// Non-owning handle to a [`CssRuleList`].
#[derive(Clone)]
pub struct WeakRuleList(Weak<RuleListInner>);

impl WeakRuleList {
	/// Upgrades if the list is still alive.
	pub fn upgrade(&self) -> Option<CssRuleList> {
		self.0.upgrade().map(CssRuleList)
	}
}

impl Default for CssRuleList {
	fn default() -> Self {
		Self::new()
	}
}

impl CssRuleList {
	/// Creates an empty list.
	pub fn new() -> Self {
		Self(Rc::new(RuleListInner {
			rules: RefCell::new(Vec::new()),
			subscriptions: RefCell::new(Vec::new()),
		}))
	}

	/// Inserts `rule` at `index` and returns the index.
	pub fn insert_rule(&self, rule: impl Into<String>, index: usize) -> Result<usize, DomError> {
		let mut rules = self.0.rules.borrow_mut();
		if index > rules.len() {
			return Err(DomError::IndexOutOfBounds {
				index,
				len: rules.len(),
			});
		}
		rules.insert(index, rule.into());
		Ok(index)
	}

	/// Removes the rule at `index`.
	pub fn delete_rule(&self, index: usize) -> Result<(), DomError> {
		let mut rules = self.0.rules.borrow_mut();
		if index >= rules.len() {
			return Err(DomError::IndexOutOfBounds {
				index,
				len: rules.len(),
			});
		}
		rules.remove(index);
		Ok(())
	}

	/// Rule at `index`.
	pub fn rule(&self, index: usize) -> Option<String> {
		self.0.rules.borrow().get(index).cloned()
	}

	/// All rules in order.
	pub fn rules(&self) -> Vec<String> {
		self.0.rules.borrow().clone()
	}

	/// Number of rules.
	pub fn len(&self) -> usize {
		self.0.rules.borrow().len()
	}

	/// Whether the list has no rules.
	pub fn is_empty(&self) -> bool {
		self.0.rules.borrow().is_empty()
	}

	/// Rules joined by a single space.
	pub fn css_text(&self) -> String {
		self.0.rules.borrow().join(" ")
	}

	/// Returns a weak handle, for subscribers that must not keep the list
	/// alive.
	pub fn downgrade(&self) -> WeakRuleList {
		WeakRuleList(Rc::downgrade(&self.0))
	}

	/// Hands a subscription over to the list; it is released when the list
	/// is dropped.
	pub fn track(&self, signal: AnySignal, id: SubscriptionId) {
		self.0.subscriptions.borrow_mut().push((signal, id));
	}

	/// Returns true when both handles refer to the same list.
	pub fn ptr_eq(&self, other: &CssRuleList) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for CssRuleList {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CssRuleList")
			.field("rules", &*self.0.rules.borrow())
			.field("subscriptions", &self.0.subscriptions.borrow().len())
			.finish()
	}
}

pub(crate) struct AdoptedSheet {
	class_name: String,
	rules: CssRuleList,
}

impl Document {
	/// Adds `sheet` to the document's adopted stylesheets and returns its
	/// live rule list. A sheet whose class is already adopted is not added
	/// twice; the existing list is returned.
	pub fn adopt_style_sheet(&self, sheet: &StyleSheet) -> CssRuleList {
		if let Some(existing) = self
			.0
			.adopted
			.borrow()
			.iter()
			.find(|adopted| adopted.class_name == sheet.class_name())
		{
			return existing.rules.clone();
		}

		let rules = sheet.create_rule_list();
		tracing::debug!(class = sheet.class_name(), rules = rules.len(), "adopting stylesheet");
		self.0.adopted.borrow_mut().push(AdoptedSheet {
			class_name: sheet.class_name().to_string(),
			rules: rules.clone(),
		});
		rules
	}

	/// Adopted stylesheets in adoption order.
	pub fn adopted_style_sheets(&self) -> Vec<CssRuleList> {
		self.0
			.adopted
			.borrow()
			.iter()
			.map(|adopted| adopted.rules.clone())
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use sprig_core::Signal;

	#[rstest]
	fn test_insert_and_delete_keep_order() {
		let list = CssRuleList::new();
		list.insert_rule(".a {}", 0).unwrap();
		list.insert_rule(".c {}", 1).unwrap();
		list.insert_rule(".b {}", 1).unwrap();

		list.delete_rule(0).unwrap();

		assert_eq!(list.rules(), vec![".b {}", ".c {}"]);
		assert_eq!(list.css_text(), ".b {} .c {}");
	}

	#[rstest]
	fn test_out_of_bounds_index_is_rejected() {
		let list = CssRuleList::new();

		assert_eq!(
			list.insert_rule(".a {}", 1),
			Err(DomError::IndexOutOfBounds { index: 1, len: 0 })
		);
		assert!(list.delete_rule(0).is_err());
	}

	#[rstest]
	fn test_dropping_list_releases_subscriptions() {
		let signal = Signal::new(1);
		let any = AnySignal::from(&signal);
		let list = CssRuleList::new();
		let id = any.subscribe(|_| {});
		list.track(any, id);
		assert_eq!(signal.subscriber_count(), 1);

		drop(list);

		assert_eq!(signal.subscriber_count(), 0);
	}
}
