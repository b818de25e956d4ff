//! Parsed stylesheet model and rule serialization.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use sprig_core::AnySignal;

use super::parser::collapse_whitespace;
use crate::dom::CssRuleList;
use crate::warn_log;

static NEXT_CLASS: AtomicU64 = AtomicU64::new(1);

/// Prefix of every generated stylesheet class.
pub const CLASS_PREFIX: &str = "sprig-";

pub(crate) fn generate_class() -> String {
	format!("{}{}", CLASS_PREFIX, NEXT_CLASS.fetch_add(1, Ordering::Relaxed))
}

/// One piece of a reactive declaration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValuePart {
	/// Literal text, whitespace collapsed.
	Literal(String),
	/// A signal rendered with `Display`.
	Signal(AnySignal),
}

/// A declaration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationValue {
	/// A value without signals.
	Plain(String),
	/// Literal runs interleaved with signals, in source order.
	Parts(Vec<ValuePart>),
}

impl DeclarationValue {
	/// Current text of the value.
	pub fn render(&self) -> String {
		match self {
			Self::Plain(value) => value.clone(),
			Self::Parts(parts) => {
				let joined: String = parts
					.iter()
					.map(|part| match part {
						ValuePart::Literal(text) => text.clone(),
						ValuePart::Signal(signal) => signal.render(),
					})
					.collect();
				collapse_whitespace(&joined)
			}
		}
	}

	/// Signals referenced by the value.
	pub fn signals(&self) -> impl Iterator<Item = &AnySignal> {
		let parts: &[ValuePart] = match self {
			Self::Plain(_) => &[],
			Self::Parts(parts) => parts,
		};
		parts.iter().filter_map(|part| match part {
			ValuePart::Signal(signal) => Some(signal),
			ValuePart::Literal(_) => None,
		})
	}
}

impl From<&str> for DeclarationValue {
	fn from(value: &str) -> Self {
		Self::Plain(value.to_string())
	}
}

/// A `property: value !priority` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
	/// Property name.
	pub property: String,
	/// Value.
	pub value: DeclarationValue,
	/// Priority without the `!`, e.g. `important`.
	pub priority: Option<String>,
}

impl Declaration {
	/// Serializes the declaration without the trailing semicolon.
	pub fn css_text(&self) -> String {
		let mut out = format!("{}: {}", self.property, self.value.render());
		if let Some(priority) = &self.priority {
			out.push_str(" !");
			out.push_str(priority);
		}
		out
	}
}

/// A scoped rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
	/// Position in the sheet.
	pub index: usize,
	/// Selector, already scoped to the sheet's class.
	pub selector: String,
	/// Declarations in source order.
	pub declarations: Vec<Declaration>,
	/// Distinct signals referenced by the declarations.
	pub signals: Vec<AnySignal>,
}

impl StyleRule {
	/// Serializes the rule with the current signal values.
	pub fn css_text(&self) -> String {
		if self.declarations.is_empty() {
			return format!("{} {{}}", self.selector);
		}
		let body: Vec<String> = self.declarations.iter().map(Declaration::css_text).collect();
		format!("{} {{ {}; }}", self.selector, body.join("; "))
	}
}

/// A stylesheet scoped to a generated class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSheet {
	class_name: String,
	rules: Vec<StyleRule>,
}

impl StyleSheet {
	pub(crate) fn new(class_name: String, rules: Vec<StyleRule>) -> Self {
		Self { class_name, rules }
	}

	/// The generated class every selector is scoped to.
	pub fn class_name(&self) -> &str {
		&self.class_name
	}

	/// Rules in source order.
	pub fn rules(&self) -> &[StyleRule] {
		&self.rules
	}

	/// Whether any rule depends on a signal.
	pub fn is_reactive(&self) -> bool {
		self.rules.iter().any(|rule| !rule.signals.is_empty())
	}

	/// Serializes every rule, joined by a single space.
	pub fn to_css_string(&self) -> String {
		self.rules
			.iter()
			.map(StyleRule::css_text)
			.collect::<Vec<_>>()
			.join(" ")
	}

	/// Builds a live rule list.
	///
	/// Each rule is inserted at its index; for every signal a rule depends
	/// on, a subscription deletes and re-inserts that rule at the same index
	/// whenever the signal changes. The subscriptions are owned by the
	/// returned list.
	pub fn create_rule_list(&self) -> CssRuleList {
		let list = CssRuleList::new();
		for rule in &self.rules {
			if let Err(error) = list.insert_rule(rule.css_text(), rule.index) {
				warn_log!("skipping rule `{}`: {}", rule.selector, error);
				continue;
			}
			for signal in &rule.signals {
				let weak = list.downgrade();
				let rule = rule.clone();
				let id = signal.subscribe(move |_| {
					let Some(list) = weak.upgrade() else {
						return;
					};
					let refreshed = list
						.delete_rule(rule.index)
						.and_then(|()| list.insert_rule(rule.css_text(), rule.index));
					if let Err(error) = refreshed {
						warn_log!("failed to refresh rule `{}`: {}", rule.selector, error);
					}
				});
				list.track(signal.clone(), id);
			}
		}
		list
	}
}

impl fmt::Display for StyleSheet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_css_string())
	}
}
