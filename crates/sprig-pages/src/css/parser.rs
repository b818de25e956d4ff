//! Scanner that turns css template parts into a [`StyleSheet`].
//!
//! The scanner walks literal text one character at a time through four
//! states:
//!
//! ```text
//! selector --'{'--> property --':'--> value --';'--> property
//!                                       |
//!                                      '!'--> priority --';'--> property
//! any state but selector --'}'--> selector (rule complete)
//! ```
//!
//! Interpolated values are only accepted in the value state. Signals found
//! there are recorded on the rule so adopted sheets can refresh it.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use sprig_core::{AnySignal, Signal};

use super::CssError;
use super::sheet::{Declaration, DeclarationValue, StyleRule, StyleSheet, ValuePart, generate_class};
use crate::component::format_number;
use crate::warn_log;

static WHITESPACE: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"\s+").unwrap_or_else(|_| unreachable!("whitespace pattern is valid")));

/// Collapses runs of whitespace to one space and trims both ends.
pub fn collapse_whitespace(text: &str) -> String {
	WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// One piece of a css template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
	/// Template source text, scanned character by character.
	Literal(String),
	/// An interpolated signal.
	Signal(AnySignal),
	/// Any other interpolated value, already rendered.
	Value(String),
}

impl TemplatePart {
	/// Source text of the template.
	pub fn literal(text: impl Into<String>) -> Self {
		Self::Literal(text.into())
	}
}

impl From<AnySignal> for TemplatePart {
	fn from(signal: AnySignal) -> Self {
		Self::Signal(signal)
	}
}

impl<T> From<Signal<T>> for TemplatePart
where
	T: fmt::Display + Clone + 'static,
{
	fn from(signal: Signal<T>) -> Self {
		Self::Signal(signal.into())
	}
}

impl<T> From<&Signal<T>> for TemplatePart
where
	T: fmt::Display + Clone + 'static,
{
	fn from(signal: &Signal<T>) -> Self {
		Self::Signal(signal.into())
	}
}

impl From<&str> for TemplatePart {
	fn from(value: &str) -> Self {
		Self::Value(value.to_string())
	}
}

impl From<String> for TemplatePart {
	fn from(value: String) -> Self {
		Self::Value(value)
	}
}

macro_rules! impl_integer_part {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for TemplatePart {
				fn from(value: $ty) -> Self {
					Self::Value(value.to_string())
				}
			}
		)*
	};
}

impl_integer_part!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f32> for TemplatePart {
	fn from(value: f32) -> Self {
		Self::Value(format_number(f64::from(value)))
	}
}

impl From<f64> for TemplatePart {
	fn from(value: f64) -> Self {
		Self::Value(format_number(value))
	}
}

/// Scanner state, reported by [`CssError::UnexpectedValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseContext {
	/// Reading a selector.
	Selector,
	/// Reading a property name.
	Property,
	/// Reading a value.
	Value,
	/// Reading a priority after `!`.
	Priority,
}

impl fmt::Display for ParseContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Selector => "selector",
			Self::Property => "property",
			Self::Value => "value",
			Self::Priority => "priority",
		})
	}
}

enum Piece {
	Text(String),
	Signal(AnySignal),
}

#[derive(Default)]
struct Pieces(Vec<Piece>);

impl Pieces {
	fn push_char(&mut self, c: char) {
		match self.0.last_mut() {
			Some(Piece::Text(text)) => text.push(c),
			_ => self.0.push(Piece::Text(c.to_string())),
		}
	}

	fn push_str(&mut self, s: &str) {
		match self.0.last_mut() {
			Some(Piece::Text(text)) => text.push_str(s),
			_ => self.0.push(Piece::Text(s.to_string())),
		}
	}

	fn is_blank(&self) -> bool {
		self.0.iter().all(|piece| match piece {
			Piece::Text(text) => text.trim().is_empty(),
			Piece::Signal(_) => false,
		})
	}

	/// Joined text, whitespace collapsed.
	fn take_text(&mut self) -> String {
		let joined: String = self
			.0
			.drain(..)
			.map(|piece| match piece {
				Piece::Text(text) => text,
				Piece::Signal(signal) => signal.render(),
			})
			.collect();
		collapse_whitespace(&joined)
	}

	/// Merges the pieces of a value into literal runs and signals. Values
	/// without a signal collapse to plain text.
	fn take_value(&mut self) -> DeclarationValue {
		if !self.0.iter().any(|piece| matches!(piece, Piece::Signal(_))) {
			return DeclarationValue::Plain(self.take_text());
		}

		let pieces: Vec<Piece> = self.0.drain(..).collect();
		let last = pieces.len() - 1;
		let mut parts = Vec::with_capacity(pieces.len());
		for (index, piece) in pieces.into_iter().enumerate() {
			match piece {
				Piece::Signal(signal) => parts.push(ValuePart::Signal(signal)),
				Piece::Text(text) => {
					let mut run = WHITESPACE.replace_all(&text, " ").into_owned();
					if index == 0 {
						run = run.trim_start().to_string();
					}
					if index == last {
						run = run.trim_end().to_string();
					}
					if !run.is_empty() {
						parts.push(ValuePart::Literal(run));
					}
				}
			}
		}
		DeclarationValue::Parts(parts)
	}
}

struct PendingRule {
	selector: String,
	declarations: Vec<Declaration>,
	signals: Vec<AnySignal>,
}

struct Parser {
	class_name: String,
	context: ParseContext,
	pieces: Pieces,
	rules: Vec<StyleRule>,
	rule: Option<PendingRule>,
	property: Option<String>,
	value: Option<DeclarationValue>,
}

impl Parser {
	fn new(class_name: String) -> Self {
		Self {
			class_name,
			context: ParseContext::Selector,
			pieces: Pieces::default(),
			rules: Vec::new(),
			rule: None,
			property: None,
			value: None,
		}
	}

	fn scope_selector(&self, selector: &str) -> String {
		let class = format!(".{}", self.class_name);
		if selector.contains('&') {
			return selector.replace('&', &class);
		}
		selector
			.split(',')
			.map(|clause| format!("{} {}", class, clause.trim()))
			.collect::<Vec<_>>()
			.join(", ")
	}

	fn push_declaration(&mut self, priority: Option<String>) {
		let (Some(property), Some(value)) = (self.property.take(), self.value.take()) else {
			return;
		};
		if let Some(rule) = self.rule.as_mut() {
			rule.declarations.push(Declaration {
				property,
				value,
				priority,
			});
		}
	}

	fn finish_rule(&mut self) {
		match self.context {
			ParseContext::Value => {
				self.value = Some(self.pieces.take_value());
				self.push_declaration(None);
			}
			ParseContext::Priority => {
				let priority = self.pieces.take_text();
				self.push_declaration(Some(priority));
			}
			ParseContext::Property | ParseContext::Selector => {
				if !self.pieces.is_blank() {
					warn_log!("dropping incomplete declaration `{}`", self.pieces.take_text());
				}
				self.pieces = Pieces::default();
			}
		}
		if let Some(rule) = self.rule.take() {
			self.rules.push(StyleRule {
				index: self.rules.len(),
				selector: rule.selector,
				declarations: rule.declarations,
				signals: rule.signals,
			});
		}
		self.context = ParseContext::Selector;
	}

	fn scan(&mut self, text: &str) {
		for c in text.chars() {
			match (self.context, c) {
				(ParseContext::Selector, '{') => {
					let raw = self.pieces.take_text();
					let selector = self.scope_selector(&raw);
					self.rule = Some(PendingRule {
						selector,
						declarations: Vec::new(),
						signals: Vec::new(),
					});
					self.context = ParseContext::Property;
				}
				(ParseContext::Selector, '}') => {
					warn_log!("ignoring `}}` outside of a rule");
				}
				(_, '}') => self.finish_rule(),
				(ParseContext::Property, ':') => {
					self.property = Some(self.pieces.take_text());
					self.context = ParseContext::Value;
				}
				(ParseContext::Value, ';') => {
					self.value = Some(self.pieces.take_value());
					self.push_declaration(None);
					self.context = ParseContext::Property;
				}
				(ParseContext::Value, '!') => {
					self.value = Some(self.pieces.take_value());
					self.context = ParseContext::Priority;
				}
				(ParseContext::Priority, ';') => {
					let priority = self.pieces.take_text();
					self.push_declaration(Some(priority));
					self.context = ParseContext::Property;
				}
				_ => self.pieces.push_char(c),
			}
		}
	}

	fn interpolate(&mut self, part: TemplatePart) -> Result<(), CssError> {
		if self.context != ParseContext::Value {
			return Err(CssError::UnexpectedValue {
				context: self.context,
			});
		}
		match part {
			TemplatePart::Signal(signal) => {
				if let Some(rule) = self.rule.as_mut() {
					if !rule.signals.contains(&signal) {
						rule.signals.push(signal.clone());
					}
				}
				self.pieces.0.push(Piece::Signal(signal));
			}
			TemplatePart::Value(value) => self.pieces.push_str(&value),
			TemplatePart::Literal(text) => self.scan(&text),
		}
		Ok(())
	}

	fn finish(self) -> StyleSheet {
		if let Some(rule) = &self.rule {
			warn_log!("dropping unterminated rule `{}`", rule.selector);
		} else if !self.pieces.is_blank() {
			warn_log!("dropping trailing css outside of a rule");
		}
		StyleSheet::new(self.class_name, self.rules)
	}
}

/// Parses css template parts into a stylesheet scoped to a fresh class.
///
/// Selectors containing `&` have it replaced by the class selector; other
/// selectors get every comma separated clause prefixed with it.
///
/// # Errors
///
/// Returns [`CssError::UnexpectedValue`] when a non-literal part appears
/// outside of a declaration value.
///
/// # Example
///
/// ```
/// use sprig_pages::css::{TemplatePart, css};
///
/// let sheet = css([TemplatePart::literal("h1, h2 { color: red !important; }")])?;
/// let class = sheet.class_name();
///
/// assert_eq!(
///     sheet.to_css_string(),
///     format!(".{class} h1, .{class} h2 {{ color: red !important; }}")
/// );
/// # Ok::<(), sprig_pages::css::CssError>(())
/// ```
pub fn css<I>(parts: I) -> Result<StyleSheet, CssError>
where
	I: IntoIterator<Item = TemplatePart>,
{
	let mut parser = Parser::new(generate_class());
	for part in parts {
		match part {
			TemplatePart::Literal(text) => parser.scan(&text),
			other => parser.interpolate(other)?,
		}
	}
	Ok(parser.finish())
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn lit(text: &str) -> TemplatePart {
		TemplatePart::literal(text)
	}

	fn plain(property: &str, value: &str) -> Declaration {
		Declaration {
			property: property.into(),
			value: DeclarationValue::Plain(value.into()),
			priority: None,
		}
	}

	#[rstest]
	fn test_parses_simple_rule() {
		let sheet = css([lit("\n\th1 {\n\t\tcolor: red;\n\t}\n")]).unwrap();
		let class = sheet.class_name();

		assert_eq!(sheet.rules().len(), 1);
		let rule = &sheet.rules()[0];
		assert_eq!(rule.index, 0);
		assert_eq!(rule.selector, format!(".{class} h1"));
		assert_eq!(rule.declarations, vec![plain("color", "red")]);
		assert!(rule.signals.is_empty());
	}

	#[rstest]
	fn test_parses_multiple_properties() {
		let sheet = css([lit("h1 { color: red; font-size: 24px; }")]).unwrap();

		assert_eq!(
			sheet.rules()[0].declarations,
			vec![plain("color", "red"), plain("font-size", "24px")]
		);
	}

	#[rstest]
	fn test_parses_priority() {
		let sheet = css([lit("h1 { color: red !important; }")]).unwrap();
		let declaration = &sheet.rules()[0].declarations[0];

		assert_eq!(declaration.value, DeclarationValue::Plain("red".into()));
		assert_eq!(declaration.priority.as_deref(), Some("important"));
	}

	#[rstest]
	fn test_scopes_every_selector_clause() {
		let sheet = css([lit("h1,\n h2 { color: red; }")]).unwrap();
		let class = sheet.class_name();

		assert_eq!(sheet.rules()[0].selector, format!(".{class} h1, .{class} h2"));
	}

	#[rstest]
	fn test_ampersand_targets_the_class_itself() {
		let sheet = css([lit("&:hover { color: red; } & { color: blue; }")]).unwrap();
		let class = sheet.class_name();

		assert_eq!(sheet.rules()[0].selector, format!(".{class}:hover"));
		assert_eq!(sheet.rules()[1].selector, format!(".{class}"));
		assert_eq!(sheet.rules()[1].index, 1);
	}

	#[rstest]
	fn test_signal_value_is_recorded() {
		let color = Signal::new("red".to_string());
		let sheet = css([lit("h1 { color: "), (&color).into(), lit("; }")]).unwrap();
		let rule = &sheet.rules()[0];
		let any = AnySignal::from(&color);

		assert_eq!(
			rule.declarations[0].value,
			DeclarationValue::Parts(vec![ValuePart::Signal(any.clone())])
		);
		assert_eq!(rule.signals, vec![any]);
	}

	#[rstest]
	fn test_signal_with_priority() {
		let color = Signal::new("red".to_string());
		let sheet = css([lit("h1 { color: "), (&color).into(), lit(" !important; }")]).unwrap();
		let declaration = &sheet.rules()[0].declarations[0];

		assert_eq!(declaration.priority.as_deref(), Some("important"));
		assert_eq!(declaration.value.render(), "red");
	}

	#[rstest]
	fn test_signal_in_the_middle_of_a_value_keeps_spacing() {
		let color = Signal::new("red".to_string());
		let width = Signal::new(2);
		let sheet = css([
			lit("h1 { border: "),
			(&width).into(),
			lit("px  solid "),
			(&color).into(),
			lit("; }"),
		])
		.unwrap();
		let value = &sheet.rules()[0].declarations[0].value;

		assert_eq!(
			*value,
			DeclarationValue::Parts(vec![
				ValuePart::Signal(AnySignal::from(&width)),
				ValuePart::Literal("px solid ".into()),
				ValuePart::Signal(AnySignal::from(&color)),
			])
		);
		assert_eq!(value.render(), "2px solid red");
	}

	#[rstest]
	fn test_repeated_signal_is_recorded_once() {
		let size = Signal::new(4);
		let sheet = css([
			lit("div { margin: "),
			(&size).into(),
			lit("px; padding: "),
			(&size).into(),
			lit("px; }"),
		])
		.unwrap();

		assert_eq!(sheet.rules()[0].signals.len(), 1);
	}

	#[rstest]
	fn test_plain_values_are_inlined() {
		let sheet = css([lit("p { width: "), 50.into(), lit("%; color: "), "teal".into(), lit("; }")]).unwrap();

		assert_eq!(sheet.rules()[0].declarations, vec![plain("width", "50%"), plain("color", "teal")]);
	}

	#[rstest]
	fn test_closing_brace_flushes_pending_declaration() {
		let sheet = css([lit("h1 { color: red }")]).unwrap();

		assert_eq!(sheet.rules()[0].declarations, vec![plain("color", "red")]);
	}

	#[rstest]
	#[case(vec![lit("h1 "), "x".into(), lit("{ color: red; }")], ParseContext::Selector)]
	#[case(vec![lit("h1 { "), "x".into(), lit(": red; }")], ParseContext::Property)]
	#[case(vec![lit("h1 { color: red !"), "x".into(), lit("; }")], ParseContext::Priority)]
	fn test_value_outside_value_position_fails(
		#[case] parts: Vec<TemplatePart>,
		#[case] context: ParseContext,
	) {
		assert_eq!(css(parts), Err(CssError::UnexpectedValue { context }));
	}

	#[rstest]
	fn test_unterminated_rule_is_dropped() {
		let sheet = css([lit("h1 { color: red; } h2 { color: blue;")]).unwrap();

		assert_eq!(sheet.rules().len(), 1);
	}

	#[rstest]
	fn test_empty_rule_has_no_declarations() {
		let sheet = css([lit("h1 {}")]).unwrap();

		assert!(sheet.rules()[0].declarations.is_empty());
		assert_eq!(sheet.rules()[0].css_text(), format!(".{} h1 {{}}", sheet.class_name()));
	}
}
