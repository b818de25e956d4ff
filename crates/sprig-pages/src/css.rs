//! CSS-in-template engine.
//!
//! [`css!`](crate::css!) (or [`css()`]) parses a css template into a
//! [`StyleSheet`] scoped to a generated class. Attaching the sheet to an
//! element's `style` attribute adds the class to the element and, in an
//! interactive document, adopts the sheet so its rules apply. Signals
//! interpolated into declaration values keep adopted rules up to date.
//!
//! ## Example
//!
//! ```
//! use sprig_core::Signal;
//! use sprig_pages::css;
//!
//! let color = Signal::new("red".to_string());
//! let sheet = css!("h1 { color: " {&color} "; }")?;
//! let class = sheet.class_name().to_string();
//!
//! assert_eq!(sheet.to_css_string(), format!(".{class} h1 {{ color: red; }}"));
//! color.set("blue".to_string());
//! assert_eq!(sheet.to_css_string(), format!(".{class} h1 {{ color: blue; }}"));
//! # Ok::<(), sprig_pages::css::CssError>(())
//! ```

mod parser;
mod sheet;

pub use parser::{ParseContext, TemplatePart, collapse_whitespace, css};
pub use sheet::{CLASS_PREFIX, Declaration, DeclarationValue, StyleRule, StyleSheet, ValuePart};

/// Errors raised while parsing a css template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CssError {
	/// An interpolated value appeared outside of a declaration value.
	#[error("unexpected value in {context} position")]
	UnexpectedValue {
		/// Where the scanner was.
		context: ParseContext,
	},
}

/// Builds a [`StyleSheet`] from string literals and `{expr}` interpolations.
///
/// String literals are css source; a braced expression is converted with
/// `TemplatePart::from`, so signals stay reactive and other values are
/// inlined. Evaluates to `Result<StyleSheet, CssError>`.
///
/// ```
/// use sprig_pages::css;
///
/// let gap = 8;
/// let sheet = css!("& { display: flex; gap: " {gap} "px; }")?;
///
/// assert_eq!(
///     sheet.to_css_string(),
///     format!(".{} {{ display: flex; gap: 8px; }}", sheet.class_name())
/// );
/// # Ok::<(), sprig_pages::css::CssError>(())
/// ```
#[macro_export]
macro_rules! css {
	($($part:tt)*) => {
		$crate::css::css([$($crate::__css_part!($part)),*])
	};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __css_part {
	($text:literal) => {
		$crate::css::TemplatePart::literal($text)
	};
	({ $value:expr }) => {
		$crate::css::TemplatePart::from($value)
	};
}
