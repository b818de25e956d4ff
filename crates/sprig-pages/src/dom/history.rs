//! Location and session history.

use url::Url;

use super::DomError;
use super::document::Document;
use super::event::{Event, POPSTATE_EVENT};

pub(crate) struct History {
	entries: Vec<Url>,
	index: usize,
	native: Vec<Url>,
}

impl History {
	pub(crate) fn new(initial: Url) -> Self {
		Self {
			entries: vec![initial],
			index: 0,
			native: Vec::new(),
		}
	}

	fn current(&self) -> &Url {
		&self.entries[self.index]
	}

	fn push(&mut self, url: Url) {
		self.entries.truncate(self.index + 1);
		self.entries.push(url);
		self.index = self.entries.len() - 1;
	}
}

impl Document {
	/// The current location.
	pub fn location(&self) -> Url {
		self.0.history.borrow().current().clone()
	}

	/// Resolves `href` against the current location.
	pub fn resolve_url(&self, href: &str) -> Result<Url, DomError> {
		self.location()
			.join(href)
			.map_err(|source| DomError::InvalidUrl {
				href: href.to_string(),
				source,
			})
	}

	/// Whether `url` shares the origin of the current location.
	pub fn is_same_origin(&self, url: &Url) -> bool {
		url.origin() == self.location().origin()
	}

	/// Replaces the current entry without firing any event. Unlike
	/// [`Document::push_state`] this accepts any origin.
	pub fn set_location(&self, href: &str) -> Result<(), DomError> {
		let url = self.resolve_url(href)?;
		let mut history = self.0.history.borrow_mut();
		let index = history.index;
		history.entries[index] = url;
		Ok(())
	}

	/// Pushes a same-origin entry, dropping any forward entries.
	pub fn push_state(&self, href: &str) -> Result<Url, DomError> {
		let url = self.same_origin_url(href)?;
		tracing::debug!(url = %url, "history push");
		self.0.history.borrow_mut().push(url.clone());
		Ok(url)
	}

	/// Replaces the current entry with a same-origin URL.
	pub fn replace_state(&self, href: &str) -> Result<Url, DomError> {
		let url = self.same_origin_url(href)?;
		let mut history = self.0.history.borrow_mut();
		let index = history.index;
		history.entries[index] = url.clone();
		Ok(url)
	}

	fn same_origin_url(&self, href: &str) -> Result<Url, DomError> {
		let url = self.resolve_url(href)?;
		if self.is_same_origin(&url) {
			Ok(url)
		} else {
			Err(DomError::CrossOrigin {
				href: href.to_string(),
			})
		}
	}

	/// Number of history entries.
	pub fn history_len(&self) -> usize {
		self.0.history.borrow().entries.len()
	}

	/// Steps back one entry and fires `popstate` on the window. Returns false
	/// at the first entry.
	pub fn back(&self) -> bool {
		self.traverse(-1)
	}

	/// Steps forward one entry and fires `popstate` on the window. Returns
	/// false at the last entry.
	pub fn forward(&self) -> bool {
		self.traverse(1)
	}

	fn traverse(&self, delta: isize) -> bool {
		{
			let mut history = self.0.history.borrow_mut();
			let Some(target) = history.index.checked_add_signed(delta) else {
				return false;
			};
			if target >= history.entries.len() {
				return false;
			}
			history.index = target;
		}
		self.dispatch_window_event(&Event::new(POPSTATE_EVENT));
		true
	}

	/// Performs a full navigation, as a browser does for an anchor whose
	/// click was not intercepted. Any origin is accepted.
	pub fn navigate(&self, href: &str) -> Result<Url, DomError> {
		let url = self.resolve_url(href)?;
		tracing::debug!(url = %url, "native navigation");
		let mut history = self.0.history.borrow_mut();
		history.push(url.clone());
		history.native.push(url.clone());
		Ok(url)
	}

	/// Every URL reached through [`Document::navigate`], oldest first.
	pub fn native_navigations(&self) -> Vec<Url> {
		self.0.history.borrow().native.clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::cell::RefCell;
	use std::rc::Rc;

	#[rstest]
	fn test_push_state_resolves_relative_href() {
		let doc = Document::new().with_location("http://localhost/users/").unwrap();

		let url = doc.push_state("42?tab=posts").unwrap();

		assert_eq!(url.as_str(), "http://localhost/users/42?tab=posts");
		assert_eq!(doc.location().path(), "/users/42");
		assert_eq!(doc.history_len(), 2);
	}

	#[rstest]
	fn test_push_state_rejects_other_origin() {
		let doc = Document::new();

		assert!(matches!(
			doc.push_state("https://example.com/"),
			Err(DomError::CrossOrigin { .. })
		));
		assert_eq!(doc.history_len(), 1);
	}

	#[rstest]
	fn test_back_fires_popstate_with_previous_location() {
		let doc = Document::new();
		let seen = Rc::new(RefCell::new(Vec::new()));
		let log = seen.clone();
		let weak = doc.downgrade();
		doc.add_window_listener(POPSTATE_EVENT, move |_: &Event| {
			if let Some(doc) = weak.upgrade() {
				log.borrow_mut().push(doc.location().path().to_string());
			}
		});
		doc.push_state("/a").unwrap();
		doc.push_state("/b").unwrap();

		assert!(doc.back());
		assert!(doc.back());
		assert!(!doc.back());
		assert!(doc.forward());

		assert_eq!(*seen.borrow(), vec!["/a", "/", "/a"]);
	}

	#[rstest]
	fn test_push_after_back_drops_forward_entries() {
		let doc = Document::new();
		doc.push_state("/a").unwrap();
		doc.push_state("/b").unwrap();
		doc.back();

		doc.push_state("/c").unwrap();

		assert_eq!(doc.history_len(), 3);
		assert!(!doc.forward());
	}

	#[rstest]
	fn test_invalid_location_is_reported() {
		let result = Document::new().with_location("http://[::1");

		assert!(matches!(result, Err(DomError::InvalidUrl { .. })));
	}
}
