//! Server-side (string) rendering.
//!
//! [`render`] and [`render_css`] use a per-thread headless renderer that is
//! created lazily with default options, or explicitly once with
//! [`install_headless`]. Use [`SsrRenderer`] directly to render with
//! several configurations side by side.
//!
//! ## Example
//!
//! ```
//! use sprig_pages::builder::html::p;
//! use sprig_pages::ssr;
//!
//! assert_eq!(ssr::render(p().child("hello"))?, "<p>hello</p>");
//! # Ok::<(), sprig_pages::ssr::RenderError>(())
//! ```

mod options;
mod renderer;

pub use options::RenderOptions;
pub use renderer::{Renderable, SsrRenderer};

use once_cell::unsync::OnceCell;

use crate::component::MountError;
use crate::css::StyleSheet;
use crate::dom::DomError;
use crate::info_log;

/// Errors raised while loading render options.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// The TOML source could not be parsed into options.
	#[error("invalid render options: {0}")]
	Toml(#[from] toml::de::Error),
}

/// Errors raised while rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
	/// Mounting the template failed.
	#[error(transparent)]
	Mount(#[from] MountError),

	/// The headless document rejected an operation.
	#[error(transparent)]
	Dom(#[from] DomError),

	/// The options could not be loaded.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// [`install_headless`] ran after the renderer was already created.
	#[error("a headless renderer is already installed on this thread")]
	AlreadyInstalled,
}

thread_local! {
	static HEADLESS: OnceCell<SsrRenderer> = const { OnceCell::new() };
}

/// Installs the renderer used by [`render`] and [`render_css`] on this
/// thread.
///
/// Fails with [`RenderError::AlreadyInstalled`] once a renderer exists,
/// including the default one created by an earlier render call.
pub fn install_headless(options: RenderOptions) -> Result<(), RenderError> {
	let renderer = SsrRenderer::with_options(options)?;
	HEADLESS.with(|cell| cell.set(renderer).map_err(|_| RenderError::AlreadyInstalled))?;
	info_log!("headless renderer installed");
	Ok(())
}

fn with_headless<R>(f: impl FnOnce(&SsrRenderer) -> R) -> R {
	HEADLESS.with(|cell| f(cell.get_or_init(SsrRenderer::new)))
}

/// Serializes a template or stylesheet with this thread's renderer.
pub fn render(renderable: impl Into<Renderable>) -> Result<String, RenderError> {
	let renderable = renderable.into();
	with_headless(|renderer| renderer.render(renderable))
}

/// Serializes every rule of `sheet`, space separated.
pub fn render_css(sheet: &StyleSheet) -> String {
	with_headless(|renderer| renderer.render_css(sheet))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::builder::html::{a, div};
	use rstest::rstest;

	// libtest runs every test on its own thread, so each one starts without
	// a renderer.

	#[rstest]
	fn test_install_once() {
		install_headless(RenderOptions::new().origin("https://sprig.dev/")).unwrap();

		assert!(matches!(
			install_headless(RenderOptions::new()),
			Err(RenderError::AlreadyInstalled)
		));
	}

	#[rstest]
	fn test_install_after_render_fails() {
		render(div()).unwrap();

		assert!(matches!(
			install_headless(RenderOptions::new()),
			Err(RenderError::AlreadyInstalled)
		));
	}

	#[rstest]
	fn test_installed_options_are_used() {
		install_headless(RenderOptions::new().doctype(false)).unwrap();

		assert_eq!(render(crate::builder::html::html()).unwrap(), "<html></html>");
	}

	#[rstest]
	fn test_rejected_install_keeps_slot_free() {
		assert!(install_headless(RenderOptions::new().origin("nope")).is_err());

		install_headless(RenderOptions::new()).unwrap();
	}

	#[rstest]
	fn test_anchor_renders_plainly() {
		assert_eq!(render(a().attr("href", "/x").child("x")).unwrap(), "<a href=\"/x\">x</a>");
	}

	#[rstest]
	fn test_error_messages() {
		assert_eq!(
			RenderError::AlreadyInstalled.to_string(),
			"a headless renderer is already installed on this thread"
		);
		let error = RenderOptions::from_toml_str("origin = 1").unwrap_err();
		assert!(error.to_string().starts_with("invalid render options"));
	}
}
