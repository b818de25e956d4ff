//! HTML Builder API
//!
//! Tag constructors returning [`Element`](crate::component::Element), the
//! template node every mount starts from.
//!
//! ## Example
//!
//! ```
//! use sprig_core::Signal;
//! use sprig_pages::builder::html::{button, div, p};
//!
//! let count = Signal::new(0);
//!
//! let counter = div()
//!     .class("counter")
//!     .child(p().child(&count))
//!     .child(button().text("Increment").on_click({
//!         let count = count.clone();
//!         move |_| count.update(|n| *n += 1)
//!     }));
//! # let _ = counter;
//! ```

pub mod html;

pub use html::*;
