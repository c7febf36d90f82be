//! Host-registration glue for embedded demo tags.
//!
//! Two invocation styles reach the demo core, with different failure
//! policies:
//!
//! - **Inline tag** (`<demo src="./Foo.vue" />` inside document flow):
//!   configuration and resolution problems are logged and the tag falls
//!   back to default rendering ([`render_demo_tag`] returns `Ok(None)`).
//! - **Block container** (a delimited `demo` block whose inner content is
//!   the description): the same problems fail the document build
//!   ([`render_demo_open`] returns the error).
//!
//! Injection-precondition and IO errors are fatal for both styles.

mod block;
mod container;

pub use block::{extract_demo_tag, render_demo_tag};
pub use container::{render_demo_close, render_demo_open};
