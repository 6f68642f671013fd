//! Navigation menus for the tome site generator.
//!
//! The builder walks navigation-family files through the markup adapter.
//! Every top-level unordered list in a navigation source becomes a
//! [`NavigationTree`]; the trees of one `(component, version)` pair form an
//! ordered menu in the [`NavigationCatalog`].
//!
//! Items partition by the anchor found in their rendered content: an anchor
//! carrying the `page` role is an internal link, a `#` href is a fragment,
//! anything else is external. Content without an anchor is a plain grouping
//! label.

mod builder;
mod catalog;
mod tree;

pub use builder::build_navigation;
pub use catalog::NavigationCatalog;
pub use tree::{NavItem, NavigationTree, UrlType};
