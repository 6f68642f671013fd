//! Page model assembly for the tome site generator.
//!
//! The composer turns a publishable page file into the [`PageUiModel`]
//! consumed by the layout engine, against a precomputed [`SiteUiModel`].
//! The layout engine itself stays external behind the [`LayoutRenderer`]
//! seam; the composer only selects the layout name and assembles data.

mod compose;
mod model;

pub use compose::{ComposeError, PageComposer};
pub use model::{
    BreadcrumbItem, ComponentUiModel, LayoutRenderer, PageUiModel, PageVersion, SiteUiModel,
    UiCatalog, VersionLink,
};
