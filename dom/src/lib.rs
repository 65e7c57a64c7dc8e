//! Minimal document model used by the storefront widgets.
//!
//! ```text
//! markup ──parse──> Document (arena of NodeId slots)
//!                     │ query_all(scope, Selector)
//!                     │ attr / class / hidden helpers
//!                     └─ Reconciler::reconcile(target, fragment)
//! ```

mod document;
mod error;
mod markup;
mod reconcile;
mod selector;

pub use document::Document;
pub use document::ElementData;
pub use document::NodeId;
pub use document::NodeKind;
pub use error::DomError;
pub use error::Result;
pub use reconcile::Reconciler;
pub use reconcile::ReplaceChildren;
pub use selector::Selector;
