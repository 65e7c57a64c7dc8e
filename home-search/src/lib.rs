//! Predictive search for the storefront home page.
//!
//! [`HomeSearch`] mounts on a `<home-search-component>` element, debounces
//! typing into section render requests, keeps exactly one request live,
//! reconciles responses into the results overlay and drives keyboard
//! navigation over the rendered items. When the term empties it falls back to
//! the empty-state section merged with the visitor's recently viewed
//! products.

pub mod config;
mod error;
pub mod fallback;
pub mod fetch;
pub mod host;
pub mod input_gate;
pub mod navigator;
pub mod refs;
pub mod results_index;
pub mod session;
pub mod visibility;
mod widget;

pub use config::HomeSearchConfig;
pub use config::StorefrontRoutes;
pub use error::HomeSearchError;
pub use error::Result;
pub use host::Host;
pub use host::HostEvent;
pub use host::Navigation;
pub use host::RecordingHost;
pub use host::ScrollBehavior;
pub use input_gate::InputKind;
pub use navigator::Key;
pub use navigator::KeyOutcome;
pub use navigator::KeyPress;
pub use results_index::Cursor;
pub use results_index::ResultItem;
pub use session::NavigationSource;
pub use session::Overlay;
pub use visibility::DocumentClick;
pub use visibility::DocumentEvents;
pub use widget::COMPONENT_TAG;
pub use widget::Collaborators;
pub use widget::HomeSearch;
pub use widget::find_component;
