//! The mounted home search component.
//!
//! ```text
//! on_input_changed ─> SearchGate ──(200ms)──> run_search ─> FetchCoordinator
//! on_reset_clicked ─> ResetGate ───(100ms)──> focus input ─> begin_reset
//! on_key_down ─────> navigator::transition ─> select / navigate / begin_reset
//!
//! tick(): select! over completions, gates, hide timer, removal timer and
//! document clicks; every DOM write happens on the caller's task.
//! ```

use crate::config::HomeSearchConfig;
use crate::error::HomeSearchError;
use crate::error::Result;
use crate::fallback;
use crate::fallback::EmptyStateRequest;
use crate::fallback::RecentlyViewedSource;
use crate::fetch;
use crate::fetch::Completion;
use crate::fetch::FetchCoordinator;
use crate::fetch::RequestKind;
use crate::fetch::Resolved;
use crate::host::Host;
use crate::host::Navigation;
use crate::host::ScrollBehavior;
use crate::input_gate::InputKind;
use crate::input_gate::ResetGate;
use crate::input_gate::SearchGate;
use crate::navigator;
use crate::navigator::KeyOutcome;
use crate::navigator::KeyPress;
use crate::navigator::NavAction;
use crate::navigator::NavState;
use crate::refs;
use crate::refs::ComponentRefs;
use crate::results_index::Cursor;
use crate::results_index::ResultItem;
use crate::results_index::ResultsIndex;
use crate::session::NavigationSource;
use crate::session::SearchSession;
use crate::visibility::ClickListener;
use crate::visibility::DocumentClick;
use crate::visibility::DocumentEvents;
use crate::visibility::VisibilityController;
use std::sync::Arc;
use storefront_async_utils::CancelErr;
use storefront_async_utils::Debouncer;
use storefront_dom::Document;
use storefront_dom::NodeId;
use storefront_dom::Reconciler;
use storefront_dom::ReplaceChildren;
use storefront_dom::Selector;
use storefront_recently_viewed::RecentlyViewedStore;
use storefront_section_renderer::SectionRenderer;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;
use url::Url;

pub const COMPONENT_TAG: &str = "home-search-component";

const SECTION_ID_ATTR: &str = "data-section-id";
const SINGLE_RESULT_ATTR: &str = "data-single-result-url";
const RESULTS_INNER_CLASS: &str = "predictive-search-results__inner";
const REMOVING_CLASS: &str = "removing";
const VALUE_ATTR: &str = "value";

/// Everything the component talks to outside its own subtree.
pub struct Collaborators {
    pub renderer: Arc<dyn SectionRenderer>,
    pub recently_viewed: Arc<dyn RecentlyViewedStore>,
    pub host: Arc<dyn Host>,
    pub reconciler: Box<dyn Reconciler>,
}

impl Collaborators {
    pub fn new(
        renderer: Arc<dyn SectionRenderer>,
        recently_viewed: Arc<dyn RecentlyViewedStore>,
        host: Arc<dyn Host>,
    ) -> Self {
        Self {
            renderer,
            recently_viewed,
            host,
            reconciler: Box::new(ReplaceChildren),
        }
    }

    pub fn with_reconciler(mut self, reconciler: Box<dyn Reconciler>) -> Self {
        self.reconciler = reconciler;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResetOrigin {
    Escape,
    Cleared,
}

enum WidgetEvent {
    Finished(std::result::Result<std::result::Result<Completion, CancelErr>, JoinError>),
    HideDue,
    SearchDue(String),
    ResetDue,
    RemovalDue,
    Click(Option<DocumentClick>),
}

pub struct HomeSearch {
    config: HomeSearchConfig,
    document: Document,
    refs: ComponentRefs,
    section_id: Option<String>,
    results_index: ResultsIndex,
    renderer: Arc<dyn SectionRenderer>,
    recently_viewed: Arc<dyn RecentlyViewedStore>,
    host: Arc<dyn Host>,
    reconciler: Box<dyn Reconciler>,
    session: SearchSession,
    search_gate: SearchGate,
    reset_gate: ResetGate,
    visibility: VisibilityController,
    fetch: FetchCoordinator,
    removal: Debouncer<()>,
    clicks: Option<ClickListener>,
    lifetime: CancellationToken,
}

/// First `<home-search-component>` in `document`.
pub fn find_component(document: &Document) -> Option<NodeId> {
    document.query(document.root(), &Selector::tag(COMPONENT_TAG))
}

impl HomeSearch {
    /// Attaches the component rooted at `component`.
    ///
    /// Fails with [`HomeSearchError::MissingRef`] when a required ref is
    /// absent. Must be called inside a Tokio runtime: timers and requests are
    /// armed on it.
    pub fn mount(
        document: Document,
        component: NodeId,
        config: HomeSearchConfig,
        collaborators: Collaborators,
        events: &DocumentEvents,
    ) -> Result<Self> {
        config.validate()?;
        let refs = ComponentRefs::resolve(&document, component)?;
        let section_id = document
            .attr(component, SECTION_ID_ATTR)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        let lifetime = CancellationToken::new();
        let Collaborators {
            renderer,
            recently_viewed,
            host,
            reconciler,
        } = collaborators;

        let mut widget = Self {
            search_gate: SearchGate::new(config.search_debounce()),
            reset_gate: ResetGate::new(config.reset_debounce()),
            visibility: VisibilityController::new(refs.results, config.hide_delay()),
            removal: Debouncer::new(config.removal_animation()),
            fetch: FetchCoordinator::new(lifetime.clone()),
            results_index: ResultsIndex::new(component),
            clicks: Some(events.listen()),
            session: SearchSession::default(),
            config,
            document,
            refs,
            section_id,
            renderer,
            recently_viewed,
            host,
            reconciler,
            lifetime,
        };
        if !widget.input_value().is_empty() {
            widget.set_reset_button_visible(true);
        }
        info!(section_id = ?widget.section_id, "home search mounted");
        Ok(widget)
    }

    /// Detaches the component: cancels the live request, every timer and the
    /// document click listener. Idempotent; also run on drop.
    pub fn unmount(&mut self) {
        if self.lifetime.is_cancelled() {
            return;
        }
        self.lifetime.cancel();
        self.clicks = None;
        self.session.cancel_active_request();
        self.search_gate.cancel();
        self.reset_gate.cancel();
        self.visibility.cancel();
        self.removal.cancel();
        self.fetch.abort_all();
        info!("home search unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        !self.lifetime.is_cancelled()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(mut self) -> Document {
        self.unmount();
        std::mem::take(&mut self.document)
    }

    pub fn refs(&self) -> &ComponentRefs {
        &self.refs
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }

    pub fn input_value(&self) -> &str {
        self.document
            .attr(self.refs.search_input, VALUE_ATTR)
            .unwrap_or_default()
    }

    pub fn cursor(&self) -> Cursor {
        self.results_index.current_index(&self.document)
    }

    pub fn current_items(&self) -> Vec<ResultItem> {
        self.results_index.current_items(&self.document)
    }

    pub fn results_markup(&self) -> String {
        self.document.inner_markup(self.refs.results)
    }

    /// The visitor edited the search field.
    pub fn on_input_changed(&mut self, raw: &str, kind: InputKind) {
        if !kind.is_text_entry() {
            debug!(?kind, "ignoring input change not caused by text entry");
            return;
        }
        self.document
            .set_attr(self.refs.search_input, VALUE_ATTR, raw);
        self.search_gate.offer(raw, kind);
    }

    pub fn on_reset_clicked(&mut self) {
        self.reset_gate.trigger();
    }

    pub fn on_focus_input(&mut self) {
        if !self.input_value().trim().is_empty() {
            self.show();
        }
    }

    /// Pointer hover over the results hands highlighting back to the mouse.
    pub fn on_pointer_over(&mut self) {
        self.session.set_navigation(NavigationSource::Pointer);
        self.results_index.clear_keyboard_focus(&mut self.document);
    }

    pub fn on_document_loaded(&mut self) {
        if self.recently_viewed_products().is_empty() {
            self.hide();
        }
    }

    pub fn on_key_down(&mut self, press: KeyPress) -> KeyOutcome {
        let cursor = self.cursor();
        let item_count = self.results_index.item_nodes(&self.document).len();
        let single_result_url = self.single_result_url();
        let action = navigator::transition(
            press,
            NavState {
                open: self.session.is_open(),
                cursor,
                item_count,
                single_result_url: single_result_url.as_deref(),
            },
        );
        let outcome = action.outcome();

        match action {
            NavAction::Reset => self.begin_reset(ResetOrigin::Escape),
            NavAction::Move(index) => {
                self.session.set_navigation(NavigationSource::Keyboard);
                self.select(Cursor::At(index));
            }
            NavAction::NavigateSingle(href) => self.navigate(&href, Navigation::SingleResult),
            NavAction::Activate(index) => self.activate(index),
            NavAction::SubmitSearch => self.submit_search(),
            NavAction::Ignore => debug!(?press, "key ignored"),
        }
        outcome
    }

    /// Clears the visitor's recently viewed products and animates their
    /// rendered block out.
    pub fn clear_recently_viewed(&mut self) {
        if let Err(err) = self.recently_viewed.clear() {
            warn!(error = %err, "failed to clear recently viewed products");
        }

        let rendered = self
            .refs
            .all(&self.document, refs::RECENTLY_VIEWED_ITEMS)
            .len()
            + self
                .refs
                .all(&self.document, refs::RECENTLY_VIEWED_TITLE)
                .len();
        if rendered == 0 {
            return;
        }

        for wrapper in self
            .refs
            .all(&self.document, refs::RECENTLY_VIEWED_WRAPPER)
        {
            self.document.add_class(wrapper, REMOVING_CLASS);
        }
        if self.reduced_motion() {
            self.remove_recently_viewed_block();
        } else {
            self.removal.schedule(());
        }
    }

    /// Waits for the next timer, completion or document click and applies
    /// it. Returns `false` once the component is unmounted.
    pub async fn tick(&mut self) -> bool {
        if self.lifetime.is_cancelled() {
            return false;
        }
        let event = tokio::select! {
            biased;
            _ = self.lifetime.cancelled() => return false,
            Some(joined) = self.fetch.next_finished() => WidgetEvent::Finished(joined),
            () = self.visibility.hide_due() => WidgetEvent::HideDue,
            value = self.search_gate.due() => WidgetEvent::SearchDue(value),
            () = self.reset_gate.due() => WidgetEvent::ResetDue,
            () = self.removal.fired() => WidgetEvent::RemovalDue,
            click = next_click(&mut self.clicks) => WidgetEvent::Click(click),
        };
        self.handle(event);
        true
    }

    /// Runs [`tick`](Self::tick) until no timer is armed, no request is in
    /// flight and no published click is waiting.
    pub async fn settle(&mut self) {
        loop {
            self.drain_clicks();
            if !self.is_busy() || !self.tick().await {
                break;
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.is_mounted()
            && (self.search_gate.is_armed()
                || self.reset_gate.is_armed()
                || self.visibility.is_hide_pending()
                || self.removal.is_armed()
                || self.fetch.in_flight() > 0)
    }

    fn handle(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::Finished(Ok(Ok(completion))) => self.on_completion(completion),
            WidgetEvent::Finished(Ok(Err(CancelErr::Cancelled))) => {}
            WidgetEvent::Finished(Err(err)) if err.is_cancelled() => {
                debug!("request task aborted");
            }
            WidgetEvent::Finished(Err(err)) => error!(error = %err, "request task panicked"),
            WidgetEvent::HideDue => self.visibility.finish_hide(&self.session, &mut self.document),
            WidgetEvent::SearchDue(value) => self.run_search(&value),
            WidgetEvent::ResetDue => {
                self.host.focus(self.refs.search_input);
                self.begin_reset(ResetOrigin::Cleared);
            }
            WidgetEvent::RemovalDue => self.remove_recently_viewed_block(),
            WidgetEvent::Click(Some(click)) => self.on_document_click(click),
            WidgetEvent::Click(None) => {
                debug!("document event bus closed; dropping click listener");
                self.clicks = None;
            }
        }
    }

    fn drain_clicks(&mut self) {
        while let Some(click) = self.clicks.as_mut().and_then(ClickListener::try_next) {
            self.on_document_click(click);
        }
    }

    fn on_document_click(&mut self, click: DocumentClick) {
        if VisibilityController::dismisses(
            &self.session,
            &self.document,
            self.refs.component,
            click,
        ) {
            debug!("click outside component; hiding results");
            self.hide();
        }
    }

    fn run_search(&mut self, value: &str) {
        let term = value.trim().to_string();
        self.select(Cursor::Input);

        if term.is_empty() {
            self.begin_reset(ResetOrigin::Cleared);
            return;
        }

        self.session.term = term.clone();
        self.set_reset_button_visible(true);
        self.show();
        self.request_results(&term);
    }

    fn request_results(&mut self, term: &str) {
        let Some(section_id) = self.section_id.clone() else {
            debug!("component has no data-section-id; skipping predictive search");
            return;
        };
        let url = match fetch::results_url(&self.host.location(), &self.config.routes, term) {
            Ok(url) => url,
            Err(err) => return self.report(err),
        };

        let token = self.fetch.issue(&mut self.session);
        let renderer = Arc::clone(&self.renderer);
        debug!(%url, "requesting predictive search results");
        self.fetch.spawn(token, RequestKind::Results, async move {
            let markup = renderer.section_html(&section_id, false, &url).await?;
            Ok(Resolved::Results(markup))
        });
    }

    /// Clears term, selection and input, then loads the empty state.
    fn begin_reset(&mut self, origin: ResetOrigin) {
        self.search_gate.cancel();
        self.select(Cursor::Input);
        self.document
            .set_attr(self.refs.search_input, VALUE_ATTR, "");
        self.session.term.clear();
        self.set_reset_button_visible(false);

        let products = self.recently_viewed_products();
        if origin == ResetOrigin::Escape || products.is_empty() {
            self.hide();
        }

        let location = self.host.location();
        let recently_viewed = match (products.is_empty(), self.section_id.clone()) {
            (true, _) => RecentlyViewedSource::None,
            (false, None) => RecentlyViewedSource::Unrenderable,
            (false, Some(section_id)) => {
                match fetch::recently_viewed_url(&location, &self.config.routes, &products) {
                    Ok(url) => RecentlyViewedSource::Fetch { section_id, url },
                    Err(err) => return self.report(err),
                }
            }
        };
        let request = EmptyStateRequest {
            empty_section_id: self.config.empty_section_id.clone(),
            empty_url: fetch::empty_state_url(&location),
            recently_viewed,
            reveal: origin == ResetOrigin::Cleared && !products.is_empty(),
        };

        let token = self.fetch.issue(&mut self.session);
        debug!(?origin, products = products.len(), "loading empty state");
        self.fetch.spawn(
            token,
            RequestKind::EmptyState,
            fallback::load_empty_state(Arc::clone(&self.renderer), request),
        );
    }

    fn on_completion(&mut self, completion: Completion) {
        let Completion {
            token,
            kind,
            outcome,
        } = completion;
        if token.is_cancelled() {
            debug!(?kind, "discarding superseded response");
            return;
        }

        match outcome {
            Ok(Resolved::Results(markup)) => {
                if markup.trim().is_empty() {
                    debug!("empty predictive search markup; keeping current results");
                    return;
                }
                match Document::parse(&markup) {
                    Ok(fragment) => self.apply(&fragment),
                    Err(err) => self.report(err.into()),
                }
            }
            Ok(Resolved::EmptyState { fragment, reveal }) => {
                let Some(fragment) = fragment else {
                    return;
                };
                self.apply(&fragment);
                if reveal {
                    self.show();
                }
            }
            Err(err) => self.report(err),
        }
    }

    /// Reconciles the results container with `fragment` and scrolls the
    /// results viewport back to the top.
    fn apply(&mut self, fragment: &Document) {
        self.reconciler
            .reconcile(&mut self.document, self.refs.results, fragment);
        let viewport = self
            .document
            .query(self.refs.results, &Selector::class(RESULTS_INNER_CLASS))
            .unwrap_or(self.refs.results);
        self.host.reset_scroll(viewport);
    }

    /// Keyboard focus styling follows the navigation source recorded in the
    /// session.
    fn select(&mut self, cursor: Cursor) {
        let source = self.session.navigation().unwrap_or_default();
        let Some(selected) = self
            .results_index
            .set_index(&mut self.document, cursor, source)
        else {
            return;
        };
        if let Some(node) = selected {
            self.host.scroll_into_view(node, self.scroll_behavior());
        }
        self.host.focus(self.refs.search_input);
    }

    fn activate(&self, index: usize) {
        let target = self
            .current_items()
            .into_iter()
            .find(|item| item.position == index)
            .and_then(|item| item.activation_target);
        match target {
            Some(href) => self.navigate(&href, Navigation::ActivateItem),
            None => debug!(index, "selected item has no link to activate"),
        }
    }

    fn submit_search(&self) {
        let term = self.input_value().trim().to_string();
        match fetch::search_page_url(&self.host.location(), &self.config.routes, &term) {
            Ok(url) => self.dispatch(Navigation::SearchPage(url)),
            Err(err) => self.report(err),
        }
    }

    fn navigate(&self, href: &str, navigation: fn(Url) -> Navigation) {
        match fetch::resolve_link(&self.host.location(), href) {
            Ok(url) => self.dispatch(navigation(url)),
            Err(err) => self.report(err),
        }
    }

    fn dispatch(&self, navigation: Navigation) {
        info!(kind = navigation.kind(), url = %navigation.url(), "navigating");
        self.host.navigate(navigation);
    }

    fn single_result_url(&self) -> Option<String> {
        self.document
            .query(self.refs.results, &Selector::attr(SINGLE_RESULT_ATTR))
            .and_then(|node| self.document.attr(node, SINGLE_RESULT_ATTR))
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    }

    fn remove_recently_viewed_block(&mut self) {
        for wrapper in self
            .refs
            .all(&self.document, refs::RECENTLY_VIEWED_WRAPPER)
        {
            if self.document.has_class(wrapper, REMOVING_CLASS) {
                self.document.remove(wrapper);
            }
        }
    }

    fn show(&mut self) {
        self.visibility.show(&mut self.session, &mut self.document);
    }

    fn hide(&mut self) {
        self.visibility.hide(&mut self.session, &mut self.document);
    }

    fn set_reset_button_visible(&mut self, visible: bool) {
        self.document
            .set_hidden(self.refs.reset_button, !visible);
    }

    fn recently_viewed_products(&self) -> Vec<String> {
        self.recently_viewed.products().unwrap_or_else(|err| {
            warn!(error = %err, "failed to read recently viewed products");
            Vec::new()
        })
    }

    fn reduced_motion(&self) -> bool {
        self.config.reduced_motion || self.host.prefers_reduced_motion()
    }

    fn scroll_behavior(&self) -> ScrollBehavior {
        if self.reduced_motion() {
            ScrollBehavior::Instant
        } else {
            ScrollBehavior::Smooth
        }
    }

    fn report(&self, err: HomeSearchError) {
        error!(error = %err, "unhandled home search error");
        self.host.report_unhandled(&err);
    }
}

impl Drop for HomeSearch {
    fn drop(&mut self) {
        self.unmount();
    }
}

async fn next_click(listener: &mut Option<ClickListener>) -> Option<DocumentClick> {
    match listener {
        Some(listener) => listener.next().await,
        None => std::future::pending().await,
    }
}
