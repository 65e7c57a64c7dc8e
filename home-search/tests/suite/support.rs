use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;
use storefront_dom::Document;
use storefront_dom::NodeId;
use storefront_dom::Reconciler;
use storefront_dom::ReplaceChildren;
use storefront_dom::Selector;
use storefront_home_search::Collaborators;
use storefront_home_search::DocumentEvents;
use storefront_home_search::HomeSearch;
use storefront_home_search::HomeSearchConfig;
use storefront_home_search::InputKind;
use storefront_home_search::Key;
use storefront_home_search::KeyOutcome;
use storefront_home_search::KeyPress;
use storefront_home_search::RecordingHost;
use storefront_home_search::find_component;
use storefront_recently_viewed::InMemoryStore;
use storefront_section_renderer::RenderError;
use storefront_section_renderer::SectionRenderer;
use storefront_section_renderer::StatusCode;
use url::Url;

pub const SECTION_ID: &str = "predictive-search";
pub const EMPTY_SECTION_ID: &str = "predictive-search-empty";

pub const PAGE: &str = r#"<header id="site-header"><a href="/">Home</a></header>
<home-search-component data-section-id="predictive-search">
  <form action="/search">
    <input ref="searchInput" type="search" name="q">
    <button ref="resetButton" type="button" hidden>Clear</button>
  </form>
  <div ref="predictiveSearchResults" class="predictive-search-results" hidden></div>
</home-search-component>
<main id="main"><p>Welcome</p></main>"#;

pub const SHOES_RESULTS: &str = r#"<div class="predictive-search-results__inner">
  <div class="predictive-search-results__wrapper-queries">
    <ul><li ref="resultsItems[]"><a href="/search?q=shoes+red">shoes red</a></li></ul>
  </div>
  <div class="predictive-search-results__wrapper-products">
    <ul id="predictive-search-products">
      <li class="predictive-search-results__card"><a href="/products/runner">Runner</a></li>
      <li class="predictive-search-results__card"><a href="/products/boot">Boot</a></li>
    </ul>
  </div>
</div>"#;

pub const EMPTY_STATE: &str = r#"<div id="shopify-section-predictive-search-empty">
  <div class="predictive-search-empty-section">
    <div class="predictive-search-results__inner">
      <div class="predictive-search-results__wrapper-products">
        <ul id="predictive-search-products">
          <li class="predictive-search-results__card"><a href="/products/bestseller">Bestseller</a></li>
        </ul>
      </div>
    </div>
  </div>
</div>"#;

pub const RECENTLY_VIEWED: &str = r#"<div class="predictive-search-results__wrapper-products">
  <h4 ref="recentlyViewedTitle[]">Recently viewed</h4>
  <ul id="predictive-search-products">
    <li class="predictive-search-results__card"><a ref="recentlyViewedItems[]" href="/products/a">A</a></li>
    <li class="predictive-search-results__card"><a ref="recentlyViewedItems[]" href="/products/b">B</a></li>
  </ul>
</div>"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderCall {
    pub section_id: String,
    pub url: Url,
}

impl RenderCall {
    pub fn param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

#[derive(Debug, Clone)]
struct Route {
    section_id: String,
    query: Option<String>,
    delay: Duration,
    response: Result<String, u16>,
}

/// Section renderer answering from a fixed table. Unmatched requests get an
/// empty body.
#[derive(Debug, Default)]
pub struct ScriptedRenderer {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<RenderCall>>,
}

impl ScriptedRenderer {
    pub fn respond(&self, section_id: &str, query: Option<&str>, markup: &str, delay: Duration) {
        self.routes.lock().push(Route {
            section_id: section_id.to_string(),
            query: query.map(str::to_string),
            delay,
            response: Ok(markup.to_string()),
        });
    }

    pub fn fail(&self, section_id: &str, query: Option<&str>, status: u16) {
        self.routes.lock().push(Route {
            section_id: section_id.to_string(),
            query: query.map(str::to_string),
            delay: Duration::ZERO,
            response: Err(status),
        });
    }

    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, section_id: &str) -> Vec<RenderCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.section_id == section_id)
            .collect()
    }
}

#[async_trait]
impl SectionRenderer for ScriptedRenderer {
    async fn section_html(
        &self,
        section_id: &str,
        _cacheable: bool,
        url: &Url,
    ) -> storefront_section_renderer::Result<String> {
        let call = RenderCall {
            section_id: section_id.to_string(),
            url: url.clone(),
        };
        let query = call.param("q");
        self.calls.lock().push(call);
        let route = self
            .routes
            .lock()
            .iter()
            .find(|route| {
                route.section_id == section_id
                    && (route.query.is_none() || route.query == query)
            })
            .cloned();
        let Some(route) = route else {
            return Ok(String::new());
        };
        tokio::time::sleep(route.delay).await;
        route.response.map_err(|status| RenderError::Status {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            url: url.to_string(),
        })
    }
}

/// Children-replacing reconciler that counts its invocations.
#[derive(Debug, Default, Clone)]
pub struct CountingReconciler {
    count: Arc<AtomicUsize>,
}

impl CountingReconciler {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Reconciler for CountingReconciler {
    fn reconcile(&mut self, document: &mut Document, target: NodeId, content: &Document) {
        self.count.fetch_add(1, Ordering::SeqCst);
        ReplaceChildren.reconcile(document, target, content);
    }
}

pub struct Harness {
    pub widget: HomeSearch,
    pub host: Arc<RecordingHost>,
    pub renderer: Arc<ScriptedRenderer>,
    pub store: Arc<InMemoryStore>,
    pub events: DocumentEvents,
    pub reconciles: CountingReconciler,
}

pub fn location() -> Url {
    Url::parse("https://shop.test/?page=2").unwrap()
}

pub fn harness(renderer: ScriptedRenderer, store: InMemoryStore) -> Harness {
    harness_with(PAGE, renderer, store, HomeSearchConfig::default(), false)
}

pub fn harness_with(
    page: &str,
    renderer: ScriptedRenderer,
    store: InMemoryStore,
    config: HomeSearchConfig,
    reduced_motion: bool,
) -> Harness {
    let document = Document::parse(page).unwrap();
    let component = find_component(&document).unwrap();
    let host = Arc::new(RecordingHost::new(location()).with_reduced_motion(reduced_motion));
    let renderer = Arc::new(renderer);
    let store = Arc::new(store);
    let events = DocumentEvents::new();
    let reconciles = CountingReconciler::default();
    let collaborators = Collaborators::new(renderer.clone(), store.clone(), host.clone())
        .with_reconciler(Box::new(reconciles.clone()));
    let widget =
        HomeSearch::mount(document, component, config, collaborators, &events).unwrap();
    Harness {
        widget,
        host,
        renderer,
        store,
        events,
        reconciles,
    }
}

/// Renderer serving [`SHOES_RESULTS`] for `q=shoes`.
pub fn shoes_renderer() -> ScriptedRenderer {
    let renderer = ScriptedRenderer::default();
    renderer.respond(SECTION_ID, Some("shoes"), SHOES_RESULTS, Duration::from_millis(30));
    renderer.respond(EMPTY_SECTION_ID, None, EMPTY_STATE, Duration::from_millis(30));
    renderer
}

impl Harness {
    pub fn type_text(&mut self, value: &str) {
        self.widget.on_input_changed(value, InputKind::InsertText);
    }

    pub fn erase_to(&mut self, value: &str) {
        self.widget.on_input_changed(value, InputKind::DeleteBackward);
    }

    pub fn key(&mut self, key: Key) -> KeyOutcome {
        self.widget.on_key_down(KeyPress::new(key))
    }

    /// Types `term` and waits until its results are rendered.
    pub async fn search(&mut self, term: &str) {
        self.type_text(term);
        self.widget.settle().await;
    }

    /// Handles exactly one widget event, then lets freshly spawned request
    /// tasks run up to their first suspension point.
    pub async fn step(&mut self) {
        assert!(self.widget.tick().await, "widget unmounted while stepping");
        yield_to_tasks().await;
    }

    pub fn results(&self) -> NodeId {
        self.widget.refs().results
    }

    pub fn results_hidden(&self) -> bool {
        self.widget.document().is_hidden(self.results())
    }

    pub fn results_have_visible_class(&self) -> bool {
        self.widget.document().has_class(self.results(), "visible")
    }

    pub fn reset_button_hidden(&self) -> bool {
        self.widget
            .document()
            .is_hidden(self.widget.refs().reset_button)
    }

    pub fn node(&self, selector: &str) -> NodeId {
        let document = self.widget.document();
        document
            .query(document.root(), &Selector::parse(selector).unwrap())
            .unwrap()
    }

    pub fn item_hrefs(&self) -> Vec<String> {
        self.widget
            .current_items()
            .into_iter()
            .filter_map(|item| item.activation_target)
            .collect()
    }
}

pub async fn yield_to_tasks() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}
