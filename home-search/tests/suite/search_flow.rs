use crate::suite::support::EMPTY_SECTION_ID;
use crate::suite::support::EMPTY_STATE;
use crate::suite::support::PAGE;
use crate::suite::support::SECTION_ID;
use crate::suite::support::ScriptedRenderer;
use crate::suite::support::harness;
use crate::suite::support::harness_with;
use crate::suite::support::shoes_renderer;
use crate::suite::support::yield_to_tasks;
use pretty_assertions::assert_eq;
use std::time::Duration;
use storefront_home_search::HomeSearchConfig;
use storefront_home_search::HostEvent;
use storefront_home_search::InputKind;
use storefront_home_search::Key;
use storefront_recently_viewed::InMemoryStore;
use tokio::time::advance;

#[tokio::test(start_paused = true)]
async fn keystroke_burst_issues_one_request_with_last_value() {
    let mut h = harness(shoes_renderer(), InMemoryStore::default());

    for value in ["s", "sh", "sho", "shoe", "shoes"] {
        h.type_text(value);
        advance(Duration::from_millis(40)).await;
    }
    h.widget.settle().await;

    let calls = h.renderer.calls();
    assert_eq!(1, calls.len());
    assert_eq!(SECTION_ID, calls[0].section_id);
    assert_eq!(Some("shoes".to_string()), calls[0].param("q"));
    assert_eq!(
        Some("each".to_string()),
        calls[0].param("resources[limit_scope]")
    );
    assert_eq!("/search/suggest", calls[0].url.path());

    assert!(h.widget.is_open());
    assert!(h.results_have_visible_class());
    assert!(!h.results_hidden());
    assert!(!h.reset_button_hidden());
    assert_eq!("shoes", h.widget.session().term);
    assert_eq!(
        vec!["/search?q=shoes+red", "/products/runner", "/products/boot"],
        h.item_hrefs()
    );
    let inner = h.node(".predictive-search-results__inner");
    assert!(h.host.events().contains(&HostEvent::ResetScroll(inner)));
}

#[tokio::test(start_paused = true)]
async fn superseded_request_is_cancelled_without_mutation() {
    let renderer = ScriptedRenderer::default();
    renderer.respond(SECTION_ID, Some("slow"), "<p>slow</p>", Duration::from_millis(500));
    renderer.respond(SECTION_ID, Some("fast"), "<p>fast</p>", Duration::from_millis(10));
    let mut h = harness(renderer, InMemoryStore::default());

    h.type_text("slow");
    h.step().await;
    assert_eq!(1, h.renderer.calls().len());
    h.type_text("fast");
    h.widget.settle().await;

    assert_eq!(2, h.renderer.calls().len());
    assert_eq!(1, h.reconciles.count());
    assert_eq!("<p>fast</p>", h.widget.results_markup());
    assert!(h.host.unhandled().is_empty());
}

#[tokio::test(start_paused = true)]
async fn resolved_but_superseded_response_is_discarded_on_delivery() {
    let renderer = ScriptedRenderer::default();
    renderer.respond(SECTION_ID, Some("a"), "<p>a</p>", Duration::from_millis(10));
    renderer.respond(EMPTY_SECTION_ID, None, EMPTY_STATE, Duration::from_millis(10));
    let mut h = harness(renderer, InMemoryStore::default());

    h.type_text("a");
    h.step().await;
    assert_eq!(1, h.renderer.calls().len());
    // Let the request finish while nobody is ticking the widget.
    advance(Duration::from_millis(20)).await;
    yield_to_tasks().await;

    // Escape issues a new request, cancelling the finished one before its
    // completion is delivered.
    h.key(Key::Escape);
    h.widget.settle().await;

    assert_eq!(1, h.reconciles.count());
    assert!(!h.widget.results_markup().contains("<p>a</p>"));
    assert!(h.widget.results_markup().contains("predictive-search-empty-section"));
}

#[tokio::test(start_paused = true)]
async fn rapid_alternating_empty_and_non_empty_input_settles_on_latest() {
    let renderer = ScriptedRenderer::default();
    renderer.respond(SECTION_ID, Some("a"), "<p>a</p>", Duration::from_millis(300));
    renderer.respond(SECTION_ID, Some("b"), "<p>b</p>", Duration::from_millis(50));
    renderer.respond(EMPTY_SECTION_ID, None, EMPTY_STATE, Duration::from_millis(300));
    let mut h = harness(renderer, InMemoryStore::default());

    h.type_text("a");
    h.step().await;
    assert_eq!(1, h.renderer.calls().len());
    h.erase_to("");
    h.step().await;
    assert_eq!(2, h.renderer.calls().len());
    assert!(!h.widget.is_open());
    h.type_text("b");
    h.widget.settle().await;

    let sections: Vec<String> = h
        .renderer
        .calls()
        .into_iter()
        .map(|call| call.section_id)
        .collect();
    assert_eq!(vec![SECTION_ID, EMPTY_SECTION_ID, SECTION_ID], sections);
    assert_eq!(1, h.reconciles.count());
    assert_eq!("<p>b</p>", h.widget.results_markup());
    assert!(h.widget.is_open());
    assert!(!h.results_hidden());
}

#[tokio::test(start_paused = true)]
async fn failed_request_is_reported_and_leaves_results_alone() {
    let renderer = shoes_renderer();
    renderer.fail(SECTION_ID, Some("boom"), 502);
    let mut h = harness(renderer, InMemoryStore::default());
    h.search("shoes").await;
    let before = h.widget.results_markup();

    h.search("boom").await;

    let unhandled = h.host.unhandled();
    assert_eq!(1, unhandled.len());
    assert!(unhandled[0].contains("502"), "{unhandled:?}");
    assert_eq!(before, h.widget.results_markup());
}

#[tokio::test(start_paused = true)]
async fn empty_markup_keeps_previous_results() {
    let mut h = harness(shoes_renderer(), InMemoryStore::default());
    h.search("shoes").await;

    h.search("unknown").await;

    assert_eq!(1, h.reconciles.count());
    assert!(h.widget.results_markup().contains("Runner"));
}

#[tokio::test(start_paused = true)]
async fn programmatic_changes_never_search() {
    let mut h = harness(shoes_renderer(), InMemoryStore::default());

    h.widget.on_input_changed("shoes", InputKind::Programmatic);
    h.widget.settle().await;

    assert!(h.renderer.calls().is_empty());
    assert_eq!("", h.widget.input_value());
}

#[tokio::test(start_paused = true)]
async fn component_without_section_id_does_not_request_results() {
    let page = PAGE.replace(r#" data-section-id="predictive-search""#, "");
    let mut h = harness_with(
        &page,
        shoes_renderer(),
        InMemoryStore::default(),
        HomeSearchConfig::default(),
        false,
    );

    h.search("shoes").await;

    assert!(h.renderer.calls().is_empty());
    assert!(h.widget.is_open());
}

#[tokio::test(start_paused = true)]
async fn custom_debounce_window_is_honoured() {
    let config = HomeSearchConfig {
        search_debounce_ms: 500,
        ..HomeSearchConfig::default()
    };
    let mut h = harness_with(
        PAGE,
        shoes_renderer(),
        InMemoryStore::default(),
        config,
        false,
    );

    h.type_text("sho");
    advance(Duration::from_millis(400)).await;
    h.type_text("shoes");
    h.widget.settle().await;

    assert_eq!(1, h.renderer.calls().len());
}
