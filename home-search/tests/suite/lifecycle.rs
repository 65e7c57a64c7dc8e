use crate::suite::support::Harness;
use crate::suite::support::PAGE;
use crate::suite::support::SECTION_ID;
use crate::suite::support::ScriptedRenderer;
use crate::suite::support::harness;
use crate::suite::support::harness_with;
use crate::suite::support::location;
use crate::suite::support::shoes_renderer;
use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use storefront_dom::Document;
use storefront_home_search::Collaborators;
use storefront_home_search::DocumentEvents;
use storefront_home_search::HomeSearch;
use storefront_home_search::HomeSearchConfig;
use storefront_home_search::HomeSearchError;
use storefront_home_search::RecordingHost;
use storefront_home_search::find_component;
use storefront_recently_viewed::InMemoryStore;

#[tokio::test(start_paused = true)]
async fn outside_click_hides_open_results() {
    let mut h = harness(shoes_renderer(), InMemoryStore::default());
    h.search("shoes").await;
    let main = h.node("main#main");

    assert_eq!(1, h.events.click(main));
    h.widget.settle().await;

    assert!(!h.widget.is_open());
    assert!(h.results_hidden());
}

#[tokio::test(start_paused = true)]
async fn click_inside_component_keeps_results_open() {
    let mut h = harness(shoes_renderer(), InMemoryStore::default());
    h.search("shoes").await;
    let input = h.widget.refs().search_input;

    h.events.click(input);
    h.events.click(h.node("li.predictive-search-results__card"));
    h.widget.settle().await;

    assert!(h.widget.is_open());
    assert!(!h.results_hidden());
}

#[tokio::test(start_paused = true)]
async fn outside_click_while_closed_is_ignored() {
    let mut h = harness(shoes_renderer(), InMemoryStore::default());

    h.events.click(h.node("header#site-header"));
    h.widget.settle().await;

    assert!(!h.widget.is_busy());
    assert!(h.renderer.calls().is_empty());
    assert!(!h.widget.is_open());
}

#[tokio::test(start_paused = true)]
async fn focusing_input_with_text_reopens_results() {
    let mut h = harness(shoes_renderer(), InMemoryStore::default());
    h.search("shoes").await;
    h.events.click(h.node("main#main"));
    h.widget.settle().await;
    assert!(h.results_hidden());

    h.widget.on_focus_input();

    assert!(h.widget.is_open());
    assert!(h.results_have_visible_class());
    assert!(!h.results_hidden());
    assert_eq!(1, h.renderer.calls().len());
}

#[tokio::test(start_paused = true)]
async fn focusing_blank_input_stays_closed() {
    let mut h = harness(shoes_renderer(), InMemoryStore::default());

    h.widget.on_focus_input();

    assert!(!h.widget.is_open());
    assert!(h.results_hidden());
}

#[tokio::test(start_paused = true)]
async fn show_during_pending_hide_cancels_collapse() {
    let mut h = harness(shoes_renderer(), InMemoryStore::default());
    h.search("shoes").await;
    h.events.click(h.node("main#main"));
    h.step().await;
    assert!(h.widget.is_busy());

    h.widget.on_focus_input();
    h.widget.settle().await;

    assert!(h.widget.is_open());
    assert!(!h.results_hidden());
}

#[tokio::test]
async fn missing_ref_refuses_to_mount() {
    let page = PAGE.replace(r#"ref="resetButton" "#, "");
    let document = Document::parse(&page).unwrap();
    let component = find_component(&document).unwrap();
    let events = DocumentEvents::new();
    let collaborators = Collaborators::new(
        Arc::new(ScriptedRenderer::default()),
        Arc::new(InMemoryStore::default()),
        Arc::new(RecordingHost::new(location())),
    );

    let err = HomeSearch::mount(
        document,
        component,
        HomeSearchConfig::default(),
        collaborators,
        &events,
    )
    .err()
    .unwrap();

    assert_matches!(err, HomeSearchError::MissingRef("resetButton"));
    assert_eq!(0, events.listener_count());
}

#[tokio::test]
async fn invalid_config_refuses_to_mount() {
    let document = Document::parse(PAGE).unwrap();
    let component = find_component(&document).unwrap();
    let config = HomeSearchConfig {
        empty_section_id: "  ".to_string(),
        ..HomeSearchConfig::default()
    };
    let collaborators = Collaborators::new(
        Arc::new(ScriptedRenderer::default()),
        Arc::new(InMemoryStore::default()),
        Arc::new(RecordingHost::new(location())),
    );

    let err = HomeSearch::mount(
        document,
        component,
        config,
        collaborators,
        &DocumentEvents::new(),
    )
    .err()
    .unwrap();

    assert_matches!(err, HomeSearchError::Config(_));
}

#[tokio::test(start_paused = true)]
async fn prefilled_input_shows_reset_button() {
    let page = PAGE.replace(r#"name="q""#, r#"name="q" value="socks""#);
    let h = harness_with(
        &page,
        shoes_renderer(),
        InMemoryStore::default(),
        HomeSearchConfig::default(),
        false,
    );

    assert!(!h.reset_button_hidden());
    assert_eq!("socks", h.widget.input_value());
    assert!(!h.widget.is_open());
}

#[tokio::test(start_paused = true)]
async fn unmount_cancels_live_request_and_detaches() {
    let renderer = ScriptedRenderer::default();
    renderer.respond(SECTION_ID, Some("slow"), "<p>slow</p>", Duration::from_millis(500));
    let mut h = harness(renderer, InMemoryStore::default());
    assert_eq!(1, h.events.listener_count());

    h.type_text("slow");
    h.step().await;
    let token = h.widget.session().active_request().cloned().unwrap();
    h.type_text("slower");

    h.widget.unmount();
    h.widget.unmount();

    assert!(token.is_cancelled());
    assert!(!h.widget.is_mounted());
    assert!(!h.widget.is_busy());
    assert_eq!(0, h.events.listener_count());
    assert!(!h.widget.tick().await);
    assert_eq!("", h.widget.results_markup());
    assert_eq!(1, h.renderer.calls().len());
}

#[tokio::test(start_paused = true)]
async fn dropping_widget_detaches_click_listener() {
    let Harness { widget, events, .. } = harness(shoes_renderer(), InMemoryStore::default());
    assert_eq!(1, events.listener_count());

    drop(widget);

    assert_eq!(0, events.listener_count());
}

#[tokio::test(start_paused = true)]
async fn into_document_keeps_rendered_results() {
    let mut h = harness(shoes_renderer(), InMemoryStore::default());
    h.search("shoes").await;

    let document = h.widget.into_document();

    assert!(document.inner_markup(document.root()).contains("/products/runner"));
    assert_eq!(0, h.events.listener_count());
}
