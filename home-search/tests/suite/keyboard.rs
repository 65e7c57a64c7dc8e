use crate::suite::support::PAGE;
use crate::suite::support::SECTION_ID;
use crate::suite::support::ScriptedRenderer;
use crate::suite::support::harness;
use crate::suite::support::harness_with;
use crate::suite::support::shoes_renderer;
use pretty_assertions::assert_eq;
use std::time::Duration;
use storefront_home_search::Cursor;
use storefront_home_search::HomeSearchConfig;
use storefront_home_search::HostEvent;
use storefront_home_search::Key;
use storefront_home_search::KeyPress;
use storefront_home_search::Navigation;
use storefront_home_search::NavigationSource;
use storefront_home_search::ScrollBehavior;
use storefront_recently_viewed::InMemoryStore;
use url::Url;

const KEYBOARD_FOCUS: &str = "keyboard-focus";

fn url(raw: &str) -> Url {
    Url::parse(raw).unwrap()
}

#[tokio::test(start_paused = true)]
async fn arrow_down_walks_items_and_wraps() {
    let mut h = harness(shoes_renderer(), InMemoryStore::default());
    h.search("shoes").await;
    h.host.take_events();

    for expected in [0, 1, 2] {
        let outcome = h.key(Key::ArrowDown);
        assert!(outcome.prevent_default);
        assert_eq!(Cursor::At(expected), h.widget.cursor());
    }
    h.key(Key::ArrowDown);

    assert_eq!(Cursor::At(0), h.widget.cursor());
    let items = h.widget.current_items();
    assert!(items[0].selected);
    assert!(items.iter().skip(1).all(|item| !item.selected));
    assert!(h.widget.document().has_class(items[0].node, KEYBOARD_FOCUS));
    assert_eq!(
        vec![
            HostEvent::ScrollIntoView(items[0].node, ScrollBehavior::Smooth),
            HostEvent::Focus(h.widget.refs().search_input),
        ],
        h.host.events()[6..].to_vec()
    );
}

#[tokio::test(start_paused = true)]
async fn arrow_up_and_shift_tab_wrap_backwards() {
    let mut h = harness(shoes_renderer(), InMemoryStore::default());
    h.search("shoes").await;

    h.key(Key::ArrowUp);
    assert_eq!(Cursor::At(2), h.widget.cursor());

    h.widget.on_key_down(KeyPress::shifted(Key::Tab));
    assert_eq!(Cursor::At(1), h.widget.cursor());

    h.key(Key::Tab);
    h.key(Key::Tab);
    assert_eq!(Cursor::At(0), h.widget.cursor());
}

#[tokio::test(start_paused = true)]
async fn horizontal_arrows_leave_selection_alone() {
    let mut h = harness(shoes_renderer(), InMemoryStore::default());
    h.search("shoes").await;
    h.key(Key::ArrowDown);

    let left = h.key(Key::ArrowLeft);
    let right = h.key(Key::ArrowRight);

    assert!(!left.prevent_default);
    assert!(!right.prevent_default);
    assert_eq!(Cursor::At(0), h.widget.cursor());
}

#[tokio::test(start_paused = true)]
async fn pointer_hover_clears_keyboard_focus() {
    let mut h = harness(shoes_renderer(), InMemoryStore::default());
    h.search("shoes").await;
    h.key(Key::ArrowDown);

    h.widget.on_pointer_over();

    let items = h.widget.current_items();
    assert!(items[0].selected);
    assert!(
        items
            .iter()
            .all(|item| !h.widget.document().has_class(item.node, KEYBOARD_FOCUS))
    );
}

#[tokio::test(start_paused = true)]
async fn keyboard_focus_styling_tracks_session_navigation_source() {
    let mut h = harness(shoes_renderer(), InMemoryStore::default());
    h.search("shoes").await;
    assert_eq!(
        Some(NavigationSource::Pointer),
        h.widget.session().navigation()
    );

    h.key(Key::ArrowDown);
    assert_eq!(
        Some(NavigationSource::Keyboard),
        h.widget.session().navigation()
    );

    h.widget.on_pointer_over();
    assert_eq!(
        Some(NavigationSource::Pointer),
        h.widget.session().navigation()
    );

    h.key(Key::ArrowDown);
    let items = h.widget.current_items();
    assert!(items[1].selected);
    assert!(h.widget.document().has_class(items[1].node, KEYBOARD_FOCUS));
    assert!(!h.widget.document().has_class(items[0].node, KEYBOARD_FOCUS));
}

#[tokio::test(start_paused = true)]
async fn enter_activates_selected_item_link() {
    let mut h = harness(shoes_renderer(), InMemoryStore::default());
    h.search("shoes").await;
    h.key(Key::ArrowDown);
    h.key(Key::ArrowDown);

    let outcome = h.key(Key::Enter);

    assert!(outcome.prevent_default);
    assert_eq!(
        vec![Navigation::ActivateItem(url("https://shop.test/products/runner"))],
        h.host.navigations()
    );
}

#[tokio::test(start_paused = true)]
async fn enter_without_selection_submits_trimmed_term() {
    let mut h = harness(shoes_renderer(), InMemoryStore::default());
    h.search("shoes ").await;
    assert_eq!(Some("shoes".to_string()), h.renderer.calls()[0].param("q"));

    let outcome = h.key(Key::Enter);

    assert!(!outcome.prevent_default);
    assert_eq!(
        vec![Navigation::SearchPage(url("https://shop.test/search?q=shoes"))],
        h.host.navigations()
    );
}

#[tokio::test(start_paused = true)]
async fn enter_prefers_single_result_shortcut_over_selection() {
    let renderer = ScriptedRenderer::default();
    renderer.respond(
        SECTION_ID,
        Some("runner"),
        r#"<div class="predictive-search-results__inner" data-single-result-url="/products/runner">
             <ul class="predictive-search-results__list">
               <li ref="resultsItems[]"><a href="/search?q=runner">runner</a></li>
             </ul>
           </div>"#,
        Duration::from_millis(10),
    );
    let mut h = harness(renderer, InMemoryStore::default());
    h.search("runner").await;
    h.key(Key::ArrowDown);

    let outcome = h.key(Key::Enter);

    assert!(outcome.prevent_default);
    assert_eq!(
        vec![Navigation::SingleResult(url("https://shop.test/products/runner"))],
        h.host.navigations()
    );
}

#[tokio::test(start_paused = true)]
async fn navigation_keys_need_items() {
    let renderer = ScriptedRenderer::default();
    renderer.respond(SECTION_ID, Some("zzz"), "<p>No results</p>", Duration::from_millis(10));
    let mut h = harness(renderer, InMemoryStore::default());
    h.search("zzz").await;
    assert!(h.widget.is_open());

    let down = h.key(Key::ArrowDown);
    let enter = h.key(Key::Enter);

    assert!(!down.prevent_default);
    assert!(!enter.prevent_default);
    assert!(h.host.navigations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn reduced_motion_scrolls_instantly() {
    let mut h = harness_with(
        PAGE,
        shoes_renderer(),
        InMemoryStore::default(),
        HomeSearchConfig::default(),
        true,
    );
    h.search("shoes").await;
    h.host.take_events();

    h.key(Key::ArrowUp);

    let last = h.widget.current_items()[2].node;
    assert_eq!(
        HostEvent::ScrollIntoView(last, ScrollBehavior::Instant),
        h.host.events()[0]
    );
}
