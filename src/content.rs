/// Content script bootstrap: route watching and per-page lifecycle
///
/// The host is a single-page app, so real navigations are rare; route changes
/// surface as DOM churn with a new location. A body observer watches for the
/// URL moving and re-dispatches. Each visit to the subscriptions feed gets a
/// fresh engine and UI mount, both torn down when the user leaves.
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, MutationObserver, MutationObserverInit, Window};

use crate::scanner;
use crate::scraper;
use crate::storage;
use crate::ui::feed::FeedSection;
use crate::video_filter::VideoFilter;
use yew::AppHandle;

const FEED_PATH: &str = "/feed/subscriptions";
const CHANNELS_PATH: &str = "/feed/channels";
const ROOT_ID: &str = "feed-curator-root";

const INJECT_RETRY_MS: i32 = 100;
const INJECT_MAX_ATTEMPTS: i32 = 100;

#[derive(Default)]
struct PageState {
    engine: Option<VideoFilter>,
    app: Option<AppHandle<FeedSection>>,
    inject_interval: Option<i32>,
}

thread_local! {
    static PAGE: RefCell<PageState> = RefCell::new(PageState::default());
}

/// Entry point, called once when the content script loads
pub fn start() {
    if page_still_loading(&document()) {
        let init_cb = Closure::once_into_js(init);
        if let Err(e) = document()
            .add_event_listener_with_callback("DOMContentLoaded", init_cb.unchecked_ref())
        {
            log::error!("Failed to defer startup: {:?}", e);
        }
    } else {
        init();
    }
}

/// True while the document is still parsing and DOMContentLoaded has not
/// fired. `ready_state` reports a plain string.
pub fn page_still_loading(document: &Document) -> bool {
    document.ready_state() == "loading"
}

fn init() {
    log::info!("Feed Curator content script active");

    watch_url_changes();
    clear_filters_on_unload();

    // Writes from other contexts (another tab, the settings modal) flow
    // straight into the running engine.
    storage::subscribe_changes(|data| {
        PAGE.with(|page| {
            if let Some(engine) = page.borrow().engine.as_ref() {
                engine.update_channels(data.channels.clone());
                engine.update_filters(data.active_filters.clone());
            }
        });
    });

    handle_route();
}

/// Track location changes through the SPA. The body observer fires on any
/// churn; the handler is a cheap href comparison.
fn watch_url_changes() {
    let last_url = Rc::new(RefCell::new(current_href()));

    let nav_cb = Closure::wrap(Box::new(move || {
        let href = current_href();
        let mut last = last_url.borrow_mut();
        if *last != href {
            *last = href;
            drop(last);
            handle_route();
        }
    }) as Box<dyn FnMut()>);

    match MutationObserver::new(nav_cb.as_ref().unchecked_ref()) {
        Ok(observer) => {
            let init = MutationObserverInit::new();
            init.set_child_list(true);
            init.set_subtree(true);
            if let Some(body) = document().body() {
                if let Err(e) = observer.observe_with_options(&body, &init) {
                    log::error!("Failed to watch for navigation: {:?}", e);
                }
            }
            // Watches for the lifetime of the page.
            nav_cb.forget();
        }
        Err(e) => log::error!("Failed to create navigation observer: {:?}", e),
    }
}

/// Active filters are a per-session view preference, not persistent state
fn clear_filters_on_unload() {
    let unload_cb = Closure::wrap(Box::new(move || {
        spawn_local(async {
            let cleared = async {
                let mut data = storage::load_storage().await?;
                data.clear_active_filters();
                storage::save_storage(&data).await
            };
            if let Err(e) = cleared.await {
                log::warn!("Failed to clear filters on unload: {}", e);
            }
        });
    }) as Box<dyn FnMut()>);

    if let Err(e) =
        window().add_event_listener_with_callback("beforeunload", unload_cb.as_ref().unchecked_ref())
    {
        log::warn!("Failed to register unload handler: {:?}", e);
    }
    unload_cb.forget();
}

fn handle_route() {
    let path = window().location().pathname().unwrap_or_default();
    log::debug!("Route: {}", path);

    if path == FEED_PATH {
        mount_feed();
    } else if path == CHANNELS_PATH {
        teardown_feed();
        scraper::run_scrape_flow();
    } else {
        teardown_feed();
    }
}

fn mount_feed() {
    let already_mounted = PAGE.with(|page| page.borrow().engine.is_some());
    if already_mounted {
        return;
    }

    match VideoFilter::new() {
        Ok(engine) => {
            PAGE.with(|page| page.borrow_mut().engine = Some(engine));
            // Seed the engine from storage once it arrives.
            spawn_local(async {
                match storage::load_storage().await {
                    Ok(data) => PAGE.with(|page| {
                        if let Some(engine) = page.borrow().engine.as_ref() {
                            engine.update_channels(data.channels);
                            engine.update_filters(data.active_filters);
                        }
                    }),
                    Err(e) => log::error!("Failed to load storage: {}", e),
                }
            });
        }
        Err(e) => log::error!("Failed to start video filter: {}", e),
    }

    inject_feed_ui();
}

fn teardown_feed() {
    PAGE.with(|page| {
        let mut page = page.borrow_mut();
        if let Some(handle) = page.inject_interval.take() {
            window().clear_interval_with_handle(handle);
        }
        if let Some(mut engine) = page.engine.take() {
            engine.destroy();
        }
        if let Some(app) = page.app.take() {
            app.destroy();
        }
    });

    if let Some(root) = document().get_element_by_id(ROOT_ID) {
        root.remove();
    }
}

/// Mount the filter bar above the feed. The container often isn't rendered
/// yet when the route fires, so this polls briefly for it.
fn inject_feed_ui() {
    let attempts = Rc::new(Cell::new(0));

    let inject_cb = Closure::wrap(Box::new(move || {
        attempts.set(attempts.get() + 1);
        let give_up = attempts.get() > INJECT_MAX_ATTEMPTS;

        let container = scanner::find_feed_container(&document());
        if container.is_none() && !give_up {
            return;
        }

        PAGE.with(|page| {
            if let Some(handle) = page.borrow_mut().inject_interval.take() {
                window().clear_interval_with_handle(handle);
            }
        });

        let Some(container) = container else {
            log::warn!("Feed container never appeared; filter bar not injected");
            return;
        };
        if document().get_element_by_id(ROOT_ID).is_some() {
            return;
        }

        match mount_app(&container) {
            Ok(app) => PAGE.with(|page| page.borrow_mut().app = Some(app)),
            Err(e) => log::error!("Failed to mount filter bar: {}", e),
        }
    }) as Box<dyn FnMut()>);

    match window().set_interval_with_callback_and_timeout_and_arguments_0(
        inject_cb.as_ref().unchecked_ref(),
        INJECT_RETRY_MS,
    ) {
        Ok(handle) => PAGE.with(|page| page.borrow_mut().inject_interval = Some(handle)),
        Err(e) => log::error!("Failed to schedule UI injection: {:?}", e),
    }
    inject_cb.forget();
}

fn mount_app(container: &Element) -> Result<AppHandle<FeedSection>, String> {
    let root = document()
        .create_element("div")
        .map_err(|e| format!("Failed to create mount root: {:?}", e))?;
    root.set_id(ROOT_ID);

    // Just above the video grid when we can find it, otherwise at the top
    // of the container.
    let inserted = container
        .query_selector("#contents")
        .ok()
        .flatten()
        .and_then(|contents| {
            let parent = contents.parent_element()?;
            parent.insert_before(&root, Some(contents.as_ref())).ok()
        });
    if inserted.is_none() {
        container
            .insert_before(&root, container.first_child().as_ref())
            .map_err(|e| format!("Failed to insert mount root: {:?}", e))?;
    }

    Ok(yew::Renderer::<FeedSection>::with_root(root).render())
}

fn current_href() -> String {
    window().location().href().unwrap_or_default()
}

fn window() -> Window {
    web_sys::window().expect("no global window")
}

fn document() -> Document {
    window().document().expect("no document on window")
}
