/// Live feed filtering engine
///
/// Owns a MutationObserver on the feed container and keeps every video item's
/// visibility in line with the active category filters. DOM churn is absorbed
/// by a single resetting debounce timer; the actual pass runs on the next
/// animation frame so it lands after the host's own layout work. A slow
/// reconcile interval backstops anything the observer misses while filters
/// are active.
use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, MutationObserver, MutationObserverInit, MutationRecord, Window};

use crate::channel_id;
use crate::filter;
use crate::model::Channel;
use crate::scanner;

pub const DEBOUNCE_MS: i32 = 100;
pub const RECONCILE_INTERVAL_MS: i32 = 2_000;
pub const CONTAINER_RETRY_MS: i32 = 500;

#[derive(Default)]
struct EngineState {
    channels: Vec<Channel>,
    active_filters: Vec<String>,
    debounce_timer: Option<i32>,
    pending_frame: Option<i32>,
    retry_interval: Option<i32>,
    destroyed: bool,
    passes: u32,
}

/// Handle to a running engine. Dropping it (or calling [`destroy`]) stops the
/// observer and every timer it armed.
///
/// [`destroy`]: VideoFilter::destroy
pub struct VideoFilter {
    state: Rc<RefCell<EngineState>>,
    observer: MutationObserver,
    reconcile_interval: Option<i32>,
    // Kept alive for as long as the observer and timers may fire.
    _mutation_cb: Closure<dyn FnMut(js_sys::Array)>,
    _debounce_cb: Closure<dyn FnMut()>,
    _frame_cb: Closure<dyn FnMut()>,
    _reconcile_cb: Closure<dyn FnMut()>,
    _retry_cb: Option<Closure<dyn FnMut()>>,
}

impl VideoFilter {
    pub fn new() -> Result<VideoFilter, String> {
        let state = Rc::new(RefCell::new(EngineState::default()));

        // Runs once the debounce settles, on the next animation frame.
        let frame_cb = {
            let state = Rc::clone(&state);
            Closure::wrap(Box::new(move || {
                {
                    let mut s = state.borrow_mut();
                    s.pending_frame = None;
                    if s.destroyed {
                        return;
                    }
                }
                apply_filter(&state);
            }) as Box<dyn FnMut()>)
        };

        // Debounce expiry: hand off to the frame scheduler.
        let debounce_cb = {
            let state = Rc::clone(&state);
            let frame_fn: js_sys::Function = frame_cb.as_ref().unchecked_ref::<js_sys::Function>().clone();
            Closure::wrap(Box::new(move || {
                let mut s = state.borrow_mut();
                s.debounce_timer = None;
                if s.destroyed || s.pending_frame.is_some() {
                    return;
                }
                match window().request_animation_frame(&frame_fn) {
                    Ok(handle) => s.pending_frame = Some(handle),
                    Err(e) => log::warn!("Failed to schedule filter frame: {:?}", e),
                }
            }) as Box<dyn FnMut()>)
        };

        // Observer callback: restart the debounce window, but only for
        // records that actually touch video items.
        let mutation_cb = {
            let state = Rc::clone(&state);
            let debounce_fn: js_sys::Function =
                debounce_cb.as_ref().unchecked_ref::<js_sys::Function>().clone();
            Closure::wrap(Box::new(move |records: js_sys::Array| {
                if state.borrow().destroyed {
                    return;
                }
                if !mutations_touch_video_items(&records) {
                    return;
                }

                let mut s = state.borrow_mut();
                if let Some(handle) = s.debounce_timer.take() {
                    window().clear_timeout_with_handle(handle);
                }
                match window()
                    .set_timeout_with_callback_and_timeout_and_arguments_0(&debounce_fn, DEBOUNCE_MS)
                {
                    Ok(handle) => s.debounce_timer = Some(handle),
                    Err(e) => log::warn!("Failed to arm debounce timer: {:?}", e),
                }
            }) as Box<dyn FnMut(js_sys::Array)>)
        };

        let observer = MutationObserver::new(mutation_cb.as_ref().unchecked_ref())
            .map_err(|e| format!("Failed to create mutation observer: {:?}", e))?;

        // Reconcile pass: catches items the observer missed (e.g. churn while
        // the tab was hidden). Idle unless filters are active.
        let reconcile_cb = {
            let state = Rc::clone(&state);
            Closure::wrap(Box::new(move || {
                let due = {
                    let s = state.borrow();
                    !s.destroyed && !s.active_filters.is_empty()
                };
                if due {
                    apply_filter(&state);
                }
            }) as Box<dyn FnMut()>)
        };

        let reconcile_interval = match window().set_interval_with_callback_and_timeout_and_arguments_0(
            reconcile_cb.as_ref().unchecked_ref(),
            RECONCILE_INTERVAL_MS,
        ) {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Failed to start reconcile interval: {:?}", e);
                None
            }
        };

        let mut engine = VideoFilter {
            state,
            observer,
            reconcile_interval,
            _mutation_cb: mutation_cb,
            _debounce_cb: debounce_cb,
            _frame_cb: frame_cb,
            _reconcile_cb: reconcile_cb,
            _retry_cb: None,
        };

        match scanner::find_feed_container(&document()) {
            Some(container) => {
                if let Err(e) = observe_container(&engine.observer, &container) {
                    log::warn!("Failed to observe feed container: {:?}", e);
                }
            }
            // The feed renders late on cold loads; keep looking for it.
            None => engine.start_container_retry(),
        }

        Ok(engine)
    }

    /// Replace the cached channel list and re-filter immediately
    pub fn update_channels(&self, channels: Vec<Channel>) {
        {
            let mut s = self.state.borrow_mut();
            if s.destroyed {
                return;
            }
            s.channels = channels;
        }
        apply_filter(&self.state);
    }

    /// Replace the active filter set and re-filter immediately
    pub fn update_filters(&self, filter_ids: Vec<String>) {
        {
            let mut s = self.state.borrow_mut();
            if s.destroyed {
                return;
            }
            s.active_filters = filter_ids;
        }
        apply_filter(&self.state);
    }

    /// Number of filter passes run so far
    pub fn pass_count(&self) -> u32 {
        self.state.borrow().passes
    }

    /// Disconnect the observer and cancel every outstanding timer and frame.
    /// Idempotent; the DOM is left exactly as the last pass put it.
    pub fn destroy(&mut self) {
        let mut s = self.state.borrow_mut();
        if s.destroyed {
            return;
        }
        s.destroyed = true;

        let window = window();
        if let Some(handle) = s.debounce_timer.take() {
            window.clear_timeout_with_handle(handle);
        }
        if let Some(handle) = s.pending_frame.take() {
            let _ = window.cancel_animation_frame(handle);
        }
        if let Some(handle) = s.retry_interval.take() {
            window.clear_interval_with_handle(handle);
        }
        if let Some(handle) = self.reconcile_interval.take() {
            window.clear_interval_with_handle(handle);
        }
        self.observer.disconnect();
    }

    fn start_container_retry(&mut self) {
        let state = Rc::clone(&self.state);
        let observer = self.observer.clone();

        let retry_cb = Closure::wrap(Box::new(move || {
            let container = {
                let mut s = state.borrow_mut();
                if s.destroyed {
                    return;
                }
                let Some(container) = scanner::find_feed_container(&document()) else {
                    return;
                };
                if let Some(handle) = s.retry_interval.take() {
                    window().clear_interval_with_handle(handle);
                }
                container
            };

            if let Err(e) = observe_container(&observer, &container) {
                log::warn!("Failed to observe feed container: {:?}", e);
            }
            // Items that rendered before observation began are filtered now.
            apply_filter(&state);
        }) as Box<dyn FnMut()>);

        match window().set_interval_with_callback_and_timeout_and_arguments_0(
            retry_cb.as_ref().unchecked_ref(),
            CONTAINER_RETRY_MS,
        ) {
            Ok(handle) => self.state.borrow_mut().retry_interval = Some(handle),
            Err(e) => log::warn!("Failed to start container retry: {:?}", e),
        }
        self._retry_cb = Some(retry_cb);
    }
}

impl Drop for VideoFilter {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn observe_container(observer: &MutationObserver, container: &Element) -> Result<(), wasm_bindgen::JsValue> {
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    observer.observe_with_options(container, &init)
}

/// One full visibility pass over the feed
fn apply_filter(state: &Rc<RefCell<EngineState>>) {
    let allowed = {
        let mut s = state.borrow_mut();
        if s.destroyed {
            return;
        }
        s.passes += 1;
        filter::allowed_channels(&s.channels, &s.active_filters)
    };

    let document = document();
    let items = scanner::video_items(&document);

    match allowed {
        None => {
            for item in &items {
                set_visible(item, true);
            }
            log::debug!("Filter pass: no active filters, {} items shown", items.len());
        }
        Some(allowed) => {
            let mut hidden = 0;
            for item in &items {
                let channel = scanner::channel_href(item)
                    .and_then(|href| channel_id::extract_channel_id(&href));
                if channel.is_none() {
                    log::debug!("No channel link resolved for a feed item; hiding it");
                }
                let visible = filter::is_visible(Some(&allowed), channel.as_deref());
                if !visible {
                    hidden += 1;
                }
                set_visible(item, visible);
            }
            log::debug!("Filter pass: {} of {} items hidden", hidden, items.len());
        }
    }
}

fn set_visible(item: &Element, visible: bool) {
    let Some(element) = item.dyn_ref::<HtmlElement>() else {
        return;
    };
    let style = element.style();
    let result = if visible {
        // Clearing the property hands control back to the host stylesheet.
        style.remove_property("display").map(|_| ())
    } else {
        style.set_property("display", "none")
    };
    if let Err(e) = result {
        log::warn!("Failed to toggle item visibility: {:?}", e);
    }
}

fn mutations_touch_video_items(records: &js_sys::Array) -> bool {
    records.iter().any(|record| {
        let Ok(record) = record.dyn_into::<MutationRecord>() else {
            return false;
        };
        let added = record.added_nodes();
        (0..added.length())
            .filter_map(|i| added.item(i))
            .any(|node| scanner::involves_video_item(&node))
    })
}

fn window() -> Window {
    web_sys::window().expect("no global window")
}

fn document() -> Document {
    window().document().expect("no document on window")
}
