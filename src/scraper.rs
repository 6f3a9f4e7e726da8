/// Channel discovery on the subscriptions management page
///
/// The host renders one row per subscribed channel; each row carries the
/// channel link, display name and avatar. Scraping merges what it finds into
/// storage rather than replacing it, so category assignments survive.
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, MutationObserver, MutationObserverInit, Window};

use crate::channel_id;
use crate::model::Channel;
use crate::storage;

const CHANNEL_ROW_SELECTOR: &str = "ytd-channel-renderer";
const CHANNEL_LINK_SELECTOR: &str = "#main-link";
const CHANNEL_NAME_SELECTOR: &str = "#text";
const CHANNEL_THUMB_SELECTOR: &str = "img#img";

const WAIT_TIMEOUT_MS: i32 = 10_000;
const SCRAPE_DELAY_MS: i32 = 2_000;
const TOAST_LINGER_MS: i32 = 2_000;

/// Entered when the user lands on the subscriptions management page: wait
/// for the page to settle, scrape, merge, and report through a small toast.
pub fn run_scrape_flow() {
    spawn_local(async {
        sleep(SCRAPE_DELAY_MS).await;

        let toast = show_toast("Updating channel list…");
        match refresh_channel_list().await {
            Ok(count) => {
                log::info!("Channel list refreshed, {} channels known", count);
                if let Some(toast) = &toast {
                    finish_toast(toast, &format!("✓ {} channels found", count));
                }
            }
            Err(e) => {
                log::error!("Channel refresh failed: {}", e);
                if let Some(toast) = &toast {
                    toast.remove();
                }
            }
        }
    });
}

/// Scrape the page and fold the result into storage. Returns the total
/// number of channels known afterwards.
pub async fn refresh_channel_list() -> Result<usize, String> {
    let scraped = scrape_channels().await?;
    let mut data = storage::load_storage().await?;
    data.merge_scraped_channels(scraped);
    storage::save_storage(&data).await?;
    Ok(data.channels.len())
}

/// Collect every channel row currently on the page. Rows missing any of
/// their expected pieces are skipped with a warning rather than failing the
/// whole scrape.
pub async fn scrape_channels() -> Result<Vec<Channel>, String> {
    wait_for_element(CHANNEL_ROW_SELECTOR, WAIT_TIMEOUT_MS).await?;

    let rows = document()
        .query_selector_all(CHANNEL_ROW_SELECTOR)
        .map_err(|e| format!("Failed to query channel rows: {:?}", e))?;

    let mut channels = Vec::new();
    for i in 0..rows.length() {
        let Some(node) = rows.item(i) else { continue };
        let Ok(row) = node.dyn_into::<Element>() else { continue };

        match channel_from_row(&row) {
            Some(channel) => channels.push(channel),
            None => log::warn!("Skipping a channel row with missing link, name or avatar"),
        }
    }

    log::info!("Scraped {} channel rows", channels.len());
    Ok(channels)
}

fn channel_from_row(row: &Element) -> Option<Channel> {
    let href = row
        .query_selector(CHANNEL_LINK_SELECTOR)
        .ok()
        .flatten()?
        .get_attribute("href")?;
    let id = channel_id::extract_channel_id(&href)?;

    let name = row
        .query_selector(CHANNEL_NAME_SELECTOR)
        .ok()
        .flatten()?
        .text_content()?
        .trim()
        .to_string();
    if name.is_empty() {
        return None;
    }

    let thumbnail = row
        .query_selector(CHANNEL_THUMB_SELECTOR)
        .ok()
        .flatten()?
        .get_attribute("src")
        .unwrap_or_default();

    Some(Channel::new(id, name, thumbnail))
}

/// Resolve once an element matching `selector` exists, or fail after
/// `timeout_ms`. Watches the whole document since the host builds its pages
/// incrementally.
pub async fn wait_for_element(selector: &str, timeout_ms: i32) -> Result<Element, String> {
    if let Ok(Some(element)) = document().query_selector(selector) {
        return Ok(element);
    }

    let selector = selector.to_string();
    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        let sel = selector.clone();
        let resolve_found = resolve.clone();

        // The callback receives the observer itself, which lets it
        // disconnect once the element shows up.
        let check = Closure::wrap(Box::new(move |_records: js_sys::Array, obs: MutationObserver| {
            if let Ok(Some(element)) = document().query_selector(&sel) {
                obs.disconnect();
                let _ = resolve_found.call1(&JsValue::NULL, element.as_ref());
            }
        })
            as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

        match MutationObserver::new(check.as_ref().unchecked_ref()) {
            Ok(observer) => {
                let init = MutationObserverInit::new();
                init.set_child_list(true);
                init.set_subtree(true);
                if let Some(body) = document().body() {
                    let _ = observer.observe_with_options(&body, &init);
                }

                let sel = selector.clone();
                let reject_late = reject.clone();
                let timeout_cb = Closure::once_into_js(move || {
                    observer.disconnect();
                    let _ = reject_late.call1(
                        &JsValue::NULL,
                        &JsValue::from_str(&format!("Timed out waiting for {}", sel)),
                    );
                });
                let _ = window().set_timeout_with_callback_and_timeout_and_arguments_0(
                    timeout_cb.unchecked_ref(),
                    timeout_ms,
                );
            }
            Err(e) => {
                let _ = reject.call1(&JsValue::NULL, &e);
            }
        }

        check.forget();
    });

    match JsFuture::from(promise).await {
        Ok(value) => value
            .dyn_into::<Element>()
            .map_err(|_| "Unexpected value while waiting for element".to_string()),
        Err(e) => Err(format!("Failed waiting for element: {:?}", e)),
    }
}

async fn sleep(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        if window()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .is_err()
        {
            let _ = resolve.call0(&JsValue::NULL);
        }
    });
    let _ = JsFuture::from(promise).await;
}

// Toast helpers

fn show_toast(message: &str) -> Option<Element> {
    let document = document();
    let toast = document.create_element("div").ok()?;
    toast.set_class_name("feed-curator-toast");
    toast.set_text_content(Some(message));
    document.body()?.append_child(&toast).ok()?;
    Some(toast)
}

fn finish_toast(toast: &Element, message: &str) {
    toast.set_text_content(Some(message));

    let toast = toast.clone();
    let remove_cb = Closure::once_into_js(move || toast.remove());
    let _ = window().set_timeout_with_callback_and_timeout_and_arguments_0(
        remove_cb.unchecked_ref(),
        TOAST_LINGER_MS,
    );
}

fn window() -> Window {
    web_sys::window().expect("no global window")
}

fn document() -> Document {
    window().document().expect("no document on window")
}
