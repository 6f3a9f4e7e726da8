/// Filter bar injected above the subscriptions feed
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::model::Category;
use crate::storage::{self, StorageData};
use crate::ui::icons;
use crate::ui::settings::SettingsModal;

#[function_component(FeedSection)]
pub fn feed_section() -> Html {
    let data = use_state(StorageData::new);
    let settings_open = use_state(|| false);

    // Load storage on mount and stay in sync with outside writes
    {
        let data = data.clone();
        use_effect_with((), move |_| {
            {
                let data = data.clone();
                spawn_local(async move {
                    match storage::load_storage().await {
                        Ok(loaded) => data.set(loaded),
                        Err(e) => log::error!("Failed to load storage: {}", e),
                    }
                });
            }
            storage::subscribe_changes(move |changed| data.set(changed));
            || ()
        });
    }

    // Toggle one category filter
    let on_toggle = {
        let data = data.clone();
        Callback::from(move |category_id: String| {
            let mut next = (*data).clone();
            match next.active_filters.iter().position(|id| *id == category_id) {
                Some(pos) => {
                    next.active_filters.remove(pos);
                }
                None => next.active_filters.push(category_id),
            }
            persist(&data, next);
        })
    };

    let on_show_all = {
        let data = data.clone();
        Callback::from(move |_| {
            let mut next = (*data).clone();
            next.clear_active_filters();
            persist(&data, next);
        })
    };

    let on_open_settings = {
        let settings_open = settings_open.clone();
        Callback::from(move |_| settings_open.set(true))
    };

    let on_close_settings = {
        let settings_open = settings_open.clone();
        Callback::from(move |_: ()| settings_open.set(false))
    };

    let on_change = {
        let data = data.clone();
        Callback::from(move |next: StorageData| persist(&data, next))
    };

    let no_filters = data.active_filters.is_empty();

    html! {
        <div class="feed-curator-bar">
            <div class="feed-curator-chips">
                <Button
                    onclick={on_show_all}
                    variant={if no_filters { ButtonVariant::Primary } else { ButtonVariant::Secondary }}
                    size={ButtonSize::Small}
                >
                    {"Show All"}
                </Button>

                {for data.categories.iter().map(|category| {
                    let active = data.active_filters.contains(&category.id);
                    html! {
                        <CategoryChip
                            category={category.clone()}
                            active={active}
                            on_toggle={on_toggle.clone()}
                        />
                    }
                })}
            </div>

            <Button onclick={on_open_settings} variant={ButtonVariant::Secondary} size={ButtonSize::Small}>
                {"⚙️ Manage"}
            </Button>

            if *settings_open {
                <SettingsModal
                    data={(*data).clone()}
                    on_change={on_change}
                    on_close={on_close_settings}
                />
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct CategoryChipProps {
    category: Category,
    active: bool,
    on_toggle: Callback<String>,
}

#[function_component(CategoryChip)]
fn category_chip(props: &CategoryChipProps) -> Html {
    let category = &props.category;

    let onclick = props.on_toggle.reform({
        let category_id = category.id.clone();
        move |_| category_id.clone()
    });

    html! {
        <div
            class={if props.active { "feed-curator-chip chip-active" } else { "feed-curator-chip" }}
            onclick={onclick}
        >
            <span class="chip-icon" style={format!("background-color: {}", category.color)}>
                {icons::glyph(&category.icon)}
            </span>
            <span class="chip-name">{&category.name}</span>
        </div>
    }
}

// Helper functions

/// Optimistic update: the local copy changes immediately, the write follows
fn persist(state: &UseStateHandle<StorageData>, next: StorageData) {
    state.set(next.clone());
    spawn_local(async move {
        if let Err(e) = storage::save_storage(&next).await {
            log::error!("Failed to save storage: {}", e);
        }
    });
}
