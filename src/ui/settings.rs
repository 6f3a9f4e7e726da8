/// Settings modal: category management, channel assignment, import/export
use patternfly_yew::prelude::*;
use uuid::Uuid;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::model::{Category, CATEGORY_COLORS};
use crate::serialization::{export_filename, export_json, merge_import, parse_import};
use crate::storage::{self, StorageData};
use crate::ui::icons;

#[derive(Clone, PartialEq)]
enum ActiveTab {
    Categories,
    Channels,
    Data,
}

#[derive(Properties, PartialEq)]
pub struct SettingsModalProps {
    pub data: StorageData,
    pub on_change: Callback<StorageData>,
    pub on_close: Callback<()>,
}

#[function_component(SettingsModal)]
pub fn settings_modal(props: &SettingsModalProps) -> Html {
    let active_tab = use_state(|| ActiveTab::Categories);

    // Tab click handlers
    let on_tab_click = {
        let active_tab = active_tab.clone();
        move |tab: ActiveTab| {
            let active_tab = active_tab.clone();
            Callback::from(move |_| {
                active_tab.set(tab.clone());
            })
        }
    };

    let tab_class = |tab: &ActiveTab| {
        if *active_tab == *tab {
            "pf-v5-c-tabs__item pf-m-current"
        } else {
            "pf-v5-c-tabs__item"
        }
    };

    html! {
        <div class="feed-curator-overlay">
            <div class="feed-curator-modal">
                <div class="modal-header">
                    <h2 class="modal-title">{"Feed Curator"}</h2>
                    <Button onclick={props.on_close.reform(|_| ())} variant={ButtonVariant::Secondary}>
                        {"✗"}
                    </Button>
                </div>

                // Tab navigation
                <div class="pf-v5-c-tabs tabs-nav">
                    <ul class="pf-v5-c-tabs__list">
                        <li class={tab_class(&ActiveTab::Categories)}>
                            <button
                                class="pf-v5-c-tabs__link"
                                onclick={on_tab_click(ActiveTab::Categories)}
                            >
                                <span class="pf-v5-c-tabs__item-text">{"Categories"}</span>
                            </button>
                        </li>
                        <li class={tab_class(&ActiveTab::Channels)}>
                            <button
                                class="pf-v5-c-tabs__link"
                                onclick={on_tab_click(ActiveTab::Channels)}
                            >
                                <span class="pf-v5-c-tabs__item-text">{"Channels"}</span>
                            </button>
                        </li>
                        <li class={tab_class(&ActiveTab::Data)}>
                            <button
                                class="pf-v5-c-tabs__link"
                                onclick={on_tab_click(ActiveTab::Data)}
                            >
                                <span class="pf-v5-c-tabs__item-text">{"Data"}</span>
                            </button>
                        </li>
                    </ul>
                </div>

                // Tab content
                <div class="modal-content">
                    {match &*active_tab {
                        ActiveTab::Categories => html! {
                            <CategoriesTab data={props.data.clone()} on_change={props.on_change.clone()} />
                        },
                        ActiveTab::Channels => html! {
                            <ChannelsTab data={props.data.clone()} on_change={props.on_change.clone()} />
                        },
                        ActiveTab::Data => html! {
                            <DataTab data={props.data.clone()} on_change={props.on_change.clone()} />
                        },
                    }}
                </div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct TabProps {
    data: StorageData,
    on_change: Callback<StorageData>,
}

// Categories tab

#[function_component(CategoriesTab)]
fn categories_tab(props: &TabProps) -> Html {
    let form_open = use_state(|| false);
    let editing_id = use_state(|| None::<String>);
    let name_value = use_state(String::new);
    let icon_value = use_state(|| icons::DEFAULT_ICON.to_string());
    let color_value = use_state(|| CATEGORY_COLORS[7].to_string());

    let reset_form = {
        let form_open = form_open.clone();
        let editing_id = editing_id.clone();
        let name_value = name_value.clone();
        let icon_value = icon_value.clone();
        let color_value = color_value.clone();
        move || {
            form_open.set(false);
            editing_id.set(None);
            name_value.set(String::new());
            icon_value.set(icons::DEFAULT_ICON.to_string());
            color_value.set(CATEGORY_COLORS[7].to_string());
        }
    };

    let on_new = {
        let form_open = form_open.clone();
        let editing_id = editing_id.clone();
        let name_value = name_value.clone();
        Callback::from(move |_| {
            editing_id.set(None);
            name_value.set(String::new());
            form_open.set(true);
        })
    };

    let on_start_edit = {
        let form_open = form_open.clone();
        let editing_id = editing_id.clone();
        let name_value = name_value.clone();
        let icon_value = icon_value.clone();
        let color_value = color_value.clone();
        Callback::from(move |category: Category| {
            editing_id.set(Some(category.id));
            name_value.set(category.name);
            icon_value.set(category.icon);
            color_value.set(category.color);
            form_open.set(true);
        })
    };

    let on_name_input = {
        let name_value = name_value.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                name_value.set(input.value());
            }
        })
    };

    let on_pick_icon = {
        let icon_value = icon_value.clone();
        Callback::from(move |name: String| icon_value.set(name))
    };

    let on_pick_color = {
        let color_value = color_value.clone();
        Callback::from(move |color: String| color_value.set(color))
    };

    let on_save = {
        let data = props.data.clone();
        let on_change = props.on_change.clone();
        let editing_id = editing_id.clone();
        let name_value = name_value.clone();
        let icon_value = icon_value.clone();
        let color_value = color_value.clone();
        let reset_form = reset_form.clone();
        Callback::from(move |_| {
            let name = name_value.trim().to_string();
            if name.is_empty() {
                return;
            }

            let mut next = data.clone();
            match (*editing_id).clone() {
                Some(id) => {
                    next.update_category(Category {
                        id,
                        name,
                        icon: (*icon_value).clone(),
                        color: (*color_value).clone(),
                    });
                }
                None => next.add_category(Category {
                    id: Uuid::new_v4().to_string(),
                    name,
                    icon: (*icon_value).clone(),
                    color: (*color_value).clone(),
                }),
            }

            on_change.emit(next);
            reset_form();
        })
    };

    let on_cancel = {
        let reset_form = reset_form.clone();
        Callback::from(move |_| reset_form())
    };

    let on_delete = {
        let data = props.data.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |category: Category| {
            let confirmed = web_sys::window()
                .and_then(|w| {
                    w.confirm_with_message(&format!(
                        "Delete \"{}\"? Channels keep their other categories.",
                        category.name
                    ))
                    .ok()
                })
                .unwrap_or(false);
            if !confirmed {
                return;
            }

            let mut next = data.clone();
            next.delete_category(&category.id);
            on_change.emit(next);
        })
    };

    html! {
        <div class="categories-tab">
            if props.data.categories.is_empty() && !*form_open {
                <div class="empty-state">
                    <p>{"No categories yet."}</p>
                    <p class="empty-state-hint">{"Create one to start sorting your subscriptions."}</p>
                </div>
            } else {
                <div class="category-list">
                    {for props.data.categories.iter().map(|category| {
                        let member_count = props.data.channels.iter()
                            .filter(|c| c.category_ids.contains(&category.id))
                            .count();

                        html! {
                            <div key={category.id.clone()} class="category-row">
                                <span class="chip-icon" style={format!("background-color: {}", category.color)}>
                                    {icons::glyph(&category.icon)}
                                </span>
                                <div class="category-info">
                                    <span class="category-name">{&category.name}</span>
                                    <span class="category-count">{format!("{} channels", member_count)}</span>
                                </div>
                                <div class="category-actions">
                                    <Button
                                        onclick={on_start_edit.reform({
                                            let category = category.clone();
                                            move |_| category.clone()
                                        })}
                                        variant={ButtonVariant::Secondary}
                                        size={ButtonSize::Small}
                                    >
                                        {"✏️"}
                                    </Button>
                                    <Button
                                        onclick={on_delete.reform({
                                            let category = category.clone();
                                            move |_| category.clone()
                                        })}
                                        variant={ButtonVariant::Danger}
                                        size={ButtonSize::Small}
                                    >
                                        {"🗑️"}
                                    </Button>
                                </div>
                            </div>
                        }
                    })}
                </div>
            }

            if *form_open {
                <div class="category-form">
                    <input
                        type="text"
                        placeholder="Category name"
                        value={(*name_value).clone()}
                        oninput={on_name_input}
                        class="category-name-input"
                    />

                    <div class="icon-grid">
                        {for icons::ICONS.iter().map(|(name, glyph)| {
                            let selected = *icon_value == *name;
                            html! {
                                <button
                                    key={*name}
                                    class={if selected { "icon-option icon-selected" } else { "icon-option" }}
                                    onclick={on_pick_icon.reform({
                                        let name = name.to_string();
                                        move |_| name.clone()
                                    })}
                                >
                                    {*glyph}
                                </button>
                            }
                        })}
                    </div>

                    <div class="color-grid">
                        {for CATEGORY_COLORS.iter().map(|color| {
                            let selected = *color_value == *color;
                            html! {
                                <button
                                    key={*color}
                                    class={if selected { "color-option color-selected" } else { "color-option" }}
                                    style={format!("background-color: {}", color)}
                                    onclick={on_pick_color.reform({
                                        let color = color.to_string();
                                        move |_| color.clone()
                                    })}
                                />
                            }
                        })}
                    </div>

                    <div class="form-actions">
                        <Button onclick={on_save}>
                            {if editing_id.is_some() { "Save" } else { "Create" }}
                        </Button>
                        <Button onclick={on_cancel} variant={ButtonVariant::Secondary}>
                            {"Cancel"}
                        </Button>
                    </div>
                </div>
            } else {
                <Button onclick={on_new} variant={ButtonVariant::Secondary} block={true}>
                    {"➕ New Category"}
                </Button>
            }
        </div>
    }
}

// Channels tab

#[derive(Clone, PartialEq)]
enum ChannelView {
    All,
    Unassigned,
    InCategory(String),
}

#[function_component(ChannelsTab)]
fn channels_tab(props: &TabProps) -> Html {
    let view = use_state(|| ChannelView::All);

    let on_view_click = {
        let view = view.clone();
        move |target: ChannelView| {
            let view = view.clone();
            Callback::from(move |_| view.set(target.clone()))
        }
    };

    let view_class = |target: &ChannelView| {
        if *view == *target {
            "view-option view-selected"
        } else {
            "view-option"
        }
    };

    let mut visible_channels: Vec<_> = props
        .data
        .channels
        .iter()
        .filter(|channel| match &*view {
            ChannelView::All => true,
            ChannelView::Unassigned => channel.category_ids.is_empty(),
            ChannelView::InCategory(id) => channel.category_ids.contains(id),
        })
        .cloned()
        .collect();
    visible_channels.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    html! {
        <div class="channels-tab">
            if props.data.channels.is_empty() {
                <div class="empty-state">
                    <p>{"No channels detected yet."}</p>
                    <p class="empty-state-hint">
                        {"Visit your subscriptions management page and the channel list will refresh itself."}
                    </p>
                </div>
            } else {
                <div class="channel-views">
                    <button class={view_class(&ChannelView::All)} onclick={on_view_click(ChannelView::All)}>
                        {format!("All ({})", props.data.channels.len())}
                    </button>
                    <button class={view_class(&ChannelView::Unassigned)} onclick={on_view_click(ChannelView::Unassigned)}>
                        {format!(
                            "Unassigned ({})",
                            props.data.channels.iter().filter(|c| c.category_ids.is_empty()).count()
                        )}
                    </button>
                    {for props.data.categories.iter().map(|category| {
                        html! {
                            <button
                                key={category.id.clone()}
                                class={view_class(&ChannelView::InCategory(category.id.clone()))}
                                onclick={on_view_click(ChannelView::InCategory(category.id.clone()))}
                            >
                                {format!("{} {}", icons::glyph(&category.icon), category.name)}
                            </button>
                        }
                    })}
                </div>

                <div class="channel-list">
                    {for visible_channels.iter().map(|channel| {
                        html! {
                            <div key={channel.id.clone()} class="channel-row">
                                <img class="channel-avatar" src={channel.thumbnail_url.clone()} alt="" />
                                <span class="channel-name">{&channel.name}</span>
                                <div class="channel-categories">
                                    {for props.data.categories.iter().map(|category| {
                                        let checked = channel.category_ids.contains(&category.id);
                                        let onchange = {
                                            let data = props.data.clone();
                                            let on_change = props.on_change.clone();
                                            let channel_id = channel.id.clone();
                                            let category_id = category.id.clone();
                                            Callback::from(move |e: Event| {
                                                let Some(input) = e.target_dyn_into::<HtmlInputElement>() else {
                                                    return;
                                                };
                                                let mut next = data.clone();
                                                let Some(ch) = next.channels.iter_mut().find(|c| c.id == channel_id) else {
                                                    return;
                                                };
                                                if input.checked() {
                                                    if !ch.category_ids.contains(&category_id) {
                                                        ch.category_ids.push(category_id.clone());
                                                    }
                                                } else {
                                                    ch.category_ids.retain(|id| id != &category_id);
                                                }
                                                on_change.emit(next);
                                            })
                                        };

                                        html! {
                                            <label key={category.id.clone()} class="channel-category-option">
                                                <input type="checkbox" checked={checked} onchange={onchange} />
                                                {format!("{} {}", icons::glyph(&category.icon), category.name)}
                                            </label>
                                        }
                                    })}
                                </div>
                            </div>
                        }
                    })}
                </div>
            }
        </div>
    }
}

// Data tab

#[derive(Clone, PartialEq)]
enum DataStatus {
    Idle,
    Busy(String),
    Done(String),
    Failed(String),
}

#[function_component(DataTab)]
fn data_tab(props: &TabProps) -> Html {
    let status = use_state(|| DataStatus::Idle);

    let on_export = {
        let data = props.data.clone();
        let status = status.clone();
        Callback::from(move |_| {
            let iso: String = js_sys::Date::new_0().to_iso_string().into();
            match export_json(&data, iso.clone()) {
                Ok(json) => {
                    storage::export_to_file(&json, &export_filename(&iso));
                    status.set(DataStatus::Done("Export started".to_string()));
                }
                Err(e) => status.set(DataStatus::Failed(format!("Export failed: {}", e))),
            }
        })
    };

    let on_import = {
        let data = props.data.clone();
        let on_change = props.on_change.clone();
        let status = status.clone();
        Callback::from(move |_| {
            let data = data.clone();
            let on_change = on_change.clone();
            let status = status.clone();

            status.set(DataStatus::Busy("Importing...".to_string()));

            spawn_local(async move {
                let picked = match storage::pick_import_file().await {
                    Ok(Some(content)) => content,
                    Ok(None) => {
                        status.set(DataStatus::Idle);
                        return;
                    }
                    Err(e) => {
                        status.set(DataStatus::Failed(format!("Import failed: {}", e)));
                        return;
                    }
                };

                match parse_import(&picked) {
                    Ok(import) => {
                        let mut next = data.clone();
                        let summary = merge_import(&mut next, import);
                        on_change.emit(next);
                        status.set(DataStatus::Done(format!(
                            "Imported {} categories, updated {} channels",
                            summary.categories_added, summary.channels_updated
                        )));
                    }
                    Err(e) => status.set(DataStatus::Failed(e)),
                }
            });
        })
    };

    let is_busy = matches!(*status, DataStatus::Busy(_));

    html! {
        <div class="data-tab">
            <p class="data-stats">
                {format!(
                    "{} categories • {} channels",
                    props.data.categories.len(),
                    props.data.channels.len()
                )}
            </p>

            {match &*status {
                DataStatus::Busy(msg) => html! {
                    <div class="loading-text-center">
                        <Spinner />
                        <p class="loading-text">{msg}</p>
                    </div>
                },
                DataStatus::Done(msg) => html! {
                    <Alert r#type={AlertType::Success} title={msg.clone()} inline={true}>
                    </Alert>
                },
                DataStatus::Failed(err) => html! {
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err.clone()}
                    </Alert>
                },
                DataStatus::Idle => html! {}
            }}

            <div class="data-actions">
                <Button onclick={on_export} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                    {"📥 Export Data"}
                </Button>
                <Button onclick={on_import} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                    {"📤 Import Data"}
                </Button>
            </div>
        </div>
    }
}
