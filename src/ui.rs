use dioxus::document::eval;
use dioxus::launch;
use dioxus::prelude::*;
use pulldown_cmark::{html, Event, Options, Parser};
use std::env;
use std::thread;
use tokio::time::{sleep, Duration};

use crate::config::Config;
use crate::domains::chat::{ChatMessage, ChatRole};
use crate::inventory::ProvinceCount;
use crate::services::daemon_client::DaemonClient;
use crate::services::map::{MapView, ViewState};

pub const DEFAULT_DAEMON_URL: &str = "http://127.0.0.1:7979";

const MAP_WIDTH: f64 = 960.0;
const MAP_HEIGHT: f64 = 560.0;
const TILE_SIZE: f64 = 256.0;

#[derive(Clone, Copy, PartialEq, Eq)]
enum UiTab {
    Map,
    Analytics,
    Chat,
}

fn markdown_to_html(input: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    // Raw HTML from model replies or table names is shown as text, never rendered.
    let parser = Parser::new_ext(input, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut output = String::new();
    html::push_html(&mut output, parser);
    output
}

/// Equirectangular projection of `(latitude, longitude)` onto a canvas
/// centred on the view state. Pixels per degree double with every zoom level.
pub fn project(
    latitude: f64,
    longitude: f64,
    view: &ViewState,
    width: f64,
    height: f64,
) -> (f64, f64) {
    let pixels_per_degree = TILE_SIZE * 2f64.powf(view.zoom) / 360.0;
    let x = width / 2.0 + (longitude - view.longitude) * pixels_per_degree;
    let y = height / 2.0 - (latitude - view.latitude) * pixels_per_degree;
    (x, y)
}

fn rgba(color: [u8; 4]) -> String {
    format!(
        "rgba({},{},{},{:.3})",
        color[0],
        color[1],
        color[2],
        f64::from(color[3]) / 255.0
    )
}

async fn scroll_chat_to_bottom() {
    let _ = eval(
        "const el = document.getElementById('chat-scroll'); if (el) { el.scrollTop = el.scrollHeight; }",
    )
    .await;
}

pub fn launch_ui() {
    start_local_daemon();
    launch(app_view);
}

fn start_local_daemon() {
    if env::var("ADSPOT_DISABLE_DAEMON").is_ok() {
        return;
    }

    let daemon_url = env::var("ADSPOT_DAEMON").unwrap_or_else(|_| DEFAULT_DAEMON_URL.to_string());
    let (host, port) = parse_daemon_address(&daemon_url);
    let token = env::var("ADSPOT_TOKEN").unwrap_or_default();
    let config_path = env::var("ADSPOT_CONFIG").ok();

    thread::spawn(move || {
        let config = match Config::load(config_path.as_deref()) {
            Ok(config) => config,
            Err(err) => {
                tracing::error!(error = %err, "could not load config for local daemon");
                return;
            }
        };
        if let Ok(runtime) = tokio::runtime::Runtime::new() {
            runtime.block_on(async move {
                if let Err(err) = crate::daemon::run(&host, port, &config, &token).await {
                    tracing::error!(error = %err, "local daemon stopped");
                }
            });
        }
    });
}

pub fn parse_daemon_address(daemon: &str) -> (String, u16) {
    let trimmed = daemon.trim();
    let without_scheme = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .unwrap_or(trimmed);
    let host_port = without_scheme.split('/').next().unwrap_or("127.0.0.1:7979");
    let mut parts = host_port.splitn(2, ':');
    let host = parts.next().filter(|h| !h.is_empty()).unwrap_or("127.0.0.1");
    let port = parts
        .next()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(7979);
    (host.to_string(), port)
}

fn app_view() -> Element {
    let daemon_url =
        use_signal(|| env::var("ADSPOT_DAEMON").unwrap_or_else(|_| DEFAULT_DAEMON_URL.to_string()));
    let token = use_signal(|| env::var("ADSPOT_TOKEN").unwrap_or_default());
    let mut active_tab = use_signal(|| UiTab::Map);
    let error = use_signal(String::new);

    let daemon_ready = use_signal(|| false);
    let daemon_probe_inflight = use_signal(|| false);

    let map_view = use_signal(|| None::<MapView>);
    let map_loaded = use_signal(|| false);
    let provinces = use_signal(Vec::<ProvinceCount>::new);
    let provinces_loaded = use_signal(|| false);
    let tables = use_signal(Vec::<String>::new);
    let tables_loaded = use_signal(|| false);

    let transcript = use_signal(Vec::<ChatMessage>::new);
    let mut input = use_signal(String::new);
    let busy = use_signal(|| false);

    if !*daemon_ready.read() && !*daemon_probe_inflight.read() {
        let mut daemon_ready = daemon_ready;
        let mut daemon_probe_inflight = daemon_probe_inflight;
        let mut error = error;
        spawn(async move {
            daemon_probe_inflight.set(true);
            for attempt in 0..8u64 {
                let Ok(client) = DaemonClient::new(daemon_url(), token()) else {
                    break;
                };
                if client
                    .get_json::<serde_json::Value>("/health")
                    .await
                    .is_ok()
                {
                    daemon_ready.set(true);
                    break;
                }
                sleep(Duration::from_millis(400 * (attempt + 1))).await;
            }
            if !*daemon_ready.read() {
                error.set(format!("Daemon at {} is not reachable.", daemon_url()));
            }
        });
    }

    if *daemon_ready.read() && *active_tab.read() == UiTab::Map && !*map_loaded.read() {
        let mut map_view = map_view;
        let mut map_loaded = map_loaded;
        let mut error = error;
        map_loaded.set(true);
        spawn(async move {
            let result = match DaemonClient::new(daemon_url(), token()) {
                Ok(client) => client.map_view().await,
                Err(err) => Err(err),
            };
            match result {
                Ok(view) => map_view.set(Some(view)),
                Err(err) => error.set(format!("Map failed: {err}")),
            }
        });
    }

    if *daemon_ready.read() && *active_tab.read() == UiTab::Analytics && !*provinces_loaded.read() {
        let mut provinces = provinces;
        let mut provinces_loaded = provinces_loaded;
        let mut error = error;
        provinces_loaded.set(true);
        spawn(async move {
            let result = match DaemonClient::new(daemon_url(), token()) {
                Ok(client) => client.province_counts().await,
                Err(err) => Err(err),
            };
            match result {
                Ok(counts) => provinces.set(counts),
                Err(err) => error.set(format!("Analytics failed: {err}")),
            }
        });
    }

    if *daemon_ready.read() && *active_tab.read() == UiTab::Chat && !*tables_loaded.read() {
        let mut tables = tables;
        let mut tables_loaded = tables_loaded;
        let mut error = error;
        tables_loaded.set(true);
        spawn(async move {
            let result = match DaemonClient::new(daemon_url(), token()) {
                Ok(client) => client.tables().await,
                Err(err) => Err(err),
            };
            match result {
                Ok(names) => tables.set(names),
                Err(err) => error.set(format!("Tables failed: {err}")),
            }
        });
    }

    let on_send = use_callback(move |_| {
        let text = input();
        let mut busy = busy;
        let mut error = error;
        let mut transcript = transcript;
        let mut input = input;
        spawn(async move {
            if *busy.read() || text.trim().is_empty() {
                return;
            }
            busy.set(true);
            error.set(String::new());
            input.set(String::new());

            let history = transcript.read().clone();
            transcript.write().push(ChatMessage {
                role: ChatRole::User,
                content: text.clone(),
            });
            scroll_chat_to_bottom().await;

            let result = match DaemonClient::new(daemon_url(), token()) {
                Ok(client) => client.chat(history, &text).await,
                Err(err) => Err(err),
            };
            match result {
                Ok(response) => transcript.set(response.messages),
                Err(err) => {
                    transcript.write().pop();
                    input.set(text);
                    error.set(format!("Chat failed: {err}"));
                }
            }
            busy.set(false);
            scroll_chat_to_bottom().await;
        });
    });

    let map_panel = match map_view.read().clone() {
        None => rsx! { div { class: "hint", "Loading map…" } },
        Some(view) => match view.view_state {
            None => {
                let message = view.message.clone().unwrap_or_default();
                rsx! { div { class: "hint", "{message}" } }
            }
            Some(state) => {
                let fill = rgba(view.layer.color);
                let radius = (view.layer.radius / 25.0).max(2.0);
                let count = view.points.len();
                let dots: Vec<(f64, f64, String)> = view
                    .points
                    .iter()
                    .map(|point| {
                        let (x, y) =
                            project(point.latitude, point.longitude, &state, MAP_WIDTH, MAP_HEIGHT);
                        (x, y, point.location_name.clone().unwrap_or_default())
                    })
                    .collect();
                rsx! {
                    svg {
                        class: "map",
                        width: "{MAP_WIDTH}",
                        height: "{MAP_HEIGHT}",
                        for (x, y, label) in dots {
                            circle {
                                cx: "{x}",
                                cy: "{y}",
                                r: "{radius}",
                                fill: "{fill}",
                                title { "{label}" }
                            }
                        }
                    }
                    div { class: "hint", "{count} locations" }
                }
            }
        },
    };
    let province_rows = provinces.read().clone();
    let table_line = tables.read().join(", ");

    rsx! {
        style { r#"
            body {{
                font-family: system-ui, -apple-system, BlinkMacSystemFont, sans-serif;
                background: #0b1020;
                color: #e5e7eb;
                margin: 0;
            }}
            .container {{ height: 100vh; display: flex; flex-direction: column; }}
            .header {{
                padding: 16px 20px;
                background: rgba(17,24,39,0.55);
                display: flex; align-items: center; justify-content: space-between;
                border-bottom: 1px solid rgba(255,255,255,0.08);
            }}
            .title {{ font-size: 18px; font-weight: 700; }}
            .nav {{ display: flex; gap: 8px; }}
            .nav button {{ background: rgba(255,255,255,0.08); color: inherit; border: none; padding: 8px 14px; border-radius: 10px; cursor: pointer; }}
            .nav button.active {{ background: rgba(99,102,241,0.6); }}
            .panel {{ flex: 1; min-height: 0; overflow: auto; padding: 20px; }}
            .error {{ color: #fca5a5; padding: 8px 20px; }}
            .hint {{ color: rgba(229,231,235,0.6); font-size: 13px; }}
            .map {{ background: #111827; border-radius: 14px; }}
            table.provinces {{ border-collapse: collapse; min-width: 360px; }}
            table.provinces th, table.provinces td {{ text-align: left; padding: 8px 14px; border-bottom: 1px solid rgba(255,255,255,0.08); }}
            .chat {{ display: flex; flex-direction: column; height: 100%; }}
            .chat-scroll {{ flex: 1; min-height: 0; overflow-y: auto; padding: 12px 0; }}
            .bubble {{
                max-width: 72%;
                padding: 12px 14px;
                border-radius: 18px;
                margin-bottom: 10px;
                overflow-wrap: anywhere;
                line-height: 1.45;
            }}
            .bubble.user {{ margin-left: auto; background: rgba(99,102,241,0.55); border-bottom-right-radius: 6px; }}
            .bubble.bot {{ margin-right: auto; background: rgba(124,58,237,0.45); border-bottom-left-radius: 6px; }}
            .composer {{ display: flex; gap: 8px; }}
            .composer textarea {{ flex: 1; min-height: 48px; border-radius: 12px; padding: 10px; }}
        "# }
        div { class: "container",
            div { class: "header",
                div { class: "title", "Ad Spot Dashboard" }
                div { class: "nav",
                    button {
                        class: if *active_tab.read() == UiTab::Map { "active" } else { "" },
                        onclick: move |_| active_tab.set(UiTab::Map),
                        "Map"
                    }
                    button {
                        class: if *active_tab.read() == UiTab::Analytics { "active" } else { "" },
                        onclick: move |_| active_tab.set(UiTab::Analytics),
                        "Analytics"
                    }
                    button {
                        class: if *active_tab.read() == UiTab::Chat { "active" } else { "" },
                        onclick: move |_| active_tab.set(UiTab::Chat),
                        "Chat"
                    }
                }
            }
            if !error.read().is_empty() {
                div { class: "error", "{error}" }
            }
            if !*daemon_ready.read() {
                div { class: "panel", div { class: "hint", "Daemon starting…" } }
            }
            if *daemon_ready.read() && *active_tab.read() == UiTab::Map {
                div { class: "panel",
                    {map_panel}
                }
            }
            if *daemon_ready.read() && *active_tab.read() == UiTab::Analytics {
                div { class: "panel",
                    h3 { "Count of rows per province" }
                    if province_rows.is_empty() {
                        div { class: "hint", "No data found for provinces." }
                    } else {
                        table { class: "provinces",
                            thead { tr { th { "Province" } th { "Count" } } }
                            tbody {
                                for row in province_rows.iter() {
                                    tr {
                                        td { "{row.label()}" }
                                        td { "{row.count}" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
            if *daemon_ready.read() && *active_tab.read() == UiTab::Chat {
                div { class: "panel",
                    div { class: "chat",
                        div { class: "hint", "Available tables: {table_line}" }
                        div { class: "chat-scroll", id: "chat-scroll",
                            for message in transcript.read().iter() {
                                div {
                                    class: if message.role == ChatRole::User { "bubble user" } else { "bubble bot" },
                                    div { dangerous_inner_html: markdown_to_html(&message.content) }
                                }
                            }
                            if *busy.read() {
                                div { class: "hint", "Thinking…" }
                            }
                        }
                        div { class: "composer",
                            textarea {
                                value: "{input}",
                                placeholder: "Ask about the data",
                                oninput: move |evt| input.set(evt.value()),
                                onkeydown: move |evt| {
                                    if evt.key() == Key::Enter && !evt.modifiers().shift() {
                                        evt.prevent_default();
                                        on_send.call(());
                                    }
                                },
                            }
                            button {
                                disabled: *busy.read(),
                                onclick: move |_| on_send.call(()),
                                "Send"
                            }
                        }
                    }
                }
            }
        }
    }
}
