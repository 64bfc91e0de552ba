//! Web dashboard with an HTML status table and JSON API

use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;

use crate::status::{EndpointState, StateHandle};

/// Dashboard application state
#[derive(Clone)]
pub struct DashboardState {
    pub state: StateHandle,
}

/// Build the dashboard axum router
pub fn build_router(state: StateHandle) -> Router {
    let dashboard_state = DashboardState { state };

    Router::new()
        .route("/", get(index_handler))
        .route("/api/status", get(status_handler))
        .route("/health", get(health_handler))
        .with_state(dashboard_state)
}

fn state_colors(state: EndpointState) -> (&'static str, &'static str) {
    match state {
        EndpointState::Up => ("#155724", "#d4edda"),
        EndpointState::Down => ("#721c24", "#f8d7da"),
        EndpointState::Loading => ("#383d41", "#e2e3e5"),
    }
}

async fn index_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;

    let rows: String = if state.slots().is_empty() {
        r#"<tr><td colspan="6" style="padding: 0.5rem; color: #6c757d;">No endpoints configured</td></tr>"#
            .to_string()
    } else {
        state
            .slots()
            .iter()
            .map(|slot| {
                let (color, bg) = state_colors(slot.state);
                let response_time = slot
                    .response_time_ms
                    .map(|ms| format!("{} ms", ms))
                    .unwrap_or_else(|| "-".to_string());
                let detail = slot
                    .error
                    .clone()
                    .or_else(|| {
                        slot.response
                            .as_ref()
                            .map(|r| format!("HTTP {}", r.status_code))
                    })
                    .unwrap_or_default();
                let last_checked = format!(
                    r#"<script>document.write(new Date({}).toLocaleTimeString())</script>"#,
                    slot.last_checked_epoch_ms
                );
                format!(
                    r#"<tr style="border-bottom: 1px solid #dee2e6;">
                        <td style="padding: 0.5rem;">{}</td>
                        <td style="padding: 0.5rem;">{}</td>
                        <td style="padding: 0.5rem;">
                            <span style="display: inline-block; padding: 0.25em 0.6em; border-radius: 0.25rem; font-size: 0.85em; font-weight: 600; color: {}; background-color: {};">{}</span>
                        </td>
                        <td style="padding: 0.5rem;">{}</td>
                        <td style="padding: 0.5rem;">{}</td>
                        <td style="padding: 0.5rem;">{}</td>
                    </tr>"#,
                    slot.endpoint.name,
                    slot.endpoint.url,
                    color,
                    bg,
                    slot.state,
                    response_time,
                    detail,
                    last_checked
                )
            })
            .collect()
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta http-equiv="refresh" content="5">
    <title>Vigil</title>
</head>
<body style="font-family: system-ui, sans-serif; max-width: 960px; margin: 0 auto; padding: 1rem;">
    <h1>Vigil</h1>
    <section>
        <h2>Endpoints</h2>
        <table style="width: 100%; border-collapse: collapse;">
            <thead>
                <tr style="border-bottom: 2px solid #dee2e6;">
                    <th style="padding: 0.5rem; text-align: left;">Name</th>
                    <th style="padding: 0.5rem; text-align: left;">URL</th>
                    <th style="padding: 0.5rem; text-align: left;">State</th>
                    <th style="padding: 0.5rem; text-align: left;">Response Time</th>
                    <th style="padding: 0.5rem; text-align: left;">Detail</th>
                    <th style="padding: 0.5rem; text-align: left;">Last Checked</th>
                </tr>
            </thead>
            <tbody>{rows}</tbody>
        </table>
    </section>
</body>
</html>"#,
        rows = rows,
    );

    Html(html)
}

async fn status_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    axum::Json(state.snapshot())
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}
