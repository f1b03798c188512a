//! Rendering of the panel state to terminal text.
//!
//! A pure function of the view state: error, on and off banners are
//! mutually exclusive, a brightness of 0 is not shown.
use lightwatch_common::controller::ViewState;

/// Render the current panel state.
#[must_use]
pub fn render(state: &ViewState) -> String {
    let mut lines: Vec<String> = Vec::new();

    let banner = state.error.map_or_else(
        || state.display_state().to_string(),
        |err| err.to_string(),
    );
    lines.push(banner);

    if state.error.is_none() && state.brightness > 0 {
        lines.push(format!("Brightness level: {} lx", state.brightness));
    }

    let last_updated = state.last_updated.map_or_else(
        || "Not available".to_string(),
        |t| t.format("%H:%M:%S").to_string(),
    );
    lines.push(format!("Last updated: {last_updated}"));

    lines.push(format!("[ {} ]", state.button_label()));

    lines.join("\n")
}
