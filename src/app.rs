//! UI-thread helpers shared between callbacks, the picker worker, and the
//! tray forwarder.

use std::rc::Rc;
use std::thread;
use std::time::Duration;

use arboard::{Clipboard, SetExtLinux};
use slint::{Color, ComponentHandle, ModelRc, VecModel};

use crate::color::Rgb;
use crate::config::Config;
use crate::history::History;
use crate::{AppWindow, HistoryItem, PickerOverlay};

const ERROR_TOAST_DURATION: Duration = Duration::from_secs(3);

/// Mutable application state. Owned behind an `Arc<Mutex<..>>`; the UI
/// properties themselves always track the current color.
pub struct AppState {
    pub config: Config,
    pub history: History,
}

/// The color currently shown by the sliders.
pub fn current_rgb(ui: &AppWindow) -> Rgb {
    Rgb::new(
        ui.get_red().round() as u8,
        ui.get_green().round() as u8,
        ui.get_blue().round() as u8,
    )
}

/// Push `color` into every widget that renders it: preview, sliders,
/// textual readouts, and the shade row.
pub fn apply_color(ui: &AppWindow, color: Rgb) {
    ui.set_red(color.r as f32);
    ui.set_green(color.g as f32);
    ui.set_blue(color.b as f32);
    ui.set_current_color(Color::from_rgb_u8(color.r, color.g, color.b));
    ui.set_val_hex(color.hex().into());
    ui.set_val_rgb(color.rgb_string().into());
    ui.set_val_values(color.values_string().into());

    let shades: Vec<Color> = color
        .shades()
        .iter()
        .map(|shade| Color::from_rgb_u8(shade.r, shade.g, shade.b))
        .collect();
    ui.set_shade_colors(ModelRc::from(Rc::new(VecModel::from(shades))));

    ui.invoke_color_applied(color.r as i32, color.g as i32, color.b as i32);
}

/// Rebuild the history model, most-recent entry first.
pub fn sync_history(ui: &AppWindow, history: &History) {
    let items: Vec<HistoryItem> = history
        .entries()
        .iter()
        .rev()
        .map(|entry| {
            let rgb = entry.rgb();
            HistoryItem {
                color: Color::from_rgb_u8(rgb.r, rgb.g, rgb.b),
                hex: entry.color.clone().into(),
                rgb_text: rgb.rgb_string().into(),
                timestamp: entry.timestamp.clone().into(),
            }
        })
        .collect();
    ui.set_history_model(ModelRc::from(Rc::new(VecModel::from(items))));
}

/// Show a toast that clears itself after a few seconds.
pub fn show_error(ui: &AppWindow, message: &str) {
    ui.set_error_text(message.into());
    ui.set_error_open(true);
    let weak = ui.as_weak();
    slint::Timer::single_shot(ERROR_TOAST_DURATION, move || {
        if let Some(ui) = weak.upgrade() {
            ui.set_error_open(false);
        }
    });
}

/// Show a timed message on the picker overlay. Used for sampling failures,
/// which must stay visible when the main window is hidden in the tray.
pub fn show_overlay_error(overlay: &PickerOverlay, message: &str) {
    overlay.set_error_text(message.into());
    overlay.set_error_mode(true);
    overlay.show().ok();
    let weak = overlay.as_weak();
    slint::Timer::single_shot(ERROR_TOAST_DURATION, move || {
        if let Some(overlay) = weak.upgrade() {
            overlay.set_error_mode(false);
            overlay.hide().ok();
        }
    });
}

/// Clipboard writes block until another client takes over the selection, so
/// they run on their own thread.
pub fn copy_to_clipboard(text: String) {
    thread::spawn(move || match Clipboard::new() {
        Ok(mut clipboard) => {
            if let Err(err) = clipboard.set().wait().text(text) {
                tracing::warn!("clipboard: set failed: {err}");
            }
        }
        Err(err) => tracing::warn!("clipboard: unavailable: {err}"),
    });
}
