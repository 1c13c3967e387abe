slint::include_modules!();

mod app;
mod color;
mod config;
mod history;
mod hotkey;
mod instance;
mod picker;
mod tray;

use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use ksni::blocking::TrayMethods;
use rand::Rng;
use slint::ComponentHandle;
use tracing_subscriber::EnvFilter;

use app::AppState;
use color::{Rgb, SHADE_FACTORS};
use config::{Config, SHORTCUT_PRESETS};
use history::History;
use instance::InstanceLock;
use tray::{AppTray, TrayMessage};

const CONFIG_FILE: &str = "config.json";
const HISTORY_FILE: &str = "color_history.json";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let _lock = match InstanceLock::acquire() {
        Some(lock) => lock,
        None => {
            // Visible regardless of log filtering; this stands in for the
            // "already running" dialog.
            eprintln!("Fairy Color Picker is already running in the tray");
            return Ok(());
        }
    };

    let config = Config::load(PathBuf::from(CONFIG_FILE));
    let history = History::load(PathBuf::from(HISTORY_FILE));

    let ui = AppWindow::new()?;
    let overlay = PickerOverlay::new()?;
    overlay.hide().ok();
    overlay.window().on_close_requested(|| {
        picker::cancel();
        slint::CloseRequestResponse::HideWindow
    });

    let initial_color = history
        .last()
        .map(|entry| entry.rgb())
        .unwrap_or_else(random_color);
    let shortcut_index = config.preset_index().unwrap_or(0);
    let initial_shortcut = config.shortcut.clone();

    let state = Arc::new(Mutex::new(AppState { config, history }));

    app::apply_color(&ui, initial_color);
    app::sync_history(&ui, &state.lock().unwrap().history);

    let ui_handle = ui.as_weak();
    let overlay_weak = overlay.as_weak();

    let (tray_tx, tray_rx) = mpsc::channel();
    let _tray_handle = match AppTray::new(tray_tx, shortcut_index, initial_color).spawn() {
        Ok(handle) => Some(handle),
        Err(err) => {
            tracing::warn!("tray: failed to spawn: {err}");
            None
        }
    };

    // Keep the tray icon tinted with the current color.
    if let Some(handle) = &_tray_handle {
        let handle = handle.clone();
        ui.on_color_applied(move |r, g, b| {
            let color = Rgb::new(r as u8, g as u8, b as u8);
            let _ = handle.update(move |tray| tray.set_color(color));
        });
    }

    // Hotkey listener; the tray forwarder sends new shortcuts over `rebind_tx`.
    let (rebind_tx, rebind_rx) = mpsc::channel();
    {
        let trigger_ui = ui_handle.clone();
        let trigger_overlay = overlay_weak.clone();
        let error_ui = ui_handle.clone();
        hotkey::spawn_listener(
            initial_shortcut,
            rebind_rx,
            move || trigger_pick(trigger_ui.clone(), trigger_overlay.clone()),
            move |message| {
                let _ = error_ui.upgrade_in_event_loop(move |ui| {
                    app::show_error(&ui, &message);
                });
            },
        );
    }

    // Tray message forwarder: the only bridge from the tray service thread
    // into the UI event loop.
    {
        let ui_weak = ui_handle.clone();
        let fwd_overlay = overlay_weak.clone();
        let fwd_state = state.clone();
        thread::spawn(move || {
            for message in tray_rx {
                match message {
                    TrayMessage::PickColor => {
                        trigger_pick(ui_weak.clone(), fwd_overlay.clone());
                    }
                    TrayMessage::ShowWindow => {
                        let _ = ui_weak.upgrade_in_event_loop(|ui| {
                            ui.window().show().ok();
                        });
                    }
                    TrayMessage::ChangeShortcut(index) => {
                        let Some(preset) = SHORTCUT_PRESETS.get(index) else {
                            continue;
                        };
                        {
                            let mut state = fwd_state.lock().unwrap();
                            state.config.shortcut = preset.to_string();
                            state.config.save();
                        }
                        if rebind_tx.send(preset.to_string()).is_err() {
                            tracing::warn!("hotkey listener is gone, shortcut not rebound");
                        }
                    }
                    TrayMessage::Exit => {
                        let _ = slint::invoke_from_event_loop(|| {
                            slint::quit_event_loop().ok();
                        });
                    }
                }
            }
        });
    }

    {
        let ui_weak = ui_handle.clone();
        ui.on_sliders_edited(move || {
            let ui = ui_weak.unwrap();
            let color = app::current_rgb(&ui);
            app::apply_color(&ui, color);
        });
    }

    {
        let ui_weak = ui_handle.clone();
        ui.on_update_from_input(move |text| {
            let ui = ui_weak.unwrap();
            match Rgb::parse(&text) {
                Ok(color) => app::apply_color(&ui, color),
                Err(err) => app::show_error(&ui, &err.to_string()),
            }
        });
    }

    ui.on_copy_text(|text| app::copy_to_clipboard(text.to_string()));

    {
        let ui_weak = ui_handle.clone();
        ui.on_shade_clicked(move |index| {
            let ui = ui_weak.unwrap();
            if let Some(&factor) = SHADE_FACTORS.get(index as usize) {
                let shade = app::current_rgb(&ui).shade(factor);
                app::apply_color(&ui, shade);
                app::copy_to_clipboard(shade.hex());
            }
        });
    }

    {
        let ui_weak = ui_handle.clone();
        let save_state = state.clone();
        ui.on_save_to_history(move || {
            let ui = ui_weak.unwrap();
            let color = app::current_rgb(&ui);
            let mut state = save_state.lock().unwrap();
            state.history.append_or_touch(color);
            app::sync_history(&ui, &state.history);
        });
    }

    {
        let ui_weak = ui_handle.clone();
        let click_state = state.clone();
        ui.on_history_clicked(move |index| {
            let ui = ui_weak.unwrap();
            let state = click_state.lock().unwrap();
            // the view lists most-recent first, storage is most-recent last
            let entries = state.history.entries();
            let entry = entries
                .len()
                .checked_sub(1 + index as usize)
                .and_then(|i| entries.get(i));
            if let Some(entry) = entry {
                app::apply_color(&ui, entry.rgb());
            }
        });
    }

    {
        let ui_weak = ui_handle.clone();
        let clear_state = state.clone();
        ui.on_clear_history(move || {
            let ui = ui_weak.unwrap();
            let mut state = clear_state.lock().unwrap();
            state.history.clear();
            app::sync_history(&ui, &state.history);
        });
    }

    {
        let ui_weak = ui_handle.clone();
        let pick_overlay = overlay_weak.clone();
        ui.on_pick_color(move || trigger_pick(ui_weak.clone(), pick_overlay.clone()));
    }

    // Closing the window keeps the app alive in the tray.
    ui.window()
        .on_close_requested(|| slint::CloseRequestResponse::HideWindow);

    ui.show()?;
    slint::run_event_loop_until_quit()?;
    Ok(())
}

/// Kick off the pick flow from any thread: hop onto the UI thread to snapshot
/// the window's visibility, then spawn the sampling worker.
fn trigger_pick(ui: slint::Weak<AppWindow>, overlay: slint::Weak<PickerOverlay>) {
    let _ = slint::invoke_from_event_loop(move || {
        let was_visible = ui
            .upgrade()
            .map(|ui| ui.window().is_visible())
            .unwrap_or(false);
        picker::start(ui, overlay, was_visible);
    });
}

fn random_color() -> Rgb {
    let mut rng = rand::thread_rng();
    Rgb::new(rng.gen(), rng.gen(), rng.gen())
}
