//! Screen pixel sampling: a worker thread polls the mouse and key state
//! while reading X11 frames, with a live preview overlay tracking the
//! cursor. Space confirms, Escape cancels.

use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use device_query::{DeviceQuery, DeviceState, Keycode};
use scrap::{Capturer, Display};
use slint::{Color, ComponentHandle, LogicalPosition, Weak};

use crate::app;
use crate::color::Rgb;
use crate::{AppWindow, PickerOverlay};

static PICKER_ACTIVE: AtomicBool = AtomicBool::new(false);
static PICKER_CANCELLED: AtomicBool = AtomicBool::new(false);

const OVERLAY_WIDTH: i32 = 150;
const OVERLAY_HEIGHT: i32 = 52;
const OVERLAY_OFFSET_X: i32 = 20;
const OVERLAY_OFFSET_Y: i32 = 20;
const POLL_TICK: Duration = Duration::from_millis(16);

enum Outcome {
    Picked(Rgb),
    Cancelled,
    Failed(String),
}

pub fn cancel() {
    PICKER_CANCELLED.store(true, Ordering::SeqCst);
}

/// Start the pick flow. `was_visible` is the main window's visibility at
/// invocation time; it is restored on cancel and on sampling failure.
/// Only one picker runs at a time.
pub fn start(ui: Weak<AppWindow>, overlay: Weak<PickerOverlay>, was_visible: bool) {
    if PICKER_ACTIVE
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return;
    }
    PICKER_CANCELLED.store(false, Ordering::SeqCst);

    thread::spawn(move || {
        let device = DeviceState::new();

        let display = match Display::main() {
            Ok(display) => display,
            Err(err) => {
                finish(ui, overlay, was_visible, Outcome::Failed(err.to_string()));
                return;
            }
        };
        let mut capturer = match Capturer::new(display) {
            Ok(capturer) => capturer,
            Err(err) => {
                finish(ui, overlay, was_visible, Outcome::Failed(err.to_string()));
                return;
            }
        };

        let mut last = Rgb::new(0, 0, 0);
        let mut sampled = false;
        // Require a fresh Space press after the flow starts.
        let mut prev_space = true;

        loop {
            if PICKER_CANCELLED.load(Ordering::SeqCst) {
                finish(ui, overlay, was_visible, Outcome::Cancelled);
                return;
            }

            let mouse = device.get_mouse();
            let (mouse_x, mouse_y) = mouse.coords;
            let width = capturer.width() as i32;
            let height = capturer.height() as i32;

            match capturer.frame() {
                Ok(frame) => {
                    if width > 0 && height > 0 {
                        let safe_x = mouse_x.clamp(0, width.saturating_sub(1));
                        let safe_y = mouse_y.clamp(0, height.saturating_sub(1));
                        let stride = width as usize * 4;
                        let idx = safe_y as usize * stride + safe_x as usize * 4;
                        // frames are BGRA
                        if idx + 2 < frame.len() {
                            last = Rgb::new(frame[idx + 2], frame[idx + 1], frame[idx]);
                            sampled = true;
                        }
                    }
                }
                Err(err) if err.kind() == ErrorKind::WouldBlock => {
                    // no frame ready yet, keep the previous sample
                }
                Err(err) => {
                    finish(ui, overlay, was_visible, Outcome::Failed(err.to_string()));
                    return;
                }
            }

            let (pos_x, pos_y) = overlay_position(mouse_x, mouse_y, width, height);
            let color = last;
            let overlay_weak = overlay.clone();
            let invoked = slint::invoke_from_event_loop(move || {
                if PICKER_CANCELLED.load(Ordering::SeqCst) {
                    return;
                }
                if let Some(overlay) = overlay_weak.upgrade() {
                    overlay.set_preview_color(Color::from_rgb_u8(color.r, color.g, color.b));
                    overlay.set_preview_hex(color.hex().into());
                    let scale = overlay.window().scale_factor();
                    let logical =
                        LogicalPosition::new(pos_x as f32 / scale, pos_y as f32 / scale);
                    overlay.window().set_position(logical);
                    overlay.show().ok();
                }
            });
            if let Err(err) = invoked {
                tracing::warn!("picker: event loop gone: {err:?}");
                PICKER_ACTIVE.store(false, Ordering::SeqCst);
                return;
            }

            let keys = device.get_keys();
            if keys.contains(&Keycode::Escape) {
                finish(ui, overlay, was_visible, Outcome::Cancelled);
                return;
            }
            let space = keys.contains(&Keycode::Space);
            if space && !prev_space && sampled {
                finish(ui, overlay, was_visible, Outcome::Picked(last));
                return;
            }
            prev_space = space;

            thread::sleep(POLL_TICK);
        }
    });
}

fn finish(
    ui: Weak<AppWindow>,
    overlay: Weak<PickerOverlay>,
    was_visible: bool,
    outcome: Outcome,
) {
    PICKER_ACTIVE.store(false, Ordering::SeqCst);
    match outcome {
        Outcome::Picked(color) => {
            hide_overlay(overlay);
            let _ = ui.upgrade_in_event_loop(move |ui| {
                app::apply_color(&ui, color);
                ui.window().show().ok();
            });
        }
        Outcome::Cancelled => {
            hide_overlay(overlay);
            let _ = ui.upgrade_in_event_loop(move |ui| restore_visibility(&ui, was_visible));
        }
        Outcome::Failed(message) => {
            tracing::warn!("picker: sampling failed: {message}");
            let text = format!("Error picking color: {message}");
            // The main window may be hidden; the always-on-top overlay
            // carries the timed message so the user sees it either way.
            let overlay_text = text.clone();
            let _ = slint::invoke_from_event_loop(move || {
                if let Some(overlay) = overlay.upgrade() {
                    app::show_overlay_error(&overlay, &overlay_text);
                }
            });
            let _ = ui.upgrade_in_event_loop(move |ui| {
                app::show_error(&ui, &text);
                restore_visibility(&ui, was_visible);
            });
        }
    }
}

fn hide_overlay(overlay: Weak<PickerOverlay>) {
    let _ = slint::invoke_from_event_loop(move || {
        if let Some(overlay) = overlay.upgrade() {
            overlay.hide().ok();
        }
    });
}

fn restore_visibility(ui: &AppWindow, was_visible: bool) {
    if was_visible {
        ui.window().show().ok();
    } else {
        ui.window().hide().ok();
    }
}

/// Keep the overlay near the cursor but fully on screen, flipping to the
/// other side of the pointer at the edges.
fn overlay_position(x: i32, y: i32, screen_w: i32, screen_h: i32) -> (i32, i32) {
    let mut pos_x = x + OVERLAY_OFFSET_X;
    let mut pos_y = y + OVERLAY_OFFSET_Y;

    if pos_x + OVERLAY_WIDTH > screen_w {
        pos_x = x - OVERLAY_WIDTH - OVERLAY_OFFSET_X;
    }
    if pos_y + OVERLAY_HEIGHT > screen_h {
        pos_y = y - OVERLAY_HEIGHT - OVERLAY_OFFSET_Y;
    }

    let max_x = (screen_w - OVERLAY_WIDTH).max(0);
    let max_y = (screen_h - OVERLAY_HEIGHT).max(0);
    (pos_x.clamp(0, max_x), pos_y.clamp(0, max_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_trails_cursor_in_open_space() {
        assert_eq!(overlay_position(100, 100, 1920, 1080), (120, 120));
    }

    #[test]
    fn overlay_flips_at_screen_edges() {
        let (x, y) = overlay_position(1910, 1070, 1920, 1080);
        assert!(x + OVERLAY_WIDTH <= 1920);
        assert!(y + OVERLAY_HEIGHT <= 1080);
        assert!(x < 1910);
        assert!(y < 1070);
    }

    #[test]
    fn overlay_clamps_on_tiny_screens() {
        assert_eq!(overlay_position(5, 5, 100, 40), (0, 0));
    }
}
