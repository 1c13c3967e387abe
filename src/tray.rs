//! System tray icon. Menu actions never touch UI state directly: every
//! activation sends a `TrayMessage` over a channel, drained by a forwarder
//! thread that marshals work onto the UI event loop.

use std::sync::mpsc::Sender;

use ksni::menu::{RadioGroup, RadioItem, StandardItem, SubMenu};
use ksni::{Icon, MenuItem, Tray};

use crate::color::Rgb;
use crate::config::SHORTCUT_PRESETS;

const ICON_SIZE: i32 = 64;

#[derive(Debug)]
pub enum TrayMessage {
    PickColor,
    ShowWindow,
    ChangeShortcut(usize),
    Exit,
}

pub struct AppTray {
    tx: Sender<TrayMessage>,
    shortcut_index: usize,
    color: Rgb,
}

impl AppTray {
    pub fn new(tx: Sender<TrayMessage>, shortcut_index: usize, color: Rgb) -> Self {
        Self {
            tx,
            shortcut_index,
            color,
        }
    }

    /// Re-tint the tray icon; called through the tray handle whenever the
    /// current color changes.
    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    fn send(&self, message: TrayMessage) {
        if self.tx.send(message).is_err() {
            tracing::warn!("tray: forwarder is gone");
        }
    }
}

/// Opaque square of `color`, in the ARGB32 layout the tray protocol expects.
fn solid_icon(color: Rgb, size: i32) -> Icon {
    let mut data = Vec::with_capacity((size * size * 4) as usize);
    for _ in 0..size * size {
        data.extend_from_slice(&[0xff, color.r, color.g, color.b]);
    }
    Icon {
        width: size,
        height: size,
        data,
    }
}

impl Tray for AppTray {
    fn id(&self) -> String {
        "fairy-picker".into()
    }

    fn title(&self) -> String {
        "Fairy Color Picker".into()
    }

    fn icon_name(&self) -> String {
        "color-picker".into()
    }

    fn icon_pixmap(&self) -> Vec<Icon> {
        vec![solid_icon(self.color, ICON_SIZE)]
    }

    fn activate(&mut self, _x: i32, _y: i32) {
        self.send(TrayMessage::ShowWindow);
    }

    fn menu(&self) -> Vec<MenuItem<Self>> {
        vec![
            StandardItem {
                label: "Pick Color".into(),
                activate: Box::new(|this: &mut AppTray| {
                    this.send(TrayMessage::PickColor);
                }),
                ..Default::default()
            }
            .into(),
            StandardItem {
                label: "Show Window".into(),
                activate: Box::new(|this: &mut AppTray| {
                    this.send(TrayMessage::ShowWindow);
                }),
                ..Default::default()
            }
            .into(),
            SubMenu {
                label: "Keyboard Shortcut".into(),
                submenu: vec![RadioGroup {
                    selected: self.shortcut_index,
                    select: Box::new(|this: &mut AppTray, index| {
                        this.shortcut_index = index;
                        this.send(TrayMessage::ChangeShortcut(index));
                    }),
                    options: SHORTCUT_PRESETS
                        .iter()
                        .map(|preset| RadioItem {
                            label: (*preset).into(),
                            ..Default::default()
                        })
                        .collect(),
                }
                .into()],
                ..Default::default()
            }
            .into(),
            StandardItem {
                label: "Exit".into(),
                activate: Box::new(|this: &mut AppTray| {
                    this.send(TrayMessage::Exit);
                }),
                ..Default::default()
            }
            .into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn solid_icon_is_opaque_argb_of_the_color() {
        let icon = solid_icon(Rgb::new(203, 182, 172), 2);
        assert_eq!(icon.width, 2);
        assert_eq!(icon.height, 2);
        assert_eq!(icon.data.len(), 2 * 2 * 4);
        for pixel in icon.data.chunks(4) {
            assert_eq!(pixel, [0xff, 203, 182, 172]);
        }
    }

    #[test]
    fn tray_icon_tracks_the_current_color() {
        let (tx, _rx) = std::sync::mpsc::channel();
        let mut tray = AppTray::new(tx, 0, Rgb::new(255, 0, 0));
        assert_eq!(tray.icon_pixmap()[0].data[..4], [0xff, 255, 0, 0]);
        tray.set_color(Rgb::new(0, 255, 127));
        assert_eq!(tray.icon_pixmap()[0].data[..4], [0xff, 0, 255, 127]);
    }
}
