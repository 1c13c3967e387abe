//! Global shortcut parsing and the listener thread that owns the
//! `GlobalHotKeyManager`.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use global_hotkey::hotkey::{Code, HotKey, Modifiers};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager};

/// Parse a `ctrl+shift+p` style shortcut into a registrable hotkey.
/// Tokens are case-insensitive; exactly one non-modifier key is required.
pub fn parse_shortcut(shortcut: &str) -> Option<HotKey> {
    let mut modifiers = Modifiers::empty();
    let mut code: Option<Code> = None;
    for token in shortcut.split('+') {
        let token = token.trim().to_ascii_lowercase();
        match token.as_str() {
            "ctrl" | "control" => modifiers |= Modifiers::CONTROL,
            "alt" => modifiers |= Modifiers::ALT,
            "shift" => modifiers |= Modifiers::SHIFT,
            "super" | "meta" | "win" => modifiers |= Modifiers::META,
            other => {
                if code.is_some() {
                    return None;
                }
                code = Some(key_code(other)?);
            }
        }
    }
    let mods = if modifiers.is_empty() {
        None
    } else {
        Some(modifiers)
    };
    Some(HotKey::new(mods, code?))
}

fn key_code(token: &str) -> Option<Code> {
    let mut chars = token.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let code = match c {
        'a' => Code::KeyA,
        'b' => Code::KeyB,
        'c' => Code::KeyC,
        'd' => Code::KeyD,
        'e' => Code::KeyE,
        'f' => Code::KeyF,
        'g' => Code::KeyG,
        'h' => Code::KeyH,
        'i' => Code::KeyI,
        'j' => Code::KeyJ,
        'k' => Code::KeyK,
        'l' => Code::KeyL,
        'm' => Code::KeyM,
        'n' => Code::KeyN,
        'o' => Code::KeyO,
        'p' => Code::KeyP,
        'q' => Code::KeyQ,
        'r' => Code::KeyR,
        's' => Code::KeyS,
        't' => Code::KeyT,
        'u' => Code::KeyU,
        'v' => Code::KeyV,
        'w' => Code::KeyW,
        'x' => Code::KeyX,
        'y' => Code::KeyY,
        'z' => Code::KeyZ,
        '0' => Code::Digit0,
        '1' => Code::Digit1,
        '2' => Code::Digit2,
        '3' => Code::Digit3,
        '4' => Code::Digit4,
        '5' => Code::Digit5,
        '6' => Code::Digit6,
        '7' => Code::Digit7,
        '8' => Code::Digit8,
        '9' => Code::Digit9,
        _ => return None,
    };
    Some(code)
}

fn bind(
    manager: &GlobalHotKeyManager,
    current: &mut Option<HotKey>,
    shortcut: &str,
) -> Result<(), String> {
    let hotkey = parse_shortcut(shortcut)
        .ok_or_else(|| format!("Unrecognized shortcut: {shortcut}"))?;
    if let Some(old) = current.take() {
        let _ = manager.unregister(old);
    }
    manager
        .register(hotkey)
        .map_err(|err| format!("Failed to register shortcut {shortcut}: {err}"))?;
    *current = Some(hotkey);
    Ok(())
}

/// Spawn the thread that owns the hotkey manager. `rebind` carries new
/// shortcut strings from the tray menu; `on_trigger` fires the pick flow and
/// `on_error` surfaces registration problems to the UI.
pub fn spawn_listener<T, E>(
    initial: String,
    rebind: mpsc::Receiver<String>,
    on_trigger: T,
    on_error: E,
) where
    T: Fn() + Send + 'static,
    E: Fn(String) + Send + 'static,
{
    thread::spawn(move || {
        let manager = match GlobalHotKeyManager::new() {
            Ok(manager) => manager,
            Err(err) => {
                on_error(format!("Could not start hotkey manager: {err}"));
                return;
            }
        };
        let mut current: Option<HotKey> = None;
        if let Err(message) = bind(&manager, &mut current, &initial) {
            tracing::warn!("hotkey: {message}");
            on_error(message);
        }

        // The event receiver has no companion for the rebind channel, so poll
        // both on a short timeout instead of blocking on either.
        let receiver = GlobalHotKeyEvent::receiver();
        loop {
            if let Ok(event) = receiver.recv_timeout(Duration::from_millis(50)) {
                if current.map(|hotkey| hotkey.id()) == Some(event.id) {
                    on_trigger();
                }
            }
            loop {
                match rebind.try_recv() {
                    Ok(shortcut) => {
                        if let Err(message) = bind(&manager, &mut current, &shortcut) {
                            tracing::warn!("hotkey: {message}");
                            on_error(message);
                        }
                    }
                    Err(mpsc::TryRecvError::Empty) => break,
                    Err(mpsc::TryRecvError::Disconnected) => return,
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_preset_shortcuts() {
        assert_eq!(
            parse_shortcut("ctrl+shift+p"),
            Some(HotKey::new(
                Some(Modifiers::CONTROL | Modifiers::SHIFT),
                Code::KeyP
            ))
        );
        assert_eq!(
            parse_shortcut("ctrl+alt+c"),
            Some(HotKey::new(
                Some(Modifiers::CONTROL | Modifiers::ALT),
                Code::KeyC
            ))
        );
        assert_eq!(
            parse_shortcut("alt+shift+c"),
            Some(HotKey::new(
                Some(Modifiers::ALT | Modifiers::SHIFT),
                Code::KeyC
            ))
        );
    }

    #[test]
    fn tokens_are_case_insensitive_and_trimmed() {
        assert_eq!(
            parse_shortcut(" Ctrl + Shift + P "),
            parse_shortcut("ctrl+shift+p")
        );
    }

    #[test]
    fn accepts_digits_and_bare_keys() {
        assert_eq!(
            parse_shortcut("super+1"),
            Some(HotKey::new(Some(Modifiers::META), Code::Digit1))
        );
        assert_eq!(parse_shortcut("x"), Some(HotKey::new(None, Code::KeyX)));
    }

    #[test]
    fn rejects_malformed_shortcuts() {
        assert_eq!(parse_shortcut(""), None);
        assert_eq!(parse_shortcut("ctrl+shift"), None);
        assert_eq!(parse_shortcut("ctrl+p+q"), None);
        assert_eq!(parse_shortcut("ctrl+f13"), None);
        assert_eq!(parse_shortcut("ctrl+escape"), None);
    }
}
