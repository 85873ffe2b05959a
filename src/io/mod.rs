use std::fs;
use std::io::{BufRead, BufReader};
use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::mpsc;
use std::thread;

use crate::SOCKET_PATH;

/// Runtime controls an outside UI can send to the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    Reset,
    Prepopulate(bool),
    Resize { width: u32, height: u32 },
    Refresh,
    Speed(f64),
}

pub fn spawn_control_listener(tx: mpsc::Sender<ControlEvent>) {
    let _ = fs::remove_file(SOCKET_PATH);
    let listener = UnixListener::bind(SOCKET_PATH).ok();
    thread::spawn(move || {
        if let Some(listener) = listener {
            for stream in listener.incoming().flatten() {
                handle_stream(stream, &tx);
            }
        }
    });
}

fn handle_stream(stream: UnixStream, tx: &mpsc::Sender<ControlEvent>) {
    let reader = BufReader::new(stream);
    for line in reader.lines().map_while(Result::ok) {
        if let Some(ev) = parse_control_line(&line) {
            let _ = tx.send(ev);
        }
    }
}

pub fn parse_control_line(line: &str) -> Option<ControlEvent> {
    let mut parts = line.split_whitespace();
    let verb = parts.next()?.to_ascii_uppercase();
    let event = match verb.as_str() {
        "RESET" => ControlEvent::Reset,
        "REFRESH" => ControlEvent::Refresh,
        "PREPOPULATE" => match parts.next()?.to_ascii_lowercase().as_str() {
            "on" | "true" | "1" => ControlEvent::Prepopulate(true),
            "off" | "false" | "0" => ControlEvent::Prepopulate(false),
            _ => return None,
        },
        "SIZE" => {
            let width = parts.next()?.parse().ok()?;
            let height = parts.next()?.parse().ok()?;
            ControlEvent::Resize { width, height }
        }
        "SPEED" => ControlEvent::Speed(parts.next()?.parse().ok()?),
        _ => return None,
    };
    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_control_line("RESET"), Some(ControlEvent::Reset));
        assert_eq!(parse_control_line("  refresh "), Some(ControlEvent::Refresh));
        assert_eq!(
            parse_control_line("PREPOPULATE on"),
            Some(ControlEvent::Prepopulate(true))
        );
        assert_eq!(
            parse_control_line("prepopulate OFF"),
            Some(ControlEvent::Prepopulate(false))
        );
        assert_eq!(
            parse_control_line("SIZE 640 480"),
            Some(ControlEvent::Resize {
                width: 640,
                height: 480
            })
        );
        assert_eq!(parse_control_line("SPEED 0.8"), Some(ControlEvent::Speed(0.8)));
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in ["", "JUMP", "SIZE 10", "SIZE -1 20", "PREPOPULATE maybe", "SPEED fast"] {
            assert_eq!(parse_control_line(line), None, "{line:?}");
        }
    }
}
