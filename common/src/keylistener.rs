// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use std::io::{self, BufRead};
use std::thread::JoinHandle;

use crate::StopFlag;

/// Spawns a thread that waits for one line on `input` and then requests a stop.
///
/// The line content is ignored. End of input or a read error leave `stop` untouched. The
/// handle does not need to be joined, the thread never keeps the process alive.
pub fn spawn_key_listener<R>(mut input: R, stop: StopFlag) -> io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    std::thread::Builder::new()
        .name("key_listener".into())
        .spawn(move || {
            let mut line = String::new();
            match input.read_line(&mut line) {
                Ok(0) => log::debug!("Input closed, stop on Enter is disabled"),
                Ok(_) => {
                    log::debug!("Stop requested from input");
                    stop.request();
                }
                Err(e) => log::warn!("Reading input failed: {e}"),
            }
        })
}

#[test]
fn test_line_requests_stop() {
    let stop = StopFlag::new();
    let handle = spawn_key_listener(io::Cursor::new("\n"), stop.clone()).unwrap();
    handle.join().unwrap();
    assert!(stop.is_requested());
}

#[test]
fn test_line_content_is_ignored() {
    let stop = StopFlag::new();
    let handle = spawn_key_listener(io::Cursor::new("quit please"), stop.clone()).unwrap();
    handle.join().unwrap();
    assert!(stop.is_requested());
}

#[test]
fn test_end_of_input_does_not_stop() {
    let stop = StopFlag::new();
    let handle = spawn_key_listener(io::empty(), stop.clone()).unwrap();
    handle.join().unwrap();
    assert!(!stop.is_requested());
}
