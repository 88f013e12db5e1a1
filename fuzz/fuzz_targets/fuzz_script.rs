#![no_main]

//! Command script parser fuzzer.
//!
//! Parsing must never panic, and every parsed command must survive a
//! print-and-reparse cycle unchanged.

use libfuzzer_sys::fuzz_target;
use space_explore::Command;
use space_explore::game::parse_script;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(commands) = parse_script(text) else {
        return;
    };
    for command in commands {
        let printed = command.to_string();
        let reparsed: Command = printed
            .parse()
            .unwrap_or_else(|e| panic!("`{printed}` failed to reparse: {e}"));
        assert_eq!(reparsed, command);
    }
});
