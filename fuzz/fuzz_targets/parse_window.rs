#![no_main]

use std::ops::ControlFlow;

use ipspan::{CancelToken, parse_window};
use libfuzzer_sys::fuzz_target;

/// Straightforward reading of the line grammar, used as the oracle.
fn reference(line: &[u8]) -> Option<u32> {
    let parts: Vec<&[u8]> = line.split(|&b| b == b'.').collect();
    if parts.len() != 4 {
        return None;
    }

    let mut address = 0u32;
    for part in parts {
        if !part.iter().all(u8::is_ascii_digit) {
            return None;
        }
        let mut octet = 0u32;
        for &digit in part {
            octet = octet * 10 + u32::from(digit - b'0');
            if octet > 255 {
                return None;
            }
        }
        address = (address << 8) | octet;
    }
    Some(address)
}

fuzz_target!(|data: &[u8]| {
    let cancel = CancelToken::new();

    for index in [0u64, 1] {
        let mut got = Vec::new();
        let flow = parse_window(data, index, &cancel, |ip| {
            got.push(ip);
            ControlFlow::Continue(())
        });
        assert!(flow.is_continue());

        // every complete line except, for later chunks, the first one
        let mut lines: Vec<&[u8]> = data.split(|&b| b == b'\n').collect();
        lines.pop();
        let skip = usize::from(index != 0 && !lines.is_empty());
        let want: Vec<u32> = lines[skip..].iter().filter_map(|l| reference(l)).collect();

        assert_eq!(got, want);
    }
});
