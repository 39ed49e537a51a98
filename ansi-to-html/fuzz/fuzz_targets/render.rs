#![no_main]

use ansi_to_html::{Converter, Scheme};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let _ = ansi_to_html::convert_escaped(data);
    let _ = Converter::new().scheme(Scheme::Light).convert_fragment(data);
});
