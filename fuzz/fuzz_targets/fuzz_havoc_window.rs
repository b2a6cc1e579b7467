#![no_main]
use libfuzzer_sys::fuzz_target;
use probe_hardware::HavocWindow;

fuzz_target!(|data: &str| {
    if let Ok(w) = data.parse::<HavocWindow>() {
        assert!(w.end > w.start);
        assert!(w.contains(w.start));
        assert!(!w.contains(w.end));
    }
});
