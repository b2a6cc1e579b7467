#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not. A config that
    // validates must also yield a usable havoc schedule.
    if let Ok(cfg) = probe_config::load_toml(data) {
        if cfg.validate().is_ok() {
            let plan = probe_hardware::fault_plan_from_config(&cfg.sim)
                .expect("validated config builds a fault plan");
            let _ = plan.is_havoc(u64::MAX);
            let _ = probe_hardware::TemperatureProfile::from(&cfg.sim).at(u64::MAX);
        }
    }
});
