//! Human-readable error descriptions and structured JSON error formatting.

use crate::simulate::SelfCheckFailed;

/// Exit code for a failed self-check (usage errors exit 2 through clap).
pub const EXIT_SELF_CHECK: i32 = 3;

/// Everything below the outermost message, joined.
fn causes(err: &eyre::Report) -> String {
    err.chain()
        .skip(1)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use probe_core::error::BuildError;
    use probe_hardware::error::SimError;

    // Typed matches first
    if let Some(sc) = err.downcast_ref::<SelfCheckFailed>() {
        let list = sc
            .failures
            .iter()
            .map(|f| format!("  - {f}"))
            .collect::<Vec<_>>()
            .join("\n");
        return format!(
            "What happened: {sc}.\n{list}\nLikely causes: A driver or sensor model change broke recovery or read timing.\nHow to fix: Re-run `probe simulate --ticks 40 --stats` and compare the trace against the failures above."
        );
    }

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingPeripheral => {
                "What happened: No peripheral was provided to the poller.\nLikely causes: The sensor backend failed to initialize or was not wired into the builder.\nHow to fix: Ensure the peripheral is created successfully and passed via with_peripheral(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(se) = err.downcast_ref::<SimError>() {
        return format!(
            "What happened: Invalid havoc schedule ({se}).\nLikely causes: A --havoc value or [sim] entry with end <= start, or a burst that never lets the device recover.\nHow to fix: Use half-open windows like `--havoc 5..8` and keep havoc_every.length below period."
        );
    }

    if let Some(te) = err.downcast_ref::<toml::de::Error>() {
        let detail = te.message();
        return match te.span() {
            Some(span) => format!(
                "What happened: Configuration is invalid (TOML syntax at bytes {}..{}: {detail}).\nLikely causes: A typo, an unclosed [section] header or a wrongly typed value.\nHow to fix: Compare the file with etc/probe.toml.",
                span.start, span.end
            ),
            None => format!(
                "What happened: Configuration is invalid (TOML: {detail}).\nLikely causes: A typo or a wrongly typed value.\nHow to fix: Compare the file with etc/probe.toml."
            ),
        };
    }

    // String-based heuristics for errors coming from config loading
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("invalid configuration") {
        let cause = causes(err);
        return format!(
            "What happened: Configuration is invalid ({cause}).\nLikely causes: Out-of-range values or a TOML syntax error.\nHow to fix: Edit the TOML config and try again. Every section is optional; delete a key to fall back to its default."
        );
    }

    if lower.contains("failed to read config") {
        return format!(
            "What happened: {msg}.\nLikely causes: Wrong --config path or missing permissions.\nHow to fix: Pass an existing file, or omit --config to run with defaults."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Self-check failures exit 3; everything else exits 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<SelfCheckFailed>().is_some() {
        return EXIT_SELF_CHECK;
    }
    1
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    if let Some(sc) = err.downcast_ref::<SelfCheckFailed>() {
        return json!({
            "reason": "SelfCheckFailed",
            "details": { "total": sc.total, "failures": sc.failures },
            "message": humanize(err),
        })
        .to_string();
    }

    json!({ "reason": "Error", "message": humanize(err) }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::WrapErr;

    #[test]
    fn self_check_failure_maps_to_exit_3() {
        let err = eyre::Report::new(SelfCheckFailed {
            total: 2,
            failures: vec!["cold-start: no successful read".into()],
        });
        assert_eq!(exit_code_for_error(&err), EXIT_SELF_CHECK);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "SelfCheckFailed");
        assert_eq!(v["details"]["failures"][0], "cold-start: no successful read");
    }

    #[test]
    fn rejected_poll_rate_is_a_typed_config_error() {
        let poll = probe_core::PollCfg {
            rate_hz: 0,
            ..Default::default()
        };
        let err = poll.validate().unwrap_err();
        assert_eq!(exit_code_for_error(&err), 1);
        let text = humanize(&err);
        assert!(text.starts_with("What happened: Invalid configuration (rate_hz must be > 0)"));
    }

    #[test]
    fn unknown_errors_fall_back_to_generic_help() {
        let err = eyre::eyre!("bus exploded");
        let text = humanize(&err);
        assert!(text.starts_with("Something went wrong."));
        assert!(text.contains("Original: bus exploded"));
    }

    #[test]
    fn config_errors_keep_the_validation_message() {
        let err = Err::<(), _>(eyre::eyre!("poll.rate_hz must be > 0"))
            .wrap_err("invalid configuration")
            .unwrap_err();
        assert_eq!(exit_code_for_error(&err), 1);
        assert!(humanize(&err).contains("poll.rate_hz must be > 0"));
    }
}
