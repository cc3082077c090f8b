//! User-Friendly Error Formatting
//!
//! Turns errors surfacing in the CLI into messages with troubleshooting
//! hints. Typed library errors are recognised anywhere in the error chain;
//! anything else is matched on its message.

use std::fmt::Write;

use crate::input::error::InputError;
use crate::lock::LockError;

/// Format error for user consumption
///
/// Takes technical error and produces user-friendly message with
/// troubleshooting steps and context.
pub fn format_user_error(error: &anyhow::Error) -> String {
    let mut output = String::new();

    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "╔════════════════════════════════════════════════════════════╗"
    )
    .ok();
    writeln!(
        &mut output,
        "║                     ERROR                                  ║"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();
    writeln!(&mut output).ok();

    let lock_error = error.chain().find_map(|e| e.downcast_ref::<LockError>());
    let input_error = error.chain().find_map(|e| e.downcast_ref::<InputError>());
    let error_msg = error.to_string();

    if let Some(lock_error) = lock_error {
        format_lock_error(&mut output, lock_error);
    } else if let Some(input_error) = input_error {
        format_input_error(&mut output, input_error);
    } else if error_msg.contains("config") {
        format_config_error(&mut output, &error_msg);
    } else {
        format_generic_error(&mut output, &error_msg);
    }

    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Technical Details:").ok();
    writeln!(&mut output).ok();
    writeln!(&mut output, "{:#}", error).ok();
    writeln!(&mut output).ok();

    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Need Help?").ok();
    writeln!(
        &mut output,
        "  - Run with --verbose for detailed logs: input-humanizer -vvv <command>"
    )
    .ok();
    writeln!(
        &mut output,
        "  - Set logging.debug = true in the config to narrate every action"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();

    output
}

fn format_lock_error(output: &mut String, error: &LockError) {
    match error {
        LockError::Timeout { holder, waited, .. } => {
            writeln!(output, "Input Device Busy").ok();
            writeln!(output).ok();
            match holder {
                Some(owner) => {
                    writeln!(
                        output,
                        "'{}' kept the input lock for the whole {:?} wait.",
                        owner, waited
                    )
                    .ok();
                }
                None => {
                    writeln!(output, "The input lock stayed taken for {:?}.", waited).ok();
                }
            }
            writeln!(output).ok();
            writeln!(output, "What To Try:").ok();
            writeln!(output).ok();
            writeln!(output, "  1. Wait longer").ok();
            writeln!(output, "     → Pass a larger --wait-ms").ok();
            writeln!(output).ok();
            writeln!(output, "  2. Check the holder is still making progress").ok();
            writeln!(
                output,
                "     → A session that is never dropped keeps the lock forever"
            )
            .ok();
        }
        LockError::Cancelled { .. } => {
            writeln!(output, "Wait Cancelled").ok();
            writeln!(output).ok();
            writeln!(
                output,
                "Stopped waiting for the input lock before it became free."
            )
            .ok();
        }
    }
}

fn format_input_error(output: &mut String, error: &InputError) {
    match error {
        InputError::Cancelled => {
            writeln!(output, "Action Cancelled").ok();
            writeln!(output).ok();
            writeln!(
                output,
                "The action stopped part way; events already sent stay applied."
            )
            .ok();
            writeln!(
                output,
                "Check the timeline for keys that were pressed but not released."
            )
            .ok();
        }
        InputError::InvalidKey(key) => {
            writeln!(output, "Unknown Key").ok();
            writeln!(output).ok();
            writeln!(output, "'{}' is not a key name or evdev code.", key).ok();
            writeln!(output).ok();
            writeln!(output, "  → Use names like: a, enter, space, f5, left").ok();
            writeln!(output, "  → Or a raw code: 30").ok();
        }
        InputError::InvalidMouseEvent(reason) => {
            writeln!(output, "Invalid Mouse Target").ok();
            writeln!(output).ok();
            writeln!(output, "{}", reason).ok();
            writeln!(output, "  → Coordinates must be finite numbers").ok();
        }
        InputError::SessionReleased(owner) => {
            writeln!(output, "Session No Longer Active").ok();
            writeln!(output).ok();
            writeln!(
                output,
                "'{}' lost the input lock before the action ran.",
                owner
            )
            .ok();
        }
        InputError::Backend(reason) => {
            writeln!(output, "Input Device Error").ok();
            writeln!(output).ok();
            writeln!(output, "The device rejected an event: {}", reason).ok();
        }
    }
}

fn format_config_error(output: &mut String, _error: &str) {
    writeln!(output, "Configuration Error").ok();
    writeln!(output).ok();
    writeln!(output, "Problem with configuration file.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Invalid TOML syntax").ok();
    writeln!(output, "     → Check for typos, missing quotes, etc.").ok();
    writeln!(output).ok();
    writeln!(output, "  2. Inconsistent values").ok();
    writeln!(
        output,
        "     → Every minimum_delay_ms must not exceed its maximum_delay_ms"
    )
    .ok();
    writeln!(
        output,
        "     → gravity and target_area must be positive"
    )
    .ok();
    writeln!(
        output,
        "     → step_size and maximum_distance must be at least 1 pixel"
    )
    .ok();
    writeln!(output).ok();
    writeln!(output, "  3. Omitted fields fall back to defaults").ok();
    writeln!(output, "     → See config.toml.example for reference").ok();
}

fn format_generic_error(output: &mut String, error: &str) {
    writeln!(output, "Input Humanizer Error").ok();
    writeln!(output).ok();
    writeln!(output, "Error: {}", error).ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_lock_timeout_names_holder() {
        let error = anyhow::Error::new(LockError::Timeout {
            requested_by: "cli".into(),
            holder: Some("bot".into()),
            waited: Duration::from_millis(500),
        });
        let formatted = format_user_error(&error);
        assert!(formatted.contains("ERROR"));
        assert!(formatted.contains("Input Device Busy"));
        assert!(formatted.contains("'bot'"));
    }

    #[test]
    fn test_lock_timeout_without_holder() {
        let error = anyhow::Error::new(LockError::Timeout {
            requested_by: "cli".into(),
            holder: None,
            waited: Duration::from_millis(250),
        });
        let formatted = format_user_error(&error);
        assert!(formatted.contains("The input lock stayed taken for 250ms."));
    }

    #[test]
    fn test_input_error_found_through_context() {
        let error = anyhow::Error::new(InputError::InvalidKey("hyper".into()))
            .context("tap failed");
        let formatted = format_user_error(&error);
        assert!(formatted.contains("Unknown Key"));
        assert!(formatted.contains("'hyper'"));
    }

    #[test]
    fn test_config_error_formatting() {
        let error = anyhow::anyhow!("Failed to parse config");
        let formatted = format_user_error(&error);
        assert!(formatted.contains("Configuration Error"));
    }
}
