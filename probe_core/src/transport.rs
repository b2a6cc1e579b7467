//! Maps `Box<dyn Error>` from the `Peripheral` seam to a typed `DriverError`.
//!
//! `probe_traits::Peripheral` uses `Box<dyn Error + Send + Sync>` so any bus
//! implementation can plug in. The driver never sees these errors; the poller
//! classifies them here and then feeds a rejected response instead.

use probe_traits::{Command, Peripheral, Response, Temperature};

use crate::error::DriverError;

/// Map a trait-boundary error to a typed `DriverError`.
///
/// Known error types are matched first, then a string heuristic.
pub fn map_transport_error(e: &(dyn std::error::Error + 'static)) -> DriverError {
    if let Some(io) = e.downcast_ref::<std::io::Error>() {
        if io.kind() == std::io::ErrorKind::TimedOut {
            return DriverError::Timeout;
        }
    }
    if let Some(de) = e.downcast_ref::<DriverError>() {
        return de.clone();
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") || s.to_lowercase().contains("timed out") {
        DriverError::Timeout
    } else {
        DriverError::Transport(s)
    }
}

/// Run one exchange, folding any transport failure into a rejection.
///
/// Returns the response to hand to the driver next tick, plus the fault if
/// the exchange failed at the bus level.
pub fn exchange<P: Peripheral + ?Sized>(
    peripheral: &mut P,
    cmd: Command,
    sentinel: Temperature,
) -> (Response, Option<DriverError>) {
    match peripheral.transact(cmd) {
        Ok(resp) => (resp, None),
        Err(e) => {
            let fault = map_transport_error(&*e);
            tracing::warn!(command = %cmd, error = %fault, "transport fault; treating as rejection");
            (Response::rejected(sentinel), Some(fault))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_timeout_maps_to_timeout() {
        let e = std::io::Error::new(std::io::ErrorKind::TimedOut, "bus");
        assert_eq!(map_transport_error(&e), DriverError::Timeout);
    }

    #[test]
    fn message_heuristic() {
        let e = std::io::Error::other("i2c read timeout");
        assert_eq!(map_transport_error(&e), DriverError::Timeout);
        let e = std::io::Error::other("nack");
        assert_eq!(
            map_transport_error(&e),
            DriverError::Transport("nack".into())
        );
    }
}
