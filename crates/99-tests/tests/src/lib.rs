//! End-to-end tests for the gateway link bridge.

#[cfg(test)]
mod support;

#[cfg(test)]
mod echo_e2e;

#[cfg(test)]
mod errors_e2e;

#[cfg(test)]
mod logging_e2e;

#[cfg(test)]
mod timeout_e2e;
