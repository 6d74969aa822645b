//! WASM bindings for the KVCM shell.
//!
//! The JavaScript host owns the web views and the wallet SDK. It hands them to
//! `WasmShell` as plain objects; the Rust side runs the login and wallet flows
//! and answers the web app over the host's bridge channel.

pub mod auth;
mod error;
#[cfg(target_arch = "wasm32")]
pub mod host;
#[cfg(target_arch = "wasm32")]
pub mod shell;
