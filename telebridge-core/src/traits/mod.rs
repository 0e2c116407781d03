//! Boundary Traits for the Telemetry Bridge
//!
//! The bridge core never talks to hardware or to an operating system store
//! directly. Both collaborators sit behind a trait so the pipeline can be
//! driven by a serial port in production and by in-memory doubles in tests.
//!
//! ## Module Organization
//!
//! - [`transport`] - Byte-stream source (serial port, replay file, memory)
//! - [`sink`] - Hierarchical key-value store (registry, file tree, memory)
//!
//! ```text
//! Transport ─→ LineAssembler ─→ ReadingValidator ─→ ChangeGate ─→ StoreWriter ─→ KeyValueSink
//! ```

pub mod sink;
pub mod transport;

pub use sink::KeyValueSink;
pub use transport::Transport;
