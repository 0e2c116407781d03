//! Termination signals that stop the bridge
//!
//! Every listener is registered before the bridge opens its port, so a
//! registration failure is a startup error rather than a silent stop. The
//! process keeps the default disposition until then.

use std::io;

use anyhow::{Context, Result};
use telebridge_core::ShutdownSignal;

/// Registered listeners for all termination requests on this platform
pub struct ShutdownListener {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,

    #[cfg(windows)]
    ctrl_c: tokio::signal::windows::CtrlC,
    #[cfg(windows)]
    ctrl_break: tokio::signal::windows::CtrlBreak,
    #[cfg(windows)]
    ctrl_close: tokio::signal::windows::CtrlClose,
    #[cfg(windows)]
    ctrl_logoff: tokio::signal::windows::CtrlLogoff,
    #[cfg(windows)]
    ctrl_shutdown: tokio::signal::windows::CtrlShutdown,
}

impl ShutdownListener {
    /// Register SIGINT and SIGTERM
    #[cfg(unix)]
    pub fn register() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Register Ctrl+C, Ctrl+Break, console close, logoff and system shutdown
    #[cfg(windows)]
    pub fn register() -> io::Result<Self> {
        use tokio::signal::windows;

        Ok(Self {
            ctrl_c: windows::ctrl_c()?,
            ctrl_break: windows::ctrl_break()?,
            ctrl_close: windows::ctrl_close()?,
            ctrl_logoff: windows::ctrl_logoff()?,
            ctrl_shutdown: windows::ctrl_shutdown()?,
        })
    }

    /// Wait for the first termination request
    #[cfg(unix)]
    pub async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
        }
    }

    /// Wait for the first termination request
    #[cfg(windows)]
    pub async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.ctrl_c.recv() => "Ctrl+C",
            _ = self.ctrl_break.recv() => "Ctrl+Break",
            _ = self.ctrl_close.recv() => "console close",
            _ = self.ctrl_logoff.recv() => "logoff",
            _ = self.ctrl_shutdown.recv() => "system shutdown",
        }
    }
}

/// Clear the run-flag on the first termination request
///
/// Fails without touching `signal` when the listeners could not be
/// registered. Must be called inside a tokio runtime.
pub fn watch(listener: io::Result<ShutdownListener>, signal: &ShutdownSignal) -> Result<()> {
    let mut listener = listener.context("Cannot listen for shutdown signals")?;
    let signal = signal.clone();

    tokio::spawn(async move {
        let source = listener.recv().await;
        tracing::info!("Shutdown requested ({})", source);
        signal.trigger();
    });
    Ok(())
}
