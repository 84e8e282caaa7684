//! Server configuration
//!
//! Parsed from the command line with environment variable fallbacks.

use std::num::{NonZeroU64, NonZeroUsize};
use std::time::Duration;

use clap::Parser;

use crate::session::SessionConfig;

/// Default server address
pub const DEFAULT_ADDR: &str = "0.0.0.0:13337";

/// Line-oriented TCP chat room server
#[derive(Debug, Clone, Parser)]
#[command(name = "line-chat", version, about)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(env = "LINE_CHAT_ADDR", default_value = DEFAULT_ADDR)]
    pub addr: String,

    /// Lines buffered per member before it is evicted as too slow
    #[arg(long, env = "LINE_CHAT_OUTBOUND_CAPACITY", default_value = "64")]
    pub outbound_capacity: NonZeroUsize,

    /// Pending room events before sessions wait to submit
    #[arg(long, env = "LINE_CHAT_INTAKE_CAPACITY", default_value = "256")]
    pub intake_capacity: NonZeroUsize,

    /// Milliseconds between liveness probes of each connection
    #[arg(long, env = "LINE_CHAT_LIVENESS_INTERVAL_MS", default_value = "500")]
    pub liveness_interval_ms: NonZeroU64,
}

impl ServerConfig {
    /// Settings handed to every session
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            outbound_capacity: self.outbound_capacity.get(),
            liveness_interval: Duration::from_millis(self.liveness_interval_ms.get()),
        }
    }
}
