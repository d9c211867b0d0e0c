//! Logging setup and best-effort frame broadcasting.
//!
//! Call [`init_tracing`] once at process startup.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `FOOTSTEP_LOG_FORMAT=json` | Emit newline-delimited JSON logs. |
//!
//! Selected frames are published through a [`PoseBroadcaster`].  Publishing
//! is fire-and-forget: a broadcaster never reports failure to the planner.

use footstep_types::FramePose;
use tokio::sync::broadcast;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default channel capacity of [`BusBroadcaster`].
const DEFAULT_CAPACITY: usize = 64;

// ─────────────────────────────────────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────────────────────────────────────

/// Install the global `tracing` subscriber.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_tracing() -> bool {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let use_json = std::env::var("FOOTSTEP_LOG_FORMAT").as_deref() == Ok("json");

    if use_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init()
            .is_ok()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Broadcasting
// ─────────────────────────────────────────────────────────────────────────────

/// Sink for named frames, e.g. for visualisation.
pub trait PoseBroadcaster: Send + Sync {
    fn broadcast(&self, frame: FramePose);
}

/// Discards every frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBroadcaster;

impl PoseBroadcaster for NullBroadcaster {
    fn broadcast(&self, _: FramePose) {}
}

/// Publishes frames on a [`tokio::sync::broadcast`] channel.  Clone it
/// cheaply – all clones share the same channel.
#[derive(Debug, Clone)]
pub struct BusBroadcaster {
    sender: broadcast::Sender<FramePose>,
}

impl BusBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FramePose> {
        self.sender.subscribe()
    }
}

impl Default for BusBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl PoseBroadcaster for BusBroadcaster {
    fn broadcast(&self, frame: FramePose) {
        // No subscribers is a normal condition.
        let _ = self.sender.send(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use footstep_types::pose::{Pose, StanceFoot, World};

    fn frame() -> FramePose {
        let pose: Pose<World, StanceFoot> = Pose::from_translation(0.1, 0.2, 0.0);
        FramePose::from_pose(&pose)
    }

    #[test]
    fn bus_delivers_to_every_subscriber() {
        let bus = BusBroadcaster::default();
        let mut a = bus.subscribe();
        let mut b = bus.clone().subscribe();
        bus.broadcast(frame());

        let got = a.try_recv().unwrap();
        assert_eq!(got.parent, "world");
        assert_eq!(got.child, "stance_foot");
        assert_eq!(got.translation, [0.1, 0.2, 0.0]);
        assert_eq!(b.try_recv().unwrap(), got);
    }

    #[test]
    fn broadcasting_without_subscribers_is_silent() {
        BusBroadcaster::new(4).broadcast(frame());
        NullBroadcaster.broadcast(frame());
    }

    #[test]
    fn frame_record_serialises_to_json() {
        let f = frame();
        let json = serde_json::to_string(&f).unwrap();
        assert!(json.contains("\"child\":\"stance_foot\""));
        let back: FramePose = serde_json::from_str(&json).unwrap();
        assert_eq!(back, f);
    }

    #[test]
    fn second_init_is_rejected_quietly() {
        init_tracing();
        assert!(!init_tracing());
    }
}
