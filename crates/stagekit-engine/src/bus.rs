//! Synchronous fan-out of panel events, with telemetry mirroring.

use stagekit_types::{Event, Location, TelemetrySample};

/// Telemetry collaborator a subset of events is mirrored to.
///
/// Sampling failures are swallowed: telemetry must never affect the panel.
pub trait Sampler {
    fn sample(&self, sample: &TelemetrySample) -> anyhow::Result<()>;
}

/// A sampler that drops everything.
pub struct NoopSampler;

impl Sampler for NoopSampler {
    fn sample(&self, _sample: &TelemetrySample) -> anyhow::Result<()> {
        Ok(())
    }
}

type Listener = Box<dyn FnMut(&Event) -> anyhow::Result<()>>;

/// Ordered listener lists per event name, dispatched synchronously.
///
/// Delivery is single-threaded and in listener-registration order. A
/// failing listener is isolated and logged; it never prevents subsequent
/// listeners from running and never propagates to the firing site.
pub struct EventBus {
    listeners: Vec<(stagekit_types::EventName, Listener)>,
    sampler: Option<Box<dyn Sampler>>,
}

impl Default for EventBus {
    fn default() -> Self {
        EventBus::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        EventBus {
            listeners: Vec::new(),
            sampler: None,
        }
    }

    pub fn with_sampler(sampler: Box<dyn Sampler>) -> Self {
        EventBus {
            listeners: Vec::new(),
            sampler: Some(sampler),
        }
    }

    /// Register a listener for `name`. Listeners fire in registration
    /// order.
    pub fn on<F>(&mut self, name: stagekit_types::EventName, listener: F)
    where
        F: FnMut(&Event) -> anyhow::Result<()> + 'static,
    {
        self.listeners.push((name, Box::new(listener)));
    }

    /// Drop all listeners (session teardown).
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Dispatch `event` to its listeners, then mirror it to the sampler
    /// when the name is on the allow-list. `source` is the current
    /// location, normalized into the telemetry payload.
    pub fn fire(&mut self, event: &Event, source: &Location) {
        for (name, listener) in self.listeners.iter_mut() {
            if *name != event.name {
                continue;
            }
            if let Err(err) = listener(event) {
                tracing::warn!(event = %event.name, %err, "event listener failed");
            }
        }

        if let Some(sampler) = &self.sampler
            && event.name.is_sampled()
        {
            let sample = TelemetrySample {
                checkpoint: event.name.to_string(),
                source: source.href(),
                target: event.payload.target(),
            };
            if let Err(err) = sampler.sample(&sample) {
                tracing::debug!(checkpoint = %sample.checkpoint, %err, "telemetry sample dropped");
            }
        }
    }
}
