//! Pipeline coordination.
//!
//! Location updates and scheduled refreshes funnel into one event channel
//! consumed by a single task, so pipeline runs never interleave and the
//! snapshot has exactly one writer. Each run: fetch → (geocode on fresh
//! locations) → build timeline → render → arm the next refresh.

use chrono::Utc;
use skybar_weather::{
    Location, LocationError, LocationFilter, PlaceInfo, ReverseGeocoder, WeatherData,
    WeatherSource,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::render::Renderer;
use crate::schedule::RefreshScheduler;
use crate::timeline;

/// Events feeding the pipeline.
#[derive(Debug, Clone)]
pub enum AgentEvent {
    /// The location source delivered a fresh position.
    LocationUpdate(Location),
    /// The hourly refresh timer fired.
    RefreshDue,
}

/// The only state surviving between pipeline runs.
#[derive(Debug, Default)]
pub struct PipelineSnapshot {
    pub last_weather: Option<WeatherData>,
    pub last_place: Option<PlaceInfo>,
    pub last_location: Option<Location>,
}

/// Submits events to a running agent. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AgentHandle {
    events: mpsc::UnboundedSender<AgentEvent>,
}

impl AgentHandle {
    pub fn submit_location(&self, location: Location) {
        let _ = self.events.send(AgentEvent::LocationUpdate(location));
    }
}

/// Sequences location updates, weather fetches, geocoding, timeline
/// builds, and refresh scheduling.
pub struct PipelineCoordinator {
    snapshot: PipelineSnapshot,
    provider: Arc<dyn WeatherSource>,
    geocoder: Arc<dyn ReverseGeocoder>,
    renderer: Box<dyn Renderer>,
    scheduler: RefreshScheduler,
    location_filter: LocationFilter,
    events: mpsc::UnboundedSender<AgentEvent>,
}

impl PipelineCoordinator {
    /// Spawn the coordinator onto the runtime. Returns a handle for event
    /// submission and the running task.
    pub fn spawn(
        provider: Arc<dyn WeatherSource>,
        geocoder: Arc<dyn ReverseGeocoder>,
        renderer: Box<dyn Renderer>,
        min_move_meters: f64,
    ) -> (AgentHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let coordinator = Self::new(provider, geocoder, renderer, min_move_meters, tx.clone());
        let task = tokio::spawn(coordinator.run(rx));
        (AgentHandle { events: tx }, task)
    }

    fn new(
        provider: Arc<dyn WeatherSource>,
        geocoder: Arc<dyn ReverseGeocoder>,
        renderer: Box<dyn Renderer>,
        min_move_meters: f64,
        events: mpsc::UnboundedSender<AgentEvent>,
    ) -> Self {
        Self {
            snapshot: PipelineSnapshot::default(),
            provider,
            geocoder,
            renderer,
            scheduler: RefreshScheduler::new(),
            location_filter: LocationFilter::new(min_move_meters),
            events,
        }
    }

    /// Consume events until every external sender is gone. Events are
    /// handled one at a time; a trigger arriving mid-run queues behind it.
    async fn run(mut self, mut events: mpsc::UnboundedReceiver<AgentEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        self.scheduler.cancel();
        tracing::info!("Agent event loop stopped");
    }

    async fn handle_event(&mut self, event: AgentEvent) {
        match event {
            AgentEvent::LocationUpdate(location) => {
                if !self.location_filter.accept(&location) {
                    tracing::debug!("Ignoring location update below movement threshold");
                    return;
                }
                self.refresh(Some(location)).await;
            }
            AgentEvent::RefreshDue => self.refresh(None).await,
        }
    }

    async fn refresh(&mut self, new_location: Option<Location>) {
        let location = match new_location
            .clone()
            .or_else(|| self.snapshot.last_location.clone())
        {
            Some(location) => location,
            None => {
                tracing::warn!("Skipping refresh: {}", LocationError::NoKnownLocation);
                return;
            }
        };

        match self.provider.fetch(&location).await {
            Ok(weather) => self.snapshot.last_weather = Some(weather),
            Err(e) => tracing::warn!("Weather fetch failed, keeping previous data: {}", e),
        }

        // Place names change far less often than weather; geocode only
        // when the position actually moved
        if let Some(location) = new_location {
            match self.geocoder.resolve(&location).await {
                Ok(place) => self.snapshot.last_place = Some(place),
                Err(e) => {
                    tracing::warn!("Reverse geocode failed, keeping previous place: {}", e)
                }
            }
            self.snapshot.last_location = Some(location);
        }

        let now = Utc::now();
        let entries = timeline::build(self.snapshot.last_weather.as_ref(), now);
        self.renderer.on_timeline_ready(
            &entries,
            self.snapshot.last_weather.as_ref(),
            self.snapshot.last_place.as_ref(),
        );

        let events = self.events.clone();
        if let Err(e) = self.scheduler.schedule_next(now, move || {
            let _ = events.send(AgentEvent::RefreshDue);
        }) {
            tracing::error!("Could not arm the next refresh: {}", e);
        }
    }
}
