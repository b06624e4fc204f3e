//! In-process stand-in for the WMS stick.
//!
//! Answers scans from a fixed device list, moves blinds instantly and, once
//! a position update interval is set, reports every added blind and every
//! simulated weather station on each tick.

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use time::OffsetDateTime;
use tokio::task::JoinHandle;

use crate::errors::StickError;
use crate::models::DeviceType;
use crate::stick::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SimulatedBlind {
    position: u8,
    angle: i8,
}

#[derive(Debug, Default)]
struct SimulatedState {
    catalog: Vec<ScannedDevice>,
    blinds: BTreeMap<u32, SimulatedBlind>,
}

pub struct SimulatedStick {
    config: StickConfig,
    state: Arc<Mutex<SimulatedState>>,
    events: StickSender,
    ticker: Option<JoinHandle<()>>,
}

impl SimulatedStick {
    /// Opens the simulated stick and reports init completion right away.
    pub fn start(
        config: StickConfig,
        catalog: Vec<ScannedDevice>,
        events: StickSender,
    ) -> Result<Self, StickError> {
        tracing::info!(
            "Opening simulated stick on {} (channel {}, PAN ID {}) with {} devices",
            config.serial_port,
            config.channel,
            config.pan_id,
            catalog.len()
        );

        let stick = Self {
            config,
            state: Arc::new(Mutex::new(SimulatedState { catalog, blinds: BTreeMap::new() })),
            events,
            ticker: None,
        };
        stick.emit(StickEvent::InitCompletion)?;

        Ok(stick)
    }

    pub fn config(&self) -> &StickConfig {
        &self.config
    }

    fn state(&self) -> MutexGuard<'_, SimulatedState> {
        lock(&self.state)
    }

    fn emit(&self, event: StickEvent) -> Result<(), StickError> {
        self.events
            .send(StickNotification::event(event))
            .map_err(|_| StickError::ChannelClosed)
    }

    fn report(&self, device_id: u32) -> Result<(), StickError> {
        let blind = self
            .state()
            .blinds
            .get(&device_id)
            .copied()
            .ok_or(StickError::UnknownDevice(device_id))?;

        self.emit(StickEvent::BlindPositionUpdate(position_update(device_id, blind)))
    }
}

impl Stick for SimulatedStick {
    fn add_device(&mut self, device_id: u32, serial: &str) -> Result<(), StickError> {
        tracing::debug!("Simulated stick adds {} ({})", device_id, serial);
        self.state()
            .blinds
            .entry(device_id)
            .or_insert(SimulatedBlind { position: 0, angle: 0 });

        Ok(())
    }

    fn remove_device(&mut self, device_id: u32) -> Result<(), StickError> {
        self.state()
            .blinds
            .remove(&device_id)
            .map(|_| ())
            .ok_or(StickError::UnknownDevice(device_id))
    }

    fn scan_devices(&mut self, options: ScanOptions) -> Result<(), StickError> {
        let devices = self.state().catalog.clone();

        if options.auto_assign_blinds {
            for device in &devices {
                self.add_device(device.snr, &device.snr.to_string())?;
            }
        }

        self.emit(StickEvent::ScannedDevices(devices))
    }

    fn set_position_update_interval(&mut self, interval: Duration) -> Result<(), StickError> {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }

        let state = Arc::clone(&self.state);
        let events = self.events.clone();

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(interval);
            interval.tick().await;

            loop {
                interval.tick().await;

                let pending = tick_events(&lock(&state), day_fraction());

                for event in pending {
                    if events.send(StickNotification::event(event)).is_err() {
                        tracing::debug!("Simulated stick ticker stopped, receiver dropped");
                        return;
                    }
                }
            }
        }));

        Ok(())
    }

    fn set_position(
        &mut self,
        device_id: u32,
        position: u8,
        angle: Option<i8>,
    ) -> Result<(), StickError> {
        {
            let mut state = self.state();
            let blind = state
                .blinds
                .get_mut(&device_id)
                .ok_or(StickError::UnknownDevice(device_id))?;

            blind.position = position.min(100);
            if let Some(angle) = angle {
                blind.angle = angle.clamp(-100, 100);
            }
        }

        self.report(device_id)
    }

    fn stop(&mut self, device_id: u32) -> Result<(), StickError> {
        self.report(device_id)
    }

    fn registered_devices(&self) -> Vec<String> {
        self.state().blinds.keys().map(u32::to_string).collect()
    }
}

impl Drop for SimulatedStick {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

fn lock(state: &Mutex<SimulatedState>) -> MutexGuard<'_, SimulatedState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn position_update(device_id: u32, blind: SimulatedBlind) -> BlindPosition {
    BlindPosition {
        snr: Some(device_id),
        position: f64::from(blind.position),
        angle: f64::from(blind.angle),
    }
}

fn tick_events(state: &SimulatedState, day_fraction: f64) -> Vec<StickEvent> {
    let stations = state
        .catalog
        .iter()
        .filter(|device| device.device_type == DeviceType::WeatherStation)
        .map(|device| {
            StickEvent::WeatherBroadcast(Some(WeatherReading {
                snr: device.snr,
                lumen: simulated_lumen(day_fraction).round(),
                temp: simulated_temperature(day_fraction),
            }))
        });

    state
        .blinds
        .iter()
        .filter(|(device_id, _)| !is_station(state, **device_id))
        .map(|(device_id, blind)| {
            StickEvent::BlindPositionUpdate(position_update(*device_id, *blind))
        })
        .chain(stations)
        .collect()
}

fn is_station(state: &SimulatedState, device_id: u32) -> bool {
    state
        .catalog
        .iter()
        .any(|device| device.snr == device_id && device.device_type == DeviceType::WeatherStation)
}

fn day_fraction() -> f64 {
    let now = OffsetDateTime::now_utc();
    let seconds = u32::from(now.hour()) * 3600 + u32::from(now.minute()) * 60 + u32::from(now.second());

    f64::from(seconds) / 86400.0
}

/// Illuminance over a day: smooth sunrise and sunset, faint moonlight at night.
pub fn simulated_lumen(day_fraction: f64) -> f64 {
    const MAX_SUNLIGHT: f64 = 50_000.0;
    const MAX_MOONLIGHT: f64 = 5.0;

    const SUNRISE_START: f64 = 0.23;
    const SUNRISE_END: f64 = 0.25;
    const SUNSET_START: f64 = 0.73;
    const SUNSET_END: f64 = 0.75;

    if (SUNRISE_START..=SUNSET_END).contains(&day_fraction) {
        if day_fraction <= SUNRISE_END {
            let progress = (day_fraction - SUNRISE_START) / (SUNRISE_END - SUNRISE_START);
            (progress * PI / 2.0).sin() * MAX_SUNLIGHT
        } else if day_fraction >= SUNSET_START {
            let progress = (day_fraction - SUNSET_START) / (SUNSET_END - SUNSET_START);
            (progress * PI / 2.0).cos() * MAX_SUNLIGHT
        } else {
            MAX_SUNLIGHT
        }
    } else {
        let radians = day_fraction * 2.0 * PI;
        (radians + PI).cos().max(0.0) * (MAX_MOONLIGHT - 0.01) + 0.01
    }
}

/// Temperature in °C, 10 at night up to 30 in the early afternoon.
pub fn simulated_temperature(day_fraction: f64) -> f64 {
    let radians = (day_fraction - 0.25) * 2.0 * PI;

    (radians.sin().max(0.0) * 20.0 + 10.0).round()
}
