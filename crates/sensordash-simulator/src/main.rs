//! Headless desktop simulator for the sensordash wearable display.
//!
//! Fakes the device's sensor hub, generates synthetic readings on a producer
//! thread and feeds them through the core's event queue, exactly as a
//! platform delivering notifications from its own thread would. The list page
//! is rendered into a `SimulatorDisplay` and can be saved as a PNG.
//!
//! # Environment
//!
//! Values are read from the process environment, or from a `.env` file.
//!
//! | Variable            | Meaning                                              |
//! |---------------------|------------------------------------------------------|
//! | `SENSORDASH_ABSENT` | Comma-separated kinds missing from the fake device   |
//! | `SENSORDASH_DENY`   | Comma-separated permissions to deny                  |
//! | `SENSORDASH_TICKS`  | Number of synthetic sample ticks (default 40)        |
//! | `SENSORDASH_PNG`    | Path for the final rendered frame                    |

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay};
use log::{debug, error, info, warn};

use sensordash_core::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX, FrameBuffer, SensorListPage};
use sensordash_core::{
    Accuracy, ChannelId, DashConfig, DeliveryRate, EventQueue, Permission, Permissions,
    SENSOR_KIND_COUNT, SensorDashboard, SensorEvent, SensorHub, SensorKind,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Pixel scale factor for the saved image.
const WINDOW_SCALE: u32 = 2;

/// Target frame duration (~30 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(33);

const DEFAULT_TICKS: u32 = 40;

/// Channel numbers handed out by the fake hub, matching common platform
/// sensor type ids.
const CHANNEL_IDS: [u32; SENSOR_KIND_COUNT] = [1, 4, 2, 6, 5, 19, 21];

/// Events between producer and dashboard.
static EVENT_QUEUE: EventQueue = EventQueue::new();

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

struct SimConfig {
    absent: Vec<SensorKind>,
    denied: Vec<Permission>,
    ticks: u32,
    png: Option<PathBuf>,
}

impl SimConfig {
    fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv()
            && !e.not_found()
        {
            warn!("Failed to load .env: {}", e);
        }

        let ticks = match std::env::var("SENSORDASH_TICKS") {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("Invalid SENSORDASH_TICKS {:?}, using {}", raw, DEFAULT_TICKS);
                DEFAULT_TICKS
            }),
            Err(_) => DEFAULT_TICKS,
        };

        Self {
            absent: parse_list("SENSORDASH_ABSENT"),
            denied: parse_list("SENSORDASH_DENY"),
            ticks,
            png: std::env::var_os("SENSORDASH_PNG").map(PathBuf::from),
        }
    }

    fn dash_config(&self) -> DashConfig {
        let mut permissions = Permissions::all_granted();
        for permission in &self.denied {
            permissions.set(*permission, false);
        }
        DashConfig {
            rate: DeliveryRate::Ui,
            permissions,
        }
    }
}

/// Parse a comma-separated variable, skipping entries that do not parse.
fn parse_list<T: FromStr>(var: &str) -> Vec<T> {
    let Ok(raw) = std::env::var(var) else {
        return Vec::new();
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring unknown entry {:?} in {}", s, var);
                None
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Fake sensor hub
// ---------------------------------------------------------------------------

/// Sensor hub backed by a fixed set of present kinds.
///
/// The subscription mask is shared with the producer thread so it only
/// generates notifications for channels that are currently subscribed.
struct SimHub {
    present: [bool; SENSOR_KIND_COUNT],
    subscribed: Arc<AtomicU32>,
}

impl SimHub {
    fn new(absent: &[SensorKind]) -> Self {
        let mut present = [true; SENSOR_KIND_COUNT];
        for kind in absent {
            present[kind.index()] = false;
        }
        Self {
            present,
            subscribed: Arc::new(AtomicU32::new(0)),
        }
    }

    fn kind_of(channel: ChannelId) -> Option<SensorKind> {
        CHANNEL_IDS
            .iter()
            .position(|&id| id == channel.0)
            .map(|i| SensorKind::ALL[i])
    }
}

impl SensorHub for SimHub {
    type Error = String;

    fn acquire(&mut self, kind: SensorKind) -> Option<ChannelId> {
        self.present[kind.index()].then_some(ChannelId(CHANNEL_IDS[kind.index()]))
    }

    fn subscribe(&mut self, channel: ChannelId, rate: DeliveryRate) -> Result<(), Self::Error> {
        let kind = Self::kind_of(channel).ok_or_else(|| format!("unknown channel {}", channel.0))?;
        debug!("Subscribed {} at {:?}", kind, rate);
        self.subscribed.fetch_or(1 << kind.index(), Ordering::SeqCst);
        Ok(())
    }

    fn unsubscribe(&mut self, channel: ChannelId) {
        if let Some(kind) = Self::kind_of(channel) {
            self.subscribed.fetch_and(!(1 << kind.index()), Ordering::SeqCst);
        }
    }
}

// ---------------------------------------------------------------------------
// Mock data generation
// ---------------------------------------------------------------------------

/// Generates synthetic readings that vary over time.
struct MockSensorGenerator {
    /// Seconds since the simulation started.
    elapsed_secs: f64,
    steps: f32,
    had_contact: bool,
}

impl MockSensorGenerator {
    fn new() -> Self {
        Self {
            elapsed_secs: 0.0,
            steps: 1_200.0,
            had_contact: true,
        }
    }

    /// Advance the clock and emit one notification per subscribed kind.
    fn next_events(&mut self, dt_secs: f64, subscribed: u32) -> Vec<SensorEvent> {
        self.elapsed_secs += dt_secs;
        let t = self.elapsed_secs;

        // Wrist swinging slowly under gravity
        let accel = [
            (0.8 * (t * 1.3).sin()) as f32,
            (0.5 * (t * 0.9).cos()) as f32,
            (9.81 + 0.2 * (t * 2.1).sin()) as f32,
        ];
        let gyro = [
            (0.15 * (t * 1.7).cos()) as f32,
            (-0.08 * (t * 0.6).sin()) as f32,
            (0.02 * (t * 3.0).sin()) as f32,
        ];
        let mag = [
            (22.0 + 3.0 * (t / 7.0).sin()) as f32,
            (-5.5 + 1.5 * (t / 5.0).cos()) as f32,
            (41.2 + 0.7 * (t / 3.0).sin()) as f32,
        ];

        // Pressure drifts around sea level, light pulses like passing shade
        let pressure = (1013.25 + 2.0 * (t / 60.0).sin()) as f32;
        let lux = (250.0 + 200.0 * (t / 4.0).sin().max(0.0)) as f32;

        // Roughly one step every other sample
        self.steps += if (t * 10.0) as u64 % 2 == 0 { 1.0 } else { 0.0 };

        // Contact drops for one second out of every four
        let contact = t % 4.0 < 3.0;
        let bpm = if contact {
            (68.0 + 6.0 * (t / 15.0).sin()) as f32
        } else {
            f32::NAN
        };

        let mut events = Vec::new();
        let mut push = |kind: SensorKind, values: &[f32]| {
            if subscribed & (1 << kind.index()) != 0 {
                events.push(SensorEvent::reading(
                    ChannelId(CHANNEL_IDS[kind.index()]),
                    values,
                ));
            }
        };
        push(SensorKind::Accelerometer, &accel);
        push(SensorKind::Gyroscope, &gyro);
        push(SensorKind::Magnetometer, &mag);
        push(SensorKind::Barometer, &[pressure]);
        push(SensorKind::AmbientLight, &[lux]);
        push(SensorKind::StepCounter, &[self.steps]);
        push(SensorKind::HeartRate, &[bpm]);

        let heart_rate = SensorKind::HeartRate.index();
        if contact != self.had_contact && subscribed & (1 << heart_rate) != 0 {
            let accuracy = if contact {
                Accuracy::High
            } else {
                Accuracy::NoContact
            };
            events.push(SensorEvent::accuracy(
                ChannelId(CHANNEL_IDS[heart_rate]),
                accuracy,
            ));
        }
        self.had_contact = contact;

        events
    }
}

/// Run the producer until `ticks` samples have been generated.
fn spawn_producer(
    ticks: u32,
    period: Duration,
    subscribed: Arc<AtomicU32>,
    progress: Arc<AtomicU32>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut sensor_gen = MockSensorGenerator::new();
        for tick in 1..=ticks {
            let mask = subscribed.load(Ordering::SeqCst);
            for event in sensor_gen.next_events(period.as_secs_f64(), mask) {
                if EVENT_QUEUE.try_send(event).is_err() {
                    warn!("Event queue full, dropping notification");
                }
            }
            progress.store(tick, Ordering::SeqCst);
            thread::sleep(period);
        }
    })
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    let config = SimConfig::from_env();

    info!("Starting sensordash simulator");
    info!(
        "Display: {}×{}, {} ticks, absent: {:?}, denied: {:?}",
        DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX, config.ticks, config.absent, config.denied
    );

    let screen = Size::new(DISPLAY_WIDTH_PX as u32, DISPLAY_HEIGHT_PX as u32);
    let mut display = SimulatorDisplay::<Rgb565>::new(screen);
    let mut framebuffer = FrameBuffer::new(screen);
    let mut page = SensorListPage::new(Rectangle::new(Point::zero(), screen));

    let hub = SimHub::new(&config.absent);
    let subscribed = Arc::clone(&hub.subscribed);
    let mut dashboard = SensorDashboard::new(hub, config.dash_config());

    let report = dashboard.resume();
    for (_, outcome) in report.iter() {
        if let Err(e) = outcome {
            info!("{} stays at placeholder: {}", e.kind(), e);
        }
    }

    let period = Duration::from_micros(dashboard.binding().rate().period_micros() as u64);
    let progress = Arc::new(AtomicU32::new(0));
    let producer = spawn_producer(config.ticks, period, subscribed, Arc::clone(&progress));

    // Pause and resume once halfway through, as when the wrist drops and the
    // screen turns off for a moment.
    let mut cycled = false;

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    loop {
        let frame_start = Instant::now();

        // --- Lifecycle ----------------------------------------------------
        if !cycled && progress.load(Ordering::SeqCst) >= config.ticks / 2 {
            dashboard.pause_discarding(&EVENT_QUEUE);
            thread::sleep(period * 3);
            dashboard.resume();
            cycled = true;
        }

        // --- Notifications ------------------------------------------------
        let updated = dashboard.drain(&EVENT_QUEUE);
        if updated > 0 {
            debug!("{} rows updated", updated);
        }

        // --- Render -------------------------------------------------------
        if page.sync(dashboard.store()) {
            if let Err(e) = page.draw(dashboard.store(), &mut framebuffer) {
                error!("Draw error: {:?}", e);
            }
            page.mark_clean();
            if let Err(e) = framebuffer.flush(&mut display) {
                error!("Flush error: {:?}", e);
            }
        }

        if producer.is_finished() && EVENT_QUEUE.is_empty() {
            break;
        }

        // --- Frame pacing -------------------------------------------------
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    dashboard.pause();
    if producer.join().is_err() {
        error!("Producer thread panicked");
    }

    for row in dashboard.store() {
        info!("{:>14}: {}", row.name, row.value);
    }

    if let Some(path) = &config.png {
        let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
        match display.to_rgb_output_image(&output_settings).save_png(path) {
            Ok(()) => info!("Saved frame to {}", path.display()),
            Err(e) => error!("Failed to save {}: {}", path.display(), e),
        }
    }

    info!("Simulator exiting");
}
