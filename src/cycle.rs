//! One wake of the station, from sensor acquisition to the deep sleep request.

use embassy_time::Duration;

use crate::config::Config;
use crate::log_buffer::LogBuffer;
use crate::readings::{self, Derived, Readings};
use crate::report::{self, CycleReport, Network};
use crate::sensors::{AnalogSource, Sensor, Sensors};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Init,
    Acquire,
    Derive,
    Report,
    Sleep,
}

/// Board level operations needed to wind down before deep sleep.
pub trait PowerControl {
    /// Time since the chip came out of reset
    fn elapsed(&self) -> Duration;

    /// Disconnect and hold every GPIO used by the peripherals.
    fn isolate_pins(&mut self);

    async fn radio_off(&mut self, log: &mut LogBuffer);
}

/// Remaining part of the period, zero when the cycle overran it.
pub fn sleep_duration(period: Duration, elapsed: Duration) -> Duration {
    period.checked_sub(elapsed).unwrap_or(Duration::from_ticks(0))
}

#[derive(Debug, Clone, PartialEq)]
pub struct SleepPlan {
    pub duration: Duration,
    pub report: CycleReport,
    pub readings: Readings,
    pub derived: Derived,
}

pub struct DutyCycle<'a> {
    config: &'a Config,
    log: LogBuffer,
    phase: Phase,
}

impl<'a> DutyCycle<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            log: LogBuffer::new(),
            phase: Phase::Init,
        }
    }

    /// Buffer for lines logged while the board is brought up.
    pub fn log(&mut self) -> &mut LogBuffer {
        &mut self.log
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub async fn run<P, C, L, A, N, B>(
        &mut self,
        sensors: &mut Sensors<P, C, L, A>,
        network: &mut N,
        board: &mut B,
    ) -> SleepPlan
    where
        P: Sensor,
        C: Sensor,
        L: Sensor,
        A: AnalogSource,
        N: Network,
        B: PowerControl,
    {
        self.phase = Phase::Acquire;
        let readings = sensors.measure(&mut self.log).await;

        self.phase = Phase::Derive;
        let derived = Derived::compute(&readings, &mut self.log);
        readings::log_summary(&readings, &derived, &mut self.log);

        self.phase = Phase::Report;
        let report =
            report::report_all(network, self.config, &readings, &derived, &mut self.log).await;

        self.phase = Phase::Sleep;
        board.isolate_pins();
        board.radio_off(&mut self.log).await;

        let period = Duration::from_secs(self.config.cycle_time_seconds as u64);
        let duration = sleep_duration(period, board.elapsed());
        self.log.info(format_args!(
            "Entering deep sleep for {} seconds...",
            duration.as_secs()
        ));

        SleepPlan {
            duration,
            report,
            readings,
            derived,
        }
    }
}
