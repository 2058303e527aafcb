//! Bounded-travel actuators (windows, curtains).
//!
//! A continuous-rotation servo opens or closes the device by running
//! towards one extreme for a fixed time, then parking at neutral.  The
//! motion is a step machine advanced by [`TravelBank::tick`]; no call ever
//! waits on it.
//!
//! ```text
//!  Idle ──request──▶ MovingToNeutral ──settle──▶ HoldingNeutral ──hold──▶
//!       MovingToTarget ──travel──▶ HoldingTarget ──target_hold──▶
//!       ReturningToNeutral ──return──▶ Idle  (status recorded, reply sent)
//! ```
//!
//! The recorded `current_status` makes requests idempotent: asking for the
//! state the device is already in succeeds without moving anything.
//! Requests arriving mid-motion wait in a short per-device queue and are
//! evaluated against the status recorded when the motion finishes.

use embassy_time::{Duration, Instant};
use heapless::{Deque, Vec};
use log::{debug, info, warn};

use crate::app::ports::OutputPort;
use crate::config::TravelProfile;
use crate::error::CommandError;
use crate::registry::{Capability, CapabilityKind, DeviceIndex, MAX_DEVICES, Registry};

/// Commands held per actuator while a motion is running.
pub const QUEUE_DEPTH: usize = 4;

/// A travel request plus what is needed to answer it later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelCommand {
    /// `true` = open (drive to the open extreme).
    pub open: bool,
    /// Echoed back as the reply `state`.
    pub action: String,
    pub correlation_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionStep {
    Idle,
    MovingToNeutral,
    HoldingNeutral,
    MovingToTarget,
    HoldingTarget,
    ReturningToNeutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelOutcome {
    /// Already in the requested state; nothing moved.
    AlreadyThere,
    /// Motion started; the reply follows on completion.
    Started,
    /// Queued behind a running motion.
    Queued,
}

/// A finished request, ready to be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionCompletion {
    pub device: DeviceIndex,
    pub status: bool,
    pub command: TravelCommand,
}

#[derive(Debug)]
pub struct TravelActuator {
    device: DeviceIndex,
    pin: Option<u8>,
    current_status: bool,
    step: MotionStep,
    step_deadline: Instant,
    in_flight: Option<TravelCommand>,
    queue: Deque<TravelCommand, QUEUE_DEPTH>,
}

fn ms(v: u32) -> Duration {
    Duration::from_millis(u64::from(v))
}

impl TravelActuator {
    pub fn new(device: DeviceIndex, pin: Option<u8>) -> Self {
        Self {
            device,
            pin,
            current_status: false,
            step: MotionStep::Idle,
            step_deadline: Instant::from_ticks(0),
            in_flight: None,
            queue: Deque::new(),
        }
    }

    pub fn current_status(&self) -> bool {
        self.current_status
    }

    pub fn step(&self) -> MotionStep {
        self.step
    }

    pub fn is_moving(&self) -> bool {
        self.step != MotionStep::Idle
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    fn write(&self, hw: &mut impl OutputPort, degrees: u8) {
        match self.pin {
            Some(pin) => hw.write_angle(pin, degrees),
            None => debug!("Travel: virtual device {} → {}°", self.device.get(), degrees),
        }
    }

    pub fn request(
        &mut self,
        cmd: TravelCommand,
        now: Instant,
        profile: &TravelProfile,
        hw: &mut impl OutputPort,
    ) -> Result<TravelOutcome, CommandError> {
        if self.is_moving() {
            return match self.queue.push_back(cmd) {
                Ok(()) => Ok(TravelOutcome::Queued),
                Err(_) => Err(CommandError::DeviceBusy),
            };
        }
        if cmd.open == self.current_status {
            return Ok(TravelOutcome::AlreadyThere);
        }
        self.start(cmd, now, profile, hw);
        Ok(TravelOutcome::Started)
    }

    fn start(
        &mut self,
        cmd: TravelCommand,
        now: Instant,
        profile: &TravelProfile,
        hw: &mut impl OutputPort,
    ) {
        info!(
            "Travel: device {} → {}",
            self.device.get(),
            if cmd.open { "open" } else { "close" }
        );
        self.in_flight = Some(cmd);
        self.write(hw, profile.neutral_deg);
        self.step = MotionStep::MovingToNeutral;
        self.step_deadline = now + ms(profile.settle_ms);
    }

    /// Advance at most one step; report finished requests through `done`.
    pub fn tick(
        &mut self,
        now: Instant,
        profile: &TravelProfile,
        hw: &mut impl OutputPort,
        done: &mut impl FnMut(MotionCompletion),
    ) {
        if self.step == MotionStep::Idle || now < self.step_deadline {
            return;
        }

        let target_open = self.in_flight.as_ref().is_some_and(|c| c.open);
        match self.step {
            MotionStep::Idle => {}
            MotionStep::MovingToNeutral => {
                self.step = MotionStep::HoldingNeutral;
                self.step_deadline = now + ms(profile.hold_ms);
            }
            MotionStep::HoldingNeutral => {
                let extreme = if target_open {
                    profile.open_deg
                } else {
                    profile.close_deg
                };
                self.write(hw, extreme);
                self.step = MotionStep::MovingToTarget;
                self.step_deadline = now + ms(profile.travel_ms);
            }
            MotionStep::MovingToTarget => {
                self.step = MotionStep::HoldingTarget;
                self.step_deadline = now + ms(profile.target_hold_ms);
            }
            MotionStep::HoldingTarget => {
                self.write(hw, profile.neutral_deg);
                self.step = MotionStep::ReturningToNeutral;
                self.step_deadline = now + ms(profile.return_ms);
            }
            MotionStep::ReturningToNeutral => {
                self.step = MotionStep::Idle;
                self.current_status = target_open;
                if let Some(command) = self.in_flight.take() {
                    info!(
                        "Travel: device {} now {}",
                        self.device.get(),
                        if target_open { "open" } else { "closed" }
                    );
                    done(MotionCompletion {
                        device: self.device,
                        status: self.current_status,
                        command,
                    });
                }
                self.run_queue(now, profile, hw, done);
            }
        }
    }

    /// Answer queued no-ops until one needs motion, then start it.
    fn run_queue(
        &mut self,
        now: Instant,
        profile: &TravelProfile,
        hw: &mut impl OutputPort,
        done: &mut impl FnMut(MotionCompletion),
    ) {
        while let Some(cmd) = self.queue.pop_front() {
            if cmd.open == self.current_status {
                done(MotionCompletion {
                    device: self.device,
                    status: self.current_status,
                    command: cmd,
                });
            } else {
                self.start(cmd, now, profile, hw);
                return;
            }
        }
    }
}

/// Travel state arena indexed by [`DeviceIndex`].
#[derive(Debug)]
pub struct TravelBank {
    slots: Vec<Option<TravelActuator>, MAX_DEVICES>,
}

impl TravelBank {
    pub fn new(registry: &Registry) -> Self {
        let mut slots = Vec::new();
        for (idx, dev) in registry.devices() {
            let slot = (dev.capability.kind() == CapabilityKind::Travel)
                .then(|| TravelActuator::new(idx, dev.binding.pin()));
            let pushed = slots.push(slot).is_ok();
            debug_assert!(pushed, "registry devices exceed MAX_DEVICES");
        }
        Self { slots }
    }

    /// Attach every pin-bound servo and park it at neutral.
    pub fn park_all(&self, hw: &mut impl OutputPort, profile: &TravelProfile) {
        for act in self.slots.iter().flatten() {
            if let Some(pin) = act.pin {
                hw.configure_servo(pin);
                hw.write_angle(pin, profile.neutral_deg);
            }
        }
    }

    pub fn actuator(&self, idx: DeviceIndex) -> Option<&TravelActuator> {
        self.slots.get(idx.get()).and_then(Option::as_ref)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn request(
        &mut self,
        registry: &Registry,
        hw: &mut impl OutputPort,
        room: &str,
        capability: Capability,
        cmd: TravelCommand,
        now: Instant,
        profile: &TravelProfile,
    ) -> Result<TravelOutcome, CommandError> {
        let Some(idx) = registry.find(room, capability) else {
            warn!("Travel: '{}' not found in room '{}'", capability.id(), room);
            return Err(CommandError::DeviceNotFound);
        };
        let act = self
            .slots
            .get_mut(idx.get())
            .and_then(Option::as_mut)
            .ok_or(CommandError::DeviceNotFound)?;
        let outcome = act.request(cmd, now, profile, hw);
        if outcome == Err(CommandError::DeviceBusy) {
            warn!("Travel: '{}/{}' busy, queue full", room, capability.id());
        }
        outcome
    }

    pub fn tick(
        &mut self,
        now: Instant,
        profile: &TravelProfile,
        hw: &mut impl OutputPort,
        done: &mut impl FnMut(MotionCompletion),
    ) {
        for act in self.slots.iter_mut().flatten() {
            act.tick(now, profile, hw, done);
        }
    }

    pub fn any_moving(&self) -> bool {
        self.slots.iter().flatten().any(TravelActuator::is_moving)
    }
}
