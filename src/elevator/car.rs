use crate::clock::{TimerId, TimerService};
use crate::config::ElevatorConfig;
use crate::dispatcher::Task;
use crate::shared::{CallKey, CarState, Phase};
use std::time::Duration;

/**
 * One elevator car and its door cycle.
 *
 * A car walks through `Idle -> Moving -> DoorsOpen -> DoorsClosing -> Idle`. Every phase except
 * `Idle` is ended by a timer the car owns exclusively, so the car holds a timer handle exactly
 * when it is not idle. Arming a new timer always cancels the previous one first.
 *
 * The car never talks to the view directly. Each operation returns the `Transition` it made
 * and the dispatcher turns that into view events and call-table updates.
 *
 * # Fields
 * - `id`:          Stable index of the car in the bank.
 * - `floor`:       Last floor the car stood at. Updated on arrival.
 * - `phase`:       Current phase of the door cycle.
 * - `target`:      Floor the car is travelling to or serving.
 * - `serving`:     The call this cycle was started for. Handed back when the doors have closed.
 * - `timer`:       Handle of the timer that ends the current phase.
 */
#[derive(Debug)]
pub struct Car {
    id: usize,
    floor: u8,
    phase: Phase,
    target: Option<u8>,
    serving: Option<CallKey>,
    timer: Option<TimerId>,
}

/// What a car did in response to an assignment, a timer or a reopen.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Departed { from: u8, to: u8, duration: Duration },
    Arrived { floor: u8 },
    ClosingStarted { floor: u8 },
    Closed { floor: u8, served: Option<CallKey> },
    Reopened { floor: u8 },
}

impl Car {
    pub fn new(id: usize) -> Car {
        Car {
            id,
            floor: 0,
            phase: Phase::Idle,
            target: None,
            serving: None,
            timer: None,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn floor(&self) -> u8 {
        self.floor
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn target(&self) -> Option<u8> {
        self.target
    }

    pub fn serving(&self) -> Option<CallKey> {
        self.serving
    }

    pub fn timer(&self) -> Option<TimerId> {
        self.timer
    }

    pub fn is_available(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn is_closing_at(&self, floor: u8) -> bool {
        self.phase == Phase::DoorsClosing && self.floor == floor
    }

    pub fn distance_to(&self, floor: u8) -> u8 {
        self.floor.abs_diff(floor)
    }

    pub fn state(&self) -> CarState {
        CarState {
            id: self.id,
            floor: self.floor,
            phase: self.phase,
            target: self.target,
        }
    }

    /// Starts a trip to `call.floor`. A car already standing there opens its doors at once.
    ///
    /// Returns `None` when the car is not idle.
    pub fn assign(
        &mut self,
        call: CallKey,
        timers: &mut TimerService<Task>,
        config: &ElevatorConfig,
    ) -> Option<Transition> {
        if !self.is_available() {
            return None;
        }

        self.serving = Some(call);
        self.target = Some(call.floor);

        let distance = self.distance_to(call.floor);
        if distance == 0 {
            self.phase = Phase::DoorsOpen;
            self.arm(timers, config.door_open_time());
            return Some(Transition::Arrived { floor: self.floor });
        }

        let duration = config.travel_time_per_floor() * u32::from(distance);
        self.phase = Phase::Moving;
        self.arm(timers, duration);
        Some(Transition::Departed {
            from: self.floor,
            to: call.floor,
            duration,
        })
    }

    /// Advances the door cycle when the car's own timer fires.
    ///
    /// Returns `None` for a timer that is not the car's live one.
    pub fn handle_timer(
        &mut self,
        fired: TimerId,
        timers: &mut TimerService<Task>,
        config: &ElevatorConfig,
    ) -> Option<Transition> {
        if self.timer != Some(fired) {
            return None;
        }
        self.timer = None;

        match self.phase {
            Phase::Moving => {
                self.floor = self.target.unwrap_or(self.floor);
                self.phase = Phase::DoorsOpen;
                self.arm(timers, config.door_open_time());
                Some(Transition::Arrived { floor: self.floor })
            }
            Phase::DoorsOpen => {
                self.phase = Phase::DoorsClosing;
                self.arm(timers, config.door_close_time());
                Some(Transition::ClosingStarted { floor: self.floor })
            }
            Phase::DoorsClosing => {
                self.phase = Phase::Idle;
                self.target = None;
                Some(Transition::Closed {
                    floor: self.floor,
                    served: self.serving.take(),
                })
            }
            Phase::Idle => None,
        }
    }

    /// Interrupts a closing door and restarts the dwell. Only valid while `DoorsClosing`.
    pub fn reopen(
        &mut self,
        timers: &mut TimerService<Task>,
        config: &ElevatorConfig,
    ) -> Option<Transition> {
        if self.phase != Phase::DoorsClosing {
            return None;
        }

        self.phase = Phase::DoorsOpen;
        self.arm(timers, config.door_open_time());
        Some(Transition::Reopened { floor: self.floor })
    }

    fn arm(&mut self, timers: &mut TimerService<Task>, delay: Duration) {
        if let Some(previous) = self.timer.take() {
            timers.cancel(previous);
        }
        self.timer = Some(timers.schedule(delay, Task::Car(self.id)));
    }
}
