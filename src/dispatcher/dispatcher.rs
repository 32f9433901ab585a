/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, info, warn};
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::clock::{TimerId, TimerService};
use crate::config::{Config, ElevatorConfig};
use crate::dispatcher::{PendingCalls, RequestQueue};
use crate::elevator::{Car, Transition};
use crate::shared::{
    AcceptanceResult, CallKey, CarState, Direction, ElevatorError, ElevatorEvent, ElevatorResult,
    ServiceRequest, ViewUpdate,
};

/***************************************/
/*               Enums                 */
/***************************************/
/// Work scheduled on the simulation timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    QueueCycle,
    Car(usize),
}

/***************************************/
/*             Public API              */
/***************************************/
/**
 * Assigns floor calls to cars and drives every car through its door cycle.
 *
 * The dispatcher owns the whole simulation state. All mutation goes through its methods and
 * runs on one timeline: calls are submitted between timer firings, and timers fire one at a
 * time in deadline order when the clock is advanced.
 *
 * Requests are drained by a queue cycle that runs every `queue_poll_interval` while the queue
 * is non-empty. Each cycle takes the head request and hands it to the nearest idle car, lowest
 * index on ties. If no car is idle the request goes back to the tail.
 *
 * # Fields
 * - `config`:              Building layout and car timings.
 * - `queue_poll_interval`: Time between two queue cycles.
 * - `cars`:                The car bank, indexed by car id.
 * - `queue`:               Accepted calls waiting for a car.
 * - `pending`:             Outstanding-call flags used for de-duplication.
 * - `timers`:              Simulation clock with the queue cycle and all car timers.
 * - `queue_cycle`:         Handle of the armed queue cycle, `None` while the cadence is stopped.
 * - `view_tx`:             Sends time-stamped events to the view.
 */
pub struct Dispatcher {
    config: ElevatorConfig,
    queue_poll_interval: Duration,
    cars: Vec<Car>,
    queue: RequestQueue,
    pending: PendingCalls,
    timers: TimerService<Task>,
    queue_cycle: Option<TimerId>,
    view_tx: cbc::Sender<ViewUpdate>,
}

impl Dispatcher {
    pub fn new(config: &Config, view_tx: cbc::Sender<ViewUpdate>) -> ElevatorResult<Dispatcher> {
        config.validate()?;

        let cars = (0..config.elevator.n_cars as usize).map(Car::new).collect();
        info!(
            "Dispatcher started with {} cars over {} floors",
            config.elevator.n_cars, config.elevator.n_floors
        );

        Ok(Dispatcher {
            config: config.elevator.clone(),
            queue_poll_interval: config.dispatcher.queue_poll_interval(),
            cars,
            queue: RequestQueue::new(),
            pending: PendingCalls::new(config.elevator.n_floors),
            timers: TimerService::new(),
            queue_cycle: None,
            view_tx,
        })
    }

    /// Registers a floor call.
    ///
    /// A car closing its doors at `floor` reopens them instead of a new trip being queued. A call
    /// whose key is already outstanding is dropped. Anything else is queued for assignment.
    pub fn submit_call(
        &mut self,
        floor: u8,
        direction: Option<Direction>,
    ) -> ElevatorResult<AcceptanceResult> {
        self.check_call(floor, direction)?;
        let key = CallKey::new(floor, direction);

        // Reopen takes precedence over de-duplication
        let reopened = self
            .cars
            .iter_mut()
            .find(|car| car.is_closing_at(floor))
            .and_then(|car| {
                car.reopen(&mut self.timers, &self.config)
                    .map(|transition| (car.id(), transition))
            });
        if let Some((car_id, transition)) = reopened {
            info!("Call for {} reopened doors of car {}", key, car_id);
            self.apply(car_id, transition);
            return Ok(AcceptanceResult::Reopened);
        }

        if !self.pending.mark(key) {
            debug!("Call for {} is already pending", key);
            return Ok(AcceptanceResult::Deduplicated);
        }

        let request = self.queue.push(key);
        info!("Accepted call for {} (#{})", key, request.arrival_order);
        self.start_queue_cycle();
        Ok(AcceptanceResult::Accepted)
    }

    /// Fires every timer due at or before `time`, then moves the clock to `time`.
    pub fn advance_to(&mut self, time: Duration) {
        while let Some((id, task)) = self.timers.pop_due(time) {
            self.handle_task(id, task);
        }
        self.timers.advance_to(time);
    }

    pub fn advance_by(&mut self, duration: Duration) {
        self.advance_to(self.now() + duration);
    }

    /// Runs the simulation until no timer is left and returns the time it stopped at.
    pub fn run_until_idle(&mut self) -> Duration {
        while let Some(deadline) = self.timers.next_deadline() {
            self.advance_to(deadline);
        }
        self.now()
    }

    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn car(&self, id: usize) -> Option<&Car> {
        self.cars.get(id)
    }

    pub fn snapshot(&self) -> Vec<CarState> {
        self.cars.iter().map(Car::state).collect()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn queued(&self) -> impl Iterator<Item = &ServiceRequest> {
        self.queue.iter()
    }

    pub fn queued_for(&self, floor: u8, direction: Option<Direction>) -> usize {
        self.queue.count(CallKey::new(floor, direction))
    }

    pub fn is_outstanding(&self, floor: u8, direction: Option<Direction>) -> bool {
        self.pending.is_outstanding(CallKey::new(floor, direction))
    }

    pub fn outstanding_count(&self) -> usize {
        self.pending.count()
    }

    // Timers currently armed, queue cycle included
    pub(crate) fn armed_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn is_queue_cycle_running(&self) -> bool {
        self.queue_cycle.is_some()
    }

    /// True when nothing is queued, every car is idle and no timer is armed.
    pub fn is_quiescent(&self) -> bool {
        self.queue.is_empty() && self.timers.is_empty() && self.cars.iter().all(Car::is_available)
    }

    fn check_call(&self, floor: u8, direction: Option<Direction>) -> ElevatorResult<()> {
        let n_floors = self.config.n_floors;
        if floor >= n_floors {
            return Err(ElevatorError::InvalidFloorRequest { floor, n_floors });
        }

        match direction {
            Some(Direction::Up) if floor == n_floors - 1 => Err(ElevatorError::UnavailableDirection {
                floor,
                direction: Direction::Up,
            }),
            Some(Direction::Down) if floor == 0 => Err(ElevatorError::UnavailableDirection {
                floor,
                direction: Direction::Down,
            }),
            _ => Ok(()),
        }
    }

    fn handle_task(&mut self, id: TimerId, task: Task) {
        match task {
            Task::QueueCycle => {
                if self.queue_cycle != Some(id) {
                    warn!("Ignoring stale queue cycle timer {:?}", id);
                    return;
                }
                self.queue_cycle = None;
                self.process_queue();

                if self.queue.is_empty() {
                    debug!("Request queue drained, stopping queue cycle");
                } else {
                    self.start_queue_cycle();
                }
            }

            Task::Car(car_id) => {
                let transition = match self.cars.get_mut(car_id) {
                    Some(car) => car.handle_timer(id, &mut self.timers, &self.config),
                    None => None,
                };
                match transition {
                    Some(transition) => self.apply(car_id, transition),
                    None => warn!("Ignoring stale timer {:?} for car {}", id, car_id),
                }
            }
        }
    }

    // One queue cycle: at most one request is dequeued and at most one assignment attempted
    fn process_queue(&mut self) {
        let request = match self.queue.pop() {
            Some(request) => request,
            None => return,
        };

        let transition = match self.nearest_idle_car(request.floor()) {
            Some(car_id) => self.cars[car_id]
                .assign(request.key, &mut self.timers, &self.config)
                .map(|transition| (car_id, transition)),
            None => None,
        };

        match transition {
            Some((car_id, transition)) => {
                info!("Assigned {} to car {}", request.key, car_id);
                self.apply(car_id, transition);
            }
            None => {
                debug!("No idle car for {}, moving it to the back of the queue", request.key);
                self.queue.requeue(request);
            }
        }
    }

    fn nearest_idle_car(&self, floor: u8) -> Option<usize> {
        self.cars
            .iter()
            .filter(|car| car.is_available())
            .min_by_key(|car| (car.distance_to(floor), car.id()))
            .map(Car::id)
    }

    fn start_queue_cycle(&mut self) {
        if self.queue_cycle.is_none() {
            debug!("Starting queue cycle");
            self.queue_cycle = Some(self.timers.schedule(self.queue_poll_interval, Task::QueueCycle));
        }
    }

    // Turns a car transition into view events and releases the call once the doors are shut
    fn apply(&mut self, car: usize, transition: Transition) {
        match transition {
            Transition::Departed { from, to, duration } => {
                info!("Car {} moving from floor {} to floor {}", car, from, to);
                self.emit(ElevatorEvent::CarMoved { car, from, to, duration });
            }
            Transition::Arrived { floor } => {
                info!("Car {} opened doors at floor {}", car, floor);
                self.emit(ElevatorEvent::DoorsOpened { car, floor });
            }
            Transition::Reopened { floor } => {
                self.emit(ElevatorEvent::DoorsOpened { car, floor });
            }
            Transition::ClosingStarted { floor } => {
                debug!("Car {} closing doors at floor {}", car, floor);
                self.emit(ElevatorEvent::DoorsClosing { car, floor });
            }
            Transition::Closed { floor, served } => {
                self.emit(ElevatorEvent::DoorsClosed { car, floor });

                match served {
                    Some(key) => {
                        if self.pending.release(key) {
                            info!("Car {} finished serving {}", car, key);
                            self.emit(ElevatorEvent::CallAcknowledged {
                                floor: key.floor,
                                direction: key.direction,
                            });
                        } else {
                            warn!("Call for {} was released twice", key);
                        }
                    }
                    None => warn!("Car {} closed its doors without a call to serve", car),
                }
            }
        }
    }

    fn emit(&self, event: ElevatorEvent) {
        let _ = self.view_tx.send(ViewUpdate {
            at: self.now(),
            event,
        });
    }
}
