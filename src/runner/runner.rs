/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{info, warn};
use std::thread::{Builder, JoinHandle};
use std::time::{Duration, Instant};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::shared::{AcceptanceResult, CallRequest, ElevatorError, ElevatorResult, ViewUpdate};

// Longest the runner sleeps when no timer is armed
const IDLE_WAIT: Duration = Duration::from_millis(500);

/**
 * Drives a `Dispatcher` in wall-clock time on its own thread.
 *
 * The runner is the only owner of the dispatcher. It waits for calls from the input source,
 * a terminate signal, or the next timer deadline, and after every wake-up moves the simulation
 * clock to the elapsed wall time multiplied by `time_scale`.
 *
 * When the call channel is closed the runner keeps going until every car is idle and the
 * queue is empty, then returns.
 *
 * # Fields
 * - `dispatcher`:      The simulation core.
 * - `time_scale`:      Simulated time per unit of wall time.
 * - `started`:         Wall-clock instant matching simulation time zero.
 * - `call_rx`:         Receives calls from the input source.
 * - `outcome_tx`:      Sends the result of every submitted call back to the input side.
 * - `terminate_rx`:    Stops the runner immediately.
 */
pub struct Runner {
    dispatcher: Dispatcher,
    time_scale: f64,
    started: Instant,
    call_rx: cbc::Receiver<CallRequest>,
    outcome_tx: cbc::Sender<(CallRequest, ElevatorResult<AcceptanceResult>)>,
    terminate_rx: cbc::Receiver<()>,
}

impl Runner {
    pub fn new(
        config: &Config,
        view_tx: cbc::Sender<ViewUpdate>,
        call_rx: cbc::Receiver<CallRequest>,
        outcome_tx: cbc::Sender<(CallRequest, ElevatorResult<AcceptanceResult>)>,
        terminate_rx: cbc::Receiver<()>,
    ) -> ElevatorResult<Runner> {
        Ok(Runner {
            dispatcher: Dispatcher::new(config, view_tx)?,
            time_scale: config.runner.time_scale,
            started: Instant::now(),
            call_rx,
            outcome_tx,
            terminate_rx,
        })
    }

    /// Starts the runner on a thread named `dispatcher`.
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        Builder::new().name("dispatcher".into()).spawn(move || self.run())
    }

    pub fn run(mut self) {
        self.started = Instant::now();
        let mut input_open = true;

        loop {
            let call_rx = if input_open {
                self.call_rx.clone()
            } else {
                cbc::never()
            };

            cbc::select! {
                recv(call_rx) -> call => {
                    match call {
                        Ok(call) => {
                            self.sync_clock();
                            let result = self.dispatcher.submit_call(call.floor, call.direction);
                            if let Err(e) = &result {
                                warn!("Rejected call for floor {}: {}", call.floor, e);
                            }
                            let _ = self.outcome_tx.send((call, result));
                        }
                        Err(_) => {
                            info!("Input closed, finishing outstanding calls");
                            input_open = false;
                        }
                    }
                }
                recv(self.terminate_rx) -> _ => {
                    info!("Runner terminated");
                    return;
                }
                default(self.wait_time()) => {}
            }

            self.sync_clock();
            if !input_open && self.dispatcher.is_quiescent() {
                info!("All calls served, runner stopping");
                return;
            }
        }
    }

    fn sim_time(&self) -> Duration {
        let scaled = self.started.elapsed().as_secs_f64() * self.time_scale;
        Duration::try_from_secs_f64(scaled).unwrap_or_else(|_| self.dispatcher.now())
    }

    fn sync_clock(&mut self) {
        let now = self.sim_time();
        self.dispatcher.advance_to(now);
    }

    // Wall time until the next timer is due
    fn wait_time(&self) -> Duration {
        match self.dispatcher.next_deadline() {
            Some(deadline) => {
                let remaining = deadline.saturating_sub(self.sim_time());
                Duration::try_from_secs_f64(remaining.as_secs_f64() / self.time_scale)
                    .map_or(IDLE_WAIT, |wait| wait.min(IDLE_WAIT))
            }
            None => IDLE_WAIT,
        }
    }
}

/// Hands a call to a running runner.
pub fn send_call(call_tx: &cbc::Sender<CallRequest>, call: CallRequest) -> ElevatorResult<()> {
    call_tx.send(call).map_err(|_| ElevatorError::RunnerStopped)
}
