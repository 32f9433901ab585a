/*
 * Unit tests for the dispatcher module
 *
 * The unit tests follows the Arrange, Act, Assert pattern. All tests run on virtual time,
 * the view is a crossbeam receiver that is drained after each step.
 *
 * Tests:
 * - test_dispatcher_rejects_invalid_configuration
 * - test_dispatcher_rejects_out_of_range_floor
 * - test_dispatcher_rejects_missing_call_button
 * - test_dispatcher_single_call_timeline
 * - test_dispatcher_nearest_car_tie_break
 * - test_dispatcher_zero_distance_call
 * - test_dispatcher_duplicate_call_while_queued
 * - test_dispatcher_dedup_is_per_direction
 * - test_dispatcher_reopen_during_close
 * - test_dispatcher_reopen_with_other_direction
 * - test_dispatcher_busy_car_at_requested_floor
 * - test_dispatcher_queue_cycle_stops_when_empty
 * - test_dispatcher_eventual_service
 * - test_dispatcher_timer_invariant
 * - test_dispatcher_snapshot_mid_cycle
 * - test_view_update_json
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod dispatcher_tests {
    use crate::config::{Config, DispatcherConfig, ElevatorConfig, RunnerConfig};
    use crate::dispatcher::Dispatcher;
    use crate::shared::AcceptanceResult::{Accepted, Deduplicated, Reopened};
    use crate::shared::Direction::{Down, Up};
    use crate::shared::Phase::{DoorsClosing, DoorsOpen, Idle, Moving};
    use crate::shared::{CarState, ElevatorError, ElevatorEvent, ViewUpdate};
    use crossbeam_channel::{unbounded, Receiver};
    use std::time::Duration;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn test_config(n_cars: u8, n_floors: u8) -> Config {
        Config {
            elevator: ElevatorConfig {
                n_cars,
                n_floors,
                travel_time_per_floor: 2000,
                door_open_time: 3000,
                door_close_time: 2500,
            },
            dispatcher: DispatcherConfig {
                queue_poll_interval: 100,
            },
            runner: RunnerConfig::default(),
        }
    }

    fn setup_dispatcher(n_cars: u8, n_floors: u8) -> (Dispatcher, Receiver<ViewUpdate>) {
        let (view_tx, view_rx) = unbounded::<ViewUpdate>();
        let dispatcher = Dispatcher::new(&test_config(n_cars, n_floors), view_tx).unwrap();
        (dispatcher, view_rx)
    }

    fn drain(view_rx: &Receiver<ViewUpdate>) -> Vec<ViewUpdate> {
        view_rx.try_iter().collect()
    }

    fn acknowledgements(updates: &[ViewUpdate]) -> usize {
        updates
            .iter()
            .filter(|u| matches!(u.event, ElevatorEvent::CallAcknowledged { .. }))
            .count()
    }

    #[test]
    fn test_dispatcher_rejects_invalid_configuration() {
        // Purpose: Zero cars or floors is fatal before any car is created

        // Arrange
        let (view_tx, _view_rx) = unbounded::<ViewUpdate>();

        // Act
        let no_cars = Dispatcher::new(&test_config(0, 3), view_tx.clone());
        let no_floors = Dispatcher::new(&test_config(2, 0), view_tx);

        // Assert
        assert!(matches!(no_cars, Err(ElevatorError::InvalidConfiguration(_))));
        assert!(matches!(no_floors, Err(ElevatorError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_dispatcher_rejects_out_of_range_floor() {
        // Purpose: A call for a floor that does not exist is refused without touching any state

        // Arrange
        let (mut dispatcher, view_rx) = setup_dispatcher(2, 3);

        // Act
        let result = dispatcher.submit_call(3, None);

        // Assert
        assert!(matches!(
            result,
            Err(ElevatorError::InvalidFloorRequest { floor: 3, n_floors: 3 })
        ));
        assert_eq!(dispatcher.queue_len(), 0);
        assert_eq!(dispatcher.outstanding_count(), 0);
        assert!(!dispatcher.is_queue_cycle_running());
        assert!(dispatcher.is_quiescent());
        assert!(drain(&view_rx).is_empty());
    }

    #[test]
    fn test_dispatcher_rejects_missing_call_button() {
        let (mut dispatcher, _view_rx) = setup_dispatcher(1, 4);

        let up_at_top = dispatcher.submit_call(3, Some(Up));
        let down_at_ground = dispatcher.submit_call(0, Some(Down));

        assert!(matches!(
            up_at_top,
            Err(ElevatorError::UnavailableDirection { floor: 3, direction: Up })
        ));
        assert!(matches!(
            down_at_ground,
            Err(ElevatorError::UnavailableDirection { floor: 0, direction: Down })
        ));
        assert_eq!(dispatcher.outstanding_count(), 0);
    }

    #[test]
    fn test_dispatcher_single_call_timeline() {
        // Purpose: 2 cars, 3 floors, call floor 2. Car 0 serves it and the floor is released
        // 4000 + 3000 + 2500 = 9500 ms after the assignment

        // Arrange
        let (mut dispatcher, view_rx) = setup_dispatcher(2, 3);

        // Act
        let result = dispatcher.submit_call(2, None).unwrap();
        dispatcher.advance_to(ms(100));

        // Assert
        assert_eq!(result, Accepted);
        assert_eq!(
            drain(&view_rx),
            vec![ViewUpdate {
                at: ms(100),
                event: ElevatorEvent::CarMoved { car: 0, from: 0, to: 2, duration: ms(4000) },
            }]
        );
        assert_eq!(dispatcher.car(0).unwrap().phase(), Moving);
        assert_eq!(dispatcher.car(1).unwrap().phase(), Idle);

        dispatcher.advance_to(ms(4100));
        assert_eq!(
            drain(&view_rx),
            vec![ViewUpdate { at: ms(4100), event: ElevatorEvent::DoorsOpened { car: 0, floor: 2 } }]
        );

        dispatcher.advance_to(ms(7100));
        assert_eq!(
            drain(&view_rx),
            vec![ViewUpdate { at: ms(7100), event: ElevatorEvent::DoorsClosing { car: 0, floor: 2 } }]
        );

        dispatcher.advance_to(ms(9599));
        assert!(dispatcher.is_outstanding(2, None));
        assert_eq!(dispatcher.car(0).unwrap().phase(), DoorsClosing);

        dispatcher.advance_to(ms(9600));
        assert_eq!(
            drain(&view_rx),
            vec![
                ViewUpdate { at: ms(9600), event: ElevatorEvent::DoorsClosed { car: 0, floor: 2 } },
                ViewUpdate {
                    at: ms(9600),
                    event: ElevatorEvent::CallAcknowledged { floor: 2, direction: None },
                },
            ]
        );
        assert!(!dispatcher.is_outstanding(2, None));
        assert_eq!(dispatcher.car(0).unwrap().floor(), 2);
        assert!(dispatcher.is_quiescent());
    }

    #[test]
    fn test_dispatcher_nearest_car_tie_break() {
        // Purpose: With idle cars at floors [0, 5, 5], a call for floor 5 goes to car 1

        // Arrange
        let (mut dispatcher, view_rx) = setup_dispatcher(3, 7);
        dispatcher.submit_call(5, None).unwrap();
        dispatcher.advance_by(ms(100));
        dispatcher.submit_call(5, Some(Up)).unwrap();
        dispatcher.advance_by(ms(100));
        dispatcher.submit_call(5, Some(Down)).unwrap();
        dispatcher.run_until_idle();
        dispatcher.submit_call(0, None).unwrap();
        dispatcher.run_until_idle();
        let floors: Vec<u8> = dispatcher.cars().iter().map(|car| car.floor()).collect();
        assert_eq!(floors, vec![0, 5, 5]);
        drain(&view_rx);

        // Act
        dispatcher.submit_call(5, None).unwrap();
        dispatcher.advance_by(ms(100));

        // Assert
        let updates = drain(&view_rx);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].event, ElevatorEvent::DoorsOpened { car: 1, floor: 5 });
        assert_eq!(dispatcher.car(1).unwrap().phase(), DoorsOpen);
        assert_eq!(dispatcher.car(2).unwrap().phase(), Idle);
    }

    #[test]
    fn test_dispatcher_zero_distance_call() {
        // Purpose: A call for the floor an idle car is parked at opens its doors without a trip

        // Arrange
        let (mut dispatcher, view_rx) = setup_dispatcher(2, 3);

        // Act
        assert_eq!(dispatcher.submit_call(0, None).unwrap(), Accepted);
        dispatcher.advance_to(ms(100));

        // Assert
        assert_eq!(
            drain(&view_rx),
            vec![ViewUpdate { at: ms(100), event: ElevatorEvent::DoorsOpened { car: 0, floor: 0 } }]
        );
        assert_eq!(dispatcher.car(0).unwrap().phase(), DoorsOpen);

        // Dwell and close still follow
        let finished = dispatcher.run_until_idle();
        assert_eq!(finished, ms(100 + 3000 + 2500));
        assert_eq!(acknowledgements(&drain(&view_rx)), 1);
    }

    #[test]
    fn test_dispatcher_duplicate_call_while_queued() {
        // Purpose: With no idle car, a second call for floor 3 is dropped and only one
        // request for floor 3 stays in the queue

        // Arrange
        let (mut dispatcher, view_rx) = setup_dispatcher(1, 5);
        dispatcher.submit_call(4, None).unwrap();
        dispatcher.advance_to(ms(100));

        // Act
        let first = dispatcher.submit_call(3, None).unwrap();
        let second = dispatcher.submit_call(3, None).unwrap();

        // Assert
        assert_eq!(first, Accepted);
        assert_eq!(second, Deduplicated);
        assert_eq!(dispatcher.queue_len(), 1);
        assert_eq!(dispatcher.queued_for(3, None), 1);

        // Unassignable requests cycle through the tail without being duplicated or lost
        dispatcher.advance_to(ms(2000));
        assert_eq!(dispatcher.queue_len(), 1);
        assert_eq!(dispatcher.submit_call(3, None).unwrap(), Deduplicated);

        dispatcher.run_until_idle();
        assert_eq!(acknowledgements(&drain(&view_rx)), 2);
        assert_eq!(dispatcher.outstanding_count(), 0);
        assert_eq!(dispatcher.car(0).unwrap().floor(), 3);
    }

    #[test]
    fn test_dispatcher_dedup_is_per_direction() {
        let (mut dispatcher, _view_rx) = setup_dispatcher(1, 5);

        assert_eq!(dispatcher.submit_call(2, Some(Up)).unwrap(), Accepted);
        assert_eq!(dispatcher.submit_call(2, Some(Down)).unwrap(), Accepted);
        assert_eq!(dispatcher.submit_call(2, None).unwrap(), Accepted);
        assert_eq!(dispatcher.submit_call(2, Some(Up)).unwrap(), Deduplicated);

        assert_eq!(dispatcher.queue_len(), 3);
        assert_eq!(dispatcher.outstanding_count(), 3);
        let orders: Vec<u64> = dispatcher.queued().map(|r| r.arrival_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn test_dispatcher_reopen_during_close() {
        // Purpose: A call during DoorsClosing cancels the close, reopens the doors and keeps
        // the floor outstanding until one later uninterrupted close

        // Arrange
        let (mut dispatcher, view_rx) = setup_dispatcher(1, 5);
        dispatcher.submit_call(2, None).unwrap();
        dispatcher.advance_to(ms(8000));
        assert_eq!(dispatcher.car(0).unwrap().phase(), DoorsClosing);
        drain(&view_rx);

        // Act
        let result = dispatcher.submit_call(2, None).unwrap();

        // Assert
        assert_eq!(result, Reopened);
        assert_eq!(dispatcher.queue_len(), 0);
        assert_eq!(dispatcher.car(0).unwrap().phase(), DoorsOpen);
        assert!(dispatcher.is_outstanding(2, None));
        assert_eq!(
            drain(&view_rx),
            vec![ViewUpdate { at: ms(8000), event: ElevatorEvent::DoorsOpened { car: 0, floor: 2 } }]
        );

        // The original close would have finished at 9600, nothing happens then
        dispatcher.advance_to(ms(9600));
        assert!(drain(&view_rx).is_empty());
        assert!(dispatcher.is_outstanding(2, None));

        // Fresh dwell from the reopen, then the close
        dispatcher.advance_to(ms(11000));
        assert_eq!(dispatcher.car(0).unwrap().phase(), DoorsClosing);
        dispatcher.advance_to(ms(13499));
        assert!(dispatcher.is_outstanding(2, None));

        dispatcher.advance_to(ms(13500));
        let updates = drain(&view_rx);
        assert_eq!(acknowledgements(&updates), 1);
        assert!(!dispatcher.is_outstanding(2, None));

        dispatcher.run_until_idle();
        assert_eq!(acknowledgements(&drain(&view_rx)), 0);
    }

    #[test]
    fn test_dispatcher_reopen_with_other_direction() {
        // Purpose: Any call for the floor a car is closing at reopens it, the new key is not queued

        // Arrange
        let (mut dispatcher, view_rx) = setup_dispatcher(1, 5);
        dispatcher.submit_call(2, Some(Down)).unwrap();
        dispatcher.advance_to(ms(8000));

        // Act
        let result = dispatcher.submit_call(2, Some(Up)).unwrap();

        // Assert
        assert_eq!(result, Reopened);
        assert!(!dispatcher.is_outstanding(2, Some(Up)));
        assert!(dispatcher.is_outstanding(2, Some(Down)));
        assert_eq!(dispatcher.queue_len(), 0);

        dispatcher.run_until_idle();
        let acknowledged: Vec<ElevatorEvent> = drain(&view_rx)
            .into_iter()
            .map(|u| u.event)
            .filter(|e| matches!(e, ElevatorEvent::CallAcknowledged { .. }))
            .collect();
        assert_eq!(
            acknowledged,
            vec![ElevatorEvent::CallAcknowledged { floor: 2, direction: Some(Down) }]
        );
    }

    #[test]
    fn test_dispatcher_busy_car_at_requested_floor() {
        // Purpose: A new key for a floor whose car is mid-cycle waits in the queue and is
        // served with a zero-distance assignment once the car is idle again

        // Arrange
        let (mut dispatcher, view_rx) = setup_dispatcher(1, 5);
        dispatcher.submit_call(2, None).unwrap();
        dispatcher.advance_to(ms(5000));
        assert_eq!(dispatcher.car(0).unwrap().phase(), DoorsOpen);
        drain(&view_rx);

        // Act
        let result = dispatcher.submit_call(2, Some(Up)).unwrap();
        dispatcher.run_until_idle();

        // Assert
        assert_eq!(result, Accepted);
        let updates = drain(&view_rx);
        let moves = updates
            .iter()
            .filter(|u| matches!(u.event, ElevatorEvent::CarMoved { .. }))
            .count();
        assert_eq!(moves, 0);
        assert_eq!(acknowledgements(&updates), 2);
        assert!(dispatcher.is_quiescent());
    }

    #[test]
    fn test_dispatcher_queue_cycle_stops_when_empty() {
        // Arrange
        let (mut dispatcher, _view_rx) = setup_dispatcher(2, 4);
        assert!(!dispatcher.is_queue_cycle_running());

        // Act
        dispatcher.submit_call(1, None).unwrap();
        let running_after_call = dispatcher.is_queue_cycle_running();
        dispatcher.advance_to(ms(100));
        let running_after_assign = dispatcher.is_queue_cycle_running();
        dispatcher.submit_call(3, None).unwrap();

        // Assert
        assert!(running_after_call);
        assert!(!running_after_assign);
        assert!(dispatcher.is_queue_cycle_running());
        assert_eq!(dispatcher.next_deadline(), Some(ms(200)));
    }

    #[test]
    fn test_dispatcher_eventual_service() {
        // Purpose: Every accepted call is eventually served even when calls outnumber cars

        // Arrange
        let (mut dispatcher, view_rx) = setup_dispatcher(2, 6);
        let calls = [(5, None), (1, Some(Up)), (3, Some(Down)), (0, None), (4, Some(Up)), (2, None)];

        // Act
        for (floor, direction) in calls {
            assert_eq!(dispatcher.submit_call(floor, direction).unwrap(), Accepted);
        }
        dispatcher.run_until_idle();

        // Assert
        let updates = drain(&view_rx);
        assert_eq!(acknowledgements(&updates), calls.len());
        for (floor, direction) in calls {
            assert!(updates.iter().any(|u| u.event == ElevatorEvent::CallAcknowledged { floor, direction }));
        }
        assert_eq!(dispatcher.outstanding_count(), 0);
        assert!(dispatcher.is_quiescent());
        assert!(!dispatcher.is_queue_cycle_running());
    }

    #[test]
    fn test_dispatcher_timer_invariant() {
        // Purpose: At every step a car holds a timer exactly when it is not idle, and no two
        // busy cars serve the same call

        // Arrange
        let (mut dispatcher, _view_rx) = setup_dispatcher(3, 8);
        let calls = [(7, None), (3, Some(Up)), (3, Some(Down)), (0, None), (6, Some(Down))];
        for (floor, direction) in calls {
            dispatcher.submit_call(floor, direction).unwrap();
        }

        // Act + Assert
        let mut step = 0;
        while !dispatcher.is_quiescent() {
            dispatcher.advance_by(ms(50));
            if step < 400 && step % 40 == 0 {
                // Reopen or dedup traffic at the busiest floor
                let _ = dispatcher.submit_call(3, Some(Up));
            }
            step += 1;

            let busy_cars = dispatcher.cars().iter().filter(|car| car.phase() != Idle).count();
            let queue_cycle = usize::from(dispatcher.is_queue_cycle_running());
            assert_eq!(dispatcher.armed_timers(), busy_cars + queue_cycle);

            let mut serving = Vec::new();
            for car in dispatcher.cars() {
                assert_eq!(car.timer().is_some(), car.phase() != Idle);
                if let Some(key) = car.serving() {
                    assert!(!serving.contains(&key));
                    serving.push(key);
                }
            }
            assert!(step < 10_000, "simulation did not settle");
        }
        assert_eq!(dispatcher.outstanding_count(), 0);
    }

    #[test]
    fn test_dispatcher_snapshot_mid_cycle() {
        // Purpose: The snapshot reports each car's floor, phase and target while a trip is underway

        // Arrange
        let (mut dispatcher, _view_rx) = setup_dispatcher(2, 3);
        dispatcher.submit_call(2, None).unwrap();

        // Act
        dispatcher.advance_to(ms(1000));
        let moving = dispatcher.snapshot();
        dispatcher.run_until_idle();
        let settled = dispatcher.snapshot();

        // Assert
        assert_eq!(
            moving,
            vec![
                CarState { id: 0, floor: 0, phase: Moving, target: Some(2) },
                CarState { id: 1, floor: 0, phase: Idle, target: None },
            ]
        );
        assert_eq!(
            settled,
            vec![
                CarState { id: 0, floor: 2, phase: Idle, target: None },
                CarState { id: 1, floor: 0, phase: Idle, target: None },
            ]
        );
    }

    #[test]
    fn test_view_update_json() {
        let update = ViewUpdate {
            at: ms(100),
            event: ElevatorEvent::CarMoved { car: 0, from: 0, to: 2, duration: ms(4000) },
        };

        let json: serde_json::Value = serde_json::to_value(&update).unwrap();

        assert_eq!(json["event"], "carMoved");
        assert_eq!(json["atMs"], 100);
        assert_eq!(json["durationMs"], 4000);
        assert_eq!(json["to"], 2);
    }
}
