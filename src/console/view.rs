/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::error;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{ElevatorEvent, ViewUpdate};

/// Prints view updates to stdout, either as text or as one JSON object per line.
pub struct ConsoleView {
    view_rx: cbc::Receiver<ViewUpdate>,
    json: bool,
}

impl ConsoleView {
    pub fn new(view_rx: cbc::Receiver<ViewUpdate>, json: bool) -> ConsoleView {
        ConsoleView { view_rx, json }
    }

    /// Runs until every sender of the view channel is gone.
    pub fn run(self) {
        for update in self.view_rx.iter() {
            if self.json {
                match serde_json::to_string(&update) {
                    Ok(line) => println!("{}", line),
                    Err(e) => error!("Failed to serialize view update: {}", e),
                }
            } else {
                println!("{}", format_update(&update));
            }
        }
    }
}

pub fn format_update(update: &ViewUpdate) -> String {
    let at = update.at.as_secs_f64();
    let text = match &update.event {
        ElevatorEvent::CarMoved { car, from, to, duration } => format!(
            "car {} moving {} -> {} ({:.1}s)",
            car,
            from,
            to,
            duration.as_secs_f64()
        ),
        ElevatorEvent::DoorsOpened { car, floor } => format!("car {} doors open at floor {}", car, floor),
        ElevatorEvent::DoorsClosing { car, floor } => {
            format!("car {} doors closing at floor {}", car, floor)
        }
        ElevatorEvent::DoorsClosed { car, floor } => format!("car {} doors closed at floor {}", car, floor),
        ElevatorEvent::CallAcknowledged { floor, direction } => match direction {
            Some(direction) => format!("call {} {} served", floor, direction),
            None => format!("call {} served", floor),
        },
    };
    format!("[{:>8.1}s] {}", at, text)
}
