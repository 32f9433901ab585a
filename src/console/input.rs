/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{info, warn};
use std::io::BufRead;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::runner::send_call;
use crate::shared::{CallRequest, Direction, ElevatorError, ElevatorResult};

/**
 * Input source reading floor calls line by line.
 *
 * Each line is `<floor>` or `<floor> <up|down>`. Blank lines and lines starting with `#` are
 * skipped, `quit` stops reading. Dropping the sender at the end closes the runner's input.
 */
pub struct StdinInput<R: BufRead> {
    reader: R,
    call_tx: cbc::Sender<CallRequest>,
}

impl<R: BufRead> StdinInput<R> {
    pub fn new(reader: R, call_tx: cbc::Sender<CallRequest>) -> StdinInput<R> {
        StdinInput { reader, call_tx }
    }

    /// Returns the number of calls forwarded.
    pub fn run(self) -> ElevatorResult<usize> {
        let mut sent = 0;
        for line in self.reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.eq_ignore_ascii_case("quit") {
                info!("Input source stopped");
                break;
            }

            match parse_call(line) {
                Ok(call) => {
                    send_call(&self.call_tx, call)?;
                    sent += 1;
                }
                Err(e) => warn!("{}", e),
            }
        }
        Ok(sent)
    }
}

/// Parses `<floor>`, `<floor> <up|down>` or `<floor>:<up|down>`.
pub fn parse_call(input: &str) -> ElevatorResult<CallRequest> {
    let invalid = || ElevatorError::InvalidInput(input.to_string());

    let mut parts = input
        .split(|c: char| c == ':' || c.is_whitespace())
        .filter(|part| !part.is_empty());

    let floor = parts
        .next()
        .and_then(|part| part.parse::<u8>().ok())
        .ok_or_else(invalid)?;

    let direction = match parts.next().map(|part| part.to_ascii_lowercase()) {
        None => None,
        Some(part) if part == "up" || part == "u" => Some(Direction::Up),
        Some(part) if part == "down" || part == "d" => Some(Direction::Down),
        Some(_) => return Err(invalid()),
    };

    if parts.next().is_some() {
        return Err(invalid());
    }

    Ok(CallRequest { floor, direction })
}
