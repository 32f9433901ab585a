use std::collections::VecDeque;

use crate::shared::{CallKey, ServiceRequest};

/// FIFO buffer of accepted calls waiting for a car.
#[derive(Debug, Default)]
pub struct RequestQueue {
    requests: VecDeque<ServiceRequest>,
    next_order: u64,
}

impl RequestQueue {
    pub fn new() -> RequestQueue {
        RequestQueue::default()
    }

    /// Appends a new request and returns it.
    pub fn push(&mut self, key: CallKey) -> ServiceRequest {
        let request = ServiceRequest {
            key,
            arrival_order: self.next_order,
        };
        self.next_order += 1;
        self.requests.push_back(request);
        request
    }

    pub fn pop(&mut self) -> Option<ServiceRequest> {
        self.requests.pop_front()
    }

    /// Puts a request that could not be assigned back at the tail.
    pub fn requeue(&mut self, request: ServiceRequest) {
        self.requests.push_back(request);
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn count(&self, key: CallKey) -> usize {
        self.requests.iter().filter(|r| r.key == key).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceRequest> {
        self.requests.iter()
    }
}
