use std::cmp::Reverse;

use priority_queue::PriorityQueue;

use super::IO;

impl IO {
    pub fn handle_events(&mut self) {
        self.scheduler.cycle += 1;
        while let Some(event) = self.scheduler.get_next_event() {
            self.handle_event(event);
        }
    }

    pub fn handle_event(&mut self, event: EventType) {
        match event {
            EventType::RtcTick => self.rtc.clock_timer(&mut self.scheduler),
        }
    }

    pub fn skip_to_next_event(&mut self) {
        if let Some(cycle) = self.scheduler.next_event_cycle() {
            if cycle > self.scheduler.cycle { self.scheduler.cycle = cycle }
            while let Some(event) = self.scheduler.get_next_event() {
                self.handle_event(event);
            }
        }
    }
}

pub struct Scheduler {
    pub cycle: u64,
    event_queue: PriorityQueue<EventType, Reverse<u64>>,
}

impl Scheduler {
    pub fn new() -> Scheduler {
        Scheduler {
            cycle: 0,
            event_queue: PriorityQueue::new(),
        }
    }

    pub fn schedule(&mut self, event_type: EventType, delay: u64) {
        self.event_queue.push(event_type, Reverse(self.cycle + delay));
    }

    pub fn next_event_cycle(&self) -> Option<u64> {
        self.event_queue.peek().map(|(_, Reverse(cycle))| *cycle)
    }

    pub fn get_next_event(&mut self) -> Option<EventType> {
        match self.next_event_cycle() {
            Some(cycle) if cycle <= self.cycle => {
                self.event_queue.pop().map(|(event_type, _)| event_type)
            }
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    RtcTick,
}
