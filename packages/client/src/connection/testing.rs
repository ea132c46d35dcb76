//! In-memory transport for unit tests.

use std::{cell::RefCell, rc::Rc};

use super::{Socket, SocketId, Transport};
use crate::codec::Frame;

#[derive(Default)]
struct Log {
    opened: Vec<String>,
    sent: Vec<String>,
    closes: usize,
}

/// Transport that records every call; clones share the same log
#[derive(Clone, Default)]
pub(crate) struct RecordingTransport {
    log: Rc<RefCell<Log>>,
}

impl RecordingTransport {
    pub(crate) fn opened(&self) -> Vec<String> {
        self.log.borrow().opened.clone()
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.log.borrow().sent.clone()
    }

    pub(crate) fn closes(&self) -> usize {
        self.log.borrow().closes
    }

    /// Id of the most recently opened socket
    pub(crate) fn last_id(&self) -> SocketId {
        SocketId(self.log.borrow().opened.len() as u64)
    }
}

impl Transport for RecordingTransport {
    type Socket = RecordingSocket;

    fn open(&mut self, endpoint: &str) -> RecordingSocket {
        self.log.borrow_mut().opened.push(endpoint.to_string());
        RecordingSocket {
            id: self.last_id(),
            log: self.log.clone(),
        }
    }
}

pub(crate) struct RecordingSocket {
    id: SocketId,
    log: Rc<RefCell<Log>>,
}

impl Socket for RecordingSocket {
    fn id(&self) -> SocketId {
        self.id
    }

    fn send(&mut self, text: &str) {
        self.log.borrow_mut().sent.push(text.to_string());
    }

    fn close(&mut self) {
        self.log.borrow_mut().closes += 1;
    }
}

pub(crate) fn frame(text: &str) -> Frame {
    Frame::from_raw(text)
}
