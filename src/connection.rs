use crate::messages::AriesMessage;
use crate::VcxResult;
use log::{debug, trace};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

type Inbox = Arc<Mutex<VecDeque<String>>>;

/// One end of a pairwise connection. Messages travel as json.
#[derive(Clone, Debug)]
pub struct Connection {
    label: String,
    inbox: Inbox,
    outbox: Inbox,
}

impl Connection {
    /// Create both ends of a connection
    pub fn pair(a: &str, b: &str) -> (Self, Self) {
        let a_inbox = Inbox::default();
        let b_inbox = Inbox::default();
        (
            Self {
                label: a.to_string(),
                inbox: a_inbox.clone(),
                outbox: b_inbox.clone(),
            },
            Self {
                label: b.to_string(),
                inbox: b_inbox,
                outbox: a_inbox,
            },
        )
    }

    /// Deliver `message` to the other end
    pub fn send(&self, message: &AriesMessage) -> VcxResult<()> {
        debug!(
            "{} sends {} on thread {}",
            self.label,
            message.kind(),
            message.thread_id()
        );
        let json = message.to_json()?;
        self.outbox.lock()?.push_back(json);
        Ok(())
    }

    /// Take the oldest received message
    pub fn receive(&self) -> VcxResult<Option<AriesMessage>> {
        let json = self.inbox.lock()?.pop_front();
        json.map(|j| AriesMessage::from_json(&j)).transpose()
    }

    /// Take the oldest received message of exchange `thid`
    pub fn receive_matching(&self, thid: &str) -> VcxResult<Option<AriesMessage>> {
        trace!("{} receive_matching >>> thid: {}", self.label, thid);
        let mut inbox = self.inbox.lock()?;
        let mut position = None;
        for (i, json) in inbox.iter().enumerate() {
            if AriesMessage::from_json(json)?.thread_id() == thid {
                position = Some(i);
                break;
            }
        }
        position
            .and_then(|i| inbox.remove(i))
            .map(|j| AriesMessage::from_json(&j))
            .transpose()
    }

    /// Return a taken message to the front of the inbox
    pub fn requeue(&self, message: &AriesMessage) -> VcxResult<()> {
        let json = message.to_json()?;
        self.inbox.lock()?.push_front(json);
        Ok(())
    }

    /// Every received message not yet taken
    pub fn pending(&self) -> VcxResult<Vec<AriesMessage>> {
        self.inbox
            .lock()?
            .iter()
            .map(|j| AriesMessage::from_json(j))
            .collect()
    }
}
