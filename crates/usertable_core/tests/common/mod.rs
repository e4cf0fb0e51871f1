#![allow(dead_code)]

use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use usertable_core::{
    Record, RecordKey, RemoteError, RemoteOperation, RemoteResult, UsersApi,
};

/// One observed call against the fake backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchAll,
    Create(Record),
    Delete(RecordKey),
}

/// Scripted reply for the next call.
pub enum Reply {
    Records(Vec<Record>),
    Created(Record),
    /// Echo the posted record back unchanged.
    Echo,
    Ok,
    Status(u16),
}

/// In-process `UsersApi` replaying scripted replies in order.
#[derive(Default)]
pub struct ScriptedApi {
    replies: RefCell<VecDeque<Reply>>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedApi {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn push(&self, reply: Reply) {
        self.replies.borrow_mut().push_back(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn next(&self, operation: RemoteOperation) -> Reply {
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted reply for {operation}"))
    }
}

fn status_error(operation: RemoteOperation, status: u16) -> RemoteError {
    RemoteError::Status { operation, status }
}

impl UsersApi for ScriptedApi {
    fn fetch_all(&self) -> RemoteResult<Vec<Record>> {
        self.calls.borrow_mut().push(Call::FetchAll);
        match self.next(RemoteOperation::FetchAll) {
            Reply::Records(records) => Ok(records),
            Reply::Status(status) => Err(status_error(RemoteOperation::FetchAll, status)),
            _ => panic!("unexpected reply for fetch_all"),
        }
    }

    fn create(&self, record: &Record) -> RemoteResult<Record> {
        self.calls.borrow_mut().push(Call::Create(record.clone()));
        match self.next(RemoteOperation::Create) {
            Reply::Created(created) => Ok(created),
            Reply::Echo => Ok(record.clone()),
            Reply::Status(status) => Err(status_error(RemoteOperation::Create, status)),
            _ => panic!("unexpected reply for create"),
        }
    }

    fn delete(&self, key: &RecordKey) -> RemoteResult<()> {
        self.calls.borrow_mut().push(Call::Delete(key.clone()));
        match self.next(RemoteOperation::Delete) {
            Reply::Ok => Ok(()),
            Reply::Status(status) => Err(status_error(RemoteOperation::Delete, status)),
            _ => panic!("unexpected reply for delete"),
        }
    }
}

pub fn key(value: &str) -> RecordKey {
    RecordKey::new(value).unwrap()
}

/// Builds a record from a JSON object literal containing a `key`.
pub fn record(value: Value) -> Record {
    serde_json::from_value(value).unwrap()
}
