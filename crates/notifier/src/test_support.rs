//! Collaborator fakes shared by the unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use herald_core::error::PersistenceError;
use herald_core::gateway::{NewNotice, PersistenceGateway, RequesterContext};
use herald_core::level::{Level, SendAs};
use herald_core::types::DbId;

pub const DETAILS_URL: &str = "https://herald.test/notices";

/// Gateway that keeps created notices in memory and hands out sequential ids.
#[derive(Default)]
pub struct RecordingGateway {
    notices: Mutex<Vec<NewNotice>>,
    fail: bool,
}

impl RecordingGateway {
    pub fn failing() -> Self {
        Self {
            notices: Mutex::default(),
            fail: true,
        }
    }

    pub fn created(&self) -> Vec<NewNotice> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl PersistenceGateway for RecordingGateway {
    async fn create_notice(&self, notice: NewNotice) -> Result<DbId, PersistenceError> {
        if self.fail {
            return Err(PersistenceError::new("database unavailable"));
        }
        let mut notices = self.notices.lock().unwrap();
        notices.push(notice);
        Ok(notices.len() as DbId)
    }
}

/// Requester that records every inline notice attached to it.
#[derive(Default)]
pub struct FakeRequester {
    pub inline: Vec<(Level, SendAs, Vec<String>)>,
    pub action: Option<String>,
}

impl RequesterContext for FakeRequester {
    fn attach_inline_notice(&mut self, level: Level, send_as: SendAs, lines: Vec<String>) {
        self.inline.push((level, send_as, lines));
    }

    fn details_url(&self) -> String {
        DETAILS_URL.to_string()
    }

    fn request_type(&self) -> Option<String> {
        self.action.clone()
    }
}
