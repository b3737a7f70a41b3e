//! Change feed: in-process notifications of row changes, scoped per table and user.
//!
//! Writers publish after a successful store call; observers subscribe for one
//! table and one user and stop receiving as soon as they drop the subscription.

use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;
use uuid::Uuid;

use crate::models::job::JobRow;
use crate::models::profile::ProfileRow;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Jobs,
    JobProfiles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "insert",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
    pub id: Uuid,
    pub user_id: Uuid,
}

impl ChangeEvent {
    pub fn job(kind: ChangeKind, job: &JobRow) -> Self {
        Self {
            table: Table::Jobs,
            kind,
            id: job.id,
            user_id: job.user_id,
        }
    }

    pub fn profile(kind: ChangeKind, profile: &ProfileRow) -> Self {
        Self {
            table: Table::JobProfiles,
            kind,
            id: profile.id,
            user_id: profile.user_id,
        }
    }
}

#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishing with no observers is not an error.
    pub fn publish(&self, event: ChangeEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self, table: Table, user_id: Uuid) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
            table,
            user_id,
        }
    }
}

pub struct Subscription {
    rx: broadcast::Receiver<ChangeEvent>,
    table: Table,
    user_id: Uuid,
}

impl Subscription {
    /// Next matching event, or `None` once the feed is gone.
    /// Events missed while lagging are skipped.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.table == self.table && event.user_id == self.user_id => {
                    return Some(event)
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Change feed observer lagged, skipped {skipped} events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = ChangeEvent> + Send + 'static {
        futures::stream::unfold(self, |mut sub| async move {
            sub.next().await.map(|event| (event, sub))
        })
    }
}
