use rusqlite::Connection;
use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::{Error, Result};

/// Fixed-size set of open connections shared by every caller of a
/// [`crate::Database`]. Callers block in [`ConnectionPool::get`] until a
/// connection is free or the acquire timeout passes.
pub struct ConnectionPool {
    idle: Mutex<Vec<Connection>>,
    released: Condvar,
    size: usize,
    acquire_timeout: Duration,
}

impl ConnectionPool {
    pub fn new(connections: Vec<Connection>, acquire_timeout: Duration) -> Self {
        let size = connections.len();
        Self {
            idle: Mutex::new(connections),
            released: Condvar::new(),
            size,
            acquire_timeout,
        }
    }

    /// Borrow a connection, waiting up to the acquire timeout.
    pub fn get(&self) -> Result<PooledConnection<'_>> {
        let deadline = Instant::now() + self.acquire_timeout;
        let mut idle = self.lock_idle();

        loop {
            if let Some(conn) = idle.pop() {
                return Ok(PooledConnection {
                    pool: self,
                    conn: Some(conn),
                });
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(Error::PoolTimeout(self.acquire_timeout));
            }

            idle = self
                .released
                .wait_timeout(idle, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn idle_count(&self) -> usize {
        self.lock_idle().len()
    }

    fn release(&self, conn: Connection) {
        self.lock_idle().push(conn);
        self.released.notify_one();
    }

    // The idle list stays consistent even if a holder panicked.
    fn lock_idle(&self) -> MutexGuard<'_, Vec<Connection>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Connection on loan from a [`ConnectionPool`]; returned on drop.
pub struct PooledConnection<'a> {
    pool: &'a ConnectionPool,
    conn: Option<Connection>,
}

impl Deref for PooledConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn
            .as_ref()
            .unwrap_or_else(|| unreachable!("connection is present until drop"))
    }
}

impl DerefMut for PooledConnection<'_> {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn
            .as_mut()
            .unwrap_or_else(|| unreachable!("connection is present until drop"))
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn);
        }
    }
}
