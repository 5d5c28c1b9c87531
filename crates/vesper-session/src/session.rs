//! Session data structure

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use vesper_tabs::{Client, ClientId, ClosedTabs, SurfaceId, APP_NAME};

use crate::error::SessionError;
use crate::Result;

#[derive(Debug)]
pub struct Session {
    clients: HashMap<ClientId, Client>,
    /// Tab strip order
    order: Vec<ClientId>,
    /// Focused client; `None` only while the session is empty
    active: Option<ClientId>,
    closed: ClosedTabs,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
            order: Vec::new(),
            active: None,
            closed: ClosedTabs::new(),
            updated_at: Utc::now(),
        }
    }

    /// Add a client right after the active one. The first client of an
    /// empty session becomes active.
    pub fn insert(&mut self, client: Client) -> ClientId {
        let id = client.id;
        let index = self
            .active_index()
            .map(|i| i + 1)
            .unwrap_or(self.order.len());

        self.order.insert(index, id);
        self.clients.insert(id, client);
        if self.active.is_none() {
            self.active = Some(id);
        }
        self.updated_at = Utc::now();

        tracing::debug!(client_id = %id, index, "Inserted client");
        id
    }

    /// Remove a client, remembering its URI for reopening. When the active
    /// client goes, the one now at its position (or the last) takes over.
    pub fn remove(&mut self, id: ClientId) -> Result<Client> {
        let index = self
            .position(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;

        self.order.remove(index);
        let client = self
            .clients
            .remove(&id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;

        if self.active == Some(id) {
            self.active = if self.order.is_empty() {
                None
            } else {
                Some(self.order[index.min(self.order.len() - 1)])
            };
        }

        self.closed.push(&client.uri);
        self.updated_at = Utc::now();

        Ok(client)
    }

    /// Focus a client. Returns whether the active client changed.
    pub fn set_active(&mut self, id: ClientId) -> Result<bool> {
        if !self.clients.contains_key(&id) {
            return Err(SessionError::NotFound(id.to_string()));
        }

        let changed = self.active != Some(id);
        self.active = Some(id);
        Ok(changed)
    }

    pub fn active_id(&self) -> Option<ClientId> {
        self.active
    }

    pub fn active(&self) -> Option<&Client> {
        self.active.and_then(|id| self.clients.get(&id))
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active.and_then(|id| self.position(id))
    }

    pub fn get(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(&id)
    }

    pub fn get_mut(&mut self, id: ClientId) -> Option<&mut Client> {
        self.clients.get_mut(&id)
    }

    pub fn client_mut(&mut self, id: ClientId) -> Result<&mut Client> {
        self.clients
            .get_mut(&id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    /// Look up the live client bound to a rendering surface
    pub fn find_by_surface(&self, surface: SurfaceId) -> Option<ClientId> {
        self.clients
            .values()
            .find(|c| c.surface == surface)
            .map(|c| c.id)
    }

    pub fn position(&self, id: ClientId) -> Option<usize> {
        self.order.iter().position(|c| *c == id)
    }

    pub fn id_at(&self, index: usize) -> Result<ClientId> {
        self.order
            .get(index)
            .copied()
            .ok_or(SessionError::IndexOutOfRange(index))
    }

    /// Clients in tab strip order
    pub fn iter(&self) -> impl Iterator<Item = &Client> {
        self.order.iter().filter_map(|id| self.clients.get(id))
    }

    pub fn ids(&self) -> Vec<ClientId> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The window is always named after the active client
    pub fn window_title(&self) -> String {
        self.active()
            .map(|c| c.label.clone())
            .unwrap_or_else(|| APP_NAME.to_string())
    }

    pub fn closed_tabs(&self) -> &ClosedTabs {
        &self.closed
    }

    pub fn pop_closed(&mut self) -> Option<String> {
        self.closed.pop()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
