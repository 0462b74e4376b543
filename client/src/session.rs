//! One authenticated connection to an RT server.
//!
//! # Design
//! Every method is build, send, parse: `RtClient` validates the fields and
//! produces the request, `transport::execute` performs the single round trip,
//! and `RtClient` maps the status onto a result. Validation failures return
//! before anything touches the network.
//!
//! `upload_file` takes `&mut self` because it swaps the default
//! `Content-Type` for the duration of the call. The swap is scoped by a guard
//! that restores the JSON header on every exit path.

use std::path::Path;

use rt_core::{
    upload_form, Comment, CreateTicket, Fields, HttpRequest, HttpResponse, ResourceId, RtClient, UpdateTicket,
    CONTENT_TYPE,
};
use serde_json::Value;
use tracing::{debug, warn};
use ureq::Agent;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::transport;

/// Blocking RT REST 2.0 client. Not meant to be shared between threads; use
/// one session per thread.
#[derive(Debug)]
pub struct Session {
    core: RtClient,
    agent: Agent,
}

impl Session {
    /// Build the agent and, for username/password auth, log in once against
    /// the server root.
    ///
    /// Missing credentials are not an error: the session is created and RT
    /// will reject its requests. A refused login is logged and likewise left
    /// for RT to reject later. Transport errors during login are returned.
    pub fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let core = RtClient::new(&config.server, config.auth.clone());
        let agent = transport::agent(config.verify_tls);

        if let Some(login) = core.build_login()? {
            let response = transport::execute(&agent, login)?;
            match core.parse_login(response) {
                Ok(()) => debug!(server = core.server(), "session login accepted"),
                Err(err) => warn!(server = core.server(), %err, "session login was not accepted"),
            }
        }

        Ok(Self { core, agent })
    }

    /// The request builder behind this session.
    pub fn client(&self) -> &RtClient {
        &self.core
    }

    pub fn is_authenticated(&self) -> bool {
        self.core.is_authenticated()
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        Ok(transport::execute(&self.agent, request)?)
    }

    // -----------------------------------------------------------------------
    // Queues
    // -----------------------------------------------------------------------

    /// Every queue the account can see.
    pub fn get_queues(&self) -> Result<Value, ClientError> {
        let response = self.send(self.core.build_get_queues())?;
        Ok(self.core.parse_get_queues(response)?)
    }

    pub fn get_queue(&self, id: impl Into<ResourceId>) -> Result<Value, ClientError> {
        let response = self.send(self.core.build_get_queue(&id.into()))?;
        Ok(self.core.parse_get_queue(response)?)
    }

    pub fn get_queue_history(&self, id: impl Into<ResourceId>) -> Result<Value, ClientError> {
        let response = self.send(self.core.build_get_queue_history(&id.into()))?;
        Ok(self.core.parse_get_queue_history(response)?)
    }

    pub fn create_queue(&self, name: &str, fields: &Fields) -> Result<(), ClientError> {
        let request = self.core.build_create_queue(name, fields)?;
        Ok(self.core.parse_create_queue(self.send(request)?)?)
    }

    pub fn update_queue(&self, id: impl Into<ResourceId>, fields: &Fields) -> Result<(), ClientError> {
        let request = self.core.build_update_queue(&id.into(), fields)?;
        Ok(self.core.parse_update_queue(self.send(request)?)?)
    }

    pub fn disable_queue(&self, id: impl Into<ResourceId>) -> Result<(), ClientError> {
        let response = self.send(self.core.build_disable_queue(&id.into()))?;
        Ok(self.core.parse_disable_queue(response)?)
    }

    // -----------------------------------------------------------------------
    // Tickets
    // -----------------------------------------------------------------------

    pub fn get_ticket(&self, id: impl Into<ResourceId>) -> Result<Value, ClientError> {
        let response = self.send(self.core.build_get_ticket(&id.into()))?;
        Ok(self.core.parse_get_ticket(response)?)
    }

    /// Transaction history of one ticket.
    pub fn get_ticket_history(&self, id: impl Into<ResourceId>) -> Result<Value, ClientError> {
        let response = self.send(self.core.build_get_ticket_history(&id.into()))?;
        Ok(self.core.parse_get_ticket_history(response)?)
    }

    /// Returns the new ticket's URL.
    pub fn create_ticket(&self, input: &CreateTicket) -> Result<String, ClientError> {
        let request = self.core.build_create_ticket(input)?;
        Ok(self.core.parse_create_ticket(self.send(request)?)?)
    }

    pub fn update_ticket(&self, id: impl Into<ResourceId>, input: &UpdateTicket) -> Result<(), ClientError> {
        let request = self.core.build_update_ticket(&id.into(), input)?;
        Ok(self.core.parse_update_ticket(self.send(request)?)?)
    }

    pub fn post_comment(&self, id: impl Into<ResourceId>, comment: &Comment) -> Result<(), ClientError> {
        let request = self.core.build_post_comment(&id.into(), comment)?;
        Ok(self.core.parse_post_comment(self.send(request)?)?)
    }

    /// Attach the file at `path` to a ticket under `file_name`.
    pub fn upload_file(
        &mut self,
        id: impl Into<ResourceId>,
        file_name: &str,
        path: impl AsRef<Path>,
    ) -> Result<(), ClientError> {
        let contents = std::fs::read(path)?;
        self.upload_bytes(id, file_name, contents)
    }

    pub fn upload_bytes(
        &mut self,
        id: impl Into<ResourceId>,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<(), ClientError> {
        let id = id.into();
        let form = upload_form(file_name, contents);
        let scoped = self.core.override_header(CONTENT_TYPE, form.content_type());
        let request = scoped.build_upload_file(&id, form);
        let response = transport::execute(&self.agent, request)?;
        Ok(scoped.parse_upload_file(response)?)
    }

    pub fn delete_ticket(&self, id: impl Into<ResourceId>) -> Result<(), ClientError> {
        let response = self.send(self.core.build_delete_ticket(&id.into()))?;
        Ok(self.core.parse_delete_ticket(response)?)
    }

    /// Run a TicketSQL query, e.g. `"Queue = 'General'"`. The text is sent
    /// as-is.
    pub fn raw_search(&self, query: &str) -> Result<Value, ClientError> {
        let response = self.send(self.core.build_raw_search(query))?;
        Ok(self.core.parse_raw_search(response)?)
    }

    // -----------------------------------------------------------------------
    // Assets
    // -----------------------------------------------------------------------

    pub fn get_asset(&self, id: impl Into<ResourceId>) -> Result<Value, ClientError> {
        let response = self.send(self.core.build_get_asset(&id.into()))?;
        Ok(self.core.parse_get_asset(response)?)
    }

    pub fn create_asset(&self, name: &str, fields: &Fields) -> Result<(), ClientError> {
        let request = self.core.build_create_asset(name, fields)?;
        Ok(self.core.parse_create_asset(self.send(request)?)?)
    }

    pub fn update_asset(&self, id: impl Into<ResourceId>, fields: &Fields) -> Result<(), ClientError> {
        let request = self.core.build_update_asset(&id.into(), fields)?;
        Ok(self.core.parse_update_asset(self.send(request)?)?)
    }

    pub fn delete_asset(&self, id: impl Into<ResourceId>) -> Result<(), ClientError> {
        let response = self.send(self.core.build_delete_asset(&id.into()))?;
        Ok(self.core.parse_delete_asset(response)?)
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    pub fn get_user(&self, id: impl Into<ResourceId>) -> Result<Value, ClientError> {
        let response = self.send(self.core.build_get_user(&id.into()))?;
        Ok(self.core.parse_get_user(response)?)
    }

    pub fn get_user_history(&self, id: impl Into<ResourceId>) -> Result<Value, ClientError> {
        let response = self.send(self.core.build_get_user_history(&id.into()))?;
        Ok(self.core.parse_get_user_history(response)?)
    }

    pub fn create_user(&self, username: &str, fields: &Fields) -> Result<(), ClientError> {
        let request = self.core.build_create_user(username, fields)?;
        Ok(self.core.parse_create_user(self.send(request)?)?)
    }

    pub fn update_user(&self, id: impl Into<ResourceId>, fields: &Fields) -> Result<(), ClientError> {
        let request = self.core.build_update_user(&id.into(), fields)?;
        Ok(self.core.parse_update_user(self.send(request)?)?)
    }

    pub fn disable_user(&self, id: impl Into<ResourceId>) -> Result<(), ClientError> {
        let response = self.send(self.core.build_disable_user(&id.into()))?;
        Ok(self.core.parse_disable_user(response)?)
    }
}
