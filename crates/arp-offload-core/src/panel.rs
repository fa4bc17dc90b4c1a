//! The HTTP control surface: resource registration and request dispatch.

use core::net::Ipv4Addr;

use embedded_io_async::{Read, Write};
use heapless::Vec;
use log::{debug, error, info, warn};

use crate::app::AppContext;
use crate::buffer::{RequestBuffer, ResponseBuffer};
use crate::config::{HTTP_BYTES_LEN, MAX_RESOURCES, REQUEST_BYTES_LEN};
use crate::http::{read_request, write_response, Method, Request, Status};
use crate::pages::{render_sleep, render_stats, render_wake, INDEX_PAGE};
use crate::stats::CpuStatsSource;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Renders the wake link, then raises the sleep request.
    Sleep,
    Stats,
    Wake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content {
    Static(&'static str),
    Dynamic(Page),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    pub path: &'static str,
    pub content_type: &'static str,
    pub content: Content,
}

pub struct ResourceTable<const N: usize> {
    resources: Vec<Resource, N>,
}

impl<const N: usize> Default for ResourceTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ResourceTable<N> {
    pub const fn new() -> Self {
        Self {
            resources: Vec::new(),
        }
    }

    pub fn register(
        &mut self,
        path: &'static str,
        content_type: &'static str,
        content: Content,
    ) -> Result<()> {
        if !path.starts_with('/') || self.find(path).is_some() {
            error!("Registering HTTP page resource '{}' failed: invalid or duplicate path", path);
            return Err(Error::Registration);
        }
        let resource = Resource {
            path,
            content_type,
            content,
        };
        if self.resources.push(resource).is_err() {
            error!("Registering HTTP page resource '{}' failed: table is full", path);
            return Err(Error::Registration);
        }
        Ok(())
    }

    pub fn find(&self, path: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.path == path)
    }
}

impl ResourceTable<MAX_RESOURCES> {
    /// The four pages of the control panel.
    pub fn control_panel() -> Result<Self> {
        let mut table = Self::new();
        table.register("/", "text/html", Content::Static(INDEX_PAGE))?;
        table.register("/sleep", "text/html", Content::Dynamic(Page::Sleep))?;
        table.register("/stats", "text/html", Content::Dynamic(Page::Stats))?;
        table.register("/wake", "text/html", Content::Dynamic(Page::Wake))?;
        Ok(table)
    }
}

/// What the dynamic pages need to know about the running device.
pub trait PanelState: CpuStatsSource {
    fn ip_address(&self) -> Option<Ipv4Addr>;

    fn app(&self) -> &AppContext;
}

pub struct ControlPanel<'a, P, const N: usize, const B: usize = HTTP_BYTES_LEN> {
    table: &'a ResourceTable<N>,
    state: &'a P,
}

impl<'a, P: PanelState, const N: usize> ControlPanel<'a, P, N> {
    pub fn new(table: &'a ResourceTable<N>, state: &'a P) -> Self {
        Self { table, state }
    }
}

impl<'a, P: PanelState, const N: usize, const B: usize> ControlPanel<'a, P, N, B> {
    /// A panel whose dynamic pages are bounded by `B` bytes.
    pub fn with_buffer_size(table: &'a ResourceTable<N>, state: &'a P) -> Self {
        Self { table, state }
    }

    /// Serves a single connection: reads the request and answers it.
    pub async fn serve<S: Read + Write>(&self, socket: &mut S) -> Result<Status> {
        let mut request_buffer = RequestBuffer::<REQUEST_BYTES_LEN>::new();
        read_request(socket, &mut request_buffer).await?;
        let request = Request::parse(request_buffer.buffer())?;
        info!("{:?} {}", request.method, request.path);
        self.handle(socket, &request).await
    }

    /// Answers a parsed request. A page that does not fit the response
    /// buffer is not written at all.
    pub async fn handle<S: Write>(&self, socket: &mut S, request: &Request<'_>) -> Result<Status> {
        let Some(resource) = self.table.find(request.path) else {
            write_response(socket, Status::NotFound, None, b"").await?;
            return Ok(Status::NotFound);
        };
        if !matches!(request.method, Method::Get | Method::Post) {
            write_response(socket, Status::MethodNotAllowed, None, b"").await?;
            return Ok(Status::MethodNotAllowed);
        }

        match resource.content {
            Content::Static(body) => {
                write_response(socket, Status::Ok, Some(resource.content_type), body.as_bytes())
                    .await?;
                Ok(Status::Ok)
            }
            Content::Dynamic(page) => {
                let result = self.dynamic(socket, resource, page).await;
                if page == Page::Sleep {
                    self.state.app().sleep_request.raise();
                }
                result
            }
        }
    }

    async fn dynamic<S: Write>(
        &self,
        socket: &mut S,
        resource: &Resource,
        page: Page,
    ) -> Result<Status> {
        let mut buf = ResponseBuffer::<B>::new();
        match page {
            Page::Sleep => render_sleep(self.ip_address(), &mut buf)?,
            Page::Stats => {
                let cpu = self.state.cpu_stats();
                let ledger = &self.state.app().ledger;
                render_stats(cpu.as_ref(), ledger.total(), ledger.count(), &mut buf)?
            }
            Page::Wake => {
                render_wake(self.ip_address(), &mut buf)?;
                debug!(
                    "wake response: {}",
                    core::str::from_utf8(buf.buffer()).unwrap_or("")
                );
            }
        }
        write_response(socket, Status::Ok, Some(resource.content_type), buf.buffer()).await?;
        Ok(Status::Ok)
    }

    fn ip_address(&self) -> Ipv4Addr {
        self.state.ip_address().unwrap_or_else(|| {
            warn!("No IP address assigned");
            Ipv4Addr::UNSPECIFIED
        })
    }
}
