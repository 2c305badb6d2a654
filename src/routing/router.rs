//! Routing decisions for directory and layer requests.
//!
//! # Responsibilities
//! - Substitute fixed device positions and resolve the request's area
//! - Decide between pass-through, default layer, redirect and layer fetch
//! - Perform the origin exchanges a decision needs
//! - Shift returned hotspots back onto the client's true position
//! - Fire the statistics hit once the response is final
//!
//! # Design Decisions
//! - Shared state lives in an immutable `RelayContext` behind an `Arc`
//! - At most two origin exchanges per request (directory, then default layer)
//! - No partial document is ever returned; any patch failure is an error
//! - `HostName` has no default; an unset origin host fails every request

use std::sync::Arc;

use crate::config::{ClientConfig, RelayConfig, Settings, ThresholdConfig};
use crate::document::fragment::replace_string_field;
use crate::document::HotspotDocument;
use crate::geo::{apply_override, reverse_shift, CoordinateDelta, DeviceOverrides};
use crate::net::transport::{directory_agent, layer_agent, relay_agent};
use crate::net::{HttpExchange, Transport};
use crate::observability::{Hit, HitRecorder, MetricsHitRecorder};
use crate::routing::area::{resolve_area, AreaSettings};
use crate::routing::client::{ClientFamily, ClientProfile};
use crate::routing::query::Query;
use crate::routing::RelayError;

const UNKNOWN_USER: &str = "UnknownUserId";
const ORIGIN_POSITION: &str = "0.000000";

const DEFAULT_PORT: &str = "80";
const DEFAULT_DIRECTORY_URI: &str = "/php/dir/web/porpoise.php";
const DEFAULT_LAYER_URI: &str = "/php/porpoise/web/porpoise.php";
const DEFAULT_LAYER_NAME: &str = "Default-Layer-Reign-of-Gold";
const DEFAULT_IMAGE_TRIGGER_LAYER: &str = "Default-ImageTrigger";
const DEFAULT_SLAM_LAYER: &str = "Default-Slam";

const REDIRECTION_URL_FIELD: &str = "\"redirectionUrl\":";
const REDIRECTION_LAYER_FIELD: &str = "\"redirectionLayer\":";
const SHOW_MENU_FIELD: &str = "\"showMenuButton\":";

/// What to send back for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Return the directory reply as it is.
    PassThrough(HttpExchange),
    /// Fetch a default layer and return it.
    DefaultLayer {
        url: String,
        name: String,
        hide_menu: bool,
    },
    /// Point the client at the first hotspot's layer.
    Redirect {
        url: String,
        name: String,
        exchange: HttpExchange,
    },
    /// Fetch the requested layer directly.
    LayerRequest { url: String },
}

impl RoutingDecision {
    pub fn kind(&self) -> &'static str {
        match self {
            RoutingDecision::PassThrough(_) => "pass_through",
            RoutingDecision::DefaultLayer { .. } => "default_layer",
            RoutingDecision::Redirect { .. } => "redirect",
            RoutingDecision::LayerRequest { .. } => "layer",
        }
    }
}

/// Final response of the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub cookie: Option<String>,
    pub body: String,
    pub kind: &'static str,
}

/// Process-wide state shared by every request.
pub struct RelayContext {
    settings: Settings,
    overrides: DeviceOverrides,
    transport: Transport,
    clients: ClientConfig,
    thresholds: ThresholdConfig,
    hits: Arc<dyn HitRecorder>,
}

impl RelayContext {
    pub fn new(config: &RelayConfig) -> Self {
        let settings = Settings::from_config(&config.settings);
        let overrides = DeviceOverrides::new(settings.get("DevicePosition").map(str::to_string));
        Self {
            settings,
            overrides,
            transport: Transport::new(&config.transport),
            clients: config.clients.clone(),
            thresholds: config.thresholds.clone(),
            hits: Arc::new(MetricsHitRecorder),
        }
    }

    /// Replace the statistics sink.
    pub fn with_hit_recorder(mut self, hits: Arc<dyn HitRecorder>) -> Self {
        self.hits = hits;
        self
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// Everything resolved about one request before any origin exchange.
struct Plan<'a> {
    query: Query,
    delta: CoordinateDelta,
    scope: AreaSettings<'a>,
    host: String,
    port: u16,
    user_id: String,
    family: ClientFamily,
    profile: ClientProfile,
}

/// Request router.
#[derive(Clone)]
pub struct Router {
    context: Arc<RelayContext>,
}

impl Router {
    pub fn new(context: Arc<RelayContext>) -> Self {
        Self { context }
    }

    /// Answer one inbound query string.
    pub async fn handle(&self, raw_query: &str) -> Result<RelayResponse, RelayError> {
        let inbound = Query::parse(raw_query);
        let mut plan = self.plan(&inbound)?;

        let layer_name = inbound.get("layerName").map(str::to_string);
        let decision = if layer_name.as_deref() == Some(self.context.clients.directory_layer.as_str()) {
            self.decide_directory(&mut plan).await?
        } else {
            let url = required(&plan.scope, "PorpoiseUri", DEFAULT_LAYER_URI)?;
            RoutingDecision::LayerRequest { url }
        };
        let kind = decision.kind();
        tracing::info!(decision = kind, area = ?plan.scope.area(), "Routing decision");

        let mut hit = Hit {
            os: inbound.get("os").map(str::to_string),
            bundle: inbound.get("bundle").map(str::to_string),
            lat: inbound.get("lat").map(str::to_string),
            lon: inbound.get("lon").map(str::to_string),
            layer_name,
            ..Hit::default()
        };

        let exchange = match decision {
            RoutingDecision::PassThrough(exchange) => exchange,
            RoutingDecision::Redirect { url, name, exchange } => {
                let body = replace_string_field(exchange.body(), REDIRECTION_URL_FIELD, &url)?;
                let body = replace_string_field(&body, REDIRECTION_LAYER_FIELD, &name)?;
                tracing::info!(url = %url, layer = %name, "Redirecting client");
                hit.layer_name = Some(name);
                hit.redirected = true;
                exchange.with_body(body)
            }
            RoutingDecision::DefaultLayer { url, name, hide_menu } => {
                let exchange = self.fetch_default_layer(&mut plan, &url, &name).await?;
                hit.layer_name = Some(name);
                hit.served = true;
                if hide_menu {
                    let body = replace_string_field(exchange.body(), SHOW_MENU_FIELD, "false")?;
                    exchange.with_body(body)
                } else {
                    exchange
                }
            }
            RoutingDecision::LayerRequest { url } => {
                let path = origin_path(&url, &plan.query);
                hit.served = true;
                self.context
                    .transport
                    .exchange(&plan.host, plan.port, &path, &layer_agent())
                    .await?
            }
        };

        let (cookie, body) = exchange.into_parts();
        let body = shift_document(body, plan.delta)?;

        if inbound.get("count") == Some("1") {
            self.context.hits.record(&hit);
        }

        Ok(RelayResponse { cookie, body, kind })
    }

    /// Apply the device override, resolve the area and the origin address.
    fn plan<'a>(&'a self, inbound: &Query) -> Result<Plan<'a>, RelayError> {
        let ctx = &self.context;
        let user_id = inbound.non_blank("userId").unwrap_or(UNKNOWN_USER).to_string();

        let mut query = inbound.clone();
        let mut delta = CoordinateDelta::IDENTITY;
        if let Some(position) = ctx.overrides.resolve(&user_id) {
            delta = apply_override(&mut query, &position.lat, &position.lon);
            tracing::debug!(user_id = %user_id, delta = %delta, "Applied device position");
        }

        let area = resolve_area(&ctx.settings, &query);

        // An inner layer of a default layer was requested at the origin position;
        // the override never moved it, so the delta is already zero.
        if inbound.get("innerLayer") == Some("true")
            && inbound.get("lat") == Some(ORIGIN_POSITION)
            && inbound.get("lon") == Some(ORIGIN_POSITION)
        {
            query = inbound.clone();
        }

        let scope = AreaSettings::new(&ctx.settings, area);

        let host = required(&scope, "HostName", "")?;
        let port = match scope.resolve("Port", DEFAULT_PORT) {
            Some(value) => parse_port(&value)?,
            None => 80,
        };
        // Presence is checked up front for every request.
        required(&scope, "DirectoryUri", DEFAULT_DIRECTORY_URI)?;

        Ok(Plan {
            family: ClientFamily::lookup(&ctx.clients, inbound.get("client")),
            profile: ClientProfile::from_query(inbound),
            query,
            delta,
            scope,
            host,
            port,
            user_id,
        })
    }

    async fn decide_directory(&self, plan: &mut Plan<'_>) -> Result<RoutingDecision, RelayError> {
        let ctx = &self.context;
        match plan.family {
            ClientFamily::ImageTrigger => {
                if !plan.profile.meets(&ctx.thresholds.image_trigger_directory) {
                    return Ok(self.family_default_layer(plan));
                }
                plan.query
                    .replace("layerName", &ctx.clients.image_trigger_directory_layer);
            }
            ClientFamily::Slam => return Ok(self.family_default_layer(plan)),
            ClientFamily::Generic => {}
        }

        let directory_uri = required(&plan.scope, "DirectoryUri", DEFAULT_DIRECTORY_URI)?;
        let path = origin_path(&directory_uri, &plan.query);
        let exchange = ctx
            .transport
            .exchange(&plan.host, plan.port, &path, &directory_agent(&plan.user_id))
            .await?;

        let Some(document) = HotspotDocument::parse(exchange.body())? else {
            tracing::debug!("Directory reply is not a hotspot document");
            return Ok(RoutingDecision::PassThrough(exchange));
        };

        let count = document.hotspot_count();
        tracing::debug!(count, "Directory hotspots");

        if count == 0 {
            return Ok(match plan.family {
                ClientFamily::Generic => self.generic_default_layer(plan),
                _ => self.family_default_layer(plan),
            });
        }

        if count > 1 && plan.profile.meets(&ctx.thresholds.multi_hotspot) {
            return Ok(RoutingDecision::PassThrough(exchange));
        }

        match (document.first_base_url(), document.first_title()) {
            (Some(url), Some(name)) => Ok(RoutingDecision::Redirect { url, name, exchange }),
            (url, _) => {
                tracing::debug!(has_url = url.is_some(), "First hotspot lacks baseURL or title");
                Ok(RoutingDecision::PassThrough(exchange))
            }
        }
    }

    /// Default layer of the image-trigger or slam family.
    fn family_default_layer(&self, plan: &Plan<'_>) -> RoutingDecision {
        let clients = &self.context.clients;
        let prefix = plan.family.settings_prefix(clients).unwrap_or_default();
        let (fallback, hide_menu) = match plan.family {
            ClientFamily::Slam => (DEFAULT_SLAM_LAYER, true),
            _ => (DEFAULT_IMAGE_TRIGGER_LAYER, false),
        };

        let url = plan
            .scope
            .resolve(&format!("{prefix}DefaultLayerUrl"), DEFAULT_LAYER_URI)
            .unwrap_or_else(|| DEFAULT_LAYER_URI.to_string());
        let name = plan
            .scope
            .resolve(&format!("{prefix}DefaultLayerName"), fallback)
            .unwrap_or_else(|| fallback.to_string());
        RoutingDecision::DefaultLayer { url, name, hide_menu }
    }

    fn generic_default_layer(&self, plan: &Plan<'_>) -> RoutingDecision {
        let url = plan
            .scope
            .resolve("DefaultLayerUrl", DEFAULT_LAYER_URI)
            .unwrap_or_else(|| DEFAULT_LAYER_URI.to_string());
        let mut name = plan
            .scope
            .resolve("DefaultLayerName", DEFAULT_LAYER_NAME)
            .unwrap_or_else(|| DEFAULT_LAYER_NAME.to_string());

        if plan.profile.meets(&self.context.thresholds.newer_default_layer) {
            if let Some(newer) = plan.scope.resolve("DefaultLayerName190310", "") {
                name = newer;
            }
        }
        RoutingDecision::DefaultLayer {
            url,
            name,
            hide_menu: false,
        }
    }

    /// Request a default layer recentred on the origin position.
    async fn fetch_default_layer(
        &self,
        plan: &mut Plan<'_>,
        url: &str,
        name: &str,
    ) -> Result<HttpExchange, RelayError> {
        let mut query = plan.query.clone();
        query.replace("layerName", name);
        plan.delta += apply_override(&mut query, ORIGIN_POSITION, ORIGIN_POSITION);
        tracing::info!(url = %url, layer = %name, delta = %plan.delta, "Serving default layer");

        let path = origin_path(url, &query);
        Ok(self
            .context
            .transport
            .exchange(&plan.host, plan.port, &path, &relay_agent())
            .await?)
    }
}

/// `<uri>?p=<pid>&<query>`.
fn origin_path(uri: &str, query: &Query) -> String {
    format!("{}?p={}&{}", uri, std::process::id(), query)
}

fn required(scope: &AreaSettings<'_>, key: &str, default: &str) -> Result<String, RelayError> {
    scope
        .resolve(key, default)
        .ok_or_else(|| RelayError::Config(format!("{key} must be given")))
}

/// Leading integer of a port setting; anything below 1 is rejected.
fn parse_port(value: &str) -> Result<u16, RelayError> {
    let trimmed = value.trim();
    let digits_end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    let port: i64 = trimmed[..digits_end].parse().unwrap_or(0);
    if port < 1 {
        return Err(RelayError::Config(format!("bad port {port}")));
    }
    u16::try_from(port).map_err(|_| RelayError::Config(format!("bad port {port}")))
}

/// Shift every hotspot of a hotspot document back by `delta`.
fn shift_document(body: String, delta: CoordinateDelta) -> Result<String, RelayError> {
    let Some(document) = HotspotDocument::parse(&body)? else {
        return Ok(body);
    };
    if delta.is_identity() {
        return Ok(body);
    }
    let document = document.try_map_fragments(|fragment| reverse_shift(fragment, delta))?;
    tracing::debug!(delta = %delta, hotspots = document.fragments().len(), "Shifted hotspots");
    Ok(document.reassemble())
}
