//! HTTP tile/region source built from URL templates.
//!
//! Tile templates use `{z}`, `{x}`, `{y}`; region templates use `{lon}`,
//! `{lat}`, `{z}`, `{w}`, `{h}`.

use futures_util::future::{BoxFuture, FutureExt};
use reqwest::Client;
use tracing::debug;

use foundation::math::{GeoCoordinate, ZoomLevel};
use streaming::{FetchError, FetchRequest, TileCoord, TileFetcher};

pub struct HttpFetcher {
    client: Client,
    tile_template: String,
    region_template: Option<String>,
}

impl HttpFetcher {
    pub fn new(
        tile_template: impl Into<String>,
        region_template: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("globe/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            tile_template: tile_template.into(),
            region_template,
        })
    }

    fn tile_url(&self, coord: TileCoord) -> String {
        self.tile_template
            .replace("{z}", &coord.z.get().to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
    }

    fn region_url(
        &self,
        center: GeoCoordinate,
        zoom: ZoomLevel,
        width: u32,
        height: u32,
    ) -> Option<String> {
        let template = self.region_template.as_ref()?;
        Some(
            template
                .replace("{lon}", &format!("{:.6}", center.lon))
                .replace("{lat}", &format!("{:.6}", center.lat))
                .replace("{z}", &zoom.get().to_string())
                .replace("{w}", &width.to_string())
                .replace("{h}", &height.to_string()),
        )
    }

    fn url_for(&self, request: FetchRequest) -> Result<String, FetchError> {
        match request {
            FetchRequest::Tile(coord) => Ok(self.tile_url(coord)),
            FetchRequest::Region {
                center,
                zoom,
                width,
                height,
            } => self
                .region_url(center, zoom, width, height)
                .ok_or_else(|| FetchError::Unsupported(request.to_string())),
        }
    }
}

impl TileFetcher for HttpFetcher {
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<Vec<u8>, FetchError>> {
        let url = self.url_for(request);
        async move {
            let url = url?;
            debug!("GET {url}");
            let resp = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            if !resp.status().is_success() {
                return Err(FetchError::Status(resp.status().as_u16()));
            }

            let bytes = resp
                .bytes()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;
            Ok(bytes.to_vec())
        }
        .boxed()
    }
}
