//! Static map images.

use crate::convert::{self, Location};
use crate::metadata::RequestMetadata;
use crate::{ByteStream, Client, Error, Result};
use std::fmt;

/// Image format of a static map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png8,
    Png,
    Png32,
    Gif,
    Jpg,
    JpgBaseline,
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageFormat::Png8 => "png8",
            ImageFormat::Png => "png",
            ImageFormat::Png32 => "png32",
            ImageFormat::Gif => "gif",
            ImageFormat::Jpg => "jpg",
            ImageFormat::JpgBaseline => "jpg-baseline",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapType {
    Roadmap,
    Satellite,
    Terrain,
    Hybrid,
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MapType::Roadmap => "roadmap",
            MapType::Satellite => "satellite",
            MapType::Terrain => "terrain",
            MapType::Hybrid => "hybrid",
        })
    }
}

/// A static map request.
///
/// Markers, paths and styles are given in the service's own
/// `key:value|key:value` syntax, one string per `markers`, `path` or
/// `style` parameter.
///
/// # Examples
///
/// ```
/// use mapcall::api::maps::{MapType, StaticMapRequest};
///
/// let request = StaticMapRequest::new(400, 400)
///     .center("Brooklyn Bridge, New York, NY")
///     .zoom(13)
///     .maptype(MapType::Roadmap)
///     .build()?;
///
/// assert_eq!(request.path, "/maps/api/staticmap");
/// # Ok::<(), mapcall::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct StaticMapRequest {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Map center.
    pub center: Option<Location>,
    /// Zoom level.
    pub zoom: Option<u8>,
    /// Pixel density multiplier.
    pub scale: Option<u8>,
    /// Image format.
    pub format: Option<ImageFormat>,
    /// Map type.
    pub maptype: Option<MapType>,
    /// Language of the labels.
    pub language: Option<String>,
    /// Border policy region, as a ccTLD.
    pub region: Option<String>,
    /// Marker groups.
    pub markers: Vec<String>,
    /// Paths.
    pub path: Vec<String>,
    /// Locations that must stay visible.
    pub visible: Vec<Location>,
    /// Style rules.
    pub style: Vec<String>,
}

impl StaticMapRequest {
    /// A `width` by `height` map.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            center: None,
            zoom: None,
            scale: None,
            format: None,
            maptype: None,
            language: None,
            region: None,
            markers: Vec::new(),
            path: Vec::new(),
            visible: Vec::new(),
            style: Vec::new(),
        }
    }

    /// Centers the map.
    pub fn center(mut self, center: impl Into<Location>) -> Self {
        self.center = Some(center.into());
        self
    }

    /// Sets the zoom level.
    pub fn zoom(mut self, zoom: u8) -> Self {
        self.zoom = Some(zoom);
        self
    }

    /// Sets the pixel density multiplier (1, 2 or 4).
    pub fn scale(mut self, scale: u8) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Sets the image format.
    pub fn format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Sets the map type.
    pub fn maptype(mut self, maptype: MapType) -> Self {
        self.maptype = Some(maptype);
        self
    }

    /// Sets the language of the labels.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Applies a region's border policy.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Adds a marker group, e.g. `color:blue|label:S|40.702147,-74.015794`.
    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.markers.push(marker.into());
        self
    }

    /// Adds a path, e.g. `color:0x0000ff|weight:5|40.737102,-73.990318|40.749825,-73.987963`.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path.push(path.into());
        self
    }

    /// Adds a location that must stay visible.
    pub fn visible(mut self, location: impl Into<Location>) -> Self {
        self.visible.push(location.into());
        self
    }

    /// Adds a style rule, e.g. `feature:road.local|element:geometry|color:0x00ff00`.
    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style.push(style.into());
        self
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Without markers, a center or a zoom is required to frame the map.
    pub fn build(&self) -> Result<RequestMetadata> {
        if self.markers.is_empty() && self.center.is_none() && self.zoom.is_none() {
            return Err(Error::InvalidArgument(
                "a center or zoom is required when markers is not specified".to_string(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidArgument(format!(
                "Invalid size {}",
                convert::size(self.width, self.height)
            )));
        }
        let visible =
            (!self.visible.is_empty()).then(|| convert::location_list(&self.visible));

        let request = RequestMetadata::new("/maps/api/staticmap")
            .with_param("size", convert::size(self.width, self.height))
            .with_optional_param("center", self.center.as_ref())
            .with_optional_param("zoom", self.zoom)
            .with_optional_param("scale", self.scale)
            .with_optional_param("format", self.format)
            .with_optional_param("maptype", self.maptype)
            .with_optional_param("language", self.language.as_ref())
            .with_optional_param("region", self.region.as_ref())
            .with_optional_param("visible", visible);

        let request = self
            .markers
            .iter()
            .fold(request, |request, marker| request.with_param("markers", marker));
        let request = self
            .path
            .iter()
            .fold(request, |request, path| request.with_param("path", path));
        Ok(self
            .style
            .iter()
            .fold(request, |request, style| request.with_param("style", style)))
    }
}

impl Client {
    /// Downloads a static map image.
    pub async fn static_map(&self, request: &StaticMapRequest) -> Result<ByteStream> {
        Ok(self.execute_raw(request.build()?).await?.into_data())
    }
}
