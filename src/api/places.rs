//! Places: find place, text and nearby search, autocomplete, place details
//! and place photos.

use super::{take_field, take_list};
use crate::convert::{self, Location};
use crate::metadata::RequestMetadata;
use crate::{ByteStream, Client, Error, Result};
use serde_json::Value;
use std::fmt;

/// How the `input` of a find place request is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    TextQuery,
    PhoneNumber,
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InputType::TextQuery => "textquery",
            InputType::PhoneNumber => "phonenumber",
        })
    }
}

const LOCATION_BIAS_PREFIXES: [&str; 4] = ["ipbias", "point", "circle", "rectangle"];

/// A find place request.
///
/// # Examples
///
/// ```
/// use mapcall::api::places::{FindPlaceRequest, InputType};
///
/// let request = FindPlaceRequest::new("Google Sydney", InputType::TextQuery)
///     .field("place_id")
///     .field("name")
///     .location_bias("point:-33.8,151.2")
///     .build()?;
///
/// assert_eq!(request.path, "/maps/api/place/findplacefromtext/json");
/// # Ok::<(), mapcall::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct FindPlaceRequest {
    /// The text or phone number to look for.
    pub input: String,

    /// How `input` is interpreted.
    pub input_type: InputType,

    /// Fields to return. The service picks a default set when empty.
    pub fields: Vec<String>,

    /// Where to bias results, in the service's `kind:value` syntax.
    pub location_bias: Option<String>,

    /// Language of the returned text.
    pub language: Option<String>,
}

impl FindPlaceRequest {
    /// Finds a place by text or phone number.
    pub fn new(input: impl Into<String>, input_type: InputType) -> Self {
        Self {
            input: input.into(),
            input_type,
            fields: Vec::new(),
            location_bias: None,
            language: None,
        }
    }

    /// Adds a field to return, such as `formatted_address` or `geometry`.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    /// Biases results, e.g. `ipbias`, `point:lat,lng`,
    /// `circle:radius@lat,lng` or `rectangle:south,west|north,east`.
    pub fn location_bias(mut self, bias: impl Into<String>) -> Self {
        self.location_bias = Some(bias.into());
        self
    }

    /// Sets the language of the returned text.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when the location bias has an
    /// unknown prefix.
    pub fn build(&self) -> Result<RequestMetadata> {
        if let Some(bias) = &self.location_bias {
            let kind = bias.split(':').next().unwrap_or_default();
            if !LOCATION_BIAS_PREFIXES.contains(&kind) {
                return Err(Error::InvalidArgument(format!(
                    "location_bias should be prefixed with one of: {}",
                    LOCATION_BIAS_PREFIXES.join(", ")
                )));
            }
        }
        let fields = (!self.fields.is_empty()).then(|| convert::join_list(",", &self.fields));

        Ok(RequestMetadata::new("/maps/api/place/findplacefromtext/json")
            .with_param("input", &self.input)
            .with_param("inputtype", self.input_type)
            .with_optional_param("fields", fields)
            .with_optional_param("locationbias", self.location_bias.as_ref())
            .with_optional_param("language", self.language.as_ref()))
    }
}

/// A place details request.
#[derive(Debug, Clone)]
pub struct PlaceRequest {
    /// The place to describe.
    pub place_id: String,

    /// Fields to return. The service returns every field when empty.
    pub fields: Vec<String>,

    /// Language of the returned text.
    pub language: Option<String>,

    /// Autocomplete session this lookup concludes.
    pub session_token: Option<String>,
}

impl PlaceRequest {
    /// Describes the place with the given id.
    pub fn new(place_id: impl Into<String>) -> Self {
        Self {
            place_id: place_id.into(),
            fields: Vec::new(),
            language: None,
            session_token: None,
        }
    }

    /// Adds a field to return, such as `opening_hours`.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    /// Sets the language of the returned text.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Groups this lookup with preceding autocomplete requests for billing.
    pub fn session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Builds the request.
    pub fn build(&self) -> RequestMetadata {
        let fields = (!self.fields.is_empty()).then(|| convert::join_list(",", &self.fields));
        RequestMetadata::new("/maps/api/place/details/json")
            .with_param("placeid", &self.place_id)
            .with_optional_param("fields", fields)
            .with_optional_param("language", self.language.as_ref())
            .with_optional_param("sessiontoken", self.session_token.as_ref())
    }
}

/// A place photo request. At least one of the size bounds is required.
#[derive(Debug, Clone)]
pub struct PhotoRequest {
    /// Reference from a search or details response.
    pub photo_reference: String,

    /// Maximum width in pixels, from 1 to 1600.
    pub max_width: Option<u32>,

    /// Maximum height in pixels, from 1 to 1600.
    pub max_height: Option<u32>,
}

impl PhotoRequest {
    /// Downloads the photo with the given reference.
    pub fn new(photo_reference: impl Into<String>) -> Self {
        Self {
            photo_reference: photo_reference.into(),
            max_width: None,
            max_height: None,
        }
    }

    /// Scales the photo down to at most `width` pixels wide.
    pub fn max_width(mut self, width: u32) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Scales the photo down to at most `height` pixels high.
    pub fn max_height(mut self, height: u32) -> Self {
        self.max_height = Some(height);
        self
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when neither size bound is set.
    pub fn build(&self) -> Result<RequestMetadata> {
        if self.max_width.is_none() && self.max_height.is_none() {
            return Err(Error::InvalidArgument(
                "a max_width or max_height is required".to_string(),
            ));
        }
        Ok(RequestMetadata::new("/maps/api/place/photo")
            .with_param("photoreference", &self.photo_reference)
            .with_optional_param("maxwidth", self.max_width)
            .with_optional_param("maxheight", self.max_height))
    }
}

/// How nearby search results are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    Prominence,
    Distance,
}

impl fmt::Display for RankBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RankBy::Prominence => "prominence",
            RankBy::Distance => "distance",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchKind {
    Text,
    Nearby,
}

/// A text or nearby places search.
///
/// # Examples
///
/// ```
/// use mapcall::api::places::{PlacesSearchRequest, RankBy};
///
/// let request = PlacesSearchRequest::nearby()
///     .location((-33.86746, 151.207090))
///     .keyword("coffee")
///     .rank_by(RankBy::Distance)
///     .build()?;
///
/// assert_eq!(request.path, "/maps/api/place/nearbysearch/json");
/// # Ok::<(), mapcall::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct PlacesSearchRequest {
    kind: SearchKind,

    /// Free text to search for. Text search only.
    pub query: Option<String>,

    /// Point to search around.
    pub location: Option<Location>,

    /// Search radius in meters.
    pub radius: Option<u32>,

    /// Term matched against everything indexed for a place.
    pub keyword: Option<String>,

    /// Language of the returned text.
    pub language: Option<String>,

    /// Lowest price level, from 0 to 4.
    pub min_price: Option<u8>,

    /// Highest price level, from 0 to 4.
    pub max_price: Option<u8>,

    /// Terms matched against place names.
    pub name: Vec<String>,

    /// Only return places open right now.
    pub open_now: bool,

    /// Result ordering. Nearby search only.
    pub rank_by: Option<RankBy>,

    /// Place type to restrict results to, such as `restaurant`.
    pub place_type: Option<String>,

    /// Region bias, as a ccTLD.
    pub region: Option<String>,

    /// Token from a previous response, to fetch the next page.
    pub page_token: Option<String>,
}

impl PlacesSearchRequest {
    fn empty(kind: SearchKind) -> Self {
        Self {
            kind,
            query: None,
            location: None,
            radius: None,
            keyword: None,
            language: None,
            min_price: None,
            max_price: None,
            name: Vec::new(),
            open_now: false,
            rank_by: None,
            place_type: None,
            region: None,
            page_token: None,
        }
    }

    /// Searches for places matching free text, like "restaurants in Sydney".
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::empty(SearchKind::Text)
        }
    }

    /// Searches around a location. Needs a location or a page token.
    pub fn nearby() -> Self {
        Self::empty(SearchKind::Nearby)
    }

    /// Sets the point to search around.
    pub fn location(mut self, location: impl Into<Location>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the search radius in meters.
    pub fn radius(mut self, radius: u32) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Matches a term against everything indexed for a place.
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Sets the language of the returned text.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Restricts results to a price range.
    pub fn price_range(mut self, min_price: u8, max_price: u8) -> Self {
        self.min_price = Some(min_price);
        self.max_price = Some(max_price);
        self
    }

    /// Adds a term matched against place names.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name.push(name.into());
        self
    }

    /// Only returns places open right now.
    pub fn open_now(mut self, open_now: bool) -> Self {
        self.open_now = open_now;
        self
    }

    /// Sets the result ordering.
    pub fn rank_by(mut self, rank_by: RankBy) -> Self {
        self.rank_by = Some(rank_by);
        self
    }

    /// Restricts results to a place type.
    pub fn place_type(mut self, place_type: impl Into<String>) -> Self {
        self.place_type = Some(place_type.into());
        self
    }

    /// Biases results towards a region.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Fetches the page following a previous response.
    pub fn page_token(mut self, page_token: impl Into<String>) -> Self {
        self.page_token = Some(page_token.into());
        self
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// A nearby search needs a location or a page token. Ranking by distance
    /// needs a keyword, name or type, and rules out a radius.
    pub fn build(&self) -> Result<RequestMetadata> {
        if self.kind == SearchKind::Nearby {
            if self.location.is_none() && self.page_token.is_none() {
                return Err(Error::InvalidArgument(
                    "either a location or page_token is required".to_string(),
                ));
            }
            if self.rank_by == Some(RankBy::Distance) {
                if self.keyword.is_none() && self.name.is_empty() && self.place_type.is_none() {
                    return Err(Error::InvalidArgument(
                        "either a keyword, name, or type is required when rank_by is distance"
                            .to_string(),
                    ));
                }
                if self.radius.is_some() {
                    return Err(Error::InvalidArgument(
                        "radius cannot be specified when rank_by is distance".to_string(),
                    ));
                }
            }
        }

        let path = match self.kind {
            SearchKind::Text => "/maps/api/place/textsearch/json",
            SearchKind::Nearby => "/maps/api/place/nearbysearch/json",
        };
        let name = (!self.name.is_empty()).then(|| convert::join_list(" ", &self.name));

        Ok(RequestMetadata::new(path)
            .with_optional_param("query", self.query.as_ref())
            .with_optional_param("location", self.location.as_ref())
            .with_optional_param("radius", self.radius)
            .with_optional_param("keyword", self.keyword.as_ref())
            .with_optional_param("language", self.language.as_ref())
            .with_optional_param("minprice", self.min_price)
            .with_optional_param("maxprice", self.max_price)
            .with_optional_param("name", name)
            .with_optional_param("opennow", self.open_now.then_some("true"))
            .with_optional_param("rankby", self.rank_by)
            .with_optional_param("type", self.place_type.as_ref())
            .with_optional_param("region", self.region.as_ref())
            .with_optional_param("pagetoken", self.page_token.as_ref()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AutocompleteKind {
    Place,
    Query,
}

/// A place or query autocomplete request.
///
/// Query autocomplete only takes the input, offset, location, radius and
/// language.
#[derive(Debug, Clone)]
pub struct AutocompleteRequest {
    kind: AutocompleteKind,

    /// What the user has typed so far.
    pub input: String,

    /// Billing session shared with the place details lookup that follows.
    pub session_token: Option<String>,

    /// Position of the last character of `input` to match on.
    pub offset: Option<u32>,

    /// Point to bias predictions towards.
    pub location: Option<Location>,

    /// Bias radius in meters.
    pub radius: Option<u32>,

    /// Language of the returned text.
    pub language: Option<String>,

    /// Prediction types, such as `geocode` or `establishment`.
    pub types: Option<String>,

    /// Countries to restrict predictions to, as ISO 3166-1 codes.
    pub countries: Vec<String>,

    /// Only return predictions inside `location` and `radius`.
    pub strict_bounds: bool,
}

impl AutocompleteRequest {
    fn empty(kind: AutocompleteKind, input: String) -> Self {
        Self {
            kind,
            input,
            session_token: None,
            offset: None,
            location: None,
            radius: None,
            language: None,
            types: None,
            countries: Vec::new(),
            strict_bounds: false,
        }
    }

    /// Predicts places for partial input.
    pub fn new(input: impl Into<String>) -> Self {
        Self::empty(AutocompleteKind::Place, input.into())
    }

    /// Predicts search queries, such as "pizza near New York".
    pub fn query(input: impl Into<String>) -> Self {
        Self::empty(AutocompleteKind::Query, input.into())
    }

    /// Sets the billing session token.
    pub fn session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Matches only up to this character of the input.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Biases predictions towards a point.
    pub fn location(mut self, location: impl Into<Location>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the bias radius in meters.
    pub fn radius(mut self, radius: u32) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Sets the language of the returned text.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Restricts prediction types.
    pub fn types(mut self, types: impl Into<String>) -> Self {
        self.types = Some(types.into());
        self
    }

    /// Adds a country to restrict predictions to.
    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.countries.push(country.into());
        self
    }

    /// Drops predictions outside the location and radius.
    pub fn strict_bounds(mut self, strict: bool) -> Self {
        self.strict_bounds = strict;
        self
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when a query autocomplete sets an
    /// option only place autocomplete supports.
    pub fn build(&self) -> Result<RequestMetadata> {
        let place_only = self.session_token.is_some()
            || self.types.is_some()
            || !self.countries.is_empty()
            || self.strict_bounds;
        if self.kind == AutocompleteKind::Query && place_only {
            return Err(Error::InvalidArgument(
                "session_token, types, countries and strict_bounds are only supported by place autocomplete"
                    .to_string(),
            ));
        }

        let path = match self.kind {
            AutocompleteKind::Place => "/maps/api/place/autocomplete/json",
            AutocompleteKind::Query => "/maps/api/place/queryautocomplete/json",
        };
        let components = (!self.countries.is_empty()).then(|| {
            convert::components(self.countries.iter().map(|country| ("country", country)))
        });

        Ok(RequestMetadata::new(path)
            .with_param("input", &self.input)
            .with_optional_param("sessiontoken", self.session_token.as_ref())
            .with_optional_param("offset", self.offset)
            .with_optional_param("location", self.location.as_ref())
            .with_optional_param("radius", self.radius)
            .with_optional_param("language", self.language.as_ref())
            .with_optional_param("types", self.types.as_ref())
            .with_optional_param("components", components)
            .with_optional_param("strictbounds", self.strict_bounds.then_some("true")))
    }
}

impl Client {
    /// Runs a find place request, returning the whole body.
    pub async fn find_place(&self, request: &FindPlaceRequest) -> Result<Value> {
        Ok(self.execute(request.build()?).await?.into_data())
    }

    /// Runs a text or nearby search, returning the whole body so
    /// `next_page_token` stays available.
    pub async fn places(&self, request: &PlacesSearchRequest) -> Result<Value> {
        Ok(self.execute(request.build()?).await?.into_data())
    }

    /// Runs an autocomplete request, returning the `predictions` list.
    pub async fn places_autocomplete(&self, request: &AutocompleteRequest) -> Result<Vec<Value>> {
        let response = self.execute(request.build()?).await?;
        Ok(take_list(response.into_data(), "predictions"))
    }

    /// Runs a place details request, returning the `result` object.
    pub async fn place(&self, request: &PlaceRequest) -> Result<Value> {
        let response = self.execute(request.build()).await?;
        Ok(take_field(response.into_data(), "result"))
    }

    /// Downloads a place photo.
    pub async fn places_photo(&self, request: &PhotoRequest) -> Result<ByteStream> {
        Ok(self.execute_raw(request.build()?).await?.into_data())
    }
}
