use std::fmt::Display;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Error texts the service reports for rejected parameters.
pub mod messages {
    pub const Q_TOO_SHORT: &str = "Параметр 'q' должен быть не менее 3 символов";
    pub const Q_TOO_LONG: &str = "Параметр 'q' должен быть не более 30 символов";
    pub const COUNTRY_CODE: &str =
        "Параметр 'country_code' может быть одним из следующих значений: ru, kg, kz, cz";
    pub const PAGE_NOT_POSITIVE: &str = "Параметр 'page' должен быть больше 0";
    pub const PAGE_NOT_INTEGER: &str = "Параметр 'page' должен быть целым числом";
    pub const PAGE_SIZE: &str =
        "Параметр 'page_size' может быть одним из следующих значений: 5, 10, 15";
}

pub const COUNTRY_CODES: [&str; 4] = ["ru", "kg", "kz", "cz"];
pub const PAGE_SIZES: [usize; 3] = [5, 10, 15];
pub const Q_MIN_CHARS: usize = 3;
pub const Q_MAX_CHARS: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Country {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Region {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub country: Country,
}

/// Successful listing: one page of regions plus the filtered total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RegionsPage {
    pub total: u64,
    pub items: Vec<Region>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
}

/// Validation failure, reported in-body with status 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub error: ErrorBody,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: ErrorBody { message: message.into() } }
    }

    pub fn message(&self) -> &str {
        &self.error.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionsResponse {
    Page(RegionsPage),
    Error(ApiError),
}

impl RegionsResponse {
    pub fn kind(&self) -> &'static str {
        match self {
            RegionsResponse::Page(_) => "listing",
            RegionsResponse::Error(_) => "error",
        }
    }
}

/// Query parameters of the regions endpoint.
///
/// Values stay raw strings so malformed inputs (`page=1.5`, `country_code=asd`)
/// go over the wire exactly as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RegionsQuery {
    /// substring of the region name, 3..=30 characters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    /// ru | kg | kz | cz
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// 1-based page number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    /// 5 | 10 | 15
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<String>,
}

impl RegionsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn q(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = Some(code.into());
        self
    }

    pub fn page(mut self, page: impl Display) -> Self {
        self.page = Some(page.to_string());
        self
    }

    pub fn page_size(mut self, size: impl Display) -> Self {
        self.page_size = Some(size.to_string());
        self
    }

    /// Effective page size if the parameter is a plain integer.
    pub fn requested_page_size(&self) -> Option<usize> {
        self.page_size.as_deref().and_then(|v| v.parse().ok())
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_none() && self.country_code.is_none() && self.page.is_none() && self.page_size.is_none()
    }
}
