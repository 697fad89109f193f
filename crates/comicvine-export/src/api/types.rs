//! Comic Vine API response types.
//!
//! These types represent the JSON responses from the Comic Vine API. Only the
//! fields this tool reads are modelled.

use serde::{de, Deserialize, Serialize};

/// `status_code` value Comic Vine uses for a successful response
pub const STATUS_OK: i64 = 1;

/// `status_code` value Comic Vine uses when the API key exceeded its quota
pub const STATUS_RATE_LIMITED: i64 = 107;

/// Envelope wrapping every Comic Vine response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status_code: i64,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub number_of_total_results: Option<u32>,
    #[serde(default)]
    pub number_of_page_results: Option<u32>,
    pub results: T,
}

/// Entry of the issue list endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueSummary {
    pub id: u32,
}

/// One page of the issue list
#[derive(Debug, Clone)]
pub struct PageResult {
    pub results: Vec<IssueSummary>,
    /// Total matching issues declared by the server
    pub total_results: u32,
    /// Items the server says it returned in this page
    pub page_results_count: u32,
}

impl TryFrom<Envelope<Vec<IssueSummary>>> for PageResult {
    type Error = serde_json::Error;

    /// List pages must declare both counts; pagination cannot advance without them
    fn try_from(envelope: Envelope<Vec<IssueSummary>>) -> Result<Self, Self::Error> {
        let total_results = envelope
            .number_of_total_results
            .ok_or_else(|| <serde_json::Error as de::Error>::missing_field("number_of_total_results"))?;
        let page_results_count = envelope
            .number_of_page_results
            .ok_or_else(|| <serde_json::Error as de::Error>::missing_field("number_of_page_results"))?;

        Ok(Self {
            results: envelope.results,
            total_results,
            page_results_count,
        })
    }
}

/// Search hit for a volume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeSummary {
    pub id: u32,
    pub name: String,
}

/// Volume details (only the fields requested via `field_list`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub publisher: Option<Publisher>,
}

impl VolumeDetails {
    /// Publisher name, if the volume has one
    pub fn publisher_name(&self) -> Option<&str> {
        self.publisher.as_ref().and_then(|p| p.name.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publisher {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Full issue details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueDetails {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub issue_number: Option<String>,
    #[serde(default)]
    pub cover_date: Option<String>,
    #[serde(default)]
    pub store_date: Option<String>,
    /// Short summary; exported as the key issue notes
    #[serde(default)]
    pub deck: Option<String>,
    #[serde(default)]
    pub person_credits: Option<Vec<PersonCredit>>,
}

impl IssueDetails {
    /// Credits as a slice, treating a null list as empty
    pub fn credits(&self) -> &[PersonCredit] {
        self.person_credits.as_deref().unwrap_or_default()
    }
}

/// A creator credited on an issue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonCredit {
    pub name: String,
    #[serde(default)]
    pub role: String,
}
