use serde::{ Serialize, Deserialize };

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernmentService {
    pub name: String,
    pub department: String,
    pub process_steps: Vec<String>,
    pub required_documents: Vec<String>,
    pub fees: String,
    pub processing_time: String,
    pub contact: String,
    pub online_link: Option<String>,
}

/// Row of the `/services` listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub id: String,
    pub name: String,
    pub department: String,
    pub fees: String,
}

/// Body of `/services/{id}`: the record plus its identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDetail {
    pub id: String,
    #[serde(flatten)]
    pub service: GovernmentService,
}
