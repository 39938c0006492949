use serde::{ Serialize, Deserialize };

fn default_mode() -> String {
    "public_transport".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JourneyRequest {
    pub origin: String,
    pub destination: String,
    /// public_transport, driving or walking. Accepted but not used by the mocked planner.
    #[serde(default = "default_mode")]
    pub mode: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteOption {
    pub mode: String,
    pub line: String,
    pub duration: String,
    pub steps: Vec<String>,
    pub fare: String,
    pub next_departure: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyPlan {
    pub routes: Vec<RouteOption>,
    pub traffic_info: String,
    pub last_updated: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportStatus {
    pub lrt_status: String,
    pub mrt_status: String,
    pub bus_status: String,
    pub last_updated: String,
}
