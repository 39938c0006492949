//! Static table of government services.
//!
//! Built once at startup and shared read-only between request handlers.

use crate::error::ChatError;
use crate::models::service::{ GovernmentService, ServiceDetail, ServiceSummary };

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone)]
pub struct ServiceCatalog {
    // insertion order is the lookup priority
    entries: Vec<(String, GovernmentService)>,
}

impl ServiceCatalog {
    pub fn new(entries: Vec<(String, GovernmentService)>) -> Self {
        Self { entries }
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            (
                "passport_renewal".to_string(),
                GovernmentService {
                    name: "Passport Renewal".to_string(),
                    department: "Immigration Department of Malaysia".to_string(),
                    process_steps: strings(&[
                        "Fill out online application at Immigration Malaysia website",
                        "Pay fees: RM200 (adults), RM100 (children)",
                        "Book appointment at nearest Immigration office",
                        "Attend appointment with required documents",
                        "Collect new passport after 3-5 working days",
                    ]),
                    required_documents: strings(&[
                        "Old passport",
                        "MyKad (original & photocopy)",
                        "Passport-sized photographs (2 pieces)",
                    ]),
                    fees: "RM200 (adults), RM100 (children)".to_string(),
                    processing_time: "3-5 working days".to_string(),
                    contact: "Immigration Department: 03-8880 1000".to_string(),
                    online_link: Some("https://www.imi.gov.my".to_string()),
                },
            ),
            (
                "mykad_renewal".to_string(),
                GovernmentService {
                    name: "MyKad Renewal".to_string(),
                    department: "National Registration Department (JPN)".to_string(),
                    process_steps: strings(&[
                        "Visit any JPN office",
                        "Fill out form JPN.KP02",
                        "Pay RM10 fee",
                        "Submit required documents",
                        "Collect new MyKad same day (1 hour processing)",
                    ]),
                    required_documents: strings(&[
                        "Old/damaged MyKad",
                        "Birth certificate (original)",
                        "Passport-sized photograph (1 piece)",
                    ]),
                    fees: "RM10".to_string(),
                    processing_time: "Same day (1 hour)".to_string(),
                    contact: "JPN Hotline: 03-8880 7077".to_string(),
                    online_link: Some("https://www.jpn.gov.my".to_string()),
                },
            ),
            (
                "driving_license".to_string(),
                GovernmentService {
                    name: "Driving License Renewal".to_string(),
                    department: "Road Transport Department (JPJ)".to_string(),
                    process_steps: strings(&[
                        "Visit JPJ office or authorized center",
                        "Fill application form",
                        "Pay renewal fees",
                        "Update photo if required",
                        "Collect renewed license",
                    ]),
                    required_documents: strings(&[
                        "Current driving license",
                        "MyKad",
                        "Medical certificate (if over 65)",
                    ]),
                    fees: "RM30 (motorcycle), RM150 (car)".to_string(),
                    processing_time: "Same day".to_string(),
                    contact: "JPJ Hotline: 03-8000 8000".to_string(),
                    online_link: Some("https://www.jpj.gov.my".to_string()),
                },
            ),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&GovernmentService> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, service)| service)
    }

    pub fn detail(&self, id: &str) -> Result<ServiceDetail, ChatError> {
        self.get(id)
            .map(|service| ServiceDetail {
                id: id.to_string(),
                service: service.clone(),
            })
            .ok_or_else(|| ChatError::NotFound { resource: "Service", id: id.to_string() })
    }

    pub fn summaries(&self) -> Vec<ServiceSummary> {
        self.entries
            .iter()
            .map(|(id, service)| ServiceSummary {
                id: id.clone(),
                name: service.name.clone(),
                department: service.department.clone(),
                fees: service.fees.clone(),
            })
            .collect()
    }

    /// First service whose spaced key, name or department occurs in the query.
    pub fn find_by_query(&self, query: &str) -> Option<(&str, &GovernmentService)> {
        let query_lower = query.to_lowercase();
        self.entries
            .iter()
            .find(|(key, service)| {
                [
                    key.replace('_', " "),
                    service.name.to_lowercase(),
                    service.department.to_lowercase(),
                ]
                .iter()
                .any(|term| query_lower.contains(term.as_str()))
            })
            .map(|(key, service)| (key.as_str(), service))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Markdown answer for a matched service, Malay headings first as the web client expects.
pub fn render_service_answer(service: &GovernmentService) -> String {
    let mut answer = format!("**{} / {}**\n\n", service.name, service.department);

    answer.push_str("**Langkah / Steps:**\n");
    for (i, step) in service.process_steps.iter().enumerate() {
        answer.push_str(&format!("{}. {}\n", i + 1, step));
    }

    answer.push_str("\n**Dokumen diperlukan / Required documents:**\n");
    for doc in &service.required_documents {
        answer.push_str(&format!("- {}\n", doc));
    }

    answer.push_str(&format!("\n**Yuran / Fees:** {}\n", service.fees));
    answer.push_str(&format!("**Tempoh pemprosesan / Processing time:** {}\n", service.processing_time));
    answer.push_str(&format!("**Hubungi / Contact:** {}\n", service.contact));
    if let Some(link) = &service.online_link {
        answer.push_str(&format!("\n**Rujukan / Reference:** [{}]({})", service.department, link));
    }
    answer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_keeps_order_and_records() {
        let catalog = ServiceCatalog::builtin();
        let ids: Vec<String> = catalog.summaries().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, ["passport_renewal", "mykad_renewal", "driving_license"]);

        let passport = catalog.get("passport_renewal").unwrap();
        assert_eq!(passport.fees, "RM200 (adults), RM100 (children)");
        assert_eq!(passport.department, "Immigration Department of Malaysia");
        assert!(catalog.get("unknown_id").is_none());
    }

    #[test]
    fn matches_on_key_name_or_department() {
        let catalog = ServiceCatalog::builtin();

        let (id, _) = catalog.find_by_query("How do I do a Passport Renewal?").unwrap();
        assert_eq!(id, "passport_renewal");

        let (id, _) = catalog.find_by_query("where is the national registration department (jpn)").unwrap();
        assert_eq!(id, "mykad_renewal");

        let (id, _) = catalog.find_by_query("driving license for my car").unwrap();
        assert_eq!(id, "driving_license");
    }

    #[test]
    fn keyword_alone_is_not_a_match() {
        let catalog = ServiceCatalog::builtin();
        assert!(catalog.find_by_query("renew my passport").is_none());
    }

    #[test]
    fn detail_flattens_record_next_to_id() {
        let detail = ServiceCatalog::builtin().detail("mykad_renewal").unwrap();
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["id"], "mykad_renewal");
        assert_eq!(value["fees"], "RM10");
        assert_eq!(value["process_steps"][1], "Fill out form JPN.KP02");
    }

    #[test]
    fn unknown_id_is_not_found() {
        let err = ServiceCatalog::builtin().detail("driving_test").unwrap_err();
        assert!(matches!(&err, ChatError::NotFound { id, .. } if id == "driving_test"));
        assert_eq!(err.to_string(), "Service not found");
    }

    #[test]
    fn rendered_answer_lists_steps_and_reference() {
        let catalog = ServiceCatalog::builtin();
        let answer = render_service_answer(catalog.get("passport_renewal").unwrap());
        assert!(answer.contains("1. Fill out online application"));
        assert!(answer.contains("- Old passport"));
        assert!(answer.contains("(https://www.imi.gov.my)"));
    }
}
