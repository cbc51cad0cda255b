use std::time::Duration;

use signcheck_recon::engine::{ReferenceResolver, Resolution};
use signcheck_recon::model::{MatchInfo, Record, ReferenceRecord};

use crate::client::{english_common_name, GbifClient};

/// Pause between lookups unless configured otherwise.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(50);

/// Resolves species-list rows against the GBIF backbone by scientific name.
pub struct GbifResolver {
    client: GbifClient,
    delay: Duration,
    fetch_common_names: bool,
}

impl GbifResolver {
    pub fn new(client: GbifClient) -> Self {
        Self { client, delay: DEFAULT_DELAY, fetch_common_names: true }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_common_names(mut self, fetch: bool) -> Self {
        self.fetch_common_names = fetch;
        self
    }

    fn common_name(&self, usage_key: u64, subject: &Record) -> Option<String> {
        match self.client.vernacular_names(usage_key) {
            Ok(names) => english_common_name(&names).map(String::from),
            Err(e) => {
                tracing::warn!(subject = subject.label(), usage_key, error = %e, "vernacular name lookup failed");
                None
            }
        }
    }
}

impl ReferenceResolver for GbifResolver {
    fn resolve(&mut self, subject: &Record) -> Resolution {
        let name = match subject.scientific_name.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n,
            _ => return Resolution::NotFound,
        };

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        let found = match self.client.match_name(name) {
            Ok(Some(m)) => m,
            Ok(None) => {
                tracing::debug!(subject = subject.label(), name, "no conclusive GBIF match");
                return Resolution::NotFound;
            }
            Err(e) => return Resolution::Failed(e.to_string()),
        };

        let common_name = match (self.fetch_common_names, found.usage_key) {
            (true, Some(key)) => self.common_name(key, subject),
            _ => None,
        };

        Resolution::Found(ReferenceRecord {
            record: Record {
                scientific_name: found.canonical_name,
                common_name,
                family: found.family,
                ..Default::default()
            },
            match_info: Some(MatchInfo {
                confidence: found.confidence,
                match_type: found.match_type.to_string(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn resolver(server: &MockServer) -> GbifResolver {
        let client = GbifClient::new(&server.base_url(), Duration::from_secs(5)).unwrap();
        GbifResolver::new(client).with_delay(Duration::ZERO)
    }

    fn subject(name: Option<&str>) -> Record {
        Record {
            id: Some("row 1".into()),
            scientific_name: name.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn blank_name_makes_no_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/match");
            then.status(200).json_body(serde_json::json!({ "matchType": "EXACT" }));
        });

        let mut r = resolver(&server);
        assert_eq!(r.resolve(&subject(None)), Resolution::NotFound);
        assert_eq!(r.resolve(&subject(Some("   "))), Resolution::NotFound);
        mock.assert_calls(0);
    }

    #[test]
    fn delay_precedes_lookups_but_not_blank_names() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/match");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({ "matchType": "NONE" }));
        });
        let delay = Duration::from_millis(150);
        let mut r = resolver(&server).with_delay(delay);

        let start = std::time::Instant::now();
        assert_eq!(r.resolve(&subject(Some("  "))), Resolution::NotFound);
        assert!(start.elapsed() < delay);

        let start = std::time::Instant::now();
        assert_eq!(r.resolve(&subject(Some("Plantus imaginarius"))), Resolution::NotFound);
        assert!(start.elapsed() >= delay);
    }

    #[test]
    fn new_resolver_uses_default_delay() {
        let client = GbifClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let r = GbifResolver::new(client);
        assert_eq!(r.delay, DEFAULT_DELAY);
        assert!(r.fetch_common_names);
        assert_eq!(r.with_delay(Duration::ZERO).delay, Duration::ZERO);
    }

    #[test]
    fn conclusive_match_with_english_common_name() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/match").query_param("name", "Acer rubrum");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "usageKey": 3189866,
                    "canonicalName": "Acer rubrum",
                    "family": "Sapindaceae",
                    "confidence": 99,
                    "matchType": "EXACT"
                }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/3189866/vernacularNames");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "results": [
                        { "vernacularName": "érable rouge", "language": "fra" },
                        { "vernacularName": "Red Maple", "language": "eng" }
                    ]
                }));
        });

        let Resolution::Found(reference) = resolver(&server).resolve(&subject(Some(" Acer rubrum "))) else {
            panic!("expected a match");
        };
        assert_eq!(reference.record.scientific_name.as_deref(), Some("Acer rubrum"));
        assert_eq!(reference.record.family.as_deref(), Some("Sapindaceae"));
        assert_eq!(reference.record.common_name.as_deref(), Some("Red Maple"));
        let info = reference.match_info.unwrap();
        assert_eq!(info.confidence, Some(99));
        assert_eq!(info.match_type, "EXACT");
    }

    #[test]
    fn vernacular_failure_leaves_common_name_absent() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/match");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "usageKey": 1,
                    "canonicalName": "Pinus radiata",
                    "family": "Pinaceae",
                    "confidence": 97,
                    "matchType": "FUZZY"
                }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/1/vernacularNames");
            then.status(500);
        });

        let Resolution::Found(reference) = resolver(&server).resolve(&subject(Some("Pinus radiatta"))) else {
            panic!("expected a match");
        };
        assert_eq!(reference.record.common_name, None);
        assert_eq!(reference.match_info.unwrap().match_type, "FUZZY");
    }

    #[test]
    fn common_names_can_be_skipped() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/match");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "usageKey": 7, "canonicalName": "Quercus", "matchType": "HIGHERRANK"
                }));
        });
        let vernacular = server.mock(|when, then| {
            when.method(GET).path("/7/vernacularNames");
            then.status(200).json_body(serde_json::json!({ "results": [] }));
        });

        let mut r = resolver(&server).with_common_names(false);
        assert!(matches!(r.resolve(&subject(Some("Quercus sp."))), Resolution::Found(_)));
        vernacular.assert_calls(0);
    }

    #[test]
    fn no_match_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/match");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({ "matchType": "NONE" }));
        });
        assert_eq!(resolver(&server).resolve(&subject(Some("Plantus imaginarius"))), Resolution::NotFound);
    }

    #[test]
    fn transport_error_is_failed() {
        let client = GbifClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let mut r = GbifResolver::new(client).with_delay(Duration::ZERO);
        assert!(matches!(r.resolve(&subject(Some("Acer rubrum"))), Resolution::Failed(_)));
    }
}
