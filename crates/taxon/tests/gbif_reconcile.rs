// End-to-end taxonomy reconciliation against a mocked GBIF API.

use std::time::Duration;

use httpmock::prelude::*;
use signcheck_recon::config::{CommonNameMode, ComparisonMode};
use signcheck_recon::engine::reconcile;
use signcheck_recon::model::{Reason, Record};
use signcheck_recon::report::taxonomy_rows;
use signcheck_taxon::{GbifClient, GbifResolver};

fn species(row: usize, sci: &str, common: &str, family: &str) -> Record {
    Record {
        id: Some(format!("row {row}")),
        scientific_name: Some(sci.into()),
        common_name: Some(common.into()),
        family: Some(family.into()),
        ..Default::default()
    }
}

fn match_body(key: u64, canonical: &str, family: &str, match_type: &str) -> serde_json::Value {
    serde_json::json!({
        "usageKey": key,
        "canonicalName": canonical,
        "family": family,
        "confidence": 95,
        "matchType": match_type
    })
}

fn mock_match(server: &MockServer, name: &str, body: serde_json::Value) {
    server.mock(|when, then| {
        when.method(GET).path("/match").query_param("name", name);
        then.status(200).header("content-type", "application/json").json_body(body);
    });
}

#[test]
fn failures_and_no_matches_do_not_stop_the_scan() {
    let server = MockServer::start();

    mock_match(&server, "Quercus agrifolia", match_body(1, "Quercus agrifolia", "Fagaceae", "EXACT"));
    server.mock(|when, then| {
        when.method(GET).path("/match").query_param("name", "Pinus radiata");
        then.status(502).body("bad gateway");
    });
    mock_match(&server, "Acer rubrum", match_body(3, "Acer rubrum", "Sapindaceae", "EXACT"));
    mock_match(&server, "Plantus imaginarius", serde_json::json!({ "matchType": "NONE" }));
    for key in [1, 3] {
        server.mock(|when, then| {
            when.method(GET).path(format!("/{key}/vernacularNames"));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({ "results": [] }));
        });
    }

    let subjects = vec![
        species(1, "Quercus agrifolia", "Coast Live Oak", "Fagaceae"),
        species(2, "Pinus radiata", "Monterey Pine", "Pinaceae"),
        species(3, "Acer rubrum", "Red Maple", "Aceraceae"),
        species(4, "Plantus imaginarius", "Nothing", "Nullaceae"),
    ];

    let client = GbifClient::new(&server.base_url(), Duration::from_secs(5)).unwrap();
    let mut resolver = GbifResolver::new(client).with_delay(Duration::ZERO);
    let spec = ComparisonMode::taxonomy(CommonNameMode::Report).build();
    let out = reconcile(&subjects, &mut resolver, &spec);

    assert_eq!(out.summary.subjects, 4);
    assert_eq!(out.summary.lookup_failures, 1);

    let ids: Vec<&str> = out.discrepancies.iter().map(|d| d.subject_id.as_str()).collect();
    assert_eq!(ids, vec!["row 2", "row 3", "row 4"]);
    assert_eq!(out.discrepancies[0].reasons, vec![Reason::NotFound]);
    assert_eq!(out.discrepancies[1].note(), "Family mismatch.");
    assert_eq!(out.discrepancies[2].reasons, vec![Reason::NotFound]);

    let rows = taxonomy_rows(&out.discrepancies);
    assert_eq!(rows[1].original_family, "Aceraceae");
    assert_eq!(rows[1].gbif_family, "Sapindaceae");
    assert_eq!(rows[1].gbif_match_type, "EXACT");
    assert_eq!(rows[1].gbif_match_confidence, "95");
    assert_eq!(rows[0].gbif_scientific_name, "Missing from reference");
}
