use signcheck_recon::ReconResult;

use crate::CliError;

/// Human summary for stderr.
pub fn human(result: &ReconResult) -> String {
    let s = &result.summary;
    let mut out = format!(
        "{}: {} checked, {} consistent, {} with discrepancies ({} not found",
        result.meta.run_name, s.subjects, s.consistent, s.discrepancies, s.not_found,
    );
    if s.lookup_failures > 0 {
        out.push_str(&format!(", {} lookup failures", s.lookup_failures));
    }
    out.push(')');
    for (field, count) in &s.mismatches_by_field {
        out.push_str(&format!("\n  {field}: {count} mismatched"));
    }
    out
}

pub fn print_json(result: &ReconResult) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(result)
        .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use signcheck_recon::config::{CommonNameMode, ComparisonMode, JoinKey};
    use signcheck_recon::model::Record;
    use signcheck_recon::{run, MasterIndex};

    fn rec(id: &str, sci: &str, common: &str, family: &str) -> Record {
        Record {
            id: Some(id.into()),
            scientific_name: Some(sci.into()),
            common_name: Some(common.into()),
            family: Some(family.into()),
            ..Default::default()
        }
    }

    #[test]
    fn summary_lists_fields() {
        let subjects = vec![
            rec("1", "Quercus agrifolia", "Coast Live Oak", "Fagaceae"),
            rec("2", "Pinus radiata", "Monterey Pine", "Pinaceae"),
            rec("3", "Acer rubrum", "Wrong Name", "Sapindaceae"),
        ];
        let master = vec![
            rec("1", "Quercus agrifolia", "Coast Live Oak", "Fagaceae"),
            rec("3", "Acer rubrum", "Red Maple", "Sapindaceae"),
        ];
        let mut index = MasterIndex::build(master, JoinKey::TreeId);
        let spec = ComparisonMode::signs(CommonNameMode::Compare).build();
        let result = run("check-signs", Some(JoinKey::TreeId), CommonNameMode::Compare, &subjects, &mut index, &spec);

        let text = human(&result);
        assert!(text.starts_with("check-signs: 3 checked, 1 consistent, 2 with discrepancies (1 not found)"));
        assert!(text.contains("common_name: 1 mismatched"));
        assert!(!text.contains("lookup failures"));
    }
}
