use crate::config::ColumnMapping;
use crate::error::ReconError;
use crate::model::{Record, Table};

/// Map table rows onto records.
///
/// Every mapped column is checked before any row is read, and all missing
/// columns are reported together.
pub fn load_records(table: &Table, mapping: &ColumnMapping) -> Result<Vec<Record>, ReconError> {
    let missing: Vec<String> = mapping
        .columns()
        .into_iter()
        .filter(|c| table.column_index(c).is_none())
        .map(String::from)
        .collect();
    if !missing.is_empty() {
        return Err(ReconError::MissingColumns {
            table: table.name.clone(),
            columns: missing,
        });
    }

    let idx = |name: &Option<String>| name.as_deref().and_then(|n| table.column_index(n));
    let id_idx = idx(&mapping.id);
    let sci_idx = table.column_index(&mapping.scientific_name);
    let common_idx = idx(&mapping.common_name);
    let family_idx = table.column_index(&mapping.family);
    let origin_idx = idx(&mapping.origin);

    let records = table
        .rows
        .iter()
        .map(|row| {
            let cell = |i: Option<usize>| i.and_then(|i| row.cells.get(i).cloned().flatten());
            Record {
                id: cell(id_idx),
                scientific_name: cell(sci_idx),
                common_name: cell(common_idx),
                family: cell(family_idx),
                origin: cell(origin_idx),
                source_row: row.rowid,
            }
        })
        .collect();

    Ok(records)
}

/// Give id-less records a positional id (`row 1`, `row 2`, ...).
pub fn assign_row_ids(records: &mut [Record]) {
    for (i, rec) in records.iter_mut().enumerate() {
        if rec.id.is_none() {
            rec.id = Some(format!("row {}", i + 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TableRow;

    fn table(name: &str, columns: &[&str], rows: Vec<Vec<Option<&str>>>) -> Table {
        Table {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .into_iter()
                .enumerate()
                .map(|(i, cells)| TableRow {
                    rowid: Some(i as i64 + 1),
                    cells: cells.into_iter().map(|c| c.map(String::from)).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn load_signs_basic() {
        let t = table(
            "sign_inventory_current",
            &["fid", "tree_id", "sign_scientific_name", "sign_common_name", "sign_family"],
            vec![
                vec![Some("1"), Some("101"), Some("Quercus agrifolia"), Some("Coast Live Oak"), Some("Fagaceae")],
                vec![Some("2"), Some("102"), None, Some("Monterey Pine"), Some("Pinaceae")],
            ],
        );
        let recs = load_records(&t, &ColumnMapping::sign_inventory()).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].id.as_deref(), Some("101"));
        assert_eq!(recs[0].common_name.as_deref(), Some("Coast Live Oak"));
        assert_eq!(recs[0].origin, None);
        assert_eq!(recs[0].source_row, Some(1));
        assert_eq!(recs[1].scientific_name, None);
        assert_eq!(recs[1].source_row, Some(2));
    }

    #[test]
    fn cells_are_kept_verbatim() {
        let t = table(
            "species_master_current",
            &["tree_id", "scientific_name", "common_name", "family", "origin"],
            vec![vec![Some("7"), Some(" Acer rubrum "), Some("Red Maple"), Some("Sapindaceae"), Some("Native")]],
        );
        let recs = load_records(&t, &ColumnMapping::species_master()).unwrap();
        assert_eq!(recs[0].scientific_name.as_deref(), Some(" Acer rubrum "));
        assert_eq!(recs[0].origin.as_deref(), Some("Native"));
    }

    #[test]
    fn all_missing_columns_reported_at_once() {
        let t = table("sign_inventory_current", &["tree_id", "sign_common_name"], vec![]);
        let err = load_records(&t, &ColumnMapping::sign_inventory()).unwrap_err();
        match err {
            ReconError::MissingColumns { table, columns } => {
                assert_eq!(table, "sign_inventory_current");
                assert_eq!(columns, vec!["sign_scientific_name", "sign_family"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn short_rows_read_as_absent() {
        let t = table(
            "species_list",
            &["scientific_name", "common_name", "family"],
            vec![vec![Some("Pinus radiata")]],
        );
        let recs = load_records(&t, &ColumnMapping::species_list()).unwrap();
        assert_eq!(recs[0].scientific_name.as_deref(), Some("Pinus radiata"));
        assert_eq!(recs[0].family, None);
    }

    #[test]
    fn row_ids_fill_only_missing() {
        let mut recs = vec![
            Record::default(),
            Record { id: Some("T-9".into()), ..Default::default() },
            Record::default(),
        ];
        assign_row_ids(&mut recs);
        assert_eq!(recs[0].id.as_deref(), Some("row 1"));
        assert_eq!(recs[1].id.as_deref(), Some("T-9"));
        assert_eq!(recs[2].id.as_deref(), Some("row 3"));
    }
}
