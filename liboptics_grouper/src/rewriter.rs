use super::constants::{OPTICS_GROUP_COLUMN, OPTICS_GROUP_NAME_COLUMN};
use super::error::TableError;
use super::optics_groups::OpticsGroups;
use super::star_file::StarTable;

/// Name given to an optics group in the optics table
pub fn optics_group_name(group: u32) -> String {
    format!("opticsGroup{group}")
}

/// Write the optics group of every row into the data table.
///
/// The column is appended if the table does not already have one.
pub fn set_optics_column(table: &mut StarTable, ids: &[u32]) -> Result<(), TableError> {
    table.set_column(
        OPTICS_GROUP_COLUMN,
        ids.iter().map(u32::to_string).collect(),
    )
}

/// Build a new optics table with one row per optics group.
///
/// The first row of `template` (the optics table read from the input) is used for every column
/// other than the group number and name. If the template has no rows, `placeholder` is used
/// instead.
pub fn build_optics_table(
    template: &StarTable,
    groups: &OpticsGroups,
    placeholder: &str,
) -> Result<StarTable, TableError> {
    let mut optics = StarTable::new(template.columns().to_vec());
    let group_idx = optics.add_column(OPTICS_GROUP_COLUMN, placeholder);
    let name_idx = optics.add_column(OPTICS_GROUP_NAME_COLUMN, placeholder);
    let n_columns = optics.columns().len();

    let base_row: Vec<String> = match template.rows().first() {
        Some(row) => row.clone(),
        None => vec![placeholder.to_string(); template.columns().len()],
    };

    for (group, _) in groups.iter() {
        let mut row = base_row.clone();
        row.resize(n_columns, placeholder.to_string());
        row[group_idx] = group.to_string();
        row[name_idx] = optics_group_name(group);
        optics.push_row(row)?;
    }
    Ok(optics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::GroupKey;

    fn groups() -> OpticsGroups {
        let keys = [GroupKey::new("A", 1), GroupKey::new("B", 2)];
        OpticsGroups::from_keys(keys.iter().map(Some))
    }

    #[test]
    fn test_set_optics_column() {
        let mut table = StarTable::new(vec!["_rlnMicrographName".to_string()]);
        table.push_row(vec!["a.mrc".to_string()]).unwrap();
        table.push_row(vec!["b.mrc".to_string()]).unwrap();

        set_optics_column(&mut table, &[2, 1]).unwrap();
        assert_eq!(table.get(0, OPTICS_GROUP_COLUMN), Some("2"));
        assert_eq!(table.get(1, OPTICS_GROUP_COLUMN), Some("1"));

        // Overwrite in place
        set_optics_column(&mut table, &[1, 1]).unwrap();
        assert_eq!(table.columns().len(), 2);
        assert_eq!(table.get(0, OPTICS_GROUP_COLUMN), Some("1"));

        assert!(set_optics_column(&mut table, &[1]).is_err());
    }

    #[test]
    fn test_optics_from_template_row() {
        let mut template = StarTable::new(vec![
            OPTICS_GROUP_NAME_COLUMN.to_string(),
            OPTICS_GROUP_COLUMN.to_string(),
            "_rlnVoltage".to_string(),
        ]);
        template
            .push_row(vec![
                "opticsGroup1".to_string(),
                "1".to_string(),
                "300.000000".to_string(),
            ])
            .unwrap();

        let optics = build_optics_table(&template, &groups(), "1.000000").unwrap();
        assert_eq!(optics.columns(), template.columns());
        assert_eq!(optics.n_rows(), 2);
        assert_eq!(optics.get(1, OPTICS_GROUP_NAME_COLUMN), Some("opticsGroup2"));
        assert_eq!(optics.get(1, OPTICS_GROUP_COLUMN), Some("2"));
        assert_eq!(optics.get(1, "_rlnVoltage"), Some("300.000000"));
    }

    #[test]
    fn test_optics_without_template_row() {
        let template = StarTable::new(vec![
            OPTICS_GROUP_NAME_COLUMN.to_string(),
            "_rlnVoltage".to_string(),
        ]);
        let optics = build_optics_table(&template, &groups(), "1.000000").unwrap();
        assert_eq!(
            optics.columns(),
            &[
                OPTICS_GROUP_NAME_COLUMN.to_string(),
                "_rlnVoltage".to_string(),
                OPTICS_GROUP_COLUMN.to_string(),
            ]
        );
        assert_eq!(optics.get(0, "_rlnVoltage"), Some("1.000000"));
        assert_eq!(optics.get(0, OPTICS_GROUP_COLUMN), Some("1"));
        assert_eq!(optics.get(0, OPTICS_GROUP_NAME_COLUMN), Some("opticsGroup1"));
    }

    #[test]
    fn test_optics_without_template_columns() {
        let optics = build_optics_table(&StarTable::default(), &groups(), "1.000000").unwrap();
        assert_eq!(
            optics.columns(),
            &[
                OPTICS_GROUP_COLUMN.to_string(),
                OPTICS_GROUP_NAME_COLUMN.to_string(),
            ]
        );
        assert_eq!(optics.n_rows(), 2);
    }
}
