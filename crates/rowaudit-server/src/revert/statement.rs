//! SQL text for compensating writes
//!
//! The only bound parameter is the audit record id. Snapshot values are read
//! server-side from `audit_logs` and converted to the live column types by
//! `jsonb_populate_record`, so no value is ever spliced into SQL text and no
//! numeric precision is lost on the way back.
//!
//! Identifiers come from the validated registration (table) and from the live
//! catalog (columns) and are always double-quoted.

use rowaudit_common::{RowSnapshot, KEY_COLUMN};

use super::RevertError;
use crate::db::{catalog::TableColumn, identifier::quote_ident, identifier::QualifiedName};

/// Re-apply `before_state` of the audit record bound as `$1`.
///
/// The statement returns one boolean row, `inserted`, when a row was written:
/// `true` when the row had to be re-created. With `DO NOTHING` (key-only
/// snapshots) an existing row yields no rows at all.
pub fn restore_sql(
    table: &QualifiedName,
    columns: &[TableColumn],
    snapshot: &RowSnapshot,
) -> Result<String, RevertError> {
    snapshot.require_key().map_err(|_| RevertError::MissingKey)?;

    let unknown: Vec<String> = snapshot
        .column_names()
        .filter(|name| !columns.iter().any(|c| c.name == *name))
        .map(str::to_string)
        .collect();
    if !unknown.is_empty() {
        return Err(RevertError::UnknownColumns {
            table: table.to_string(),
            columns: unknown,
        });
    }

    // Catalog order, restricted to captured, writable columns.
    let written: Vec<&TableColumn> = columns
        .iter()
        .filter(|c| !c.generated && snapshot.contains_column(&c.name))
        .collect();

    let column_list = join(written.iter().map(|c| quote_ident(&c.name)));
    let select_list = join(written.iter().map(|c| format!("r.{}", quote_ident(&c.name))));
    let overriding = if written.iter().any(|c| c.identity_always) {
        " OVERRIDING SYSTEM VALUE"
    } else {
        ""
    };

    let assignments = join(
        written
            .iter()
            .filter(|c| c.name != KEY_COLUMN && !c.identity_always)
            .map(|c| {
                let quoted = quote_ident(&c.name);
                format!("{quoted} = EXCLUDED.{quoted}")
            }),
    );
    let conflict_action = if assignments.is_empty() {
        "DO NOTHING".to_string()
    } else {
        format!("DO UPDATE SET {assignments}")
    };

    let target = table.quoted();
    let key = quote_ident(KEY_COLUMN);

    Ok(format!(
        "INSERT INTO {target} ({column_list}){overriding} \
         SELECT {select_list} \
         FROM audit_logs a, jsonb_populate_record(NULL::{target}, a.before_state) r \
         WHERE a.id = $1 \
         ON CONFLICT ({key}) {conflict_action} \
         RETURNING (xmax = 0) AS inserted"
    ))
}

/// Delete the row created by the insert recorded as `$1`.
///
/// The key is read from `after_state`, falling back to `target_entity_id`.
pub fn delete_sql(table: &QualifiedName, columns: &[TableColumn]) -> Result<String, RevertError> {
    if !columns.iter().any(|c| c.name == KEY_COLUMN) {
        return Err(RevertError::UnknownColumns {
            table: table.to_string(),
            columns: vec![KEY_COLUMN.to_string()],
        });
    }

    let target = table.quoted();
    let key = quote_ident(KEY_COLUMN);

    Ok(format!(
        "DELETE FROM {target} WHERE {key} = (\
         SELECT r.{key} \
         FROM audit_logs a, jsonb_populate_record(NULL::{target}, \
         COALESCE(a.after_state, jsonb_build_object('{KEY_COLUMN}', a.target_entity_id))) r \
         WHERE a.id = $1)"
    ))
}

fn join(parts: impl Iterator<Item = String>) -> String {
    parts.collect::<Vec<_>>().join(", ")
}
