use std::path::Path;

use comfy_table::Table;
use libcalltag_core::generator::{load_context, scan};
use libcalltag_core::location::ordinal_cmp;
use libcalltag_core::{hash_tag, CallTagError, DispatchTable};
use serde::Serialize;

use crate::cli::Cli;
use crate::commands::{load_crate, resolve_root};
use crate::output::{output_success, print_human};

#[derive(Serialize)]
struct CallSiteRow {
    file: String,
    member: String,
    line: u32,
    location: String,
    tag: String,
}

#[derive(Serialize)]
struct Collision {
    tag: String,
    locations: Vec<String>,
}

#[derive(Serialize)]
struct ScanOutput {
    /// Whether `generate` would emit anything for this crate
    library_referenced: bool,
    call_sites: Vec<CallSiteRow>,
    entries: usize,
    collisions: Vec<Collision>,
}

pub fn run(cli: &Cli, root: Option<&Path>) -> Result<(), CallTagError> {
    let root = resolve_root(root)?;
    let (_, compilation) = load_crate(&root)?;
    let library_referenced = load_context(&compilation).is_enabled();
    let sites = scan(&compilation);

    let mut rows: Vec<CallSiteRow> = sites
        .iter()
        .map(|site| {
            let location = site.location_key();
            CallSiteRow {
                file: site.file.display().to_string(),
                member: site.enclosing_member.clone(),
                line: site.line,
                tag: hash_tag(&location),
                location,
            }
        })
        .collect();
    rows.sort_by(|a, b| ordinal_cmp(&a.location, &b.location).then_with(|| a.file.cmp(&b.file)));

    let table = DispatchTable::from_call_sites(&sites);
    let collisions: Vec<Collision> = table
        .collisions()
        .into_iter()
        .map(|(tag, locations)| Collision { tag, locations })
        .collect();

    if !library_referenced {
        print_human(cli, "note: libcalltag-core is not a dependency; generate would emit nothing");
    }
    if rows.is_empty() {
        print_human(cli, "No call sites found");
    } else {
        let mut human = Table::new();
        human.set_header(vec!["Location", "Tag", "File", "Line"]);
        for row in &rows {
            human.add_row(vec![
                row.location.clone(),
                row.tag.clone(),
                row.file.clone(),
                row.line.to_string(),
            ]);
        }
        print_human(cli, &human.to_string());
    }
    for collision in &collisions {
        print_human(
            cli,
            &format!("warning: {} is shared by {}", collision.tag, collision.locations.join(", ")),
        );
    }

    output_success(
        cli,
        ScanOutput {
            library_referenced,
            entries: table.len(),
            call_sites: rows,
            collisions,
        },
    );
    Ok(())
}
