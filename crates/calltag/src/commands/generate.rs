use std::path::Path;

use libcalltag_core::generator::{check_generated, write_generated, Generator, WriteOutcome};
use libcalltag_core::CallTagError;
use serde::Serialize;
use tracing::debug;

use crate::cli::Cli;
use crate::commands::{load_crate, resolve_root};
use crate::output::{output_success, print_human};

#[derive(Serialize)]
struct GenerateOutput {
    /// False when the crate does not depend on libcalltag-core
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    entries: usize,
    written: bool,
    checked: bool,
}

pub fn run(cli: &Cli, root: Option<&Path>, out: Option<&Path>, check: bool) -> Result<(), CallTagError> {
    let root = resolve_root(root)?;
    let (mut config, compilation) = load_crate(&root)?;
    if let Some(out) = out {
        // --out is relative to the working directory, calltag.toml's output to the root
        config.output = Some(std::env::current_dir()?.join(out));
    }
    debug!(root = %root.display(), sources = compilation.sources().len(), "generating");

    let Some(source) = Generator::new().run(&compilation)? else {
        print_human(
            cli,
            &format!(
                "{} does not depend on libcalltag-core; nothing generated",
                root.display()
            ),
        );
        output_success(
            cli,
            GenerateOutput {
                enabled: false,
                path: None,
                entries: 0,
                written: false,
                checked: check,
            },
        );
        return Ok(());
    };

    let path = config.output_path(&root);
    let written = if check {
        check_generated(&path, &source)?;
        print_human(cli, &format!("{} is up to date", path.display()));
        false
    } else {
        let outcome = write_generated(&path, &source)?;
        match outcome {
            WriteOutcome::Written => print_human(
                cli,
                &format!("Wrote {} ({} call sites)", path.display(), source.table.len()),
            ),
            WriteOutcome::Unchanged => print_human(cli, &format!("{} unchanged", path.display())),
        }
        outcome == WriteOutcome::Written
    };

    output_success(
        cli,
        GenerateOutput {
            enabled: true,
            path: Some(path.display().to_string()),
            entries: source.table.len(),
            written,
            checked: check,
        },
    );
    Ok(())
}
