pub mod chunks;
pub mod compare;
pub mod config;
pub mod edits;
pub mod file_handler;
pub mod items;
pub mod parser;
pub mod sorter;
pub mod specifiers;
pub mod tokens;

use anyhow::{Context, Result};

use chunks::{collect_chunks, EngineKind};
use config::{CompiledConfig, SortConfig};
use edits::{apply_edits, TextEdit};
use tokens::{guess_newline, LineIndex};

/// Applying an edit cannot invalidate the other chunks of the same pass,
/// so one pass normally reaches the fixed point. The cap only guards
/// against a pathological oscillation.
const MAX_PASSES: usize = 10;

/// Simple heuristic to detect JSX content in source code, so `.ts` input
/// that actually holds JSX is parsed with the right syntax.
fn contains_jsx(source: &str) -> bool {
    source.contains("</")
        || source.contains("/>")
        || source
            .chars()
            .zip(source.chars().skip(1))
            .any(|(c1, c2)| c1 == '<' && c2.is_ascii_uppercase())
}

/// Computes the sorting edits for one snapshot of `source` without
/// applying them. Edits never overlap and each one replaces a whole chunk.
pub fn analyze(source: &str, filename: &str, config: &CompiledConfig) -> Result<Vec<TextEdit>> {
    let ts_parser = parser::TypeScriptParser::new();
    let parsed = ts_parser
        .parse(source, filename)
        .context("Failed to parse TypeScript code")?;

    let lines = LineIndex::new(source);
    let newline = guess_newline(source);

    let mut edits = Vec::new();
    let engines = [
        (EngineKind::Imports, &config.import_groups),
        (EngineKind::Exports, &config.export_groups),
    ];
    for (engine, groups) in engines {
        for mut chunk in collect_chunks(&parsed, source, engine) {
            if let Some(edit) =
                sorter::sort_chunk(&mut chunk, source, &lines, engine, groups, newline)
            {
                edits.push(edit);
            }
        }
    }
    Ok(edits)
}

/// Sort the module imports and exports of TypeScript/TSX code.
///
/// This is the main entry point for programmatic use of impsort. Edits are
/// applied repeatedly until the source stops changing, so the returned
/// text is always a fixed point of the sorter.
pub fn sort_typescript(source: &str, filename: &str, config: &SortConfig) -> Result<String> {
    let compiled = config.compile().context("Failed to compile group config")?;

    let effective_filename = if !filename.ends_with(".tsx")
        && !filename.ends_with(".jsx")
        && contains_jsx(source)
    {
        "input.tsx".to_string()
    } else {
        filename.to_string()
    };

    let mut current = source.to_string();
    for _ in 0..MAX_PASSES {
        let edits = analyze(&current, &effective_filename, &compiled)?;
        if edits.is_empty() {
            break;
        }
        current = apply_edits(&current, &edits);
    }
    Ok(current)
}
