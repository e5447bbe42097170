// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;
use std::fs;
use std::process;

use clap::Parser;
use serde::Serialize;

use mojigram::fst::io::{FstFooter, FstHeader};
use mojigram::{CjkAnalyzer, ScriptSet, TermDictionary, TokenType};

mod cli;
use cli::display::{bold, cyan, dim, format_count, format_size, green, red};
use cli::{parse_scripts, Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Build {
            input,
            output,
            unigrams,
            scripts,
        } => run_build(&input, &output, unigrams, scripts.as_deref()),
        Commands::Lookup { file, term } => run_lookup(&file, &term),
        Commands::Ord { file, ord } => run_ord(&file, ord),
        Commands::List { file, from, limit } => run_list(&file, from.as_deref(), limit),
        Commands::Inspect { file, json } => run_inspect(&file, json),
        Commands::Analyze {
            text,
            unigrams,
            scripts,
        } => run_analyze(&text, unigrams, scripts.as_deref()),
    };
    if let Err(message) = result {
        eprintln!("{} {}", red("error:"), message);
        process::exit(1);
    }
}

fn analyzer_for(unigrams: bool, scripts: Option<&str>) -> Result<CjkAnalyzer, String> {
    let scripts = match scripts {
        Some(spec) => parse_scripts(spec)?,
        None => ScriptSet::all(),
    };
    Ok(CjkAnalyzer::new().scripts(scripts).output_unigrams(unigrams))
}

fn run_build(
    input: &str,
    output: &str,
    unigrams: bool,
    scripts: Option<&str>,
) -> Result<(), String> {
    let text = fs::read_to_string(input).map_err(|e| format!("reading {}: {}", input, e))?;
    let analyzer = analyzer_for(unigrams, scripts)?;

    let mut terms: BTreeSet<String> = BTreeSet::new();
    let mut doc_count: u64 = 0;
    let mut token_count: u64 = 0;
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        doc_count += 1;
        for token in analyzer.analyze(line) {
            token_count += 1;
            terms.insert(token.text_string());
        }
    }

    let dict = TermDictionary::build(&terms)
        .ok_or_else(|| format!("no terms found in {}", input))?;
    dict.save_to_path(output)
        .map_err(|e| format!("writing {}: {}", output, e))?;

    let written = fs::metadata(output).map(|m| m.len()).unwrap_or(0);
    println!("{} {}", green("built"), bold(output));
    println!("  documents  {}", format_count(doc_count));
    println!("  tokens     {}", format_count(token_count));
    println!("  terms      {}", format_count(dict.len()));
    println!(
        "  fst        {} nodes, {} arcs, {}",
        format_count(dict.fst().node_count()),
        format_count(dict.fst().arc_count()),
        format_size(written)
    );
    Ok(())
}

fn open_dict(file: &str) -> Result<TermDictionary, String> {
    TermDictionary::load_from_path(file).map_err(|e| format!("loading {}: {}", file, e))
}

fn run_lookup(file: &str, term: &str) -> Result<(), String> {
    let dict = open_dict(file)?;
    match dict.ord(term) {
        Some(ord) => println!("{}\t{}", term, ord),
        None => {
            println!("{} not in dictionary", dim(term));
            // show the neighbors so a near-miss is visible
            if let Some((ceil, ord)) = dict.seek_ceil(term) {
                println!("  next: {}\t{}", ceil, ord);
            }
            if let Some((floor, ord)) = dict.seek_floor(term) {
                println!("  prev: {}\t{}", floor, ord);
            }
        }
    }
    Ok(())
}

fn run_ord(file: &str, ord: u64) -> Result<(), String> {
    let dict = open_dict(file)?;
    match dict.term(ord) {
        Some(term) => println!("{}\t{}", ord, term),
        None => {
            return Err(format!(
                "ordinal {} out of range (dictionary has {} terms)",
                ord,
                dict.len()
            ))
        }
    }
    Ok(())
}

fn run_list(file: &str, from: Option<&str>, limit: usize) -> Result<(), String> {
    let dict = open_dict(file)?;
    let iter: Box<dyn Iterator<Item = (String, u64)>> = match from {
        Some(from) => Box::new(dict.iter_from(from)),
        None => Box::new(dict.iter()),
    };
    let mut shown = 0usize;
    for (term, ord) in iter {
        println!("{}\t{}", ord, term);
        shown += 1;
        if limit != 0 && shown >= limit {
            break;
        }
    }
    if shown == 0 {
        println!("{}", dim("(no terms)"));
    }
    Ok(())
}

#[derive(Serialize)]
struct InspectReport {
    file: String,
    file_size: u64,
    version: u8,
    input_mode: u8,
    algebra_id: u8,
    has_empty_output: bool,
    term_count: u64,
    node_count: u64,
    arc_count: u64,
    data_len: u64,
    crc32: u32,
}

fn run_inspect(file: &str, json: bool) -> Result<(), String> {
    let bytes = fs::read(file).map_err(|e| format!("reading {}: {}", file, e))?;
    let header = FstHeader::read(&bytes).map_err(|e| e.to_string())?;
    let footer = FstFooter::read(&bytes).map_err(|e| e.to_string())?;
    // full validation pass, so inspect doubles as a file checker
    let dict = TermDictionary::load(&bytes).map_err(|e| e.to_string())?;

    let report = InspectReport {
        file: file.to_string(),
        file_size: bytes.len() as u64,
        version: header.version,
        input_mode: header.input_mode,
        algebra_id: header.algebra_id,
        has_empty_output: header.flags & 1 != 0,
        term_count: dict.len(),
        node_count: header.node_count,
        arc_count: header.arc_count,
        data_len: header.data_len,
        crc32: footer.crc32,
    };

    if json {
        let out = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{}", out);
    } else {
        println!("{} {}", cyan("dictionary"), bold(file));
        println!("  size       {}", format_size(report.file_size));
        println!("  version    {}", report.version);
        println!("  terms      {}", format_count(report.term_count));
        println!("  nodes      {}", format_count(report.node_count));
        println!("  arcs       {}", format_count(report.arc_count));
        println!("  node data  {}", format_size(report.data_len));
        println!("  crc32      {:#010x} {}", report.crc32, green("ok"));
    }
    Ok(())
}

fn run_analyze(text: &str, unigrams: bool, scripts: Option<&str>) -> Result<(), String> {
    let analyzer = analyzer_for(unigrams, scripts)?;
    let mut position = 0u64;
    for token in analyzer.analyze(text) {
        position += u64::from(token.position_increment);
        let kind = match token.ttype {
            TokenType::Double => "double",
            TokenType::Single => "single",
            TokenType::Script(_) => "word",
        };
        let span = if token.position_length > 1 {
            format!("{}+{}", position, token.position_length)
        } else {
            position.to_string()
        };
        println!(
            "{}\t{}\t[{}..{})\t{}",
            token.text_string(),
            dim(kind),
            token.start,
            token.end,
            span
        );
    }
    Ok(())
}
